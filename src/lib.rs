//! A time-dependent transit tour planner: schedule algebra, network
//! simplification, a minimal-walk enumerator, and two solvers (a walk-driven
//! exhaustive search and a Little-style branch-and-bound TSP) over it.
//!
//! GTFS ingestion, calendar/service-day resolution, and coordinate handling
//! are out of scope here — callers populate a [`world::World`] however they
//! see fit; [`crates/cli`](../cli) is a thin example of doing so from JSON.

pub mod batch;
pub mod config;
pub mod dense;
pub mod persistence;
pub mod problem;
pub mod schedule;
pub mod simplifier;
pub mod solver;
pub mod time;
pub mod tsp;
pub mod walk;
pub mod world;

pub mod prelude {
    pub use crate::dense::{make_dense_problem, DenseProblem};
    pub use crate::problem::{build_problem, Problem};
    pub use crate::schedule::{compose, erase_non_minimal, merge, Schedule, Segment};
    pub use crate::simplifier::simplify_problem;
    pub use crate::solver::{solve, SolveOutcome, WalkSolution};
    pub use crate::time::{Duration, Time};
    pub use crate::tsp::{little_tsp, CostMatrix};
    pub use crate::world::World;
}
