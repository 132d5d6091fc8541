//! Parallel fan-out over independent solver invocations.
//!
//! Every individual `solve`/`little_tsp` call stays single-threaded and
//! synchronous, but a `Problem`/`DenseProblem` is read-only once built and
//! may be shared by reference across concurrently-running, independent
//! invocations. This is this crate's one natural `rayon` seam — fan a slice
//! of independent work out across the thread pool and collect.

use rayon::prelude::*;

use crate::problem::Problem;
use crate::solver::{self, SolveOutcome};
use crate::time::Duration;

/// Runs [`crate::solver::solve`] once per entry of `target_sets` against the
/// shared, read-only `problem`, in parallel. Output order matches input
/// order; each invocation's internal state (DFS stack, best-so-far) is
/// entirely its own.
pub fn solve_many<S: AsRef<str> + Sync>(
    problem: &Problem,
    target_sets: &[Vec<S>],
    min_transfer: Duration,
) -> Vec<SolveOutcome> {
    target_sets
        .par_iter()
        .map(|targets| solver::solve(problem, targets, min_transfer))
        .collect()
}
