//! All-pairs minimal schedule closure: a modified Floyd–Warshall in the
//! schedule algebra, producing the dense matrix [`tsp::little_tsp`] needs a
//! cost matrix from.

use serde::{Deserialize, Serialize};

use crate::problem::Problem;
use crate::schedule::{compose, merge, Schedule};
use crate::time::Duration;

/// Stop name reserved for an open-tour formulation: a synthetic origin/
/// terminus connected to every real stop by a zero-cost anytime link in both
/// directions, excluded as a Floyd–Warshall intermediate so it can never
/// shortcut a path between two real stops.
pub const DUMMY_STOP_NAME: &str = "DUMMY";

/// `entries[from * num_stops + to]` is the minimal schedule from `from` to
/// `to`, over every path through the source `Problem` (not just its direct
/// edges). `entries[i * num_stops + i]` is always the empty schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DenseProblem {
    pub num_stops: usize,
    pub entries: Vec<Schedule>,
}

impl DenseProblem {
    pub fn get(&self, from: usize, to: usize) -> &Schedule {
        &self.entries[from * self.num_stops + to]
    }

    fn get_mut(&mut self, from: usize, to: usize) -> &mut Schedule {
        &mut self.entries[from * self.num_stops + to]
    }
}

/// Builds the all-pairs minimal-schedule closure of `problem`. If a stop
/// named [`DUMMY_STOP_NAME`] is present it is excluded as an intermediate, so
/// it can act purely as an open-tour start/finish without ever shortening a
/// path between two real stops.
pub fn make_dense_problem(problem: &Problem) -> DenseProblem {
    let num_stops = problem.stop_count();
    let mut result = DenseProblem {
        num_stops,
        entries: vec![Schedule::empty(); num_stops * num_stops],
    };

    for (from, edges) in problem.edges.iter().enumerate() {
        for edge in edges {
            *result.get_mut(from, edge.destination as usize) = edge.schedule.clone();
        }
    }

    let dummy = problem.stop_index(DUMMY_STOP_NAME).map(|i| i as usize);

    for intermediate in 0..num_stops {
        if Some(intermediate) == dummy {
            continue;
        }
        for from in 0..num_stops {
            if from == intermediate {
                continue;
            }
            for to in 0..num_stops {
                if to == intermediate || to == from {
                    continue;
                }
                let via = compose(result.get(from, intermediate), result.get(intermediate, to), Duration::ZERO);
                merge(result.get_mut(from, to), &via);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::build_problem;
    use crate::time::Time;
    use crate::world::{Stop, World, WorldSegment};
    use std::sync::Arc;

    fn triangle_world() -> World {
        let mut world = World::new();
        world.add_stop(Stop::new("A", "A"));
        world.add_stop(Stop::new("B", "B"));
        world.add_stop(Stop::new("C", "C"));
        world.add_anytime_connection("A", "B", Duration::from_seconds(100));
        world.add_anytime_connection("B", "C", Duration::from_seconds(100));
        world.add_anytime_connection("A", "C", Duration::from_seconds(100));
        world
    }

    #[test]
    fn trivial_anytime_closure_fills_every_off_diagonal_cell() {
        let problem = build_problem(&triangle_world());
        let dense = make_dense_problem(&problem);
        for from in 0..dense.num_stops {
            for to in 0..dense.num_stops {
                if from == to {
                    assert!(dense.get(from, to).is_empty());
                } else {
                    assert_eq!(dense.get(from, to).anytime, Some(Duration::from_seconds(100)));
                }
            }
        }
    }

    #[test]
    fn dummy_stop_never_improves_a_real_pair() {
        let mut world = World::new();
        world.add_stop(Stop::new("A", "A"));
        world.add_stop(Stop::new("B", "B"));
        world.add_stop(Stop::new("DUMMY", "DUMMY"));
        world.add_segment(WorldSegment {
            origin_stop_id: Arc::from("A"),
            destination_stop_id: Arc::from("B"),
            departure: Time::from_seconds(0),
            duration: Duration::from_seconds(300),
            trip_id: Arc::from("t1"),
        });
        world.add_anytime_connection("A", "DUMMY", Duration::ZERO);
        world.add_anytime_connection("B", "DUMMY", Duration::ZERO);

        let problem = build_problem(&world);
        let dense = make_dense_problem(&problem);
        let a = problem.stop_index("A").unwrap() as usize;
        let b = problem.stop_index("B").unwrap() as usize;
        let direct = problem.edge(a as u32, b as u32).unwrap();
        assert_eq!(dense.get(a, b).lower_bound(), direct.schedule.lower_bound());
    }

    #[test]
    fn fills_direct_edges_on_construction() {
        let mut world = World::new();
        world.add_stop(Stop::new("A", "A"));
        world.add_stop(Stop::new("B", "B"));
        world.add_anytime_connection("A", "B", Duration::from_seconds(50));
        let problem = build_problem(&world);
        let dense = make_dense_problem(&problem);
        let a = problem.stop_index("A").unwrap() as usize;
        let b = problem.stop_index("B").unwrap() as usize;
        assert_eq!(dense.get(a, b).anytime, Some(Duration::from_seconds(50)));
    }
}
