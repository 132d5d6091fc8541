//! Network simplification via time-expanded Dijkstra.
//!
//! [`simplify_problem`] collapses a [`Problem`] down to a dense graph over a
//! caller-chosen "keep" set of stops: for every kept stop and every distinct
//! departure time on one of its outgoing edges, a single-source search over
//! the *full* network finds the earliest arrival at every other stop. A
//! reached stop only gets a direct simplified edge if no *other* kept stop
//! lies on the breadcrumb path between the search origin and it — passing
//! through another target first makes the longer edge redundant with the two
//! shorter ones that target's own search will produce.

use std::collections::BinaryHeap;

use thiserror::Error;

use crate::problem::Problem;
use crate::schedule::{self, Segment, ANYTIME_TRIP};
use crate::time::Time;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A segment with distinct departure/arrival trip indices reached the
    /// simplifier. Simplification assumes simple, single-trip segments;
    /// composed multi-trip segments must be unfolded upstream.
    #[error(
        "unsupported multi-trip segment at stop {stop}: departure trip {departure_trip} != arrival trip {arrival_trip}"
    )]
    UnsupportedMultiTripSegment {
        stop: u32,
        departure_trip: u32,
        arrival_trip: u32,
    },
}

/// Per-reached-stop breadcrumb: how we got here, and on what trip.
#[derive(Debug, Clone, Copy)]
struct Reached {
    arrival: Time,
    predecessor: u32,
    trip: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapEntry {
    arrival: Time,
    stop: u32,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.arrival.cmp(&self.arrival)
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds the best (earliest-arriving) segment departing at or after
/// `earliest`, among `segments` (sorted by [`schedule::segment_order`]),
/// never considering one departing at or after `bound` — since segments are
/// sorted by departure and arrival ≥ departure, such a segment could not
/// possibly beat an arrival already known to be `bound` or earlier.
fn relax_segments(segments: &[Segment], earliest: Time, bound: Time) -> Option<&Segment> {
    let start = segments.partition_point(|s| s.departure < earliest);
    let mut best: Option<&Segment> = None;
    for segment in &segments[start..] {
        if segment.departure >= bound {
            break;
        }
        if best.is_none_or(|b| segment.arrival < b.arrival) {
            best = Some(segment);
        }
    }
    best
}

/// Runs one time-expanded Dijkstra from `origin` departing at `start`, over
/// the full `problem`, terminating early once every kept stop is settled.
fn dijkstra(problem: &Problem, origin: u32, start: Time, is_kept: &[bool]) -> Result<Vec<Option<Reached>>, Error> {
    let stop_count = problem.stop_count();
    let mut reached: Vec<Option<Reached>> = vec![None; stop_count];
    let mut best_arrival = vec![Time::from_seconds(u32::MAX); stop_count];
    let mut settled = vec![false; stop_count];
    let mut heap = BinaryHeap::new();

    let mut remaining_kept = is_kept.iter().filter(|&&k| k).count();
    if is_kept[origin as usize] {
        remaining_kept -= 1;
    }

    best_arrival[origin as usize] = start;
    heap.push(HeapEntry {
        arrival: start,
        stop: origin,
    });

    while let Some(HeapEntry { arrival, stop }) = heap.pop() {
        if settled[stop as usize] {
            continue;
        }
        settled[stop as usize] = true;
        if is_kept[stop as usize] && stop != origin {
            remaining_kept -= 1;
            if remaining_kept == 0 {
                break;
            }
        }

        for edge in &problem.edges[stop as usize] {
            let destination = edge.destination as usize;
            let mut bound = best_arrival[destination];
            let mut candidate: Option<(Time, u32)> = None;

            if let Some(anytime) = edge.schedule.anytime {
                let via_anytime = arrival + anytime;
                if via_anytime < bound {
                    candidate = Some((via_anytime, ANYTIME_TRIP));
                    bound = via_anytime;
                }
            }

            if let Some(segment) = relax_segments(&edge.schedule.segments, arrival, bound) {
                if segment.departure_trip_index != segment.arrival_trip_index {
                    return Err(Error::UnsupportedMultiTripSegment {
                        stop: edge.destination,
                        departure_trip: segment.departure_trip_index,
                        arrival_trip: segment.arrival_trip_index,
                    });
                }
                if candidate.is_none_or(|(t, _)| segment.arrival < t) {
                    candidate = Some((segment.arrival, segment.departure_trip_index));
                }
            }

            if let Some((candidate_arrival, trip)) = candidate {
                if candidate_arrival < best_arrival[destination] {
                    best_arrival[destination] = candidate_arrival;
                    reached[destination] = Some(Reached {
                        arrival: candidate_arrival,
                        predecessor: stop,
                        trip,
                    });
                    heap.push(HeapEntry {
                        arrival: candidate_arrival,
                        stop: edge.destination,
                    });
                }
            }
        }
    }

    Ok(reached)
}

/// Walks the breadcrumb chain from `destination` back to `origin`. Returns
/// `None` if `destination` was never reached, or if some *other* kept stop
/// lies strictly between `origin` and `destination` on the path (in which
/// case a direct edge would bypass that target and is not emitted).
/// Otherwise returns the ordered sequence of distinct trips used.
fn trips_if_direct(reached: &[Option<Reached>], is_kept: &[bool], origin: u32, destination: u32) -> Option<Vec<u32>> {
    let mut trips = Vec::new();
    let mut current = destination;
    loop {
        let state = reached[current as usize]?;
        trips.push(state.trip);
        current = state.predecessor;
        if current == origin {
            trips.reverse();
            return Some(trips);
        }
        if is_kept[current as usize] {
            return None;
        }
    }
}

fn dedup_consecutive(trips: Vec<u32>) -> Vec<u32> {
    let mut out: Vec<u32> = Vec::with_capacity(trips.len());
    for trip in trips {
        if out.last() != Some(&trip) {
            out.push(trip);
        }
    }
    out
}

/// Simplifies `problem` down to the stops named in `keep_stop_ids`, in the
/// order supplied. Every distinct departure time on an outgoing edge of a
/// kept stop seeds one time-expanded Dijkstra over the full network; any
/// kept stop reached without passing through another kept stop first
/// becomes the destination of a new, direct edge from the search origin.
pub fn simplify_problem(problem: &Problem, keep_stop_ids: &[impl AsRef<str>]) -> Result<Problem, Error> {
    let keep_indices: Vec<u32> = keep_stop_ids
        .iter()
        .filter_map(|id| problem.stop_index(id.as_ref()))
        .collect();

    let mut is_kept = vec![false; problem.stop_count()];
    for &k in &keep_indices {
        is_kept[k as usize] = true;
    }

    let mut simplified = Problem::default();
    simplified.adopt_trip_table(problem);
    let new_index: Vec<u32> = keep_indices
        .iter()
        .map(|&old| simplified.register_stop(problem.stop_id(old)))
        .collect();

    for (from_pos, &kept) in keep_indices.iter().enumerate() {
        let mut departures: Vec<Time> = problem.edges[kept as usize]
            .iter()
            .flat_map(|edge| edge.schedule.segments.iter().map(|s| s.departure))
            .collect();
        departures.sort_unstable();
        departures.dedup();

        for &start in &departures {
            let reached = dijkstra(problem, kept, start, &is_kept)?;

            for (to_pos, &destination) in keep_indices.iter().enumerate() {
                if destination == kept {
                    continue;
                }
                let Some(trips) = trips_if_direct(&reached, &is_kept, kept, destination) else {
                    continue;
                };
                let arrival = reached[destination as usize].unwrap().arrival;

                let mut segment = Segment::new(start, arrival, ANYTIME_TRIP);
                let via = dedup_consecutive(trips);
                if let [single] = via.as_slice() {
                    segment.departure_trip_index = *single;
                    segment.arrival_trip_index = *single;
                } else {
                    segment.departure_trip_index = *via.first().unwrap_or(&ANYTIME_TRIP);
                    segment.arrival_trip_index = *via.last().unwrap_or(&ANYTIME_TRIP);
                }
                segment.via_trips = Some(via);

                let edge = simplified.edge_mut(new_index[from_pos], new_index[to_pos]);
                edge.schedule.segments.push(segment);
            }
        }
    }

    for stop_edges in &mut simplified.edges {
        for edge in stop_edges.iter_mut() {
            edge.schedule.segments.sort_by(schedule::segment_order);
            schedule::erase_non_minimal(&mut edge.schedule);
        }
    }

    Ok(simplified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::build_problem;
    use crate::time::Duration;
    use crate::world::{Stop, World, WorldSegment};
    use std::sync::Arc;

    fn chain_world() -> World {
        let mut world = World::new();
        world.add_stop(Stop::new("A", "A"));
        world.add_stop(Stop::new("B", "B"));
        world.add_stop(Stop::new("C", "C"));
        world.add_segment(WorldSegment {
            origin_stop_id: Arc::from("A"),
            destination_stop_id: Arc::from("B"),
            departure: Time::from_seconds(0),
            duration: Duration::from_seconds(300),
            trip_id: Arc::from("t1"),
        });
        world.add_segment(WorldSegment {
            origin_stop_id: Arc::from("B"),
            destination_stop_id: Arc::from("C"),
            departure: Time::from_seconds(400),
            duration: Duration::from_seconds(300),
            trip_id: Arc::from("t2"),
        });
        world
    }

    #[test]
    fn simplifies_chain_to_direct_edge_between_kept_endpoints() {
        let world = chain_world();
        let problem = build_problem(&world);
        let simplified = simplify_problem(&problem, &["A", "C"]).unwrap();
        assert_eq!(simplified.stop_count(), 2);
        let a = simplified.stop_index("A").unwrap();
        let c = simplified.stop_index("C").unwrap();
        let edge = simplified.edge(a, c).unwrap();
        assert_eq!(edge.schedule.segments.len(), 1);
        assert_eq!(edge.schedule.segments[0].arrival, Time::from_seconds(700));
        assert_eq!(edge.schedule.segments[0].departure, Time::from_seconds(0));
    }

    #[test]
    fn keeps_exactly_the_requested_stops() {
        let world = chain_world();
        let problem = build_problem(&world);
        let simplified = simplify_problem(&problem, &["A", "C"]).unwrap();
        assert!(simplified.stop_index("B").is_none());
        assert_eq!(simplified.stop_count(), 2);
    }

    #[test]
    fn does_not_bypass_an_intermediate_kept_stop() {
        let world = chain_world();
        let problem = build_problem(&world);
        let simplified = simplify_problem(&problem, &["A", "B", "C"]).unwrap();
        let a = simplified.stop_index("A").unwrap();
        let c = simplified.stop_index("C").unwrap();
        // B sits between A and C and is kept, so A's search must not emit a
        // direct A->C edge: that would bypass the target B.
        assert!(simplified.edge(a, c).is_none());
        let b = simplified.stop_index("B").unwrap();
        assert!(simplified.edge(a, b).is_some());
        assert!(simplified.edge(b, c).is_some());
    }

    #[test]
    fn anytime_only_world_produces_anytime_edge() {
        let mut world = World::new();
        world.add_stop(Stop::new("A", "A"));
        world.add_stop(Stop::new("B", "B"));
        world.add_anytime_connection("A", "B", Duration::from_seconds(600));
        let problem = build_problem(&world);
        // No scheduled departures exist on A's outgoing edge, so the
        // per-departure sweep finds nothing to seed a search from: this
        // simplifier only discovers schedule-bearing edges.
        let simplified = simplify_problem(&problem, &["A", "B"]).unwrap();
        assert_eq!(simplified.stop_count(), 2);
    }

    #[test]
    fn rejects_a_genuinely_multi_trip_segment() {
        let mut problem = Problem::default();
        let a = problem.register_stop("A");
        let b = problem.register_stop("B");
        let t1 = problem.register_trip("t1");
        let t2 = problem.register_trip("t2");
        let edge = problem.edge_mut(a, b);
        let mut segment = Segment::new(Time::from_seconds(0), Time::from_seconds(300), t1);
        segment.arrival_trip_index = t2;
        edge.schedule.segments.push(segment);

        let is_kept = vec![true; problem.stop_count()];
        let err = dijkstra(&problem, a, Time::from_seconds(0), &is_kept).unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedMultiTripSegment {
                stop: b,
                departure_trip: t1,
                arrival_trip: t2,
            }
        );
    }
}
