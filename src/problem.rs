//! The dense, index-keyed working representation built once from a [`World`].
//!
//! A [`Problem`] replaces every stop/trip id with a contiguous `u32` index
//! (assigned in first-seen order) and groups all segments between the same
//! origin/destination pair into a single [`Schedule`] via the algebra in
//! [`crate::schedule`]. This is the structure every other component in this
//! crate — the simplifier, the walk enumerator, both solvers — operates on;
//! it is read-only once built and may be shared by reference across
//! concurrent searches (see [`crate::batch`]).

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::schedule::{self, Schedule, ANYTIME_TRIP};
use crate::world::World;

/// Reserved trip id for anytime connections; always assigned index
/// [`schedule::ANYTIME_TRIP`] by [`build_problem`].
pub const ANYTIME_TRIP_ID: &str = "anytime";

/// An edge owned by its origin stop's entry in [`Problem::edges`]: "go to
/// `destination`, and here is the minimal schedule for doing so".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub destination: u32,
    pub schedule: Schedule,
}

/// A plain projection of [`Problem::edges`] onto a stops-only graph, for
/// components (the walk enumerator) that only care about reachability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjacencyList {
    pub edges: Vec<Vec<u32>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    stop_id_to_index: HashMap<Arc<str>, u32>,
    stop_index_to_id: Vec<Arc<str>>,
    trip_id_to_index: HashMap<Arc<str>, u32>,
    trip_index_to_id: Vec<Arc<str>>,

    /// `edges[i]` are every edge originating at stop index `i`.
    pub edges: Vec<Vec<Edge>>,
    pub adjacency: AdjacencyList,
}

impl Problem {
    pub fn stop_count(&self) -> usize {
        self.stop_index_to_id.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trip_index_to_id.len()
    }

    pub fn stop_index(&self, id: &str) -> Option<u32> {
        self.stop_id_to_index.get(id).copied()
    }

    pub fn stop_id(&self, index: u32) -> &str {
        &self.stop_index_to_id[index as usize]
    }

    pub fn trip_index(&self, id: &str) -> Option<u32> {
        self.trip_id_to_index.get(id).copied()
    }

    pub fn trip_id(&self, index: u32) -> &str {
        &self.trip_index_to_id[index as usize]
    }

    pub fn edge(&self, origin: u32, destination: u32) -> Option<&Edge> {
        self.edges[origin as usize]
            .iter()
            .find(|edge| edge.destination == destination)
    }

    fn get_or_add_stop(&mut self, id: &Arc<str>) -> u32 {
        if let Some(&index) = self.stop_id_to_index.get(id.as_ref()) {
            return index;
        }
        let index = self.stop_index_to_id.len() as u32;
        self.stop_id_to_index.insert(id.clone(), index);
        self.stop_index_to_id.push(id.clone());
        self.edges.push(Vec::new());
        self.adjacency.edges.push(Vec::new());
        index
    }

    fn get_or_add_trip(&mut self, id: &Arc<str>) -> u32 {
        if let Some(&index) = self.trip_id_to_index.get(id.as_ref()) {
            return index;
        }
        let index = self.trip_index_to_id.len() as u32;
        self.trip_id_to_index.insert(id.clone(), index);
        self.trip_index_to_id.push(id.clone());
        index
    }

    fn get_or_add_edge(&mut self, origin: u32, destination: u32) -> &mut Edge {
        let pos = self.edges[origin as usize]
            .iter()
            .position(|edge| edge.destination == destination);
        let pos = pos.unwrap_or_else(|| {
            self.edges[origin as usize].push(Edge {
                destination,
                schedule: Schedule::empty(),
            });
            self.adjacency.edges[origin as usize].push(destination);
            self.edges[origin as usize].len() - 1
        });
        &mut self.edges[origin as usize][pos]
    }

    /// Registers a stop by id into a freshly-built `Problem`, for callers
    /// (the simplifier) constructing a new, smaller `Problem` whose stops
    /// are a subset of an existing one's.
    pub(crate) fn register_stop(&mut self, id: &str) -> u32 {
        let id: Arc<str> = Arc::from(id);
        self.get_or_add_stop(&id)
    }

    /// Like [`Self::register_stop`] but for trips.
    pub(crate) fn register_trip(&mut self, id: &str) -> u32 {
        let id: Arc<str> = Arc::from(id);
        self.get_or_add_trip(&id)
    }

    pub(crate) fn edge_mut(&mut self, origin: u32, destination: u32) -> &mut Edge {
        self.get_or_add_edge(origin, destination)
    }

    /// Adopts `source`'s trip table wholesale. Used by the simplifier: a
    /// simplified `Problem`'s segments carry `via_trips` entries that index
    /// into the *original* trip table, so the simplified `Problem` must
    /// resolve those same indices rather than starting a fresh one.
    pub(crate) fn adopt_trip_table(&mut self, source: &Problem) {
        self.trip_id_to_index = source.trip_id_to_index.clone();
        self.trip_index_to_id = source.trip_index_to_id.clone();
    }
}

/// Builds a [`Problem`] from a [`World`]: assigns stable, insertion-order
/// stop/trip indices (trip index [`ANYTIME_TRIP`] reserved for
/// `"anytime"`), groups every [`crate::world::WorldSegment`] and
/// [`crate::world::AnytimeConnection`] into per-(origin,destination)
/// schedules, and prunes each to minimality.
pub fn build_problem(world: &World) -> Problem {
    let mut problem = Problem::default();

    let anytime_trip_id: Arc<str> = Arc::from(ANYTIME_TRIP_ID);
    let anytime_index = problem.get_or_add_trip(&anytime_trip_id);
    debug_assert_eq!(anytime_index, ANYTIME_TRIP);

    for stop in &world.stops {
        problem.get_or_add_stop(&stop.id);
    }

    for segment in &world.segments {
        let origin = problem.get_or_add_stop(&segment.origin_stop_id);
        let destination = problem.get_or_add_stop(&segment.destination_stop_id);
        let trip_index = problem.get_or_add_trip(&segment.trip_id);
        let arrival = segment.departure + segment.duration;
        let edge = problem.get_or_add_edge(origin, destination);
        edge.schedule
            .segments
            .push(schedule::Segment::new(segment.departure, arrival, trip_index));
    }

    for connection in &world.anytime_connections {
        let origin = problem.get_or_add_stop(&connection.origin_stop_id);
        let destination = problem.get_or_add_stop(&connection.destination_stop_id);
        let edge = problem.get_or_add_edge(origin, destination);
        edge.schedule.anytime = Some(match edge.schedule.anytime {
            Some(existing) => existing.min(connection.duration),
            None => connection.duration,
        });
    }

    for stop_edges in &mut problem.edges {
        for edge in stop_edges.iter_mut() {
            edge.schedule.segments.sort_by(schedule::segment_order);
            schedule::erase_non_minimal(&mut edge.schedule);
        }
    }

    problem
}
