//! The raw, string-keyed transit network as supplied by an external collaborator.
//!
//! A [`World`] is the input to [`crate::problem::build_problem`]. Everything
//! in this module is plain, immutable-after-construction data: no indices, no
//! algebra, no search. GTFS ingestion, calendar/service-day resolution, and
//! coordinate handling are out of scope for this crate — a collaborator is
//! expected to populate a `World` however it sees fit (tests in this crate
//! build one directly; the CLI in `crates/cli` loads one from JSON).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::time::{Duration, Time};

/// A physical stop. `parent_station` is `None` for root stops — the only
/// stops [`WorldSegment`] and [`AnytimeConnection`] may reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub parent_station: Option<Arc<str>>,
}

impl Stop {
    pub fn new(id: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_station: None,
        }
    }
}

/// A scheduled stop on a trip: arrival and departure never disagree in
/// direction (arrival ≤ departure), and across a trip's ordered stops,
/// arrivals are monotonically non-decreasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripStopTime {
    pub stop_id: Arc<str>,
    pub arrival: Time,
    pub departure: Time,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Arc<str>,
    pub route_id: Arc<str>,
    pub stop_times: Vec<TripStopTime>,
}

/// A single scheduled edge between two consecutive "segment stops" along a
/// trip. `duration` is non-negative; `origin_stop_id != destination_stop_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSegment {
    pub origin_stop_id: Arc<str>,
    pub destination_stop_id: Arc<str>,
    pub departure: Time,
    pub duration: Duration,
    pub trip_id: Arc<str>,
}

/// A walk/bike fallback, always available regardless of time of day. Callers
/// are expected to insert both directions; [`World::add_anytime_connection`]
/// does this for you.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnytimeConnection {
    pub origin_stop_id: Arc<str>,
    pub destination_stop_id: Arc<str>,
    pub duration: Duration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    pub stops: Vec<Stop>,
    pub trips: Vec<Trip>,
    pub segments: Vec<WorldSegment>,
    pub anytime_connections: Vec<AnytimeConnection>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stop(&mut self, stop: Stop) -> &mut Self {
        self.stops.push(stop);
        self
    }

    pub fn add_trip(&mut self, trip: Trip) -> &mut Self {
        self.trips.push(trip);
        self
    }

    pub fn add_segment(&mut self, segment: WorldSegment) -> &mut Self {
        self.segments.push(segment);
        self
    }

    /// Inserts `duration`-long anytime connections in both directions
    /// between `a` and `b`, per the data model invariant that anytime
    /// connections are always reciprocal.
    pub fn add_anytime_connection(
        &mut self,
        a: impl Into<Arc<str>>,
        b: impl Into<Arc<str>>,
        duration: Duration,
    ) -> &mut Self {
        let a = a.into();
        let b = b.into();
        self.anytime_connections.push(AnytimeConnection {
            origin_stop_id: a.clone(),
            destination_stop_id: b.clone(),
            duration,
        });
        self.anytime_connections.push(AnytimeConnection {
            origin_stop_id: b,
            destination_stop_id: a,
            duration,
        });
        self
    }
}
