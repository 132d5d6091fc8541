//! Time-dependent schedule algebra.
//!
//! A [`Schedule`] is the minimal set of time-discriminating (departure,
//! arrival) [`Segment`]s that connect two stops, plus an optional always-on
//! "anytime" duration (a walk/bike fallback). This module is pure: sequential
//! composition ([`compose`]), alternative merging ([`merge`]), and
//! non-minimality pruning ([`erase_non_minimal`]) — nothing here touches a
//! `Problem`, a stop index, or a clock.
//!
//! Trip index `0` is reserved crate-wide to mean "this is an anytime
//! transition, not a scheduled one" (see [`crate::problem`]).

use serde::{Deserialize, Serialize};

use crate::time::{Duration, Time};

/// Trip index reserved for anytime transitions. A `Segment` has
/// `departure_trip_index == ANYTIME_TRIP` iff it represents one.
pub const ANYTIME_TRIP: u32 = 0;

/// One time-discriminating connection: board at `departure`, arrive at
/// `arrival`, having started on trip `departure_trip_index` and ended on
/// trip `arrival_trip_index`. `via_trips` records every distinct trip used
/// in between, when known (populated by the simplifier; absent on segments
/// built directly from a single `WorldSegment`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub departure: Time,
    pub arrival: Time,
    pub departure_trip_index: u32,
    pub arrival_trip_index: u32,
    pub via_trips: Option<Vec<u32>>,
}

impl Segment {
    pub fn new(departure: Time, arrival: Time, trip_index: u32) -> Self {
        Self {
            departure,
            arrival,
            departure_trip_index: trip_index,
            arrival_trip_index: trip_index,
            via_trips: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.arrival - self.departure
    }
}

/// The canonical order a `Schedule`'s segments must be sorted in: departure
/// ascending, ties broken by arrival descending. In this order,
/// [`erase_non_minimal`] reduces to a single right-to-left scan.
pub fn segment_order(a: &Segment, b: &Segment) -> std::cmp::Ordering {
    a.departure
        .cmp(&b.departure)
        .then_with(|| b.arrival.cmp(&a.arrival))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub segments: Vec<Segment>,
    pub anytime: Option<Duration>,
}

impl Schedule {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn anytime_only(duration: Duration) -> Self {
        Self {
            segments: Vec::new(),
            anytime: Some(duration),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.anytime.is_none()
    }

    fn anytime_or_infinite(&self) -> Duration {
        self.anytime.unwrap_or(Duration::INFINITE)
    }

    /// The scalar lower bound used to seed a TSP cost matrix: the shortest
    /// duration across every segment and the anytime fallback, or
    /// `Duration::INFINITE` if there is no connection at all.
    pub fn lower_bound(&self) -> Duration {
        self.segments
            .iter()
            .map(Segment::duration)
            .chain(self.anytime)
            .min()
            .unwrap_or(Duration::INFINITE)
    }
}

/// Scans `schedule.segments` (assumed sorted by [`segment_order`]) from
/// latest to earliest, tracking the best (smallest) arrival seen so far, and
/// drops any segment that is dominated by a later-departing-or-equal,
/// earlier-or-equal-arriving one — or whose duration meets or exceeds the
/// schedule's anytime fallback. The anytime component itself is never
/// removed: it is the always-available option, kept regardless of whether
/// any segment beats it.
pub fn erase_non_minimal(schedule: &mut Schedule) {
    let anytime = schedule.anytime_or_infinite();
    let mut best_arrival = Time::from_seconds(u32::MAX);
    let mut keep = vec![true; schedule.segments.len()];
    for (i, segment) in schedule.segments.iter().enumerate().rev() {
        if segment.arrival >= best_arrival || segment.duration() >= anytime {
            keep[i] = false;
        } else {
            best_arrival = segment.arrival;
        }
    }
    let mut it = keep.into_iter();
    schedule.segments.retain(|_| it.next().unwrap());
}

fn transfer_cost(a: &Segment, b: &Segment, min_transfer: Duration) -> Duration {
    if a.arrival_trip_index == b.departure_trip_index {
        Duration::ZERO
    } else {
        min_transfer
    }
}

/// Two-pointer sweep collecting every minimal connection between sorted
/// segment lists `a` and `b`: a pair `(a[i], b[j])` qualifies when `b[j]`
/// departs no earlier than `a[i]` arrives (plus a transfer, which is zero
/// when both legs share a trip index — no artificial layover is invented for
/// a passenger who stays seated) and no later segment of `a` could reach
/// `b[j]` just as well.
fn minimal_connections(a: &[Segment], b: &[Segment], min_transfer: Duration) -> Vec<Segment> {
    let mut result = Vec::new();
    let mut bi = 0usize;
    for (ai, seg_a) in a.iter().enumerate() {
        while bi < b.len()
            && b[bi].departure < seg_a.arrival + transfer_cost(seg_a, &b[bi], min_transfer)
        {
            bi += 1;
        }
        if bi == b.len() {
            break;
        }
        let next_is_worse = match a.get(ai + 1) {
            None => true,
            Some(next_a) => next_a.arrival + transfer_cost(next_a, &b[bi], min_transfer) > b[bi].departure,
        };
        if next_is_worse {
            result.push(Segment {
                departure: seg_a.departure,
                arrival: b[bi].arrival,
                departure_trip_index: seg_a.departure_trip_index,
                arrival_trip_index: b[bi].arrival_trip_index,
                via_trips: None,
            });
        }
    }
    result
}

/// Composes `a` then `b`: "take `a`, then take `b`". `min_transfer` is the
/// minimum time that must elapse between two segments that aren't on the
/// same trip.
///
/// Handles the anytime/segment cross terms independently of whether the
/// other side has any of its own: if `a` has an anytime duration `dA`, every
/// segment of `b` is reachable by walking `dA` then boarding it, so each
/// becomes a new segment departing `dA` earlier than `b`'s segment (with no
/// real departure trip — `departure_trip_index = ANYTIME_TRIP`). Symmetrically
/// for `b`'s anytime duration against `a`'s segments. If both sides have an
/// anytime duration, the composed anytime fallback is their sum.
pub fn compose(a: &Schedule, b: &Schedule, min_transfer: Duration) -> Schedule {
    let mut segments = Vec::with_capacity(a.segments.len() + b.segments.len());

    if let Some(da) = a.anytime {
        segments.extend(b.segments.iter().map(|seg| Segment {
            departure: seg.departure - da,
            arrival: seg.arrival,
            departure_trip_index: ANYTIME_TRIP,
            arrival_trip_index: seg.arrival_trip_index,
            via_trips: None,
        }));
    }
    if let Some(db) = b.anytime {
        segments.extend(a.segments.iter().map(|seg| Segment {
            departure: seg.departure,
            arrival: seg.arrival + db,
            departure_trip_index: seg.departure_trip_index,
            arrival_trip_index: ANYTIME_TRIP,
            via_trips: None,
        }));
    }
    segments.extend(minimal_connections(&a.segments, &b.segments, min_transfer));
    segments.sort_by(segment_order);

    let mut result = Schedule {
        segments,
        anytime: match (a.anytime, b.anytime) {
            (Some(da), Some(db)) => Some(da + db),
            _ => None,
        },
    };
    erase_non_minimal(&mut result);
    result
}

/// Merges `src` into `dest` as an alternative way to make the same
/// (origin, destination) connection: the anytime component becomes the
/// smaller of the two (absence treated as infinite), `src`'s segments are
/// appended, and the result is re-sorted and pruned to minimality.
pub fn merge(dest: &mut Schedule, src: &Schedule) {
    dest.anytime = match (dest.anytime, src.anytime) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(Duration::INFINITE).min(b.unwrap_or(Duration::INFINITE))),
    };
    dest.segments.extend(src.segments.iter().cloned());
    dest.segments.sort_by(segment_order);
    erase_non_minimal(dest);
}
