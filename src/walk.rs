//! Minimal-walk enumerator: a depth-first search over a plain stop graph
//! that yields every walk covering a target set, with no detour that could
//! be excised while still covering it. A walk ends the instant it first
//! covers every target — it need not return to its start stop.
//!
//! This is pure graph search — no time, no schedule, no trip. The DFS is
//! abstracted over a [`Visitor`] so that a caller can either just collect
//! walks ([`Collector`]) or drive a richer incremental computation alongside
//! the traversal (`crate::solver::Solver`), all via static dispatch: no
//! `dyn Visitor` is needed anywhere in this crate.

/// Bound on the number of target stops a single search can track, fixed so
/// the visited/loop-abort bitsets fit in a `u64`.
pub const MAX_TARGETS: usize = 64;

/// The capability set the DFS drives during traversal. `push_stop` may
/// return `false` to prune the current branch before it is explored any
/// further (still paired with a `pop_stop`, exactly as if the branch had
/// been fully explored and backtracked).
pub trait Visitor {
    fn push_stop(&mut self, stop: u32) -> bool;
    fn pop_stop(&mut self);
    fn walk_done(&mut self);
}

/// Records every emitted walk as a `Vec<u32>` of stops in visitation order,
/// ending on the stop that completed coverage of the target set. Never
/// prunes.
#[derive(Debug, Default)]
pub struct Collector {
    pub walks: Vec<Vec<u32>>,
    current: Vec<u32>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Visitor for Collector {
    fn push_stop(&mut self, stop: u32) -> bool {
        self.current.push(stop);
        true
    }

    fn pop_stop(&mut self) {
        self.current.pop();
    }

    fn walk_done(&mut self) {
        self.walks.push(self.current.clone());
    }
}

/// Per-stop DFS bookkeeping shared across one `start`'s search:
/// `visited_at_stop[v]` is the target-visited bitset recorded the last time
/// the search was at `v`, and `loop_aborts` is a stack of "targets visited
/// since we last saw this stop" bitsets — when one goes empty against the
/// target mask, the current path closed an unproductive loop.
struct DfsState {
    visited_at_stop: Vec<u64>,
    loop_aborts: Vec<u64>,
}

#[allow(clippy::too_many_arguments)]
fn visit<V: Visitor>(
    visitor: &mut V,
    adjacency: &[Vec<u32>],
    target_bit: &[Option<u8>],
    target_mask: u64,
    state: &mut DfsState,
    current_stop: u32,
    current_visited: u64,
) {
    if !visitor.push_stop(current_stop) {
        visitor.pop_stop();
        return;
    }

    if current_visited == target_mask {
        visitor.walk_done();
        visitor.pop_stop();
        return;
    }

    let old_loop_aborts = state.loop_aborts.clone();
    let old_visited_at_current = state.visited_at_stop[current_stop as usize];
    state.visited_at_stop[current_stop as usize] = current_visited;
    if old_visited_at_current != 0 {
        state.loop_aborts.push(current_visited & !old_visited_at_current);
    }

    for loop_abort in state.loop_aborts.iter_mut() {
        *loop_abort &= !bit_for(current_stop, target_bit);
        if *loop_abort == 0 {
            state.visited_at_stop[current_stop as usize] = old_visited_at_current;
            state.loop_aborts = old_loop_aborts;
            visitor.pop_stop();
            return;
        }
    }

    for &next_stop in &adjacency[current_stop as usize] {
        let next_visited = current_visited | bit_for(next_stop, target_bit);
        visit(
            visitor,
            adjacency,
            target_bit,
            target_mask,
            state,
            next_stop,
            next_visited,
        );
    }

    state.visited_at_stop[current_stop as usize] = old_visited_at_current;
    state.loop_aborts = old_loop_aborts;
    visitor.pop_stop();
}

fn bit_for(stop: u32, target_bit: &[Option<u8>]) -> u64 {
    match target_bit[stop as usize] {
        Some(bit) => 1u64 << bit,
        None => 0,
    }
}

/// Runs the minimal-walk DFS once per start stop in `targets`, over
/// `adjacency` (indexed by stop, listing reachable neighbor stops), driving
/// `visitor` on every stop push/pop and on every emitted walk.
///
/// `targets.len()` must not exceed [`MAX_TARGETS`]; this is an invariant
/// violation (a caller bug), not recoverable input.
pub fn find_minimal_walks<V: Visitor>(adjacency: &[Vec<u32>], targets: &[u32], visitor: &mut V) {
    debug_assert!(
        targets.len() <= MAX_TARGETS,
        "target set exceeds the {MAX_TARGETS}-stop bitset width"
    );

    let mut target_bit = vec![None; adjacency.len()];
    for (bit, &stop) in targets.iter().enumerate() {
        target_bit[stop as usize] = Some(bit as u8);
    }
    let target_mask = if targets.is_empty() {
        0
    } else if targets.len() == 64 {
        u64::MAX
    } else {
        (1u64 << targets.len()) - 1
    };

    for &start in targets {
        let mut state = DfsState {
            visited_at_stop: vec![0u64; adjacency.len()],
            loop_aborts: Vec::new(),
        };
        let start_visited = bit_for(start, &target_bit);
        visit(
            visitor,
            adjacency,
            &target_bit,
            target_mask,
            &mut state,
            start,
            start_visited,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Checks the formal definition directly: `walk` covers every stop in
    /// `targets`, and for every pair of indices `i < j` with `walk[i] ==
    /// walk[j]`, some target appears in `walk[i+1..=j]` that appears nowhere
    /// else in `walk` outside that span — i.e. the revisit is justified and
    /// cannot be excised.
    fn is_minimal_covering_walk(walk: &[u32], targets: &[u32]) -> bool {
        let target_set: std::collections::HashSet<u32> = targets.iter().copied().collect();
        if !target_set.iter().all(|t| walk.contains(t)) {
            return false;
        }
        for i in 0..walk.len() {
            for j in (i + 1)..walk.len() {
                if walk[i] != walk[j] {
                    continue;
                }
                let exclusive_to_excursion = walk[i + 1..=j].iter().any(|s| {
                    target_set.contains(s) && !walk[..=i].contains(s) && !walk[j + 1..].contains(s)
                });
                if !exclusive_to_excursion {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn four_cycle_emits_only_minimal_covering_open_walks() {
        // 0 - 1 - 2 - 3 - 0, bidirectional. The enumerator stops a walk the
        // instant it first covers every target, so walks here are open (no
        // repeated closing stop) unless a detour happens to revisit one.
        let adjacency = vec![vec![1, 3], vec![0, 2], vec![1, 3], vec![2, 0]];
        let targets = vec![0, 1, 2, 3];
        let mut collector = Collector::new();
        find_minimal_walks(&adjacency, &targets, &mut collector);

        for walk in &collector.walks {
            assert!(
                is_minimal_covering_walk(walk, &targets),
                "walk {walk:?} is not a minimal covering walk"
            );
        }

        // Going straight around the ring either direction is always minimal.
        assert!(collector.walks.contains(&vec![0, 1, 2, 3]));
        assert!(collector.walks.contains(&vec![0, 3, 2, 1]));

        // But it isn't the only shape: e.g. from start 0, detouring 0 -> 1 -> 0
        // picks up target 1 before continuing 0 -> 3 -> 2, and that revisit of
        // 0 is justified (1 was visited only during the excursion), so more
        // than the two direct ring traversals survive.
        assert!(collector.walks.contains(&vec![0, 1, 0, 3, 2]));
        assert!(collector.walks.len() > 2);
    }

    #[test]
    fn tree_emits_every_minimal_excursion_order() {
        // 0 - 1, 0 - 2, bidirectional star. The driver starts a search from
        // every target, so both stops 1 and 2 also seed their own walks, not
        // just the one rooted at 0.
        let adjacency = vec![vec![1, 2], vec![0], vec![0]];
        let targets = vec![0, 1, 2];
        let mut collector = Collector::new();
        find_minimal_walks(&adjacency, &targets, &mut collector);

        assert!(collector.walks.contains(&vec![0, 1, 0, 2]));
        assert!(collector.walks.contains(&vec![0, 2, 0, 1]));
        assert!(collector.walks.contains(&vec![1, 0, 2]));
        assert!(collector.walks.contains(&vec![2, 0, 1]));
        assert_eq!(collector.walks.len(), 4);
    }

    struct PruneAfterFirstPush {
        pushes: usize,
    }

    impl Visitor for PruneAfterFirstPush {
        fn push_stop(&mut self, _stop: u32) -> bool {
            self.pushes += 1;
            self.pushes <= 1
        }
        fn pop_stop(&mut self) {}
        fn walk_done(&mut self) {
            panic!("walk_done must not fire once the root branch is pruned");
        }
    }

    #[test]
    fn returning_false_from_push_stop_prunes_the_branch() {
        let adjacency = vec![vec![1], vec![0]];
        let targets = vec![0, 1];
        let mut visitor = PruneAfterFirstPush { pushes: 0 };
        find_minimal_walks(&adjacency, &targets, &mut visitor);
        // One push per start stop (0 and 1), each immediately pruned.
        assert_eq!(visitor.pushes, 2);
    }
}
