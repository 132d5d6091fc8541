//! Little's branch-and-bound TSP solver over a dense, reduced cost matrix.
//!
//! [`CostMatrix`] tracks active rows/columns and a linked-list of committed
//! chain endpoints so that premature tour closure can be forbidden in O(1);
//! [`little_tsp`] explores the branch tree with a best-first priority queue
//! interleaved with a greedy "right-dive" that tightens the upper bound early.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::{trace, warn};

use crate::dense::DenseProblem;

/// Sentinel cost meaning "no edge" / "forbidden" — forbidding the
/// premature-closure cell or excluding a branch both set this rather than
/// removing the cell, so the reduction pass can treat it uniformly.
pub const INFEASIBLE: u32 = u32::MAX;

/// A reduced TSP cost matrix with Little's active-row/column and committed-
/// chain bookkeeping. Cloned wholesale when the branch-and-bound search jumps
/// to a node that isn't a descendant of the currently-held matrix — rebuilt
/// from the initial reduction plus the parent chain, since reductions along
/// different paths don't commute and per-node copies would be unbounded at
/// the branch depths this search reaches.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    num_stops: usize,
    c: Vec<u32>,
    from_active: Vec<bool>,
    to_active: Vec<bool>,
    num_committed_edges: usize,
    linked_to: Vec<usize>,
    linked_from: Vec<usize>,
}

impl CostMatrix {
    pub fn from_costs(num_stops: usize, c: Vec<u32>) -> Self {
        assert_eq!(c.len(), num_stops * num_stops, "cost matrix must be num_stops x num_stops");
        Self {
            num_stops,
            c,
            from_active: vec![true; num_stops],
            to_active: vec![true; num_stops],
            num_committed_edges: 0,
            linked_to: (0..num_stops).collect(),
            linked_from: (0..num_stops).collect(),
        }
    }

    pub fn num_stops(&self) -> usize {
        self.num_stops
    }

    pub fn num_committed_edges(&self) -> usize {
        self.num_committed_edges
    }

    pub fn cost(&self, from: usize, to: usize) -> u32 {
        self.c[from * self.num_stops + to]
    }

    fn set_cost(&mut self, from: usize, to: usize, value: u32) {
        self.c[from * self.num_stops + to] = value;
    }

    /// The next active row index at or after `i`, or `num_stops` if none.
    pub fn next_from(&self, i: usize) -> usize {
        (i..self.num_stops).find(|&r| self.from_active[r]).unwrap_or(self.num_stops)
    }

    /// The next active column index at or after `i`, or `num_stops` if none.
    pub fn next_to(&self, i: usize) -> usize {
        (i..self.num_stops).find(|&c| self.to_active[c]).unwrap_or(self.num_stops)
    }

    /// Commits edge `(from, to)` as part of the tour: deactivates row `from`
    /// and column `to`, forbids the edge that would close the partial tour
    /// prematurely (from the new chain's far end back to its near end), and
    /// updates the chain's linked endpoints.
    pub fn commit_edge(&mut self, from: usize, to: usize) {
        let ultimate_to = self.linked_to[to];
        let ultimate_from = self.linked_from[from];

        self.linked_to[self.linked_from[from]] = ultimate_to;
        self.linked_from[self.linked_to[to]] = ultimate_from;

        self.set_cost(ultimate_to, ultimate_from, INFEASIBLE);

        self.from_active[from] = false;
        self.to_active[to] = false;
        self.num_committed_edges += 1;
    }

    pub fn exclude_edge(&mut self, from: usize, to: usize) {
        self.set_cost(from, to, INFEASIBLE);
    }
}

/// Scalar lower bounds seeded from a [`DenseProblem`]'s schedule closure:
/// `c[i,j] = entries[i,j].lower_bound()`, suitable for feeding directly into
/// [`little_tsp`].
pub fn cost_matrix_from_dense(dense: &DenseProblem) -> CostMatrix {
    let c: Vec<u32> = dense.entries.iter().map(|s| s.lower_bound().as_seconds()).collect();
    CostMatrix::from_costs(dense.num_stops, c)
}

/// Row-then-column min-subtraction reduction. Cells holding [`INFEASIBLE`]
/// are left untouched. Returns the total amount subtracted — the lower-bound
/// contribution of this reduction pass.
pub fn reduce(cost: &mut CostMatrix) -> u32 {
    let n = cost.num_stops;
    let mut reduction: u32 = 0;
    let mut to_min = vec![INFEASIBLE; n];

    let mut from = cost.next_from(0);
    while from < n {
        let mut min_cost = INFEASIBLE;
        let mut to = cost.next_to(0);
        while to < n {
            min_cost = min_cost.min(cost.cost(from, to));
            to = cost.next_to(to + 1);
        }
        debug_assert!(min_cost < INFEASIBLE, "an active row must have at least one active, finite cell");
        reduction += min_cost;

        let mut to = cost.next_to(0);
        while to < n {
            let v = cost.cost(from, to);
            if v < INFEASIBLE {
                let reduced = v - min_cost;
                cost.set_cost(from, to, reduced);
                if reduced < to_min[to] {
                    to_min[to] = reduced;
                }
            }
            to = cost.next_to(to + 1);
        }
        from = cost.next_from(from + 1);
    }

    let mut to = cost.next_to(0);
    while to < n {
        let min_cost = to_min[to];
        debug_assert!(min_cost < INFEASIBLE, "an active column must have at least one active, finite cell");
        reduction += min_cost;
        let mut from = cost.next_from(0);
        while from < n {
            let v = cost.cost(from, to);
            if v < INFEASIBLE {
                cost.set_cost(from, to, v - min_cost);
            }
            from = cost.next_from(from + 1);
        }
        to = cost.next_to(to + 1);
    }

    reduction
}

#[derive(Debug, Clone, Copy)]
struct SearchEdge {
    parent: usize,
    exclude: bool,
    from: usize,
    to: usize,
}

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    edge: Option<SearchEdge>,
    lb: u32,
    visited: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapEntry {
    lb: u32,
    node: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Smallest lb first: reverse the natural order of `lb`, but keep ties
        // broken by node index for determinism across runs.
        Reverse(self.lb).cmp(&Reverse(other.lb)).then(self.node.cmp(&other.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Rebuilds a reduced cost matrix at `node`: replays the include/exclude
/// chain from `initial_reduced` up to the root, then re-reduces. Reductions
/// along different paths don't commute, so `node.lb` is overwritten with
/// `initial_reduction + this path's reduction` — any tour passing through
/// this node is still bounded by that quantity, which is all correctness
/// requires.
fn rebuild_at(initial_reduced: &CostMatrix, nodes: &[SearchNode], node_index: usize) -> (CostMatrix, u32) {
    let mut cost = initial_reduced.clone();
    let mut chain = Vec::new();
    let mut cur = node_index;
    while let Some(edge) = nodes[cur].edge {
        chain.push(edge);
        cur = edge.parent;
    }

    let mut reduction = 0u32;
    for edge in chain.into_iter().rev() {
        if edge.exclude {
            cost.exclude_edge(edge.from, edge.to);
        } else {
            reduction += cost.cost(edge.from, edge.to);
            cost.commit_edge(edge.from, edge.to);
        }
    }
    reduction += reduce(&mut cost);
    (cost, reduction)
}

/// Finds the zero cell `(i, j)` maximizing Little's penalty theta: the cost
/// of *not* taking this edge, measured as the cheapest remaining option in
/// its row plus the cheapest remaining option in its column (0 if either
/// already has another zero). Ties favor the later-scanned cell, matching
/// the `>=` comparison of the reference branch-and-bound.
fn best_branch_cell(cost: &CostMatrix) -> Option<(usize, usize, u32)> {
    let n = cost.num_stops();
    let mut from_zeros = vec![0u32; n];
    let mut to_zeros = vec![0u32; n];
    let mut from_min_nonzero = vec![INFEASIBLE; n];
    let mut to_min_nonzero = vec![INFEASIBLE; n];

    let mut from = cost.next_from(0);
    while from < n {
        let mut to = cost.next_to(0);
        while to < n {
            let v = cost.cost(from, to);
            if v == 0 {
                from_zeros[from] += 1;
                to_zeros[to] += 1;
            } else {
                from_min_nonzero[from] = from_min_nonzero[from].min(v);
                to_min_nonzero[to] = to_min_nonzero[to].min(v);
            }
            to = cost.next_to(to + 1);
        }
        from = cost.next_from(from + 1);
    }

    let mut best: Option<(usize, usize, u32)> = None;
    let mut from = cost.next_from(0);
    while from < n {
        if from_zeros[from] > 0 {
            let mut to = cost.next_to(0);
            while to < n {
                if cost.cost(from, to) == 0 {
                    let min_from = if from_zeros[from] > 1 { 0 } else { from_min_nonzero[from] };
                    let min_to = if to_zeros[to] > 1 { 0 } else { to_min_nonzero[to] };
                    let theta = if min_from == INFEASIBLE || min_to == INFEASIBLE {
                        INFEASIBLE
                    } else {
                        min_from + min_to
                    };
                    if best.is_none_or(|(_, _, best_theta)| theta >= best_theta) {
                        best = Some((from, to, theta));
                    }
                }
                to = cost.next_to(to + 1);
            }
        }
        from = cost.next_from(from + 1);
    }
    best
}

/// Number of branch-and-bound steps between forced "right-dives": greedy
/// include-only descents to a leaf, re-armed periodically to keep tightening
/// the upper bound against the best-first queue's breadth.
const RIGHT_DIVE_INTERVAL: u32 = 10_000;

/// A safety valve on total branch-and-bound steps: this solver never
/// internally cancels or times out on its own, so this is an escape hatch an
/// embedder can raise or lower, not a heuristic — on exhaustion the best
/// bound found so far is returned, which is still a valid (if possibly
/// non-optimal) bound.
const STEP_CAP: u32 = 2_000_000;

/// Runs Little's branch-and-bound algorithm over `initial`, returning the
/// optimal cyclic tour cost, or [`INFEASIBLE`] if no feasible tour exists.
pub fn little_tsp(initial: &CostMatrix) -> u32 {
    let num_stops = initial.num_stops();
    let mut initial_reduced = initial.clone();
    let initial_reduction = reduce(&mut initial_reduced);

    let mut nodes = vec![SearchNode {
        edge: None,
        lb: initial_reduction,
        visited: false,
    }];
    let mut heap = BinaryHeap::new();
    heap.push(HeapEntry { lb: nodes[0].lb, node: 0 });

    let mut cost = initial_reduced.clone();
    let mut cost_for_node = 0usize;
    let mut right_mode = true;
    let mut ub = INFEASIBLE;
    let mut steps = 0u32;

    loop {
        let top_index = if right_mode {
            let mut i = nodes.len() - 1;
            while i > 0 && (nodes[i].visited || nodes[i].edge.is_some_and(|e| e.exclude)) {
                i -= 1;
            }
            if i == 0 && nodes[i].visited {
                right_mode = false;
                continue;
            }
            i
        } else {
            match heap.pop() {
                Some(entry) => entry.node,
                None => break,
            }
        };

        if nodes[top_index].visited {
            continue;
        }
        nodes[top_index].visited = true;
        let mut top = nodes[top_index];

        if top.lb >= ub {
            return ub;
        }

        steps += 1;
        if steps >= STEP_CAP {
            warn!(steps, ub, "little_tsp: branch-and-bound step cap reached before convergence");
            break;
        }
        if steps % RIGHT_DIVE_INTERVAL == 0 {
            right_mode = true;
        }

        if top_index != cost_for_node {
            let (rebuilt, reduction) = rebuild_at(&initial_reduced, &nodes, top_index);
            cost = rebuilt;
            top.lb = initial_reduction + reduction;
            nodes[top_index].lb = top.lb;
        }

        if cost.num_committed_edges() == num_stops - 2 {
            if top.lb < ub {
                ub = top.lb;
                trace!(ub, "little_tsp: improved upper bound");
            }
            if right_mode {
                right_mode = false;
            }
            continue;
        }

        let Some((best_from, best_to, theta)) = best_branch_cell(&cost) else {
            continue;
        };

        if theta < INFEASIBLE && top.lb + theta < ub {
            nodes.push(SearchNode {
                edge: Some(SearchEdge {
                    parent: top_index,
                    exclude: true,
                    from: best_from,
                    to: best_to,
                }),
                lb: top.lb + theta,
                visited: false,
            });
            let idx = nodes.len() - 1;
            heap.push(HeapEntry { lb: nodes[idx].lb, node: idx });
        }

        cost.commit_edge(best_from, best_to);
        let branch_reduction = reduce(&mut cost);
        if top.lb + branch_reduction < ub {
            nodes.push(SearchNode {
                edge: Some(SearchEdge {
                    parent: top_index,
                    exclude: false,
                    from: best_from,
                    to: best_to,
                }),
                lb: top.lb + branch_reduction,
                visited: false,
            });
            let idx = nodes.len() - 1;
            heap.push(HeapEntry { lb: nodes[idx].lb, node: idx });
            cost_for_node = idx;
        }
    }

    ub
}

#[cfg(test)]
mod tests {
    use super::*;

    const INF: u32 = INFEASIBLE;

    #[test]
    fn hand_example_4x4_returns_11() {
        #[rustfmt::skip]
        let c = vec![
            INF, 5,   7,   3,
            2,   INF, 1,   9,
            8,   4,   INF, 4,
            1,   3,   2,   INF,
        ];
        let cost = CostMatrix::from_costs(4, c);
        assert_eq!(little_tsp(&cost), 11);
    }

    #[test]
    fn reducing_an_already_reduced_matrix_subtracts_zero() {
        #[rustfmt::skip]
        let c = vec![
            INF, 5,   7,   3,
            2,   INF, 1,   9,
            8,   4,   INF, 4,
            1,   3,   2,   INF,
        ];
        let mut cost = CostMatrix::from_costs(4, c);
        let first = reduce(&mut cost);
        assert!(first > 0);
        let second = reduce(&mut cost);
        assert_eq!(second, 0);
    }

    fn brute_force_min_cycle(n: usize, c: &[u32]) -> u32 {
        let mut perm: Vec<usize> = (1..n).collect();
        let mut best = INFEASIBLE;
        loop {
            let mut total = 0u64;
            let mut prev = 0usize;
            let mut feasible = true;
            for &next in &perm {
                let edge = c[prev * n + next];
                if edge == INFEASIBLE {
                    feasible = false;
                    break;
                }
                total += edge as u64;
                prev = next;
            }
            if feasible {
                let closing = c[prev * n + 0];
                if closing != INFEASIBLE {
                    total += closing as u64;
                    if total < best as u64 {
                        best = total as u32;
                    }
                }
            }
            if !next_permutation(&mut perm) {
                break;
            }
        }
        best
    }

    fn next_permutation(arr: &mut [usize]) -> bool {
        if arr.len() < 2 {
            return false;
        }
        let mut i = arr.len() - 1;
        while i > 0 && arr[i - 1] >= arr[i] {
            i -= 1;
        }
        if i == 0 {
            return false;
        }
        let mut j = arr.len() - 1;
        while arr[j] <= arr[i - 1] {
            j -= 1;
        }
        arr.swap(i - 1, j);
        arr[i..].reverse();
        true
    }

    // Small xorshift so the cross-check is reproducible without depending on
    // a `rand` crate the rest of this library has no other use for.
    struct Xorshift(u64);
    impl Xorshift {
        fn next_u32(&mut self) -> u32 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            (self.0 >> 32) as u32
        }
    }

    #[test]
    fn matches_brute_force_on_random_8x8_matrices() {
        let mut rng = Xorshift(0x1234_5678_9abc_def1);
        for _ in 0..30 {
            let n = 8;
            let mut c = vec![0u32; n * n];
            for i in 0..n {
                for j in 0..n {
                    c[i * n + j] = if i == j { INF } else { rng.next_u32() % 10 };
                }
            }
            let cost = CostMatrix::from_costs(n, c.clone());
            let got = little_tsp(&cost);
            let want = brute_force_min_cycle(n, &c);
            assert_eq!(got, want, "matrix {:?}", c);
        }
    }
}
