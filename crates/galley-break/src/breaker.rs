//! The breakpoint search: an active-node dynamic program over candidate
//! breakpoints.
//!
//! The search walks the item stream once. At every legal breakpoint it
//! tries to end a line at each *active node* (a reachable DP state), prunes
//! nodes that can never become feasible again, and records the surviving
//! candidates as new active nodes for the following positions. DP states
//! are compared by value: `(item index, pseudo-line index, fitness class)`.
//! Equal-valued states are the same node, which is what bounds the state
//! space when line lengths repeat.
//!
//! Nodes live in an arena (a growable vector) with an index keyed by state
//! value; predecessor links are arena indices, so the whole graph is
//! dropped with the arena when the search returns. All tie-breaks are pure
//! functions of the competing states, never of iteration order, so the
//! result is reproducible regardless of hash-map internals.

use std::collections::hash_map::Entry;
use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use galley_units::{Distance, Ratio};

use crate::criteria::{Demerits, FitnessClass, OptimalityCriteria};
use crate::item_list::ItemList;
use crate::line_lengths::LineLengths;

// =========================================================================
// BreakpointNode
// =========================================================================

/// A DP state of the breakpoint search.
///
/// `item_index` is `-1` for the synthetic start-of-paragraph seed, and the
/// seed's pseudo-line index is `-1` ("before the first line").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakpointNode {
    /// Index of the item broken at, or `-1` for the seed.
    pub item_index: i64,
    /// Pseudo-index of the line ending at this break.
    pub line: i64,
    /// Fitness class of the line ending at this break.
    pub fitness: FitnessClass,
}

impl BreakpointNode {
    const SEED: Self = Self {
        item_index: -1,
        line: -1,
        fitness: FitnessClass::Decent,
    };

    /// Deterministic tie-break key: item index, then fitness, then line.
    #[inline]
    const fn order_key(self) -> (i64, i8, i64) {
        (self.item_index, self.fitness.value(), self.line)
    }
}

impl fmt::Display for BreakpointNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(item {}, line {}, {})", self.item_index, self.line, self.fitness)
    }
}

// =========================================================================
// SearchObserver
// =========================================================================

/// Diagnostic hook notified of every admissible edge the search evaluates,
/// including edges that later lose to a cheaper predecessor.
///
/// Observers are side channels: their presence must not change search
/// outcomes.
pub trait SearchObserver {
    /// An edge from active node `from` to candidate `to` was evaluated with
    /// the given adjustment ratio, incremental demerits, and path total.
    fn edge(
        &mut self,
        from: BreakpointNode,
        to: BreakpointNode,
        ratio: Ratio,
        incremental: Demerits,
        total: Demerits,
    );
}

// =========================================================================
// NoSolution
// =========================================================================

/// The search exhausted the item stream with an empty active set: no
/// breakpoint sequence satisfies the maximum adjustment ratio. Retrying
/// requires the caller to relax the criteria and invoke the search again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoSolution;

impl fmt::Display for NoSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no admissible breakpoint sequence under the given optimality criteria"
        )
    }
}

impl std::error::Error for NoSolution {}

// =========================================================================
// search
// =========================================================================

/// Arena-backed DP records. Parallel vectors indexed by arena position; the
/// map deduplicates equal-valued states within a position.
struct Dp {
    arena: Vec<BreakpointNode>,
    index: FxHashMap<BreakpointNode, usize>,
    predecessor: Vec<Option<usize>>,
    total: Vec<Demerits>,
}

impl Dp {
    fn seeded() -> Self {
        let mut index = FxHashMap::default();
        index.insert(BreakpointNode::SEED, 0);
        Self {
            arena: vec![BreakpointNode::SEED],
            index,
            predecessor: vec![None],
            total: vec![0.0],
        }
    }
}

/// Find the optimal breakpoint sequence for `items` against the given line
/// lengths and criteria.
///
/// On success the returned indices are strictly increasing, and each one is
/// a legal breakpoint per the item's own rule.
pub fn search<L, C>(
    items: &ItemList,
    lengths: &L,
    criteria: &C,
) -> Result<Vec<usize>, NoSolution>
where
    L: LineLengths + ?Sized,
    C: OptimalityCriteria + ?Sized,
{
    search_with_observer(items, lengths, criteria, None)
}

/// [`search`], additionally reporting every evaluated edge to `observer`.
pub fn search_with_observer<L, C>(
    items: &ItemList,
    lengths: &L,
    criteria: &C,
    mut observer: Option<&mut dyn SearchObserver>,
) -> Result<Vec<usize>, NoSolution>
where
    L: LineLengths + ?Sized,
    C: OptimalityCriteria + ?Sized,
{
    let neg_one = Ratio::from_ints(-1, 1);
    let max_ratio = criteria.max_adjustment_ratio();
    let stream = items.items();

    let mut dp = Dp::seeded();
    let mut active: Vec<usize> = vec![0];

    for (i, item) in stream.iter().enumerate() {
        let preceding = if i == 0 { None } else { Some(&stream[i - 1]) };
        if !item.is_valid_breakpoint(preceding) {
            continue;
        }
        let penalty = item.penalty_cost();
        let forced = item.is_forced_break();
        let flagged = item.is_flagged_breakpoint();

        let mut survivors: Vec<usize> = Vec::with_capacity(active.len());
        let mut pending: SmallVec<[usize; 8]> = SmallVec::new();

        for &a in &active {
            let node = dp.arena[a];
            let candidate_line = if criteria.looseness() != 0 {
                node.line + 1
            } else {
                lengths.next(node.line)
            };
            let target = lengths.length(candidate_line);
            let lo = (node.item_index + 1) as usize;
            let ratio = match items.window_metrics(lo, i + 1) {
                Some(metrics) => metrics.adjustment_ratio(target),
                // No box yet: an empty line can only stretch without bound.
                None => {
                    if target.is_zero() {
                        Ratio::ZERO
                    } else {
                        Ratio::new(target, Distance::ZERO)
                    }
                }
            };

            // Over-full already; only gets worse as the paragraph continues.
            if ratio.lt(neg_one) {
                continue;
            }
            // Every node becomes unreachable once execution passes a forced
            // break; the node may still parent a candidate at this position.
            if !forced {
                survivors.push(a);
            }
            // Not enough material yet; the node stays for later positions.
            if max_ratio.lt(ratio) {
                continue;
            }

            let fitness = criteria.classify(ratio);
            let candidate = BreakpointNode {
                item_index: i as i64,
                line: candidate_line,
                fitness,
            };
            let prev_flagged = node.item_index >= 0
                && stream[node.item_index as usize].is_flagged_breakpoint();
            let incremental =
                criteria.demerits(ratio, fitness, node.fitness, penalty, flagged, prev_flagged);
            let total = dp.total[a] + incremental;
            if let Some(obs) = observer.as_deref_mut() {
                obs.edge(node, candidate, ratio, incremental, total);
            }

            match dp.index.entry(candidate) {
                Entry::Occupied(slot) => {
                    let j = *slot.get();
                    let replace = total < dp.total[j]
                        || (total == dp.total[j]
                            && dp.predecessor[j].is_some_and(|p| {
                                dp.arena[a].order_key() < dp.arena[p].order_key()
                            }));
                    if replace {
                        dp.predecessor[j] = Some(a);
                        dp.total[j] = total;
                    }
                }
                Entry::Vacant(slot) => {
                    let j = dp.arena.len();
                    dp.arena.push(candidate);
                    dp.predecessor.push(Some(a));
                    dp.total.push(total);
                    slot.insert(j);
                    pending.push(j);
                }
            }
        }

        active = survivors;
        // Fresh nodes become eligible starting at the next position.
        active.extend(pending.iter().copied());
        tracing::trace!(
            position = i,
            active = active.len(),
            fresh = pending.len(),
            "breakpoint round"
        );
    }

    let best = active
        .iter()
        .copied()
        .filter(|&j| j != 0)
        .min_by(|&x, &y| {
            dp.total[x]
                .total_cmp(&dp.total[y])
                .then_with(|| dp.arena[x].order_key().cmp(&dp.arena[y].order_key()))
        });
    let Some(best) = best else {
        tracing::debug!("breakpoint search failed: active set empty at end of stream");
        return Err(NoSolution);
    };

    let mut breakpoints = Vec::new();
    let mut cursor = Some(best);
    while let Some(j) = cursor {
        let node = dp.arena[j];
        if node.item_index >= 0 {
            breakpoints.push(node.item_index as usize);
        }
        cursor = dp.predecessor[j];
    }
    breakpoints.reverse();
    tracing::debug!(
        breakpoints = breakpoints.len(),
        total_demerits = dp.total[best],
        "breakpoint search complete"
    );
    Ok(breakpoints)
}

// =========================================================================
// Tests
// =========================================================================
