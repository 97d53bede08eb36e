//! Immutable item sequences with O(1) range metrics.
//!
//! An [`ItemList`] owns its items through a shared core that also carries
//! four prefix-sum arrays (cumulative width, shrinkability, stretchability,
//! and infinite-stretch count) plus a next-box index per position.
//! [`ItemList::slice`] re-windows the same core in O(1), and every range
//! metric is O(1) off the prefix sums.
//!
//! A "line" is the half-open span between two breakpoints. Content before
//! the first box of a span (typically leading glue) never renders, because
//! lines always start flush at a box; every metric therefore ignores items
//! before the first box, and the last item of a span contributes its
//! end-of-line width rather than its ordinary one.

use std::sync::Arc;

use galley_units::{Distance, Ratio};

use crate::item::{INFINITE_STRETCH, Item};

// =========================================================================
// LineMetrics
// =========================================================================

/// The O(1) metrics of one contiguous item range, bundled so the breakpoint
/// search pays for a single next-box lookup per candidate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMetrics {
    /// Index of the first box, relative to the queried range.
    pub first_box: usize,
    /// Natural width, with the last item contributing its end-of-line width.
    pub width: Distance,
    /// Total shrinkability, excluding the last item's own contribution.
    pub shrinkability: Distance,
    /// Total stretchability, excluding the last item's own contribution and
    /// capped at [`INFINITE_STRETCH`].
    pub stretchability: Distance,
    /// Number of infinite-stretch items, excluding the last item.
    pub inf_stretch_items: usize,
}

impl LineMetrics {
    /// The adjustment ratio needed to set this range to `target`.
    ///
    /// Overfull ranges shrink (`(target - width) / shrinkability`, negative);
    /// underfull ranges stretch, except that a range with infinite
    /// stretchability absorbs any deficit at ratio zero. A zero elasticity
    /// denominator yields the signed-infinite ratio.
    #[must_use]
    pub fn adjustment_ratio(&self, target: Distance) -> Ratio {
        if self.width > target {
            Ratio::new(target - self.width, self.shrinkability)
        } else if self.width < target {
            if self.stretchability >= INFINITE_STRETCH {
                Ratio::ZERO
            } else {
                Ratio::new(target - self.width, self.stretchability)
            }
        } else {
            Ratio::ZERO
        }
    }
}

// =========================================================================
// ItemList
// =========================================================================

/// Shared immutable backing store: items plus their prefix sums.
#[derive(Debug)]
struct Core {
    items: Vec<Item>,
    /// `cum_width[i]` = total ordinary width of `items[..i]` (length N+1).
    cum_width: Vec<Distance>,
    cum_shrink: Vec<Distance>,
    cum_stretch: Vec<Distance>,
    /// Running count of infinite-stretch items.
    cum_inf: Vec<u32>,
    /// Absolute index of the next box at or after each position.
    next_box: Vec<Option<usize>>,
}

/// An immutable, ownership-sharing window over an item sequence.
///
/// Cloning or slicing shares the underlying arrays; nothing is copied.
#[derive(Debug, Clone)]
pub struct ItemList {
    core: Arc<Core>,
    start: usize,
    end: usize,
}

impl ItemList {
    /// Build an item list, computing all prefix sums in O(N).
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        let n = items.len();
        let mut cum_width = Vec::with_capacity(n + 1);
        let mut cum_shrink = Vec::with_capacity(n + 1);
        let mut cum_stretch = Vec::with_capacity(n + 1);
        let mut cum_inf = Vec::with_capacity(n + 1);
        cum_width.push(Distance::ZERO);
        cum_shrink.push(Distance::ZERO);
        cum_stretch.push(Distance::ZERO);
        cum_inf.push(0u32);
        for (i, item) in items.iter().enumerate() {
            cum_width.push(cum_width[i].saturating_add(item.width()));
            cum_shrink.push(cum_shrink[i].saturating_add(item.shrink()));
            cum_stretch.push(cum_stretch[i].saturating_add(item.stretch()));
            cum_inf.push(cum_inf[i] + u32::from(item.has_infinite_stretch()));
        }
        let mut next_box = vec![None; n];
        let mut nb = None;
        for i in (0..n).rev() {
            if items[i].is_box() {
                nb = Some(i);
            }
            next_box[i] = nb;
        }
        Self {
            core: Arc::new(Core {
                items,
                cum_width,
                cum_shrink,
                cum_stretch,
                cum_inf,
                next_box,
            }),
            start: 0,
            end: n,
        }
    }

    /// Number of items in this window.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether this window is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The items of this window.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.core.items[self.start..self.end]
    }

    /// The item at a window-relative index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items().get(index)
    }

    /// Iterate the items of this window.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items().iter()
    }

    /// Re-window to `[a, b)` (window-relative) in O(1), sharing the core.
    ///
    /// # Panics
    /// Panics if `a > b` or `b > self.len()`.
    #[must_use]
    pub fn slice(&self, a: usize, b: usize) -> Self {
        assert!(
            a <= b && b <= self.len(),
            "slice [{a}, {b}) out of range for item list of length {}",
            self.len()
        );
        Self {
            core: Arc::clone(&self.core),
            start: self.start + a,
            end: self.start + b,
        }
    }

    /// Index of the first box in this window, or `None` if it contains no
    /// box (the "no box in range" condition).
    #[must_use]
    pub fn first_box_index(&self) -> Option<usize> {
        if self.start >= self.end {
            return None;
        }
        let f = self.core.next_box[self.start]?;
        (f < self.end).then(|| f - self.start)
    }

    /// Natural width of this window as a line; `None` if it has no box.
    #[must_use]
    pub fn width(&self) -> Option<Distance> {
        self.metrics().map(|m| m.width)
    }

    /// Total shrinkability of this window as a line; `None` if no box.
    #[must_use]
    pub fn shrinkability(&self) -> Option<Distance> {
        self.metrics().map(|m| m.shrinkability)
    }

    /// Total stretchability of this window as a line, capped at
    /// [`INFINITE_STRETCH`]; `None` if no box.
    #[must_use]
    pub fn stretchability(&self) -> Option<Distance> {
        self.metrics().map(|m| m.stretchability)
    }

    /// Number of infinite-stretch items in this window as a line (0 if no
    /// box).
    #[must_use]
    pub fn num_inf_stretch_items(&self) -> usize {
        self.metrics().map_or(0, |m| m.inf_stretch_items)
    }

    /// All line metrics of this window in one lookup; `None` if no box.
    #[must_use]
    pub fn metrics(&self) -> Option<LineMetrics> {
        self.window_metrics(0, self.len())
    }

    /// Metrics of the window-relative range `[a, b)` without re-windowing.
    pub(crate) fn window_metrics(&self, a: usize, b: usize) -> Option<LineMetrics> {
        debug_assert!(a <= b && b <= self.len());
        let lo = self.start + a;
        let hi = self.start + b;
        if lo >= hi {
            return None;
        }
        let c = &*self.core;
        let f = c.next_box[lo]?;
        if f >= hi {
            return None;
        }
        let last = &c.items[hi - 1];
        let width = (c.cum_width[hi] - c.cum_width[f]) + last.end_of_line_width() - last.width();
        let shrinkability = c.cum_shrink[hi] - c.cum_shrink[f] - last.shrink();
        let stretchability =
            (c.cum_stretch[hi] - c.cum_stretch[f] - last.stretch()).min(INFINITE_STRETCH);
        let inf_stretch_items =
            (c.cum_inf[hi] - c.cum_inf[f]) as usize - usize::from(last.has_infinite_stretch());
        Some(LineMetrics {
            first_box: f - lo,
            width,
            shrinkability,
            stretchability,
            inf_stretch_items,
        })
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ItemList {
        ItemList::new(vec![
            Item::glue(5, 1, 2),
            Item::boxed(60),
            Item::glue(20, 7, 20),
            Item::boxed(60),
            Item::glue(0, 0, 100_000),
            Item::penalty(15, -10_000, false),
        ])
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn empty_list_has_no_metrics() {
        let list = ItemList::new(vec![]);
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
        assert!(list.first_box_index().is_none());
        assert!(list.metrics().is_none());
    }

    #[test]
    fn len_and_get() {
        let list = sample();
        assert_eq!(list.len(), 6);
        assert_eq!(list.get(1), Some(&Item::boxed(60)));
        assert!(list.get(6).is_none());
    }

    // ── First box ────────────────────────────────────────────────────

    #[test]
    fn first_box_skips_leading_glue() {
        assert_eq!(sample().first_box_index(), Some(1));
    }

    #[test]
    fn no_box_in_range_is_none() {
        let list = sample();
        assert!(list.slice(4, 6).first_box_index().is_none());
        assert!(list.slice(4, 6).width().is_none());
        assert_eq!(list.slice(4, 6).num_inf_stretch_items(), 0);
    }

    // ── Width ────────────────────────────────────────────────────────

    #[test]
    fn width_ignores_items_before_first_box() {
        // leading glue (5) excluded: 60 + 20 + 60 + 0 + penalty eol 15
        assert_eq!(sample().width(), Some(Distance::from_sp(155)));
    }

    #[test]
    fn trailing_glue_vanishes_from_width() {
        let list = sample();
        // [1, 3): box 60 + glue eol 0
        assert_eq!(list.slice(1, 3).width(), Some(Distance::from_sp(60)));
        // [1, 4): box 60 + glue 20 + box 60
        assert_eq!(list.slice(1, 4).width(), Some(Distance::from_sp(140)));
    }

    #[test]
    fn trailing_penalty_width_materializes() {
        // [3, 6): box 60 + glue 0 + penalty eol 15
        assert_eq!(sample().slice(3, 6).width(), Some(Distance::from_sp(75)));
    }

    // ── Elasticity ───────────────────────────────────────────────────

    #[test]
    fn elasticity_excludes_last_item() {
        let list = sample();
        // [1, 3): shrink 7 excluded because the glue is last
        assert_eq!(list.slice(1, 3).shrinkability(), Some(Distance::ZERO));
        assert_eq!(list.slice(1, 3).stretchability(), Some(Distance::ZERO));
        // [1, 4): glue fully counted
        assert_eq!(list.slice(1, 4).shrinkability(), Some(Distance::from_sp(7)));
        assert_eq!(
            list.slice(1, 4).stretchability(),
            Some(Distance::from_sp(20))
        );
    }

    #[test]
    fn stretchability_caps_at_infinite() {
        assert_eq!(sample().stretchability(), Some(INFINITE_STRETCH));
        let finite_pile = ItemList::new(vec![
            Item::boxed(10),
            Item::glue(10, 0, 60_000),
            Item::boxed(10),
            Item::glue(10, 0, 60_000),
            Item::boxed(10),
        ]);
        assert_eq!(finite_pile.stretchability(), Some(INFINITE_STRETCH));
    }

    #[test]
    fn inf_stretch_count_excludes_last_item() {
        let list = ItemList::new(vec![
            Item::boxed(10),
            Item::glue(0, 0, 100_000),
            Item::boxed(10),
            Item::glue(0, 0, 100_000),
        ]);
        assert_eq!(list.num_inf_stretch_items(), 1);
        assert_eq!(list.slice(0, 3).num_inf_stretch_items(), 1);
    }

    // ── Slicing ──────────────────────────────────────────────────────

    #[test]
    fn slice_of_slice_composes() {
        let list = sample();
        let inner = list.slice(1, 6).slice(0, 3);
        assert_eq!(inner.items(), list.slice(1, 4).items());
        assert_eq!(inner.width(), list.slice(1, 4).width());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn slice_out_of_range_panics() {
        let _ = sample().slice(2, 9);
    }

    // ── Purity ───────────────────────────────────────────────────────

    #[test]
    fn queries_are_idempotent() {
        let line = sample().slice(1, 6);
        assert_eq!(line.width(), line.width());
        assert_eq!(line.shrinkability(), line.shrinkability());
        assert_eq!(line.stretchability(), line.stretchability());
        assert_eq!(line.metrics(), line.metrics());
    }

    // ── Adjustment ratio ─────────────────────────────────────────────

    fn metrics_of(items: Vec<Item>) -> LineMetrics {
        ItemList::new(items)
            .metrics()
            .unwrap_or_else(|| unreachable!("fixture has a box"))
    }

    #[test]
    fn ratio_stretches_underfull_lines() {
        let m = metrics_of(vec![Item::boxed(50), Item::glue(10, 5, 20), Item::boxed(50)]);
        // width 110, stretch 20, target 150 → 40/20
        assert_eq!(
            m.adjustment_ratio(Distance::from_sp(150)),
            Ratio::from_ints(40, 20)
        );
    }

    #[test]
    fn ratio_shrinks_overfull_lines() {
        let m = metrics_of(vec![Item::boxed(50), Item::glue(10, 5, 20), Item::boxed(50)]);
        assert_eq!(
            m.adjustment_ratio(Distance::from_sp(100)),
            Ratio::from_ints(-10, 5)
        );
    }

    #[test]
    fn ratio_exact_fit_is_zero() {
        let m = metrics_of(vec![Item::boxed(50), Item::glue(10, 5, 20), Item::boxed(50)]);
        assert!(m.adjustment_ratio(Distance::from_sp(110)).is_zero());
    }

    #[test]
    fn ratio_infinite_stretch_absorbs_deficit() {
        let m = metrics_of(vec![
            Item::boxed(50),
            Item::glue(0, 0, 100_000),
            Item::boxed(50),
        ]);
        assert!(m.adjustment_ratio(Distance::from_sp(500)).is_zero());
    }

    #[test]
    fn ratio_zero_elasticity_is_signed_infinite() {
        let m = metrics_of(vec![Item::boxed(50), Item::glue(10, 0, 0), Item::boxed(50)]);
        let stretched = m.adjustment_ratio(Distance::from_sp(200));
        assert!(stretched.is_infinite());
        assert!(!stretched.num.is_negative());
        let shrunk = m.adjustment_ratio(Distance::from_sp(50));
        assert!(shrunk.is_infinite());
        assert!(shrunk.num.is_negative());
    }
}
