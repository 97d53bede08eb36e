//! Typographic items: the box / glue / penalty model.
//!
//! An [`Item`] is a closed sum type with exactly three cases, following the
//! TeX glue model: rigid boxes, elastic glue, and penalty markers that bias
//! or force breakpoints. The shared queries are matches over the variant,
//! keeping the breakpoint search free of virtual dispatch and allocation.

use std::fmt;

use galley_units::Distance;

/// Breakpoint cost saturation: `+10_000` forbids a break, `-10_000` forces
/// one. [`Item::penalty`] clamps costs into this range.
pub const INFINITE_PENALTY: i32 = 10_000;

/// Stretchability at or above this threshold is infinite for cost purposes:
/// it contributes nothing to the adjustment ratio and is filled by a
/// separate distribution rule in the line setter. Two infinite-stretch items
/// are still distinct and counted individually.
pub const INFINITE_STRETCH: Distance = Distance::from_sp(100_000);

// =========================================================================
// Item
// =========================================================================

/// One element of a paragraph's item stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    /// A rigid, non-breakable content unit (a word or glyph run).
    Box {
        /// Fixed width, contributed whether or not the box ends a line.
        width: Distance,
    },
    /// Elastic space between boxes.
    Glue {
        /// Natural width, contributed only when the glue does not end a line.
        width: Distance,
        /// Maximum shrinkability.
        shrink: Distance,
        /// Maximum stretchability.
        stretch: Distance,
    },
    /// A breakpoint marker carrying a cost bias.
    Penalty {
        /// Width contributed only when the penalty ends a line.
        width: Distance,
        /// Break cost in `[-INFINITE_PENALTY, INFINITE_PENALTY]`.
        cost: i32,
        /// Flagged breaks (hyphens) in a row incur an extra demerit.
        flagged: bool,
    },
}

impl Item {
    /// A rigid box of the given width.
    #[must_use]
    pub fn boxed(width: impl Into<Distance>) -> Self {
        Self::Box {
            width: width.into(),
        }
    }

    /// Glue with the given natural width, shrinkability, and stretchability.
    #[must_use]
    pub fn glue(
        width: impl Into<Distance>,
        shrink: impl Into<Distance>,
        stretch: impl Into<Distance>,
    ) -> Self {
        Self::Glue {
            width: width.into(),
            shrink: shrink.into(),
            stretch: stretch.into(),
        }
    }

    /// A penalty with the given end-of-line width and cost, clamped to
    /// `[-INFINITE_PENALTY, INFINITE_PENALTY]`.
    #[must_use]
    pub fn penalty(width: impl Into<Distance>, cost: i32, flagged: bool) -> Self {
        Self::Penalty {
            width: width.into(),
            cost: cost.clamp(-INFINITE_PENALTY, INFINITE_PENALTY),
            flagged,
        }
    }

    /// A forced break: a zero-width penalty with cost `-INFINITE_PENALTY`.
    #[must_use]
    pub fn forced_break() -> Self {
        Self::penalty(Distance::ZERO, -INFINITE_PENALTY, false)
    }

    /// Mid-line width: glue and boxes contribute their width, penalties
    /// contribute nothing.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> Distance {
        match self {
            Self::Box { width } | Self::Glue { width, .. } => *width,
            Self::Penalty { .. } => Distance::ZERO,
        }
    }

    /// Width when this item is the last item of a line: a trailing glue
    /// vanishes, a trailing penalty materializes its width.
    #[inline]
    #[must_use]
    pub const fn end_of_line_width(&self) -> Distance {
        match self {
            Self::Box { width } | Self::Penalty { width, .. } => *width,
            Self::Glue { .. } => Distance::ZERO,
        }
    }

    /// Shrinkability (zero except for glue).
    #[inline]
    #[must_use]
    pub const fn shrink(&self) -> Distance {
        match self {
            Self::Glue { shrink, .. } => *shrink,
            _ => Distance::ZERO,
        }
    }

    /// Stretchability (zero except for glue).
    #[inline]
    #[must_use]
    pub const fn stretch(&self) -> Distance {
        match self {
            Self::Glue { stretch, .. } => *stretch,
            _ => Distance::ZERO,
        }
    }

    /// The breakpoint cost, if this item is a penalty.
    #[inline]
    #[must_use]
    pub const fn penalty_cost(&self) -> Option<i32> {
        match self {
            Self::Penalty { cost, .. } => Some(*cost),
            _ => None,
        }
    }

    /// Whether this item is a box.
    #[inline]
    #[must_use]
    pub const fn is_box(&self) -> bool {
        matches!(self, Self::Box { .. })
    }

    /// Whether this item is glue.
    #[inline]
    #[must_use]
    pub const fn is_glue(&self) -> bool {
        matches!(self, Self::Glue { .. })
    }

    /// Whether this item's stretchability is at or above the infinite
    /// threshold.
    #[inline]
    #[must_use]
    pub const fn has_infinite_stretch(&self) -> bool {
        self.stretch().sp() >= INFINITE_STRETCH.sp()
    }

    /// Whether a break here counts as flagged (a flagged penalty).
    #[inline]
    #[must_use]
    pub const fn is_flagged_breakpoint(&self) -> bool {
        matches!(
            self,
            Self::Penalty { flagged: true, .. }
        )
    }

    /// Whether a break immediately past a forced penalty sits here.
    #[inline]
    #[must_use]
    pub const fn is_forced_break(&self) -> bool {
        match self {
            Self::Penalty { cost, .. } => *cost <= -INFINITE_PENALTY,
            _ => false,
        }
    }

    /// Whether this item is a legal breakpoint given the item before it.
    ///
    /// Boxes never break; glue breaks only directly after a box; a penalty
    /// breaks unless its cost forbids it.
    #[must_use]
    pub fn is_valid_breakpoint(&self, preceding: Option<&Item>) -> bool {
        match self {
            Self::Box { .. } => false,
            Self::Glue { .. } => preceding.is_some_and(Item::is_box),
            Self::Penalty { cost, .. } => *cost < INFINITE_PENALTY,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Box { width } => write!(f, "box[{width}]"),
            Self::Glue {
                width,
                shrink,
                stretch,
            } => write!(f, "glue[{width} -{shrink} +{stretch}]"),
            Self::Penalty {
                width,
                cost,
                flagged,
            } => {
                write!(f, "penalty[{width} c={cost}{}]", if *flagged { " !" } else { "" })
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
