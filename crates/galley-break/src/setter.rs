//! Line setting: converting a finalized line into concrete rendered widths.
//!
//! A finalized line is an item-list slice between two consecutive
//! breakpoints, inclusive of the breakpoint item. Setting distributes the
//! difference between the line's natural width and its target across the
//! line's elastic items, with integer rounding pinned down so the same line
//! always sets the same way: scaled adjustments round toward negative
//! infinity, and the leftover is handed out one scaled point at a time to
//! the earliest-indexed eligible items.
//!
//! Setting never fails outright: the result always carries one
//! [`FixedItem`] per input position, plus an [`LineSettingError`] when the
//! target length could not be met, so callers may still render a degraded
//! line.

use smallvec::SmallVec;

use galley_units::{Distance, Ratio};

use crate::item_list::ItemList;

// =========================================================================
// FixedItem
// =========================================================================

/// The rendered form of one item position in a set line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedItem {
    /// Whether this position renders at all. Content before the line's
    /// first box and trailing glue are invisible.
    pub visible: bool,
    /// Final rendered width.
    pub width: Distance,
}

impl FixedItem {
    const INVISIBLE: Self = Self {
        visible: false,
        width: Distance::ZERO,
    };

    const fn visible(width: Distance) -> Self {
        Self {
            visible: true,
            width,
        }
    }
}

// =========================================================================
// LineSettingError
// =========================================================================

/// The target length could not be met. Both variants carry the target and
/// the length actually achieved by the accompanying best-effort items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSettingError {
    /// The set line is longer than its target.
    Overfull {
        /// Requested line length.
        target: Distance,
        /// Achieved line length.
        actual: Distance,
    },
    /// The set line is shorter than its target.
    Underfull {
        /// Requested line length.
        target: Distance,
        /// Achieved line length.
        actual: Distance,
    },
}

impl LineSettingError {
    /// The requested line length.
    #[must_use]
    pub const fn target(&self) -> Distance {
        match self {
            Self::Overfull { target, .. } | Self::Underfull { target, .. } => *target,
        }
    }

    /// The achieved line length.
    #[must_use]
    pub const fn actual(&self) -> Distance {
        match self {
            Self::Overfull { actual, .. } | Self::Underfull { actual, .. } => *actual,
        }
    }
}

impl std::fmt::Display for LineSettingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overfull { target, actual } => {
                write!(f, "overfull line: set to {actual} against a target of {target}")
            }
            Self::Underfull { target, actual } => {
                write!(f, "underfull line: set to {actual} against a target of {target}")
            }
        }
    }
}

impl std::error::Error for LineSettingError {}

// =========================================================================
// set_line
// =========================================================================

/// Result of setting one line: one [`FixedItem`] per input position, plus
/// the error, if the target length was not met.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetLineResult {
    /// One fixed item per position of the input line.
    pub items: Vec<FixedItem>,
    /// `None` when the line was set to exactly its target length.
    pub error: Option<LineSettingError>,
}

impl SetLineResult {
    /// Whether the line was set to exactly its target length.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }

    /// Total width of the visible items.
    #[must_use]
    pub fn visible_width(&self) -> Distance {
        self.items
            .iter()
            .filter(|fixed| fixed.visible)
            .fold(Distance::ZERO, |acc, fixed| acc.saturating_add(fixed.width))
    }
}

/// Set one finalized line to the given target length.
pub fn set_line(line: &ItemList, target: Distance) -> SetLineResult {
    let n = line.len();
    let mut fixed = vec![FixedItem::INVISIBLE; n];

    let Some(metrics) = line.metrics() else {
        // No box: nothing renders, and the target is unmet by definition.
        return SetLineResult {
            items: fixed,
            error: Some(LineSettingError::Underfull {
                target,
                actual: Distance::ZERO,
            }),
        };
    };
    let first_box = metrics.first_box;
    let items = line.items();
    let mut error = None;

    if metrics.inf_stretch_items > 0 && metrics.width < target {
        // Infinite stretch absorbs the whole deficit; finite stretch gets
        // nothing. Quotient to every infinite item, remainder one scaled
        // point at a time from the earliest.
        let extra = target - metrics.width;
        let count = metrics.inf_stretch_items as i64;
        let quotient = extra / count;
        let bonus = (extra % count).sp();
        let mut seen = 0i64;
        for (j, item) in items.iter().enumerate().skip(first_box) {
            fixed[j] = FixedItem::visible(item.width());
            if j + 1 < n && item.has_infinite_stretch() {
                let add = if seen < bonus {
                    quotient + Distance::from_sp(1)
                } else {
                    quotient
                };
                fixed[j].width += add;
                seen += 1;
            }
        }
    } else {
        let raw = metrics.adjustment_ratio(target);
        let floor = Ratio::from_ints(-1, 1);
        // Shrinking past every item's full shrinkability is impossible.
        let clamped = raw.lt(floor);
        let ratio = if clamped { floor } else { raw };
        let shrinking = ratio.lt(Ratio::ZERO);

        let mut adjusted = Distance::ZERO;
        let mut eligible: SmallVec<[usize; 16]> = SmallVec::new();
        for (j, item) in items.iter().enumerate().skip(first_box) {
            fixed[j] = FixedItem::visible(item.width());
            if j + 1 == n {
                continue;
            }
            let property = if shrinking {
                item.shrink()
            } else {
                item.stretch()
            };
            if property.is_zero() {
                continue;
            }
            eligible.push(j);
            if !ratio.is_infinite() {
                let delta = ratio.scale(property);
                fixed[j].width += delta;
                adjusted += delta;
            }
        }

        let mut residual = target - metrics.width - adjusted;
        if !clamped && !residual.is_zero() && !eligible.is_empty() {
            let step = if residual.is_negative() {
                Distance::from_sp(-1)
            } else {
                Distance::from_sp(1)
            };
            'distribute: while !residual.is_zero() {
                for &j in &eligible {
                    if residual.is_zero() {
                        break 'distribute;
                    }
                    fixed[j].width += step;
                    residual -= step;
                }
            }
        }
        if !residual.is_zero() {
            let actual = target - residual;
            error = Some(if actual > target {
                LineSettingError::Overfull { target, actual }
            } else {
                LineSettingError::Underfull { target, actual }
            });
        }
    }

    // The last item always follows the end-of-line rule: a trailing
    // penalty materializes, trailing glue vanishes, a trailing box keeps
    // its ordinary width.
    if let Some(last) = items.last() {
        fixed[n - 1] = FixedItem {
            visible: !last.is_glue(),
            width: last.end_of_line_width(),
        };
    }

    SetLineResult {
        items: fixed,
        error,
    }
}

// =========================================================================
// Tests
// =========================================================================
