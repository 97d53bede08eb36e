//! Per-line target lengths, addressed by pseudo-index.
//!
//! The breakpoint search does not track physical line numbers: it tracks
//! *pseudo-indices*, chosen so that two equal pseudo-indices guarantee an
//! identical sequence of target lengths from that point onward. Paragraphs
//! whose line length is eventually constant therefore collapse unboundedly
//! many physical lines onto one DP state, bounding the search space by the
//! number of distinct pseudo-indices rather than the number of lines.
//!
//! The search seeds its start-of-paragraph node with pseudo-index `-1`
//! ("before the first line"); implementations must map `next(-1)` to the
//! first line's pseudo-index.

use galley_units::Distance;

// =========================================================================
// LineLengths
// =========================================================================

/// Maps a pseudo-index to a target length and to the following line's
/// pseudo-index.
pub trait LineLengths {
    /// Target length of the line at `line`.
    fn length(&self, line: i64) -> Distance;

    /// Pseudo-index of the line following `line`. Must return the first
    /// line's pseudo-index for `line == -1`.
    fn next(&self, line: i64) -> i64;
}

// =========================================================================
// ConstantLineLengths
// =========================================================================

/// Every line has the same target length.
///
/// All lines share pseudo-index 0, so the search degenerates to the
/// efficient single-pseudo-index case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantLineLengths {
    length: Distance,
}

impl ConstantLineLengths {
    /// Constant target length for every line.
    #[must_use]
    pub fn new(length: impl Into<Distance>) -> Self {
        Self {
            length: length.into(),
        }
    }
}

impl LineLengths for ConstantLineLengths {
    fn length(&self, _line: i64) -> Distance {
        self.length
    }

    fn next(&self, _line: i64) -> i64 {
        0
    }
}

// =========================================================================
// VariableLineLengths
// =========================================================================

/// Explicit leading line lengths followed by a constant tail.
///
/// Pseudo-indices `0..k` address the explicit lengths; pseudo-index `k`
/// is the tail, and `next(k) == k`. The constructor trims trailing
/// explicit entries equal to the tail, so equal pseudo-indices really do
/// mean an identical length suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableLineLengths {
    lengths: Vec<Distance>,
    tail: Distance,
}

impl VariableLineLengths {
    /// Leading per-line lengths, then `tail` for every following line.
    #[must_use]
    pub fn new(lengths: Vec<Distance>, tail: impl Into<Distance>) -> Self {
        let tail = tail.into();
        let mut lengths = lengths;
        while lengths.last() == Some(&tail) {
            lengths.pop();
        }
        Self { lengths, tail }
    }

    /// Leading lengths given in raw scaled points.
    #[must_use]
    pub fn from_sp(lengths: &[i64], tail: i64) -> Self {
        Self::new(
            lengths.iter().copied().map(Distance::from_sp).collect(),
            Distance::from_sp(tail),
        )
    }

    /// Number of distinct pseudo-indices (explicit lengths plus the tail).
    #[must_use]
    pub fn distinct_indices(&self) -> usize {
        self.lengths.len() + 1
    }
}

impl LineLengths for VariableLineLengths {
    fn length(&self, line: i64) -> Distance {
        usize::try_from(line)
            .ok()
            .and_then(|i| self.lengths.get(i))
            .copied()
            .unwrap_or(self.tail)
    }

    fn next(&self, line: i64) -> i64 {
        (line + 1).min(self.lengths.len() as i64)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── Constant ─────────────────────────────────────────────────────

    #[test]
    fn constant_collapses_to_one_index() {
        let lengths = ConstantLineLengths::new(270);
        assert_eq!(lengths.next(-1), 0);
        assert_eq!(lengths.next(0), 0);
        assert_eq!(lengths.next(17), 0);
        assert_eq!(lengths.length(0), Distance::from_sp(270));
        assert_eq!(lengths.length(99), Distance::from_sp(270));
    }

    // ── Variable ─────────────────────────────────────────────────────

    #[test]
    fn variable_walks_explicit_then_tail() {
        let lengths = VariableLineLengths::from_sp(&[40, 50], 60);
        assert_eq!(lengths.next(-1), 0);
        assert_eq!(lengths.length(0), Distance::from_sp(40));
        assert_eq!(lengths.next(0), 1);
        assert_eq!(lengths.length(1), Distance::from_sp(50));
        assert_eq!(lengths.next(1), 2);
        assert_eq!(lengths.length(2), Distance::from_sp(60));
        // tail is a fixed point
        assert_eq!(lengths.next(2), 2);
        assert_eq!(lengths.next(100), 2);
    }

    #[test]
    fn trailing_tail_entries_are_trimmed() {
        let trimmed = VariableLineLengths::from_sp(&[40, 60, 60], 60);
        assert_eq!(trimmed, VariableLineLengths::from_sp(&[40], 60));
        assert_eq!(trimmed.distinct_indices(), 2);
        assert_eq!(trimmed.next(0), 1);
        assert_eq!(trimmed.next(1), 1);
    }

    #[test]
    fn all_tail_collapses_to_constant_shape() {
        let lengths = VariableLineLengths::from_sp(&[60, 60], 60);
        assert_eq!(lengths.distinct_indices(), 1);
        assert_eq!(lengths.next(-1), 0);
        assert_eq!(lengths.next(0), 0);
        assert_eq!(lengths.length(0), Distance::from_sp(60));
    }
}
