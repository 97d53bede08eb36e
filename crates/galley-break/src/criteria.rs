//! Optimality criteria: badness, fitness classification, and demerits.
//!
//! The cost model follows TeX: a line's *badness* approximates
//! `100 · ratio³` in pure integer arithmetic, lines are bucketed into four
//! *fitness classes* by their adjustment ratio, and a candidate break's
//! *demerits* combine badness, the breakpoint's own penalty, and contrast
//! surcharges for consecutive flagged breaks and fitness-class jumps.
//! Badness and classification never touch floating point; only accumulated
//! demerits are `f64`.

use std::fmt;

use galley_units::{Distance, Ratio};

use crate::item::INFINITE_PENALTY;

/// Maximum badness; also the badness of a line with no usable elasticity.
pub const INFINITE_BADNESS: i64 = 10_000;

/// Accumulated cost of a breakpoint path.
pub type Demerits = f64;

// =========================================================================
// badness
// =========================================================================

/// Largest `|excess|` for which the scaled quotient `excess * 297 / s` stays
/// within TeX's 31-bit intermediate (TeX82 §108). Preserved verbatim: the
/// staged-multiplication output is pinned to TeX's badness function.
const STAGED_MUL_MAX_EXCESS: i64 = 7_230_584;

/// Smallest elasticity for which the fallback quotient `excess / (s / 297)`
/// is taken; below it the raw excess is used. Preserved verbatim.
const STAGED_DIV_MIN_ELASTICITY: i64 = 1_663_497;

/// Rounding addend and divisor of the final cube: `(r³ + 0o400000) /
/// 0o1000000`, TeX's fixed-point form of `r³ / 2¹⁸` rounded.
const CUBE_ROUND: i64 = 0o400000;
const CUBE_SCALE: i64 = 0o1000000;

/// Scaled quotients above this bound saturate at [`INFINITE_BADNESS`].
const MAX_SCALED_RATIO: i64 = 1290;

/// Integer badness of stretching or shrinking by `excess` against a total
/// elasticity of `elasticity`: approximately `100 · (excess/elasticity)³`,
/// clamped to `[0, INFINITE_BADNESS]`.
///
/// The staged multiplication reproduces TeX's routine bit for bit; its
/// guard constants must not be "simplified".
#[must_use]
pub fn badness(excess: Distance, elasticity: Distance) -> i64 {
    let t = excess.sp().abs();
    let s = elasticity.sp();
    if t == 0 {
        return 0;
    }
    if s <= 0 {
        return INFINITE_BADNESS;
    }
    let r = if t <= STAGED_MUL_MAX_EXCESS {
        (t * 297) / s
    } else if s >= STAGED_DIV_MIN_ELASTICITY {
        t / (s / 297)
    } else {
        t
    };
    if r > MAX_SCALED_RATIO {
        return INFINITE_BADNESS;
    }
    (r * r * r + CUBE_ROUND) / CUBE_SCALE
}

/// Badness of an adjustment ratio (`|num|` against `den`). Infinite ratios
/// are maximally bad.
#[must_use]
pub fn ratio_badness(ratio: Ratio) -> i64 {
    badness(ratio.num, ratio.den)
}

// =========================================================================
// FitnessClass
// =========================================================================

/// Coarse bucket of an adjustment ratio, used to penalize visually jarring
/// contrast between adjacent lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i8)]
pub enum FitnessClass {
    /// Ratio at or below −1/2: heavily shrunk.
    Tight = -1,
    /// Ratio in (−1/2, 1/2]: comfortable.
    Decent = 0,
    /// Ratio in (1/2, 1]: noticeably stretched.
    Loose = 1,
    /// Ratio above 1.
    VeryLoose = 2,
}

impl FitnessClass {
    /// The class as a small signed integer.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i8 {
        self as i8
    }

    /// Whether two classes differ by more than one step.
    #[inline]
    #[must_use]
    pub const fn mismatch(self, other: Self) -> bool {
        (self.value() - other.value()).abs() > 1
    }
}

impl fmt::Display for FitnessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tight => write!(f, "tight"),
            Self::Decent => write!(f, "decent"),
            Self::Loose => write!(f, "loose"),
            Self::VeryLoose => write!(f, "very-loose"),
        }
    }
}

// =========================================================================
// OptimalityCriteria
// =========================================================================

/// Policy object steering the breakpoint search.
pub trait OptimalityCriteria {
    /// Largest admissible adjustment ratio for a candidate line.
    fn max_adjustment_ratio(&self) -> Ratio;

    /// Looseness target. Nonzero looseness gives every line a distinct
    /// pseudo-index in the search instead of collapsing repeated lengths.
    fn looseness(&self) -> i32;

    /// Fitness class of an adjustment ratio.
    fn classify(&self, ratio: Ratio) -> FitnessClass;

    /// Incremental demerits of ending a line at a breakpoint with the given
    /// adjustment ratio and penalty, coming from a line of class
    /// `prev_fitness` whose break was `prev_flagged`.
    fn demerits(
        &self,
        ratio: Ratio,
        fitness: FitnessClass,
        prev_fitness: FitnessClass,
        penalty: Option<i32>,
        flagged: bool,
        prev_flagged: bool,
    ) -> Demerits;
}

// =========================================================================
// TexOptimalityCriteria
// =========================================================================

/// TeX-compatible optimality criteria.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexOptimalityCriteria {
    /// Largest admissible adjustment ratio.
    pub max_adjustment_ratio: Ratio,
    /// Looseness target (see [`OptimalityCriteria::looseness`]).
    pub looseness: i32,
    /// Surcharge when this break and the previous one are both flagged.
    pub consecutive_flagged_cost: f64,
    /// Surcharge when adjacent lines' fitness classes differ by more than
    /// one step.
    pub fitness_mismatch_cost: f64,
    /// Per-line base penalty added to badness before squaring.
    pub line_penalty: f64,
}

impl TexOptimalityCriteria {
    /// TeX plain defaults: tolerance for moderate stretching only.
    pub const STANDARD: Self = Self {
        max_adjustment_ratio: Ratio::from_ints(2, 1),
        looseness: 0,
        consecutive_flagged_cost: 10_000.0,
        fitness_mismatch_cost: 10_000.0,
        line_penalty: 10.0,
    };

    /// Strict setting: no line may stretch beyond its full stretchability.
    pub const TIGHT: Self = Self {
        max_adjustment_ratio: Ratio::from_ints(1, 1),
        looseness: 0,
        consecutive_flagged_cost: 10_000.0,
        fitness_mismatch_cost: 10_000.0,
        line_penalty: 10.0,
    };

    /// Effectively unbounded adjustment ratio; every stretchable line is
    /// admissible no matter how sparse.
    pub const PERMISSIVE: Self = Self {
        max_adjustment_ratio: Ratio::from_ints(200_000, 1),
        looseness: 0,
        consecutive_flagged_cost: 10_000.0,
        fitness_mismatch_cost: 10_000.0,
        line_penalty: 10.0,
    };

    /// Replace the maximum adjustment ratio.
    #[must_use]
    pub const fn with_max_ratio(mut self, ratio: Ratio) -> Self {
        self.max_adjustment_ratio = ratio;
        self
    }

    /// Replace the looseness target.
    #[must_use]
    pub const fn with_looseness(mut self, looseness: i32) -> Self {
        self.looseness = looseness;
        self
    }

    /// Replace the per-line base penalty.
    #[must_use]
    pub const fn with_line_penalty(mut self, line_penalty: f64) -> Self {
        self.line_penalty = line_penalty;
        self
    }

    /// Replace the consecutive-flagged surcharge.
    #[must_use]
    pub const fn with_flagged_cost(mut self, cost: f64) -> Self {
        self.consecutive_flagged_cost = cost;
        self
    }

    /// Replace the fitness-mismatch surcharge.
    #[must_use]
    pub const fn with_mismatch_cost(mut self, cost: f64) -> Self {
        self.fitness_mismatch_cost = cost;
        self
    }
}

impl Default for TexOptimalityCriteria {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl OptimalityCriteria for TexOptimalityCriteria {
    fn max_adjustment_ratio(&self) -> Ratio {
        self.max_adjustment_ratio
    }

    fn looseness(&self) -> i32 {
        self.looseness
    }

    fn classify(&self, ratio: Ratio) -> FitnessClass {
        if ratio.le(Ratio::from_ints(-1, 2)) {
            FitnessClass::Tight
        } else if ratio.le(Ratio::from_ints(1, 2)) {
            FitnessClass::Decent
        } else if ratio.le(Ratio::from_ints(1, 1)) {
            FitnessClass::Loose
        } else {
            FitnessClass::VeryLoose
        }
    }

    fn demerits(
        &self,
        ratio: Ratio,
        fitness: FitnessClass,
        prev_fitness: FitnessClass,
        penalty: Option<i32>,
        flagged: bool,
        prev_flagged: bool,
    ) -> Demerits {
        let base = self.line_penalty + ratio_badness(ratio) as f64;
        let mut demerits = base * base;
        if let Some(cost) = penalty {
            let c = f64::from(cost);
            if cost > 0 {
                demerits += c * c;
            } else if cost > -INFINITE_PENALTY {
                // A favorable break subtracts its squared cost, which can
                // drive the total negative; kept un-clamped, as TeX has it.
                demerits -= c * c;
            }
        }
        if flagged && prev_flagged {
            demerits += self.consecutive_flagged_cost;
        }
        if fitness.mismatch(prev_fitness) {
            demerits += self.fitness_mismatch_cost;
        }
        demerits
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    fn b(t: i64, s: i64) -> i64 {
        badness(Distance::from_sp(t), Distance::from_sp(s))
    }

    // ── Badness ──────────────────────────────────────────────────────

    #[test]
    fn badness_zero_excess_is_zero() {
        assert_eq!(b(0, 10), 0);
        assert_eq!(b(0, 0), 0);
    }

    #[test]
    fn badness_zero_elasticity_is_infinite() {
        assert_eq!(b(10, 0), INFINITE_BADNESS);
        assert_eq!(b(10, -5), INFINITE_BADNESS);
    }

    #[test]
    fn badness_spot_values() {
        assert_eq!(b(10, 10), 100);
        assert_eq!(b(20, 10), 800);
        assert_eq!(b(50, 40), 195);
        assert_eq!(b(100, 100), 100);
        assert_eq!(b(1, 990), 0);
        assert_eq!(b(9_999, 10), INFINITE_BADNESS);
    }

    #[test]
    fn badness_is_sign_symmetric() {
        assert_eq!(b(-50, 40), b(50, 40));
    }

    #[test]
    fn badness_large_excess_takes_staged_paths() {
        // Above the staged-multiplication bound, with large elasticity.
        assert_eq!(b(8_000_000, 8_000_000), b(297, 297));
        // Above the bound with small elasticity saturates.
        assert_eq!(b(8_000_000, 10), INFINITE_BADNESS);
    }

    #[test]
    fn badness_sweep_has_1095_distinct_values() {
        let mut values = FxHashSet::default();
        for num in (0..10_000).step_by(3) {
            for den in (10..1_000).step_by(10) {
                values.insert(b(num, den));
            }
        }
        assert_eq!(values.len(), 1095);
    }

    // ── Fitness classification ───────────────────────────────────────

    fn classify(num: i64, den: i64) -> FitnessClass {
        TexOptimalityCriteria::STANDARD.classify(Ratio::from_ints(num, den))
    }

    #[test]
    fn classify_boundaries_are_inclusive() {
        assert_eq!(classify(-1, 2), FitnessClass::Tight);
        assert_eq!(classify(-49, 100), FitnessClass::Decent);
        assert_eq!(classify(0, 1), FitnessClass::Decent);
        assert_eq!(classify(1, 2), FitnessClass::Decent);
        assert_eq!(classify(51, 100), FitnessClass::Loose);
        assert_eq!(classify(1, 1), FitnessClass::Loose);
        assert_eq!(classify(101, 100), FitnessClass::VeryLoose);
    }

    #[test]
    fn classify_infinite_ratios() {
        assert_eq!(classify(-1, 0), FitnessClass::Tight);
        assert_eq!(classify(1, 0), FitnessClass::VeryLoose);
    }

    #[test]
    fn fitness_values_and_mismatch() {
        assert_eq!(FitnessClass::Tight.value(), -1);
        assert_eq!(FitnessClass::VeryLoose.value(), 2);
        assert!(FitnessClass::Tight.mismatch(FitnessClass::Loose));
        assert!(FitnessClass::VeryLoose.mismatch(FitnessClass::Decent));
        assert!(!FitnessClass::Decent.mismatch(FitnessClass::Loose));
        assert!(!FitnessClass::Tight.mismatch(FitnessClass::Tight));
    }

    #[test]
    fn fitness_display() {
        assert_eq!(format!("{}", FitnessClass::VeryLoose), "very-loose");
    }

    // ── Demerits ─────────────────────────────────────────────────────

    fn demerits_of(
        ratio: Ratio,
        fitness: FitnessClass,
        prev: FitnessClass,
        penalty: Option<i32>,
        flagged: bool,
        prev_flagged: bool,
    ) -> Demerits {
        TexOptimalityCriteria::STANDARD.demerits(ratio, fitness, prev, penalty, flagged, prev_flagged)
    }

    #[test]
    fn demerits_base_is_squared_line_penalty_plus_badness() {
        let d = demerits_of(
            Ratio::ZERO,
            FitnessClass::Decent,
            FitnessClass::Decent,
            None,
            false,
            false,
        );
        assert_eq!(d, 100.0); // (10 + 0)²
    }

    #[test]
    fn demerits_positive_penalty_adds_square() {
        let d = demerits_of(
            Ratio::ZERO,
            FitnessClass::Decent,
            FitnessClass::Decent,
            Some(50),
            false,
            false,
        );
        assert_eq!(d, 100.0 + 2_500.0);
    }

    #[test]
    fn demerits_negative_penalty_subtracts_square() {
        // Regression: favorable breaks may drive total demerits negative;
        // the value is pinned, not clamped.
        let d = demerits_of(
            Ratio::ZERO,
            FitnessClass::Decent,
            FitnessClass::Decent,
            Some(-50),
            false,
            false,
        );
        assert_eq!(d, -2_400.0);
    }

    #[test]
    fn demerits_forced_break_has_no_penalty_term() {
        let d = demerits_of(
            Ratio::ZERO,
            FitnessClass::Decent,
            FitnessClass::Decent,
            Some(-INFINITE_PENALTY),
            false,
            false,
        );
        assert_eq!(d, 100.0);
    }

    #[test]
    fn demerits_consecutive_flagged_surcharge() {
        let d = demerits_of(
            Ratio::ZERO,
            FitnessClass::Decent,
            FitnessClass::Decent,
            None,
            true,
            true,
        );
        assert_eq!(d, 100.0 + 10_000.0);
        let single = demerits_of(
            Ratio::ZERO,
            FitnessClass::Decent,
            FitnessClass::Decent,
            None,
            true,
            false,
        );
        assert_eq!(single, 100.0);
    }

    #[test]
    fn demerits_fitness_mismatch_surcharge() {
        let d = demerits_of(
            Ratio::ZERO,
            FitnessClass::VeryLoose,
            FitnessClass::Decent,
            None,
            false,
            false,
        );
        assert_eq!(d, 100.0 + 10_000.0);
    }

    #[test]
    fn demerits_badness_dominates_sparse_lines() {
        let sparse = demerits_of(
            Ratio::from_ints(130, 20),
            FitnessClass::VeryLoose,
            FitnessClass::Decent,
            None,
            false,
            false,
        );
        // badness saturates at 10_000 → (10 + 10_000)² + mismatch
        assert_eq!(sparse, 10_010.0 * 10_010.0 + 10_000.0);
    }

    // ── Presets ──────────────────────────────────────────────────────

    #[test]
    fn presets_differ_only_in_max_ratio() {
        assert_eq!(
            TexOptimalityCriteria::TIGHT.max_adjustment_ratio,
            Ratio::from_ints(1, 1)
        );
        assert_eq!(
            TexOptimalityCriteria::PERMISSIVE.max_adjustment_ratio,
            Ratio::from_ints(200_000, 1)
        );
        assert_eq!(
            TexOptimalityCriteria::TIGHT.line_penalty,
            TexOptimalityCriteria::STANDARD.line_penalty
        );
    }

    #[test]
    fn default_is_standard() {
        assert_eq!(
            TexOptimalityCriteria::default(),
            TexOptimalityCriteria::STANDARD
        );
    }

    #[test]
    fn builder_setters_replace_fields() {
        let c = TexOptimalityCriteria::STANDARD
            .with_max_ratio(Ratio::from_ints(3, 1))
            .with_looseness(1)
            .with_line_penalty(20.0)
            .with_flagged_cost(5_000.0)
            .with_mismatch_cost(1_000.0);
        assert_eq!(c.max_adjustment_ratio, Ratio::from_ints(3, 1));
        assert_eq!(c.looseness, 1);
        assert_eq!(c.line_penalty, 20.0);
        assert_eq!(c.consecutive_flagged_cost, 5_000.0);
        assert_eq!(c.fitness_mismatch_cost, 1_000.0);
    }
}
