#![forbid(unsafe_code)]

//! Fixed-point distances and exact-fraction ratios.
//!
//! Every measurement in the galley pipeline is a [`Distance`]: a signed
//! fixed-point length counted in scaled points (65 536 sp = 1 pt), the same
//! sub-unit TeX uses. Elasticity computations produce a [`Ratio`] of two
//! distances that is compared by cross-multiplication in widened integers,
//! never by converting to floating point, so the same inputs order the same
//! way on every platform.
//!
//! # Example
//! ```
//! use galley_units::{Distance, Ratio};
//!
//! let excess = Distance::from_sp(50);
//! let stretch = Distance::from_sp(40);
//! let r = Ratio::new(excess, stretch);
//! assert!(Ratio::from_ints(1, 1).lt(r)); // 50/40 > 1
//! assert!(r.le(Ratio::from_ints(3, 2)));
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Rem, Sub, SubAssign};

// =========================================================================
// Distance
// =========================================================================

/// Scaled points per printer's point.
pub const SP_PER_POINT: i64 = 65_536;

/// A signed fixed-point length in scaled points.
///
/// One abstract unit is 1 sp; producers that think in points can use
/// [`Distance::from_points`]. The algorithm layer never converts between
/// physical units, it only adds, compares, and scales distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Distance(i64);

impl Distance {
    /// Zero length.
    pub const ZERO: Self = Self(0);
    /// One printer's point.
    pub const POINT: Self = Self(SP_PER_POINT);
    /// Smallest representable length.
    pub const MIN: Self = Self(i64::MIN);
    /// Largest representable length.
    pub const MAX: Self = Self(i64::MAX);

    /// Create a distance from a raw scaled-point count.
    #[inline]
    #[must_use]
    pub const fn from_sp(sp: i64) -> Self {
        Self(sp)
    }

    /// Create a distance from a whole number of points.
    #[inline]
    #[must_use]
    pub const fn from_points(points: i64) -> Self {
        Self(points * SP_PER_POINT)
    }

    /// The raw scaled-point count.
    #[inline]
    #[must_use]
    pub const fn sp(self) -> i64 {
        self.0
    }

    /// Absolute value.
    #[inline]
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Whether this distance is exactly zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether this distance is negative.
    #[inline]
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// The smaller of two distances.
    #[inline]
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// The larger of two distances.
    #[inline]
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

impl From<i64> for Distance {
    fn from(sp: i64) -> Self {
        Self(sp)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Distance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Distance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Distance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Distance {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<i64> for Distance {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<i64> for Distance {
    type Output = Self;
    fn div(self, rhs: i64) -> Self {
        Self(self.0 / rhs)
    }
}

impl Rem<i64> for Distance {
    type Output = Self;
    fn rem(self, rhs: i64) -> Self {
        Self(self.0 % rhs)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}sp", self.0)
    }
}

// =========================================================================
// Ratio
// =========================================================================

/// An exact fraction of two distances.
///
/// Used for adjustment ratios and fitness thresholds. A zero denominator
/// encodes signed infinity, with the sign taken from the numerator;
/// [`Ratio::ZERO`] is `0/1`. Constructors normalize any negative
/// denominator into the numerator, so the denominator is never negative
/// and cross-multiplied comparisons keep their sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ratio {
    /// Numerator.
    pub num: Distance,
    /// Denominator (never negative after construction).
    pub den: Distance,
}

impl Ratio {
    /// The zero ratio, `0/1`.
    pub const ZERO: Self = Self {
        num: Distance::ZERO,
        den: Distance::from_sp(1),
    };

    /// Create a ratio, normalizing a negative denominator into the numerator.
    #[inline]
    #[must_use]
    pub const fn new(num: Distance, den: Distance) -> Self {
        if den.sp() < 0 {
            Self {
                num: Distance::from_sp(-num.sp()),
                den: Distance::from_sp(-den.sp()),
            }
        } else {
            Self { num, den }
        }
    }

    /// Create a ratio from raw scaled-point counts.
    #[inline]
    #[must_use]
    pub const fn from_ints(num: i64, den: i64) -> Self {
        Self::new(Distance::from_sp(num), Distance::from_sp(den))
    }

    /// Whether this ratio encodes signed infinity.
    #[inline]
    #[must_use]
    pub const fn is_infinite(self) -> bool {
        self.den.sp() == 0
    }

    /// Whether this ratio is exactly zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.num.sp() == 0 && self.den.sp() != 0
    }

    /// Strict fraction ordering: `self < other`.
    ///
    /// Compares `self.num * other.den` against `other.num * self.den` in
    /// 128-bit arithmetic; with non-negative denominators this orders
    /// every finite ratio correctly and places `±∞` at the ends. Two
    /// infinities of the same sign compare as equal.
    #[inline]
    #[must_use]
    pub fn lt(self, other: Self) -> bool {
        self.cross(other) < other.cross(self)
    }

    /// Fraction ordering: `self <= other`.
    #[inline]
    #[must_use]
    pub fn le(self, other: Self) -> bool {
        self.cross(other) <= other.cross(self)
    }

    /// `self.num * other.den`, widened.
    #[inline]
    fn cross(self, other: Self) -> i128 {
        self.num.sp() as i128 * other.den.sp() as i128
    }

    /// `floor(by * self)` — scale a distance by this ratio, rounding toward
    /// negative infinity. An infinite ratio scales everything to zero;
    /// callers gate on [`Ratio::is_infinite`] first.
    #[must_use]
    pub fn scale(self, by: Distance) -> Distance {
        if self.is_infinite() {
            return Distance::ZERO;
        }
        let scaled = (by.sp() as i128 * self.num.sp() as i128).div_euclid(self.den.sp() as i128);
        Distance::from_sp(i64::try_from(scaled).unwrap_or(if scaled > 0 {
            i64::MAX
        } else {
            i64::MIN
        }))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            if self.num.is_negative() {
                write!(f, "-inf")
            } else {
                write!(f, "+inf")
            }
        } else {
            write!(f, "{}/{}", self.num.sp(), self.den.sp())
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
