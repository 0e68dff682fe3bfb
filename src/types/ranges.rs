// Copyright (c) 2024 Mike Tsao

use core::{fmt::Display, ops::Mul};
use serde::{Deserialize, Serialize};

/// An f64 confined to `[LOWER, UPPER]`, checked on construction and on
/// conversion from f64.
///
/// Clamping happens silently. That's what a gain control wants: a UI slider
/// that overshoots should land on the limit, not produce an error.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RangedF64<const LOWER: i8, const UPPER: i8>(pub f64);
#[allow(missing_docs)]
impl<const LOWER: i8, const UPPER: i8> RangedF64<LOWER, UPPER> {
    /// The highest valid value.
    pub const MAX: f64 = UPPER as f64;
    /// The lowest valid value.
    pub const MIN: f64 = LOWER as f64;

    /// NaN clamps to the lower bound.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(Self::MIN)
        } else {
            Self(value.clamp(Self::MIN, Self::MAX))
        }
    }
    pub const fn maximum() -> Self {
        Self(Self::MAX)
    }
    pub const fn minimum() -> Self {
        Self(Self::MIN)
    }
}
impl<const LOWER: i8, const UPPER: i8> Display for RangedF64<LOWER, UPPER> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{}", self.0))
    }
}
impl<const LOWER: i8, const UPPER: i8> From<RangedF64<LOWER, UPPER>> for f64 {
    fn from(value: RangedF64<LOWER, UPPER>) -> Self {
        value.0
    }
}
impl<const LOWER: i8, const UPPER: i8> From<f64> for RangedF64<LOWER, UPPER> {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// A [Normal] is a RangedF64 whose range is [0.0, 1.0].
pub type Normal = RangedF64<0, 1>;
#[allow(missing_docs)]
impl Normal {
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }
    pub const fn zero() -> Self {
        Self(0.0)
    }
}
impl Default for Normal {
    // A Normal defaults to 1.0. Zero as a default tends to silence a signal
    // that someone forgot to configure.
    fn default() -> Self {
        Self(1.0)
    }
}
impl Mul<Normal> for f64 {
    type Output = Self;

    fn mul(self, rhs: Normal) -> Self::Output {
        self * rhs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_out_of_bounds() {
        assert_eq!(
            Normal::new(-1.0),
            Normal::new(0.0),
            "Normal below 0.0 should be clamped to 0.0"
        );
        assert_eq!(
            Normal::new(1.1),
            Normal::new(1.0),
            "Normal above 1.0 should be clamped to 1.0"
        );
        assert_eq!(
            Normal::new(f64::NAN),
            Normal::zero(),
            "NaN should clamp to the lower bound"
        );
        assert_eq!(Normal::new(f64::INFINITY), Normal::maximum());
    }

    #[test]
    fn normal_scales_samples() {
        assert_eq!(0.8 * Normal::new(0.5), 0.4);
        assert_eq!(0.8 * Normal::zero(), 0.0);
        assert_eq!(f64::from(Normal::from(3.0)), 1.0);
    }
}
