// Copyright (c) 2024 Mike Tsao

//! Numeric types used throughout the system.

use core::{
    fmt::Display,
    ops::{Div, Mul},
};
use serde::{Deserialize, Serialize};

/// Frequency in Hertz. 440 = A4.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrequencyHz(pub f64);
impl FrequencyHz {
    /// Whether this is a frequency that an oscillator can sensibly run at.
    pub fn is_valid(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}
impl Display for FrequencyHz {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{:.2} Hz", self.0))
    }
}
impl From<f64> for FrequencyHz {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
impl From<f32> for FrequencyHz {
    fn from(value: f32) -> Self {
        Self(value as f64)
    }
}
impl From<FrequencyHz> for f64 {
    fn from(value: FrequencyHz) -> Self {
        value.0
    }
}
impl Mul<f64> for FrequencyHz {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}
impl Div<Self> for FrequencyHz {
    type Output = f64;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

/// Loudness in decibels relative to full scale (dBFS). Zero is the loudest
/// value a full-scale signal can reach, and [Decibels::SILENCE] is the floor
/// reported for both true silence and stopped channels.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Decibels(pub f64);
impl Decibels {
    /// The floor value, in dBFS.
    pub const FLOOR_VALUE: f64 = -160.0;
    /// The silence floor.
    pub const SILENCE: Decibels = Decibels(Self::FLOOR_VALUE);

    /// Converts a linear RMS amplitude to dBFS. Anything that isn't positive
    /// lands on the floor.
    pub fn from_rms(rms: f64) -> Self {
        if rms > 0.0 {
            Self((20.0 * rms.log10()).max(Self::FLOOR_VALUE))
        } else {
            Self::SILENCE
        }
    }

    /// Whether this reading is the silence floor.
    pub fn is_silence(&self) -> bool {
        self.0 <= Self::FLOOR_VALUE
    }
}
impl Default for Decibels {
    fn default() -> Self {
        Self::SILENCE
    }
}
impl Display for Decibels {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{:.1} dBFS", self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn decibels_from_rms() {
        assert_eq!(Decibels::from_rms(1.0), Decibels(0.0));
        assert!(approx_eq!(
            f64,
            Decibels::from_rms(0.5).0,
            -6.0206,
            epsilon = 0.0001
        ));
        assert_eq!(Decibels::from_rms(0.0), Decibels::SILENCE);
        assert_eq!(
            Decibels::from_rms(-0.1),
            Decibels::SILENCE,
            "Negative RMS is nonsense and should land on the floor"
        );
        assert_eq!(
            Decibels::from_rms(f64::MIN_POSITIVE),
            Decibels::SILENCE,
            "Vanishingly small RMS should not go below the floor"
        );
    }

    #[test]
    fn frequency_validity() {
        assert!(FrequencyHz(440.0).is_valid());
        assert!(!FrequencyHz(0.0).is_valid());
        assert!(!FrequencyHz(-1.0).is_valid());
        assert!(!FrequencyHz(f64::NAN).is_valid());
        assert!(!FrequencyHz(f64::INFINITY).is_valid());
    }
}
