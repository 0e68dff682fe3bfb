// Copyright (c) 2024 Mike Tsao

//! Wall-clock time and sample-rate types.

use core::{fmt::Display, ops::Sub};
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// A length of time, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Seconds(pub f64);
impl Seconds {
    /// Zero seconds.
    pub const fn zero() -> Seconds {
        Seconds(0.0)
    }
}
impl Display for Seconds {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{}s", self.0))
    }
}
impl From<f64> for Seconds {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
impl From<f32> for Seconds {
    fn from(value: f32) -> Self {
        Self(value as f64)
    }
}
impl Sub<Self> for Seconds {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Samples per second. Always positive.
#[derive(Clone, Copy, Debug, Derivative, PartialEq, Eq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct SampleRate(#[derivative(Default(value = "44100"))] pub usize);
#[allow(missing_docs)]
impl SampleRate {
    pub const DEFAULT_SAMPLE_RATE: usize = 44100;
    pub const DEFAULT: SampleRate = SampleRate::new(Self::DEFAULT_SAMPLE_RATE);

    pub const fn new(value: usize) -> Self {
        if value != 0 {
            Self(value)
        } else {
            Self(Self::DEFAULT_SAMPLE_RATE)
        }
    }

    /// The number of whole frames that best approximate the given duration.
    pub fn frames_for(&self, duration: Seconds) -> usize {
        (self.0 as f64 * duration.0).round().max(0.0) as usize
    }

    /// The time at which the given frame index begins.
    pub fn seconds_at(&self, frame: usize) -> Seconds {
        Seconds(frame as f64 / self.0 as f64)
    }
}
impl Display for SampleRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{} Hz", self.0))
    }
}
impl From<f64> for SampleRate {
    fn from(value: f64) -> Self {
        Self::new(value as usize)
    }
}
impl From<u32> for SampleRate {
    fn from(value: u32) -> Self {
        Self::new(value as usize)
    }
}
impl From<SampleRate> for f64 {
    fn from(value: SampleRate) -> Self {
        value.0 as f64
    }
}
impl From<SampleRate> for u32 {
    fn from(value: SampleRate) -> Self {
        value.0 as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_default_is_sane() {
        let sr = SampleRate::default();
        assert_eq!(sr.0, 44100);
        assert_eq!(SampleRate::new(0), SampleRate::DEFAULT);
    }

    #[test]
    fn frames_for_rounds() {
        let sr = SampleRate::new(44100);
        assert_eq!(sr.frames_for(Seconds(0.5)), 22050);
        assert_eq!(sr.frames_for(Seconds(1.0 / 3.0)), 14700);
        assert_eq!(
            SampleRate::new(48000).frames_for(Seconds(0.00001)),
            0,
            "Durations shorter than half a frame round to zero"
        );
        assert_eq!(sr.frames_for(Seconds(-1.0)), 0);
    }
}
