// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use core::f64::consts::PI;
use derivative::Derivative;
use derive_builder::Builder;
use kahan::KahanSum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// Classic oscillator waveforms. None of them is band-limited, so everything
/// except [Waveform::Sine] aliases at high frequencies.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    Eq,
    FromRepr,
    IntoStaticStr,
    PartialEq,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum Waveform {
    /// Sine wave
    #[default]
    Sine,
    /// Square wave
    Square,
    /// Sawtooth wave
    Sawtooth,
    /// Triangle wave
    Triangle,
}
impl Waveform {
    // https://en.wikipedia.org/wiki/Sine_wave
    // https://en.wikipedia.org/wiki/Square_wave
    // https://en.wikipedia.org/wiki/Triangle_wave
    // https://en.wikipedia.org/wiki/Sawtooth_wave
    //
    // Phase zero is the start of the cycle: sine 0, square +1, sawtooth -1,
    // triangle +1.
    /// The amplitude of this waveform at the given phase, which must be in
    /// [0.0, 1.0).
    #[inline]
    pub fn amplitude_at(&self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (phase * 2.0 * PI).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * (phase - 0.5),
            Waveform::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
        }
    }

    /// Inverse of `u8::from(waveform)`. Unknown values become the default.
    pub fn from_u8(value: u8) -> Self {
        Self::from_repr(value).unwrap_or_default()
    }
}
impl From<Waveform> for u8 {
    fn from(value: Waveform) -> Self {
        value as u8
    }
}

/// A phase-accumulating signal generator that produces the traditional
/// [Waveform]s.
#[derive(Clone, Builder, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case")]
pub struct Oscillator {
    /// The fundamental waveform for this oscillator.
    pub waveform: Waveform,

    /// Hertz. Any positive number; above Nyquist it aliases. 440 = A4
    #[derivative(Default(value = "FrequencyHz(440.0)"))]
    pub frequency: FrequencyHz,

    #[serde(skip)]
    #[builder(setter(skip))]
    e: OscillatorEphemerals,
}
#[derive(Clone, Debug, Default)]
pub struct OscillatorEphemerals {
    sample_rate: SampleRate,

    // The cursor in the current cycle, in [0.0, 1.0). Frequency can change
    // from one sample to the next, so we accumulate rather than recompute from
    // a sample count.
    //
    // Kahan summation keeps FP error from drifting the phase over long runs.
    phase: KahanSum<f64>,

    delta: f64,
    delta_updated: bool,
}
impl Configurable for Oscillator {
    fn sample_rate(&self) -> SampleRate {
        self.e.sample_rate
    }

    fn update_sample_rate(&mut self, sample_rate: SampleRate) {
        self.e.sample_rate = sample_rate;
        self.e.delta_updated = false;
        self.reset();
    }

    fn reset(&mut self) {
        self.e.phase = KahanSum::new();
    }
}
impl Oscillator {
    /// The largest per-sample phase increment we allow. Anything under a full
    /// cycle keeps the single conditional subtraction in [Self::advance()]
    /// landing back in [0.0, 1.0). Frequencies above Nyquist alias.
    pub const MAX_DELTA: f64 = 1.0 - f64::EPSILON;

    /// Creates an oscillator that's ready to run at the given sample rate.
    pub fn new_with(waveform: Waveform, frequency: FrequencyHz, sample_rate: SampleRate) -> Self {
        let mut r = Self {
            waveform,
            frequency,
            e: Default::default(),
        };
        r.update_sample_rate(sample_rate);
        r
    }

    /// Produces the sample at the current phase, then advances the phase by
    /// one sample.
    #[inline]
    pub fn tick(&mut self) -> f64 {
        self.update_delta();
        let amplitude = self.waveform.amplitude_at(self.e.phase.sum());
        self.e.phase += self.e.delta;
        if self.e.phase.sum() >= 1.0 {
            self.e.phase += -1.0;
        }
        amplitude
    }

    /// Given a waveform, frequency, sample rate, and phase, returns one sample
    /// and the next phase. This is the stateless form of [Self::tick()].
    pub fn step(
        waveform: Waveform,
        frequency: FrequencyHz,
        sample_rate: SampleRate,
        phase: f64,
    ) -> (f64, f64) {
        (
            waveform.amplitude_at(phase),
            Self::advance(phase, Self::delta_for(frequency, sample_rate)),
        )
    }

    /// Adds `delta` to `phase` and wraps back into [0.0, 1.0). `delta` must be
    /// less than 1.0, which is why this is a subtraction and not a modulo.
    #[inline]
    pub fn advance(phase: f64, delta: f64) -> f64 {
        let next = phase + delta;
        if next >= 1.0 {
            next - 1.0
        } else {
            next
        }
    }

    /// The per-sample phase increment for a frequency at a sample rate.
    pub fn delta_for(frequency: FrequencyHz, sample_rate: SampleRate) -> f64 {
        let delta = frequency.0 / sample_rate.0 as f64;
        if delta.is_finite() {
            delta.clamp(0.0, Self::MAX_DELTA)
        } else {
            0.0
        }
    }

    /// The current position in the cycle, in [0.0, 1.0).
    pub fn phase(&self) -> f64 {
        self.e.phase.sum()
    }

    #[allow(missing_docs)]
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    #[allow(missing_docs)]
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    #[allow(missing_docs)]
    pub fn frequency(&self) -> FrequencyHz {
        self.frequency
    }

    /// Changes frequency without touching phase. No smoothing happens, so a
    /// large jump can be audible.
    #[inline]
    pub fn set_frequency(&mut self, frequency: FrequencyHz) {
        if frequency != self.frequency {
            self.frequency = frequency;
            self.e.delta_updated = false;
        }
    }

    fn update_delta(&mut self) {
        if !self.e.delta_updated {
            self.e.delta = Self::delta_for(self.frequency, self.e.sample_rate);

            // This resets the accumulated error.
            self.e.phase = KahanSum::new_with_value(self.e.phase.sum());

            self.e.delta_updated = true;
        }
    }
}
