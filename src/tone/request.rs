// Copyright (c) 2024 Mike Tsao

use super::HarmonicAmplitudes;
use crate::{
    error::{Error, Result},
    prelude::*,
    settings::ToneSettings,
};
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Describes one tone to render. Fully resolved: the synthesizer doesn't
/// consult any settings of its own.
#[derive(Clone, Builder, Debug, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case")]
pub struct ToneRequest {
    /// Frequency of the fundamental.
    #[derivative(Default(value = "FrequencyHz(440.0)"))]
    pub frequency: FrequencyHz,
    /// Total length, including attack and release.
    #[derivative(Default(value = "Seconds(0.5)"))]
    pub duration: Seconds,
    #[allow(missing_docs)]
    pub amplitudes: HarmonicAmplitudes,
    #[allow(missing_docs)]
    #[derivative(Default(value = "Seconds(0.02)"))]
    pub attack: Seconds,
    #[allow(missing_docs)]
    #[derivative(Default(value = "Seconds(0.1)"))]
    pub release: Seconds,
}
impl ToneRequest {
    /// Fills in timbre and envelope from application settings.
    pub fn new_with_settings(
        frequency: FrequencyHz,
        duration: Seconds,
        settings: &ToneSettings,
    ) -> Self {
        Self {
            frequency,
            duration,
            amplitudes: settings.amplitudes(),
            attack: settings.attack(),
            release: settings.release(),
        }
    }

    /// Rejects requests that can't produce a sensible buffer.
    pub fn validate(&self) -> Result<()> {
        if !self.frequency.is_valid() {
            return Err(Error::InvalidToneRequest(format!(
                "frequency {} must be positive and finite",
                self.frequency
            )));
        }
        if !self.duration.0.is_finite() || self.duration.0 <= 0.0 {
            return Err(Error::InvalidToneRequest(format!(
                "duration {} must be positive and finite",
                self.duration
            )));
        }
        for (name, value) in [("attack", self.attack), ("release", self.release)] {
            if !value.0.is_finite() || value.0 < 0.0 {
                return Err(Error::InvalidToneRequest(format!(
                    "{name} {value} must be non-negative"
                )));
            }
        }
        if self.attack.0 + self.release.0 > self.duration.0 {
            return Err(Error::InvalidToneRequest(format!(
                "attack {} plus release {} exceeds duration {}",
                self.attack, self.release, self.duration
            )));
        }
        let formant_frequency = self.amplitudes.formant_frequency.0;
        if !formant_frequency.is_finite() || formant_frequency < 0.0 {
            return Err(Error::InvalidToneRequest(format!(
                "formant frequency {formant_frequency} must be non-negative"
            )));
        }
        Ok(())
    }

    /// The envelope this request's buffer is shaped with.
    pub fn envelope(&self) -> LinearEnvelope {
        LinearEnvelope::new_with(self.attack, self.release, self.duration)
    }
}

/// A fully rendered mono tone. Immutable once built; the audio thread only
/// reads from it.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedBuffer {
    sample_rate: SampleRate,
    samples: Vec<f32>,
}
impl RenderedBuffer {
    /// Keeps the sum of partials at default amplitudes well under full scale.
    pub const HEADROOM: f64 = 0.27;

    /// The formant partial is mixed in at this fraction of its amplitude.
    pub const FORMANT_SCALE: f64 = 0.20;

    /// Renders `request` in full. The buffer holds `round(duration *
    /// sample_rate)` frames. `rng` is drawn from only when the request asks
    /// for noise.
    pub fn render(request: &ToneRequest, sample_rate: SampleRate, rng: &mut Rng) -> Result<Self> {
        request.validate()?;
        let frames = sample_rate.frames_for(request.duration);
        if frames == 0 {
            return Err(Error::InvalidToneRequest(format!(
                "duration {} is shorter than one frame at {sample_rate}",
                request.duration
            )));
        }
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(frames)
            .map_err(|_| Error::AllocationFailure { frames })?;

        let envelope = request.envelope();
        let amplitudes = &request.amplitudes;
        let frequency = request.frequency.0;
        let formant_frequency = amplitudes.formant_frequency.0;
        let formant = amplitudes.formant.0 * Self::FORMANT_SCALE;
        let noise = amplitudes.noise.0;
        let rate = f64::from(sample_rate);

        samples.extend((0..frames).map(|i| {
            let t = i as f64 / rate;
            let angle = TAU * t;
            let mut raw = amplitudes.fundamental.0 * (angle * frequency).sin()
                + amplitudes.harmonic2.0 * (angle * frequency * 2.0).sin()
                + amplitudes.harmonic3.0 * (angle * frequency * 3.0).sin()
                + formant * (angle * formant_frequency).sin();
            if noise > 0.0 {
                raw += noise * rng.rand_bipolar();
            }
            (raw * envelope.amplitude_at(Seconds(t)) * Self::HEADROOM) as f32
        }));
        Ok(Self {
            sample_rate,
            samples,
        })
    }

    #[allow(missing_docs)]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[allow(missing_docs)]
    pub fn frame_count(&self) -> usize {
        self.samples.len()
    }

    #[allow(missing_docs)]
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Playback length at the buffer's sample rate.
    pub fn duration(&self) -> Seconds {
        self.sample_rate.seconds_at(self.samples.len())
    }
}
