// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about the channel bank and the
//! tone synthesizer. Intended to be serialized by the host application.

use crate::{bank::MeteringTap, prelude::*, tone::HarmonicAmplitudes};
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Tracks whether a settings struct has changed since it was last persisted.
pub trait HasSettings {
    /// Whether the current values have been persisted.
    fn has_been_saved(&self) -> bool;

    /// Marks the values as changed.
    fn needs_save(&mut self);

    /// Marks the values as persisted.
    fn mark_clean(&mut self);
}

/// Contains persistent channel-bank settings.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct EngineSettings {
    #[derivative(Default(value = "4"))]
    channel_count: usize,

    #[derivative(Default(value = "MeteringTap::DEFAULT_BLOCK_SIZE"))]
    metering_block_size: usize,

    #[derivative(Default(value = "FrequencyHz(2.0)"))]
    snap_tolerance: FrequencyHz,

    #[serde(skip)]
    has_been_saved: bool,
}
impl HasSettings for EngineSettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
    }
}
impl EngineSettings {
    /// How many channels the bank creates. Fixed for the engine's lifetime.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Frames per average-power reading. About 23ms at 44.1KHz by default.
    pub fn metering_block_size(&self) -> usize {
        self.metering_block_size
    }

    /// The farthest a frequency may be from a table pitch and still snap to
    /// it.
    pub fn snap_tolerance(&self) -> FrequencyHz {
        self.snap_tolerance
    }

    #[allow(missing_docs)]
    pub fn set_channel_count(&mut self, channel_count: usize) {
        if channel_count != self.channel_count {
            self.channel_count = channel_count;
            self.needs_save();
        }
    }

    /// Zero is treated as one.
    pub fn set_metering_block_size(&mut self, metering_block_size: usize) {
        let metering_block_size = metering_block_size.max(1);
        if metering_block_size != self.metering_block_size {
            self.metering_block_size = metering_block_size;
            self.needs_save();
        }
    }

    /// Negative and non-finite tolerances are treated as zero, which snaps
    /// only exact matches.
    pub fn set_snap_tolerance(&mut self, snap_tolerance: FrequencyHz) {
        let snap_tolerance = if snap_tolerance.0.is_finite() {
            FrequencyHz(snap_tolerance.0.max(0.0))
        } else {
            FrequencyHz(0.0)
        };
        if snap_tolerance != self.snap_tolerance {
            self.snap_tolerance = snap_tolerance;
            self.needs_save();
        }
    }
}

/// Contains persistent tone-synthesizer settings: the timbre and envelope
/// used by [ToneSynthesizer::play_with_settings()].
///
/// [ToneSynthesizer::play_with_settings()]:
///     crate::tone::ToneSynthesizer::play_with_settings
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct ToneSettings {
    amplitudes: HarmonicAmplitudes,

    #[derivative(Default(value = "Seconds(0.02)"))]
    attack: Seconds,

    #[derivative(Default(value = "Seconds(0.1)"))]
    release: Seconds,

    #[serde(skip)]
    has_been_saved: bool,
}
impl HasSettings for ToneSettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
    }
}
#[allow(missing_docs)]
impl ToneSettings {
    pub fn amplitudes(&self) -> HarmonicAmplitudes {
        self.amplitudes
    }

    pub fn attack(&self) -> Seconds {
        self.attack
    }

    pub fn release(&self) -> Seconds {
        self.release
    }

    pub fn set_amplitudes(&mut self, amplitudes: HarmonicAmplitudes) {
        if amplitudes != self.amplitudes {
            self.amplitudes = amplitudes;
            self.needs_save();
        }
    }

    pub fn set_attack(&mut self, attack: Seconds) {
        if attack != self.attack {
            self.attack = attack;
            self.needs_save();
        }
    }

    pub fn set_release(&mut self, release: Seconds) {
        if release != self.release {
            self.release = release;
            self.needs_save();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_defaults() {
        let s = EngineSettings::default();
        assert_eq!(s.channel_count(), 4);
        assert_eq!(s.metering_block_size(), 1024);
        assert_eq!(s.snap_tolerance(), FrequencyHz(2.0));
    }

    #[test]
    fn engine_settings_round_trip() {
        let mut s = EngineSettings::default();
        s.set_channel_count(8);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"channel-count\":8"), "{json}");
        assert!(!json.contains("has-been-saved"));
        let back: EngineSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.channel_count(), 8);
        assert_eq!(back.metering_block_size(), s.metering_block_size());
    }

    #[test]
    fn setters_mark_dirty_only_on_change() {
        let mut s = EngineSettings::default();
        s.mark_clean();
        s.set_channel_count(4);
        assert!(s.has_been_saved(), "same value isn't a change");
        s.set_metering_block_size(0);
        assert_eq!(s.metering_block_size(), 1);
        assert!(!s.has_been_saved());

        s.mark_clean();
        s.set_snap_tolerance(FrequencyHz(f64::NAN));
        assert_eq!(s.snap_tolerance(), FrequencyHz(0.0));
        assert!(!s.has_been_saved());
    }

    #[test]
    fn tone_settings_round_trip() {
        let mut s = ToneSettings::default();
        s.set_amplitudes(Vowel::O.into());
        s.set_release(Seconds(0.25));
        let json = serde_json::to_string(&s).unwrap();
        let back: ToneSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.amplitudes(), HarmonicAmplitudes::vowel(Vowel::O));
        assert_eq!(back.release(), Seconds(0.25));
        assert_eq!(back.attack(), Seconds(0.02));
    }
}
