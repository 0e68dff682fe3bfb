// Copyright (c) 2024 Mike Tsao

use super::{snap, ChannelParams, MeterMailbox, MeteringTap, Pitch, PitchTable};
use crate::{
    error::{Error, Result},
    prelude::*,
};
use core::sync::atomic::AtomicBool;
use std::sync::Arc;

/// The control-rate half of one oscillator channel. Every setter updates both
/// the observable fields here and the lock-free [ChannelParams] that the
/// channel's [ChannelVoice] reads on the render thread.
#[derive(Debug)]
pub struct Channel {
    id: ChannelId,
    waveform: Waveform,
    frequency: FrequencyHz,
    gain: Normal,
    is_playing: bool,
    snapped_pitch: Option<Pitch>,
    average_power: Decibels,

    params: Arc<ChannelParams>,
    meter: MeterMailbox,
}
impl Channel {
    /// A channel's gain until someone changes it.
    pub const DEFAULT_GAIN: Normal = Normal::new_const(0.5);

    /// Snapping to a pitch this close to the current frequency is a no-op.
    /// Keeps a snap from bouncing back and forth with the frequency it set.
    pub const SNAP_EPSILON_HZ: f64 = 1.0e-3;

    /// The frequency a channel starts at.
    pub const DEFAULT_FREQUENCY: FrequencyHz = FrequencyHz(440.0);

    /// Creates a stopped channel. Fails if `frequency` isn't positive and
    /// finite.
    pub fn new_with(
        id: ChannelId,
        waveform: Waveform,
        frequency: FrequencyHz,
        gain: Normal,
        pitch_table: &PitchTable,
        tolerance: FrequencyHz,
    ) -> Result<Self> {
        Self::check_frequency(frequency)?;
        Ok(Self::new_unchecked(
            id,
            waveform,
            frequency,
            gain,
            pitch_table,
            tolerance,
        ))
    }

    /// Creates a stopped sine channel at [Self::DEFAULT_FREQUENCY] and
    /// [Self::DEFAULT_GAIN].
    pub fn new_default(id: ChannelId, pitch_table: &PitchTable, tolerance: FrequencyHz) -> Self {
        Self::new_unchecked(
            id,
            Waveform::default(),
            Self::DEFAULT_FREQUENCY,
            Self::DEFAULT_GAIN,
            pitch_table,
            tolerance,
        )
    }

    fn new_unchecked(
        id: ChannelId,
        waveform: Waveform,
        frequency: FrequencyHz,
        gain: Normal,
        pitch_table: &PitchTable,
        tolerance: FrequencyHz,
    ) -> Self {
        Self {
            id,
            waveform,
            frequency,
            gain,
            is_playing: false,
            snapped_pitch: snap(frequency, pitch_table, tolerance).cloned(),
            average_power: Decibels::SILENCE,
            params: Arc::new(ChannelParams::new_with(waveform, frequency, gain, false)),
            meter: Default::default(),
        }
    }

    fn check_frequency(frequency: FrequencyHz) -> Result<()> {
        if frequency.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidParameter(format!(
                "frequency must be positive and finite, not {}",
                frequency.0
            )))
        }
    }

    #[allow(missing_docs)]
    pub fn id(&self) -> ChannelId {
        self.id
    }

    #[allow(missing_docs)]
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    #[allow(missing_docs)]
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
        self.params.set_waveform(waveform);
    }

    #[allow(missing_docs)]
    pub fn frequency(&self) -> FrequencyHz {
        self.frequency
    }

    /// Sets the frequency and recomputes [Self::snapped_pitch()].
    pub fn set_frequency(
        &mut self,
        frequency: FrequencyHz,
        pitch_table: &PitchTable,
        tolerance: FrequencyHz,
    ) -> Result<()> {
        Self::check_frequency(frequency)?;
        self.frequency = frequency;
        self.params.set_frequency(frequency);
        self.snapped_pitch = snap(frequency, pitch_table, tolerance).cloned();
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn gain(&self) -> Normal {
        self.gain
    }

    /// [Normal] has already clamped `gain` into [0.0, 1.0].
    pub fn set_gain(&mut self, gain: Normal) {
        self.gain = gain;
        self.params.set_gain(gain);
    }

    #[allow(missing_docs)]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Returns whether the value actually changed. Takes effect on the very
    /// next rendered sample.
    pub fn set_playing(&mut self, is_playing: bool) -> bool {
        if is_playing == self.is_playing {
            return false;
        }
        self.is_playing = is_playing;
        self.params.set_is_playing(is_playing);
        true
    }

    /// The named pitch nearest [Self::frequency()], if any is within
    /// tolerance.
    pub fn snapped_pitch(&self) -> Option<&Pitch> {
        self.snapped_pitch.as_ref()
    }

    /// Moves the frequency onto `pitch`. Does nothing if `pitch` is already
    /// the snapped pitch, or if the frequency is already within
    /// [Self::SNAP_EPSILON_HZ] of it. Returns whether the frequency changed.
    pub fn set_snapped_pitch(
        &mut self,
        pitch: &Pitch,
        pitch_table: &PitchTable,
        tolerance: FrequencyHz,
    ) -> Result<bool> {
        if self
            .snapped_pitch
            .as_ref()
            .is_some_and(|p| p.name() == pitch.name())
        {
            return Ok(false);
        }
        if (pitch.frequency().0 - self.frequency.0).abs() < Self::SNAP_EPSILON_HZ {
            return Ok(false);
        }
        self.set_frequency(pitch.frequency(), pitch_table, tolerance)?;
        Ok(true)
    }

    /// The most recent loudness reading delivered from the render thread.
    pub fn average_power(&self) -> Decibels {
        self.average_power
    }

    /// Folds the latest metering reading, if any, into
    /// [Self::average_power()]. Returns whether a reading arrived.
    pub(crate) fn poll_meter(&mut self) -> bool {
        if let Some(reading) = self.meter.take() {
            self.average_power = reading;
            true
        } else {
            false
        }
    }

    /// Drops any pending reading and returns to the floor.
    pub(crate) fn reset_meter(&mut self) {
        let _ = self.meter.take();
        self.average_power = Decibels::SILENCE;
    }

    /// Creates the render-rate half of this channel. The voice reads this
    /// channel's parameters and publishes to this channel's meter.
    pub fn voice(
        &self,
        metering_block_size: usize,
        metering_enabled: Arc<AtomicBool>,
    ) -> ChannelVoice {
        ChannelVoice {
            params: Arc::clone(&self.params),
            oscillator: Oscillator::new_with(self.waveform, self.frequency, SampleRate::DEFAULT),
            tap: MeteringTap::new_with(metering_block_size, self.meter.clone(), metering_enabled),
        }
    }
}

/// The render-rate half of a [Channel]. Owns the oscillator's phase; nothing
/// else touches it.
#[derive(Debug)]
pub struct ChannelVoice {
    params: Arc<ChannelParams>,
    oscillator: Oscillator,
    tap: MeteringTap,
}
impl Configurable for ChannelVoice {
    fn sample_rate(&self) -> SampleRate {
        self.oscillator.sample_rate()
    }

    fn update_sample_rate(&mut self, sample_rate: SampleRate) {
        self.oscillator.update_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.oscillator.reset();
    }
}
impl ChannelVoice {
    /// Renders one sample: the oscillator's output scaled by gain, or exactly
    /// zero if the channel isn't playing. The oscillator keeps running either
    /// way.
    #[inline]
    pub fn tick(&mut self) -> f64 {
        let params = self.params.snapshot();
        self.oscillator.set_waveform(params.waveform);
        self.oscillator.set_frequency(params.frequency);
        let sample = self.oscillator.tick();
        let output = if params.is_playing {
            sample * params.gain
        } else {
            0.0
        };
        self.tap.observe(output, params.is_playing);
        output
    }

    /// The oscillator's current phase.
    pub fn phase(&self) -> f64 {
        self.oscillator.phase()
    }
}
