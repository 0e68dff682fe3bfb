// Copyright (c) 2024 Mike Tsao

use super::{Channel, ChannelVoice, Pitch, PitchTable};
use crate::{
    error::{Error, Result},
    prelude::*,
    settings::EngineSettings,
};
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Owns a bank of [Channel]s and the audio backend session that renders them.
///
/// Everything here runs at control rate. [Engine::start()] hands a
/// [BankRenderer] to the backend; after that, the only traffic between the
/// two threads is atomic parameter writes in one direction and metering
/// mailboxes in the other.
#[derive(Debug)]
pub struct Engine {
    settings: EngineSettings,
    pitch_table: PitchTable,
    channels: Vec<Channel>,
    is_any_channel_playing: bool,

    // Shared with every MeteringTap in the current renderer.
    metering_enabled: Arc<AtomicBool>,
    is_metering_attached: bool,

    // Fixed when the backend starts, and cleared when it stops.
    sample_rate: Option<SampleRate>,
}
impl Engine {
    /// Creates `settings.channel_count` stopped channels. Nothing is rendered
    /// until [Engine::start()].
    pub fn new_with(settings: EngineSettings, pitch_table: PitchTable) -> Self {
        let ids = ChannelIdFactory::default();
        let channels = (0..settings.channel_count())
            .map(|_| Channel::new_default(ids.mint_next(), &pitch_table, settings.snap_tolerance()))
            .collect();
        Self {
            settings,
            pitch_table,
            channels,
            is_any_channel_playing: false,
            metering_enabled: Arc::new(AtomicBool::new(false)),
            is_metering_attached: false,
            sample_rate: None,
        }
    }

    /// Builds the render graph, starts `backend`, and fixes the sample rate
    /// for as long as it runs. On failure the engine stays stopped; call
    /// again to retry.
    pub fn start(&mut self, backend: &mut dyn AudioBackend) -> Result<SampleRate> {
        if self.sample_rate.is_some() {
            return Err(Error::AlreadyStarted);
        }
        self.metering_enabled = Arc::new(AtomicBool::new(true));
        let renderer = self.renderer();
        match backend.start(Box::new(renderer)) {
            Ok(sample_rate) => {
                log::info!(
                    "Channel bank started: {} channels at {sample_rate}",
                    self.channels.len()
                );
                self.sample_rate = Some(sample_rate);
                self.is_metering_attached = true;
                Ok(sample_rate)
            }
            Err(e) => {
                log::error!("Couldn't start the channel bank: {e}");
                self.metering_enabled.store(false, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Stops the backend and detaches metering. A new [Engine::start()] is
    /// needed before anything is heard again, and that's also the only way
    /// to change the sample rate.
    pub fn stop(&mut self, backend: &mut dyn AudioBackend) {
        self.cleanup();
        backend.stop();
        if self.sample_rate.take().is_some() {
            log::info!("Channel bank stopped");
        }
    }

    /// Detaches metering: taps stop publishing and every channel's
    /// [Channel::average_power()] drops to the floor. The backend keeps
    /// running; use [Engine::stop()] to stop it too.
    pub fn cleanup(&mut self) {
        self.metering_enabled.store(false, Ordering::Relaxed);
        self.is_metering_attached = false;
        self.channels.iter_mut().for_each(|c| c.reset_meter());
    }

    /// Creates the render-rate half of the bank. [Engine::start()] calls this
    /// for you; it's public so the bank can be driven by something other
    /// than an [AudioBackend].
    pub fn renderer(&self) -> BankRenderer {
        BankRenderer {
            voices: self
                .channels
                .iter()
                .map(|c| {
                    c.voice(
                        self.settings.metering_block_size(),
                        Arc::clone(&self.metering_enabled),
                    )
                })
                .collect(),
        }
    }

    /// Whether a backend is currently running.
    pub fn is_started(&self) -> bool {
        self.sample_rate.is_some()
    }

    /// The sample rate fixed at [Engine::start()], if running.
    pub fn sample_rate(&self) -> Option<SampleRate> {
        self.sample_rate
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[allow(missing_docs)]
    pub fn pitch_table(&self) -> &PitchTable {
        &self.pitch_table
    }

    #[allow(missing_docs)]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[allow(missing_docs)]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    #[allow(missing_docs)]
    pub fn channel(&self, index: usize) -> Result<&Channel> {
        let len = self.channels.len();
        self.channels
            .get(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    fn channel_mut(&mut self, index: usize) -> Result<&mut Channel> {
        let len = self.channels.len();
        self.channels
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    #[allow(missing_docs)]
    pub fn set_waveform(&mut self, index: usize, waveform: Waveform) -> Result<()> {
        self.channel_mut(index)?.set_waveform(waveform);
        Ok(())
    }

    /// Also recomputes the channel's snapped pitch.
    pub fn set_frequency(&mut self, index: usize, frequency: FrequencyHz) -> Result<()> {
        let tolerance = self.settings.snap_tolerance();
        let len = self.channels.len();
        let channel = self
            .channels
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        channel.set_frequency(frequency, &self.pitch_table, tolerance)
    }

    #[allow(missing_docs)]
    pub fn set_gain(&mut self, index: usize, gain: Normal) -> Result<()> {
        self.channel_mut(index)?.set_gain(gain);
        Ok(())
    }

    /// Starts or stops one channel and refreshes
    /// [Engine::is_any_channel_playing()].
    pub fn set_playing(&mut self, index: usize, is_playing: bool) -> Result<()> {
        if self.channel_mut(index)?.set_playing(is_playing) {
            self.update_any_channel_playing();
        }
        Ok(())
    }

    /// Moves a channel's frequency onto `pitch`. See
    /// [Channel::set_snapped_pitch()].
    pub fn set_snapped_pitch(&mut self, index: usize, pitch: &Pitch) -> Result<bool> {
        let tolerance = self.settings.snap_tolerance();
        let len = self.channels.len();
        let channel = self
            .channels
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        channel.set_snapped_pitch(pitch, &self.pitch_table, tolerance)
    }

    /// Whether at least one channel is playing.
    pub fn is_any_channel_playing(&self) -> bool {
        self.is_any_channel_playing
    }

    fn update_any_channel_playing(&mut self) {
        self.is_any_channel_playing = self.channels.iter().any(|c| c.is_playing());
    }

    /// Collects the latest loudness reading for each channel. Call this from
    /// the UI loop. Returns how many channels had a new reading.
    pub fn poll_meters(&mut self) -> usize {
        if !self.is_metering_attached {
            return 0;
        }
        self.channels
            .iter_mut()
            .map(|c| c.poll_meter())
            .filter(|has_reading| *has_reading)
            .count()
    }
}

/// The render graph: each channel's voice feeds a single summing point.
#[derive(Debug)]
pub struct BankRenderer {
    voices: Vec<ChannelVoice>,
}
impl RendersAudio for BankRenderer {
    fn prepare(&mut self, sample_rate: SampleRate) {
        self.voices
            .iter_mut()
            .for_each(|v| v.update_sample_rate(sample_rate));
    }

    fn render(&mut self, output: &mut [f32]) {
        for frame in output.iter_mut() {
            *frame = self.voices.iter_mut().map(|v| v.tick()).sum::<f64>() as f32;
        }
    }
}
