// Copyright (c) 2024 Mike Tsao

use super::{RenderedBuffer, ToneRequest};
use crate::{
    error::{Error, Result},
    prelude::*,
    settings::ToneSettings,
};
use core::sync::atomic::{AtomicBool, Ordering};
use crossbeam::{
    channel::{Receiver, Sender},
    queue::ArrayQueue,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use synonym::Synonym;

/// Identifies one call to [ToneSynthesizer::play()].
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
#[synonym(skip(PartialEq))]
pub struct ToneId(pub u64);

/// Lifecycle notifications from the voice, delivered at control rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToneEvent {
    /// The voice began playing this tone.
    Started(ToneId),
    /// The tone played to its last sample.
    Finished(ToneId),
    /// The tone was cut off by [ToneSynthesizer::stop()] or by a newer tone.
    Stopped(ToneId),
}

#[derive(Debug)]
enum VoiceCommand {
    Play(ToneId, Arc<RenderedBuffer>),
    Stop,
}

/// Holds the newest unread command. Posting replaces whatever the voice
/// hasn't picked up yet.
type VoiceMailbox = Arc<ArrayQueue<VoiceCommand>>;

// The control side's ends of the channels to the current voice.
#[derive(Debug)]
struct VoiceLink {
    commands: VoiceMailbox,
    events: Receiver<ToneEvent>,
    retired: Receiver<Arc<RenderedBuffer>>,
}

/// Renders short additive tones on the control thread and plays them, one at
/// a time, on the audio thread.
///
/// Rendering and allocation happen in [ToneSynthesizer::play()]. The audio
/// thread only copies samples out of a finished buffer, and buffers that
/// finish playing are handed back here to be freed.
#[derive(Debug)]
pub struct ToneSynthesizer {
    settings: ToneSettings,
    rng: Rng,
    sample_rate: Option<SampleRate>,
    link: Option<VoiceLink>,
    current: Option<ToneId>,
    next_id: u64,
    is_sounding: Arc<AtomicBool>,
}
impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self::new_with(ToneSettings::default(), Rng::default())
    }
}
impl ToneSynthesizer {
    const EVENT_CAPACITY: usize = 64;
    const RETIRED_CAPACITY: usize = 16;

    #[allow(missing_docs)]
    pub fn new_with(settings: ToneSettings, rng: Rng) -> Self {
        Self {
            settings,
            rng,
            sample_rate: None,
            link: None,
            current: None,
            next_id: 1,
            is_sounding: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Noise is drawn from a generator seeded with `seed`, so renders are
    /// reproducible.
    pub fn new_with_seed(settings: ToneSettings, seed: u128) -> Self {
        Self::new_with(settings, Rng::new_with_seed(seed))
    }

    /// Attaches a fresh [ToneVoice] to `backend`.
    pub fn start(&mut self, backend: &mut dyn AudioBackend) -> Result<SampleRate> {
        if self.sample_rate.is_some() {
            return Err(Error::AlreadyStarted);
        }
        let commands = Arc::new(ArrayQueue::new(1));
        let (event_sender, event_receiver) = crossbeam::channel::bounded(Self::EVENT_CAPACITY);
        let (retired_sender, retired_receiver) =
            crossbeam::channel::bounded(Self::RETIRED_CAPACITY);
        self.is_sounding = Arc::new(AtomicBool::new(false));
        let voice = ToneVoice::new_with(
            Arc::clone(&commands),
            event_sender,
            retired_sender,
            Arc::clone(&self.is_sounding),
        );
        match backend.start(Box::new(voice)) {
            Ok(sample_rate) => {
                log::info!("Tone synthesizer started at {sample_rate}");
                self.sample_rate = Some(sample_rate);
                self.link = Some(VoiceLink {
                    commands,
                    events: event_receiver,
                    retired: retired_receiver,
                });
                Ok(sample_rate)
            }
            Err(e) => {
                log::error!("Tone synthesizer failed to start: {e}");
                Err(e)
            }
        }
    }

    /// Stops `backend` and forgets the voice.
    pub fn shut_down(&mut self, backend: &mut dyn AudioBackend) {
        backend.stop();
        self.link = None;
        self.sample_rate = None;
        self.current = None;
        self.is_sounding.store(false, Ordering::Release);
    }

    /// Renders `request` and plays it, replacing anything already playing.
    /// If the voice hasn't picked up an earlier request yet, that request is
    /// dropped and never sounds.
    pub fn play(&mut self, request: &ToneRequest) -> Result<ToneId> {
        let sample_rate = self.sample_rate.ok_or(Error::NotStarted)?;
        request.validate()?;
        let buffer = RenderedBuffer::render(request, sample_rate, &mut self.rng)?;
        let id = ToneId(self.next_id);
        self.next_id += 1;
        self.post(VoiceCommand::Play(id, Arc::new(buffer)))?;
        log::debug!(
            "Tone {id} queued: {} for {}",
            request.frequency,
            request.duration
        );
        self.current = Some(id);
        self.collect_retired();
        Ok(id)
    }

    /// [ToneSynthesizer::play()] with timbre and envelope from this
    /// synthesizer's settings.
    pub fn play_with_settings(
        &mut self,
        frequency: FrequencyHz,
        duration: Seconds,
    ) -> Result<ToneId> {
        let request = ToneRequest::new_with_settings(frequency, duration, &self.settings);
        self.play(&request)
    }

    /// Silences the voice as of its next block. Does nothing if no tone is
    /// playing.
    pub fn stop(&mut self) -> Result<()> {
        if self.current.is_some() {
            self.post(VoiceCommand::Stop)?;
            self.current = None;
        }
        self.collect_retired();
        Ok(())
    }

    /// Renders `request` without playing it, at the running sample rate or
    /// the default if not started.
    pub fn render(&mut self, request: &ToneRequest) -> Result<RenderedBuffer> {
        let sample_rate = self.sample_rate.unwrap_or_default();
        RenderedBuffer::render(request, sample_rate, &mut self.rng)
    }

    /// The next lifecycle event from the voice, if one is waiting.
    pub fn try_recv_event(&mut self) -> Option<ToneEvent> {
        let event = self.link.as_ref()?.events.try_recv().ok()?;
        if let ToneEvent::Finished(id) | ToneEvent::Stopped(id) = event {
            if self.current == Some(id) {
                self.current = None;
            }
        }
        self.collect_retired();
        Some(event)
    }

    /// Whether the voice is producing sound right now.
    pub fn is_sounding(&self) -> bool {
        self.is_sounding.load(Ordering::Acquire)
    }

    /// The most recently played tone, unless it's known to have ended.
    pub fn current(&self) -> Option<ToneId> {
        self.current
    }

    #[allow(missing_docs)]
    pub fn is_started(&self) -> bool {
        self.sample_rate.is_some()
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &ToneSettings {
        &self.settings
    }

    #[allow(missing_docs)]
    pub fn set_settings(&mut self, settings: ToneSettings) {
        self.settings = settings;
    }

    // A command the voice never read is freed here, on the control thread.
    fn post(&self, command: VoiceCommand) -> Result<()> {
        let link = self.link.as_ref().ok_or(Error::NotStarted)?;
        if let Some(VoiceCommand::Play(id, _)) = link.commands.force_push(command) {
            log::trace!("Tone {id} replaced before it started");
        }
        Ok(())
    }

    // Frees buffers the voice is done with.
    fn collect_retired(&self) {
        if let Some(link) = self.link.as_ref() {
            let count = link.retired.try_iter().count();
            if count > 0 {
                log::trace!("Freed {count} retired tone buffers");
            }
        }
    }
}

/// The audio-thread half of [ToneSynthesizer]. Plays at most one buffer.
#[derive(Debug)]
pub struct ToneVoice {
    sample_rate: SampleRate,
    commands: VoiceMailbox,
    events: Sender<ToneEvent>,
    retired: Sender<Arc<RenderedBuffer>>,
    current: Option<(ToneId, Arc<RenderedBuffer>)>,
    position: usize,
    is_sounding: Arc<AtomicBool>,

    // A retired buffer the control side had no room for yet.
    held: Option<Arc<RenderedBuffer>>,
}
impl RendersAudio for ToneVoice {
    fn prepare(&mut self, sample_rate: SampleRate) {
        self.update_sample_rate(sample_rate);
    }

    fn render(&mut self, output: &mut [f32]) {
        self.flush_held();
        // A new command retires the current buffer, which needs somewhere to go.
        let command = if self.held.is_none() {
            self.commands.pop()
        } else {
            None
        };
        if let Some(command) = command {
            match command {
                VoiceCommand::Play(id, buffer) => {
                    self.retire(ToneEvent::Stopped);
                    self.current = Some((id, buffer));
                    self.position = 0;
                    self.is_sounding.store(true, Ordering::Release);
                    let _ = self.events.try_send(ToneEvent::Started(id));
                }
                VoiceCommand::Stop => self.retire(ToneEvent::Stopped),
            }
        }
        for frame in output.iter_mut() {
            *frame = self.next_sample();
        }
    }
}
impl Configurable for ToneVoice {
    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    // Buffers carry their own rate, so a change only matters for the next
    // tone, which the control side renders at the new rate.
    fn update_sample_rate(&mut self, sample_rate: SampleRate) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.retire(ToneEvent::Stopped);
    }
}
impl ToneVoice {
    fn new_with(
        commands: VoiceMailbox,
        events: Sender<ToneEvent>,
        retired: Sender<Arc<RenderedBuffer>>,
        is_sounding: Arc<AtomicBool>,
    ) -> Self {
        Self {
            sample_rate: SampleRate::default(),
            commands,
            events,
            retired,
            current: None,
            position: 0,
            is_sounding,
            held: None,
        }
    }

    fn next_sample(&mut self) -> f32 {
        let (sample, is_done) = match &self.current {
            Some((_, buffer)) => {
                let samples = buffer.samples();
                let sample = samples.get(self.position).copied().unwrap_or_default();
                self.position += 1;
                (sample, self.position >= samples.len())
            }
            None => return 0.0,
        };
        if is_done {
            self.retire(ToneEvent::Finished);
        }
        sample
    }

    // Hands the current buffer back to the control thread so it isn't freed
    // here. While an earlier buffer is still waiting to go back, the current
    // one stays put and plays silence past its end.
    fn retire(&mut self, event: fn(ToneId) -> ToneEvent) {
        self.flush_held();
        if self.held.is_some() {
            return;
        }
        if let Some((id, buffer)) = self.current.take() {
            self.position = 0;
            self.is_sounding.store(false, Ordering::Release);
            let _ = self.events.try_send(event(id));
            if let Err(e) = self.retired.try_send(buffer) {
                self.held = Some(e.into_inner());
            }
        }
    }

    fn flush_held(&mut self) {
        if let Some(buffer) = self.held.take() {
            if let Err(e) = self.retired.try_send(buffer) {
                self.held = Some(e.into_inner());
            }
        }
    }
}
