// Copyright (c) 2024 Mike Tsao

//! [CpalAudioService] drives a tonebank [RendersAudio] from the
//! [cpal](https://crates.io/crates/cpal) audio interface.

use crate::{CrossbeamChannel, ProvidesService};
use core::fmt::Debug;
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, FromSample, Sample as CpalSample, SizedSample, Stream, StreamConfig,
    SupportedStreamConfig,
};
use crossbeam::channel::{Receiver, Sender};
use std::thread::JoinHandle;
use tonebank::{prelude::*, Error};

/// The fundamental type of an audio sample.
pub type AudioSampleType = f32;

/// A [CpalAudioServiceInput] tells [CpalAudioService] what to do.
#[derive(Debug)]
pub enum CpalAudioServiceInput {
    /// Asks the stream thread to exit. [AudioBackend::stop()] sends this.
    Quit,
    /// Resumes the underlying audio interface. A new stream plays
    /// automatically once started.
    Play,
    /// Pauses the underlying audio interface. The source isn't called while
    /// paused.
    Pause,
}

/// A [CpalAudioServiceEvent] informs clients what's going on.
#[derive(Debug)]
pub enum CpalAudioServiceEvent {
    /// The stream has started. Provides the sample rate and the device's
    /// channel count.
    Reset(usize, u8),
    /// cpal reported a problem with the running stream.
    StreamError(String),
}

/// Owns the thread that owns the cpal stream. The stream isn't `Send`, so it
/// has to be created and dropped on that thread. See
/// <https://github.com/RustAudio/cpal/issues/818>.
struct WrappedStream {
    handle: Option<JoinHandle<()>>,

    sample_rate: usize,
    channel_count: u8,
}
impl Debug for WrappedStream {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WrappedStream")
            .field("cpal_stream", &"(skipped)")
            .field("sample_rate", &self.sample_rate)
            .field("channel_count", &self.channel_count)
            .finish()
    }
}
impl WrappedStream {
    /// period_size is the size, in frames, of a single group of frames in the
    /// audio buffer. <https://www.alsa-project.org/wiki/FramesPeriods>
    fn new_with(
        period_size: usize,
        mut source: Box<dyn RendersAudio>,
        sender: &Sender<CpalAudioServiceEvent>,
        receiver: &Receiver<CpalAudioServiceInput>,
    ) -> anyhow::Result<Self> {
        let (_host, device, config) = Self::host_device_setup()?;
        let sample_rate = config.sample_rate().0 as usize;
        let channel_count = config.channels() as u8;

        // The source may allocate here; this is the last chance before it
        // moves to the audio thread.
        source.prepare(SampleRate::new(sample_rate));

        let (ready_sender, ready_receiver) = crossbeam::channel::bounded(1);
        let receiver = receiver.clone();
        let sender = sender.clone();
        let handle = std::thread::Builder::new()
            .name("tonebank-audio".to_string())
            .spawn(move || {
                let cpal_stream =
                    match Self::stream_setup_for(&device, config, period_size, source, sender) {
                        Ok(cpal_stream) => cpal_stream,
                        Err(e) => {
                            let _ = ready_sender.send(Err(e));
                            return;
                        }
                    };
                if let Err(e) = cpal_stream.play() {
                    let _ = ready_sender.send(Err(e.into()));
                    return;
                }
                let _ = ready_sender.send(Ok(()));
                while let Ok(input) = receiver.recv() {
                    match input {
                        CpalAudioServiceInput::Play => {
                            if let Err(e) = cpal_stream.play() {
                                log::warn!("Couldn't resume audio stream: {e}");
                            }
                        }
                        CpalAudioServiceInput::Pause => {
                            if let Err(e) = cpal_stream.pause() {
                                log::warn!("Couldn't pause audio stream: {e}");
                            }
                        }
                        CpalAudioServiceInput::Quit => break,
                    }
                }
                log::debug!("Audio stream thread exiting");
            })?;

        match ready_receiver.recv() {
            Ok(Ok(())) => Ok(Self {
                handle: Some(handle),
                sample_rate,
                channel_count,
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(anyhow::Error::msg("audio stream thread exited during setup"))
            }
        }
    }

    /// Returns the default host, device, and stream config (all of which are
    /// cpal concepts).
    fn host_device_setup(
    ) -> anyhow::Result<(cpal::Host, cpal::Device, cpal::SupportedStreamConfig), anyhow::Error>
    {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::Error::msg("Default output device is not available"))?;
        let config = device.default_output_config()?;

        let config = SupportedStreamConfig::new(
            config.channels(),
            config.sample_rate(),
            *config.buffer_size(),
            config.sample_format(),
        );
        Ok((host, device, config))
    }

    /// Creates and returns a Stream for the given device and config. The Stream
    /// pulls from `source` in its callback. This function is actually a
    /// wrapper around the generic [stream_make<T>()].
    fn stream_setup_for(
        device: &cpal::Device,
        config: SupportedStreamConfig,
        period_size: usize,
        source: Box<dyn RendersAudio>,
        sender: Sender<CpalAudioServiceEvent>,
    ) -> anyhow::Result<Stream, anyhow::Error> {
        let sample_format = config.sample_format();
        let mut config: StreamConfig = config.into();

        // We set buffer size here, rather than in host_device_setup(), because
        // it's troublesome to create a [cpal::SupportedBufferSize] on the fly.
        config.buffer_size = BufferSize::Fixed(period_size as u32);

        match sample_format {
            cpal::SampleFormat::I8 => {
                Self::stream_make::<i8>(&config, device, period_size, source, sender)
            }
            cpal::SampleFormat::I16 => {
                Self::stream_make::<i16>(&config, device, period_size, source, sender)
            }
            cpal::SampleFormat::I32 => {
                Self::stream_make::<i32>(&config, device, period_size, source, sender)
            }
            cpal::SampleFormat::I64 => {
                Self::stream_make::<i64>(&config, device, period_size, source, sender)
            }
            cpal::SampleFormat::U8 => {
                Self::stream_make::<u8>(&config, device, period_size, source, sender)
            }
            cpal::SampleFormat::U16 => {
                Self::stream_make::<u16>(&config, device, period_size, source, sender)
            }
            cpal::SampleFormat::U32 => {
                Self::stream_make::<u32>(&config, device, period_size, source, sender)
            }
            cpal::SampleFormat::U64 => {
                Self::stream_make::<u64>(&config, device, period_size, source, sender)
            }
            cpal::SampleFormat::F32 => {
                Self::stream_make::<f32>(&config, device, period_size, source, sender)
            }
            cpal::SampleFormat::F64 => {
                Self::stream_make::<f64>(&config, device, period_size, source, sender)
            }
            _ => Err(anyhow::Error::msg(format!(
                "Unexpected sample format {sample_format:?}"
            ))),
        }
    }

    /// Generic portion of stream_setup_for().
    fn stream_make<T>(
        config: &cpal::StreamConfig,
        device: &cpal::Device,
        period_size: usize,
        mut source: Box<dyn RendersAudio>,
        sender: Sender<CpalAudioServiceEvent>,
    ) -> Result<Stream, anyhow::Error>
    where
        T: SizedSample + FromSample<AudioSampleType>,
    {
        let err_fn = move |err: cpal::StreamError| {
            let _ = sender.try_send(CpalAudioServiceEvent::StreamError(err.to_string()));
        };

        let channel_count = config.channels as usize;
        let mut scratch = vec![0.0; period_size];
        let stream = device.build_output_stream(
            config,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                Self::on_window(output, channel_count, source.as_mut(), &mut scratch)
            },
            err_fn,
            None,
        )?;
        Ok(stream)
    }

    /// cpal callback that has `source` render mono frames into `scratch`, then
    /// copies each frame to every device channel, converting if needed to the
    /// stream's expected data type. The device may ask for more frames than
    /// `scratch` holds, so this works in chunks.
    fn on_window<T>(
        output: &mut [T],
        channel_count: usize,
        source: &mut dyn RendersAudio,
        scratch: &mut [AudioSampleType],
    ) where
        T: CpalSample + FromSample<AudioSampleType>,
    {
        let channel_count = channel_count.max(1);
        if scratch.is_empty() {
            output.fill(T::EQUILIBRIUM);
            return;
        }
        for chunk in output.chunks_mut(scratch.len() * channel_count) {
            let mono = &mut scratch[..chunk.len() / channel_count];
            source.render(mono);
            for (frame, sample) in chunk.chunks_exact_mut(channel_count).zip(mono.iter()) {
                frame.fill(T::from_sample(*sample));
            }
        }
    }
}

/// [CpalAudioService] is an [AudioBackend] that plays through the system's
/// default output device.
///
/// Each [AudioBackend::start()] opens a new stream on a new thread, which
/// calls the source directly from the cpal callback.
#[derive(Debug)]
pub struct CpalAudioService {
    inputs: CrossbeamChannel<CpalAudioServiceInput>,
    events: CrossbeamChannel<CpalAudioServiceEvent>,
    period_size: usize,

    stream: Option<WrappedStream>,
}
impl Default for CpalAudioService {
    fn default() -> Self {
        Self::new_with(None)
    }
}
impl ProvidesService<CpalAudioServiceInput, CpalAudioServiceEvent> for CpalAudioService {
    fn receiver(&self) -> &crossbeam::channel::Receiver<CpalAudioServiceEvent> {
        &self.events.receiver
    }

    fn sender(&self) -> &Sender<CpalAudioServiceInput> {
        &self.inputs.sender
    }
}
impl AudioBackend for CpalAudioService {
    fn start(&mut self, source: Box<dyn RendersAudio>) -> tonebank::Result<SampleRate> {
        if self.stream.is_some() {
            return Err(Error::AlreadyStarted);
        }
        // Anything queued for a previous stream is stale.
        let _ = self.inputs.receiver.try_iter().count();

        let stream = WrappedStream::new_with(
            self.period_size,
            source,
            &self.events.sender,
            &self.inputs.receiver,
        )
        .map_err(|e| {
            log::error!("While starting audio stream: {e:#}");
            Error::Backend(format!("{e:#}"))
        })?;
        let sample_rate = SampleRate::new(stream.sample_rate);
        log::info!(
            "Audio stream started: {} channels at {sample_rate}, period {} frames",
            stream.channel_count,
            self.period_size
        );
        let _ = self.events.sender.try_send(CpalAudioServiceEvent::Reset(
            stream.sample_rate,
            stream.channel_count,
        ));
        self.stream = Some(stream);
        Ok(sample_rate)
    }

    fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            self.send_input(CpalAudioServiceInput::Quit);
            if let Some(handle) = stream.handle.take() {
                if handle.join().is_err() {
                    log::error!("Audio stream thread panicked");
                }
            }
            log::info!("Audio stream stopped");
        }
    }
}
impl Drop for CpalAudioService {
    fn drop(&mut self) {
        self.stop();
    }
}
impl CpalAudioService {
    /// A reasonable period size. This value is on the upper edge of perceptible
    /// latency for 44.1KHz (512 / 44100 = 11.6 milliseconds).
    pub const SUGGESTED_PERIOD_SIZE: usize = 512;

    /// Events the client hasn't read yet. The stream's error callback sends
    /// with `try_send()`, so once this fills, further errors are dropped.
    pub const EVENT_CAPACITY: usize = 64;

    /// Creates a new [CpalAudioService] that asks the device for periods of
    /// the given size, or a reasonable default if none is provided. A "period"
    /// is a chunk of the audio buffer that the audio interface reads at once.
    /// Nothing is opened until [AudioBackend::start()].
    pub fn new_with(period_size: Option<usize>) -> Self {
        Self {
            inputs: Default::default(),
            events: CrossbeamChannel::new_bounded(Self::EVENT_CAPACITY),
            period_size: period_size
                .unwrap_or(Self::SUGGESTED_PERIOD_SIZE)
                .max(1),
            stream: None,
        }
    }

    /// Whether a stream is running (or paused).
    pub fn is_started(&self) -> bool {
        self.stream.is_some()
    }

    #[allow(missing_docs)]
    pub fn period_size(&self) -> usize {
        self.period_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Emits 0, 1, 2, ... and records how big each render request was.
    #[derive(Default)]
    struct Counter {
        next: f32,
        requests: Vec<usize>,
    }
    impl RendersAudio for Counter {
        fn prepare(&mut self, _sample_rate: SampleRate) {}

        fn render(&mut self, output: &mut [f32]) {
            self.requests.push(output.len());
            for sample in output.iter_mut() {
                *sample = self.next;
                self.next += 1.0;
            }
        }
    }

    #[test]
    fn window_copies_mono_to_every_channel() {
        let mut source = Counter::default();
        let mut scratch = vec![0.0; 4];
        let mut output = vec![-1.0f32; 6];
        WrappedStream::on_window(&mut output, 2, &mut source, &mut scratch);
        assert_eq!(output, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        assert_eq!(source.requests, vec![3]);
    }

    #[test]
    fn window_larger_than_scratch_renders_in_chunks() {
        let mut source = Counter::default();
        let mut scratch = vec![0.0; 4];
        let mut output = vec![0.0f32; 10];
        WrappedStream::on_window(&mut output, 1, &mut source, &mut scratch);
        assert_eq!(
            output,
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
        assert_eq!(source.requests, vec![4, 4, 2]);
    }

    #[test]
    fn window_converts_sample_format() {
        let mut source = Counter::default();
        let mut scratch = vec![0.0; 4];
        let mut output = vec![0i16; 2];
        WrappedStream::on_window(&mut output, 1, &mut source, &mut scratch);
        assert_eq!(output[0], 0);
        assert_eq!(output[1], i16::MAX, "1.0 is full scale");
    }

    #[test]
    fn service_starts_stopped() {
        let mut service = CpalAudioService::new_with(Some(0));
        assert_eq!(
            service.receiver().capacity(),
            Some(CpalAudioService::EVENT_CAPACITY),
            "events sent from the audio callback must not allocate"
        );
        assert_eq!(service.period_size(), 1);
        assert!(!service.is_started());
        service.stop();
        assert!(service.pending_events().is_empty());
    }
}
