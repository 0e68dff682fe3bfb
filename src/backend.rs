// Copyright (c) 2024 Mike Tsao

//! An [AudioBackend] that renders on demand instead of on a hardware clock.
//! Used by tests and for bouncing audio to memory. The real-time backend is
//! in the `tonebank-services` crate.

use crate::{
    error::{Error, Result},
    prelude::*,
};

/// Pulls audio from its source only when [OfflineBackend::render()] is called.
pub struct OfflineBackend {
    sample_rate: SampleRate,
    source: Option<Box<dyn RendersAudio>>,
    is_available: bool,
}
impl core::fmt::Debug for OfflineBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OfflineBackend")
            .field("sample_rate", &self.sample_rate)
            .field("is_started", &self.source.is_some())
            .field("is_available", &self.is_available)
            .finish()
    }
}
impl Default for OfflineBackend {
    fn default() -> Self {
        Self::new(SampleRate::default())
    }
}
impl AudioBackend for OfflineBackend {
    fn start(&mut self, mut source: Box<dyn RendersAudio>) -> Result<SampleRate> {
        if !self.is_available {
            return Err(Error::Backend("no output device".to_string()));
        }
        if self.source.is_some() {
            return Err(Error::AlreadyStarted);
        }
        source.prepare(self.sample_rate);
        self.source = Some(source);
        Ok(self.sample_rate)
    }

    fn stop(&mut self) {
        self.source = None;
    }
}
impl OfflineBackend {
    /// A backend that always reports `sample_rate`.
    pub fn new(sample_rate: SampleRate) -> Self {
        Self {
            sample_rate,
            source: None,
            is_available: true,
        }
    }

    /// A backend whose [AudioBackend::start()] always fails, like a machine
    /// with no output device.
    pub fn unavailable() -> Self {
        Self {
            is_available: false,
            ..Default::default()
        }
    }

    /// Fills `output` from the source, or with silence if not started.
    pub fn render(&mut self, output: &mut [f32]) {
        match self.source.as_mut() {
            Some(source) => source.render(output),
            None => output.fill(0.0),
        }
    }

    /// Renders `frame_count` frames into a new buffer.
    pub fn render_frames(&mut self, frame_count: usize) -> Vec<f32> {
        let mut output = vec![0.0; frame_count];
        self.render(&mut output);
        output
    }

    #[allow(missing_docs)]
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    #[allow(missing_docs)]
    pub fn is_started(&self) -> bool {
        self.source.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(f32, Option<SampleRate>);
    impl RendersAudio for Constant {
        fn prepare(&mut self, sample_rate: SampleRate) {
            self.1 = Some(sample_rate);
        }

        fn render(&mut self, output: &mut [f32]) {
            output.fill(if self.1.is_some() { self.0 } else { f32::NAN });
        }
    }

    #[test]
    fn renders_silence_until_started() {
        let mut backend = OfflineBackend::new(SampleRate::new(22050));
        assert!(backend.render_frames(8).iter().all(|s| *s == 0.0));

        assert_eq!(
            backend.start(Box::new(Constant(0.25, None))).unwrap(),
            SampleRate::new(22050)
        );
        assert!(
            backend.render_frames(8).iter().all(|s| *s == 0.25),
            "source should have been prepared before the first render"
        );
        assert!(matches!(
            backend.start(Box::new(Constant(0.5, None))),
            Err(Error::AlreadyStarted)
        ));

        backend.stop();
        assert!(!backend.is_started());
        assert!(backend.render_frames(8).iter().all(|s| *s == 0.0));
    }

    #[test]
    fn unavailable_never_starts() {
        let mut backend = OfflineBackend::unavailable();
        assert!(matches!(
            backend.start(Box::new(Constant(0.25, None))),
            Err(Error::Backend(_))
        ));
        assert!(!backend.is_started());
    }
}
