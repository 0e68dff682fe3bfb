// Copyright (c) 2024 Mike Tsao

//! Short additive tones for discrete feedback sounds: replaying a recorded
//! pitch, or auditioning a vowel-like timbre.
//!
//! A [ToneRequest] is rendered in full into an immutable [RenderedBuffer],
//! which a single [ToneVoice] plays once. A new request replaces whatever is
//! playing.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        HarmonicAmplitudes, HarmonicAmplitudesBuilder, RenderedBuffer, ToneEvent, ToneId,
        ToneRequest, ToneRequestBuilder, ToneSynthesizer, Vowel,
    };
}

pub use amplitudes::{HarmonicAmplitudes, HarmonicAmplitudesBuilder, Vowel};
pub use request::{RenderedBuffer, ToneRequest, ToneRequestBuilder};
pub use synthesizer::{ToneEvent, ToneId, ToneSynthesizer, ToneVoice};

mod amplitudes;
mod request;
mod synthesizer;
