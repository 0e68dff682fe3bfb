// Copyright (c) 2024 Mike Tsao

//! Elements are the building blocks of both the channel bank and the tone
//! synthesizer. They know nothing about threads or hardware.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{LinearEnvelope, Oscillator, OscillatorBuilder, Waveform};
}

pub use envelope::LinearEnvelope;
pub use oscillator::{Oscillator, OscillatorBuilder, Waveform};

mod envelope;
mod oscillator;
