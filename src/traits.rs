// Copyright (c) 2024 Mike Tsao

//! The traits that define the seams between the control-rate world, the
//! render-rate world, and the hardware.

use crate::{error::Result, prelude::*};

/// Quick import of all important traits.
pub mod prelude {
    pub use super::{AudioBackend, Configurable, RendersAudio};
}

/// Something that is [Configurable] is interested in staying in sync with the
/// sample rate of whatever is pulling audio from it.
pub trait Configurable {
    /// Returns this item's sample rate.
    fn sample_rate(&self) -> SampleRate;

    /// The sample rate changed.
    fn update_sample_rate(&mut self, sample_rate: SampleRate);

    /// Sent to indicate that it's time to reset internal state. Oscillators
    /// should reset phase, etc.
    fn reset(&mut self) {}
}

/// A render-rate audio node. Implementations are moved onto the audio thread
/// and called once per hardware block, so [RendersAudio::render()] must not
/// allocate, lock, wait, or log.
pub trait RendersAudio: Send {
    /// Called once on the control thread, after the backend has fixed its
    /// sample rate and before the first [RendersAudio::render()]. Allocation
    /// is fine here.
    fn prepare(&mut self, sample_rate: SampleRate);

    /// Fills `output` with mono frames. The backend copies them to however
    /// many device channels it has.
    fn render(&mut self, output: &mut [f32]);
}

/// Hardware (or simulated hardware) that pulls audio from a [RendersAudio].
pub trait AudioBackend {
    /// Discovers the operating sample rate, prepares `source` for it, and
    /// starts pulling. The sample rate stays fixed until [AudioBackend::stop()].
    fn start(&mut self, source: Box<dyn RendersAudio>) -> Result<SampleRate>;

    /// Stops pulling and drops the source. Safe to call when not started.
    fn stop(&mut self);
}
