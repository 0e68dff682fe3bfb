// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Tonebank makes the sounds behind a pitch-training tool.
//!
//! There are two independent sound sources.
//!
//! * An [Engine] drives a fixed bank of continuously running oscillator
//! [Channel](bank::Channel)s. Each channel's waveform, frequency, gain, and
//! play state can be changed at any time from a control thread, and each
//! reports its average output power back at control rate. Channels snap to
//! the nearest pitch in a [PitchTable](bank::PitchTable) when they're close
//! enough.
//! * A [ToneSynthesizer] renders short additive tones (a few partials, a
//! formant, and optional noise, shaped by a linear envelope) into a buffer
//! and plays them one at a time.
//!
//! Both hand a [RendersAudio](traits::RendersAudio) to an
//! [AudioBackend](traits::AudioBackend). The audio thread never allocates,
//! locks, or waits. [OfflineBackend](backend::OfflineBackend) renders on
//! demand, which is how the tests drive everything; the `tonebank-services`
//! crate supplies a real-time backend.

/// A collection of imports that are useful to users of this crate. `use
/// tonebank::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        bank::prelude::*, elements::prelude::*, tone::prelude::*, traits::prelude::*,
        types::prelude::*, util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {
    backend::OfflineBackend,
    bank::Engine,
    error::{Error, Result},
    settings::{EngineSettings, ToneSettings},
    tone::ToneSynthesizer,
};

pub mod backend;
pub mod bank;
pub mod elements;
pub mod error;
pub mod settings;
pub mod tone;
pub mod traits;
pub mod types;
pub mod util;
