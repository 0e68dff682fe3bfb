// Copyright (c) 2024 Mike Tsao

//! A real-time [AudioBackend](tonebank::traits::AudioBackend) for tonebank,
//! wrapping [cpal](https://crates.io/crates/cpal). The stream runs on its own
//! thread and is controlled over crossbeam channels.

#![deny(missing_docs)]

/// The most commonly used imports.
pub mod prelude {
    #[cfg(feature = "audio")]
    pub use super::{CpalAudioService, CpalAudioServiceEvent, CpalAudioServiceInput};
    pub use super::{CrossbeamChannel, ProvidesService};
}

#[cfg(feature = "audio")]
pub use audio::{AudioSampleType, CpalAudioService, CpalAudioServiceEvent, CpalAudioServiceInput};
pub use traits::ProvidesService;
pub use types::CrossbeamChannel;

#[cfg(feature = "audio")]
mod audio;
mod traits;
mod types;
