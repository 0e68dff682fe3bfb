// Copyright (c) 2024 Mike Tsao

//! The channel bank: N oscillator channels rendered together on the audio
//! thread, controlled from the application thread.
//!
//! Each [Channel] is split in two. The control-rate half ([Channel]) is what
//! the application reads and writes; it mirrors every parameter and receives
//! loudness readings. The render-rate half ([ChannelVoice]) lives inside the
//! [BankRenderer] on the audio thread and reads parameters from a lock-free
//! [ChannelParams] that the control half writes.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{snap, BankRenderer, Channel, Engine, Pitch, PitchTable};
}

pub use channel::{Channel, ChannelVoice};
pub use engine::{BankRenderer, Engine};
pub use metering::{MeterMailbox, MeteringTap};
pub use params::{ChannelParams, ChannelSnapshot};
pub use pitch::{snap, Pitch, PitchTable};

mod channel;
mod engine;
mod metering;
mod params;
mod pitch;
