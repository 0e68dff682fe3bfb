// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ChannelId, ChannelIdFactory, Decibels, FrequencyHz, Normal, SampleRate, Seconds,
    };
}

pub use {
    numbers::{Decibels, FrequencyHz},
    ranges::{Normal, RangedF64},
    time::{SampleRate, Seconds},
    uid::{ChannelId, ChannelIdFactory},
};

mod numbers;
mod ranges;
mod time;
mod uid;
