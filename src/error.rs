// Copyright (c) 2024 Mike Tsao

//! Error types for tonebank.

use thiserror::Error;

/// Shorthand for results whose error is [enum@Error].
pub type Result<T> = core::result::Result<T, Error>;

/// Everything that can go wrong in the synthesis core.
#[derive(Error, Debug)]
pub enum Error {
    /// A channel index didn't name an existing channel.
    #[error("channel index {index} out of range (bank has {len} channels)")]
    IndexOutOfRange {
        /// The index the caller asked for.
        index: usize,
        /// How many channels exist.
        len: usize,
    },

    /// A control-rate parameter write was rejected.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A [ToneRequest](crate::tone::ToneRequest) can't be rendered as given.
    #[error("invalid tone request: {0}")]
    InvalidToneRequest(String),

    /// The tone buffer couldn't be allocated. Retrying with a shorter duration
    /// might succeed.
    #[error("couldn't allocate a buffer of {frames} frames")]
    AllocationFailure {
        /// The frame count that was requested.
        frames: usize,
    },

    /// The operation needs a running audio backend.
    #[error("audio has not been started")]
    NotStarted,

    /// Start was requested while already running. Stop first.
    #[error("audio is already running")]
    AlreadyStarted,

    /// The audio backend failed.
    #[error("audio backend: {0}")]
    Backend(String),

    /// The OS couldn't supply entropy.
    #[error("entropy source failed: {0}")]
    Entropy(#[from] getrandom::Error),
}
