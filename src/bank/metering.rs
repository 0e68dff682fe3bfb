// Copyright (c) 2024 Mike Tsao

//! Block-level loudness metering, computed on the render thread and delivered
//! to the control thread.

use crate::prelude::*;
use core::sync::atomic::{AtomicBool, Ordering};
use crossbeam::queue::ArrayQueue;
use delegate::delegate;
use std::sync::Arc;

/// A single-slot mailbox for loudness readings. Publishing overwrites whatever
/// is already there, so the reader only ever sees the latest reading, and the
/// writer never waits.
#[derive(Debug)]
pub struct MeterMailbox(Arc<ArrayQueue<Decibels>>);
impl Default for MeterMailbox {
    fn default() -> Self {
        Self(Arc::new(ArrayQueue::new(1)))
    }
}
impl Clone for MeterMailbox {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}
impl MeterMailbox {
    /// Replaces any unread reading with this one.
    #[inline]
    pub fn publish(&self, reading: Decibels) {
        let _ = self.0.force_push(reading);
    }

    /// Takes the latest reading, if one arrived since the last take.
    pub fn take(&self) -> Option<Decibels> {
        self.0.pop()
    }

    delegate! {
        to self.0 {
            #[allow(missing_docs)]
            pub fn is_empty(&self) -> bool;
        }
    }
}

/// Observes one channel's rendered samples and, once per block, publishes the
/// block's loudness to a [MeterMailbox].
#[derive(Debug)]
pub struct MeteringTap {
    block_size: usize,
    sum_of_squares: f64,
    frames: usize,
    mailbox: MeterMailbox,
    enabled: Arc<AtomicBool>,
}
impl MeteringTap {
    /// A typical hardware-friendly block size.
    pub const DEFAULT_BLOCK_SIZE: usize = 1024;

    /// `enabled` lets the owner detach the tap without reaching into the
    /// render thread. While it's false, nothing is published.
    pub fn new_with(block_size: usize, mailbox: MeterMailbox, enabled: Arc<AtomicBool>) -> Self {
        Self {
            block_size: block_size.max(1),
            sum_of_squares: 0.0,
            frames: 0,
            mailbox,
            enabled,
        }
    }

    /// Accounts for one rendered sample. Called on the render thread, so it
    /// does no allocation and takes no locks.
    ///
    /// A channel that isn't playing at the end of a block reports the silence
    /// floor without computing RMS.
    #[inline]
    pub fn observe(&mut self, sample: f64, is_playing: bool) {
        if is_playing {
            self.sum_of_squares += sample * sample;
        }
        self.frames += 1;
        if self.frames >= self.block_size {
            if self.enabled.load(Ordering::Relaxed) {
                let reading = if is_playing {
                    Decibels::from_rms((self.sum_of_squares / self.frames as f64).sqrt())
                } else {
                    Decibels::SILENCE
                };
                self.mailbox.publish(reading);
            }
            self.sum_of_squares = 0.0;
            self.frames = 0;
        }
    }

    /// The root-mean-square amplitude of a block. Zero for an empty block.
    pub fn rms(block: &[f64]) -> f64 {
        if block.is_empty() {
            return 0.0;
        }
        (block.iter().map(|s| s * s).sum::<f64>() / block.len() as f64).sqrt()
    }

    /// The loudness of a block in dBFS.
    pub fn measure(block: &[f64]) -> Decibels {
        Decibels::from_rms(Self::rms(block))
    }

    #[allow(missing_docs)]
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}
