// Copyright (c) 2024 Mike Tsao

//! Lock-free parameter storage shared by a channel's control-rate and
//! render-rate halves.

use crate::prelude::*;
use atomic_float::AtomicF64;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// A channel's parameters as the render thread sees them. The control thread
/// is the only writer; the render thread only loads. Each field is its own
/// atomic, so a reader may see a new frequency with an old gain for one
/// sample, but never a torn value.
#[derive(Debug)]
#[repr(align(64))]
pub struct ChannelParams {
    waveform: AtomicU8,
    frequency: AtomicF64,
    gain: AtomicF64,
    is_playing: AtomicBool,
}

/// A plain copy of [ChannelParams] taken at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelSnapshot {
    #[allow(missing_docs)]
    pub waveform: Waveform,
    #[allow(missing_docs)]
    pub frequency: FrequencyHz,
    #[allow(missing_docs)]
    pub gain: f64,
    #[allow(missing_docs)]
    pub is_playing: bool,
}

#[allow(missing_docs)]
impl ChannelParams {
    pub fn new_with(
        waveform: Waveform,
        frequency: FrequencyHz,
        gain: Normal,
        is_playing: bool,
    ) -> Self {
        Self {
            waveform: AtomicU8::new(waveform.into()),
            frequency: AtomicF64::new(frequency.0),
            gain: AtomicF64::new(gain.0),
            is_playing: AtomicBool::new(is_playing),
        }
    }

    /// Loads every field. Allocation-free and lock-free.
    #[inline]
    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            waveform: self.waveform(),
            frequency: self.frequency(),
            gain: self.gain.load(Ordering::Acquire),
            is_playing: self.is_playing(),
        }
    }

    #[inline]
    pub fn waveform(&self) -> Waveform {
        Waveform::from_u8(self.waveform.load(Ordering::Acquire))
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.into(), Ordering::Release);
    }

    #[inline]
    pub fn frequency(&self) -> FrequencyHz {
        FrequencyHz(self.frequency.load(Ordering::Acquire))
    }

    pub fn set_frequency(&self, frequency: FrequencyHz) {
        self.frequency.store(frequency.0, Ordering::Release);
    }

    #[inline]
    pub fn gain(&self) -> Normal {
        Normal::new(self.gain.load(Ordering::Acquire))
    }

    pub fn set_gain(&self, gain: Normal) {
        self.gain.store(gain.0, Ordering::Release);
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.is_playing.load(Ordering::Acquire)
    }

    pub fn set_is_playing(&self, is_playing: bool) {
        self.is_playing.store(is_playing, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn writes_are_visible_in_snapshot() {
        let params =
            ChannelParams::new_with(Waveform::Sine, FrequencyHz(440.0), Normal::new(0.5), false);
        params.set_waveform(Waveform::Triangle);
        params.set_frequency(FrequencyHz(220.0));
        params.set_gain(Normal::new(0.25));
        params.set_is_playing(true);
        assert_eq!(
            params.snapshot(),
            ChannelSnapshot {
                waveform: Waveform::Triangle,
                frequency: FrequencyHz(220.0),
                gain: 0.25,
                is_playing: true,
            }
        );
    }

    #[test]
    fn writes_cross_threads() {
        let params = Arc::new(ChannelParams::new_with(
            Waveform::Sine,
            FrequencyHz(440.0),
            Normal::new(0.5),
            false,
        ));
        let writer = Arc::clone(&params);
        std::thread::spawn(move || {
            writer.set_frequency(FrequencyHz(880.0));
            writer.set_is_playing(true);
        })
        .join()
        .unwrap();
        assert_eq!(params.frequency(), FrequencyHz(880.0));
        assert!(params.is_playing());
    }
}
