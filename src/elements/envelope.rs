// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// A finite attack/sustain/release envelope with linear ramps. Unlike a
/// note-driven ADSR, it knows its total duration up front, so its amplitude is
/// a pure function of time.
///
/// ```text
///   1 |    ________________
///     |   /                \
///   0 |__/                  \__
///     0  attack   duration-release  duration
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinearEnvelope {
    attack: Seconds,
    release: Seconds,
    duration: Seconds,
}
impl LinearEnvelope {
    /// Callers are expected to have checked that `attack + release <=
    /// duration`. If they overlap anyway, the lower of the two ramps wins.
    pub fn new_with(attack: Seconds, release: Seconds, duration: Seconds) -> Self {
        Self {
            attack,
            release,
            duration,
        }
    }

    /// The envelope's amplitude at `time`, in [0.0, 1.0]. Zero outside
    /// [0, duration).
    pub fn amplitude_at(&self, time: Seconds) -> f64 {
        let t = time.0;
        if t < 0.0 || t >= self.duration.0 {
            return 0.0;
        }
        let attack_gain = if self.attack.0 > 0.0 {
            (t / self.attack.0).min(1.0)
        } else {
            1.0
        };
        let release_start = self.duration.0 - self.release.0;
        let release_gain = if self.release.0 > 0.0 && t > release_start {
            ((self.duration.0 - t) / self.release.0).max(0.0)
        } else {
            1.0
        };
        attack_gain.min(release_gain)
    }

    #[allow(missing_docs)]
    pub fn attack(&self) -> Seconds {
        self.attack
    }

    #[allow(missing_docs)]
    pub fn release(&self) -> Seconds {
        self.release
    }

    #[allow(missing_docs)]
    pub fn duration(&self) -> Seconds {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn ramps_and_sustain() {
        let e = LinearEnvelope::new_with(Seconds(0.1), Seconds(0.2), Seconds(1.0));
        assert_eq!(e.amplitude_at(Seconds(0.0)), 0.0);
        assert!(approx_eq!(f64, e.amplitude_at(Seconds(0.05)), 0.5));
        assert_eq!(e.amplitude_at(Seconds(0.1)), 1.0);
        assert_eq!(e.amplitude_at(Seconds(0.5)), 1.0);
        assert_eq!(e.amplitude_at(Seconds(0.8)), 1.0);
        assert!(approx_eq!(
            f64,
            e.amplitude_at(Seconds(0.9)),
            0.5,
            epsilon = 1e-12
        ));
        assert_eq!(e.amplitude_at(Seconds(1.0)), 0.0);
    }

    #[test]
    fn outside_the_envelope_is_silent() {
        let e = LinearEnvelope::new_with(Seconds(0.1), Seconds(0.1), Seconds(1.0));
        assert_eq!(e.amplitude_at(Seconds(-0.1)), 0.0);
        assert_eq!(e.amplitude_at(Seconds(1.5)), 0.0);
    }

    #[test]
    fn zero_attack_starts_at_full() {
        let e = LinearEnvelope::new_with(Seconds::zero(), Seconds(0.1), Seconds(1.0));
        assert_eq!(e.amplitude_at(Seconds(0.0)), 1.0);
    }

    #[test]
    fn zero_release_holds_to_the_end() {
        let e = LinearEnvelope::new_with(Seconds(0.1), Seconds::zero(), Seconds(1.0));
        assert_eq!(e.amplitude_at(Seconds(0.999)), 1.0);
    }

    #[test]
    fn ramps_are_monotonic() {
        let e = LinearEnvelope::new_with(Seconds(0.3), Seconds(0.3), Seconds(0.6));
        let mut last = -1.0;
        for i in 0..=300 {
            let a = e.amplitude_at(Seconds(i as f64 / 1000.0));
            assert!(a >= last, "attack should never fall");
            last = a;
        }
        for i in 300..600 {
            let a = e.amplitude_at(Seconds(i as f64 / 1000.0));
            assert!(a <= last, "release should never rise");
            last = a;
        }
    }
}
