// Copyright (c) 2024 Mike Tsao

//! Named pitches, and snapping an arbitrary frequency to the nearest one.

use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// A named pitch such as "A4" and its exact frequency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Pitch {
    name: String,
    frequency: FrequencyHz,
}
impl Pitch {
    #[allow(missing_docs)]
    pub fn new_with(name: &str, frequency: FrequencyHz) -> Self {
        Self {
            name: name.to_string(),
            frequency,
        }
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[allow(missing_docs)]
    pub fn frequency(&self) -> FrequencyHz {
        self.frequency
    }
}

/// A read-only lookup table of [Pitch]es, kept sorted by frequency.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchTable {
    pitches: Vec<Pitch>,
}
impl PitchTable {
    const NOTE_NAMES: [&'static str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    const A4_MIDI_NOTE: i32 = 69;

    /// Builds a table from any list of pitches. Pitches with nonsense
    /// frequencies are dropped.
    pub fn from_pitches(pitches: impl IntoIterator<Item = Pitch>) -> Self {
        let mut pitches: Vec<Pitch> = pitches
            .into_iter()
            .filter(|p| p.frequency.is_valid())
            .collect();
        pitches.sort_by(|a, b| a.frequency.0.total_cmp(&b.frequency.0));
        Self { pitches }
    }

    /// Twelve-tone equal temperament from C0 through B8, tuned so that A4 is
    /// `a4`.
    pub fn equal_tempered(a4: FrequencyHz) -> Self {
        // MIDI note 12 is C0, and 119 is B8.
        Self::from_pitches((12..120).map(|midi_note: i32| {
            let name = format!(
                "{}{}",
                Self::NOTE_NAMES[(midi_note % 12) as usize],
                midi_note / 12 - 1
            );
            let frequency = a4 * 2.0f64.powf((midi_note - Self::A4_MIDI_NOTE) as f64 / 12.0);
            Pitch { name, frequency }
        }))
    }

    #[allow(missing_docs)]
    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    /// Looks up a pitch by name.
    pub fn find(&self, name: &str) -> Option<&Pitch> {
        self.pitches.iter().find(|p| p.name == name)
    }
}

/// Returns the pitch in `table` nearest to `frequency`, if it's no more than
/// `tolerance` away.
pub fn snap<'a>(
    frequency: FrequencyHz,
    table: &'a PitchTable,
    tolerance: FrequencyHz,
) -> Option<&'a Pitch> {
    if !frequency.is_valid() {
        return None;
    }
    let pitches = table.pitches();
    let upper = pitches.partition_point(|p| p.frequency.0 < frequency.0);
    let below = upper.checked_sub(1).and_then(|i| pitches.get(i));
    let above = pitches.get(upper);
    let nearest = match (below, above) {
        (Some(b), Some(a)) => {
            if frequency.0 - b.frequency.0 <= a.frequency.0 - frequency.0 {
                b
            } else {
                a
            }
        }
        (Some(p), None) | (None, Some(p)) => p,
        (None, None) => return None,
    };
    if (nearest.frequency.0 - frequency.0).abs() <= tolerance.0 {
        Some(nearest)
    } else {
        None
    }
}
