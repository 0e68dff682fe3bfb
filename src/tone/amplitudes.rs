// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// The mix of partials in an additive tone. Persisted by the application as a
/// timbre preset; the synthesizer only reads it.
#[derive(Clone, Copy, Builder, Debug, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case")]
pub struct HarmonicAmplitudes {
    /// The tone's own frequency.
    #[derivative(Default(value = "Normal::new_const(1.0)"))]
    pub fundamental: Normal,
    /// Twice the frequency.
    #[derivative(Default(value = "Normal::new_const(0.5)"))]
    pub harmonic2: Normal,
    /// Three times the frequency.
    #[derivative(Default(value = "Normal::new_const(0.25)"))]
    pub harmonic3: Normal,
    /// Level of the fixed-frequency formant partial.
    #[derivative(Default(value = "Normal::new_const(0.5)"))]
    pub formant: Normal,
    /// Level of white noise ("breath").
    #[derivative(Default(value = "Normal::zero()"))]
    pub noise: Normal,
    /// Frequency of the formant partial. Independent of the tone's frequency.
    #[derivative(Default(value = "FrequencyHz(800.0)"))]
    pub formant_frequency: FrequencyHz,
}
impl HarmonicAmplitudes {
    /// A vowel-like preset.
    pub fn vowel(vowel: Vowel) -> Self {
        // First-formant frequencies are textbook averages for an adult voice.
        let (harmonic2, harmonic3, formant, formant_frequency) = match vowel {
            Vowel::A => (0.6, 0.4, 0.8, 730.0),
            Vowel::E => (0.4, 0.3, 0.7, 530.0),
            Vowel::I => (0.2, 0.1, 0.6, 270.0),
            Vowel::O => (0.5, 0.2, 0.7, 570.0),
            Vowel::U => (0.3, 0.1, 0.5, 300.0),
        };
        Self {
            fundamental: Normal::maximum(),
            harmonic2: Normal::new(harmonic2),
            harmonic3: Normal::new(harmonic3),
            formant: Normal::new(formant),
            noise: Normal::zero(),
            formant_frequency: FrequencyHz(formant_frequency),
        }
    }
}
impl From<Vowel> for HarmonicAmplitudes {
    fn from(value: Vowel) -> Self {
        Self::vowel(value)
    }
}

/// Vowel timbres available as [HarmonicAmplitudes] presets.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum Vowel {
    /// As in "father"
    A,
    /// As in "bed"
    E,
    /// As in "see"
    I,
    /// As in "go"
    O,
    /// As in "food"
    U,
}
