// Copyright (c) 2024 Mike Tsao

use more_asserts::{assert_gt, assert_lt};
use tonebank::{prelude::*, Error, OfflineBackend, ToneSettings};

fn started(seed: u128) -> (ToneSynthesizer, OfflineBackend) {
    let mut synthesizer = ToneSynthesizer::new_with_seed(ToneSettings::default(), seed);
    let mut backend = OfflineBackend::new(SampleRate::new(44100));
    synthesizer.start(&mut backend).unwrap();
    (synthesizer, backend)
}

#[test]
fn tone_fades_in_and_out() {
    let (mut synthesizer, mut backend) = started(1);
    let request = ToneRequest {
        frequency: FrequencyHz(220.0),
        duration: Seconds(0.5),
        attack: Seconds(0.05),
        release: Seconds(0.05),
        ..Default::default()
    };
    let rendered = synthesizer.render(&request).unwrap();
    let frame_count = (0.5f64 * 44100.0).round() as usize;
    assert_eq!(rendered.frame_count(), frame_count);

    let id = synthesizer.play(&request).unwrap();
    let output = backend.render_frames(frame_count + 441);
    let (tone, tail) = output.split_at(frame_count);
    assert_eq!(tone, rendered.samples());
    assert!(tail.iter().all(|s| *s == 0.0), "silent after the tone ends");

    assert_eq!(tone[0], 0.0);
    for pair in tone[..5].windows(2) {
        assert_lt!(pair[0].abs(), pair[1].abs(), "attack grows");
    }
    for pair in tone[frame_count - 5..].windows(2) {
        assert_gt!(pair[0].abs(), pair[1].abs(), "release shrinks");
    }
    let peak = tone.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    assert_gt!(peak, 0.2);
    assert_lt!(peak, 0.5);

    assert_eq!(synthesizer.try_recv_event(), Some(ToneEvent::Started(id)));
    assert_eq!(synthesizer.try_recv_event(), Some(ToneEvent::Finished(id)));
}

#[test]
fn breathy_vowels_are_reproducible() {
    let request = ToneRequest {
        frequency: FrequencyHz(196.0),
        duration: Seconds(0.25),
        amplitudes: HarmonicAmplitudes {
            noise: Normal::new(0.2),
            ..HarmonicAmplitudes::vowel(Vowel::A)
        },
        ..Default::default()
    };
    let (mut first, mut first_backend) = started(42);
    let (mut second, mut second_backend) = started(42);
    first.play(&request).unwrap();
    second.play(&request).unwrap();
    assert_eq!(
        first_backend.render_frames(4096),
        second_backend.render_frames(4096)
    );
}

#[test]
fn bank_and_tone_run_side_by_side() {
    let mut engine = Engine::new_with(
        tonebank::EngineSettings::default(),
        PitchTable::equal_tempered(FrequencyHz(440.0)),
    );
    let mut bank_backend = OfflineBackend::default();
    engine.start(&mut bank_backend).unwrap();
    engine.set_playing(0, true).unwrap();

    let (mut synthesizer, mut tone_backend) = started(7);
    synthesizer
        .play_with_settings(FrequencyHz(330.0), Seconds(0.2))
        .unwrap();

    let bank = bank_backend.render_frames(1024);
    let tone = tone_backend.render_frames(1024);
    assert!(bank.iter().any(|s| *s != 0.0));
    assert!(tone.iter().any(|s| *s != 0.0));
    assert!(synthesizer.is_sounding());
}

#[test]
fn unavailable_backend_reports_failure() {
    let mut synthesizer = ToneSynthesizer::default();
    let mut backend = OfflineBackend::unavailable();
    assert!(matches!(
        synthesizer.start(&mut backend),
        Err(Error::Backend(_))
    ));
    assert!(matches!(
        synthesizer.play(&ToneRequest::default()),
        Err(Error::NotStarted)
    ));
}
