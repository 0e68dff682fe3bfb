// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use more_asserts::{assert_gt, assert_le, assert_lt};
use std::{
    f64::consts::TAU,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tonebank::{prelude::*, EngineSettings, Error, OfflineBackend};

fn new_engine() -> Engine {
    Engine::new_with(
        EngineSettings::default(),
        PitchTable::equal_tempered(FrequencyHz(440.0)),
    )
}

#[test]
fn single_sine_channel_matches_reference() {
    let mut engine = new_engine();
    engine.set_waveform(0, Waveform::Sine).unwrap();
    engine.set_frequency(0, FrequencyHz(440.0)).unwrap();
    engine.set_gain(0, Normal::maximum()).unwrap();
    engine.set_playing(0, true).unwrap();
    assert_eq!(
        engine.channel(0).unwrap().snapped_pitch().map(|p| p.name()),
        Some("A4")
    );

    let mut backend = OfflineBackend::new(SampleRate::new(44100));
    engine.start(&mut backend).unwrap();
    let output = backend.render_frames(10);
    for (i, sample) in output.iter().enumerate() {
        let expected = (TAU * 440.0 * i as f64 / 44100.0).sin();
        assert!(
            approx_eq!(f64, *sample as f64, expected, epsilon = 1e-4),
            "frame {i}: got {sample}, expected {expected}"
        );
    }
}

#[test]
fn stopped_bank_is_silent() {
    let mut engine = new_engine();
    for index in 0..engine.channel_count() {
        engine.set_gain(index, Normal::maximum()).unwrap();
        engine.set_waveform(index, Waveform::Square).unwrap();
    }
    let mut backend = OfflineBackend::default();
    engine.start(&mut backend).unwrap();
    assert!(backend.render_frames(4096).iter().all(|s| *s == 0.0));
    assert!(!engine.is_any_channel_playing());
}

#[test]
fn channels_sum_without_clamping() {
    let mut engine = new_engine();
    for index in 0..engine.channel_count() {
        engine.set_waveform(index, Waveform::Square).unwrap();
        engine.set_gain(index, Normal::maximum()).unwrap();
        engine.set_playing(index, true).unwrap();
    }
    let mut backend = OfflineBackend::default();
    engine.start(&mut backend).unwrap();
    let output = backend.render_frames(8);
    assert_eq!(
        output[0],
        engine.channel_count() as f32,
        "square waves all start high, in phase"
    );
}

#[test]
fn meters_report_each_playing_channel() {
    let mut engine = new_engine();
    engine.set_gain(0, Normal::maximum()).unwrap();
    engine.set_playing(0, true).unwrap();
    engine.set_waveform(1, Waveform::Square).unwrap();
    engine.set_gain(1, Normal::new(0.5)).unwrap();
    engine.set_playing(1, true).unwrap();

    let mut backend = OfflineBackend::default();
    engine.start(&mut backend).unwrap();
    let block_size = engine.settings().metering_block_size();
    let _ = backend.render_frames(block_size * 4);
    assert_eq!(engine.poll_meters(), engine.channel_count());

    let sine = engine.channel(0).unwrap().average_power();
    let square = engine.channel(1).unwrap().average_power();
    let stopped = engine.channel(2).unwrap().average_power();
    assert!(approx_eq!(f64, sine.0, -3.0103, epsilon = 0.1), "{sine}");
    assert!(approx_eq!(f64, square.0, -6.0206, epsilon = 0.01), "{square}");
    assert!(stopped.is_silence());

    assert_eq!(engine.poll_meters(), 0, "no new block, no new readings");
}

#[test]
fn invalid_writes_are_rejected_and_change_nothing() {
    let mut engine = new_engine();
    let before = engine.channel(0).unwrap().frequency();
    assert!(matches!(
        engine.set_frequency(0, FrequencyHz(-5.0)),
        Err(Error::InvalidParameter(_))
    ));
    assert!(matches!(
        engine.set_frequency(0, FrequencyHz(f64::NAN)),
        Err(Error::InvalidParameter(_))
    ));
    assert_eq!(engine.channel(0).unwrap().frequency(), before);
    assert!(matches!(
        engine.set_playing(99, true),
        Err(Error::IndexOutOfRange { index: 99, .. })
    ));
}

#[test]
fn control_writes_race_rendering_safely() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut engine = new_engine();
    let mut backend = OfflineBackend::default();
    engine.start(&mut backend).unwrap();
    let channel_count = engine.channel_count();

    let is_done = Arc::new(AtomicBool::new(false));
    let render_thread = {
        let is_done = Arc::clone(&is_done);
        std::thread::spawn(move || {
            let mut buffer = vec![0.0f32; 256];
            let mut blocks = 0usize;
            let mut peak = 0.0f32;
            while !is_done.load(Ordering::Acquire) || blocks == 0 {
                backend.render(&mut buffer);
                for sample in buffer.iter() {
                    assert!(sample.is_finite(), "non-finite sample {sample}");
                    peak = peak.max(sample.abs());
                }
                blocks += 1;
            }
            (blocks, peak)
        })
    };

    let mut rng = Rng::new_with_seed(1234);
    for i in 0..10_000 {
        let index = (rng.rand_u64() as usize) % channel_count;
        match i % 4 {
            0 => {
                let frequency = 20.0 + rng.rand_float() * 19_980.0;
                engine.set_frequency(index, FrequencyHz(frequency)).unwrap();
            }
            1 => engine
                .set_gain(index, Normal::new(rng.rand_float()))
                .unwrap(),
            2 => {
                let waveform = Waveform::from_u8((rng.rand_u64() % 4) as u8);
                engine.set_waveform(index, waveform).unwrap();
            }
            _ => engine
                .set_playing(index, rng.rand_u64() % 2 == 0)
                .unwrap(),
        }
        let _ = engine.poll_meters();
    }
    is_done.store(true, Ordering::Release);

    let (blocks, peak) = render_thread.join().unwrap();
    assert_gt!(blocks, 0);
    assert_le!(peak, channel_count as f32 + 1e-3);
    for channel in engine.channels() {
        assert_lt!(channel.average_power().0, 0.1, "no channel exceeds full scale");
    }
}

#[test]
fn metering_stops_after_cleanup() {
    let mut engine = new_engine();
    engine.set_playing(0, true).unwrap();
    let mut backend = OfflineBackend::default();
    engine.start(&mut backend).unwrap();
    let block_size = engine.settings().metering_block_size();
    let _ = backend.render_frames(block_size);
    assert_eq!(engine.poll_meters(), engine.channel_count());
    assert!(!engine.channel(0).unwrap().average_power().is_silence());

    engine.cleanup();
    let _ = backend.render_frames(block_size * 2);
    assert_eq!(engine.poll_meters(), 0);
    assert!(engine.channel(0).unwrap().average_power().is_silence());

    engine.stop(&mut backend);
    assert!(!engine.is_started());
    assert!(backend.render_frames(16).iter().all(|s| *s == 0.0));
}
