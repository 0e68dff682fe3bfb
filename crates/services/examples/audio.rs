// Copyright (c) 2024 Mike Tsao

//! Plays one oscillator channel while printing its loudness, then plays a
//! vowel tone.

use clap::Parser;
use std::time::{Duration, Instant};
use tonebank::{prelude::*, EngineSettings, ToneSettings};
use tonebank_services::prelude::*;

#[derive(clap::Parser, Debug, Default)]
#[clap(author, about, long_about = None)]
struct Args {
    /// The frequency to play
    #[clap(short = 'f', long, value_parser)]
    frequency: Option<f64>,

    /// sine, square, sawtooth, or triangle
    #[clap(short = 'w', long, value_parser)]
    waveform: Option<String>,

    /// How long the channel plays, in seconds
    #[clap(short = 's', long, value_parser, default_value = "2.0")]
    seconds: f64,

    /// The vowel to play afterward (a, e, i, o, or u)
    #[clap(long, value_parser, default_value = "a")]
    vowel: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let waveform = match args.waveform.as_deref() {
        None => Waveform::default(),
        Some(name) => name
            .parse::<Waveform>()
            .map_err(|_| anyhow::Error::msg(format!("unknown waveform {name}")))?,
    };
    let vowel = args
        .vowel
        .parse::<Vowel>()
        .map_err(|_| anyhow::Error::msg(format!("unknown vowel {}", args.vowel)))?;

    // The bank and the tone synthesizer each get their own stream.
    let mut bank_service = CpalAudioService::default();
    let mut engine = Engine::new_with(
        EngineSettings::default(),
        PitchTable::equal_tempered(FrequencyHz(440.0)),
    );
    let sample_rate = engine.start(&mut bank_service)?;
    println!("Channel bank running at {sample_rate}");

    engine.set_waveform(0, waveform)?;
    if let Some(frequency) = args.frequency {
        engine.set_frequency(0, FrequencyHz(frequency))?;
    }
    engine.set_playing(0, true)?;
    let channel = engine.channel(0)?;
    println!(
        "Playing {} at {} (nearest pitch: {})",
        channel.waveform(),
        channel.frequency(),
        channel
            .snapped_pitch()
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    let deadline = Instant::now() + Duration::from_secs_f64(args.seconds.max(0.0));
    while Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(100));
        if engine.poll_meters() > 0 {
            println!("  {}", engine.channel(0)?.average_power());
        }
        for event in bank_service.pending_events() {
            if let CpalAudioServiceEvent::StreamError(e) = event {
                eprintln!("Stream error: {e}");
            }
        }
    }
    engine.set_playing(0, false)?;
    engine.cleanup();
    engine.stop(&mut bank_service);

    let mut tone_service = CpalAudioService::default();
    let mut synthesizer = ToneSynthesizer::new_with(ToneSettings::default(), Rng::default());
    synthesizer.start(&mut tone_service)?;
    let request = ToneRequest {
        frequency: FrequencyHz(args.frequency.unwrap_or(220.0)),
        duration: Seconds(1.0),
        amplitudes: vowel.into(),
        ..Default::default()
    };
    let id = synthesizer.play(&request)?;
    println!("Playing vowel {vowel} as tone {id}");

    let deadline = Instant::now() + Duration::from_secs(3);
    'wait: while Instant::now() < deadline {
        while let Some(event) = synthesizer.try_recv_event() {
            if event == ToneEvent::Finished(id) {
                break 'wait;
            }
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    synthesizer.shut_down(&mut tone_service);

    Ok(())
}
