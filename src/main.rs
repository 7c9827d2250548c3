//! chiptone CLI: live synth, waveform tour and WAV export.
//!
//! Usage:
//!   chiptone tour [--wav out.wav]
//!   chiptone midi [--port N]
//!   chiptone ports
//!
//! Engine options (any command):
//!   --rate HZ  --voices N  --channels N
//!   --steal first|oldest  --mix average|sum
//!   --noise voice|shared  --noise-rate fast|slow
//!   --triangle centered|stepped
//!
//! Log verbosity follows RUST_LOG.

use anyhow::{bail, Context, Result};
use ct_master::{
    connect, list_ports, tour_tail, waveform_tour, Controller, EngineConfig, Layout, MixStrategy,
    NoiseMode, NoiseRate, StealPolicy, TriangleMode,
};
use log::LevelFilter;
use std::io::Write;
use std::time::Duration;
use std::{env, fs, process, thread};

const USAGE: &str = "Usage: chiptone <tour [--wav out.wav] | midi [--port N] | ports> [engine options]";

/// Voices per lane when `--channels` is given without `--voices`.
const DEFAULT_VOICES_PER_CHANNEL: u32 = 4;

const POLL: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        process::exit(1);
    };

    match command.as_str() {
        "tour" => tour(&args),
        "midi" => midi(&args),
        "ports" => ports(),
        _ => {
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    }
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn number(args: &[String], name: &str) -> Result<Option<u32>> {
    flag(args, name)
        .map(|v| v.parse::<u32>().with_context(|| format!("invalid value '{}' for {}", v, name)))
        .transpose()
}

fn engine_config(args: &[String]) -> Result<EngineConfig> {
    let mut config = EngineConfig::default();
    if let Some(rate) = number(args, "--rate")? {
        config.sample_rate = rate;
    }

    let voices = number(args, "--voices")?;
    config.layout = match number(args, "--channels")? {
        Some(channels) => Layout::Multi {
            channels: channels as usize,
            voices_per_channel: voices.unwrap_or(DEFAULT_VOICES_PER_CHANNEL) as usize,
        },
        None => Layout::Single {
            voices: voices.map_or(config.layout.voices_per_lane(), |v| v as usize),
        },
    };

    config.steal = match flag(args, "--steal") {
        None => config.steal,
        Some("first") => StealPolicy::FirstSlot,
        Some("oldest") => StealPolicy::LeastRecentlyTriggered,
        Some(other) => bail!("unknown steal policy '{}'", other),
    };
    config.mix = match flag(args, "--mix") {
        None => config.mix,
        Some("average") => MixStrategy::Average,
        Some("sum") => MixStrategy::HeadroomSum,
        Some(other) => bail!("unknown mix strategy '{}'", other),
    };
    config.noise = match flag(args, "--noise") {
        None => config.noise,
        Some("voice") => NoiseMode::PerVoice,
        Some("shared") => NoiseMode::Shared,
        Some(other) => bail!("unknown noise mode '{}'", other),
    };
    config.noise_rate = match flag(args, "--noise-rate") {
        None => config.noise_rate,
        Some("fast") => NoiseRate::Fast,
        Some("slow") => NoiseRate::Slow,
        Some(other) => bail!("unknown noise rate '{}'", other),
    };
    config.triangle = match flag(args, "--triangle") {
        None => config.triangle,
        Some("centered") => TriangleMode::Centered,
        Some("stepped") => TriangleMode::Stepped,
        Some(other) => bail!("unknown triangle mode '{}'", other),
    };

    config.validate().context("invalid engine configuration")?;
    Ok(config)
}

/// Redraw the status line when a new event has been applied.
fn show_status(ctrl: &Controller, seen: &mut u64) {
    let updates = ctrl.status().updates();
    if updates != *seen {
        *seen = updates;
        print!("\r{:<width$}", ctrl.status().line(), width = ct_master::STATUS_CAPACITY);
        let _ = std::io::stdout().flush();
    }
}

fn tour(args: &[String]) -> Result<()> {
    let config = engine_config(args)?;
    let mut ctrl = Controller::new(config)?;
    let rate = ctrl.sample_rate();
    let score = waveform_tour(rate);

    if let Some(path) = flag(args, "--wav") {
        println!("Rendering waveform tour to {} at {} Hz...", path, rate);
        let wav = ctrl.render_to_wav(&score, tour_tail(rate))?;
        fs::write(path, &wav).with_context(|| format!("failed to write {}", path))?;
        println!("Rendered {} bytes", wav.len());
        return Ok(());
    }

    ctrl.play_device();
    ctrl.play_score(score);
    println!("Playing waveform tour...");

    let mut seen = 0;
    while !ctrl.is_score_finished() && !ctrl.is_finished() {
        show_status(&ctrl, &mut seen);
        thread::sleep(POLL);
    }
    if ctrl.is_finished() {
        bail!("audio output stopped early");
    }
    show_status(&ctrl, &mut seen);
    thread::sleep(Duration::from_millis(ct_master::GAP_MS));
    ctrl.stop();

    println!("\rDone.{:<width$}", "", width = ct_master::STATUS_CAPACITY);
    Ok(())
}

fn midi(args: &[String]) -> Result<()> {
    let config = engine_config(args)?;
    let port = number(args, "--port")?.unwrap_or(0) as usize;
    let mut ctrl = Controller::new(config)?;

    let connection = connect(port, ctrl.sender())?;
    println!("Listening on {} (Ctrl-C to quit)", connection.port_name());
    ctrl.play_device();

    let mut seen = 0;
    while !ctrl.is_finished() {
        show_status(&ctrl, &mut seen);
        thread::sleep(POLL);
    }
    bail!("audio output stopped");
}

fn ports() -> Result<()> {
    let names = list_ports()?;
    if names.is_empty() {
        println!("No MIDI input ports");
    }
    for (i, name) in names.iter().enumerate() {
        println!("{}: {}", i, name);
    }
    Ok(())
}
