use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use beat_vj_core::{
    AppConfig, Control, Framebuffer, InputScript, InputSource, Player, Recorder,
    RecordingSettings,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Frame budget used when neither `--frames` nor a scripted quit ends the run.
const DEFAULT_RUN_SECONDS: u64 = 10;

fn main() -> beat_vj_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Effects => list_effects(),
        Commands::Config => print_config(),
    }
}

fn run(args: RunArgs) -> beat_vj_core::Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::live_defaults(),
    };
    if let Some(tempo) = args.tempo {
        config.clock.initial_tempo = tempo;
    }
    if let Some(seed) = args.seed {
        config.particles.seed = Some(seed);
    }
    config.validate()?;

    let mut script = match &args.script {
        Some(path) => InputScript::load(path)?,
        None => InputScript::new(),
    };
    let budget = match (args.frames, script.quit_frame()) {
        (Some(frames), _) => frames,
        (None, Some(_)) => u64::MAX,
        (None, None) => DEFAULT_RUN_SECONDS * u64::from(config.clock.fps),
    };

    let (width, height) = (config.canvas.width, config.canvas.height);
    let mut player = Player::new(config);
    if let Some(index) = args.effect {
        if !player.select_effect(index) {
            tracing::warn!(index, "no such effect slot, keeping the default");
        }
    }

    let mut recorder = match &args.record {
        Some(dir) => {
            let mut recorder = Recorder::new(RecordingSettings {
                output_dir: dir.clone(),
                every_n_frames: args.record_every,
                scale: args.scale,
            });
            recorder.start()?;
            Some(recorder)
        }
        None => None,
    };

    tracing::info!(
        budget,
        effect = %player.active_effect(),
        realtime = args.realtime,
        "starting frame loop"
    );

    let frame_time = Duration::from_secs_f64(player.dt());
    let mut framebuffer = Framebuffer::new(width, height);
    let mut beats = 0u64;
    let mut frame = 0u64;
    while frame < budget {
        let started = Instant::now();
        let input = script.poll(frame);
        let last_beat = player.clock().last_beat_time();

        if player.step(&input, &mut framebuffer) == Control::Quit {
            break;
        }
        if player.clock().last_beat_time() != last_beat {
            beats += 1;
        }
        if let Some(recorder) = recorder.as_mut() {
            recorder.capture(frame, &framebuffer)?;
        }

        frame += 1;
        if args.realtime {
            if let Some(remaining) = frame_time.checked_sub(started.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }

    if let Some(recorder) = recorder.as_mut() {
        recorder.stop()?;
    }

    tracing::info!(
        frames = player.frame(),
        beats,
        elapsed = player.clock().elapsed(),
        overlay = %player.overlay_text(),
        effect = %player.active_effect(),
        "frame loop finished"
    );
    Ok(())
}

fn list_effects() -> beat_vj_core::Result<()> {
    let player = Player::new(AppConfig::live_defaults());
    for (index, effect) in player.effects().slots().iter().enumerate() {
        println!("{index}  {effect}");
    }
    Ok(())
}

fn print_config() -> beat_vj_core::Result<()> {
    println!("{}", AppConfig::live_defaults().to_json()?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Beat-synchronised visual effects player", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the fixed-rate frame loop.
    Run(RunArgs),
    /// List the effect slots.
    Effects,
    /// Print the default configuration as JSON.
    Config,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON input script with frame-indexed events.
    #[arg(short, long)]
    script: Option<PathBuf>,
    /// Number of frames to run.
    #[arg(short, long)]
    frames: Option<u64>,
    /// Effect slot to start on.
    #[arg(short, long)]
    effect: Option<usize>,
    /// Initial tempo in BPM, clamped to 60..=240.
    #[arg(short, long)]
    tempo: Option<u32>,
    /// Seed for the particle field.
    #[arg(long)]
    seed: Option<u64>,
    /// Directory to write PNG frames into.
    #[arg(short, long)]
    record: Option<PathBuf>,
    /// Write only every n-th frame.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    record_every: u32,
    /// Integer upscaling for recorded frames.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=16))]
    scale: u32,
    /// Pace frames in real time instead of running as fast as possible.
    #[arg(long)]
    realtime: bool,
}
