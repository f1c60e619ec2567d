use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use racer_host::batch::{collect_tapes, verify_tapes};
use racer_host::config::{
    max_frames, parse_game_version, parse_vehicle_type, resolve_race_config, RaceOverrides,
};
use racer_host::runner::{
    fingerprint_to_hex, idle_inputs, run_race, tables_report, write_json, write_tape,
};
use racer_host::script::load_script;
use racer_host::tape::parse_tape;
use racer_host::verify::verify_tape;
use racer_physics_core::{replay_with_checkpoints, GameVersion, VehicleType};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "racer")]
#[command(about = "Deterministic NES racing physics: run scripted races, record and verify tapes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct RaceArgs {
    /// Race configuration JSON, layered over defaults and RACER_* variables
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_parser = parse_vehicle_type)]
    vehicle_type: Option<VehicleType>,
    #[arg(long, value_parser = parse_game_version)]
    game_version: Option<GameVersion>,
    #[arg(long)]
    vehicle_slots: Option<u8>,
    #[arg(long)]
    countdown_frames: Option<u16>,
    #[arg(long)]
    handicap: Option<u8>,
    #[arg(long)]
    challenge_mode: bool,
    #[arg(long)]
    unlimited_grip: bool,
}

impl RaceArgs {
    fn overrides(&self) -> RaceOverrides {
        RaceOverrides {
            vehicle_type: self.vehicle_type,
            game_version: self.game_version,
            vehicle_slots: self.vehicle_slots,
            countdown_frames: self.countdown_frames,
            handicap_amount: self.handicap,
            challenge_mode: self.challenge_mode,
            unlimited_grip: self.unlimited_grip,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scripted (or idle) race and report the outcome as JSON
    Run {
        #[command(flatten)]
        race: RaceArgs,
        /// Input script; without one every vehicle idles
        #[arg(long)]
        script: Option<PathBuf>,
        /// Ticks to idle when no script is given
        #[arg(long, default_value_t = 600)]
        frames: u32,
        /// Write the recorded tape here
        #[arg(long)]
        tape: Option<PathBuf>,
        /// Write the JSON report here instead of stdout
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Verify a tape by replaying it under strict invariant checks
    VerifyTape {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        max_frames: Option<u32>,
    },
    /// Verify every `.tape` file in a directory in parallel
    VerifyBatch {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        max_frames: Option<u32>,
        #[arg(long)]
        jobs: Option<usize>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Dump one vehicle type's lookup tables as JSON
    Tables {
        #[arg(long, value_parser = parse_vehicle_type, default_value = "sports-cars")]
        vehicle_type: VehicleType,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replay a tape and emit sampled checkpoints as JSON
    Checkpoints {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 60)]
        every: u32,
        #[arg(long)]
        max_frames: Option<u32>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Run {
            race,
            script,
            frames,
            tape,
            report,
        } => {
            let config = resolve_race_config(race.config.as_deref(), &race.overrides())?;
            let inputs = match &script {
                Some(path) => load_script(path, config.vehicle_slots)?,
                None => idle_inputs(&config, frames),
            };
            let artifact = run_race(&config, &inputs)?;

            if let Some(path) = &tape {
                write_tape(path, &artifact.tape)?;
                tracing::info!(path = %path.display(), bytes = artifact.tape.len(), "wrote tape");
            }
            emit_json(report.as_deref(), &artifact.metrics)?;
        }
        Commands::VerifyTape { input, max_frames: limit } => {
            let bytes = read_tape(&input)?;
            let verification = verify_tape(&bytes, limit.unwrap_or_else(max_frames))
                .map_err(|err| {
                    tracing::warn!(input = %input.display(), error = %err, "tape rejected");
                    anyhow!("tape {} rejected: {err}", input.display())
                })?;
            println!("input={}", input.display());
            println!("vehicle_type={}", verification.header.vehicle_type);
            println!("game_version={}", verification.header.game_version);
            println!("vehicle_slots={}", verification.header.vehicle_slots);
            println!("frame_count={}", verification.result.frame_count);
            println!(
                "fingerprint={}",
                fingerprint_to_hex(verification.result.fingerprint)
            );
        }
        Commands::VerifyBatch {
            dir,
            max_frames: limit,
            jobs,
            output,
        } => {
            let paths = collect_tapes(&dir)?;
            if paths.is_empty() {
                return Err(anyhow!("no .tape files in {}", dir.display()));
            }
            let summary = verify_tapes(&paths, limit.unwrap_or_else(max_frames), jobs)?;
            tracing::info!(
                accepted = summary.accepted,
                rejected = summary.rejected,
                "batch verified"
            );
            emit_json(output.as_deref(), &summary)?;
        }
        Commands::Tables {
            vehicle_type,
            output,
        } => {
            emit_json(output.as_deref(), &tables_report(vehicle_type))?;
        }
        Commands::Checkpoints {
            input,
            every,
            max_frames: limit,
            output,
        } => {
            let bytes = read_tape(&input)?;
            let tape = parse_tape(&bytes, limit.unwrap_or_else(max_frames))
                .map_err(|err| anyhow!("tape {} rejected: {err}", input.display()))?;
            let checkpoints =
                replay_with_checkpoints(&tape.header.race_config(), tape.inputs, every)
                    .map_err(|rule| anyhow!("tape describes an invalid race: {rule}"))?;
            tracing::info!(count = checkpoints.len(), every, "sampled checkpoints");
            emit_json(output.as_deref(), &checkpoints)?;
        }
    }

    Ok(())
}

fn read_tape(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed reading tape {}", path.display()))
}

fn emit_json<T: Serialize>(path: Option<&Path>, value: &T) -> Result<()> {
    match path {
        Some(path) => {
            write_json(path, value)?;
            tracing::info!(path = %path.display(), "wrote report");
        }
        None => {
            let encoded = serde_json::to_string_pretty(value).context("failed serializing JSON")?;
            println!("{encoded}");
        }
    }
    Ok(())
}
