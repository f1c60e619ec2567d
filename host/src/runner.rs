use anyhow::{anyhow, Context, Result};
use racer_physics_core::tables::{BOUNCE_AMOUNT_LUT, DRIFT_SOUND_LUT};
use racer_physics_core::{
    GameVersion, LookupTables, Race, RaceConfig, SoundId, SpawnState, VehicleType,
};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::tape::serialize_tape;
use crate::verify::verify_tape;

/// Ticks between debug-level progress events.
const LOG_EVERY_FRAMES: u32 = 600;

#[derive(Clone, Debug, Serialize)]
pub struct VehicleMetrics {
    pub slot: u8,
    pub heading: u8,
    pub velocity: i8,
    pub x_position: i32,
    pub y_position: i32,
    pub z_position: i8,
    pub spawn_state: SpawnState,
    pub accelerate_frames: u32,
    pub brake_frames: u32,
    pub turn_frames: u32,
    pub drift_frames: u32,
    pub airborne_frames: u32,
    pub sound_events: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub vehicle_type: VehicleType,
    pub game_version: GameVersion,
    pub vehicle_slots: u8,
    pub frame_count: u32,
    pub tick_hz: f64,
    pub race_seconds: f64,
    pub fingerprint: String,
    pub vehicles: Vec<VehicleMetrics>,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub inputs: Vec<u8>,
    pub tape: Vec<u8>,
}

/// JSON view of one vehicle type's compiled-in tables.
#[derive(Clone, Debug, Serialize)]
pub struct TablesReport {
    pub vehicle_type: VehicleType,
    pub bounce_amount: i8,
    pub drift_sound: SoundId,
    pub velocity_scalar_x: Vec<i8>,
    pub velocity_scalar_y: Vec<i8>,
    pub heading_clamp: Vec<u8>,
    pub handicap: Vec<u8>,
    pub drift_threshold: Vec<u16>,
    pub drift_force_amount: Vec<u16>,
    pub top_speed: Vec<i8>,
}

pub fn tables_report(vehicle_type: VehicleType) -> TablesReport {
    let tables = LookupTables::for_vehicle(vehicle_type);
    TablesReport {
        vehicle_type,
        bounce_amount: BOUNCE_AMOUNT_LUT[vehicle_type.index()],
        drift_sound: DRIFT_SOUND_LUT[vehicle_type.index()],
        velocity_scalar_x: tables.velocity_scalar_x.to_vec(),
        velocity_scalar_y: tables.velocity_scalar_y.to_vec(),
        heading_clamp: tables.heading_clamp.to_vec(),
        handicap: tables.handicap.to_vec(),
        drift_threshold: tables.drift_threshold.to_vec(),
        drift_force_amount: tables.drift_force_amount.to_vec(),
        top_speed: tables.top_speed.to_vec(),
    }
}

pub fn idle_inputs(config: &RaceConfig, frames: u32) -> Vec<u8> {
    vec![0u8; frames as usize * config.vehicle_slots as usize]
}

pub fn fingerprint_to_hex(fingerprint: u64) -> String {
    format!("0x{fingerprint:016x}")
}

/// Drive a race over frame-major `inputs` under strict checks, record it as
/// a tape, and verify the tape before handing it back.
pub fn run_race(config: &RaceConfig, inputs: &[u8]) -> Result<RunArtifact> {
    let slots = config.vehicle_slots.max(1) as usize;
    if inputs.is_empty() {
        return Err(anyhow!("no input frames to run"));
    }

    let mut race = Race::new(config).map_err(|rule| anyhow!("invalid race configuration: {rule}"))?;
    race.validate()
        .map_err(|violation| anyhow!("initial invariant failure: {violation}"))?;

    tracing::info!(
        vehicle_type = %config.vehicle_type,
        game_version = %config.game_version,
        vehicle_slots = config.vehicle_slots,
        countdown_frames = config.countdown_frames,
        "starting race"
    );

    let mut vehicles: Vec<VehicleMetrics> = race
        .vehicles()
        .iter()
        .enumerate()
        .map(|(slot, _)| VehicleMetrics {
            slot: slot as u8,
            heading: 0,
            velocity: 0,
            x_position: 0,
            y_position: 0,
            z_position: 0,
            spawn_state: SpawnState::Alive,
            accelerate_frames: 0,
            brake_frames: 0,
            turn_frames: 0,
            drift_frames: 0,
            airborne_frames: 0,
            sound_events: 0,
        })
        .collect();

    for frame in inputs.chunks(slots) {
        race.step_checked(frame)
            .map_err(|violation| anyhow!("race broke an invariant: {violation}"))?;

        for (metrics, vehicle) in vehicles.iter_mut().zip(race.vehicles()) {
            let input = vehicle.input();
            metrics.accelerate_frames += u32::from(input.accelerate);
            metrics.brake_frames += u32::from(input.brake);
            metrics.turn_frames += u32::from(input.left || input.right);
            metrics.drift_frames += u32::from(vehicle.is_drifting);
            metrics.airborne_frames += u32::from(!vehicle.is_grounded());
        }
        for (slot, _) in race.sound_events() {
            if let Some(metrics) = vehicles.get_mut(slot as usize) {
                metrics.sound_events += 1;
            }
        }

        if race.frame_count() % LOG_EVERY_FRAMES == 0 {
            tracing::debug!(
                frame = race.frame_count(),
                fingerprint = %fingerprint_to_hex(race.fingerprint()),
                "race progress"
            );
        }
    }

    for (metrics, vehicle) in vehicles.iter_mut().zip(race.vehicles()) {
        metrics.heading = vehicle.heading;
        metrics.velocity = vehicle.velocity;
        metrics.x_position = vehicle.x_position;
        metrics.y_position = vehicle.y_position;
        metrics.z_position = vehicle.z_position;
        metrics.spawn_state = vehicle.spawn_state;
    }

    let result = race.result();
    let tape = serialize_tape(config, inputs, result.fingerprint);
    verify_tape(&tape, result.frame_count.max(1))
        .map_err(|err| anyhow!("generated tape failed verification: {err}"))?;

    tracing::info!(
        frame_count = result.frame_count,
        fingerprint = %fingerprint_to_hex(result.fingerprint),
        "race finished"
    );

    let game_version = race.game_version();
    Ok(RunArtifact {
        metrics: RunMetrics {
            vehicle_type: config.vehicle_type,
            game_version,
            vehicle_slots: config.vehicle_slots,
            frame_count: result.frame_count,
            tick_hz: game_version.tick_hz(),
            race_seconds: f64::from(result.frame_count) * game_version.fixed_delta_secs(),
            fingerprint: fingerprint_to_hex(result.fingerprint),
            vehicles,
        },
        inputs: inputs.to_vec(),
        tape,
    })
}

pub fn write_tape(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).context("failed serializing JSON")?;
    write_tape(path, &json)
}
