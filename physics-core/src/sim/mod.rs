//! Fixed-timestep tick driver and replay entry points.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::constants::{HEADING_COUNT, MAX_VEHICLE_SLOTS, TERRAIN_NO_TRACTION};
use crate::error::{ReplayViolation, RuleCode};
use crate::physics::{GameVersion, NesPhysics, VehiclePhysics};
use crate::race::{PollTimers, RaceConfig, RaceState};
use crate::types::{BounceBehavior, ControllerInput, SoundId, SpawnState, VehicleType};
use crate::vehicle::VehicleState;


const FNV_OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayResult {
    pub frame_count: u32,
    pub fingerprint: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCheckpoint {
    pub slot: u8,
    pub heading: u8,
    pub velocity: i8,
    pub x_position: i32,
    pub y_position: i32,
    pub z_position: i8,
    pub is_drifting: bool,
    pub spawn_state: SpawnState,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayCheckpoint {
    pub frame_count: u32,
    pub countdown_timer: u16,
    pub fingerprint: u64,
    pub vehicles: Vec<VehicleCheckpoint>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub slot: u8,
    pub input: ControllerInput,
    pub heading: u8,
    pub velocity: i8,
    pub x_velocity: i16,
    pub y_velocity: i16,
    pub x_force: i16,
    pub y_force: i16,
    pub x_position: i32,
    pub y_position: i32,
    pub z_position: i8,
    pub z_force: i8,
    pub grip_change_timer: i8,
    pub drift_sound_timer: u8,
    pub spawn_state: SpawnState,
    pub is_moving: bool,
    pub is_drifting: bool,
    pub has_unlimited_grip: bool,
    pub is_ai_controlled_speed: bool,
    pub terrain_type: u8,
    pub handicap_amount: u8,
    pub bounce_behavior: BounceBehavior,
    pub checkpoint_index: i8,
    pub landing_effect_fired: bool,
    pub sfx: Vec<SoundId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub frame_count: u32,
    pub vehicle_type: VehicleType,
    pub game_version: GameVersion,
    pub countdown_timer: u16,
    pub timers: PollTimers,
    pub has_unlimited_grip: bool,
    pub is_challenge_mode: bool,
    pub fingerprint: u64,
    pub vehicles: Vec<VehicleSnapshot>,
}

/// The slice of vehicle state a single tick is allowed to move in bounded steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TransitionState {
    heading: u8,
    x_position: i32,
    y_position: i32,
    x_force: i16,
    y_force: i16,
}

impl TransitionState {
    fn of(vehicle: &VehicleState) -> Self {
        Self {
            heading: vehicle.heading,
            x_position: vehicle.x_position,
            y_position: vehicle.y_position,
            x_force: vehicle.x_force,
            y_force: vehicle.y_force,
        }
    }
}

/// One race: shared state, every vehicle in slot order, and the physics
/// model that updates them.
#[derive(Clone, Debug)]
pub struct Race<P: VehiclePhysics = NesPhysics> {
    physics: P,
    game_version: GameVersion,
    state: RaceState,
    vehicles: Vec<VehicleState>,
    frame_count: u32,
}

impl Race<NesPhysics> {
    pub fn new(config: &RaceConfig) -> Result<Self, RuleCode> {
        Self::with_physics(config, config.game_version.physics())
    }
}

impl<P: VehiclePhysics> Race<P> {
    pub fn with_physics(config: &RaceConfig, physics: P) -> Result<Self, RuleCode> {
        config.validate()?;

        let vehicles = (0..config.vehicle_slots)
            .map(|slot| {
                let mut vehicle = VehicleState::spawn(slot);
                vehicle.handicap_amount = config.handicap_amount;
                vehicle
            })
            .collect();

        Ok(Self {
            physics,
            game_version: config.game_version,
            state: RaceState::new(config),
            vehicles,
            frame_count: 0,
        })
    }

    /// Advance one fixed tick. Missing inputs count as idle controllers.
    pub fn step(&mut self, inputs: &[ControllerInput]) {
        for (slot, vehicle) in self.vehicles.iter_mut().enumerate() {
            let input = inputs.get(slot).copied().unwrap_or(ControllerInput::IDLE);
            step_vehicle(&self.physics, vehicle, &self.state, input);
        }

        self.state.advance_timers();
        self.frame_count = self.frame_count.wrapping_add(1);
    }

    /// Advance one tick from packed input bytes, one per slot.
    pub fn step_bytes(&mut self, frame: &[u8]) {
        let mut inputs = [ControllerInput::IDLE; MAX_VEHICLE_SLOTS as usize];
        for (input, byte) in inputs.iter_mut().zip(frame) {
            *input = ControllerInput::from_byte(*byte);
        }
        self.step(&inputs);
    }

    #[inline]
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    #[inline]
    pub fn game_version(&self) -> GameVersion {
        self.game_version
    }

    #[inline]
    pub fn state(&self) -> &RaceState {
        &self.state
    }

    #[inline]
    pub fn vehicles(&self) -> &[VehicleState] {
        &self.vehicles
    }

    #[inline]
    pub fn vehicle(&self, slot: u8) -> Option<&VehicleState> {
        self.vehicles.get(slot as usize)
    }

    /// Collaborator access between ticks: terrain, jumps, respawns.
    #[inline]
    pub fn vehicle_mut(&mut self, slot: u8) -> Option<&mut VehicleState> {
        self.vehicles.get_mut(slot as usize)
    }

    pub fn set_vehicle_type(&mut self, vehicle_type: VehicleType) {
        self.state.set_vehicle_type(vehicle_type);
    }

    /// Sound events raised during the last tick, tagged with their slot.
    pub fn sound_events(&self) -> impl Iterator<Item = (u8, SoundId)> + '_ {
        self.vehicles.iter().flat_map(|vehicle| {
            vehicle
                .sfx
                .iter()
                .map(move |sound| (vehicle.player_index, *sound))
        })
    }

    pub fn validate(&self) -> Result<(), ReplayViolation> {
        self.state.validate().map_err(|rule| ReplayViolation {
            frame_count: self.frame_count,
            slot: None,
            rule,
        })?;

        for vehicle in &self.vehicles {
            vehicle
                .validate(self.state.vehicle_slots)
                .map_err(|rule| ReplayViolation {
                    frame_count: self.frame_count,
                    slot: Some(vehicle.player_index),
                    rule,
                })?;
        }

        Ok(())
    }

    /// Step once, checking invariants on both sides of the tick and that
    /// every vehicle moved by a legal amount. Collaborators may have touched
    /// vehicle state since the last tick, so the pre-check runs first.
    pub fn step_checked(&mut self, frame: &[u8]) -> Result<(), ReplayViolation> {
        self.validate()?;
        let before: Vec<TransitionState> = self.vehicles.iter().map(TransitionState::of).collect();
        self.step_bytes(frame);

        for (prev, vehicle) in before.iter().zip(&self.vehicles) {
            validate_transition(prev, &TransitionState::of(vehicle)).map_err(|rule| {
                ReplayViolation {
                    frame_count: self.frame_count,
                    slot: Some(vehicle.player_index),
                    rule,
                }
            })?;
        }

        self.validate()
    }

    #[inline]
    pub fn result(&self) -> ReplayResult {
        ReplayResult {
            frame_count: self.frame_count,
            fingerprint: self.fingerprint(),
        }
    }

    pub fn checkpoint(&self) -> ReplayCheckpoint {
        ReplayCheckpoint {
            frame_count: self.frame_count,
            countdown_timer: self.state.countdown_timer,
            fingerprint: self.fingerprint(),
            vehicles: self
                .vehicles
                .iter()
                .map(|vehicle| VehicleCheckpoint {
                    slot: vehicle.player_index,
                    heading: vehicle.heading,
                    velocity: vehicle.velocity,
                    x_position: vehicle.x_position,
                    y_position: vehicle.y_position,
                    z_position: vehicle.z_position,
                    is_drifting: vehicle.is_drifting,
                    spawn_state: vehicle.spawn_state,
                })
                .collect(),
        }
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            frame_count: self.frame_count,
            vehicle_type: self.state.vehicle_type,
            game_version: self.game_version,
            countdown_timer: self.state.countdown_timer,
            timers: self.state.timers,
            has_unlimited_grip: self.state.has_unlimited_grip,
            is_challenge_mode: self.state.is_challenge_mode,
            fingerprint: self.fingerprint(),
            vehicles: self.vehicles.iter().map(vehicle_snapshot).collect(),
        }
    }

    /// Stable FNV-1a style digest of everything the next tick depends on.
    pub fn fingerprint(&self) -> u64 {
        let race = &self.state;
        let timers = &race.timers;
        let mut hash = FNV_OFFSET_BASIS;

        for value in [
            self.frame_count as u64,
            race.vehicle_type as u64,
            race.countdown_timer as u64,
            timers.turn as u64,
            timers.tank_slow_turn as u64,
            timers.velocity as u64,
            timers.drift_speed_loss as u64,
            timers.change_z_force_1 as u64,
            timers.change_z_force_2 as u64,
            timers.acceleration as u64,
            timers.deceleration as u64,
            race.has_unlimited_grip as u64,
            race.is_challenge_mode as u64,
        ] {
            hash = mix_u64(hash, value);
        }

        for vehicle in &self.vehicles {
            for value in [
                vehicle.player_index as u64,
                vehicle.input().to_byte() as u64,
                vehicle.heading as u64,
                vehicle.velocity as i64 as u64,
                vehicle.x_velocity as i64 as u64,
                vehicle.y_velocity as i64 as u64,
                vehicle.x_force as i64 as u64,
                vehicle.y_force as i64 as u64,
                vehicle.x_position as i64 as u64,
                vehicle.y_position as i64 as u64,
                vehicle.z_position as i64 as u64,
                vehicle.z_force as i64 as u64,
                vehicle.grip_change_timer as i64 as u64,
                vehicle.drift_sound_timer as u64,
                vehicle.spawn_state as u64,
                vehicle.is_moving as u64,
                vehicle.is_drifting as u64,
                vehicle.terrain_type as u64,
                vehicle.handicap_amount as u64,
                vehicle.bounce_behavior as u64,
                vehicle.checkpoint_index as i64 as u64,
            ] {
                hash = mix_u64(hash, value);
            }
            for sound in vehicle.sfx.iter() {
                hash = mix_u64(hash, sound.0 as u64);
            }
        }

        hash
    }
}

fn step_vehicle<P: VehiclePhysics>(
    physics: &P,
    vehicle: &mut VehicleState,
    race: &RaceState,
    input: ControllerInput,
) {
    // Last tick's events have been handed to audio by now.
    vehicle.sfx.clear();
    vehicle.begin_tick();
    vehicle.set_input(input);

    physics.turn(vehicle, race);
    if vehicle.is_grounded() && vehicle.terrain_type != TERRAIN_NO_TRACTION {
        physics.velocity_scalars(vehicle, race);
        physics.velocity_effects(vehicle, race);
    }
    physics.vertical_forces(vehicle, race);
    physics.acceleration(vehicle, race);

    vehicle.is_moving = vehicle.x_force != 0 || vehicle.y_force != 0;
    vehicle.x_position = vehicle.x_position.wrapping_add(i32::from(vehicle.x_force));
    vehicle.y_position = vehicle.y_position.wrapping_add(i32::from(vehicle.y_force));
}

fn validate_transition(prev: &TransitionState, next: &TransitionState) -> Result<(), RuleCode> {
    // Turning and snapping both move at most one compass step.
    let heading_delta = next.heading.wrapping_sub(prev.heading) as usize % HEADING_COUNT;
    if heading_delta > 1 && heading_delta < HEADING_COUNT - 1 {
        return Err(RuleCode::VehicleHeadingStep);
    }

    if next.x_position != prev.x_position.wrapping_add(i32::from(next.x_force))
        || next.y_position != prev.y_position.wrapping_add(i32::from(next.y_force))
    {
        return Err(RuleCode::VehiclePositionStep);
    }

    Ok(())
}

#[inline(always)]
fn mix_u64(hash: u64, value: u64) -> u64 {
    (hash ^ value).wrapping_mul(FNV_PRIME)
}

fn vehicle_snapshot(vehicle: &VehicleState) -> VehicleSnapshot {
    VehicleSnapshot {
        slot: vehicle.player_index,
        input: vehicle.input(),
        heading: vehicle.heading,
        velocity: vehicle.velocity,
        x_velocity: vehicle.x_velocity,
        y_velocity: vehicle.y_velocity,
        x_force: vehicle.x_force,
        y_force: vehicle.y_force,
        x_position: vehicle.x_position,
        y_position: vehicle.y_position,
        z_position: vehicle.z_position,
        z_force: vehicle.z_force,
        grip_change_timer: vehicle.grip_change_timer,
        drift_sound_timer: vehicle.drift_sound_timer,
        spawn_state: vehicle.spawn_state,
        is_moving: vehicle.is_moving,
        is_drifting: vehicle.is_drifting,
        has_unlimited_grip: vehicle.has_unlimited_grip,
        is_ai_controlled_speed: vehicle.is_ai_controlled_speed,
        terrain_type: vehicle.terrain_type,
        handicap_amount: vehicle.handicap_amount,
        bounce_behavior: vehicle.bounce_behavior,
        checkpoint_index: vehicle.checkpoint_index,
        landing_effect_fired: vehicle.landing_effect_fired,
        sfx: vehicle.sfx.iter().copied().collect(),
    }
}

/// Frame-major input bytes: `vehicle_slots` bytes per tick.
#[inline]
fn frames<'a>(config: &RaceConfig, inputs: &'a [u8]) -> core::slice::Chunks<'a, u8> {
    inputs.chunks(config.vehicle_slots.max(1) as usize)
}

pub fn replay(config: &RaceConfig, inputs: &[u8]) -> Result<ReplayResult, RuleCode> {
    let mut race = Race::new(config)?;

    for frame in frames(config, inputs) {
        race.step_bytes(frame);
    }

    Ok(race.result())
}

pub fn replay_strict(config: &RaceConfig, inputs: &[u8]) -> Result<ReplayResult, ReplayViolation> {
    let mut race = Race::new(config).map_err(|rule| ReplayViolation {
        frame_count: 0,
        slot: None,
        rule,
    })?;
    race.validate()?;

    for frame in frames(config, inputs) {
        race.step_checked(frame)?;
    }

    Ok(race.result())
}

/// Replay and sample a checkpoint at frame 0, every `sample_every` frames,
/// and at the final frame.
pub fn replay_with_checkpoints(
    config: &RaceConfig,
    inputs: &[u8],
    sample_every: u32,
) -> Result<Vec<ReplayCheckpoint>, RuleCode> {
    let mut race = Race::new(config)?;
    let stride = if sample_every == 0 { 1 } else { sample_every };
    let total_frames = frames(config, inputs).len() as u32;
    let mut checkpoints = Vec::new();
    checkpoints.push(race.checkpoint());

    for frame in frames(config, inputs) {
        race.step_bytes(frame);
        let frame_count = race.frame_count();
        if frame_count % stride == 0 || frame_count == total_frames {
            checkpoints.push(race.checkpoint());
        }
    }

    Ok(checkpoints)
}
