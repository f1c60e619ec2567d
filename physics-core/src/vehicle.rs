use crate::constants::{
    CHECKPOINT_NONE, DEFAULT_HANDICAP_AMOUNT, DRIFT_SOUND_RELOAD, HANDICAP_TABLE_LEN, HEADING_MAX,
};
use crate::error::RuleCode;
use crate::sfx::SfxQueue;
use crate::types::{BounceBehavior, ControllerInput, SpawnState};

/// Per-vehicle simulation record, mutated in place every tick.
///
/// Field widths follow the 6502 RAM layout: anything the cartridge keeps in
/// one byte is `i8`/`u8`, hi/lo pairs are 16-bit. Positions are 8.8 fixed
/// point accumulated by the tick driver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VehicleState {
    // Controller intent for this tick.
    pub controller_left: bool,
    pub controller_right: bool,
    pub controller_accelerate: bool,
    pub controller_brake: bool,

    // Motion
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

    // Scratch for the drift threshold check; meaningless between ticks.
    pub x_velocity_force_difference: u16,
    pub y_velocity_force_difference: u16,
    pub xy_velocity_force_difference_magnitude: u16,

    // Timers
    pub grip_change_timer: i8,
    pub drift_sound_timer: u8,

    // Classification
    pub player_index: u8,
    pub spawn_state: SpawnState,
    pub is_moving: bool,
    pub is_drifting: bool,
    pub has_unlimited_grip: bool,
    pub is_ai_controlled_speed: bool,
    pub terrain_type: u8,
    pub handicap_amount: u8,
    pub bounce_behavior: BounceBehavior,
    pub checkpoint_index: i8,

    /// Marker for a landing side effect whose purpose is not yet known
    /// (`$0438,X` / `$059C,X` in the ROM). Armed by the caller, consumed by
    /// the first settling bounce.
    pub landing_effect_armed: bool,
    /// Set on the tick the armed landing effect fires.
    pub landing_effect_fired: bool,

    pub sfx: SfxQueue,
}

impl VehicleState {
    pub fn spawn(player_index: u8) -> Self {
        Self {
            player_index,
            spawn_state: SpawnState::Alive,
            handicap_amount: DEFAULT_HANDICAP_AMOUNT,
            checkpoint_index: CHECKPOINT_NONE,
            ..Self::default()
        }
    }

    /// Clears the per-tick outputs before any sub-step runs.
    pub fn begin_tick(&mut self) {
        self.is_drifting = false;
        self.landing_effect_fired = false;
        self.drift_sound_timer = self.drift_sound_timer.saturating_sub(1);
    }

    #[inline]
    pub fn set_input(&mut self, input: ControllerInput) {
        self.controller_left = input.left;
        self.controller_right = input.right;
        self.controller_accelerate = input.accelerate;
        self.controller_brake = input.brake;
    }

    #[inline]
    pub fn input(&self) -> ControllerInput {
        ControllerInput {
            left: self.controller_left,
            right: self.controller_right,
            accelerate: self.controller_accelerate,
            brake: self.controller_brake,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.spawn_state == SpawnState::Alive
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.z_position == 0
    }

    /// Zero every motion field, timer and controller flag. Identity fields
    /// (player index, handicap, terrain, heading, position) survive.
    pub fn physics_reset(&mut self) {
        self.x_force = 0;
        self.y_force = 0;
        self.x_velocity = 0;
        self.y_velocity = 0;
        self.velocity = 0;
        self.z_position = 0;
        self.z_force = 0;
        self.x_velocity_force_difference = 0;
        self.y_velocity_force_difference = 0;
        self.xy_velocity_force_difference_magnitude = 0;
        self.grip_change_timer = 0;
        self.drift_sound_timer = 0;
        self.set_input(ControllerInput::IDLE);
        self.is_moving = false;
        self.is_drifting = false;
    }

    pub fn validate(&self, vehicle_slots: u8) -> Result<(), RuleCode> {
        if self.heading > HEADING_MAX {
            return Err(RuleCode::VehicleHeadingRange);
        }
        if self.handicap_amount as usize >= HANDICAP_TABLE_LEN {
            return Err(RuleCode::VehicleHandicapRange);
        }
        if self.player_index >= vehicle_slots {
            return Err(RuleCode::VehiclePlayerIndexRange);
        }
        if self.checkpoint_index < CHECKPOINT_NONE {
            return Err(RuleCode::VehicleCheckpointSentinel);
        }
        if self.spawn_state == SpawnState::RespawnPending
            && self.checkpoint_index != CHECKPOINT_NONE
        {
            return Err(RuleCode::VehicleRespawnCheckpoint);
        }
        if self.z_position < 0 {
            return Err(RuleCode::VehicleAltitudeRange);
        }
        if self.drift_sound_timer > DRIFT_SOUND_RELOAD {
            return Err(RuleCode::VehicleDriftSoundTimerRange);
        }
        Ok(())
    }
}
