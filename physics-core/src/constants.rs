// Constants for the NES racing physics core.

use crate::types::SoundId;

// Compass
pub const HEADING_COUNT: usize = 64;
pub const HEADING_MAX: u8 = 63;

// Poll-timer reload values. A timer counts down to zero and reloads on the
// following tick, so a rate of N fires once every N + 1 ticks.
pub const NORMAL_TURN_POLL_RATE: u8 = 1;
pub const TANK_SLOW_TURN_POLL_RATE: u8 = 3;
pub const VELOCITY_POLL_RATE: u8 = 3;
pub const DRIFT_SPEED_LOSS_RATE: u8 = 7;
pub const CHANGE_Z_FORCE_RATE_1: u8 = 3;
pub const CHANGE_Z_FORCE_RATE_2: u8 = 1;
pub const ACCELERATION_POLL_RATE: u8 = 3;
pub const DECELERATION_POLL_RATE: u8 = 7;

// Instants at which the turn timers let a heading change through.
pub const TURN_POLL_INSTANT: u8 = 1;
pub const TANK_TURN_POLL_INSTANT: u8 = 0;
pub const TANK_SLOW_TURN_POLL_INSTANT: u8 = 0;

// Pre-race countdown, in ticks (three lights at roughly one per second).
pub const DEFAULT_COUNTDOWN_FRAMES: u16 = 180;
pub const DEFAULT_VEHICLE_SLOTS: u8 = 4;
pub const MAX_VEHICLE_SLOTS: u8 = 4;

// Drift table layout
pub const DRIFT_TABLE_LEN: usize = 23;
pub const HANDICAP_TABLE_LEN: usize = 32;
pub const DRIFT_INDEX_MOST_SENSITIVE: usize = 0x00;
pub const DRIFT_INDEX_CHOPPER: usize = 0x0A;
pub const DRIFT_INDEX_HIGHEST: usize = 0x15;
pub const DRIFT_INDEX_GRIP_CHANGE: usize = 0x16;
pub const DEFAULT_HANDICAP_AMOUNT: u8 = 0x10;

// Terrain
/// Terrain that pushes x velocity by `TERRAIN_LATERAL_PUSH` ($0x12, cause unknown).
pub const TERRAIN_LATERAL_PUSH_TYPE: u8 = 0x12;
pub const TERRAIN_LATERAL_PUSH: i16 = 0x200;
/// Terrain on which velocity and friction are not recomputed.
pub const TERRAIN_NO_TRACTION: u8 = 14;

// Altitude
pub const Z_POSITION_MAX: i8 = 0x7F;
pub const GROUND_Z_POSITION: i8 = 0;

// Checkpoints
pub const CHECKPOINT_NONE: i8 = -1;

// Timers
pub const DRIFT_SOUND_RELOAD: u8 = 8;

// Acceleration
pub const REVERSE_TOP_SPEED: i8 = 4;

// Sound events
pub const SFX_SKID: SoundId = SoundId(0x10);
pub const SFX_WAKE: SoundId = SoundId(0x11);
pub const SFX_TRACK_GRIND: SoundId = SoundId(0x12);
pub const SFX_ROTOR_WASH: SoundId = SoundId(0x13);
pub const SFX_BOUNCE: SoundId = SoundId(0x20);
pub const SFX_SPLASH: SoundId = SoundId(0x21);
pub const SFX_QUEUE_CAPACITY: usize = 8;
