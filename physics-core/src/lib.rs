#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod constants;
pub mod error;
pub mod physics;
pub mod race;
pub mod sfx;
pub mod sim;
pub mod tables;
pub mod types;
pub mod vehicle;
pub mod wrapping;

pub use error::{ReplayViolation, RuleCode};
pub use physics::{GameVersion, NesPhysics, VehiclePhysics};
pub use race::{PollTimers, RaceConfig, RaceState};
pub use sfx::SfxQueue;
pub use sim::{
    replay, replay_strict, replay_with_checkpoints, Race, RaceSnapshot, ReplayCheckpoint, ReplayResult,
};
pub use tables::LookupTables;
pub use types::{BounceBehavior, ControllerInput, SoundId, SpawnState, TurnMode, VehicleType};
pub use vehicle::VehicleState;
