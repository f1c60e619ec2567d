//! Per-tick vehicle physics.
//!
//! A tick runs the sub-steps in a fixed order: turn, velocity scalars,
//! velocity effects (friction and drift), vertical forces, acceleration.
//! Each one reads the shared [`RaceState`] and mutates a single
//! [`VehicleState`]; none of them touch the race timers.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::race::RaceState;
use crate::vehicle::VehicleState;

mod acceleration;
mod turn;
mod velocity;
mod vertical;

pub use velocity::calculate_external_friction;
pub use vertical::vertical_bounce;

/// Sub-step contract every physics model implements.
pub trait VehiclePhysics {
    fn turn(&self, vehicle: &mut VehicleState, race: &RaceState);
    fn velocity_scalars(&self, vehicle: &mut VehicleState, race: &RaceState);
    fn velocity_effects(&self, vehicle: &mut VehicleState, race: &RaceState);
    fn vertical_forces(&self, vehicle: &mut VehicleState, race: &RaceState);
    fn acceleration(&self, vehicle: &mut VehicleState, race: &RaceState);
}

/// Cartridge physics: one update per video frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NesPhysics;

impl VehiclePhysics for NesPhysics {
    #[inline]
    fn turn(&self, vehicle: &mut VehicleState, race: &RaceState) {
        turn::turn(vehicle, race);
    }

    #[inline]
    fn velocity_scalars(&self, vehicle: &mut VehicleState, race: &RaceState) {
        velocity::velocity_scalars(vehicle, race);
    }

    #[inline]
    fn velocity_effects(&self, vehicle: &mut VehicleState, race: &RaceState) {
        velocity::velocity_effects(vehicle, race);
    }

    #[inline]
    fn vertical_forces(&self, vehicle: &mut VehicleState, race: &RaceState) {
        vertical::vertical_forces(vehicle, race);
    }

    #[inline]
    fn acceleration(&self, vehicle: &mut VehicleState, race: &RaceState) {
        acceleration::acceleration(vehicle, race);
    }
}

/// Hardware revision being reproduced. Selects the physics model and the
/// fixed tick rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum GameVersion {
    #[default]
    NesNtsc = 0,
    NesPal = 1,
}

impl GameVersion {
    pub const ALL: [GameVersion; 2] = [GameVersion::NesNtsc, GameVersion::NesPal];

    /// Both NES revisions run the same per-frame code; only the frame rate differs.
    pub fn physics(self) -> NesPhysics {
        match self {
            GameVersion::NesNtsc | GameVersion::NesPal => NesPhysics,
        }
    }

    pub fn tick_hz(self) -> f64 {
        match self {
            GameVersion::NesNtsc => 60.0988,
            GameVersion::NesPal => 50.0070,
        }
    }

    #[inline]
    pub fn fixed_delta_secs(self) -> f64 {
        1.0 / self.tick_hz()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameVersion::NesNtsc => "nes-ntsc",
            GameVersion::NesPal => "nes-pal",
        }
    }
}

impl TryFrom<u8> for GameVersion {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        GameVersion::ALL.get(value as usize).copied().ok_or(value)
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntsc_ticks_faster_than_pal() {
        assert!(GameVersion::NesNtsc.tick_hz() > GameVersion::NesPal.tick_hz());
        assert!(GameVersion::NesPal.fixed_delta_secs() > 0.0199);
    }

    #[test]
    fn game_version_from_u8_rejects_unknown_ids() {
        assert_eq!(GameVersion::try_from(1), Ok(GameVersion::NesPal));
        assert_eq!(GameVersion::try_from(2), Err(2));
    }
}
