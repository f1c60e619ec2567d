use core::fmt;

use serde::{Deserialize, Serialize};

/// Vehicle class raced in a given event. Selects both branch logic and the
/// lookup-table set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum VehicleType {
    #[default]
    SportsCars = 0,
    FourByFours = 1,
    Powerboats = 2,
    TurboWheels = 3,
    FormulaOne = 4,
    Warriors = 5,
    Tanks = 6,
    RuffTrux = 7,
    Choppers = 8,
}

pub const VEHICLE_TYPE_COUNT: usize = 9;

impl VehicleType {
    pub const ALL: [VehicleType; VEHICLE_TYPE_COUNT] = [
        VehicleType::SportsCars,
        VehicleType::FourByFours,
        VehicleType::Powerboats,
        VehicleType::TurboWheels,
        VehicleType::FormulaOne,
        VehicleType::Warriors,
        VehicleType::Tanks,
        VehicleType::RuffTrux,
        VehicleType::Choppers,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn turn_mode(self) -> TurnMode {
        match self {
            VehicleType::Tanks => TurnMode::Tank,
            _ => TurnMode::Standard,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleType::SportsCars => "sports-cars",
            VehicleType::FourByFours => "four-by-fours",
            VehicleType::Powerboats => "powerboats",
            VehicleType::TurboWheels => "turbo-wheels",
            VehicleType::FormulaOne => "formula-one",
            VehicleType::Warriors => "warriors",
            VehicleType::Tanks => "tanks",
            VehicleType::RuffTrux => "ruff-trux",
            VehicleType::Choppers => "choppers",
        }
    }
}

impl TryFrom<u8> for VehicleType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        VehicleType::ALL
            .get(value as usize)
            .copied()
            .ok_or(value)
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turning sub-algorithm, picked once from the vehicle type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnMode {
    Standard,
    Tank,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpawnState {
    #[default]
    NotSpawned,
    Alive,
    Destroyed,
    RespawnPending,
}

/// Vertical impact response. The discriminants match the values the cartridge
/// stores in the per-vehicle bounce byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum BounceBehavior {
    #[default]
    Normal = 0,
    Jump = 1,
    Respawn = 2,
}

/// Sound-event identifier handed to the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundId(pub u8);

/// Controller intent for one tick (4 bits on tape).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControllerInput {
    pub left: bool,
    pub right: bool,
    pub accelerate: bool,
    pub brake: bool,
}

pub const INPUT_LEFT: u8 = 0x01;
pub const INPUT_RIGHT: u8 = 0x02;
pub const INPUT_ACCELERATE: u8 = 0x04;
pub const INPUT_BRAKE: u8 = 0x08;
pub const INPUT_RESERVED_MASK: u8 = 0xF0;

impl ControllerInput {
    pub const IDLE: ControllerInput = ControllerInput {
        left: false,
        right: false,
        accelerate: false,
        brake: false,
    };

    #[inline]
    pub fn from_byte(byte: u8) -> Self {
        ControllerInput {
            left: (byte & INPUT_LEFT) != 0,
            right: (byte & INPUT_RIGHT) != 0,
            accelerate: (byte & INPUT_ACCELERATE) != 0,
            brake: (byte & INPUT_BRAKE) != 0,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        (if self.left { INPUT_LEFT } else { 0 })
            | (if self.right { INPUT_RIGHT } else { 0 })
            | (if self.accelerate { INPUT_ACCELERATE } else { 0 })
            | (if self.brake { INPUT_BRAKE } else { 0 })
    }
}
