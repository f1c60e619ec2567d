use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCode {
    RaceVehicleSlots,
    RacePollRate,
    VehicleHeadingRange,
    VehicleHandicapRange,
    VehiclePlayerIndexRange,
    VehicleCheckpointSentinel,
    VehicleRespawnCheckpoint,
    VehicleAltitudeRange,
    VehicleDriftSoundTimerRange,
    VehicleHeadingStep,
    VehiclePositionStep,
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RaceVehicleSlots => write!(f, "RACE_VEHICLE_SLOTS"),
            Self::RacePollRate => write!(f, "RACE_POLL_RATE"),
            Self::VehicleHeadingRange => write!(f, "VEHICLE_HEADING_RANGE"),
            Self::VehicleHandicapRange => write!(f, "VEHICLE_HANDICAP_RANGE"),
            Self::VehiclePlayerIndexRange => write!(f, "VEHICLE_PLAYER_INDEX_RANGE"),
            Self::VehicleCheckpointSentinel => write!(f, "VEHICLE_CHECKPOINT_SENTINEL"),
            Self::VehicleRespawnCheckpoint => write!(f, "VEHICLE_RESPAWN_CHECKPOINT"),
            Self::VehicleAltitudeRange => write!(f, "VEHICLE_ALTITUDE_RANGE"),
            Self::VehicleDriftSoundTimerRange => write!(f, "VEHICLE_DRIFT_SOUND_TIMER_RANGE"),
            Self::VehicleHeadingStep => write!(f, "VEHICLE_HEADING_STEP"),
            Self::VehiclePositionStep => write!(f, "VEHICLE_POSITION_STEP"),
        }
    }
}

/// First invariant a strict replay tripped over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayViolation {
    pub frame_count: u32,
    pub slot: Option<u8>,
    pub rule: RuleCode,
}

impl fmt::Display for ReplayViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            Some(slot) => write!(
                f,
                "rule violation at frame {} (slot {slot}): {}",
                self.frame_count, self.rule
            ),
            None => write!(f, "rule violation at frame {}: {}", self.frame_count, self.rule),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReplayViolation {}

#[cfg(feature = "std")]
impl std::error::Error for RuleCode {}
