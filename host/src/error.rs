use std::fmt;

use racer_physics_core::{ReplayViolation, RuleCode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TapeError {
    TapeTooShort { actual: usize, min: usize },
    InvalidMagic { found: u32 },
    UnsupportedVersion { found: u8 },
    UnknownVehicleType { found: u8 },
    UnknownGameVersion { found: u8 },
    VehicleSlotsOutOfRange { found: u8 },
    HeaderReservedFlags { flags: u8 },
    FrameCountOutOfRange { frame_count: u32, max_frames: u32 },
    TapeLengthMismatch { expected: usize, actual: usize },
    ReservedInputBitsNonZero { frame: u32, slot: u8, byte: u8 },
    CrcMismatch { stored: u32, computed: u32 },
    InvalidRaceConfig { rule: RuleCode },
    RuleViolation { violation: ReplayViolation },
    FrameCountMismatch { claimed: u32, computed: u32 },
    FingerprintMismatch { claimed: u64, computed: u64 },
}

impl fmt::Display for TapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TapeTooShort { actual, min } => {
                write!(f, "tape too short: got {actual} bytes, need at least {min}")
            }
            Self::InvalidMagic { found } => write!(f, "invalid tape magic: 0x{found:08x}"),
            Self::UnsupportedVersion { found } => write!(f, "unsupported tape version: {found}"),
            Self::UnknownVehicleType { found } => write!(f, "unknown vehicle type id: {found}"),
            Self::UnknownGameVersion { found } => write!(f, "unknown game version id: {found}"),
            Self::VehicleSlotsOutOfRange { found } => {
                write!(f, "vehicle slot count out of range: {found}")
            }
            Self::HeaderReservedFlags { flags } => {
                write!(f, "header reserved flag bits set: 0x{flags:02x}")
            }
            Self::FrameCountOutOfRange {
                frame_count,
                max_frames,
            } => write!(
                f,
                "frame count out of range: {frame_count} (allowed 1..={max_frames})"
            ),
            Self::TapeLengthMismatch { expected, actual } => write!(
                f,
                "tape length mismatch: expected {expected} bytes, got {actual}"
            ),
            Self::ReservedInputBitsNonZero { frame, slot, byte } => write!(
                f,
                "input byte reserved bits set at frame {frame}, slot {slot}: 0x{byte:02x}"
            ),
            Self::CrcMismatch { stored, computed } => write!(
                f,
                "crc mismatch: stored=0x{stored:08x}, computed=0x{computed:08x}"
            ),
            Self::InvalidRaceConfig { rule } => {
                write!(f, "tape header describes an invalid race: {rule}")
            }
            Self::RuleViolation { violation } => write!(f, "{violation}"),
            Self::FrameCountMismatch { claimed, computed } => {
                write!(
                    f,
                    "frame-count mismatch: claimed={claimed}, computed={computed}"
                )
            }
            Self::FingerprintMismatch { claimed, computed } => write!(
                f,
                "fingerprint mismatch: claimed=0x{claimed:016x}, computed=0x{computed:016x}"
            ),
        }
    }
}

impl std::error::Error for TapeError {}
