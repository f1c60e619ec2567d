use racer_physics_core::constants::MAX_VEHICLE_SLOTS;
use racer_physics_core::types::INPUT_RESERVED_MASK;
use racer_physics_core::{GameVersion, RaceConfig, VehicleType};
use serde::Serialize;

use crate::error::TapeError;

pub const TAPE_MAGIC: u32 = u32::from_le_bytes(*b"NRCT");
pub const TAPE_VERSION: u8 = 1;
pub const TAPE_HEADER_SIZE: usize = 16;
pub const TAPE_FOOTER_SIZE: usize = 12;
/// Thirty minutes of NTSC ticks.
pub const DEFAULT_MAX_FRAMES: u32 = 108_000;

pub const FLAG_CHALLENGE_MODE: u8 = 0x01;
pub const FLAG_UNLIMITED_GRIP: u8 = 0x02;
const FLAGS_RESERVED_MASK: u8 = !(FLAG_CHALLENGE_MODE | FLAG_UNLIMITED_GRIP);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TapeHeader {
    pub version: u8,
    pub vehicle_type: VehicleType,
    pub game_version: GameVersion,
    pub vehicle_slots: u8,
    pub frame_count: u32,
    pub countdown_frames: u16,
    pub handicap_amount: u8,
    pub challenge_mode: bool,
    pub unlimited_grip: bool,
}

impl TapeHeader {
    /// Race the tape was recorded against. Poll rates are not carried on the
    /// tape and always take their hardware defaults.
    pub fn race_config(&self) -> RaceConfig {
        RaceConfig {
            vehicle_type: self.vehicle_type,
            game_version: self.game_version,
            vehicle_slots: self.vehicle_slots,
            countdown_frames: self.countdown_frames,
            challenge_mode: self.challenge_mode,
            unlimited_grip: self.unlimited_grip,
            handicap_amount: self.handicap_amount,
            ..RaceConfig::default()
        }
    }

    fn flags(&self) -> u8 {
        (if self.challenge_mode {
            FLAG_CHALLENGE_MODE
        } else {
            0
        }) | (if self.unlimited_grip {
            FLAG_UNLIMITED_GRIP
        } else {
            0
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TapeFooter {
    pub fingerprint: u64,
    pub checksum: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TapeView<'a> {
    pub header: TapeHeader,
    /// Frame-major: `vehicle_slots` bytes per tick.
    pub inputs: &'a [u8],
    pub footer: TapeFooter,
}

impl TapeView<'_> {
    pub fn frame(&self, index: u32) -> Option<&[u8]> {
        let slots = self.header.vehicle_slots as usize;
        let start = index as usize * slots;
        self.inputs.get(start..start + slots)
    }
}

pub fn parse_tape(bytes: &[u8], max_frames: u32) -> Result<TapeView<'_>, TapeError> {
    let min_len = TAPE_HEADER_SIZE + TAPE_FOOTER_SIZE;
    if bytes.len() < min_len {
        return Err(TapeError::TapeTooShort {
            actual: bytes.len(),
            min: min_len,
        });
    }

    let magic = read_u32_le(bytes, 0);
    if magic != TAPE_MAGIC {
        return Err(TapeError::InvalidMagic { found: magic });
    }

    let version = bytes[4];
    if version != TAPE_VERSION {
        return Err(TapeError::UnsupportedVersion { found: version });
    }

    let vehicle_type =
        VehicleType::try_from(bytes[5]).map_err(|found| TapeError::UnknownVehicleType { found })?;
    let game_version =
        GameVersion::try_from(bytes[6]).map_err(|found| TapeError::UnknownGameVersion { found })?;

    let vehicle_slots = bytes[7];
    if vehicle_slots == 0 || vehicle_slots > MAX_VEHICLE_SLOTS {
        return Err(TapeError::VehicleSlotsOutOfRange {
            found: vehicle_slots,
        });
    }

    let frame_count = read_u32_le(bytes, 8);
    let countdown_frames = u16::from_le_bytes([bytes[12], bytes[13]]);
    let handicap_amount = bytes[14];
    let flags = bytes[15];
    if flags & FLAGS_RESERVED_MASK != 0 {
        return Err(TapeError::HeaderReservedFlags { flags });
    }

    if frame_count == 0 || frame_count > max_frames {
        return Err(TapeError::FrameCountOutOfRange {
            frame_count,
            max_frames,
        });
    }

    let body_len = frame_count as usize * vehicle_slots as usize;
    let expected_len = TAPE_HEADER_SIZE + body_len + TAPE_FOOTER_SIZE;
    if bytes.len() != expected_len {
        return Err(TapeError::TapeLengthMismatch {
            expected: expected_len,
            actual: bytes.len(),
        });
    }

    let inputs_start = TAPE_HEADER_SIZE;
    let inputs_end = inputs_start + body_len;
    let inputs = &bytes[inputs_start..inputs_end];

    let fingerprint = read_u64_le(bytes, inputs_end);
    let checksum = read_u32_le(bytes, inputs_end + 8);

    let computed = crc32_and_validate_inputs(bytes, inputs_start, inputs_end, vehicle_slots)?;
    if checksum != computed {
        return Err(TapeError::CrcMismatch {
            stored: checksum,
            computed,
        });
    }

    Ok(TapeView {
        header: TapeHeader {
            version,
            vehicle_type,
            game_version,
            vehicle_slots,
            frame_count,
            countdown_frames,
            handicap_amount,
            challenge_mode: flags & FLAG_CHALLENGE_MODE != 0,
            unlimited_grip: flags & FLAG_UNLIMITED_GRIP != 0,
        },
        inputs,
        footer: TapeFooter {
            fingerprint,
            checksum,
        },
    })
}

/// Encode a tape for `config`. A trailing partial frame is padded with idle
/// inputs.
pub fn serialize_tape(config: &RaceConfig, inputs: &[u8], fingerprint: u64) -> Vec<u8> {
    let slots = config.vehicle_slots.max(1) as usize;
    let frame_count = inputs.len().div_ceil(slots);
    let body_len = frame_count * slots;
    let total_len = TAPE_HEADER_SIZE + body_len + TAPE_FOOTER_SIZE;
    let mut data = vec![0u8; total_len];

    let header = TapeHeader {
        version: TAPE_VERSION,
        vehicle_type: config.vehicle_type,
        game_version: config.game_version,
        vehicle_slots: slots as u8,
        frame_count: frame_count as u32,
        countdown_frames: config.countdown_frames,
        handicap_amount: config.handicap_amount,
        challenge_mode: config.challenge_mode,
        unlimited_grip: config.unlimited_grip,
    };

    write_u32_le(&mut data, 0, TAPE_MAGIC);
    data[4] = header.version;
    data[5] = header.vehicle_type as u8;
    data[6] = header.game_version as u8;
    data[7] = header.vehicle_slots;
    write_u32_le(&mut data, 8, header.frame_count);
    data[12..14].copy_from_slice(&header.countdown_frames.to_le_bytes());
    data[14] = header.handicap_amount;
    data[15] = header.flags();

    let body_start = TAPE_HEADER_SIZE;
    let body_end = body_start + body_len;
    data[body_start..body_start + inputs.len()].copy_from_slice(inputs);

    data[body_end..body_end + 8].copy_from_slice(&fingerprint.to_le_bytes());

    let checksum = crc32(&data[..body_end]);
    write_u32_le(&mut data, body_end + 8, checksum);

    data
}

#[inline]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
fn read_u64_le(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

#[inline]
fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;

    while i < 256 {
        let mut c = i as u32;
        let mut j = 0;

        while j < 8 {
            c = if (c & 1) != 0 {
                0xEDB8_8320u32 ^ (c >> 1)
            } else {
                c >> 1
            };
            j += 1;
        }

        table[i] = c;
        i += 1;
    }

    table
}

pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;

    for byte in data {
        let idx = ((crc ^ (*byte as u32)) & 0xFF) as usize;
        crc = CRC_TABLE[idx] ^ (crc >> 8);
    }

    crc ^ 0xFFFF_FFFFu32
}

fn crc32_and_validate_inputs(
    bytes: &[u8],
    inputs_start: usize,
    inputs_end: usize,
    vehicle_slots: u8,
) -> Result<u32, TapeError> {
    let slots = vehicle_slots as usize;
    let mut crc = 0xFFFF_FFFFu32;

    for (i, &byte) in bytes[..inputs_end].iter().enumerate() {
        if i >= inputs_start && (byte & INPUT_RESERVED_MASK) != 0 {
            let offset = i - inputs_start;
            return Err(TapeError::ReservedInputBitsNonZero {
                frame: (offset / slots) as u32,
                slot: (offset % slots) as u8,
                byte,
            });
        }

        let idx = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = CRC_TABLE[idx] ^ (crc >> 8);
    }

    Ok(crc ^ 0xFFFF_FFFFu32)
}
