use racer_physics_core::{replay_strict, ReplayResult};
use serde::Serialize;

use crate::error::TapeError;
use crate::tape::{parse_tape, TapeHeader};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TapeVerification {
    pub header: TapeHeader,
    pub result: ReplayResult,
}

/// Parse a tape, replay it under strict invariant checks, and compare the
/// outcome with the footer.
pub fn verify_tape(bytes: &[u8], max_frames: u32) -> Result<TapeVerification, TapeError> {
    let tape = parse_tape(bytes, max_frames)?;
    let config = tape.header.race_config();
    config
        .validate()
        .map_err(|rule| TapeError::InvalidRaceConfig { rule })?;

    let result = replay_strict(&config, tape.inputs)
        .map_err(|violation| TapeError::RuleViolation { violation })?;

    if result.frame_count != tape.header.frame_count {
        return Err(TapeError::FrameCountMismatch {
            claimed: tape.header.frame_count,
            computed: result.frame_count,
        });
    }

    if result.fingerprint != tape.footer.fingerprint {
        return Err(TapeError::FingerprintMismatch {
            claimed: tape.footer.fingerprint,
            computed: result.fingerprint,
        });
    }

    Ok(TapeVerification {
        header: tape.header,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tape::{serialize_tape, TAPE_HEADER_SIZE};
    use racer_physics_core::{replay, RaceConfig, RuleCode, VehicleType};

    fn recorded(config: &RaceConfig, inputs: &[u8]) -> Vec<u8> {
        let result = replay(config, inputs).unwrap();
        serialize_tape(config, inputs, result.fingerprint)
    }

    fn full_throttle(config: &RaceConfig, frames: usize) -> Vec<u8> {
        vec![0x04; frames * config.vehicle_slots as usize]
    }

    #[test]
    fn verifies_a_recorded_tape() {
        let config = RaceConfig {
            vehicle_type: VehicleType::FourByFours,
            countdown_frames: 20,
            ..RaceConfig::default()
        };
        let inputs = full_throttle(&config, 200);
        let bytes = recorded(&config, &inputs);

        let verification = verify_tape(&bytes, 1_000).unwrap();
        assert_eq!(verification.result.frame_count, 200);
        assert_eq!(verification.header.vehicle_type, VehicleType::FourByFours);
    }

    #[test]
    fn rejects_a_forged_fingerprint() {
        let config = RaceConfig {
            countdown_frames: 10,
            ..RaceConfig::default()
        };
        let inputs = full_throttle(&config, 60);
        let result = replay(&config, &inputs).unwrap();
        let bytes = serialize_tape(&config, &inputs, result.fingerprint ^ 1);

        assert_eq!(
            verify_tape(&bytes, 1_000),
            Err(TapeError::FingerprintMismatch {
                claimed: result.fingerprint ^ 1,
                computed: result.fingerprint,
            })
        );
    }

    #[test]
    fn edited_inputs_fail_the_crc_before_replay() {
        let config = RaceConfig::default();
        let inputs = full_throttle(&config, 10);
        let mut bytes = recorded(&config, &inputs);
        bytes[TAPE_HEADER_SIZE] = 0x08;
        assert!(matches!(
            verify_tape(&bytes, 1_000),
            Err(TapeError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn out_of_range_handicap_is_an_invalid_race() {
        let config = RaceConfig {
            handicap_amount: 40,
            ..RaceConfig::default()
        };
        let bytes = serialize_tape(&config, &[0x00; 4], 0);
        assert_eq!(
            verify_tape(&bytes, 1_000),
            Err(TapeError::InvalidRaceConfig {
                rule: RuleCode::VehicleHandicapRange,
            })
        );
    }
}
