use racer_physics_core::sim::{replay_with_checkpoints, ReplayCheckpoint};
use racer_physics_core::{replay, RaceConfig, VehicleType};

fn mix_u64(hash: u64, value: u64) -> u64 {
    // FNV-1a style mix over the sampled fields.
    (hash ^ value).wrapping_mul(0x0000_0100_0000_01B3)
}

fn checkpoint_fingerprint(checkpoints: &[ReplayCheckpoint]) -> u64 {
    let mut hash = 0xCBF2_9CE4_8422_2325u64;

    for checkpoint in checkpoints {
        hash = mix_u64(hash, checkpoint.frame_count as u64);
        hash = mix_u64(hash, checkpoint.countdown_timer as u64);
        hash = mix_u64(hash, checkpoint.fingerprint);
        for vehicle in &checkpoint.vehicles {
            hash = mix_u64(hash, vehicle.heading as u64);
            hash = mix_u64(hash, vehicle.velocity as i64 as u64);
            hash = mix_u64(hash, vehicle.x_position as i64 as u64);
            hash = mix_u64(hash, vehicle.y_position as i64 as u64);
            hash = mix_u64(hash, vehicle.z_position as i64 as u64);
            hash = mix_u64(hash, vehicle.is_drifting as u64);
        }
    }

    hash
}

/// Lap-ish input: accelerate, then alternate long left and right sweeps.
fn sweep_inputs(frames: u32, slots: u8) -> Vec<u8> {
    let mut inputs = Vec::with_capacity((frames * slots as u32) as usize);
    for frame in 0..frames {
        let steer = match (frame / 90) % 3 {
            0 => 0x00,
            1 => 0x01,
            _ => 0x02,
        };
        for slot in 0..slots {
            let brake = if (frame + slot as u32 * 17) % 240 < 12 { 0x08 } else { 0x00 };
            inputs.push(0x04 | steer | brake);
        }
    }
    inputs
}

#[test]
fn checkpoint_stream_is_reproducible_for_every_vehicle_type() {
    for vehicle_type in VehicleType::ALL {
        let config = RaceConfig {
            vehicle_type,
            ..RaceConfig::default()
        };
        let inputs = sweep_inputs(1_500, config.vehicle_slots);

        let first = replay_with_checkpoints(&config, &inputs, 50).expect("valid config");
        let second = replay_with_checkpoints(&config, &inputs, 50).expect("valid config");

        assert_eq!(first.first().expect("checkpoint").frame_count, 0);
        assert_eq!(first.last().expect("checkpoint").frame_count, 1_500);
        assert_eq!(first.len(), 31);
        assert_eq!(
            checkpoint_fingerprint(&first),
            checkpoint_fingerprint(&second),
            "{vehicle_type}"
        );
    }
}

#[test]
fn final_checkpoint_agrees_with_plain_replay() {
    let config = RaceConfig {
        vehicle_type: VehicleType::Choppers,
        vehicle_slots: 3,
        ..RaceConfig::default()
    };
    let inputs = sweep_inputs(777, 3);

    let checkpoints = replay_with_checkpoints(&config, &inputs, 0).expect("valid config");
    let result = replay(&config, &inputs).expect("valid config");

    // A zero stride samples every frame.
    assert_eq!(checkpoints.len(), 778);
    let last = checkpoints.last().expect("checkpoint");
    assert_eq!(last.frame_count, result.frame_count);
    assert_eq!(last.fingerprint, result.fingerprint);
}

#[test]
fn vehicles_leave_the_grid_once_the_countdown_ends() {
    let config = RaceConfig::default();
    let inputs = sweep_inputs(400, config.vehicle_slots);
    let checkpoints = replay_with_checkpoints(&config, &inputs, 10).expect("valid config");

    for checkpoint in &checkpoints {
        if checkpoint.countdown_timer > 0 {
            assert!(checkpoint
                .vehicles
                .iter()
                .all(|vehicle| vehicle.x_position == 0 && vehicle.y_position == 0));
        }
    }

    let last = checkpoints.last().expect("checkpoint");
    assert_eq!(last.countdown_timer, 0);
    assert!(last.vehicles.iter().all(|vehicle| vehicle.velocity > 0));
}
