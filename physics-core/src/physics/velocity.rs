use crate::constants::{
    DRIFT_INDEX_CHOPPER, DRIFT_INDEX_GRIP_CHANGE, DRIFT_INDEX_HIGHEST,
    DRIFT_INDEX_MOST_SENSITIVE, DRIFT_SOUND_RELOAD, TERRAIN_LATERAL_PUSH,
    TERRAIN_LATERAL_PUSH_TYPE,
};
use crate::race::RaceState;
use crate::tables::DRIFT_SOUND_LUT;
use crate::types::VehicleType;
use crate::vehicle::VehicleState;
use crate::wrapping::{
    abs_diff_i16, directed_scalar, nudge_toward, scale_velocity, speed_of, toward_zero,
};

/// Convert `velocity` along `heading` into x/y components. Only the vehicle
/// whose slot matches the velocity round-robin timer is recomputed.
pub(super) fn velocity_scalars(vehicle: &mut VehicleState, race: &RaceState) {
    if vehicle.player_index != race.timers.velocity {
        return;
    }

    let heading = vehicle.heading as usize;
    let speed = speed_of(vehicle.velocity);

    let x_scalar = directed_scalar(race.tables.velocity_scalar_x[heading], vehicle.velocity);
    vehicle.x_velocity = scale_velocity(x_scalar, speed);
    if vehicle.terrain_type == TERRAIN_LATERAL_PUSH_TYPE {
        // Cause unknown; reproduced as found.
        vehicle.x_velocity = vehicle.x_velocity.wrapping_add(TERRAIN_LATERAL_PUSH);
    }

    let y_scalar = directed_scalar(race.tables.velocity_scalar_y[heading], vehicle.velocity);
    vehicle.y_velocity = scale_velocity(y_scalar, speed);
}

pub(super) fn velocity_effects(vehicle: &mut VehicleState, race: &RaceState) {
    vehicle.x_velocity_force_difference = abs_diff_i16(vehicle.x_velocity, vehicle.x_force);
    vehicle.y_velocity_force_difference = abs_diff_i16(vehicle.y_velocity, vehicle.y_force);

    if !has_grip_override(vehicle, race) {
        if vehicle.grip_change_timer >= 0 {
            if vehicle.grip_change_timer > 0 {
                vehicle.grip_change_timer -= 1;
            }
            // The handicap threshold returns on the tick the timer reaches zero.
            let drift_index = if vehicle.grip_change_timer == 0 {
                race.tables.handicap[vehicle.handicap_amount as usize] as usize
            } else {
                DRIFT_INDEX_MOST_SENSITIVE
            };

            vehicle.xy_velocity_force_difference_magnitude = vehicle
                .x_velocity_force_difference
                .wrapping_add(vehicle.y_velocity_force_difference);

            if vehicle.xy_velocity_force_difference_magnitude
                >= race.tables.drift_threshold[drift_index]
            {
                calculate_external_friction(vehicle, race);
                return;
            }
        } else {
            // Negative timers keep counting down; an 8-bit wrap back to
            // non-negative parks the timer at zero.
            vehicle.grip_change_timer = vehicle.grip_change_timer.wrapping_sub(1);
            if vehicle.grip_change_timer >= 0 {
                vehicle.grip_change_timer = 0;
            }
        }
    }

    vehicle.x_force = vehicle.x_velocity;
    vehicle.y_force = vehicle.y_velocity;
}

#[inline]
fn has_grip_override(vehicle: &VehicleState, race: &RaceState) -> bool {
    vehicle.has_unlimited_grip || (race.has_unlimited_grip && vehicle.player_index == 0)
}

/// Pull force toward velocity by the drift table amount, bleed speed on the
/// drift-loss poll and queue the drift sound.
///
/// Vehicles without their own unlimited grip always use the highest drift
/// index. The chopper, grip-change and handicap indices only apply to
/// callers that reach here with grip already granted.
pub fn calculate_external_friction(vehicle: &mut VehicleState, race: &RaceState) {
    let drift_index = if !vehicle.has_unlimited_grip {
        DRIFT_INDEX_HIGHEST
    } else if race.vehicle_type == VehicleType::Choppers && !vehicle.is_ai_controlled_speed {
        DRIFT_INDEX_CHOPPER
    } else if vehicle.grip_change_timer > 0 {
        DRIFT_INDEX_GRIP_CHANGE
    } else {
        race.tables.handicap[vehicle.handicap_amount as usize] as usize
    };
    let amount = race.tables.drift_force_amount[drift_index];

    vehicle.x_force = nudge_toward(
        vehicle.x_force,
        vehicle.x_velocity,
        vehicle.x_velocity_force_difference,
        amount,
    );
    vehicle.y_force = nudge_toward(
        vehicle.y_force,
        vehicle.y_velocity,
        vehicle.y_velocity_force_difference,
        amount,
    );

    if race.vehicle_type != VehicleType::Choppers
        && race.timers.drift_speed_loss == 0
        && vehicle.velocity != 0
    {
        vehicle.velocity = toward_zero(vehicle.velocity);
    }

    vehicle.is_drifting = true;

    let muted_in_challenge = race.is_challenge_mode && vehicle.player_index != 0;
    if vehicle.drift_sound_timer == 0 && !vehicle.has_unlimited_grip && !muted_in_challenge {
        vehicle.sfx.push(DRIFT_SOUND_LUT[race.vehicle_type.index()]);
        vehicle.drift_sound_timer = DRIFT_SOUND_RELOAD;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SFX_ROTOR_WASH, SFX_SKID, SFX_WAKE};
    use crate::physics::test_support::{race_for, vehicle};

    #[test]
    fn heading_zero_at_speed_ten_gives_x_velocity_800() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        car.heading = 0;
        car.velocity = 10;
        car.handicap_amount = 0;
        velocity_scalars(&mut car, &race);
        assert_eq!(car.x_velocity, 800);
        assert_eq!(car.y_velocity, 0);
    }

    #[test]
    fn reversing_flips_the_scalar() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        car.heading = 16;
        car.velocity = -3;
        velocity_scalars(&mut car, &race);
        assert_eq!(car.y_velocity, -240);
    }

    #[test]
    fn scalars_only_run_for_the_polled_slot() {
        let mut race = race_for(VehicleType::SportsCars);
        race.timers.velocity = 2;
        let mut car = vehicle();
        car.velocity = 10;
        velocity_scalars(&mut car, &race);
        assert_eq!(car.x_velocity, 0);

        car.player_index = 2;
        velocity_scalars(&mut car, &race);
        assert_eq!(car.x_velocity, 800);
    }

    #[test]
    fn lateral_push_terrain_adds_to_x_only() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        car.terrain_type = TERRAIN_LATERAL_PUSH_TYPE;
        car.velocity = 10;
        velocity_scalars(&mut car, &race);
        assert_eq!(car.x_velocity, 800 + 0x200);
        assert_eq!(car.y_velocity, 0);
    }

    #[test]
    fn unlimited_grip_forces_track_velocity_unconditionally() {
        let race = race_for(VehicleType::SportsCars);
        for (x_velocity, x_force) in [(800, -800), (i16::MAX, i16::MIN), (0, 5000)] {
            let mut car = vehicle();
            car.has_unlimited_grip = true;
            car.x_velocity = x_velocity;
            car.y_velocity = -x_velocity;
            car.x_force = x_force;
            velocity_effects(&mut car, &race);
            assert_eq!(car.x_force, car.x_velocity);
            assert_eq!(car.y_force, car.y_velocity);
            assert!(!car.is_drifting);
        }
    }

    #[test]
    fn race_wide_grip_only_helps_slot_zero() {
        let mut race = race_for(VehicleType::SportsCars);
        race.has_unlimited_grip = true;

        let mut leader = vehicle();
        leader.x_velocity = 2000;
        velocity_effects(&mut leader, &race);
        assert_eq!(leader.x_force, 2000);

        let mut rival = VehicleState::spawn(1);
        rival.x_velocity = 2000;
        velocity_effects(&mut rival, &race);
        assert!(rival.is_drifting);
        // Rivals fall back to the highest drift index.
        assert_eq!(
            rival.x_force,
            race.tables.drift_force_amount[DRIFT_INDEX_HIGHEST] as i16
        );
    }

    #[test]
    fn small_gap_assigns_forces_directly() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        car.x_velocity = 10;
        car.x_force = 0;
        velocity_effects(&mut car, &race);
        assert_eq!(car.x_force, 10);
        assert!(!car.is_drifting);
        assert!(car.sfx.is_empty());
    }

    #[test]
    fn large_gap_drifts_and_nudges_toward_velocity() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        car.x_velocity = 1600;
        car.y_velocity = -400;
        car.velocity = 20;
        velocity_effects(&mut car, &race);

        let amount = race.tables.drift_force_amount[DRIFT_INDEX_HIGHEST] as i16;
        assert!(car.is_drifting);
        assert_eq!(car.x_force, amount);
        assert_eq!(car.y_force, -amount);
        assert_eq!(car.xy_velocity_force_difference_magnitude, 2000);
        // Drift-loss poll reads zero in the fixture.
        assert_eq!(car.velocity, 19);
        assert!(car.sfx.contains(SFX_SKID));
        assert_eq!(car.drift_sound_timer, DRIFT_SOUND_RELOAD);
    }

    #[test]
    fn positive_grip_timer_uses_the_most_sensitive_threshold() {
        let race = race_for(VehicleType::SportsCars);
        let threshold = race.tables.drift_threshold[DRIFT_INDEX_MOST_SENSITIVE];
        let mut car = vehicle();
        car.grip_change_timer = 2;
        car.x_velocity = threshold as i16;
        velocity_effects(&mut car, &race);
        assert_eq!(car.grip_change_timer, 1);
        assert!(car.is_drifting);
    }

    #[test]
    fn grip_timer_reaching_zero_restores_the_handicap_threshold() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        let handicap_index = race.tables.handicap[car.handicap_amount as usize] as usize;
        assert!(race.tables.drift_threshold[DRIFT_INDEX_MOST_SENSITIVE] <= 100);
        assert!(race.tables.drift_threshold[handicap_index] > 100);

        car.grip_change_timer = 1;
        car.x_velocity = 100;
        velocity_effects(&mut car, &race);
        assert_eq!(car.grip_change_timer, 0);
        assert!(!car.is_drifting);
        assert_eq!(car.x_force, 100);
    }

    #[test]
    fn plain_vehicles_drift_with_the_highest_index() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        car.x_velocity = 1000;
        car.x_velocity_force_difference = 1000;
        calculate_external_friction(&mut car, &race);
        assert_eq!(car.x_force, 16);
        assert_eq!(
            car.x_force,
            race.tables.drift_force_amount[DRIFT_INDEX_HIGHEST] as i16
        );
    }

    #[test]
    fn grip_change_index_applies_while_timer_is_positive() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        car.has_unlimited_grip = true;
        car.grip_change_timer = 3;
        car.x_velocity = 1000;
        car.x_velocity_force_difference = 1000;
        calculate_external_friction(&mut car, &race);
        assert_eq!(
            car.x_force,
            race.tables.drift_force_amount[DRIFT_INDEX_GRIP_CHANGE] as i16
        );
    }

    #[test]
    fn negative_grip_timer_bypasses_the_threshold() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        car.grip_change_timer = -3;
        car.x_velocity = 3000;
        velocity_effects(&mut car, &race);
        assert_eq!(car.grip_change_timer, -4);
        assert_eq!(car.x_force, 3000);
        assert!(!car.is_drifting);
    }

    #[test]
    fn negative_grip_timer_wrap_parks_at_zero() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        car.grip_change_timer = i8::MIN;
        velocity_effects(&mut car, &race);
        assert_eq!(car.grip_change_timer, 0);
    }

    #[test]
    fn choppers_use_their_own_index_and_keep_speed() {
        let race = race_for(VehicleType::Choppers);
        let mut chopper = vehicle();
        chopper.has_unlimited_grip = true;
        chopper.velocity = 12;
        chopper.x_velocity = 1000;
        chopper.x_velocity_force_difference = 1000;
        calculate_external_friction(&mut chopper, &race);
        assert_eq!(
            chopper.x_force,
            race.tables.drift_force_amount[DRIFT_INDEX_CHOPPER] as i16
        );
        assert_eq!(chopper.velocity, 12);
        assert!(chopper.sfx.is_empty());

        let mut rider = vehicle();
        rider.velocity = 12;
        calculate_external_friction(&mut rider, &race);
        assert_eq!(rider.velocity, 12);
        assert!(rider.sfx.contains(SFX_ROTOR_WASH));
    }

    #[test]
    fn friction_never_overshoots_velocity() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        car.x_velocity = 5;
        car.x_force = 0;
        car.x_velocity_force_difference = 5;
        car.y_velocity = -5;
        car.y_force = 0;
        car.y_velocity_force_difference = 5;
        calculate_external_friction(&mut car, &race);
        assert_eq!(car.x_force, 5);
        assert_eq!(car.y_force, -5);
    }

    #[test]
    fn drift_sound_respects_timer_and_challenge_mode() {
        let mut race = race_for(VehicleType::Powerboats);
        let mut boat = vehicle();
        boat.drift_sound_timer = 3;
        calculate_external_friction(&mut boat, &race);
        assert!(boat.sfx.is_empty());

        race.is_challenge_mode = true;
        let mut rival = VehicleState::spawn(1);
        calculate_external_friction(&mut rival, &race);
        assert!(rival.sfx.is_empty());

        let mut player = vehicle();
        calculate_external_friction(&mut player, &race);
        assert_eq!(player.sfx.drain(), [SFX_WAKE]);
    }

    #[test]
    fn drift_sound_is_queued_once_per_tick() {
        let race = race_for(VehicleType::SportsCars);
        let mut car = vehicle();
        calculate_external_friction(&mut car, &race);
        car.drift_sound_timer = 0;
        calculate_external_friction(&mut car, &race);
        assert_eq!(car.sfx.len(), 1);
    }
}
