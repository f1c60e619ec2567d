use crate::constants::{CHECKPOINT_NONE, GROUND_Z_POSITION, SFX_BOUNCE, SFX_SPLASH, Z_POSITION_MAX};
use crate::race::RaceState;
use crate::tables::BOUNCE_AMOUNT_LUT;
use crate::types::{BounceBehavior, SpawnState, VehicleType};
use crate::vehicle::VehicleState;

/// Integrate altitude, then either apply gravity on the airborne timer or
/// resolve the ground contact.
pub(super) fn vertical_forces(vehicle: &mut VehicleState, race: &RaceState) {
    let next = vehicle.z_position.wrapping_add(vehicle.z_force);
    vehicle.z_position = if vehicle.z_force >= 0 && next < 0 {
        // Rising past the top of the byte pins to the ceiling.
        Z_POSITION_MAX
    } else {
        next
    };

    if vehicle.z_position > GROUND_Z_POSITION {
        let gravity_timer = if vehicle.bounce_behavior == BounceBehavior::Jump {
            race.timers.change_z_force_1
        } else {
            race.timers.change_z_force_2
        };
        if gravity_timer == 0 {
            vehicle.z_force = vehicle.z_force.wrapping_sub(1);
        }
    } else {
        vertical_bounce(vehicle, race);
    }
}

/// Ground contact. A respawn bounce resets the vehicle; any other bounce
/// rebounds with type-specific damping.
pub fn vertical_bounce(vehicle: &mut VehicleState, race: &RaceState) {
    if vehicle.z_force == 0 {
        return;
    }

    if vehicle.bounce_behavior == BounceBehavior::Respawn {
        vehicle.checkpoint_index = CHECKPOINT_NONE;
        vehicle.physics_reset();
        vehicle.spawn_state = SpawnState::RespawnPending;
        vehicle.z_force = 0;
    } else {
        let damped = vehicle
            .z_force
            .wrapping_add(BOUNCE_AMOUNT_LUT[race.vehicle_type.index()]);
        if damped >= 0 {
            vehicle.z_force = 0;
            if vehicle.landing_effect_armed {
                vehicle.landing_effect_armed = false;
                vehicle.landing_effect_fired = true;
            }
        } else {
            vehicle.z_force = damped;
        }
    }

    vehicle.z_force = vehicle.z_force.wrapping_neg();
    vehicle.z_position = GROUND_Z_POSITION;
    vehicle.bounce_behavior = BounceBehavior::Normal;
    let sound = if race.vehicle_type == VehicleType::Powerboats {
        SFX_SPLASH
    } else {
        SFX_BOUNCE
    };
    vehicle.sfx.push(sound);
}
