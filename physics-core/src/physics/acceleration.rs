use crate::constants::REVERSE_TOP_SPEED;
use crate::race::RaceState;
use crate::vehicle::VehicleState;
use crate::wrapping::toward_zero;

pub(super) fn acceleration(vehicle: &mut VehicleState, race: &RaceState) {
    if race.countdown_active() || !vehicle.is_alive() {
        return;
    }

    // Brake wins over accelerate.
    if vehicle.controller_brake {
        brake(vehicle, race);
    } else if vehicle.controller_accelerate {
        accelerate(vehicle, race);
    } else {
        coast(vehicle, race);
    }
}

fn coast(vehicle: &mut VehicleState, race: &RaceState) {
    if race.timers.deceleration == 0 {
        vehicle.velocity = toward_zero(vehicle.velocity);
    }
}

/// Brake down to a stop on the acceleration poll, then reverse slowly.
fn brake(vehicle: &mut VehicleState, race: &RaceState) {
    if vehicle.velocity > 0 {
        if race.timers.acceleration == 0 {
            vehicle.velocity -= 1;
        }
    } else if race.timers.deceleration == 0 && vehicle.velocity > -REVERSE_TOP_SPEED {
        vehicle.velocity -= 1;
    }
}

fn accelerate(vehicle: &mut VehicleState, race: &RaceState) {
    let top_speed = race.tables.top_speed[vehicle.handicap_amount as usize];
    // Headroom is computed as `top - velocity - 1` in one byte and only its
    // sign is tested.
    let headroom = top_speed.wrapping_sub(vehicle.velocity).wrapping_sub(1);
    if headroom >= 0 && race.timers.acceleration == 0 {
        vehicle.velocity = vehicle.velocity.wrapping_add(1);
    }
}
