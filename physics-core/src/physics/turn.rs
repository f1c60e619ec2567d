use crate::constants::{TANK_SLOW_TURN_POLL_INSTANT, TANK_TURN_POLL_INSTANT, TURN_POLL_INSTANT};
use crate::race::RaceState;
use crate::types::{TurnMode, VehicleType};
use crate::vehicle::VehicleState;
use crate::wrapping::turn_heading;

pub(super) fn turn(vehicle: &mut VehicleState, race: &RaceState) {
    if race.countdown_active() {
        return;
    }

    match race.turn_mode() {
        TurnMode::Tank => turn_tank(vehicle, race),
        TurnMode::Standard => turn_standard(vehicle, race),
    }
}

fn turn_standard(vehicle: &mut VehicleState, race: &RaceState) {
    if race.timers.turn != TURN_POLL_INSTANT || !vehicle.is_alive() {
        return;
    }

    if !vehicle.controller_left && !vehicle.controller_right {
        snap_heading(vehicle, race);
        return;
    }

    // Turning from standstill creeps forward, except for choppers.
    if !vehicle.is_moving && race.vehicle_type != VehicleType::Choppers {
        vehicle.velocity = 1;
    }

    vehicle.heading = turn_heading(
        vehicle.heading,
        vehicle.controller_left,
        vehicle.controller_right,
    );
}

/// Tanks snap on every tick and turn faster from a standstill.
fn turn_tank(vehicle: &mut VehicleState, race: &RaceState) {
    if !vehicle.is_alive() {
        return;
    }

    if !vehicle.controller_left && !vehicle.controller_right {
        snap_heading(vehicle, race);
        return;
    }

    let pedals_idle = !vehicle.controller_accelerate
        && !vehicle.controller_brake
        && !vehicle.is_ai_controlled_speed;
    let polled = if pedals_idle {
        race.timers.turn == TANK_TURN_POLL_INSTANT
    } else {
        race.timers.tank_slow_turn == TANK_SLOW_TURN_POLL_INSTANT
    };
    if !polled {
        return;
    }

    vehicle.heading = turn_heading(
        vehicle.heading,
        vehicle.controller_left,
        vehicle.controller_right,
    );
}

#[inline]
fn snap_heading(vehicle: &mut VehicleState, race: &RaceState) {
    vehicle.heading = race.tables.heading_clamp[vehicle.heading as usize];
}
