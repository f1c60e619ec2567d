use serde::{Deserialize, Serialize};

use crate::constants::{
    ACCELERATION_POLL_RATE, CHANGE_Z_FORCE_RATE_1, CHANGE_Z_FORCE_RATE_2,
    DECELERATION_POLL_RATE, DEFAULT_COUNTDOWN_FRAMES, DEFAULT_HANDICAP_AMOUNT,
    DEFAULT_VEHICLE_SLOTS, DRIFT_SPEED_LOSS_RATE, HANDICAP_TABLE_LEN, MAX_VEHICLE_SLOTS,
    NORMAL_TURN_POLL_RATE, TANK_SLOW_TURN_POLL_RATE, TURN_POLL_INSTANT, VELOCITY_POLL_RATE,
};
use crate::error::RuleCode;
use crate::physics::GameVersion;
use crate::tables::LookupTables;
use crate::types::{TurnMode, VehicleType};

/// Reload value for every poll timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollRates {
    pub turn: u8,
    pub tank_slow_turn: u8,
    pub velocity: u8,
    pub drift_speed_loss: u8,
    pub change_z_force_1: u8,
    pub change_z_force_2: u8,
    pub acceleration: u8,
    pub deceleration: u8,
}

impl Default for PollRates {
    fn default() -> Self {
        Self {
            turn: NORMAL_TURN_POLL_RATE,
            tank_slow_turn: TANK_SLOW_TURN_POLL_RATE,
            velocity: VELOCITY_POLL_RATE,
            drift_speed_loss: DRIFT_SPEED_LOSS_RATE,
            change_z_force_1: CHANGE_Z_FORCE_RATE_1,
            change_z_force_2: CHANGE_Z_FORCE_RATE_2,
            acceleration: ACCELERATION_POLL_RATE,
            deceleration: DECELERATION_POLL_RATE,
        }
    }
}

/// Race-wide countdown gates. Sub-steps only read these; the tick driver
/// advances them once per tick after every vehicle has been updated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollTimers {
    pub turn: u8,
    pub tank_slow_turn: u8,
    pub velocity: u8,
    pub drift_speed_loss: u8,
    pub change_z_force_1: u8,
    pub change_z_force_2: u8,
    pub acceleration: u8,
    pub deceleration: u8,
}

impl PollTimers {
    /// Power-on values: the tank slow-turn and velocity round-robin timers
    /// start loaded, everything else starts at zero.
    pub fn initial(rates: &PollRates) -> Self {
        Self {
            tank_slow_turn: rates.tank_slow_turn,
            velocity: rates.velocity,
            ..Self::default()
        }
    }

    pub fn advance(&mut self, rates: &PollRates) {
        countdown(&mut self.turn, rates.turn);
        countdown(&mut self.tank_slow_turn, rates.tank_slow_turn);
        countdown(&mut self.velocity, rates.velocity);
        countdown(&mut self.drift_speed_loss, rates.drift_speed_loss);
        countdown(&mut self.change_z_force_1, rates.change_z_force_1);
        countdown(&mut self.change_z_force_2, rates.change_z_force_2);
        countdown(&mut self.acceleration, rates.acceleration);
        countdown(&mut self.deceleration, rates.deceleration);
    }

    fn within(&self, rates: &PollRates) -> bool {
        self.turn <= rates.turn
            && self.tank_slow_turn <= rates.tank_slow_turn
            && self.velocity <= rates.velocity
            && self.drift_speed_loss <= rates.drift_speed_loss
            && self.change_z_force_1 <= rates.change_z_force_1
            && self.change_z_force_2 <= rates.change_z_force_2
            && self.acceleration <= rates.acceleration
            && self.deceleration <= rates.deceleration
    }
}

#[inline(always)]
fn countdown(timer: &mut u8, rate: u8) {
    if *timer > 0 {
        *timer -= 1;
    } else {
        *timer = rate;
    }
}

/// Everything a race can be configured with. This is the only configuration
/// surface of the core; lookup tables are always the compiled-in set for
/// `vehicle_type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    pub vehicle_type: VehicleType,
    pub game_version: GameVersion,
    pub vehicle_slots: u8,
    pub countdown_frames: u16,
    pub challenge_mode: bool,
    pub unlimited_grip: bool,
    pub handicap_amount: u8,
    pub poll_rates: PollRates,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            vehicle_type: VehicleType::default(),
            game_version: GameVersion::default(),
            vehicle_slots: DEFAULT_VEHICLE_SLOTS,
            countdown_frames: DEFAULT_COUNTDOWN_FRAMES,
            challenge_mode: false,
            unlimited_grip: false,
            handicap_amount: DEFAULT_HANDICAP_AMOUNT,
            poll_rates: PollRates::default(),
        }
    }
}

impl RaceConfig {
    pub fn validate(&self) -> Result<(), RuleCode> {
        // Every slot must come up in the velocity round-robin.
        if self.vehicle_slots == 0
            || self.vehicle_slots > MAX_VEHICLE_SLOTS
            || u16::from(self.vehicle_slots) > u16::from(self.poll_rates.velocity) + 1
        {
            return Err(RuleCode::RaceVehicleSlots);
        }
        // Standard turning only fires when the turn timer reads 1.
        if self.poll_rates.turn < TURN_POLL_INSTANT {
            return Err(RuleCode::RacePollRate);
        }
        if self.handicap_amount as usize >= HANDICAP_TABLE_LEN {
            return Err(RuleCode::VehicleHandicapRange);
        }
        Ok(())
    }
}

/// Shared per-race record, read by every vehicle's sub-steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RaceState {
    pub vehicle_type: VehicleType,
    pub tables: &'static LookupTables,
    turn_mode: TurnMode,
    pub countdown_timer: u16,
    pub timers: PollTimers,
    pub rates: PollRates,
    pub has_unlimited_grip: bool,
    pub is_challenge_mode: bool,
    pub vehicle_slots: u8,
}

impl RaceState {
    pub fn new(config: &RaceConfig) -> Self {
        Self {
            vehicle_type: config.vehicle_type,
            tables: LookupTables::for_vehicle(config.vehicle_type),
            turn_mode: config.vehicle_type.turn_mode(),
            countdown_timer: config.countdown_frames,
            timers: PollTimers::initial(&config.poll_rates),
            rates: config.poll_rates,
            has_unlimited_grip: config.unlimited_grip,
            is_challenge_mode: config.challenge_mode,
            vehicle_slots: config.vehicle_slots,
        }
    }

    /// Swap the vehicle class, taking its table set and turning mode with it.
    pub fn set_vehicle_type(&mut self, vehicle_type: VehicleType) {
        self.vehicle_type = vehicle_type;
        self.tables = LookupTables::for_vehicle(vehicle_type);
        self.turn_mode = vehicle_type.turn_mode();
    }

    #[inline]
    pub fn turn_mode(&self) -> TurnMode {
        self.turn_mode
    }

    #[inline]
    pub fn countdown_active(&self) -> bool {
        self.countdown_timer != 0
    }

    /// Driver-owned end-of-tick update. The countdown only ever counts down.
    pub fn advance_timers(&mut self) {
        self.countdown_timer = self.countdown_timer.saturating_sub(1);
        self.timers.advance(&self.rates);
    }

    pub fn validate(&self) -> Result<(), RuleCode> {
        if self.vehicle_slots == 0 || self.vehicle_slots > MAX_VEHICLE_SLOTS {
            return Err(RuleCode::RaceVehicleSlots);
        }
        if !self.timers.within(&self.rates) {
            return Err(RuleCode::RacePollRate);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_reloads_on_the_tick_after_zero() {
        let rates = PollRates::default();
        let mut timers = PollTimers {
            deceleration: 1,
            ..PollTimers::default()
        };
        let mut seen = [0u8; 10];
        for value in seen.iter_mut() {
            *value = timers.deceleration;
            timers.advance(&rates);
        }
        assert_eq!(seen, [1, 0, 7, 6, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn velocity_round_robin_visits_every_slot() {
        let config = RaceConfig::default();
        let mut race = RaceState::new(&config);
        let mut visited = [false; MAX_VEHICLE_SLOTS as usize];
        for _ in 0..=config.poll_rates.velocity {
            visited[race.timers.velocity as usize] = true;
            race.advance_timers();
        }
        assert!(visited.iter().all(|slot| *slot));
    }

    #[test]
    fn countdown_stops_at_zero() {
        let mut race = RaceState::new(&RaceConfig {
            countdown_frames: 2,
            ..RaceConfig::default()
        });
        assert!(race.countdown_active());
        race.advance_timers();
        race.advance_timers();
        race.advance_timers();
        assert_eq!(race.countdown_timer, 0);
        assert!(!race.countdown_active());
    }

    #[test]
    fn set_vehicle_type_swaps_tables() {
        let mut race = RaceState::new(&RaceConfig::default());
        race.set_vehicle_type(VehicleType::Tanks);
        assert!(core::ptr::eq(
            race.tables,
            LookupTables::for_vehicle(VehicleType::Tanks)
        ));
        assert_eq!(race.turn_mode(), TurnMode::Tank);
    }

    #[test]
    fn config_rejects_slots_the_round_robin_cannot_reach() {
        let config = RaceConfig {
            vehicle_slots: 3,
            poll_rates: PollRates {
                velocity: 1,
                ..PollRates::default()
            },
            ..RaceConfig::default()
        };
        assert_eq!(config.validate(), Err(RuleCode::RaceVehicleSlots));
        assert_eq!(RaceConfig::default().validate(), Ok(()));
    }

    #[test]
    fn config_json_fills_missing_fields_with_defaults() {
        let config: RaceConfig =
            serde_json::from_str(r#"{"vehicle_type":"powerboats","challenge_mode":true}"#)
                .expect("config parses");
        assert_eq!(config.vehicle_type, VehicleType::Powerboats);
        assert!(config.challenge_mode);
        assert_eq!(config.vehicle_slots, DEFAULT_VEHICLE_SLOTS);
        assert_eq!(config.poll_rates, PollRates::default());
    }
}
