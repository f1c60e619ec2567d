//! Per-vehicle-type lookup tables.
//!
//! Every table is compiled in. Indexing past the end of a table is a
//! configuration error and panics through normal slice indexing.

use crate::constants::{
    DRIFT_INDEX_GRIP_CHANGE, DRIFT_INDEX_HIGHEST, DRIFT_TABLE_LEN, HANDICAP_TABLE_LEN,
    HEADING_COUNT, SFX_ROTOR_WASH, SFX_SKID, SFX_TRACK_GRIND, SFX_WAKE,
};
use crate::types::{SoundId, VehicleType, VEHICLE_TYPE_COUNT};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupTables {
    pub velocity_scalar_x: [i8; HEADING_COUNT],
    pub velocity_scalar_y: [i8; HEADING_COUNT],
    pub heading_clamp: [u8; HEADING_COUNT],
    pub handicap: [u8; HANDICAP_TABLE_LEN],
    pub drift_threshold: [u16; DRIFT_TABLE_LEN],
    pub drift_force_amount: [u16; DRIFT_TABLE_LEN],
    pub top_speed: [i8; HANDICAP_TABLE_LEN],
}

/// Vertical rebound damping, indexed by vehicle type.
pub const BOUNCE_AMOUNT_LUT: [i8; VEHICLE_TYPE_COUNT] = [2, 3, 4, 2, 2, 3, 5, 3, 1];

/// Drift sound, indexed by vehicle type.
pub const DRIFT_SOUND_LUT: [SoundId; VEHICLE_TYPE_COUNT] = [
    SFX_SKID,
    SFX_SKID,
    SFX_WAKE,
    SFX_SKID,
    SFX_SKID,
    SFX_SKID,
    SFX_TRACK_GRIND,
    SFX_SKID,
    SFX_ROTOR_WASH,
];

/// cos(k * 2pi / 64) * 256 for the first quarter turn, k = 0..=16.
const COMPASS_QUARTER_Q8: [i32; 17] = [
    256, 255, 251, 245, 237, 226, 213, 198, 181, 162, 142, 121, 98, 74, 50, 25, 0,
];

struct TableParams {
    magnitude: i32,
    threshold_base: u16,
    threshold_step: u16,
    threshold_highest: u16,
    threshold_grip_change: u16,
    amount_base: u16,
    amount_step: u16,
    amount_highest: u16,
    amount_grip_change: u16,
    top_speed: i8,
}

impl LookupTables {
    pub fn for_vehicle(vehicle_type: VehicleType) -> &'static LookupTables {
        match vehicle_type {
            VehicleType::SportsCars => &SPORTS_CARS,
            VehicleType::FourByFours => &FOUR_BY_FOURS,
            VehicleType::Powerboats => &POWERBOATS,
            VehicleType::TurboWheels => &TURBO_WHEELS,
            VehicleType::FormulaOne => &FORMULA_ONE,
            VehicleType::Warriors => &WARRIORS,
            VehicleType::Tanks => &TANKS,
            VehicleType::RuffTrux => &RUFF_TRUX,
            VehicleType::Choppers => &CHOPPERS,
        }
    }

    const fn build(params: TableParams) -> Self {
        Self {
            velocity_scalar_x: compass_table(params.magnitude, 0),
            velocity_scalar_y: compass_table(params.magnitude, 48),
            heading_clamp: heading_clamp_table(),
            handicap: handicap_table(),
            drift_threshold: drift_table(
                params.threshold_base,
                params.threshold_step,
                params.threshold_highest,
                params.threshold_grip_change,
            ),
            drift_force_amount: drift_table(
                params.amount_base,
                params.amount_step,
                params.amount_highest,
                params.amount_grip_change,
            ),
            top_speed: top_speed_table(params.top_speed),
        }
    }
}

#[inline]
const fn cos_q8(heading: usize) -> i32 {
    let k = heading % 16;
    match heading / 16 {
        0 => COMPASS_QUARTER_Q8[k],
        1 => -COMPASS_QUARTER_Q8[16 - k],
        2 => -COMPASS_QUARTER_Q8[k],
        _ => COMPASS_QUARTER_Q8[16 - k],
    }
}

/// Scaled cosine starting `phase` steps around the compass. Phase 48 gives
/// the sine (y grows clockwise from heading 0).
const fn compass_table(magnitude: i32, phase: usize) -> [i8; HEADING_COUNT] {
    let mut table = [0i8; HEADING_COUNT];
    let mut heading = 0;
    while heading < HEADING_COUNT {
        let cos = cos_q8((heading + phase) % HEADING_COUNT);
        // Round the magnitude so opposite headings stay exact negatives.
        let scaled = (cos.abs() * magnitude + 128) >> 8;
        let signed = if cos < 0 { -scaled } else { scaled };
        table[heading] = signed as i8;
        heading += 1;
    }
    table
}

/// Even headings have their own sprite; odd ones snap to the neighbouring
/// multiple of four.
const fn heading_clamp_table() -> [u8; HEADING_COUNT] {
    let mut table = [0u8; HEADING_COUNT];
    let mut heading = 0;
    while heading < HEADING_COUNT {
        let snapped = match heading % 4 {
            1 => heading - 1,
            3 => (heading + 1) % HEADING_COUNT,
            _ => heading,
        };
        table[heading] = snapped as u8;
        heading += 1;
    }
    table
}

/// Handicap 0..=31 spread across drift indices 1..=20 (0x10 lands on 10).
const fn handicap_table() -> [u8; HANDICAP_TABLE_LEN] {
    let mut table = [0u8; HANDICAP_TABLE_LEN];
    let mut amount = 0;
    while amount < HANDICAP_TABLE_LEN {
        table[amount] = (1 + (amount * 19) / 31) as u8;
        amount += 1;
    }
    table
}

const fn drift_table(
    base: u16,
    step: u16,
    highest: u16,
    grip_change: u16,
) -> [u16; DRIFT_TABLE_LEN] {
    let mut table = [0u16; DRIFT_TABLE_LEN];
    let mut index = 0;
    while index < DRIFT_INDEX_HIGHEST {
        table[index] = base + (index as u16) * step;
        index += 1;
    }
    table[DRIFT_INDEX_HIGHEST] = highest;
    table[DRIFT_INDEX_GRIP_CHANGE] = grip_change;
    table
}

const fn top_speed_table(base: i8) -> [i8; HANDICAP_TABLE_LEN] {
    let mut table = [0i8; HANDICAP_TABLE_LEN];
    let mut amount = 0;
    while amount < HANDICAP_TABLE_LEN {
        table[amount] = base + ((amount as i8) - 16) / 4;
        amount += 1;
    }
    table
}

static SPORTS_CARS: LookupTables = LookupTables::build(TableParams {
    magnitude: 80,
    threshold_base: 0x0040,
    threshold_step: 0x0010,
    threshold_highest: 0x0600,
    threshold_grip_change: 0x0020,
    amount_base: 0x0020,
    amount_step: 0x0008,
    amount_highest: 0x0010,
    amount_grip_change: 0x0040,
    top_speed: 24,
});

static FOUR_BY_FOURS: LookupTables = LookupTables::build(TableParams {
    magnitude: 72,
    threshold_base: 0x0050,
    threshold_step: 0x0010,
    threshold_highest: 0x0600,
    threshold_grip_change: 0x0028,
    amount_base: 0x0028,
    amount_step: 0x0008,
    amount_highest: 0x0014,
    amount_grip_change: 0x0048,
    top_speed: 22,
});

static POWERBOATS: LookupTables = LookupTables::build(TableParams {
    magnitude: 64,
    threshold_base: 0x0030,
    threshold_step: 0x000C,
    threshold_highest: 0x0500,
    threshold_grip_change: 0x0018,
    amount_base: 0x0010,
    amount_step: 0x0004,
    amount_highest: 0x0008,
    amount_grip_change: 0x0020,
    top_speed: 26,
});

static TURBO_WHEELS: LookupTables = LookupTables::build(TableParams {
    magnitude: 88,
    threshold_base: 0x0040,
    threshold_step: 0x0012,
    threshold_highest: 0x0680,
    threshold_grip_change: 0x0020,
    amount_base: 0x0020,
    amount_step: 0x0008,
    amount_highest: 0x0010,
    amount_grip_change: 0x0040,
    top_speed: 22,
});

static FORMULA_ONE: LookupTables = LookupTables::build(TableParams {
    magnitude: 96,
    threshold_base: 0x0048,
    threshold_step: 0x0014,
    threshold_highest: 0x0700,
    threshold_grip_change: 0x0024,
    amount_base: 0x0024,
    amount_step: 0x000A,
    amount_highest: 0x0012,
    amount_grip_change: 0x0048,
    top_speed: 28,
});

static WARRIORS: LookupTables = LookupTables::build(TableParams {
    magnitude: 76,
    threshold_base: 0x0044,
    threshold_step: 0x0010,
    threshold_highest: 0x0600,
    threshold_grip_change: 0x0022,
    amount_base: 0x0022,
    amount_step: 0x0008,
    amount_highest: 0x0011,
    amount_grip_change: 0x0044,
    top_speed: 24,
});

static TANKS: LookupTables = LookupTables::build(TableParams {
    magnitude: 48,
    threshold_base: 0x0080,
    threshold_step: 0x0018,
    threshold_highest: 0x0800,
    threshold_grip_change: 0x0040,
    amount_base: 0x0040,
    amount_step: 0x0010,
    amount_highest: 0x0020,
    amount_grip_change: 0x0080,
    top_speed: 16,
});

static RUFF_TRUX: LookupTables = LookupTables::build(TableParams {
    magnitude: 68,
    threshold_base: 0x0050,
    threshold_step: 0x0010,
    threshold_highest: 0x0600,
    threshold_grip_change: 0x0028,
    amount_base: 0x0024,
    amount_step: 0x0008,
    amount_highest: 0x0012,
    amount_grip_change: 0x0048,
    top_speed: 22,
});

static CHOPPERS: LookupTables = LookupTables::build(TableParams {
    magnitude: 84,
    threshold_base: 0x0020,
    threshold_step: 0x0008,
    threshold_highest: 0x0400,
    threshold_grip_change: 0x0010,
    amount_base: 0x0010,
    amount_step: 0x0004,
    amount_highest: 0x0008,
    amount_grip_change: 0x0020,
    top_speed: 28,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_HANDICAP_AMOUNT;

    #[test]
    fn sports_car_scalar_points_east_at_heading_zero() {
        let tables = LookupTables::for_vehicle(VehicleType::SportsCars);
        assert_eq!(tables.velocity_scalar_x[0], 80);
        assert_eq!(tables.velocity_scalar_y[0], 0);
        assert_eq!(tables.velocity_scalar_x[16], 0);
        assert_eq!(tables.velocity_scalar_y[16], 80);
        assert_eq!(tables.velocity_scalar_x[32], -80);
        assert_eq!(tables.velocity_scalar_y[48], -80);
    }

    #[test]
    fn compass_is_symmetric_for_every_vehicle() {
        for vehicle_type in VehicleType::ALL {
            let tables = LookupTables::for_vehicle(vehicle_type);
            for heading in 0..HEADING_COUNT {
                let opposite = (heading + 32) % HEADING_COUNT;
                assert_eq!(
                    tables.velocity_scalar_x[heading],
                    -tables.velocity_scalar_x[opposite],
                    "{vehicle_type} heading {heading}"
                );
                assert_eq!(
                    tables.velocity_scalar_y[heading],
                    tables.velocity_scalar_x[(heading + 48) % HEADING_COUNT],
                    "{vehicle_type} heading {heading}"
                );
            }
        }
    }

    #[test]
    fn heading_clamp_is_idempotent() {
        let clamp = &LookupTables::for_vehicle(VehicleType::SportsCars).heading_clamp;
        for heading in 0..HEADING_COUNT {
            let once = clamp[heading];
            assert!(once < HEADING_COUNT as u8);
            assert_eq!(clamp[once as usize], once, "heading {heading}");
        }
        assert_eq!(clamp[1], 0);
        assert_eq!(clamp[3], 4);
        assert_eq!(clamp[63], 0);
    }

    #[test]
    fn handicap_indices_stay_inside_drift_tables() {
        let tables = LookupTables::for_vehicle(VehicleType::SportsCars);
        assert_eq!(tables.handicap[DEFAULT_HANDICAP_AMOUNT as usize], 10);
        for index in tables.handicap {
            assert!((index as usize) < DRIFT_INDEX_HIGHEST);
        }
    }

    #[test]
    fn top_speed_is_positive_for_every_handicap() {
        for vehicle_type in VehicleType::ALL {
            let tables = LookupTables::for_vehicle(vehicle_type);
            assert!(tables.top_speed.iter().all(|speed| *speed > 0));
        }
    }
}
