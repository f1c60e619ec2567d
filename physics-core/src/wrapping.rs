//! Narrow-width integer helpers.
//!
//! The NES runs on a 6502, so every field is an 8- or 16-bit register
//! pair. These helpers keep each operation at that width and wrap exactly
//! where the hardware would; nothing here widens and keeps the wider result.

use crate::constants::HEADING_MAX;

/// Apply one tick of turn input to a heading. Left wins when both are held.
///
/// Headings only ever move by one step, so the boundary is a reassignment
/// (-1 -> 63, 64 -> 0) rather than a modulo.
#[inline]
pub fn turn_heading(heading: u8, left: bool, right: bool) -> u8 {
    let mut next = heading as i8;
    if left {
        next = next.wrapping_sub(1);
    } else if right {
        next = next.wrapping_add(1);
    }

    if next < 0 {
        HEADING_MAX
    } else if next > HEADING_MAX as i8 {
        0
    } else {
        next as u8
    }
}

/// Magnitude of an 8-bit velocity. `-128` stays `-128`, as `EOR #$FF; ADC #1` would.
#[inline]
pub fn speed_of(velocity: i8) -> i8 {
    velocity.wrapping_abs()
}

/// Table scalar pointed in the direction of travel.
#[inline]
pub fn directed_scalar(scalar: i8, velocity: i8) -> i8 {
    if velocity < 0 {
        scalar.wrapping_neg()
    } else {
        scalar
    }
}

/// Signed 8x8 multiply into a 16-bit result.
#[inline]
pub fn scale_velocity(scalar: i8, speed: i8) -> i16 {
    (scalar as i16).wrapping_mul(speed as i16)
}

/// `|a - b|` with the subtraction done at 16 bits.
#[inline]
pub fn abs_diff_i16(a: i16, b: i16) -> u16 {
    a.wrapping_sub(b).unsigned_abs()
}

/// Move an 8-bit value one unit toward zero.
#[inline]
pub fn toward_zero(value: i8) -> i8 {
    match value {
        0 => 0,
        v if v < 0 => v.wrapping_add(1),
        v => v.wrapping_sub(1),
    }
}

/// Move `force` toward `velocity` by `amount` when the gap allows it,
/// otherwise land exactly on `velocity`.
#[inline]
pub fn nudge_toward(force: i16, velocity: i16, gap: u16, amount: u16) -> i16 {
    if gap < amount {
        return velocity;
    }

    let step = amount as i16;
    if velocity < force {
        force.wrapping_sub(step)
    } else if velocity > force {
        force.wrapping_add(step)
    } else {
        force
    }
}
