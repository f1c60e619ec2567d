use anyhow::{anyhow, Context, Result};
use racer_physics_core::{GameVersion, RaceConfig, VehicleType};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::Path;

use crate::tape::DEFAULT_MAX_FRAMES;

pub const ENV_COUNTDOWN_FRAMES: &str = "RACER_COUNTDOWN_FRAMES";
pub const ENV_VEHICLE_SLOTS: &str = "RACER_VEHICLE_SLOTS";
pub const ENV_MAX_FRAMES: &str = "RACER_MAX_FRAMES";

/// Command-line overrides, applied last.
#[derive(Clone, Debug, Default)]
pub struct RaceOverrides {
    pub vehicle_type: Option<VehicleType>,
    pub game_version: Option<GameVersion>,
    pub vehicle_slots: Option<u8>,
    pub countdown_frames: Option<u16>,
    pub handicap_amount: Option<u8>,
    pub challenge_mode: bool,
    pub unlimited_grip: bool,
}

/// Defaults with the `RACER_*` environment applied.
pub fn env_defaults() -> RaceConfig {
    let mut config = RaceConfig::default();

    let countdown = read_env_u32(ENV_COUNTDOWN_FRAMES, u32::from(config.countdown_frames));
    match u16::try_from(countdown) {
        Ok(frames) => config.countdown_frames = frames,
        Err(_) => tracing::warn!(
            "{} ({}) does not fit in 16 bits. Falling back to {}.",
            ENV_COUNTDOWN_FRAMES,
            countdown,
            config.countdown_frames
        ),
    }

    let slots = read_env_u32(ENV_VEHICLE_SLOTS, u32::from(config.vehicle_slots));
    match u8::try_from(slots) {
        Ok(slots) => config.vehicle_slots = slots,
        Err(_) => tracing::warn!(
            "{} ({}) is out of range. Falling back to {}.",
            ENV_VEHICLE_SLOTS,
            slots,
            config.vehicle_slots
        ),
    }

    config
}

pub fn max_frames() -> u32 {
    read_env_u32(ENV_MAX_FRAMES, DEFAULT_MAX_FRAMES)
}

/// Layer a JSON race file over `base`. Keys the file omits keep the base
/// value, including nested poll rates.
pub fn overlay_config_json(base: &RaceConfig, json: &str) -> Result<RaceConfig> {
    let mut merged = serde_json::to_value(base).context("failed encoding base race config")?;
    let layer: Value = serde_json::from_str(json).context("race config is not valid JSON")?;
    if !layer.is_object() {
        return Err(anyhow!("race config must be a JSON object"));
    }
    merge_json(&mut merged, layer);
    serde_json::from_value(merged).context("race config has invalid fields")
}

fn merge_json(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}

pub fn resolve_race_config(path: Option<&Path>, overrides: &RaceOverrides) -> Result<RaceConfig> {
    let mut config = env_defaults();

    if let Some(path) = path {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed reading race config {}", path.display()))?;
        config = overlay_config_json(&config, &json)
            .with_context(|| format!("failed loading race config {}", path.display()))?;
    }

    if let Some(vehicle_type) = overrides.vehicle_type {
        config.vehicle_type = vehicle_type;
    }
    if let Some(game_version) = overrides.game_version {
        config.game_version = game_version;
    }
    if let Some(slots) = overrides.vehicle_slots {
        config.vehicle_slots = slots;
    }
    if let Some(frames) = overrides.countdown_frames {
        config.countdown_frames = frames;
    }
    if let Some(handicap) = overrides.handicap_amount {
        config.handicap_amount = handicap;
    }
    config.challenge_mode |= overrides.challenge_mode;
    config.unlimited_grip |= overrides.unlimited_grip;

    config
        .validate()
        .map_err(|rule| anyhow!("invalid race configuration: {rule}"))?;

    Ok(config)
}

pub fn parse_vehicle_type(value: &str) -> Result<VehicleType, String> {
    VehicleType::ALL
        .into_iter()
        .find(|vehicle_type| vehicle_type.as_str() == value)
        .ok_or_else(|| {
            let known: Vec<&str> = VehicleType::ALL.iter().map(|v| v.as_str()).collect();
            format!("unknown vehicle type '{value}' (expected one of {})", known.join(", "))
        })
}

pub fn parse_game_version(value: &str) -> Result<GameVersion, String> {
    GameVersion::ALL
        .into_iter()
        .find(|version| version.as_str() == value)
        .ok_or_else(|| format!("unknown game version '{value}' (expected nes-ntsc or nes-pal)"))
}

fn read_env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_layer_keeps_unnamed_fields() {
        let base = RaceConfig {
            countdown_frames: 12,
            ..RaceConfig::default()
        };
        let config = overlay_config_json(
            &base,
            r#"{ "vehicle_type": "tanks", "poll_rates": { "acceleration": 1 } }"#,
        )
        .unwrap();

        assert_eq!(config.vehicle_type, VehicleType::Tanks);
        assert_eq!(config.countdown_frames, 12);
        assert_eq!(config.poll_rates.acceleration, 1);
        assert_eq!(
            config.poll_rates.deceleration,
            base.poll_rates.deceleration
        );
    }

    #[test]
    fn json_layer_rejects_non_objects_and_bad_fields() {
        let base = RaceConfig::default();
        assert!(overlay_config_json(&base, "[1, 2]").is_err());
        assert!(overlay_config_json(&base, r#"{ "vehicle_type": "hovercraft" }"#).is_err());
    }

    #[test]
    fn overrides_win_and_are_validated() {
        let overrides = RaceOverrides {
            vehicle_type: Some(VehicleType::Choppers),
            countdown_frames: Some(0),
            challenge_mode: true,
            ..RaceOverrides::default()
        };
        let config = resolve_race_config(None, &overrides).unwrap();
        assert_eq!(config.vehicle_type, VehicleType::Choppers);
        assert_eq!(config.countdown_frames, 0);
        assert!(config.challenge_mode);

        let overrides = RaceOverrides {
            vehicle_slots: Some(9),
            ..RaceOverrides::default()
        };
        assert!(resolve_race_config(None, &overrides).is_err());
    }

    #[test]
    fn names_parse_in_kebab_case() {
        assert_eq!(parse_vehicle_type("ruff-trux"), Ok(VehicleType::RuffTrux));
        assert!(parse_vehicle_type("RuffTrux").is_err());
        assert_eq!(parse_game_version("nes-pal"), Ok(GameVersion::NesPal));
    }
}
