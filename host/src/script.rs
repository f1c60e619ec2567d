//! Text input scripts.
//!
//! One segment per line: a tick count followed by one input group per slot,
//! e.g. `30 accel+left idle brake`. Groups are `+`-joined tokens out of
//! `accel`, `brake`, `left`, `right` and `idle` (or their one-letter forms).
//! Slots without a group stay idle. `#` starts a comment.

use anyhow::{anyhow, bail, Context, Result};
use racer_physics_core::ControllerInput;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptSegment {
    pub frames: u32,
    pub inputs: Vec<ControllerInput>,
}

pub fn parse_input_group(group: &str) -> Result<ControllerInput> {
    let mut input = ControllerInput::IDLE;
    for token in group.split('+') {
        match token.trim().to_ascii_lowercase().as_str() {
            "accel" | "a" => input.accelerate = true,
            "brake" | "b" => input.brake = true,
            "left" | "l" => input.left = true,
            "right" | "r" => input.right = true,
            "idle" | "-" => {}
            "" => return Err(anyhow!("empty token in input group '{group}'")),
            other => return Err(anyhow!("unknown input token '{other}'")),
        }
    }
    Ok(input)
}

pub fn parse_script(source: &str, vehicle_slots: u8) -> Result<Vec<ScriptSegment>> {
    let mut segments = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        let mut fields = content.split_whitespace();
        let frames_field = fields.next().unwrap_or_default();
        let frames = frames_field
            .parse::<u32>()
            .with_context(|| format!("line {line_number}: invalid tick count '{frames_field}'"))?;

        let mut inputs = vec![ControllerInput::IDLE; vehicle_slots as usize];
        for (slot, group) in fields.enumerate() {
            if slot >= inputs.len() {
                bail!("line {line_number}: more input groups than the {vehicle_slots} vehicle slots");
            }
            inputs[slot] =
                parse_input_group(group).with_context(|| format!("line {line_number}"))?;
        }

        segments.push(ScriptSegment { frames, inputs });
    }

    if segments.is_empty() {
        return Err(anyhow!("script had no segments"));
    }
    Ok(segments)
}

/// Expand segments into frame-major tape bytes.
pub fn compile_segments(segments: &[ScriptSegment]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for segment in segments {
        let frame: Vec<u8> = segment.inputs.iter().map(|input| input.to_byte()).collect();
        for _ in 0..segment.frames {
            bytes.extend_from_slice(&frame);
        }
    }
    bytes
}

pub fn compile_script(source: &str, vehicle_slots: u8) -> Result<Vec<u8>> {
    Ok(compile_segments(&parse_script(source, vehicle_slots)?))
}

pub fn load_script(path: &Path, vehicle_slots: u8) -> Result<Vec<u8>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed reading script {}", path.display()))?;
    compile_script(&source, vehicle_slots)
        .with_context(|| format!("failed compiling script {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_combine_tokens() {
        let input = parse_input_group("accel+left").unwrap();
        assert_eq!(input.to_byte(), 0x05);
        assert_eq!(parse_input_group("B+R").unwrap().to_byte(), 0x0A);
        assert_eq!(parse_input_group("idle").unwrap(), ControllerInput::IDLE);
    }

    #[test]
    fn unknown_and_empty_tokens_are_rejected() {
        assert!(parse_input_group("accel+boost").is_err());
        assert!(parse_input_group("accel+").is_err());
    }

    #[test]
    fn compiles_frame_major_bytes_with_idle_fill() {
        let script = "\
# grid start
2 accel accel+right
1 -
";
        let bytes = compile_script(script, 3).unwrap();
        assert_eq!(bytes, [0x04, 0x06, 0x00, 0x04, 0x06, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn trailing_comments_and_blank_lines_are_ignored() {
        let bytes = compile_script("\n3 brake  # stop\n\n", 1).unwrap();
        assert_eq!(bytes, [0x08; 3]);
    }

    #[test]
    fn zero_tick_segments_emit_nothing() {
        let bytes = compile_script("0 accel\n1 left\n", 1).unwrap();
        assert_eq!(bytes, [0x01]);
    }

    #[test]
    fn errors_name_the_line() {
        let err = compile_script("1 accel\nten accel\n", 1).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        let err = compile_script("1 accel brake\n", 1).unwrap_err();
        assert!(format!("{err:#}").contains("line 1"));
    }

    #[test]
    fn empty_script_is_rejected() {
        assert!(compile_script("# nothing\n", 4).is_err());
    }
}
