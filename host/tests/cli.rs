use anyhow::{ensure, Result};
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn racer() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_racer"));
    command
        .env_remove("RACER_COUNTDOWN_FRAMES")
        .env_remove("RACER_VEHICLE_SLOTS")
        .env_remove("RACER_MAX_FRAMES")
        .env("RUST_LOG", "warn");
    command
}

#[test]
fn run_then_verify_tape() -> Result<()> {
    let dir = tempdir()?;
    let script = dir.path().join("drive.script");
    fs::write(&script, "40 idle\n200 accel\n60 accel+left\n")?;
    let tape = dir.path().join("tapes").join("drive.tape");
    let report = dir.path().join("drive.json");

    let status = racer()
        .args(["run", "--vehicle-type", "warriors", "--vehicle-slots", "1"])
        .args(["--countdown-frames", "40"])
        .arg("--script")
        .arg(&script)
        .arg("--tape")
        .arg(&tape)
        .arg("--report")
        .arg(&report)
        .status()?;
    ensure!(status.success(), "run failed: {status}");

    let metrics: serde_json::Value = serde_json::from_slice(&fs::read(&report)?)?;
    assert_eq!(metrics["frame_count"], 300);
    assert_eq!(metrics["vehicle_type"], "warriors");

    let output = racer().arg("verify-tape").arg("--input").arg(&tape).output()?;
    ensure!(output.status.success(), "verify-tape failed");
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("frame_count=300"));
    assert!(stdout.contains(&format!(
        "fingerprint={}",
        metrics["fingerprint"].as_str().unwrap_or_default()
    )));
    Ok(())
}

#[test]
fn verify_tape_rejects_garbage() -> Result<()> {
    let dir = tempdir()?;
    let tape = dir.path().join("garbage.tape");
    fs::write(&tape, b"definitely not a race tape at all")?;

    let output = racer().arg("verify-tape").arg("--input").arg(&tape).output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("invalid tape magic"));
    Ok(())
}

#[test]
fn tables_dump_is_json() -> Result<()> {
    let output = racer()
        .args(["tables", "--vehicle-type", "choppers"])
        .output()?;
    ensure!(output.status.success(), "tables failed");
    let tables: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(tables["vehicle_type"], "choppers");
    assert_eq!(tables["heading_clamp"].as_array().map(Vec::len), Some(64));
    Ok(())
}
