use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use serde::Deserialize;
use tempfile::tempdir;

#[derive(Debug, Deserialize, Clone, PartialEq)]
struct EventEntry {
    frame: u32,
    label: String,
}

#[derive(Debug, Deserialize)]
struct EventLog {
    frames: u32,
    scans: u64,
    inventory: Vec<String>,
    events: Vec<EventEntry>,
}

#[test]
fn locked_door_scenario_matches_fixture() -> Result<()> {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let fixtures = manifest_dir.join("tests").join("fixtures");

    let temp_dir = tempdir().context("creating temporary directory for event log")?;
    let log_path = temp_dir.path().join("events.json");
    let log_path_str = log_path
        .to_str()
        .context("event log path is not valid UTF-8")?;
    let scene = fixtures.join("locked_door_scene.json");
    let script = fixtures.join("locked_door_script.json");

    let status = Command::new(env!("CARGO_BIN_EXE_interact_sim"))
        .args([
            "--scene",
            scene.to_str().context("scene path is not valid UTF-8")?,
            "--script",
            script.to_str().context("script path is not valid UTF-8")?,
            "--frame-dt",
            "0.05",
            "--event-log-json",
            log_path_str,
        ])
        .status()
        .context("executing interact_sim locked door scenario")?;

    assert!(status.success(), "interact_sim exited with {status:?}");
    assert!(log_path.is_file(), "interact_sim did not produce an event log");

    let expected = read_log(fixtures.join("locked_door_events.json"))?;
    let actual = read_log(&log_path)?;

    assert_eq!(actual.frames, expected.frames, "frame count changed");
    assert_eq!(actual.scans, expected.scans, "detector scan count changed");
    assert_eq!(actual.inventory, expected.inventory, "final inventory changed");
    assert_eq!(
        actual.events.len(),
        expected.events.len(),
        "event count changed (expected {}, got {}): {:#?}",
        expected.events.len(),
        actual.events.len(),
        actual.events
    );
    for (idx, (exp, act)) in expected.events.iter().zip(actual.events.iter()).enumerate() {
        assert_eq!(
            act, exp,
            "event mismatch at index {idx} (expected {exp:?}, got {act:?})"
        );
    }

    Ok(())
}

#[test]
fn missing_scene_file_fails_with_context() -> Result<()> {
    let temp_dir = tempdir().context("creating temporary directory")?;
    let missing = temp_dir.path().join("nope.json");
    let output = Command::new(env!("CARGO_BIN_EXE_interact_sim"))
        .args([
            "--scene",
            missing.to_str().context("path is not valid UTF-8")?,
            "--demo",
        ])
        .output()
        .context("executing interact_sim with a missing scene")?;

    assert!(!output.status.success(), "missing scene should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("reading scene from"),
        "error context missing from stderr: {stderr}"
    );
    Ok(())
}

fn read_log(path: impl AsRef<Path>) -> Result<EventLog> {
    let path_ref = path.as_ref();
    let data = fs::read_to_string(path_ref)
        .with_context(|| format!("reading event log from {}", path_ref.display()))?;
    let log: EventLog = serde_json::from_str(&data)
        .with_context(|| format!("parsing event log from {}", path_ref.display()))?;
    Ok(log)
}
