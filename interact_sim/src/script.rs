use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::Vec3;
use interact_core::LocomotionInput;
use serde::Deserialize;

/// Scripted input: a list of steps, each holding the same input for a
/// number of frames.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputScript {
    pub steps: Vec<InputStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputStep {
    pub label: Option<String>,
    pub frames: u32,
    /// Whether the interact key is down on every frame of the step.
    pub interact: bool,
    pub movement: LocomotionInput,
    /// Moves the interactor before the first frame of the step.
    pub teleport: Option<Vec3>,
    /// Objects removed from the world before the first frame of the step.
    pub despawn: Vec<String>,
}

impl Default for InputStep {
    fn default() -> Self {
        Self {
            label: None,
            frames: 1,
            interact: false,
            movement: LocomotionInput::default(),
            teleport: None,
            despawn: Vec::new(),
        }
    }
}

impl InputScript {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading input script from {}", path.display()))?;
        let script: InputScript = serde_json::from_str(&data)
            .with_context(|| format!("parsing input script from {}", path.display()))?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            bail!("input script has no steps");
        }
        let mut total: u32 = 0;
        for (index, step) in self.steps.iter().enumerate() {
            let label = step.label.as_deref().unwrap_or("unlabelled");
            if step.frames == 0 {
                bail!("step {index} ({label}) runs for zero frames");
            }
            total = match total.checked_add(step.frames) {
                Some(total) => total,
                None => bail!(
                    "step {index} ({label}) pushes the script past {} frames",
                    u32::MAX
                ),
            };
        }
        Ok(())
    }

    /// Frame count across all steps, saturating for scripts that failed
    /// [`InputScript::validate`].
    pub fn total_frames(&self) -> u32 {
        self.steps
            .iter()
            .fold(0u32, |total, step| total.saturating_add(step.frames))
    }

    /// Walks the built-in demo scene: collect the key, unlock and hold open
    /// the chest, try it again, open a door, get turned away by the gate,
    /// work the lever twice and finally lose a chest mid-hold.
    pub fn demo() -> Self {
        let wait = |label: &str, frames: u32| InputStep {
            label: Some(label.to_string()),
            frames,
            ..InputStep::default()
        };
        let go_to = |label: &str, position: Vec3| InputStep {
            label: Some(label.to_string()),
            frames: 20,
            teleport: Some(position),
            ..InputStep::default()
        };
        let press = |label: &str, frames: u32| InputStep {
            label: Some(label.to_string()),
            frames,
            interact: true,
            ..InputStep::default()
        };

        Self {
            steps: vec![
                go_to("approach key", Vec3::ZERO),
                press("pick up key", 2),
                wait("release key", 20),
                go_to("approach chest", Vec3::new(10.0, 0.0, 0.0)),
                press("hold chest", 90),
                wait("release chest", 20),
                press("press opened chest", 2),
                wait("read failure", 100),
                go_to("approach cellar door", Vec3::new(20.0, 0.0, 0.0)),
                press("open cellar door", 2),
                wait("release cellar door", 10),
                go_to("approach gate", Vec3::new(30.0, 0.0, 0.0)),
                press("push gate", 2),
                wait("release gate", 10),
                InputStep {
                    frames: 100,
                    ..go_to("approach lever", Vec3::new(30.0, 0.0, -1.2))
                },
                press("pull lever", 2),
                wait("release lever", 10),
                press("pull lever again", 2),
                wait("release lever again", 10),
                go_to("approach supply crate", Vec3::new(40.0, 0.0, 0.0)),
                press("hold supply crate", 30),
                InputStep {
                    label: Some("crate removed".to_string()),
                    frames: 5,
                    interact: true,
                    despawn: vec!["supply_crate".to_string()],
                    ..InputStep::default()
                },
                wait("release after removal", 20),
                InputStep {
                    label: Some("walk off".to_string()),
                    frames: 30,
                    movement: LocomotionInput {
                        forward: 1.0,
                        look_x: 0.5,
                        ..LocomotionInput::default()
                    },
                    ..InputStep::default()
                },
            ],
        }
    }
}
