use serde::{Deserialize, Serialize};

use crate::interactor::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// World units per second at full stick deflection.
    pub move_speed: f32,
    /// Degrees per second per unit of look input.
    pub look_sensitivity: f32,
    pub pitch_limit: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            look_sensitivity: 100.0,
            pitch_limit: 80.0,
        }
    }
}

/// One frame of movement and look axes, each in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionInput {
    pub forward: f32,
    pub strafe: f32,
    pub look_x: f32,
    pub look_y: f32,
}

impl LocomotionInput {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }

    fn clamped(&self) -> Self {
        let axis = |value: f32| {
            if value.is_finite() {
                value.clamp(-1.0, 1.0)
            } else {
                0.0
            }
        };
        Self {
            forward: axis(self.forward),
            strafe: axis(self.strafe),
            look_x: axis(self.look_x),
            look_y: axis(self.look_y),
        }
    }
}

/// Moves and turns a first-person transform. Look is applied before
/// movement so a frame that turns and walks walks along the new heading.
pub fn apply_locomotion(
    transform: &mut Transform,
    input: &LocomotionInput,
    config: &LocomotionConfig,
    delta_time: f32,
) {
    if delta_time <= 0.0 || !delta_time.is_finite() {
        return;
    }
    let input = input.clamped();

    transform.yaw = (transform.yaw + input.look_x * config.look_sensitivity * delta_time)
        .rem_euclid(360.0);
    transform.pitch = (transform.pitch - input.look_y * config.look_sensitivity * delta_time)
        .clamp(-config.pitch_limit, config.pitch_limit);

    let direction = transform.forward() * input.forward + transform.right() * input.strafe;
    // Diagonals are no faster than straight lines.
    let direction = direction.clamp_length_max(1.0);
    transform.position += direction * config.move_speed * delta_time;
}
