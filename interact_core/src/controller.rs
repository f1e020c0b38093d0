use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::context::InteractionContext;
use crate::interactable::Permission;
use crate::world::{ObjectHandle, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerState {
    Idle,
    Interacting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Reject the cached candidate on a press when the interactor has since
    /// moved out of that candidate's own range. Off by default: a press
    /// between scans lands on the last detected candidate.
    pub require_candidate_in_range: bool,
}

/// What a controller tick did, if anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControllerEvent {
    Began { handle: ObjectHandle },
    Denied { handle: ObjectHandle, reason: String },
    Updated { handle: ObjectHandle },
    Ended { handle: ObjectHandle },
    /// The active object disappeared mid-interaction.
    Cancelled { handle: ObjectHandle },
}

impl ControllerEvent {
    pub fn handle(&self) -> ObjectHandle {
        match self {
            ControllerEvent::Began { handle }
            | ControllerEvent::Denied { handle, .. }
            | ControllerEvent::Updated { handle }
            | ControllerEvent::Ended { handle }
            | ControllerEvent::Cancelled { handle } => *handle,
        }
    }
}

/// Drives the begin/update/end lifecycle from per-frame input.
///
/// The detector only refreshes every few frames, so a press is matched
/// against the most recent non-empty detector result rather than whatever
/// the detector happens to report on the press frame. Once an interaction
/// starts the target is pinned until release.
#[derive(Debug, Default)]
pub struct InteractionController {
    config: ControllerConfig,
    active: Option<ObjectHandle>,
    last_good: Option<ObjectHandle>,
}

impl InteractionController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            active: None,
            last_good: None,
        }
    }

    pub fn state(&self) -> ControllerState {
        if self.active.is_some() {
            ControllerState::Interacting
        } else {
            ControllerState::Idle
        }
    }

    pub fn is_interacting(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<ObjectHandle> {
        self.active
    }

    pub fn last_good_candidate(&self) -> Option<ObjectHandle> {
        self.last_good
    }

    pub fn tick(
        &mut self,
        context: &InteractionContext,
        detected: Option<ObjectHandle>,
        world: &mut World,
    ) -> Option<ControllerEvent> {
        if detected.is_some() {
            self.last_good = detected;
        }

        if let Some(active) = self.active {
            return Some(self.update_active(active, context, world));
        }

        if !context.pressed_this_frame() {
            return None;
        }

        let candidate = self.press_candidate(context, world)?;
        let interactable = world.interactable_mut(candidate)?;
        match interactable.can_interact(context) {
            Permission::Denied(reason) => {
                log::debug!(
                    "interaction with {} denied: {reason}",
                    world.name_of(candidate).unwrap_or("<unknown>")
                );
                Some(ControllerEvent::Denied {
                    handle: candidate,
                    reason,
                })
            }
            Permission::Allowed => {
                interactable.begin_interaction(context);
                self.active = Some(candidate);
                log::debug!(
                    "interaction with {} began",
                    world.name_of(candidate).unwrap_or("<unknown>")
                );
                Some(ControllerEvent::Began { handle: candidate })
            }
        }
    }

    fn press_candidate(
        &mut self,
        context: &InteractionContext,
        world: &World,
    ) -> Option<ObjectHandle> {
        let handle = self.last_good?;
        if !world.is_available(handle) {
            self.last_good = None;
            return None;
        }
        if !self.accepts(handle, context.interactor_position(), world) {
            log::debug!(
                "cached candidate {} is out of reach",
                world.name_of(handle).unwrap_or("<unknown>")
            );
            return None;
        }
        Some(handle)
    }

    /// Whether a press from `position` would be allowed to target `handle`.
    /// Hosts use this to keep the prompt in step with what a press does.
    pub fn accepts(&self, handle: ObjectHandle, position: Vec3, world: &World) -> bool {
        if !world.is_available(handle) {
            return false;
        }
        if !self.config.require_candidate_in_range {
            return true;
        }
        world
            .get(handle)
            .and_then(|object| object.reach_distance_squared(position))
            .is_some()
    }

    fn update_active(
        &mut self,
        active: ObjectHandle,
        context: &InteractionContext,
        world: &mut World,
    ) -> ControllerEvent {
        let Some(interactable) = world.interactable_mut(active) else {
            log::warn!("active interactable {active} vanished; cancelling interaction");
            self.active = None;
            if self.last_good == Some(active) {
                self.last_good = None;
            }
            return ControllerEvent::Cancelled { handle: active };
        };

        interactable.update_interaction(context);

        if context.released_this_frame() {
            interactable.end_interaction(context);
            self.active = None;
            log::debug!(
                "interaction with {} ended",
                world.name_of(active).unwrap_or("<unknown>")
            );
            return ControllerEvent::Ended { handle: active };
        }

        ControllerEvent::Updated { handle: active }
    }
}
