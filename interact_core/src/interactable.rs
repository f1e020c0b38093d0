//! The capability contract every interactable world object implements.
//!
//! The detector and controller only ever see `dyn Interactable`. Data that
//! only the UI cares about (hold progress) and the external open/close
//! channel used by switches are reached through optional secondary
//! capabilities instead of concrete type checks.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::context::InteractionContext;

pub const DEFAULT_INTERACTION_RANGE: f32 = 2.0;

/// Outcome of [`Interactable::can_interact`]. A denial is a normal result,
/// not an error, and carries a reason meant for the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    Allowed,
    Denied(String),
}

impl Permission {
    pub fn denied(reason: impl Into<String>) -> Self {
        Permission::Denied(reason.into())
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Permission::Allowed)
    }

    pub fn fail_reason(&self) -> Option<&str> {
        match self {
            Permission::Allowed => None,
            Permission::Denied(reason) => Some(reason.as_str()),
        }
    }
}

/// Where an object can be interacted from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reach {
    /// Candidates farther than this from the interactor are ignored.
    pub max_range: f32,
    /// Absolute point used for distance checks and prompt anchoring. The
    /// owning object's position is used when unset.
    pub interaction_point: Option<Vec3>,
}

impl Default for Reach {
    fn default() -> Self {
        Self {
            max_range: DEFAULT_INTERACTION_RANGE,
            interaction_point: None,
        }
    }
}

impl Reach {
    pub fn with_range(max_range: f32) -> Self {
        Self {
            max_range,
            ..Self::default()
        }
    }

    pub fn with_point(mut self, point: Vec3) -> Self {
        self.interaction_point = Some(point);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.max_range.is_finite() && self.max_range > 0.0
    }
}

pub trait Interactable: fmt::Debug {
    fn reach(&self) -> &Reach;

    /// Must not mutate state.
    fn can_interact(&self, context: &InteractionContext) -> Permission;

    /// Empty string hides the prompt.
    fn interaction_prompt(&self, context: &InteractionContext) -> String;

    fn begin_interaction(&mut self, context: &InteractionContext);

    fn update_interaction(&mut self, _context: &InteractionContext) {}

    fn end_interaction(&mut self, _context: &InteractionContext) {}

    /// Inactive objects drop out of spatial queries, like a disabled
    /// scene node.
    fn is_active(&self) -> bool {
        true
    }

    fn interaction_point(&self) -> Option<Vec3> {
        self.reach().interaction_point
    }

    fn max_interaction_range(&self) -> f32 {
        self.reach().max_range
    }

    fn hold_progress(&self) -> Option<&dyn HoldProgress> {
        None
    }

    fn openable(&self) -> Option<&dyn Openable> {
        None
    }

    fn openable_mut(&mut self) -> Option<&mut dyn Openable> {
        None
    }
}

/// Secondary capability for hold-to-complete interactions.
pub trait HoldProgress {
    fn elapsed(&self) -> f32;

    fn required(&self) -> f32;

    fn is_complete(&self) -> bool;

    fn normalized(&self) -> f32 {
        if self.is_complete() {
            return 1.0;
        }
        let required = self.required();
        if required <= 0.0 {
            return 0.0;
        }
        (self.elapsed() / required).clamp(0.0, 1.0)
    }
}

/// Secondary capability for objects whose open state can be driven from
/// outside the interaction lifecycle.
pub trait Openable {
    fn is_open(&self) -> bool;

    /// Returns `true` when the state changed.
    fn set_open_state(&mut self, open: bool) -> bool;
}
