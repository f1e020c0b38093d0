use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::context::{InputEdges, InteractionContext};
use crate::interactable::{Interactable, Permission, Reach};
use crate::interactor::{Interactor, InteractorHandle, Transform};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct CallLog {
    pub(crate) begins: u32,
    pub(crate) updates: u32,
    pub(crate) ends: u32,
}

/// Interactable that records every lifecycle call it receives. The call log
/// is shared so tests can read it after the probe moves into a world.
#[derive(Debug, Clone)]
pub(crate) struct Probe {
    pub(crate) reach: Reach,
    pub(crate) active: bool,
    pub(crate) permission: Permission,
    pub(crate) prompt: String,
    calls: Rc<RefCell<CallLog>>,
}

impl Probe {
    pub(crate) fn new(range: f32) -> Self {
        Self {
            reach: Reach::with_range(range),
            active: true,
            permission: Permission::Allowed,
            prompt: "Press E".to_string(),
            calls: Rc::new(RefCell::new(CallLog::default())),
        }
    }

    pub(crate) fn calls(&self) -> Rc<RefCell<CallLog>> {
        self.calls.clone()
    }

    pub(crate) fn with_point(mut self, point: Vec3) -> Self {
        self.reach.interaction_point = Some(point);
        self
    }

    pub(crate) fn denying(mut self, reason: &str) -> Self {
        self.permission = Permission::denied(reason);
        self
    }
}

impl Interactable for Probe {
    fn reach(&self) -> &Reach {
        &self.reach
    }

    fn can_interact(&self, _context: &InteractionContext) -> Permission {
        self.permission.clone()
    }

    fn interaction_prompt(&self, _context: &InteractionContext) -> String {
        self.prompt.clone()
    }

    fn begin_interaction(&mut self, _context: &InteractionContext) {
        self.calls.borrow_mut().begins += 1;
    }

    fn update_interaction(&mut self, _context: &InteractionContext) {
        self.calls.borrow_mut().updates += 1;
    }

    fn end_interaction(&mut self, _context: &InteractionContext) {
        self.calls.borrow_mut().ends += 1;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

pub(crate) fn player_at(position: Vec3) -> InteractorHandle {
    InteractorHandle::new(Interactor::new("player", Transform::at(position)))
}

pub(crate) fn frame(interactor: &InteractorHandle, dt: f32, input: InputEdges) -> InteractionContext {
    InteractionContext::new(interactor.clone(), dt, input).expect("valid test context")
}

pub(crate) const PRESS: InputEdges = InputEdges {
    pressed: true,
    held: true,
    released: false,
};

pub(crate) const HOLD: InputEdges = InputEdges {
    pressed: false,
    held: true,
    released: false,
};

pub(crate) const RELEASE: InputEdges = InputEdges {
    pressed: false,
    held: false,
    released: true,
};
