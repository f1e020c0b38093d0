use glam::Vec3;
use serde::Serialize;
use thiserror::Error;

use crate::interactor::InteractorHandle;

/// Interaction key state for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InputEdges {
    pub pressed: bool,
    pub held: bool,
    pub released: bool,
}

impl InputEdges {
    pub const IDLE: InputEdges = InputEdges {
        pressed: false,
        held: false,
        released: false,
    };
}

/// Turns the per-frame "key is down" level into press/release edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeySampler {
    was_down: bool,
}

impl KeySampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, is_down: bool) -> InputEdges {
        let edges = InputEdges {
            pressed: is_down && !self.was_down,
            held: is_down,
            released: !is_down && self.was_down,
        };
        self.was_down = is_down;
        edges
    }

    pub fn is_down(&self) -> bool {
        self.was_down
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContextError {
    #[error("interaction context requires an interactor")]
    MissingInteractor,
    #[error("delta time must be non-negative (got {0})")]
    NegativeDeltaTime(f32),
    #[error("delta time must be finite")]
    NonFiniteDeltaTime,
    #[error("input cannot be pressed and released on the same frame")]
    ConflictingEdges,
}

/// Immutable per-frame bundle handed to every capability call.
#[derive(Debug, Clone)]
pub struct InteractionContext {
    interactor: InteractorHandle,
    delta_time: f32,
    input: InputEdges,
}

impl InteractionContext {
    pub fn new(
        interactor: InteractorHandle,
        delta_time: f32,
        input: InputEdges,
    ) -> Result<Self, ContextError> {
        if !delta_time.is_finite() {
            return Err(ContextError::NonFiniteDeltaTime);
        }
        if delta_time < 0.0 {
            return Err(ContextError::NegativeDeltaTime(delta_time));
        }
        if input.pressed && input.released {
            return Err(ContextError::ConflictingEdges);
        }
        Ok(Self {
            interactor,
            delta_time,
            input,
        })
    }

    pub fn builder() -> InteractionContextBuilder {
        InteractionContextBuilder::default()
    }

    pub fn interactor(&self) -> &InteractorHandle {
        &self.interactor
    }

    pub fn interactor_position(&self) -> Vec3 {
        self.interactor.position()
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn input(&self) -> InputEdges {
        self.input
    }

    pub fn pressed_this_frame(&self) -> bool {
        self.input.pressed
    }

    pub fn is_held(&self) -> bool {
        self.input.held
    }

    pub fn released_this_frame(&self) -> bool {
        self.input.released
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionContextBuilder {
    interactor: Option<InteractorHandle>,
    delta_time: f32,
    input: InputEdges,
}

impl InteractionContextBuilder {
    pub fn interactor(mut self, interactor: InteractorHandle) -> Self {
        self.interactor = Some(interactor);
        self
    }

    pub fn delta_time(mut self, delta_time: f32) -> Self {
        self.delta_time = delta_time;
        self
    }

    pub fn input(mut self, input: InputEdges) -> Self {
        self.input = input;
        self
    }

    pub fn pressed(mut self, pressed: bool) -> Self {
        self.input.pressed = pressed;
        self
    }

    pub fn held(mut self, held: bool) -> Self {
        self.input.held = held;
        self
    }

    pub fn released(mut self, released: bool) -> Self {
        self.input.released = released;
        self
    }

    pub fn build(self) -> Result<InteractionContext, ContextError> {
        let interactor = self.interactor.ok_or(ContextError::MissingInteractor)?;
        InteractionContext::new(interactor, self.delta_time, self.input)
    }
}
