use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::context::InteractionContext;
use crate::world::{ObjectHandle, World};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Seconds a denial message stays on screen.
    pub fail_message_duration: f32,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            fail_message_duration: 1.5,
        }
    }
}

/// What the prompt widget should show this frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PromptView {
    /// Empty hides the prompt.
    pub text: String,
    pub anchor: Option<Vec3>,
    /// Normalized hold progress, present only for hold interactions.
    pub progress: Option<f32>,
    pub is_failure: bool,
}

impl PromptView {
    pub fn is_hidden(&self) -> bool {
        self.text.is_empty()
    }
}

/// Builds the per-frame prompt from the focused object, with a timed
/// failure message taking over the prompt after a denied attempt.
#[derive(Debug, Default)]
pub struct PromptPresenter {
    config: PresenterConfig,
    fail_message: Option<String>,
    fail_timer: f32,
}

impl PromptPresenter {
    pub fn new(config: PresenterConfig) -> Self {
        Self {
            config,
            fail_message: None,
            fail_timer: 0.0,
        }
    }

    pub fn show_failure(&mut self, reason: &str) {
        if reason.is_empty() {
            return;
        }
        self.fail_message = Some(reason.to_string());
        self.fail_timer = self.config.fail_message_duration;
    }

    pub fn refresh(
        &mut self,
        context: &InteractionContext,
        focus: Option<ObjectHandle>,
        world: &World,
    ) -> PromptView {
        if let Some(message) = self.fail_message.as_ref() {
            self.fail_timer -= context.delta_time();
            if self.fail_timer > 0.0 {
                return PromptView {
                    text: message.clone(),
                    anchor: focus
                        .and_then(|handle| world.get(handle))
                        .map(|object| object.interaction_point()),
                    progress: None,
                    is_failure: true,
                };
            }
            self.fail_message = None;
            self.fail_timer = 0.0;
        }

        let Some(object) = focus.and_then(|handle| world.get(handle)) else {
            return PromptView::default();
        };
        let Some(interactable) = object.interactable() else {
            return PromptView::default();
        };

        PromptView {
            text: interactable.interaction_prompt(context),
            anchor: Some(object.interaction_point()),
            progress: interactable
                .hold_progress()
                .map(|progress| progress.normalized()),
            is_failure: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InputEdges;
    use crate::interactable::Reach;
    use crate::interactables::{Chest, Door};
    use crate::testing::{frame, player_at, Probe, HOLD, PRESS};
    use crate::world::WorldObject;

    #[test]
    fn no_focus_hides_prompt() {
        let world = World::new();
        let player = player_at(Vec3::ZERO);
        let mut presenter = PromptPresenter::default();
        let view = presenter.refresh(&frame(&player, 0.1, InputEdges::IDLE), None, &world);
        assert!(view.is_hidden());
        assert_eq!(view.progress, None);
    }

    #[test]
    fn prompt_tracks_state_every_frame() {
        let mut world = World::new();
        let door = world
            .spawn(WorldObject::new("door", Vec3::X).with_interactable(Door::new(Reach::default())))
            .expect("spawn door");
        let player = player_at(Vec3::ZERO);
        let context = frame(&player, 0.1, InputEdges::IDLE);
        let mut presenter = PromptPresenter::default();

        assert_eq!(presenter.refresh(&context, Some(door), &world).text, "Press E to Open");
        world
            .interactable_mut(door)
            .expect("door")
            .begin_interaction(&frame(&player, 0.0, PRESS));
        let view = presenter.refresh(&context, Some(door), &world);
        assert_eq!(view.text, "Press E to Close");
        assert_eq!(view.anchor, Some(Vec3::X));
    }

    #[test]
    fn hold_progress_is_normalized() {
        let mut world = World::new();
        let chest = world
            .spawn(
                WorldObject::new("chest", Vec3::X)
                    .with_interactable(Chest::new(Reach::default()).with_hold_duration(2.0)),
            )
            .expect("spawn chest");
        let player = player_at(Vec3::ZERO);
        let mut presenter = PromptPresenter::default();
        {
            let interactable = world.interactable_mut(chest).expect("chest");
            interactable.begin_interaction(&frame(&player, 0.0, PRESS));
            interactable.update_interaction(&frame(&player, 0.5, HOLD));
        }
        let view = presenter.refresh(&frame(&player, 0.5, HOLD), Some(chest), &world);
        assert_eq!(view.text, "Hold E to Open Chest");
        assert_eq!(view.progress, Some(0.25));
    }

    #[test]
    fn failure_message_expires() {
        let mut world = World::new();
        let gate = world
            .spawn(WorldObject::new("gate", Vec3::X).with_interactable(Probe::new(2.0)))
            .expect("spawn");
        let player = player_at(Vec3::ZERO);
        let mut presenter = PromptPresenter::default();
        presenter.show_failure("Use the switch");

        let tick = frame(&player, 1.0, InputEdges::IDLE);
        let view = presenter.refresh(&tick, Some(gate), &world);
        assert!(view.is_failure);
        assert_eq!(view.text, "Use the switch");

        let view = presenter.refresh(&tick, Some(gate), &world);
        assert!(!view.is_failure);
        assert_eq!(view.text, "Press E");
    }

    #[test]
    fn empty_failure_reason_is_ignored() {
        let world = World::new();
        let player = player_at(Vec3::ZERO);
        let mut presenter = PromptPresenter::default();
        presenter.show_failure("");
        let view = presenter.refresh(&frame(&player, 0.1, InputEdges::IDLE), None, &world);
        assert!(!view.is_failure);
    }
}
