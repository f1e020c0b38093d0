use serde::Serialize;

use super::require_key;
use crate::context::InteractionContext;
use crate::interactable::{HoldProgress, Interactable, Permission, Reach};
use crate::inventory::ItemDefinition;

pub const MIN_HOLD_DURATION: f32 = 0.1;
pub const MAX_HOLD_DURATION: f32 = 10.0;
pub const DEFAULT_HOLD_DURATION: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChestState {
    Idle,
    Holding,
    /// Terminal.
    Completed,
}

/// Hold-to-open container. Opens once; releasing early throws away any
/// partial progress.
#[derive(Debug, Clone)]
pub struct Chest {
    reach: Reach,
    required_key: Option<ItemDefinition>,
    contained_item: Option<ItemDefinition>,
    hold_duration: f32,
    state: ChestState,
    progress: f32,
}

impl Chest {
    pub fn new(reach: Reach) -> Self {
        Self {
            reach,
            required_key: None,
            contained_item: None,
            hold_duration: DEFAULT_HOLD_DURATION,
            state: ChestState::Idle,
            progress: 0.0,
        }
    }

    pub fn with_required_key(mut self, key: ItemDefinition) -> Self {
        self.required_key = Some(key);
        self
    }

    pub fn with_contained_item(mut self, item: ItemDefinition) -> Self {
        self.contained_item = Some(item);
        self
    }

    /// Clamped to `[MIN_HOLD_DURATION, MAX_HOLD_DURATION]`.
    pub fn with_hold_duration(mut self, seconds: f32) -> Self {
        self.hold_duration = if seconds.is_finite() {
            seconds.clamp(MIN_HOLD_DURATION, MAX_HOLD_DURATION)
        } else {
            DEFAULT_HOLD_DURATION
        };
        self
    }

    pub fn state(&self) -> ChestState {
        self.state
    }

    pub fn hold_duration(&self) -> f32 {
        self.hold_duration
    }

    pub fn current_hold_time(&self) -> f32 {
        self.progress
    }

    pub fn is_opened(&self) -> bool {
        self.state == ChestState::Completed
    }

    fn open(&mut self, context: &InteractionContext) {
        let Some(item) = self.contained_item.as_ref() else {
            log::warn!("chest has no contained item; opening it empty");
            self.state = ChestState::Completed;
            return;
        };
        match context.interactor().grant_item(item) {
            Ok(_) => {
                self.state = ChestState::Completed;
                log::info!("chest opened, granted {}", item.display_name());
            }
            Err(err) => {
                // Stay unresolved so the chest can still be opened once the
                // interactor has somewhere to put the item.
                log::error!("{err}; chest left closed");
                self.progress = 0.0;
            }
        }
    }
}

impl HoldProgress for Chest {
    fn elapsed(&self) -> f32 {
        self.progress
    }

    fn required(&self) -> f32 {
        self.hold_duration
    }

    fn is_complete(&self) -> bool {
        self.is_opened()
    }
}

impl Interactable for Chest {
    fn reach(&self) -> &Reach {
        &self.reach
    }

    fn can_interact(&self, context: &InteractionContext) -> Permission {
        if self.is_opened() {
            return Permission::denied("Chest already opened");
        }
        require_key(context, self.required_key.as_ref())
    }

    fn interaction_prompt(&self, _context: &InteractionContext) -> String {
        if self.is_opened() {
            return String::new();
        }
        if self.required_key.is_some() {
            "Hold E to Unlock Chest".to_string()
        } else {
            "Hold E to Open Chest".to_string()
        }
    }

    fn begin_interaction(&mut self, _context: &InteractionContext) {
        if self.is_opened() {
            return;
        }
        self.progress = 0.0;
        self.state = ChestState::Holding;
    }

    fn update_interaction(&mut self, context: &InteractionContext) {
        if self.state != ChestState::Holding || !context.is_held() {
            return;
        }
        self.progress += context.delta_time();
        if self.progress >= self.hold_duration {
            self.open(context);
        }
    }

    fn end_interaction(&mut self, _context: &InteractionContext) {
        if self.state == ChestState::Holding {
            self.progress = 0.0;
            self.state = ChestState::Idle;
        }
    }

    fn hold_progress(&self) -> Option<&dyn HoldProgress> {
        Some(self as &dyn HoldProgress)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::context::InputEdges;
    use crate::interactor::{Interactor, InteractorHandle, Transform};
    use crate::inventory::ItemId;
    use crate::testing::{frame, player_at, HOLD, PRESS, RELEASE};

    fn gem() -> ItemDefinition {
        ItemDefinition::new("gem", "Gem")
    }

    fn chest() -> Chest {
        Chest::new(Reach::default()).with_contained_item(gem())
    }

    fn gem_count(player: &InteractorHandle) -> usize {
        player
            .borrow()
            .inventory()
            .map(|inventory| inventory.ids().filter(|id| id.as_str() == "gem").count())
            .unwrap_or(0)
    }

    #[test]
    fn completes_on_fourth_half_second_update() {
        let player = player_at(Vec3::ZERO);
        let mut chest = chest();
        chest.begin_interaction(&frame(&player, 0.0, PRESS));
        assert_eq!(chest.state(), ChestState::Holding);

        let held = frame(&player, 0.5, HOLD);
        for _ in 0..3 {
            chest.update_interaction(&held);
            assert!(!chest.is_opened());
        }
        chest.update_interaction(&held);
        assert!(chest.is_opened());
        assert_eq!(player.has_item(&ItemId::new("gem")), Some(true));
        assert_eq!(chest.normalized(), 1.0);
    }

    #[test]
    fn completion_is_idempotent() {
        let player = player_at(Vec3::ZERO);
        let mut chest = chest().with_hold_duration(0.5);
        chest.begin_interaction(&frame(&player, 0.0, PRESS));
        let held = frame(&player, 0.5, HOLD);
        chest.update_interaction(&held);
        assert!(chest.is_opened());

        player
            .borrow_mut()
            .inventory_mut()
            .expect("inventory")
            .remove_item(&ItemId::new("gem"));
        for _ in 0..5 {
            chest.update_interaction(&held);
        }
        chest.end_interaction(&frame(&player, 0.0, RELEASE));
        chest.begin_interaction(&frame(&player, 0.0, PRESS));
        chest.update_interaction(&held);

        assert_eq!(gem_count(&player), 0);
        assert_eq!(chest.state(), ChestState::Completed);
        assert_eq!(
            chest.can_interact(&frame(&player, 0.0, PRESS)),
            Permission::denied("Chest already opened")
        );
        assert_eq!(chest.interaction_prompt(&held), "");
    }

    #[test]
    fn early_release_resets_progress() {
        let player = player_at(Vec3::ZERO);
        let mut chest = chest();
        chest.begin_interaction(&frame(&player, 0.0, PRESS));
        chest.update_interaction(&frame(&player, 0.5, HOLD));
        chest.update_interaction(&frame(&player, 0.5, HOLD));
        assert_eq!(chest.current_hold_time(), 1.0);
        assert_eq!(chest.normalized(), 0.5);

        chest.end_interaction(&frame(&player, 0.0, RELEASE));
        assert_eq!(chest.state(), ChestState::Idle);
        assert_eq!(chest.current_hold_time(), 0.0);

        chest.begin_interaction(&frame(&player, 0.0, PRESS));
        chest.update_interaction(&frame(&player, 0.5, HOLD));
        assert_eq!(chest.current_hold_time(), 0.5);
        assert!(!chest.is_opened());
    }

    #[test]
    fn progress_only_accumulates_while_held() {
        let player = player_at(Vec3::ZERO);
        let mut chest = chest();
        chest.begin_interaction(&frame(&player, 0.0, PRESS));
        chest.update_interaction(&frame(&player, 0.5, InputEdges::IDLE));
        assert_eq!(chest.current_hold_time(), 0.0);
    }

    #[test]
    fn update_before_begin_is_ignored() {
        let player = player_at(Vec3::ZERO);
        let mut chest = chest();
        chest.update_interaction(&frame(&player, 5.0, HOLD));
        assert_eq!(chest.state(), ChestState::Idle);
        assert_eq!(chest.current_hold_time(), 0.0);
    }

    #[test]
    fn key_gate_and_prompts() {
        let key = ItemDefinition::new("brass_key", "Brass Key");
        let player = player_at(Vec3::ZERO);
        let context = frame(&player, 0.0, PRESS);
        let chest = chest().with_required_key(key.clone());

        assert_eq!(chest.interaction_prompt(&context), "Hold E to Unlock Chest");
        assert_eq!(
            chest.can_interact(&context),
            Permission::denied("Brass Key Required")
        );
        player.grant_item(&key).expect("inventory");
        assert!(chest.can_interact(&context).is_allowed());

        assert_eq!(Chest::new(Reach::default()).interaction_prompt(&context), "Hold E to Open Chest");
    }

    #[test]
    fn failed_grant_leaves_chest_unresolved() {
        let player = InteractorHandle::new(
            Interactor::new("ghost", Transform::default()).without_inventory(),
        );
        let mut chest = chest().with_hold_duration(1.0);
        chest.begin_interaction(&frame(&player, 0.0, PRESS));
        chest.update_interaction(&frame(&player, 1.0, HOLD));
        assert!(!chest.is_opened());
        assert_eq!(chest.state(), ChestState::Holding);
        assert_eq!(chest.current_hold_time(), 0.0);
        assert!(chest.can_interact(&frame(&player, 0.0, PRESS)).is_allowed());
    }

    #[test]
    fn empty_chest_still_opens() {
        let player = player_at(Vec3::ZERO);
        let mut chest = Chest::new(Reach::default()).with_hold_duration(0.1);
        chest.begin_interaction(&frame(&player, 0.0, PRESS));
        chest.update_interaction(&frame(&player, 0.2, HOLD));
        assert!(chest.is_opened());
        assert_eq!(player.borrow().inventory().map(|i| i.len()), Some(0));
    }

    #[test]
    fn hold_duration_is_clamped() {
        assert_eq!(chest().with_hold_duration(0.0).hold_duration(), MIN_HOLD_DURATION);
        assert_eq!(chest().with_hold_duration(60.0).hold_duration(), MAX_HOLD_DURATION);
        assert_eq!(
            chest().with_hold_duration(f32::NAN).hold_duration(),
            DEFAULT_HOLD_DURATION
        );
    }
}
