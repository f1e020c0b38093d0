use serde::{Deserialize, Serialize};

use super::require_key;
use crate::context::InteractionContext;
use crate::interactable::{Interactable, Openable, Permission, Reach};
use crate::inventory::ItemDefinition;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorOpenMode {
    #[default]
    DirectInteraction,
    /// Only something else (a switch) may open the door.
    ExternalTrigger,
}

pub const DEFAULT_OPEN_YAW: f32 = 90.0;

/// Toggle door. Direct interaction and [`Openable::set_open_state`] share
/// the same `is_open` flag.
#[derive(Debug, Clone)]
pub struct Door {
    reach: Reach,
    mode: DoorOpenMode,
    required_key: Option<ItemDefinition>,
    closed_yaw: f32,
    open_yaw: f32,
    is_open: bool,
}

impl Door {
    pub fn new(reach: Reach) -> Self {
        Self {
            reach,
            mode: DoorOpenMode::DirectInteraction,
            required_key: None,
            closed_yaw: 0.0,
            open_yaw: DEFAULT_OPEN_YAW,
            is_open: false,
        }
    }

    pub fn with_mode(mut self, mode: DoorOpenMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_required_key(mut self, key: ItemDefinition) -> Self {
        self.required_key = Some(key);
        self
    }

    pub fn with_rotation(mut self, closed_yaw: f32, open_yaw: f32) -> Self {
        self.closed_yaw = closed_yaw;
        self.open_yaw = open_yaw;
        self
    }

    pub fn mode(&self) -> DoorOpenMode {
        self.mode
    }

    /// Current yaw in degrees.
    pub fn yaw(&self) -> f32 {
        if self.is_open {
            self.open_yaw
        } else {
            self.closed_yaw
        }
    }
}

impl Openable for Door {
    fn is_open(&self) -> bool {
        self.is_open
    }

    fn set_open_state(&mut self, open: bool) -> bool {
        if self.is_open == open {
            return false;
        }
        self.is_open = open;
        log::info!(
            "door {} (yaw {:.1})",
            if open { "opened" } else { "closed" },
            self.yaw()
        );
        true
    }
}

impl Interactable for Door {
    fn reach(&self) -> &Reach {
        &self.reach
    }

    fn can_interact(&self, context: &InteractionContext) -> Permission {
        if self.mode == DoorOpenMode::ExternalTrigger {
            return Permission::denied("Use the switch");
        }
        // Closing an open door never needs the key.
        if self.is_open {
            return Permission::Allowed;
        }
        require_key(context, self.required_key.as_ref())
    }

    fn interaction_prompt(&self, _context: &InteractionContext) -> String {
        if self.mode == DoorOpenMode::ExternalTrigger {
            return String::new();
        }
        if self.is_open {
            "Press E to Close".to_string()
        } else {
            "Press E to Open".to_string()
        }
    }

    fn begin_interaction(&mut self, _context: &InteractionContext) {
        let open = !self.is_open;
        self.set_open_state(open);
    }

    fn openable(&self) -> Option<&dyn Openable> {
        Some(self as &dyn Openable)
    }

    fn openable_mut(&mut self) -> Option<&mut dyn Openable> {
        Some(self as &mut dyn Openable)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::testing::{frame, player_at, PRESS};

    fn key() -> ItemDefinition {
        ItemDefinition::new("iron_key", "Iron Key")
    }

    #[test]
    fn direct_door_toggles_and_rotates() {
        let player = player_at(Vec3::ZERO);
        let context = frame(&player, 0.0, PRESS);
        let mut door = Door::new(Reach::default());

        assert_eq!(door.interaction_prompt(&context), "Press E to Open");
        door.begin_interaction(&context);
        assert!(door.is_open());
        assert_eq!(door.yaw(), DEFAULT_OPEN_YAW);
        assert_eq!(door.interaction_prompt(&context), "Press E to Close");

        door.begin_interaction(&context);
        assert!(!door.is_open());
        assert_eq!(door.yaw(), 0.0);
    }

    #[test]
    fn locked_door_names_the_missing_key() {
        let player = player_at(Vec3::ZERO);
        let context = frame(&player, 0.0, PRESS);
        let door = Door::new(Reach::default()).with_required_key(key());

        assert_eq!(
            door.can_interact(&context),
            Permission::denied("Iron Key Required")
        );
        player.grant_item(&key()).expect("inventory");
        assert!(door.can_interact(&context).is_allowed());
    }

    #[test]
    fn open_locked_door_can_be_closed_without_key() {
        let player = player_at(Vec3::ZERO);
        let context = frame(&player, 0.0, PRESS);
        let mut door = Door::new(Reach::default()).with_required_key(key());
        door.set_open_state(true);
        assert!(door.can_interact(&context).is_allowed());
    }

    #[test]
    fn external_trigger_door_steers_to_switch() {
        let player = player_at(Vec3::ZERO);
        let context = frame(&player, 0.0, PRESS);
        let mut door = Door::new(Reach::default()).with_mode(DoorOpenMode::ExternalTrigger);

        assert_eq!(door.can_interact(&context), Permission::denied("Use the switch"));
        assert_eq!(door.interaction_prompt(&context), "");

        assert!(door.set_open_state(true));
        assert!(!door.set_open_state(true));
        assert!(door.is_open());
        assert_eq!(door.can_interact(&context), Permission::denied("Use the switch"));
    }

    #[test]
    fn contract_and_external_channel_agree() {
        let player = player_at(Vec3::ZERO);
        let context = frame(&player, 0.0, PRESS);
        let mut door = Door::new(Reach::default()).with_rotation(180.0, 270.0);

        door.openable_mut().expect("openable").set_open_state(true);
        assert_eq!(door.interaction_prompt(&context), "Press E to Close");
        assert_eq!(door.yaw(), 270.0);
        assert_eq!(door.openable().map(|o| o.is_open()), Some(true));
    }
}
