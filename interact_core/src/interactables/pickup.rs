use crate::context::InteractionContext;
use crate::interactable::{Interactable, Permission, Reach};
use crate::inventory::ItemDefinition;

/// Instant pickup: the first successful interaction grants the item and
/// removes the object from play.
#[derive(Debug, Clone)]
pub struct KeyPickup {
    reach: Reach,
    item: Option<ItemDefinition>,
    collected: bool,
}

impl KeyPickup {
    pub fn new(reach: Reach, item: Option<ItemDefinition>) -> Self {
        Self {
            reach,
            item,
            collected: false,
        }
    }

    pub fn item(&self) -> Option<&ItemDefinition> {
        self.item.as_ref()
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }
}

impl Interactable for KeyPickup {
    fn reach(&self) -> &Reach {
        &self.reach
    }

    fn can_interact(&self, _context: &InteractionContext) -> Permission {
        if self.collected {
            return Permission::denied("Already picked up");
        }
        Permission::Allowed
    }

    fn interaction_prompt(&self, _context: &InteractionContext) -> String {
        if self.collected {
            return String::new();
        }
        "Press E to Pick Up".to_string()
    }

    fn begin_interaction(&mut self, context: &InteractionContext) {
        if self.collected {
            return;
        }
        let Some(item) = self.item.as_ref() else {
            log::error!("key pickup has no item assigned; nothing to grant");
            return;
        };
        match context.interactor().grant_item(item) {
            Ok(_) => {
                self.collected = true;
                log::info!("picked up {}", item.display_name());
            }
            Err(err) => log::warn!("{err}; leaving {} in place", item.display_name()),
        }
    }

    fn is_active(&self) -> bool {
        !self.collected
    }
}
