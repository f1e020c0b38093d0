//! Concrete interactables: instant pickups, toggles and hold-to-complete
//! containers.

mod chest;
mod door;
mod pickup;
mod switch;

pub use chest::{Chest, ChestState, DEFAULT_HOLD_DURATION, MAX_HOLD_DURATION, MIN_HOLD_DURATION};
pub use door::{Door, DoorOpenMode, DEFAULT_OPEN_YAW};
pub use pickup::KeyPickup;
pub use switch::Switch;

use crate::context::InteractionContext;
use crate::interactable::Permission;
use crate::inventory::ItemDefinition;

/// Allows the interaction only when the interactor holds `key`. An
/// interactor without an inventory never holds anything.
fn require_key(context: &InteractionContext, key: Option<&ItemDefinition>) -> Permission {
    let Some(key) = key else {
        return Permission::Allowed;
    };
    match context.interactor().has_item(&key.id) {
        Some(true) => Permission::Allowed,
        _ => Permission::denied(format!("{} Required", key.display_name())),
    }
}
