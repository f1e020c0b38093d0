//! Proximity-based interaction for first-person scenes.
//!
//! A throttled [`detector::InteractionDetector`] picks the nearest usable
//! object, an [`controller::InteractionController`] turns key edges into
//! begin/update/end calls on it, and [`presenter::PromptPresenter`] derives
//! the on-screen prompt. Objects live in a [`world::World`] behind
//! generation-checked handles.

pub mod commands;
pub mod context;
pub mod controller;
pub mod detector;
pub mod interactable;
pub mod interactables;
pub mod interactor;
pub mod inventory;
pub mod locomotion;
pub mod presenter;
pub mod world;

#[cfg(test)]
mod testing;

pub use commands::{CommandQueue, CommandSender, WorldCommand};
pub use context::{ContextError, InputEdges, InteractionContext, KeySampler};
pub use controller::{ControllerConfig, ControllerEvent, ControllerState, InteractionController};
pub use detector::{Detection, DetectorConfig, DetectorConfigError, InteractionDetector};
pub use interactable::{HoldProgress, Interactable, Openable, Permission, Reach};
pub use interactor::{Interactor, InteractorHandle, MissingInventory, Transform};
pub use inventory::{CatalogError, Inventory, ItemCatalog, ItemDefinition, ItemId};
pub use locomotion::{apply_locomotion, LocomotionConfig, LocomotionInput};
pub use presenter::{PresenterConfig, PromptPresenter, PromptView};
pub use world::{CommandOutcome, ObjectHandle, World, WorldError, WorldObject};
