use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inventory::{Inventory, ItemDefinition, ItemId};

/// Position plus yaw/pitch in degrees. Yaw turns around +Y with yaw 0
/// facing +Z.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        Vec3::new(yaw.sin(), 0.0, yaw.cos())
    }

    pub fn right(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        Vec3::new(yaw.cos(), 0.0, -yaw.sin())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("interactor `{0}` has no inventory")]
pub struct MissingInventory(pub String);

/// The acting agent: its spatial frame and, optionally, an inventory.
#[derive(Debug, Clone)]
pub struct Interactor {
    name: String,
    transform: Transform,
    inventory: Option<Inventory>,
}

impl Interactor {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            inventory: Some(Inventory::new()),
        }
    }

    pub fn without_inventory(mut self) -> Self {
        self.inventory = None;
        self
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        self.inventory.as_ref()
    }

    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        self.inventory.as_mut()
    }
}

/// Shared handle to the interactor. Interaction contexts carry a clone so
/// capability implementations can inspect and update the interactor without
/// knowing who owns it.
#[derive(Debug, Clone)]
pub struct InteractorHandle {
    inner: Rc<RefCell<Interactor>>,
}

impl InteractorHandle {
    pub fn new(interactor: Interactor) -> Self {
        Self {
            inner: Rc::new(RefCell::new(interactor)),
        }
    }

    pub fn borrow(&self) -> Ref<'_, Interactor> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Interactor> {
        self.inner.borrow_mut()
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn position(&self) -> Vec3 {
        self.inner.borrow().position()
    }

    /// `None` when the interactor carries no inventory at all.
    pub fn has_item(&self, id: &ItemId) -> Option<bool> {
        self.inner
            .borrow()
            .inventory
            .as_ref()
            .map(|inventory| inventory.has_item(id))
    }

    pub fn grant_item(&self, item: &ItemDefinition) -> Result<bool, MissingInventory> {
        let mut interactor = self.inner.borrow_mut();
        let name = interactor.name.clone();
        let inventory = interactor
            .inventory
            .as_mut()
            .ok_or(MissingInventory(name))?;
        Ok(inventory.add_item(item))
    }

    pub fn ptr_eq(&self, other: &InteractorHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
