use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier used for item comparisons. Two definitions with the same
/// id are the same item as far as gating and inventory membership go.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Static description of a collectible item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemId,
    #[serde(default)]
    pub display_name: String,
}

impl ItemDefinition {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(id),
            display_name: display_name.into(),
        }
    }

    /// Name shown to the player, falling back to the id for unnamed items.
    pub fn display_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            self.id.as_str()
        } else {
            self.display_name.as_str()
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("item id must not be empty")]
    EmptyId,
    #[error("item `{0}` is defined more than once")]
    DuplicateItem(ItemId),
    #[error("unknown item `{0}`")]
    UnknownItem(String),
}

/// Read-only lookup of every item definition known to a scene.
#[derive(Debug, Default, Clone)]
pub struct ItemCatalog {
    items: BTreeMap<ItemId, ItemDefinition>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions<I>(definitions: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = ItemDefinition>,
    {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, definition: ItemDefinition) -> Result<(), CatalogError> {
        if definition.id.as_str().trim().is_empty() {
            return Err(CatalogError::EmptyId);
        }
        if self.items.contains_key(&definition.id) {
            return Err(CatalogError::DuplicateItem(definition.id));
        }
        self.items.insert(definition.id.clone(), definition);
        Ok(())
    }

    pub fn get(&self, id: &ItemId) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    pub fn resolve(&self, id: &str) -> Result<ItemDefinition, CatalogError> {
        self.items
            .get(&ItemId::new(id))
            .cloned()
            .ok_or_else(|| CatalogError::UnknownItem(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Runtime item store carried by an interactor. Membership is keyed by
/// [`ItemId`] so adding the same item twice keeps a single entry.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    ids: BTreeSet<ItemId>,
    acquired: Vec<ItemDefinition>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the item was not held before.
    pub fn add_item(&mut self, item: &ItemDefinition) -> bool {
        if !self.ids.insert(item.id.clone()) {
            log::debug!("inventory already holds {}", item.id);
            return false;
        }
        self.acquired.push(item.clone());
        log::info!("item added to inventory: {}", item.display_name());
        true
    }

    pub fn has_item(&self, id: &ItemId) -> bool {
        self.ids.contains(id)
    }

    /// Removes an item; used by collaborators that consume keys.
    pub fn remove_item(&mut self, id: &ItemId) -> bool {
        if !self.ids.remove(id) {
            return false;
        }
        self.acquired.retain(|item| &item.id != id);
        true
    }

    /// Items in acquisition order, for inventory panels.
    pub fn items(&self) -> &[ItemDefinition] {
        &self.acquired
    }

    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
