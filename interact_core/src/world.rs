use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::Serialize;
use thiserror::Error;

use crate::commands::WorldCommand;
use crate::interactable::Interactable;

pub const DEFAULT_BOUNDS_RADIUS: f32 = 0.5;

/// Generation-checked reference to a world object. A handle outlives the
/// object it names; lookups through a stale handle simply return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectHandle {
    index: u32,
    generation: u32,
}

impl ObjectHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorldError {
    #[error("object name must not be empty")]
    EmptyName,
    #[error("object `{0}` already exists")]
    DuplicateName(String),
    #[error("object `{name}` has invalid interaction range {range}")]
    InvalidRange { name: String, range: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Unchanged,
    UnknownTarget,
    Unsupported,
}

/// A named object placed in the world. Objects without an interactable are
/// still colliders and take up overlap slots.
#[derive(Debug)]
pub struct WorldObject {
    name: String,
    position: Vec3,
    bounds_radius: f32,
    interactable: Option<Box<dyn Interactable>>,
}

impl WorldObject {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            bounds_radius: DEFAULT_BOUNDS_RADIUS,
            interactable: None,
        }
    }

    pub fn with_bounds_radius(mut self, radius: f32) -> Self {
        self.bounds_radius = radius.max(0.0);
        self
    }

    pub fn with_interactable<I>(mut self, interactable: I) -> Self
    where
        I: Interactable + 'static,
    {
        self.interactable = Some(Box::new(interactable));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn bounds_radius(&self) -> f32 {
        self.bounds_radius
    }

    pub fn interactable(&self) -> Option<&dyn Interactable> {
        self.interactable.as_deref()
    }

    pub fn interactable_mut(&mut self) -> Option<&mut (dyn Interactable + 'static)> {
        self.interactable.as_deref_mut()
    }

    pub fn is_active(&self) -> bool {
        self.interactable
            .as_ref()
            .map(|interactable| interactable.is_active())
            .unwrap_or(true)
    }

    /// Point used for distance checks: the interactable's own point when it
    /// sets one, otherwise the object position.
    pub fn interaction_point(&self) -> Vec3 {
        self.interactable
            .as_ref()
            .and_then(|interactable| interactable.interaction_point())
            .unwrap_or(self.position)
    }

    /// Squared distance from `origin` to the interaction point when the
    /// object is interactable and within its own range.
    pub fn reach_distance_squared(&self, origin: Vec3) -> Option<f32> {
        let interactable = self.interactable.as_ref()?;
        let range = interactable.max_interaction_range();
        let distance_squared = self.interaction_point().distance_squared(origin);
        if distance_squared > range * range {
            return None;
        }
        Some(distance_squared)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    object: Option<WorldObject>,
}

/// Owns every world object. Iteration and overlap queries visit slots in
/// index order, which is the scan order the detector relies on for ties.
#[derive(Debug, Default)]
pub struct World {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_name: BTreeMap<String, ObjectHandle>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, object: WorldObject) -> Result<ObjectHandle, WorldError> {
        if object.name.trim().is_empty() {
            return Err(WorldError::EmptyName);
        }
        if self.by_name.contains_key(&object.name) {
            return Err(WorldError::DuplicateName(object.name));
        }
        if let Some(interactable) = object.interactable.as_ref() {
            let range = interactable.max_interaction_range();
            if !(range.is_finite() && range > 0.0) {
                return Err(WorldError::InvalidRange {
                    name: object.name,
                    range,
                });
            }
        }

        let name = object.name.clone();
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(object);
                ObjectHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    object: Some(object),
                });
                ObjectHandle {
                    index,
                    generation: 0,
                }
            }
        };
        log::debug!("spawned {name} as {handle}");
        self.by_name.insert(name, handle);
        Ok(handle)
    }

    /// Destroys the object. Every outstanding handle to it goes stale.
    pub fn despawn(&mut self, handle: ObjectHandle) -> Option<WorldObject> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.by_name.remove(&object.name);
        log::debug!("despawned {} ({handle})", object.name);
        Some(object)
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&WorldObject> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.object.as_ref()
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut WorldObject> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.object.as_mut()
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn lookup(&self, name: &str) -> Option<ObjectHandle> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, handle: ObjectHandle) -> Option<&str> {
        self.get(handle).map(WorldObject::name)
    }

    pub fn interactable(&self, handle: ObjectHandle) -> Option<&dyn Interactable> {
        self.get(handle)?.interactable()
    }

    pub fn interactable_mut(
        &mut self,
        handle: ObjectHandle,
    ) -> Option<&mut (dyn Interactable + 'static)> {
        self.get_mut(handle)?.interactable_mut()
    }

    /// Live, active and interactable.
    pub fn is_available(&self, handle: ObjectHandle) -> bool {
        self.get(handle)
            .map(|object| object.interactable.is_some() && object.is_active())
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectHandle, &WorldObject)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.object.as_ref().map(|object| {
                (
                    ObjectHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    object,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Collects active objects whose bounding sphere intersects the query
    /// sphere. `results` is cleared first and never grows past `max_results`;
    /// extra hits are dropped.
    pub fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        results: &mut Vec<ObjectHandle>,
        max_results: usize,
    ) -> usize {
        results.clear();
        for (handle, object) in self.iter() {
            if results.len() >= max_results {
                break;
            }
            if !object.is_active() {
                continue;
            }
            let reach = radius + object.bounds_radius;
            if reach >= 0.0 && object.position.distance_squared(center) <= reach * reach {
                results.push(handle);
            }
        }
        results.len()
    }

    pub fn apply_command(&mut self, command: &WorldCommand) -> CommandOutcome {
        match command {
            WorldCommand::SetOpenState { target, open } => {
                let Some(handle) = self.lookup(target) else {
                    log::warn!("open-state command for unknown object `{target}`");
                    return CommandOutcome::UnknownTarget;
                };
                let Some(openable) = self
                    .interactable_mut(handle)
                    .and_then(|interactable| interactable.openable_mut())
                else {
                    log::warn!("object `{target}` cannot be opened externally");
                    return CommandOutcome::Unsupported;
                };
                if openable.set_open_state(*open) {
                    CommandOutcome::Applied
                } else {
                    CommandOutcome::Unchanged
                }
            }
        }
    }
}
