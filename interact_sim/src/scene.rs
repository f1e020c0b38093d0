use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::Vec3;
use interact_core::interactables::{
    Chest, Door, DoorOpenMode, KeyPickup, Switch, DEFAULT_HOLD_DURATION, DEFAULT_OPEN_YAW,
};
use interact_core::{
    CommandSender, ControllerConfig, DetectorConfig, Interactor, InteractorHandle, ItemCatalog,
    ItemDefinition, LocomotionConfig, PresenterConfig, Reach, Transform, World, WorldObject,
};
use serde::Deserialize;

/// Everything needed to populate a world, as read from a scene JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneDefinition {
    pub items: Vec<ItemDefinition>,
    pub interactor: InteractorDefinition,
    pub detector: DetectorConfig,
    pub controller: ControllerConfig,
    pub locomotion: LocomotionConfig,
    pub presenter: PresenterConfig,
    pub objects: Vec<ObjectDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InteractorDefinition {
    pub name: String,
    pub transform: Transform,
    pub has_inventory: bool,
    pub starting_items: Vec<String>,
}

impl Default for InteractorDefinition {
    fn default() -> Self {
        Self {
            name: "player".to_string(),
            transform: Transform::default(),
            has_inventory: true,
            starting_items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDefinition {
    pub name: String,
    pub position: Vec3,
    #[serde(default)]
    pub bounds_radius: Option<f32>,
    #[serde(default)]
    pub reach: Reach,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectKind {
    KeyPickup {
        #[serde(default)]
        item: Option<String>,
    },
    Door {
        #[serde(default)]
        mode: DoorOpenMode,
        #[serde(default)]
        required_key: Option<String>,
        #[serde(default)]
        closed_yaw: f32,
        #[serde(default = "default_open_yaw")]
        open_yaw: f32,
    },
    Switch {
        #[serde(default)]
        targets: Vec<String>,
    },
    Chest {
        #[serde(default)]
        required_key: Option<String>,
        #[serde(default)]
        contained_item: Option<String>,
        #[serde(default = "default_hold_duration")]
        hold_duration: f32,
    },
    /// Plain collider with no interaction.
    Prop,
}

fn default_open_yaw() -> f32 {
    DEFAULT_OPEN_YAW
}

fn default_hold_duration() -> f32 {
    DEFAULT_HOLD_DURATION
}

/// A populated world plus the handles the tick loop needs alongside it.
pub struct SceneSetup {
    pub world: World,
    pub interactor: InteractorHandle,
    pub commands: CommandSender,
}

impl SceneDefinition {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading scene from {}", path.display()))?;
        let scene: SceneDefinition = serde_json::from_str(&data)
            .with_context(|| format!("parsing scene JSON from {}", path.display()))?;
        Ok(scene)
    }

    pub fn build(&self) -> Result<SceneSetup> {
        self.detector
            .validate()
            .context("invalid detector settings in scene")?;
        let catalog = ItemCatalog::from_definitions(self.items.iter().cloned())
            .context("building item catalog")?;
        let resolve = |id: &Option<String>, owner: &str| -> Result<Option<ItemDefinition>> {
            id.as_deref()
                .map(|id| {
                    catalog
                        .resolve(id)
                        .with_context(|| format!("resolving item for `{owner}`"))
                })
                .transpose()
        };

        let mut interactor = Interactor::new(self.interactor.name.clone(), self.interactor.transform);
        if !self.interactor.has_inventory {
            if !self.interactor.starting_items.is_empty() {
                bail!(
                    "interactor `{}` has starting items but no inventory",
                    self.interactor.name
                );
            }
            interactor = interactor.without_inventory();
        }
        if let Some(inventory) = interactor.inventory_mut() {
            for id in &self.interactor.starting_items {
                let item = catalog
                    .resolve(id)
                    .with_context(|| format!("resolving starting item for `{}`", self.interactor.name))?;
                inventory.add_item(&item);
            }
        }

        let commands = CommandSender::new();
        let mut world = World::new();
        for object in &self.objects {
            let mut placed = WorldObject::new(object.name.clone(), object.position);
            if let Some(radius) = object.bounds_radius {
                placed = placed.with_bounds_radius(radius);
            }
            let reach = object.reach;
            placed = match &object.kind {
                ObjectKind::KeyPickup { item } => {
                    placed.with_interactable(KeyPickup::new(reach, resolve(item, &object.name)?))
                }
                ObjectKind::Door {
                    mode,
                    required_key,
                    closed_yaw,
                    open_yaw,
                } => {
                    let mut door = Door::new(reach)
                        .with_mode(*mode)
                        .with_rotation(*closed_yaw, *open_yaw);
                    if let Some(key) = resolve(required_key, &object.name)? {
                        door = door.with_required_key(key);
                    }
                    placed.with_interactable(door)
                }
                ObjectKind::Switch { targets } => placed.with_interactable(
                    Switch::new(reach).linked_to(commands.clone(), targets.iter().cloned()),
                ),
                ObjectKind::Chest {
                    required_key,
                    contained_item,
                    hold_duration,
                } => {
                    let mut chest = Chest::new(reach).with_hold_duration(*hold_duration);
                    if let Some(key) = resolve(required_key, &object.name)? {
                        chest = chest.with_required_key(key);
                    }
                    if let Some(item) = resolve(contained_item, &object.name)? {
                        chest = chest.with_contained_item(item);
                    }
                    placed.with_interactable(chest)
                }
                ObjectKind::Prop => placed,
            };
            world
                .spawn(placed)
                .with_context(|| format!("spawning `{}`", object.name))?;
        }

        self.check_switch_targets(&world)?;

        log::info!(
            "scene ready: {} objects, {} catalog items",
            world.len(),
            catalog.len()
        );
        Ok(SceneSetup {
            world,
            interactor: InteractorHandle::new(interactor),
            commands,
        })
    }

    fn check_switch_targets(&self, world: &World) -> Result<()> {
        for object in &self.objects {
            let ObjectKind::Switch { targets } = &object.kind else {
                continue;
            };
            for target in targets {
                let Some(handle) = world.lookup(target) else {
                    bail!("switch `{}` targets unknown object `{target}`", object.name);
                };
                let openable = world
                    .interactable(handle)
                    .and_then(|interactable| interactable.openable())
                    .is_some();
                if !openable {
                    bail!(
                        "switch `{}` targets `{target}`, which cannot be opened",
                        object.name
                    );
                }
            }
        }
        Ok(())
    }

    /// Built-in scene: a key pickup, a key-locked chest, a plain door, a
    /// switch-driven gate and a chest that gets removed mid-hold, spread
    /// far enough apart that only one group is ever in detection range.
    pub fn demo() -> Self {
        let object = |name: &str, position: Vec3, kind: ObjectKind| ObjectDefinition {
            name: name.to_string(),
            position,
            bounds_radius: None,
            reach: Reach::default(),
            kind,
        };

        Self {
            items: vec![
                ItemDefinition::new("brass_key", "Brass Key"),
                ItemDefinition::new("gold_coin", "Gold Coin"),
            ],
            interactor: InteractorDefinition::default(),
            detector: DetectorConfig::default(),
            controller: ControllerConfig::default(),
            locomotion: LocomotionConfig::default(),
            presenter: PresenterConfig::default(),
            objects: vec![
                object(
                    "brass_key",
                    Vec3::new(0.0, 0.0, 1.5),
                    ObjectKind::KeyPickup {
                        item: Some("brass_key".to_string()),
                    },
                ),
                object(
                    "treasure_chest",
                    Vec3::new(10.0, 0.0, 1.5),
                    ObjectKind::Chest {
                        required_key: Some("brass_key".to_string()),
                        contained_item: Some("gold_coin".to_string()),
                        hold_duration: 1.0,
                    },
                ),
                object(
                    "cellar_door",
                    Vec3::new(20.0, 0.0, 1.5),
                    ObjectKind::Door {
                        mode: DoorOpenMode::DirectInteraction,
                        required_key: None,
                        closed_yaw: 0.0,
                        open_yaw: DEFAULT_OPEN_YAW,
                    },
                ),
                object(
                    "gate",
                    Vec3::new(30.0, 0.0, 1.5),
                    ObjectKind::Door {
                        mode: DoorOpenMode::ExternalTrigger,
                        required_key: None,
                        closed_yaw: 0.0,
                        open_yaw: DEFAULT_OPEN_YAW,
                    },
                ),
                object(
                    "lever",
                    Vec3::new(30.0, 0.0, -1.8),
                    ObjectKind::Switch {
                        targets: vec!["gate".to_string()],
                    },
                ),
                object(
                    "supply_crate",
                    Vec3::new(40.0, 0.0, 1.5),
                    ObjectKind::Chest {
                        required_key: None,
                        contained_item: None,
                        hold_duration: 2.0,
                    },
                ),
                object("barrel", Vec3::new(50.0, 0.0, 0.0), ObjectKind::Prop),
            ],
        }
    }
}
