use std::fs;

use anyhow::{Context, Result};
use interact_core::{
    apply_locomotion, CommandOutcome, CommandSender, ControllerEvent, InteractionContext,
    InteractionController, InteractionDetector, InteractorHandle, KeySampler, LocomotionConfig,
    ObjectHandle, PromptPresenter, PromptView, World, WorldCommand,
};
use serde::Serialize;

use crate::cli::RunArgs;
use crate::scene::{SceneDefinition, SceneSetup};
use crate::script::{InputScript, InputStep};

pub fn execute(args: RunArgs) -> Result<()> {
    let RunArgs {
        scene,
        script,
        event_log_json,
        frame_dt,
        verbose,
    } = args;

    let scene = match scene.as_ref() {
        Some(path) => SceneDefinition::from_json_file(path)?,
        None => SceneDefinition::demo(),
    };
    let script = match script.as_ref() {
        Some(path) => InputScript::from_json_file(path)?,
        None => InputScript::demo(),
    };
    if let Some(path) = event_log_json.as_ref() {
        eprintln!(
            "[interact_sim] info: capturing interaction events to {}",
            path.display()
        );
    }

    let mut simulation = Simulation::new(&scene)?;
    log::info!(
        "running {} steps ({} frames at {frame_dt}s)",
        script.steps.len(),
        script.total_frames()
    );
    simulation.run(&script, frame_dt)?;
    let report = simulation.report();

    for event in &report.events {
        println!("{:>5} {}", event.frame, event.label);
    }
    println!(
        "\nRan {} frames ({} detector scans), {} events",
        report.frames,
        report.scans,
        report.events.len()
    );
    println!("Inventory: [{}]", report.inventory.join(", "));
    if verbose {
        println!("\nObjects:");
        for object in &report.objects {
            describe_object(object);
        }
        println!("Commands applied: {}", report.commands.len());
    }

    if let Some(path) = event_log_json.as_ref() {
        let json = serde_json::to_string_pretty(&report)
            .context("serializing interaction event log to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing interaction event log to {}", path.display()))?;
        println!("Saved interaction event log to {}", path.display());
    }

    Ok(())
}

fn describe_object(object: &ObjectSummary) {
    let mut flags = Vec::new();
    if !object.interactable {
        flags.push("prop".to_string());
    } else if !object.active {
        flags.push("inactive".to_string());
    }
    if let Some(open) = object.open {
        flags.push(if open { "open" } else { "closed" }.to_string());
    }
    if let Some(progress) = object.hold_progress {
        flags.push(format!("progress {progress:.2}"));
    }
    println!("  - {} [{}]", object.name, flags.join(", "));
}

#[derive(Debug, Clone, Serialize)]
pub struct EventLogEntry {
    pub sequence: usize,
    pub frame: u32,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectSummary {
    pub name: String,
    pub interactable: bool,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_progress: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub frames: u32,
    pub scans: u64,
    pub events: Vec<EventLogEntry>,
    pub inventory: Vec<String>,
    pub objects: Vec<ObjectSummary>,
    pub commands: Vec<WorldCommand>,
    pub final_prompt: PromptView,
}

/// Fixed-step host driving every interaction system in a set order each
/// frame: locomotion, input edges, detector, controller, world commands,
/// prompt.
pub struct Simulation {
    world: World,
    interactor: InteractorHandle,
    commands: CommandSender,
    detector: InteractionDetector,
    controller: InteractionController,
    presenter: PromptPresenter,
    locomotion: LocomotionConfig,
    sampler: KeySampler,
    frame: u32,
    clock: f64,
    candidate: Option<ObjectHandle>,
    /// Name of the active object, kept so a despawned target can still be
    /// named when its interaction is cancelled.
    active_name: Option<String>,
    prompt: PromptView,
    events: Vec<EventLogEntry>,
    /// Every command drained from the queue, in order.
    drained: Vec<WorldCommand>,
}

impl Simulation {
    pub fn new(scene: &SceneDefinition) -> Result<Self> {
        let SceneSetup {
            world,
            interactor,
            commands,
        } = scene.build()?;
        Ok(Self {
            world,
            interactor,
            commands,
            detector: InteractionDetector::new(scene.detector),
            controller: InteractionController::new(scene.controller),
            presenter: PromptPresenter::new(scene.presenter),
            locomotion: scene.locomotion,
            sampler: KeySampler::new(),
            frame: 0,
            clock: 0.0,
            candidate: None,
            active_name: None,
            prompt: PromptView::default(),
            events: Vec::new(),
            drained: Vec::new(),
        })
    }

    pub fn run(&mut self, script: &InputScript, frame_dt: f32) -> Result<()> {
        for step in &script.steps {
            self.begin_step(step);
            for _ in 0..step.frames {
                self.tick(step, frame_dt)?;
            }
        }
        Ok(())
    }

    fn begin_step(&mut self, step: &InputStep) {
        if let Some(label) = step.label.as_deref() {
            self.log_event(format!("script.step {label}"));
        }
        if let Some(position) = step.teleport {
            self.interactor.borrow_mut().transform_mut().position = position;
        }
        for name in &step.despawn {
            let Some(handle) = self.world.lookup(name) else {
                log::warn!("script despawns unknown object `{name}`");
                continue;
            };
            self.world.despawn(handle);
            self.log_event(format!("world.despawn {name}"));
        }
    }

    pub fn tick(&mut self, step: &InputStep, delta_time: f32) -> Result<()> {
        apply_locomotion(
            self.interactor.borrow_mut().transform_mut(),
            &step.movement,
            &self.locomotion,
            delta_time,
        );

        let input = self.sampler.sample(step.interact);
        let context = InteractionContext::new(self.interactor.clone(), delta_time, input)
            .with_context(|| format!("building interaction context for frame {}", self.frame))?;

        self.detector
            .tick(self.clock, context.interactor_position(), &self.world);
        let detected = self.detector.current_candidate();
        if detected != self.candidate {
            self.candidate = detected;
            let label = detected
                .and_then(|handle| self.world.name_of(handle))
                .unwrap_or("<none>")
                .to_string();
            self.log_event(format!("detector.candidate {label}"));
        }

        let inventory_before = self.inventory_len();
        let doors_before = self.open_states();

        if let Some(event) = self.controller.tick(&context, detected, &mut self.world) {
            self.record_controller_event(&event);
        }
        self.drain_commands();

        self.record_inventory_changes(inventory_before);
        self.record_door_changes(&doors_before);

        let position = context.interactor_position();
        let focus = self.controller.active().or_else(|| {
            detected.filter(|&handle| self.controller.accepts(handle, position, &self.world))
        });
        let view = self.presenter.refresh(&context, focus, &self.world);
        if view.text != self.prompt.text {
            if view.is_hidden() {
                self.log_event("prompt.hide");
            } else {
                self.log_event(format!("prompt.show \"{}\"", view.text));
            }
        }
        self.prompt = view;

        self.frame = self
            .frame
            .checked_add(1)
            .context("frame counter overflowed")?;
        self.clock += f64::from(delta_time);
        Ok(())
    }

    fn record_controller_event(&mut self, event: &ControllerEvent) {
        let name = self
            .world
            .name_of(event.handle())
            .map(str::to_string)
            .unwrap_or_else(|| event.handle().to_string());
        match event {
            ControllerEvent::Began { .. } => {
                self.log_event(format!("interaction.begin {name}"));
                self.active_name = Some(name);
            }
            ControllerEvent::Denied { reason, .. } => {
                self.presenter.show_failure(reason);
                self.log_event(format!("interaction.denied {name}: {reason}"));
            }
            ControllerEvent::Updated { .. } => {}
            ControllerEvent::Ended { .. } => {
                let name = self.active_name.take().unwrap_or(name);
                self.log_event(format!("interaction.end {name}"));
            }
            ControllerEvent::Cancelled { .. } => {
                let name = self.active_name.take().unwrap_or(name);
                self.log_event(format!("interaction.cancel {name}"));
            }
        }
    }

    fn drain_commands(&mut self) {
        while let Some(command) = self.commands.next() {
            match self.world.apply_command(&command) {
                CommandOutcome::Applied | CommandOutcome::Unchanged => {}
                CommandOutcome::UnknownTarget | CommandOutcome::Unsupported => {
                    self.log_event(format!("command.rejected {}", command.target()));
                }
            }
            self.drained.push(command);
        }
    }

    fn inventory_len(&self) -> usize {
        self.interactor
            .borrow()
            .inventory()
            .map(|inventory| inventory.len())
            .unwrap_or(0)
    }

    fn record_inventory_changes(&mut self, before: usize) {
        let added: Vec<String> = self
            .interactor
            .borrow()
            .inventory()
            .map(|inventory| {
                inventory
                    .items()
                    .iter()
                    .skip(before)
                    .map(|item| item.id.to_string())
                    .collect()
            })
            .unwrap_or_default();
        for id in added {
            self.log_event(format!("inventory.add {id}"));
        }
    }

    fn open_states(&self) -> Vec<(ObjectHandle, bool)> {
        self.world
            .iter()
            .filter_map(|(handle, object)| {
                let openable = object.interactable()?.openable()?;
                Some((handle, openable.is_open()))
            })
            .collect()
    }

    fn record_door_changes(&mut self, before: &[(ObjectHandle, bool)]) {
        let changes: Vec<String> = before
            .iter()
            .filter_map(|(handle, was_open)| {
                let object = self.world.get(*handle)?;
                let is_open = object.interactable()?.openable()?.is_open();
                (is_open != *was_open).then(|| {
                    format!(
                        "door.state {} {}",
                        object.name(),
                        if is_open { "open" } else { "closed" }
                    )
                })
            })
            .collect();
        for change in changes {
            self.log_event(change);
        }
    }

    fn log_event(&mut self, label: impl Into<String>) {
        let label = label.into();
        log::debug!("frame {}: {label}", self.frame);
        self.events.push(EventLogEntry {
            sequence: self.events.len(),
            frame: self.frame,
            label,
        });
    }

    pub fn events(&self) -> &[EventLogEntry] {
        &self.events
    }

    pub fn report(&self) -> SimulationReport {
        let objects = self
            .world
            .iter()
            .map(|(_, object)| {
                let interactable = object.interactable();
                ObjectSummary {
                    name: object.name().to_string(),
                    interactable: interactable.is_some(),
                    active: object.is_active(),
                    open: interactable
                        .and_then(|i| i.openable())
                        .map(|openable| openable.is_open()),
                    hold_progress: interactable
                        .and_then(|i| i.hold_progress())
                        .map(|progress| progress.normalized()),
                }
            })
            .collect();
        let inventory = self
            .interactor
            .borrow()
            .inventory()
            .map(|inventory| {
                inventory
                    .items()
                    .iter()
                    .map(|item| item.id.to_string())
                    .collect()
            })
            .unwrap_or_default();

        SimulationReport {
            frames: self.frame,
            scans: self.detector.scan_count(),
            events: self.events().to_vec(),
            inventory,
            objects,
            commands: self.drained.clone(),
            final_prompt: self.prompt.clone(),
        }
    }
}
