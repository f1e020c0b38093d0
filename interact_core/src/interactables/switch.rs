use crate::commands::{CommandSender, WorldCommand};
use crate::context::InteractionContext;
use crate::interactable::{Interactable, Permission, Reach};

/// Lever that flips on each press and drives its linked objects' open state
/// through the command channel.
#[derive(Debug, Clone)]
pub struct Switch {
    reach: Reach,
    is_on: bool,
    targets: Vec<String>,
    commands: Option<CommandSender>,
}

impl Switch {
    pub fn new(reach: Reach) -> Self {
        Self {
            reach,
            is_on: false,
            targets: Vec::new(),
            commands: None,
        }
    }

    pub fn linked_to<I, S>(mut self, commands: CommandSender, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands = Some(commands);
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    fn toggle(&mut self) {
        self.is_on = !self.is_on;
        log::info!("switch turned {}", if self.is_on { "on" } else { "off" });
        let Some(commands) = self.commands.as_ref() else {
            return;
        };
        for target in &self.targets {
            commands.send(WorldCommand::SetOpenState {
                target: target.clone(),
                open: self.is_on,
            });
        }
    }
}

impl Interactable for Switch {
    fn reach(&self) -> &Reach {
        &self.reach
    }

    fn can_interact(&self, _context: &InteractionContext) -> Permission {
        Permission::Allowed
    }

    fn interaction_prompt(&self, _context: &InteractionContext) -> String {
        if self.is_on {
            "Press E to Turn Off".to_string()
        } else {
            "Press E to Turn On".to_string()
        }
    }

    fn begin_interaction(&mut self, _context: &InteractionContext) {
        self.toggle();
    }
}
