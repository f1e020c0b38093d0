use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::Serialize;

/// Requests one world object makes of another outside the interaction
/// lifecycle, e.g. a switch opening a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorldCommand {
    SetOpenState { target: String, open: bool },
}

impl WorldCommand {
    pub fn target(&self) -> &str {
        match self {
            WorldCommand::SetOpenState { target, .. } => target.as_str(),
        }
    }
}

/// Commands in submission order. Handed-out commands are not retained;
/// hosts that want a record keep their own.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CommandQueue {
    pending: VecDeque<WorldCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: WorldCommand) {
        self.pending.push_back(command);
    }

    pub fn next(&mut self) -> Option<WorldCommand> {
        self.pending.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Cloneable sending side shared between emitters and the tick loop that
/// drains the queue.
#[derive(Debug, Default, Clone)]
pub struct CommandSender {
    queue: Rc<RefCell<CommandQueue>>,
}

impl CommandSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&self, command: WorldCommand) {
        self.queue.borrow_mut().push(command);
    }

    pub fn next(&self) -> Option<WorldCommand> {
        self.queue.borrow_mut().next()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(target: &str) -> WorldCommand {
        WorldCommand::SetOpenState {
            target: target.to_string(),
            open: true,
        }
    }

    #[test]
    fn queue_preserves_order_and_forgets_drained_commands() {
        let mut queue = CommandQueue::new();
        queue.push(open("gate"));
        queue.push(open("vault"));
        assert_eq!(queue.len(), 2);

        let mut drained = Vec::new();
        while let Some(command) = queue.next() {
            drained.push(command.target().to_string());
        }
        assert!(queue.is_empty());
        assert_eq!(drained, vec!["gate", "vault"]);
        assert_eq!(queue.next(), None);
    }

    #[test]
    fn sender_clones_share_one_queue() {
        let sender = CommandSender::new();
        let emitter = sender.clone();
        emitter.send(open("gate"));
        assert_eq!(sender.pending(), 1);
        assert_eq!(sender.next(), Some(open("gate")));
        assert_eq!(emitter.pending(), 0);
        assert_eq!(emitter.next(), None);
    }
}
