use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::command::{Command, CommandKind};

/// Immutable, cheaply clonable command list. Interpreters share it and never mutate it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandTable {
    commands: Arc<[Command]>,
}

impl CommandTable {
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            commands: commands.into(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Index of the first label carrying `name`, in table order.
    pub fn find_label(&self, name: &str) -> Option<usize> {
        self.commands.iter().position(|command| {
            matches!(&command.kind, CommandKind::Label { name: label } if label == name)
        })
    }

    pub fn indent_at(&self, index: usize) -> Option<usize> {
        self.commands.get(index).map(|command| command.indent)
    }

    /// Nearest `Loop` whose block contains `index`, following the indent ancestry.
    pub fn enclosing_loop(&self, index: usize) -> Option<usize> {
        let mut level = self.indent_at(index)?;
        for candidate in (0..index).rev() {
            let command = &self.commands[candidate];
            if command.indent < level {
                if matches!(command.kind, CommandKind::Loop) {
                    return Some(candidate);
                }
                level = command.indent;
            }
        }
        None
    }

    /// First index after `index` whose indent is at or above `indent`.
    pub fn next_at_or_above(&self, index: usize, indent: usize) -> Option<usize> {
        (index + 1..self.commands.len()).find(|&candidate| self.commands[candidate].indent <= indent)
    }

    pub fn same_table(&self, other: &CommandTable) -> bool {
        Arc::ptr_eq(&self.commands, &other.commands)
    }
}

impl From<Vec<Command>> for CommandTable {
    fn from(commands: Vec<Command>) -> Self {
        Self::new(commands)
    }
}

impl Serialize for CommandTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.commands.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CommandTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Command>::deserialize(deserializer).map(Self::new)
    }
}
