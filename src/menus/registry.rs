//! Command registry: case-insensitive command name → handler table.
//!
//! Built once, then frozen behind an `Arc` and shared read-only by every
//! session. Looking up a name that is not registered is not an error; the
//! executor treats it as a silent no-op.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use super::commands;
use super::executor::MenuExecutionContext;
use super::terminal::Hangup;

/// A command handler. Reads `ctx.data`, may set `ctx.effect` and `ctx.need_reload`.
pub type CommandFn = fn(&mut MenuExecutionContext<'_>) -> Result<(), Hangup>;

/// Documentation grouping for the command listing. Has no effect on dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandCategory {
    Menu,
    Message,
    File,
    System,
    User,
    Sysop,
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandCategory::Menu => "Menu",
            CommandCategory::Message => "Message",
            CommandCategory::File => "File",
            CommandCategory::System => "System",
            CommandCategory::User => "User",
            CommandCategory::Sysop => "SYSOP",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Name as registered (original casing, used for listings).
    pub name: String,
    pub category: CommandCategory,
    pub description: String,
    pub handler: CommandFn,
}

#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandSpec>,
}

fn fold(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

impl CommandRegistry {
    /// A registry with no commands at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in command table.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        commands::register_builtins(&mut registry);
        registry
    }

    /// Process-wide shared copy of [`CommandRegistry::standard`].
    pub fn shared() -> Arc<CommandRegistry> {
        static SHARED: OnceLock<Arc<CommandRegistry>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(CommandRegistry::standard()))
            .clone()
    }

    /// Add or replace a command. Returns the replaced entry, if any.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        category: CommandCategory,
        description: impl Into<String>,
        handler: CommandFn,
    ) -> Option<CommandSpec> {
        let name = name.into();
        let spec = CommandSpec {
            name: name.trim().to_string(),
            category,
            description: description.into().trim().to_string(),
            handler,
        };
        self.commands.insert(fold(&name), spec)
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(&fold(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All commands ordered by category, then case-insensitive name.
    pub fn listing(&self) -> Vec<&CommandSpec> {
        let mut specs: Vec<&CommandSpec> = self.commands.values().collect();
        specs.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| fold(&a.name).cmp(&fold(&b.name)))
        });
        specs
    }
}
