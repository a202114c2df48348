//! Menu definition types.
//!
//! Everything here is immutable once loaded. A [`MenuDescriptor`] is read fresh
//! from the backing store on every activation, so edits take effect the next
//! time the menu is pushed and no session ever mutates a shared definition.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Password sentinel meaning "compare against the system-wide password".
pub const SYSTEM_PASSWORD_SENTINEL: &str = "*SYSTEM";

/// Name of the entry menu every menu set must provide.
pub const MAIN_MENU: &str = "main";

/// One command invocation: a registry name plus data only its handler interprets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "cmd")]
    pub command: String,
    #[serde(default)]
    pub data: String,
}

impl Action {
    pub fn new(command: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            data: data.into(),
        }
    }
}

/// A selectable entry of a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Hotkey, matched case-insensitively.
    pub key: String,
    #[serde(default)]
    pub acs: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl MenuItem {
    pub fn new(key: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            key: key.into(),
            acs: String::new(),
            text: None,
            actions,
        }
    }

    pub fn with_acs(mut self, acs: impl Into<String>) -> Self {
        self.acs = acs.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn matches(&self, token: &str) -> bool {
        self.key.eq_ignore_ascii_case(token)
    }
}

/// Whether purely numeric input selects a message or file area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericMode {
    #[default]
    None,
    /// Numbers select a message sub (`SetSubNumber`).
    Subs,
    /// Numbers select a file directory (`SetDirNumber`).
    Dirs,
}

impl NumericMode {
    /// Command synthesized for a numeric token, if this mode accepts numbers.
    pub fn command(self) -> Option<&'static str> {
        match self {
            NumericMode::None => None,
            NumericMode::Subs => Some("SetSubNumber"),
            NumericMode::Dirs => Some("SetDirNumber"),
        }
    }
}

/// When the menu text is displayed before the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelpPolicy {
    Never,
    Always,
    /// Only the first time through one activation.
    OnEntrance,
    /// Unless the user has opted into expert mode.
    #[default]
    UserChoice,
}

/// What gets written to the sysop log when an item runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogPolicy {
    #[default]
    None,
    Key,
    Command,
    Description,
}

/// One menu's definition as stored in a menu set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuDescriptor {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub acs: String,
    /// Empty means no password; [`SYSTEM_PASSWORD_SENTINEL`] means the system password.
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
    #[serde(default)]
    pub enter_actions: Vec<Action>,
    #[serde(default)]
    pub exit_actions: Vec<Action>,
    #[serde(default)]
    pub numeric: NumericMode,
    #[serde(default)]
    pub help: HelpPolicy,
    #[serde(default)]
    pub logging: LogPolicy,
    #[serde(default)]
    pub cls: bool,
}

impl MenuDescriptor {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            acs: String::new(),
            password: String::new(),
            items: Vec::new(),
            enter_actions: Vec::new(),
            exit_actions: Vec::new(),
            numeric: NumericMode::None,
            help: HelpPolicy::default(),
            logging: LogPolicy::None,
            cls: false,
        }
    }

    pub fn find_item(&self, token: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.matches(token))
    }
}

/// A named collection of menus sharing one directory and a set of global items.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MenuSet {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Items reachable from every menu of the set; local items take precedence.
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

impl MenuSet {
    pub fn find_item(&self, token: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.matches(token))
    }
}

/// Result of loading one menu: the definition plus its companion text resources.
#[derive(Debug, Clone)]
pub struct LoadedMenu {
    pub name: String,
    pub set: Arc<MenuSet>,
    pub descriptor: Arc<MenuDescriptor>,
    pub prompt: String,
    /// Pre-written menu text; generated from the items when absent.
    pub text: Option<String>,
}

/// Outcome of running a menu activation or an action list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MenuEffect {
    #[default]
    None,
    Error,
    Push(String),
    Return,
    ClearStack,
    ChangeMenuSet,
}

impl MenuEffect {
    /// Push and return end an action list and a menu activation.
    pub fn is_navigation(&self) -> bool {
        matches!(self, MenuEffect::Push(_) | MenuEffect::Return)
    }
}
