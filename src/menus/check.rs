//! Static checks over an installed menu set.

use std::collections::HashSet;
use std::fmt;

use super::loader::{MenuError, MenuLoader};
use super::model::{Action, MAIN_MENU};
use super::registry::CommandRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuIssue {
    /// The menu file exists but could not be loaded.
    Unloadable { menu: String, error: String },
    /// An action names a command the registry does not know; it will do nothing.
    UnknownCommand { menu: String, command: String },
    /// A `MENU` action targets a menu the set does not define.
    MissingTarget { menu: String, target: String },
    MissingMain,
}

impl fmt::Display for MenuIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuIssue::Unloadable { menu, error } => write!(f, "{}: cannot load: {}", menu, error),
            MenuIssue::UnknownCommand { menu, command } => {
                write!(f, "{}: unknown command '{}'", menu, command)
            }
            MenuIssue::MissingTarget { menu, target } => {
                write!(f, "{}: MENU target '{}' does not exist", menu, target)
            }
            MenuIssue::MissingMain => write!(f, "set has no '{}' menu", MAIN_MENU),
        }
    }
}

fn check_actions<'a>(
    owner: &str,
    actions: impl IntoIterator<Item = &'a Action>,
    registry: &CommandRegistry,
    known: &HashSet<&str>,
    issues: &mut Vec<MenuIssue>,
) {
    for action in actions {
        if !registry.contains(&action.command) {
            issues.push(MenuIssue::UnknownCommand {
                menu: owner.to_string(),
                command: action.command.clone(),
            });
        } else if action.command.eq_ignore_ascii_case("MENU") {
            let target = action.data.trim().to_ascii_lowercase();
            if !target.is_empty() && !known.contains(target.as_str()) {
                issues.push(MenuIssue::MissingTarget {
                    menu: owner.to_string(),
                    target,
                });
            }
        }
    }
}

/// Load every menu of `menu_set` and report anything that would misbehave at runtime.
///
/// Global items are reported under the owner name `*global*`.
pub fn check_menu_set(
    loader: &dyn MenuLoader,
    registry: &CommandRegistry,
    menu_set: &str,
) -> Result<Vec<MenuIssue>, MenuError> {
    let names = loader.menu_names(menu_set)?;
    let known: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut issues = Vec::new();
    if !known.contains(MAIN_MENU) {
        issues.push(MenuIssue::MissingMain);
    }

    let mut globals = None;
    for name in &names {
        let loaded = match loader.load(menu_set, name) {
            Ok(loaded) => loaded,
            Err(e) => {
                issues.push(MenuIssue::Unloadable {
                    menu: name.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };
        let d = &loaded.descriptor;
        let actions = d
            .enter_actions
            .iter()
            .chain(d.exit_actions.iter())
            .chain(d.items.iter().flat_map(|i| i.actions.iter()));
        check_actions(name, actions, registry, &known, &mut issues);
        globals.get_or_insert(loaded.set);
    }
    if let Some(set) = globals {
        let actions = set.items.iter().flat_map(|i| i.actions.iter());
        check_actions("*global*", actions, registry, &known, &mut issues);
    }
    Ok(issues)
}
