//! One activation of one menu.
//!
//! ```text
//! Entering ──► Prompting ──► Resolving ──► Executing ──► Exiting
//!    │            ▲   ▲          │             │
//!    │            │   └──────────┘ no match    │ no effect
//!    │            └────────────────────────────┘
//!    └─ denied / bad password ─► Exiting (error)
//! ```
//!
//! Every call to [`MenuInstance::run`] starts again at `Entering`: access
//! and password checks, enter actions, and the "already shown" flag all
//! belong to a single activation.

use log::{info, warn};
use std::sync::Arc;

use super::acs::Acs;
use super::executor::{run_actions, ActionOutcome, MenuEnv};
use super::hotkey::{resolve_hotkey, PrefixSets};
use super::model::{
    Action, HelpPolicy, LoadedMenu, LogPolicy, MenuDescriptor, MenuEffect, MenuItem, MenuSet,
    NumericMode, SYSTEM_PASSWORD_SENTINEL,
};
use super::services::NodeLocation;
use super::terminal::{Hangup, Terminal, MAX_COMMAND_LINE};
use crate::bbs::session::UserRecord;
use crate::logutil::{escape_log, menu_log_line, SECURITY_TARGET, SYSOP_TARGET};

/// Longest menu password accepted at the prompt.
pub const MAX_PASSWORD_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Entering,
    Prompting,
    Resolving,
    Executing,
    Exiting,
}

#[derive(Debug)]
pub struct MenuInstance {
    name: String,
    set: Arc<MenuSet>,
    descriptor: Arc<MenuDescriptor>,
    prompt: String,
    text: Option<String>,
    /// Reached through a push rather than as the stack's home menu.
    pushed: bool,
    state: MenuState,
    shown: bool,
    reload: bool,
    started_set: String,
}

/// Write a `*MENU*` line to the sysop log and echo it to the caller.
pub fn menu_sysop_log(term: &mut dyn Terminal, msg: &str) -> Result<(), Hangup> {
    let line = menu_log_line(msg);
    info!(target: SYSOP_TARGET, "{}", line);
    term.nl()?;
    term.write_str(&line)?;
    term.nl()
}

fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

impl MenuInstance {
    pub fn new(loaded: LoadedMenu, pushed: bool) -> Self {
        MenuInstance {
            name: loaded.name,
            set: loaded.set,
            descriptor: loaded.descriptor,
            prompt: loaded.prompt,
            text: loaded.text,
            pushed,
            state: MenuState::Entering,
            shown: false,
            reload: false,
            started_set: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn menu_set(&self) -> &str {
        &self.set.name
    }

    pub fn descriptor(&self) -> &MenuDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_pushed(&self) -> bool {
        self.pushed
    }

    /// Run this activation until it produces an effect for the navigator.
    pub fn run(&mut self, env: &mut MenuEnv<'_>) -> Result<MenuEffect, Hangup> {
        self.state = MenuState::Entering;
        self.shown = false;
        self.reload = false;
        self.started_set = env.session.menu_set.clone();

        if let Some(effect) = self.enter(env)? {
            self.state = MenuState::Exiting;
            return Ok(effect);
        }

        loop {
            if env.session.is_hung_up() {
                return Err(Hangup);
            }
            self.state = MenuState::Prompting;
            let token = self.prompt(env)?;
            env.session.update_activity();

            self.state = MenuState::Resolving;
            let Some(item) = self.resolve(&token) else {
                continue;
            };

            self.state = MenuState::Executing;
            let Some(outcome) = self.execute(env, &token, &item)? else {
                continue;
            };
            self.reload |= outcome.need_reload;

            match outcome.effect {
                MenuEffect::None => {
                    if self.reload || env.session.menu_set != self.started_set {
                        self.state = MenuState::Exiting;
                        return Ok(MenuEffect::ChangeMenuSet);
                    }
                }
                effect @ (MenuEffect::Push(_) | MenuEffect::Return) => {
                    self.state = MenuState::Exiting;
                    run_actions(env, Some(&*self), &self.descriptor.exit_actions)?;
                    return Ok(effect);
                }
                effect => {
                    self.state = MenuState::Exiting;
                    return Ok(effect);
                }
            }
        }
    }

    /// Access check, password check and enter actions. `Some` ends the activation.
    fn enter(&mut self, env: &mut MenuEnv<'_>) -> Result<Option<MenuEffect>, Hangup> {
        let verdict = env
            .services
            .acs
            .evaluate_debug(&env.session.user, &self.descriptor.acs);
        if !verdict.allowed {
            warn!(
                target: SECURITY_TARGET,
                "menu {}/{} denied for {}: {}",
                self.set.name,
                self.name,
                escape_log(&env.session.user.name),
                escape_log(&verdict.explanation)
            );
            menu_sysop_log(env.term, &format!("< Menu Sec : {}", self.name))?;
            return Ok(Some(MenuEffect::Error));
        }

        if self.pushed && !self.check_password(env)? {
            warn!(
                target: SECURITY_TARGET,
                "menu {}/{} wrong password from {}",
                self.set.name,
                self.name,
                escape_log(&env.session.user.name)
            );
            menu_sysop_log(env.term, &format!("< Menu Password : {}", self.name))?;
            return Ok(Some(MenuEffect::Error));
        }

        let outcome = run_actions(env, Some(&*self), &self.descriptor.enter_actions)?;
        self.reload |= outcome.need_reload;
        if outcome.effect.is_navigation() {
            return Ok(Some(outcome.effect));
        }
        Ok(None)
    }

    fn check_password(&self, env: &mut MenuEnv<'_>) -> Result<bool, Hangup> {
        let configured = self.descriptor.password.trim();
        if configured.is_empty() {
            return Ok(true);
        }
        env.term.nl()?;
        let typed = env.term.input_password("Password: ", MAX_PASSWORD_LEN)?;
        if configured.eq_ignore_ascii_case(SYSTEM_PASSWORD_SENTINEL) {
            Ok(env.services.verify_system_password(&typed))
        } else {
            Ok(typed == configured)
        }
    }

    fn should_display(&self, user: &UserRecord) -> bool {
        match self.descriptor.help {
            HelpPolicy::Never => false,
            HelpPolicy::Always => true,
            HelpPolicy::OnEntrance => !self.shown,
            HelpPolicy::UserChoice => !user.expert,
        }
    }

    fn prompt(&mut self, env: &mut MenuEnv<'_>) -> Result<String, Hangup> {
        if self.should_display(&env.session.user) {
            self.display_menu(env.services.acs.as_ref(), &env.session.user, env.term)?;
            self.shown = true;
        }
        env.term.write_str(&self.prompt)?;
        self.read_command(env)
    }

    fn read_command(&self, env: &mut MenuEnv<'_>) -> Result<String, Hangup> {
        if !env.session.user.hotkeys {
            return Ok(env.term.input_upper(MAX_COMMAND_LINE)?.trim().to_string());
        }
        let prefixes = match self.descriptor.numeric {
            NumericMode::None => PrefixSets::escape_only(),
            NumericMode::Subs => {
                env.services.tracker.record_location(
                    env.session,
                    NodeLocation::MessageArea,
                    env.session.current_sub,
                );
                PrefixSets::for_area_keys(env.session.message_areas.iter().map(|a| a.key.as_str()))
            }
            NumericMode::Dirs => {
                env.services.tracker.record_location(
                    env.session,
                    NodeLocation::FileArea,
                    env.session.current_dir,
                );
                PrefixSets::for_area_keys(env.session.file_areas.iter().map(|a| a.key.as_str()))
            }
        };
        resolve_hotkey(&mut *env.term, &prefixes, false)
    }

    /// Numeric shortcut first, then this menu's items, then the set's global items.
    pub fn resolve(&self, token: &str) -> Option<MenuItem> {
        if let Some(command) = self.descriptor.numeric.command() {
            if is_numeric_token(token) {
                return Some(MenuItem::new(token, vec![Action::new(command, token)]));
            }
        }
        self.descriptor
            .find_item(token)
            .or_else(|| self.set.find_item(token))
            .cloned()
    }

    /// `None` when the item is not available to this user.
    fn execute(
        &self,
        env: &mut MenuEnv<'_>,
        token: &str,
        item: &MenuItem,
    ) -> Result<Option<ActionOutcome>, Hangup> {
        if !env.services.acs.evaluate(&env.session.user, &item.acs) {
            warn!(
                target: SECURITY_TARGET,
                "item '{}' of {}/{} denied for {}",
                escape_log(&item.key),
                self.set.name,
                self.name,
                escape_log(&env.session.user.name)
            );
            menu_sysop_log(env.term, &format!("< item security : {}", item.key))?;
            return Ok(None);
        }
        self.log_item(env, token, item);
        run_actions(env, Some(self), &item.actions).map(Some)
    }

    fn log_item(&self, env: &MenuEnv<'_>, token: &str, item: &MenuItem) {
        let commands = || {
            item.actions
                .iter()
                .map(|a| a.command.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let detail = match self.descriptor.logging {
            LogPolicy::None => return,
            LogPolicy::Key => token.to_string(),
            LogPolicy::Command => commands(),
            LogPolicy::Description => item.text.clone().unwrap_or_else(commands),
        };
        info!(
            target: SYSOP_TARGET,
            "{} @ {}: {}",
            escape_log(&env.session.user.name),
            self.name,
            escape_log(&detail)
        );
    }

    /// Show the menu text: the pre-written text if there is one, otherwise a
    /// listing generated from the items the user can see.
    pub fn display_menu(
        &self,
        acs: &dyn Acs,
        user: &UserRecord,
        term: &mut dyn Terminal,
    ) -> Result<(), Hangup> {
        if self.descriptor.cls {
            term.cls()?;
        } else {
            term.nl()?;
        }
        match &self.text {
            Some(text) => term.print_text(text),
            None => term.print_text(&self.generate_menu(acs, user)),
        }
    }

    pub fn generate_menu(&self, acs: &dyn Acs, user: &UserRecord) -> String {
        let mut out = String::new();
        if !self.descriptor.title.is_empty() {
            out.push_str(&self.descriptor.title);
            out.push('\n');
            out.push_str(&"-".repeat(self.descriptor.title.chars().count()));
            out.push('\n');
        }
        let globals = self
            .set
            .items
            .iter()
            .filter(|g| self.descriptor.find_item(&g.key).is_none());
        for item in self.descriptor.items.iter().chain(globals) {
            let Some(text) = item.text.as_deref() else {
                continue;
            };
            if !acs.evaluate(user, &item.acs) {
                continue;
            }
            out.push_str(&format!("[{}] {}\n", item.key.to_ascii_uppercase(), text));
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menus::acs::StrictAcs;

    fn loaded(descriptor: MenuDescriptor, globals: Vec<MenuItem>) -> LoadedMenu {
        LoadedMenu {
            name: "main".into(),
            set: Arc::new(MenuSet {
                name: "wwiv".into(),
                description: String::new(),
                items: globals,
            }),
            descriptor: Arc::new(descriptor),
            prompt: "Main: ".into(),
            text: None,
        }
    }

    #[test]
    fn local_items_shadow_globals() {
        let mut d = MenuDescriptor::new("Main");
        d.items.push(MenuItem::new("G", vec![Action::new("Goodbye", "")]));
        let globals = vec![
            MenuItem::new("g", vec![Action::new("FastGoodBye", "")]),
            MenuItem::new("?", vec![Action::new("DisplayHelp", "")]),
        ];
        let m = MenuInstance::new(loaded(d, globals), false);
        assert_eq!(m.resolve("g").unwrap().actions[0].command, "Goodbye");
        assert_eq!(m.resolve("?").unwrap().actions[0].command, "DisplayHelp");
        assert!(m.resolve("Z").is_none());
    }

    #[test]
    fn numeric_tokens_synthesize_area_selection() {
        let mut d = MenuDescriptor::new("Subs");
        d.numeric = NumericMode::Subs;
        d.items.push(MenuItem::new("5", vec![Action::new("Pause", "")]));
        let m = MenuInstance::new(loaded(d, Vec::new()), false);
        let item = m.resolve("5").unwrap();
        assert_eq!(item.actions, vec![Action::new("SetSubNumber", "5")]);
        assert!(m.resolve("5A").is_none());
    }

    #[test]
    fn generated_text_hides_denied_and_untitled_items() {
        let mut d = MenuDescriptor::new("Main");
        d.items.push(MenuItem::new("r", vec![]).with_text("Read"));
        d.items.push(MenuItem::new("s", vec![]).with_text("Sysop").with_acs("user.sl>=255"));
        d.items.push(MenuItem::new("x", vec![]));
        let globals = vec![MenuItem::new("R", vec![]).with_text("Shadowed"), MenuItem::new("g", vec![]).with_text("Goodbye")];
        let m = MenuInstance::new(loaded(d, globals), false);
        let text = m.generate_menu(&StrictAcs, &UserRecord::default());
        assert!(text.starts_with("Main\n----\n"));
        assert!(text.contains("[R] Read"));
        assert!(text.contains("[G] Goodbye"));
        assert!(!text.contains("Sysop"));
        assert!(!text.contains("Shadowed"));
        assert!(!text.contains("[X]"));
    }
}
