//! Test utilities & fixtures.
//! A scripted terminal, a throwaway menu-set tree and services wired to a
//! predictable ACS.
#![allow(dead_code)] // Each test binary uses a different subset.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use menubbs::bbs::session::{Session, UserRecord};
use menubbs::menus::loader::{MenuLoader, MENU_EXTENSION, MENU_SET_FILE};
use menubbs::menus::services::{InstanceTracker, MenuSetChooser, NodeLocation};
use menubbs::menus::{
    CommandCategory, CommandRegistry, Hangup, JsonMenuLoader, MenuDescriptor,
    MenuExecutionContext, MenuServices, MenuSet, Terminal,
};

/// Terminal fed from a fixed key script. Running out of keys is a hangup.
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    keys: VecDeque<char>,
    pub output: String,
}

impl ScriptedTerminal {
    pub fn new(keys: &str) -> Self {
        ScriptedTerminal {
            keys: keys.chars().collect(),
            output: String::new(),
        }
    }

    pub fn push_keys(&mut self, keys: &str) {
        self.keys.extend(keys.chars());
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }

    /// Return and forget everything written so far.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl Terminal for ScriptedTerminal {
    fn getkey(&mut self) -> Result<char, Hangup> {
        self.keys.pop_front().ok_or(Hangup)
    }

    fn write_str(&mut self, text: &str) -> Result<(), Hangup> {
        self.output.push_str(text);
        Ok(())
    }
}

/// ACS used by every test: a handful of fixed expressions.
pub fn test_acs(user: &UserRecord, expression: &str) -> bool {
    match expression.trim() {
        "deny" => false,
        "sysop" => user.sl >= 255,
        "member" => user.sl >= 10,
        _ => true,
    }
}

/// Remembers every location reported by numeric-mode menus.
#[derive(Debug, Default)]
pub struct RecordingTracker {
    pub seen: Mutex<Vec<(NodeLocation, usize)>>,
}

impl InstanceTracker for RecordingTracker {
    fn record_location(&self, _session: &Session, location: NodeLocation, area: usize) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((location, area));
        }
    }
}

/// Always picks the same set and counts how often it was asked.
#[derive(Debug)]
pub struct FixedChooser {
    pub set: String,
    pub calls: Mutex<usize>,
}

impl FixedChooser {
    pub fn new(set: &str) -> Self {
        FixedChooser {
            set: set.to_string(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }
}

impl MenuSetChooser for FixedChooser {
    fn choose(
        &self,
        _loader: &dyn MenuLoader,
        session: &mut Session,
        _term: &mut dyn Terminal,
    ) -> Result<(), Hangup> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        session.menu_set = self.set.clone();
        Ok(())
    }
}

/// Writes `[data]` to the terminal.
pub fn mark(ctx: &mut MenuExecutionContext<'_>) -> Result<(), Hangup> {
    let text = format!("[{}]", ctx.data);
    ctx.term.write_str(&text)
}

/// Asks for a reload without changing anything else.
pub fn reload(ctx: &mut MenuExecutionContext<'_>) -> Result<(), Hangup> {
    ctx.need_reload = true;
    Ok(())
}

/// Switches the session to the set named in the data, without a reload request.
pub fn switch_set(ctx: &mut MenuExecutionContext<'_>) -> Result<(), Hangup> {
    ctx.session.menu_set = ctx.data.trim().to_string();
    Ok(())
}

/// Drops the user's security level to zero.
pub fn lock_out(ctx: &mut MenuExecutionContext<'_>) -> Result<(), Hangup> {
    ctx.session.user.sl = 0;
    Ok(())
}

/// Standard commands plus the test helpers above.
pub fn test_registry() -> Arc<CommandRegistry> {
    let mut registry = CommandRegistry::standard();
    registry.register("Mark", CommandCategory::System, "test marker", mark);
    registry.register("Reload", CommandCategory::User, "test reload", reload);
    registry.register("SwitchSet", CommandCategory::User, "test set switch", switch_set);
    registry.register("LockOut", CommandCategory::Sysop, "test lockout", lock_out);
    Arc::new(registry)
}

/// A temporary menu tree on disk.
pub struct MenuTree {
    pub dir: tempfile::TempDir,
}

impl MenuTree {
    pub fn new() -> Self {
        MenuTree {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn base(&self) -> &Path {
        self.dir.path()
    }

    pub fn loader(&self) -> Arc<JsonMenuLoader> {
        Arc::new(JsonMenuLoader::new(self.base()))
    }

    pub fn menu(&self, set: &str, name: &str, descriptor: &MenuDescriptor) -> &Self {
        let dir = self.base().join(set);
        fs::create_dir_all(&dir).expect("set dir");
        let json = serde_json::to_vec_pretty(descriptor).expect("menu json");
        fs::write(dir.join(format!("{}.{}", name, MENU_EXTENSION)), json).expect("menu file");
        self
    }

    pub fn globals(&self, set: &str, globals: &MenuSet) -> &Self {
        let dir = self.base().join(set);
        fs::create_dir_all(&dir).expect("set dir");
        let json = serde_json::to_vec_pretty(globals).expect("set json");
        fs::write(dir.join(MENU_SET_FILE), json).expect("set file");
        self
    }

    pub fn file(&self, set: &str, file: &str, contents: &str) -> &Self {
        let dir = self.base().join(set);
        fs::create_dir_all(&dir).expect("set dir");
        fs::write(dir.join(file), contents).expect("companion file");
        self
    }
}

/// Services over `loader` with the test ACS, test registry and a fixed chooser.
pub fn services(loader: Arc<dyn MenuLoader>, fallback_set: &str) -> MenuServices {
    MenuServices::new(loader)
        .with_registry(test_registry())
        .with_acs(Arc::new(test_acs))
        .with_chooser(Arc::new(FixedChooser::new(fallback_set)))
}

pub fn session(menu_set: &str) -> Session {
    let mut user = UserRecord::new("alice", 10);
    user.expert = true;
    Session::new("test", user, menu_set)
}
