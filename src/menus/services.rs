//! Collaborators every menu activation shares.
//!
//! [`MenuServices`] is built once at startup and handed to sessions behind an
//! `Arc`. Nothing in it changes while sessions run.

use argon2::Argon2;
use log::{debug, error, info, warn};
use password_hash::{PasswordHash, PasswordVerifier};
use std::sync::Arc;

use super::acs::{Acs, StrictAcs};
use super::loader::MenuLoader;
use super::registry::CommandRegistry;
use super::terminal::{Hangup, Terminal};
use crate::bbs::session::Session;
use crate::logutil::escape_log;

/// Where a numeric-mode menu placed the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLocation {
    MessageArea,
    FileArea,
}

/// Records the caller's current area for who's-online style displays.
pub trait InstanceTracker: Send + Sync {
    fn record_location(&self, session: &Session, location: NodeLocation, area: usize);
}

/// Writes locations to the debug log and nowhere else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracker;

impl InstanceTracker for LogTracker {
    fn record_location(&self, session: &Session, location: NodeLocation, area: usize) {
        debug!(
            "session {} at {:?} #{}",
            escape_log(&session.id),
            location,
            area
        );
    }
}

/// Picks a menu set when the current one cannot be used.
pub trait MenuSetChooser: Send + Sync {
    /// Leave a usable name in `session.menu_set`, or hang up.
    fn choose(
        &self,
        loader: &dyn MenuLoader,
        session: &mut Session,
        term: &mut dyn Terminal,
    ) -> Result<(), Hangup>;
}

/// Lists the valid sets and lets the caller pick one; anything unrecognised
/// selects the first set listed.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractiveMenuSetChooser;

impl MenuSetChooser for InteractiveMenuSetChooser {
    fn choose(
        &self,
        loader: &dyn MenuLoader,
        session: &mut Session,
        term: &mut dyn Terminal,
    ) -> Result<(), Hangup> {
        let sets = loader.menu_sets();
        let Some(first) = sets.first() else {
            error!("no usable menu sets installed");
            term.print_text("\nNo menus are available. Disconnecting.\n")?;
            session.hang_up();
            return Err(Hangup);
        };

        term.print_text("\nAvailable menu sets:\n")?;
        for set in &sets {
            term.print_text(&format!("  {:<12} {}\n", set.name, set.description))?;
        }
        term.write_str(&format!("Menu set to use [{}]: ", first.name))?;
        let typed = term.input_line(32)?;
        let picked = sets
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(typed.trim()))
            .unwrap_or(first);
        if !typed.trim().is_empty() && !picked.name.eq_ignore_ascii_case(typed.trim()) {
            warn!(
                "session {} picked unknown menu set '{}'",
                escape_log(&session.id),
                escape_log(&typed)
            );
        }
        session.menu_set = picked.name.clone();
        info!(
            "session {} using menu set {}",
            escape_log(&session.id),
            picked.name
        );
        term.print_text(&format!("\nMenu in use : {} - {}\n", picked.name, picked.description))?;
        Ok(())
    }
}

pub struct MenuServices {
    pub registry: Arc<CommandRegistry>,
    pub loader: Arc<dyn MenuLoader>,
    pub acs: Arc<dyn Acs>,
    pub tracker: Arc<dyn InstanceTracker>,
    pub chooser: Arc<dyn MenuSetChooser>,
    /// Argon2 PHC string for the `*SYSTEM` menu password.
    pub system_password_hash: Option<String>,
}

impl MenuServices {
    /// Standard commands, fail-closed ACS, log-only tracking, interactive set chooser.
    pub fn new(loader: Arc<dyn MenuLoader>) -> Self {
        MenuServices {
            registry: CommandRegistry::shared(),
            loader,
            acs: Arc::new(StrictAcs),
            tracker: Arc::new(LogTracker),
            chooser: Arc::new(InteractiveMenuSetChooser),
            system_password_hash: None,
        }
    }

    pub fn with_registry(mut self, registry: Arc<CommandRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_acs(mut self, acs: Arc<dyn Acs>) -> Self {
        self.acs = acs;
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn InstanceTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_chooser(mut self, chooser: Arc<dyn MenuSetChooser>) -> Self {
        self.chooser = chooser;
        self
    }

    pub fn with_system_password_hash(mut self, hash: Option<String>) -> Self {
        self.system_password_hash = hash.filter(|h| !h.trim().is_empty());
        self
    }

    /// Check a typed password against the configured system password.
    /// Always false when none is configured.
    pub fn verify_system_password(&self, typed: &str) -> bool {
        let Some(hash) = self.system_password_hash.as_deref() else {
            return false;
        };
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(typed.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                error!("system password hash is not a valid PHC string: {}", e);
                false
            }
        }
    }
}
