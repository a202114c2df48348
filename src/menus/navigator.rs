//! Menu stack driver.
//!
//! The stack always restarts at `main` when it runs empty. The top menu runs
//! until it reports an effect; the navigator applies that effect to the
//! stack and goes around again. Only a hangup, or losing access to `main`,
//! ends the loop.

use log::{error, info, warn};
use std::sync::Arc;

use super::executor::MenuEnv;
use super::instance::MenuInstance;
use super::model::{LoadedMenu, MenuEffect, MAIN_MENU};
use super::services::MenuServices;
use super::terminal::{Hangup, Terminal};
use crate::bbs::session::Session;
use crate::logutil::{escape_log, SECURITY_TARGET};

/// Active menus, innermost last.
#[derive(Debug, Default)]
pub struct MenuStack {
    menus: Vec<MenuInstance>,
}

impl MenuStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, menu: MenuInstance) {
        self.menus.push(menu);
    }

    pub fn pop(&mut self) -> Option<MenuInstance> {
        self.menus.pop()
    }

    pub fn clear(&mut self) {
        self.menus.clear();
    }

    pub fn top(&self) -> Option<&MenuInstance> {
        self.menus.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut MenuInstance> {
        self.menus.last_mut()
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    /// Menu names from the bottom of the stack up.
    pub fn names(&self) -> Vec<&str> {
        self.menus.iter().map(MenuInstance::name).collect()
    }
}

/// Result of one [`Navigator::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavStep {
    /// The top menu finished with this effect and the stack has been updated.
    Continue(MenuEffect),
    /// The user may not use the main menu of the active set.
    MainMenuDenied,
}

/// Why [`Navigator::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorExit {
    Hangup,
    MainMenuDenied,
}

pub struct Navigator {
    services: Arc<MenuServices>,
    stack: MenuStack,
    /// Main menu loaded ahead of the next push, so it is not read twice.
    pending_main: Option<LoadedMenu>,
}

impl Navigator {
    pub fn new(services: Arc<MenuServices>) -> Self {
        Navigator {
            services,
            stack: MenuStack::new(),
            pending_main: None,
        }
    }

    pub fn stack(&self) -> &MenuStack {
        &self.stack
    }

    pub fn stack_names(&self) -> Vec<&str> {
        self.stack.names()
    }

    /// Run until the caller hangs up or loses access to the main menu.
    pub fn run(&mut self, session: &mut Session, term: &mut dyn Terminal) -> NavigatorExit {
        match self.run_inner(session, term) {
            Ok(exit) => exit,
            Err(Hangup) => {
                session.hang_up();
                NavigatorExit::Hangup
            }
        }
    }

    fn run_inner(
        &mut self,
        session: &mut Session,
        term: &mut dyn Terminal,
    ) -> Result<NavigatorExit, Hangup> {
        if !self.start(session, term)? {
            return Ok(NavigatorExit::MainMenuDenied);
        }
        loop {
            if let NavStep::MainMenuDenied = self.step(session, term)? {
                return Ok(NavigatorExit::MainMenuDenied);
            }
        }
    }

    /// Load the main menu of a usable set and check that the user may enter it.
    ///
    /// Returns `false` when access is denied; that check is not repeated for
    /// ordinary re-entries of main.
    pub fn start(&mut self, session: &mut Session, term: &mut dyn Terminal) -> Result<bool, Hangup> {
        let main = self.load_main(session, term)?;
        let allowed = self.main_allowed(session, &main);
        if allowed {
            self.pending_main = Some(main);
        } else {
            term.print_text("\nYou do not have access to the main menu.\n")?;
        }
        Ok(allowed)
    }

    /// Make sure the stack has a home menu, pushing main if it is empty.
    pub fn ensure_home(&mut self, session: &mut Session, term: &mut dyn Terminal) -> Result<(), Hangup> {
        if self.stack.is_empty() {
            let main = match self.pending_main.take() {
                Some(main) => main,
                None => self.load_main(session, term)?,
            };
            self.stack.push(MenuInstance::new(main, false));
        }
        Ok(())
    }

    /// One turn of the loop: run the top menu once and apply its effect.
    pub fn step(&mut self, session: &mut Session, term: &mut dyn Terminal) -> Result<NavStep, Hangup> {
        if session.is_hung_up() {
            return Err(Hangup);
        }
        self.ensure_home(session, term)?;

        let services = Arc::clone(&self.services);
        let effect = {
            let Some(top) = self.stack.top_mut() else {
                return Err(Hangup);
            };
            let mut env = MenuEnv::new(&services, session, term);
            top.run(&mut env)?
        };

        match &effect {
            MenuEffect::None => {}
            MenuEffect::Error => {
                let was_home = self.stack.len() == 1;
                self.stack.pop();
                if was_home && !self.recheck_main(session, term)? {
                    return Ok(NavStep::MainMenuDenied);
                }
            }
            MenuEffect::Return => {
                self.stack.pop();
            }
            MenuEffect::Push(name) => self.push_menu(session, name),
            MenuEffect::ClearStack => self.stack.clear(),
            MenuEffect::ChangeMenuSet => {
                self.stack.clear();
                self.pending_main = None;
                info!(
                    "session {} switching to menu set {}",
                    escape_log(&session.id),
                    escape_log(&session.menu_set)
                );
                if !self.start(session, term)? {
                    return Ok(NavStep::MainMenuDenied);
                }
            }
        }
        Ok(NavStep::Continue(effect))
    }

    fn push_menu(&mut self, session: &Session, name: &str) {
        let set = self
            .stack
            .top()
            .map(|m| m.menu_set().to_string())
            .unwrap_or_else(|| session.menu_set.clone());
        match self.services.loader.load(&set, name) {
            Ok(loaded) => self.stack.push(MenuInstance::new(loaded, true)),
            Err(e) => warn!(
                "session {}: cannot open menu '{}': {}",
                escape_log(&session.id),
                escape_log(name),
                e
            ),
        }
    }

    /// Load main from the session's set, asking for another set until one works.
    fn load_main(&self, session: &mut Session, term: &mut dyn Terminal) -> Result<LoadedMenu, Hangup> {
        loop {
            if session.is_hung_up() {
                return Err(Hangup);
            }
            match self.services.loader.load(&session.menu_set, MAIN_MENU) {
                Ok(main) => return Ok(main),
                Err(e) => {
                    error!(
                        "menu set '{}' unusable: {}",
                        escape_log(&session.menu_set),
                        e
                    );
                    self.services
                        .chooser
                        .choose(self.services.loader.as_ref(), session, term)?;
                }
            }
        }
    }

    fn main_allowed(&self, session: &Session, main: &LoadedMenu) -> bool {
        let verdict = self
            .services
            .acs
            .evaluate_debug(&session.user, &main.descriptor.acs);
        if !verdict.allowed {
            warn!(
                target: SECURITY_TARGET,
                "main menu of '{}' denied for {}: {}",
                main.set.name,
                escape_log(&session.user.name),
                escape_log(&verdict.explanation)
            );
        }
        verdict.allowed
    }

    /// Main itself ended in error: stop if that was an access failure.
    fn recheck_main(&mut self, session: &mut Session, term: &mut dyn Terminal) -> Result<bool, Hangup> {
        let main = self.load_main(session, term)?;
        if self.main_allowed(session, &main) {
            self.pending_main = Some(main);
            Ok(true)
        } else {
            term.print_text("\nYou no longer have access to the main menu.\n")?;
            Ok(false)
        }
    }
}
