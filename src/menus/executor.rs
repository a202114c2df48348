//! Action execution protocol.
//!
//! Each action gets a fresh [`MenuExecutionContext`]: the handler reads the
//! action's data, does its work, and reports back through `effect` and
//! `need_reload`. An action list stops at the first push or return.

use log::trace;

use super::instance::MenuInstance;
use super::model::{Action, MenuEffect};
use super::services::MenuServices;
use super::terminal::{Hangup, Terminal};
use crate::bbs::session::Session;
use crate::logutil::escape_log;

/// Everything a running menu (or a command outside any menu) works against.
pub struct MenuEnv<'a> {
    pub services: &'a MenuServices,
    pub session: &'a mut Session,
    pub term: &'a mut dyn Terminal,
}

impl<'a> MenuEnv<'a> {
    pub fn new(
        services: &'a MenuServices,
        session: &'a mut Session,
        term: &'a mut dyn Terminal,
    ) -> Self {
        MenuEnv {
            services,
            session,
            term,
        }
    }
}

/// Per-action handler context.
pub struct MenuExecutionContext<'a> {
    /// The menu the action runs from; `None` when a command runs outside menu flow.
    pub menu: Option<&'a MenuInstance>,
    pub data: &'a str,
    pub effect: MenuEffect,
    pub need_reload: bool,
    pub session: &'a mut Session,
    pub term: &'a mut dyn Terminal,
    pub services: &'a MenuServices,
}

/// What running one action or an action list produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub effect: MenuEffect,
    pub need_reload: bool,
}

/// Run a single action. Unknown command names do nothing and report [`MenuEffect::None`].
pub fn run_action(
    env: &mut MenuEnv<'_>,
    menu: Option<&MenuInstance>,
    action: &Action,
) -> Result<ActionOutcome, Hangup> {
    let Some(spec) = env.services.registry.lookup(&action.command) else {
        return Ok(ActionOutcome::default());
    };
    trace!(
        "session {} running {} '{}'",
        escape_log(&env.session.id),
        spec.name,
        escape_log(&action.data)
    );
    let mut ctx = MenuExecutionContext {
        menu,
        data: &action.data,
        effect: MenuEffect::None,
        need_reload: false,
        session: &mut *env.session,
        term: &mut *env.term,
        services: env.services,
    };
    (spec.handler)(&mut ctx)?;
    Ok(ActionOutcome {
        effect: ctx.effect,
        need_reload: ctx.need_reload,
    })
}

/// Run actions in order, stopping at the first push or return.
///
/// Later actions in the list never run once one of them navigates. Other
/// effects (including a stack clear) do not stop the list; the list as a
/// whole then reports the last non-none effect. Reload requests accumulate
/// across every action that ran.
pub fn run_actions(
    env: &mut MenuEnv<'_>,
    menu: Option<&MenuInstance>,
    actions: &[Action],
) -> Result<ActionOutcome, Hangup> {
    let mut outcome = ActionOutcome::default();
    for action in actions {
        let step = run_action(env, menu, action)?;
        outcome.need_reload |= step.need_reload;
        if env.session.is_hung_up() {
            return Err(Hangup);
        }
        if step.effect.is_navigation() {
            outcome.effect = step.effect;
            return Ok(outcome);
        }
        if step.effect != MenuEffect::None {
            outcome.effect = step.effect;
        }
    }
    Ok(outcome)
}
