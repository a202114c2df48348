//! Authorization seam.
//!
//! Menus and items carry ACS expressions as free text. The engine never parses
//! them; it only asks an [`Acs`] implementation for a yes/no answer about the
//! session's user.

use crate::bbs::roles::SL_SYSOP;
use crate::bbs::session::UserRecord;

/// Outcome of a traced evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcsVerdict {
    pub allowed: bool,
    pub explanation: String,
    pub trace: Vec<String>,
}

pub trait Acs: Send + Sync {
    /// Whether `user` satisfies `expression`. An empty expression always passes.
    fn evaluate(&self, user: &UserRecord, expression: &str) -> bool;

    /// Same answer as [`Acs::evaluate`] with a human-readable account of how it was reached.
    fn evaluate_debug(&self, user: &UserRecord, expression: &str) -> AcsVerdict {
        let allowed = self.evaluate(user, expression);
        AcsVerdict {
            allowed,
            explanation: format!(
                "'{}' evaluated to {} for {}",
                expression, allowed, user.name
            ),
            trace: Vec::new(),
        }
    }
}

impl<F> Acs for F
where
    F: Fn(&UserRecord, &str) -> bool + Send + Sync,
{
    fn evaluate(&self, user: &UserRecord, expression: &str) -> bool {
        expression.trim().is_empty() || self(user, expression)
    }
}

/// Fails closed: non-empty expressions only pass for sysop-level users.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictAcs;

impl Acs for StrictAcs {
    fn evaluate(&self, user: &UserRecord, expression: &str) -> bool {
        expression.trim().is_empty() || user.sl >= SL_SYSOP
    }

    fn evaluate_debug(&self, user: &UserRecord, expression: &str) -> AcsVerdict {
        let allowed = self.evaluate(user, expression);
        let mut trace = Vec::new();
        if expression.trim().is_empty() {
            trace.push("empty expression".to_string());
        } else {
            trace.push(format!("user.sl={} sysop={}", user.sl, SL_SYSOP));
        }
        AcsVerdict {
            allowed,
            explanation: if allowed {
                "access granted".to_string()
            } else {
                format!("'{}' requires sysop access", expression)
            },
            trace,
        }
    }
}
