use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::roles::SL_NEW_USER;
use crate::logutil::escape_log;

/// The connected user's record, as far as the menu engine needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    /// Security level
    pub sl: u8,
    /// Download security level
    pub dsl: u8,
    pub ar: u16,
    pub dar: u16,
    /// Terse mode: menu text is not redisplayed before every prompt.
    pub expert: bool,
    /// When false, commands are typed as full lines ended with Enter.
    pub hotkeys: bool,
}

impl UserRecord {
    pub fn new(name: impl Into<String>, sl: u8) -> Self {
        UserRecord {
            name: name.into(),
            sl,
            dsl: 0,
            ar: 0,
            dar: 0,
            expert: false,
            hotkeys: true,
        }
    }
}

impl Default for UserRecord {
    fn default() -> Self {
        UserRecord::new("Guest", SL_NEW_USER)
    }
}

/// A numbered message sub or file directory the user can select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Selection key typed at a numeric-mode menu (usually "1", "2", ...).
    pub key: String,
    pub name: String,
}

impl Area {
    pub fn numbered(prefix: &str, count: usize) -> Vec<Area> {
        (1..=count)
            .map(|n| Area {
                key: n.to_string(),
                name: format!("{} {}", prefix, n),
            })
            .collect()
    }
}

/// # Menu Session
///
/// One connected caller. Owns everything the menu engine mutates on the
/// caller's behalf: the user record, the active menu-set name, the current
/// message/file area and the hangup flag. Nothing here is shared with other
/// sessions.
///
/// ## Usage
///
/// ```rust
/// use menubbs::bbs::session::{Session, UserRecord};
///
/// let mut session = Session::new("s1", UserRecord::new("alice", 10), "wwiv");
/// assert!(!session.is_hung_up());
/// session.hang_up();
/// assert!(session.is_hung_up());
/// ```
///
/// ## Areas
///
/// `message_areas` and `file_areas` hold the numbered subs and directories
/// visible to the user. Numeric-mode menus size their hotkey prefixes from
/// them, and `SetSubNumber`/`SetDirNumber` select by key.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user: UserRecord,
    /// Name of the menu set currently in use. Handlers may change it and
    /// request a reload.
    pub menu_set: String,
    pub message_areas: Vec<Area>,
    pub current_sub: usize,
    pub file_areas: Vec<Area>,
    pub current_dir: usize,
    /// Directory `PrintFile` resolves names against.
    pub gfiles_dir: PathBuf,
    pub login_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    hangup: bool,
}

impl Session {
    pub fn new(id: impl Into<String>, user: UserRecord, menu_set: impl Into<String>) -> Self {
        let now = Utc::now();
        Session {
            id: id.into(),
            user,
            menu_set: menu_set.into(),
            message_areas: Vec::new(),
            current_sub: 0,
            file_areas: Vec::new(),
            current_dir: 0,
            gfiles_dir: PathBuf::from("gfiles"),
            login_time: now,
            last_activity: now,
            hangup: false,
        }
    }

    /// Seed `count` numbered message subs and file directories.
    pub fn with_numbered_areas(mut self, subs: usize, dirs: usize) -> Self {
        self.message_areas = Area::numbered("Sub", subs);
        self.file_areas = Area::numbered("Dir", dirs);
        self
    }

    pub fn with_gfiles_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.gfiles_dir = dir.into();
        self
    }

    /// Mark the session as disconnected. Every menu loop stops at its next check.
    pub fn hang_up(&mut self) {
        if !self.hangup {
            debug!("Session {}: hangup requested", escape_log(&self.id));
        }
        self.hangup = true;
    }

    pub fn is_hung_up(&self) -> bool {
        self.hangup
    }

    pub fn update_activity(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn session_duration(&self) -> chrono::Duration {
        self.last_activity - self.login_time
    }

    pub fn display_name(&self) -> &str {
        &self.user.name
    }

    /// Select the message sub whose key equals `key`. Unknown keys leave the selection alone.
    pub fn set_sub_by_key(&mut self, key: &str) -> bool {
        match self.message_areas.iter().position(|a| a.key == key) {
            Some(idx) => {
                self.current_sub = idx;
                true
            }
            None => false,
        }
    }

    /// Select the file directory whose key equals `key`.
    pub fn set_dir_by_key(&mut self, key: &str) -> bool {
        match self.file_areas.iter().position(|a| a.key == key) {
            Some(idx) => {
                self.current_dir = idx;
                true
            }
            None => false,
        }
    }

    pub fn current_sub_area(&self) -> Option<&Area> {
        self.message_areas.get(self.current_sub)
    }

    pub fn current_dir_area(&self) -> Option<&Area> {
        self.file_areas.get(self.current_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_selection_by_key() {
        let mut s = Session::new("t", UserRecord::default(), "wwiv").with_numbered_areas(12, 3);
        assert!(s.set_sub_by_key("11"));
        assert_eq!(s.current_sub_area().map(|a| a.name.as_str()), Some("Sub 11"));
        assert!(!s.set_sub_by_key("13"));
        assert_eq!(s.current_sub, 10);
        assert!(s.set_dir_by_key("3"));
        assert!(!s.set_dir_by_key("03"));
        assert_eq!(s.current_dir, 2);
    }
}
