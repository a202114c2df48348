//! Menu loading.
//!
//! A menu set is a directory under the configured base:
//!
//! ```text
//! menus/
//! └── wwiv/                 ← menu set "wwiv"
//!     ├── menuset.json      ← description + global items (optional)
//!     ├── main.mnu.json     ← required entry menu
//!     ├── main.pro          ← prompt, up to the first ".end." (optional)
//!     ├── main.msg          ← pre-written menu text (optional)
//!     └── xfer.mnu.json
//! ```
//!
//! Every call reads from disk; nothing is cached between activations.

use log::debug;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::model::{LoadedMenu, MenuDescriptor, MenuSet, MAIN_MENU};
use crate::validation::{validate_file_size, validate_menu_name, SecurityError};

/// Prompt used when a menu has no `.pro` file.
pub const DEFAULT_PROMPT: &str = "Command? ";
/// Everything from this marker on is dropped from a `.pro` file.
pub const PROMPT_END_MARKER: &str = ".end.";
pub const MENU_SET_FILE: &str = "menuset.json";
pub const MENU_EXTENSION: &str = "mnu.json";

const MAX_MENU_FILE_BYTES: u64 = 256 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error(transparent)]
    InvalidName(#[from] SecurityError),

    #[error("menu set '{0}' not found")]
    SetNotFound(String),

    #[error("menu '{menu}' not found in menu set '{set}'")]
    NotFound { set: String, menu: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed menu file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A menu set that can be offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSetInfo {
    pub name: String,
    pub description: String,
}

pub trait MenuLoader: Send + Sync {
    /// Load one menu of a set, together with the set's global items.
    fn load(&self, menu_set: &str, menu: &str) -> Result<LoadedMenu, MenuError>;

    /// Sets that contain a main menu, ordered by name.
    fn menu_sets(&self) -> Vec<MenuSetInfo>;

    /// Names of every menu defined in a set, ordered.
    fn menu_names(&self, menu_set: &str) -> Result<Vec<String>, MenuError>;

    fn is_valid_set(&self, menu_set: &str) -> bool {
        self.load(menu_set, MAIN_MENU).is_ok()
    }
}

/// Reads menu sets from JSON files under a base directory.
#[derive(Debug, Clone)]
pub struct JsonMenuLoader {
    base_dir: PathBuf,
}

impl JsonMenuLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        JsonMenuLoader {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn set_dir(&self, menu_set: &str) -> Result<PathBuf, MenuError> {
        let name = validate_menu_name(menu_set)?;
        let dir = self.base_dir.join(&name);
        if !dir.is_dir() {
            return Err(MenuError::SetNotFound(name));
        }
        Ok(dir)
    }

    fn load_set(&self, menu_set: &str) -> Result<MenuSet, MenuError> {
        let dir = self.set_dir(menu_set)?;
        let mut set = match read_json::<MenuSet>(&dir.join(MENU_SET_FILE))? {
            Some(set) => set,
            None => MenuSet::default(),
        };
        set.name = validate_menu_name(menu_set)?;
        Ok(set)
    }
}

impl MenuLoader for JsonMenuLoader {
    fn load(&self, menu_set: &str, menu: &str) -> Result<LoadedMenu, MenuError> {
        let set = self.load_set(menu_set)?;
        let name = validate_menu_name(menu)?;
        let dir = self.base_dir.join(&set.name);
        let path = dir.join(format!("{}.{}", name, MENU_EXTENSION));
        let descriptor: MenuDescriptor =
            read_json(&path)?.ok_or_else(|| MenuError::NotFound {
                set: set.name.clone(),
                menu: name.clone(),
            })?;
        let prompt = read_text(&dir.join(format!("{}.pro", name)))?
            .map(|text| prompt_from_text(&text))
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string());
        let text = read_text(&dir.join(format!("{}.msg", name)))?;
        debug!("loaded menu {}/{} ({} items)", set.name, name, descriptor.items.len());
        Ok(LoadedMenu {
            name,
            set: Arc::new(set),
            descriptor: Arc::new(descriptor),
            prompt,
            text,
        })
    }

    fn menu_sets(&self) -> Vec<MenuSetInfo> {
        let Ok(entries) = fs::read_dir(&self.base_dir) else {
            return Vec::new();
        };
        let mut sets: Vec<MenuSetInfo> = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .filter_map(|name| validate_menu_name(&name).ok().filter(|n| *n == name))
            .filter(|name| self.is_valid_set(name))
            .map(|name| MenuSetInfo {
                description: self
                    .load_set(&name)
                    .map(|s| s.description)
                    .unwrap_or_default(),
                name,
            })
            .collect();
        sets.sort_by(|a, b| a.name.cmp(&b.name));
        sets
    }

    fn menu_names(&self, menu_set: &str) -> Result<Vec<String>, MenuError> {
        let dir = self.set_dir(menu_set)?;
        let entries = fs::read_dir(&dir).map_err(|source| MenuError::Io {
            path: dir.clone(),
            source,
        })?;
        let suffix = format!(".{}", MENU_EXTENSION);
        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter_map(|f| f.strip_suffix(&suffix).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Prompt text is everything before the first [`PROMPT_END_MARKER`].
pub fn prompt_from_text(text: &str) -> String {
    match text.find(PROMPT_END_MARKER) {
        Some(end) => text[..end].to_string(),
        None => text.to_string(),
    }
}

fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>, MenuError> {
    let io_err = |source| MenuError::Io {
        path: path.to_path_buf(),
        source,
    };
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(e)),
    };
    validate_file_size(meta.len(), MAX_MENU_FILE_BYTES)?;
    fs::read(path).map(Some).map_err(io_err)
}

fn read_text(path: &Path) -> Result<Option<String>, MenuError> {
    Ok(read_bytes(path)?.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, MenuError> {
    let Some(bytes) = read_bytes(path)? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| MenuError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_stops_at_end_marker() {
        assert_eq!(prompt_from_text("Main> .end. junk"), "Main> ");
        assert_eq!(prompt_from_text("Xfer> "), "Xfer> ");
        assert_eq!(prompt_from_text(".end."), "");
    }
}
