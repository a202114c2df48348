//! Name validation and safe path construction.
//!
//! Handles, menu-set names, menu names and text-file names all end up in
//! filesystem paths or log lines, so each gets checked here before use.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Username validation errors with helpful messages
#[derive(Debug, thiserror::Error)]
pub enum UsernameError {
    #[error("Username is too short (minimum 2 characters)")]
    TooShort,

    #[error("Username is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Username cannot start or end with whitespace")]
    InvalidWhitespace,

    #[error("Username contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },

    #[error("Username contains path separators (/ or \\)")]
    PathTraversal,

    #[error("Username is a reserved system name")]
    Reserved,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecurityError {
    /// Menu or menu-set name contains invalid characters or is too long
    #[error("Invalid menu name: {reason}")]
    InvalidMenuName { reason: String },

    /// Path contains invalid characters or attempts directory traversal
    #[error("Invalid path or path traversal attempt")]
    InvalidPath,

    #[error("File size exceeds limit ({limit} bytes)")]
    FileSizeExceeded { limit: u64 },
}

/// Username validation rules configuration
#[derive(Debug, Clone)]
pub struct UsernameRules {
    pub min_length: usize,
    pub max_length: usize,
    pub allow_spaces: bool,
    pub allow_unicode: bool,
    pub allow_reserved_sysop: bool,
}

impl UsernameRules {
    /// Conservative rules for sysop names
    pub fn sysop() -> Self {
        UsernameRules {
            min_length: 2,
            max_length: 20,
            allow_spaces: false,
            allow_unicode: false,
            allow_reserved_sysop: true,
        }
    }

    /// Handles typed at the login prompt
    pub fn user() -> Self {
        UsernameRules {
            min_length: 2,
            max_length: 30,
            allow_spaces: true,
            allow_unicode: true,
            allow_reserved_sysop: false,
        }
    }
}

fn reserved_names() -> HashSet<&'static str> {
    [
        "admin", "administrator", "root", "system", "sysop", "operator", "guest", "anonymous",
        "con", "prn", "aux", "nul", "new", "all", "main",
    ]
    .iter()
    .copied()
    .collect()
}

/// Validate a username according to the given rules
pub fn validate_username(username: &str, rules: &UsernameRules) -> Result<String, UsernameError> {
    let trimmed = username.trim();

    if trimmed.chars().count() < rules.min_length {
        return Err(UsernameError::TooShort);
    }
    if trimmed.chars().count() > rules.max_length {
        return Err(UsernameError::TooLong {
            max: rules.max_length,
        });
    }
    if trimmed != username {
        return Err(UsernameError::InvalidWhitespace);
    }

    let lower = trimmed.to_lowercase();
    if reserved_names().contains(lower.as_str()) && !(rules.allow_reserved_sysop && lower == "sysop") {
        return Err(UsernameError::Reserved);
    }

    if trimmed.contains("..") || trimmed.contains('/') || trimmed.contains('\\') {
        return Err(UsernameError::PathTraversal);
    }

    let invalid: HashSet<char> = trimmed
        .chars()
        .filter(|&ch| {
            let ok = if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.' {
                true
            } else if ch == ' ' {
                rules.allow_spaces
            } else if !ch.is_ascii() && !ch.is_control() {
                rules.allow_unicode
            } else {
                false
            };
            !ok
        })
        .collect();
    if !invalid.is_empty() {
        let mut chars: Vec<char> = invalid.into_iter().collect();
        chars.sort_unstable();
        return Err(UsernameError::InvalidCharacters {
            chars: chars
                .into_iter()
                .map(|c| if c.is_control() { format!("\\u{{{:04x}}}", c as u32) } else { c.to_string() })
                .collect(),
        });
    }

    Ok(trimmed.to_string())
}

/// Validate a sysop name with strict rules
pub fn validate_sysop_name(name: &str) -> Result<String, UsernameError> {
    validate_username(name, &UsernameRules::sysop())
}

/// Validate a handle typed at login
pub fn validate_user_name(name: &str) -> Result<String, UsernameError> {
    validate_username(name, &UsernameRules::user())
}

/// Validate a menu or menu-set name and return its canonical (lower-case) form.
pub fn validate_menu_name(name: &str) -> Result<String, SecurityError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(SecurityError::InvalidMenuName {
            reason: "name cannot be empty".to_string(),
        });
    }
    if trimmed.len() > 32 {
        return Err(SecurityError::InvalidMenuName {
            reason: "name too long (max 32 characters)".to_string(),
        });
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(SecurityError::InvalidMenuName {
            reason: "name must contain only letters, numbers, underscore, and hyphen".to_string(),
        });
    }
    let lower = trimmed.to_ascii_lowercase();
    if matches!(lower.as_str(), "con" | "prn" | "aux" | "nul") {
        return Err(SecurityError::InvalidMenuName {
            reason: "name is reserved".to_string(),
        });
    }
    Ok(lower)
}

/// Validate file size before reading
pub fn validate_file_size(size: u64, max_size: u64) -> Result<(), SecurityError> {
    if size > max_size {
        return Err(SecurityError::FileSizeExceeded { limit: max_size });
    }
    Ok(())
}

/// Join a plain file name (no directories) onto `dir`.
pub fn secure_text_path(dir: &Path, file_name: &str) -> Result<PathBuf, SecurityError> {
    let name = file_name.trim();
    if name.is_empty()
        || name.len() > 64
        || name.starts_with('.')
        || name.contains("..")
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(SecurityError::InvalidPath);
    }
    let path = dir.join(name);
    if !path.starts_with(dir) {
        return Err(SecurityError::InvalidPath);
    }
    Ok(path)
}
