//! # Configuration Management Module
//!
//! TOML configuration for the BBS and its menu engine.
//!
//! ## Configuration Structure
//!
//! - [`BbsConfig`] - station name, sysop, system password, new-user levels
//! - [`MenusConfig`] - where menu sets and text files live, area counts
//! - [`ServerConfig`] - listen address and session cap
//! - [`LoggingConfig`] - log level and files
//! - [`SecurityConfig`] - argon2 parameters for hashing the system password
//!
//! ## Usage
//!
//! ```rust,no_run
//! use menubbs::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("BBS Name: {}", config.bbs.name);
//!     println!("Menu sets: {}", config.menus.base_dir);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bbs]
//! name = "My BBS"
//! sysop = "sysop"
//! new_user_sl = 10
//! session_timeout = 10
//!
//! [menus]
//! base_dir = "./menus"
//! default_menu_set = "wwiv"
//! gfiles_dir = "./gfiles"
//! message_areas = 12
//! file_areas = 4
//!
//! [server]
//! bind = "0.0.0.0:2323"
//! max_sessions = 16
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{anyhow, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::bbs::roles::SL_NEW_USER;
use crate::validation::{validate_menu_name, validate_sysop_name};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BbsConfig {
    pub name: String,
    pub sysop: String,
    /// Argon2 PHC string checked for `*SYSTEM` menu passwords and sysop login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_password_hash: Option<String>,
    #[serde(default = "default_new_user_sl")]
    pub new_user_sl: u8,
    #[serde(default)]
    pub new_user_dsl: u8,
    /// Idle minutes before a caller is disconnected.
    pub session_timeout: u32,
}

fn default_new_user_sl() -> u8 {
    SL_NEW_USER
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenusConfig {
    pub base_dir: String,
    pub default_menu_set: String,
    /// Text files shown by `PrintFile`.
    #[serde(default = "default_gfiles_dir")]
    pub gfiles_dir: String,
    /// Numbered message subs offered to every session.
    #[serde(default)]
    pub message_areas: usize,
    /// Numbered file directories offered to every session.
    #[serde(default)]
    pub file_areas: usize,
    #[serde(default = "default_hotkeys")]
    pub hotkeys_default: bool,
}

fn default_gfiles_dir() -> String {
    "./gfiles".to_string()
}

fn default_hotkeys() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub max_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(default)]
    pub security_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Argon2Config {
    #[serde(default)]
    pub memory_kib: Option<u32>,
    #[serde(default)]
    pub time_cost: Option<u32>,
    #[serde(default)]
    pub parallelism: Option<u32>,
}

impl Argon2Config {
    /// Build a hasher from the configured parameters, falling back to argon2 defaults.
    pub fn hasher(&self) -> Result<Argon2<'static>> {
        let defaults = Params::default();
        let params = Params::new(
            self.memory_kib.unwrap_or(defaults.m_cost()),
            self.time_cost.unwrap_or(defaults.t_cost()),
            self.parallelism.unwrap_or(defaults.p_cost()),
            None,
        )
        .map_err(|e| anyhow!("Invalid argon2 parameters: {}", e))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecurityConfig {
    #[serde(default)]
    pub argon2: Option<Argon2Config>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bbs: BbsConfig,
    pub menus: MenusConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: Option<SecurityConfig>,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        Config::default().save(path).await
    }

    pub async fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_sysop_name(&self.bbs.sysop)
            .map_err(|e| anyhow!("Invalid sysop name '{}': {}", self.bbs.sysop, e))?;
        validate_menu_name(&self.menus.default_menu_set).map_err(|e| {
            anyhow!(
                "Invalid default menu set '{}': {}",
                self.menus.default_menu_set,
                e
            )
        })?;
        if self.server.max_sessions == 0 {
            return Err(anyhow!("server.max_sessions must be at least 1"));
        }
        Ok(())
    }

    /// Argon2 hasher honouring `[security.argon2]`.
    pub fn password_hasher(&self) -> Result<Argon2<'static>> {
        self.security
            .as_ref()
            .and_then(|s| s.argon2.clone())
            .unwrap_or_default()
            .hasher()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bbs: BbsConfig {
                name: "menubbs Station".to_string(),
                sysop: "sysop".to_string(),
                system_password_hash: None,
                new_user_sl: SL_NEW_USER,
                new_user_dsl: 0,
                session_timeout: 10,
            },
            menus: MenusConfig {
                base_dir: "./menus".to_string(),
                default_menu_set: "wwiv".to_string(),
                gfiles_dir: default_gfiles_dir(),
                message_areas: 12,
                file_areas: 4,
                hotkeys_default: true,
            },
            server: ServerConfig {
                bind: "127.0.0.1:2323".to_string(),
                max_sessions: 16,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("menubbs.log".to_string()),
                security_file: Some("menubbs-security.log".to_string()),
            },
            security: Some(SecurityConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.menus.default_menu_set, "wwiv");
        assert!(config.bbs.system_password_hash.is_none());
    }

    #[test]
    fn test_minimal_sections_use_defaults() {
        let toml_text = r#"
            [bbs]
            name = "Test"
            sysop = "sysop"
            session_timeout = 5

            [menus]
            base_dir = "m"
            default_menu_set = "classic"

            [server]
            bind = "127.0.0.1:0"
            max_sessions = 2

            [logging]
            level = "debug"
        "#;
        let config: Config = toml::from_str(toml_text).unwrap();
        assert_eq!(config.bbs.new_user_sl, SL_NEW_USER);
        assert_eq!(config.menus.gfiles_dir, "./gfiles");
        assert!(config.menus.hotkeys_default);
        assert_eq!(config.menus.message_areas, 0);
        assert!(config.security.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.menus.default_menu_set = "../etc".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.max_sessions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_argon2_params_applied() {
        let mut config = Config::default();
        config.security = Some(SecurityConfig {
            argon2: Some(Argon2Config {
                memory_kib: Some(8 * 1024),
                time_cost: Some(1),
                parallelism: Some(1),
            }),
        });
        let hasher = config.password_hasher().unwrap();
        assert_eq!(hasher.params().m_cost(), 8 * 1024);
        assert_eq!(hasher.params().t_cost(), 1);
    }

    #[tokio::test]
    async fn test_create_default_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();
        let loaded = Config::load(path).await.unwrap();
        assert_eq!(loaded.bbs.name, "menubbs Station");
        assert_eq!(loaded.server.max_sessions, 16);
        assert_eq!(loaded.logging.security_file.as_deref(), Some("menubbs-security.log"));
    }
}
