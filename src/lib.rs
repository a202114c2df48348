//! # menubbs - a data-driven menu BBS
//!
//! menubbs runs WWIV-style menus over telnet. Sysops describe menus as files:
//! items bound to hotkeys, each item a list of named commands. The engine
//! turns keystrokes into tokens, tokens into commands, and commands into
//! moves on a per-caller menu stack.
//!
//! ## Features
//!
//! - **Hotkeys**: single-key commands with multi-key prefixes for numbered areas and `/X` commands
//! - **Menu Sets**: swappable families of menus with shared global items
//! - **Access Control**: pluggable ACS evaluation for menus and items; per-menu passwords
//! - **Audit Logging**: denials go to a dedicated security log
//! - **Async Front End**: tokio listener, one blocking thread per caller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use menubbs::config::Config;
//! use menubbs::bbs::BbsServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut server = BbsServer::new(config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`menus`] - the menu engine: resolver, registry, executor, instance, navigator
//! - [`bbs`] - server, telnet terminal, sessions and roles
//! - [`config`] - configuration management
//! - [`validation`] - name validation and safe paths
//! - [`logutil`] - log escaping and the sysop menu-log format
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   BBS Server    │ ← accepts callers, logs them in
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Navigator     │ ← one menu stack per caller
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Menu Instance  │ ← prompt, resolve, execute
//! └─────────────────┘
//! ```

pub mod bbs;
pub mod config;
pub mod logutil;
pub mod menus;
pub mod validation;
