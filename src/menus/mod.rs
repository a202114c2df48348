//! # Menu Engine
//!
//! Data-driven menus in the WWIV tradition. A sysop describes menus as files;
//! this module turns keystrokes into commands and keeps track of where the
//! caller is.
//!
//! ## Components
//!
//! - [`hotkey`] - assembles typed keys into command tokens
//! - [`registry`] - command name → handler table, shared read-only
//! - [`executor`] - runs action lists against a session
//! - [`instance`] - one activation of one menu
//! - [`navigator`] - the per-session menu stack
//! - [`loader`] - reads menu sets from disk
//! - [`check`] - static checks over an installed set
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐  effect   ┌──────────────┐  actions  ┌────────────┐
//! │  Navigator  │ ◄──────── │ MenuInstance │ ────────► │  Executor  │
//! └─────────────┘           └──────────────┘           └────────────┘
//!        │ push / pop              │ token                    │ lookup
//!        ▼                         ▼                          ▼
//!   MenuStack               hotkey resolver            CommandRegistry
//! ```
//!
//! Handlers report navigation through [`model::MenuEffect`]; they never hold
//! the stack. A dropped connection surfaces as [`terminal::Hangup`] from any
//! terminal call and unwinds every loop through `?`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use menubbs::bbs::session::{Session, UserRecord};
//! use menubbs::menus::{JsonMenuLoader, MenuServices, Navigator, Terminal};
//!
//! fn serve(term: &mut dyn Terminal) {
//!     let services = Arc::new(MenuServices::new(Arc::new(JsonMenuLoader::new("menus"))));
//!     let mut session = Session::new("1", UserRecord::new("alice", 10), "wwiv");
//!     Navigator::new(services).run(&mut session, term);
//! }
//! ```

pub mod acs;
pub mod check;
pub mod commands;
pub mod executor;
pub mod hotkey;
pub mod instance;
pub mod loader;
pub mod model;
pub mod navigator;
pub mod registry;
pub mod sample;
pub mod services;
pub mod terminal;

pub use acs::{Acs, StrictAcs};
pub use executor::{run_action, run_actions, ActionOutcome, MenuEnv, MenuExecutionContext};
pub use hotkey::{resolve_hotkey, PrefixSets};
pub use instance::MenuInstance;
pub use loader::{JsonMenuLoader, MenuError, MenuLoader};
pub use model::{Action, LoadedMenu, MenuDescriptor, MenuEffect, MenuItem, MenuSet};
pub use navigator::{MenuStack, NavStep, Navigator, NavigatorExit};
pub use registry::{CommandCategory, CommandRegistry};
pub use services::{InteractiveMenuSetChooser, MenuServices};
pub use terminal::{Hangup, Terminal};
