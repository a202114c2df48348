//! # BBS Core Module
//!
//! The connection side of the system: who is calling, how they log in, and
//! how their keystrokes reach the menu engine.
//!
//! ## Components
//!
//! - [`server`] - TCP listener, login, one menu session per caller
//! - [`telnet`] - blocking telnet [`Terminal`](crate::menus::Terminal)
//! - [`session`] - per-caller state the menus act on
//! - [`roles`] - security level constants
//!
//! ## Session Lifecycle
//!
//! 1. Caller connects; the server negotiates character mode
//! 2. Caller types a handle (the sysop handle also needs the system password)
//! 3. A [`session::Session`] is created with the default menu set and numbered areas
//! 4. The menu navigator runs until hangup or main-menu denial
//! 5. The connection is closed and the session slot released

pub mod roles;
pub mod server;
pub mod session;
pub mod telnet;

pub use server::BbsServer;
