//! Login prompt handling ahead of the menu session.
mod common;

use std::sync::Arc;

use argon2::Argon2;
use common::ScriptedTerminal;
use menubbs::bbs::roles::SL_SYSOP;
use menubbs::bbs::server::authenticate;
use menubbs::bbs::BbsServer;
use menubbs::config::Config;
use menubbs::menus::{Hangup, JsonMenuLoader, MenuServices};
use password_hash::{PasswordHasher, SaltString};

fn services_with_password(password: Option<&str>) -> MenuServices {
    let hash = password.map(|p| {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Argon2::default()
            .hash_password(p.as_bytes(), &salt)
            .expect("hash")
            .to_string()
    });
    MenuServices::new(Arc::new(JsonMenuLoader::new("/nonexistent")))
        .with_system_password_hash(hash)
}

#[test]
fn new_callers_get_configured_levels() {
    let mut cfg = Config::default();
    cfg.bbs.new_user_sl = 20;
    cfg.bbs.new_user_dsl = 15;
    let services = services_with_password(None);
    let mut term = ScriptedTerminal::new("Carol\r");

    let user = authenticate(&mut term, &cfg.bbs, &services).unwrap();
    assert_eq!(user.name, "Carol");
    assert_eq!(user.sl, 20);
    assert_eq!(user.dsl, 15);
    assert!(user.hotkeys);
}

#[test]
fn invalid_handles_are_asked_again() {
    let cfg = Config::default();
    let services = services_with_password(None);
    let mut term = ScriptedTerminal::new("\r../etc\rdave\r");

    let user = authenticate(&mut term, &cfg.bbs, &services).unwrap();
    assert_eq!(user.name, "dave");
    assert_eq!(term.output.matches("Handle: ").count(), 3);
    assert!(term.output.contains("path separators"));
}

#[test]
fn sysop_needs_system_password() {
    let cfg = Config::default();
    let services = services_with_password(Some("correct horse"));

    let mut term = ScriptedTerminal::new("SysOp\rcorrect horse\r");
    let user = authenticate(&mut term, &cfg.bbs, &services).unwrap();
    assert_eq!(user.sl, SL_SYSOP);
    assert_eq!(user.dsl, SL_SYSOP);
    assert_eq!(user.name, cfg.bbs.sysop);
    assert!(!term.output.contains("correct horse"));

    let mut term = ScriptedTerminal::new("sysop\rwrong\rerin\r");
    let user = authenticate(&mut term, &cfg.bbs, &services).unwrap();
    assert_eq!(user.name, "erin");
    assert!(term.output.contains("Invalid password."));
}

#[test]
fn sysop_login_disabled_without_password() {
    let cfg = Config::default();
    let services = services_with_password(None);
    let mut term = ScriptedTerminal::new("sysop\r\rsysop\r\rsysop\r\r");

    assert_eq!(authenticate(&mut term, &cfg.bbs, &services), Err(Hangup));
    assert!(term.output.contains("Too many attempts. Goodbye."));
}

#[test]
fn eof_at_login_is_a_hangup() {
    let cfg = Config::default();
    let services = services_with_password(None);
    let mut term = ScriptedTerminal::new("fr");
    assert_eq!(authenticate(&mut term, &cfg.bbs, &services), Err(Hangup));
}

#[tokio::test]
async fn server_builds_from_default_config() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = Config::default();
    cfg.menus.base_dir = tmp.path().join("menus").to_string_lossy().to_string();
    menubbs::menus::sample::write_sample_menu_set(
        std::path::Path::new(&cfg.menus.base_dir),
        &cfg.menus.default_menu_set,
    )
    .unwrap();

    let server = BbsServer::new(cfg).await.expect("server");
    assert_eq!(server.active_sessions(), 0);
    assert!(server.services().registry.contains("ReturnFromMenu"));
}
