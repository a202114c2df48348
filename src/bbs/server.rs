use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use std::net::{SocketAddr, TcpStream as TcpStdStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use super::roles::{role_name, SL_SYSOP};
use super::session::{Session, UserRecord};
use super::telnet::TelnetTerminal;
use crate::config::{BbsConfig, Config};
use crate::logutil::escape_log;
use crate::menus::instance::MAX_PASSWORD_LEN;
use crate::menus::loader::{JsonMenuLoader, MenuLoader};
use crate::menus::navigator::{Navigator, NavigatorExit};
use crate::menus::services::MenuServices;
use crate::menus::terminal::{Hangup, Terminal};
use crate::validation::{validate_sysop_name, validate_user_name};

macro_rules! sec_log {
    ($($arg:tt)*) => { log::warn!(target: "security", $($arg)*); };
}

const LOGIN_ATTEMPTS: usize = 3;

/// # BBS Server
///
/// Accepts telnet connections and gives each caller a menu session.
///
/// ## Architecture
///
/// ```text
/// ┌─────────────────┐  accept  ┌─────────────────┐  spawn_blocking  ┌───────────┐
/// │  TcpListener    │────────→│   BbsServer     │─────────────────→│ Navigator │
/// └─────────────────┘          └─────────────────┘   one per caller └───────────┘
///                                      │
///                              ┌─────────────────┐
///                              │  MenuServices   │ ← shared, read-only
///                              └─────────────────┘
/// ```
///
/// The menu engine is synchronous, so every connection is turned back into a
/// blocking socket and driven from tokio's blocking pool. The accept loop
/// never waits on a caller.
///
/// ## Usage
///
/// ```rust,no_run
/// use menubbs::bbs::BbsServer;
/// use menubbs::config::Config;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = Config::load("config.toml").await?;
///     let mut server = BbsServer::new(config).await?;
///     server.run().await
/// }
/// ```
pub struct BbsServer {
    config: Arc<Config>,
    services: Arc<MenuServices>,
    active: Arc<AtomicUsize>,
}

/// Releases a session slot when the connection ends, however it ends.
struct SessionSlot(Arc<AtomicUsize>);

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl BbsServer {
    pub async fn new(config: Config) -> Result<Self> {
        if let Err(e) = validate_sysop_name(&config.bbs.sysop) {
            return Err(anyhow!(
                "Invalid sysop name '{}': {}\n\n\
                SOLUTION: Edit your config.toml file and change the 'sysop' field.\n\
                Valid sysop names are 2-20 letters, digits, '_', '-' or '.'",
                config.bbs.sysop,
                e
            ));
        }

        let loader = JsonMenuLoader::new(&config.menus.base_dir);
        if !loader.is_valid_set(&config.menus.default_menu_set) {
            warn!(
                "default menu set '{}' has no main menu under {}; callers will be asked to pick one",
                config.menus.default_menu_set, config.menus.base_dir
            );
        }
        let services = MenuServices::new(Arc::new(loader))
            .with_system_password_hash(config.bbs.system_password_hash.clone());

        Ok(BbsServer {
            config: Arc::new(config),
            services: Arc::new(services),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Replace the shared collaborators, e.g. with a real ACS evaluator.
    pub fn with_services(mut self, services: MenuServices) -> Self {
        self.services = Arc::new(services);
        self
    }

    pub fn services(&self) -> Arc<MenuServices> {
        Arc::clone(&self.services)
    }

    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Accept callers until Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.server.bind)
            .await
            .map_err(|e| anyhow!("Failed to bind {}: {}", self.config.server.bind, e))?;
        info!(
            "BBS '{}' listening on {} (sysop {})",
            self.config.bbs.name,
            listener.local_addr()?,
            self.config.bbs.sysop
        );
        self.serve(listener).await
    }

    /// Accept loop on an already bound listener.
    pub async fn serve(&mut self, listener: TcpListener) -> Result<()> {
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.accept_connection(stream, peer).await,
                    Err(e) => warn!("accept failed: {}", e),
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down BBS server ({} sessions active)", self.active_sessions());
                    return Ok(());
                }
            }
        }
    }

    async fn accept_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        let previous = self.active.fetch_add(1, Ordering::SeqCst);
        let slot = SessionSlot(Arc::clone(&self.active));
        if previous >= self.config.server.max_sessions {
            info!("rejecting {}: {} sessions active", peer, previous);
            let busy = format!(
                "\r\n{} is busy, please call back later.\r\n",
                self.config.bbs.name
            );
            let _ = stream.write_all(busy.as_bytes()).await;
            let _ = stream.shutdown().await;
            return;
        }

        let std_stream = match stream.into_std() {
            Ok(s) => s,
            Err(e) => {
                warn!("cannot hand off connection from {}: {}", peer, e);
                return;
            }
        };
        let config = Arc::clone(&self.config);
        let services = Arc::clone(&self.services);
        tokio::task::spawn_blocking(move || {
            let _slot = slot;
            if let Err(e) = serve_connection(std_stream, peer, &config, services) {
                warn!("session from {} ended with error: {}", peer, e);
            }
        });
    }

    pub async fn show_status(&self) -> Result<()> {
        println!("=== {} Status ===", env!("CARGO_PKG_NAME"));
        println!("BBS Name: {}", self.config.bbs.name);
        println!("Sysop: {}", self.config.bbs.sysop);
        println!("Listen: {}", self.config.server.bind);
        println!("Active Sessions: {}", self.active_sessions());
        println!(
            "System password: {}",
            if self.services.system_password_hash.is_some() { "set" } else { "not set" }
        );
        let sets = self.services.loader.menu_sets();
        println!("Menu sets ({}):", sets.len());
        for set in sets {
            let marker = if set.name == self.config.menus.default_menu_set { "*" } else { " " };
            println!(" {} {:<12} {}", marker, set.name, set.description);
        }
        Ok(())
    }
}

fn serve_connection(
    stream: TcpStdStream,
    peer: SocketAddr,
    config: &Config,
    services: Arc<MenuServices>,
) -> Result<()> {
    stream.set_nonblocking(false)?;
    let idle = Duration::from_secs(u64::from(config.bbs.session_timeout.max(1)) * 60);
    stream.set_read_timeout(Some(idle))?;
    let reader = stream.try_clone()?;
    let mut term = TelnetTerminal::new(reader, stream);

    let session_id = uuid::Uuid::new_v4().to_string();
    info!("session {} connected from {}", session_id, peer);

    let mut user = match greet_and_login(&mut term, &config.bbs, &services) {
        Ok(user) => user,
        Err(Hangup) => {
            info!("session {} left before logging in", session_id);
            return Ok(());
        }
    };

    user.hotkeys = config.menus.hotkeys_default;
    let mut session = Session::new(session_id, user, config.menus.default_menu_set.clone())
        .with_numbered_areas(config.menus.message_areas, config.menus.file_areas)
        .with_gfiles_dir(&config.menus.gfiles_dir);
    info!(
        "session {}: {} logged in as {}",
        session.id,
        escape_log(session.display_name()),
        role_name(session.user.sl)
    );

    let exit = Navigator::new(services).run(&mut session, &mut term);
    session.update_activity();
    match exit {
        NavigatorExit::Hangup => info!(
            "session {}: {} disconnected after {}s",
            session.id,
            escape_log(session.display_name()),
            session.session_duration().num_seconds()
        ),
        NavigatorExit::MainMenuDenied => {
            sec_log!(
                "session {}: {} denied the main menu, disconnecting",
                session.id,
                escape_log(session.display_name())
            );
        }
    }
    debug!("session {} read {} bytes", session.id, term.bytes_in());
    Ok(())
}

fn greet_and_login(
    term: &mut TelnetTerminal<TcpStdStream, TcpStdStream>,
    bbs: &BbsConfig,
    services: &MenuServices,
) -> Result<UserRecord, Hangup> {
    term.negotiate()?;
    term.print_text(&format!("\nWelcome to {}\n\n", bbs.name))?;
    authenticate(term, bbs, services)
}

/// Ask for a handle (and the system password for the sysop) until one is
/// accepted or the attempts run out.
pub fn authenticate(
    term: &mut dyn Terminal,
    bbs: &BbsConfig,
    services: &MenuServices,
) -> Result<UserRecord, Hangup> {
    for _ in 0..LOGIN_ATTEMPTS {
        term.write_str("Handle: ")?;
        let typed = term.input_line(30)?;
        let handle = typed.trim();
        if handle.is_empty() {
            continue;
        }

        if handle.eq_ignore_ascii_case(&bbs.sysop) {
            let password = term.input_password("Password: ", MAX_PASSWORD_LEN)?;
            if services.verify_system_password(&password) {
                let mut user = UserRecord::new(bbs.sysop.clone(), SL_SYSOP);
                user.dsl = SL_SYSOP;
                return Ok(user);
            }
            sec_log!("failed sysop login for '{}'", escape_log(handle));
            term.print_text("\nInvalid password.\n")?;
            continue;
        }

        match validate_user_name(handle) {
            Ok(name) => {
                let mut user = UserRecord::new(name, bbs.new_user_sl);
                user.dsl = bbs.new_user_dsl;
                return Ok(user);
            }
            Err(e) => {
                debug!("rejected handle '{}': {}", escape_log(handle), e);
                term.print_text(&format!("\n{}\n", e))?;
            }
        }
    }
    sec_log!("too many failed login attempts");
    term.print_text("\nToo many attempts. Goodbye.\n")?;
    Err(Hangup)
}
