//! Binary entrypoint for the menubbs CLI.
//!
//! Commands:
//! - `start [--bind <addr>]` - run the telnet BBS
//! - `init` - write a starter `config.toml`, a sample menu set and a rules file
//! - `status` - print configuration and installed menu sets
//! - `check [--menu-set <name>]` - load every menu of a set and report problems
//! - `commands` - list the built-in commands
//! - `system-passwd` - interactively set the system password (argon2 hashed)
//!
//! See the library crate docs for module-level details: `menubbs::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::Path;

use menubbs::bbs::BbsServer;
use menubbs::config::Config;
use menubbs::menus::check::check_menu_set;
use menubbs::menus::sample::write_sample_menu_set;
use menubbs::menus::{CommandRegistry, JsonMenuLoader};

#[derive(Parser)]
#[command(name = "menubbs")]
#[command(about = "A data-driven menu BBS served over telnet")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the BBS server
    Start {
        /// Listen address, overriding `[server] bind`
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Initialize a new BBS configuration and sample menus
    Init,
    /// Show configuration and installed menu sets
    Status,
    /// Validate the menus of a menu set
    Check {
        /// Menu set to check (defaults to `[menus] default_menu_set`)
        #[arg(short, long)]
        menu_set: Option<String>,
    },
    /// List the built-in menu commands
    Commands,
    /// Set or update the system password used by `*SYSTEM` menus and sysop login
    SystemPasswd,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init | Commands::Commands => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Start { bind } => {
            let mut config = match pre_config {
                Some(c) => c,
                None => Config::load(&cli.config).await?,
            };
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            info!("Starting menubbs v{}", env!("CARGO_PKG_VERSION"));
            let mut bbs = BbsServer::new(config).await?;
            bbs.run().await?;
        }
        Commands::Init => {
            info!("Initializing new BBS configuration");
            if Path::new(&cli.config).exists() {
                return Err(anyhow!(
                    "{} already exists; remove it first to re-initialize",
                    cli.config
                ));
            }
            let cfg = Config::default();
            cfg.save(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);

            let dir = write_sample_menu_set(
                Path::new(&cfg.menus.base_dir),
                &cfg.menus.default_menu_set,
            )?;
            info!("Sample menu set written to {}", dir.display());

            tokio::fs::create_dir_all(&cfg.menus.gfiles_dir).await?;
            let rules = Path::new(&cfg.menus.gfiles_dir).join("rules.msg");
            if !rules.exists() {
                tokio::fs::write(&rules, "Be excellent to each other.\n").await?;
            }
            println!("Run `menubbs system-passwd` to enable sysop login and *SYSTEM menus.");
        }
        Commands::Status => {
            let config = match pre_config {
                Some(c) => c,
                None => Config::load(&cli.config).await?,
            };
            let bbs = BbsServer::new(config).await?;
            bbs.show_status().await?;
        }
        Commands::Check { menu_set } => {
            let config = match pre_config {
                Some(c) => c,
                None => Config::load(&cli.config).await?,
            };
            let set = menu_set.unwrap_or_else(|| config.menus.default_menu_set.clone());
            let loader = JsonMenuLoader::new(&config.menus.base_dir);
            let issues = check_menu_set(&loader, &CommandRegistry::standard(), &set)?;
            if issues.is_empty() {
                println!("Menu set '{}' OK.", set);
            } else {
                for issue in &issues {
                    println!("{}", issue);
                }
                return Err(anyhow!("{} problem(s) in menu set '{}'", issues.len(), set));
            }
        }
        Commands::Commands => {
            let registry = CommandRegistry::standard();
            let mut category = None;
            for spec in registry.listing() {
                if category != Some(spec.category) {
                    println!("\n[{}]", spec.category);
                    category = Some(spec.category);
                }
                println!("  {:<20} {}", spec.name, spec.description);
            }
        }
        Commands::SystemPasswd => {
            use password_hash::{PasswordHasher, SaltString};
            let mut config = match pre_config {
                Some(c) => c,
                None => Config::load(&cli.config).await?,
            };
            println!("Setting the system password for '{}'.", config.bbs.name);
            let pass1 = rpassword::prompt_password("New password: ")?;
            if pass1.len() < 8 {
                println!("Error: password too short (min 8).");
                return Ok(());
            }
            // Menu password prompts accept at most 20 characters.
            if pass1.len() > 20 {
                println!("Error: password too long (max 20).");
                return Ok(());
            }
            let pass2 = rpassword::prompt_password("Confirm password: ")?;
            if pass1 != pass2 {
                println!("Error: passwords do not match.");
                return Ok(());
            }
            let salt = SaltString::generate(&mut rand::thread_rng());
            let hash = config
                .password_hasher()?
                .hash_password(pass1.as_bytes(), &salt)
                .map_err(|e| anyhow!("Hash error: {}", e))?
                .to_string();
            config.bbs.system_password_hash = Some(hash);
            config.save(&cli.config).await?;
            println!("System password updated successfully.");
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    let configured = config
        .as_ref()
        .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| eprintln!("Cannot open log file {}: {}", path, e))
                .ok()
        })
        .map(|f| std::sync::Arc::new(std::sync::Mutex::new(f)));
    let security_path = config.as_ref().and_then(|c| c.logging.security_file.clone());
    // Without a log file everything goes to the console; with one, only a TTY gets a copy.
    let to_console = log_file.is_none() || atty::is(atty::Stream::Stdout);

    builder.format(move |fmt, record| {
        let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let line = format!("{} [{}] {}", ts, record.level(), record.args());

        if let Some(file) = &log_file {
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "{}", line);
            }
        }
        if record.target() == "security" {
            if let Some(sec_path) = &security_path {
                if let Ok(mut sf) = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(sec_path)
                {
                    let _ = writeln!(sf, "{}", line);
                }
            }
        }
        if to_console {
            writeln!(fmt, "{}", line)
        } else {
            Ok(())
        }
    });
    let _ = builder.try_init();
}
