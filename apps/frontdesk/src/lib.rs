//! # Innkeep Front Desk Library
//!
//! Core library for the Innkeep front desk shell.
//! This is the entry point that loads configuration, owns the database
//! and dispatches commands.
//!
//! ## Module Organization
//! ```text
//! innkeep_frontdesk/
//! ├── lib.rs          ◄─── You are here (startup, dispatch, shutdown)
//! ├── cli.rs          ◄─── Argument parsing and output shaping
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── config.rs   ◄─── Configuration state (TOML + env)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── catalog.rs  ◄─── Room and item commands
//! │   ├── invoice.rs  ◄─── Invoice commands
//! │   └── report.rs   ◄─── Revenue report
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Database Lifetime
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Handle, Explicitly Owned                         │
//! │                                                                         │
//! │  run()                                                                  │
//! │    │                                                                    │
//! │    ├── Database::new(..)  ──► DbState                                  │
//! │    │                            │                                       │
//! │    │                            │ &DbState                              │
//! │    │                            ▼                                       │
//! │    ├── cli::execute(command, &db, &config)                             │
//! │    │                            │                                       │
//! │    │                  Ok / Err  │                                       │
//! │    │                            ▼                                       │
//! │    └── db.close()  ◄── runs whatever the command returned              │
//! │                                                                         │
//! │  There is no global connection: commands only see what they are given. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Command, Output};
use error::ApiError;
use innkeep_db::{Database, DbConfig};
use state::{ConfigState, DbState};

/// Runs one front desk command and returns the process exit code.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Front Desk Startup                                │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter                                │
/// │     • Default: info,innkeep=debug,sqlx=warn; override with RUST_LOG     │
/// │                                                                         │
/// │  2. Parse Arguments ──────────────────────────────────────────────────► │
/// │     • Bad arguments fail before anything is opened                      │
/// │                                                                         │
/// │  3. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → frontdesk.toml → INNKEEP_* environment                 │
/// │                                                                         │
/// │  4. Connect to Database ──────────────────────────────────────────────► │
/// │     • INNKEEP_DB_PATH or the platform data directory                    │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │                                                                         │
/// │  5. Execute Command, Close Database, Print Result ────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(args: Vec<String>) -> i32 {
    init_tracing();

    match dispatch(&args).await {
        Ok(Output::Json(value)) => match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{}", text);
                0
            }
            Err(e) => {
                error!("Failed to print result: {}", e);
                1
            }
        },
        Ok(Output::Text(text)) => {
            println!("{}", text);
            0
        }
        Err(err) => {
            match serde_json::to_string(&err) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", err),
            }
            1
        }
    }
}

async fn dispatch(args: &[String]) -> Result<Output, ApiError> {
    let command = Command::parse(args)?;
    let config = ConfigState::load(None)?;

    if !command.needs_database() {
        return cli::execute_offline(&command, &config);
    }

    let db_path = get_database_path()?;
    info!(?db_path, "Database path determined");

    let db = DbState::new(Database::new(DbConfig::new(db_path)).await?);
    info!("Database connected and migrations applied");

    let result = cli::execute(command, &db, &config).await;

    db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=innkeep=trace` - Show trace for innkeep crates only
/// - Default: INFO, DEBUG for innkeep crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,innkeep=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.innkeep.frontdesk/innkeep.db`
/// - **Windows**: `%APPDATA%\innkeep\frontdesk\data\innkeep.db`
/// - **Linux**: `~/.local/share/frontdesk/innkeep.db`
///
/// ## Override
/// Set `INNKEEP_DB_PATH` to use a custom path.
fn get_database_path() -> Result<PathBuf, ApiError> {
    if let Ok(path) = std::env::var("INNKEEP_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "innkeep", "frontdesk")
        .ok_or_else(|| ApiError::internal("Could not determine app data directory"))?;

    let data_dir = proj_dirs.data_dir();

    std::fs::create_dir_all(data_dir).map_err(|e| {
        ApiError::internal(format!(
            "Could not create data directory {}: {}",
            data_dir.display(),
            e
        ))
    })?;

    Ok(data_dir.join("innkeep.db"))
}
