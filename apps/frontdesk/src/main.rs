//! # Innkeep Front Desk Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Innkeep Front Desk                               │
//! │                                                                         │
//! │  main.rs ────► collects arguments, runs the tokio runtime              │
//! │                                                                         │
//! │  lib.rs ─────► logging, config, database lifetime, dispatch            │
//! │                                                                         │
//! │  commands/ ──► create_invoice, render_invoice, create_room, ...        │
//! │                                                                         │
//! │  state/ ─────► DbState, ConfigState                                    │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         SQLite Database                          │  │
//! │  │  innkeep.db (local file, WAL mode)                               │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // The actual setup is in lib.rs for better testability
    match innkeep_frontdesk::run(args).await {
        0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
