//! # State Module
//!
//! Application state handed to every command.
//!
//! Each command declares exactly the state it needs, so the database
//! handle and the configuration live in separate types.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      lib.rs::run                                │   │
//! │  │  let config = ConfigState::load(None)?;                         │   │
//! │  │  let db = DbState::new(Database::new(..).await?);               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │               ┌──────────────┴──────────────┐                          │
//! │               ▼                             ▼                           │
//! │  ┌──────────────────────┐      ┌──────────────────────────┐            │
//! │  │       DbState        │      │       ConfigState        │            │
//! │  │                      │      │                          │            │
//! │  │  Database            │      │  hotel name / address    │            │
//! │  │  (SQLite pool)       │      │  currency prefix         │            │
//! │  │                      │      │  default tax rate        │            │
//! │  │                      │      │  stay date policy        │            │
//! │  └──────────────────────┘      └──────────────────────────┘            │
//! │                                                                         │
//! │  DbState: Database has an internal connection pool                     │
//! │  ConfigState: read-only after startup                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;

pub use config::{ConfigError, ConfigState};
pub use db::DbState;
