//! # Commands Module
//!
//! Every operation the front desk exposes.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── catalog.rs  ◄─── Room and item CRUD
//! ├── invoice.rs  ◄─── Create, list, fetch, delete, render invoices
//! └── report.rs   ◄─── Revenue summary over stored invoices
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  innkeep-frontdesk invoice create draft.json                           │
//! │         │                                                               │
//! │         │ (cli.rs parses args, deserializes the draft)                 │
//! │         ▼                                                               │
//! │  pub async fn create_invoice(                                           │
//! │      db: &DbState,            ◄── Owned by lib.rs::run                 │
//! │      config: &ConfigState,    ◄── Loaded once at startup               │
//! │      draft: InvoiceDraft,     ◄── Request DTO                          │
//! │  ) -> Result<Invoice, ApiError>                                         │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  stdout: { "id": "INV-...", "total": 37800, ... }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs database
//! async fn list_rooms(db: &DbState)
//!
//! // Needs both
//! async fn render_invoice(db: &DbState, config: &ConfigState, id: &str)
//! ```

pub mod catalog;
pub mod invoice;
pub mod report;
