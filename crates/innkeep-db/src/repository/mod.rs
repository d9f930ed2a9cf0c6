//! # Repository Module
//!
//! Database repository implementations for Innkeep.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Front desk command                                                    │
//! │       │                                                                 │
//! │       │  db.invoices().save(&invoice)                                  │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  InvoiceRepository                                                     │
//! │  ├── save(&self, invoice)          upsert by id                        │
//! │  ├── list(&self)                   newest first                        │
//! │  ├── find_by_id(&self, id)                                             │
//! │  └── delete(&self, id)             → removed?                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Row structs stay private to each repository; callers only ever       │
//! │  see innkeep-core domain types.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`RoomRepository`](room::RoomRepository) - Room catalog
//! - [`ItemRepository`](item::ItemRepository) - Item catalog
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoice storage

pub mod invoice;
pub mod item;
pub mod room;
