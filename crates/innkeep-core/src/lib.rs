//! # innkeep-core: Pure Business Logic for Innkeep
//!
//! This crate is the **heart** of Innkeep. It prices guest invoices and
//! describes the catalog, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Innkeep Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Front desk shell (innkeep-frontdesk)            │   │
//! │  │    invoice form ──► calculator ──► store ──► renderer          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ innkeep-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐ ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ calculator │ │ validation│  │   │
//! │  │   │ Room,Item │  │   Money   │  │  Invoice-  │ │   rules   │  │   │
//! │  │   │  Invoice  │  │  TaxRate  │  │ Calculator │ │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘ └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐                                 │   │
//! │  │   │  render   │  │  report   │                                 │   │
//! │  │   │ documents │  │  revenue  │                                 │   │
//! │  │   └───────────┘  └───────────┘                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   innkeep-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Room, Item, Invoice, LineItem, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`calculator`] - Turns a front desk selection into a priced invoice
//! - [`render`] - Formats a stored invoice into a document
//! - [`report`] - Revenue aggregation over stored invoices
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Same input = same output, except `InvoiceCalculator::calculate`
//!    and `generate_invoice_id`, which read the clock and draw a random UUID
//!    (`calculate_at` takes both from the caller)
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Snapshots**: Invoices copy prices out of the catalog; they are never recomputed
//!
//! ## Example Usage
//!
//! ```rust
//! use innkeep_core::money::Money;
//! use innkeep_core::types::TaxRate;
//!
//! // A night at 45.00 with 12.5% tax
//! let room = Money::from_cents(4500);
//! let tax = room.calculate_tax(TaxRate::from_bps(1250));
//!
//! // 562.5 cents rounds half-up to 563
//! assert_eq!(tax.cents(), 563);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod error;
pub mod money;
pub mod render;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::{InvoiceCalculator, InvoiceRequest, InvoiceTotals, StayDatePolicy};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use render::{CurrencyFormat, HotelHeader, InvoiceRenderer, TextInvoiceRenderer};
pub use report::{RevenueStream, RevenueSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line item.
///
/// Catches typos like 1000 instead of 10 at the front desk.
pub const MAX_LINE_ITEM_QUANTITY: i64 = 999;

/// Prefix of every generated invoice id.
pub const INVOICE_ID_PREFIX: &str = "INV";
