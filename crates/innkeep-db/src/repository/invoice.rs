//! # Invoice Repository
//!
//! Durable storage for priced invoices.
//!
//! ## Save / Load Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Invoice Persistence                              │
//! │                                                                         │
//! │  save(&Invoice)                                                        │
//! │       │                                                                 │
//! │       ├── guest_info  ──► JSON text                                    │
//! │       ├── lodging     ──► JSON text, or NULL when there is no stay     │
//! │       ├── food_items  ──► JSON array text                              │
//! │       └── money       ──► integer cents columns (stored as computed)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT OR REPLACE INTO invoices ...    (upsert keyed by id)           │
//! │                                                                         │
//! │  list()                                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... ORDER BY date DESC                                         │
//! │       │                                                                 │
//! │       ├── row decodes     ──► Invoice                                  │
//! │       └── row is corrupt  ──► warn! and skip, keep listing             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here recomputes a total. What the calculator produced is what
//! comes back out.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use innkeep_core::{Invoice, Money};

use crate::codec::{
    decode_guest, decode_line_items, decode_lodging, decode_tax_rate, decode_timestamp,
    encode_guest, encode_line_items, encode_lodging, encode_timestamp, CodecError,
};
use crate::error::{DbError, DbResult};

/// A row of the `invoices` table.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    guest_info: String,
    room_info: Option<String>,
    food_items: String,
    tax_rate_bps: i64,
    discount_cents: i64,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    date: String,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = CodecError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            guest_info: decode_guest(&row.guest_info)?,
            lodging: decode_lodging(row.room_info.as_deref())?,
            food_items: decode_line_items(&row.food_items)?,
            tax_rate: decode_tax_rate(row.tax_rate_bps)?,
            date: decode_timestamp(&row.date)?,
            discount: Money::from_cents(row.discount_cents),
            subtotal: Money::from_cents(row.subtotal_cents),
            tax: Money::from_cents(row.tax_cents),
            total: Money::from_cents(row.total_cents),
            id: row.id,
        })
    }
}

fn decode_row(row: InvoiceRow) -> DbResult<Invoice> {
    let id = row.id.clone();
    Invoice::try_from(row).map_err(|e| DbError::corrupt("Invoice", id, e))
}

/// Decodes rows for a listing, dropping the ones that fail.
fn decode_listing(rows: Vec<InvoiceRow>) -> Vec<Invoice> {
    rows.into_iter()
        .filter_map(|row| match decode_row(row) {
            Ok(invoice) => Some(invoice),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable invoice row");
                None
            }
        })
        .collect()
}

const SELECT_INVOICE: &str = r#"
    SELECT id, guest_info, room_info, food_items, tax_rate_bps,
           discount_cents, subtotal_cents, tax_cents, total_cents, date
    FROM invoices
"#;

/// Repository for invoice operations.
///
/// ## Usage
/// ```rust,ignore
/// let invoice = calculator.calculate(&request)?;
/// db.invoices().save(&invoice).await?;
///
/// let stored = db.invoices().find_by_id(&invoice.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Saves an invoice, replacing any row with the same id.
    ///
    /// The blobs are encoded before anything touches the database, so an
    /// encoding failure writes nothing. The single-row write is atomic.
    ///
    /// ## Returns
    /// * `Ok(String)` - The invoice id
    /// * `Err(DbError::Serialization)` - A blob could not be encoded
    /// * `Err(DbError::ConstraintViolation)` - A CHECK rejected the row (negative discount)
    /// * `Err(DbError::ConnectionFailed)` - The pool was already closed
    pub async fn save(&self, invoice: &Invoice) -> DbResult<String> {
        let guest_info = encode_guest(&invoice.guest_info)?;
        let room_info = encode_lodging(&invoice.lodging)?;
        let food_items = encode_line_items(&invoice.food_items)?;

        debug!(
            id = %invoice.id,
            total_cents = invoice.total.cents(),
            with_stay = invoice.lodging.is_stay(),
            items = invoice.food_items.len(),
            "Saving invoice"
        );

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO invoices (
                id, guest_info, room_info, food_items, tax_rate_bps,
                discount_cents, subtotal_cents, tax_cents, total_cents, date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&invoice.id)
        .bind(guest_info)
        .bind(room_info)
        .bind(food_items)
        .bind(i64::from(invoice.tax_rate.bps()))
        .bind(invoice.discount.cents())
        .bind(invoice.subtotal.cents())
        .bind(invoice.tax.cents())
        .bind(invoice.total.cents())
        .bind(encode_timestamp(invoice.date))
        .execute(&self.pool)
        .await?;

        info!(id = %invoice.id, "Invoice saved");
        Ok(invoice.id.clone())
    }

    /// Lists every invoice, newest first. Corrupt rows are logged and skipped.
    pub async fn list(&self) -> DbResult<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "{} ORDER BY date DESC, id DESC",
            SELECT_INVOICE
        ))
        .fetch_all(&self.pool)
        .await?;

        let invoices = decode_listing(rows);
        debug!(count = invoices.len(), "Listed invoices");
        Ok(invoices)
    }

    /// Lists invoices dated within `[from, to]`, newest first.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "{} WHERE date >= ?1 AND date <= ?2 ORDER BY date DESC, id DESC",
            SELECT_INVOICE
        ))
        .bind(encode_timestamp(from))
        .bind(encode_timestamp(to))
        .fetch_all(&self.pool)
        .await?;

        let invoices = decode_listing(rows);
        debug!(%from, %to, count = invoices.len(), "Listed invoices in range");
        Ok(invoices)
    }

    /// Finds one invoice by id.
    ///
    /// ## Returns
    /// * `Ok(Some(Invoice))` - Found and decoded
    /// * `Ok(None)` - No such invoice
    /// * `Err(DbError::CorruptRecord)` - Row exists but cannot be decoded
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!("{} WHERE id = ?1", SELECT_INVOICE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(decode_row).transpose()
    }

    /// Deletes an invoice.
    ///
    /// ## Returns
    /// * `Ok(true)` - A row was removed
    /// * `Ok(false)` - No invoice with this id
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        debug!(id = %id, removed, "Deleted invoice");
        Ok(removed)
    }

    /// Counts stored invoices.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
