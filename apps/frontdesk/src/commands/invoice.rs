//! # Invoice Commands
//!
//! Creating, reading and rendering invoices.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Invoice Creation Flow                                │
//! │                                                                         │
//! │  InvoiceDraft { withStay, guestInfo, roomId?, items[], taxRate? }      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Resolve catalog references                                            │
//! │  • roomId  ─► RoomRepository::get_by_id  ─► selected room              │
//! │  • itemId  ─► ItemRepository::get_by_id  ─► LineItem snapshot          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InvoiceCalculator::calculate(request)                                 │
//! │       │                                                                 │
//! │       ├── Err(Validation) ──► ApiError, nothing saved                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InvoiceRepository::save(invoice)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Return the priced Invoice                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering reads the stored invoice back and formats it; no amount is
//! recomputed after save.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};
use innkeep_core::validation::{validate_id, validate_quantity, validate_tax_percentage};
use innkeep_core::{
    GuestInfo, Invoice, InvoiceRenderer, InvoiceRequest, LineItem, Money, TaxRate,
};

/// One requested catalog item on a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLine {
    pub item_id: String,
    pub quantity: i64,
}

/// Invoice form as submitted by the front desk.
///
/// Catalog references are resolved at submit time, so the invoice carries
/// the prices in effect right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub with_stay: bool,
    pub guest_info: GuestInfo,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub items: Vec<DraftLine>,
    /// Percentage (0-100). Falls back to the configured default.
    #[serde(default)]
    pub tax_rate: Option<f64>,
    #[serde(default)]
    pub discount: Money,
}

/// Row shown in the invoice list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummaryDto {
    pub id: String,
    pub guest_name: String,
    pub room_number: Option<String>,
    pub nights: u32,
    pub item_count: usize,
    pub total_cents: i64,
    pub date: String,
}

impl From<Invoice> for InvoiceSummaryDto {
    fn from(inv: Invoice) -> Self {
        InvoiceSummaryDto {
            room_number: inv.lodging.stay().map(|s| s.room_number.clone()),
            nights: inv.lodging.nights(),
            item_count: inv.food_items.len(),
            total_cents: inv.total.cents(),
            date: inv.date.to_rfc3339(),
            guest_name: inv.guest_info.name,
            id: inv.id,
        }
    }
}

/// A rendered invoice document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedInvoice {
    pub invoice_id: String,
    pub content_type: String,
    pub body: String,
}

/// Prices a draft and saves the result.
///
/// ## Errors
/// - `VALIDATION_ERROR`: the calculator rejected the draft (nothing saved)
/// - `NOT_FOUND`: a referenced room or item does not exist
pub async fn create_invoice(
    db: &DbState,
    config: &ConfigState,
    draft: InvoiceDraft,
) -> Result<Invoice, ApiError> {
    debug!(
        guest = %draft.guest_info.name,
        with_stay = draft.with_stay,
        items = draft.items.len(),
        "create_invoice command"
    );

    let request = resolve_draft(db, config, draft).await?;
    let invoice = config.calculator().calculate(&request)?;

    db.inner().invoices().save(&invoice).await?;

    info!(
        id = %invoice.id,
        total_cents = invoice.total.cents(),
        "Invoice created"
    );
    Ok(invoice)
}

/// Turns catalog references into a calculator request.
async fn resolve_draft(
    db: &DbState,
    config: &ConfigState,
    draft: InvoiceDraft,
) -> Result<InvoiceRequest, ApiError> {
    let tax_rate = match draft.tax_rate {
        Some(pct) => {
            validate_tax_percentage(pct)?;
            TaxRate::from_percentage(pct)
        }
        None => config.tax_rate(),
    };

    // A room is only looked up for a stay; the calculator reports a missing one.
    let selected_room = match (&draft.room_id, draft.with_stay) {
        (Some(room_id), true) => Some({
            validate_id("room id", room_id)?;
            db.inner()
                .rooms()
                .get_by_id(room_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Room", room_id))?
        }),
        _ => None,
    };

    let mut line_items = Vec::with_capacity(draft.items.len());
    for line in &draft.items {
        validate_id("item id", &line.item_id)?;
        validate_quantity(line.quantity)?;
        let item = db
            .inner()
            .items()
            .get_by_id(&line.item_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Item", &line.item_id))?;
        line_items.push(LineItem::from_item(&item, line.quantity));
    }

    Ok(InvoiceRequest {
        with_stay: draft.with_stay,
        guest_info: draft.guest_info,
        selected_room,
        line_items,
        tax_rate,
        discount: draft.discount,
    })
}

/// Lists invoices, newest first.
pub async fn list_invoices(db: &DbState) -> Result<Vec<InvoiceSummaryDto>, ApiError> {
    debug!("list_invoices command");

    let invoices = db.inner().invoices().list().await?;
    Ok(invoices.into_iter().map(InvoiceSummaryDto::from).collect())
}

/// Fetches one invoice with every stored field.
pub async fn get_invoice(db: &DbState, id: &str) -> Result<Invoice, ApiError> {
    debug!(id = %id, "get_invoice command");

    validate_id("invoice id", id)?;

    db.inner()
        .invoices()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice", id))
}

pub async fn delete_invoice(db: &DbState, id: &str) -> Result<(), ApiError> {
    debug!(id = %id, "delete_invoice command");

    validate_id("invoice id", id)?;

    if !db.inner().invoices().delete(id).await? {
        return Err(ApiError::not_found("Invoice", id));
    }

    info!(id = %id, "Invoice deleted");
    Ok(())
}

/// Renders a stored invoice as a plain-text document.
pub async fn render_invoice(
    db: &DbState,
    config: &ConfigState,
    id: &str,
) -> Result<RenderedInvoice, ApiError> {
    debug!(id = %id, "render_invoice command");

    let invoice = get_invoice(db, id).await?;
    let renderer = config.renderer();
    let bytes = renderer.render(&invoice)?;
    let body = String::from_utf8(bytes)
        .map_err(|e| ApiError::internal(format!("Rendered invoice is not UTF-8: {}", e)))?;

    Ok(RenderedInvoice {
        invoice_id: invoice.id,
        content_type: renderer.content_type().to_string(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::NaiveDate;
    use innkeep_core::{ItemCategory, NewItem, NewRoom, RoomType, StayDatePolicy};
    use innkeep_db::{Database, DbConfig};

    struct Fixture {
        db: DbState,
        config: ConfigState,
        room_id: String,
        tea_id: String,
    }

    async fn fixture() -> Fixture {
        let db = DbState::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let room = db
            .inner()
            .rooms()
            .create(&NewRoom {
                room_number: "204".to_string(),
                room_type: RoomType::Deluxe,
                price_per_night: Money::from_cents(4500),
            })
            .await
            .unwrap();
        let tea = db
            .inner()
            .items()
            .create(&NewItem {
                name: "Masala Tea".to_string(),
                category: ItemCategory::Beverage,
                price: Money::from_cents(250),
            })
            .await
            .unwrap();

        Fixture {
            db,
            config: ConfigState::default(),
            room_id: room.room_id,
            tea_id: tea.id,
        }
    }

    fn guest(check_in: Option<u32>, check_out: Option<u32>) -> GuestInfo {
        let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        GuestInfo {
            name: "Asha Perera".to_string(),
            phone: "0771234567".to_string(),
            address: "Galle".to_string(),
            check_in: check_in.map(jan),
            check_out: check_out.map(jan),
        }
    }

    fn stay_draft(f: &Fixture) -> InvoiceDraft {
        InvoiceDraft {
            with_stay: true,
            guest_info: guest(Some(1), Some(4)),
            room_id: Some(f.room_id.clone()),
            items: vec![DraftLine {
                item_id: f.tea_id.clone(),
                quantity: 2,
            }],
            tax_rate: Some(10.0),
            discount: Money::from_cents(100),
        }
    }

    #[tokio::test]
    async fn test_create_invoice_prices_and_saves() {
        let f = fixture().await;

        let invoice = create_invoice(&f.db, &f.config, stay_draft(&f)).await.unwrap();

        // 3 nights × 45.00 + 2 × 2.50 = 140.00; tax 14.00; less 1.00
        assert_eq!(invoice.lodging.nights(), 3);
        assert_eq!(invoice.subtotal, Money::from_cents(14000));
        assert_eq!(invoice.tax, Money::from_cents(1400));
        assert_eq!(invoice.total, Money::from_cents(15300));

        let stored = get_invoice(&f.db, &invoice.id).await.unwrap();
        assert_eq!(stored, invoice);
    }

    #[tokio::test]
    async fn test_stay_without_room_is_rejected_and_not_saved() {
        let f = fixture().await;
        let draft = InvoiceDraft {
            room_id: None,
            ..stay_draft(&f)
        };

        let err = create_invoice(&f.db, &f.config, draft).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(f.db.inner().invoices().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blank_guest_name_is_not_saved() {
        let f = fixture().await;
        let mut draft = stay_draft(&f);
        draft.guest_info.name = "  ".to_string();

        let err = create_invoice(&f.db, &f.config, draft).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(f.db.inner().invoices().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_no_stay_ignores_room() {
        let f = fixture().await;
        let draft = InvoiceDraft {
            with_stay: false,
            guest_info: guest(None, None),
            ..stay_draft(&f)
        };

        let invoice = create_invoice(&f.db, &f.config, draft).await.unwrap();

        assert!(!invoice.lodging.is_stay());
        assert_eq!(invoice.room_total(), Money::zero());
        assert_eq!(invoice.subtotal, Money::from_cents(500));
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_reversed_dates() {
        let f = fixture().await;
        let strict = ConfigState {
            stay_policy: StayDatePolicy::Strict,
            ..ConfigState::default()
        };
        let draft = InvoiceDraft {
            guest_info: guest(Some(4), Some(1)),
            ..stay_draft(&f)
        };

        let err = create_invoice(&f.db, &strict, draft.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let tolerant = create_invoice(&f.db, &f.config, draft).await.unwrap();
        assert_eq!(tolerant.lodging.nights(), 3);
    }

    #[tokio::test]
    async fn test_unknown_item_is_not_found() {
        let f = fixture().await;
        let mut draft = stay_draft(&f);
        draft.items.push(DraftLine {
            item_id: "gone".to_string(),
            quantity: 1,
        });

        let err = create_invoice(&f.db, &f.config, draft).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(f.db.inner().invoices().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_default_tax_rate_from_config() {
        let f = fixture().await;
        let config = ConfigState {
            default_tax_rate: 12.5,
            ..ConfigState::default()
        };
        let draft = InvoiceDraft {
            tax_rate: None,
            ..stay_draft(&f)
        };

        let invoice = create_invoice(&f.db, &config, draft).await.unwrap();
        assert_eq!(invoice.tax_rate, TaxRate::from_bps(1250));
        assert_eq!(invoice.tax, Money::from_cents(1750));
    }

    #[tokio::test]
    async fn test_overflowing_room_rate_is_rejected_and_not_saved() {
        let f = fixture().await;
        let penthouse = f
            .db
            .inner()
            .rooms()
            .create(&NewRoom {
                room_number: "PH".to_string(),
                room_type: RoomType::Suite,
                price_per_night: "92233720368547758".parse().unwrap(),
            })
            .await
            .unwrap();

        let mut draft = stay_draft(&f);
        draft.room_id = Some(penthouse.room_id);

        let err = create_invoice(&f.db, &f.config, draft).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(f.db.inner().invoices().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blank_invoice_id_is_rejected() {
        let f = fixture().await;

        let err = get_invoice(&f.db, " ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = delete_invoice(&f.db, "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_list_render_and_delete() {
        let f = fixture().await;
        let invoice = create_invoice(&f.db, &f.config, stay_draft(&f)).await.unwrap();

        let listed = list_invoices(&f.db).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].guest_name, "Asha Perera");
        assert_eq!(listed[0].room_number.as_deref(), Some("204"));
        assert_eq!(listed[0].total_cents, 15300);

        let rendered = render_invoice(&f.db, &f.config, &invoice.id).await.unwrap();
        assert_eq!(rendered.invoice_id, invoice.id);
        assert!(rendered.body.contains("Rs. 153.00"));
        assert!(rendered.body.contains(&f.config.hotel_name));

        delete_invoice(&f.db, &invoice.id).await.unwrap();
        let err = render_invoice(&f.db, &f.config, &invoice.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
