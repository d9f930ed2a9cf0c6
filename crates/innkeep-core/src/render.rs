//! # Invoice Documents
//!
//! Formats a stored [`Invoice`] into a printable document.
//!
//! ## Renderer Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Document Rendering                               │
//! │                                                                         │
//! │   InvoiceStore::find_by_id ──► &Invoice ──► InvoiceRenderer ──► bytes   │
//! │                                                                         │
//! │   The renderer READS:   subtotal, tax, discount, total, nights         │
//! │   The renderer NEVER:   recomputes tax, totals or night counts         │
//! │   Line extensions:      RoomStay::total, LineItem::amount              │
//! │                                                                         │
//! │   Only formatting happens here: "<prefix> 1234.50"                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`TextInvoiceRenderer`] produces a plain-text document. A PDF renderer
//! would implement the same trait.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Invoice, Lodging};

/// Width of the text document, in characters.
const PAGE_WIDTH: usize = 64;

// =============================================================================
// Currency Formatting
// =============================================================================

/// Currency prefix used on documents: `"<prefix> <amount with 2 decimals>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub prefix: String,
}

impl CurrencyFormat {
    pub fn new(prefix: impl Into<String>) -> Self {
        CurrencyFormat {
            prefix: prefix.into(),
        }
    }

    /// ```rust
    /// use innkeep_core::render::CurrencyFormat;
    /// use innkeep_core::Money;
    ///
    /// let fmt = CurrencyFormat::new("Rs.");
    /// assert_eq!(fmt.format(Money::from_cents(123450)), "Rs. 1234.50");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        if self.prefix.is_empty() {
            amount.to_fixed()
        } else {
            format!("{} {}", self.prefix, amount.to_fixed())
        }
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::new("Rs.")
    }
}

// =============================================================================
// Renderer Trait
// =============================================================================

/// Produces a document from a fully priced invoice.
pub trait InvoiceRenderer {
    /// MIME type of the produced bytes.
    fn content_type(&self) -> &'static str;

    fn render(&self, invoice: &Invoice) -> CoreResult<Vec<u8>>;
}

// =============================================================================
// Text Renderer
// =============================================================================

/// Hotel letterhead printed at the top of every document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelHeader {
    pub name: String,
    pub address_lines: Vec<String>,
    pub phone: String,
}

/// Plain-text invoice document.
#[derive(Debug, Clone, Default)]
pub struct TextInvoiceRenderer {
    header: HotelHeader,
    currency: CurrencyFormat,
}

impl TextInvoiceRenderer {
    pub fn new(header: HotelHeader, currency: CurrencyFormat) -> Self {
        TextInvoiceRenderer { header, currency }
    }

    /// Renders to a `String`; [`InvoiceRenderer::render`] returns its bytes.
    pub fn render_text(&self, invoice: &Invoice) -> CoreResult<String> {
        let mut out = String::new();
        self.write_document(&mut out, invoice)
            .map_err(|e| CoreError::RenderFailed(e.to_string()))?;
        Ok(out)
    }

    fn write_document(&self, out: &mut String, invoice: &Invoice) -> std::fmt::Result {
        let rule = "=".repeat(PAGE_WIDTH);
        let thin = "-".repeat(PAGE_WIDTH);
        let money = |m: Money| self.currency.format(m);

        // Letterhead
        writeln!(out, "{:^width$}", self.header.name, width = PAGE_WIDTH)?;
        for line in &self.header.address_lines {
            writeln!(out, "{:^width$}", line, width = PAGE_WIDTH)?;
        }
        if !self.header.phone.is_empty() {
            writeln!(
                out,
                "{:^width$}",
                format!("Phone: {}", self.header.phone),
                width = PAGE_WIDTH
            )?;
        }
        writeln!(out, "{}", rule)?;
        writeln!(out, "{:^width$}", "INVOICE", width = PAGE_WIDTH)?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "Invoice No: {}", invoice.id)?;
        writeln!(out, "Date:       {}", invoice.date.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(out)?;

        // Guest
        let guest = &invoice.guest_info;
        writeln!(out, "Bill To:")?;
        writeln!(out, "  {}", guest.name)?;
        if !guest.phone.is_empty() {
            writeln!(out, "  Phone: {}", guest.phone)?;
        }
        if !guest.address.is_empty() {
            writeln!(out, "  {}", guest.address)?;
        }

        // Stay
        if let Lodging::Stay(stay) = &invoice.lodging {
            writeln!(out)?;
            writeln!(out, "Room Charges")?;
            writeln!(out, "{}", thin)?;
            if let (Some(check_in), Some(check_out)) = (guest.check_in, guest.check_out) {
                writeln!(out, "  Check-in:  {}", check_in)?;
                writeln!(out, "  Check-out: {}", check_out)?;
            }
            writeln!(
                out,
                "  Room {} ({})  {} night(s) x {}",
                stay.room_number,
                stay.room_type,
                stay.nights,
                money(stay.price_per_night)
            )?;
            // Same rate × nights the calculator summed into the stored subtotal.
            writeln!(out, "{:>width$}", money(stay.total()), width = PAGE_WIDTH)?;
        }

        // Line items
        if !invoice.food_items.is_empty() {
            writeln!(out)?;
            writeln!(
                out,
                "{:<28}{:>6}{:>15}{:>15}",
                "Item", "Qty", "Price", "Amount"
            )?;
            writeln!(out, "{}", thin)?;
            for line in &invoice.food_items {
                writeln!(
                    out,
                    "{:<28}{:>6}{:>15}{:>15}",
                    truncate(&line.name, 27),
                    line.quantity,
                    money(line.price),
                    money(line.amount())
                )?;
            }
        }

        // Totals
        writeln!(out)?;
        writeln!(out, "{}", thin)?;
        let totals = [
            ("Subtotal".to_string(), money(invoice.subtotal)),
            (
                format!("Tax ({}%)", format_percentage(invoice.tax_rate.bps())),
                money(invoice.tax),
            ),
            ("Discount".to_string(), format!("-{}", money(invoice.discount))),
        ];
        for (label, value) in totals {
            writeln!(out, "{:<40}{:>24}", label, value)?;
        }
        writeln!(out, "{}", rule)?;
        writeln!(out, "{:<40}{:>24}", "TOTAL", money(invoice.total))?;
        writeln!(out, "{}", rule)?;
        writeln!(out)?;
        writeln!(out, "{:^width$}", "Thank you for staying with us!", width = PAGE_WIDTH)?;

        Ok(())
    }
}

impl InvoiceRenderer for TextInvoiceRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, invoice: &Invoice) -> CoreResult<Vec<u8>> {
        self.render_text(invoice).map(String::into_bytes)
    }
}

/// Basis points as a percentage without trailing zeros: 1250 → "12.5".
fn format_percentage(bps: u32) -> String {
    let whole = bps / 100;
    let frac = bps % 100;
    match frac {
        0 => whole.to_string(),
        f if f % 10 == 0 => format!("{}.{}", whole, f / 10),
        f => format!("{}.{:02}", whole, f),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).chain(['…']).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        GuestInfo, Invoice, ItemCategory, LineItem, Lodging, RoomStay, RoomType, TaxRate,
    };
    use chrono::{NaiveDate, TimeZone, Utc};

    fn renderer() -> TextInvoiceRenderer {
        TextInvoiceRenderer::new(
            HotelHeader {
                name: "Harbor View Inn".to_string(),
                address_lines: vec!["12 Quay Street".to_string()],
                phone: "555-0199".to_string(),
            },
            CurrencyFormat::new("$"),
        )
    }

    /// Deliberately inconsistent totals: the document must print what is
    /// stored, not what the line items would add up to.
    fn stored_invoice() -> Invoice {
        Invoice {
            id: "INV-1704367800000-a1b2c3d4".to_string(),
            guest_info: GuestInfo {
                name: "Grace Hopper".to_string(),
                phone: "555-0100".to_string(),
                address: "1 Navy Way".to_string(),
                check_in: NaiveDate::from_ymd_opt(2024, 1, 1),
                check_out: NaiveDate::from_ymd_opt(2024, 1, 4),
            },
            lodging: Lodging::Stay(RoomStay {
                room_id: "room-1".to_string(),
                room_number: "501".to_string(),
                room_type: RoomType::Suite,
                price_per_night: Money::from_cents(12000),
                nights: 3,
            }),
            food_items: vec![LineItem {
                name: "Breakfast".to_string(),
                quantity: 2,
                price: Money::from_cents(1500),
                item_id: "item-1".to_string(),
                category: ItemCategory::Food,
            }],
            tax_rate: TaxRate::from_bps(1250),
            discount: Money::from_cents(2000),
            subtotal: Money::from_cents(99999),
            tax: Money::from_cents(11111),
            total: Money::from_cents(77777),
            date: Utc.with_ymd_and_hms(2024, 1, 4, 11, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_currency_format() {
        let fmt = CurrencyFormat::new("Rs.");
        assert_eq!(fmt.format(Money::from_cents(5)), "Rs. 0.05");
        assert_eq!(fmt.format(Money::from_cents(-1250)), "Rs. -12.50");
        assert_eq!(CurrencyFormat::new("").format(Money::from_cents(100)), "1.00");
    }

    #[test]
    fn test_renders_stored_amounts_only() {
        let text = renderer().render_text(&stored_invoice()).unwrap();

        assert!(text.contains("Harbor View Inn"));
        assert!(text.contains("INV-1704367800000-a1b2c3d4"));
        assert!(text.contains("$ 999.99"));
        assert!(text.contains("$ 111.11"));
        assert!(text.contains("-$ 20.00"));
        assert!(text.contains("$ 777.77"));
        assert!(text.contains("Tax (12.5%)"));
        // The recomputed subtotal (420.00) never appears.
        assert!(!text.contains("$ 420.00"));
    }

    #[test]
    fn test_renders_stay_block() {
        let text = renderer().render_text(&stored_invoice()).unwrap();
        assert!(text.contains("Room 501 (Suite)  3 night(s) x $ 120.00"));
        assert!(text.contains("$ 360.00"));
        assert!(text.contains("Check-in:  2024-01-01"));
        assert!(text.contains("Breakfast"));
    }

    #[test]
    fn test_no_stay_has_no_room_block() {
        let mut invoice = stored_invoice();
        invoice.lodging = Lodging::NoStay;

        let text = renderer().render_text(&invoice).unwrap();
        assert!(!text.contains("Room Charges"));
        assert!(text.contains("Breakfast"));
    }

    #[test]
    fn test_render_returns_utf8_bytes() {
        let r = renderer();
        let bytes = r.render(&stored_invoice()).unwrap();
        assert_eq!(r.content_type(), "text/plain; charset=utf-8");
        assert!(String::from_utf8(bytes).is_ok());
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(1000), "10");
        assert_eq!(format_percentage(1250), "12.5");
        assert_eq!(format_percentage(825), "8.25");
        assert_eq!(format_percentage(5), "0.05");
    }

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate("Tea", 27), "Tea");
        assert_eq!(truncate("abcdef", 4).chars().count(), 4);
    }
}
