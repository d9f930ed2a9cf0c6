//! # Revenue Report
//!
//! Aggregates stored invoices into revenue streams for the manager's
//! summary screen.
//!
//! ```text
//!   Invoice.lodging ─────────────────────────────► room revenue
//!   Invoice.food_items
//!     ├── Food / Beverage / Room Service ────────► food revenue
//!     ├── Laundry ───────────────────────────────► laundry revenue
//!     └── everything else ───────────────────────► other revenue
//!   Invoice.subtotal / tax / discount / total ───► summed as stored
//! ```
//!
//! Tax and totals are summed from what each invoice stored; nothing is
//! recomputed from current catalog prices.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Invoice, ItemCategory};

/// Revenue bucket a line item falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RevenueStream {
    Food,
    Laundry,
    Other,
}

impl From<ItemCategory> for RevenueStream {
    fn from(category: ItemCategory) -> Self {
        match category {
            ItemCategory::Food | ItemCategory::Beverage | ItemCategory::RoomService => {
                RevenueStream::Food
            }
            ItemCategory::Laundry => RevenueStream::Laundry,
            ItemCategory::Service
            | ItemCategory::Amenity
            | ItemCategory::Transportation
            | ItemCategory::Recreation
            | ItemCategory::Other => RevenueStream::Other,
        }
    }
}

/// Revenue totals over a set of invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RevenueSummary {
    pub invoice_count: u64,
    pub stay_count: u64,
    pub nights_sold: u64,
    pub room_revenue: Money,
    pub food_revenue: Money,
    pub laundry_revenue: Money,
    pub other_revenue: Money,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl RevenueSummary {
    pub fn from_invoices<'a, I>(invoices: I) -> Self
    where
        I: IntoIterator<Item = &'a Invoice>,
    {
        let mut summary = RevenueSummary::default();
        for invoice in invoices {
            summary.add(invoice);
        }
        summary
    }

    /// Folds one invoice into the summary.
    pub fn add(&mut self, invoice: &Invoice) {
        self.invoice_count += 1;

        if let Some(stay) = invoice.lodging.stay() {
            self.stay_count += 1;
            self.nights_sold += u64::from(stay.nights);
            self.room_revenue += stay.total();
        }

        for line in &invoice.food_items {
            let amount = line.amount();
            match RevenueStream::from(line.category) {
                RevenueStream::Food => self.food_revenue += amount,
                RevenueStream::Laundry => self.laundry_revenue += amount,
                RevenueStream::Other => self.other_revenue += amount,
            }
        }

        self.subtotal += invoice.subtotal;
        self.tax += invoice.tax;
        self.discount += invoice.discount;
        self.total += invoice.total;
    }

    pub fn stream_revenue(&self, stream: RevenueStream) -> Money {
        match stream {
            RevenueStream::Food => self.food_revenue,
            RevenueStream::Laundry => self.laundry_revenue,
            RevenueStream::Other => self.other_revenue,
        }
    }

    /// Average amount billed per invoice; zero for an empty summary.
    pub fn average_total(&self) -> Money {
        match i64::try_from(self.invoice_count) {
            Ok(count) if count > 0 => Money::from_cents(self.total.cents() / count),
            _ => Money::zero(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GuestInfo, LineItem, Lodging, RoomStay, RoomType, TaxRate};
    use chrono::Utc;

    fn line(category: ItemCategory, cents: i64, qty: i64) -> LineItem {
        LineItem {
            name: category.to_string(),
            quantity: qty,
            price: Money::from_cents(cents),
            item_id: format!("item-{}", category),
            category,
        }
    }

    fn invoice(lodging: Lodging, items: Vec<LineItem>, subtotal: i64, tax: i64, discount: i64) -> Invoice {
        Invoice {
            id: format!("INV-{}", subtotal),
            guest_info: GuestInfo {
                name: "Guest".to_string(),
                ..GuestInfo::default()
            },
            lodging,
            food_items: items,
            tax_rate: TaxRate::from_bps(1000),
            discount: Money::from_cents(discount),
            subtotal: Money::from_cents(subtotal),
            tax: Money::from_cents(tax),
            total: Money::from_cents(subtotal + tax - discount),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_category_streams() {
        assert_eq!(RevenueStream::from(ItemCategory::Beverage), RevenueStream::Food);
        assert_eq!(RevenueStream::from(ItemCategory::RoomService), RevenueStream::Food);
        assert_eq!(RevenueStream::from(ItemCategory::Laundry), RevenueStream::Laundry);
        assert_eq!(RevenueStream::from(ItemCategory::Amenity), RevenueStream::Other);
    }

    #[test]
    fn test_summary_splits_streams() {
        let stay = Lodging::Stay(RoomStay {
            room_id: "r1".to_string(),
            room_number: "101".to_string(),
            room_type: RoomType::Standard,
            price_per_night: Money::from_cents(5000),
            nights: 2,
        });
        let invoices = vec![
            invoice(
                stay,
                vec![
                    line(ItemCategory::Food, 1200, 2),
                    line(ItemCategory::Laundry, 300, 3),
                ],
                13300,
                1330,
                500,
            ),
            invoice(
                Lodging::NoStay,
                vec![
                    line(ItemCategory::Beverage, 250, 4),
                    line(ItemCategory::Transportation, 2500, 1),
                ],
                3500,
                350,
                0,
            ),
        ];

        let summary = RevenueSummary::from_invoices(&invoices);

        assert_eq!(summary.invoice_count, 2);
        assert_eq!(summary.stay_count, 1);
        assert_eq!(summary.nights_sold, 2);
        assert_eq!(summary.room_revenue.cents(), 10000);
        assert_eq!(summary.food_revenue.cents(), 2400 + 1000);
        assert_eq!(summary.laundry_revenue.cents(), 900);
        assert_eq!(summary.other_revenue.cents(), 2500);
        assert_eq!(summary.stream_revenue(RevenueStream::Laundry).cents(), 900);
        assert_eq!(summary.subtotal.cents(), 16800);
        assert_eq!(summary.tax.cents(), 1680);
        assert_eq!(summary.discount.cents(), 500);
        assert_eq!(summary.total.cents(), 16800 + 1680 - 500);
        assert_eq!(summary.average_total().cents(), (16800 + 1680 - 500) / 2);
    }

    #[test]
    fn test_summary_uses_stored_tax() {
        // Stored tax disagrees with the rate on purpose.
        let inv = invoice(Lodging::NoStay, vec![line(ItemCategory::Food, 1000, 1)], 1000, 7, 0);
        let summary = RevenueSummary::from_invoices([&inv]);
        assert_eq!(summary.tax.cents(), 7);
        assert_eq!(summary.total.cents(), 1007);
    }

    #[test]
    fn test_empty_summary() {
        let summary = RevenueSummary::from_invoices(std::iter::empty());
        assert_eq!(summary, RevenueSummary::default());
        assert!(summary.average_total().is_zero());
    }
}
