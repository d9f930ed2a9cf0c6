//! # Invoice Calculator
//!
//! Turns a front desk selection into a fully priced [`Invoice`].
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Invoice Calculation                              │
//! │                                                                         │
//! │  InvoiceRequest                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. validate guest, tax rate, discount, line items                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. with_stay?  ── no ──► Lodging::NoStay       (room total = 0)       │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │     room + dates required, nights = max(1, days)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. subtotal = room total + Σ(price × qty)                             │
//! │  4. tax      = subtotal × rate                                         │
//! │  5. total    = subtotal + tax − discount   (not clamped at zero)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Invoice { id, date, ... }  ← computed once, stored as-is              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No I/O happens here. [`InvoiceCalculator::calculate`] reads the clock to
//! stamp the invoice; [`InvoiceCalculator::calculate_at`] is fully
//! deterministic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{GuestInfo, Invoice, LineItem, Lodging, Room, RoomStay, TaxRate};
use crate::validation::{
    validate_discount, validate_guest_name, validate_tax_rate_bps, ValidationResult,
};
use crate::INVOICE_ID_PREFIX;

// =============================================================================
// Stay Date Policy
// =============================================================================

/// How the calculator treats a check-out that is not after check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StayDatePolicy {
    /// Use the absolute day difference, so swapped dates still bill
    /// `|check_out − check_in|` nights. Matches the legacy front desk.
    #[default]
    Tolerant,

    /// Reject check-out before check-in.
    Strict,
}

impl fmt::Display for StayDatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StayDatePolicy::Tolerant => write!(f, "tolerant"),
            StayDatePolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for StayDatePolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tolerant" | "lenient" => Ok(StayDatePolicy::Tolerant),
            "strict" => Ok(StayDatePolicy::Strict),
            _ => Err(ValidationError::NotAllowed {
                field: "stay date policy".to_string(),
                allowed: vec!["tolerant".to_string(), "strict".to_string()],
            }),
        }
    }
}

/// Number of billable nights between two dates.
///
/// Always at least one night: a same-day check-out is billed as one night.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use innkeep_core::calculator::{count_nights, StayDatePolicy};
///
/// let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// assert_eq!(count_nights(jan(1), jan(4), StayDatePolicy::Tolerant), Ok(3));
/// assert_eq!(count_nights(jan(1), jan(1), StayDatePolicy::Tolerant), Ok(1));
/// assert_eq!(count_nights(jan(4), jan(1), StayDatePolicy::Tolerant), Ok(3));
/// assert!(count_nights(jan(4), jan(1), StayDatePolicy::Strict).is_err());
/// ```
pub fn count_nights(
    check_in: NaiveDate,
    check_out: NaiveDate,
    policy: StayDatePolicy,
) -> ValidationResult<u32> {
    let days = (check_out - check_in).num_days();

    if days < 0 && policy == StayDatePolicy::Strict {
        return Err(ValidationError::CheckOutBeforeCheckIn {
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
        });
    }

    let nights = u32::try_from(days.unsigned_abs()).map_err(|_| ValidationError::OutOfRange {
        field: "nights".to_string(),
        min: 1,
        max: u32::MAX as i64,
    })?;

    Ok(nights.max(1))
}

/// Generates an invoice id: `INV-<unix millis>-<8 hex chars>`.
///
/// The random suffix comes from a v4 UUID; collisions are not defended
/// against beyond that entropy.
pub fn generate_invoice_id(at: DateTime<Utc>) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", INVOICE_ID_PREFIX, at.timestamp_millis(), &token[..8])
}

// =============================================================================
// Request
// =============================================================================

/// Raw selection gathered by the invoice form.
///
/// Line items already carry the unit price captured when they were added;
/// nothing is looked up again here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceRequest {
    pub with_stay: bool,
    pub guest_info: GuestInfo,
    #[serde(default)]
    pub selected_room: Option<Room>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub tax_rate: TaxRate,
    #[serde(default)]
    pub discount: Money,
}

// =============================================================================
// Totals
// =============================================================================

/// The monetary breakdown of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceTotals {
    pub room_total: Money,
    pub line_items_total: Money,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl InvoiceTotals {
    /// Prices a bill from its parts.
    ///
    /// ## Errors
    /// [`ValidationError::OutOfRange`] when a room charge, line extension,
    /// the subtotal or the total does not fit in an `i64` of cents.
    ///
    /// ```rust
    /// use innkeep_core::calculator::InvoiceTotals;
    /// use innkeep_core::types::{Lodging, TaxRate};
    /// use innkeep_core::Money;
    ///
    /// let totals = InvoiceTotals::compute(&Lodging::NoStay, &[], TaxRate::from_bps(1000), Money::from_cents(500)).unwrap();
    /// assert_eq!(totals.total.cents(), -500);
    /// ```
    pub fn compute(
        lodging: &Lodging,
        line_items: &[LineItem],
        tax_rate: TaxRate,
        discount: Money,
    ) -> ValidationResult<Self> {
        let room_total = match lodging.stay() {
            Some(stay) => stay.checked_total().ok_or_else(|| too_large("room total"))?,
            None => Money::zero(),
        };

        let line_items_total = line_items.iter().try_fold(Money::zero(), |acc, line| {
            line.checked_amount()
                .and_then(|amount| acc.checked_add(amount))
                .ok_or_else(|| too_large("line items total"))
        })?;

        let subtotal = room_total
            .checked_add(line_items_total)
            .ok_or_else(|| too_large("subtotal"))?;
        let tax = subtotal.calculate_tax(tax_rate);
        let total = subtotal
            .checked_add(tax)
            .and_then(|gross| gross.checked_sub(discount))
            .ok_or_else(|| too_large("total"))?;

        Ok(InvoiceTotals {
            room_total,
            line_items_total,
            subtotal,
            tax,
            total,
        })
    }
}

fn too_large(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Prices invoices under a chosen [`StayDatePolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvoiceCalculator {
    policy: StayDatePolicy,
}

impl InvoiceCalculator {
    pub fn new(policy: StayDatePolicy) -> Self {
        InvoiceCalculator { policy }
    }

    pub fn policy(&self) -> StayDatePolicy {
        self.policy
    }

    /// Prices the request, stamped with the current time and a fresh id.
    pub fn calculate(&self, request: &InvoiceRequest) -> CoreResult<Invoice> {
        let now = Utc::now();
        self.calculate_at(request, generate_invoice_id(now), now)
    }

    /// Prices the request with a caller-supplied id and timestamp.
    ///
    /// ## Errors
    /// [`crate::CoreError::Validation`] when:
    /// - the guest name is blank
    /// - the tax rate is above 100% or the discount is negative
    /// - a line item has quantity outside 1..=999 or a negative price
    /// - a stay is requested without a room, check-in or check-out
    /// - check-out precedes check-in under [`StayDatePolicy::Strict`]
    /// - there is neither a stay nor a line item
    /// - an amount overflows the cent range
    pub fn calculate_at(
        &self,
        request: &InvoiceRequest,
        id: String,
        issued_at: DateTime<Utc>,
    ) -> CoreResult<Invoice> {
        validate_guest_name(&request.guest_info.name)?;
        validate_tax_rate_bps(request.tax_rate.bps())?;
        validate_discount(request.discount)?;
        for line in &request.line_items {
            line.validate()?;
        }

        let lodging = self.resolve_lodging(request)?;

        if !lodging.is_stay() && request.line_items.is_empty() {
            return Err(ValidationError::EmptyInvoice.into());
        }

        let totals = InvoiceTotals::compute(
            &lodging,
            &request.line_items,
            request.tax_rate,
            request.discount,
        )?;

        let mut guest_info = request.guest_info.clone();
        guest_info.name = guest_info.name.trim().to_string();

        Ok(Invoice {
            id,
            guest_info,
            lodging,
            food_items: request.line_items.clone(),
            tax_rate: request.tax_rate,
            discount: request.discount,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            date: issued_at,
        })
    }

    /// Builds the room snapshot, or `NoStay` when no stay was requested
    /// (any selected room is ignored in that case).
    fn resolve_lodging(&self, request: &InvoiceRequest) -> ValidationResult<Lodging> {
        if !request.with_stay {
            return Ok(Lodging::NoStay);
        }

        let room = request
            .selected_room
            .as_ref()
            .ok_or_else(|| ValidationError::required("room"))?;
        let check_in = request
            .guest_info
            .check_in
            .ok_or_else(|| ValidationError::required("check-in date"))?;
        let check_out = request
            .guest_info
            .check_out
            .ok_or_else(|| ValidationError::required("check-out date"))?;

        let nights = count_nights(check_in, check_out, self.policy)?;

        Ok(Lodging::Stay(RoomStay::from_room(room, nights)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::{ItemCategory, RoomType};
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn suite() -> Room {
        Room {
            room_id: "room-suite".to_string(),
            room_number: "501".to_string(),
            room_type: RoomType::Suite,
            price_per_night: Money::from_cents(12000),
            created_date: Utc.with_ymd_and_hms(2023, 12, 1, 9, 0, 0).unwrap(),
        }
    }

    fn line(name: &str, cents: i64, qty: i64, category: ItemCategory) -> LineItem {
        LineItem {
            name: name.to_string(),
            quantity: qty,
            price: Money::from_cents(cents),
            item_id: format!("item-{}", name.to_lowercase()),
            category,
        }
    }

    fn stay_request() -> InvoiceRequest {
        InvoiceRequest {
            with_stay: true,
            guest_info: GuestInfo {
                name: "Grace Hopper".to_string(),
                phone: "555-0100".to_string(),
                address: "1 Navy Way".to_string(),
                check_in: Some(date(2024, 1, 1)),
                check_out: Some(date(2024, 1, 4)),
            },
            selected_room: Some(suite()),
            line_items: vec![
                line("Breakfast", 1500, 2, ItemCategory::Food),
                line("Ironing", 400, 3, ItemCategory::Laundry),
            ],
            tax_rate: TaxRate::from_bps(1000),
            discount: Money::from_cents(2000),
        }
    }

    fn issued() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 4, 11, 30, 0).unwrap()
    }

    fn validation_err(result: CoreResult<Invoice>) -> ValidationError {
        match result {
            Err(CoreError::Validation(err)) => err,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_nights_three_days() {
        assert_eq!(
            count_nights(date(2024, 1, 1), date(2024, 1, 4), StayDatePolicy::Tolerant),
            Ok(3)
        );
    }

    #[test]
    fn test_nights_same_day_clamps_to_one() {
        for policy in [StayDatePolicy::Tolerant, StayDatePolicy::Strict] {
            assert_eq!(count_nights(date(2024, 1, 1), date(2024, 1, 1), policy), Ok(1));
        }
    }

    #[test]
    fn test_nights_reversed_dates_by_policy() {
        assert_eq!(
            count_nights(date(2024, 1, 10), date(2024, 1, 5), StayDatePolicy::Tolerant),
            Ok(5)
        );
        assert!(matches!(
            count_nights(date(2024, 1, 10), date(2024, 1, 5), StayDatePolicy::Strict),
            Err(ValidationError::CheckOutBeforeCheckIn { .. })
        ));
    }

    #[test]
    fn test_full_stay_invoice() {
        let invoice = InvoiceCalculator::default()
            .calculate_at(&stay_request(), "INV-1".to_string(), issued())
            .unwrap();

        // 3 nights × 120.00 = 360.00, breakfast 30.00, ironing 12.00
        assert_eq!(invoice.lodging.nights(), 3);
        assert_eq!(invoice.room_total().cents(), 36000);
        assert_eq!(invoice.line_items_total().cents(), 4200);
        assert_eq!(invoice.subtotal.cents(), 40200);
        assert_eq!(invoice.tax.cents(), 4020);
        assert_eq!(invoice.total.cents(), 40200 + 4020 - 2000);
        assert_eq!(invoice.id, "INV-1");
        assert_eq!(invoice.date, issued());
    }

    #[test]
    fn test_total_invariant_holds_across_inputs() {
        let calculator = InvoiceCalculator::default();
        let rates = [0, 500, 825, 1250, 10000];
        let discounts = [0, 1, 999, 100_000];

        for bps in rates {
            for discount in discounts {
                let mut request = stay_request();
                request.tax_rate = TaxRate::from_bps(bps);
                request.discount = Money::from_cents(discount);
                request.line_items.push(line("Cola", 333, 7, ItemCategory::Beverage));

                let invoice = calculator
                    .calculate_at(&request, "INV-x".to_string(), issued())
                    .unwrap();

                assert_eq!(
                    invoice.subtotal,
                    invoice.room_total() + invoice.line_items_total()
                );
                assert_eq!(invoice.tax, invoice.subtotal.calculate_tax(invoice.tax_rate));
                assert_eq!(invoice.total, invoice.subtotal + invoice.tax - invoice.discount);
            }
        }
    }

    #[test]
    fn test_no_stay_ignores_selected_room() {
        let mut request = stay_request();
        request.with_stay = false;

        let invoice = InvoiceCalculator::default()
            .calculate_at(&request, "INV-2".to_string(), issued())
            .unwrap();

        assert_eq!(invoice.lodging, Lodging::NoStay);
        assert!(invoice.room_total().is_zero());
        assert_eq!(invoice.subtotal.cents(), 4200);
    }

    #[test]
    fn test_no_stay_does_not_need_dates() {
        let request = InvoiceRequest {
            with_stay: false,
            guest_info: GuestInfo {
                name: "Walk-in".to_string(),
                ..GuestInfo::default()
            },
            selected_room: None,
            line_items: vec![line("Coffee", 250, 1, ItemCategory::Beverage)],
            tax_rate: TaxRate::zero(),
            discount: Money::zero(),
        };

        let invoice = InvoiceCalculator::default().calculate(&request).unwrap();
        assert_eq!(invoice.total.cents(), 250);
        assert!(invoice.id.starts_with("INV-"));
    }

    #[test]
    fn test_discount_larger_than_bill_goes_negative() {
        let mut request = stay_request();
        request.discount = Money::from_cents(1_000_000);

        let invoice = InvoiceCalculator::default()
            .calculate_at(&request, "INV-3".to_string(), issued())
            .unwrap();

        assert!(invoice.total.is_negative());
        assert_eq!(invoice.total.cents(), 44220 - 1_000_000);
    }

    #[test]
    fn test_guest_name_required() {
        let mut request = stay_request();
        request.guest_info.name = "   ".to_string();

        let err = validation_err(InvoiceCalculator::default().calculate(&request));
        assert_eq!(err, ValidationError::required("guest name"));
    }

    #[test]
    fn test_stay_without_room_fails() {
        let mut request = stay_request();
        request.selected_room = None;

        let err = validation_err(InvoiceCalculator::default().calculate(&request));
        assert_eq!(err, ValidationError::required("room"));
    }

    #[test]
    fn test_stay_without_dates_fails() {
        let mut request = stay_request();
        request.guest_info.check_out = None;
        let err = validation_err(InvoiceCalculator::default().calculate(&request));
        assert_eq!(err, ValidationError::required("check-out date"));

        let mut request = stay_request();
        request.guest_info.check_in = None;
        let err = validation_err(InvoiceCalculator::default().calculate(&request));
        assert_eq!(err, ValidationError::required("check-in date"));
    }

    #[test]
    fn test_strict_policy_rejects_reversed_stay() {
        let mut request = stay_request();
        request.guest_info.check_in = Some(date(2024, 1, 4));
        request.guest_info.check_out = Some(date(2024, 1, 1));

        let tolerant = InvoiceCalculator::new(StayDatePolicy::Tolerant)
            .calculate_at(&request, "INV-4".to_string(), issued())
            .unwrap();
        assert_eq!(tolerant.lodging.nights(), 3);

        let err = validation_err(InvoiceCalculator::new(StayDatePolicy::Strict).calculate(&request));
        assert!(matches!(err, ValidationError::CheckOutBeforeCheckIn { .. }));
    }

    #[test]
    fn test_empty_invoice_rejected() {
        let request = InvoiceRequest {
            with_stay: false,
            guest_info: GuestInfo {
                name: "Nobody".to_string(),
                ..GuestInfo::default()
            },
            selected_room: None,
            line_items: Vec::new(),
            tax_rate: TaxRate::zero(),
            discount: Money::zero(),
        };

        let err = validation_err(InvoiceCalculator::default().calculate(&request));
        assert_eq!(err, ValidationError::EmptyInvoice);
    }

    #[test]
    fn test_bad_line_items_and_rates_rejected() {
        let mut request = stay_request();
        request.line_items[0].quantity = 0;
        assert!(InvoiceCalculator::default().calculate(&request).is_err());

        let mut request = stay_request();
        request.line_items[1].price = Money::from_cents(-100);
        assert!(InvoiceCalculator::default().calculate(&request).is_err());

        let mut request = stay_request();
        request.tax_rate = TaxRate::from_bps(10001);
        assert!(InvoiceCalculator::default().calculate(&request).is_err());

        let mut request = stay_request();
        request.discount = Money::from_cents(-1);
        assert!(InvoiceCalculator::default().calculate(&request).is_err());
    }

    #[test]
    fn test_overflowing_room_charge_is_rejected() {
        let mut request = stay_request();
        let mut room = suite();
        room.price_per_night = "92233720368547758".parse().unwrap();
        request.selected_room = Some(room);
        request.guest_info.check_out = Some(date(2024, 1, 3));

        let err = validation_err(InvoiceCalculator::default().calculate(&request));
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "room total"));
    }

    #[test]
    fn test_overflowing_line_items_are_rejected() {
        let mut request = stay_request();
        request.line_items[0].price = Money::from_cents(i64::MAX / 2);
        request.line_items[0].quantity = 3;
        let err = validation_err(InvoiceCalculator::default().calculate(&request));
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "line items total"));

        let mut request = stay_request();
        request.line_items[0].price = Money::from_cents(i64::MAX - 1000);
        request.line_items[0].quantity = 1;
        let err = validation_err(InvoiceCalculator::default().calculate(&request));
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_overflowing_tax_is_rejected() {
        let request = InvoiceRequest {
            with_stay: false,
            guest_info: GuestInfo {
                name: "Big Spender".to_string(),
                ..GuestInfo::default()
            },
            selected_room: None,
            line_items: vec![line("Gold", i64::MAX / 2 + 1, 1, ItemCategory::Other)],
            tax_rate: TaxRate::from_bps(10000),
            discount: Money::zero(),
        };

        let err = validation_err(InvoiceCalculator::default().calculate(&request));
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "total"));
    }

    #[test]
    fn test_guest_name_is_trimmed() {
        let mut request = stay_request();
        request.guest_info.name = "  Grace Hopper ".to_string();

        let invoice = InvoiceCalculator::default().calculate(&request).unwrap();
        assert_eq!(invoice.guest_info.name, "Grace Hopper");
    }

    #[test]
    fn test_invoice_ids_are_unique() {
        let at = issued();
        let a = generate_invoice_id(at);
        let b = generate_invoice_id(at);
        assert_ne!(a, b);
        assert!(a.starts_with(&format!("INV-{}-", at.timestamp_millis())));
        assert_eq!(a.rsplit('-').next().unwrap().len(), 8);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("strict".parse::<StayDatePolicy>().unwrap(), StayDatePolicy::Strict);
        assert_eq!("Tolerant".parse::<StayDatePolicy>().unwrap(), StayDatePolicy::Tolerant);
        assert!("reject".parse::<StayDatePolicy>().is_err());
        assert_eq!(StayDatePolicy::default(), StayDatePolicy::Tolerant);
    }
}
