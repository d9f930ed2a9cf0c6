//! # Domain Types
//!
//! Core domain types used throughout Innkeep.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (live, mutable price)        Invoice (frozen snapshot)         │
//! │  ┌─────────────────┐                  ┌──────────────────────────┐      │
//! │  │      Room       │ ── snapshot ───► │ Lodging::Stay(RoomStay)  │      │
//! │  │  room_id        │                  │   price_per_night        │      │
//! │  │  price_per_night│                  │   nights (computed)      │      │
//! │  └─────────────────┘                  ├──────────────────────────┤      │
//! │  ┌─────────────────┐                  │ food_items: [LineItem]   │      │
//! │  │      Item       │ ── snapshot ───► │   price, category        │      │
//! │  │  id, category   │                  ├──────────────────────────┤      │
//! │  │  price          │                  │ subtotal / tax / total   │      │
//! │  └─────────────────┘                  │ (stored, never recomputed)│     │
//! │                                       └──────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Semantics
//! An [`Invoice`] copies everything it needs out of the catalog at creation
//! time. Editing a room or item price afterwards never changes a stored bill.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_item_name, validate_price, validate_quantity, validate_room_number,
    ValidationResult,
};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1250 bps = 12.5% (the form field takes a percentage)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (0–100).
    ///
    /// Negative inputs clamp to zero here; range checks belong to
    /// [`crate::validation::validate_tax_rate_bps`].
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Room Type
// =============================================================================

/// Room classes offered by the property.
///
/// The serialized form is the label shown on the booking form, which is
/// also what the `rooms.room_type` column stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RoomType {
    Standard,
    Deluxe,
    Suite,
    Family,
    Executive,
    Presidential,
}

impl RoomType {
    /// Every room type, in catalog order.
    pub const ALL: [RoomType; 6] = [
        RoomType::Standard,
        RoomType::Deluxe,
        RoomType::Suite,
        RoomType::Family,
        RoomType::Executive,
        RoomType::Presidential,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Standard => "Standard",
            RoomType::Deluxe => "Deluxe",
            RoomType::Suite => "Suite",
            RoomType::Family => "Family",
            RoomType::Executive => "Executive",
            RoomType::Presidential => "Presidential",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RoomType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "room type".to_string(),
                allowed: RoomType::ALL.iter().map(|t| t.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Item Category
// =============================================================================

/// Category of a sellable catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ItemCategory {
    Food,
    Beverage,
    Service,
    Amenity,
    #[serde(rename = "Room Service")]
    RoomService,
    Laundry,
    Transportation,
    Recreation,
    Other,
}

impl ItemCategory {
    /// Every category, in catalog order.
    pub const ALL: [ItemCategory; 9] = [
        ItemCategory::Food,
        ItemCategory::Beverage,
        ItemCategory::Service,
        ItemCategory::Amenity,
        ItemCategory::RoomService,
        ItemCategory::Laundry,
        ItemCategory::Transportation,
        ItemCategory::Recreation,
        ItemCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Food => "Food",
            ItemCategory::Beverage => "Beverage",
            ItemCategory::Service => "Service",
            ItemCategory::Amenity => "Amenity",
            ItemCategory::RoomService => "Room Service",
            ItemCategory::Laundry => "Laundry",
            ItemCategory::Transportation => "Transportation",
            ItemCategory::Recreation => "Recreation",
            ItemCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = ValidationError;

    /// Accepts the display label, case-insensitively. `room_service` and
    /// `roomservice` are also understood so CLI input needs no quoting.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect();
        ItemCategory::ALL
            .into_iter()
            .find(|c| c.as_str().replace(' ', "").eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "category".to_string(),
                allowed: ItemCategory::ALL
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Room
// =============================================================================

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Room {
    /// Stable identity (UUID v4).
    pub room_id: String,

    /// Number on the door. Not required to be unique.
    pub room_number: String,

    pub room_type: RoomType,

    /// Current nightly rate. Only new invoices see changes to it.
    pub price_per_night: Money,

    #[ts(as = "String")]
    pub created_date: DateTime<Utc>,
}

/// Input for creating a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewRoom {
    pub room_number: String,
    pub room_type: RoomType,
    pub price_per_night: Money,
}

impl NewRoom {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_room_number(&self.room_number)?;
        validate_price(self.price_per_night)
    }
}

/// The mutable fields of a [`Room`].
///
/// Each field is applied by its own setter; absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoomPatch {
    pub price_per_night: Option<Money>,
}

impl RoomPatch {
    /// Patch that only changes the nightly rate.
    pub fn price(price_per_night: Money) -> Self {
        RoomPatch {
            price_per_night: Some(price_per_night),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.price_per_night.is_none()
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(price) = self.price_per_night {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Applies the patch to an in-memory room.
    pub fn apply(&self, room: &mut Room) {
        if let Some(price) = self.price_per_night {
            room.price_per_night = price;
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A sellable catalog item (food, laundry, services, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category: ItemCategory,
    pub price: Money,
    #[ts(as = "String")]
    pub created_date: DateTime<Utc>,
}

/// Input for creating an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewItem {
    pub name: String,
    pub category: ItemCategory,
    pub price: Money,
}

impl NewItem {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_item_name(&self.name)?;
        validate_price(self.price)
    }
}

/// The mutable fields of an [`Item`]. Only supplied fields change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category: Option<ItemCategory>,
    pub price: Option<Money>,
}

impl ItemPatch {
    /// Patch that only changes the price.
    pub fn price(price: Money) -> Self {
        ItemPatch {
            price: Some(price),
            ..ItemPatch::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.price.is_none()
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_item_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Applies the patch to an in-memory item.
    pub fn apply(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.trim().to_string();
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
    }
}

// =============================================================================
// Guest Info
// =============================================================================

/// Who the invoice is for. Embedded in the invoice, never shared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GuestInfo {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Required when the invoice includes a stay.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub check_in: Option<NaiveDate>,
    /// Required when the invoice includes a stay.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub check_out: Option<NaiveDate>,
}

// =============================================================================
// Line Item
// =============================================================================

/// One catalog item sold on an invoice.
///
/// Name, unit price and category are frozen when the item is added to the
/// bill; `item_id` is kept only for traceability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub name: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub price: Money,
    pub item_id: String,
    /// Category at time of sale (frozen), used for revenue streams.
    pub category: ItemCategory,
}

impl LineItem {
    /// Snapshots a catalog item at its current price.
    pub fn from_item(item: &Item, quantity: i64) -> Self {
        LineItem {
            name: item.name.clone(),
            quantity,
            price: item.price,
            item_id: item.id.clone(),
            category: item.category,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn amount(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// Unit price × quantity, or `None` if the product overflows.
    #[inline]
    pub fn checked_amount(&self) -> Option<Money> {
        self.price.checked_mul(self.quantity)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_quantity(self.quantity)?;
        validate_price(self.price)
    }
}

// =============================================================================
// Lodging
// =============================================================================

/// Snapshot of the room a guest stayed in, with the computed night count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoomStay {
    pub room_id: String,
    pub room_number: String,
    pub room_type: RoomType,
    pub price_per_night: Money,
    pub nights: u32,
}

impl RoomStay {
    /// Snapshots a room for the given number of nights.
    pub fn from_room(room: &Room, nights: u32) -> Self {
        RoomStay {
            room_id: room.room_id.clone(),
            room_number: room.room_number.clone(),
            room_type: room.room_type,
            price_per_night: room.price_per_night,
            nights,
        }
    }

    /// Nightly rate × nights.
    #[inline]
    pub fn total(&self) -> Money {
        self.price_per_night * self.nights
    }

    /// Nightly rate × nights, or `None` if the product overflows.
    #[inline]
    pub fn checked_total(&self) -> Option<Money> {
        self.price_per_night.checked_mul(i64::from(self.nights))
    }
}

/// Whether an invoice bills a room stay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Lodging {
    /// Walk-in purchase: food, laundry or services only.
    #[default]
    NoStay,
    Stay(RoomStay),
}

impl Lodging {
    pub fn stay(&self) -> Option<&RoomStay> {
        match self {
            Lodging::NoStay => None,
            Lodging::Stay(stay) => Some(stay),
        }
    }

    pub fn is_stay(&self) -> bool {
        matches!(self, Lodging::Stay(_))
    }

    /// Room charge contributed to the subtotal; zero without a stay.
    pub fn room_total(&self) -> Money {
        self.stay().map(RoomStay::total).unwrap_or_default()
    }

    pub fn nights(&self) -> u32 {
        self.stay().map(|s| s.nights).unwrap_or(0)
    }
}

impl From<Option<RoomStay>> for Lodging {
    fn from(stay: Option<RoomStay>) -> Self {
        match stay {
            Some(stay) => Lodging::Stay(stay),
            None => Lodging::NoStay,
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A priced guest bill.
///
/// ## Invariants
/// - `subtotal == lodging.room_total() + Σ food_items.amount()`
/// - `tax == subtotal × tax_rate` (rounded to the cent)
/// - `total == subtotal + tax − discount` (may be negative)
///
/// The monetary fields are computed once by
/// [`crate::calculator::InvoiceCalculator`] and stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    pub guest_info: GuestInfo,
    #[serde(rename = "roomInfo")]
    pub lodging: Lodging,
    /// Food, beverage, laundry and service lines in entry order.
    pub food_items: Vec<LineItem>,
    pub tax_rate: TaxRate,
    pub discount: Money,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    /// Creation timestamp; the sort key for listings and reports.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

impl Invoice {
    /// Room portion of the subtotal.
    pub fn room_total(&self) -> Money {
        self.lodging.room_total()
    }

    /// Line item portion of the subtotal.
    pub fn line_items_total(&self) -> Money {
        self.food_items.iter().map(LineItem::amount).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn deluxe() -> Room {
        Room {
            room_id: "room-1".to_string(),
            room_number: "204".to_string(),
            room_type: RoomType::Deluxe,
            price_per_night: Money::from_cents(4500),
            created_date: Utc::now(),
        }
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(12.5).bps(), 1250);
        assert_eq!(TaxRate::from_percentage(0.0).bps(), 0);
        assert!((TaxRate::from_bps(825).percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_room_type_parsing() {
        assert_eq!("deluxe".parse::<RoomType>().unwrap(), RoomType::Deluxe);
        assert_eq!(" Suite ".parse::<RoomType>().unwrap(), RoomType::Suite);
        assert!("penthouse".parse::<RoomType>().is_err());
    }

    #[test]
    fn test_item_category_parsing() {
        assert_eq!(
            "Room Service".parse::<ItemCategory>().unwrap(),
            ItemCategory::RoomService
        );
        assert_eq!(
            "room_service".parse::<ItemCategory>().unwrap(),
            ItemCategory::RoomService
        );
        assert_eq!("laundry".parse::<ItemCategory>().unwrap(), ItemCategory::Laundry);
        assert!("spa".parse::<ItemCategory>().is_err());
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&ItemCategory::RoomService).unwrap();
        assert_eq!(json, "\"Room Service\"");
    }

    #[test]
    fn test_room_patch_applies_price_only() {
        let mut room = deluxe();
        RoomPatch::default().apply(&mut room);
        assert_eq!(room.price_per_night.cents(), 4500);

        RoomPatch::price(Money::from_cents(5000)).apply(&mut room);
        assert_eq!(room.price_per_night.cents(), 5000);
        assert_eq!(room.room_number, "204");
    }

    #[test]
    fn test_item_patch_partial_update() {
        let mut item = Item {
            id: "item-1".to_string(),
            name: "Club Sandwich".to_string(),
            category: ItemCategory::Food,
            price: Money::from_cents(850),
            created_date: Utc::now(),
        };

        let patch = ItemPatch {
            name: Some("  Club Sandwich XL ".to_string()),
            ..ItemPatch::default()
        };
        patch.apply(&mut item);
        assert_eq!(item.name, "Club Sandwich XL");
        assert_eq!(item.price.cents(), 850);
        assert_eq!(item.category, ItemCategory::Food);

        assert!(ItemPatch::default().is_empty());
        assert!(ItemPatch::price(Money::from_cents(-1)).validate().is_err());
    }

    #[test]
    fn test_line_item_snapshot_and_amount() {
        let item = Item {
            id: "item-7".to_string(),
            name: "Shirt Pressing".to_string(),
            category: ItemCategory::Laundry,
            price: Money::from_cents(300),
            created_date: Utc::now(),
        };
        let line = LineItem::from_item(&item, 4);
        assert_eq!(line.item_id, "item-7");
        assert_eq!(line.category, ItemCategory::Laundry);
        assert_eq!(line.amount().cents(), 1200);
    }

    #[test]
    fn test_lodging_room_total() {
        let stay = RoomStay::from_room(&deluxe(), 3);
        assert_eq!(stay.total().cents(), 13500);

        let lodging = Lodging::Stay(stay);
        assert_eq!(lodging.room_total().cents(), 13500);
        assert_eq!(lodging.nights(), 3);
        assert!(Lodging::NoStay.room_total().is_zero());
        assert_eq!(Lodging::from(None), Lodging::NoStay);
    }

    #[test]
    fn test_lodging_is_tagged_on_the_wire() {
        let json = serde_json::to_value(Lodging::NoStay).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "no_stay" }));

        let stay = Lodging::Stay(RoomStay::from_room(&deluxe(), 2));
        let json = serde_json::to_value(&stay).unwrap();
        assert_eq!(json["kind"], "stay");
        assert_eq!(json["roomNumber"], "204");
        assert_eq!(json["nights"], 2);
    }
}
