//! # Row Codec
//!
//! Encoding between domain values and what the tables store.
//!
//! ## Stored Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  invoices.guest_info  {"name","phone","address","checkIn","checkOut"}  │
//! │  invoices.room_info   {"roomId","roomNumber","roomType",               │
//! │                        "pricePerNight","nights"}   or NULL             │
//! │  invoices.food_items  [{"name","quantity","price","itemId",            │
//! │                         "category"}, ...]                              │
//! │                                                                         │
//! │  Money inside blobs   → integer cents        (4500 = 45.00)           │
//! │  Dates inside blobs   → "YYYY-MM-DD"                                   │
//! │  Timestamp columns    → 2024-01-04T11:30:00.000000000Z  (fixed width)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The record structs here are the storage contract. They are kept apart
//! from the domain types so renaming a domain field never changes what is
//! already on disk.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use innkeep_core::{
    GuestInfo, ItemCategory, LineItem, Lodging, Money, RoomStay, RoomType, TaxRate,
    ValidationError,
};

use crate::error::DbResult;

/// Why a stored value could not be turned back into a domain value.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value: {0}")]
    Value(#[from] ValidationError),

    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

pub type CodecResult<T> = Result<T, CodecError>;

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuestRecord {
    name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    check_in: Option<NaiveDate>,
    #[serde(default)]
    check_out: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomRecord {
    #[serde(default)]
    room_id: String,
    room_number: String,
    room_type: String,
    price_per_night: i64,
    nights: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemRecord {
    name: String,
    quantity: i64,
    price: i64,
    #[serde(default)]
    item_id: String,
    category: String,
}

// =============================================================================
// Guest
// =============================================================================

pub fn encode_guest(guest: &GuestInfo) -> DbResult<String> {
    let record = GuestRecord {
        name: guest.name.clone(),
        phone: guest.phone.clone(),
        address: guest.address.clone(),
        check_in: guest.check_in,
        check_out: guest.check_out,
    };
    Ok(serde_json::to_string(&record)?)
}

pub fn decode_guest(text: &str) -> CodecResult<GuestInfo> {
    let record: GuestRecord = serde_json::from_str(text)?;
    Ok(GuestInfo {
        name: record.name,
        phone: record.phone,
        address: record.address,
        check_in: record.check_in,
        check_out: record.check_out,
    })
}

// =============================================================================
// Lodging
// =============================================================================

/// `None` (SQL NULL) for a no-stay invoice.
pub fn encode_lodging(lodging: &Lodging) -> DbResult<Option<String>> {
    match lodging {
        Lodging::NoStay => Ok(None),
        Lodging::Stay(stay) => {
            let record = RoomRecord {
                room_id: stay.room_id.clone(),
                room_number: stay.room_number.clone(),
                room_type: stay.room_type.as_str().to_string(),
                price_per_night: stay.price_per_night.cents(),
                nights: stay.nights,
            };
            Ok(Some(serde_json::to_string(&record)?))
        }
    }
}

/// Accepts SQL NULL, an empty string, or the JSON literal `null` as "no stay".
pub fn decode_lodging(text: Option<&str>) -> CodecResult<Lodging> {
    let text = match text.map(str::trim) {
        None | Some("") | Some("null") => return Ok(Lodging::NoStay),
        Some(text) => text,
    };

    let record: RoomRecord = serde_json::from_str(text)?;
    Ok(Lodging::Stay(RoomStay {
        room_id: record.room_id,
        room_number: record.room_number,
        room_type: record.room_type.parse::<RoomType>()?,
        price_per_night: Money::from_cents(record.price_per_night),
        nights: record.nights,
    }))
}

// =============================================================================
// Line Items
// =============================================================================

pub fn encode_line_items(items: &[LineItem]) -> DbResult<String> {
    let records: Vec<LineItemRecord> = items
        .iter()
        .map(|line| LineItemRecord {
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.price.cents(),
            item_id: line.item_id.clone(),
            category: line.category.as_str().to_string(),
        })
        .collect();
    Ok(serde_json::to_string(&records)?)
}

pub fn decode_line_items(text: &str) -> CodecResult<Vec<LineItem>> {
    let records: Vec<LineItemRecord> = serde_json::from_str(text)?;
    records
        .into_iter()
        .map(|record| -> CodecResult<LineItem> {
            Ok(LineItem {
                name: record.name,
                quantity: record.quantity,
                price: Money::from_cents(record.price),
                item_id: record.item_id,
                category: record.category.parse::<ItemCategory>()?,
            })
        })
        .collect()
}

// =============================================================================
// Scalars
// =============================================================================

/// Fixed-width RFC 3339 in UTC, so lexical order is chronological order.
pub fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_timestamp(text: &str) -> CodecResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc))
}

pub fn decode_tax_rate(bps: i64) -> CodecResult<TaxRate> {
    match u32::try_from(bps) {
        Ok(bps) if bps <= 10000 => Ok(TaxRate::from_bps(bps)),
        _ => Err(ValidationError::OutOfRange {
            field: "tax rate".to_string(),
            min: 0,
            max: 10000,
        }
        .into()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
