//! # Catalog Commands
//!
//! Room and item maintenance.
//!
//! Catalog edits only affect invoices created afterwards: saved invoices
//! carry their own copy of every price.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::DbState;
use innkeep_core::validation::validate_id;
use innkeep_core::{Item, ItemPatch, Money, NewItem, NewRoom, Room, RoomPatch};

/// Room DTO for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub room_id: String,
    pub room_number: String,
    pub room_type: String,
    pub price_per_night_cents: i64,
    pub created_date: String,
}

impl From<Room> for RoomDto {
    fn from(r: Room) -> Self {
        RoomDto {
            room_id: r.room_id,
            room_number: r.room_number,
            room_type: r.room_type.to_string(),
            price_per_night_cents: r.price_per_night.cents(),
            created_date: r.created_date.to_rfc3339(),
        }
    }
}

/// Item DTO for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub created_date: String,
}

impl From<Item> for ItemDto {
    fn from(i: Item) -> Self {
        ItemDto {
            id: i.id,
            name: i.name,
            category: i.category.to_string(),
            price_cents: i.price.cents(),
            created_date: i.created_date.to_rfc3339(),
        }
    }
}

// =============================================================================
// Rooms
// =============================================================================

/// Adds a room to the catalog.
pub async fn create_room(db: &DbState, new_room: NewRoom) -> Result<RoomDto, ApiError> {
    debug!(room_number = %new_room.room_number, "create_room command");

    new_room.validate()?;
    let room = db.inner().rooms().create(&new_room).await?;

    info!(room_id = %room.room_id, room_number = %room.room_number, "Room created");
    Ok(RoomDto::from(room))
}

/// Lists rooms, newest first.
pub async fn list_rooms(db: &DbState) -> Result<Vec<RoomDto>, ApiError> {
    debug!("list_rooms command");

    let rooms = db.inner().rooms().list().await?;
    Ok(rooms.into_iter().map(RoomDto::from).collect())
}

/// Changes a room's nightly rate.
pub async fn update_room_price(
    db: &DbState,
    room_id: &str,
    price_per_night: Money,
) -> Result<RoomDto, ApiError> {
    debug!(room_id = %room_id, price_cents = price_per_night.cents(), "update_room_price command");

    validate_id("room id", room_id)?;
    let patch = RoomPatch::price(price_per_night);
    patch.validate()?;
    let room = db.inner().rooms().apply_patch(room_id, &patch).await?;

    Ok(RoomDto::from(room))
}

// =============================================================================
// Items
// =============================================================================

/// Adds an item to the catalog.
pub async fn create_item(db: &DbState, new_item: NewItem) -> Result<ItemDto, ApiError> {
    debug!(name = %new_item.name, category = %new_item.category, "create_item command");

    new_item.validate()?;
    let item = db.inner().items().create(&new_item).await?;

    info!(id = %item.id, name = %item.name, "Item created");
    Ok(ItemDto::from(item))
}

/// Lists items, newest first.
pub async fn list_items(db: &DbState) -> Result<Vec<ItemDto>, ApiError> {
    debug!("list_items command");

    let items = db.inner().items().list().await?;
    Ok(items.into_iter().map(ItemDto::from).collect())
}

/// Applies a partial update to an item.
pub async fn update_item(db: &DbState, id: &str, patch: ItemPatch) -> Result<ItemDto, ApiError> {
    debug!(id = %id, ?patch, "update_item command");

    validate_id("item id", id)?;
    patch.validate()?;
    let item = db.inner().items().apply_patch(id, &patch).await?;

    Ok(ItemDto::from(item))
}

/// Removes an item. Invoices that sold it keep their line items.
pub async fn delete_item(db: &DbState, id: &str) -> Result<(), ApiError> {
    debug!(id = %id, "delete_item command");

    validate_id("item id", id)?;

    if !db.inner().items().delete(id).await? {
        return Err(ApiError::not_found("Item", id));
    }

    info!(id = %id, "Item deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use innkeep_core::{ItemCategory, RoomType};
    use innkeep_db::{Database, DbConfig};

    async fn state() -> DbState {
        DbState::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    #[tokio::test]
    async fn test_room_lifecycle() {
        let db = state().await;

        let room = create_room(
            &db,
            NewRoom {
                room_number: " 101 ".to_string(),
                room_type: RoomType::Standard,
                price_per_night: Money::from_cents(4500),
            },
        )
        .await
        .unwrap();
        assert_eq!(room.room_number, "101");
        assert_eq!(room.room_type, "Standard");

        let updated = update_room_price(&db, &room.room_id, Money::from_cents(5000))
            .await
            .unwrap();
        assert_eq!(updated.price_per_night_cents, 5000);

        let rooms = list_rooms(&db).await.unwrap();
        assert_eq!(rooms, vec![updated]);
    }

    #[tokio::test]
    async fn test_invalid_room_is_not_stored() {
        let db = state().await;

        let err = create_room(
            &db,
            NewRoom {
                room_number: "   ".to_string(),
                room_type: RoomType::Suite,
                price_per_night: Money::from_cents(9000),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(db.inner().rooms().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_price_of_missing_room() {
        let db = state().await;
        let err = update_room_price(&db, "no-such-room", Money::from_cents(100))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_blank_ids_are_rejected() {
        let db = state().await;

        let err = update_room_price(&db, "  ", Money::from_cents(100))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = delete_item(&db, "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = update_item(&db, " ", ItemPatch::default()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_item_update_and_delete() {
        let db = state().await;

        let item = create_item(
            &db,
            NewItem {
                name: "Masala Tea".to_string(),
                category: ItemCategory::Beverage,
                price: Money::from_cents(250),
            },
        )
        .await
        .unwrap();

        let patch = ItemPatch {
            name: Some("Ginger Tea".to_string()),
            price: Some(Money::from_cents(300)),
            ..ItemPatch::default()
        };
        let updated = update_item(&db, &item.id, patch).await.unwrap();
        assert_eq!(updated.name, "Ginger Tea");
        assert_eq!(updated.category, "Beverage");
        assert_eq!(updated.price_cents, 300);

        let negative = update_item(&db, &item.id, ItemPatch::price(Money::from_cents(-1)))
            .await
            .unwrap_err();
        assert_eq!(negative.code, ErrorCode::ValidationError);

        delete_item(&db, &item.id).await.unwrap();
        assert!(list_items(&db).await.unwrap().is_empty());

        let again = delete_item(&db, &item.id).await.unwrap_err();
        assert_eq!(again.code, ErrorCode::NotFound);
    }
}
