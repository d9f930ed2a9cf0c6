//! # Room Repository
//!
//! Database operations for bookable rooms.
//!
//! ## Key Operations
//! - Create with a fresh id and timestamp
//! - List newest first
//! - Typed price patch (no dynamic column lists)
//!
//! Rooms are never deleted in the normal front desk flow.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use innkeep_core::{Money, NewRoom, Room, RoomPatch, RoomType};

use crate::codec::{decode_timestamp, encode_timestamp, CodecError};
use crate::error::{DbError, DbResult};

/// A row of the `rooms` table.
#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    room_id: String,
    room_number: String,
    room_type: String,
    price_per_night_cents: i64,
    created_date: String,
}

impl TryFrom<RoomRow> for Room {
    type Error = CodecError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Room {
            room_type: row.room_type.parse::<RoomType>()?,
            created_date: decode_timestamp(&row.created_date)?,
            room_id: row.room_id,
            room_number: row.room_number,
            price_per_night: Money::from_cents(row.price_per_night_cents),
        })
    }
}

fn decode_row(row: RoomRow) -> DbResult<Room> {
    let id = row.room_id.clone();
    Room::try_from(row).map_err(|e| DbError::corrupt("Room", id, e))
}

const SELECT_ROOM: &str = r#"
    SELECT room_id, room_number, room_type, price_per_night_cents, created_date
    FROM rooms
"#;

/// Repository for room database operations.
///
/// ## Usage
/// ```rust,ignore
/// let room = db.rooms().create(&NewRoom { ... }).await?;
/// db.rooms().update_price(&room.room_id, Money::from_cents(5000)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Creates a new RoomRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RoomRepository { pool }
    }

    /// Inserts a new room with a generated id and the current timestamp.
    ///
    /// Duplicate room numbers are accepted.
    pub async fn create(&self, new_room: &NewRoom) -> DbResult<Room> {
        let room = Room {
            room_id: generate_room_id(),
            room_number: new_room.room_number.trim().to_string(),
            room_type: new_room.room_type,
            price_per_night: new_room.price_per_night,
            created_date: Utc::now(),
        };

        debug!(room_id = %room.room_id, room_number = %room.room_number, "Inserting room");

        sqlx::query(
            r#"
            INSERT INTO rooms (room_id, room_number, room_type, price_per_night_cents, created_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&room.room_id)
        .bind(&room.room_number)
        .bind(room.room_type.as_str())
        .bind(room.price_per_night.cents())
        .bind(encode_timestamp(room.created_date))
        .execute(&self.pool)
        .await?;

        Ok(room)
    }

    /// Gets a room by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Room))` - Room found
    /// * `Ok(None)` - Room not found
    /// * `Err(DbError::CorruptRecord)` - Row exists but cannot be decoded
    pub async fn get_by_id(&self, room_id: &str) -> DbResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>(&format!("{} WHERE room_id = ?1", SELECT_ROOM))
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(decode_row).transpose()
    }

    /// Lists all rooms, newest first. Undecodable rows are skipped.
    pub async fn list(&self) -> DbResult<Vec<Room>> {
        let rows = sqlx::query_as::<_, RoomRow>(&format!(
            "{} ORDER BY created_date DESC, rowid DESC",
            SELECT_ROOM
        ))
        .fetch_all(&self.pool)
        .await?;

        let rooms: Vec<Room> = rows
            .into_iter()
            .filter_map(|row| match decode_row(row) {
                Ok(room) => Some(room),
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable room row");
                    None
                }
            })
            .collect();

        debug!(count = rooms.len(), "Listed rooms");
        Ok(rooms)
    }

    /// Applies a typed patch and returns the updated room.
    ///
    /// Each present field is written by its own statement inside one
    /// transaction. An empty patch only checks that the room exists.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No room with this id
    pub async fn apply_patch(&self, room_id: &str, patch: &RoomPatch) -> DbResult<Room> {
        debug!(room_id = %room_id, ?patch, "Patching room");

        let mut tx = self.pool.begin().await?;

        if let Some(price) = patch.price_per_night {
            let result = sqlx::query("UPDATE rooms SET price_per_night_cents = ?1 WHERE room_id = ?2")
                .bind(price.cents())
                .bind(room_id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Room", room_id));
            }
        }

        tx.commit().await?;

        self.get_by_id(room_id)
            .await?
            .ok_or_else(|| DbError::not_found("Room", room_id))
    }

    /// Updates only the nightly rate. Stored invoices keep their snapshot.
    pub async fn update_price(&self, room_id: &str, price_per_night: Money) -> DbResult<Room> {
        self.apply_patch(room_id, &RoomPatch::price(price_per_night))
            .await
    }

    /// Counts rooms (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new room ID.
pub fn generate_room_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use innkeep_core::{Money, NewRoom, RoomPatch, RoomType};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_room(number: &str, cents: i64) -> NewRoom {
        NewRoom {
            room_number: number.to_string(),
            room_type: RoomType::Deluxe,
            price_per_night: Money::from_cents(cents),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let room = db.rooms().create(&new_room(" 204 ", 4500)).await.unwrap();

        assert_eq!(room.room_number, "204");
        let fetched = db.rooms().get_by_id(&room.room_id).await.unwrap().unwrap();
        assert_eq!(fetched, room);
        assert!(db.rooms().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_and_duplicates_allowed() {
        let db = db().await;
        let first = db.rooms().create(&new_room("101", 3000)).await.unwrap();
        let second = db.rooms().create(&new_room("101", 3200)).await.unwrap();

        let rooms = db.rooms().list().await.unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_id, second.room_id);
        assert_eq!(rooms[1].room_id, first.room_id);
        assert_eq!(db.rooms().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_price_touches_only_price() {
        let db = db().await;
        let room = db.rooms().create(&new_room("305", 4500)).await.unwrap();

        let updated = db
            .rooms()
            .update_price(&room.room_id, Money::from_cents(5200))
            .await
            .unwrap();

        assert_eq!(updated.price_per_night.cents(), 5200);
        assert_eq!(updated.room_number, room.room_number);
        assert_eq!(updated.room_type, room.room_type);
        assert_eq!(updated.created_date, room.created_date);
    }

    #[tokio::test]
    async fn test_patch_missing_room() {
        let db = db().await;

        let err = db
            .rooms()
            .update_price("nope", Money::from_cents(100))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db
            .rooms()
            .apply_patch("nope", &RoomPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_negative_price_rejected_by_schema() {
        let db = db().await;
        let err = db.rooms().create(&new_room("1", -1)).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_skips_undecodable_rows() {
        let db = db().await;
        db.rooms().create(&new_room("12", 1000)).await.unwrap();
        sqlx::query(
            "INSERT INTO rooms (room_id, room_number, room_type, price_per_night_cents, created_date)
             VALUES ('bad', '13', 'Igloo', 100, '2024-01-01T00:00:00.000000000Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let rooms = db.rooms().list().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].room_number, "12");

        let err = db.rooms().get_by_id("bad").await.unwrap_err();
        assert!(matches!(err, DbError::CorruptRecord { .. }));
    }
}
