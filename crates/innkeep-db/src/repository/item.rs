//! # Item Repository
//!
//! Database operations for sellable catalog items: food, beverages,
//! laundry and other services.
//!
//! ## Partial Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ItemPatch { name?, category?, price? }                                │
//! │       │                                                                 │
//! │       ├── name     ──► UPDATE items SET name = ?        WHERE id = ?   │
//! │       ├── category ──► UPDATE items SET category = ?    WHERE id = ?   │
//! │       └── price    ──► UPDATE items SET price_cents = ? WHERE id = ?   │
//! │                                                                         │
//! │  One fixed statement per field, all inside a single transaction.       │
//! │  Column names never come from caller input.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use innkeep_core::{Item, ItemCategory, ItemPatch, Money, NewItem};

use crate::codec::{decode_timestamp, encode_timestamp, CodecError};
use crate::error::{DbError, DbResult};

/// A row of the `items` table.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: String,
    name: String,
    category: String,
    price_cents: i64,
    created_date: String,
}

impl TryFrom<ItemRow> for Item {
    type Error = CodecError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Item {
            category: row.category.parse::<ItemCategory>()?,
            created_date: decode_timestamp(&row.created_date)?,
            id: row.id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
        })
    }
}

fn decode_row(row: ItemRow) -> DbResult<Item> {
    let id = row.id.clone();
    Item::try_from(row).map_err(|e| DbError::corrupt("Item", id, e))
}

const SELECT_ITEM: &str = r#"
    SELECT id, name, category, price_cents, created_date
    FROM items
"#;

/// Repository for catalog item operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Inserts a new item with a generated id and the current timestamp.
    pub async fn create(&self, new_item: &NewItem) -> DbResult<Item> {
        let item = Item {
            id: generate_item_id(),
            name: new_item.name.trim().to_string(),
            category: new_item.category,
            price: new_item.price,
            created_date: Utc::now(),
        };

        debug!(id = %item.id, name = %item.name, category = %item.category, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (id, name, category, price_cents, created_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.category.as_str())
        .bind(item.price.cents())
        .bind(encode_timestamp(item.created_date))
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Item))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!("{} WHERE id = ?1", SELECT_ITEM))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(decode_row).transpose()
    }

    /// Lists all items, newest first. Undecodable rows are skipped.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "{} ORDER BY created_date DESC, rowid DESC",
            SELECT_ITEM
        ))
        .fetch_all(&self.pool)
        .await?;

        let items: Vec<Item> = rows
            .into_iter()
            .filter_map(|row| match decode_row(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable item row");
                    None
                }
            })
            .collect();

        debug!(count = items.len(), "Listed items");
        Ok(items)
    }

    /// Applies a typed patch: only the supplied fields change.
    ///
    /// ## Returns
    /// * `Ok(Item)` - The item after the update
    /// * `Err(DbError::NotFound)` - No item with this id
    pub async fn apply_patch(&self, id: &str, patch: &ItemPatch) -> DbResult<Item> {
        debug!(id = %id, ?patch, "Patching item");

        let mut tx = self.pool.begin().await?;

        if let Some(name) = &patch.name {
            set_field(&mut tx, "UPDATE items SET name = ?1 WHERE id = ?2", name.trim(), id).await?;
        }
        if let Some(category) = patch.category {
            set_field(
                &mut tx,
                "UPDATE items SET category = ?1 WHERE id = ?2",
                category.as_str(),
                id,
            )
            .await?;
        }
        if let Some(price) = patch.price {
            set_field(
                &mut tx,
                "UPDATE items SET price_cents = ?1 WHERE id = ?2",
                price.cents(),
                id,
            )
            .await?;
        }

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Updates only the price. Stored invoices keep their snapshot.
    pub async fn update_price(&self, id: &str, price: Money) -> DbResult<Item> {
        self.apply_patch(id, &ItemPatch::price(price)).await
    }

    /// Deletes an item.
    ///
    /// ## Returns
    /// * `Ok(true)` - A row was removed
    /// * `Ok(false)` - No item with this id
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts items (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Runs one fixed single-column UPDATE; zero affected rows means the item
/// does not exist.
async fn set_field<'q, T>(
    tx: &mut Transaction<'_, Sqlite>,
    sql: &'q str,
    value: T,
    id: &'q str,
) -> DbResult<()>
where
    T: 'q + Send + sqlx::Encode<'q, Sqlite> + sqlx::Type<Sqlite>,
{
    let result = sqlx::query(sql)
        .bind(value)
        .bind(id)
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Item", id));
    }

    Ok(())
}

/// Helper to generate a new item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
