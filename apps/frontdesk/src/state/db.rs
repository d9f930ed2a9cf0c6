//! # Database State
//!
//! Wraps the `Database` handle for use in commands.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn list_rooms(db: &DbState) -> Result<Vec<RoomDto>, ApiError> {
//!     let rooms = db.inner().rooms().list().await?;
//!     Ok(rooms.into_iter().map(RoomDto::from).collect())
//! }
//! ```

use innkeep_db::Database;

/// Owner of the open database for the lifetime of the shell.
#[derive(Debug)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    /// Closes the pool. Called once on every exit path of the shell.
    pub async fn close(self) {
        self.db.close().await;
    }
}
