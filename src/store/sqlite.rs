//! SQLite-backed tile store.
//!
//! Rows live in a single `tiles` table keyed by a text primary key. The
//! connection is guarded by a mutex and every statement runs on the blocking
//! thread pool.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode};
use tracing::debug;

use crate::error::StoreError;
use crate::tile::{NewTile, Tile};

use super::{validate_decimal_id, StoreKind, TileStore};

const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS tiles (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    stock INTEGER NOT NULL
);
";

/// Tile store persisted in an SQLite database.
///
/// Identifiers are sequential decimal strings. The next identifier is one
/// above the highest stored identifier, computed while holding the
/// connection lock so concurrent creates cannot collide.
pub struct SqliteTileStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteTileStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|e| {
            StoreError::Unavailable(format!(
                "failed to open SQLite database at {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_connection(conn, Some(path))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(format!("failed to open SQLite: {}", e)))?;
        Self::from_connection(conn, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.execute_batch(CREATE_TABLE)
            .map_err(|e| StoreError::Unavailable(format!("failed to create schema: {}", e)))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Location of the database file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_connection<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("SQLite connection lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("SQLite task failed: {}", e)))?
    }
}

/// Map a driver error for the row identified by `id`.
fn map_sqlite_error(err: rusqlite::Error, id: &str) -> StoreError {
    match err {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(id.to_string()),
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::DuplicateKey(id.to_string())
        }
        other => StoreError::Unavailable(other.to_string()),
    }
}

fn row_to_tile(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tile> {
    Ok(Tile {
        id: row.get(0)?,
        name: row.get(1)?,
        stock: row.get(2)?,
    })
}

#[async_trait]
impl TileStore for SqliteTileStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Sqlite
    }

    fn validate_id(&self, id: &str) -> Result<(), StoreError> {
        validate_decimal_id(id).map(|_| ())
    }

    async fn create(&self, tile: NewTile) -> Result<Tile, StoreError> {
        self.with_connection(move |conn| {
            let last: i64 = conn
                .query_row(
                    "SELECT COALESCE(MAX(CAST(id AS INTEGER)), 0) FROM tiles",
                    [],
                    |row| row.get(0),
                )
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            let id = last
                .checked_add(1)
                .ok_or_else(|| StoreError::Unavailable("identifier space exhausted".to_string()))?
                .to_string();

            conn.execute(
                "INSERT INTO tiles (id, name, stock) VALUES (?1, ?2, ?3)",
                params![id, tile.name, tile.stock],
            )
            .map_err(|e| map_sqlite_error(e, &id))?;

            debug!(id = %id, "Inserted tile row");
            Ok(Tile::from_new(id, tile))
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Tile>, StoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, stock FROM tiles ORDER BY rowid")
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            let rows = stmt
                .query_map([], row_to_tile)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| StoreError::Unavailable(e.to_string()))
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Tile, StoreError> {
        validate_decimal_id(id)?;
        let id = id.to_string();
        self.with_connection(move |conn| {
            conn.query_row(
                "SELECT id, name, stock FROM tiles WHERE id = ?1",
                params![id],
                row_to_tile,
            )
            .map_err(|e| map_sqlite_error(e, &id))
        })
        .await
    }

    async fn update(&self, id: &str, tile: NewTile) -> Result<Tile, StoreError> {
        validate_decimal_id(id)?;
        let id = id.to_string();
        self.with_connection(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE tiles SET name = ?1, stock = ?2 WHERE id = ?3",
                    params![tile.name, tile.stock, id],
                )
                .map_err(|e| map_sqlite_error(e, &id))?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(Tile::from_new(id, tile))
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        validate_decimal_id(id)?;
        let id = id.to_string();
        self.with_connection(move |conn| {
            let changed = conn
                .execute("DELETE FROM tiles WHERE id = ?1", params![id])
                .map_err(|e| map_sqlite_error(e, &id))?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}
