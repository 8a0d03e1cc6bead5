//! SQLite-backed line store.

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use tallyscan_core::LineId;
use tallyscan_inventory::{InventoryLine, LineKey, LineStore, StoreError};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS inventory_lines (
        id            TEXT PRIMARY KEY NOT NULL,
        line_key      TEXT NOT NULL,
        location      TEXT NOT NULL,
        reference     TEXT NOT NULL,
        lot           TEXT NULL,
        sub_lot       TEXT NULL,
        quantity      INTEGER NOT NULL,
        manual        INTEGER NOT NULL,
        last_modified TEXT NOT NULL
    )
"#;

const KEY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_inventory_lines_key ON inventory_lines (line_key)";

const SELECT_COLUMNS: &str = "SELECT id, line_key, location, reference, lot, sub_lot, \
     quantity, manual, last_modified FROM inventory_lines";

/// Line store persisted in a single SQLite table, indexed by key.
///
/// Ids are UUIDv7 strings, so ordering by `id` is creation order.
#[derive(Debug, Clone)]
pub struct SqliteLineStore {
    pool: SqlitePool,
}

impl SqliteLineStore {
    /// Open (creating if missing) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let pool = connect_file(path)
            .await
            .map_err(|e| StoreError::initialization(format!("{e:#}")))?;
        let store = Self::from_pool(pool).await?;
        info!(path = %path.display(), "sqlite line store opened");
        Ok(store)
    }

    /// Private in-memory database.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let pool = connect_memory()
            .await
            .map_err(|e| StoreError::initialization(format!("{e:#}")))?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and make sure the schema exists.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        migrate(&pool)
            .await
            .map_err(|e| StoreError::initialization(format!("{e:#}")))?;
        Ok(Self { pool })
    }

    async fn fetch(&self, key: Option<&LineKey>) -> anyhow::Result<Vec<InventoryLine>> {
        let rows = match key {
            Some(key) => {
                let sql = format!("{SELECT_COLUMNS} WHERE line_key = ? ORDER BY id");
                sqlx::query(&sql)
                    .bind(key.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("{SELECT_COLUMNS} ORDER BY id");
                sqlx::query(&sql).fetch_all(&self.pool).await
            }
        }
        .context("failed to query inventory_lines")?;

        rows.iter().map(line_from_row).collect()
    }
}

async fn connect_file(path: &Path) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create database directory at {parent:?}"))?;
    }
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open SQLite database at {path:?}"))
}

/// Every new connection to `sqlite::memory:` sees an empty database, so the
/// pool holds exactly one connection and never recycles it.
async fn connect_memory() -> anyhow::Result<SqlitePool> {
    let options =
        SqliteConnectOptions::from_str("sqlite::memory:").context("invalid in-memory SQLite url")?;
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("failed to open in-memory SQLite database")
}

async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(SCHEMA)
        .execute(pool)
        .await
        .context("failed to create inventory_lines table")?;
    sqlx::query(KEY_INDEX)
        .execute(pool)
        .await
        .context("failed to create inventory_lines key index")?;
    Ok(())
}

fn line_from_row(row: &SqliteRow) -> anyhow::Result<InventoryLine> {
    let id: String = row.try_get("id")?;
    let quantity: i64 = row.try_get("quantity")?;
    let last_modified: DateTime<Utc> = row.try_get("last_modified")?;
    Ok(InventoryLine {
        id: LineId::from_str(&id).with_context(|| format!("corrupt line id {id:?}"))?,
        key: LineKey::from_stored(row.try_get::<String, _>("line_key")?),
        location: row.try_get("location")?,
        reference: row.try_get("reference")?,
        lot: row.try_get("lot")?,
        sub_lot: row.try_get("sub_lot")?,
        quantity: u32::try_from(quantity)
            .with_context(|| format!("corrupt quantity {quantity} for line {id}"))?,
        manual: row.try_get("manual")?,
        last_modified,
    })
}

fn operation_error(err: anyhow::Error) -> StoreError {
    StoreError::operation(format!("{err:#}"))
}

#[async_trait]
impl LineStore for SqliteLineStore {
    async fn get_all(&self) -> Result<Vec<InventoryLine>, StoreError> {
        self.fetch(None).await.map_err(operation_error)
    }

    async fn put(&self, line: InventoryLine) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO inventory_lines
                (id, line_key, location, reference, lot, sub_lot, quantity, manual, last_modified)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                line_key = excluded.line_key,
                location = excluded.location,
                reference = excluded.reference,
                lot = excluded.lot,
                sub_lot = excluded.sub_lot,
                quantity = excluded.quantity,
                manual = excluded.manual,
                last_modified = excluded.last_modified
            "#,
        )
        .bind(line.id.to_string())
        .bind(line.key.as_str())
        .bind(&line.location)
        .bind(&line.reference)
        .bind(&line.lot)
        .bind(&line.sub_lot)
        .bind(i64::from(line.quantity))
        .bind(line.manual)
        .bind(line.last_modified)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write line {}", line.id))
        .map_err(operation_error)?;
        debug!(id = %line.id, quantity = line.quantity, "line persisted");
        Ok(())
    }

    async fn delete(&self, id: LineId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM inventory_lines WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete line {id}"))
            .map_err(operation_error)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM inventory_lines")
            .execute(&self.pool)
            .await
            .context("failed to clear inventory_lines")
            .map_err(operation_error)?;
        Ok(())
    }

    async fn find_by_key(&self, key: &LineKey) -> Result<Vec<InventoryLine>, StoreError> {
        self.fetch(Some(key)).await.map_err(operation_error)
    }
}
