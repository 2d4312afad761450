//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for item CRUD and explicit reordering.
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - Write paths enforce `Item::validate()` before touching SQL.
//! - Listing is deterministic: `sort_order ASC, created_at DESC, uuid ASC`.
//! - Reorder validates both indices before mutating any row and commits the
//!   whole shift in one immediate transaction.
//! - Ranks of untouched items never change; gaps left by deletes survive.
//!
//! # See also
//! - docs/architecture/item-store.md

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::{Item, ItemId, ItemValidationError};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    text,
    created_at,
    sort_order
 FROM items";

/// Display-order clause shared by every ranked read.
const ITEM_ORDER_SQL: &str = "ORDER BY sort_order ASC, created_at DESC, uuid ASC";

/// Result type used by item repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from item repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Domain validation failed before any write.
    Validation(ItemValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target item does not exist.
    NotFound(ItemId),
    /// Gesture index outside the current list bounds.
    InvalidRange { index: usize, len: usize },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidRange { index, len } => {
                write!(f, "index {index} is out of range for a list of {len} items")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "item repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "item repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "item repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid item data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidRange { .. } => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for item CRUD and reorder operations.
pub trait ItemRepository {
    /// Persists one item at the end of the user ordering.
    ///
    /// The caller-supplied `sort_order` is ignored: placement is decided by
    /// the store's append policy. Returns the row as stored.
    fn insert_item(&self, item: &Item) -> RepoResult<Item>;
    /// Loads one item by id.
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Lists all items in display order.
    fn list_items(&self) -> RepoResult<Vec<Item>>;
    /// Replaces one item's text, preserving id, timestamp and rank.
    fn update_item_text(&self, id: ItemId, text: &str) -> RepoResult<()>;
    /// Permanently removes one item. Remaining ranks keep their gaps.
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
    /// Moves the item at `source_index` to the raw gesture destination.
    ///
    /// `destination_index` means "insert before this position in the list
    /// as currently shown" and may equal the list length (drop past the
    /// final row). Returns the moved id, or `None` when the gesture
    /// resolves to the item's current position.
    fn reorder_item(
        &self,
        source_index: usize,
        destination_index: usize,
    ) -> RepoResult<Option<ItemId>>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_items_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn insert_item(&self, item: &Item) -> RepoResult<Item> {
        item.validate()?;

        self.conn.execute(
            "INSERT INTO items (uuid, text, created_at, sort_order)
             VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(sort_order), -1) + 1 FROM items));",
            params![item.uuid.to_string(), item.text.as_str(), item.created_at],
        )?;

        load_required_item(self.conn, item.uuid)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }
        Ok(None)
    }

    fn list_items(&self) -> RepoResult<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} {ITEM_ORDER_SQL};"))?;
        let mut rows = stmt.query([])?;

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn update_item_text(&self, id: ItemId, text: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE items SET text = ?2 WHERE uuid = ?1;",
            params![id.to_string(), text],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn reorder_item(
        &self,
        source_index: usize,
        destination_index: usize,
    ) -> RepoResult<Option<ItemId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let ranked = load_ranked_rows(&tx)?;
        let len = ranked.len();

        if source_index >= len {
            return Err(RepoError::InvalidRange {
                index: source_index,
                len,
            });
        }
        // The raw destination may equal `len`: dropping past the final row.
        if destination_index > len {
            return Err(RepoError::InvalidRange {
                index: destination_index,
                len,
            });
        }

        let target_index = resolve_target_index(source_index, destination_index);
        if target_index == source_index {
            return Ok(None);
        }

        let (moved_id, _) = ranked[source_index];
        // The moved item takes the rank its resolved slot held before the
        // shift, so existing gaps in the rank sequence stay where they were.
        let committed_rank = ranked[target_index].1;

        if source_index < target_index {
            for (id, rank) in &ranked[source_index + 1..=target_index] {
                set_rank(&tx, *id, rank - 1)?;
            }
        } else {
            for (id, rank) in &ranked[target_index..source_index] {
                set_rank(&tx, *id, rank + 1)?;
            }
        }
        set_rank(&tx, moved_id, committed_rank)?;

        tx.commit()?;
        Ok(Some(moved_id))
    }
}

/// Resolves a raw gesture destination into the index the moved item will
/// occupy once it is conceptually lifted out of the list.
///
/// A forward move shifts every position after the source down by one, so
/// the raw destination over-counts by exactly one slot.
pub fn resolve_target_index(source_index: usize, destination_index: usize) -> usize {
    if destination_index > source_index {
        destination_index - 1
    } else {
        destination_index
    }
}

fn load_required_item(conn: &Connection, id: ItemId) -> RepoResult<Item> {
    let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_item_row(row);
    }
    Err(RepoError::NotFound(id))
}

fn load_ranked_rows(conn: &Connection) -> RepoResult<Vec<(ItemId, i64)>> {
    let mut stmt = conn.prepare(&format!("SELECT uuid, sort_order FROM items {ITEM_ORDER_SQL};"))?;
    let mut rows = stmt.query([])?;

    let mut ranked = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get(0)?;
        ranked.push((parse_uuid(&uuid_text, "items.uuid")?, row.get::<_, i64>(1)?));
    }
    Ok(ranked)
}

fn set_rank(tx: &Transaction<'_>, id: ItemId, rank: i64) -> RepoResult<()> {
    tx.execute(
        "UPDATE items SET sort_order = ?2 WHERE uuid = ?1;",
        params![id.to_string(), rank],
    )?;
    Ok(())
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let uuid_text: String = row.get("uuid")?;
    let item = Item {
        uuid: parse_uuid(&uuid_text, "items.uuid")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
        sort_order: row.get("sort_order")?,
    };
    item.validate()?;
    Ok(item)
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_items_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "items")? {
        return Err(RepoError::MissingRequiredTable("items"));
    }

    for column in ["uuid", "text", "created_at", "sort_order"] {
        if !table_has_column(conn, "items", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "items",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
