//! Item/tag repository contract and SQLite implementation.
//!
//! # Invariants
//! - `items.name_key` holds the canonical key; lookups are exact on it.
//! - `(name_key, tag)` is unique in `tags`; re-inserting is a no-op.
//! - Deleting an item removes its tags in the same transaction.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::grid::CellRef;
use crate::model::item::{CanonicalKey, Item, TaggedItem};
use crate::text::tagger::TagSet;
use rusqlite::{
    params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_COLUMNS: &str = "i.name,
    i.quantity,
    i.box_row,
    i.box_col,
    i.is_small_box,
    i.created_at,
    i.updated_at";

const REQUIRED_TABLES: &[&str] = &["items", "tags"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item and tag persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// An item with the same canonical key is already stored.
    AlreadyExists(String),
    /// Item lacks the quantity, coordinates or size needed to persist it.
    Unplaced(String),
    InvalidData(String),
    /// Quantity change would leave the 64-bit integer range.
    QuantityOverflow(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::AlreadyExists(key) => write!(f, "item already stored: {key}"),
            Self::Unplaced(name) => write!(f, "item `{name}` has no box assignment"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::QuantityOverflow(key) => write!(f, "quantity of `{key}` would overflow"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
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

/// Storage capabilities consumed by the organizer.
///
/// Every call is a suspension point from the organizer's view and may fail
/// independently of the others.
pub trait ItemRepository {
    /// Items whose canonical key equals `key`.
    fn find_items(&self, key: &CanonicalKey) -> RepoResult<Vec<Item>>;
    fn item_exists(&self, key: &CanonicalKey) -> RepoResult<bool>;
    /// Distinct coordinates currently used by any item, row-major.
    fn occupied_cells(&self) -> RepoResult<Vec<CellRef>>;
    /// Inserts a placed item and its tags atomically.
    ///
    /// Returns the number of tag rows written.
    fn insert_item_with_tags(
        &mut self,
        key: &CanonicalKey,
        item: &Item,
        tags: &TagSet,
    ) -> RepoResult<usize>;
    /// Adds tags that are not yet linked to `key`. Returns rows written.
    fn insert_tags_if_absent(&mut self, key: &CanonicalKey, tags: &TagSet) -> RepoResult<usize>;
    /// Removes the item and all its tags atomically. Returns items removed.
    fn delete_item_and_tags(&mut self, key: &CanonicalKey) -> RepoResult<usize>;
    /// Items carrying at least one of `tags`, with their overlap count,
    /// ordered by canonical key.
    fn tag_matches(&self, tags: &TagSet) -> RepoResult<Vec<TaggedItem>>;
    /// Replaces the quantity. Returns rows changed.
    fn set_quantity(&mut self, key: &CanonicalKey, quantity: i64) -> RepoResult<usize>;
    /// Adds a signed delta to the quantity. Returns rows changed.
    ///
    /// Fails with `QuantityOverflow` and leaves the row untouched when the
    /// sum does not fit in an `i64`.
    fn adjust_quantity(&mut self, key: &CanonicalKey, delta: i64) -> RepoResult<usize>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when the schema is incomplete.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn find_items(&self, key: &CanonicalKey) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS}
             FROM items i
             WHERE i.name_key = ?1
             ORDER BY i.name_key ASC;"
        ))?;
        let mut rows = stmt.query([key.as_str()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn item_exists(&self, key: &CanonicalKey) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM items WHERE name_key = ?1);",
            [key.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn occupied_cells(&self) -> RepoResult<Vec<CellRef>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT box_row, box_col
             FROM items
             ORDER BY box_row ASC, box_col ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut cells = Vec::new();
        while let Some(row) = rows.next()? {
            cells.push(CellRef::new(row.get("box_row")?, row.get("box_col")?));
        }
        Ok(cells)
    }

    fn insert_item_with_tags(
        &mut self,
        key: &CanonicalKey,
        item: &Item,
        tags: &TagSet,
    ) -> RepoResult<usize> {
        let (Some(quantity), Some(cell), Some(is_small_box)) =
            (item.quantity, item.cell(), item.is_small_box)
        else {
            return Err(RepoError::Unplaced(item.name.clone()));
        };

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
            "INSERT INTO items (name_key, name, quantity, box_row, box_col, is_small_box)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                key.as_str(),
                item.name.as_str(),
                quantity,
                cell.row,
                cell.col,
                bool_to_int(is_small_box),
            ],
        );
        if let Err(err) = inserted {
            return Err(map_constraint(err, key));
        }

        let mut tags_added = 0;
        for tag in tags {
            tags_added += tx.execute(
                "INSERT OR IGNORE INTO tags (name_key, tag) VALUES (?1, ?2);",
                params![key.as_str(), tag.as_str()],
            )?;
        }

        tx.commit()?;
        Ok(tags_added)
    }

    fn insert_tags_if_absent(&mut self, key: &CanonicalKey, tags: &TagSet) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut tags_added = 0;
        for tag in tags {
            tags_added += tx.execute(
                "INSERT OR IGNORE INTO tags (name_key, tag) VALUES (?1, ?2);",
                params![key.as_str(), tag.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(tags_added)
    }

    fn delete_item_and_tags(&mut self, key: &CanonicalKey) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM tags WHERE name_key = ?1;", [key.as_str()])?;
        let removed = tx.execute("DELETE FROM items WHERE name_key = ?1;", [key.as_str()])?;
        tx.commit()?;
        Ok(removed)
    }

    fn tag_matches(&self, tags: &TagSet) -> RepoResult<Vec<TaggedItem>> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; tags.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS}, t.tags_matched
             FROM items i
             INNER JOIN (
                SELECT name_key, COUNT(*) AS tags_matched
                FROM tags
                WHERE tag IN ({placeholders})
                GROUP BY name_key
             ) t ON t.name_key = i.name_key
             ORDER BY i.name_key ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(tags.iter()))?;
        let mut matches = Vec::new();
        while let Some(row) = rows.next()? {
            matches.push(TaggedItem {
                item: parse_item_row(row)?,
                tags_matched: row.get("tags_matched")?,
            });
        }
        Ok(matches)
    }

    fn set_quantity(&mut self, key: &CanonicalKey, quantity: i64) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE items
             SET
                quantity = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE name_key = ?1;",
            params![key.as_str(), quantity],
        )?;
        Ok(changed)
    }

    fn adjust_quantity(&mut self, key: &CanonicalKey, delta: i64) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current: Option<i64> = tx
            .query_row(
                "SELECT quantity FROM items WHERE name_key = ?1;",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Ok(0);
        };
        // SQLite promotes an overflowing integer sum to REAL.
        let quantity = current
            .checked_add(delta)
            .ok_or_else(|| RepoError::QuantityOverflow(key.to_string()))?;

        let changed = tx.execute(
            "UPDATE items
             SET
                quantity = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE name_key = ?1;",
            params![key.as_str(), quantity],
        )?;
        tx.commit()?;
        Ok(changed)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let is_small_box = match row.get::<_, i64>("is_small_box")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_small_box value `{other}` in items.is_small_box"
            )));
        }
    };

    Ok(Item {
        name: row.get("name")?,
        quantity: Some(row.get("quantity")?),
        row: Some(row.get("box_row")?),
        col: Some(row.get("box_col")?),
        is_small_box: Some(is_small_box),
        created_at: Some(row.get("created_at")?),
        updated_at: Some(row.get("updated_at")?),
    })
}

fn map_constraint(err: rusqlite::Error, key: &CanonicalKey) -> RepoError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepoError::AlreadyExists(key.to_string())
        }
        other => other.into(),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(*table));
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
