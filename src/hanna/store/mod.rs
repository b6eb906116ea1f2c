//! # Storage Layer
//!
//! The repository never talks SQL itself. It goes through the [`SnippetStore`] trait, which
//! describes the small contract it needs from a relational store: point lookups by id or name,
//! a sorted full scan, parameterized insert/update, touch, delete, and create/drop of the table.
//!
//! Stores deal in raw rows ([`SnippetRow`]): `code` is the stored text with its attribute block
//! still embedded, `type` the legacy integer. Packing and unpacking happen above this layer.
//!
//! ## Uniqueness
//!
//! Names are unique. A store reports a name collision on insert or update as
//! [`StoreError::UniqueViolation`], distinct from every other failure, so the repository can
//! retry under a new name without a read-before-write race.
//!
//! ## Implementations
//!
//! - [`sqlite::SqliteStore`]: production store on a single SQLite connection
//! - [`memory::InMemoryStore`]: same contract, no persistence, for tests
//!
//! Both are `Send + Sync` and take `&self` everywhere; they guard their state internally.

use thiserror::Error;

pub mod memory;
pub mod sqlite;

/// Table name used by every backend.
pub const TABLE: &str = "hanna_code";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("name '{name}' is already taken")]
    UniqueViolation { name: String },

    #[error("table hanna_code is not installed")]
    NotInstalled,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Backend(String),
}

/// One stored row, exactly as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetRow {
    pub id: i64,
    pub name: String,
    pub kind: i64,
    pub code: String,
    pub modified: i64,
    pub accessed: i64,
}

/// Values written by insert and update. `accessed` is never written here; see
/// [`SnippetStore::touch`].
#[derive(Debug, Clone, Copy)]
pub struct RowWrite<'a> {
    pub name: &'a str,
    pub kind: i64,
    pub code: &'a str,
    pub modified: i64,
}

/// Allowed sort orders for a full listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    ModifiedAsc,
    ModifiedDesc,
    AccessedAsc,
    AccessedDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::NameAsc,
        SortOrder::NameDesc,
        SortOrder::ModifiedAsc,
        SortOrder::ModifiedDesc,
        SortOrder::AccessedAsc,
        SortOrder::AccessedDesc,
    ];

    /// Parse a sort key (`name`, `-name`, `modified`, `-modified`, `accessed`, `-accessed`).
    /// Anything else falls back to name ascending.
    pub fn parse(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.key() == key)
            .unwrap_or_default()
    }

    pub fn key(self) -> &'static str {
        match self {
            SortOrder::NameAsc => "name",
            SortOrder::NameDesc => "-name",
            SortOrder::ModifiedAsc => "modified",
            SortOrder::ModifiedDesc => "-modified",
            SortOrder::AccessedAsc => "accessed",
            SortOrder::AccessedDesc => "-accessed",
        }
    }

    /// Static `ORDER BY` clause. Name is the tie breaker so listings are stable.
    pub fn order_by(self) -> &'static str {
        match self {
            SortOrder::NameAsc => "name ASC",
            SortOrder::NameDesc => "name DESC",
            SortOrder::ModifiedAsc => "modified ASC, name ASC",
            SortOrder::ModifiedDesc => "modified DESC, name ASC",
            SortOrder::AccessedAsc => "accessed ASC, name ASC",
            SortOrder::AccessedDesc => "accessed DESC, name ASC",
        }
    }
}

/// Abstract interface to the table of stored snippets.
pub trait SnippetStore: Send + Sync {
    /// Create the table if it does not exist.
    fn install(&self) -> Result<(), StoreError>;

    /// Drop the table and everything in it.
    fn uninstall(&self) -> Result<(), StoreError>;

    fn find_by_id(&self, id: i64) -> Result<Option<SnippetRow>, StoreError>;

    /// Exact name match.
    fn find_by_name(&self, name: &str) -> Result<Option<SnippetRow>, StoreError>;

    fn list(&self, sort: SortOrder) -> Result<Vec<SnippetRow>, StoreError>;

    /// Insert a new row and return its store-assigned id.
    fn insert(&self, row: RowWrite<'_>) -> Result<i64, StoreError>;

    fn update(&self, id: i64, row: RowWrite<'_>) -> Result<(), StoreError>;

    /// Set `accessed` only.
    fn touch(&self, id: i64, accessed: i64) -> Result<(), StoreError>;

    /// Remove the row with this id. Removing a missing row is not an error.
    fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_keys_round_trip() {
        for sort in SortOrder::ALL {
            assert_eq!(SortOrder::parse(sort.key()), sort);
        }
    }

    #[test]
    fn unknown_sort_falls_back_to_name() {
        assert_eq!(SortOrder::parse("bogus-sort"), SortOrder::NameAsc);
        assert_eq!(SortOrder::parse(""), SortOrder::NameAsc);
        assert_eq!(SortOrder::parse("name; DROP TABLE x"), SortOrder::NameAsc);
    }
}
