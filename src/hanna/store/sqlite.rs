use super::{RowWrite, SnippetRow, SnippetStore, SortOrder, StoreError};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS hanna_code (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    type INTEGER NOT NULL DEFAULT 0,
    code TEXT,
    modified INTEGER NOT NULL DEFAULT 0,
    accessed INTEGER NOT NULL DEFAULT 0
)";

const SELECT: &str = "SELECT id, name, type, code, modified, accessed FROM hanna_code";

/// SQLite-backed store on a single connection.
///
/// The connection sits behind a mutex so one store can be shared between threads; every
/// operation is a single statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening sqlite store");
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

fn row_to_snippet_row(row: &rusqlite::Row) -> rusqlite::Result<SnippetRow> {
    Ok(SnippetRow {
        id: row.get("id")?,
        name: row.get("name")?,
        kind: row.get("type")?,
        code: row.get::<_, Option<String>>("code")?.unwrap_or_default(),
        modified: row.get("modified")?,
        accessed: row.get("accessed")?,
    })
}

fn is_missing_table(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.starts_with("no such table"))
}

fn read_error(err: rusqlite::Error) -> StoreError {
    if is_missing_table(&err) {
        StoreError::NotInstalled
    } else {
        StoreError::Sqlite(err)
    }
}

fn write_error(err: rusqlite::Error, name: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::UniqueViolation {
                name: name.to_string(),
            }
        }
        _ => read_error(err),
    }
}

impl SnippetStore for SqliteStore {
    fn install(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(SCHEMA)?;
        Ok(())
    }

    fn uninstall(&self) -> Result<(), StoreError> {
        self.conn
            .lock()
            .execute_batch("DROP TABLE IF EXISTS hanna_code")?;
        Ok(())
    }

    fn find_by_id(&self, id: i64) -> Result<Option<SnippetRow>, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("{} WHERE id = ?1", SELECT),
            [id],
            row_to_snippet_row,
        )
        .optional()
        .map_err(read_error)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<SnippetRow>, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("{} WHERE name = ?1", SELECT),
            [name],
            row_to_snippet_row,
        )
        .optional()
        .map_err(read_error)
    }

    fn list(&self, sort: SortOrder) -> Result<Vec<SnippetRow>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!("{} ORDER BY {}", SELECT, sort.order_by()))
            .map_err(read_error)?;
        let rows = stmt
            .query_map([], row_to_snippet_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn insert(&self, row: RowWrite<'_>) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO hanna_code (name, type, code, modified) VALUES (?1, ?2, ?3, ?4)",
            params![row.name, row.kind, row.code, row.modified],
        )
        .map_err(|e| write_error(e, row.name))?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, id: i64, row: RowWrite<'_>) -> Result<(), StoreError> {
        self.conn
            .lock()
            .execute(
                "UPDATE hanna_code SET name = ?1, type = ?2, code = ?3, modified = ?4 WHERE id = ?5",
                params![row.name, row.kind, row.code, row.modified, id],
            )
            .map_err(|e| write_error(e, row.name))?;
        Ok(())
    }

    fn touch(&self, id: i64, accessed: i64) -> Result<(), StoreError> {
        self.conn
            .lock()
            .execute(
                "UPDATE hanna_code SET accessed = ?1 WHERE id = ?2",
                params![accessed, id],
            )
            .map_err(read_error)?;
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.conn
            .lock()
            .execute("DELETE FROM hanna_code WHERE id = ?1", [id])
            .map_err(read_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.install().unwrap();
        store
    }

    fn write<'a>(name: &'a str, modified: i64) -> RowWrite<'a> {
        RowWrite {
            name,
            kind: 2,
            code: "echo 1;",
            modified,
        }
    }

    #[test]
    fn insert_then_find() {
        let store = installed();
        let id = store.insert(write("hello", 5)).unwrap();
        let by_id = store.find_by_id(id).unwrap().unwrap();
        let by_name = store.find_by_name("hello").unwrap().unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.kind, 2);
        assert_eq!(by_id.accessed, 0);
        assert!(store.find_by_name("missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_name_maps_to_unique_violation() {
        let store = installed();
        store.insert(write("hello", 1)).unwrap();
        let err = store.insert(write("hello", 2)).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { ref name } if name == "hello"));
    }

    #[test]
    fn missing_table_maps_to_not_installed() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.find_by_id(1),
            Err(StoreError::NotInstalled)
        ));
        assert!(matches!(
            store.insert(write("x", 1)),
            Err(StoreError::NotInstalled)
        ));
    }

    #[test]
    fn install_and_uninstall_are_idempotent() {
        let store = installed();
        store.install().unwrap();
        store.uninstall().unwrap();
        store.uninstall().unwrap();
    }

    #[test]
    fn accessed_descending_sorts_newest_first() {
        let store = installed();
        let a = store.insert(write("a", 1)).unwrap();
        let b = store.insert(write("b", 1)).unwrap();
        store.touch(a, 100).unwrap();
        store.touch(b, 200).unwrap();
        let names: Vec<_> = store
            .list(SortOrder::AccessedDesc)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn null_code_reads_as_empty() {
        let store = installed();
        store
            .conn
            .lock()
            .execute("INSERT INTO hanna_code (name) VALUES ('bare')", [])
            .unwrap();
        let row = store.find_by_name("bare").unwrap().unwrap();
        assert_eq!(row.code, "");
    }
}
