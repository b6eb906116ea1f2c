use super::{RowWrite, SnippetRow, SnippetStore, SortOrder, StoreError};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-memory storage for testing and development.
/// Does NOT persist data.
///
/// Enforces the same unique-name rule as the SQLite table. Ids start at 1 and are never
/// reused, even after a delete.
#[derive(Debug)]
pub struct InMemoryStore {
    table: RwLock<Table>,
}

#[derive(Debug)]
struct Table {
    installed: bool,
    next_id: i64,
    rows: BTreeMap<i64, SnippetRow>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// A store whose table already exists.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                installed: true,
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    /// A store with no table yet; every call but `install` fails with `NotInstalled`.
    pub fn uninstalled() -> Self {
        let store = Self::new();
        store.table.write().installed = false;
        store
    }

    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Table {
    fn check(&self) -> Result<(), StoreError> {
        if self.installed {
            Ok(())
        } else {
            Err(StoreError::NotInstalled)
        }
    }

    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|r| r.name == name && Some(r.id) != except)
    }
}

impl SnippetStore for InMemoryStore {
    fn install(&self) -> Result<(), StoreError> {
        self.table.write().installed = true;
        Ok(())
    }

    fn uninstall(&self) -> Result<(), StoreError> {
        let mut table = self.table.write();
        table.rows.clear();
        table.installed = false;
        Ok(())
    }

    fn find_by_id(&self, id: i64) -> Result<Option<SnippetRow>, StoreError> {
        let table = self.table.read();
        table.check()?;
        Ok(table.rows.get(&id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<SnippetRow>, StoreError> {
        let table = self.table.read();
        table.check()?;
        Ok(table.rows.values().find(|r| r.name == name).cloned())
    }

    fn list(&self, sort: SortOrder) -> Result<Vec<SnippetRow>, StoreError> {
        let table = self.table.read();
        table.check()?;
        let mut rows: Vec<SnippetRow> = table.rows.values().cloned().collect();
        rows.sort_by(|a, b| {
            let by_name = a.name.cmp(&b.name);
            match sort {
                SortOrder::NameAsc => by_name,
                SortOrder::NameDesc => by_name.reverse(),
                SortOrder::ModifiedAsc => a.modified.cmp(&b.modified).then(by_name),
                SortOrder::ModifiedDesc => b.modified.cmp(&a.modified).then(by_name),
                SortOrder::AccessedAsc => a.accessed.cmp(&b.accessed).then(by_name),
                SortOrder::AccessedDesc => b.accessed.cmp(&a.accessed).then(by_name),
            }
        });
        Ok(rows)
    }

    fn insert(&self, row: RowWrite<'_>) -> Result<i64, StoreError> {
        let mut table = self.table.write();
        table.check()?;
        if table.name_taken(row.name, None) {
            return Err(StoreError::UniqueViolation {
                name: row.name.to_string(),
            });
        }
        let id = table.next_id;
        table.next_id += 1;
        table.rows.insert(
            id,
            SnippetRow {
                id,
                name: row.name.to_string(),
                kind: row.kind,
                code: row.code.to_string(),
                modified: row.modified,
                accessed: 0,
            },
        );
        Ok(id)
    }

    fn update(&self, id: i64, row: RowWrite<'_>) -> Result<(), StoreError> {
        let mut table = self.table.write();
        table.check()?;
        if table.name_taken(row.name, Some(id)) {
            return Err(StoreError::UniqueViolation {
                name: row.name.to_string(),
            });
        }
        if let Some(existing) = table.rows.get_mut(&id) {
            existing.name = row.name.to_string();
            existing.kind = row.kind;
            existing.code = row.code.to_string();
            existing.modified = row.modified;
        }
        Ok(())
    }

    fn touch(&self, id: i64, accessed: i64) -> Result<(), StoreError> {
        let mut table = self.table.write();
        table.check()?;
        if let Some(existing) = table.rows.get_mut(&id) {
            existing.accessed = accessed;
        }
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut table = self.table.write();
        table.check()?;
        table.rows.remove(&id);
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        /// Raw row with `code` stored verbatim (attribute block included, if any).
        pub fn with_row(self, name: &str, kind: i64, code: &str, modified: i64) -> Self {
            self.store
                .insert(RowWrite {
                    name,
                    kind,
                    code,
                    modified,
                })
                .unwrap();
            self
        }

        pub fn with_rows(mut self, count: usize) -> Self {
            for i in 0..count {
                let name = format!("snippet_{}", i + 1);
                let code = format!("<p>Snippet {}</p>", i + 1);
                self = self.with_row(&name, 0, &code, (i as i64 + 1) * 100);
            }
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;

    fn write<'a>(name: &'a str, code: &'a str) -> RowWrite<'a> {
        RowWrite {
            name,
            kind: 0,
            code,
            modified: 10,
        }
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let store = InMemoryStore::new();
        let a = store.insert(write("a", "")).unwrap();
        let b = store.insert(write("b", "")).unwrap();
        assert_eq!((a, b), (1, 2));
        store.delete(b).unwrap();
        let c = store.insert(write("c", "")).unwrap();
        assert_eq!(c, 3);
    }

    #[test]
    fn duplicate_name_is_a_unique_violation() {
        let store = InMemoryStore::new();
        store.insert(write("foo", "")).unwrap();
        let err = store.insert(write("foo", "x")).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { ref name } if name == "foo"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_to_taken_name_is_a_unique_violation() {
        let store = InMemoryStore::new();
        store.insert(write("foo", "")).unwrap();
        let id = store.insert(write("bar", "")).unwrap();
        assert!(matches!(
            store.update(id, write("foo", "")),
            Err(StoreError::UniqueViolation { .. })
        ));
        store.update(id, write("bar", "new")).unwrap();
        assert_eq!(store.find_by_id(id).unwrap().unwrap().code, "new");
    }

    #[test]
    fn touch_only_sets_accessed() {
        let store = InMemoryStore::new();
        let id = store.insert(write("foo", "")).unwrap();
        store.touch(id, 99).unwrap();
        let row = store.find_by_id(id).unwrap().unwrap();
        assert_eq!((row.modified, row.accessed), (10, 99));
    }

    #[test]
    fn lists_in_requested_order() {
        let fixture = StoreFixture::new().with_rows(3);
        let names = |sort| -> Vec<String> {
            fixture
                .store
                .list(sort)
                .unwrap()
                .into_iter()
                .map(|r| r.name)
                .collect()
        };
        assert_eq!(names(SortOrder::NameAsc), ["snippet_1", "snippet_2", "snippet_3"]);
        assert_eq!(names(SortOrder::NameDesc), ["snippet_3", "snippet_2", "snippet_1"]);
        assert_eq!(names(SortOrder::ModifiedDesc), ["snippet_3", "snippet_2", "snippet_1"]);
    }

    #[test]
    fn uninstalled_store_refuses_work() {
        let store = InMemoryStore::uninstalled();
        assert!(matches!(
            store.find_by_name("x"),
            Err(StoreError::NotInstalled)
        ));
        store.install().unwrap();
        assert!(store.find_by_name("x").unwrap().is_none());
    }

    #[test]
    fn uninstall_drops_rows() {
        let fixture = StoreFixture::new().with_rows(2);
        fixture.store.uninstall().unwrap();
        fixture.store.install().unwrap();
        assert!(fixture.store.is_empty());
    }
}
