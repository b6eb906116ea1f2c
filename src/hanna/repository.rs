//! # Snippet Repository
//!
//! The repository is the only component that persists snippets. It sits between the value type
//! ([`Snippet`]) and a [`SnippetStore`], and owns the two rules that span them:
//!
//! - **Attribute embedding**: on save, the snippet's default attributes are packed into the
//!   stored code text; on load, they are unpacked again (see [`crate::block`]).
//! - **Name collisions**: inserting under a taken name retries with `-1`, `-2`, ... appended,
//!   relying on the store's unique constraint rather than a read-then-write check. The number
//!   of retries is bounded.
//!
//! Lookups that miss are not errors: they return a neutral snippet with `id == 0`.
//!
//! Nothing is cached between calls; every `get` re-reads and re-unpacks. The repository holds no
//! mutable state of its own, so it can be shared across threads whenever its store can.

use crate::attrs::Attrs;
use crate::block::{self, Packed};
use crate::error::{HannaError, Result};
use crate::model::Snippet;
use crate::reserved::{is_reserved_attr, NoHostNames, ReservedNames};
use crate::store::{RowWrite, SnippetRow, SnippetStore, SortOrder, StoreError};
use tracing::{debug, info, warn};

/// Default ceiling for the duplicate-name retry loop.
pub const DEFAULT_MAX_NAME_RETRIES: u32 = 99;

/// What a save did besides writing the row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// A new row was inserted (as opposed to an existing one updated).
    pub created: bool,
    /// Set when the requested name was taken and a suffixed one was used instead.
    pub renamed_from: Option<String>,
    /// Non-fatal warnings raised while packing attributes.
    pub warnings: Vec<String>,
}

fn system_clock() -> i64 {
    chrono::Utc::now().timestamp()
}

pub struct SnippetRepository<S: SnippetStore, R: ReservedNames = NoHostNames> {
    store: S,
    reserved: R,
    max_name_retries: u32,
    clock: fn() -> i64,
}

impl<S: SnippetStore> SnippetRepository<S> {
    /// Repository for a host without identifiers of its own.
    pub fn new(store: S) -> Self {
        Self::with_reserved(store, NoHostNames)
    }
}

impl<S: SnippetStore, R: ReservedNames> SnippetRepository<S, R> {
    pub fn with_reserved(store: S, reserved: R) -> Self {
        Self {
            store,
            reserved,
            max_name_retries: DEFAULT_MAX_NAME_RETRIES,
            clock: system_clock,
        }
    }

    pub fn with_max_name_retries(mut self, retries: u32) -> Self {
        self.max_name_retries = retries;
        self
    }

    /// Replace the unix-time source used for `modified` and `accessed`.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reserved(&self) -> &R {
        &self.reserved
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        is_reserved_attr(&self.reserved, name)
    }

    /// Look up by id when `key` is all digits, otherwise by exact name.
    pub fn get(&self, key: &str) -> Result<Snippet> {
        if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            return match key.parse::<i64>() {
                Ok(id) => self.get_by_id(id),
                Err(_) => Ok(Snippet::new()),
            };
        }
        self.get_by_name(key)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Snippet> {
        debug!(id, "get hanna code by id");
        match self.store.find_by_id(id)? {
            Some(row) => self.snippet_from_row(row),
            None => Ok(Snippet::new()),
        }
    }

    pub fn get_by_name(&self, name: &str) -> Result<Snippet> {
        debug!(name, "get hanna code by name");
        match self.store.find_by_name(name)? {
            Some(row) => self.snippet_from_row(row),
            None => Ok(Snippet::new()),
        }
    }

    /// All snippets in the order named by `sort`; unknown sort keys mean `name`.
    ///
    /// Rows whose stored type cannot be decoded are logged and left out. Looking one up directly
    /// still reports the error.
    pub fn get_all(&self, sort: &str) -> Result<Vec<Snippet>> {
        self.get_all_sorted(SortOrder::parse(sort))
    }

    pub fn get_all_sorted(&self, sort: SortOrder) -> Result<Vec<Snippet>> {
        let mut snippets = Vec::new();
        for row in self.store.list(sort)? {
            let id = row.id;
            match self.snippet_from_row(row) {
                Ok(snippet) => snippets.push(snippet),
                Err(e) => warn!(id, error = %e, "skipping unreadable hanna code"),
            }
        }
        Ok(snippets)
    }

    /// Insert (id 0) or update the snippet, stamping `modified`.
    ///
    /// A new snippet whose name is taken is saved as `name-1`, `name-2`, ... and the final name
    /// is written back into `snippet`, as is the new id. Updates never rename: a collision there
    /// surfaces as a store error.
    pub fn save(&self, snippet: &mut Snippet) -> Result<SaveReport> {
        if snippet.name.trim().is_empty() {
            return Err(HannaError::InvalidArgument(
                "hanna code name cannot be empty".to_string(),
            ));
        }

        let Packed { code, warnings } = self.pack(&snippet.code, snippet.attrs());
        let kind = i64::from(snippet.type_bits());
        let now = (self.clock)();
        let mut report = SaveReport {
            warnings,
            ..SaveReport::default()
        };

        if snippet.exists() {
            self.store.update(
                snippet.id,
                RowWrite {
                    name: &snippet.name,
                    kind,
                    code: &code,
                    modified: now,
                },
            )?;
            debug!(id = snippet.id, name = %snippet.name, "updated hanna code");
        } else {
            let id = self.insert_with_unique_name(snippet, kind, &code, now, &mut report)?;
            snippet.id = id;
            report.created = true;
            debug!(id, name = %snippet.name, "inserted hanna code");
        }

        snippet.modified = now;
        Ok(report)
    }

    fn insert_with_unique_name(
        &self,
        snippet: &mut Snippet,
        kind: i64,
        code: &str,
        now: i64,
        report: &mut SaveReport,
    ) -> Result<i64> {
        let base = snippet.name.clone();
        let mut attempt: u32 = 0;

        loop {
            let result = self.store.insert(RowWrite {
                name: &snippet.name,
                kind,
                code,
                modified: now,
            });
            match result {
                Ok(id) => {
                    if attempt > 0 {
                        info!(from = %base, to = %snippet.name, "name taken, saved under a new name");
                        report.renamed_from = Some(base);
                    }
                    return Ok(id);
                }
                Err(StoreError::UniqueViolation { .. }) if attempt < self.max_name_retries => {
                    attempt += 1;
                    snippet.name = format!("{}-{}", base, attempt);
                }
                Err(StoreError::UniqueViolation { .. }) => {
                    snippet.name = base.clone();
                    return Err(HannaError::NameExhausted {
                        name: base,
                        attempts: attempt + 1,
                    });
                }
                Err(e) => {
                    snippet.name = base;
                    return Err(e.into());
                }
            }
        }
    }

    /// Set `accessed` to now. `modified` is left alone.
    pub fn touch(&self, snippet: &mut Snippet) -> Result<()> {
        if !snippet.exists() {
            return Err(HannaError::InvalidArgument(
                "cannot touch a hanna code that has not been saved".to_string(),
            ));
        }
        let now = (self.clock)();
        self.store.touch(snippet.id, now)?;
        snippet.accessed = now;
        Ok(())
    }

    pub fn delete(&self, snippet: &Snippet) -> Result<()> {
        if !snippet.exists() {
            return Err(HannaError::InvalidArgument(
                "cannot delete a hanna code that has not been saved".to_string(),
            ));
        }
        self.store.delete(snippet.id)?;
        debug!(id = snippet.id, name = %snippet.name, "deleted hanna code");
        Ok(())
    }

    pub fn install(&self) -> Result<()> {
        self.store.install()?;
        Ok(())
    }

    pub fn uninstall(&self) -> Result<()> {
        self.store.uninstall()?;
        Ok(())
    }

    /// Embed `attrs` into `code` as stored text. See [`block::pack`].
    pub fn pack(&self, code: &str, attrs: &Attrs) -> Packed {
        block::pack(code, attrs, &self.reserved)
    }

    pub fn pack_str(&self, code: &str, attrs: &str) -> Packed {
        block::pack_str(code, attrs, &self.reserved)
    }

    /// Split stored text into code body and attributes. See [`block::unpack`].
    pub fn unpack(&self, stored: &str) -> (String, Attrs) {
        block::unpack(stored, &self.reserved)
    }

    fn snippet_from_row(&self, row: SnippetRow) -> Result<Snippet> {
        let (code, attrs) = self.unpack(&row.code);
        let mut snippet = Snippet::named(row.name);
        snippet.id = row.id;
        snippet.set_type_bits(row.kind)?;
        snippet.code = code;
        snippet.set_attrs(attrs);
        snippet.modified = row.modified;
        snippet.accessed = row.accessed;
        Ok(snippet)
    }
}
