//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single entry point for
//! all hanna operations, whatever the UI.
//!
//! The facade:
//! - **Dispatches** to the matching `commands::*::run`
//! - **Normalizes inputs** (call-site `key=value` pairs into [`Attrs`], optional sort keys)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no business logic, no I/O and no formatting. Those live in `commands/*.rs` and the
//! CLI respectively.
//!
//! `HannaApi<S, R>` is generic over the store and the host's reserved-name predicate:
//! production uses `HannaApi<SqliteStore, HostNames>`, tests `HannaApi<InMemoryStore>`.

use crate::attrs::Attrs;
use crate::commands::config::ConfigAction;
use crate::commands::{self, CmdResult, NewSnippet, SnippetUpdate};
use crate::error::Result;
use crate::repository::SnippetRepository;
use crate::reserved::{NoHostNames, ReservedNames};
use crate::store::{SnippetStore, SortOrder};
use std::path::PathBuf;

pub struct HannaApi<S: SnippetStore, R: ReservedNames = NoHostNames> {
    repo: SnippetRepository<S, R>,
    config_dir: PathBuf,
    default_sort: SortOrder,
}

impl<S: SnippetStore, R: ReservedNames> HannaApi<S, R> {
    pub fn new(repo: SnippetRepository<S, R>, config_dir: PathBuf) -> Self {
        Self {
            repo,
            config_dir,
            default_sort: SortOrder::default(),
        }
    }

    pub fn with_default_sort(mut self, sort: SortOrder) -> Self {
        self.default_sort = sort;
        self
    }

    pub fn repository(&self) -> &SnippetRepository<S, R> {
        &self.repo
    }

    pub fn install(&self) -> Result<CmdResult> {
        commands::install::run(&self.repo)
    }

    pub fn uninstall(&self) -> Result<CmdResult> {
        commands::uninstall::run(&self.repo)
    }

    pub fn create(&self, new: NewSnippet) -> Result<CmdResult> {
        commands::create::run(&self.repo, new)
    }

    /// List everything; `None` uses the configured default sort.
    pub fn list(&self, sort: Option<&str>) -> Result<CmdResult> {
        let sort = sort.unwrap_or(self.default_sort.key());
        commands::list::run(&self.repo, sort)
    }

    pub fn view<K: AsRef<str>>(&self, keys: &[K]) -> Result<CmdResult> {
        commands::view::run(&self.repo, keys)
    }

    pub fn update(&self, key: &str, update: SnippetUpdate) -> Result<CmdResult> {
        commands::update::run(&self.repo, key, update)
    }

    pub fn touch<K: AsRef<str>>(&self, keys: &[K]) -> Result<CmdResult> {
        commands::touch::run(&self.repo, keys)
    }

    pub fn delete<K: AsRef<str>>(&self, keys: &[K]) -> Result<CmdResult> {
        commands::delete::run(&self.repo, keys)
    }

    pub fn export<K: AsRef<str>>(&self, keys: &[K]) -> Result<CmdResult> {
        commands::export::run(&self.repo, keys)
    }

    pub fn import(&self, text: &str) -> Result<CmdResult> {
        commands::import::run(&self.repo, text)
    }

    /// Prepare `name` for execution with call-site `key=value` pairs.
    pub fn prepare<P: AsRef<str>>(&self, name: &str, pairs: &[P]) -> Result<CmdResult> {
        let call_site = parse_pairs(pairs);
        commands::prepare::run(&self.repo, name, &call_site)
    }

    pub fn config(&self, action: ConfigAction) -> Result<CmdResult> {
        commands::config::run(&self.config_dir, action)
    }
}

fn parse_pairs<P: AsRef<str>>(pairs: &[P]) -> Attrs {
    pairs
        .iter()
        .map(|p| match p.as_ref().split_once('=') {
            Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
            None => (p.as_ref().trim().to_string(), String::new()),
        })
        .filter(|(k, _)| !k.is_empty())
        .collect()
}
