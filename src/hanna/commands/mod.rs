use crate::attrs::Attrs;
use crate::config::HannaConfig;
use crate::error::{HannaError, Result};
use crate::model::{CodeKind, Snippet};
use crate::repository::{SaveReport, SnippetRepository};
use crate::reserved::ReservedNames;
use crate::store::SnippetStore;

pub mod config;
pub mod create;
pub mod delete;
pub mod export;
pub mod import;
pub mod install;
pub mod list;
pub mod prepare;
pub mod touch;
pub mod uninstall;
pub mod update;
pub mod view;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A snippet ready to run: the stored value plus the attributes in effect for this call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub snippet: Snippet,
    pub attrs: Attrs,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected: Vec<Snippet>,
    pub listed: Vec<Snippet>,
    pub exported: Vec<String>,
    pub prepared: Option<Prepared>,
    pub config: Option<HannaConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected(mut self, snippets: Vec<Snippet>) -> Self {
        self.affected = snippets;
        self
    }

    pub fn with_listed(mut self, snippets: Vec<Snippet>) -> Self {
        self.listed = snippets;
        self
    }

    pub fn with_exported(mut self, exported: Vec<String>) -> Self {
        self.exported = exported;
        self
    }

    pub fn with_prepared(mut self, prepared: Prepared) -> Self {
        self.prepared = Some(prepared);
        self
    }

    pub fn with_config(mut self, config: HannaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Turn a save report into user-facing messages.
    fn add_save_report(&mut self, snippet: &Snippet, report: &SaveReport) {
        for warning in &report.warnings {
            self.add_message(CmdMessage::warning(warning.clone()));
        }
        if let Some(from) = &report.renamed_from {
            self.add_message(CmdMessage::warning(format!(
                "Name '{}' is taken, saved as '{}'",
                from, snippet.name
            )));
        }
    }
}

/// Fields for a brand new snippet.
#[derive(Debug, Clone, Default)]
pub struct NewSnippet {
    pub name: String,
    pub kind: CodeKind,
    pub not_consuming: bool,
    /// Default attributes in `key=value` text form.
    pub attrs: String,
    pub code: String,
}

impl NewSnippet {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            ..Self::default()
        }
    }
}

/// Changes to apply to an existing snippet. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct SnippetUpdate {
    pub rename: Option<String>,
    pub kind: Option<CodeKind>,
    pub consuming: Option<bool>,
    pub attrs: Option<String>,
    pub code: Option<String>,
    /// Raw `field=value` assignments, applied last through [`Snippet::set`].
    pub fields: Vec<(String, String)>,
}

/// Load a snippet by id or name, failing when it does not exist.
pub(crate) fn resolve<S: SnippetStore, R: ReservedNames>(
    repo: &SnippetRepository<S, R>,
    key: &str,
) -> Result<Snippet> {
    let snippet = repo.get(key)?;
    if snippet.exists() {
        Ok(snippet)
    } else {
        Err(HannaError::NotFound(key.to_string()))
    }
}

pub(crate) fn resolve_all<S: SnippetStore, R: ReservedNames, K: AsRef<str>>(
    repo: &SnippetRepository<S, R>,
    keys: &[K],
) -> Result<Vec<Snippet>> {
    keys.iter().map(|k| resolve(repo, k.as_ref())).collect()
}
