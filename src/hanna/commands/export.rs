//! Portable single-line export format:
//!
//! ```text
//! !HannaCode:<name>:<base64 of {"name":..,"type":..,"code":..}>/!HannaCode
//! ```
//!
//! `code` is the stored text, attribute block included, so a segment carries everything
//! needed to recreate the snippet elsewhere.

use crate::commands::{resolve_all, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Snippet;
use crate::repository::SnippetRepository;
use crate::reserved::ReservedNames;
use crate::store::SnippetStore;
use base64::Engine;
use serde::{Deserialize, Serialize};

pub const SEGMENT_OPEN: &str = "!HannaCode:";
pub const SEGMENT_CLOSE: &str = "/!HannaCode";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub code: String,
}

/// Export the given snippets, or every snippet when `keys` is empty.
pub fn run<S: SnippetStore, R: ReservedNames, K: AsRef<str>>(
    repo: &SnippetRepository<S, R>,
    keys: &[K],
) -> Result<CmdResult> {
    let snippets = if keys.is_empty() {
        repo.get_all("name")?
    } else {
        resolve_all(repo, keys)?
    };

    if snippets.is_empty() {
        let mut res = CmdResult::default();
        res.add_message(CmdMessage::info("No hanna codes to export."));
        return Ok(res);
    }

    let exported = snippets
        .iter()
        .map(|snippet| encode_segment(repo, snippet))
        .collect::<Result<Vec<_>>>()?;

    Ok(CmdResult::default()
        .with_exported(exported)
        .with_affected(snippets))
}

pub fn encode_segment<S: SnippetStore, R: ReservedNames>(
    repo: &SnippetRepository<S, R>,
    snippet: &Snippet,
) -> Result<String> {
    let record = ExportRecord {
        name: snippet.name.clone(),
        kind: i64::from(snippet.type_bits()),
        code: repo.pack(&snippet.code, snippet.attrs()).code,
    };
    let json = serde_json::to_vec(&record)?;
    let payload = base64::engine::general_purpose::STANDARD.encode(json);
    Ok(format!(
        "{}{}:{}{}",
        SEGMENT_OPEN, record.name, payload, SEGMENT_CLOSE
    ))
}
