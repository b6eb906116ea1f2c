use crate::commands::{resolve, CmdMessage, CmdResult, SnippetUpdate};
use crate::error::{HannaError, Result};
use crate::repository::SnippetRepository;
use crate::reserved::ReservedNames;
use crate::store::SnippetStore;

pub fn run<S: SnippetStore, R: ReservedNames>(
    repo: &SnippetRepository<S, R>,
    key: &str,
    update: SnippetUpdate,
) -> Result<CmdResult> {
    let mut snippet = resolve(repo, key)?;

    if let Some(name) = update.rename {
        snippet.name = name.trim().to_string();
    }
    if let Some(kind) = update.kind {
        snippet.set_type(kind);
    }
    if let Some(consuming) = update.consuming {
        snippet.set_consuming(consuming);
    }
    if let Some(attrs) = update.attrs {
        snippet.set_attrs_str(&attrs);
    }
    if let Some(code) = update.code {
        snippet.code = code;
    }
    for (field, value) in &update.fields {
        // The row id is owned by the store.
        if field == "id" {
            return Err(HannaError::InvalidArgument(
                "field 'id' cannot be changed".to_string(),
            ));
        }
        snippet.set(field, value)?;
    }

    let report = repo.save(&mut snippet)?;

    let mut result = CmdResult::default();
    result.add_save_report(&snippet, &report);
    result.add_message(CmdMessage::success(format!(
        "Updated hanna code {}: {}",
        snippet.id, snippet.name
    )));
    Ok(result.with_affected(vec![snippet]))
}
