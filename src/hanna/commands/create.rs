use crate::commands::{CmdMessage, CmdResult, NewSnippet};
use crate::error::Result;
use crate::model::Snippet;
use crate::repository::SnippetRepository;
use crate::reserved::ReservedNames;
use crate::store::SnippetStore;

pub fn run<S: SnippetStore, R: ReservedNames>(
    repo: &SnippetRepository<S, R>,
    new: NewSnippet,
) -> Result<CmdResult> {
    let mut snippet = Snippet::named(new.name.trim());
    snippet.set_type(new.kind);
    snippet.set_not_consuming(new.not_consuming);
    snippet.code = new.code;
    snippet.set_attrs_str(&new.attrs);

    let report = repo.save(&mut snippet)?;

    let mut result = CmdResult::default();
    result.add_save_report(&snippet, &report);
    result.add_message(CmdMessage::success(format!(
        "Created hanna code {}: {}",
        snippet.id, snippet.name
    )));
    Ok(result.with_affected(vec![snippet]))
}
