use crate::commands::{resolve_all, CmdMessage, CmdResult};
use crate::error::Result;
use crate::repository::SnippetRepository;
use crate::reserved::ReservedNames;
use crate::store::SnippetStore;

pub fn run<S: SnippetStore, R: ReservedNames, K: AsRef<str>>(
    repo: &SnippetRepository<S, R>,
    keys: &[K],
) -> Result<CmdResult> {
    let snippets = resolve_all(repo, keys)?;
    let mut result = CmdResult::default();

    for mut snippet in snippets {
        repo.touch(&mut snippet)?;
        result.add_message(CmdMessage::success(format!(
            "Touched hanna code {}: {}",
            snippet.id, snippet.name
        )));
        result.affected.push(snippet);
    }

    Ok(result)
}
