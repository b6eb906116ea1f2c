use crate::commands::{resolve_all, CmdResult};
use crate::error::Result;
use crate::repository::SnippetRepository;
use crate::reserved::ReservedNames;
use crate::store::SnippetStore;

pub fn run<S: SnippetStore, R: ReservedNames, K: AsRef<str>>(
    repo: &SnippetRepository<S, R>,
    keys: &[K],
) -> Result<CmdResult> {
    let snippets = resolve_all(repo, keys)?;
    Ok(CmdResult::default().with_listed(snippets))
}
