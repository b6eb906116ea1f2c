use crate::commands::CmdResult;
use crate::error::Result;
use crate::repository::SnippetRepository;
use crate::reserved::ReservedNames;
use crate::store::SnippetStore;

pub fn run<S: SnippetStore, R: ReservedNames>(
    repo: &SnippetRepository<S, R>,
    sort: &str,
) -> Result<CmdResult> {
    let snippets = repo.get_all(sort)?;
    Ok(CmdResult::default().with_listed(snippets))
}
