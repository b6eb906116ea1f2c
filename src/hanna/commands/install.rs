use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repository::SnippetRepository;
use crate::reserved::ReservedNames;
use crate::store::SnippetStore;

pub fn run<S: SnippetStore, R: ReservedNames>(repo: &SnippetRepository<S, R>) -> Result<CmdResult> {
    repo.install()?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("Hanna code table installed"));
    Ok(result)
}
