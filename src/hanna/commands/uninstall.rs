use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repository::SnippetRepository;
use crate::reserved::ReservedNames;
use crate::store::SnippetStore;

/// Drop the table. A failure is reported as a message, not an error.
pub fn run<S: SnippetStore, R: ReservedNames>(repo: &SnippetRepository<S, R>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match repo.uninstall() {
        Ok(()) => result.add_message(CmdMessage::success("Hanna code table removed")),
        Err(e) => result.add_message(CmdMessage::error(format!(
            "Could not remove hanna code table: {}",
            e
        ))),
    }
    Ok(result)
}
