use crate::attrs::Attrs;
use crate::commands::{CmdResult, Prepared};
use crate::error::{HannaError, Result};
use crate::repository::SnippetRepository;
use crate::reserved::ReservedNames;
use crate::store::SnippetStore;

/// Load the named snippet for execution.
///
/// Call-site attributes win over the stored defaults; defaults keep their order and new keys
/// are appended. Preparing counts as an access, so `accessed` is updated.
pub fn run<S: SnippetStore, R: ReservedNames>(
    repo: &SnippetRepository<S, R>,
    name: &str,
    call_site: &Attrs,
) -> Result<CmdResult> {
    let mut snippet = repo.get_by_name(name)?;
    if !snippet.exists() {
        return Err(HannaError::NotFound(name.to_string()));
    }

    repo.touch(&mut snippet)?;
    let attrs = snippet.attrs().overlay(call_site);

    Ok(CmdResult::default().with_prepared(Prepared { snippet, attrs }))
}
