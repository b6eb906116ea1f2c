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

    for snippet in snippets {
        repo.delete(&snippet)?;
        result.add_message(CmdMessage::success(format!(
            "Deleted hanna code {}: {}",
            snippet.id, snippet.name
        )));
        result.affected.push(snippet);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::list;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn removes_only_named_rows() {
        let repo = SnippetRepository::new(StoreFixture::new().with_rows(3).store);
        let result = run(&repo, &["snippet_2"]).unwrap();
        assert_eq!(result.affected.len(), 1);

        let remaining = list::run(&repo, "name").unwrap();
        let names: Vec<_> = remaining.listed.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["snippet_1", "snippet_3"]);
    }

    #[test]
    fn nothing_is_deleted_when_a_key_is_missing() {
        let repo = SnippetRepository::new(StoreFixture::new().with_rows(2).store);
        assert!(run(&repo, &["snippet_1", "missing"]).is_err());
        assert_eq!(repo.get_all("name").unwrap().len(), 2);
    }
}
