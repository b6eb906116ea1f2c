use crate::commands::export::{ExportRecord, SEGMENT_CLOSE, SEGMENT_OPEN};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{HannaError, Result};
use crate::model::Snippet;
use crate::repository::SnippetRepository;
use crate::reserved::ReservedNames;
use crate::store::SnippetStore;
use base64::Engine;

/// Import every export segment found in `text`.
///
/// Names that already exist are skipped. A malformed segment, or one the repository refuses to
/// save, is reported and the rest are still imported. Store failures abort the import.
pub fn run<S: SnippetStore, R: ReservedNames>(
    repo: &SnippetRepository<S, R>,
    text: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let segments = find_segments(text);

    if segments.is_empty() {
        result.add_message(CmdMessage::info("No hanna codes found to import."));
        return Ok(result);
    }

    for segment in segments {
        let record = match decode_segment(segment) {
            Ok(record) => record,
            Err(e) => {
                result.add_message(CmdMessage::error(e.to_string()));
                continue;
            }
        };

        if repo.get_by_name(&record.name)?.exists() {
            result.add_message(CmdMessage::warning(format!(
                "Skipped existing hanna code: {}",
                record.name
            )));
            continue;
        }

        let mut snippet = Snippet::named(record.name.as_str());
        if let Err(e) = snippet.set_type_bits(record.kind) {
            result.add_message(CmdMessage::error(format!("{}: {}", record.name, e)));
            continue;
        }
        let (code, attrs) = repo.unpack(&record.code);
        snippet.code = code;
        snippet.set_attrs(attrs);

        let report = match repo.save(&mut snippet) {
            Ok(report) => report,
            Err(e @ (HannaError::InvalidArgument(_) | HannaError::NameExhausted { .. })) => {
                result.add_message(CmdMessage::error(format!("{}: {}", record.name, e)));
                continue;
            }
            Err(e) => return Err(e),
        };
        result.add_save_report(&snippet, &report);
        result.add_message(CmdMessage::success(format!(
            "Imported hanna code {}: {}",
            snippet.id, snippet.name
        )));
        result.affected.push(snippet);
    }

    Ok(result)
}

/// Inner text of each `!HannaCode:...:.../!HannaCode` segment, in order.
fn find_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(SEGMENT_OPEN) {
        let after = &rest[start + SEGMENT_OPEN.len()..];
        match after.find(SEGMENT_CLOSE) {
            Some(end) => {
                segments.push(&after[..end]);
                rest = &after[end + SEGMENT_CLOSE.len()..];
            }
            None => {
                segments.push(after);
                break;
            }
        }
    }
    segments
}

fn decode_segment(segment: &str) -> Result<ExportRecord> {
    // Base64 never contains ':', so the payload is whatever follows the last one.
    let (header, payload) = segment
        .rsplit_once(':')
        .ok_or_else(|| HannaError::Import("segment has no payload".to_string()))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| HannaError::Import(format!("{}: invalid base64: {}", header, e)))?;
    let record: ExportRecord = serde_json::from_slice(&bytes)
        .map_err(|e| HannaError::Import(format!("{}: invalid record: {}", header, e)))?;
    if record.name.trim().is_empty() {
        return Err(HannaError::Import(format!("{}: record has no name", header)));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, export, MessageLevel, NewSnippet};
    use crate::model::CodeKind;
    use crate::store::memory::InMemoryStore;

    fn exported_text() -> String {
        let source = SnippetRepository::new(InMemoryStore::new());
        let mut new = NewSnippet::new("greet", "echo $first_name;");
        new.kind = CodeKind::Program;
        new.not_consuming = true;
        new.attrs = "first_name=Karena".into();
        create::run(&source, new).unwrap();
        create::run(&source, NewSnippet::new("plain", "<p>x</p>")).unwrap();
        export::run::<_, _, &str>(&source, &[])
            .unwrap()
            .exported
            .join("\n")
    }

    #[test]
    fn imports_exported_snippets() {
        let target = SnippetRepository::new(InMemoryStore::new());
        let result = run(&target, &exported_text()).unwrap();
        assert_eq!(result.affected.len(), 2);

        let greet = target.get("greet").unwrap();
        assert_eq!(greet.type_bits(), 6);
        assert_eq!(greet.code, "echo $first_name;");
        assert_eq!(greet.attrs().get("first_name"), Some("Karena"));
        assert_eq!(target.get("plain").unwrap().code, "<p>x</p>");
    }

    #[test]
    fn existing_names_are_skipped() {
        let target = SnippetRepository::new(InMemoryStore::new());
        create::run(&target, NewSnippet::new("plain", "mine")).unwrap();
        let result = run(&target, &exported_text()).unwrap();
        assert_eq!(result.affected.len(), 1);
        assert!(result
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Warning && m.content.contains("plain")));
        assert_eq!(target.get("plain").unwrap().code, "mine");
    }

    #[test]
    fn bad_segment_does_not_stop_the_rest() {
        let target = SnippetRepository::new(InMemoryStore::new());
        let text = format!("!HannaCode:broken:@@@/!HannaCode\n{}", exported_text());
        let result = run(&target, &text).unwrap();
        assert_eq!(result.affected.len(), 2);
        assert_eq!(
            result
                .messages
                .iter()
                .filter(|m| m.level == MessageLevel::Error)
                .count(),
            1
        );
    }

    fn segment(name: &str) -> String {
        let record = ExportRecord {
            name: name.to_string(),
            kind: 0,
            code: format!("<p>{}</p>", name),
        };
        let payload =
            base64::engine::general_purpose::STANDARD.encode(serde_json::to_vec(&record).unwrap());
        format!("{}{}:{}{}", SEGMENT_OPEN, name, payload, SEGMENT_CLOSE)
    }

    #[test]
    fn nameless_record_does_not_stop_the_rest() {
        let target = SnippetRepository::new(InMemoryStore::new());
        let text = [segment("first"), segment(""), segment("  "), segment("third")].join("\n");
        let result = run(&target, &text).unwrap();

        assert_eq!(result.affected.len(), 2);
        assert!(target.get("first").unwrap().exists());
        assert!(target.get("third").unwrap().exists());
        assert_eq!(
            result
                .messages
                .iter()
                .filter(|m| m.level == MessageLevel::Error)
                .count(),
            2
        );
    }

    #[test]
    fn text_without_segments_imports_nothing() {
        let target = SnippetRepository::new(InMemoryStore::new());
        let result = run(&target, "just some prose").unwrap();
        assert!(result.affected.is_empty());
        assert_eq!(result.messages[0].level, MessageLevel::Info);
    }

    #[test]
    fn segments_are_found_anywhere_in_text() {
        let text = "before !HannaCode:a:QQ==/!HannaCode middle !HannaCode:b:Qg==/!HannaCode";
        assert_eq!(find_segments(text), vec!["a:QQ==", "b:Qg=="]);
    }
}
