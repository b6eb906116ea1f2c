//! # Attribute Block
//!
//! Default attributes are stored inside the code text itself, as a comment-delimited block in
//! front of the body:
//!
//! ```text
//! /*hc_attr
//! first_name="Karena"
//! color
//! hc_attr*/
//! <p>Hello <?= $first_name ?></p>
//! ```
//!
//! [`pack`] writes the block, [`unpack`] splits it back off. Neither ever fails: names that
//! collide with a reserved identifier get a leading underscore, unsafe characters in names are
//! replaced, and delimiter text is removed from values. A block without its terminator is not a
//! block, so the stored text is handed back untouched.

use crate::attrs::Attrs;
use crate::reserved::{is_reserved_attr, ReservedNames};
use tracing::warn;

pub const BLOCK_OPEN: &str = "/*hc_attr";
pub const BLOCK_CLOSE: &str = "hc_attr*/";

const COMMENT_OPEN: &str = "/*";
const COMMENT_CLOSE: &str = "*/";
const MARKER: &str = "hc_attr";

/// Result of packing: the text to store plus any non-fatal warnings raised on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packed {
    pub code: String,
    pub warnings: Vec<String>,
}

/// Prepend the attribute block for `attrs` to `code`.
///
/// Returns `code` unchanged when no attribute survives sanitizing.
pub fn pack<R: ReservedNames + ?Sized>(code: &str, attrs: &Attrs, host: &R) -> Packed {
    let mut lines = String::new();
    let mut warnings = Vec::new();

    for (name, value) in attrs.iter() {
        let mut name = sanitize_field_name(name.trim());
        if name.is_empty() {
            continue;
        }
        if is_reserved_attr(host, &name) {
            warn!(attr = %name, "disallowed attribute name, prefixing with underscore");
            warnings.push(format!("Disallowed attribute name: {}", name));
            name = format!("_{}", name);
        }
        let value = value.trim();
        lines.push_str(&name);
        if !value.is_empty() {
            lines.push('=');
            lines.push_str(&encode_value(value));
        }
        lines.push('\n');
    }

    let code = if lines.is_empty() {
        code.to_string()
    } else {
        format!("{}\n{}{}\n{}", BLOCK_OPEN, lines, BLOCK_CLOSE, code)
    };
    Packed { code, warnings }
}

/// Pack attributes given in their newline-separated text form.
pub fn pack_str<R: ReservedNames + ?Sized>(code: &str, attrs: &str, host: &R) -> Packed {
    pack(code, &Attrs::parse(attrs), host)
}

/// Split stored text into its code body and default attributes.
pub fn unpack<R: ReservedNames + ?Sized>(stored: &str, host: &R) -> (String, Attrs) {
    let Some(close) = stored.find(BLOCK_CLOSE) else {
        return (stored.to_string(), Attrs::new());
    };
    if !stored.starts_with(BLOCK_OPEN) || close < BLOCK_OPEN.len() {
        return (stored.to_string(), Attrs::new());
    }

    let header = &stored[BLOCK_OPEN.len()..close];
    let rest = &stored[close + BLOCK_CLOSE.len()..];
    let body = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let mut attrs = Attrs::new();
    for line in header.split('\n') {
        let (raw_name, raw_value) = match line.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (line, None),
        };
        let name = raw_name
            .trim()
            .trim_matches(|c| matches!(c, '\r' | '\n' | '='));
        if name.is_empty() {
            continue;
        }
        let name = if is_reserved_attr(host, name) {
            format!("_{}", name)
        } else {
            name.to_string()
        };
        let value = raw_value.map(decode_value).unwrap_or_default();
        attrs.insert(name, value);
    }

    (body.to_string(), attrs)
}

/// Does the stored text start with a complete attribute block?
pub fn has_block(stored: &str) -> bool {
    stored.starts_with(BLOCK_OPEN)
        && stored
            .find(BLOCK_CLOSE)
            .is_some_and(|close| close >= BLOCK_OPEN.len())
}

/// Reduce a name to a field-name token: ASCII letters, digits and underscores.
/// Every other character becomes an underscore.
pub fn sanitize_field_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn encode_value(value: &str) -> String {
    let mut clean = value.replace(['\r', '\n'], " ");
    // Removing one delimiter can join the halves of another, so repeat until stable.
    loop {
        let next = clean
            .replace(COMMENT_OPEN, "")
            .replace(COMMENT_CLOSE, "")
            .replace(MARKER, "");
        if next == clean {
            break;
        }
        clean = next;
    }
    format!("\"{}\"", clean.replace('"', "\\\""))
}

fn decode_value(raw: &str) -> String {
    let value = raw.trim_matches(|c| c == '\r' || c == '\n');
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return value[1..value.len() - 1].replace("\\\"", "\"");
    }
    value
        .trim_matches(|c| matches!(c, '\r' | '\n' | '=' | '"'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reserved::{HostNames, NoHostNames};
    use proptest::prelude::*;

    #[test]
    fn packs_block_in_front_of_code() {
        let attrs = Attrs::parse("first_name=Karena\ncolor");
        let packed = pack("<p>hi</p>", &attrs, &NoHostNames);
        assert_eq!(
            packed.code,
            "/*hc_attr\nfirst_name=\"Karena\"\ncolor\nhc_attr*/\n<p>hi</p>"
        );
        assert!(packed.warnings.is_empty());
    }

    #[test]
    fn no_attrs_leaves_code_alone() {
        let packed = pack("echo 1;", &Attrs::new(), &NoHostNames);
        assert_eq!(packed.code, "echo 1;");
    }

    #[test]
    fn round_trips_code_and_attrs() {
        let attrs = Attrs::parse("first_name=Karena\ncolor\ntitle=Say \"hi\"\nurl=a=b");
        for body in ["", "<p>x</p>", "\n  indented\n\n", "line1\r\nline2"] {
            let packed = pack(body, &attrs, &NoHostNames);
            let (code, back) = unpack(&packed.code, &NoHostNames);
            assert_eq!(code, body);
            assert_eq!(back, attrs);
        }
    }

    proptest! {
        #[test]
        fn unpack_inverts_pack(
            body in "(?s).{0,60}",
            pairs in prop::collection::vec(("k_[a-z0-9_]{0,8}", "[A-Za-z0-9 _.,=\"'-]{0,20}"), 0..6),
        ) {
            prop_assume!(!body.starts_with(BLOCK_OPEN));
            prop_assume!(pairs.iter().all(|(_, value)| !value.contains(MARKER)));

            let mut attrs = Attrs::new();
            for (name, value) in &pairs {
                attrs.insert(name.as_str(), value.trim());
            }
            let packed = pack(&body, &attrs, &NoHostNames);
            prop_assert!(packed.warnings.is_empty());

            let (code, back) = unpack(&packed.code, &NoHostNames);
            prop_assert_eq!(code, body);
            prop_assert_eq!(back, attrs);
        }
    }

    #[test]
    fn reserved_names_are_prefixed_with_warning() {
        let attrs = Attrs::parse("name=x");
        let packed = pack("", &attrs, &NoHostNames);
        assert!(packed.code.contains("_name=\"x\""));
        assert_eq!(packed.warnings, vec!["Disallowed attribute name: name"]);
    }

    #[test]
    fn host_names_are_prefixed_too() {
        let host = HostNames::new(["page"]);
        let packed = pack("", &Attrs::parse("page=1\ncolor=red"), &host);
        assert!(packed.code.contains("_page=\"1\"\n"));
        assert!(packed.code.contains("color=\"red\"\n"));
        assert_eq!(packed.warnings.len(), 1);
    }

    #[test]
    fn unpack_prefixes_reserved_names() {
        let stored = "/*hc_attr\nhanna=\"1\"\nattr\nhc_attr*/\nbody";
        let (code, attrs) = unpack(stored, &NoHostNames);
        assert_eq!(code, "body");
        assert_eq!(attrs.get("_hanna"), Some("1"));
        assert_eq!(attrs.get("_attr"), Some(""));
    }

    #[test]
    fn names_are_sanitized() {
        let packed = pack("", &Attrs::parse("first name=a\nx-y=b"), &NoHostNames);
        let (_, attrs) = unpack(&packed.code, &NoHostNames);
        assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["first_name", "x_y"]);
    }

    #[test]
    fn delimiters_are_stripped_from_values() {
        let attrs = Attrs::parse("evil=a*/b/*c hc_attr d\nsneaky=/hc_attr*x");
        let packed = pack("body", &attrs, &NoHostNames);
        assert_eq!(packed.code.matches(BLOCK_CLOSE).count(), 1);
        assert_eq!(packed.code.matches("/*").count(), 1);
        let (code, back) = unpack(&packed.code, &NoHostNames);
        assert_eq!(code, "body");
        assert_eq!(back.get("evil"), Some("abc  d"));
        assert_eq!(back.get("sneaky"), Some("x"));
    }

    #[test]
    fn missing_terminator_is_not_a_block() {
        let stored = "/*hc_attr\nfoo=\"bar\"\n<p>never closed</p>";
        let (code, attrs) = unpack(stored, &NoHostNames);
        assert_eq!(code, stored);
        assert!(attrs.is_empty());
        assert!(!has_block(stored));
    }

    #[test]
    fn terminator_without_header_is_not_a_block() {
        let stored = "<p>talking about hc_attr*/ in prose</p>";
        let (code, attrs) = unpack(stored, &NoHostNames);
        assert_eq!(code, stored);
        assert!(attrs.is_empty());
    }

    #[test]
    fn reads_blocks_with_quoted_empty_values_and_crlf() {
        let stored = "/*hc_attr\r\nfirst_name=\"Karena\"\r\ncolor=\"\"\r\nhc_attr*/\r\nbody";
        let (code, attrs) = unpack(stored, &NoHostNames);
        assert_eq!(code, "body");
        assert_eq!(attrs.get("first_name"), Some("Karena"));
        assert_eq!(attrs.get("color"), Some(""));
    }

    #[test]
    fn pack_str_parses_text_form() {
        let packed = pack_str("x", "a=\"1\"\nb", &NoHostNames);
        assert_eq!(packed.code, "/*hc_attr\na=\"1\"\nb\nhc_attr*/\nx");
    }
}
