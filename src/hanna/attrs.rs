//! # Attribute Defaults
//!
//! A Hanna code carries a flat mapping of attribute names to default values.
//! Tags such as `[[hello_world first_name=Karena]]` override these defaults at the call site.
//!
//! [`Attrs`] keeps insertion order so that a mapping written into the stored attribute block
//! comes back out in the same order it went in. Lookups are linear; snippets carry a handful
//! of attributes, not thousands.
//!
//! ## Text Form
//!
//! The CLI joins repeated `--attr` options into this form, one attribute per line:
//!
//! ```text
//! first_name=Karena
//! color
//! ```
//!
//! A bare name declares an attribute whose default is empty. Values may be wrapped in single
//! or double quotes, which are stripped.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    entries: Vec<(String, String)>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the newline-separated `name=value` text form.
    ///
    /// Each line is split on its first `=`. The name is trimmed of whitespace; the value is
    /// trimmed of whitespace and then of surrounding `"` / `'` characters. Lines with an empty
    /// name are dropped. A later line with the same name replaces the earlier value.
    ///
    /// ```
    /// use hanna::attrs::Attrs;
    ///
    /// let attrs = Attrs::parse("first_name=\"Karena\"\ncolor");
    /// assert_eq!(attrs.get("first_name"), Some("Karena"));
    /// assert_eq!(attrs.get("color"), Some(""));
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut attrs = Self::new();
        for line in text.split('\n') {
            let (name, value) = match line.split_once('=') {
                Some((name, value)) => (
                    name.trim(),
                    value.trim().trim_matches(|c| c == '"' || c == '\''),
                ),
                None => (line.trim(), ""),
            };
            if name.is_empty() {
                continue;
            }
            attrs.insert(name, value);
        }
        attrs
    }

    /// Insert or replace a value. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Merge call-site attributes over these defaults.
    ///
    /// Call-site values win. Defaults keep their order; names only present at the call site
    /// are appended in call-site order.
    pub fn overlay(&self, call_site: &Attrs) -> Attrs {
        let mut merged = self.clone();
        for (name, value) in call_site.iter() {
            merged.insert(name, value);
        }
        merged
    }

    /// Render back to the editor text form (bare name when the value is empty).
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|(n, v)| {
                if v.is_empty() {
                    n.clone()
                } else {
                    format!("{}={}", n, v)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attrs::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}

impl IntoIterator for Attrs {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Attrs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct AttrsVisitor;

impl<'de> Visitor<'de> for AttrsVisitor {
    type Value = Attrs;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of attribute names to string values")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Attrs, M::Error> {
        let mut attrs = Attrs::new();
        while let Some((name, value)) = access.next_entry::<String, String>()? {
            attrs.insert(name, value);
        }
        Ok(attrs)
    }
}

impl<'de> Deserialize<'de> for Attrs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttrsVisitor)
    }
}
