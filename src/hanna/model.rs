use crate::attrs::Attrs;
use crate::error::{HannaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Legacy integer value of the markup kind.
pub const TYPE_MARKUP: u8 = 0;
/// Legacy integer value of the script kind.
pub const TYPE_SCRIPT: u8 = 1;
/// Legacy integer value of the program kind.
pub const TYPE_PROGRAM: u8 = 2;
/// Flag bit: keep the wrapping around a tag occurrence instead of absorbing it.
pub const TYPE_NOT_CONSUMING: u8 = 4;

const BASE_MASK: i64 = (TYPE_SCRIPT | TYPE_PROGRAM) as i64;

/// Content kind of a snippet's code body. Kinds are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodeKind {
    #[default]
    Markup,
    Script,
    Program,
}

impl CodeKind {
    /// Lookup order used when resolving names and bits.
    pub const ALL: [CodeKind; 3] = [CodeKind::Program, CodeKind::Script, CodeKind::Markup];

    pub fn bits(self) -> u8 {
        match self {
            CodeKind::Markup => TYPE_MARKUP,
            CodeKind::Script => TYPE_SCRIPT,
            CodeKind::Program => TYPE_PROGRAM,
        }
    }

    /// Display name, as shown in the editor and accepted by [`name_to_type`].
    pub fn name(self) -> &'static str {
        match self {
            CodeKind::Markup => "HTML",
            CodeKind::Script => "JS",
            CodeKind::Program => "PHP",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|kind| kind.name() == upper)
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.bits() == bits)
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodeKind {
    type Err = HannaError;

    fn from_str(s: &str) -> Result<Self> {
        name_to_type(s)
            .and_then(CodeKind::from_bits)
            .ok_or_else(|| HannaError::InvalidArgument(format!("unknown code type '{}'", s)))
    }
}

/// Base kind plus the not-consuming flag.
///
/// In memory the two halves live in separate fields; they only meet as a single integer at the
/// storage boundary via [`SnippetType::bits`] and [`SnippetType::from_bits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SnippetType {
    pub kind: CodeKind,
    pub not_consuming: bool,
}

impl SnippetType {
    pub fn new(kind: CodeKind, not_consuming: bool) -> Self {
        Self {
            kind,
            not_consuming,
        }
    }

    pub fn bits(self) -> u8 {
        let flag = if self.not_consuming {
            TYPE_NOT_CONSUMING
        } else {
            0
        };
        self.kind.bits() | flag
    }

    /// Decode the stored integer.
    ///
    /// Script and program bits are mutually exclusive; a value carrying both (or any bit above
    /// the not-consuming flag) is rejected rather than resolved by lookup order.
    pub fn from_bits(bits: i64) -> Result<Self> {
        if !(0..=(BASE_MASK | TYPE_NOT_CONSUMING as i64)).contains(&bits) {
            return Err(HannaError::InvalidArgument(format!(
                "type value {} is out of range",
                bits
            )));
        }
        let not_consuming = bits & TYPE_NOT_CONSUMING as i64 != 0;
        let kind = CodeKind::from_bits((bits & BASE_MASK) as u8).ok_or_else(|| {
            HannaError::InvalidArgument(format!("type value {} sets more than one code kind", bits))
        })?;
        Ok(Self::new(kind, not_consuming))
    }
}

impl TryFrom<i64> for SnippetType {
    type Error = HannaError;

    fn try_from(bits: i64) -> Result<Self> {
        Self::from_bits(bits)
    }
}

impl From<SnippetType> for i64 {
    fn from(t: SnippetType) -> i64 {
        t.bits() as i64
    }
}

/// Resolve a type name (`HTML`, `JS`, `PHP`, any case) or an all-digit string to its integer.
///
/// Returns `None` when nothing matches.
pub fn name_to_type(name: &str) -> Option<u8> {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        return name.parse().ok();
    }
    CodeKind::from_name(name).map(CodeKind::bits)
}

/// Display name of a stored type integer, ignoring the not-consuming flag.
///
/// Returns an empty string for values that do not decode to a single code kind.
pub fn type_name(bits: i64) -> &'static str {
    SnippetType::from_bits(bits)
        .map(|t| t.kind.name())
        .unwrap_or("")
}

/// Integer coercion for loosely typed input: optional sign followed by leading digits.
/// Anything else coerces to zero.
pub fn coerce_int(value: &str) -> i64 {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut n: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        n = n.saturating_mul(10).saturating_add((b - b'0') as i64);
    }
    if negative {
        -n
    } else {
        n
    }
}

/// One named Hanna code.
///
/// A default `Snippet` is the neutral, unsaved value: id 0, markup, no code, no attributes.
/// Repository lookups that miss return exactly this value, so `id == 0` means "not found".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    snippet_type: SnippetType,
    /// Code body without the stored attribute block.
    pub code: String,
    attrs: Attrs,
    pub modified: i64,
    pub accessed: i64,
}

impl Snippet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// True once the snippet has a row in the store.
    pub fn exists(&self) -> bool {
        self.id != 0
    }

    pub fn snippet_type(&self) -> SnippetType {
        self.snippet_type
    }

    /// The stored integer form (kind bits plus flag).
    pub fn type_bits(&self) -> u8 {
        self.snippet_type.bits()
    }

    /// Replace the base kind, keeping the not-consuming flag.
    pub fn set_type(&mut self, kind: CodeKind) {
        self.snippet_type.kind = kind;
    }

    /// Replace the base kind from a name (`HTML`, `js`, ...) or its digits.
    ///
    /// Fails with [`HannaError::InvalidArgument`] without touching the snippet when the value
    /// does not resolve.
    pub fn set_type_str(&mut self, value: &str) -> Result<()> {
        let kind: CodeKind = value.parse()?;
        self.set_type(kind);
        Ok(())
    }

    /// Replace kind and flag together from the stored integer.
    pub fn set_type_bits(&mut self, bits: i64) -> Result<()> {
        self.snippet_type = SnippetType::from_bits(bits)?;
        Ok(())
    }

    pub fn has_type(&self, kind: CodeKind) -> bool {
        self.snippet_type.kind == kind
    }

    pub fn has_type_str(&self, value: &str) -> Result<bool> {
        let kind: CodeKind = value.parse()?;
        Ok(self.has_type(kind))
    }

    pub fn type_name(&self) -> &'static str {
        self.snippet_type.kind.name()
    }

    /// Pure kind value with the not-consuming flag cleared.
    pub fn code_type(&self) -> u8 {
        self.snippet_type.kind.bits()
    }

    pub fn is_program(&self) -> bool {
        self.has_type(CodeKind::Program)
    }

    pub fn is_script(&self) -> bool {
        self.has_type(CodeKind::Script)
    }

    /// Markup is whatever is neither program nor script.
    pub fn is_markup(&self) -> bool {
        !self.is_program() && !self.is_script()
    }

    pub fn is_not_consuming(&self) -> bool {
        self.snippet_type.not_consuming
    }

    pub fn set_not_consuming(&mut self, not_consuming: bool) {
        self.snippet_type.not_consuming = not_consuming;
    }

    pub fn is_consuming(&self) -> bool {
        !self.is_not_consuming()
    }

    pub fn set_consuming(&mut self, consuming: bool) {
        self.set_not_consuming(!consuming);
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    pub fn set_attrs(&mut self, attrs: Attrs) -> &Attrs {
        self.attrs = attrs;
        &self.attrs
    }

    /// Replace the attributes from their text form. See [`Attrs::parse`].
    pub fn set_attrs_str(&mut self, text: &str) -> &Attrs {
        self.set_attrs(Attrs::parse(text))
    }

    pub fn clear_attrs(&mut self) -> &Attrs {
        self.attrs.clear();
        &self.attrs
    }

    /// Assign a field by name from loosely typed text.
    ///
    /// `id`, `type`, `modified` and `accessed` are integer fields and go through
    /// [`coerce_int`] first; `attrs` is parsed from its text form.
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "id" => self.id = coerce_int(value),
            "type" => self.set_type_bits(coerce_int(value))?,
            "modified" => self.modified = coerce_int(value),
            "accessed" => self.accessed = coerce_int(value),
            "name" => self.name = value.to_string(),
            "code" => self.code = value.to_string(),
            "attrs" => {
                self.set_attrs_str(value);
            }
            other => {
                return Err(HannaError::InvalidArgument(format!(
                    "unknown field '{}'",
                    other
                )))
            }
        }
        Ok(())
    }
}
