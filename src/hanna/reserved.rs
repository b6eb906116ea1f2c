//! Reserved attribute names.
//!
//! Attributes become local variables when a snippet runs, so their names must not shadow
//! anything the host already exposes. The reserved set is the three literal words in
//! [`RESERVED_WORDS`] plus whatever the host's [`ReservedNames`] predicate reports.

use std::collections::HashSet;

/// Names no attribute may use, regardless of host.
pub const RESERVED_WORDS: [&str; 3] = ["name", "hanna", "attr"];

/// Host capability: is this name already taken by a host identifier?
///
/// Injected into [`crate::repository::SnippetRepository`] at construction.
pub trait ReservedNames: Send + Sync {
    fn is_reserved(&self, name: &str) -> bool;
}

/// Host with no identifiers of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHostNames;

impl ReservedNames for NoHostNames {
    fn is_reserved(&self, _name: &str) -> bool {
        false
    }
}

/// A fixed set of host identifiers, e.g. from configuration.
#[derive(Debug, Clone, Default)]
pub struct HostNames {
    names: HashSet<String>,
}

impl HostNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl ReservedNames for HostNames {
    fn is_reserved(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl<F> ReservedNames for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_reserved(&self, name: &str) -> bool {
        self(name)
    }
}

/// Full reserved check: literal words, then the host predicate.
///
/// Empty names are never reserved; they are dropped before this point anyway.
pub fn is_reserved_attr<R: ReservedNames + ?Sized>(host: &R, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    RESERVED_WORDS.contains(&name) || host.is_reserved(name)
}
