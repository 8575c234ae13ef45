use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Permission code granted to a user (e.g. `"system:user:create"`).
///
/// Codes are opaque strings compared by exact match only: there is no
/// wildcard or hierarchy semantics at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCode(Cow<'static, str>);

impl AccessCode {
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for AccessCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for AccessCode {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccessCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// The set of codes held by the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCodes(HashSet<AccessCode>);

impl AccessCodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, code: &AccessCode) -> bool {
        self.0.contains(code)
    }

    pub fn contains_str(&self, code: &str) -> bool {
        self.0.iter().any(|c| c.as_str() == code)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessCode> {
        self.0.iter()
    }

    /// Codes in lexical order (stable output for logs and display).
    pub fn sorted(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.0.iter().map(|c| c.as_str()).collect();
        v.sort_unstable();
        v
    }
}

impl<C: Into<AccessCode>> FromIterator<C> for AccessCodes {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
