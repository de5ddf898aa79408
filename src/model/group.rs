//! Group identifiers and display-name lookup.
//!
//! Submitting groups appear under several spellings (`"TS314"`, `"314"`,
//! `"group 0314"`). Every label is reduced to the same three-digit
//! [`GroupId`] so records from both reference sets line up.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Name reported for groups missing from the lookup table.
pub const UNKNOWN_GROUP_NAME: &str = "Unknown";

/// Canonical zero-padded numeric group identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Normalize a raw label: keep its digits, drop leading zeros, pad to three.
    ///
    /// Labels without a single digit are rejected.
    pub fn normalize(label: &str) -> Result<Self, RecordError> {
        let digits: String = label.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(RecordError::MalformedGroupLabel {
                label: label.to_string(),
            });
        }
        let trimmed = digits.trim_start_matches('0');
        let number = if trimmed.is_empty() { "0" } else { trimmed };
        Ok(Self(format!("{number:0>3}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mapping from [`GroupId`] to a human-readable group name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNameLookup {
    names: HashMap<GroupId, String>,
}

impl GroupNameLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name for a raw group number; malformed numbers are skipped.
    pub fn insert(&mut self, raw_number: &str, name: impl Into<String>) -> bool {
        match GroupId::normalize(raw_number) {
            Ok(id) => {
                self.names.insert(id, name.into());
                true
            }
            Err(_) => false,
        }
    }

    /// Display name for `id`, trimmed, or `"Unknown"` when absent.
    pub fn resolve_name(&self, id: &GroupId) -> String {
        self.names
            .get(id)
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|| UNKNOWN_GROUP_NAME.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(GroupId, String)> for GroupNameLookup {
    fn from_iter<I: IntoIterator<Item = (GroupId, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Resolves raw labels into ids and names in one place.
#[derive(Debug, Clone, Copy)]
pub struct GroupKeyResolver<'a> {
    lookup: &'a GroupNameLookup,
}

impl<'a> GroupKeyResolver<'a> {
    pub fn new(lookup: &'a GroupNameLookup) -> Self {
        Self { lookup }
    }

    pub fn normalize(&self, label: &str) -> Result<GroupId, RecordError> {
        GroupId::normalize(label)
    }

    pub fn resolve_name(&self, id: &GroupId) -> String {
        self.lookup.resolve_name(id)
    }
}
