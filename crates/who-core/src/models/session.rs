//! Login session models.
//!
//! One `SessionRecord` per line of `who` output, folded into an
//! `AggregationResult` once per sampling cycle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Minimum number of whitespace-separated fields in a session line
/// (user, terminal, date, time, address).
pub const MIN_FIELDS: usize = 5;

/// Field index of the login name
const USERNAME_FIELD: usize = 0;

/// Field index of the origin address
const ADDRESS_FIELD: usize = 4;

/// A single active login, as far as the exporter cares about it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Login name (field 0)
    pub username: String,
    /// Origin address with surrounding parentheses removed (field 4)
    pub address: String,
}

impl SessionRecord {
    /// Parse one non-empty line of session-listing output.
    ///
    /// Fields 1-3 (terminal, date, time) are ignored. Lines with fewer than
    /// [`MIN_FIELDS`] fields are rejected with the offending content.
    pub fn parse_line(line: &str) -> Result<Self, MalformedLine> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(MalformedLine {
                line: line.to_string(),
                field_count: fields.len(),
            });
        }

        Ok(Self {
            username: fields[USERNAME_FIELD].to_string(),
            address: strip_parens(fields[ADDRESS_FIELD]).to_string(),
        })
    }

    /// Label pair for the per-session gauge
    pub fn key(&self) -> SessionKey {
        SessionKey::new(&self.username, &self.address)
    }
}

/// Strip any leading/trailing `(` and `)` characters.
pub fn strip_parens(address: &str) -> &str {
    address.trim_matches(|c| c == '(' || c == ')')
}

/// A line that did not have enough fields to be a session record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// Raw line content
    pub line: String,
    /// Number of whitespace-separated fields found
    pub field_count: usize,
}

impl fmt::Display for MalformedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected at least {MIN_FIELDS} fields, found {}: {}",
            self.field_count, self.line
        )
    }
}

impl std::error::Error for MalformedLine {}

/// (username, address) pair identifying one labeled sample
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub username: String,
    pub address: String,
}

impl SessionKey {
    pub fn new(username: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            address: address.into(),
        }
    }
}

/// Result of one sampling cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationResult {
    /// Number of distinct usernames across accepted lines
    pub unique_users: usize,
    /// Session count per (username, address)
    pub session_counts: BTreeMap<SessionKey, u64>,
    /// Raw content of every line skipped as malformed
    pub malformed_lines: Vec<String>,
}

impl AggregationResult {
    /// Sum of all session counts (equals the number of accepted lines)
    pub fn total_sessions(&self) -> u64 {
        self.session_counts.values().sum()
    }

    /// Session count for one pair, 0 when absent
    pub fn sessions_for(&self, username: &str, address: &str) -> u64 {
        self.session_counts
            .get(&SessionKey::new(username, address))
            .copied()
            .unwrap_or(0)
    }
}
