use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::FactorKey;
use super::tiers::PriorityTier;

/// Identifier wrapper for tests. Repository-assigned ids are decimal counter
/// values; imported ids may be arbitrary text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestId(pub String);

impl TestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// User-supplied fields of a test. Every field defaults to empty so partial
/// payloads are accepted rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestDraft {
    pub name: String,
    pub section: String,
    pub description: String,
    pub ticket_id: String,
    pub scores: BTreeMap<FactorKey, u8>,
    pub yes_no_answers: BTreeMap<String, bool>,
}

/// A prioritized manual test. `raw_score`, `total_score`, and `priority` are
/// derived from `scores` by the repository and are never user-settable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: TestId,
    pub name: String,
    pub section: String,
    pub description: String,
    pub ticket_id: String,
    pub scores: BTreeMap<FactorKey, u8>,
    pub yes_no_answers: BTreeMap<String, bool>,
    pub raw_score: u32,
    pub total_score: f64,
    pub priority: PriorityTier,
}

impl TestRecord {
    pub fn can_automate(&self) -> bool {
        self.priority != PriorityTier::WontAutomate
    }
}
