//! Provenance and schema descriptors attached to persisted sweep artefacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information attached to every sweep report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Hash of the plan and corpus selector that produced the report.
    pub input_hash: String,
    /// ISO-8601 timestamp recording when the sweep started.
    pub created_at: String,
    /// External tools involved in the run, keyed by role (`solver`, `generator`).
    #[serde(default)]
    pub tools: BTreeMap<String, String>,
    /// Version map for the harness crates involved in the run.
    #[serde(default)]
    pub tool_versions: BTreeMap<String, String>,
}
