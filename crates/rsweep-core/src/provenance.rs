//! Provenance and schema descriptors attached to launch manifests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

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

/// Provenance information recorded for every launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Unique identifier of the launch, see [`make_unique_timestamp`].
    pub run_id: String,
    /// Stable hash of the plan that produced the launch.
    pub plan_hash: String,
    /// RFC 3339 timestamp recording when the launch started.
    pub created_at: String,
    /// Host the launcher ran on, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Version map for the tools involved in the launch.
    #[serde(default)]
    pub tool_versions: BTreeMap<String, String>,
}

impl RunProvenance {
    /// Builds provenance for a launch starting now.
    pub fn now(plan_hash: impl Into<String>) -> Self {
        let started = Utc::now();
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            "rsweep-core".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Self {
            run_id: unique_timestamp_at(started, &mut rand::thread_rng()),
            plan_hash: plan_hash.into(),
            created_at: started.to_rfc3339(),
            host: std::env::var("HOSTNAME").ok().filter(|host| !host.is_empty()),
            tool_versions,
        }
    }
}

/// Timestamp with a random suffix, e.g. `20240131_142501_3fa9c2`.
///
/// Sorts chronologically and is unique with high probability even when two
/// launches start within the same second.
pub fn make_unique_timestamp() -> String {
    unique_timestamp_at(Utc::now(), &mut rand::thread_rng())
}

/// Deterministic variant of [`make_unique_timestamp`] for a fixed instant and RNG.
pub fn unique_timestamp_at<R: Rng + ?Sized>(at: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: u32 = rng.gen_range(0..0x0100_0000);
    format!("{}_{:06x}", at.format("%Y%m%d_%H%M%S"), suffix)
}
