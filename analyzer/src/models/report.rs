//! Schema for the fuzzer-generation report
//!
//! The report producer emits one entry per public API; entries carry the
//! generation status of the API fuzzer and the unit tests it was derived
//! from. Fields a producer omits decode as empty and drop the entry during
//! filtering rather than failing the load.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Suffix appended to every derived fuzzer label.
pub const FUZZER_LABEL_SUFFIX: &str = "_ftgfuzz";

/// Status value marking an API or unit-test entry as generated.
pub const STATUS_GENERATED: &str = "GENERATED";

/// Build status value marking the API fuzzer as built successfully.
pub const BUILD_STATUS_SUCCESS: &str = "SUCCESS";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FuzzGenReport {
    #[serde(rename = "API", default)]
    pub api: Vec<ApiEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEntry {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "FuzzerBuildStatus", default)]
    pub fuzzer_build_status: String,
    #[serde(rename = "StatusList", default)]
    pub status_list: Vec<StatusEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusEntry {
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "StatusFromUT", default)]
    pub status_from_ut: String,
}

/// Public API name -> fuzzer labels linked to it. Ordered so that runs and
/// logs over the map are deterministic.
pub type PublicApiMap = BTreeMap<String, BTreeSet<String>>;
