//! Engine configuration.
//!
//! All tunables have defaults that suit typical runs; a JSON file can override
//! any subset of them:
//!
//! ```json
//! { "storage": "Sparse", "max_states": 5000000 }
//! ```

#[cfg(feature = "serialization")]
use std::path::Path;

pub use crate::automaton::StorageFormat;
use crate::automaton::DEFAULT_DENSE_CELL_LIMIT;

/// Tunables for [`Factory`](crate::ops::Factory).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EngineConfig {
    /// Storage of constructed automata
    pub storage: StorageFormat,
    /// Tables with fewer cells than this are dense under `StorageFormat::Default`
    pub dense_cell_limit: usize,
    /// The minimiser's duplicate pre-pass repeats while a round removes at least this many states
    pub prepass_min_reduction: usize,
    /// A pre-pass round must also remove more than `states / prepass_reduction_divisor` states
    pub prepass_reduction_divisor: usize,
    /// Larger automata are trimmed before minimising even when flagged accessible
    pub force_trim_threshold: usize,
    /// Maximum number of states a construction may create
    pub max_states: usize,
    /// Minimum time between progress messages
    pub status_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            storage: StorageFormat::Default,
            dense_cell_limit: DEFAULT_DENSE_CELL_LIMIT,
            prepass_min_reduction: 1000,
            prepass_reduction_divisor: 12,
            force_trim_threshold: 200_000,
            max_states: (u32::MAX >> 1) as usize,
            status_interval_ms: 1000,
        }
    }
}

#[cfg(feature = "serialization")]
impl EngineConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| crate::FsaError::parse(e.line(), e.to_string()))
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| crate::FsaError::parse(e.line(), e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
