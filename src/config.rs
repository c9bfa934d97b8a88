//! Editor configuration.

use crate::types::DEFAULT_DURATION_MS;
use serde::{Deserialize, Serialize};

/// Default depth of the undo history.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Settings for a [`Project`](crate::project::Project) and its inputs.
///
/// Every field has a default, so partial JSON such as
/// `{"segment_coupling": false}` is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Duration given to newly created steps.
    pub default_step_duration_ms: u32,

    /// Toggle coupled segments together.
    pub segment_coupling: bool,

    /// Storage key for the persisted undo history.
    pub history_key: String,

    /// Most undo snapshots kept. Zero keeps every snapshot.
    pub history_limit: usize,

    pub input: InputConfig,
}

/// Timing for button press classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Hold time after which a press counts as long.
    pub long_press_threshold_ms: u64,

    /// Gap between the first release and the second press of a double press.
    pub double_press_threshold_ms: u64,

    /// When false, every short press is reported as single immediately.
    pub double_press_enabled: bool,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            default_step_duration_ms: DEFAULT_DURATION_MS,
            segment_coupling: true,
            history_key: "history".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            input: InputConfig::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            long_press_threshold_ms: 500,
            double_press_threshold_ms: 100,
            double_press_enabled: true,
        }
    }
}

impl DesignerConfig {
    /// Parses configuration JSON, filling absent fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        if config.default_step_duration_ms == 0 {
            log::warn!("default_step_duration_ms must be >= 1, using {DEFAULT_DURATION_MS}");
            config.default_step_duration_ms = DEFAULT_DURATION_MS;
        }
        Ok(config)
    }
}
