//! Per-run options.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How model output reaches the caller.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StreamingMode {
    /// One complete event per model response.
    #[default]
    None,
    /// Partial text events as they arrive, then the aggregated response.
    Sse,
}

/// Options for a single `Runner::run_with_config` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub streaming: StreamingMode,
}

impl RunConfig {
    pub fn streaming(mode: StreamingMode) -> Self {
        Self { streaming: mode }
    }
}
