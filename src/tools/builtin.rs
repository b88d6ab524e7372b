//! Built-in tools.
//!
//! # Usage
//!
//! ```rust
//! use statecraft::tools::builtin::current_time_tool;
//!
//! let tool = current_time_tool();
//! assert_eq!(tool.name(), "get_current_time");
//! ```

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};

use crate::tools::tool::{AgentTool, Tool, ToolExecutionContext};
use crate::tools::types::AgentToolParameters;

pub const CURRENT_TIME_TOOL: &str = "get_current_time";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render a point in time as the clock tool's three representations.
pub fn time_payload<Tz: TimeZone>(now: &DateTime<Tz>) -> serde_json::Value
where
    Tz::Offset: std::fmt::Display,
{
    let timestamp = now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1e6;
    serde_json::json!({
        "current_time": now.format(DATETIME_FORMAT).to_string(),
        "current_date": now.format(DATE_FORMAT).to_string(),
        "timestamp": timestamp,
    })
}

/// Create the `get_current_time` tool: local wall-clock time as a
/// formatted datetime, a date-only string and a numeric epoch.
pub fn current_time_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        CURRENT_TIME_TOOL,
        "Get the current time in the format YYYY-MM-DD HH:MM:SS",
        AgentToolParameters::empty(),
        |_args, _ctx: ToolExecutionContext| async move { Ok(time_payload(&Local::now())) },
    ))
}

/// Every built-in tool.
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    vec![current_time_tool()]
}
