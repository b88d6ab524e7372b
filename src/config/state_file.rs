//! Initial session state loaded from a TOML file.
//!
//! Every top-level key becomes a state variable:
//!
//! ```toml
//! user_name = "Brandon Hancock"
//! user_preferences = """
//! I like to play Pickleball, Disc Golf, and Tennis.
//! """
//! ```

use std::path::Path;

use crate::error::{Result, StatecraftError};
use crate::session::State;

/// Read a TOML file into a [`State`].
pub fn load_state_file(path: impl AsRef<Path>) -> Result<State> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    parse_state(&raw)
}

pub(crate) fn parse_state(raw: &str) -> Result<State> {
    let table: toml::Table = toml::from_str(raw)?;
    let value = serde_json::to_value(table)?;
    match value {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(StatecraftError::InvalidArgument(
            "state file must contain a table".into(),
        )),
    }
}
