//! Instruction templates hydrated from session state.
//!
//! Placeholders are `{name}` where `name` is an identifier, optionally
//! prefixed with `app:`, `user:` or `temp:`. A trailing `?` (`{name?}`)
//! makes the placeholder optional. Brace groups that do not hold a valid
//! name, such as inline JSON, are left untouched.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, StatecraftError};
use crate::session::State;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{+([^{}]*)\}+").expect("placeholder regex must compile"));

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:app|user|temp):)?[A-Za-z_][A-Za-z0-9_]*$")
        .expect("placeholder name regex must compile")
});

/// A placeholder found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub optional: bool,
}

/// An instruction string with `{name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstructionTemplate {
    source: String,
}

impl InstructionTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The raw template text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholders in order of appearance, duplicates removed.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut found: Vec<Placeholder> = Vec::new();
        for caps in PLACEHOLDER_RE.captures_iter(&self.source) {
            if let Some(placeholder) = parse_placeholder(&caps[1]) {
                if !found.iter().any(|p| p.name == placeholder.name) {
                    found.push(placeholder);
                }
            }
        }
        found
    }

    /// Substitute every placeholder with its value from `state`.
    ///
    /// String values are inserted verbatim, anything else as compact JSON.
    /// A required placeholder with no matching key fails with
    /// [`StatecraftError::MissingStateVariable`]; an optional one renders
    /// as an empty string.
    pub fn hydrate(&self, state: &State) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(&self.source) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&self.source[last..whole.start()]);
            last = whole.end();

            let Some(placeholder) = parse_placeholder(&caps[1]) else {
                out.push_str(whole.as_str());
                continue;
            };

            match state.get(&placeholder.name) {
                Some(serde_json::Value::String(s)) => out.push_str(s),
                Some(other) => out.push_str(&other.to_string()),
                None if placeholder.optional => {}
                None => {
                    return Err(StatecraftError::MissingStateVariable {
                        name: placeholder.name,
                    })
                }
            }
        }

        out.push_str(&self.source[last..]);
        Ok(out)
    }
}

impl From<&str> for InstructionTemplate {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for InstructionTemplate {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

fn parse_placeholder(inner: &str) -> Option<Placeholder> {
    let inner = inner.trim();
    let (name, optional) = match inner.strip_suffix('?') {
        Some(name) => (name, true),
        None => (inner, false),
    };
    NAME_RE.is_match(name).then(|| Placeholder {
        name: name.to_string(),
        optional,
    })
}

/// Hydrate a template string against `state` in one call.
pub fn hydrate(template: &str, state: &State) -> Result<String> {
    InstructionTemplate::new(template).hydrate(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const PREFERENCES: &str = "\n        I like to play Pickleball, Disc Golf, and Tennis.\n        My favorite food is Mexican.\n    ";

    #[test]
    fn substitutes_every_placeholder() {
        let state = State::from([
            ("user_name", "Brandon Hancock"),
            ("user_preferences", PREFERENCES),
        ]);

        let out = hydrate("Name: {user_name} Preferences: {user_preferences}", &state).unwrap();

        assert_eq!(out, format!("Name: Brandon Hancock Preferences: {PREFERENCES}"));
        assert!(!out.contains('{'));
        assert!(!out.contains('}'));
    }

    #[test]
    fn missing_variable_is_an_error() {
        let state = State::from([("user_name", "Brandon Hancock")]);

        let err = hydrate("Name: {user_name} Preferences: {user_preferences}", &state)
            .unwrap_err();

        match err {
            StatecraftError::MissingStateVariable { name } => {
                assert_eq!(name, "user_preferences")
            }
            other => panic!("expected MissingStateVariable, got {other:?}"),
        }
    }

    #[test]
    fn optional_placeholder_renders_empty() {
        let state = State::from([("user_name", "Ada")]);
        let out = hydrate("Hi {user_name}{ nickname? }!", &state).unwrap();
        assert_eq!(out, "Hi Ada!");
    }

    #[test]
    fn optional_placeholder_uses_value_when_present() {
        let state = State::from([("nickname", "Bran")]);
        assert_eq!(hydrate("({nickname?})", &state).unwrap(), "(Bran)");
    }

    #[test]
    fn non_identifier_braces_are_left_alone() {
        let state = State::new();
        let template = r#"Reply as {"answer": "..."} or {}"#;
        assert_eq!(hydrate(template, &state).unwrap(), template);
    }

    #[test]
    fn prefixed_names_are_looked_up_whole() {
        let state = State::from([("user:language", "Turkish")]);
        assert_eq!(hydrate("Speak {user:language}.", &state).unwrap(), "Speak Turkish.");
    }

    #[test]
    fn structured_values_render_as_json() {
        let state = State::from([("sports", json!(["Pickleball", "Tennis"])), ("age", json!(34))]);
        assert_eq!(
            hydrate("{sports} at {age}", &state).unwrap(),
            r#"["Pickleball","Tennis"] at 34"#
        );
    }

    #[test]
    fn doubled_braces_still_substitute() {
        let state = State::from([("user_name", "Ada")]);
        assert_eq!(hydrate("{{user_name}}", &state).unwrap(), "Ada");
    }

    #[test]
    fn hydration_does_not_touch_state() {
        let state = State::from([("user_name", "Brandon Hancock")]);
        let before = state.clone();
        hydrate("Name: {user_name}", &state).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn placeholders_are_enumerated_once() {
        let template = InstructionTemplate::new("{a} {b?} {a} {not valid} {temp:c}");
        let names: Vec<_> = template
            .placeholders()
            .into_iter()
            .map(|p| (p.name, p.optional))
            .collect();
        assert_eq!(
            names,
            vec![
                ("a".to_string(), false),
                ("b".to_string(), true),
                ("temp:c".to_string(), false),
            ]
        );
    }
}
