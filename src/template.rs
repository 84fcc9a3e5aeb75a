//! Endpoint template rendering
//!
//! Endpoint paths carry `{name}` placeholders (`score/{date}`,
//! `roster/{team_abv}/current`) that a stream binds before each request.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Regex for matching placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// Values bound to placeholder names for one render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateVars {
    values: BTreeMap<String, JsonValue>,
}

impl TemplateVars {
    /// Create an empty binding set
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a single placeholder
    pub fn single(name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new().with(name, value)
    }

    /// Add a binding
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Look up a binding
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.values.get(name)
    }
}

/// Render a template, failing on any unbound placeholder
pub fn render(template: &str, vars: &TemplateVars) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = PLACEHOLDER_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let name = &cap[1];
        match vars.get(name) {
            Some(value) => value_to_string(value),
            None => {
                missing.push(name.to_string());
                cap[0].to_string()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_placeholder(missing.join(", ")))
    }
}

/// Extract all placeholder names from a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Ensure a template uses no placeholder outside `allowed`
pub fn validate(template: &str, allowed: &[&str]) -> Result<()> {
    let unknown: Vec<String> = placeholders(template)
        .into_iter()
        .filter(|name| !allowed.contains(&name.as_str()))
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(Error::template(format!(
            "'{template}' uses unresolvable placeholder(s): {}",
            unknown.join(", ")
        )))
    }
}

/// Text form of a JSON value inside a URL path
///
/// Strings go in verbatim; numbers keep their JSON spelling so a game id
/// like `2024020001` is not rendered as a float.
pub fn value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
