use crate::error::{Error, Result};
use clap::ValueEnum;
use indexmap::IndexMap;
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// User-supplied renames applied when resolving named references.
///
/// Loaded from a flat JSON object: `{"RawName": "OutputName", ...}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameOverrides {
    names: IndexMap<String, String>,
}

impl NameOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an override table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, is not an
    /// object, or maps a name to something other than a string.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading name overrides from {}", path.display());
        let content = fs::read_to_string(path)?;
        let overrides = Self::from_json_str(&content)?;
        info!("Loaded {} name override(s) from {}", overrides.len(), path.display());
        Ok(overrides)
    }

    /// Parses an override table from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        let Value::Object(map) = value else {
            return Err(Error::Config("name overrides must be a JSON object".to_string()));
        };

        let mut overrides = Self::new();
        for (from, to) in map {
            match to {
                Value::String(to) => overrides.insert(from, to),
                other => {
                    return Err(Error::Config(format!(
                        "override for '{}' must be a string, found {}",
                        from, other
                    )))
                }
            }
        }
        Ok(overrides)
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.names.insert(from.into(), to.into());
    }

    /// Applies the table to a raw name; names without an override pass through.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.names.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NameOverrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// How the success response of an operation is keyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusCodeStyle {
    /// Literal `200`
    Exact,
    /// Status range `2XX`
    #[default]
    Range,
}

impl StatusCodeStyle {
    pub fn success_key(&self) -> &'static str {
        match self {
            StatusCodeStyle::Exact => "200",
            StatusCodeStyle::Range => "2XX",
        }
    }
}

/// Which responses every generated operation carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponsePolicy {
    pub status_code_style: StatusCodeStyle,
    /// Attach a `403` referencing the shared `ForbiddenError` response
    pub include_forbidden_response: bool,
}
