//! Models of the payloads returned by the service's `/help` endpoint.
//!
//! The endpoint describes the same functions in several formats. The "Console"
//! format carries HTTP routing (method, URL template, usage string) and the type
//! catalog; the "Full" format carries documentation, tags and deprecation. The two
//! are joined by function name with [`join_functions`].

use indexmap::IndexMap;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Help payload formats understood by the `/help` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpFormat {
    Brief,
    Console,
    Full,
}

impl HelpFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            HelpFormat::Brief => "Brief",
            HelpFormat::Console => "Console",
            HelpFormat::Full => "Full",
        }
    }
}

impl fmt::Display for HelpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /help?format=Console`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleHelp {
    /// Raw type descriptors keyed by type name
    #[serde(deserialize_with = "lenient_map")]
    pub types: IndexMap<String, Value>,
    /// Function metadata keyed by function name
    #[serde(deserialize_with = "lenient_map")]
    pub functions: IndexMap<String, ConsoleFunction>,
    pub events: Value,
}

/// Routing view of a single function
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleFunction {
    #[serde(deserialize_with = "lenient")]
    pub http_method: Option<String>,
    /// URL template, possibly with `{+name}` reserved-expansion placeholders
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    /// e.g. `GetItem <id> [limit]`
    #[serde(deserialize_with = "lenient")]
    pub usage: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub help: Option<String>,
    /// Each entry is a single-key object: `{argName: {type, optional, description}}`
    #[serde(deserialize_with = "lenient_list")]
    pub arguments: Vec<IndexMap<String, ConsoleArgument>>,
    pub returns: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleArgument {
    #[serde(rename = "type")]
    pub type_descriptor: Value,
    #[serde(deserialize_with = "lenient")]
    pub optional: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
}

impl ConsoleFunction {
    /// Flattens the argument list into a name lookup. Later duplicates win.
    pub fn argument_lookup(&self) -> IndexMap<&str, &ConsoleArgument> {
        self.arguments
            .iter()
            .flat_map(|entry| entry.iter())
            .map(|(name, arg)| (name.as_str(), arg))
            .collect()
    }
}

/// `GET /help?format=Full`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FullHelp {
    #[serde(deserialize_with = "lenient_list")]
    pub functions: Vec<FullFunction>,
    pub types: Value,
    pub events: Value,
}

/// Documentation view of a single function
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FullFunction {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub help: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub arguments: Vec<FullArgument>,
    pub returns: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub deprecated: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FullArgument {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_descriptor: Value,
    #[serde(deserialize_with = "lenient")]
    pub optional: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
}

impl FullFunction {
    /// Argument lookup by name; entries without a name are reported and skipped.
    pub fn argument_lookup(&self) -> IndexMap<&str, &FullArgument> {
        let mut lookup = IndexMap::new();
        for arg in &self.arguments {
            match arg.name.as_deref() {
                Some(name) => {
                    lookup.insert(name, arg);
                }
                None => warn!("Argument of {} has no name, skipping it", self.name),
            }
        }
        lookup
    }
}

/// `GET /riotclient/v1/app-info`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppInfo {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub sdk_version: Option<String>,
}

/// Decodes a field, falling back to its default when it is null or of the wrong type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Ignoring malformed field: {}", e);
        T::default()
    }))
}

/// Decodes a list entry by entry, skipping entries that do not decode.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!("Expected a list, found {}, ignoring it", other);
            return Ok(Vec::new());
        }
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Skipping malformed list entry #{}: {}", index, e);
                None
            }
        })
        .collect())
}

/// Decodes a map value by value, skipping entries that do not decode.
fn lenient_map<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(IndexMap::new()),
        other => {
            warn!("Expected an object, found {}, ignoring it", other);
            return Ok(IndexMap::new());
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|(name, entry)| match serde_json::from_value(entry) {
            Ok(decoded) => Some((name, decoded)),
            Err(e) => {
                warn!("Skipping malformed entry {}: {}", name, e);
                None
            }
        })
        .collect())
}

/// Both views of one function, joined by name
#[derive(Debug, Clone)]
pub struct FunctionDescriptor<'a> {
    pub name: &'a str,
    pub full: &'a FullFunction,
    /// `None` when the console catalog has no function of that name
    pub console: Option<&'a ConsoleFunction>,
}

/// Joins the full catalog with the console catalog by function name.
///
/// Output follows full-catalog order. When a name occurs more than once in the
/// full catalog the last occurrence wins, keeping the first one's position.
pub fn join_functions<'a>(full: &'a FullHelp, console: &'a ConsoleHelp) -> Vec<FunctionDescriptor<'a>> {
    let mut by_name: IndexMap<&str, &FullFunction> = IndexMap::new();
    for function in &full.functions {
        if function.name.is_empty() {
            warn!("Function without a name in the full catalog, skipping it");
            continue;
        }
        if by_name.insert(function.name.as_str(), function).is_some() {
            warn!("Function {} is listed more than once, using the last entry", function.name);
        }
    }

    by_name
        .into_iter()
        .map(|(name, full)| {
            let console = console.functions.get(name);
            if console.is_none() {
                debug!("Function {} has no console entry", name);
            }
            FunctionDescriptor { name, full, console }
        })
        .collect()
}
