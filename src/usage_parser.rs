use log::{debug, warn};
use std::fmt;

/// Where a function argument travels in the HTTP request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Path,
    Query,
    Body,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Path => "path",
            Placement::Query => "query",
            Placement::Body => "body",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One argument mentioned by a usage string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageParam {
    pub name: String,
    pub placement: Placement,
}

/// Parser for console usage strings such as `GetItem <id> [limit]`.
///
/// The first token is the function name and is discarded. `[name]` and
/// `[<name>]` are optional and go to the query string. `<name>` is required and
/// becomes a path parameter when the URL template has a `{name}` placeholder or
/// the method is GET/DELETE; otherwise it is the request body.
pub struct UsageParser;

impl UsageParser {
    pub fn parse(usage: &str, url_template: &str, http_method: &str) -> Vec<UsageParam> {
        let template = url_template.replace('+', "");
        let path_biased =
            http_method.eq_ignore_ascii_case("get") || http_method.eq_ignore_ascii_case("delete");

        usage
            .split_whitespace()
            .skip(1)
            .filter_map(|token| {
                let param = Self::parse_token(token, &template, path_biased);
                if param.is_none() {
                    warn!("Unrecognized usage token '{}' in '{}'", token, usage);
                }
                param
            })
            .collect()
    }

    fn parse_token(token: &str, template: &str, path_biased: bool) -> Option<UsageParam> {
        if let Some(inner) = strip_wrapping(token, '[', ']') {
            let name = strip_wrapping(inner, '<', '>').unwrap_or(inner);
            return Self::param(name, Placement::Query);
        }

        let name = strip_wrapping(token, '<', '>')?;
        let placement = if template.contains(&format!("{{{}}}", name)) || path_biased {
            Placement::Path
        } else {
            Placement::Body
        };
        Self::param(name, placement)
    }

    fn param(name: &str, placement: Placement) -> Option<UsageParam> {
        if name.is_empty() {
            return None;
        }
        debug!("{} {}", placement, name);
        Some(UsageParam {
            name: name.to_string(),
            placement,
        })
    }
}

fn strip_wrapping(token: &str, open: char, close: char) -> Option<&str> {
    token.strip_prefix(open)?.strip_suffix(close)
}
