use crate::config::ResponsePolicy;
use crate::help::{ConsoleFunction, FullFunction};
use crate::openapi_builder::{HttpMethod, MediaType, Operation, Parameter, RequestBody, Response};
use crate::schema_generator::{Schema, TypeTranslator};
use crate::type_descriptor::TypeDescriptor;
use crate::usage_parser::{Placement, UsageParser};
use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;

/// Tag used when a function declares none of its own
pub const DEFAULT_TAG: &str = "core-sdk";

/// Tags the service uses internally; they never appear in the output.
const INTERNAL_TAGS: &[&str] = &["$remoting-binding-module", "Plugins"];

const JSON_MEDIA_TYPE: &str = "application/json";

/// One translated operation together with where it lives in `paths`.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Normalized URL template
    pub path: String,
    pub method: HttpMethod,
    pub operation: Operation,
}

/// Turns a function's console and full descriptions into one operation
#[derive(Debug, Clone, Default)]
pub struct EndpointTranslator {
    types: TypeTranslator,
    policy: ResponsePolicy,
}

impl EndpointTranslator {
    pub fn new(types: TypeTranslator, policy: ResponsePolicy) -> Self {
        Self { types, policy }
    }

    pub fn policy(&self) -> &ResponsePolicy {
        &self.policy
    }

    /// Translates one function. Returns `None` (after logging why) when the
    /// console entry has no usable URL or HTTP method.
    pub fn translate(&self, full: &FullFunction, console: &ConsoleFunction) -> Option<Endpoint> {
        let path = match console.url.as_deref().map(normalize_url) {
            Some(path) if !path.trim().is_empty() => path,
            _ => {
                warn!("No URL found for {}, skipping it", full.name);
                return None;
            }
        };

        let Some(raw_method) = console.http_method.as_deref() else {
            warn!("No HTTP method found for {}, skipping it", full.name);
            return None;
        };
        let Some(method) = HttpMethod::parse(raw_method) else {
            warn!("Unsupported HTTP method {} for {}, skipping it", raw_method, full.name);
            return None;
        };
        debug!("{} {} ({})", method, path, full.name);

        let description = describe(full, console);
        let deprecated = is_deprecated(full, description.as_deref());
        let (parameters, request_body) = self.parameters(full, console, &path, raw_method);

        let operation = Operation {
            operation_id: Some(full.name.clone()),
            description,
            tags: tags(&full.tags),
            deprecated,
            parameters: if parameters.is_empty() {
                None
            } else {
                Some(parameters)
            },
            request_body,
            responses: self.responses(console.returns.as_ref()),
        };

        Some(Endpoint {
            path,
            method,
            operation,
        })
    }

    fn parameters(
        &self,
        full: &FullFunction,
        console: &ConsoleFunction,
        url_template: &str,
        http_method: &str,
    ) -> (Vec<Parameter>, Option<RequestBody>) {
        let mut parameters = Vec::new();
        let mut request_body = None;

        let Some(usage) = console.usage.as_deref() else {
            return (parameters, request_body);
        };

        let console_args = console.argument_lookup();
        let full_args = full.argument_lookup();
        let mut seen = HashSet::new();

        for param in UsageParser::parse(usage, url_template, http_method) {
            let Some(arg) = console_args.get(param.name.as_str()) else {
                warn!("Argument not found: {} (in {})", param.name, full.name);
                continue;
            };
            if !seen.insert(param.name.clone()) {
                warn!("Argument {} appears twice in the usage of {}", param.name, full.name);
                continue;
            }

            let description = non_empty(arg.description.as_deref()).or_else(|| {
                full_args
                    .get(param.name.as_str())
                    .and_then(|a| non_empty(a.description.as_deref()))
            });
            let schema = self.types.translate_value(&arg.type_descriptor);
            let declared_required = arg.optional == Some(false);

            match param.placement {
                Placement::Path | Placement::Query => {
                    let location = param.placement;
                    parameters.push(Parameter {
                        location: location.as_str().to_string(),
                        name: param.name,
                        description,
                        // Path parameters are always required
                        required: location == Placement::Path || declared_required,
                        schema,
                    });
                }
                Placement::Body => {
                    if request_body.is_some() {
                        warn!("{} has more than one body argument, using {}", full.name, param.name);
                    }
                    request_body = Some(RequestBody {
                        description,
                        required: declared_required,
                        content: json_content(schema),
                    });
                }
            }
        }

        (parameters, request_body)
    }

    fn responses(&self, returns: Option<&Value>) -> IndexMap<String, Response> {
        let mut responses = IndexMap::new();
        let success_key = self.policy.status_code_style.success_key().to_string();

        let success = match return_descriptor(returns) {
            Some(descriptor) => Response {
                description: Some("Success".to_string()),
                content: Some(json_content(self.types.translate(&descriptor))),
                reference: None,
            },
            None => Response {
                description: Some("Returns nothing".to_string()),
                content: None,
                reference: None,
            },
        };
        responses.insert(success_key, success);
        responses.insert(
            "401".to_string(),
            Response::reference("#/components/responses/UnauthorizedError"),
        );
        if self.policy.include_forbidden_response {
            responses.insert(
                "403".to_string(),
                Response::reference("#/components/responses/ForbiddenError"),
            );
        }
        responses
    }
}

/// `{+path}` reserved-expansion placeholders become plain `{path}`.
pub fn normalize_url(url: &str) -> String {
    url.replace("{+", "{")
}

/// Bare names go through the classifier; wrapper objects name their type by
/// their first key.
fn return_descriptor(returns: Option<&Value>) -> Option<TypeDescriptor> {
    match returns? {
        Value::Null => None,
        Value::Object(map) => Some(TypeDescriptor::Reference(
            map.keys().next().cloned().unwrap_or_default(),
        )),
        other => Some(TypeDescriptor::classify(other)),
    }
}

fn describe(full: &FullFunction, console: &ConsoleFunction) -> Option<String> {
    let description = non_empty(full.description.as_deref())
        .or_else(|| non_empty(console.description.as_deref()));
    let help = non_empty(full.help.as_deref()).or_else(|| non_empty(console.help.as_deref()));

    match (description, help) {
        (Some(description), Some(help)) if description != help => {
            Some(format!("{}\n\n{}", description, help))
        }
        (Some(description), _) => Some(description),
        (None, help) => help,
    }
}

fn is_deprecated(full: &FullFunction, description: Option<&str>) -> bool {
    full.deprecated.unwrap_or(false)
        || description
            .map(|text| text.to_lowercase().contains("deprecated"))
            .unwrap_or(false)
}

fn tags(declared: &[String]) -> Vec<String> {
    let tags: Vec<String> = declared
        .iter()
        .filter(|tag| !INTERNAL_TAGS.contains(&tag.as_str()))
        .cloned()
        .collect();
    if tags.is_empty() {
        vec![DEFAULT_TAG.to_string()]
    } else {
        tags
    }
}

fn json_content(schema: Schema) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(JSON_MEDIA_TYPE.to_string(), MediaType { schema });
    content
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatusCodeStyle;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn full(value: Value) -> FullFunction {
        serde_json::from_value(value).unwrap()
    }

    fn console(value: Value) -> ConsoleFunction {
        serde_json::from_value(value).unwrap()
    }

    fn to_json<T: serde::Serialize>(value: &T) -> Value {
        serde_json::to_value(value).unwrap()
    }

    fn get_item() -> (FullFunction, ConsoleFunction) {
        (
            full(json!({"name": "getItem", "arguments": [{"name": "id"}], "returns": "int"})),
            console(json!({
                "http_method": "GET",
                "url": "/items/{id}",
                "usage": "getItem <id>",
                "arguments": [{"id": {"type": "int", "optional": false, "description": "item id"}}],
                "returns": "int"
            })),
        )
    }

    #[test]
    fn test_get_item_end_to_end() {
        let (full, console) = get_item();
        let endpoint = EndpointTranslator::default().translate(&full, &console).unwrap();

        assert_eq!(endpoint.path, "/items/{id}");
        assert_eq!(endpoint.method, HttpMethod::Get);
        assert_eq!(
            to_json(&endpoint.operation.parameters),
            json!([{
                "in": "path",
                "name": "id",
                "description": "item id",
                "required": true,
                "schema": {"type": "integer"}
            }])
        );
        assert_eq!(
            to_json(&endpoint.operation.responses["2XX"]),
            json!({
                "description": "Success",
                "content": {"application/json": {"schema": {"type": "integer"}}}
            })
        );
        assert_eq!(
            to_json(&endpoint.operation.responses["401"]),
            json!({"$ref": "#/components/responses/UnauthorizedError"})
        );
        assert!(!endpoint.operation.responses.contains_key("403"));
        assert_eq!(endpoint.operation.tags, vec![DEFAULT_TAG.to_string()]);
        assert_eq!(endpoint.operation.operation_id.as_deref(), Some("getItem"));
    }

    #[test]
    fn test_exact_status_and_forbidden_policy() {
        let (full, console) = get_item();
        let translator = EndpointTranslator::new(
            TypeTranslator::default(),
            ResponsePolicy {
                status_code_style: StatusCodeStyle::Exact,
                include_forbidden_response: true,
            },
        );
        let endpoint = translator.translate(&full, &console).unwrap();
        let keys: Vec<_> = endpoint.operation.responses.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["200", "401", "403"]);
        assert_eq!(
            to_json(&endpoint.operation.responses["403"]),
            json!({"$ref": "#/components/responses/ForbiddenError"})
        );
    }

    #[test]
    fn test_query_required_only_when_declared() {
        let full = full(json!({"name": "list"}));
        let console = console(json!({
            "http_method": "GET",
            "url": "/items",
            "usage": "list [limit] [<cursor>]",
            "arguments": [
                {"limit": {"type": "uint32", "optional": true}},
                {"cursor": {"type": "string", "optional": false}}
            ]
        }));

        let endpoint = EndpointTranslator::default().translate(&full, &console).unwrap();
        let parameters = endpoint.operation.parameters.unwrap();
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].location, "query");
        assert!(!parameters[0].required);
        assert_eq!(parameters[1].name, "cursor");
        assert!(parameters[1].required);
        assert!(to_json(&parameters[0]).get("required").is_none());
    }

    #[test]
    fn test_path_parameter_forced_required() {
        let full = full(json!({"name": "get"}));
        let console = console(json!({
            "http_method": "GET",
            "url": "/items/{id}",
            "usage": "get <id>",
            "arguments": [{"id": {"type": "string", "optional": true}}]
        }));
        let endpoint = EndpointTranslator::default().translate(&full, &console).unwrap();
        assert!(endpoint.operation.parameters.unwrap()[0].required);
    }

    #[test]
    fn test_post_body_parameter() {
        let full = full(json!({"name": "create", "description": "Creates a thing"}));
        let console = console(json!({
            "http_method": "POST",
            "url": "/things",
            "usage": "create <body>",
            "arguments": [{"body": {"type": {"Thing": {}}, "optional": false, "description": "the thing"}}]
        }));

        let endpoint = EndpointTranslator::default().translate(&full, &console).unwrap();
        assert!(endpoint.operation.parameters.is_none());
        assert_eq!(
            to_json(&endpoint.operation.request_body),
            json!({
                "description": "the thing",
                "required": true,
                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Thing"}}}
            })
        );
        assert_eq!(
            to_json(&endpoint.operation.responses["2XX"]),
            json!({"description": "Returns nothing"})
        );
    }

    #[test]
    fn test_plus_placeholder_is_normalized() {
        let full = full(json!({"name": "proxy"}));
        let console = console(json!({
            "http_method": "POST",
            "url": "/proxy/{+path}",
            "usage": "proxy <path>",
            "arguments": [{"path": {"type": "string"}}]
        }));
        let endpoint = EndpointTranslator::default().translate(&full, &console).unwrap();
        assert_eq!(endpoint.path, "/proxy/{path}");
        let parameters = endpoint.operation.parameters.unwrap();
        assert_eq!(parameters[0].location, "path");
    }

    #[test]
    fn test_missing_url_or_method_is_skipped() {
        let full = full(json!({"name": "noUrl"}));
        assert!(EndpointTranslator::default()
            .translate(&full, &console(json!({"http_method": "GET"})))
            .is_none());
        assert!(EndpointTranslator::default()
            .translate(&full, &console(json!({"http_method": "GET", "url": "  "})))
            .is_none());
        assert!(EndpointTranslator::default()
            .translate(&full, &console(json!({"url": "/x"})))
            .is_none());
        assert!(EndpointTranslator::default()
            .translate(&full, &console(json!({"http_method": "FETCH", "url": "/x"})))
            .is_none());
    }

    #[test]
    fn test_unknown_usage_argument_is_skipped() {
        let full = full(json!({"name": "get"}));
        let console = console(json!({
            "http_method": "GET",
            "url": "/items/{id}",
            "usage": "get <id> [ghost]",
            "arguments": [{"id": {"type": "int"}}]
        }));
        let endpoint = EndpointTranslator::default().translate(&full, &console).unwrap();
        let parameters = endpoint.operation.parameters.unwrap();
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].name, "id");
    }

    #[test]
    fn test_tags_filter_internal_markers() {
        assert_eq!(
            tags(&["$remoting-binding-module".to_string(), "Plugins".to_string()]),
            vec![DEFAULT_TAG.to_string()]
        );
        assert_eq!(
            tags(&["Plugins".to_string(), "lol-chat".to_string()]),
            vec!["lol-chat".to_string()]
        );
    }

    #[test]
    fn test_deprecation_detection() {
        let (full_fn, console_fn) = get_item();
        assert!(!EndpointTranslator::default()
            .translate(&full_fn, &console_fn)
            .unwrap()
            .operation
            .deprecated);

        let flagged = full(json!({"name": "old", "deprecated": true}));
        assert!(EndpointTranslator::default()
            .translate(&flagged, &console_fn)
            .unwrap()
            .operation
            .deprecated);

        let mentioned = full(json!({"name": "old", "help": "DEPRECATED: use v2"}));
        let endpoint = EndpointTranslator::default().translate(&mentioned, &console_fn).unwrap();
        assert!(endpoint.operation.deprecated);
        assert_eq!(endpoint.operation.description.as_deref(), Some("DEPRECATED: use v2"));
    }

    #[test]
    fn test_description_joins_help() {
        let full_fn = full(json!({"name": "f", "description": "Short", "help": "Longer help"}));
        assert_eq!(
            describe(&full_fn, &ConsoleFunction::default()).as_deref(),
            Some("Short\n\nLonger help")
        );
        let same = full(json!({"name": "f", "description": "Same", "help": "Same"}));
        assert_eq!(describe(&same, &ConsoleFunction::default()).as_deref(), Some("Same"));
    }

    #[test]
    fn test_return_shapes() {
        assert_eq!(return_descriptor(None), None);
        assert_eq!(return_descriptor(Some(&json!(null))), None);
        assert_eq!(
            return_descriptor(Some(&json!({"LolSummoner": {"fields": []}}))),
            Some(TypeDescriptor::Reference("LolSummoner".to_string()))
        );
        assert_eq!(
            return_descriptor(Some(&json!("vector of string"))),
            Some(TypeDescriptor::Array(Box::new(TypeDescriptor::Primitive("string".to_string()))))
        );
    }

    #[test]
    fn test_returns_wrapper_uses_overrides() {
        let translator = EndpointTranslator::new(
            TypeTranslator::new([("LolSummoner", "Summoner")].into_iter().collect()),
            ResponsePolicy::default(),
        );
        let (full_fn, mut console_fn) = get_item();
        console_fn.returns = Some(json!({"LolSummoner": {}}));
        let endpoint = translator.translate(&full_fn, &console_fn).unwrap();
        assert_eq!(
            to_json(&endpoint.operation.responses["2XX"]),
            json!({
                "description": "Success",
                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Summoner"}}}
            })
        );
    }
}
