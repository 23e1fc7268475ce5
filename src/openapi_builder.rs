use crate::endpoint::{Endpoint, EndpointTranslator};
use crate::help::{join_functions, AppInfo, ConsoleHelp, FullHelp};
use crate::schema_generator::Schema;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    servers: Vec<Server>,
    /// Paths collection (URL template -> PathItem)
    paths: IndexMap<String, PathItem>,
    endpoints: EndpointTranslator,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

/// HTTP methods an OpenAPI path item can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Parses a method name case-insensitively
    pub fn parse(method: &str) -> Option<Self> {
        match method.trim().to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "put" => Some(HttpMethod::Put),
            "post" => Some(HttpMethod::Post),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "patch" => Some(HttpMethod::Patch),
            "trace" => Some(HttpMethod::Trace),
            _ => None,
        }
    }

    /// Lowercase name, as used for path item keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Trace => &mut self.trace,
        }
    }

    /// Stores an operation, returning the one it replaced
    pub fn set(&mut self, method: HttpMethod, operation: Operation) -> Option<Operation> {
        self.slot(method).replace(operation)
    }

    pub fn get_operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Operation ID, the service's function name
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    /// Parameters (path, query)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    pub responses: IndexMap<String, Response>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter location (path, query)
    #[serde(rename = "in")]
    pub location: String,
    /// Parameter name
    pub name: String,
    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Parameter schema
    pub schema: Schema,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request body description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the request body is required
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Content types and their schemas
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: Schema,
}

/// OpenAPI Response object, inline or a reference to a shared response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Response description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Response content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

impl Response {
    pub fn reference(target: &str) -> Self {
        Response {
            reference: Some(target.to_string()),
            ..Default::default()
        }
    }

    pub fn described(description: &str) -> Self {
        Response {
            description: Some(description.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    pub scheme: String,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Components {
    #[serde(rename = "securitySchemes")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
    /// Shared responses referenced by every operation
    pub responses: IndexMap<String, Response>,
    /// Schema definitions
    pub schemas: IndexMap<String, Schema>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    pub servers: Vec<Server>,
    /// API paths
    pub paths: IndexMap<String, PathItem>,
    pub components: Components,
    pub security: Vec<IndexMap<String, Vec<String>>>,
}

const BASIC_AUTH: &str = "basicAuth";

fn is_false(value: &bool) -> bool {
    !*value
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new(endpoints: EndpointTranslator) -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Local Service API".to_string(),
                version: "0.0.0".to_string(),
                description: None,
            },
            servers: Vec::new(),
            paths: IndexMap::new(),
            endpoints,
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Derive the info block from the service's app-info payload
    pub fn with_app_info(self, app_info: &AppInfo) -> Self {
        let title = format!("{} API", app_info.name.as_deref().unwrap_or("Local Service"));
        let version = app_info.version.clone().unwrap_or_else(|| "0.0.0".to_string());
        let description = app_info
            .sdk_version
            .as_ref()
            .map(|sdk| format!("Created with SDK - Version {}", sdk));
        self.with_info(title, version, description)
    }

    pub fn with_server(mut self, url: impl Into<String>) -> Self {
        self.servers.push(Server { url: url.into() });
        self
    }

    /// Translate every function of the full catalog that has a console counterpart.
    /// Returns the number of operations added.
    pub fn add_functions(&mut self, console: &ConsoleHelp, full: &FullHelp) -> usize {
        let mut added = 0;
        for function in join_functions(full, console) {
            let Some(console_fn) = function.console else {
                warn!("No console entry found for {}, skipping it", function.name);
                continue;
            };
            if let Some(endpoint) = self.endpoints.translate(function.full, console_fn) {
                self.add_endpoint(endpoint);
                added += 1;
            }
        }
        info!("Translated {} of {} functions", added, full.functions.len());
        added
    }

    /// Add an operation, grouping by URL template then method
    pub fn add_endpoint(&mut self, endpoint: Endpoint) {
        debug!("Adding endpoint: {} {}", endpoint.method, endpoint.path);
        let path_item = self.paths.entry(endpoint.path.clone()).or_default();
        if let Some(previous) = path_item.set(endpoint.method, endpoint.operation) {
            warn!(
                "{} {} was already defined by {}, replacing it",
                endpoint.method,
                endpoint.path,
                previous.operation_id.as_deref().unwrap_or("<unnamed>")
            );
        }
    }

    pub fn paths(&self) -> &IndexMap<String, PathItem> {
        &self.paths
    }

    /// Build the final OpenAPI document
    pub fn build(self, schemas: IndexMap<String, Schema>) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let mut security_schemes = IndexMap::new();
        security_schemes.insert(
            BASIC_AUTH.to_string(),
            SecurityScheme {
                scheme_type: "http".to_string(),
                scheme: "basic".to_string(),
            },
        );

        let mut responses = IndexMap::new();
        responses.insert(
            "UnauthorizedError".to_string(),
            Response::described("Missing authentication credentials"),
        );
        if self.endpoints.policy().include_forbidden_response {
            responses.insert(
                "ForbiddenError".to_string(),
                Response::described("Wrong authentication credentials"),
            );
        }

        let mut requirement = IndexMap::new();
        requirement.insert(BASIC_AUTH.to_string(), Vec::new());

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info,
            servers: self.servers,
            paths: self.paths,
            components: Components {
                security_schemes,
                responses,
                schemas,
            },
            security: vec![requirement],
        }
    }
}

/// Builds the `paths` map from both help payloads.
pub fn build_paths(
    console: &ConsoleHelp,
    full: &FullHelp,
    endpoints: EndpointTranslator,
) -> IndexMap<String, PathItem> {
    let mut builder = OpenApiBuilder::new(endpoints);
    builder.add_functions(console, full);
    builder.paths
}
