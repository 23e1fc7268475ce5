//! Generates OpenAPI 3.0 documents from a local service's self-describing `/help` endpoint.
//!
//! The service describes its own callable surface (types, functions, events) in a
//! console-oriented JSON format. This library transcodes that description into
//! `components.schemas` and `paths`.
//!
//! # Architecture
//!
//! 1. [`client`] - Fetches the introspection payloads over authenticated HTTPS
//! 2. [`help`] - Models of the payloads and the by-name join of the two function views
//! 3. [`type_descriptor`] - Classifies raw type descriptors into a closed set of shapes
//! 4. [`schema_generator`] - Translates type descriptors into OpenAPI schemas
//! 5. [`usage_parser`] - Derives parameter placement from usage strings
//! 6. [`endpoint`] - Translates one function into one operation
//! 7. [`openapi_builder`] - Groups operations into paths and assembles the document
//! 8. [`serializer`] - Serializes the document to JSON or YAML
//!
//! # Example Usage
//!
//! ```no_run
//! use help_openapi::{
//!     config::{NameOverrides, ResponsePolicy},
//!     endpoint::EndpointTranslator,
//!     help::{ConsoleHelp, FullHelp},
//!     openapi_builder::OpenApiBuilder,
//!     schema_generator::{SchemaGenerator, TypeTranslator},
//!     serializer::serialize_json,
//! };
//!
//! # fn load() -> (ConsoleHelp, FullHelp) { unimplemented!() }
//! let (console, full) = load();
//! let translator = TypeTranslator::new(NameOverrides::new());
//!
//! let mut schema_gen = SchemaGenerator::new(translator.clone());
//! schema_gen.add_types(&console.types);
//!
//! let mut builder = OpenApiBuilder::new(EndpointTranslator::new(translator, ResponsePolicy::default()));
//! builder.add_functions(&console, &full);
//!
//! let document = builder.build(schema_gen.into_schemas());
//! println!("{}", serialize_json(&document).unwrap());
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod help;
pub mod openapi_builder;
pub mod schema_generator;
pub mod serializer;
pub mod type_descriptor;
pub mod usage_parser;
