use log::{debug, warn};
use serde_json::Value;

/// Textual prefix marking an array type, e.g. `vector of string`.
pub const ARRAY_PREFIX: &str = "vector of ";
/// Textual prefix marking a map type, e.g. `map of int32`.
pub const MAP_PREFIX: &str = "map of ";

/// The closed vocabulary of primitive type names and the OpenAPI `(type, format)`
/// pair each one lowers to.
pub const PRIMITIVES: &[(&str, &str, Option<&str>)] = &[
    ("string", "string", None),
    ("int8", "number", Some("int32")),
    ("uint8", "number", Some("int32")),
    ("int16", "number", Some("int32")),
    ("uint16", "number", Some("int32")),
    ("int32", "number", Some("int32")),
    ("uint32", "number", Some("int32")),
    ("int64", "number", Some("int64")),
    ("uint64", "number", Some("int64")),
    ("int", "integer", None),
    ("float", "number", Some("float")),
    ("double", "number", Some("double")),
    ("bool", "boolean", None),
    ("null", "null", None),
];

/// Looks up the OpenAPI `(type, format)` pair for a primitive name.
pub fn primitive_openapi(name: &str) -> Option<(&'static str, Option<&'static str>)> {
    PRIMITIVES
        .iter()
        .find(|(primitive, _, _)| *primitive == name)
        .map(|(_, schema_type, format)| (*schema_type, *format))
}

/// Returns true when `name` belongs to the primitive vocabulary.
pub fn is_primitive(name: &str) -> bool {
    primitive_openapi(name).is_some()
}

/// Returns true for `vector of ...` and `map of ...` spellings.
///
/// The check is done on the trimmed prefix so that a truncated `"vector of"`
/// (no element type at all) is still recognised as container syntax.
pub fn is_container_syntax(name: &str) -> bool {
    name.starts_with(ARRAY_PREFIX.trim_end()) || name.starts_with(MAP_PREFIX.trim_end())
}

/// A classified type descriptor from the introspection payload.
///
/// The raw payload is untyped JSON; [`TypeDescriptor::classify`] is the only place
/// that inspects its shape, everything downstream matches on these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// A name from [`PRIMITIVES`]
    Primitive(String),
    /// `vector of <element>`
    Array(Box<TypeDescriptor>),
    /// `map of <value>`
    Map(Box<TypeDescriptor>),
    /// An enumeration with its values in declaration order
    Enum(Vec<EnumValue>),
    /// A structure with its fields in declaration order
    Object(Vec<FieldDef>),
    /// A reference to another type by name. The name is raw: overrides and
    /// the degenerate-name policy are applied by the translator.
    Reference(String),
}

/// One `{name, value}` pair of an enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
}

/// One field of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Free-form field documentation
    pub description: Option<String>,
    /// Byte offset reported by the service
    pub offset: Option<i64>,
    /// Whether the field may be absent
    pub optional: bool,
    /// The field's own type
    pub type_descriptor: TypeDescriptor,
}

impl TypeDescriptor {
    /// Classifies a raw JSON type descriptor.
    ///
    /// Precedence: `values` (enum), `fields` (object), primitive name, `vector of`,
    /// `map of`, and finally a named reference taken from the first key of an
    /// object or from a bare string.
    pub fn classify(value: &Value) -> TypeDescriptor {
        match value {
            Value::Object(map) => {
                if let Some(values) = map.get("values") {
                    return TypeDescriptor::Enum(parse_enum_values(values));
                }
                if let Some(fields) = map.get("fields") {
                    return TypeDescriptor::Object(parse_fields(fields));
                }
                let name = map.keys().next().cloned().unwrap_or_default();
                TypeDescriptor::Reference(name)
            }
            Value::String(name) => Self::classify_str(name),
            other => {
                debug!("Type descriptor is neither a string nor an object: {}", other);
                TypeDescriptor::Reference(String::new())
            }
        }
    }

    /// Classifies a textual type descriptor.
    pub fn classify_str(name: &str) -> TypeDescriptor {
        if is_primitive(name) && !is_container_syntax(name) {
            return TypeDescriptor::Primitive(name.to_string());
        }
        if let Some(element) = strip_container_prefix(name, ARRAY_PREFIX) {
            return TypeDescriptor::Array(Box::new(Self::classify_str(element)));
        }
        if let Some(value) = strip_container_prefix(name, MAP_PREFIX) {
            return TypeDescriptor::Map(Box::new(Self::classify_str(value)));
        }
        TypeDescriptor::Reference(name.to_string())
    }
}

/// Strips a container prefix; a bare `"vector of"` yields an empty element name.
fn strip_container_prefix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    if let Some(rest) = name.strip_prefix(prefix) {
        return Some(rest);
    }
    if name == prefix.trim_end() {
        return Some("");
    }
    None
}

fn parse_enum_values(values: &Value) -> Vec<EnumValue> {
    let Some(entries) = values.as_array() else {
        warn!("Enum values are not a list: {}", values);
        return Vec::new();
    };
    entries.iter().filter_map(parse_enum_value).collect()
}

fn parse_enum_value(entry: &Value) -> Option<EnumValue> {
    let name = entry.get("name").and_then(Value::as_str);
    match name {
        Some(name) => Some(EnumValue {
            name: name.to_string(),
            value: entry.get("value").and_then(Value::as_i64).unwrap_or_default(),
        }),
        None => {
            debug!("Skipping enum value without a name: {}", entry);
            None
        }
    }
}

/// Fields arrive as a list of single-key objects: `[{fieldName: {type, ...}}, ...]`.
fn parse_fields(fields: &Value) -> Vec<FieldDef> {
    let Some(entries) = fields.as_array() else {
        debug!("Object fields are not a list: {}", fields);
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let (name, body) = entry.as_object()?.iter().next()?;
            Some(FieldDef {
                name: name.clone(),
                description: body.get("description").and_then(Value::as_str).map(str::to_string),
                offset: body.get("offset").and_then(Value::as_i64),
                optional: body.get("optional").and_then(Value::as_bool).unwrap_or(false),
                type_descriptor: TypeDescriptor::classify(body.get("type").unwrap_or(&Value::Null)),
            })
        })
        .collect()
}
