use crate::config::NameOverrides;
use crate::type_descriptor::{is_container_syntax, primitive_openapi, FieldDef, TypeDescriptor};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the permissive fallback schema
pub const ANY_TYPE: &str = "AnyType";

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to another schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Value schema for map types
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    /// Enum values for enum types
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(rename = "anyOf", skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,
}

impl Schema {
    pub fn typed(schema_type: &str) -> Self {
        Schema {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    pub fn reference(name: &str) -> Self {
        Schema {
            reference: Some(format!("{}{}", SCHEMA_REF_PREFIX, name)),
            ..Default::default()
        }
    }

    /// The fixed scalar fragment for a primitive name, if it is one.
    pub fn primitive(name: &str) -> Option<Self> {
        primitive_openapi(name).map(|(schema_type, format)| Schema {
            schema_type: Some(schema_type.to_string()),
            format: format.map(str::to_string),
            ..Default::default()
        })
    }

    pub fn array(items: Schema) -> Self {
        Schema {
            items: Some(Box::new(items)),
            ..Schema::typed("array")
        }
    }

    pub fn map(values: Schema) -> Self {
        Schema {
            additional_properties: Some(Box::new(values)),
            ..Schema::typed("object")
        }
    }

    pub fn string_enum(values: Vec<String>) -> Self {
        Schema {
            enum_values: Some(values),
            ..Schema::typed("string")
        }
    }

    pub fn object(properties: IndexMap<String, Schema>) -> Self {
        Schema {
            properties: Some(properties),
            ..Schema::typed("object")
        }
    }

    /// The universal fallback: nullable and accepting any JSON shape.
    pub fn any_type() -> Self {
        Schema {
            nullable: Some(true),
            any_of: Some(vec![
                Schema::typed("object"),
                Schema::typed("string"),
                Schema::typed("number"),
                Schema::typed("boolean"),
                Schema::typed("integer"),
                Schema::array(Schema::default()),
            ]),
            ..Default::default()
        }
    }
}

/// Lowers classified type descriptors into OpenAPI schema fragments.
///
/// Translation is total: malformed or unresolvable input still yields a schema,
/// falling back to a reference to [`ANY_TYPE`].
#[derive(Debug, Clone, Default)]
pub struct TypeTranslator {
    overrides: NameOverrides,
}

impl TypeTranslator {
    pub fn new(overrides: NameOverrides) -> Self {
        Self { overrides }
    }

    /// Classifies and translates a raw JSON type descriptor.
    pub fn translate_value(&self, value: &Value) -> Schema {
        self.translate(&TypeDescriptor::classify(value))
    }

    pub fn translate(&self, descriptor: &TypeDescriptor) -> Schema {
        match descriptor {
            TypeDescriptor::Primitive(name) => {
                Schema::primitive(name).unwrap_or_else(|| self.resolve_reference(name))
            }
            TypeDescriptor::Array(element) => Schema::array(self.translate(element)),
            TypeDescriptor::Map(value) => Schema::map(self.translate(value)),
            TypeDescriptor::Enum(values) => {
                Schema::string_enum(values.iter().map(|v| v.name.clone()).collect())
            }
            TypeDescriptor::Object(fields) => self.translate_object(fields),
            TypeDescriptor::Reference(name) => self.resolve_reference(name),
        }
    }

    /// Field order is kept as declared. Optionality is not expressed here.
    pub fn translate_object(&self, fields: &[FieldDef]) -> Schema {
        let properties = fields
            .iter()
            .map(|field| (field.name.clone(), self.translate(&field.type_descriptor)))
            .collect();
        Schema::object(properties)
    }

    /// Resolves a named reference: override first, then the degenerate-name
    /// policy, then primitives (which are never `$ref`-wrapped).
    fn resolve_reference(&self, raw_name: &str) -> Schema {
        let name = self.overrides.resolve(raw_name);
        if name != raw_name {
            debug!("Type name {} overridden as {}", raw_name, name);
        }

        if let Some(reason) = degenerate_reason(name) {
            warn!("{} ('{}'), using {} instead", reason, name, ANY_TYPE);
            return Schema::reference(ANY_TYPE);
        }

        if let Some(primitive) = Schema::primitive(name) {
            return primitive;
        }

        Schema::reference(name)
    }
}

fn degenerate_reason(name: &str) -> Option<&'static str> {
    if name.trim().is_empty() {
        Some("Type name is empty, most likely a map or array resolve issue")
    } else if is_container_syntax(name) {
        Some("Nested container syntax used as a type name")
    } else if name == "0" {
        Some("Type name is 0, probably a type resolution issue")
    } else if name == "object" {
        Some("Type name is the generic 'object'")
    } else {
        None
    }
}

/// Schema generator - builds `components.schemas` from the introspected type catalog
pub struct SchemaGenerator {
    translator: TypeTranslator,
    schemas: IndexMap<String, Schema>,
}

impl SchemaGenerator {
    /// Create a new SchemaGenerator with a TypeTranslator
    pub fn new(translator: TypeTranslator) -> Self {
        debug!("Initializing SchemaGenerator");
        Self {
            translator,
            schemas: IndexMap::new(),
        }
    }

    /// Translate every entry of a type catalog, keeping catalog order
    pub fn add_types(&mut self, types: &IndexMap<String, Value>) {
        debug!("Generating schemas for {} catalog types", types.len());
        for (name, raw) in types {
            let schema = self.catalog_entry_schema(name, &TypeDescriptor::classify(raw));
            if self.schemas.insert(name.clone(), schema).is_some() {
                warn!("Type {} defined more than once, keeping the last definition", name);
            }
        }
    }

    fn catalog_entry_schema(&self, name: &str, descriptor: &TypeDescriptor) -> Schema {
        match descriptor {
            // An alias at the top level would reference itself or an unknown type
            TypeDescriptor::Reference(target) => {
                debug!("Catalog type {} is a bare reference to '{}', using an open object", name, target);
                Schema::object(IndexMap::new())
            }
            other => self.translator.translate(other),
        }
    }

    /// Get all generated schemas, without the synthetic fallback
    pub fn get_schemas(&self) -> &IndexMap<String, Schema> {
        &self.schemas
    }

    /// Consume the generator, appending the synthetic [`ANY_TYPE`] schema
    pub fn into_schemas(self) -> IndexMap<String, Schema> {
        let mut schemas = self.schemas;
        if schemas.shift_remove(ANY_TYPE).is_some() {
            warn!("Catalog defines its own {}, replacing it with the fallback schema", ANY_TYPE);
        }
        schemas.insert(ANY_TYPE.to_string(), Schema::any_type());
        schemas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_descriptor::PRIMITIVES;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn translator() -> TypeTranslator {
        TypeTranslator::default()
    }

    fn to_json(schema: &Schema) -> Value {
        serde_json::to_value(schema).unwrap()
    }

    #[test]
    fn test_every_primitive_is_scalar() {
        let translator = translator();
        for (name, schema_type, format) in PRIMITIVES {
            let schema = translator.translate_value(&json!(name));
            assert_eq!(schema.schema_type.as_deref(), Some(*schema_type));
            assert_eq!(schema.format.as_deref(), *format);
            assert!(schema.reference.is_none());
        }
    }

    #[test]
    fn test_int_is_plain_integer() {
        assert_eq!(to_json(&translator().translate_value(&json!("int"))), json!({"type": "integer"}));
    }

    #[test]
    fn test_nested_arrays() {
        let schema = translator().translate_value(&json!("vector of vector of uint32"));
        assert_eq!(
            to_json(&schema),
            json!({
                "type": "array",
                "items": {"type": "array", "items": {"type": "number", "format": "int32"}}
            })
        );
    }

    #[test]
    fn test_map_of_reference() {
        let schema = translator().translate_value(&json!("map of LolGameflowSession"));
        assert_eq!(
            to_json(&schema),
            json!({
                "type": "object",
                "additionalProperties": {"$ref": "#/components/schemas/LolGameflowSession"}
            })
        );
    }

    #[test]
    fn test_map_of_vector() {
        let schema = translator().translate_value(&json!("map of vector of string"));
        assert_eq!(
            to_json(&schema),
            json!({
                "type": "object",
                "additionalProperties": {"type": "array", "items": {"type": "string"}}
            })
        );
    }

    #[test]
    fn test_enum_in_declaration_order() {
        let schema = translator().translate_value(&json!({
            "values": [{"name": "RED", "value": 0}, {"name": "BLUE", "value": 1}]
        }));
        assert_eq!(to_json(&schema), json!({"type": "string", "enum": ["RED", "BLUE"]}));
    }

    #[test]
    fn test_degenerate_names_become_any_type() {
        let any = Schema::reference(ANY_TYPE);
        let translator = translator();
        for name in ["", " ", "object", "0", "vector of Foo", "map of Foo"] {
            let schema = translator.translate(&TypeDescriptor::Reference(name.to_string()));
            assert_eq!(schema, any, "name {:?}", name);
        }
        assert_eq!(translator.translate_value(&json!({"0": {}})), any);
        assert_eq!(translator.translate_value(&json!("object")), any);
        assert_eq!(translator.translate_value(&json!(null)), any);
    }

    #[test]
    fn test_empty_array_element_is_any_type() {
        let schema = translator().translate_value(&json!("vector of "));
        assert_eq!(schema, Schema::array(Schema::reference(ANY_TYPE)));
    }

    #[test]
    fn test_override_applies_to_references() {
        let translator = TypeTranslator::new([("Foo", "Bar")].into_iter().collect());
        assert_eq!(
            to_json(&translator.translate_value(&json!({"Foo": {}}))),
            json!({"$ref": "#/components/schemas/Bar"})
        );
        assert_eq!(
            to_json(&translator.translate_value(&json!("vector of Foo"))),
            json!({"type": "array", "items": {"$ref": "#/components/schemas/Bar"}})
        );
    }

    #[test]
    fn test_override_does_not_touch_primitives() {
        let translator = TypeTranslator::new([("string", "Text")].into_iter().collect());
        assert_eq!(to_json(&translator.translate_value(&json!("string"))), json!({"type": "string"}));
    }

    #[test]
    fn test_override_to_degenerate_or_primitive_name() {
        let translator =
            TypeTranslator::new([("Weird", "object"), ("Count", "int64")].into_iter().collect());
        assert_eq!(translator.translate_value(&json!("Weird")), Schema::reference(ANY_TYPE));
        assert_eq!(
            to_json(&translator.translate_value(&json!({"Count": {}}))),
            json!({"type": "number", "format": "int64"})
        );
    }

    #[test]
    fn test_inline_object() {
        let schema = translator().translate_value(&json!({
            "fields": [
                {"name": {"description": "", "offset": 0, "optional": false, "type": "string"}},
                {"friends": {"description": "", "offset": 8, "optional": true, "type": "vector of Friend"}}
            ]
        }));
        assert_eq!(
            to_json(&schema),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "friends": {"type": "array", "items": {"$ref": "#/components/schemas/Friend"}}
                }
            })
        );
    }

    #[test]
    fn test_catalog_with_enum_and_any_type() {
        let types: IndexMap<String, Value> = serde_json::from_value(json!({
            "Color": {"values": [{"name": "RED", "value": 0}, {"name": "BLUE", "value": 1}]}
        }))
        .unwrap();

        let mut generator = SchemaGenerator::new(translator());
        generator.add_types(&types);
        let schemas = generator.into_schemas();

        assert_eq!(to_json(&schemas["Color"]), json!({"type": "string", "enum": ["RED", "BLUE"]}));
        assert_eq!(
            to_json(&schemas[ANY_TYPE]),
            json!({
                "nullable": true,
                "anyOf": [
                    {"type": "object"},
                    {"type": "string"},
                    {"type": "number"},
                    {"type": "boolean"},
                    {"type": "integer"},
                    {"type": "array", "items": {}}
                ]
            })
        );
        let keys: Vec<_> = schemas.keys().cloned().collect();
        assert_eq!(keys, vec!["Color".to_string(), ANY_TYPE.to_string()]);
    }

    #[test]
    fn test_catalog_preserves_order_and_shapes() {
        let types: IndexMap<String, Value> = serde_json::from_value(json!({
            "Zeta": {"fields": [{"id": {"description": "", "offset": 0, "optional": false, "type": "uint64"}}]},
            "Alpha": "vector of string",
            "Mid": "map of int",
            "Alias": {"Other": {}}
        }))
        .unwrap();

        let mut generator = SchemaGenerator::new(translator());
        generator.add_types(&types);
        assert_eq!(generator.get_schemas().len(), 4);
        let schemas = generator.into_schemas();

        let keys: Vec<_> = schemas.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha", "Mid", "Alias", ANY_TYPE]);
        assert_eq!(
            to_json(&schemas["Zeta"]),
            json!({"type": "object", "properties": {"id": {"type": "number", "format": "int64"}}})
        );
        assert_eq!(to_json(&schemas["Alpha"]), json!({"type": "array", "items": {"type": "string"}}));
        assert_eq!(
            to_json(&schemas["Mid"]),
            json!({"type": "object", "additionalProperties": {"type": "integer"}})
        );
        assert_eq!(to_json(&schemas["Alias"]), json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn test_catalog_any_type_is_replaced() {
        let types: IndexMap<String, Value> =
            serde_json::from_value(json!({"AnyType": "string", "Z": "int"})).unwrap();
        let mut generator = SchemaGenerator::new(translator());
        generator.add_types(&types);
        let schemas = generator.into_schemas();
        let keys: Vec<_> = schemas.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Z", ANY_TYPE]);
        assert_eq!(schemas[ANY_TYPE], Schema::any_type());
    }
}
