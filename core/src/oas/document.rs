#![deny(missing_docs)]

//! # OpenAPI Document Model
//!
//! Serde structures for the subset of OpenAPI 3.0 that the route compiler
//! emits: `info`, `servers`, `paths`, `components` and operation security.
//! Empty collections and unset options are left out of the serialized form.

use derive_more::Display;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OpenAPI version written into new documents.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Prefix of component schema references.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Media type of every emitted body.
pub const JSON_MEDIA_TYPE: &str = "application/json";

fn is_false(value: &bool) -> bool {
    !*value
}

/// The root document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// OpenAPI version.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Server list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Path items keyed by `{name}` path templates.
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    /// Reusable definitions.
    #[serde(default, skip_serializing_if = "Components::is_empty")]
    pub components: Components,
    /// Tag declarations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl Document {
    /// An empty document.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: title.into(),
                version: version.into(),
                description: None,
            },
            servers: Vec::new(),
            paths: BTreeMap::new(),
            components: Components::default(),
            tags: Vec::new(),
        }
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A server the API is reachable at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
    /// Server description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A tag grouping operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Tag description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The operations available on a single path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

/// A security requirement: scheme name to required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// A single API operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Path and query parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    /// Security requirements, any of which satisfies the operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

/// Where a parameter is bound from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// A `{name}` segment of the path.
    #[display("path")]
    Path,
    /// A query string key.
    #[display("query")]
    Query,
}

/// A path or query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Binding location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Parameter schema.
    pub schema: SchemaRef,
}

/// A request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Content keyed by media type.
    pub content: BTreeMap<String, MediaType>,
}

/// A response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Description.
    pub description: String,
    /// Content keyed by media type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

/// A media type entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Content schema.
    pub schema: SchemaRef,
}

/// Content map with a single JSON entry.
pub fn json_content(schema: impl Into<SchemaRef>) -> BTreeMap<String, MediaType> {
    BTreeMap::from([(
        JSON_MEDIA_TYPE.to_string(),
        MediaType {
            schema: schema.into(),
        },
    )])
}

/// Reusable definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Named schemas.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Schema>,
    /// Named security schemes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

impl Components {
    /// Returns true when nothing is defined.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.security_schemes.is_empty()
    }
}

/// An authentication scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    /// Scheme kind (`http`, `apiKey`, ...).
    #[serde(rename = "type")]
    pub scheme_type: String,
    /// HTTP authorization scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Bearer token format hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
}

impl SecurityScheme {
    /// HTTP bearer authentication carrying a JWT.
    pub fn jwt_bearer() -> Self {
        Self {
            scheme_type: "http".to_string(),
            scheme: Some("bearer".to_string()),
            bearer_format: Some("JWT".to_string()),
        }
    }
}

/// A schema definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// JSON type; unset for undocumented shapes.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Canonical name, set on object schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Declared type name of the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    /// Whether `null` is accepted.
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    /// Object properties in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaRef>>,
    /// Names of properties that must be present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Array element schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaRef>>,
    /// Map value schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaRef>>,
    /// Schemas that must all match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaRef>,
}

impl Schema {
    /// Returns true when the schema carries no information at all.
    pub fn is_empty(&self) -> bool {
        *self == Schema::default()
    }
}

/// A `$ref` pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Reference target.
    #[serde(rename = "$ref")]
    pub location: String,
}

/// Either a reference or an inline schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    /// Reference into `components.schemas`.
    Ref(Reference),
    /// Inline definition.
    Inline(Box<Schema>),
}

impl SchemaRef {
    /// A reference to the named component schema.
    pub fn component(name: &str) -> Self {
        SchemaRef::Ref(Reference {
            location: format!("{SCHEMA_REF_PREFIX}{name}"),
        })
    }

    /// Name of the referenced component schema, if this is a component reference.
    pub fn component_name(&self) -> Option<&str> {
        match self {
            SchemaRef::Ref(reference) => reference.location.strip_prefix(SCHEMA_REF_PREFIX),
            SchemaRef::Inline(_) => None,
        }
    }

    /// The inline schema, if any.
    pub fn as_inline(&self) -> Option<&Schema> {
        match self {
            SchemaRef::Inline(schema) => Some(schema),
            SchemaRef::Ref(_) => None,
        }
    }
}

impl From<Schema> for SchemaRef {
    fn from(schema: Schema) -> Self {
        SchemaRef::Inline(Box::new(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_shape() {
        let doc = Document::new("Endpoint Docs", "v1.0.1");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            json!({
                "openapi": "3.0.3",
                "info": {"title": "Endpoint Docs", "version": "v1.0.1"},
                "paths": {}
            })
        );
    }

    #[test]
    fn test_schema_ref_forms() {
        let reference = SchemaRef::component("pkg_Item");
        assert_eq!(
            serde_json::to_value(&reference).unwrap(),
            json!({"$ref": "#/components/schemas/pkg_Item"})
        );
        assert_eq!(reference.component_name(), Some("pkg_Item"));

        let inline = SchemaRef::from(Schema {
            schema_type: Some("string".into()),
            ..Schema::default()
        });
        assert_eq!(serde_json::to_value(&inline).unwrap(), json!({"type": "string"}));
        assert!(inline.component_name().is_none());
    }

    #[test]
    fn test_schema_ref_deserializes_reference_first() {
        let parsed: SchemaRef =
            serde_json::from_value(json!({"$ref": "#/components/schemas/A"})).unwrap();
        assert_eq!(parsed.component_name(), Some("A"));

        let parsed: SchemaRef = serde_json::from_value(json!({"type": "number"})).unwrap();
        assert_eq!(
            parsed.as_inline().and_then(|s| s.schema_type.as_deref()),
            Some("number")
        );
    }

    #[test]
    fn test_all_of_and_components_emptiness() {
        let composed = Schema {
            all_of: vec![SchemaRef::component("pkg_Item")],
            ..Schema::default()
        };
        assert_eq!(
            serde_json::to_value(&composed).unwrap(),
            json!({"allOf": [{"$ref": "#/components/schemas/pkg_Item"}]})
        );
        assert!(!composed.is_empty());

        let mut components = Components::default();
        assert!(components.is_empty());
        components.schemas.insert("pkg_Item".into(), composed);
        assert!(!components.is_empty());
        assert_eq!(
            serde_json::to_value(&components).unwrap()
                .as_object()
                .map(|o| o.keys().cloned().collect::<Vec<_>>()),
            Some(vec!["schemas".to_string()])
        );
    }

    #[test]
    fn test_parameter_location_tag() {
        let param = Parameter {
            name: "id".into(),
            location: ParameterIn::Path,
            description: None,
            required: true,
            schema: Schema::default().into(),
        };
        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            json!({"name": "id", "in": "path", "required": true, "schema": {}})
        );
    }
}
