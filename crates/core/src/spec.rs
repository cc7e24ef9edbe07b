//! OpenAPI document structs for serde (de)serialization.
//!
//! This is the subset of OpenAPI 3.x the compiler reads. Maps are ordered so a
//! merged document serializes the same way every time, and every node keeps
//! the keys it does not model in a flattened `extensions` bag so nothing is
//! lost between reading and writing a document.
//!
//! Flattening buffers a subtree, which turns unquoted YAML response codes
//! (`200:`) into integers. Response maps are therefore read through
//! [`status_codes`], which accepts both forms.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ir::HttpMethod;

/// Unknown keys of a node, kept so `x-` configuration can be read from them
/// and so they survive a merge.
pub type Extensions = BTreeMap<String, Value>;

/// A named security requirement: scheme name -> ordered argument list.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// Root OpenAPI document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// OpenAPI version string.
    #[serde(default, deserialize_with = "scalar_string")]
    pub openapi: String,
    /// Free-form `info` object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    /// Document-level tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Default security for operations that declare none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Path templates and their operations.
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    /// Reusable components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Other top-level keys (`servers`, `externalDocs`, `x-` keys).
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Reusable components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Named schemas, the source of models.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Schema>,
    /// Parameters reachable through `#/components/parameters/`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,
    /// Responses reachable through `#/components/responses/`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, Response>,
    /// Request bodies reachable through `#/components/requestBodies/`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub request_bodies: BTreeMap<String, RequestBody>,
    /// Security scheme definitions, kept opaque.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, Value>,
    /// Other component tables (`headers`, `examples`, `links`).
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Document-level tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Tag description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Other keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A `$ref` to a reusable component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Target of the reference, e.g. `#/components/parameters/Limit`.
    #[serde(rename = "$ref")]
    pub ref_path: String,
    /// Keys allowed beside `$ref` (`summary`, `description`).
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Either a `$ref` or an inline definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// Reference to a component.
    Ref(Reference),
    /// Inline definition.
    Item(T),
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathItem {
    /// Short summary shared by the operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Long description shared by the operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `GET` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// `PUT` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// `POST` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// `DELETE` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// `OPTIONS` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// `HEAD` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// `PATCH` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// `TRACE` operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<RefOr<Parameter>>,
    /// Other keys (`servers`, `x-` keys).
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl PathItem {
    /// Declared operations, in a fixed method order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, self.get.as_ref()),
            (HttpMethod::Put, self.put.as_ref()),
            (HttpMethod::Post, self.post.as_ref()),
            (HttpMethod::Delete, self.delete.as_ref()),
            (HttpMethod::Options, self.options.as_ref()),
            (HttpMethod::Head, self.head.as_ref()),
            (HttpMethod::Patch, self.patch.as_ref()),
            (HttpMethod::Trace, self.trace.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Source of the handler name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tag names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Operation-level parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<RefOr<Parameter>>,
    /// Request body, inline or referenced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RefOr<RequestBody>>,
    /// Responses keyed by status code or `default`.
    #[serde(default, deserialize_with = "status_codes")]
    pub responses: BTreeMap<String, RefOr<Response>>,
    /// Security requirements; `Some(vec![])` opts out of the document default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Other keys (`deprecated`, `callbacks`, `x-` keys).
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Path segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
    /// Request body (Swagger 2 style).
    Body,
}

impl ParameterLocation {
    /// The location as written in a document.
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
            ParameterLocation::Body => "body",
        }
    }
}

/// A parameter (path, query, header, cookie or body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Where the parameter is read from.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Whether the parameter must be present.
    #[serde(default)]
    pub required: bool,
    /// Parameter description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameter type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Other keys, including `x-retrieval-name`.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A request body definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Body description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the body must be present.
    #[serde(default)]
    pub required: bool,
    /// Body schemas by media type.
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
    /// Other keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A response definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Response description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Response schemas by media type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
    /// Other keys (`headers`, `links`).
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaType {
    /// Content schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Other keys (`example`, `encoding`).
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The structural type(s) of the schema.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    /// Reference to another schema.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    /// Format hint (e.g., int32, double, date-time).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Schema description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Properties for object types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,

    /// Required property names for object types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Item schema for array types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Additional properties for object types (map types).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    /// Other keys, including the `x-go-*` configuration.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Schema type can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

impl SchemaType {
    /// The declared structural types, in declaration order.
    pub fn types(&self) -> Vec<&str> {
        match self {
            SchemaType::Single(t) => vec![t.as_str()],
            SchemaType::Multiple(types) => types.iter().map(String::as_str).collect(),
        }
    }
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `additionalProperties: true`
    Bool(bool),
    /// `additionalProperties: { ... }`
    Schema(Box<Schema>),
}

impl Schema {
    /// Declared structural types; empty when the node has no `type`.
    pub fn types(&self) -> Vec<&str> {
        match &self.schema_type {
            Some(schema_type) => schema_type.types(),
            None => Vec::new(),
        }
    }
}

/// A response map key as written: quoted (`'200'`, `default`) or a bare
/// YAML integer (`200`).
#[derive(Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(untagged)]
enum StatusKey {
    Text(String),
    Code(u64),
}

impl StatusKey {
    fn into_string(self) -> String {
        match self {
            StatusKey::Text(text) => text,
            StatusKey::Code(code) => code.to_string(),
        }
    }
}

/// Read a response map whose keys may be integers.
fn status_codes<'de, D>(deserializer: D) -> Result<BTreeMap<String, RefOr<Response>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<StatusKey, RefOr<Response>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, response)| (key.into_string(), response))
        .collect())
}

/// Read a scalar as a string, so `openapi: 3.1` survives flattening.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a version string, found {other}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let doc: Document = serde_yaml::from_str(
            r#"
openapi: 3.0.3
paths:
  /widgets/{id}:
    parameters:
      - name: id
        in: path
        required: true
        schema: { type: string }
    get:
      operationId: getWidget
      responses:
        '200':
          description: OK
    delete:
      operationId: deleteWidget
      responses:
        '204':
          description: Deleted
components:
  schemas:
    Widget:
      type: object
      x-go-field-names: { id: WidgetID }
      properties:
        id: { type: string }
"#,
        )
        .unwrap();

        let item = &doc.paths["/widgets/{id}"];
        assert_eq!(item.parameters.len(), 1);
        assert!(matches!(
            &item.parameters[0],
            RefOr::Item(p) if p.location == ParameterLocation::Path
        ));

        let methods: Vec<_> = item.operations().map(|(m, _)| m).collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Delete]);

        let get = item.get.as_ref().unwrap();
        assert!(get.responses.contains_key("200"));

        let widget = &doc.components.as_ref().unwrap().schemas["Widget"];
        assert_eq!(widget.types(), vec!["object"]);
        assert!(widget.extensions.contains_key("x-go-field-names"));
    }

    #[test]
    fn test_unquoted_status_codes() {
        let doc: Document = serde_yaml::from_str(
            r"
openapi: 3.1
servers: [{ url: 'https://api.example.com' }]
paths:
  /widgets:
    get:
      responses:
        200: { description: OK }
        404: { $ref: '#/components/responses/NotFound' }
        default: { description: Error }
",
        )
        .unwrap();

        assert_eq!(doc.openapi, "3.1");
        assert!(doc.extensions.contains_key("servers"));
        let get = doc.paths["/widgets"].get.as_ref().unwrap();
        let codes: Vec<_> = get.responses.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["200", "404", "default"]);
        assert!(matches!(
            &get.responses["404"],
            RefOr::Ref(r) if r.ref_path == "#/components/responses/NotFound"
        ));
    }

    #[test]
    fn test_parameter_reference() {
        let params: Vec<RefOr<Parameter>> = serde_yaml::from_str(
            r"
- $ref: '#/components/parameters/Limit'
- { name: offset, in: query, schema: { type: integer } }
",
        )
        .unwrap();

        assert!(matches!(&params[0], RefOr::Ref(r) if r.ref_path.ends_with("/Limit")));
        assert!(matches!(&params[1], RefOr::Item(p) if p.name == "offset"));
    }

    #[test]
    fn test_schema_types() {
        let multi: Schema = serde_json::from_str(r#"{"type": ["string", "null"]}"#).unwrap();
        assert_eq!(multi.types(), vec!["string", "null"]);

        let none: Schema = serde_json::from_str("{}").unwrap();
        assert!(none.types().is_empty());
    }

    #[test]
    fn test_additional_properties_variants() {
        let b: Schema =
            serde_json::from_str(r#"{"type": "object", "additionalProperties": true}"#).unwrap();
        assert_eq!(b.additional_properties, Some(AdditionalProperties::Bool(true)));

        let s: Schema = serde_json::from_str(
            r#"{"type": "object", "additionalProperties": {"type": "integer"}}"#,
        )
        .unwrap();
        assert!(matches!(
            s.additional_properties,
            Some(AdditionalProperties::Schema(_))
        ));
    }
}
