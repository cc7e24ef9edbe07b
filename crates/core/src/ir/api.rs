//! API-level IR handed to renderers.
//!
//! This module defines the intermediate representation for a compiled document:
//! - Handler: one per operation, with resolved parameters and responses
//! - Model: one per component schema, plus synthetic query-parameter models
//! - SecurityScheme: deduplicated security argument permutations
//! - Route: routing-table view of a handler
//!
//! Everything is `Serialize` so template engines can consume it as plain data.

use serde::Serialize;

use crate::spec::ParameterLocation;

use super::types::{Import, TypeDescriptor};

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single parameter definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    /// Original name from the document (used to read the value)
    pub name: String,
    /// Identifier used for the argument in generated code
    pub arg_name: String,
    /// Resolved type
    pub ty: TypeDescriptor,
    /// `ty` as spelled in generated code
    pub type_name: String,
    /// Where the parameter appears
    pub location: ParameterLocation,
    /// Whether the parameter is required
    pub required: bool,
    /// Binds the parameter to a wildcard path segment instead of `{name}`
    pub retrieval_name: Option<String>,
    /// Parameter description
    pub description: Option<String>,
}

/// Model field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Exported field name
    pub name: String,
    /// Field type as spelled in generated code
    pub type_name: String,
    /// Original property name (serialization key)
    pub source_key: String,
    /// Listed in the schema's `required`
    pub required: bool,
    /// Slices and maps are already reference-like
    pub no_pointer: bool,
    /// Excluded from serialization
    pub skip_serialization: bool,
    /// Property description
    pub description: Option<String>,
}

/// Data model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Model {
    /// Exported type name
    pub name: String,
    /// Schema description
    pub description: Option<String>,
    /// Fields in generation order
    pub fields: Vec<Field>,
    /// External packages the model's fields need
    pub imports: Vec<Import>,
}

/// A distinct combination of arguments for one security scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgPermutation {
    /// Stable hash of the ordered argument list
    pub hash: String,
    /// Arguments in declaration order
    pub args: Vec<String>,
}

/// Security scheme discovered across all operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityScheme {
    /// Name as declared in the document
    pub name: String,
    /// Exported identifier for the scheme
    pub type_name: String,
    /// Argument identifier for the scheme
    pub arg_name: String,
    /// Number of arguments every non-empty use of the scheme passes
    pub arity: usize,
    /// Sorted once the catalog is finished; routes refer to them by index
    pub permutations: Vec<ArgPermutation>,
}

/// Security used by a handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerSecurity {
    /// Scheme name
    pub scheme: String,
    /// Literal argument list used at this call site
    pub args: Vec<String>,
    /// Index into the scheme's permutations (None when `args` is empty)
    pub permutation: Option<usize>,
}

/// A declared non-success response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Status code as declared (`404`, `4XX`, `default`)
    pub status: String,
    /// Response description
    pub description: Option<String>,
    /// JSON body type, if any
    pub type_name: Option<String>,
}

/// Normalized API operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Handler {
    /// Exported identifier (e.g., "ListWidgets")
    pub name: String,
    /// URL path (e.g., "/widgets/{widget_id}")
    pub path: String,
    /// Formatting expression that rebuilds `path` from the path arguments
    pub parameterized_path: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Operation summary
    pub summary: Option<String>,

    /// First declared 2xx status, 200 when none is declared
    pub success_status: u16,
    /// Media type of the success body
    pub success_content_type: Option<String>,
    /// Success body type as spelled in generated code
    pub response_type: Option<String>,
    /// Success body is not JSON and is streamed back as a file
    pub file_download: bool,
    /// Non-success responses in status order
    pub error_responses: Vec<ErrorResponse>,

    /// Parameters: path in template order, then query, header, body
    pub params: Vec<Param>,
    /// Synthetic model holding the query parameters (if any)
    pub query_params_type: Option<String>,
    /// JSON request body type
    pub request_body_type: Option<String>,
    /// Whether the request body must be present
    pub request_body_required: bool,

    /// Security requirement, if any applies
    pub security: Option<HandlerSecurity>,
}

/// Routing-table view of a handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// URL path template
    pub path: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Handler name
    pub handler: String,
    /// Security scheme name
    pub security: Option<String>,
    /// Index into the scheme's permutations
    pub permutation: Option<usize>,
}

/// Compiled API specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiIR {
    /// Package name for the generated code
    pub package_name: String,
    /// Import path of the models package when models live elsewhere
    pub models_package: Option<String>,
    /// Handlers sorted by name
    pub handlers: Vec<Handler>,
    /// Models sorted by name
    pub models: Vec<Model>,
    /// Security schemes sorted by name
    pub security: Vec<SecurityScheme>,
    /// Routes sorted by path, then method
    pub routes: Vec<Route>,
    /// Union of every import the generated code needs
    pub imports: Vec<Import>,
}
