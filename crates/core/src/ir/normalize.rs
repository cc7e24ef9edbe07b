//! Normalization from a merged document to API IR.
//!
//! This module drives one compilation pass:
//! - Operation normalization (parameters, responses, security)
//! - Component schema to model conversion
//! - Final ordering of handlers, models, security and routes

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{CompileError, Result};
use crate::extensions::{GO_FIELD_NAMES, SchemaExtensions};
use crate::spec::{Document, Operation, ParameterLocation, PathItem, Schema};

use super::api::{
    ApiIR, ErrorResponse, Field, Handler, HandlerSecurity, HttpMethod, Model, Param, Route,
    SecurityScheme,
};
use super::params::{classify, parameterized_path};
use super::resolve::TypeResolver;
use super::security::SecurityCatalog;
use super::types::Import;
use super::utils::{field_order, type_name};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Options for one compilation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Package the generated code lives in
    pub package_name: String,
    /// Import path of a separate models package, if any
    pub models_package: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            package_name: "api".to_string(),
            models_package: None,
        }
    }
}

/// Compile a merged document into API IR.
pub fn compile(doc: &Document, options: &CompileOptions) -> Result<ApiIR> {
    let resolver = TypeResolver::new(doc);
    let mut catalog = SecurityCatalog::default();
    let mut handlers = Vec::new();
    let mut models = Vec::new();
    let mut imports = BTreeSet::new();
    let mut handler_sites: HashMap<String, String> = HashMap::new();

    // BTreeMap keeps paths sorted, so errors surface in a fixed order
    for (path, item) in &doc.paths {
        for (method, op) in item.operations() {
            let handler = normalize_operation(
                &resolver,
                &mut catalog,
                doc,
                path,
                method,
                item,
                op,
                &mut imports,
            )?;

            let site = format!("{method} {path}");
            if let Some(first) = handler_sites.insert(handler.name.clone(), site.clone()) {
                return Err(CompileError::DuplicateOperation {
                    name: handler.name,
                    first,
                    second: site,
                });
            }

            if let Some(model) = query_params_model(&handler) {
                models.push(model);
            }
            handlers.push(handler);
        }
    }

    if let Some(components) = &doc.components {
        for (name, schema) in &components.schemas {
            let model = normalize_model(&resolver, name, schema)?;
            imports.extend(model.imports.iter().cloned());
            models.push(model);
        }
    }

    let security = catalog.finish();
    assign_permutations(&mut handlers, &security)?;

    let mut model_names = HashSet::new();
    for model in &models {
        if !model_names.insert(model.name.as_str()) {
            return Err(CompileError::DuplicateSchema(model.name.clone()));
        }
    }

    handlers.sort_by(|a, b| a.name.cmp(&b.name));
    models.sort_by(|a, b| a.name.cmp(&b.name));

    let mut routes: Vec<Route> = handlers.iter().map(route_for).collect();
    routes.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| a.method.as_str().cmp(b.method.as_str()))
    });

    debug!(
        handlers = handlers.len(),
        models = models.len(),
        security = security.len(),
        "Compiled document."
    );

    Ok(ApiIR {
        package_name: options.package_name.clone(),
        models_package: options.models_package.clone(),
        handlers,
        models,
        security,
        routes,
        imports: imports.into_iter().collect(),
    })
}

/// Normalize a single operation into a handler
#[allow(clippy::too_many_arguments)]
fn normalize_operation(
    resolver: &TypeResolver<'_>,
    catalog: &mut SecurityCatalog,
    doc: &Document,
    path: &str,
    method: HttpMethod,
    item: &PathItem,
    op: &Operation,
    imports: &mut BTreeSet<Import>,
) -> Result<Handler> {
    let name = handler_name(method, path, op);
    trace!(%method, path, handler = %name, "Normalizing operation.");

    let params = classify(resolver, method, path, &item.parameters, &op.parameters)?;
    for p in &params {
        imports.extend(p.ty.imports());
    }
    let template = parameterized_path(path, &params)?;

    // Operation-level security replaces the document default, `[]` included
    let requirements = op.security.as_deref().or(doc.security.as_deref());
    let security = catalog
        .observe(method, path, requirements)?
        .map(|r| HandlerSecurity {
            scheme: r.scheme,
            args: r.args,
            permutation: None,
        });

    let mut success_status = 200;
    let mut success_content_type = None;
    let mut response_type = None;
    let mut file_download = false;
    let mut error_responses = Vec::new();
    let mut found_success = false;

    for (code, entry) in &op.responses {
        let context = format!("{name} response {code}");
        let response = resolver.response(entry, &context)?;
        let json_type = match response
            .content
            .get(JSON_CONTENT_TYPE)
            .and_then(|m| m.schema.as_ref())
        {
            Some(schema) => {
                let ty = resolver.resolve(schema, &context)?;
                imports.extend(ty.imports());
                Some(ty.type_name())
            }
            None => None,
        };

        if !code.starts_with('2') {
            error_responses.push(ErrorResponse {
                status: code.clone(),
                description: response.description.clone(),
                type_name: json_type,
            });
            continue;
        }
        if found_success {
            continue;
        }
        found_success = true;

        success_status = code.parse().unwrap_or(200);
        success_content_type = if response.content.contains_key(JSON_CONTENT_TYPE) {
            Some(JSON_CONTENT_TYPE.to_string())
        } else {
            response.content.keys().next().cloned()
        };
        file_download = success_content_type
            .as_deref()
            .is_some_and(|ct| ct != JSON_CONTENT_TYPE);
        response_type = json_type;
    }

    let mut request_body_type = None;
    let mut request_body_required = false;
    if let Some(entry) = &op.request_body {
        let context = format!("{name} request body");
        let body = resolver.request_body(entry, &context)?;
        if let Some(schema) = body
            .content
            .get(JSON_CONTENT_TYPE)
            .and_then(|m| m.schema.as_ref())
        {
            let ty = resolver.resolve(schema, &context)?;
            imports.extend(ty.imports());
            request_body_type = Some(ty.type_name());
            request_body_required = body.required;
        }
    }

    let query_params_type = params
        .iter()
        .any(|p| p.location == ParameterLocation::Query)
        .then(|| format!("{name}QueryParams"));

    Ok(Handler {
        name,
        path: path.to_string(),
        parameterized_path: template.expression(),
        method,
        summary: op.summary.clone(),
        success_status,
        success_content_type,
        response_type,
        file_download,
        error_responses,
        params,
        query_params_type,
        request_body_type,
        request_body_required,
        security,
    })
}

/// Exported handler name: the operation id, or method plus literal path segments.
fn handler_name(method: HttpMethod, path: &str, op: &Operation) -> String {
    if let Some(id) = op.operation_id.as_deref().filter(|id| !id.is_empty()) {
        return type_name(id);
    }

    let mut words = vec![method.as_str().to_ascii_lowercase()];
    words.extend(
        path.split('/')
            .filter(|s| !s.is_empty() && *s != "*" && !s.starts_with('{'))
            .map(str::to_string),
    );
    type_name(&words.join(" "))
}

/// Synthetic model holding a handler's query parameters
fn query_params_model(handler: &Handler) -> Option<Model> {
    let model_name = handler.query_params_type.clone()?;
    let query: Vec<&Param> = handler
        .params
        .iter()
        .filter(|p| p.location == ParameterLocation::Query)
        .collect();

    let mut fields: Vec<Field> = query
        .iter()
        .map(|p| Field {
            name: type_name(&p.name),
            type_name: p.type_name.clone(),
            source_key: p.name.clone(),
            required: p.required,
            no_pointer: p.ty.is_reference_like(),
            skip_serialization: false,
            description: p.description.clone(),
        })
        .collect();
    fields.sort_by(|a, b| field_order(&a.name, &b.name));

    let imports: BTreeSet<Import> = query.iter().flat_map(|p| p.ty.imports()).collect();

    Some(Model {
        name: model_name,
        description: None,
        fields,
        imports: imports.into_iter().collect(),
    })
}

/// Convert a component schema to a model
fn normalize_model(resolver: &TypeResolver<'_>, name: &str, schema: &Schema) -> Result<Model> {
    let model_name = type_name(name);

    let types = schema.types();
    let [structural] = types.as_slice() else {
        return Err(CompileError::AmbiguousSchemaType {
            context: model_name,
            found: types.iter().map(|t| (*t).to_string()).collect(),
        });
    };
    if *structural != "object" {
        return Err(CompileError::UnsupportedSchemaShape {
            context: model_name,
            reason: format!("top-level schemas must be objects, found type {structural:?}"),
        });
    }

    let config = SchemaExtensions::parse(&schema.extensions, &model_name)?;
    let empty = BTreeMap::new();
    let properties = schema.properties.as_ref().unwrap_or(&empty);

    if let Some(unknown) = config
        .field_names
        .keys()
        .find(|k| !properties.contains_key(*k))
    {
        return Err(CompileError::MalformedExtension {
            context: model_name,
            key: GO_FIELD_NAMES.to_string(),
            reason: format!("property {unknown:?} does not exist"),
        });
    }

    let required: HashSet<&str> = schema.required.iter().map(String::as_str).collect();
    let mut fields = Vec::with_capacity(properties.len());
    let mut imports = BTreeSet::new();

    for (key, prop) in properties {
        let context = format!("{model_name}.{key}");
        let prop_config = SchemaExtensions::parse(&prop.extensions, &context)?;
        let ty = resolver.resolve(prop, &context)?;
        imports.extend(ty.imports());

        fields.push(Field {
            name: config
                .field_names
                .get(key)
                .cloned()
                .unwrap_or_else(|| type_name(key)),
            type_name: ty.type_name(),
            source_key: key.clone(),
            required: required.contains(key.as_str()),
            no_pointer: ty.is_reference_like(),
            skip_serialization: prop_config.json_ignore,
            description: prop.description.clone(),
        });
    }
    fields.sort_by(|a, b| field_order(&a.name, &b.name));

    trace!(model = %model_name, fields = fields.len(), "Normalized model.");

    Ok(Model {
        name: model_name,
        description: schema.description.clone(),
        fields,
        imports: imports.into_iter().collect(),
    })
}

/// Resolve each handler's argument list to its final permutation index.
fn assign_permutations(handlers: &mut [Handler], security: &[SecurityScheme]) -> Result<()> {
    for handler in handlers {
        let Some(sec) = handler.security.as_mut() else {
            continue;
        };
        if sec.args.is_empty() {
            continue;
        }
        let scheme = security
            .iter()
            .find(|s| s.name == sec.scheme)
            .ok_or_else(|| CompileError::PermutationNotFound {
                scheme: sec.scheme.clone(),
                args: sec.args.clone(),
            })?;
        sec.permutation = Some(scheme.permutation_index(&sec.args)?);
    }
    Ok(())
}

fn route_for(handler: &Handler) -> Route {
    Route {
        path: handler.path.clone(),
        method: handler.method,
        handler: handler.name.clone(),
        security: handler.security.as_ref().map(|s| s.scheme.clone()),
        permutation: handler.security.as_ref().and_then(|s| s.permutation),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Document {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_handler_name_fallback() {
        let op = Operation::default();
        assert_eq!(
            handler_name(HttpMethod::Get, "/games/{game_id}/players", &op),
            "GetGamesPlayers"
        );
        assert_eq!(handler_name(HttpMethod::Post, "/", &op), "Post");

        let named = Operation {
            operation_id: Some("list_widgets".to_string()),
            ..Operation::default()
        };
        assert_eq!(handler_name(HttpMethod::Get, "/widgets", &named), "ListWidgets");
    }

    #[test]
    fn test_operation_responses() {
        let d = doc(
            r#"
paths:
  /widgets/{id}:
    get:
      operationId: getWidget
      parameters:
        - { name: id, in: path, required: true, schema: { type: integer, format: int32 } }
      responses:
        '200':
          description: OK
          content:
            application/json:
              schema: { $ref: '#/components/schemas/widget' }
        '404':
          description: Not found
        default:
          description: Error
          content:
            application/json:
              schema: { $ref: '#/components/schemas/error' }
components:
  schemas:
    widget: { type: object, properties: { id: { type: string } } }
    error: { type: object, properties: { message: { type: string } } }
"#,
        );
        let ir = compile(&d, &CompileOptions::default()).unwrap();
        let h = &ir.handlers[0];

        assert_eq!(h.name, "GetWidget");
        assert_eq!(h.success_status, 200);
        assert_eq!(h.success_content_type.as_deref(), Some(JSON_CONTENT_TYPE));
        assert_eq!(h.response_type.as_deref(), Some("Widget"));
        assert!(!h.file_download);
        assert_eq!(h.parameterized_path, r#"fmt.Sprintf("/widgets/%d", id)"#);

        let statuses: Vec<_> = h.error_responses.iter().map(|e| e.status.as_str()).collect();
        assert_eq!(statuses, vec!["404", "default"]);
        assert_eq!(h.error_responses[1].type_name.as_deref(), Some("Error"));
    }

    #[test]
    fn test_referenced_responses_and_request_body() {
        let d = doc(
            r"
paths:
  /widgets:
    post:
      operationId: createWidget
      requestBody: { $ref: '#/components/requestBodies/WidgetBody' }
      responses:
        201: { $ref: '#/components/responses/WidgetCreated' }
        404: { $ref: '#/components/responses/NotFound' }
components:
  schemas:
    widget: { type: object, properties: { id: { type: string } } }
    error: { type: object, properties: { message: { type: string } } }
  requestBodies:
    WidgetBody:
      required: true
      content:
        application/json:
          schema: { $ref: '#/components/schemas/widget' }
  responses:
    WidgetCreated:
      description: Created
      content:
        application/json:
          schema: { $ref: '#/components/schemas/widget' }
    NotFound:
      description: Not found
      content:
        application/json:
          schema: { $ref: '#/components/schemas/error' }
",
        );
        let ir = compile(&d, &CompileOptions::default()).unwrap();
        let h = &ir.handlers[0];

        assert_eq!(h.success_status, 201);
        assert_eq!(h.response_type.as_deref(), Some("Widget"));
        assert_eq!(h.request_body_type.as_deref(), Some("Widget"));
        assert!(h.request_body_required);
        assert_eq!(
            h.error_responses,
            vec![ErrorResponse {
                status: "404".to_string(),
                description: Some("Not found".to_string()),
                type_name: Some("Error".to_string()),
            }]
        );
    }

    #[test]
    fn test_unknown_response_reference() {
        let d = doc(
            r"
paths:
  /widgets:
    get:
      operationId: listWidgets
      responses:
        '404': { $ref: '#/components/responses/NotFound' }
",
        );
        let err = compile(&d, &CompileOptions::default()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownReference {
                context: "ListWidgets response 404".to_string(),
                reference: "#/components/responses/NotFound".to_string(),
            }
        );
    }

    #[test]
    fn test_file_download_and_default_status() {
        let d = doc(
            r#"
paths:
  /export:
    get:
      operationId: export
      responses:
        '201':
          description: Created
          content:
            text/csv: {}
  /ping:
    get:
      operationId: ping
      responses: {}
"#,
        );
        let ir = compile(&d, &CompileOptions::default()).unwrap();
        let export = ir.handlers.iter().find(|h| h.name == "Export").unwrap();
        assert_eq!(export.success_status, 201);
        assert_eq!(export.success_content_type.as_deref(), Some("text/csv"));
        assert!(export.file_download);
        assert_eq!(export.response_type, None);

        let ping = ir.handlers.iter().find(|h| h.name == "Ping").unwrap();
        assert_eq!(ping.success_status, 200);
        assert_eq!(ping.success_content_type, None);
    }

    #[test]
    fn test_query_params_model() {
        let d = doc(
            r#"
paths:
  /widgets:
    get:
      operationId: listWidgets
      parameters:
        - { name: page_size, in: query, schema: { type: integer, format: int32 } }
        - { name: tags, in: query, schema: { type: array, items: { type: string } } }
        - { name: id, in: query, required: true }
      responses:
        '200': { description: OK }
"#,
        );
        let ir = compile(&d, &CompileOptions::default()).unwrap();
        assert_eq!(
            ir.handlers[0].query_params_type.as_deref(),
            Some("ListWidgetsQueryParams")
        );

        let model = &ir.models[0];
        assert_eq!(model.name, "ListWidgetsQueryParams");
        let names: Vec<_> = model.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["ID", "PageSize", "Tags"]);
        assert!(model.fields[0].required);
        assert!(model.fields[2].no_pointer);
        assert_eq!(model.fields[1].source_key, "page_size");
    }

    #[test]
    fn test_model_fields() {
        let d = doc(
            r#"
paths: {}
components:
  schemas:
    game_record:
      type: object
      description: A game
      required: [id]
      x-go-field-names: { url: Link }
      properties:
        updated_at: { type: string }
        created_at: { type: string }
        id: { type: string, x-go-type: UUID, x-go-type-import: github.com/google/uuid }
        scores: { type: object, additionalProperties: { type: integer } }
        url: { type: string }
        secret: { type: string, x-go-json-ignore: true }
"#,
        );
        let ir = compile(&d, &CompileOptions::default()).unwrap();
        let model = &ir.models[0];

        assert_eq!(model.name, "GameRecord");
        let names: Vec<_> = model.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["ID", "Link", "Scores", "Secret", "CreatedAt", "UpdatedAt"]
        );
        assert_eq!(model.fields[0].type_name, "uuid.UUID");
        assert!(model.fields[0].required);
        assert!(model.fields[2].no_pointer);
        assert_eq!(model.fields[2].type_name, "map[string]int64");
        assert!(model.fields[3].skip_serialization);
        assert_eq!(model.imports.len(), 1);
        assert_eq!(ir.imports, model.imports);
    }

    #[test]
    fn test_model_must_be_object() {
        let d = doc(
            r#"
paths: {}
components:
  schemas:
    name: { type: string }
"#,
        );
        let err = compile(&d, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedSchemaShape { .. }));

        let d = doc(
            r#"
paths: {}
components:
  schemas:
    name: { description: untyped }
"#,
        );
        let err = compile(&d, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::AmbiguousSchemaType { .. }));
    }

    #[test]
    fn test_field_name_for_missing_property() {
        let d = doc(
            r#"
paths: {}
components:
  schemas:
    widget:
      type: object
      x-go-field-names: { nope: Nope }
      properties: { id: { type: string } }
"#,
        );
        let err = compile(&d, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::MalformedExtension { .. }));
    }

    #[test]
    fn test_duplicate_operation() {
        let d = doc(
            r#"
paths:
  /a:
    get: { operationId: fetch, responses: {} }
  /b:
    get: { operationId: fetch, responses: {} }
"#,
        );
        let err = compile(&d, &CompileOptions::default()).unwrap_err();
        assert_eq!(
            err,
            CompileError::DuplicateOperation {
                name: "Fetch".to_string(),
                first: "GET /a".to_string(),
                second: "GET /b".to_string(),
            }
        );
    }

    #[test]
    fn test_document_security_is_default() {
        let d = doc(
            r#"
security:
  - bearer: []
paths:
  /private:
    get: { operationId: private, responses: {} }
  /public:
    get: { operationId: public, security: [], responses: {} }
"#,
        );
        let ir = compile(&d, &CompileOptions::default()).unwrap();
        let private = ir.handlers.iter().find(|h| h.name == "Private").unwrap();
        let public = ir.handlers.iter().find(|h| h.name == "Public").unwrap();

        assert_eq!(private.security.as_ref().unwrap().scheme, "bearer");
        assert_eq!(private.security.as_ref().unwrap().permutation, None);
        assert_eq!(public.security, None);
        assert_eq!(ir.security.len(), 1);
        assert_eq!(ir.security[0].arity, 0);
    }
}
