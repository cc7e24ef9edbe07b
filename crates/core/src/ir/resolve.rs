//! Schema node -> [`TypeDescriptor`] resolution, and lookup of referenced
//! parameters, responses and request bodies.
//!
//! Resolution is structural and recursive: array items and map values go
//! through the same function. `$ref` nodes resolve to the referenced name only.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{CompileError, Result};
use crate::extensions::SchemaExtensions;
use crate::spec::{
    AdditionalProperties, Components, Document, Parameter, RefOr, RequestBody, Response, Schema,
};

use super::types::TypeDescriptor;
use super::utils::type_name;

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Resolves schema nodes and component references against one document.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    components: Option<&'a Components>,
}

impl<'a> TypeResolver<'a> {
    /// Resolver over the components of `doc`.
    pub fn new(doc: &'a Document) -> Self {
        Self {
            components: doc.components.as_ref(),
        }
    }

    /// The parameter behind `item`, following a `#/components/parameters/` reference.
    pub fn parameter<'p>(&self, item: &'p RefOr<Parameter>, context: &str) -> Result<&'p Parameter>
    where
        'a: 'p,
    {
        lookup(item, self.components.map(|c| &c.parameters), "parameters", context)
    }

    /// The response behind `item`, following a `#/components/responses/` reference.
    pub fn response<'p>(&self, item: &'p RefOr<Response>, context: &str) -> Result<&'p Response>
    where
        'a: 'p,
    {
        lookup(item, self.components.map(|c| &c.responses), "responses", context)
    }

    /// The request body behind `item`, following a
    /// `#/components/requestBodies/` reference.
    pub fn request_body<'p>(
        &self,
        item: &'p RefOr<RequestBody>,
        context: &str,
    ) -> Result<&'p RequestBody>
    where
        'a: 'p,
    {
        lookup(item, self.components.map(|c| &c.request_bodies), "requestBodies", context)
    }

    /// Resolve a schema node. `context` names the node in error messages
    /// (e.g. `Widget.tags`).
    pub fn resolve(&self, schema: &Schema, context: &str) -> Result<TypeDescriptor> {
        let ty = self.resolve_node(schema, context)?;
        trace!(context, ty = %ty.type_name(), "Resolved schema type.");
        Ok(ty)
    }

    fn resolve_node(&self, schema: &Schema, context: &str) -> Result<TypeDescriptor> {
        let config = SchemaExtensions::parse(&schema.extensions, context)?;
        if let Some(forced) = config.type_override {
            return Ok(TypeDescriptor::Imported {
                name: forced.name,
                package: forced.import_path,
                alias: forced.alias,
            });
        }

        if let Some(ref_path) = &schema.ref_path {
            return self.resolve_ref(ref_path, context);
        }

        let types = schema.types();
        if types.len() > 1 {
            return Err(CompileError::AmbiguousSchemaType {
                context: context.to_string(),
                found: types.iter().map(|t| (*t).to_string()).collect(),
            });
        }

        match types.first().copied() {
            None if schema.additional_properties.is_some() => self.resolve_object(schema, context),
            None => Ok(TypeDescriptor::any()),
            Some("object") => self.resolve_object(schema, context),
            Some("array") => match &schema.items {
                Some(items) => Ok(TypeDescriptor::array_of(
                    self.resolve_node(items, &format!("{context}[]"))?,
                )),
                None => Ok(TypeDescriptor::array_of(TypeDescriptor::any())),
            },
            Some("boolean") => Ok(TypeDescriptor::primitive("bool")),
            Some("integer") => Ok(TypeDescriptor::primitive(integer_type(
                schema.format.as_deref(),
            ))),
            Some("number") => Ok(TypeDescriptor::primitive(number_type(
                schema.format.as_deref(),
            ))),
            Some("string") => Ok(TypeDescriptor::primitive("string")),
            Some(other) => Err(CompileError::UnsupportedSchemaShape {
                context: context.to_string(),
                reason: format!("type {other:?} is not supported"),
            }),
        }
    }

    fn resolve_object(&self, schema: &Schema, context: &str) -> Result<TypeDescriptor> {
        if schema.properties.as_ref().is_some_and(|p| !p.is_empty()) {
            return Err(CompileError::UnsupportedSchemaShape {
                context: context.to_string(),
                reason: "inline object schemas must be declared under components.schemas"
                    .to_string(),
            });
        }

        match &schema.additional_properties {
            None | Some(AdditionalProperties::Bool(true)) => {
                Ok(TypeDescriptor::map_of(TypeDescriptor::any()))
            }
            Some(AdditionalProperties::Schema(value)) => Ok(TypeDescriptor::map_of(
                self.resolve_node(value, &format!("{context}{{}}"))?,
            )),
            Some(AdditionalProperties::Bool(false)) => Err(CompileError::UnsupportedSchemaShape {
                context: context.to_string(),
                reason: "object without properties that forbids additional properties".to_string(),
            }),
        }
    }

    fn resolve_ref(&self, ref_path: &str, context: &str) -> Result<TypeDescriptor> {
        let Some(name) = ref_path.strip_prefix(SCHEMA_REF_PREFIX) else {
            return Err(CompileError::UnsupportedSchemaShape {
                context: context.to_string(),
                reason: format!("only local schema references are supported, got {ref_path:?}"),
            });
        };

        if !self.components.is_some_and(|c| c.schemas.contains_key(name)) {
            return Err(CompileError::UnknownSchemaReference {
                context: context.to_string(),
                reference: ref_path.to_string(),
            });
        }

        Ok(TypeDescriptor::object_ref(type_name(name)))
    }
}

/// Follow a local reference into one component table. References are not
/// chained: a component table holds definitions only.
fn lookup<'p, T>(
    item: &'p RefOr<T>,
    table: Option<&'p BTreeMap<String, T>>,
    kind: &str,
    context: &str,
) -> Result<&'p T> {
    match item {
        RefOr::Item(value) => Ok(value),
        RefOr::Ref(reference) => {
            let target = &reference.ref_path;
            target
                .strip_prefix("#/components/")
                .and_then(|rest| rest.strip_prefix(kind))
                .and_then(|rest| rest.strip_prefix('/'))
                .and_then(|name| table?.get(name))
                .ok_or_else(|| CompileError::UnknownReference {
                    context: context.to_string(),
                    reference: target.clone(),
                })
        }
    }
}

fn integer_type(format: Option<&str>) -> &'static str {
    match format {
        Some("int8") => "int8",
        Some("int16") => "int16",
        Some("int32") => "int32",
        _ => "int64",
    }
}

fn number_type(format: Option<&str>) -> &'static str {
    match format {
        Some("float") => "float32",
        _ => "float64",
    }
}
