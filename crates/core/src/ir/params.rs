//! Per-operation parameter classification and path templating.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{CompileError, Result};
use crate::extensions::ParameterExtensions;
use crate::spec::{Parameter, ParameterLocation, RefOr};

use super::api::{HttpMethod, Param};
use super::resolve::TypeResolver;
use super::types::TypeDescriptor;
use super::utils::{arg_name, quote};

/// Path with placeholders replaced by formatting verbs, plus the argument
/// names that fill them in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    /// Path with `%s`, `%d` or `%t` in place of each bound segment
    pub template: String,
    /// Argument identifiers, in segment order
    pub args: Vec<String>,
}

impl PathTemplate {
    /// `fmt.Sprintf("/games/%s", gameID)`, or the quoted literal path when
    /// there is nothing to substitute.
    pub fn expression(&self) -> String {
        if self.args.is_empty() {
            return quote(&self.template);
        }
        format!(
            "fmt.Sprintf({}, {})",
            quote(&self.template),
            self.args.join(", ")
        )
    }
}

/// Check for duplicate parameters within one declaration level.
fn check_duplicate_params(params: &[&Parameter], method: HttpMethod, path: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for p in params {
        if p.location == ParameterLocation::Cookie {
            continue;
        }
        if !seen.insert((p.location, p.name.as_str())) {
            return Err(CompileError::DuplicateParameter {
                method: method.to_string(),
                path: path.to_string(),
                location: p.location.as_str(),
                name: p.name.clone(),
            });
        }
    }
    Ok(())
}

/// Classify the parameters of one operation.
///
/// Path-level parameters apply to every operation of the path; an
/// operation-level parameter with the same name and location replaces one.
/// Cookie parameters are skipped. Referenced parameters are looked up under
/// `components.parameters` before anything else.
pub fn classify(
    resolver: &TypeResolver<'_>,
    method: HttpMethod,
    path: &str,
    path_params: &[RefOr<Parameter>],
    op_params: &[RefOr<Parameter>],
) -> Result<Vec<Param>> {
    let context = format!("{method} {path}");
    let path_params = resolve_refs(resolver, path_params, &context)?;
    let op_params = resolve_refs(resolver, op_params, &context)?;
    check_duplicate_params(&path_params, method, path)?;
    check_duplicate_params(&op_params, method, path)?;

    let mut params: Vec<Param> = Vec::new();
    for p in path_params.into_iter().chain(op_params) {
        if p.location == ParameterLocation::Cookie {
            debug!(%method, path, param = %p.name, "Skipping cookie parameter.");
            continue;
        }
        params.retain(|existing| !(existing.name == p.name && existing.location == p.location));
        params.push(classify_param(resolver, method, path, p)?);
    }

    Ok(params)
}

fn resolve_refs<'a: 'p, 'p>(
    resolver: &TypeResolver<'a>,
    items: &'p [RefOr<Parameter>],
    context: &str,
) -> Result<Vec<&'p Parameter>> {
    items
        .iter()
        .map(|item| resolver.parameter(item, context))
        .collect()
}

fn classify_param(
    resolver: &TypeResolver<'_>,
    method: HttpMethod,
    path: &str,
    p: &Parameter,
) -> Result<Param> {
    let context = format!("{method} {path} parameter {}", p.name);
    let config = ParameterExtensions::parse(&p.extensions, &context)?;

    let ty = match &p.schema {
        Some(schema) => resolver.resolve(schema, &context)?,
        None => TypeDescriptor::primitive("string"),
    };

    Ok(Param {
        name: p.name.clone(),
        arg_name: arg_name(&p.name),
        type_name: ty.type_name(),
        ty,
        location: p.location,
        required: p.required || p.location == ParameterLocation::Path,
        retrieval_name: config.retrieval_name,
        description: p.description.clone(),
    })
}

/// Build the formatting template for `path`.
///
/// `{name}` segments bind to the path parameter called `name`. A literal `*`
/// segment binds to the path parameter whose retrieval name is `*`; every other
/// literal segment stays as written.
pub fn parameterized_path(path: &str, params: &[Param]) -> Result<PathTemplate> {
    let path_params: Vec<&Param> = params
        .iter()
        .filter(|p| p.location == ParameterLocation::Path)
        .collect();

    let mut args = Vec::new();
    let mut segments = Vec::new();

    for segment in path.split('/') {
        let param = if let Some(name) = segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            let found = path_params.iter().find(|p| p.name == name);
            Some(found.ok_or_else(|| CompileError::PathParamNotFound {
                path: path.to_string(),
                name: name.to_string(),
            })?)
        } else if segment == "*" {
            path_params
                .iter()
                .find(|p| p.retrieval_name.as_deref() == Some("*"))
        } else {
            None
        };

        let Some(param) = param else {
            segments.push(segment.to_string());
            continue;
        };

        let verb = param
            .ty
            .path_format()
            .ok_or_else(|| CompileError::UnsupportedPathParamType {
                path: path.to_string(),
                name: param.name.clone(),
                type_name: param.type_name.clone(),
            })?;
        segments.push(verb.to_string());
        args.push(param.arg_name.clone());
    }

    if args.is_empty() {
        return Ok(PathTemplate {
            template: path.to_string(),
            args,
        });
    }

    Ok(PathTemplate {
        template: segments.join("/"),
        args,
    })
}
