//! Typed view of the `x-` configuration keys recognized on schema and
//! parameter nodes.
//!
//! Unrecognized keys are ignored. A recognized key with a value of the wrong
//! shape is an error, never a silent default.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{CompileError, Result};
use crate::spec::Extensions;

/// Forces the resolved type of a schema node.
pub const GO_TYPE: &str = "x-go-type";
/// Import path of the forced type; required alongside [`GO_TYPE`].
pub const GO_TYPE_IMPORT: &str = "x-go-type-import";
/// Optional alias used when importing the forced type.
pub const GO_TYPE_IMPORT_ALIAS: &str = "x-go-type-import-alias";
/// Map of property name to exported field name, on a model schema.
pub const GO_FIELD_NAMES: &str = "x-go-field-names";
/// Marks a property as excluded from serialization.
pub const GO_JSON_IGNORE: &str = "x-go-json-ignore";
/// Binds a path parameter to a wildcard segment.
pub const RETRIEVAL_NAME: &str = "x-retrieval-name";

/// An explicit type override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOverride {
    /// Type name within its package (`x-go-type`)
    pub name: String,
    /// Package import path (`x-go-type-import`)
    pub import_path: String,
    /// Import alias (`x-go-type-import-alias`)
    pub alias: Option<String>,
}

/// Configuration recognized on a schema node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaExtensions {
    /// Forced type, if any
    pub type_override: Option<TypeOverride>,
    /// Property name -> exported field name
    pub field_names: BTreeMap<String, String>,
    /// Exclude the property from serialization
    pub json_ignore: bool,
}

/// Configuration recognized on a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterExtensions {
    /// Literal segment the parameter binds to; only `*` binds
    pub retrieval_name: Option<String>,
}

fn malformed(context: &str, key: &str, reason: &str) -> CompileError {
    CompileError::MalformedExtension {
        context: context.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn string_value(ext: &Extensions, key: &str, context: &str) -> Result<Option<String>> {
    match ext.get(key) {
        None => Ok(None),
        Some(Value::String(s)) if !s.is_empty() => Ok(Some(s.clone())),
        Some(_) => Err(malformed(context, key, "expected a non-empty string")),
    }
}

impl SchemaExtensions {
    /// Read the schema keys out of `ext`. `context` names the node in errors.
    pub fn parse(ext: &Extensions, context: &str) -> Result<Self> {
        let name = string_value(ext, GO_TYPE, context)?;
        let import_path = string_value(ext, GO_TYPE_IMPORT, context)?;
        let alias = string_value(ext, GO_TYPE_IMPORT_ALIAS, context)?;

        let type_override = match (name, import_path) {
            (Some(name), Some(import_path)) => Some(TypeOverride {
                name,
                import_path,
                alias,
            }),
            (Some(_), None) => {
                return Err(CompileError::MissingCompanionExtension {
                    context: context.to_string(),
                    key: GO_TYPE.to_string(),
                    companion: GO_TYPE_IMPORT.to_string(),
                });
            }
            (None, Some(_)) => {
                return Err(CompileError::MissingCompanionExtension {
                    context: context.to_string(),
                    key: GO_TYPE_IMPORT.to_string(),
                    companion: GO_TYPE.to_string(),
                });
            }
            (None, None) => {
                if alias.is_some() {
                    return Err(malformed(
                        context,
                        GO_TYPE_IMPORT_ALIAS,
                        "only valid together with x-go-type",
                    ));
                }
                None
            }
        };

        let field_names = match ext.get(GO_FIELD_NAMES) {
            None => BTreeMap::new(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => Ok((k.clone(), s.clone())),
                    _ => Err(malformed(
                        context,
                        GO_FIELD_NAMES,
                        &format!("value for {k:?} must be a string"),
                    )),
                })
                .collect::<Result<_>>()?,
            Some(_) => {
                return Err(malformed(
                    context,
                    GO_FIELD_NAMES,
                    "expected a map of property name to field name",
                ));
            }
        };

        let json_ignore = match ext.get(GO_JSON_IGNORE) {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(malformed(context, GO_JSON_IGNORE, "expected a boolean")),
        };

        Ok(Self {
            type_override,
            field_names,
            json_ignore,
        })
    }
}

impl ParameterExtensions {
    /// Read the parameter keys out of `ext`.
    pub fn parse(ext: &Extensions, context: &str) -> Result<Self> {
        Ok(Self {
            retrieval_name: string_value(ext, RETRIEVAL_NAME, context)?,
        })
    }
}
