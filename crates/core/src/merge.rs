//! Merging of partial specification documents.
//!
//! The first document is the base. Every later document adds its paths,
//! components and tags; any overlap in paths or schemas aborts the merge.
//! Other components may repeat only with an identical definition.
//!
//! Top-level keys the compiler does not model (`servers`, `externalDocs`) are
//! kept from the base; a later document contributes only the keys the base
//! lacks.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde_json::Value;
use tracing::debug;

use crate::error::{CompileError, Result};
use crate::spec::{Components, Document, Extensions};

/// Merge `docs` into one document.
pub fn merge(docs: Vec<Document>) -> Result<Document> {
    let mut docs = docs.into_iter();
    let Some(mut base) = docs.next() else {
        return Err(CompileError::NoDocuments);
    };

    for (index, doc) in docs.enumerate() {
        let (paths, schemas) = apply(&mut base, doc)?;
        debug!(document = index + 1, paths, schemas, "Merged document.");
    }

    base.tags.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(base)
}

/// Add `doc` to `base`, returning how many paths and schemas it contributed.
fn apply(base: &mut Document, doc: Document) -> Result<(usize, usize)> {
    let paths = doc.paths.len();
    for (path, item) in doc.paths {
        match base.paths.entry(path) {
            Entry::Occupied(e) => return Err(CompileError::DuplicatePath(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(item);
            }
        }
    }

    let mut schemas = 0;
    if let Some(components) = doc.components {
        let target = base.components.get_or_insert_with(Components::default);
        schemas = components.schemas.len();
        merge_components(target, components)?;
    }

    for tag in doc.tags {
        if !base.tags.iter().any(|t| t.name == tag.name) {
            base.tags.push(tag);
        }
    }

    for (key, value) in doc.extensions {
        base.extensions.entry(key).or_insert(value);
    }

    Ok((paths, schemas))
}

fn merge_components(target: &mut Components, incoming: Components) -> Result<()> {
    for (name, schema) in incoming.schemas {
        match target.schemas.entry(name) {
            Entry::Occupied(e) => return Err(CompileError::DuplicateSchema(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(schema);
            }
        }
    }

    insert_identical(
        &mut target.security_schemes,
        incoming.security_schemes,
        CompileError::DuplicateSecurityScheme,
    )?;
    insert_identical(&mut target.parameters, incoming.parameters, |name| {
        duplicate_component("parameters", name)
    })?;
    insert_identical(&mut target.responses, incoming.responses, |name| {
        duplicate_component("responses", name)
    })?;
    insert_identical(&mut target.request_bodies, incoming.request_bodies, |name| {
        duplicate_component("requestBodies", name)
    })?;
    merge_extensions(&mut target.extensions, incoming.extensions)
}

/// Component tables outside the modelled ones (`headers`, `examples`) are
/// merged one level deep, entry by entry.
fn merge_extensions(target: &mut Extensions, incoming: Extensions) -> Result<()> {
    for (kind, value) in incoming {
        match (target.get_mut(&kind), value) {
            (None, value) => {
                target.insert(kind, value);
            }
            (Some(Value::Object(existing)), Value::Object(entries)) => {
                for (name, entry) in entries {
                    match existing.get(&name) {
                        Some(current) if *current != entry => {
                            return Err(duplicate_component(&kind, name));
                        }
                        Some(_) => {}
                        None => {
                            existing.insert(name, entry);
                        }
                    }
                }
            }
            (Some(existing), value) if *existing == value => {}
            (Some(_), _) => return Err(duplicate_component("components", kind)),
        }
    }
    Ok(())
}

/// Insert every entry of `incoming`; an existing entry must be identical.
fn insert_identical<T: PartialEq>(
    target: &mut BTreeMap<String, T>,
    incoming: BTreeMap<String, T>,
    conflict: impl Fn(String) -> CompileError,
) -> Result<()> {
    for (name, item) in incoming {
        match target.entry(name) {
            Entry::Occupied(e) if *e.get() != item => return Err(conflict(e.key().clone())),
            Entry::Occupied(_) => {}
            Entry::Vacant(e) => {
                e.insert(item);
            }
        }
    }
    Ok(())
}

fn duplicate_component(kind: &str, name: String) -> CompileError {
    CompileError::DuplicateComponent {
        kind: kind.to_string(),
        name,
    }
}
