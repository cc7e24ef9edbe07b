//! Resolved type descriptors.
//!
//! A closed set of shapes every schema node resolves to. Named references stay
//! names (`ObjectRef`) instead of being expanded, so self-referential schemas
//! resolve in finite time.

use std::collections::BTreeSet;

use serde::Serialize;

/// Resolved type of a schema node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// Builtin type: bool, int8..int64, float32, float64, string, any
    Primitive {
        /// Builtin name
        name: String,
    },
    /// Reference to a named model
    ObjectRef {
        /// Exported model name
        name: String,
    },
    /// Slice of the element type
    ArrayOf {
        /// Element type
        element: Box<TypeDescriptor>,
    },
    /// String-keyed map of the value type
    MapOf {
        /// Value type
        value: Box<TypeDescriptor>,
    },
    /// Type forced by configuration, living in another package
    Imported {
        /// Type name within its package
        name: String,
        /// Import path
        package: String,
        /// Import alias
        alias: Option<String>,
    },
}

/// An import a generated file needs for an `Imported` type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Import {
    /// Import path
    pub path: String,
    /// Import alias
    pub alias: Option<String>,
}

impl TypeDescriptor {
    /// A builtin type.
    pub fn primitive(name: &str) -> Self {
        TypeDescriptor::Primitive {
            name: name.to_string(),
        }
    }

    /// The untyped value.
    pub fn any() -> Self {
        Self::primitive("any")
    }

    /// A reference to a named model.
    pub fn object_ref(name: impl Into<String>) -> Self {
        TypeDescriptor::ObjectRef { name: name.into() }
    }

    /// A slice of `element`.
    pub fn array_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::ArrayOf {
            element: Box::new(element),
        }
    }

    /// A string-keyed map of `value`.
    pub fn map_of(value: TypeDescriptor) -> Self {
        TypeDescriptor::MapOf {
            value: Box::new(value),
        }
    }

    /// Render the type as it is spelled in generated code.
    pub fn type_name(&self) -> String {
        match self {
            TypeDescriptor::Primitive { name } | TypeDescriptor::ObjectRef { name } => {
                name.clone()
            }
            TypeDescriptor::ArrayOf { element } => format!("[]{}", element.type_name()),
            TypeDescriptor::MapOf { value } => format!("map[string]{}", value.type_name()),
            TypeDescriptor::Imported {
                name,
                package,
                alias,
            } => {
                let qualifier = alias.clone().unwrap_or_else(|| package_qualifier(package));
                format!("{qualifier}.{name}")
            }
        }
    }

    /// Slices and maps are already reference-like and never need a pointer.
    pub fn is_reference_like(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::ArrayOf { .. } | TypeDescriptor::MapOf { .. }
        )
    }

    /// Every import reachable from this type.
    pub fn imports(&self) -> BTreeSet<Import> {
        let mut out = BTreeSet::new();
        self.collect_imports(&mut out);
        out
    }

    fn collect_imports(&self, out: &mut BTreeSet<Import>) {
        match self {
            TypeDescriptor::Primitive { .. } | TypeDescriptor::ObjectRef { .. } => {}
            TypeDescriptor::ArrayOf { element } => element.collect_imports(out),
            TypeDescriptor::MapOf { value } => value.collect_imports(out),
            TypeDescriptor::Imported { package, alias, .. } => {
                out.insert(Import {
                    path: package.clone(),
                    alias: alias.clone(),
                });
            }
        }
    }

    /// Formatting verb used when the type is interpolated into a URL path.
    pub fn path_format(&self) -> Option<&'static str> {
        match self {
            TypeDescriptor::Primitive { name } => match name.as_str() {
                "string" => Some("%s"),
                "int8" | "int16" | "int32" | "int64" => Some("%d"),
                "bool" => Some("%t"),
                _ => None,
            },
            _ => None,
        }
    }
}

/// The identifier an unaliased import is referred to by: the last path
/// segment, skipping a `/vN` major-version segment, without a `.vN` suffix or
/// characters that are not valid in an identifier.
fn package_qualifier(path: &str) -> String {
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let last = segments.next().unwrap_or(path);
    let last = if is_major_version(last) {
        segments.next().unwrap_or(last)
    } else {
        last
    };

    let base = match last.rsplit_once('.') {
        Some((base, version)) if !base.is_empty() && is_major_version(version) => base,
        _ => last,
    };
    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        let nested = TypeDescriptor::array_of(TypeDescriptor::array_of(
            TypeDescriptor::primitive("string"),
        ));
        assert_eq!(nested.type_name(), "[][]string");

        let map = TypeDescriptor::map_of(TypeDescriptor::object_ref("Widget"));
        assert_eq!(map.type_name(), "map[string]Widget");

        let imported = TypeDescriptor::Imported {
            name: "UUID".to_string(),
            package: "github.com/google/uuid".to_string(),
            alias: None,
        };
        assert_eq!(imported.type_name(), "uuid.UUID");

        let aliased = TypeDescriptor::Imported {
            name: "Time".to_string(),
            package: "time".to_string(),
            alias: Some("stdtime".to_string()),
        };
        assert_eq!(aliased.type_name(), "stdtime.Time");
    }

    #[test]
    fn test_versioned_package_qualifier() {
        let cases = [
            ("gopkg.in/yaml.v3", "yaml.Node"),
            ("github.com/go-chi/chi/v5", "chi.Node"),
            ("github.com/jackc/pgx/v5/pgtype", "pgtype.Node"),
            ("github.com/foo/go-bar", "gobar.Node"),
            ("time", "time.Node"),
        ];
        for (package, expected) in cases {
            let ty = TypeDescriptor::Imported {
                name: "Node".to_string(),
                package: package.to_string(),
                alias: None,
            };
            assert_eq!(ty.type_name(), expected, "{package}");
        }
    }

    #[test]
    fn test_imports_are_collected_recursively() {
        let ty = TypeDescriptor::map_of(TypeDescriptor::array_of(TypeDescriptor::Imported {
            name: "Decimal".to_string(),
            package: "github.com/shopspring/decimal".to_string(),
            alias: None,
        }));
        let imports: Vec<_> = ty.imports().into_iter().collect();
        assert_eq!(
            imports,
            vec![Import {
                path: "github.com/shopspring/decimal".to_string(),
                alias: None,
            }]
        );
        assert!(ty.is_reference_like());
    }

    #[test]
    fn test_path_format() {
        assert_eq!(TypeDescriptor::primitive("string").path_format(), Some("%s"));
        assert_eq!(TypeDescriptor::primitive("int32").path_format(), Some("%d"));
        assert_eq!(TypeDescriptor::primitive("bool").path_format(), Some("%t"));
        assert_eq!(TypeDescriptor::primitive("float64").path_format(), None);
        assert_eq!(TypeDescriptor::object_ref("Widget").path_format(), None);
    }
}
