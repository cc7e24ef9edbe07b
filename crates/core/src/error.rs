//! Errors raised while merging and compiling specification documents.
//!
//! Every error is fatal to the compilation pass: no partial IR is produced.

use thiserror::Error;

/// A failed merge or compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// `merge` was called with an empty list.
    #[error("no specification documents provided")]
    NoDocuments,

    /// Two documents declare the same path.
    #[error("path {0:?} is defined in more than one document")]
    DuplicatePath(String),

    /// Two documents declare the same component schema, or two models end up
    /// with the same exported name.
    #[error("schema {0:?} is defined in more than one document")]
    DuplicateSchema(String),

    /// Two documents declare a security scheme under one name with different
    /// definitions.
    #[error("security scheme {0:?} is defined differently in more than one document")]
    DuplicateSecurityScheme(String),

    /// Two documents declare a reusable component under one name with
    /// different definitions.
    #[error("component {kind}.{name} is defined differently in more than one document")]
    DuplicateComponent {
        /// Component table, e.g. `responses`
        kind: String,
        /// Entry name within the table
        name: String,
    },

    /// A schema node declares more than one structural type, or a model
    /// declares none.
    #[error("{context}: expected exactly one schema type, found {found:?}")]
    AmbiguousSchemaType {
        /// Where the node was found
        context: String,
        /// Declared types
        found: Vec<String>,
    },

    /// A schema node has a shape the compiler does not model.
    #[error("{context}: unsupported schema shape: {reason}")]
    UnsupportedSchemaShape {
        /// Where the node was found
        context: String,
        /// What is unsupported about it
        reason: String,
    },

    /// A `$ref` names a schema the document does not declare.
    #[error("{context}: reference {reference:?} does not name a schema in this document")]
    UnknownSchemaReference {
        /// Where the reference was found
        context: String,
        /// The reference as written
        reference: String,
    },

    /// A `$ref` to a parameter, response or request body that cannot be
    /// resolved locally.
    #[error("{context}: reference {reference:?} does not name a component in this document")]
    UnknownReference {
        /// Where the reference was found
        context: String,
        /// The reference as written
        reference: String,
    },

    /// A configuration key is present without the key it requires.
    #[error("{context}: extension {key:?} requires companion extension {companion:?}")]
    MissingCompanionExtension {
        /// Where the key was found
        context: String,
        /// The key that is present
        key: String,
        /// The key that is missing
        companion: String,
    },

    /// A recognized configuration key has a value of the wrong shape.
    #[error("{context}: malformed extension {key:?}: {reason}")]
    MalformedExtension {
        /// Where the key was found
        context: String,
        /// The offending key
        key: String,
        /// What is wrong with the value
        reason: String,
    },

    /// An operation combines security requirements.
    #[error(
        "{method} {path}: only a single security requirement is supported, found {count} {what}"
    )]
    UnsupportedSecurityComposition {
        /// Operation method
        method: String,
        /// Operation path
        path: String,
        /// What was counted
        what: &'static str,
        /// How many were found
        count: usize,
    },

    /// A security scheme is used with two different non-zero argument counts.
    #[error(
        "inconsistent number of arguments for security {scheme:?}. expected={expected} actual={actual}"
    )]
    InconsistentSecurityArity {
        /// Scheme name
        scheme: String,
        /// Arity established by the first non-empty use
        expected: usize,
        /// Arity of the conflicting use
        actual: usize,
    },

    /// A handler refers to an argument list that was never registered.
    #[error("security {scheme:?}: argument permutation {args:?} not found")]
    PermutationNotFound {
        /// Scheme name
        scheme: String,
        /// Argument list looked up
        args: Vec<String>,
    },

    /// A `{name}` path segment has no matching path parameter.
    #[error("{path}: path parameter {name:?} not found")]
    PathParamNotFound {
        /// Path template
        path: String,
        /// Placeholder name
        name: String,
    },

    /// A path parameter's type has no formatting verb.
    #[error("{path}: path parameter {name:?} has type {type_name:?} which cannot be formatted")]
    UnsupportedPathParamType {
        /// Path template
        path: String,
        /// Parameter name
        name: String,
        /// Resolved type
        type_name: String,
    },

    /// One declaration level lists the same parameter twice.
    #[error("{method} {path}: duplicate {location} parameter {name:?}")]
    DuplicateParameter {
        /// Operation method
        method: String,
        /// Operation path
        path: String,
        /// Parameter location
        location: &'static str,
        /// Parameter name
        name: String,
    },

    /// Two operations produce the same handler name.
    #[error("handler name {name:?} is used by more than one operation ({first} and {second})")]
    DuplicateOperation {
        /// Exported handler name
        name: String,
        /// First operation, as `METHOD path`
        first: String,
        /// Second operation, as `METHOD path`
        second: String,
    },
}

/// Result alias for compiler operations.
pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_message_names_counts() {
        let err = CompileError::InconsistentSecurityArity {
            scheme: "auth".to_string(),
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "inconsistent number of arguments for security \"auth\". expected=2 actual=3"
        );
    }

    #[test]
    fn test_duplicate_path_message() {
        let err = CompileError::DuplicatePath("/widgets".to_string());
        assert_eq!(
            err.to_string(),
            "path \"/widgets\" is defined in more than one document"
        );
    }
}
