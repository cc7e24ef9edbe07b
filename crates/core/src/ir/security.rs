//! Security requirement cataloging.
//!
//! [`SecurityCatalog`] accumulates every named requirement seen during a pass,
//! enforces a fixed argument count per name and deduplicates argument lists
//! into permutations. Once finished, permutations are sorted so their indices
//! do not depend on the order operations were visited in.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{CompileError, Result};
use crate::spec::SecurityRequirement;

use super::api::{ArgPermutation, HttpMethod, SecurityScheme};
use super::utils::{arg_name, type_name};

/// Scheme name and the literal arguments one operation uses it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRef {
    /// Scheme name
    pub scheme: String,
    /// Arguments in declaration order
    pub args: Vec<String>,
}

/// Accumulator for the security schemes of one compilation pass.
#[derive(Debug, Default)]
pub struct SecurityCatalog {
    schemes: BTreeMap<String, SecurityScheme>,
}

/// Stable hash of an ordered argument list.
///
/// Each argument is length-prefixed so `["ab"]` and `["a", "b"]` differ.
pub fn permutation_hash(args: &[String]) -> String {
    let mut hasher = Sha256::new();
    for arg in args {
        hasher.update((arg.len() as u64).to_le_bytes());
        hasher.update(arg.as_bytes());
    }
    hex::encode(hasher.finalize())
}

impl SecurityCatalog {
    /// Record the security declared on one operation.
    ///
    /// Returns the reference the operation's handler should keep, or `None`
    /// when the operation declares no security.
    pub fn observe(
        &mut self,
        method: HttpMethod,
        path: &str,
        requirements: Option<&[SecurityRequirement]>,
    ) -> Result<Option<SecurityRef>> {
        let Some(requirements) = requirements else {
            return Ok(None);
        };

        let requirement = match requirements {
            [] => return Ok(None),
            [single] => single,
            _ => {
                return Err(CompileError::UnsupportedSecurityComposition {
                    method: method.to_string(),
                    path: path.to_string(),
                    what: "security entries",
                    count: requirements.len(),
                });
            }
        };

        if requirement.len() > 1 {
            return Err(CompileError::UnsupportedSecurityComposition {
                method: method.to_string(),
                path: path.to_string(),
                what: "requirements in one security entry",
                count: requirement.len(),
            });
        }

        let Some((name, args)) = requirement.iter().next() else {
            return Ok(None);
        };

        self.register(name, args)?;
        Ok(Some(SecurityRef {
            scheme: name.clone(),
            args: args.clone(),
        }))
    }

    /// Register one sighting of `name` used with `args`.
    ///
    /// An empty argument list never conflicts with an established arity.
    pub fn register(&mut self, name: &str, args: &[String]) -> Result<()> {
        let scheme = self.schemes.entry(name.to_string()).or_insert_with(|| {
            debug!(scheme = name, arity = args.len(), "Discovered security scheme.");
            SecurityScheme::new(name, args.len())
        });

        if args.is_empty() {
            return Ok(());
        }

        if scheme.arity == 0 {
            scheme.arity = args.len();
        } else if scheme.arity != args.len() {
            return Err(CompileError::InconsistentSecurityArity {
                scheme: name.to_string(),
                expected: scheme.arity,
                actual: args.len(),
            });
        }

        scheme.add_permutation(args);
        Ok(())
    }

    /// Finish the pass: schemes sorted by name, permutations sorted.
    pub fn finish(self) -> Vec<SecurityScheme> {
        self.schemes
            .into_values()
            .map(|mut scheme| {
                scheme.sort_permutations();
                scheme
            })
            .collect()
    }
}

impl SecurityScheme {
    /// A scheme with no permutations yet.
    pub fn new(name: &str, arity: usize) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name(name),
            arg_name: arg_name(name),
            arity,
            permutations: Vec::new(),
        }
    }

    /// Append `args` unless an identical list is already registered.
    pub fn add_permutation(&mut self, args: &[String]) {
        let hash = permutation_hash(args);
        if self.permutations.iter().any(|p| p.hash == hash) {
            return;
        }
        self.permutations.push(ArgPermutation {
            hash,
            args: args.to_vec(),
        });
    }

    /// Sort by the canonical join of the argument values.
    pub fn sort_permutations(&mut self) {
        self.permutations.sort_by(|a, b| {
            a.args
                .join(",")
                .cmp(&b.args.join(","))
                .then_with(|| a.hash.cmp(&b.hash))
        });
    }

    /// Position of the permutation registered for `args`.
    pub fn permutation_index(&self, args: &[String]) -> Result<usize> {
        let hash = permutation_hash(args);
        self.permutations
            .iter()
            .position(|p| p.hash == hash)
            .ok_or_else(|| CompileError::PermutationNotFound {
                scheme: self.name.clone(),
                args: args.to_vec(),
            })
    }
}
