//! Specification compiler for templated server code generation.
//!
//! Merges partial OpenAPI documents, resolves schema types, catalogs security
//! requirements and assembles a sorted IR that renderers turn into source text.
//!
//! ```no_run
//! # fn docs(docs: Vec<specgen_core::Document>) -> specgen_core::Result<()> {
//! let doc = specgen_core::merge(docs)?;
//! let ir = specgen_core::compile(&doc, &specgen_core::CompileOptions::default())?;
//! # let _ = ir;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(warnings, unused_must_use, dead_code, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

pub mod error;
pub mod extensions;
pub mod ir;
mod merge;
pub mod spec;

pub use error::{CompileError, Result};
pub use ir::{ApiIR, CompileOptions, compile};
pub use merge::merge;
pub use spec::Document;
