//! Intermediate Representation for templated server code generation.
//!
//! A merged document goes through one pass:
//! 1. Parameter classification and path templating per operation
//! 2. Type resolution for parameters, bodies, responses and model fields
//! 3. Security cataloging across all operations
//! 4. Assembly into a sorted, serializable [`ApiIR`]
//!
//! ## Module Structure
//!
//! - `api`: API-level IR (Handler, Model, SecurityScheme, Route)
//! - `types`: resolved type descriptors
//! - `resolve`: schema node -> TypeDescriptor
//! - `security`: security requirement accumulator
//! - `params`: parameter classification and path templates
//! - `normalize`: document -> API IR
//! - `utils`: naming helpers shared across modules

mod api;
mod normalize;
mod params;
mod resolve;
mod security;
mod types;
pub mod utils;

pub use api::{
    ApiIR, ArgPermutation, ErrorResponse, Field, Handler, HandlerSecurity, HttpMethod, Model,
    Param, Route, SecurityScheme,
};
pub use normalize::{CompileOptions, compile};
pub use params::{PathTemplate, classify, parameterized_path};
pub use resolve::TypeResolver;
pub use security::{SecurityCatalog, SecurityRef, permutation_hash};
pub use types::{Import, TypeDescriptor};
