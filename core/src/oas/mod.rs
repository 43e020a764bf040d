#![deny(missing_docs)]

//! # OpenAPI Generation Module
//!
//! - **document**: The serde model of the emitted document.
//! - **repo**: Turns schema nodes into named, reusable definitions.
//! - **params**: Compiles object types into path or query parameters.
//! - **routes**: Verbs, endpoints and path template helpers.
//! - **compiler**: Compiles one endpoint into an operation fragment.
//! - **builder**: Merges fragments into a document.

pub mod builder;
pub mod compiler;
pub mod document;
pub mod params;
pub mod repo;
pub mod routes;

pub use builder::{ApiDoc, RouteGroup};
pub use compiler::{compile_route, OperationFragment, RouteDescription};
pub use document::{Document, ParameterIn, Schema, SchemaRef};
pub use params::{make_params, CompiledParams};
pub use repo::{build_schema_repo, SchemaRepo};
pub use routes::{router_path_to_openapi_path, validate_path_param_var, Endpoint, Verb};
