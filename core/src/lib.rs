#![deny(missing_docs)]

//! # Apiculi Core
//!
//! Derives OpenAPI documentation from the Rust types an endpoint binds and
//! returns.
//!
//! Types state their shape through [`Describe`]; the walker turns that into a
//! [`Node`] tree, the repository builder turns trees into named schemas, and
//! [`ApiDoc`] compiles every registered endpoint into a single document.

/// Shared error types.
pub mod error;

/// Type introspection.
pub mod schema;

/// OpenAPI document generation.
pub mod oas;

/// Response and error envelopes.
pub mod envelope;

/// Request binding for framework adapters.
pub mod binding;

pub use binding::{BindError, BindStage, Binder, EndpointInput, RawRequest};
pub use envelope::{
    CollectionDetail, CollectionItemData, DataDetail, DataResponse, DetailError, ErrorResponse,
    GeneralError, ResponseData, SingleItemData,
};
pub use error::{AppError, AppResult};
pub use oas::{
    build_schema_repo, compile_route, make_params, router_path_to_openapi_path, ApiDoc,
    CompiledParams, Document, Endpoint, OperationFragment, ParameterIn, RouteDescription,
    RouteGroup, Schema, SchemaRef, SchemaRepo, Verb,
};
pub use schema::{
    get_schema, resolve, Describe, Field, Fields, Format, Marshal, Node, Nullable, WalkError,
    WalkResult, Walker,
};
