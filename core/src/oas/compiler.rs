#![deny(missing_docs)]

//! # Route Schema Compiler
//!
//! Compiles one endpoint's claims, path, query, body and response types into
//! an [`OperationFragment`] that the document builder merges. Runs once per
//! endpoint at registration time; every error is a configuration error.

use crate::envelope::{DataResponse, ResponseData};
use crate::error::{AppError, AppResult};
use crate::oas::document::{
    json_content, Operation, ParameterIn, RequestBody, Response, Schema,
};
use crate::oas::params::{make_params, CompiledParams};
use crate::oas::repo::{build_schema_repo, SchemaRepo};
use crate::oas::routes::{validate_path_param_var, Endpoint, Verb};
use crate::schema::{get_schema, Describe, Format};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Human facing description of a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDescription {
    /// Operation summary.
    pub title: String,
    /// Operation description.
    pub description: String,
    /// Tag of the group the route belongs to.
    pub tag: Option<String>,
}

impl RouteDescription {
    /// An untagged description.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tag: None,
        }
    }
}

/// A compiled operation, ready to be merged into a document.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationFragment {
    /// Path template, `{name}` placeholders.
    pub path: String,
    /// HTTP verb.
    pub verb: Verb,
    /// The operation.
    pub operation: Operation,
    /// Named definitions the operation refers to.
    pub schemas: BTreeMap<String, Schema>,
    /// Whether the claims type carries any field.
    pub requires_claims: bool,
}

/// Compiles an endpoint.
///
/// - `C`: authentication claims
/// - `P`: path parameters, an object whose every property has a `{name}` placeholder
/// - `Q`: query parameters
/// - `B`: request body
/// - `D`: payload of the [`DataResponse`] envelope
pub fn compile_route<C, P, Q, B, D>(
    endpoint: &Endpoint,
    route: &RouteDescription,
) -> AppResult<OperationFragment>
where
    C: Describe + ?Sized,
    P: Describe + ?Sized,
    Q: Describe + ?Sized,
    B: Describe + ?Sized,
    D: ResponseData,
{
    let path = endpoint.openapi_path();
    let mut schemas = SchemaRepo::default();

    let path_params = make_params::<P>(ParameterIn::Path)?;
    for name in path_params.names() {
        validate_path_param_var(&path, name)?;
    }

    let query_params = match make_params::<Q>(ParameterIn::Query) {
        Ok(compiled) => compiled,
        Err(AppError::ParamsNotObject { found, .. }) => {
            warn!(path = %path, found = %found, "route.query.not_object");
            CompiledParams::default()
        }
        Err(err) => return Err(err),
    };

    let mut parameters = path_params.parameters;
    parameters.extend(query_params.parameters);
    schemas.absorb(path_params.schemas);
    schemas.absorb(query_params.schemas);

    let request_body = get_schema::<B>().map(|node| {
        let body = build_schema_repo(&node);
        schemas.absorb(body.repo);
        RequestBody {
            description: Some("Request data".to_string()),
            content: json_content(body.start),
        }
    });

    let Some(response) = response_repo::<D>() else {
        return Err(AppError::EmptyResponseSchema {
            verb: endpoint.verb,
            path,
        });
    };
    schemas.absorb(response.repo);

    let operation = Operation {
        tags: route.tag.iter().cloned().collect(),
        summary: non_blank(&route.title),
        description: non_blank(&route.description),
        parameters,
        request_body,
        responses: BTreeMap::from([(
            "200".to_string(),
            Response {
                description: "OK".to_string(),
                content: json_content(response.start),
            },
        )]),
        security: Vec::new(),
    };

    let requires_claims = get_schema::<C>()
        .is_some_and(|node| node.format == Format::Object && !node.children.is_empty());

    debug!(
        verb = %endpoint.verb,
        path = %path,
        parameters = operation.parameters.len(),
        schemas = schemas.repo.len(),
        "route.compiled"
    );

    Ok(OperationFragment {
        path,
        verb: endpoint.verb,
        operation,
        schemas: schemas.repo,
        requires_claims,
    })
}

/// The `DataResponse<D>` schema, with `D`'s hand-authored schema standing in
/// for the inferred `data` property. `None` when that schema is empty.
fn response_repo<D: ResponseData>() -> Option<SchemaRepo> {
    let node = get_schema::<DataResponse<D>>()?;
    let mut response = build_schema_repo(&node);
    if let Some(authored) = D::self_schema() {
        if authored.start.is_empty() {
            return None;
        }
        // Authored definitions win over inferred ones of the same name.
        let inferred = std::mem::replace(&mut response.repo, authored.repo);
        response.absorb(inferred);
        response.set_property(&node.canonical_name(), "data", authored.start.into());
    }
    (!response.start.is_empty()).then_some(response)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
