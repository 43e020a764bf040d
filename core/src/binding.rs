#![deny(missing_docs)]

//! # Request Binding
//!
//! Framework-neutral binding of a raw request into an endpoint's typed input.
//!
//! A [`Binder`] derives the shape of its parameter, query and body types once,
//! when the route is registered, and reuses it for every request:
//!
//! - Path values bind by the cached parameter names.
//! - Repeated query keys are joined with `,`.
//! - Number and boolean fields are parsed from their text; array fields are
//!   split on `,`.
//! - The body is decoded only for mutating verbs, from JSON or form data;
//!   other verbs bind the body type's default value.

use crate::envelope::{DetailError, ErrorResponse};
use crate::oas::routes::Verb;
use crate::schema::{get_schema, Describe, Format, Node};
use derive_more::Display;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tracing::debug;

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// The typed input handed to an endpoint handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointInput<C, P, Q, B> {
    /// Authentication claims.
    pub claims: C,
    /// Path parameters.
    pub params: P,
    /// Query parameters.
    pub query: Q,
    /// Request body.
    pub body: B,
}

/// Request data as extracted by an HTTP framework.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    /// `Content-Type` header value.
    pub content_type: Option<String>,
    /// Path variables matched by the router.
    pub path_params: BTreeMap<String, String>,
    /// Raw query string, without the leading `?`.
    pub query: String,
    /// Body bytes.
    pub body: Vec<u8>,
}

/// The binding step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BindStage {
    /// Unsupported body media type.
    #[display("content-type")]
    ContentType,
    /// Claims were required but not supplied.
    #[display("claims")]
    Claims,
    /// Path parameters.
    #[display("params")]
    Params,
    /// Query parameters.
    #[display("query")]
    Query,
    /// Request body.
    #[display("body")]
    Body,
}

/// A per-request binding failure.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{stage}: {message}")]
pub struct BindError {
    /// Failed step.
    pub stage: BindStage,
    /// What went wrong.
    pub message: String,
}

impl BindError {
    fn new(stage: BindStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl std::error::Error for BindError {}

impl From<BindError> for ErrorResponse {
    fn from(err: BindError) -> Self {
        ErrorResponse::new(400, err.to_string()).with_error(DetailError::new(
            err.stage.to_string(),
            "invalid",
            err.message,
        ))
    }
}

/// Shape of one bindable field.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldShape {
    name: String,
    format: Format,
    element: Option<Format>,
}

/// Cached shape of one role type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RoleShape {
    absent: bool,
    fields: Vec<FieldShape>,
}

impl RoleShape {
    fn of<T: Describe + ?Sized>() -> Self {
        match get_schema::<T>() {
            None => Self {
                absent: true,
                fields: Vec::new(),
            },
            Some(node) => Self {
                absent: false,
                fields: field_shapes(&node),
            },
        }
    }

    fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// What an unsupplied value deserializes from.
    fn empty(&self) -> Value {
        if self.absent {
            Value::Null
        } else {
            Value::Object(Map::new())
        }
    }

    fn shape(&self, name: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Builds an object from textual values, parsing them per field shape.
    fn object<'a>(&self, values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Value {
        let map = values
            .into_iter()
            .map(|(name, raw)| {
                let value = match self.shape(name) {
                    Some(shape) => coerce(raw, &shape.format, shape.element.as_ref()),
                    None => Value::String(raw.to_string()),
                };
                (name.to_string(), value)
            })
            .collect();
        Value::Object(map)
    }
}

fn field_shapes(node: &Node) -> Vec<FieldShape> {
    if node.format != Format::Object {
        return Vec::new();
    }
    node.children
        .iter()
        .map(|child| {
            let inner = child.pointee().unwrap_or(child);
            let element = match inner.format {
                Format::Array => inner.children.first().map(|e| e.format.clone()),
                _ => None,
            };
            FieldShape {
                name: child.name.clone(),
                format: inner.format.clone(),
                element,
            }
        })
        .collect()
}

fn coerce(raw: &str, format: &Format, element: Option<&Format>) -> Value {
    match format {
        Format::Number => serde_json::from_str::<serde_json::Number>(raw)
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Format::Boolean => raw
            .parse::<bool>()
            .map(Value::Bool)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Format::Array => Value::Array(
            raw.split(',')
                .filter(|part| !part.is_empty())
                .map(|part| coerce(part, element.unwrap_or(&Format::String), None))
                .collect(),
        ),
        _ => Value::String(raw.to_string()),
    }
}

fn decode<T: DeserializeOwned>(stage: BindStage, value: Value) -> Result<T, BindError> {
    serde_json::from_value(value).map_err(|err| BindError::new(stage, err.to_string()))
}

/// Binds raw requests for one endpoint.
///
/// Built once per route; holds no per-request state.
#[derive(Debug)]
pub struct Binder<C, P, Q, B> {
    verb: Verb,
    claims: RoleShape,
    params: RoleShape,
    query: RoleShape,
    body: RoleShape,
    roles: PhantomData<fn() -> (C, P, Q, B)>,
}

impl<C, P, Q, B> Binder<C, P, Q, B>
where
    C: Describe,
    P: Describe,
    Q: Describe,
    B: Describe,
{
    /// Derives the binding shapes for an endpoint registered under `verb`.
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            claims: RoleShape::of::<C>(),
            params: RoleShape::of::<P>(),
            query: RoleShape::of::<Q>(),
            body: RoleShape::of::<B>(),
            roles: PhantomData,
        }
    }

    /// Returns true when requests must carry claims.
    pub fn requires_claims(&self) -> bool {
        self.claims.has_fields()
    }

    /// Names of the path parameters, in declaration order.
    pub fn path_param_names(&self) -> impl Iterator<Item = &str> {
        self.params.fields.iter().map(|field| field.name.as_str())
    }
}

impl<C, P, Q, B> Binder<C, P, Q, B>
where
    C: DeserializeOwned,
    P: DeserializeOwned,
    Q: DeserializeOwned,
    B: DeserializeOwned + Default,
{
    /// Binds `request`, with `claims` as extracted by the authentication layer.
    pub fn bind(
        &self,
        request: &RawRequest,
        claims: Option<C>,
    ) -> Result<EndpointInput<C, P, Q, B>, BindError> {
        self.bind_roles(request, claims).inspect_err(|err| {
            debug!(verb = %self.verb, stage = %err.stage, error = %err.message, "request.bind.failed");
        })
    }

    fn bind_roles(
        &self,
        request: &RawRequest,
        claims: Option<C>,
    ) -> Result<EndpointInput<C, P, Q, B>, BindError> {
        let claims = match claims {
            Some(claims) => claims,
            None if self.claims.has_fields() => {
                return Err(BindError::new(BindStage::Claims, "missing claims"));
            }
            None => decode(BindStage::Claims, self.claims.empty())?,
        };

        let params = if self.params.absent {
            Value::Null
        } else {
            self.params.object(self.params.fields.iter().filter_map(|field| {
                request
                    .path_params
                    .get(&field.name)
                    .map(|raw| (field.name.as_str(), raw.as_str()))
            }))
        };
        let params = decode(BindStage::Params, params)?;

        let query = if self.query.absent {
            Value::Null
        } else {
            let joined = join_query(&request.query);
            self.query
                .object(joined.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        };
        let query = decode(BindStage::Query, query)?;

        let body = self.bind_body(request)?;

        Ok(EndpointInput {
            claims,
            params,
            query,
            body,
        })
    }

    fn bind_body(&self, request: &RawRequest) -> Result<B, BindError> {
        if !self.verb.is_mutating() {
            return Ok(B::default());
        }
        if self.body.absent {
            return decode(BindStage::Body, self.body.empty());
        }

        let media_type = request
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match media_type.as_deref() {
            None | Some(JSON) => serde_json::from_slice(&request.body)
                .map_err(|err| BindError::new(BindStage::Body, err.to_string())),
            Some(FORM) => {
                let pairs: Vec<(String, String)> =
                    url::form_urlencoded::parse(&request.body).into_owned().collect();
                let value = self
                    .body
                    .object(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                decode(BindStage::Body, value)
            }
            Some(other) => Err(BindError::new(
                BindStage::ContentType,
                format!("unsupported content type \"{other}\""),
            )),
        }
    }
}

/// Query pairs with repeated keys joined by `,`, in first-seen order.
fn join_query(query: &str) -> Vec<(String, String)> {
    let mut joined: Vec<(String, String)> = Vec::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match joined.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => {
                existing.push(',');
                existing.push_str(&value);
            }
            None => joined.push((key.into_owned(), value.into_owned())),
        }
    }
    joined
}
