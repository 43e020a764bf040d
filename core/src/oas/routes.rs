#![deny(missing_docs)]

//! # Route Declarations
//!
//! HTTP verbs, endpoint declarations and path template helpers.

use crate::error::{AppError, AppResult};
use derive_more::Display;
use regex::Regex;
use std::sync::OnceLock;

/// HTTP verbs an endpoint can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Verb {
    /// `GET`
    #[display("GET")]
    Get,
    /// `POST`
    #[display("POST")]
    Post,
    /// `PUT`
    #[display("PUT")]
    Put,
    /// `PATCH`
    #[display("PATCH")]
    Patch,
    /// `DELETE`
    #[display("DELETE")]
    Delete,
}

impl Verb {
    /// Returns true for verbs whose requests carry a body.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Verb::Get)
    }
}

/// A verb bound to a router path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// HTTP verb.
    pub verb: Verb,
    /// Path as written for the router, `:name` or `{name}` placeholders.
    pub path: String,
}

impl Endpoint {
    /// An endpoint for `verb` at `path`.
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
        }
    }

    /// `GET path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Verb::Get, path)
    }

    /// `POST path`
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Verb::Post, path)
    }

    /// `PUT path`
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Verb::Put, path)
    }

    /// `PATCH path`
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Verb::Patch, path)
    }

    /// `DELETE path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Verb::Delete, path)
    }

    /// The path in `{name}` template form.
    pub fn openapi_path(&self) -> String {
        router_path_to_openapi_path(&self.path)
    }
}

/// Rewrites router placeholders into template form: `:param` -> `{param}`.
///
/// Only simple `:name` segments are handled; an escaped `\:` is left as is.
pub fn router_path_to_openapi_path(path: &str) -> String {
    static ROUTER_PARAM_RE: OnceLock<Regex> = OnceLock::new();
    let router_param_re = ROUTER_PARAM_RE
        .get_or_init(|| Regex::new(r"(^|[^\\]):(\w+)").expect("Invalid regex"));

    router_param_re.replace_all(path, "$1{$2}").into_owned()
}

/// Checks that `path` contains a `{param}` placeholder.
pub fn validate_path_param_var(path: &str, param: &str) -> AppResult<()> {
    if path.contains(&format!("{{{param}}}")) {
        Ok(())
    } else {
        Err(AppError::MissingPathPlaceholder {
            param: param.to_string(),
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_path_translation() {
        assert_eq!(
            router_path_to_openapi_path("/api/endpoint/:id"),
            "/api/endpoint/{id}"
        );
        assert_eq!(
            router_path_to_openapi_path("/orgs/:org/users/:user_id"),
            "/orgs/{org}/users/{user_id}"
        );
        assert_eq!(router_path_to_openapi_path(":id"), "{id}");
        assert_eq!(router_path_to_openapi_path("/time/10\\:30"), "/time/10\\:30");
        assert_eq!(
            router_path_to_openapi_path("/api/endpoint/{id}"),
            "/api/endpoint/{id}"
        );
    }

    #[test]
    fn test_validate_path_param_var() {
        assert!(validate_path_param_var("/users/{id}", "id").is_ok());
        let err = validate_path_param_var("/users/{user_id}", "id").unwrap_err();
        assert!(matches!(err, AppError::MissingPathPlaceholder { .. }));
    }

    #[test]
    fn test_verbs() {
        assert_eq!(Verb::Patch.to_string(), "PATCH");
        assert!(!Verb::Get.is_mutating());
        assert!(Verb::Delete.is_mutating());
        let endpoint = Endpoint::post("/items/:id");
        assert_eq!(endpoint.verb, Verb::Post);
        assert_eq!(endpoint.openapi_path(), "/items/{id}");
    }
}
