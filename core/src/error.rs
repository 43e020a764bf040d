//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every variant besides the wrappers is a registration-time configuration
//! error: it is raised while an endpoint is being documented, before the
//! service accepts traffic, and is meant to stop the process from starting.

use crate::oas::document::ParameterIn;
use crate::oas::routes::Verb;
use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for JSON serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// Wrapper for YAML serialization errors.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// A parameter type did not describe an object.
    #[from(ignore)]
    #[display("{location} parameter's type must be an object, is \"{found}\"")]
    ParamsNotObject {
        /// Where the parameters were meant to bind.
        location: ParameterIn,
        /// The schema type that was produced instead.
        found: String,
    },

    /// A declared path parameter has no `{name}` placeholder in the route.
    #[from(ignore)]
    #[display("declared path parameter \"{param}\" needs to be defined as a path parameter in \"{path}\"")]
    MissingPathPlaceholder {
        /// Parameter name.
        param: String,
        /// Route path template.
        path: String,
    },

    /// The response schema came out empty.
    #[from(ignore)]
    #[display("empty schema for response of {verb} {path}")]
    EmptyResponseSchema {
        /// HTTP verb of the route.
        verb: Verb,
        /// Route path template.
        path: String,
    },

    /// The same verb was registered twice on one path.
    #[from(ignore)]
    #[display("operation {verb} {path} is already registered")]
    DuplicateOperation {
        /// HTTP verb of the route.
        verb: Verb,
        /// Route path template.
        path: String,
    },

    /// A route group tag was declared twice.
    #[from(ignore)]
    #[display("tag already exists: {_0}")]
    DuplicateTag(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        // Test that String defaults to General, not DuplicateTag
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_placeholder_message() {
        let app_err = AppError::MissingPathPlaceholder {
            param: "id".into(),
            path: "/users".into(),
        };
        assert_eq!(
            app_err.to_string(),
            "declared path parameter \"id\" needs to be defined as a path parameter in \"/users\""
        );
    }

    #[test]
    fn test_params_not_object_message() {
        let app_err = AppError::ParamsNotObject {
            location: ParameterIn::Path,
            found: "string".into(),
        };
        assert_eq!(
            app_err.to_string(),
            "path parameter's type must be an object, is \"string\""
        );
    }
}
