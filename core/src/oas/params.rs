#![deny(missing_docs)]

//! # Parameter Compilation
//!
//! Turns an object-shaped type into one OpenAPI parameter per property.

use crate::error::{AppError, AppResult};
use crate::oas::document::{Parameter, ParameterIn, Schema};
use crate::oas::repo::build_schema_repo;
use crate::schema::{get_schema, Describe, Format};
use std::collections::BTreeMap;

/// Parameters derived from one type, plus the definitions they refer to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledParams {
    /// One parameter per property, in declaration order.
    pub parameters: Vec<Parameter>,
    /// Named definitions referenced by the parameter schemas.
    pub schemas: BTreeMap<String, Schema>,
}

impl CompiledParams {
    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }
}

/// Compiles the properties of `T` into parameters bound from `location`.
///
/// An absent shape yields no parameters; any other non-object shape is an error.
pub fn make_params<T: Describe + ?Sized>(location: ParameterIn) -> AppResult<CompiledParams> {
    let Some(node) = get_schema::<T>() else {
        return Ok(CompiledParams::default());
    };
    if node.format != Format::Object {
        return Err(AppError::ParamsNotObject {
            location,
            found: node.format.to_string(),
        });
    }

    let repo = build_schema_repo(&node);
    let required = &repo.start.required;
    let parameters = repo
        .start
        .properties
        .iter()
        .flatten()
        .map(|(name, schema)| Parameter {
            name: name.clone(),
            location,
            description: repo.resolve(schema).and_then(|s| s.description.clone()),
            required: required.contains(name),
            schema: schema.clone(),
        })
        .collect();

    Ok(CompiledParams {
        parameters,
        schemas: repo.repo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, WalkResult, Walker};

    struct Paging;

    impl Describe for Paging {
        fn describe(walker: &mut Walker) -> WalkResult {
            walker.object::<Self>(|o| {
                o.field::<u32>(Field::new("page").description("page to fetch"))
                    .field::<Option<String>>("sort");
            })
        }
    }

    #[test]
    fn test_params_from_object() {
        let compiled = make_params::<Paging>(ParameterIn::Query).unwrap();
        assert_eq!(compiled.names().collect::<Vec<_>>(), vec!["page", "sort"]);

        let page = &compiled.parameters[0];
        assert_eq!(page.location, ParameterIn::Query);
        assert!(page.required);
        assert_eq!(page.description.as_deref(), Some("page to fetch"));
        assert!(!compiled.parameters[1].required);
        assert_eq!(compiled.schemas.len(), 1);
    }

    #[test]
    fn test_absent_shape_has_no_params() {
        let compiled = make_params::<()>(ParameterIn::Path).unwrap();
        assert!(compiled.parameters.is_empty());
        assert!(compiled.schemas.is_empty());
    }

    #[test]
    fn test_scalar_shape_is_rejected() {
        let err = make_params::<String>(ParameterIn::Path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "path parameter's type must be an object, is \"string\""
        );
    }
}
