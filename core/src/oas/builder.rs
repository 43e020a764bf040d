#![deny(missing_docs)]

//! # Document Builder
//!
//! [`ApiDoc`] owns the document being assembled. It is created once per
//! documentation build, receives every endpoint registration, and is read
//! only afterwards.

use crate::envelope::ResponseData;
use crate::error::{AppError, AppResult};
use crate::oas::compiler::{compile_route, OperationFragment, RouteDescription};
use crate::oas::document::{Document, Operation, PathItem, SecurityScheme, Server, Tag};
use crate::oas::routes::{Endpoint, Verb};
use crate::schema::Describe;
use std::collections::BTreeMap;
use tracing::debug;

/// Builder for an OpenAPI document.
#[derive(Debug, Clone)]
pub struct ApiDoc {
    document: Document,
    bearer_scheme: Option<String>,
}

impl ApiDoc {
    /// A document with `title` and `version` and nothing else.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            document: Document::new(title, version),
            bearer_scheme: None,
        }
    }

    /// Sets the API description.
    pub fn describe(&mut self, description: impl Into<String>) -> &mut Self {
        self.document.info.description = Some(description.into());
        self
    }

    /// Adds a server.
    pub fn add_server(&mut self, url: impl Into<String>, description: impl Into<String>) -> &mut Self {
        let description = description.into();
        self.document.servers.push(Server {
            url: url.into(),
            description: (!description.is_empty()).then_some(description),
        });
        self
    }

    /// Registers a JWT bearer scheme under `name`.
    ///
    /// Routes registered afterwards whose claims type has fields require it.
    pub fn add_jwt_bearer_auth(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.document
            .components
            .security_schemes
            .insert(name.clone(), SecurityScheme::jwt_bearer());
        self.bearer_scheme = Some(name);
        self
    }

    /// Describes an untagged route.
    pub fn route(&self, title: impl Into<String>, description: impl Into<String>) -> RouteDescription {
        RouteDescription::new(title, description)
    }

    /// Declares a tag. Routes described through the returned group carry it.
    pub fn route_group(&mut self, name: impl Into<String>, description: &[&str]) -> AppResult<RouteGroup> {
        let name = name.into();
        if self.document.tags.iter().any(|tag| tag.name == name) {
            return Err(AppError::DuplicateTag(name));
        }
        self.document.tags.push(Tag {
            name: name.clone(),
            description: (!description.is_empty()).then(|| description.join(" ")),
        });
        Ok(RouteGroup { tag: name })
    }

    /// Compiles an endpoint and merges it into the document.
    pub fn register<C, P, Q, B, D>(
        &mut self,
        endpoint: &Endpoint,
        route: RouteDescription,
    ) -> AppResult<&mut Self>
    where
        C: Describe + ?Sized,
        P: Describe + ?Sized,
        Q: Describe + ?Sized,
        B: Describe + ?Sized,
        D: ResponseData,
    {
        let fragment = compile_route::<C, P, Q, B, D>(endpoint, &route)?;
        self.merge(fragment)?;
        Ok(self)
    }

    /// Merges a compiled operation.
    ///
    /// Schemas are unioned by name, existing entries kept. The operation
    /// joins any others already registered on the same path.
    pub fn merge(&mut self, fragment: OperationFragment) -> AppResult<()> {
        let OperationFragment {
            path,
            verb,
            mut operation,
            schemas,
            requires_claims,
        } = fragment;

        let item = self.document.paths.entry(path.clone()).or_default();
        let slot = operation_slot(item, verb);
        if slot.is_some() {
            return Err(AppError::DuplicateOperation { verb, path });
        }

        if requires_claims {
            if let Some(scheme) = &self.bearer_scheme {
                operation
                    .security
                    .push(BTreeMap::from([(scheme.clone(), Vec::new())]));
            }
        }
        *slot = Some(operation);

        let known = &mut self.document.components.schemas;
        let before = known.len();
        for (name, schema) in schemas {
            known.entry(name).or_insert(schema);
        }
        debug!(verb = %verb, path = %path, added = known.len() - before, "route.merged");
        Ok(())
    }

    /// The document so far.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Finishes the build.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    /// YAML.
    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(&self.document)?)
    }
}

fn operation_slot(item: &mut PathItem, verb: Verb) -> &mut Option<Operation> {
    match verb {
        Verb::Get => &mut item.get,
        Verb::Post => &mut item.post,
        Verb::Put => &mut item.put,
        Verb::Patch => &mut item.patch,
        Verb::Delete => &mut item.delete,
    }
}

/// Routes sharing a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroup {
    tag: String,
}

impl RouteGroup {
    /// The group's tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Describes a route tagged with this group.
    pub fn route(&self, title: impl Into<String>, description: impl Into<String>) -> RouteDescription {
        RouteDescription {
            tag: Some(self.tag.clone()),
            ..RouteDescription::new(title, description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::DataDetail;
    use crate::schema::{WalkResult, Walker};

    struct Claims;

    impl Describe for Claims {
        fn describe(walker: &mut Walker) -> WalkResult {
            walker.object::<Self>(|o| {
                o.field::<String>("sub");
            })
        }
    }

    #[test]
    fn test_verbs_share_a_path_item() {
        let mut doc = ApiDoc::new("Docs", "1");
        let route = doc.route("a", "");
        doc.register::<(), (), (), (), DataDetail>(&Endpoint::get("/things"), route.clone())
            .unwrap()
            .register::<(), (), (), (), DataDetail>(&Endpoint::post("/things"), route)
            .unwrap();

        let item = &doc.document().paths["/things"];
        assert!(item.get.is_some());
        assert!(item.post.is_some());
        assert_eq!(doc.document().paths.len(), 1);
    }

    #[test]
    fn test_same_verb_twice_is_fatal() {
        let mut doc = ApiDoc::new("Docs", "1");
        let route = doc.route("a", "");
        doc.register::<(), (), (), (), DataDetail>(&Endpoint::get("/things"), route.clone())
            .unwrap();
        let err = doc
            .register::<(), (), (), (), DataDetail>(&Endpoint::get("/things"), route)
            .unwrap_err();
        assert_eq!(err.to_string(), "operation GET /things is already registered");
    }

    #[test]
    fn test_route_groups_tag_operations() {
        let mut doc = ApiDoc::new("Docs", "1");
        let group = doc.route_group("things", &["All", "things"]).unwrap();
        assert_eq!(group.tag(), "things");
        assert!(matches!(
            doc.route_group("things", &[]),
            Err(AppError::DuplicateTag(_))
        ));

        doc.register::<(), (), (), (), DataDetail>(&Endpoint::get("/things"), group.route("List", ""))
            .unwrap();
        let op = doc.document().paths["/things"].get.as_ref().unwrap();
        assert_eq!(op.tags, vec!["things".to_string()]);
        assert_eq!(doc.document().tags[0].description.as_deref(), Some("All things"));
    }

    #[test]
    fn test_bearer_security_follows_claims() {
        let mut doc = ApiDoc::new("Docs", "1");
        doc.add_jwt_bearer_auth("bearerAuth");
        doc.register::<Claims, (), (), (), DataDetail>(&Endpoint::get("/me"), doc.route("Me", ""))
            .unwrap()
            .register::<(), (), (), (), DataDetail>(&Endpoint::get("/open"), RouteDescription::default())
            .unwrap();

        let paths = &doc.document().paths;
        let secured = paths["/me"].get.as_ref().unwrap();
        assert_eq!(
            secured.security,
            vec![BTreeMap::from([("bearerAuth".to_string(), Vec::new())])]
        );
        assert!(paths["/open"].get.as_ref().unwrap().security.is_empty());

        let scheme = &doc.document().components.security_schemes["bearerAuth"];
        assert_eq!(scheme.bearer_format.as_deref(), Some("JWT"));
    }

    #[test]
    fn test_yaml_and_json_output() {
        let mut doc = ApiDoc::new("Docs", "1");
        doc.describe("An API").add_server("https://api.example.com", "");
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"url\": \"https://api.example.com\""));
        let yaml = doc.to_yaml().unwrap();
        assert!(yaml.contains("title: Docs"));
        assert!(yaml.contains("description: An API"));
    }
}
