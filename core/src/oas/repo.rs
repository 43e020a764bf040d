#![deny(missing_docs)]

//! # Schema Repository Builder
//!
//! Turns a [`Node`] tree into a root schema plus a map of named, reusable
//! definitions.
//!
//! - Object shapes are registered under their canonical name, first wins.
//! - Object properties whose node is a pointer with one child are unwrapped
//!   and left out of `required`; every other property is required.
//! - Properties, map values and array items that are objects are emitted as
//!   `$ref`s into the repository; everything else is inlined.

use crate::oas::document::{Schema, SchemaRef};
use crate::schema::{Format, Node};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;

/// A root schema and the named definitions it refers to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRepo {
    /// Root schema, with its own title cleared.
    pub start: Schema,
    /// Named definitions keyed by canonical name.
    pub repo: BTreeMap<String, Schema>,
}

impl SchemaRepo {
    /// Unions `other`'s definitions into this repository. Existing entries are kept.
    pub fn absorb(&mut self, other: BTreeMap<String, Schema>) {
        for (name, schema) in other {
            self.repo.entry(name).or_insert(schema);
        }
    }

    /// Replaces property `property` on the root schema and on the definition
    /// registered under `name`. Schemas without that property are left alone.
    pub fn set_property(&mut self, name: &str, property: &str, schema: SchemaRef) {
        let targets = std::iter::once(&mut self.start).chain(self.repo.get_mut(name));
        for target in targets {
            if let Some(slot) = target
                .properties
                .as_mut()
                .and_then(|properties| properties.get_mut(property))
            {
                *slot = schema.clone();
            }
        }
    }

    /// The definition registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.repo.get(name)
    }

    /// Follows a component reference, or returns the inline schema.
    pub fn resolve<'a>(&'a self, schema: &'a SchemaRef) -> Option<&'a Schema> {
        match schema {
            SchemaRef::Inline(inline) => Some(inline),
            SchemaRef::Ref(_) => schema.component_name().and_then(|name| self.get(name)),
        }
    }
}

/// Builds the repository for `node`.
pub fn build_schema_repo(node: &Node) -> SchemaRepo {
    let mut builder = RepoBuilder::default();
    let mut start = builder.schema(node);
    start.title = None;
    SchemaRepo {
        start,
        repo: builder.repo,
    }
}

#[derive(Default)]
struct RepoBuilder {
    repo: BTreeMap<String, Schema>,
}

impl RepoBuilder {
    fn schema(&mut self, node: &Node) -> Schema {
        let mut schema = Schema {
            format: non_empty(&node.type_name),
            description: non_empty(&node.description),
            example: example_value(node),
            ..Schema::default()
        };

        match &node.format {
            Format::String | Format::Number | Format::Boolean => {
                schema.schema_type = Some(node.format.to_string());
            }
            Format::Object => {
                let mut properties = IndexMap::with_capacity(node.children.len());
                for child in &node.children {
                    let property = match child.pointee() {
                        Some(inner) => unwrap_pointer(child, inner),
                        None => {
                            schema.required.push(child.name.clone());
                            child.clone()
                        }
                    };
                    properties.insert(child.name.clone(), self.reference(&property));
                }
                let name = node.canonical_name();
                schema.schema_type = Some("object".to_string());
                schema.title = Some(name.clone());
                schema.properties = Some(properties);
                self.repo.entry(name).or_insert_with(|| schema.clone());
            }
            Format::Array => {
                schema.schema_type = Some("array".to_string());
                schema.items = node
                    .children
                    .first()
                    .map(|element| Box::new(self.element(element)));
            }
            Format::Map => {
                schema.schema_type = Some("object".to_string());
                schema.additional_properties = node
                    .children
                    .first()
                    .map(|value| Box::new(self.reference(value)));
            }
            Format::Pointer => {
                let mut pointee = match node.pointee() {
                    Some(inner) => self.schema(&unwrap_pointer(node, inner)),
                    None => Schema::default(),
                };
                pointee.nullable = true;
                return pointee;
            }
            Format::Any => {}
            Format::Other(tag) => {
                schema.schema_type = node.inferred.as_ref().and_then(json_type);
                schema.format = Some(tag.clone());
            }
        }

        schema
    }

    /// Property and map value position: objects by reference.
    fn reference(&mut self, node: &Node) -> SchemaRef {
        let schema = self.schema(node);
        if node.format == Format::Object {
            SchemaRef::component(&node.canonical_name())
        } else {
            schema.into()
        }
    }

    /// Array item position: objects and named arrays by reference.
    fn element(&mut self, node: &Node) -> SchemaRef {
        let schema = self.schema(node);
        let name = node.canonical_name();
        match node.format {
            Format::Object => SchemaRef::component(&name),
            Format::Array if !name.is_empty() => {
                self.repo.entry(name.clone()).or_insert(schema);
                SchemaRef::component(&name)
            }
            _ => schema.into(),
        }
    }
}

/// The pointee standing in for its pointer, carrying the field's name and annotations.
fn unwrap_pointer(pointer: &Node, inner: &Node) -> Node {
    let mut unwrapped = inner.clone();
    unwrapped.name = pointer.name.clone();
    if !pointer.description.is_empty() {
        unwrapped.description = pointer.description.clone();
    }
    if !pointer.example.is_empty() {
        unwrapped.example = pointer.example.clone();
    }
    unwrapped
}

/// JSON Schema `type` of an inferred kind.
fn json_type(format: &Format) -> Option<String> {
    match format {
        Format::String | Format::Number | Format::Boolean => Some(format.to_string()),
        Format::Object | Format::Map => Some("object".to_string()),
        Format::Array => Some("array".to_string()),
        Format::Pointer | Format::Any | Format::Other(_) => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Numeric and boolean examples are emitted as JSON literals when they parse.
fn example_value(node: &Node) -> Option<Value> {
    if node.example.is_empty() {
        return None;
    }
    let literal = match node.format {
        Format::Number | Format::Boolean => serde_json::from_str(&node.example).ok(),
        _ => None,
    };
    Some(literal.unwrap_or_else(|| Value::String(node.example.clone())))
}
