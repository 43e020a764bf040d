//! # Type Schema Walker
//!
//! Recursive introspection driven by the [`Describe`] capability. Each type
//! states its own shape; the walker threads the visited-type stack through
//! the recursion and turns failures into placeholder nodes so a single bad
//! position never aborts a whole description.

use crate::oas::repo::SchemaRepo;
use crate::schema::marshal::{resolve, Marshal};
use crate::schema::node::{bare_name, Format, Node};
use derive_more::Display;
use std::any::type_name;
use tracing::warn;

/// Outcome of describing a single type. `Ok(None)` is the absent node.
pub type WalkResult = Result<Option<Node>, WalkError>;

/// A failure while describing one position of a type graph.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum WalkError {
    /// The type is already being described further up the stack.
    #[display("type `{_0}` refers back to itself")]
    Recursive(String),
    /// A describer gave up on its type.
    #[display("cannot describe `{_0}`: {_1}")]
    Unsupported(String, String),
}

impl std::error::Error for WalkError {}

/// Types that can state their own schema shape.
pub trait Describe {
    /// Describes `Self`, recursing through `walker` for nested types.
    fn describe(walker: &mut Walker) -> WalkResult;

    /// A hand-authored schema preferred over the described shape.
    ///
    /// Consulted for response payloads and for the item of
    /// [`SingleItemData`](crate::envelope::SingleItemData).
    fn self_schema() -> Option<SchemaRepo> {
        None
    }
}

/// Describes `T` from scratch.
///
/// Returns `None` for types with no documentable shape (`()`, `PhantomData`).
pub fn get_schema<T: Describe + ?Sized>() -> Option<Node> {
    Walker::new().walk::<T>()
}

/// Recursion state for a single description.
#[derive(Debug, Default)]
pub struct Walker {
    active: Vec<&'static str>,
}

impl Walker {
    /// Creates a walker with nothing in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Describes `T`, substituting the placeholder node on failure.
    pub fn walk<T: Describe + ?Sized>(&mut self) -> Option<Node> {
        match T::describe(self) {
            Ok(node) => node,
            Err(err) => {
                warn!(ty = type_name::<T>(), error = %err, "schema.walk.placeholder");
                Some(Node::placeholder())
            }
        }
    }

    /// Builds an object node for `T` from the fields registered by `fields`.
    ///
    /// Fails with [`WalkError::Recursive`] when `T` is already being described.
    pub fn object<T: ?Sized>(&mut self, fields: impl FnOnce(&mut Fields<'_>)) -> WalkResult {
        let key = type_name::<T>();
        if self.active.contains(&key) {
            return Err(WalkError::Recursive(key.to_string()));
        }

        self.active.push(key);
        let mut collected = Fields {
            walker: &mut *self,
            children: Vec::new(),
        };
        fields(&mut collected);
        let Fields { children, .. } = collected;
        self.active.pop();

        Ok(Some(Node {
            children,
            ..Node::of::<T>(Format::Object)
        }))
    }

    /// Describes `T` by sampling its serialized output.
    pub fn marshaled<T: Marshal>(&mut self) -> WalkResult {
        let mut sample = T::sample();
        Ok(Some(resolve(Some(&mut sample))))
    }
}

/// Field collector handed to [`Walker::object`].
#[derive(Debug)]
pub struct Fields<'w> {
    walker: &'w mut Walker,
    children: Vec<Node>,
}

impl Fields<'_> {
    /// Adds a field of type `F`. Skipped fields and absent shapes add nothing.
    pub fn field<F: Describe + ?Sized>(&mut self, field: impl Into<Field>) -> &mut Self {
        let field = field.into();
        if field.skip {
            return self;
        }
        if let Some(mut node) = self.walker.walk::<F>() {
            if node.name.is_empty() {
                node.name = field.serialized_name().to_string();
            }
            field.annotate(&mut node);
            self.children.push(node);
        }
        self
    }

    /// Adds an embedded `F` as an ordinary child named after its bare type name.
    pub fn embed<F: Describe + ?Sized>(&mut self) -> &mut Self {
        self.field::<F>(Field::new(bare_name::<F>()))
    }
}

/// Declaration of a single object field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    declared: String,
    rename: Option<String>,
    skip: bool,
    description: Option<String>,
    example: Option<String>,
    format: Option<String>,
}

impl Field {
    /// A field known by its declared name.
    pub fn new(declared: impl Into<String>) -> Self {
        Self {
            declared: declared.into(),
            ..Self::default()
        }
    }

    /// Serialized name; ignored unless it is a valid tag name.
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into().trim().to_string());
        self
    }

    /// Leaves the field out of the description.
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Overrides the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the example.
    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Overrides the inferred format tag.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Name the field is serialized under.
    pub fn serialized_name(&self) -> &str {
        match &self.rename {
            Some(name) if is_valid_tag(name) => name,
            _ => &self.declared,
        }
    }

    fn annotate(&self, node: &mut Node) {
        if let Some(description) = non_blank(&self.description) {
            node.description = description.to_string();
        }
        if let Some(example) = non_blank(&self.example) {
            node.example = example.to_string();
        }
        if let Some(format) = non_blank(&self.format) {
            // Optional fields carry the tag on their pointee.
            let target = if node.pointee().is_some() {
                &mut node.children[0]
            } else {
                node
            };
            let previous = std::mem::replace(&mut target.format, Format::from(format));
            if matches!(target.format, Format::Other(_)) {
                target.inferred = Some(previous);
            }
        }
    }
}

impl From<&str> for Field {
    fn from(declared: &str) -> Self {
        Field::new(declared)
    }
}

impl From<String> for Field {
    fn from(declared: String) -> Self {
        Field::new(declared)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Reports whether `name` is usable as a serialized field name.
///
/// Letters, digits and most punctuation are allowed; quotes, backslashes and
/// commas are not.
pub fn is_valid_tag(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    name.chars().all(|c| {
        "!#$%&()*+-./:;<=>?@[]^_{|}~ ".contains(c) || c.is_alphabetic() || c.is_numeric()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Describe for Broken {
        fn describe(_: &mut Walker) -> WalkResult {
            Err(WalkError::Unsupported(
                "Broken".into(),
                "no stable wire shape".into(),
            ))
        }
    }

    struct Holder;

    impl Describe for Holder {
        fn describe(walker: &mut Walker) -> WalkResult {
            walker.object::<Self>(|o| {
                o.field::<String>(Field::new("Title").rename("title"))
                    .field::<Broken>("Payload")
                    .field::<i32>(Field::new("Hidden").skip())
                    .field::<()>("Nothing")
                    .field::<bool>(
                        Field::new("Flag")
                            .rename("bad,name")
                            .description("  a flag ")
                            .example("true"),
                    );
            })
        }
    }

    struct Tree;

    impl Describe for Tree {
        fn describe(walker: &mut Walker) -> WalkResult {
            walker.object::<Self>(|o| {
                o.field::<String>("Label").field::<Vec<Tree>>("Children");
            })
        }
    }

    #[test]
    fn test_failed_field_becomes_placeholder() {
        let node = get_schema::<Holder>().unwrap();
        let names: Vec<_> = node.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["title", "Payload", "Flag"]);

        let payload = &node.children[1];
        assert!(payload.is_placeholder());
        assert_eq!(payload.format, Format::Any);

        let flag = &node.children[2];
        assert_eq!(flag.description, "a flag");
        assert_eq!(flag.example, "true");
        assert_eq!(flag.format, Format::Boolean);
    }

    #[test]
    fn test_recursive_type_terminates() {
        let node = get_schema::<Tree>().unwrap();
        let children = &node.children[1];
        assert_eq!(children.format, Format::Array);
        assert!(children.children[0].is_placeholder());
    }

    #[test]
    fn test_format_override() {
        struct Stamp;
        impl Describe for Stamp {
            fn describe(walker: &mut Walker) -> WalkResult {
                walker.object::<Self>(|o| {
                    o.field::<String>(Field::new("At").format("date-time"));
                })
            }
        }
        let node = get_schema::<Stamp>().unwrap();
        assert_eq!(node.children[0].format, Format::Other("date-time".into()));
        assert_eq!(node.children[0].inferred, Some(Format::String));

        struct MaybeStamp;
        impl Describe for MaybeStamp {
            fn describe(walker: &mut Walker) -> WalkResult {
                walker.object::<Self>(|o| {
                    o.field::<Option<String>>(Field::new("At").format("date-time"));
                })
            }
        }
        let node = get_schema::<MaybeStamp>().unwrap();
        let pointee = node.children[0].pointee().unwrap();
        assert_eq!(pointee.format, Format::Other("date-time".into()));
        assert_eq!(pointee.inferred, Some(Format::String));
    }

    #[test]
    fn test_tag_validity() {
        assert!(is_valid_tag("some_value"));
        assert!(is_valid_tag("x-rate.limit"));
        assert!(!is_valid_tag(""));
        assert!(!is_valid_tag("with,comma"));
        assert!(!is_valid_tag("quo\"te"));
    }
}
