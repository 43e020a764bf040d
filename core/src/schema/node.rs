//! # Schema Nodes
//!
//! The shape-description tree produced by the walker. A node is pure data:
//! it is built fresh for each queried type and never mutated once returned.

use derive_more::Display;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// `type_name` given to the placeholder that replaces a failed walk.
pub const PLACEHOLDER_TYPE: &str = "panic";

/// `type_name` given to maps whose keys are not strings.
pub const NON_STRING_KEYS_TYPE: &str = "non-string-keys-map";

/// Semantic kind tag of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Display)]
pub enum Format {
    /// Textual scalar.
    #[display("string")]
    String,
    /// Any integer, float or complex scalar.
    #[display("number")]
    Number,
    /// Boolean scalar.
    #[display("boolean")]
    Boolean,
    /// Composite with one child per field.
    #[display("object")]
    Object,
    /// Sequence with one child describing the element.
    #[display("array")]
    Array,
    /// String-keyed map with one child describing the value.
    #[display("map")]
    Map,
    /// Optional wrapper with one child describing the pointee.
    #[display("pointer")]
    Pointer,
    /// Undocumented shape.
    #[default]
    #[display("any")]
    Any,
    /// Pass-through value supplied by a `format` annotation.
    #[display("{_0}")]
    Other(String),
}

impl From<&str> for Format {
    fn from(tag: &str) -> Self {
        match tag {
            "string" => Format::String,
            "number" => Format::Number,
            "boolean" => Format::Boolean,
            "object" => Format::Object,
            "array" => Format::Array,
            "map" => Format::Map,
            "pointer" => Format::Pointer,
            "any" => Format::Any,
            other => Format::Other(other.to_string()),
        }
    }
}

impl From<String> for Format {
    fn from(tag: String) -> Self {
        Format::from(tag.as_str())
    }
}

impl From<Format> for String {
    fn from(format: Format) -> Self {
        format.to_string()
    }
}

impl Serialize for Format {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Format {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Format::from)
    }
}

/// A position in a type graph.
///
/// Serializes with the interchange field names (`Package`, `Type`, `Format`,
/// `Name`, `Description`, `Example`, `Children`) used by snapshot tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    /// Module path of the described type, empty for primitives and anonymous containers.
    pub package: String,
    /// Declared type name, generic arguments included.
    #[serde(rename = "Type")]
    pub type_name: String,
    /// Kind tag.
    pub format: Format,
    /// Serialized field name when the node is a field.
    pub name: String,
    /// Field annotation.
    pub description: String,
    /// Field annotation.
    pub example: String,
    /// Pointee, element or value for wrappers; fields for objects.
    pub children: Vec<Node>,
    /// Full `std::any::type_name` of the described type, generic argument
    /// paths included. Empty for nodes built without a Rust type.
    #[serde(skip)]
    pub qualified: String,
    /// Kind inferred before a `format` annotation replaced it.
    #[serde(skip)]
    pub inferred: Option<Format>,
}

impl Node {
    /// A childless node with an explicit origin.
    pub fn leaf(package: impl Into<String>, type_name: impl Into<String>, format: Format) -> Self {
        Self {
            package: package.into(),
            type_name: type_name.into(),
            format,
            ..Self::default()
        }
    }

    /// A childless node whose origin is the Rust type `T`.
    pub fn of<T: ?Sized>(format: Format) -> Self {
        let (package, type_name) = origin::<T>();
        Self {
            qualified: std::any::type_name::<T>().to_string(),
            ..Self::leaf(package, type_name, format)
        }
    }

    /// An anonymous wrapper (`array`, `map`, `pointer`) around an optional child.
    ///
    /// An absent child leaves the wrapper childless, which downstream code
    /// reads as "undocumented".
    pub fn wrapping(format: Format, child: Option<Node>) -> Self {
        Self {
            format,
            children: child.into_iter().collect(),
            ..Self::default()
        }
    }

    /// The node substituted for a position whose description failed.
    pub fn placeholder() -> Self {
        Self::leaf("", PLACEHOLDER_TYPE, Format::Any)
    }

    /// Returns true for the placeholder produced by a failed walk.
    pub fn is_placeholder(&self) -> bool {
        self.format == Format::Any && self.type_name == PLACEHOLDER_TYPE
    }

    /// The wrapped shape when this node is a pointer with exactly one child.
    pub fn pointee(&self) -> Option<&Node> {
        match (&self.format, self.children.as_slice()) {
            (Format::Pointer, [inner]) => Some(inner),
            _ => None,
        }
    }

    /// Deterministic key for this node in a schema repository.
    ///
    /// Joins the words of the qualified type path with `_`, so generic
    /// arguments keep their module paths. Nodes without a qualified path use
    /// the package and type name; the field name stands in when the type name
    /// is empty.
    pub fn canonical_name(&self) -> String {
        if !self.qualified.is_empty() {
            return words(&self.qualified).collect::<Vec<_>>().join("_");
        }
        let declared = if self.type_name.is_empty() {
            &self.name
        } else {
            &self.type_name
        };
        words(&self.package)
            .chain(words(declared))
            .collect::<Vec<_>>()
            .join("_")
    }
}

fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
}

/// Splits `std::any::type_name::<T>()` into `(package, type_name)`.
///
/// `a::b::Wrapper<c::Inner<alloc::string::String>>` becomes
/// `("a::b", "Wrapper<Inner<String>>")`.
pub fn origin<T: ?Sized>() -> (String, String) {
    split_type_name(std::any::type_name::<T>())
}

/// Bare declared name of `T`, without module path or generic arguments.
pub fn bare_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = &full[..base_end(full)];
    base.rsplit("::").next().unwrap_or(base).to_string()
}

fn base_end(full: &str) -> usize {
    full.find(['<', '(', '[', ' ', '&', ';'])
        .unwrap_or(full.len())
}

fn split_type_name(full: &str) -> (String, String) {
    static PATH_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
    let path_prefix_re =
        PATH_PREFIX_RE.get_or_init(|| Regex::new(r"(?:\w+::)+").expect("Invalid regex"));

    let end = base_end(full);
    let (base, generics) = full.split_at(end);
    let (package, declared) = match base.rsplit_once("::") {
        Some((package, declared)) => (package, declared),
        None => ("", base),
    };
    let generics = path_prefix_re.replace_all(generics, "");
    (package.to_string(), format!("{declared}{generics}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Local;

    mod north {
        pub struct Item;
    }

    mod south {
        pub struct Item;
    }

    struct Wrapper<T>(T);

    #[test]
    fn test_split_generic_type_name() {
        let (package, type_name) = split_type_name(
            "apiculi_core::envelope::DataResponse<apiculi_core::envelope::SingleItemData<alloc::string::String>>",
        );
        assert_eq!(package, "apiculi_core::envelope");
        assert_eq!(type_name, "DataResponse<SingleItemData<String>>");
    }

    #[test]
    fn test_split_primitive() {
        assert_eq!(split_type_name("i64"), (String::new(), "i64".to_string()));
    }

    #[test]
    fn test_origin_of_local_type() {
        let (package, type_name) = origin::<Local>();
        assert_eq!(package, "apiculi_core::schema::node::tests");
        assert_eq!(type_name, "Local");
        assert_eq!(bare_name::<Vec<Local>>(), "Vec");
    }

    #[test]
    fn test_canonical_name() {
        let node = Node::leaf(
            "apiculi_core::envelope",
            "DataResponse<SingleItemData<String>>",
            Format::Object,
        );
        assert_eq!(
            node.canonical_name(),
            "apiculi_core_envelope_DataResponse_SingleItemData_String"
        );

        let anonymous = Node {
            name: "Props".into(),
            ..Node::default()
        };
        assert_eq!(anonymous.canonical_name(), "Props");
    }

    #[test]
    fn test_canonical_name_keeps_generic_argument_paths() {
        let north = Node::of::<Wrapper<north::Item>>(Format::Object);
        let south = Node::of::<Wrapper<south::Item>>(Format::Object);
        assert_eq!(north.type_name, south.type_name);
        assert_eq!(north.type_name, "Wrapper<Item>");
        assert_eq!(
            north.canonical_name(),
            "apiculi_core_schema_node_tests_Wrapper_apiculi_core_schema_node_tests_north_Item"
        );
        assert_ne!(north.canonical_name(), south.canonical_name());
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(Format::from("map"), Format::Map);
        assert_eq!(Format::from("date-time"), Format::Other("date-time".into()));
        assert_eq!(Format::Other("uuid".into()).to_string(), "uuid");
        assert_eq!(
            serde_json::to_string(&Format::Boolean).unwrap(),
            "\"boolean\""
        );
    }

    #[test]
    fn test_interchange_field_names() {
        let node = Node::leaf("", "String", Format::String);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Package": "",
                "Type": "String",
                "Format": "string",
                "Name": "",
                "Description": "",
                "Example": "",
                "Children": []
            })
        );
    }

    #[test]
    fn test_pointee() {
        let inner = Node::leaf("", "String", Format::String);
        let pointer = Node::wrapping(Format::Pointer, Some(inner.clone()));
        assert_eq!(pointer.pointee(), Some(&inner));
        assert!(Node::wrapping(Format::Pointer, None).pointee().is_none());
        assert!(Node::placeholder().is_placeholder());
    }
}
