//! # Marshaler-Aware Leaf Resolver
//!
//! Types with their own `Serialize` impl may put something on the wire that
//! looks nothing like their fields. Rather than walking those fields, the
//! resolver serializes a live value and classifies the output.
//!
//! Classification sniffs the serialized text by its leading and trailing
//! characters. It is an approximation, not a parser: an array whose first
//! element is negative (`[-1,2]`) is reported as an array of unknown items.

use crate::schema::node::{Format, Node};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

/// The literal a serializer emits for an absent value.
const NULL: &str = "null";

/// Types described by sampling their serialized form.
pub trait Marshal: Serialize {
    /// A representative value, usually the zero value.
    fn sample() -> Self
    where
        Self: Sized;

    /// Switches the value into its "present" state.
    ///
    /// Returns `false` when the type has no validity flag to flip.
    fn set_valid(&mut self) -> bool {
        false
    }
}

/// Classifies a live value by its serialized output.
///
/// `None` stands for a nil reference and yields an `any` node, as does a
/// failed serialization. A `null` payload from a type with a validity flag is
/// re-sampled with the flag set and reported as a pointer to that shape.
pub fn resolve<T: Marshal>(value: Option<&mut T>) -> Node {
    let any = || Node::of::<T>(Format::Any);

    let Some(value) = value else {
        return any();
    };
    let Ok(mut payload) = serde_json::to_string(&*value) else {
        return any();
    };

    let nullable = payload == NULL && value.set_valid();
    if nullable {
        match serde_json::to_string(&*value) {
            Ok(present) => payload = present,
            Err(_) => return any(),
        }
    }

    let (format, children) = sniff(&payload);
    trace!(ty = std::any::type_name::<T>(), payload = %payload, format = %format, "schema.leaf.sniffed");
    let shape = Node {
        children,
        ..Node::of::<T>(format)
    };

    if nullable {
        Node {
            children: vec![shape],
            ..Node::of::<T>(Format::Pointer)
        }
    } else {
        shape
    }
}

fn sniff(payload: &str) -> (Format, Vec<Node>) {
    if payload.starts_with('"') && payload.ends_with('"') {
        return (Format::String, Vec::new());
    }
    if payload.chars().all(|c| c.is_ascii_digit()) {
        return (Format::Number, Vec::new());
    }
    if payload.starts_with('[') && payload.ends_with(']') {
        let element = guess_element(payload)
            .map(|format| Node::leaf("", format.to_string(), format))
            .into_iter()
            .collect();
        return (Format::Array, element);
    }
    (Format::Any, Vec::new())
}

/// Later matches win, mirroring how a payload such as `[[1],{"a":1}]` would
/// be read from either end.
fn guess_element(payload: &str) -> Option<Format> {
    let mut guess = None;
    if payload.starts_with("[true") || payload.starts_with("[false") {
        guess = Some(Format::Boolean);
    }
    if payload.starts_with("[{") || payload.ends_with("}]") {
        guess = Some(Format::Object);
    }
    if payload.starts_with("[\"") || payload.ends_with("\"]") {
        guess = Some(Format::String);
    }
    if payload.starts_with("[[") || payload.ends_with("]]") {
        guess = Some(Format::Array);
    }
    let interior = payload
        .get(1..payload.len().saturating_sub(1))
        .unwrap_or_default();
    if !interior.is_empty() && interior.chars().all(|c| c.is_ascii_digit() || c == ',') {
        guess = Some(Format::Number);
    }
    guess
}

/// A null-capable wrapper: serializes as `null` unless `valid` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nullable<T> {
    /// The wrapped value, meaningful only when `valid`.
    pub value: T,
    /// Whether `value` is present.
    pub valid: bool,
}

impl<T> Nullable<T> {
    /// A present value.
    pub fn new(value: T) -> Self {
        Self { value, valid: true }
    }

    /// The value when present.
    pub fn as_option(&self) -> Option<&T> {
        self.valid.then_some(&self.value)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.valid {
            self.value.serialize(serializer)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de, T> Deserialize<'de> for Nullable<T>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::new(value),
            None => Self::default(),
        })
    }
}

impl<T: Serialize + Default> Marshal for Nullable<T> {
    fn sample() -> Self {
        Self::default()
    }

    fn set_valid(&mut self) -> bool {
        self.valid = true;
        true
    }
}
