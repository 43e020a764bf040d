//! Built-in [`Describe`] implementations for std, `serde_json`, `chrono`,
//! `uuid` and `indexmap` types.

use crate::schema::marshal::{Marshal, Nullable};
use crate::schema::node::{Format, Node, NON_STRING_KEYS_TYPE};
use crate::schema::walker::{Describe, WalkResult, Walker};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

macro_rules! describe_scalar {
    ($format:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe(_: &mut Walker) -> WalkResult {
                    Ok(Some(Node::leaf("", stringify!($ty), $format)))
                }
            }
        )+
    };
}

describe_scalar!(Format::String => String, str, char);
describe_scalar!(Format::Boolean => bool);
describe_scalar!(
    Format::Number => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl Describe for Cow<'_, str> {
    fn describe(walker: &mut Walker) -> WalkResult {
        str::describe(walker)
    }
}

// Sequences: one child describing the element.

impl<T: Describe> Describe for Vec<T> {
    fn describe(walker: &mut Walker) -> WalkResult {
        Ok(Some(Node::wrapping(Format::Array, walker.walk::<T>())))
    }
}

impl<T: Describe> Describe for [T] {
    fn describe(walker: &mut Walker) -> WalkResult {
        Ok(Some(Node::wrapping(Format::Array, walker.walk::<T>())))
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe(walker: &mut Walker) -> WalkResult {
        Ok(Some(Node::wrapping(Format::Array, walker.walk::<T>())))
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe(walker: &mut Walker) -> WalkResult {
        Ok(Some(Node::wrapping(Format::Array, walker.walk::<T>())))
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn describe(walker: &mut Walker) -> WalkResult {
        Ok(Some(Node::wrapping(Format::Array, walker.walk::<T>())))
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe(walker: &mut Walker) -> WalkResult {
        Ok(Some(Node::wrapping(Format::Array, walker.walk::<T>())))
    }
}

// Maps are assumed string-keyed.

fn describe_map<K, V>(walker: &mut Walker) -> WalkResult
where
    K: Describe + ?Sized,
    V: Describe + ?Sized,
{
    let string_keys = matches!(
        walker.walk::<K>(),
        Some(Node {
            format: Format::String,
            ..
        })
    );
    if !string_keys {
        return Ok(Some(Node::leaf("", NON_STRING_KEYS_TYPE, Format::Any)));
    }
    Ok(Some(Node::wrapping(Format::Map, walker.walk::<V>())))
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe(walker: &mut Walker) -> WalkResult {
        describe_map::<K, V>(walker)
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe(walker: &mut Walker) -> WalkResult {
        describe_map::<K, V>(walker)
    }
}

impl<K: Describe, V: Describe, S> Describe for IndexMap<K, V, S> {
    fn describe(walker: &mut Walker) -> WalkResult {
        describe_map::<K, V>(walker)
    }
}

// Option is the optional wrapper; owning pointers are transparent.

impl<T: Describe> Describe for Option<T> {
    fn describe(walker: &mut Walker) -> WalkResult {
        Ok(Some(Node::wrapping(Format::Pointer, walker.walk::<T>())))
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe(walker: &mut Walker) -> WalkResult {
        T::describe(walker)
    }
}

impl<T: Describe + ?Sized> Describe for Rc<T> {
    fn describe(walker: &mut Walker) -> WalkResult {
        T::describe(walker)
    }
}

impl<T: Describe + ?Sized> Describe for Arc<T> {
    fn describe(walker: &mut Walker) -> WalkResult {
        T::describe(walker)
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn describe(walker: &mut Walker) -> WalkResult {
        T::describe(walker)
    }
}

impl<T: Describe + ?Sized> Describe for &mut T {
    fn describe(walker: &mut Walker) -> WalkResult {
        T::describe(walker)
    }
}

// Nothing to document.

impl Describe for () {
    fn describe(_: &mut Walker) -> WalkResult {
        Ok(None)
    }
}

impl<T: ?Sized> Describe for PhantomData<T> {
    fn describe(_: &mut Walker) -> WalkResult {
        Ok(None)
    }
}

impl Describe for serde_json::Value {
    fn describe(_: &mut Walker) -> WalkResult {
        Ok(Some(Node::leaf("serde_json", "Value", Format::Any)))
    }
}

// Custom-serialized leaves.

impl<T: serde::Serialize + Default> Describe for Nullable<T> {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.marshaled::<Self>()
    }
}

impl Marshal for Uuid {
    fn sample() -> Self {
        Uuid::nil()
    }
}

impl Marshal for DateTime<Utc> {
    fn sample() -> Self {
        DateTime::<Utc>::default()
    }
}

impl Marshal for NaiveDateTime {
    fn sample() -> Self {
        NaiveDateTime::default()
    }
}

impl Marshal for NaiveDate {
    fn sample() -> Self {
        NaiveDate::default()
    }
}

macro_rules! describe_marshaled {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe(walker: &mut Walker) -> WalkResult {
                    walker.marshaled::<Self>()
                }
            }
        )+
    };
}

describe_marshaled!(Uuid, DateTime<Utc>, NaiveDateTime, NaiveDate);
