//! # Type Introspection
//!
//! Produces [`Node`] trees describing a type's structure.
//!
//! - **node**: The shape-description tree and canonical naming.
//! - **walker**: The [`Describe`] capability and the recursion driving it.
//! - **marshal**: Classification of custom-serialized leaves.
//! - **impls**: Descriptions of std and ecosystem types.

pub mod impls;
pub mod marshal;
pub mod node;
pub mod walker;

pub use marshal::{resolve, Marshal, Nullable};
pub use node::{Format, Node};
pub use walker::{get_schema, Describe, Field, Fields, WalkError, WalkResult, Walker};
