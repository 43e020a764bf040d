#![deny(missing_docs)]

//! # Response Envelopes
//!
//! Wire shapes for successful responses and errors, after the Google JSON
//! style guide: success bodies wrap their payload in `data`, failures in
//! `error`.

use crate::oas::document::Schema;
use crate::oas::repo::{build_schema_repo, SchemaRepo};
use crate::schema::{get_schema, Describe, Field, WalkResult, Walker};
use serde::{Deserialize, Serialize};

/// Payload types that can sit in [`DataResponse::data`].
///
/// A payload's [`Describe::self_schema`] stands in for the inferred `data`
/// property of the documented envelope.
pub trait ResponseData: Describe {}

/// Envelope of every successful response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataResponse<D> {
    /// Client sets this value and the server echoes it back.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,
    /// The payload.
    pub data: D,
}

impl<D> DataResponse<D> {
    /// A response carrying `data` with no context.
    pub fn new(data: D) -> Self {
        Self {
            context: String::new(),
            data,
        }
    }

    /// Echoes the client's context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

impl<D: Describe> Describe for DataResponse<D> {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<String>("context").field::<D>("data");
        })
    }
}

/// What kind of resource a payload holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDetail {
    /// Type of information the object stores.
    pub kind: String,
    /// Language of the other properties (BCP 47).
    #[serde(default, rename = "lang", skip_serializing_if = "String::is_empty")]
    pub language: String,
}

impl DataDetail {
    /// Detail for a resource `kind`.
    pub fn kind(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            language: String::new(),
        }
    }
}

impl Describe for DataDetail {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<String>(
                Field::new("Kind")
                    .rename("kind")
                    .description("type of information this object stores")
                    .example("resource"),
            )
            .field::<String>(
                Field::new("Language")
                    .rename("lang")
                    .description("language of the rest of the properties (BCP 47)")
                    .example("pt-br"),
            );
        })
    }
}

impl ResponseData for DataDetail {}

/// Paging information of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDetail {
    /// Number of items in this result set.
    pub current_item_count: i64,
    /// Number of items per page.
    pub items_per_page: i64,
    /// Index of the first item in `items`.
    pub start_index: i64,
    /// Total number of items available.
    pub total_items: i64,
    /// Index of the current page.
    pub page_index: i64,
    /// Total number of pages.
    pub total_pages: i64,
}

impl Describe for CollectionDetail {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<i64>(
                Field::new("CurrentItemCount")
                    .rename("currentItemCount")
                    .description("number of items in this result set")
                    .example("1"),
            )
            .field::<i64>(
                Field::new("ItemsPerPage")
                    .rename("itemsPerPage")
                    .description("number of items in the result")
                    .example("10"),
            )
            .field::<i64>(
                Field::new("StartIndex")
                    .rename("startIndex")
                    .description("index of the first item in items")
                    .example("1"),
            )
            .field::<i64>(
                Field::new("TotalItems")
                    .rename("totalItems")
                    .description("total number of items available in this set")
                    .example("100"),
            )
            .field::<i64>(
                Field::new("PageIndex")
                    .rename("pageIndex")
                    .description("index of the current page of items")
                    .example("1"),
            )
            .field::<i64>(
                Field::new("TotalPages")
                    .rename("totalPages")
                    .description("total number of pages in the result set")
                    .example("10"),
            );
        })
    }
}

/// A single resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SingleItemData<T> {
    /// Resource kind, flattened into the payload.
    #[serde(flatten)]
    pub detail: DataDetail,
    /// The resource.
    pub item: T,
}

impl<T: Describe> Describe for SingleItemData<T> {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.embed::<DataDetail>().field::<T>("item");
        })
    }

    /// The inferred envelope with `T`'s hand-authored schema as `item`.
    ///
    /// `None` unless `T` authors its own schema. `T`'s definitions join the
    /// repository without replacing inferred ones.
    fn self_schema() -> Option<SchemaRepo> {
        let item = T::self_schema()?;
        let node = get_schema::<Self>()?;
        let mut composed = build_schema_repo(&node);
        composed.absorb(item.repo);
        let wrapped = Schema {
            all_of: vec![item.start.into()],
            ..Schema::default()
        };
        composed.set_property(&node.canonical_name(), "item", wrapped.into());
        Some(composed)
    }
}

impl<T: Describe> ResponseData for SingleItemData<T> {}

/// A page of resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionItemData<T> {
    /// Resource kind, flattened into the payload.
    #[serde(flatten)]
    pub detail: DataDetail,
    /// The resources.
    pub items: Vec<T>,
    /// Paging information, flattened into the payload.
    #[serde(flatten)]
    pub collection: CollectionDetail,
}

impl<T: Describe> Describe for CollectionItemData<T> {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.embed::<DataDetail>()
                .field::<Vec<T>>("items")
                .embed::<CollectionDetail>();
        })
    }
}

impl<T: Describe> ResponseData for CollectionItemData<T> {}

/// Envelope of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The failure.
    pub error: GeneralError,
}

impl ErrorResponse {
    /// A failure with `code` and a summary `message`.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            error: GeneralError {
                code,
                message: message.into(),
                errors: Vec::new(),
            },
        }
    }

    /// Adds a detailed error.
    pub fn with_error(mut self, detail: DetailError) -> Self {
        self.error.errors.push(detail);
        self
    }
}

impl Describe for ErrorResponse {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<GeneralError>("error");
        })
    }
}

/// Summary of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralError {
    /// HTTP status code.
    pub code: i64,
    /// Human readable summary.
    pub message: String,
    /// Individual errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<DetailError>,
}

impl Describe for GeneralError {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<i64>("code")
                .field::<String>("message")
                .field::<Vec<DetailError>>("errors");
        })
    }
}

/// One specific failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailError {
    /// Service the error originated in.
    pub domain: String,
    /// Machine readable reason.
    pub reason: String,
    /// Human readable message.
    pub message: String,
    /// Where the error occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// How to interpret `location`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
    /// URI with more help.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_help: Option<String>,
    /// URI of a form to report the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_report: Option<String>,
}

impl DetailError {
    /// A detail with its mandatory fields.
    pub fn new(
        domain: impl Into<String>,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            reason: reason.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Sets where the error occurred and how to read it.
    pub fn at(mut self, location: impl Into<String>, location_type: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self.location_type = Some(location_type.into());
        self
    }
}

impl Describe for DetailError {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<String>("domain")
                .field::<String>("reason")
                .field::<String>("message")
                .field::<Option<String>>("location")
                .field::<Option<String>>("locationType")
                .field::<Option<String>>("extendedHelp")
                .field::<Option<String>>("sendReport");
        })
    }
}
