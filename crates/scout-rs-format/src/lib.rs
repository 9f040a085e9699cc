//! Record model and response formatting for Scout.
//!
//! This crate owns the per-resource column schemas, the delimiter-separated
//! tabular formatter, legacy date denormalization, and content negotiation
//! between JSON and the tabular media types. Nothing here performs IO; the
//! HTTP layer writes whatever `negotiate` returns.

pub mod dates;
pub mod json;
pub mod negotiate;
pub mod record;
pub mod schema;
pub mod tabular;

/// Legacy `created_at` denormalization.
pub use dates::normalize_dates;
/// JSON text with JavaScript number rendering.
pub use json::{JsNumberFormatter, to_js_string};
/// Content negotiation entry points.
pub use negotiate::{MediaType, NegotiatedBody, negotiate, select_media_type};
/// Loosely structured record and truthiness helper.
pub use record::{Record, is_truthy};
/// Column schemas per resource kind.
pub use schema::{Column, ColumnKind, ResourceKind};
/// Delimiter-separated formatting.
pub use tabular::{format_value, format_with_separator};
