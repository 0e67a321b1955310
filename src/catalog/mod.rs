//! Catalog data model
//!
//! This module defines the shapes exchanged with the remote catalog:
//! - `Page`: one fetched unit of a paginated response
//! - `TagItem` / `ContentItem`: raw items from the tags and content endpoints
//! - `ResourceEndpoint`: a content endpoint discovered under a category
//! - `Row`: the flat record written to the sink

mod item;
mod page;
mod row;

pub use item::{ContentFields, ContentItem, ResourceEndpoint, TagItem};
pub use page::{ApiEnvelope, ApiResponse, Page};
pub use row::{normalize_items, Row, ROW_HEADERS};
