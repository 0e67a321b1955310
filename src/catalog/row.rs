//! Flat output rows

use crate::catalog::ContentItem;
use serde::Serialize;

/// Column names, in output order
pub const ROW_HEADERS: [&str; 7] = [
    "id",
    "publicationDate",
    "title",
    "author",
    "content",
    "url",
    "section",
];

/// Normalized record written to the sink
///
/// Absent source fields become empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: String,
    pub publication_date: String,
    pub title: String,
    pub author: String,
    pub content: String,
    pub url: String,
    pub section: String,
}

impl From<ContentItem> for Row {
    fn from(item: ContentItem) -> Self {
        let fields = item.fields.unwrap_or_default();
        Self {
            id: item.id,
            publication_date: item.web_publication_date.unwrap_or_default(),
            title: fields.headline.unwrap_or_default(),
            author: fields.byline.unwrap_or_default(),
            content: fields.body_text.unwrap_or_default(),
            url: fields.short_url.unwrap_or_default(),
            section: item.section_id.unwrap_or_default(),
        }
    }
}

/// Normalizes a page worth of items, preserving their order
pub fn normalize_items(items: Vec<ContentItem>) -> Vec<Row> {
    items.into_iter().map(Row::from).collect()
}
