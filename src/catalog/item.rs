//! Raw catalog items

use serde::Deserialize;
use std::fmt;

/// An entry from the tags (catalog) endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TagItem {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub web_title: Option<String>,

    /// Content endpoint listing every item tagged with this keyword
    pub api_url: String,
}

/// An entry from a content endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,

    #[serde(default)]
    pub web_publication_date: Option<String>,

    #[serde(default)]
    pub section_id: Option<String>,

    /// Present only when the request asked for `show-fields`
    #[serde(default)]
    pub fields: Option<ContentFields>,
}

/// Optional per-item fields
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentFields {
    #[serde(default)]
    pub headline: Option<String>,

    #[serde(default)]
    pub byline: Option<String>,

    #[serde(default)]
    pub body_text: Option<String>,

    #[serde(default)]
    pub short_url: Option<String>,
}

/// A paginated content endpoint discovered under a category
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceEndpoint(String);

impl ResourceEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<TagItem> for ResourceEndpoint {
    fn from(item: TagItem) -> Self {
        Self(item.api_url)
    }
}

impl fmt::Display for ResourceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
