//! Article and category domain types.

use crate::analysis::Analysis;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A WeChat official-account article under curation.
///
/// The `content` field holds the article body as HTML, which is how the
/// platform delivers it and how the manuscript export consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Stable identifier within the store
    pub id: String,
    /// Article headline
    pub title: String,
    /// Body HTML as fetched from the platform
    pub content: String,
    /// Author or authoring team
    pub author: String,
    /// Original publication date
    pub publish_date: NaiveDate,
    /// Canonical URL on the platform
    pub url: String,
    /// Category assignment, if any
    #[serde(default)]
    pub category_id: Option<String>,
    /// Whether the article has been edited locally
    pub is_edited: bool,
    /// Date of the last local edit
    #[serde(default)]
    pub last_edited: Option<NaiveDate>,
    /// Whether the mock spell check has been applied
    pub spell_checked: bool,
    /// Most recent AI review, if one has been run
    #[serde(default)]
    pub analysis: Option<Analysis>,
}

impl Article {
    /// Check whether the article matches a free-text search term.
    ///
    /// Case-insensitive substring match over title and author, the same
    /// fields the article list searches.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term) || self.author.to_lowercase().contains(&term)
    }
}

/// A manuscript chapter grouping for articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Stable identifier, referenced by `Article::category_id`
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional one-line description
    #[serde(default)]
    pub description: Option<String>,
    /// Position in the manuscript chapter order
    pub order: u32,
    /// Hex color swatch for terminal and manuscript rendering
    #[serde(default)]
    pub color: Option<String>,
}

impl Category {
    /// Create a category placed after the given number of existing ones.
    pub fn new(id: impl Into<String>, name: impl Into<String>, existing: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            order: existing as u32 + 1,
            color: None,
        }
    }
}
