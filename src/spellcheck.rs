//! Mock spell check.
//!
//! Stands in for a real checking service: a fixed issue list, the same one
//! every time, so the review flow can be exercised end to end without a
//! dictionary backend.

use crate::store::{ArticleStore, StoreError};

/// One flagged word with replacement candidates and its character span in
/// the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellIssue {
    pub word: String,
    pub suggestions: Vec<String>,
    pub start: usize,
    pub end: usize,
}

const MOCK_ISSUES: [(&str, &[&str], usize, usize); 3] = [
    ("成熟", &["成熟", "成书"], 120, 122),
    ("帮助", &["帮助", "帮忙"], 140, 142),
    ("改进", &["改进", "改善", "提高"], 180, 182),
];

/// Check article content for spelling issues.
///
/// Issues whose span falls past the end of the content are dropped, so every
/// returned span indexes into it.
pub fn check(content: &str) -> Vec<SpellIssue> {
    let len = content.chars().count();
    MOCK_ISSUES
        .iter()
        .filter(|(_, _, _, end)| *end <= len)
        .map(|(word, suggestions, start, end)| SpellIssue {
            word: (*word).to_string(),
            suggestions: suggestions.iter().map(|s| (*s).to_string()).collect(),
            start: *start,
            end: *end,
        })
        .collect()
}

/// Flip an article's spell-checked flag, returning the new state.
///
/// The flag moves both directions: clearing it puts the article back in the
/// unchecked queue. Nothing else on the article changes.
pub fn toggle(store: &mut dyn ArticleStore, id: &str) -> Result<bool, StoreError> {
    let mut now_checked = false;
    store.update_article(id, &mut |article| {
        article.spell_checked = !article.spell_checked;
        now_checked = article.spell_checked;
    })?;
    Ok(now_checked)
}
