//! Article repository.
//!
//! The agent, exporter and interactive pages all work against the
//! [`ArticleStore`] trait rather than a concrete container, so the in-memory
//! store can be swapped for a persistent one without touching callers.

use crate::article::{Article, Category};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("article not found: {0}")]
    ArticleNotFound(String),
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    #[error("article id already in use: {0}")]
    DuplicateArticle(String),
    #[error("category id already in use: {0}")]
    DuplicateCategory(String),
}

/// Editing-status facet of the article list filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    /// Edited locally at least once
    Edited,
    /// Never edited locally
    Raw,
    /// Spell check has been applied
    SpellChecked,
}

impl StatusFilter {
    fn matches(self, article: &Article) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Edited => article.is_edited,
            StatusFilter::Raw => !article.is_edited,
            StatusFilter::SpellChecked => article.spell_checked,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "edited" => Ok(StatusFilter::Edited),
            "raw" => Ok(StatusFilter::Raw),
            "spellchecked" | "spell-checked" => Ok(StatusFilter::SpellChecked),
            other => Err(format!(
                "unknown status '{other}' (expected all, edited, raw or spell-checked)"
            )),
        }
    }
}

/// Combined article list filter; all facets must match
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    /// Case-insensitive substring over title and author
    pub search: Option<String>,
    /// Category id the article must be assigned to
    pub category: Option<String>,
    pub status: StatusFilter,
}

/// Dashboard summary counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub articles: usize,
    pub categorized: usize,
    pub edited: usize,
    pub spell_checked: usize,
}

/// Keyword rules for automatic categorization, first match wins
const CATEGORY_KEYWORDS: [(&[&str], &str); 3] = [
    (&["技术", "编程"], "tech"),
    (&["市场", "营销"], "marketing"),
    (&["设计", "UI"], "design"),
];

fn keyword_category(title: &str) -> Option<&'static str> {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| title.contains(k)))
        .map(|(_, category)| *category)
}

/// Repository of articles and categories.
///
/// Categories are kept in manuscript order; articles keep insertion order.
pub trait ArticleStore {
    /// All articles in insertion order
    fn articles(&self) -> &[Article];
    /// All categories ordered by their `order` field
    fn categories(&self) -> &[Category];

    fn add_article(&mut self, article: Article) -> Result<(), StoreError>;
    /// Apply an in-place edit to the article with the given id
    fn update_article(
        &mut self,
        id: &str,
        update: &mut dyn FnMut(&mut Article),
    ) -> Result<(), StoreError>;
    fn delete_article(&mut self, id: &str) -> Result<(), StoreError>;

    fn add_category(&mut self, category: Category) -> Result<(), StoreError>;
    fn update_category(
        &mut self,
        id: &str,
        update: &mut dyn FnMut(&mut Category),
    ) -> Result<(), StoreError>;
    /// Remove a category and clear it from any articles assigned to it
    fn delete_category(&mut self, id: &str) -> Result<(), StoreError>;

    fn article(&self, id: &str) -> Option<&Article> {
        self.articles().iter().find(|a| a.id == id)
    }

    fn category(&self, id: &str) -> Option<&Category> {
        self.categories().iter().find(|c| c.id == id)
    }

    /// Articles matching every facet of the filter, in store order
    fn find_articles(&self, filter: &ArticleFilter) -> Vec<&Article> {
        self.articles()
            .iter()
            .filter(|article| match &filter.search {
                Some(term) => article.matches_search(term),
                None => true,
            })
            .filter(|article| match &filter.category {
                Some(category) => article.category_id.as_deref() == Some(category.as_str()),
                None => true,
            })
            .filter(|article| filter.status.matches(article))
            .collect()
    }

    fn category_article_count(&self, category_id: &str) -> usize {
        self.articles()
            .iter()
            .filter(|a| a.category_id.as_deref() == Some(category_id))
            .count()
    }

    fn counts(&self) -> StoreCounts {
        let articles = self.articles();
        StoreCounts {
            articles: articles.len(),
            categorized: articles.iter().filter(|a| a.category_id.is_some()).count(),
            edited: articles.iter().filter(|a| a.is_edited).count(),
            spell_checked: articles.iter().filter(|a| a.spell_checked).count(),
        }
    }

    /// Assign categories from title keywords.
    ///
    /// Every article whose title matches a keyword rule is assigned that
    /// rule's category; articles matching no rule keep their current
    /// assignment. Returns the number of articles whose assignment changed.
    fn categorize_articles(&mut self) -> Result<usize, StoreError> {
        let assignments: Vec<(String, &'static str)> = self
            .articles()
            .iter()
            .filter_map(|article| {
                let target = keyword_category(&article.title)?;
                if article.category_id.as_deref() == Some(target) {
                    None
                } else {
                    Some((article.id.clone(), target))
                }
            })
            .collect();

        let changed = assignments.len();
        for (id, target) in assignments {
            self.update_article(&id, &mut |article| {
                article.category_id = Some(target.to_string());
            })?;
        }
        Ok(changed)
    }

    /// Next free numeric article id
    fn next_article_id(&self) -> String {
        let max = self
            .articles()
            .iter()
            .filter_map(|a| a.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }
}

/// Vec-backed store holding the working set of a session
#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    categories: Vec<Category>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing contents, sorting categories into
    /// manuscript order
    pub fn with_contents(articles: Vec<Article>, mut categories: Vec<Category>) -> Self {
        categories.sort_by_key(|c| c.order);
        Self {
            articles,
            categories,
        }
    }
}

impl ArticleStore for MemoryStore {
    fn articles(&self) -> &[Article] {
        &self.articles
    }

    fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn add_article(&mut self, article: Article) -> Result<(), StoreError> {
        if self.article(&article.id).is_some() {
            return Err(StoreError::DuplicateArticle(article.id));
        }
        self.articles.push(article);
        Ok(())
    }

    fn update_article(
        &mut self,
        id: &str,
        update: &mut dyn FnMut(&mut Article),
    ) -> Result<(), StoreError> {
        let article = self
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::ArticleNotFound(id.to_string()))?;
        update(article);
        Ok(())
    }

    fn delete_article(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.articles.len();
        self.articles.retain(|a| a.id != id);
        if self.articles.len() == before {
            return Err(StoreError::ArticleNotFound(id.to_string()));
        }
        Ok(())
    }

    fn add_category(&mut self, category: Category) -> Result<(), StoreError> {
        if self.category(&category.id).is_some() {
            return Err(StoreError::DuplicateCategory(category.id));
        }
        self.categories.push(category);
        self.categories.sort_by_key(|c| c.order);
        Ok(())
    }

    fn update_category(
        &mut self,
        id: &str,
        update: &mut dyn FnMut(&mut Category),
    ) -> Result<(), StoreError> {
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::CategoryNotFound(id.to_string()))?;
        update(category);
        self.categories.sort_by_key(|c| c.order);
        Ok(())
    }

    fn delete_category(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        if self.categories.len() == before {
            return Err(StoreError::CategoryNotFound(id.to_string()));
        }
        for article in &mut self.articles {
            if article.category_id.as_deref() == Some(id) {
                article.category_id = None;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn article(id: &str, title: &str, author: &str) -> Article {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            content: "<p>正文</p>".to_string(),
            author: author.to_string(),
            publish_date: NaiveDate::from_ymd_opt(2023, 11, 15).unwrap(),
            url: format!("https://mp.weixin.qq.com/s/example{id}"),
            category_id: None,
            is_edited: false,
            last_edited: None,
            spell_checked: false,
            analysis: None,
        }
    }

    fn sample_store() -> MemoryStore {
        let mut tech = article("1", "Python入门：从零开始学习编程", "技术团队");
        tech.category_id = Some("tech".to_string());
        tech.is_edited = true;
        tech.spell_checked = true;
        let marketing = article("2", "内容营销实战", "市场营销团队");
        let design = article("3", "UI设计趋势", "设计团队");
        MemoryStore::with_contents(
            vec![tech, marketing, design],
            vec![
                Category::new("design", "设计", 2),
                Category::new("tech", "技术", 0),
                Category::new("marketing", "营销", 1),
            ],
        )
    }

    #[test]
    fn categories_come_back_in_manuscript_order() {
        let store = sample_store();
        let names: Vec<&str> = store.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["技术", "营销", "设计"]);
    }

    #[test]
    fn find_articles_applies_every_facet() {
        let store = sample_store();

        let by_search = store.find_articles(&ArticleFilter {
            search: Some("python".to_string()),
            ..ArticleFilter::default()
        });
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].id, "1");

        let by_category = store.find_articles(&ArticleFilter {
            category: Some("tech".to_string()),
            ..ArticleFilter::default()
        });
        assert_eq!(by_category.len(), 1);

        let raw = store.find_articles(&ArticleFilter {
            status: StatusFilter::Raw,
            ..ArticleFilter::default()
        });
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn status_filter_parses_cli_spellings() {
        assert_eq!(
            "spell-checked".parse::<StatusFilter>().unwrap(),
            StatusFilter::SpellChecked
        );
        assert_eq!("EDITED".parse::<StatusFilter>().unwrap(), StatusFilter::Edited);
        assert!("published".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn categorize_assigns_matching_titles_and_reports_changes() {
        let mut store = sample_store();
        let changed = store.categorize_articles().unwrap();
        // "1" already sits in tech; "2" and "3" get assigned
        assert_eq!(changed, 2);
        assert_eq!(store.article("2").unwrap().category_id.as_deref(), Some("marketing"));
        assert_eq!(store.article("3").unwrap().category_id.as_deref(), Some("design"));

        let again = store.categorize_articles().unwrap();
        assert_eq!(again, 0);
    }

    #[test]
    fn categorize_leaves_unmatched_titles_alone() {
        let mut store = MemoryStore::new();
        store
            .add_article(article("9", "一周美食随笔", "编辑部"))
            .unwrap();
        let changed = store.categorize_articles().unwrap();
        assert_eq!(changed, 0);
        assert!(store.article("9").unwrap().category_id.is_none());
    }

    #[test]
    fn deleting_a_category_clears_article_assignments() {
        let mut store = sample_store();
        store.delete_category("tech").unwrap();
        assert!(store.category("tech").is_none());
        assert!(store.article("1").unwrap().category_id.is_none());
    }

    #[test]
    fn category_description_and_color_update_in_place() {
        let mut store = sample_store();
        store
            .update_category("tech", &mut |category| {
                category.description = Some("技术相关的文章".to_string());
                category.color = Some("#4299E1".to_string());
            })
            .unwrap();

        let category = store.category("tech").unwrap();
        assert_eq!(category.description.as_deref(), Some("技术相关的文章"));
        assert_eq!(category.color.as_deref(), Some("#4299E1"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut store = sample_store();
        let err = store.add_article(article("1", "重复", "作者")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateArticle(_)));
        let err = store
            .add_category(Category::new("tech", "技术", 9))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCategory(_)));
    }

    #[test]
    fn counts_summarize_the_working_set() {
        let store = sample_store();
        let counts = store.counts();
        assert_eq!(counts.articles, 3);
        assert_eq!(counts.categorized, 1);
        assert_eq!(counts.edited, 1);
        assert_eq!(counts.spell_checked, 1);
    }

    #[test]
    fn next_article_id_skips_non_numeric_ids() {
        let mut store = sample_store();
        store
            .add_article(article("draft-a", "草稿", "编辑部"))
            .unwrap();
        assert_eq!(store.next_article_id(), "4");
    }
}
