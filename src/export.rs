//! Manuscript assembly and export writers.
//!
//! The manuscript is the curated article set grouped into chapters by
//! category, rendered as a single HTML document. The Word export writes the
//! same document with the Office namespaces on the root element, which Word
//! opens as a native file; the CSV export is a flat article index.

use crate::article::{Article, Category};
use crate::store::ArticleStore;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Manuscript assembly options
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Open the manuscript with a linked table of contents
    pub include_toc: bool,
    /// Append articles without a category as a trailing section
    pub include_uncategorized: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_toc: true,
            include_uncategorized: false,
        }
    }
}

/// Counts shown alongside the manuscript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManuscriptStats {
    pub chapters: usize,
    pub articles: usize,
    pub edited: usize,
    pub spell_checked: usize,
    pub uncategorized: usize,
}

/// One chapter: a category and the articles assigned to it
pub struct Chapter<'a> {
    pub category: &'a Category,
    pub articles: Vec<&'a Article>,
}

/// The assembled manuscript, borrowing its articles from the store
pub struct Manuscript<'a> {
    pub chapters: Vec<Chapter<'a>>,
    pub uncategorized: Vec<&'a Article>,
    pub options: ExportOptions,
    pub stats: ManuscriptStats,
}

const DOCUMENT_TITLE: &str = "WeChat Publisher Export";
const PAGE_BREAK: &str = "<br style=\"page-break-after: always;\"/>";

impl<'a> Manuscript<'a> {
    /// Group the store's articles into chapters.
    ///
    /// Chapters follow category order and empty categories are skipped;
    /// articles without a category go into the trailing section, rendered
    /// only when the options ask for it.
    pub fn build(store: &'a dyn ArticleStore, options: ExportOptions) -> Self {
        let chapters: Vec<Chapter<'a>> = store
            .categories()
            .iter()
            .map(|category| Chapter {
                category,
                articles: store
                    .articles()
                    .iter()
                    .filter(|a| a.category_id.as_deref() == Some(category.id.as_str()))
                    .collect(),
            })
            .filter(|chapter| !chapter.articles.is_empty())
            .collect();

        let uncategorized: Vec<&'a Article> = store
            .articles()
            .iter()
            .filter(|a| a.category_id.is_none())
            .collect();

        let counts = store.counts();
        let stats = ManuscriptStats {
            chapters: store.categories().len(),
            articles: counts.articles,
            edited: counts.edited,
            spell_checked: counts.spell_checked,
            uncategorized: uncategorized.len(),
        };

        Self {
            chapters,
            uncategorized,
            options,
            stats,
        }
    }

    /// Render the manuscript as a standalone HTML document
    pub fn to_html(&self) -> String {
        self.document(false)
    }

    /// Write the manuscript as HTML
    pub fn write_html(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, self.document(false))?;
        Ok(())
    }

    /// Write the manuscript as a Word-compatible document
    pub fn write_doc(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, self.document(true))?;
        Ok(())
    }

    fn document(&self, word_compatible: bool) -> String {
        let mut html = String::new();

        if word_compatible {
            html.push_str(
                "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
                 xmlns:w=\"urn:schemas-microsoft-com:office:word\">",
            );
        } else {
            html.push_str("<html>");
        }
        html.push_str(&format!(
            "<head><meta charset=\"UTF-8\"><title>{DOCUMENT_TITLE}</title></head><body>"
        ));
        html.push_str(&format!("<h1>{DOCUMENT_TITLE}</h1>"));

        let trailing = if self.options.include_uncategorized {
            self.uncategorized.as_slice()
        } else {
            &[]
        };

        if self.options.include_toc {
            html.push_str("<h2>Table of Contents</h2><ul>");
            for chapter in &self.chapters {
                html.push_str(&format!(
                    "<li><a href=\"#category-{}\">{}</a><ul>",
                    sanitize_id(&chapter.category.id),
                    html_escape(&chapter.category.name)
                ));
                for article in &chapter.articles {
                    html.push_str(&toc_entry(article));
                }
                html.push_str("</ul></li>");
            }
            if !trailing.is_empty() {
                html.push_str("<li><a href=\"#category-uncategorized\">Uncategorized</a><ul>");
                for article in trailing {
                    html.push_str(&toc_entry(article));
                }
                html.push_str("</ul></li>");
            }
            html.push_str("</ul>");
            html.push_str(PAGE_BREAK);
        }

        for chapter in &self.chapters {
            html.push_str(&format!(
                "<h2 id=\"category-{}\">{}</h2>",
                sanitize_id(&chapter.category.id),
                html_escape(&chapter.category.name)
            ));
            for article in &chapter.articles {
                html.push_str(&article_section(article));
            }
        }

        if !trailing.is_empty() {
            html.push_str("<h2 id=\"category-uncategorized\">Uncategorized</h2>");
            for article in trailing {
                html.push_str(&article_section(article));
            }
        }

        html.push_str("</body></html>");
        html
    }
}

fn toc_entry(article: &Article) -> String {
    format!(
        "<li><a href=\"#article-{}\">{}</a></li>",
        sanitize_id(&article.id),
        html_escape(&article.title)
    )
}

/// Article heading plus its body, which is already HTML and passes through
/// verbatim, followed by a page break.
fn article_section(article: &Article) -> String {
    format!(
        "<h3 id=\"article-{}\">{}</h3>{}{}",
        sanitize_id(&article.id),
        html_escape(&article.title),
        article.content,
        PAGE_BREAK
    )
}

/// Write the article index as CSV, one row per article in store order
pub fn write_csv(store: &dyn ArticleStore, path: &Path) -> Result<(), ExportError> {
    let mut csv = String::from("id,title,author,category,publish_date,url,edited,spell_checked\n");

    for article in store.articles() {
        let category = article
            .category_id
            .as_deref()
            .and_then(|id| store.category(id))
            .map(|c| c.name.as_str())
            .unwrap_or("");
        let date = article.publish_date.to_string();

        let row = [
            article.id.as_str(),
            article.title.as_str(),
            article.author.as_str(),
            category,
            date.as_str(),
            article.url.as_str(),
            if article.is_edited { "yes" } else { "no" },
            if article.spell_checked { "yes" } else { "no" },
        ];
        let line: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        csv.push_str(&line.join(","));
        csv.push('\n');
    }

    std::fs::write(path, csv)?;
    Ok(())
}

/// Strip everything but ASCII alphanumerics, hyphen and underscore, keeping
/// anchor ids valid
fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

fn html_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Quote a CSV field per RFC 4180 when it needs quoting
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') || raw.contains('\r') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
