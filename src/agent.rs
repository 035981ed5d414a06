//! The review agent: prompt assembly, provider selection and persistence.
//!
//! Analysis is total. However the configured provider behaves, the outcome
//! goes through [`normalize`](crate::analysis::normalize) and an
//! [`Analysis`] comes back. The only failable operation is looking the
//! article up in the store.

use crate::analysis::{normalize, Analysis, AnalysisRequest, RawModelOutput};
use crate::article::Article;
use crate::config::Config;
use crate::provider::{canned_review, HttpTextGenerator, MockTextGenerator, TextGenerator};
use crate::store::{ArticleStore, StoreError};

/// Build the review instruction for one article.
///
/// The layout requested here is the one the normalizer recognizes; a model
/// that deviates still produces a usable record, just with more defaults.
fn build_prompt(article: &Article) -> String {
    format!(
        r#"You are an editorial reviewer for WeChat official-account articles.
Review the article below and reply in exactly this layout, with no extra commentary:

Suggested Title: <an improved headline>
Readability Score: <an integer from 0 to 100>
Sentiment: <positive, neutral or negative>
Content Improvement Suggestions:
- <first suggestion>
- <second suggestion>
- <third suggestion>

---

Title: {}

{}"#,
        article.title, article.content
    )
}

/// Run the configured provider and report the outcome.
///
/// Any condition that keeps the call from producing text becomes
/// `Unavailable` with a message naming that condition.
async fn run_provider(prompt: &str, source_title: &str, config: &Config) -> RawModelOutput {
    let provider_name = config.agent.provider.as_str();

    if provider_name.eq_ignore_ascii_case("mock") {
        let generator = MockTextGenerator::new(canned_review(source_title));
        return match generator.generate(prompt).await {
            Ok(text) => RawModelOutput::Text(text),
            Err(e) => RawModelOutput::Unavailable(format!("mock provider failed: {e}")),
        };
    }

    let entry = match config.provider(provider_name) {
        Ok(entry) => entry,
        Err(_) => {
            return RawModelOutput::Unavailable(format!(
                "AI review is unavailable: no provider named \"{provider_name}\" is configured"
            ));
        }
    };

    if !entry.enabled {
        return RawModelOutput::Unavailable(format!(
            "AI review is disabled: provider \"{}\" is not enabled",
            entry.name
        ));
    }

    if entry.api_key.is_empty() {
        return RawModelOutput::Unavailable(format!(
            "AI review is unavailable: provider \"{}\" has no API key set",
            entry.name
        ));
    }

    let generator =
        match HttpTextGenerator::new(&entry.endpoint, &config.agent.model, &entry.api_key) {
            Ok(generator) => generator,
            Err(e) => {
                return RawModelOutput::Unavailable(format!(
                    "could not reach provider \"{}\": {e}",
                    entry.name
                ));
            }
        };

    match generator.generate(prompt).await {
        Ok(text) => RawModelOutput::Text(text),
        Err(e) => RawModelOutput::Unavailable(format!(
            "request to provider \"{}\" failed: {e}",
            entry.name
        )),
    }
}

/// Review one article and return the normalized record.
pub async fn analyze(article: &Article, config: &Config) -> Analysis {
    let request = AnalysisRequest::new(&article.title, &article.content);
    let prompt = build_prompt(article);
    let output = run_provider(&prompt, &article.title, config).await;
    normalize(request, output)
}

/// Review an article from the store and persist the result onto it.
pub async fn analyze_article(
    store: &mut dyn ArticleStore,
    id: &str,
    config: &Config,
) -> Result<Analysis, StoreError> {
    let article = store
        .article(id)
        .ok_or_else(|| StoreError::ArticleNotFound(id.to_string()))?
        .clone();

    let analysis = analyze(&article, config).await;

    store.update_article(id, &mut |article| {
        article.analysis = Some(analysis.clone());
    })?;

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Sentiment;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn sample_article() -> Article {
        Article {
            id: "1".to_string(),
            title: "如何提高微信公众号的阅读量".to_string(),
            content: "<p>正文</p>".to_string(),
            author: "市场营销团队".to_string(),
            publish_date: NaiveDate::from_ymd_opt(2023, 11, 15).unwrap(),
            url: "https://mp.weixin.qq.com/s/example1".to_string(),
            category_id: None,
            is_edited: false,
            last_edited: None,
            spell_checked: false,
            analysis: None,
        }
    }

    #[tokio::test]
    async fn mock_provider_produces_the_canned_review() {
        let article = sample_article();
        let analysis = analyze(&article, &Config::default()).await;

        assert_eq!(analysis.suggested_title, format!("改进: {}", article.title));
        assert_eq!(analysis.readability_score, 85);
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.content_suggestions.len(), 3);
        assert!(analysis.raw_response.is_some());
    }

    #[tokio::test]
    async fn disabled_provider_degrades_to_defaults_with_a_diagnostic() {
        let mut config = Config::default();
        config.agent.provider = "OpenAI".to_string();

        let article = sample_article();
        let analysis = analyze(&article, &config).await;

        assert_eq!(analysis.suggested_title, article.title);
        assert_eq!(analysis.readability_score, 0);
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(analysis.content_suggestions.len(), 1);
        assert!(analysis.content_suggestions[0].contains("not enabled"));
    }

    #[tokio::test]
    async fn enabled_provider_without_a_key_names_the_missing_credential() {
        let mut config = Config::default();
        config.agent.provider = "OpenAI".to_string();
        config.provider_mut("OpenAI").unwrap().enabled = true;

        let analysis = analyze(&sample_article(), &config).await;
        assert!(analysis.content_suggestions[0].contains("no API key"));
    }

    #[tokio::test]
    async fn unknown_provider_names_the_configuration_gap() {
        let mut config = Config::default();
        config.agent.provider = "deepmind".to_string();

        let analysis = analyze(&sample_article(), &config).await;
        assert!(analysis.content_suggestions[0].contains("no provider named"));
        assert_eq!(
            analysis.raw_response.as_deref(),
            Some(analysis.content_suggestions[0].as_str())
        );
    }

    #[tokio::test]
    async fn analyze_article_persists_the_review_onto_the_store() {
        let mut store = MemoryStore::new();
        store.add_article(sample_article()).unwrap();

        let analysis = analyze_article(&mut store, "1", &Config::default())
            .await
            .unwrap();

        let stored = store.article("1").unwrap();
        assert_eq!(stored.analysis.as_ref(), Some(&analysis));
    }

    #[tokio::test]
    async fn analyze_article_reports_a_missing_article() {
        let mut store = MemoryStore::new();
        let err = analyze_article(&mut store, "404", &Config::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ArticleNotFound(_)));
    }
}
