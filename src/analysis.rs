//! AI review records and the reply normalizer.
//!
//! Model replies arrive as freeform text. [`normalize`] turns any reply, or
//! the recorded absence of one, into an [`Analysis`] with every field
//! populated. It never fails: unparseable input degrades field by field into
//! defaults, and the raw reply is always kept verbatim for display and
//! debugging.

use serde::{Deserialize, Serialize};

/// The article title/content pair submitted for review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Current article title, used as the fallback suggested title
    pub source_title: String,
    /// Article body sent to the model; may be empty
    pub source_content: String,
}

impl AnalysisRequest {
    pub fn new(source_title: impl Into<String>, source_content: impl Into<String>) -> Self {
        Self {
            source_title: source_title.into(),
            source_content: source_content.into(),
        }
    }
}

/// What came back from the text-generation call.
///
/// The caller translates every upstream failure (provider disabled, missing
/// key, transport error) into `Unavailable` with a message naming the
/// condition, so the normalizer itself has no error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawModelOutput {
    /// The raw reply text, untouched
    Text(String),
    /// No reply was produced; the message says why
    Unavailable(String),
}

/// Overall sentiment of the article content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// A structured AI review of one article.
///
/// Every field is guaranteed present: `suggested_title` is never empty,
/// `readability_score` is always within 0-100, and `sentiment` is always one
/// of the three recognized values. `raw_response` preserves the reply (or the
/// unavailability message) byte for byte and is never re-parsed downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Title proposed by the model, or the original title
    pub suggested_title: String,
    /// Readability on a 0-100 scale; 0 when the reply carried none
    pub readability_score: u8,
    /// Parsed sentiment; unrecognized tokens become `Neutral`
    pub sentiment: Sentiment,
    /// Improvement suggestions in reply order; may be empty
    pub content_suggestions: Vec<String>,
    /// Verbatim reply text, kept for audit and debugging
    #[serde(default)]
    pub raw_response: Option<String>,
}

/// Placeholder inserted when a non-empty reply yields no parseable
/// suggestions; the full raw text always follows it, so nothing is dropped.
pub const UNSTRUCTURED_REPLY_NOTE: &str =
    "No structured suggestions found in the model reply; raw text follows.";

const TITLE_LABEL: &str = "suggested title:";
const SCORE_LABEL: &str = "readability score:";
const SENTIMENT_LABEL: &str = "sentiment:";
const SUGGESTIONS_LABEL: &str = "content improvement suggestions:";

/// Field values as they appear in the reply, before any defaulting.
///
/// `None` means the label was missing (or its value empty); the fallback for
/// each field is applied explicitly in [`normalize`], never here.
#[derive(Debug, Default, PartialEq, Eq)]
struct ExtractedFields {
    suggested_title: Option<String>,
    readability_score: Option<i64>,
    sentiment: Option<Sentiment>,
    suggestions: Vec<String>,
}

/// Normalize a model reply into a complete review record.
///
/// Total over all inputs: any text, including empty or garbled, maps to a
/// well-formed [`Analysis`]; an [`Unavailable`](RawModelOutput::Unavailable)
/// input maps to a defaults-only record carrying the diagnostic. Calling
/// twice with the same inputs yields structurally equal results.
pub fn normalize(request: AnalysisRequest, output: RawModelOutput) -> Analysis {
    let text = match output {
        RawModelOutput::Unavailable(reason) => {
            return Analysis {
                suggested_title: request.source_title,
                readability_score: 0,
                sentiment: Sentiment::Neutral,
                content_suggestions: vec![reason.clone()],
                raw_response: Some(reason),
            };
        }
        RawModelOutput::Text(text) => text,
    };

    let fields = extract_fields(&text);

    let content_suggestions = if fields.suggestions.is_empty() && !text.is_empty() {
        vec![UNSTRUCTURED_REPLY_NOTE.to_string(), text.clone()]
    } else {
        fields.suggestions
    };

    Analysis {
        suggested_title: fields.suggested_title.unwrap_or(request.source_title),
        readability_score: fields
            .readability_score
            .map(|score| score.clamp(0, 100) as u8)
            .unwrap_or(0),
        sentiment: fields.sentiment.unwrap_or_default(),
        content_suggestions,
        raw_response: Some(text),
    }
}

/// Scan the reply for labeled fields.
///
/// Grammar, applied line by line in reply order:
/// - a field line is `<label>` followed by the value on the same line; labels
///   are matched case-insensitively at the start of the line, first match
///   wins, and an empty value counts as missing;
/// - the suggestions section is the `content improvement suggestions:` line
///   followed by contiguous `- ` bullet lines; blank lines inside the section
///   are skipped, and the first non-blank non-bullet line ends it, so bullets
///   appearing elsewhere in the reply are not absorbed.
fn extract_fields(text: &str) -> ExtractedFields {
    let lines: Vec<&str> = text.lines().collect();

    let mut fields = ExtractedFields {
        suggested_title: first_label_value(&lines, TITLE_LABEL)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
        readability_score: first_label_value(&lines, SCORE_LABEL).and_then(parse_score),
        sentiment: first_label_value(&lines, SENTIMENT_LABEL).and_then(parse_sentiment),
        suggestions: Vec::new(),
    };

    if let Some(pos) = lines
        .iter()
        .position(|line| strip_label(line, SUGGESTIONS_LABEL).is_some())
    {
        for line in &lines[pos + 1..] {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match trimmed.strip_prefix('-') {
                Some(rest) => fields.suggestions.push(rest.trim().to_string()),
                None => break,
            }
        }
    }

    fields
}

/// Trimmed value of the first line carrying the label.
fn first_label_value<'a>(lines: &[&'a str], label: &str) -> Option<&'a str> {
    lines.iter().find_map(|line| strip_label(line, label))
}

/// Match `label` at the start of `line`, ASCII-case-insensitively, and return
/// the trimmed remainder.
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    match line.get(..label.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(label) => Some(line[label.len()..].trim()),
        _ => None,
    }
}

/// Parse a base-10 integer from the start of the value, ignoring whatever
/// trails the digits (`85/100` parses as 85). An over-long digit run
/// saturates rather than failing, so clamping still applies.
fn parse_score(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let mut digits = rest.bytes().take_while(u8::is_ascii_digit).peekable();
    digits.peek()?;

    let mut value: i64 = 0;
    for digit in digits {
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(digit - b'0'));
    }
    Some(if negative { -value } else { value })
}

/// Exactly `positive` or `negative` after trimming and lowercasing; anything
/// else is unrecognized and left to the `Neutral` fallback.
fn parse_sentiment(raw: &str) -> Option<Sentiment> {
    match raw.trim().to_lowercase().as_str() {
        "positive" => Some(Sentiment::Positive),
        "negative" => Some(Sentiment::Negative),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("原始标题", "<p>正文</p>")
    }

    #[test]
    fn full_reply_parses_all_fields() {
        let text = "Suggested Title: Foo\nReadability Score: 85\nSentiment: positive\nContent Improvement Suggestions:\n- Add examples\n- Add a diagram";
        let analysis = normalize(request(), RawModelOutput::Text(text.to_string()));

        assert_eq!(analysis.suggested_title, "Foo");
        assert_eq!(analysis.readability_score, 85);
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(
            analysis.content_suggestions,
            vec!["Add examples".to_string(), "Add a diagram".to_string()]
        );
        assert_eq!(analysis.raw_response.as_deref(), Some(text));
    }

    #[test]
    fn unavailable_output_yields_defaults_with_diagnostic() {
        let reason = "AI review is disabled: no provider is enabled".to_string();
        let analysis = normalize(request(), RawModelOutput::Unavailable(reason.clone()));

        assert_eq!(analysis.suggested_title, "原始标题");
        assert_eq!(analysis.readability_score, 0);
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(analysis.content_suggestions, vec![reason.clone()]);
        assert_eq!(analysis.raw_response, Some(reason));
    }

    #[test]
    fn reply_without_bullets_keeps_raw_text_after_note() {
        let text = "Suggested Title: Foo\nReadability Score: 70\nSentiment: negative\nContent Improvement Suggestions:\nnothing structured here";
        let analysis = normalize(request(), RawModelOutput::Text(text.to_string()));

        assert_eq!(analysis.content_suggestions.len(), 2);
        assert_eq!(analysis.content_suggestions[0], UNSTRUCTURED_REPLY_NOTE);
        assert_eq!(analysis.content_suggestions[1], text);
    }

    #[test]
    fn unstructured_reply_is_not_dropped() {
        let text = "The article is fine as it is.";
        let analysis = normalize(request(), RawModelOutput::Text(text.to_string()));

        assert_eq!(analysis.suggested_title, "原始标题");
        assert_eq!(analysis.readability_score, 0);
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(
            analysis.content_suggestions,
            vec![UNSTRUCTURED_REPLY_NOTE.to_string(), text.to_string()]
        );
    }

    #[test]
    fn empty_reply_yields_empty_suggestions() {
        let analysis = normalize(request(), RawModelOutput::Text(String::new()));

        assert_eq!(analysis.suggested_title, "原始标题");
        assert_eq!(analysis.readability_score, 0);
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert!(analysis.content_suggestions.is_empty());
        assert_eq!(analysis.raw_response.as_deref(), Some(""));
    }

    #[test]
    fn unrecognized_sentiment_falls_back_to_neutral() {
        let text = "Sentiment: Extremely Positive!!";
        let analysis = normalize(request(), RawModelOutput::Text(text.to_string()));
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn labels_match_case_insensitively() {
        let text = "SUGGESTED TITLE: Better\nREADABILITY SCORE: 42\nSENTIMENT: NEGATIVE";
        let analysis = normalize(request(), RawModelOutput::Text(text.to_string()));

        assert_eq!(analysis.suggested_title, "Better");
        assert_eq!(analysis.readability_score, 42);
        assert_eq!(analysis.sentiment, Sentiment::Negative);
    }

    #[test]
    fn missing_labels_default_independently() {
        let text = "Readability Score: 55\nno other labels anywhere";
        let analysis = normalize(request(), RawModelOutput::Text(text.to_string()));

        assert_eq!(analysis.suggested_title, "原始标题");
        assert_eq!(analysis.readability_score, 55);
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn raw_response_is_verbatim() {
        let text = "garbled \r\n\t ∆ output\nSentiment: positive\n";
        let analysis = normalize(request(), RawModelOutput::Text(text.to_string()));
        assert_eq!(analysis.raw_response.as_deref(), Some(text));
    }

    #[test]
    fn normalize_is_idempotent() {
        let text = "Suggested Title: Foo\nSentiment: positive";
        let first = normalize(request(), RawModelOutput::Text(text.to_string()));
        let second = normalize(request(), RawModelOutput::Text(text.to_string()));
        assert_eq!(first, second);
    }

    #[test]
    fn score_ignores_trailing_characters() {
        let text = "Readability Score: 85/100";
        let analysis = normalize(request(), RawModelOutput::Text(text.to_string()));
        assert_eq!(analysis.readability_score, 85);
    }

    #[test]
    fn score_out_of_range_is_clamped() {
        let high = normalize(
            request(),
            RawModelOutput::Text("Readability Score: 150".to_string()),
        );
        assert_eq!(high.readability_score, 100);

        let low = normalize(
            request(),
            RawModelOutput::Text("Readability Score: -12".to_string()),
        );
        assert_eq!(low.readability_score, 0);
    }

    #[test]
    fn unparseable_score_defaults_to_zero() {
        let analysis = normalize(
            request(),
            RawModelOutput::Text("Readability Score: excellent".to_string()),
        );
        assert_eq!(analysis.readability_score, 0);
    }

    #[test]
    fn bullets_stop_at_the_next_section() {
        let text = "Content Improvement Suggestions:\n- First\n- Second\nSentiment: positive\n- not a suggestion";
        let fields = extract_fields(text);
        assert_eq!(fields.suggestions, vec!["First", "Second"]);
        assert_eq!(fields.sentiment, Some(Sentiment::Positive));
    }

    #[test]
    fn blank_lines_inside_the_section_are_tolerated() {
        let text = "Content Improvement Suggestions:\n\n- First\n\n- Second\n\nClosing remark.";
        let fields = extract_fields(text);
        assert_eq!(fields.suggestions, vec!["First", "Second"]);
    }

    #[test]
    fn bullets_are_trimmed() {
        let text = "Content Improvement Suggestions:\n  -   spaced out   ";
        let fields = extract_fields(text);
        assert_eq!(fields.suggestions, vec!["spaced out"]);
    }

    #[test]
    fn empty_title_value_counts_as_missing() {
        let fields = extract_fields("Suggested Title:   \nSentiment: positive");
        assert_eq!(fields.suggested_title, None);

        let analysis = normalize(
            request(),
            RawModelOutput::Text("Suggested Title:\n- stray".to_string()),
        );
        assert_eq!(analysis.suggested_title, "原始标题");
    }

    #[test]
    fn first_matching_label_wins() {
        let text = "Suggested Title: First\nSuggested Title: Second";
        let fields = extract_fields(text);
        assert_eq!(fields.suggested_title.as_deref(), Some("First"));
    }

    #[test]
    fn crlf_line_endings_parse_cleanly() {
        let text = "Suggested Title: Foo\r\nReadability Score: 60\r\nSentiment: negative\r\n";
        let analysis = normalize(request(), RawModelOutput::Text(text.to_string()));

        assert_eq!(analysis.suggested_title, "Foo");
        assert_eq!(analysis.readability_score, 60);
        assert_eq!(analysis.sentiment, Sentiment::Negative);
    }
}
