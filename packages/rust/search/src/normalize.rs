//! Result normalization: raw search responses → uniform posting records.
//!
//! The upstream search provider's response shape is not contractually fixed:
//! depending on plan and query it has returned a mapping of postings, a
//! mapping keyed by URL, a plain list, or a bare scalar. Classification is
//! done once, up front, into [`ResponseShape`]; the rest of the pipeline
//! only ever sees [`Posting`] records.

use serde_json::Value;
use skillgap_shared::Posting;

/// Alternative keys under which a search result may carry the posting URL.
const URL_FIELDS: &[&str] = &["url", "link", "job_url", "href", "apply_link"];

/// Alternative keys under which a search result may carry the posting body.
const TEXT_FIELDS: &[&str] = &["html", "description", "text", "body", "content"];

// ---------------------------------------------------------------------------
// ResponseShape
// ---------------------------------------------------------------------------

/// The disambiguated shape of a raw search response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// A mapping whose values are all objects — the values are the postings.
    PostingMaps(Vec<Value>),
    /// A mapping whose keys all look like URLs — the keys are bare-URL records.
    UrlKeys(Vec<String>),
    /// Any other mapping — values are stringified.
    StringValues(Vec<String>),
    /// A sequence of results, passed through element-wise.
    Sequence(Vec<Value>),
    /// A single non-null scalar, wrapped as one record.
    Scalar(Value),
    /// Null — no results.
    Empty,
}

/// Classify a raw response value into its [`ResponseShape`].
pub fn classify(raw: &Value) -> ResponseShape {
    match raw {
        Value::Null => ResponseShape::Empty,
        Value::Object(map) => {
            if map.is_empty() {
                return ResponseShape::Empty;
            }
            if map.values().all(Value::is_object) {
                return ResponseShape::PostingMaps(map.values().cloned().collect());
            }
            if map.keys().all(|k| looks_like_url(k)) {
                return ResponseShape::UrlKeys(map.keys().cloned().collect());
            }
            ResponseShape::StringValues(map.values().map(stringify).collect())
        }
        Value::Array(items) => ResponseShape::Sequence(items.clone()),
        other => ResponseShape::Scalar(other.clone()),
    }
}

/// Normalize a raw search response into posting records.
///
/// Entries that carry neither a URL nor any text are dropped. Never fails:
/// an unusable response degrades to an empty vector.
pub fn normalize(raw: &Value) -> Vec<Posting> {
    let candidates: Vec<Value> = match classify(raw) {
        ResponseShape::PostingMaps(values) => values,
        ResponseShape::UrlKeys(keys) => keys.into_iter().map(Value::String).collect(),
        ResponseShape::StringValues(values) => values.into_iter().map(Value::String).collect(),
        ResponseShape::Sequence(items) => items,
        ResponseShape::Scalar(value) => vec![value],
        ResponseShape::Empty => return Vec::new(),
    };

    candidates
        .iter()
        .filter_map(posting_from_value)
        .enumerate()
        .map(|(rank, (url, inline_text))| Posting {
            url,
            inline_text,
            rank,
        })
        .collect()
}

/// Extract (url, inline_text) from one candidate entry, or `None` if it
/// carries neither.
fn posting_from_value(value: &Value) -> Option<(Option<String>, Option<String>)> {
    match value {
        Value::Object(map) => {
            let url = URL_FIELDS
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());

            let text = TEXT_FIELDS
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());

            if url.is_none() && text.is_none() {
                None
            } else {
                Some((url, text))
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else if looks_like_url(s) {
                Some((Some(s.to_string()), None))
            } else {
                Some((None, Some(s.to_string())))
            }
        }
        Value::Null => None,
        other => Some((None, Some(stringify(other)))),
    }
}

/// Heuristic for URL-shaped strings in key/entry position.
fn looks_like_url(s: &str) -> bool {
    s.starts_with("http") || s.starts_with("www")
}

/// Stringify a JSON value the way a human would read it (strings unquoted).
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dict_of_dicts_uses_values() {
        let raw = json!({
            "r1": {"url": "https://jobs.example.com/1", "content": "Rust engineer role"},
            "r2": {"link": "https://jobs.example.com/2"},
        });
        assert!(matches!(classify(&raw), ResponseShape::PostingMaps(_)));

        let postings = normalize(&raw);
        assert_eq!(postings.len(), 2);
        assert_eq!(
            postings[0].url.as_deref(),
            Some("https://jobs.example.com/1")
        );
        assert_eq!(postings[0].inline_text.as_deref(), Some("Rust engineer role"));
        assert_eq!(postings[1].url.as_deref(), Some("https://jobs.example.com/2"));
        assert_eq!(postings[1].rank, 1);
    }

    #[test]
    fn url_keyed_dict_uses_keys() {
        let raw = json!({
            "https://jobs.example.com/a": 0.91,
            "www.example.com/b": 0.87,
        });
        assert!(matches!(classify(&raw), ResponseShape::UrlKeys(_)));

        let postings = normalize(&raw);
        assert_eq!(postings.len(), 2);
        assert!(postings.iter().all(|p| p.url.is_some()));
    }

    #[test]
    fn mixed_dict_stringifies_values() {
        let raw = json!({"summary": "Senior role, remote", "score": 3});
        assert!(matches!(classify(&raw), ResponseShape::StringValues(_)));

        let postings = normalize(&raw);
        assert_eq!(postings.len(), 2);
        // Non-URL strings become inline text, not bogus URLs.
        assert!(postings.iter().all(|p| p.url.is_none()));
    }

    #[test]
    fn list_passes_through() {
        let raw = json!([
            {"url": "https://jobs.example.com/1"},
            "https://jobs.example.com/2",
            "Plain text posting body",
        ]);
        let postings = normalize(&raw);
        assert_eq!(postings.len(), 3);
        assert!(postings[1].url.is_some());
        assert!(postings[2].url.is_none());
        assert!(postings[2].inline_text.is_some());
    }

    #[test]
    fn null_and_empty_yield_nothing() {
        assert_eq!(normalize(&Value::Null), Vec::new());
        assert_eq!(normalize(&json!({})), Vec::new());
        assert_eq!(normalize(&json!([])), Vec::new());
    }

    #[test]
    fn scalar_wraps_to_single_record() {
        let postings = normalize(&json!("https://jobs.example.com/only"));
        assert_eq!(postings.len(), 1);
        assert_eq!(
            postings[0].url.as_deref(),
            Some("https://jobs.example.com/only")
        );

        let postings = normalize(&json!(42));
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].inline_text.as_deref(), Some("42"));
    }

    #[test]
    fn entries_without_url_or_text_are_dropped() {
        let raw = json!([{"title": 7}, "", null]);
        assert!(normalize(&raw).is_empty());
    }

    #[test]
    fn ranks_follow_normalized_order() {
        let raw = json!(["https://a.example.com", "https://b.example.com"]);
        let postings = normalize(&raw);
        assert_eq!(postings[0].rank, 0);
        assert_eq!(postings[1].rank, 1);
    }
}
