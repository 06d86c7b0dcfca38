//! Filter an audit file down to non-scripture quotations.
//!
//! Records are handled as raw JSON objects so the audit output carries
//! every upstream field unchanged.

use crate::classify::has_scripture_marker;
use crate::dedup::dedupe_first_by;
use crate::models::{FilterParams, PwaQuote};
use crate::normalize::char_len;
use serde::Serialize;
use serde_json::Value;

const UNKNOWN_AUTHOR: &str = "Unknown";

#[derive(Debug, Clone, Serialize)]
pub struct FilterSummary {
    pub input_items: usize,
    pub kept: usize,
}

#[derive(Debug)]
pub struct FilterResult {
    pub kept: Vec<Value>,
    pub summary: FilterSummary,
}

fn str_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

/// Whether one record survives the filter.
pub fn keep_record(record: &Value, params: &FilterParams) -> bool {
    let text = str_field(record, "text").unwrap_or("").trim();
    if text.is_empty() {
        return false;
    }
    if !(params.min_len..=params.max_len).contains(&char_len(text)) {
        return false;
    }
    if has_scripture_marker(text) {
        return false;
    }
    if let Some(method) = params.only_method {
        if str_field(record, "method") != Some(method.as_str()) {
            return false;
        }
    }
    if params.drop_unknown {
        let author = str_field(record, "author").unwrap_or("");
        if author.is_empty() || author == UNKNOWN_AUTHOR {
            return false;
        }
    }
    true
}

/// Keep passing records, deduplicated by exact (author, text).
pub fn filter_records(records: Vec<Value>, params: &FilterParams) -> FilterResult {
    let input_items = records.len();
    let kept: Vec<Value> = records
        .into_iter()
        .filter(|r| keep_record(r, params))
        .collect();
    let kept = dedupe_first_by(kept, |r| {
        (
            str_field(r, "author").unwrap_or("").trim().to_string(),
            str_field(r, "text").unwrap_or("").trim().to_string(),
        )
    });

    FilterResult {
        summary: FilterSummary {
            input_items,
            kept: kept.len(),
        },
        kept,
    }
}

pub fn to_pwa(records: &[Value]) -> Vec<PwaQuote> {
    records
        .iter()
        .map(|r| {
            PwaQuote::new(
                str_field(r, "author").unwrap_or(UNKNOWN_AUTHOR),
                str_field(r, "text").unwrap_or(""),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuoteMethod;
    use serde_json::json;

    #[test]
    fn test_drops_scripture_and_length() {
        let params = FilterParams::default();
        assert!(keep_record(&json!({"author": "General Booth", "text": "Go for souls, and go for the worst."}), &params));
        assert!(!keep_record(&json!({"text": "For God so loved the world (John 3:16)."}), &params));
        assert!(!keep_record(&json!({"text": "Quoted from the NIV translation of it."}), &params));
        assert!(!keep_record(&json!({"text": "Too short."}), &params));
        assert!(!keep_record(&json!({"text": "   "}), &params));
        assert!(!keep_record(&json!({"author": "A"}), &params));
    }

    #[test]
    fn test_only_method_and_unknown() {
        let params = FilterParams {
            only_method: Some(QuoteMethod::Colon),
            drop_unknown: true,
            ..Default::default()
        };
        let text = "Prayer is the soul's sincere desire, uttered or unexpressed.";
        assert!(keep_record(&json!({"author": "Major Smith", "text": text, "method": "colon"}), &params));
        assert!(!keep_record(&json!({"author": "Major Smith", "text": text, "method": "quoted"}), &params));
        assert!(!keep_record(&json!({"author": "Unknown", "text": text, "method": "colon"}), &params));
        assert!(!keep_record(&json!({"text": text, "method": "colon"}), &params));
    }

    #[test]
    fn test_filter_dedupes_and_preserves_fields() {
        let text = "Prayer is the soul's sincere desire, uttered or unexpressed.";
        let records = vec![
            json!({"author": "Major Smith", "text": text, "source_url": "u1", "context": "c"}),
            json!({"author": "Major Smith ", "text": format!(" {}", text)}),
            json!({"author": "Captain Jones", "text": text}),
        ];
        let result = filter_records(records, &FilterParams::default());
        assert_eq!(result.summary.input_items, 3);
        assert_eq!(result.kept.len(), 2);
        assert_eq!(result.kept[0]["source_url"], "u1");

        let pwa = to_pwa(&result.kept);
        assert_eq!(pwa[1], PwaQuote::new("Captain Jones", text));
    }

    #[test]
    fn test_pwa_unknown_author() {
        let pwa = to_pwa(&[json!({"text": "x"})]);
        assert_eq!(pwa[0].author, "Unknown");
    }
}
