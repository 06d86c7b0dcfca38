//! Second-pass cleanup of mined handbook records.

use crate::dedup::dedupe_clean_records;
use crate::models::{CleanParams, CleanRecord, CleanResult, CleanSummary, InputRecord, PwaQuote};
use crate::normalize::{char_len, split_we_believe, strip_boilerplate};
use tracing::debug;

/// Author used when a record carries none.
pub const DEFAULT_AUTHOR: &str = "Handbook of Salvation Army Doctrine (1923)";

/// Strip, split, length-filter and deduplicate mined records.
pub fn clean_records(records: &[InputRecord], params: &CleanParams) -> CleanResult {
    let mut summary = CleanSummary {
        input_items: records.len(),
        ..Default::default()
    };
    let length_range = params.min_len..=params.max_len;
    let mut produced = Vec::new();

    for item in records {
        let chunks = if params.split_we_believe {
            let parts = split_we_believe(item.text());
            if parts.len() > 1 {
                summary.split_sources += 1;
            }
            parts
        } else {
            vec![strip_boilerplate(item.text())]
        };

        // Splitting drops blobs that strip to nothing; count those too.
        if chunks.is_empty() {
            summary.dropped_empty += 1;
        }

        for chunk in chunks {
            let text = strip_boilerplate(&chunk);
            if text.is_empty() {
                summary.dropped_empty += 1;
                continue;
            }
            if !length_range.contains(&char_len(&text)) {
                summary.dropped_len += 1;
                continue;
            }
            produced.push(CleanRecord {
                author: item.author_or(DEFAULT_AUTHOR),
                text,
                doctrine: item.doctrine_number(),
                doctrine_label: item.doctrine_label_text(),
                source: item.source(),
                score: item.score.unwrap_or(0.0),
            });
        }
    }

    summary.produced_before_dedupe = produced.len();
    let records = dedupe_clean_records(produced);
    summary.final_unique = records.len();
    debug!(?summary, "cleaned records");

    CleanResult { records, summary }
}

pub fn to_pwa(records: &[CleanRecord]) -> Vec<PwaQuote> {
    records.iter().map(PwaQuote::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> InputRecord {
        serde_json::from_str(json).unwrap()
    }

    fn relaxed() -> CleanParams {
        CleanParams {
            min_len: 10,
            max_len: 320,
            split_we_believe: true,
        }
    }

    #[test]
    fn test_splits_we_believe_blocks() {
        let recs = vec![record(
            r#"{"text":"Sec. II.—God We believe in one God. We believe that Jesus Christ is truly God and man.","doctrine":2,"score":2.5,"page":12}"#,
        )];
        let result = clean_records(&recs, &relaxed());
        assert_eq!(result.summary.split_sources, 1);
        assert_eq!(result.records.len(), 2);
        assert!(result.records.iter().all(|r| r.text.starts_with("We believe")));
        assert_eq!(result.records[0].source.page, Some(12));
        assert_eq!(result.records[0].author, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_no_split_keeps_blob() {
        let recs = vec![record(r#"{"text":"We believe in one God. We believe in grace."}"#)];
        let params = CleanParams {
            split_we_believe: false,
            ..relaxed()
        };
        let result = clean_records(&recs, &params);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.summary.split_sources, 0);
    }

    #[test]
    fn test_length_and_empty_drops() {
        let recs = vec![
            record(r#"{"text":"  "}"#),
            record(r#"{"text":"Too short."}"#),
            record(r#"{"text":"Holiness is the privilege of every believer in Christ."}"#),
        ];
        let params = CleanParams {
            min_len: 20,
            ..relaxed()
        };
        let result = clean_records(&recs, &params);
        assert_eq!(result.summary.dropped_empty, 1);
        assert_eq!(result.summary.dropped_len, 1);
        assert_eq!(result.summary.final_unique, 1);
        for r in &result.records {
            assert!((20..=320).contains(&char_len(&r.text)));
        }
    }

    #[test]
    fn test_dedupe_keeps_best_score_then_page() {
        let recs = vec![
            record(r#"{"text":"God is love and light.","score":2.0,"source":{"page":30}}"#),
            record(r#"{"text":"God is love, and light!","score":2.0,"source":{"page":5}}"#),
            record(r#"{"text":"GOD IS LOVE AND LIGHT","score":1.0,"source":{"page":1}}"#),
        ];
        let result = clean_records(&recs, &relaxed());
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].source.page, Some(5));
        assert_eq!(result.summary.produced_before_dedupe, 3);
    }

    #[test]
    fn test_metadata_carried() {
        let recs = vec![record(
            r#"{"author":"Booth","text":"Grace is free to all who ask.","doctrine":"x","doctrine_label":"Grace","score":1.5}"#,
        )];
        let result = clean_records(&recs, &relaxed());
        let r = &result.records[0];
        assert_eq!(r.author, "Booth");
        assert_eq!(r.doctrine, None);
        assert_eq!(r.doctrine_label.as_deref(), Some("Grace"));
        assert_eq!(to_pwa(&result.records), vec![PwaQuote::new("Booth", "Grace is free to all who ask.")]);
    }
}
