//! Deduplication of candidates by canonical text key.
//!
//! Candidates that share a [`dedup_key`] are the same quotation. Exactly one
//! representative survives per key: the best one under a total ranking, so
//! the result does not depend on input order.

use crate::models::{Candidate, CleanRecord, EditionCandidate};
use crate::normalize::dedup_key;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

/// Keep the best item per canonical key.
///
/// `better` orders items best-first and must be total. The output is sorted
/// by the same order. Items whose key is empty are discarded.
pub fn dedupe_by_rank<T, F>(mut items: Vec<T>, text: impl Fn(&T) -> &str, better: F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    items.sort_by(|a, b| better(a, b));

    let mut seen: HashSet<String> = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let key = dedup_key(text(item));
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

/// Keep the first item per exact key, preserving input order.
pub fn dedupe_first_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen: HashSet<K> = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Score descending, page ascending, text ascending.
pub fn rank_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(a.page.cmp(&b.page))
        .then_with(|| a.text.cmp(&b.text))
}

/// Confidence descending, page ascending, kind, text ascending.
pub fn rank_edition_candidates(a: &EditionCandidate, b: &EditionCandidate) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then(a.page.cmp(&b.page))
        .then(a.kind.cmp(&b.kind))
        .then_with(|| a.text.cmp(&b.text))
}

/// Score descending, page ascending (records without a page last), text.
pub fn rank_clean_records(a: &CleanRecord, b: &CleanRecord) -> Ordering {
    let page = |r: &CleanRecord| r.source.page.unwrap_or(u32::MAX);
    b.score
        .total_cmp(&a.score)
        .then(page(a).cmp(&page(b)))
        .then_with(|| a.text.cmp(&b.text))
}

pub fn dedupe_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    dedupe_by_rank(candidates, |c| c.text.as_str(), rank_candidates)
}

pub fn dedupe_edition_candidates(candidates: Vec<EditionCandidate>) -> Vec<EditionCandidate> {
    dedupe_by_rank(candidates, |c| c.text.as_str(), rank_edition_candidates)
}

pub fn dedupe_clean_records(records: Vec<CleanRecord>) -> Vec<CleanRecord> {
    dedupe_by_rank(records, |r| r.text.as_str(), rank_clean_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateKind, SourceRef};

    fn cand(text: &str, page: u32, score: f64) -> Candidate {
        Candidate {
            doctrine: Some(1),
            doctrine_label: "Scriptures".to_string(),
            text: text.to_string(),
            author: "Handbook".to_string(),
            source_title: "Handbook".to_string(),
            source_year: 1923,
            source_file: "h.pdf".to_string(),
            page,
            chapter: Some(2),
            score,
        }
    }

    #[test]
    fn test_keeps_highest_score() {
        let out = dedupe_candidates(vec![
            cand("We believe the Bible.", 3, 2.0),
            cand("we believe the bible", 9, 2.5),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].page, 9);
    }

    #[test]
    fn test_tie_breaks_on_earliest_page() {
        let out = dedupe_candidates(vec![
            cand("God is holy.", 12, 2.0),
            cand("God is holy!", 4, 2.0),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].page, 4);
    }

    #[test]
    fn test_order_independent() {
        let items = vec![
            cand("Grace is free.", 5, 2.0),
            cand("GRACE IS FREE", 5, 2.0),
            cand("Faith saves.", 2, 3.0),
            cand("faith, saves", 1, 1.9),
        ];
        let mut reversed = items.clone();
        reversed.reverse();
        assert_eq!(dedupe_candidates(items), dedupe_candidates(reversed));
    }

    #[test]
    fn test_output_sorted_and_unique() {
        let out = dedupe_candidates(vec![
            cand("A is the truth.", 5, 1.9),
            cand("B is the truth.", 2, 2.4),
            cand("a is the truth", 1, 1.9),
        ]);
        let keys: HashSet<String> = out.iter().map(|c| dedup_key(&c.text)).collect();
        assert_eq!(keys.len(), out.len());
        assert_eq!(out[0].text, "B is the truth.");
        assert_eq!(out[1].page, 1);
    }

    #[test]
    fn test_empty_keys_discarded() {
        let out = dedupe_candidates(vec![cand("— —", 1, 5.0)]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_edition_rank_prefers_quoted_on_tie() {
        let mk = |kind| EditionCandidate {
            doctrine: None,
            author: "A".to_string(),
            text: "Holiness is love.".to_string(),
            source_title: "T".to_string(),
            source_year: None,
            source_file: "f.pdf".to_string(),
            page: 1,
            kind,
            confidence: 0.75,
        };
        let out = dedupe_edition_candidates(vec![mk(CandidateKind::Sentence), mk(CandidateKind::Quoted)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, CandidateKind::Quoted);
    }

    #[test]
    fn test_clean_rank_missing_page_last() {
        let mk = |page: Option<u32>| CleanRecord {
            author: "A".to_string(),
            text: "Holiness is love.".to_string(),
            doctrine: None,
            doctrine_label: None,
            source: SourceRef { page, ..Default::default() },
            score: 2.0,
        };
        let out = dedupe_clean_records(vec![mk(None), mk(Some(40))]);
        assert_eq!(out[0].source.page, Some(40));
    }

    #[test]
    fn test_dedupe_first_by_preserves_order() {
        let out = dedupe_first_by(vec![("a", 1), ("b", 2), ("a", 3)], |x| x.0);
        assert_eq!(out, vec![("a", 1), ("b", 2)]);
    }
}
