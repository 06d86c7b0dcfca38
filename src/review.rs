//! Review triage: tag mined records with flags and bucket them into
//! safe / flag / drop.
//!
//! Flags are advisory. The decision table only drops records that are both
//! fragmentary and carry OCR header or structure leakage; everything else
//! that looks risky is left for a human to look at.

use crate::classify::scripture_density;
use crate::clean::DEFAULT_AUTHOR;
use crate::heuristics::{
    contains_any, GOOD_ANCHORS, MIN_COMPLETE_LEN, NEEDS_CONTEXT_STARTS, OCR_HEADER_MARKERS,
    POLEMIC_TERMS, SENSITIVE_GROUP_TERMS, STRUCTURE_MARKERS,
};
use crate::models::{Bucket, InputRecord, ReviewFlag, ReviewResult, ReviewRow};
use crate::normalize::{char_len, dedup_key, normalize_text};
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Terminal punctuation, optionally followed by a closing quote.
static TERMINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.!?]["']?\s*$"#).expect("valid regex"));

/// Roman or arabic footnote number left at the end, e.g. `... iv.` or `... 12.`
static DANGLING_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:\b[ivx]{1,6}\.\s*$)|(?:\b\d+\.\s*$)").expect("valid regex"));

/// Flags that send a record to the `flag` bucket.
const FLAG_SUBSET: &[ReviewFlag] = &[
    ReviewFlag::PolemicalLanguage,
    ReviewFlag::SensitiveGroupTerm,
    ReviewFlag::NeedsContextOpening,
    ReviewFlag::OcrHeader,
    ReviewFlag::StructureMarker,
    ReviewFlag::IncompleteOrFragment,
];

/// Too short, unterminated, or ending in a footnote number.
pub fn is_incomplete(text: &str) -> bool {
    let t = normalize_text(text);
    if t.is_empty() || char_len(&t) < MIN_COMPLETE_LEN {
        return true;
    }
    if !TERMINAL.is_match(&t) && !t.ends_with(';') {
        return true;
    }
    DANGLING_END.is_match(&t)
}

/// Opens with a connective that leans on the preceding sentence.
pub fn starts_needing_context(text: &str) -> bool {
    let t = normalize_text(text).to_lowercase();
    NEEDS_CONTEXT_STARTS.iter().any(|p| {
        t.strip_prefix(p)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric()))
    })
}

/// Every flag that applies to a record, in a fixed order.
///
/// `raw` is the text as read; OCR hyphen artifacts are only visible there.
pub fn review_flags(raw: &str) -> Vec<ReviewFlag> {
    let text = normalize_text(raw);
    let mut flags = Vec::new();

    if contains_any(&text, OCR_HEADER_MARKERS) {
        flags.push(ReviewFlag::OcrHeader);
    }
    if contains_any(&text, STRUCTURE_MARKERS) {
        flags.push(ReviewFlag::StructureMarker);
    }
    if raw.contains('¬') || raw.contains('\u{00AD}') {
        flags.push(ReviewFlag::OcrHyphenArtifact);
    }
    if is_incomplete(&text) {
        flags.push(ReviewFlag::IncompleteOrFragment);
    }
    if starts_needing_context(&text) {
        flags.push(ReviewFlag::NeedsContextOpening);
    }
    if contains_any(&text, POLEMIC_TERMS) {
        flags.push(ReviewFlag::PolemicalLanguage);
    }
    if contains_any(&text, SENSITIVE_GROUP_TERMS) {
        flags.push(ReviewFlag::SensitiveGroupTerm);
    }
    match scripture_density(&text) {
        0 => {}
        1 => flags.push(ReviewFlag::ScripturePresent),
        _ => flags.push(ReviewFlag::ScriptureHeavy),
    }
    if contains_any(&text, GOOD_ANCHORS) {
        flags.push(ReviewFlag::DoctrinalAnchor);
    }

    flags
}

/// Decision table.
pub fn decide(flags: &[ReviewFlag]) -> Bucket {
    let has = |f: ReviewFlag| flags.contains(&f);

    if has(ReviewFlag::IncompleteOrFragment) && (has(ReviewFlag::OcrHeader) || has(ReviewFlag::StructureMarker)) {
        return Bucket::Drop;
    }
    if FLAG_SUBSET.iter().any(|f| has(*f)) {
        return Bucket::Flag;
    }
    Bucket::Safe
}

/// Tag one record and pick its bucket.
pub fn classify_record(item: &InputRecord) -> (Bucket, ReviewRow) {
    let flags = review_flags(item.text());
    let bucket = decide(&flags);
    let row = ReviewRow {
        author: item.author_or(DEFAULT_AUTHOR),
        text: normalize_text(item.text()),
        doctrine: item.doctrine.clone(),
        doctrine_label: item.doctrine_label.clone(),
        source: item.source(),
        flags,
    };
    (bucket, row)
}

/// Triage a batch. Repeats of an already seen key are counted and skipped.
pub fn review_records(records: &[InputRecord]) -> ReviewResult {
    let mut result = ReviewResult {
        input_items: records.len(),
        ..Default::default()
    };
    let mut seen: HashSet<String> = HashSet::new();

    for item in records {
        let (bucket, row) = classify_record(item);
        if !seen.insert(dedup_key(&row.text)) {
            result.duplicates_skipped += 1;
            continue;
        }
        match bucket {
            Bucket::Safe => result.safe.push(row),
            Bucket::Flag => result.flagged.push(row),
            Bucket::Drop => result.dropped.push(row),
        }
    }

    result
}

/// Flag counts, highest count first, then by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagCounts(pub Vec<(ReviewFlag, usize)>);

impl FlagCounts {
    pub fn from_rows(rows: &[ReviewRow]) -> Self {
        let mut counts: HashMap<ReviewFlag, usize> = HashMap::new();
        for flag in rows.iter().flat_map(|r| r.flags.iter()) {
            *counts.entry(*flag).or_insert(0) += 1;
        }
        let mut pairs: Vec<(ReviewFlag, usize)> = counts.into_iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        FlagCounts(pairs)
    }

    pub fn get(&self, flag: ReviewFlag) -> usize {
        self.0
            .iter()
            .find(|(f, _)| *f == flag)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

impl Serialize for FlagCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (flag, n) in &self.0 {
            map.serialize_entry(flag.as_str(), n)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewReport {
    pub input_items: usize,
    pub deduped_duplicates_skipped: usize,
    pub safe: usize,
    pub flagged: usize,
    pub dropped: usize,
    pub safe_flag_counts: FlagCounts,
    pub flagged_flag_counts: FlagCounts,
    pub dropped_flag_counts: FlagCounts,
}

pub fn build_report(result: &ReviewResult) -> ReviewReport {
    ReviewReport {
        input_items: result.input_items,
        deduped_duplicates_skipped: result.duplicates_skipped,
        safe: result.safe.len(),
        flagged: result.flagged.len(),
        dropped: result.dropped.len(),
        safe_flag_counts: FlagCounts::from_rows(&result.safe),
        flagged_flag_counts: FlagCounts::from_rows(&result.flagged),
        dropped_flag_counts: FlagCounts::from_rows(&result.dropped),
    }
}
