//! Data structures for the quote mining pipeline.

use crate::heuristics::{ScoringWeights, SentenceWeights};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A provisional quotation mined from one handbook page.
///
/// Serializes flat; this is the audit file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub doctrine: Option<u32>,
    pub doctrine_label: String,
    pub text: String,
    pub author: String,
    pub source_title: String,
    pub source_year: i32,
    pub source_file: String,
    pub page: u32,
    pub chapter: Option<u32>,
    pub score: f64,
}

impl Candidate {
    /// Feed-ready record with nested provenance.
    pub fn to_final(&self) -> FinalQuote {
        FinalQuote {
            author: self.author.clone(),
            text: self.text.clone(),
            doctrine: self.doctrine,
            doctrine_label: self.doctrine_label.clone(),
            source: SourceRef {
                title: Some(self.source_title.clone()),
                year: Some(self.source_year),
                page: Some(self.page),
                file: Some(self.source_file.clone()),
                chapter: self.chapter,
                doctrine: None,
            },
        }
    }
}

/// Structured provenance of a quotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceRef {
    #[serde(deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub year: Option<i32>,
    #[serde(deserialize_with = "lenient::number")]
    pub page: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub file: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub chapter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::number")]
    pub doctrine: Option<u32>,
}

/// Final output record of the 1923 handbook miner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalQuote {
    pub author: String,
    pub text: String,
    pub doctrine: Option<u32>,
    pub doctrine_label: String,
    pub source: SourceRef,
}

/// How a multi-edition candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    /// Text between quotation marks
    Quoted,
    /// A strong doctrinal sentence
    Sentence,
}

/// Candidate from the multi-edition miner (audit layout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditionCandidate {
    pub doctrine: Option<u32>,
    pub author: String,
    pub text: String,
    pub source_title: String,
    pub source_year: Option<i32>,
    pub source_file: String,
    pub page: u32,
    pub kind: CandidateKind,
    pub confidence: f64,
}

impl EditionCandidate {
    pub fn to_minimal(&self) -> EditionQuote {
        EditionQuote {
            author: self.author.clone(),
            text: self.text.clone(),
            source: SourceRef {
                title: Some(self.source_title.clone()),
                year: self.source_year,
                page: Some(self.page),
                file: Some(self.source_file.clone()),
                chapter: None,
                doctrine: self.doctrine,
            },
        }
    }
}

/// Minimal multi-edition output record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditionQuote {
    pub author: String,
    pub text: String,
    pub source: SourceRef,
}

/// Feed-ready `{author, text}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PwaQuote {
    pub author: String,
    pub text: String,
}

impl PwaQuote {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }
}

impl From<&CleanRecord> for PwaQuote {
    fn from(rec: &CleanRecord) -> Self {
        Self::new(rec.author.as_str(), rec.text.as_str())
    }
}

impl From<&OcrHit> for PwaQuote {
    fn from(hit: &OcrHit) -> Self {
        Self::new(hit.author.as_str(), hit.text.as_str())
    }
}

/// A previously mined record read back from JSON.
///
/// Accepts both the nested final layout and the flat audit layout.
/// Unknown fields are ignored, and a field of an unexpected JSON type is
/// read as missing rather than failing the whole file. An empty `source`
/// object counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InputRecord {
    #[serde(deserialize_with = "lenient::text")]
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub text: Option<String>,
    pub doctrine: Option<Value>,
    pub doctrine_label: Option<Value>,
    #[serde(deserialize_with = "lenient::number")]
    pub score: Option<f64>,
    #[serde(deserialize_with = "lenient::source")]
    pub source: Option<SourceRef>,
    #[serde(deserialize_with = "lenient::text")]
    pub source_title: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub source_year: Option<i32>,
    #[serde(deserialize_with = "lenient::number")]
    pub page: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub source_file: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub chapter: Option<u32>,
}

/// Field readers for hand-edited or older JSON inputs.
mod lenient {
    use super::SourceRef;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    /// Strings as-is; numbers and booleans rendered; anything else is `None`.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Numbers, or strings that parse as one (`"12"`); otherwise `None`.
    pub fn number<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
    {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.to_string().parse().ok(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// A non-empty object; anything else leaves the flat fields in charge.
    pub fn source<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SourceRef>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) if !map.is_empty() => serde_json::from_value(Value::Object(map)).ok(),
            _ => None,
        })
    }
}

impl InputRecord {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Author, or `fallback` when missing or empty.
    pub fn author_or(&self, fallback: &str) -> String {
        match self.author.as_deref() {
            Some(a) if !a.is_empty() => a.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Doctrine when it is an integer.
    pub fn doctrine_number(&self) -> Option<u32> {
        self.doctrine
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|d| u32::try_from(d).ok())
    }

    /// Doctrine label rendered as text, when present and non-empty.
    pub fn doctrine_label_text(&self) -> Option<String> {
        match self.doctrine_label.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Nested source when present, otherwise built from the flat fields.
    pub fn source(&self) -> SourceRef {
        match &self.source {
            Some(source) => source.clone(),
            None => SourceRef {
                title: self.source_title.clone(),
                year: self.source_year,
                page: self.page,
                file: self.source_file.clone(),
                chapter: self.chapter,
                doctrine: None,
            },
        }
    }
}

/// Cleaned record with metadata preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub author: String,
    pub text: String,
    pub doctrine: Option<u32>,
    pub doctrine_label: Option<String>,
    pub source: SourceRef,
    pub score: f64,
}

/// Review flags attached during triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFlag {
    OcrHeader,
    StructureMarker,
    OcrHyphenArtifact,
    IncompleteOrFragment,
    NeedsContextOpening,
    PolemicalLanguage,
    SensitiveGroupTerm,
    ScriptureHeavy,
    ScripturePresent,
    DoctrinalAnchor,
}

impl ReviewFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewFlag::OcrHeader => "ocr_header",
            ReviewFlag::StructureMarker => "structure_marker",
            ReviewFlag::OcrHyphenArtifact => "ocr_hyphen_artifact",
            ReviewFlag::IncompleteOrFragment => "incomplete_or_fragment",
            ReviewFlag::NeedsContextOpening => "needs_context_opening",
            ReviewFlag::PolemicalLanguage => "polemical_language",
            ReviewFlag::SensitiveGroupTerm => "sensitive_group_term",
            ReviewFlag::ScriptureHeavy => "scripture_heavy",
            ReviewFlag::ScripturePresent => "scripture_present",
            ReviewFlag::DoctrinalAnchor => "doctrinal_anchor",
        }
    }
}

/// Triage outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Safe,
    Flag,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRow {
    pub author: String,
    pub text: String,
    pub doctrine: Option<Value>,
    pub doctrine_label: Option<Value>,
    pub source: SourceRef,
    pub flags: Vec<ReviewFlag>,
}

/// Quotation found in OCR newspaper text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrHit {
    pub author: String,
    pub text: String,
    pub source_url: String,
    pub context: String,
}

// ============================================================================
// Parameters
// ============================================================================

/// 1923 handbook miner parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerParams {
    pub min_len: usize,
    pub max_len: usize,
    pub max_sents: usize,
    pub target: usize,
    pub min_score: f64,
    pub weights: ScoringWeights,
    pub source_title: String,
    pub source_year: i32,
}

impl Default for MinerParams {
    fn default() -> Self {
        Self {
            min_len: 120,
            max_len: 280,
            max_sents: 3,
            target: 365,
            min_score: 1.8,
            weights: ScoringWeights::default(),
            source_title: "Handbook of Salvation Army Doctrine".to_string(),
            source_year: 1923,
        }
    }
}

/// Multi-edition miner parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditionParams {
    pub min_len: usize,
    pub max_len: usize,
    pub max_per_doctrine: usize,
    pub weights: SentenceWeights,
}

impl Default for EditionParams {
    fn default() -> Self {
        Self {
            min_len: 80,
            max_len: 260,
            max_per_doctrine: 80,
            weights: SentenceWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanParams {
    pub min_len: usize,
    pub max_len: usize,
    pub split_we_believe: bool,
}

impl Default for CleanParams {
    fn default() -> Self {
        Self {
            min_len: 90,
            max_len: 320,
            split_we_believe: true,
        }
    }
}

/// How an upstream collector found a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteMethod {
    Quoted,
    Colon,
    Blockquote,
}

impl QuoteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteMethod::Quoted => "quoted",
            QuoteMethod::Colon => "colon",
            QuoteMethod::Blockquote => "blockquote",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterParams {
    pub min_len: usize,
    pub max_len: usize,
    pub only_method: Option<QuoteMethod>,
    pub drop_unknown: bool,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            min_len: 25,
            max_len: 200,
            only_method: None,
            drop_unknown: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrParams {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for OcrParams {
    fn default() -> Self {
        Self {
            min_len: 45,
            max_len: 220,
        }
    }
}

// ============================================================================
// Results and summaries
// ============================================================================

/// Full 1923 mining result
#[derive(Debug, Serialize)]
pub struct MiningResult {
    pub parameters: MinerParams,
    /// Every deduplicated candidate, best first
    pub candidates: Vec<Candidate>,
    pub selected: Vec<Candidate>,
    pub summary: MiningSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct MiningSummary {
    pub pages: usize,
    pub candidates_total: usize,
    pub selected: usize,
    pub selected_by_doctrine: BTreeMap<u32, usize>,
}

#[derive(Debug, Serialize)]
pub struct EditionResult {
    pub candidates: Vec<EditionCandidate>,
    pub summary: EditionSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditionSummary {
    pub pdfs: usize,
    pub pages: usize,
    pub candidates_written: usize,
    /// Keyed by doctrine number, or `unknown`
    pub by_doctrine: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct CleanResult {
    pub records: Vec<CleanRecord>,
    pub summary: CleanSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanSummary {
    pub input_items: usize,
    pub produced_before_dedupe: usize,
    pub split_sources: usize,
    pub dropped_empty: usize,
    pub dropped_len: usize,
    pub final_unique: usize,
}

#[derive(Debug, Default)]
pub struct ReviewResult {
    pub safe: Vec<ReviewRow>,
    pub flagged: Vec<ReviewRow>,
    pub dropped: Vec<ReviewRow>,
    pub duplicates_skipped: usize,
    pub input_items: usize,
}
