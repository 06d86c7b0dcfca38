//! Quote Miner Library
//!
//! Mines, cleans and triages short doctrinal quotations from historical
//! handbooks, official web pages and newspaper OCR text. Every pipeline
//! stage is a plain function, so each can be run and tested on its own.
//!
//! # Example
//!
//! ```no_run
//! use quote_miner::prelude::*;
//! use std::path::Path;
//!
//! let params = MinerParams::default();
//! let result = mine_pdf(Path::new("handbookofsalvat00unse.pdf"), &params, false).unwrap();
//!
//! println!(
//!     "{} candidates, {} selected",
//!     result.summary.candidates_total, result.summary.selected
//! );
//! ```
//!
//! # Review Example
//!
//! ```no_run
//! use quote_miner::prelude::*;
//! use std::path::Path;
//!
//! let records: Vec<InputRecord> = load_json_array(Path::new("handbook_1923_quotes.json")).unwrap();
//! let result = review_records(&records);
//! let report = build_report(&result);
//!
//! println!("{} safe, {} flagged, {} dropped", report.safe, report.flagged, report.dropped);
//! ```

pub mod classify;
pub mod clean;
pub mod collect;
pub mod dedup;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod heuristics;
pub mod mine;
pub mod models;
pub mod normalize;
pub mod output;
pub mod review;
pub mod robots;
pub mod select;
pub mod window;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::classify::{
        detect_roman_chapter, doctrine_for, evaluate_excerpt, guess_author, guess_edition,
        is_scripture_heavy, score_excerpt, score_sentence, ChapterTracker, Edition,
    };
    pub use crate::clean::clean_records;
    pub use crate::collect::{
        collect_ocr, collect_official, extract_ocr_hits, CollectError, OfficialPage,
        OCR_TIMEOUT, OCR_USER_AGENT, OFFICIAL_TIMEOUT, OFFICIAL_USER_AGENT,
    };
    pub use crate::dedup::{dedupe_by_rank, dedupe_candidates};
    pub use crate::extract::{extract_pdf_pages, html_text_lines, load_json_array, ExtractError};
    pub use crate::fetch::{BlockingFetcher, FetchError, HttpFetch, HttpResponse};
    pub use crate::filter::{filter_records, FilterResult};
    pub use crate::heuristics::{ScoringWeights, SentenceWeights, DOCTRINES};
    pub use crate::mine::{mine_editions, mine_pages, mine_pdf};
    pub use crate::models::{
        Bucket, Candidate, CandidateKind, CleanParams, CleanRecord, EditionCandidate,
        EditionParams, FilterParams, FinalQuote, InputRecord, MinerParams, MiningResult, OcrHit,
        OcrParams, PwaQuote, QuoteMethod, ReviewFlag, ReviewRow,
    };
    pub use crate::normalize::{dedup_key, normalize_text, strip_boilerplate};
    pub use crate::output::{print_summary, write_json_file, OutputError};
    pub use crate::review::{build_report, review_records, ReviewReport};
    pub use crate::robots::{parse_robots, RobotsGate};
    pub use crate::select::select_balanced;
    pub use crate::window::{sentence_windows, split_sentences};
}

// Re-export commonly used types at the crate root
pub use models::{Candidate, InputRecord, MinerParams, MiningResult, PwaQuote};
