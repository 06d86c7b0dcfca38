//! Handbook mining pipelines.
//!
//! The 1923 miner threads a running chapter through the pages, scores
//! sentence windows, deduplicates and selects a balanced set across the
//! eleven doctrines. The multi-edition miner collects quoted blocks and
//! strong sentences from any number of handbook PDFs and caps each
//! doctrine bucket.

use crate::classify::{
    evaluate_excerpt, guess_edition, match_author_line, next_edition_state, quoted_confidence,
    score_sentence, sentence_confidence, ChapterTracker, Edition, EditionState,
};
use crate::dedup::{dedupe_candidates, dedupe_edition_candidates};
use crate::extract::{extract_pdf_pages, ExtractError};
use crate::heuristics::{doctrine_label, DOCTRINES};
use crate::models::{
    Candidate, CandidateKind, EditionCandidate, EditionParams, EditionResult, EditionSummary,
    MinerParams, MiningResult, MiningSummary,
};
use crate::normalize::{
    char_len, collapse_whitespace, normalize_lines, normalize_page, normalize_text, trim_excerpt,
};
use crate::output::progress_bar;
use crate::select::{cap_per_doctrine, select_balanced};
use crate::window::{sentence_windows, split_sentences};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

/// Text between a pair of quotation marks.
static QUOTED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("valid regex"));

/// Bounds on the raw quoted block, before length filtering.
const QUOTED_BLOCK_CHARS: std::ops::RangeInclusive<usize> = 40..=400;

/// How far after a closing quote an author line is looked for.
const AUTHOR_LOOKAHEAD_CHARS: usize = 220;

// ============================================================================
// 1923 handbook
// ============================================================================

/// Scored candidates from one page of the 1923 handbook.
pub fn extract_candidates_from_page(
    page_text: &str,
    page_number: u32,
    chapter: Option<u32>,
    source_file: &str,
    params: &MinerParams,
) -> Vec<Candidate> {
    let text = normalize_page(page_text);
    if text.is_empty() {
        return Vec::new();
    }

    let sentences = split_sentences(&text);
    let length_range = params.min_len..=params.max_len;

    sentence_windows(&sentences, params.max_sents)
        .iter()
        .map(|w| trim_excerpt(w))
        .filter(|excerpt| length_range.contains(&char_len(excerpt)))
        .filter_map(|excerpt| {
            let (doctrine, score) =
                evaluate_excerpt(chapter, excerpt, &params.weights, params.min_score)?;
            Some(Candidate {
                doctrine: Some(doctrine),
                doctrine_label: doctrine_label(doctrine),
                text: excerpt.to_string(),
                author: format!("{} ({}), p. {}", params.source_title, params.source_year, page_number),
                source_title: params.source_title.clone(),
                source_year: params.source_year,
                source_file: source_file.to_string(),
                page: page_number,
                chapter,
                score,
            })
        })
        .collect()
}

/// Run the 1923 pipeline over already extracted pages.
pub fn mine_pages(pages: &[String], source_file: &str, params: &MinerParams, show_progress: bool) -> MiningResult {
    let progress = progress_bar(pages.len(), show_progress);
    let mut tracker = ChapterTracker::new();
    let mut candidates = Vec::new();

    for (i, page) in pages.iter().enumerate() {
        let chapter = tracker.advance(page);
        candidates.extend(extract_candidates_from_page(page, i as u32 + 1, chapter, source_file, params));
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let candidates = dedupe_candidates(candidates);
    let selected = select_balanced(&candidates, params.target, &DOCTRINES);

    let mut selected_by_doctrine = BTreeMap::new();
    for c in &selected {
        if let Some(d) = c.doctrine {
            *selected_by_doctrine.entry(d).or_insert(0) += 1;
        }
    }

    info!(
        candidates = candidates.len(),
        selected = selected.len(),
        "mined handbook"
    );

    MiningResult {
        parameters: params.clone(),
        summary: MiningSummary {
            pages: pages.len(),
            candidates_total: candidates.len(),
            selected: selected.len(),
            selected_by_doctrine,
        },
        candidates,
        selected,
    }
}

/// Extract and mine the 1923 handbook PDF.
pub fn mine_pdf(pdf_path: &Path, params: &MinerParams, show_progress: bool) -> Result<MiningResult, ExtractError> {
    let pages = extract_pdf_pages(pdf_path)?;
    info!(pages = pages.len(), pdf = %pdf_path.display(), "extracted pages");
    Ok(mine_pages(&pages, &file_name(pdf_path), params, show_progress))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ============================================================================
// Multi-edition
// ============================================================================

/// Where a page sits in an edition.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub edition: &'a Edition,
    pub source_file: &'a str,
    pub page: u32,
    pub doctrine: Option<u32>,
}

/// Author line right after a quoted block, if any.
fn author_after(joined: &str, end: usize) -> Option<String> {
    let tail: String = joined[end..].chars().take(AUTHOR_LOOKAHEAD_CHARS).collect();
    let first = tail
        .lines()
        .map(collapse_whitespace)
        .find(|line| !line.is_empty())?;
    match_author_line(&first)
}

/// Quoted-block and strong-sentence candidates from one page.
pub fn extract_edition_candidates(page_text: &str, ctx: &PageContext<'_>, params: &EditionParams) -> Vec<EditionCandidate> {
    let lines = normalize_lines(page_text);
    if lines.is_empty() {
        return Vec::new();
    }
    let joined = lines.join("\n");
    let length_range = params.min_len..=params.max_len;

    let candidate = |text: String, author: String, kind: CandidateKind, confidence: f64| EditionCandidate {
        doctrine: ctx.doctrine,
        author,
        text,
        source_title: ctx.edition.title.clone(),
        source_year: ctx.edition.year,
        source_file: ctx.source_file.to_string(),
        page: ctx.page,
        kind,
        confidence,
    };

    let mut out = Vec::new();

    for caps in QUOTED_BLOCK.captures_iter(&joined) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !QUOTED_BLOCK_CHARS.contains(&char_len(inner.as_str())) {
            continue;
        }
        let text = normalize_text(inner.as_str());
        if !length_range.contains(&char_len(&text)) {
            continue;
        }

        let author = author_after(&joined, whole.end());
        let confidence = quoted_confidence(author.is_some());
        let author = author.unwrap_or_else(|| ctx.edition.title.clone());
        out.push(candidate(text, author, CandidateKind::Quoted, confidence));
    }

    for line in &lines {
        for sentence in split_sentences(line) {
            if !length_range.contains(&char_len(&sentence)) {
                continue;
            }
            let score = score_sentence(&sentence, &params.weights);
            if score < params.weights.min_score {
                continue;
            }
            out.push(candidate(
                sentence,
                ctx.edition.title.clone(),
                CandidateKind::Sentence,
                sentence_confidence(score),
            ));
        }
    }

    out
}

/// Candidates from every page of one edition, before deduplication.
pub fn mine_edition_pages(
    pages: &[String],
    edition: &Edition,
    source_file: &str,
    params: &EditionParams,
) -> Vec<EditionCandidate> {
    let mut state = EditionState::default();
    let mut out = Vec::new();

    for (i, page) in pages.iter().enumerate() {
        state = next_edition_state(edition.year, page, state);
        let ctx = PageContext {
            edition,
            source_file,
            page: i as u32 + 1,
            doctrine: state.doctrine,
        };
        out.extend(extract_edition_candidates(page, &ctx, params));
    }

    out
}

/// Deduplicate and cap per doctrine.
pub fn finalize_edition_candidates(candidates: Vec<EditionCandidate>, params: &EditionParams) -> Vec<EditionCandidate> {
    cap_per_doctrine(dedupe_edition_candidates(candidates), params.max_per_doctrine)
}

/// Mine every PDF. All paths are checked before any work starts.
pub fn mine_editions(pdf_paths: &[PathBuf], params: &EditionParams, show_progress: bool) -> Result<EditionResult, ExtractError> {
    if let Some(missing) = pdf_paths.iter().find(|p| !p.exists()) {
        return Err(ExtractError::NotFound(missing.clone()));
    }

    let progress = progress_bar(pdf_paths.len(), show_progress);
    let mut all = Vec::new();
    let mut total_pages = 0usize;

    for path in pdf_paths {
        let edition = guess_edition(path);
        if let Some(ref pb) = progress {
            pb.set_message(edition.title.clone());
        }
        let pages = extract_pdf_pages(path)?;
        total_pages += pages.len();
        let found = mine_edition_pages(&pages, &edition, &file_name(path), params);
        info!(
            pdf = %path.display(),
            title = %edition.title,
            pages = pages.len(),
            candidates = found.len(),
            "mined edition"
        );
        all.extend(found);
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let candidates = finalize_edition_candidates(all, params);
    let summary = EditionSummary {
        pdfs: pdf_paths.len(),
        pages: total_pages,
        candidates_written: candidates.len(),
        by_doctrine: count_by_doctrine(&candidates),
    };

    Ok(EditionResult { candidates, summary })
}

/// Counts keyed by doctrine number, or `unknown`.
pub fn count_by_doctrine(candidates: &[EditionCandidate]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for c in candidates {
        let key = c
            .doctrine
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}
