//! Doctrine classification and heuristic scoring.
//!
//! Chapter markers set a running "current chapter" that is threaded from
//! one page to the next as plain fold state. The chapter picks a doctrine
//! bucket, refined by keywords where a chapter covers two doctrines. Scores
//! are linear and hand-tuned; see [`ScoringWeights`].

use crate::heuristics::{
    chapter_doctrine, contains_any, doctrine_keywords, roman_to_int, ScoringWeights,
    SentenceWeights, BIBLE_BOOKS, BIBLE_TRANSLATIONS, CHARITY_EXCLUDE, DEFINITIONAL_PHRASES,
    DOCTRINAL_VOCABULARY, KW_CONTINUANCE, KW_JUSTIFICATION, KW_TRINITY, RANKS,
    THEOLOGY_INCLUDE,
};
use crate::normalize::char_len;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static ROMAN_CHAPTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bCHAPTER\s+([IVXLC]+)\b").expect("valid regex"));

static NUMBERED_CHAPTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bChapter\s+(\d{1,2})\b").expect("valid regex"));

static VERSE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}:\d{1,3}\b").expect("valid regex"));

/// Book names are proper nouns, so they match case-sensitively; lowercase
/// "revelation" or "acts" in running prose is not a citation.
static BOOK_NAME: LazyLock<Regex> = LazyLock::new(|| {
    let books: Vec<String> = BIBLE_BOOKS.iter().map(|b| regex::escape(b)).collect();
    Regex::new(&format!(r"\b(?:[1-3]\s*)?(?:{})\b", books.join("|"))).expect("valid regex")
});

static TRANSLATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\b", BIBLE_TRANSLATIONS.join("|"))).expect("valid regex")
});

static AUTHOR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+){0,3})\s*$").expect("valid regex")
});

/// Rank followed by a capitalized name, e.g. `Commissioner Samuel Brengle`.
static RANK_NAME: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    RANKS
        .iter()
        .map(|rank| {
            let re = Regex::new(&format!(
                r"\b(?i:{})\s+([A-Z][A-Za-z.\-']+(?:\s+[A-Z][A-Za-z.\-']+){{0,3}})",
                regex::escape(rank)
            ))
            .expect("valid regex");
            (*rank, re)
        })
        .collect()
});

// ============================================================================
// Chapters and doctrines
// ============================================================================

/// First `CHAPTER <roman>` marker on the page, as a number.
pub fn detect_roman_chapter(page_text: &str) -> Option<u32> {
    ROMAN_CHAPTER
        .captures(page_text)
        .and_then(|caps| roman_to_int(&caps[1]))
}

/// Running chapter after seeing `page_text`.
pub fn next_chapter(current: Option<u32>, page_text: &str) -> Option<u32> {
    detect_roman_chapter(page_text).or(current)
}

/// Running chapter threaded through a page sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterTracker {
    current: Option<u32>,
}

impl ChapterTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look at the next page and return the chapter it belongs to.
    pub fn advance(&mut self, page_text: &str) -> Option<u32> {
        self.current = next_chapter(self.current, page_text);
        self.current
    }
}

/// Doctrine bucket for an excerpt from `chapter`.
///
/// Best-effort: chapter III splits God/Trinity, chapter VIII splits
/// regeneration/justification, chapter IX maps to continuance.
pub fn doctrine_for(chapter: Option<u32>, text: &str) -> Option<u32> {
    let chapter = chapter?;
    let base = chapter_doctrine(chapter)?;

    match chapter {
        3 if contains_any(text, KW_TRINITY) => Some(3),
        8 if contains_any(text, KW_JUSTIFICATION) => Some(8),
        8 => Some(7),
        9 if contains_any(text, KW_CONTINUANCE) => Some(9),
        _ => Some(base),
    }
}

// ============================================================================
// Scripture detection
// ============================================================================

/// `chapter:verse` reference or a Bible book name.
pub fn is_scripture_heavy(text: &str) -> bool {
    VERSE_REF.is_match(text) || BOOK_NAME.is_match(text)
}

/// Scripture check used by the audit filter; also catches translation tags.
pub fn has_scripture_marker(text: &str) -> bool {
    is_scripture_heavy(text) || TRANSLATION.is_match(text)
}

/// Number of `chapter:verse` references.
pub fn scripture_density(text: &str) -> usize {
    VERSE_REF.find_iter(text).count()
}

// ============================================================================
// Scoring
// ============================================================================

/// Linear relevance score of a handbook excerpt for its doctrine.
pub fn score_excerpt(doctrine: u32, excerpt: &str, weights: &ScoringWeights) -> f64 {
    let lower = excerpt.to_lowercase();
    let mut score = 0.0;

    if DEFINITIONAL_PHRASES.iter().any(|k| lower.contains(k)) {
        score += weights.definitional_bonus;
    }

    for kw in doctrine_keywords(doctrine) {
        if lower.contains(kw) {
            score += weights.keyword_bonus;
        }
    }

    if is_scripture_heavy(excerpt) {
        score -= weights.scripture_penalty;
    }

    let len = char_len(excerpt);
    if len < weights.short_below {
        score -= weights.short_penalty;
    }
    if len > weights.long_above {
        score -= weights.long_penalty;
    }

    score
}

/// Doctrine and score for an excerpt, or `None` when it is rejected.
pub fn evaluate_excerpt(
    chapter: Option<u32>,
    excerpt: &str,
    weights: &ScoringWeights,
    min_score: f64,
) -> Option<(u32, f64)> {
    let doctrine = doctrine_for(chapter, excerpt)?;
    let score = score_excerpt(doctrine, excerpt, weights);
    (score >= min_score).then_some((doctrine, score))
}

/// Score of a free-standing sentence in the multi-edition miner.
pub fn score_sentence(sentence: &str, weights: &SentenceWeights) -> f64 {
    let lower = sentence.to_lowercase();
    let mut score = 0.0;

    if DEFINITIONAL_PHRASES.iter().any(|k| lower.contains(k)) {
        score += weights.definitional_bonus;
    }
    if DOCTRINAL_VOCABULARY.iter().any(|k| lower.contains(k)) {
        score += weights.vocabulary_bonus;
    }
    if is_scripture_heavy(sentence) {
        score -= weights.scripture_penalty;
    }

    let len = char_len(sentence);
    if len < weights.short_below {
        score -= weights.short_penalty;
    }
    if len > weights.long_above {
        score -= weights.long_penalty;
    }

    score
}

/// Confidence of a sentence candidate, capped at 0.9.
pub fn sentence_confidence(score: f64) -> f64 {
    (0.5 + score / 4.0).min(0.9)
}

/// Confidence of a quoted block; higher when an author line was found.
pub fn quoted_confidence(has_author: bool) -> f64 {
    if has_author {
        0.75
    } else {
        0.55
    }
}

/// Author name when `line` is a bare capitalized name of up to four words.
pub fn match_author_line(line: &str) -> Option<String> {
    AUTHOR_LINE
        .captures(line)
        .map(|caps| caps[1].to_string())
}

// ============================================================================
// Editions
// ============================================================================

/// Title and year of a handbook edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edition {
    pub title: String,
    pub year: Option<i32>,
}

/// Infer the edition from the PDF file name.
pub fn guess_edition(pdf_path: &Path) -> Edition {
    let name = pdf_path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.contains("2010") || name.contains("english handbook") {
        return Edition {
            title: "The Salvation Army Handbook of Doctrine".to_string(),
            year: Some(2010),
        };
    }
    if name.contains("handbookofsalvat") || name.contains("1923") {
        return Edition {
            title: "Handbook of Salvation Army Doctrine".to_string(),
            year: Some(1923),
        };
    }

    Edition {
        title: pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        year: None,
    }
}

/// Running doctrine state for the multi-edition miner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditionState {
    pub doctrine: Option<u32>,
    pub roman_chapter: Option<u32>,
}

/// Advance the edition state past one page.
///
/// The 2010 edition numbers chapters after doctrines; the 1923 edition uses
/// roman chapters mapped through the chapter table. Otherwise the previous
/// doctrine carries over.
pub fn next_edition_state(year: Option<i32>, page_text: &str, prev: EditionState) -> EditionState {
    if let Some(caps) = NUMBERED_CHAPTER.captures(page_text) {
        if let Ok(n) = caps[1].parse::<u32>() {
            if (1..=11).contains(&n) {
                return EditionState {
                    doctrine: Some(n),
                    roman_chapter: prev.roman_chapter,
                };
            }
        }
    }

    let roman_chapter = next_chapter(prev.roman_chapter, page_text);

    match (year, roman_chapter) {
        (Some(1923), Some(chapter)) => EditionState {
            doctrine: chapter_doctrine(chapter).or(prev.doctrine),
            roman_chapter,
        },
        _ => EditionState {
            doctrine: prev.doctrine,
            roman_chapter,
        },
    }
}

// ============================================================================
// OCR newspaper heuristics
// ============================================================================

/// Theological sentence that is not a charity appeal.
pub fn is_theology(sentence: &str) -> bool {
    !contains_any(sentence, CHARITY_EXCLUDE) && contains_any(sentence, THEOLOGY_INCLUDE)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Guess a speaker from a rank title in the sentence.
///
/// `Commissioner Brengle said ...` gives `Commissioner Brengle`; a bare rank
/// gives the rank alone; no rank gives `Unknown`.
pub fn guess_author(sentence: &str) -> String {
    let lower = sentence.to_lowercase();
    for (rank, re) in RANK_NAME.iter() {
        if !lower.contains(rank) {
            continue;
        }
        return match re.captures(sentence) {
            Some(caps) => format!("{} {}", title_case(rank), caps[1].trim()),
            None => title_case(rank),
        };
    }
    "Unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_roman_chapter() {
        assert_eq!(detect_roman_chapter("CHAPTER IV. JESUS CHRIST"), Some(4));
        assert_eq!(detect_roman_chapter("see chapter ii for more"), Some(2));
        assert_eq!(detect_roman_chapter("CHAPTER XIV"), None);
        assert_eq!(detect_roman_chapter("no marker"), None);
    }

    #[test]
    fn test_chapter_state_carries_forward() {
        let pages = ["CHAPTER II THE BIBLE", "more text", "CHAPTER III GOD", "text"];
        let chapters: Vec<Option<u32>> = pages
            .iter()
            .scan(None, |state, page| {
                *state = next_chapter(*state, page);
                Some(*state)
            })
            .collect();
        assert_eq!(chapters, vec![Some(2), Some(2), Some(3), Some(3)]);
    }

    #[test]
    fn test_chapter_tracker() {
        let mut tracker = ChapterTracker::new();
        assert_eq!(tracker.advance("preface"), None);
        assert_eq!(tracker.advance("CHAPTER IV"), Some(4));
        assert_eq!(tracker.advance("body"), Some(4));
        assert_eq!(tracker.advance("CHAPTER V"), Some(5));
    }

    #[test]
    fn test_doctrine_for_ambiguous_chapters() {
        assert_eq!(doctrine_for(None, "anything"), None);
        assert_eq!(doctrine_for(Some(1), "anything"), None);
        assert_eq!(doctrine_for(Some(3), "God is one."), Some(2));
        assert_eq!(doctrine_for(Some(3), "The Trinity is a mystery."), Some(3));
        assert_eq!(doctrine_for(Some(8), "Justification is by faith."), Some(8));
        assert_eq!(doctrine_for(Some(8), "Repentance comes first."), Some(7));
        assert_eq!(doctrine_for(Some(8), "Plain words."), Some(7));
        assert_eq!(doctrine_for(Some(7), "The Spirit convicts."), Some(3));
    }

    #[test]
    fn test_scripture_detection() {
        assert!(is_scripture_heavy("See Romans 8:1 for details."));
        assert!(is_scripture_heavy("as 3:16 declares"));
        assert!(is_scripture_heavy("read 1 John carefully"));
        assert!(!is_scripture_heavy("the Scriptures contain divine revelation"));
        assert!(has_scripture_marker("quoted from the KJV"));
        assert!(!is_scripture_heavy("quoted from the KJV"));
        assert_eq!(scripture_density("John 3:16 and Romans 5:8"), 2);
    }

    #[test]
    fn test_definitional_excerpt_is_kept() {
        let text = "We believe that the Scriptures of the Old and New Testaments contain divine revelation.";
        assert!(char_len(text) < 110);
        let weights = ScoringWeights::default();
        let (doctrine, score) = evaluate_excerpt(Some(2), text, &weights, 1.8).unwrap();
        assert_eq!(doctrine, 1);
        // 1.8 definitional + 3 * 0.35 keywords - 0.6 short
        assert!((score - 2.25).abs() < 1e-9);
    }

    #[test]
    fn test_scripture_reference_is_dropped() {
        let weights = ScoringWeights::default();
        let score = score_excerpt(1, "See Romans 8:1 for details.", &weights);
        assert!(score < 0.0);
        assert!(evaluate_excerpt(Some(2), "See Romans 8:1 for details.", &weights, 1.8).is_none());
    }

    #[test]
    fn test_long_excerpt_penalty() {
        let weights = ScoringWeights::default();
        let long = format!("We believe {}", "grace ".repeat(60));
        let medium = format!("We believe {}", "grace ".repeat(20));
        assert!(score_excerpt(2, &long, &weights) < score_excerpt(2, &medium, &weights));
    }

    #[test]
    fn test_score_sentence_and_confidence() {
        let weights = SentenceWeights::default();
        let s = "Holiness therefore is the privilege of every believer who walks in the light of God.";
        let score = score_sentence(s, &weights);
        assert!((score - 3.5).abs() < 1e-9);
        assert!((sentence_confidence(score) - 0.9).abs() < 1e-9);
        assert!((sentence_confidence(1.8) - 0.95f64.min(0.9)).abs() < 1e-9);
        assert!((sentence_confidence(1.0) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_guess_edition() {
        assert_eq!(guess_edition(Path::new("/x/English Handbook of Doctrine web.pdf")).year, Some(2010));
        assert_eq!(guess_edition(Path::new("handbookofsalvat00unse.pdf")).year, Some(1923));
        let other = guess_edition(Path::new("notes/sermons.pdf"));
        assert_eq!(other.title, "sermons");
        assert_eq!(other.year, None);
    }

    #[test]
    fn test_edition_state_2010_numbering() {
        let state = next_edition_state(Some(2010), "Chapter 5 Humanity", EditionState::default());
        assert_eq!(state.doctrine, Some(5));
        let state = next_edition_state(Some(2010), "body text", state);
        assert_eq!(state.doctrine, Some(5));
    }

    #[test]
    fn test_edition_state_1923_roman() {
        let state = next_edition_state(Some(1923), "CHAPTER VII THE HOLY SPIRIT", EditionState::default());
        assert_eq!(state, EditionState { doctrine: Some(3), roman_chapter: Some(7) });
        let state = next_edition_state(Some(1923), "CHAPTER I INTRODUCTION", state);
        assert_eq!(state.doctrine, Some(3));
        assert_eq!(state.roman_chapter, Some(1));
    }

    #[test]
    fn test_edition_state_unknown_year_keeps_doctrine() {
        let prev = EditionState { doctrine: Some(4), roman_chapter: None };
        let state = next_edition_state(None, "CHAPTER II", prev);
        assert_eq!(state.doctrine, Some(4));
        assert_eq!(state.roman_chapter, Some(2));
    }

    #[test]
    fn test_author_line() {
        assert_eq!(match_author_line("  William Booth "), Some("William Booth".to_string()));
        assert_eq!(match_author_line("said the preacher"), None);
    }

    #[test]
    fn test_is_theology() {
        assert!(is_theology("Christ is the hope of the world."));
        assert!(!is_theology("Please donate to the Christmas kettle for Christ's sake."));
        assert!(!is_theology("The band played in the park."));
    }

    #[test]
    fn test_guess_author() {
        assert_eq!(
            guess_author("Commissioner Samuel Brengle said holiness is love."),
            "Commissioner Samuel Brengle"
        );
        assert_eq!(guess_author("the general spoke of grace."), "General");
        assert_eq!(guess_author("God is love."), "Unknown");
    }
}
