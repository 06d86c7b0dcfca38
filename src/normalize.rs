//! Text normalization, canonical keys and boilerplate stripping.
//!
//! Everything here is a pure function over `&str`. Missing input is simply
//! the empty string.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

const SOFT_HYPHEN: char = '\u{00AD}';

/// `Out-\nstanding` after OCR.
static HARD_HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)-[^\S\n]*\n\s*(\w)").expect("valid regex"));

/// OCR line-join marker, e.g. `Gov¬ ernor`.
static OCR_JOIN_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*¬\s*").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Standalone page numbers.
static PAGE_FURNITURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*$").expect("valid regex"));

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

static WE_BELIEVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:We believe that|We believe in|We believe)\b").expect("valid regex")
});

static PAREN_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*see\s+[^)]{0,80}\)").expect("valid regex"));

/// Stacked OCR headings such as `Sec. IV.—`, `Section I.—Title`, `II.—`, `III.`.
static LEADING_JUNK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:Sec\.|Section)\s+[IVXLC]+\s*\.?\s*[—\-–]\s*.*?\s+|[IVXLC]+\s*\.?\s*[—\-–]\s*.*?\s+|[IVXLC]+\.\s*|)",
    )
    .expect("valid regex")
});

static TRAILING_JUNK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\s+(?:Section|Sec\.)\s+[IVXLC]+\s*\.?\s*[—\-–].*?$|\s+Section\s+\w+\s*\.?\s*[—\-–].*?$|\s+\d+\.\s*$)",
    )
    .expect("valid regex")
});

static SECTION_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:Section|Sec\.)\s+[IVXLC]+\s*\.?\s*[—\-–].*$").expect("valid regex")
});

/// Maximum number of stacked leading headings removed from one excerpt.
const MAX_HEADING_PASSES: usize = 5;

fn is_quote_char(c: char) -> bool {
    matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’')
}

/// Map curly quotation glyphs to their straight equivalents.
pub fn straighten_quotes(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '“' | '”' => '"',
            '‘' | '’' => '\'',
            other => other,
        })
        .collect()
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Glyph-level cleanup shared by the page and excerpt normalizers.
/// Line structure is preserved.
///
/// NFKC runs first so compatibility forms (fullwidth `¬`, small hyphens)
/// are caught by the marker rules; the final NFC recomposes marks that a
/// removed marker had separated from their base.
fn clean_glyphs(raw: &str) -> String {
    let s: String = raw.replace('\r', "\n").nfkc().collect();
    let s = s.replace(SOFT_HYPHEN, "");
    let s = HARD_HYPHEN_BREAK.replace_all(&s, "${1}${2}");
    let s = OCR_JOIN_MARKER.replace_all(&s, "");
    straighten_quotes(&s).nfc().collect()
}

/// Normalize an excerpt to a single clean line.
///
/// Removes soft hyphens and OCR join markers, rejoins hyphen-broken words,
/// applies NFKC, straightens quotes, collapses whitespace and trims stray
/// quote characters from both ends. Idempotent.
pub fn normalize_text(raw: &str) -> String {
    let collapsed = collapse_whitespace(&clean_glyphs(raw));
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || is_quote_char(c))
        .to_string()
}

/// Normalize one extracted page for segmentation.
///
/// Like [`normalize_text`] but also drops standalone page-number lines and
/// keeps quote characters, which the segmenter uses as sentence openers.
pub fn normalize_page(raw: &str) -> String {
    let cleaned = clean_glyphs(raw);
    let kept: Vec<&str> = cleaned
        .lines()
        .filter(|line| !PAGE_FURNITURE.is_match(line))
        .collect();
    collapse_whitespace(&kept.join("\n"))
}

/// Glyph-cleaned page as collapsed, non-empty lines. Quotes are kept.
pub fn normalize_lines(raw: &str) -> Vec<String> {
    clean_glyphs(raw)
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Canonical deduplication key: lowercase, runs of anything outside
/// `[a-z0-9]` collapsed to one space.
pub fn dedup_key(text: &str) -> String {
    let lower = normalize_text(text).to_lowercase();
    NON_ALNUM.replace_all(&lower, " ").trim().to_string()
}

/// Trim surrounding spaces and dashes left over from window joins.
pub fn trim_excerpt(s: &str) -> &str {
    s.trim()
        .trim_matches(|c: char| matches!(c, ' ' | '-' | '–' | '—'))
}

/// Strip OCR headings, section labels and cross references from an excerpt.
pub fn strip_boilerplate(text: &str) -> String {
    let mut s = normalize_text(text);

    // A doctrinal anchor marks where the statement really starts.
    if let Some(m) = WE_BELIEVE.find(&s) {
        s = s[m.start()..].trim().to_string();
    }

    s = PAREN_NOTE.replace_all(&s, "").into_owned();

    for _ in 0..MAX_HEADING_PASSES {
        let next = LEADING_JUNK.replace(&s, "").trim().to_string();
        if next == s {
            break;
        }
        s = next;
    }

    s = TRAILING_JUNK.replace_all(&s, "").trim().to_string();
    s = SECTION_TAIL.replace_all(&s, "").trim().to_string();

    if s.starts_with(is_quote_char) {
        s = s.chars().skip(1).collect::<String>().trim_start().to_string();
    }
    if s.ends_with(is_quote_char) {
        s.pop();
        s = s.trim_end().to_string();
    }

    normalize_text(&s)
}

/// Split a blob holding several "We believe" statements into one string per
/// statement. Blobs with at most one anchor come back as a single stripped
/// string (or nothing when stripping leaves it empty).
pub fn split_we_believe(text: &str) -> Vec<String> {
    let s = strip_boilerplate(text);
    let starts: Vec<usize> = WE_BELIEVE.find_iter(&s).map(|m| m.start()).collect();
    if starts.len() <= 1 {
        return if s.is_empty() { Vec::new() } else { vec![s] };
    }

    let mut parts = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(s.len());
        let chunk = s[start..end].trim_matches(|c: char| matches!(c, ' ' | ';' | ':' | '-' | '–' | '—'));
        let chunk = strip_boilerplate(chunk);
        if !chunk.is_empty() {
            parts.push(chunk);
        }
    }
    parts
}

/// Length in characters, the unit every min/max bound uses.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
