//! Sentence segmentation and sliding sentence windows.
//!
//! Sentence boundaries are an approximation: whitespace after terminal
//! punctuation, optionally followed by something that opens a sentence.
//! Windows of 1..=k sentences give overlapping candidates at several
//! granularities; scoring and deduplication decide which one survives.

use regex::Regex;
use std::sync::LazyLock;

/// Terminal punctuation, whitespace, then a capital, opening quote or paren.
/// Group 1 is the gap the text is split at.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.!?](\s+)[A-Z"“(]"#).expect("valid regex"));

/// Terminal punctuation followed by any whitespace.
static LOOSE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?](\s+)").expect("valid regex"));

/// Split `text` at every group-1 gap of `boundary`, dropping empty pieces.
fn split_at_gaps(text: &str, boundary: &Regex) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut last = 0usize;

    for caps in boundary.captures_iter(text) {
        if let Some(gap) = caps.get(1) {
            pieces.push(&text[last..gap.start()]);
            last = gap.end();
        }
    }
    pieces.push(&text[last..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split normalized text into sentence-like units.
pub fn split_sentences(text: &str) -> Vec<String> {
    split_at_gaps(text, &SENTENCE_BOUNDARY)
}

/// Split at any whitespace following `.`, `!` or `?`.
pub fn split_loose_sentences(text: &str) -> Vec<String> {
    split_at_gaps(text, &LOOSE_BOUNDARY)
}

/// Every contiguous run of 1..=max_sents sentences, joined by a space.
///
/// Ordered by starting sentence, then by increasing width.
pub fn sentence_windows(sentences: &[String], max_sents: usize) -> Vec<String> {
    let n = sentences.len();
    let mut windows = Vec::new();

    for start in 0..n {
        for width in 1..=max_sents {
            if start + width > n {
                break;
            }
            let chunk = sentences[start..start + width].join(" ");
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                windows.push(chunk.to_string());
            }
        }
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_split_sentences_basic() {
        let text = "God is love. He calls all men! Do you hear? \"Come unto me.\" (Matthew)";
        assert_eq!(
            split_sentences(text),
            s(&[
                "God is love.",
                "He calls all men!",
                "Do you hear?",
                "\"Come unto me.\" (Matthew)"
            ])
        );
    }

    #[test]
    fn test_split_sentences_paren_opener() {
        assert_eq!(
            split_sentences("It is finished. (John wrote this.)"),
            s(&["It is finished.", "(John wrote this.)"])
        );
    }

    #[test]
    fn test_split_sentences_requires_capital() {
        let text = "See p. 12 for more. the next line continues.";
        assert_eq!(split_sentences(text), s(&[text]));
    }

    #[test]
    fn test_split_sentences_single_letter_sentences() {
        assert_eq!(split_sentences("A. B. C."), s(&["A.", "B.", "C."]));
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_split_loose_sentences() {
        assert_eq!(
            split_loose_sentences("pray always. and give thanks! amen"),
            s(&["pray always.", "and give thanks!", "amen"])
        );
    }

    #[test]
    fn test_window_order_and_widths() {
        let sentences = s(&["A.", "B.", "C."]);
        let windows = sentence_windows(&sentences, 2);
        assert_eq!(windows, s(&["A.", "A. B.", "B.", "B. C.", "C."]));
    }

    #[test]
    fn test_window_width_larger_than_input() {
        let sentences = s(&["Only one."]);
        assert_eq!(sentence_windows(&sentences, 3), s(&["Only one."]));
    }

    #[test]
    fn test_window_count_per_width() {
        let sentences: Vec<String> = (0..10).map(|i| format!("S{}.", i)).collect();
        assert_eq!(sentence_windows(&sentences, 3).len(), 10 + 9 + 8);
        assert!(sentence_windows(&[], 3).is_empty());
    }
}
