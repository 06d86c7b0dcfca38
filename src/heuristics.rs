//! Heuristic tables for doctrine classification, scoring and review.
//!
//! Keyword lists, chapter maps and marker lists live here as named constants
//! so they can be tuned without touching control flow. Scoring weights are
//! plain config structs with tuned `Default` values.

use serde::{Deserialize, Serialize};

/// Doctrine numbers run 1..=11.
pub const DOCTRINES: [u32; 11] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

pub const DOCTRINE_LABELS: [(u32, &str); 11] = [
    (1, "Scriptures"),
    (2, "One God"),
    (3, "Trinity"),
    (4, "Jesus Christ (God & Man)"),
    (5, "Fall / Depravity"),
    (6, "Atonement (for all)"),
    (7, "Repentance / Faith / Regeneration"),
    (8, "Justification by grace through faith"),
    (9, "Continuance in saving faith"),
    (10, "Sanctification"),
    (11, "Resurrection / Judgment / Eternity"),
];

/// Label for a doctrine number, or `Doctrine N` for numbers outside the table.
pub fn doctrine_label(doctrine: u32) -> String {
    DOCTRINE_LABELS
        .iter()
        .find(|(d, _)| *d == doctrine)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| format!("Doctrine {}", doctrine))
}

pub const ROMAN_NUMERALS: [(&str, u32); 11] = [
    ("I", 1),
    ("II", 2),
    ("III", 3),
    ("IV", 4),
    ("V", 5),
    ("VI", 6),
    ("VII", 7),
    ("VIII", 8),
    ("IX", 9),
    ("X", 10),
    ("XI", 11),
];

pub fn roman_to_int(roman: &str) -> Option<u32> {
    let upper = roman.to_ascii_uppercase();
    ROMAN_NUMERALS
        .iter()
        .find(|(r, _)| *r == upper)
        .map(|(_, n)| *n)
}

/// 1923 handbook chapter -> doctrine bucket (table of contents order).
/// Chapters III, VIII and IX are refined by keywords in `classify`.
pub const CHAPTER_TO_DOCTRINE: [(u32, u32); 10] = [
    (2, 1),   // The Bible
    (3, 2),   // God (Trinity split by keywords)
    (4, 4),   // Jesus Christ
    (5, 5),   // Man
    (6, 6),   // Redemption
    (7, 3),   // The Holy Spirit
    (8, 7),   // Salvation (Justification split by keywords)
    (9, 9),   // The Spiritual Life
    (10, 10), // Entire Sanctification
    (11, 11), // Last Things
];

pub fn chapter_doctrine(chapter: u32) -> Option<u32> {
    CHAPTER_TO_DOCTRINE
        .iter()
        .find(|(c, _)| *c == chapter)
        .map(|(_, d)| *d)
}

pub const KW_TRINITY: &[&str] = &["trinity", "father", "son", "holy spirit", "three persons", "triune"];
pub const KW_JUSTIFICATION: &[&str] = &["justify", "justification", "righteousness imputed", "accounted righteous"];
pub const KW_REGENERATION: &[&str] = &["regenerat", "new birth", "born again"];
pub const KW_REPENT_FAITH: &[&str] = &["repent", "repentance", "faith", "believe", "conversion"];
pub const KW_CONTINUANCE: &[&str] = &["continue", "persever", "keep", "abide", "backslid", "apostasy", "endure"];
pub const KW_SANCTIFICATION: &[&str] = &["sanctif", "holiness", "entire sanctification", "perfect love"];
pub const KW_ATONEMENT: &[&str] = &["atonement", "redeem", "redemption", "propitiation", "reconcile", "sacrifice"];
pub const KW_FALL: &[&str] = &["fall", "deprav", "sinful", "guilty", "corrupt", "lost"];
pub const KW_SCRIPTURE: &[&str] = &["scripture", "bible", "inspiration", "revelation", "testament"];
pub const KW_LAST_THINGS: &[&str] = &["resurrection", "judgment", "eternal", "immortal", "heaven", "hell", "second coming"];
pub const KW_ONE_GOD: &[&str] = &["one god", "god", "creator", "sovereign", "holy"];
pub const KW_JESUS: &[&str] = &["jesus", "christ", "incarn", "deity", "human", "god and man"];

/// Keywords that earn a per-match bonus for a doctrine bucket.
pub fn doctrine_keywords(doctrine: u32) -> Vec<&'static str> {
    match doctrine {
        1 => KW_SCRIPTURE.to_vec(),
        2 => KW_ONE_GOD.to_vec(),
        3 => KW_TRINITY.to_vec(),
        4 => KW_JESUS.to_vec(),
        5 => KW_FALL.to_vec(),
        6 => KW_ATONEMENT.to_vec(),
        7 => KW_REPENT_FAITH.iter().chain(KW_REGENERATION).copied().collect(),
        8 => KW_JUSTIFICATION.to_vec(),
        9 => KW_CONTINUANCE.to_vec(),
        10 => KW_SANCTIFICATION.to_vec(),
        11 => KW_LAST_THINGS.to_vec(),
        _ => Vec::new(),
    }
}

/// Phrasing that marks a definitional or doctrinal claim.
pub const DEFINITIONAL_PHRASES: &[&str] = &[
    "we believe",
    "therefore",
    "means",
    "signifies",
    "is the",
    "are the",
    "must",
    "cannot",
];

/// Vocabulary that marks a sentence as doctrinal in the multi-edition miner.
pub const DOCTRINAL_VOCABULARY: &[&str] = &[
    "holiness",
    "sanctif",
    "atonement",
    "grace",
    "faith",
    "repent",
    "justif",
    "regenerat",
    "resurrection",
    "judgment",
];

pub const BIBLE_BOOKS: &[&str] = &[
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Psalm", "Proverbs", "Ecclesiastes",
    "Song of Solomon", "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea",
    "Joel", "Amos", "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai",
    "Zechariah", "Malachi", "Matthew", "Mark", "Luke", "John", "Acts", "Romans",
    "1 Corinthians", "2 Corinthians", "Galatians", "Ephesians", "Philippians", "Colossians",
    "1 Thessalonians", "2 Thessalonians", "1 Timothy", "2 Timothy", "Titus", "Philemon",
    "Hebrews", "James", "1 Peter", "2 Peter", "1 John", "2 John", "3 John", "Jude",
    "Revelation",
];

pub const BIBLE_TRANSLATIONS: &[&str] = &["NIV", "KJV", "NKJV", "ESV", "NLT", "CEV"];

/// Linear scoring weights for the 1923 handbook miner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub definitional_bonus: f64,
    pub keyword_bonus: f64,
    pub scripture_penalty: f64,
    pub short_penalty: f64,
    pub long_penalty: f64,
    pub short_below: usize,
    pub long_above: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            definitional_bonus: 1.8,
            keyword_bonus: 0.35,
            scripture_penalty: 2.5,
            short_penalty: 0.6,
            long_penalty: 0.6,
            short_below: 110,
            long_above: 320,
        }
    }
}

/// Scoring weights for sentence candidates in the multi-edition miner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceWeights {
    pub definitional_bonus: f64,
    pub vocabulary_bonus: f64,
    pub scripture_penalty: f64,
    pub short_penalty: f64,
    pub long_penalty: f64,
    pub short_below: usize,
    pub long_above: usize,
    pub min_score: f64,
}

impl Default for SentenceWeights {
    fn default() -> Self {
        Self {
            definitional_bonus: 2.0,
            vocabulary_bonus: 1.5,
            scripture_penalty: 2.0,
            short_penalty: 1.0,
            long_penalty: 1.0,
            short_below: 80,
            long_above: 320,
            min_score: 1.75,
        }
    }
}

// ============================================================================
// Review triage
// ============================================================================

pub const OCR_HEADER_MARKERS: &[&str] = &["HANDBOOK OF DOCTRINE", "THE BIBLE", "[chap", "chap."];

pub const STRUCTURE_MARKERS: &[&str] = &[
    "Sec.", "Section", "I.—", "II.—", "III.—", "IV.—", "V.—", "VI.—", "VII.—", "VIII.—",
    "IX.—", "X.—", "XI.—",
];

/// Review terms, not bans.
pub const POLEMIC_TERMS: &[&str] = &[
    "impostor",
    "self-deceived",
    "wrath of god",
    "everlasting punishment",
    "wicked",
];

pub const SENSITIVE_GROUP_TERMS: &[&str] = &["jewish", "jews", "heathen", "infidel", "pagan", "mohammedan"];

/// Openings that lean on the preceding sentence.
pub const NEEDS_CONTEXT_STARTS: &[&str] = &[
    "according to this view",
    "however",
    "therefore",
    "thus",
    "but",
    "and",
    "or",
    "this means",
    "hence",
];

pub const GOOD_ANCHORS: &[&str] = &[
    "we believe",
    "this means",
    "the word",
    "god is",
    "jesus christ",
    "the holy spirit",
];

/// Records shorter than this are treated as fragments.
pub const MIN_COMPLETE_LEN: usize = 70;

// ============================================================================
// OCR newspaper mining
// ============================================================================

pub const THEOLOGY_INCLUDE: &[&str] = &[
    "jesus", "christ", "lord", "god", "holy spirit", "spirit", "prayer", "gospel", "salvation",
    "saved", "redeem", "redemption", "grace", "mercy", "cross", "resurrection", "repent",
    "faith", "holiness", "sanctif", "scripture", "bible", "kingdom",
];

pub const CHARITY_EXCLUDE: &[&str] = &[
    "donate", "donation", "fundraiser", "kettle", "food drive", "coat", "shelter", "disaster",
    "volunteer", "volunteers", "toy", "tickets", "registration",
];

pub const RANKS: &[&str] = &[
    "general",
    "commissioner",
    "colonel",
    "major",
    "lieutenant",
    "captain",
    "brigadier",
];

/// Case-insensitive substring test against a needle list.
pub fn contains_any(text: &str, needles: &[&str]) -> bool {
    let lower = text.to_lowercase();
    needles.iter().any(|n| lower.contains(&n.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roman_to_int() {
        assert_eq!(roman_to_int("viii"), Some(8));
        assert_eq!(roman_to_int("XI"), Some(11));
        assert_eq!(roman_to_int("XII"), None);
    }

    #[test]
    fn test_doctrine_label_fallback() {
        assert_eq!(doctrine_label(3), "Trinity");
        assert_eq!(doctrine_label(12), "Doctrine 12");
    }

    #[test]
    fn test_chapter_one_has_no_doctrine() {
        assert_eq!(chapter_doctrine(1), None);
        assert_eq!(chapter_doctrine(7), Some(3));
    }

    #[test]
    fn test_doctrine_seven_merges_keyword_sets() {
        let kws = doctrine_keywords(7);
        assert!(kws.contains(&"repent"));
        assert!(kws.contains(&"born again"));
        assert!(doctrine_keywords(0).is_empty());
    }

    #[test]
    fn test_contains_any_is_case_insensitive() {
        assert!(contains_any("The BIBLE and Scripture", KW_SCRIPTURE));
        assert!(contains_any("HANDBOOK OF DOCTRINE p. 4", OCR_HEADER_MARKERS));
    }
}
