//! Collectors for official web pages and Internet Archive OCR text.
//!
//! Nothing here crawls. Every URL is given explicitly, checked against
//! robots.txt, and fetched once.

use crate::classify::{guess_author, is_theology};
use crate::dedup::dedupe_first_by;
use crate::extract::html_text_lines;
use crate::fetch::{FetchError, HttpFetch};
use crate::models::{OcrHit, OcrParams, PwaQuote};
use crate::normalize::{char_len, collapse_whitespace, straighten_quotes};
use crate::output::progress_bar;
use crate::robots::RobotsGate;
use crate::window::split_loose_sentences;
use regex::Regex;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const OFFICIAL_USER_AGENT: &str = "PrayerRoomQuoteCollector/1.0 (+respectful allowlist)";
pub const OFFICIAL_TIMEOUT: Duration = Duration::from_secs(25);

pub const OCR_USER_AGENT: &str = "Mozilla/5.0";
pub const OCR_TIMEOUT: Duration = Duration::from_secs(45);

static ARCHIVE_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://archive.org").expect("valid base URL"));

/// Author used when a quote on the generals page has no `General ...` line.
const ORGANISATION_AUTHOR: &str = "The Salvation Army";

/// Lines after a quote searched for its `General ...` attribution.
const AUTHOR_SEARCH_LINES: usize = 5;

/// Characters of a sentence kept as its context.
const CONTEXT_CHARS: usize = 300;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Blocked by robots.txt: {0}")]
    RobotsDenied(String),
    #[error("No extractor registered for: {0}")]
    UnknownPage(String),
    #[error("Provide at least one --item or --text-url")]
    NoSources,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Bad metadata for item {item}: {reason}")]
    Metadata { item: String, reason: String },
}

// ============================================================================
// Official pages
// ============================================================================

/// 5..=500 characters between curly single quotes, e.g. `‘Go for souls’`.
static CURLY_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"‘([^’]{5,500})’").expect("valid regex"));

static LIST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid regex"));

/// `'quote' - Author`
static FOUNDERS_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^'(.+?)'\s*-\s*(.+?)\s*$").expect("valid regex"));

/// Page shapes with a registered extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficialPage {
    Generals,
    FoundersDay,
}

impl OfficialPage {
    pub fn from_url(url: &str) -> Option<Self> {
        if url.contains("generals-salvation-army") {
            Some(OfficialPage::Generals)
        } else if url.contains("founders-day-quotes-william-and-catherine-booth") {
            Some(OfficialPage::FoundersDay)
        } else {
            None
        }
    }

    pub fn extract(&self, html: &str) -> Vec<PwaQuote> {
        match self {
            OfficialPage::Generals => extract_generals(html),
            OfficialPage::FoundersDay => extract_founders_day(html),
        }
    }
}

/// Curly-quoted lines paired with the next `General ...` line.
pub fn extract_generals(html: &str) -> Vec<PwaQuote> {
    let lines = html_text_lines(html);
    let mut quotes = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = CURLY_QUOTE.captures(line) else {
            continue;
        };
        let author = lines
            .iter()
            .skip(i + 1)
            .take(AUTHOR_SEARCH_LINES)
            .find(|l| l.starts_with("General "))
            .map(|l| l.split('(').next().unwrap_or("").trim().to_string())
            .unwrap_or_else(|| ORGANISATION_AUTHOR.to_string());
        quotes.push(PwaQuote::new(author, caps[1].trim()));
    }

    dedupe_first_by(quotes, |q| q.clone())
}

/// Numbered `'quote' - Author` list items.
pub fn extract_founders_day(html: &str) -> Vec<PwaQuote> {
    html_text_lines(html)
        .iter()
        .filter_map(|line| {
            let line = straighten_quotes(line);
            let item = LIST_NUMBER.replace(&line, "");
            let caps = FOUNDERS_ITEM.captures(&item)?;
            Some(PwaQuote::new(caps[2].trim(), caps[1].trim()))
        })
        .collect()
}

/// Collect from every allowlisted page.
///
/// A robots denial or an unknown page shape aborts the run; a failed fetch
/// is logged and skipped.
pub fn collect_official<F: HttpFetch>(
    fetcher: &F,
    user_agent: &str,
    urls: &[String],
    show_progress: bool,
) -> Result<Vec<PwaQuote>, CollectError> {
    let mut gate = RobotsGate::new(fetcher, user_agent);
    let progress = progress_bar(urls.len(), show_progress);
    let mut quotes = Vec::new();

    for url in urls {
        if !gate.allows(url) {
            return Err(CollectError::RobotsDenied(url.clone()));
        }
        let page = OfficialPage::from_url(url).ok_or_else(|| CollectError::UnknownPage(url.clone()))?;

        match fetcher.get_text(url) {
            Ok(html) => {
                let found = page.extract(&html);
                info!(url = %url, quotes = found.len(), "extracted page");
                quotes.extend(found);
            }
            Err(e) => warn!(url = %url, error = %e, "fetch failed, skipping"),
        }
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Ok(quotes)
}

// ============================================================================
// Internet Archive OCR
// ============================================================================

/// Preference rank of an IA file name: `_djvu.txt` before `_text.txt`.
fn text_file_rank(name: &str) -> Option<u8> {
    let lower = name.to_lowercase();
    if lower.ends_with("_djvu.txt") {
        Some(0)
    } else if lower.ends_with("_text.txt") {
        Some(1)
    } else {
        None
    }
}

/// Archive URL with each segment percent-encoded.
fn archive_url(segments: &[&str]) -> String {
    let mut url = ARCHIVE_BASE.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url.to_string()
}

pub fn metadata_url(item: &str) -> String {
    archive_url(&["metadata", item])
}

/// Best OCR text file name in an item's metadata document.
pub fn best_text_file(item: &str, metadata: &Value) -> Result<String, CollectError> {
    let files = metadata
        .get("files")
        .and_then(Value::as_array)
        .ok_or_else(|| CollectError::Metadata {
            item: item.to_string(),
            reason: "missing files list".to_string(),
        })?;

    files
        .iter()
        .filter_map(|f| f.get("name").and_then(Value::as_str))
        .filter_map(|name| text_file_rank(name).map(|rank| (rank, name)))
        .min_by_key(|(rank, name)| (*rank, name.len()))
        .map(|(_, name)| name.to_string())
        .ok_or_else(|| CollectError::Metadata {
            item: item.to_string(),
            reason: "no *_djvu.txt or *_text.txt file".to_string(),
        })
}

pub fn stream_url(item: &str, file_name: &str) -> String {
    archive_url(&["stream", item, file_name])
}

/// Resolve an item identifier to its OCR text URL.
pub fn resolve_item<F: HttpFetch>(fetcher: &F, item: &str) -> Result<String, CollectError> {
    let body = fetcher.get_text(&metadata_url(item))?;
    let metadata: Value = serde_json::from_str(&body).map_err(|e| CollectError::Metadata {
        item: item.to_string(),
        reason: e.to_string(),
    })?;
    let file = best_text_file(item, &metadata)?;
    info!(item, file = %file, "resolved OCR text");
    Ok(stream_url(item, &file))
}

/// Theological sentences from OCR text, with a guessed speaker.
pub fn extract_ocr_hits(text: &str, source_url: &str, params: &OcrParams) -> Vec<OcrHit> {
    let cleaned = collapse_whitespace(text);
    let length_range = params.min_len..=params.max_len;

    split_loose_sentences(&cleaned)
        .into_iter()
        .filter(|s| length_range.contains(&char_len(s)) && is_theology(s))
        .map(|s| OcrHit {
            author: guess_author(&s),
            context: s.chars().take(CONTEXT_CHARS).collect(),
            text: s,
            source_url: source_url.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OcrSummary {
    pub items: usize,
    pub items_skipped: usize,
    pub urls: usize,
    pub urls_skipped: usize,
    pub unique: usize,
}

/// Mine OCR text from IA items and direct text URLs.
///
/// Items whose metadata cannot be resolved and URLs that fail to fetch are
/// logged and skipped. A robots denial aborts the run.
pub fn collect_ocr<F: HttpFetch>(
    fetcher: &F,
    user_agent: &str,
    items: &[String],
    text_urls: &[String],
    params: &OcrParams,
    show_progress: bool,
) -> Result<(Vec<OcrHit>, OcrSummary), CollectError> {
    if items.is_empty() && text_urls.is_empty() {
        return Err(CollectError::NoSources);
    }

    let mut summary = OcrSummary {
        items: items.len(),
        ..Default::default()
    };
    let mut gate = RobotsGate::new(fetcher, user_agent);
    let mut urls = Vec::with_capacity(items.len() + text_urls.len());

    for item in items {
        let meta = metadata_url(item);
        if !gate.allows(&meta) {
            return Err(CollectError::RobotsDenied(meta));
        }
        match resolve_item(fetcher, item) {
            Ok(url) => urls.push(url),
            Err(e) => {
                warn!(item = %item, error = %e, "skipping item");
                summary.items_skipped += 1;
            }
        }
    }
    urls.extend(text_urls.iter().cloned());
    summary.urls = urls.len();

    let progress = progress_bar(urls.len(), show_progress);
    let mut hits = Vec::new();

    for url in &urls {
        if !gate.allows(url) {
            return Err(CollectError::RobotsDenied(url.clone()));
        }
        match fetcher.get_text(url) {
            Ok(text) => {
                let found = extract_ocr_hits(&text, url, params);
                info!(url = %url, hits = found.len(), "mined OCR text");
                hits.extend(found);
            }
            Err(e) => {
                warn!(url = %url, error = %e, "fetch failed, skipping");
                summary.urls_skipped += 1;
            }
        }
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let hits = dedupe_first_by(hits, |h| (h.author.clone(), h.text.clone()));
    summary.unique = hits.len();
    Ok((hits, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::CannedFetcher;
    use crate::fetch::HttpResponse;
    use serde_json::json;

    const GENERALS_URL: &str = "https://www.salvationarmy.org/ihq/generals-salvation-army";
    const FOUNDERS_URL: &str =
        "https://www.salvationarmy.org/ihq/founders-day-quotes-william-and-catherine-booth";

    const GENERALS_HTML: &str = r#"<html><body>
        <div><p>‘Hi.’</p><p>General Nobody</p></div>
        <div><p>‘Go for souls, and go for the worst.’</p><p>Photo</p><p>General William Booth (1878-1912)</p></div>
        <div><p>‘Go for souls, and go for the worst.’</p><p>General William Booth (1878-1912)</p></div>
        <div><p>‘We are a salvation people.’</p></div>
        </body></html>"#;

    const FOUNDERS_HTML: &str = r#"<html><body><ol>
        <li>1. 'While women weep, as they do now, I'll fight' - William Booth</li>
        <li>2. ‘If we are to better the future we must disturb the present’ - Catherine Booth</li>
        <li>Not a quote line</li>
        </ol></body></html>"#;

    #[test]
    fn test_page_shapes() {
        assert_eq!(OfficialPage::from_url(GENERALS_URL), Some(OfficialPage::Generals));
        assert_eq!(OfficialPage::from_url(FOUNDERS_URL), Some(OfficialPage::FoundersDay));
        assert_eq!(OfficialPage::from_url("https://example.org/news"), None);
    }

    #[test]
    fn test_extract_generals() {
        let quotes = extract_generals(GENERALS_HTML);
        assert_eq!(
            quotes,
            vec![
                PwaQuote::new("General William Booth", "Go for souls, and go for the worst."),
                PwaQuote::new("The Salvation Army", "We are a salvation people."),
            ]
        );
    }

    #[test]
    fn test_extract_founders_day() {
        let quotes = extract_founders_day(FOUNDERS_HTML);
        assert_eq!(
            quotes,
            vec![
                PwaQuote::new("William Booth", "While women weep, as they do now, I'll fight"),
                PwaQuote::new("Catherine Booth", "If we are to better the future we must disturb the present"),
            ]
        );
    }

    #[test]
    fn test_collect_official_skips_failed_fetch() {
        let fetcher = CannedFetcher::default().with(FOUNDERS_URL, HttpResponse::ok(FOUNDERS_HTML));
        let urls = vec![GENERALS_URL.to_string(), FOUNDERS_URL.to_string()];
        let quotes = collect_official(&fetcher, OFFICIAL_USER_AGENT, &urls, false).unwrap();
        assert_eq!(quotes.len(), 2);
    }

    #[test]
    fn test_collect_official_unknown_shape_is_fatal() {
        let fetcher = CannedFetcher::default();
        let urls = vec!["https://www.salvationarmy.org/news".to_string()];
        let err = collect_official(&fetcher, OFFICIAL_USER_AGENT, &urls, false).unwrap_err();
        assert!(matches!(err, CollectError::UnknownPage(_)));
    }

    #[test]
    fn test_collect_official_robots_denial_is_fatal() {
        let fetcher = CannedFetcher::default()
            .with(
                "https://www.salvationarmy.org/robots.txt",
                HttpResponse::ok("User-agent: *\nDisallow: /ihq/\n"),
            )
            .with(GENERALS_URL, HttpResponse::ok(GENERALS_HTML));
        let urls = vec![GENERALS_URL.to_string()];
        let err = collect_official(&fetcher, OFFICIAL_USER_AGENT, &urls, false).unwrap_err();
        assert!(matches!(err, CollectError::RobotsDenied(_)));
        assert_eq!(fetcher.request_count(GENERALS_URL), 0);
    }

    #[test]
    fn test_generals_skips_out_of_range_pair_on_same_line() {
        let html = "<p>‘Hi’ he said, ‘Go for souls, and go for the worst.’</p><p>General William Booth</p>";
        assert_eq!(
            extract_generals(html),
            vec![PwaQuote::new("General William Booth", "Go for souls, and go for the worst.")]
        );
    }

    #[test]
    fn test_archive_urls_are_encoded() {
        assert_eq!(metadata_url("wc"), "https://archive.org/metadata/wc");
        assert_eq!(metadata_url("a/b?c"), "https://archive.org/metadata/a%2Fb%3Fc");
        assert_eq!(
            stream_url("war cry", "a b#1_djvu.txt"),
            "https://archive.org/stream/war%20cry/a%20b%231_djvu.txt"
        );
    }

    #[test]
    fn test_best_text_file() {
        let meta = json!({"files": [
            {"name": "war-cry_text.txt"},
            {"name": "war-cry-1957_djvu.txt"},
            {"name": "wc_djvu.txt"},
            {"name": "war-cry.pdf"},
            {"size": 3}
        ]});
        assert_eq!(best_text_file("war-cry", &meta).unwrap(), "wc_djvu.txt");

        let meta = json!({"files": [{"name": "a.pdf"}]});
        assert!(best_text_file("x", &meta).is_err());
        assert!(best_text_file("x", &json!({})).is_err());
    }

    #[test]
    fn test_extract_ocr_hits() {
        let text = "Donate to the kettle for Christ's sake this season please. \
            Commissioner Samuel Brengle said that holiness is pure love to God. \
            The band played in the park on Sunday afternoon for the crowd. \
            Grace.";
        let hits = extract_ocr_hits(text, "u", &OcrParams::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].author, "Commissioner Samuel Brengle");
        assert_eq!(hits[0].context, hits[0].text);
        assert_eq!(hits[0].source_url, "u");
    }

    #[test]
    fn test_collect_ocr_resolves_items_and_dedupes() {
        let meta = json!({"files": [{"name": "wc_djvu.txt"}]}).to_string();
        let sentence = "Commissioner Samuel Brengle said that holiness is pure love to God.";
        let fetcher = CannedFetcher::default()
            .with("https://archive.org/metadata/wc", HttpResponse::ok(meta))
            .with("https://archive.org/stream/wc/wc_djvu.txt", HttpResponse::ok(sentence))
            .with("https://example.org/direct.txt", HttpResponse::ok(sentence));
        let (hits, summary) = collect_ocr(
            &fetcher,
            OCR_USER_AGENT,
            &["wc".to_string(), "missing".to_string()],
            &["https://example.org/direct.txt".to_string()],
            &OcrParams::default(),
            false,
        )
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(summary.items_skipped, 1);
        assert_eq!(summary.urls, 2);
        assert_eq!(summary.unique, 1);
    }

    #[test]
    fn test_collect_ocr_needs_sources() {
        let fetcher = CannedFetcher::default();
        let err = collect_ocr(&fetcher, OCR_USER_AGENT, &[], &[], &OcrParams::default(), false).unwrap_err();
        assert!(matches!(err, CollectError::NoSources));
    }
}
