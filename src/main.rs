//! Quote Miner
//!
//! Batch tools that mine, clean, filter and triage short doctrinal
//! quotations into JSON files for a daily-quote app.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quote_miner::clean::{self, clean_records};
use quote_miner::collect::{
    collect_ocr, collect_official, OCR_TIMEOUT, OCR_USER_AGENT, OFFICIAL_TIMEOUT,
    OFFICIAL_USER_AGENT,
};
use quote_miner::extract::load_json_array;
use quote_miner::fetch::BlockingFetcher;
use quote_miner::filter::{self, filter_records};
use quote_miner::mine::{mine_editions, mine_pdf};
use quote_miner::models::{
    CleanParams, EditionParams, FilterParams, InputRecord, MinerParams, OcrParams, QuoteMethod,
};
use quote_miner::output::{print_summary, write_json_file};
use quote_miner::review::{build_report, review_records};

#[derive(Parser)]
#[command(name = "quote-miner")]
#[command(about = "Mine and triage doctrinal quotations for the prayer-room app")]
#[command(version)]
struct Cli {
    /// Suppress progress bars and info logs
    #[arg(long, global = true)]
    quiet: bool,

    /// Enable debug logs
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Collector method (CLI version, mirrors models::QuoteMethod)
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliQuoteMethod {
    Quoted,
    Colon,
    Blockquote,
}

impl From<CliQuoteMethod> for QuoteMethod {
    fn from(method: CliQuoteMethod) -> Self {
        match method {
            CliQuoteMethod::Quoted => QuoteMethod::Quoted,
            CliQuoteMethod::Colon => QuoteMethod::Colon,
            CliQuoteMethod::Blockquote => QuoteMethod::Blockquote,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Mine doctrine-balanced excerpts from the 1923 handbook PDF
    Mine {
        /// Handbook PDF
        #[arg(long)]
        pdf: PathBuf,

        /// Audit file with every deduplicated candidate
        #[arg(long, default_value = "handbook_1923_quotes_audit.json")]
        out_audit: PathBuf,

        /// Final selected quotes
        #[arg(long, default_value = "handbook_1923_quotes.json")]
        out: PathBuf,

        /// Minimum excerpt length in characters [default: 120]
        #[arg(long)]
        min_len: Option<usize>,

        /// Maximum excerpt length in characters [default: 280]
        #[arg(long)]
        max_len: Option<usize>,

        /// Maximum sentences per window [default: 3]
        #[arg(long)]
        max_sents: Option<usize>,

        /// Number of quotes to select [default: 365]
        #[arg(long)]
        target: Option<usize>,

        /// Minimum score to keep a candidate [default: 1.8]
        #[arg(long)]
        min_score: Option<f64>,
    },

    /// Mine quoted blocks and strong sentences from several handbook editions
    MineEditions {
        /// Edition PDFs (repeatable)
        #[arg(long = "pdf", required = true)]
        pdfs: Vec<PathBuf>,

        /// Audit file with every kept candidate
        #[arg(long, default_value = "quotes_audit.json")]
        out_audit: PathBuf,

        /// Optional minimal {author, text, source} output
        #[arg(long)]
        out: Option<PathBuf>,

        /// Minimum text length [default: 80]
        #[arg(long)]
        min_len: Option<usize>,

        /// Maximum text length [default: 260]
        #[arg(long)]
        max_len: Option<usize>,

        /// Cap per doctrine [default: 80]
        #[arg(long)]
        max_per_doctrine: Option<usize>,
    },

    /// Strip boilerplate, split "We believe" blobs and deduplicate mined quotes
    Clean {
        /// Mined quotes
        #[arg(long = "in", default_value = "handbook_1923_quotes.json")]
        input: PathBuf,

        /// Cleaned records with metadata
        #[arg(long, default_value = "handbook_1923_quotes_clean.json")]
        out_clean: PathBuf,

        /// App-ready {author, text} list
        #[arg(long, default_value = "quotes.json")]
        out_pwa: PathBuf,

        /// Minimum text length [default: 90]
        #[arg(long)]
        min_len: Option<usize>,

        /// Maximum text length [default: 320]
        #[arg(long)]
        max_len: Option<usize>,

        /// Keep each record whole instead of splitting on "We believe"
        #[arg(long)]
        no_split_we_believe: bool,
    },

    /// Triage quotes into safe, flagged and dropped buckets
    Review {
        /// Quotes to review
        #[arg(long = "in", default_value = "handbook_1923_quotes.json")]
        input: PathBuf,

        #[arg(long, default_value = "handbook_1923_quotes_safe.json")]
        out_safe: PathBuf,

        #[arg(long, default_value = "handbook_1923_quotes_flagged.json")]
        out_flagged: PathBuf,

        #[arg(long, default_value = "handbook_1923_quotes_dropped.json")]
        out_dropped: PathBuf,

        /// Counts per bucket and flag
        #[arg(long, default_value = "handbook_1923_quotes_review_report.json")]
        out_report: PathBuf,
    },

    /// Drop scripture-citing and out-of-range records from an audit file
    FilterScripture {
        /// Audit file from a collector
        #[arg(long = "in", default_value = "quotes_audit.json")]
        input: PathBuf,

        /// App-ready {author, text} list
        #[arg(long, default_value = "quotes_theology.json")]
        out: PathBuf,

        /// Kept records with every source field
        #[arg(long, default_value = "quotes_theology_audit.json")]
        out_audit: PathBuf,

        /// Minimum text length [default: 25]
        #[arg(long)]
        min_len: Option<usize>,

        /// Maximum text length [default: 200]
        #[arg(long)]
        max_len: Option<usize>,

        /// Keep only records found by this method
        #[arg(long, value_enum)]
        only_method: Option<CliQuoteMethod>,

        /// Drop records with an empty or "Unknown" author
        #[arg(long)]
        drop_unknown: bool,
    },

    /// Collect quotes from allowlisted official pages
    CollectOfficial {
        /// Page URLs (repeatable)
        #[arg(long = "url", required = true)]
        urls: Vec<String>,

        #[arg(long, default_value = "quotes.json")]
        out: PathBuf,

        /// User agent for robots.txt and page requests
        #[arg(long, default_value = OFFICIAL_USER_AGENT)]
        user_agent: String,
    },

    /// Mine theological sentences from Internet Archive OCR text
    CollectOcr {
        /// Internet Archive item identifiers (repeatable)
        #[arg(long = "item")]
        items: Vec<String>,

        /// Direct OCR text URLs (repeatable)
        #[arg(long = "text-url")]
        text_urls: Vec<String>,

        #[arg(long, default_value = "warcry_quotes_audit.json")]
        out: PathBuf,

        /// Minimum sentence length [default: 45]
        #[arg(long)]
        min_len: Option<usize>,

        /// Maximum sentence length [default: 220]
        #[arg(long)]
        max_len: Option<usize>,
    },
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_records(path: &Path) -> Result<Vec<InputRecord>, Box<dyn std::error::Error>> {
    let records: Vec<InputRecord> = load_json_array(path)?;
    info!(path = %path.display(), records = records.len(), "loaded input");
    Ok(records)
}

#[derive(Serialize)]
struct WrittenSummary<'a, T: Serialize> {
    #[serde(flatten)]
    summary: &'a T,
    out: &'a Path,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);
    let show_progress = !cli.quiet;

    match cli.command {
        Commands::Mine {
            pdf,
            out_audit,
            out,
            min_len,
            max_len,
            max_sents,
            target,
            min_score,
        } => {
            let defaults = MinerParams::default();
            let params = MinerParams {
                min_len: min_len.unwrap_or(defaults.min_len),
                max_len: max_len.unwrap_or(defaults.max_len),
                max_sents: max_sents.unwrap_or(defaults.max_sents),
                target: target.unwrap_or(defaults.target),
                min_score: min_score.unwrap_or(defaults.min_score),
                ..defaults
            };

            info!(pdf = %pdf.display(), "mining handbook");
            let result = mine_pdf(&pdf, &params, show_progress)?;

            write_json_file(&result.candidates, &out_audit)?;
            let finals: Vec<_> = result.selected.iter().map(|c| c.to_final()).collect();
            write_json_file(&finals, &out)?;

            print_summary(&WrittenSummary {
                summary: &result.summary,
                out: &out,
            })?;
        }

        Commands::MineEditions {
            pdfs,
            out_audit,
            out,
            min_len,
            max_len,
            max_per_doctrine,
        } => {
            let defaults = EditionParams::default();
            let params = EditionParams {
                min_len: min_len.unwrap_or(defaults.min_len),
                max_len: max_len.unwrap_or(defaults.max_len),
                max_per_doctrine: max_per_doctrine.unwrap_or(defaults.max_per_doctrine),
                ..defaults
            };

            let result = mine_editions(&pdfs, &params, show_progress)?;
            write_json_file(&result.candidates, &out_audit)?;
            if let Some(out) = &out {
                let minimal: Vec<_> = result.candidates.iter().map(|c| c.to_minimal()).collect();
                write_json_file(&minimal, out)?;
            }

            print_summary(&WrittenSummary {
                summary: &result.summary,
                out: &out_audit,
            })?;
        }

        Commands::Clean {
            input,
            out_clean,
            out_pwa,
            min_len,
            max_len,
            no_split_we_believe,
        } => {
            let defaults = CleanParams::default();
            let params = CleanParams {
                min_len: min_len.unwrap_or(defaults.min_len),
                max_len: max_len.unwrap_or(defaults.max_len),
                split_we_believe: !no_split_we_believe,
            };

            let records = load_records(&input)?;
            let result = clean_records(&records, &params);
            write_json_file(&result.records, &out_clean)?;
            write_json_file(&clean::to_pwa(&result.records), &out_pwa)?;

            print_summary(&WrittenSummary {
                summary: &result.summary,
                out: &out_pwa,
            })?;
        }

        Commands::Review {
            input,
            out_safe,
            out_flagged,
            out_dropped,
            out_report,
        } => {
            let records = load_records(&input)?;
            let result = review_records(&records);
            let report = build_report(&result);

            write_json_file(&result.safe, &out_safe)?;
            write_json_file(&result.flagged, &out_flagged)?;
            write_json_file(&result.dropped, &out_dropped)?;
            write_json_file(&report, &out_report)?;

            print_summary(&serde_json::json!({
                "input_items": report.input_items,
                "deduped_duplicates_skipped": report.deduped_duplicates_skipped,
                "safe": report.safe,
                "flagged": report.flagged,
                "dropped": report.dropped,
                "out_report": out_report,
            }))?;
        }

        Commands::FilterScripture {
            input,
            out,
            out_audit,
            min_len,
            max_len,
            only_method,
            drop_unknown,
        } => {
            let defaults = FilterParams::default();
            let params = FilterParams {
                min_len: min_len.unwrap_or(defaults.min_len),
                max_len: max_len.unwrap_or(defaults.max_len),
                only_method: only_method.map(QuoteMethod::from),
                drop_unknown,
            };

            let records: Vec<Value> = load_json_array(&input)?;
            let result = filter_records(records, &params);
            write_json_file(&filter::to_pwa(&result.kept), &out)?;
            write_json_file(&result.kept, &out_audit)?;

            print_summary(&WrittenSummary {
                summary: &result.summary,
                out: &out,
            })?;
        }

        Commands::CollectOfficial {
            urls,
            out,
            user_agent,
        } => {
            let fetcher = BlockingFetcher::new(&user_agent, OFFICIAL_TIMEOUT)?;
            let quotes = collect_official(&fetcher, &user_agent, &urls, show_progress)?;
            write_json_file(&quotes, &out)?;

            print_summary(&serde_json::json!({
                "urls": urls.len(),
                "quotes": quotes.len(),
                "out": out,
            }))?;
        }

        Commands::CollectOcr {
            items,
            text_urls,
            out,
            min_len,
            max_len,
        } => {
            let defaults = OcrParams::default();
            let params = OcrParams {
                min_len: min_len.unwrap_or(defaults.min_len),
                max_len: max_len.unwrap_or(defaults.max_len),
            };

            let fetcher = BlockingFetcher::new(OCR_USER_AGENT, OCR_TIMEOUT)?;
            let (hits, summary) =
                collect_ocr(&fetcher, OCR_USER_AGENT, &items, &text_urls, &params, show_progress)?;
            write_json_file(&hits, &out)?;

            print_summary(&WrittenSummary {
                summary: &summary,
                out: &out,
            })?;
        }
    }

    Ok(())
}
