//! Criterion benchmarks for handbook mining and review.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quote_miner::mine::mine_pages;
use quote_miner::models::{InputRecord, MinerParams};
use quote_miner::normalize::normalize_page;
use quote_miner::review::review_records;
use quote_miner::window::{sentence_windows, split_sentences};

const SENTENCES: [&str; 6] = [
    "We believe that the Scriptures of the Old and New Testaments were given by inspiration of God.",
    "They only constitute the Divine rule of Christian faith and practice.",
    "This means that the Bible is the final authority in every question of doctrine and conduct.",
    "The word inspiration signifies that holy men spoke as they were moved by the Holy Ghost.",
    "Therefore we must read the Bible with prayer, that the Spirit may open its meaning to us.",
    "See John 5:39 and 2 Timothy 3:16 for the teaching of our Lord and of the apostle.",
];

/// Synthetic handbook: a chapter heading every ten pages, each page a few
/// hundred words of doctrinal prose with page furniture.
fn synthetic_pages(n: usize) -> Vec<String> {
    const ROMANS: [&str; 10] = ["II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI"];
    (0..n)
        .map(|i| {
            let mut page = String::new();
            if i % 10 == 0 {
                page.push_str(&format!("CHAPTER {}.\n", ROMANS[(i / 10) % ROMANS.len()]));
            }
            for j in 0..12 {
                page.push_str(SENTENCES[(i + j) % SENTENCES.len()]);
                page.push(if j % 3 == 2 { '\n' } else { ' ' });
            }
            page.push_str(&format!("\n{}\n", i + 1));
            page
        })
        .collect()
}

fn bench_mining(c: &mut Criterion) {
    let params = MinerParams::default();
    let mut group = c.benchmark_group("mine_pages");

    for pages in [10, 100, 200] {
        let input = synthetic_pages(pages);
        group.bench_with_input(BenchmarkId::from_parameter(pages), &input, |b, input| {
            b.iter(|| mine_pages(black_box(input), "bench.pdf", &params, false))
        });
    }

    group.finish();
}

fn bench_segmentation(c: &mut Criterion) {
    let pages = synthetic_pages(50);
    let normalized: Vec<String> = pages.iter().map(|p| normalize_page(p)).collect();

    c.bench_function("normalize_page_50", |b| {
        b.iter(|| {
            for p in &pages {
                black_box(normalize_page(black_box(p)));
            }
        })
    });

    c.bench_function("split_and_window_50", |b| {
        b.iter(|| {
            for text in &normalized {
                let sentences = split_sentences(black_box(text));
                black_box(sentence_windows(&sentences, 3));
            }
        })
    });
}

fn bench_review(c: &mut Criterion) {
    let records: Vec<InputRecord> = (0..1000)
        .map(|i| InputRecord {
            text: Some(format!("{} ({})", SENTENCES[i % SENTENCES.len()], i)),
            ..Default::default()
        })
        .collect();

    c.bench_function("review_1000", |b| b.iter(|| review_records(black_box(&records))));
}

criterion_group!(benches, bench_mining, bench_segmentation, bench_review);
criterion_main!(benches);
