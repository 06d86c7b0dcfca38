//! Selection of a balanced subset from deduplicated candidates.

use crate::dedup::rank_candidates;
use crate::models::{Candidate, EditionCandidate};
use std::collections::HashMap;
use std::hash::Hash;

/// Pick at most `total` candidates spread across `topics`.
///
/// Each topic first gets up to `total / topics.len()` of its best
/// candidates. Remaining slots go one at a time to whichever topic has the
/// best next candidate; on equal scores the topic listed first wins.
/// Candidates outside `topics` are ignored. Floor picks come first in the
/// output, grouped by topic, followed by top-ups in pick order.
pub fn select_balanced(candidates: &[Candidate], total: usize, topics: &[u32]) -> Vec<Candidate> {
    if topics.is_empty() || total == 0 {
        return Vec::new();
    }

    let mut buckets: Vec<Vec<&Candidate>> = topics
        .iter()
        .map(|topic| {
            candidates
                .iter()
                .filter(|c| c.doctrine == Some(*topic))
                .collect()
        })
        .collect();
    for bucket in &mut buckets {
        bucket.sort_by(|a, b| rank_candidates(a, b));
    }

    let base = total / topics.len();
    let mut selected: Vec<Candidate> = Vec::with_capacity(total);
    let mut pointers: Vec<usize> = Vec::with_capacity(buckets.len());

    for bucket in &buckets {
        let take = base.min(bucket.len());
        selected.extend(bucket[..take].iter().map(|c| (*c).clone()));
        pointers.push(take);
    }

    while selected.len() < total {
        let mut best: Option<(usize, &Candidate)> = None;
        for (i, bucket) in buckets.iter().enumerate() {
            if let Some(next) = bucket.get(pointers[i]) {
                let better = match best {
                    None => true,
                    Some((_, current)) => next.score > current.score,
                };
                if better {
                    best = Some((i, next));
                }
            }
        }

        match best {
            Some((i, cand)) => {
                selected.push(cand.clone());
                pointers[i] += 1;
            }
            None => break,
        }
    }

    selected
}

/// Keep at most `cap` items per group, preserving input order.
pub fn cap_per_group<T, K, F>(items: Vec<T>, cap: usize, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    items
        .into_iter()
        .filter(|item| {
            let n = counts.entry(key(item)).or_insert(0);
            *n += 1;
            *n <= cap
        })
        .collect()
}

/// Per-doctrine cap for the multi-edition miner. Unknown doctrine is its
/// own bucket.
pub fn cap_per_doctrine(candidates: Vec<EditionCandidate>, cap: usize) -> Vec<EditionCandidate> {
    cap_per_group(candidates, cap, |c| c.doctrine)
}
