//! Candidate scoring: four signals fused into one confidence value
//!
//! confidence = 0.30*domain_match + 0.25*path_similarity
//!            + 0.25*content_relevance + 0.20*authority, rounded to 3 places.

use crate::strategy::{RawCandidate, StrategyKind};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

const WEIGHT_DOMAIN: f64 = 0.30;
const WEIGHT_PATH: f64 = 0.25;
const WEIGHT_CONTENT: f64 = 0.25;
const WEIGHT_AUTHORITY: f64 = 0.20;

/// A scored replacement candidate, ready for ranking.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub url: String,
    pub title: String,
    pub strategy: StrategyKind,
    pub domain_match: f64,
    pub path_similarity: f64,
    pub content_relevance: f64,
    pub authority: f64,
    pub confidence: f64,
}

/// Fixed trust scores for known documentation and reference hosts.
/// Injected into scoring so the table can grow without touching the math.
pub struct AuthorityTable {
    entries: HashMap<String, f64>,
}

impl Default for AuthorityTable {
    fn default() -> Self {
        let entries = [
            ("docs.github.com", 1.0),
            ("github.com", 0.95),
            ("learn.microsoft.com", 1.0),
            ("developer.mozilla.org", 0.95),
            ("nvd.nist.gov", 0.95),
            ("cisa.gov", 0.9),
            ("www.cisa.gov", 0.9),
            ("spdx.dev", 0.9),
            ("owasp.org", 0.9),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(d, s)| (d.to_string(), s))
                .collect(),
        }
    }
}

impl AuthorityTable {
    pub fn new(entries: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Exact host hit wins; a registrable-domain hit is worth 90% of the
    /// entry (highest entry on that domain, for determinism); unknown hosts
    /// get a flat 0.3.
    pub fn score(&self, url: &str) -> f64 {
        let Some(host) = host_of(url) else {
            return 0.3;
        };
        if let Some(score) = self.entries.get(&host) {
            return *score;
        }
        let base = registrable_domain(&host);
        self.entries
            .iter()
            .filter(|(domain, _)| registrable_domain(domain) == base)
            .map(|(_, score)| score * 0.9)
            .fold(None, |acc: Option<f64>, s| {
                Some(acc.map_or(s, |a| a.max(s)))
            })
            .unwrap_or(0.3)
    }
}

/// Compute all four subscores and the fused confidence for one raw candidate.
pub fn score_candidate(
    dead_url: &str,
    raw: &RawCandidate,
    context: &str,
    authority: &AuthorityTable,
) -> Candidate {
    let domain_match = domain_match_score(dead_url, &raw.url);
    let path_similarity = path_similarity_score(dead_url, &raw.url);
    let content_relevance = content_relevance_score(&raw.title, context);
    let auth = authority.score(&raw.url);

    Candidate {
        url: raw.url.clone(),
        title: raw.title.clone(),
        strategy: raw.strategy,
        domain_match,
        path_similarity,
        content_relevance,
        authority: auth,
        confidence: fuse(domain_match, path_similarity, content_relevance, auth),
    }
}

/// Weighted fusion, rounded to 3 decimals. Idempotent by construction.
pub fn fuse(domain_match: f64, path_similarity: f64, content_relevance: f64, authority: f64) -> f64 {
    let raw = domain_match * WEIGHT_DOMAIN
        + path_similarity * WEIGHT_PATH
        + content_relevance * WEIGHT_CONTENT
        + authority * WEIGHT_AUTHORITY;
    (raw * 1000.0).round() / 1000.0
}

/// 1.0 for identical hosts, 0.8 for a shared registrable domain, else 0.0.
pub fn domain_match_score(original_url: &str, candidate_url: &str) -> f64 {
    let (Some(orig), Some(cand)) = (host_of(original_url), host_of(candidate_url)) else {
        return 0.0;
    };
    if orig == cand {
        1.0
    } else if registrable_domain(&orig) == registrable_domain(&cand) {
        0.8
    } else {
        0.0
    }
}

/// Sequence similarity of the two URL paths, slashes trimmed.
pub fn path_similarity_score(url_a: &str, url_b: &str) -> f64 {
    similarity_ratio(&path_of(url_a), &path_of(url_b))
}

/// Blend of token overlap (60%) and raw sequence similarity (40%) between a
/// candidate title and the surrounding context. 0.3 default when either side
/// is empty.
pub fn content_relevance_score(title: &str, context: &str) -> f64 {
    if title.is_empty() || context.is_empty() {
        return 0.3;
    }
    let title_lower = title.to_lowercase();
    let context_lower = context.to_lowercase();

    let word_re = Regex::new(r"\b\w{4,}\b").unwrap();
    let context_words: std::collections::HashSet<&str> = word_re
        .find_iter(&context_lower)
        .map(|m| m.as_str())
        .collect();
    if context_words.is_empty() {
        return 0.3;
    }
    let title_words: std::collections::HashSet<&str> = word_re
        .find_iter(&title_lower)
        .map(|m| m.as_str())
        .collect();

    let overlap = context_words.intersection(&title_words).count();
    let ratio = overlap as f64 / context_words.len() as f64;
    let seq = similarity_ratio(&title_lower, &context_lower);
    (ratio * 0.6 + seq * 0.4).min(1.0)
}

/// Ratcliff/Obershelp ratio: 2*M / (len_a + len_b), where M is the total
/// length of matching blocks found by recursing around the longest common
/// substring. 1.0 when both strings are empty.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_len(&a, &b) as f64 / total as f64
}

fn matching_len(a: &[char], b: &[char]) -> usize {
    let (pos_a, pos_b, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_len(&a[..pos_a], &b[..pos_b])
        + matching_len(&a[pos_a + len..], &b[pos_b + len..])
}

fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut cur = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let len = prev[j] + 1;
                cur[j + 1] = len;
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        prev = cur;
    }
    best
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

fn path_of(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.path().trim_matches('/').to_string())
        .unwrap_or_default()
}

/// Last two DNS labels, the coarse "same site" notion used for both the
/// domain-match signal and authority fallback.
fn registrable_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        host.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}
