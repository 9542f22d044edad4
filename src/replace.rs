//! replace command: rank replacement candidates for one dead URL
//!
//! Runs all search strategies, deduplicates across them, scores survivors
//! and returns the top N. Exit codes are the orchestrator contract: 0 when
//! the best candidate is high-confidence, 2 when candidates exist but none
//! is, 1 when nothing was found.

use crate::http;
use crate::score::{score_candidate, AuthorityTable, Candidate};
use crate::strategy::{self, RawCandidate, SearchConfig};
use anyhow::Result;
use clap::Args;
use reqwest::Client;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Duration;

/// Top candidate at or above this confidence is safe to apply automatically.
pub const HIGH_CONFIDENCE: f64 = 0.8;
/// Between this and HIGH_CONFIDENCE the candidate needs human confirmation.
pub const MEDIUM_CONFIDENCE: f64 = 0.5;

#[derive(Args)]
pub struct ReplaceArgs {
    /// The dead URL to find a replacement for
    #[arg(long)]
    pub url: String,

    /// Surrounding document text for semantic matching
    #[arg(long, default_value = "")]
    pub context: String,

    /// Number of top candidates to return
    #[arg(long, default_value = "5")]
    pub top: usize,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    /// Extra attempts for domain-probe aliveness checks
    #[arg(long, default_value = "0")]
    pub probe_retries: u8,

    /// Output JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Machine-readable replacement report
#[derive(Debug, Serialize)]
pub struct ReplaceReport {
    pub dead_url: String,
    pub context: String,
    pub candidates: Vec<Candidate>,
    /// Top candidate's URL, only when it clears the high-confidence bar
    pub recommendation: Option<String>,
}

pub async fn run_replace(args: ReplaceArgs) -> Result<i32> {
    let client = http::build_client(Duration::from_secs(args.timeout))?;
    let config = SearchConfig {
        probe_retries: args.probe_retries,
        ..SearchConfig::default()
    };
    let table = AuthorityTable::default();

    eprintln!("Searching replacements for {}...", args.url);
    let candidates =
        find_replacements(&client, &args.url, &args.context, args.top, &config, &table).await;

    let report = ReplaceReport {
        dead_url: args.url.clone(),
        context: args.context.chars().take(200).collect(),
        recommendation: recommendation(&candidates),
        candidates,
    };

    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        print_table(&report.candidates, &report.dead_url);
    }

    Ok(exit_code(&report.candidates))
}

/// Run every strategy, then dedup, score, rank and truncate.
pub async fn find_replacements(
    client: &Client,
    dead_url: &str,
    context: &str,
    top_n: usize,
    config: &SearchConfig,
    table: &AuthorityTable,
) -> Vec<Candidate> {
    let raw = strategy::run_all(client, dead_url, context, config).await;
    rank_candidates(dead_url, raw, context, top_n, table)
}

/// Pure merge step: cross-strategy dedup by exact URL (first occurrence's
/// strategy wins), self-referential candidates dropped, stable descending
/// sort by confidence. Ties keep merge order, which favors earlier
/// strategies.
pub fn rank_candidates(
    dead_url: &str,
    raw: Vec<RawCandidate>,
    context: &str,
    top_n: usize,
    table: &AuthorityTable,
) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut scored: Vec<Candidate> = raw
        .into_iter()
        .filter(|c| c.url != dead_url && seen.insert(c.url.clone()))
        .map(|c| score_candidate(dead_url, &c, context, table))
        .collect();

    scored.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    scored.truncate(top_n);
    scored
}

fn recommendation(candidates: &[Candidate]) -> Option<String> {
    candidates
        .first()
        .filter(|c| c.confidence >= HIGH_CONFIDENCE)
        .map(|c| c.url.clone())
}

fn exit_code(candidates: &[Candidate]) -> i32 {
    match candidates.first() {
        Some(best) if best.confidence >= HIGH_CONFIDENCE => 0,
        Some(_) => 2,
        None => 1,
    }
}

fn print_table(candidates: &[Candidate], dead_url: &str) {
    println!("\nReplacement candidates for: {}", dead_url);
    println!("{}", "=".repeat(90));

    if candidates.is_empty() {
        println!("  No candidates found. Manual search required.");
        return;
    }

    println!(
        "  {:<5} {:<12} {:<18} {:<8} {:<8} {:<10} URL",
        "Rank", "Confidence", "Strategy", "Domain", "Path", "Relevance"
    );
    println!("{}", "-".repeat(90));

    for (i, c) in candidates.iter().enumerate() {
        println!(
            "  {:<5} {:<12.3} {:<18} {:<8.2} {:<8.2} {:<10.2} {}",
            i + 1,
            c.confidence,
            c.strategy.to_string(),
            c.domain_match,
            c.path_similarity,
            c.content_relevance,
            c.url
        );
        if !c.title.is_empty() {
            let title: String = c.title.chars().take(70).collect();
            println!("{:>8} Title: {}", "", title);
        }
    }

    println!("{}", "-".repeat(90));
    let best = &candidates[0];
    if best.confidence >= HIGH_CONFIDENCE {
        println!("  RECOMMENDATION: Use {} (high confidence)", best.url);
    } else if best.confidence >= MEDIUM_CONFIDENCE {
        println!(
            "  SUGGESTION: Consider {} (medium confidence, verify manually)",
            best.url
        );
    } else {
        println!("  WARNING: No high-confidence replacement found. Manual search needed.");
    }
}
