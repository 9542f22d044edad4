//! verify command: audit every link in a document
//!
//! Extracts references, probes them in parallel behind a semaphore bound,
//! and reports per-link outcomes sorted by line number. Exit code 1 when at
//! least one link is dead; redirects, blocked hosts and transport errors
//! alone do not fail the run.

use crate::check::{self, Category, CheckOutcome};
use crate::extract::{extract_references, Reference};
use crate::http;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Args)]
pub struct VerifyArgs {
    /// Markdown or text file to audit
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    /// Number of parallel probes (1-50)
    #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u8).range(1..=50))]
    pub workers: u8,

    /// Extra attempts granted to transport failures
    #[arg(long, default_value = "1")]
    pub retries: u8,

    /// Output JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Configuration for a verification run
pub struct VerifyConfig {
    pub timeout: Duration,
    pub workers: usize,
    pub retries: u8,
}

/// One reference merged with its probe outcome
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedLink {
    pub url: String,
    pub status_code: u16,
    pub final_url: String,
    pub category: Category,
    pub error: String,
    pub line_number: usize,
    pub link_text: String,
}

impl VerifiedLink {
    fn new(reference: Reference, outcome: CheckOutcome) -> Self {
        Self {
            url: reference.url,
            status_code: outcome.status_code,
            final_url: outcome.final_url,
            category: outcome.category,
            error: outcome.error,
            line_number: reference.line_number,
            link_text: reference.link_text,
        }
    }
}

/// Per-category counts for the report footer
#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub ok: usize,
    pub redirect: usize,
    pub dead: usize,
    pub blocked: usize,
    pub errors: usize,
}

impl Summary {
    fn tally(results: &[VerifiedLink]) -> Self {
        let mut summary = Summary::default();
        for r in results {
            match r.category {
                Category::Ok => summary.ok += 1,
                Category::Redirect => summary.redirect += 1,
                Category::Dead => summary.dead += 1,
                Category::Blocked => summary.blocked += 1,
                _ => summary.errors += 1,
            }
        }
        summary
    }
}

/// Full verification report
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub file: String,
    pub total: usize,
    pub results: Vec<VerifiedLink>,
    pub summary: Summary,
    pub timestamp: String,
}

pub async fn run_verify(args: VerifyArgs) -> Result<i32> {
    let content = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let refs = extract_references(&content);
    eprintln!(
        "Found {} links in {} ({} parallel)...",
        refs.len(),
        args.file.display(),
        args.workers
    );

    let config = VerifyConfig {
        timeout: Duration::from_secs(args.timeout),
        workers: args.workers as usize,
        retries: args.retries,
    };

    let client = http::build_client(config.timeout)?;
    let results = verify_links(&client, refs, &config).await;

    let report = VerifyReport {
        file: args.file.display().to_string(),
        total: results.len(),
        summary: Summary::tally(&results),
        results,
        timestamp: Utc::now().to_rfc3339(),
    };

    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        print_table(&report.results);
    }

    Ok(if report.summary.dead > 0 { 1 } else { 0 })
}

/// Probe every reference with a bounded number of in-flight requests.
/// Every input reference appears in the output exactly once, even when its
/// probe task fails to complete. Results come back sorted by line number,
/// extraction order on ties.
pub async fn verify_links(
    client: &Client,
    refs: Vec<Reference>,
    config: &VerifyConfig,
) -> Vec<VerifiedLink> {
    let semaphore = Arc::new(Semaphore::new(config.workers));

    let tasks: Vec<_> = refs
        .iter()
        .map(|reference| {
            let client = client.clone();
            let semaphore = Arc::clone(&semaphore);
            let url = reference.url.clone();
            let retries = config.retries;
            tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => return failed_probe_outcome(&url, "Worker pool closed"),
                };
                eprintln!("  -> {}", truncate(&url, 60));
                check::check_url(&client, &url, retries).await
            })
        })
        .collect();

    let outcomes = join_all(tasks).await;

    let mut rows: Vec<(usize, Reference, CheckOutcome)> = refs
        .into_iter()
        .zip(outcomes)
        .enumerate()
        .map(|(seq, (reference, joined))| {
            let outcome = joined
                .unwrap_or_else(|_| failed_probe_outcome(&reference.url, "Probe task failed"));
            (seq, reference, outcome)
        })
        .collect();

    rows.sort_by_key(|(seq, reference, _)| (reference.line_number, *seq));

    rows.into_iter()
        .map(|(_, reference, outcome)| VerifiedLink::new(reference, outcome))
        .collect()
}

fn print_table(results: &[VerifiedLink]) {
    println!("\n{:<4} {:<8} {:<14} URL", "#", "Status", "Category");
    println!("{}", "-".repeat(100));

    for (i, r) in results.iter().enumerate() {
        let status = if r.status_code == 0 {
            "ERR".to_string()
        } else {
            r.status_code.to_string()
        };
        println!(
            "{:<4} {:<8} {:<14} {}",
            i + 1,
            status,
            r.category.to_string(),
            r.url
        );
        if r.category == Category::Redirect && r.final_url != r.url {
            println!("{:>27} -> {}", "", r.final_url);
        }
        if !r.error.is_empty() {
            println!("{:>27} !! {}", "", r.error);
        }
    }

    println!("{}", "-".repeat(100));
    let summary = Summary::tally(results);
    println!(
        "Total: {} links | {} OK | {} redirects | {} dead | {} blocked | {} errors",
        results.len(),
        summary.ok,
        summary.redirect,
        summary.dead,
        summary.blocked,
        summary.errors
    );
}

/// Stand-in outcome for a reference whose probe task never returned.
fn failed_probe_outcome(url: &str, detail: &str) -> CheckOutcome {
    CheckOutcome {
        status_code: 0,
        final_url: url.to_string(),
        category: Category::Unknown,
        error: detail.to_string(),
    }
}

// Counts chars, not bytes: URLs can carry multibyte characters.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(workers: usize) -> VerifyConfig {
        VerifyConfig {
            timeout: Duration::from_secs(2),
            workers,
            retries: 0,
        }
    }

    async fn mock_status(server: &MockServer, route: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_verify_sorted_by_line_number() {
        let server = MockServer::start().await;
        mock_status(&server, "/a", 200).await;
        mock_status(&server, "/b", 404).await;
        mock_status(&server, "/c", 200).await;

        let doc = format!(
            "line one {0}/c\n\n[b]({0}/b)\nand {0}/a\n",
            server.uri()
        );
        let refs = extract_references(&doc);
        let client = http::build_client(Duration::from_secs(2)).unwrap();
        let results = verify_links(&client, refs, &config(4)).await;

        assert_eq!(results.len(), 3);
        let lines: Vec<usize> = results.iter().map(|r| r.line_number).collect();
        assert_eq!(lines, vec![1, 3, 4]);
        assert_eq!(results[1].category, Category::Dead);
        assert_eq!(results[1].link_text, "b");
    }

    #[tokio::test]
    async fn test_verify_ties_keep_extraction_order() {
        let server = MockServer::start().await;
        mock_status(&server, "/x", 200).await;
        mock_status(&server, "/y", 200).await;

        let doc = format!("{0}/x then {0}/y on one line", server.uri());
        let refs = extract_references(&doc);
        let client = http::build_client(Duration::from_secs(2)).unwrap();

        // Run a few times: completion order must not leak into the report.
        for _ in 0..3 {
            let results = verify_links(&client, refs.clone(), &config(2)).await;
            assert!(results[0].url.ends_with("/x"));
            assert!(results[1].url.ends_with("/y"));
        }
    }

    #[tokio::test]
    async fn test_verify_mixed_outcomes_all_reported() {
        let server = MockServer::start().await;
        mock_status(&server, "/ok", 200).await;
        mock_status(&server, "/blocked", 403).await;
        mock_status(&server, "/boom", 500).await;

        let doc = format!(
            "{0}/ok\n{0}/blocked\n{0}/boom\nhttp://127.0.0.1:9/refused\n",
            server.uri()
        );
        let refs = extract_references(&doc);
        let client = http::build_client(Duration::from_secs(2)).unwrap();
        let results = verify_links(&client, refs, &config(10)).await;

        assert_eq!(results.len(), 4);
        let summary = Summary::tally(&results);
        assert_eq!(summary.ok, 1);
        assert_eq!(summary.blocked, 1);
        assert_eq!(summary.errors, 2); // 500 plus the refused connection
        assert_eq!(summary.dead, 0);
    }

    #[tokio::test]
    async fn test_verify_long_multibyte_url_stays_in_report() {
        // Progress logging truncates long URLs; a multibyte path must not
        // make the probe task panic and drop its reference from the report.
        let url = format!("http://127.0.0.1:9/{}", "é".repeat(30));
        let doc = format!("broken: {}\n", url);
        let refs = extract_references(&doc);
        assert_eq!(refs.len(), 1);

        let client = http::build_client(Duration::from_secs(1)).unwrap();
        let results = verify_links(&client, refs, &config(2)).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, url);
        assert_eq!(results[0].line_number, 1);
        assert_eq!(results[0].category, Category::Unknown);
        assert!(!results[0].error.is_empty());
    }

    #[tokio::test]
    async fn test_verify_empty_document() {
        let client = http::build_client(Duration::from_secs(1)).unwrap();
        let results = verify_links(&client, Vec::new(), &config(2)).await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a very long string", 10), "this is...");

        let wide = "é".repeat(30);
        assert_eq!(truncate(&wide, 10), format!("{}...", "é".repeat(7)));
    }
}
