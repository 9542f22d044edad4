//! Domain-scoped probing
//!
//! Derives sibling URLs from the dead URL's own path (parent path, plus
//! site-search patterns for a couple of known documentation hosts) and keeps
//! only probes that answer 200 to a cheap aliveness check.

use super::{RawCandidate, StrategyKind};
use crate::http;
use reqwest::Client;
use url::Url;

pub async fn find(client: &Client, dead_url: &str, probe_retries: u8) -> Vec<RawCandidate> {
    let mut candidates = Vec::new();
    for probe in build_probe_urls(dead_url) {
        if http::is_alive(client, &probe, probe_retries).await {
            let slug = probe.rsplit('/').next().unwrap_or_default();
            candidates.push(RawCandidate {
                url: probe.clone(),
                title: format!("Domain probe: {}", slug),
                strategy: StrategyKind::DomainProbe,
                note: None,
            });
        }
    }
    candidates
}

/// Candidate URLs worth probing, derived purely from the dead URL.
fn build_probe_urls(dead_url: &str) -> Vec<String> {
    let Ok(parsed) = Url::parse(dead_url) else {
        return Vec::new();
    };
    let Some(host) = parsed.host_str() else {
        return Vec::new();
    };
    let authority = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let segments: Vec<&str> = parsed
        .path()
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let mut probes = Vec::new();

    // Parent path: the section index often survives a moved page.
    if segments.len() >= 2 {
        probes.push(format!(
            "{}://{}/{}",
            parsed.scheme(),
            authority,
            segments[..segments.len() - 1].join("/")
        ));
    }

    if let Some(slug) = segments.last() {
        let query = slug.replace('-', "+");
        if host.contains("docs.github.com") {
            probes.push(format!("https://docs.github.com/en/search?query={}", query));
        }
        if host.contains("learn.microsoft.com") {
            probes.push(format!(
                "https://learn.microsoft.com/en-us/search/?terms={}",
                query
            ));
        }
    }

    probes
}
