//! Replacement-candidate search strategies
//!
//! Four independent sources, executed in a fixed order so the final ranking
//! tie-break is deterministic. A strategy that fails on the network or while
//! parsing contributes zero candidates; siblings are unaffected.

pub mod domain_probe;
pub mod search;
pub mod wayback;

use reqwest::Client;
use serde::Serialize;

/// Public availability endpoint of the Internet Archive.
pub const WAYBACK_API: &str = "https://archive.org/wayback/available";
/// DuckDuckGo instant-answer API, used by both search strategies.
pub const SEARCH_API: &str = "https://api.duckduckgo.com/";

/// Which strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Wayback,
    DomainProbe,
    WebSearch,
    SemanticSearch,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StrategyKind::Wayback => "wayback",
            StrategyKind::DomainProbe => "domain_probe",
            StrategyKind::WebSearch => "web_search",
            StrategyKind::SemanticSearch => "semantic_search",
        };
        write!(f, "{}", s)
    }
}

/// Unscored candidate as it comes out of a strategy.
#[derive(Debug, Clone)]
pub struct RawCandidate {
    pub url: String,
    /// Best-effort page label, may be empty
    pub title: String,
    pub strategy: StrategyKind,
    /// Strategy-specific annotation (e.g. archive snapshot location)
    pub note: Option<String>,
}

/// Knobs for one replacement search. Endpoints are injectable so tests can
/// point the strategies at a local server.
pub struct SearchConfig {
    pub wayback_endpoint: String,
    pub search_endpoint: String,
    /// Retry budget for domain-probe aliveness checks. Kept separate from the
    /// main checker's budget: probes default to a single cheap attempt.
    pub probe_retries: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            wayback_endpoint: WAYBACK_API.to_string(),
            search_endpoint: SEARCH_API.to_string(),
            probe_retries: 0,
        }
    }
}

/// Run all four strategies in order and concatenate their raw candidates.
pub async fn run_all(
    client: &Client,
    dead_url: &str,
    context: &str,
    config: &SearchConfig,
) -> Vec<RawCandidate> {
    let mut raw = Vec::new();
    raw.extend(wayback::find(client, &config.wayback_endpoint, dead_url).await);
    raw.extend(domain_probe::find(client, dead_url, config.probe_retries).await);
    raw.extend(search::web_search(client, &config.search_endpoint, dead_url).await);
    raw.extend(search::semantic_search(client, &config.search_endpoint, context).await);
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&StrategyKind::DomainProbe).unwrap(),
            r#""domain_probe""#
        );
        assert_eq!(StrategyKind::SemanticSearch.to_string(), "semantic_search");
    }
}
