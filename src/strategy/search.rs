//! Search-API strategies: broad web search and context-driven semantic search
//!
//! Both run the same instant-answer API; they differ in how the query is
//! built and how many related topics they keep.

use super::{RawCandidate, StrategyKind};
use anyhow::Result;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// Semantic search needs at least this much trimmed context to be worth a query.
const MIN_CONTEXT_LEN: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstantAnswer {
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    #[serde(rename = "Heading")]
    heading: String,
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RelatedTopic {
    #[serde(rename = "FirstURL")]
    first_url: String,
    #[serde(rename = "Text")]
    text: String,
}

/// Broad search: last path segment (hyphens as spaces) restricted to the
/// dead URL's registrable domain. Abstract result plus up to 5 topics.
pub async fn web_search(client: &Client, endpoint: &str, dead_url: &str) -> Vec<RawCandidate> {
    let Some(query) = build_site_query(dead_url) else {
        return Vec::new();
    };
    query_api(client, endpoint, &query)
        .await
        .map(|data| collect_candidates(data, StrategyKind::WebSearch, 5))
        .unwrap_or_default()
}

/// Context-driven search: first five distinct words of length >= 5, order of
/// first appearance. Abstract result plus up to 3 topics, no site restriction.
pub async fn semantic_search(client: &Client, endpoint: &str, context: &str) -> Vec<RawCandidate> {
    if context.trim().len() < MIN_CONTEXT_LEN {
        return Vec::new();
    }
    let Some(query) = build_context_query(context) else {
        return Vec::new();
    };
    query_api(client, endpoint, &query)
        .await
        .map(|data| collect_candidates(data, StrategyKind::SemanticSearch, 3))
        .unwrap_or_default()
}

async fn query_api(client: &Client, endpoint: &str, query: &str) -> Result<InstantAnswer> {
    let resp = client
        .get(endpoint)
        .query(&[("q", query), ("format", "json"), ("no_html", "1")])
        .send()
        .await?;
    Ok(resp.json().await?)
}

fn collect_candidates(
    data: InstantAnswer,
    strategy: StrategyKind,
    topic_limit: usize,
) -> Vec<RawCandidate> {
    let mut candidates = Vec::new();

    if !data.abstract_url.is_empty() {
        candidates.push(RawCandidate {
            url: data.abstract_url,
            title: data.heading,
            strategy,
            note: None,
        });
    }

    for topic in data.related_topics.into_iter().take(topic_limit) {
        if topic.first_url.starts_with("http") {
            candidates.push(RawCandidate {
                url: topic.first_url,
                title: topic.text.chars().take(80).collect(),
                strategy,
                note: None,
            });
        }
    }

    candidates
}

fn build_site_query(dead_url: &str) -> Option<String> {
    let parsed = Url::parse(dead_url).ok()?;
    let host = parsed.host_str()?;
    let slug = parsed
        .path()
        .trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    if slug.is_empty() {
        return None;
    }

    let labels: Vec<&str> = host.split('.').collect();
    let base = if labels.len() <= 2 {
        host.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    };

    Some(format!("{} site:{}", slug.replace('-', " "), base))
}

fn build_context_query(context: &str) -> Option<String> {
    let word_re = Regex::new(r"\b\w{5,}\b").unwrap();
    let lower = context.to_lowercase();

    let mut seen = std::collections::HashSet::new();
    let keywords: Vec<&str> = word_re
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| seen.insert(*w))
        .take(5)
        .collect();

    if keywords.is_empty() {
        None
    } else {
        Some(keywords.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Client {
        crate::http::build_client(Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_build_site_query() {
        assert_eq!(
            build_site_query("https://docs.example.com/guides/setting-up-ci").unwrap(),
            "setting up ci site:example.com"
        );
        assert!(build_site_query("https://example.com/").is_none());
    }

    #[test]
    fn test_build_context_query_distinct_ordered() {
        let q = build_context_query(
            "Configure dependabot alerts so dependabot watches every repository",
        )
        .unwrap();
        assert_eq!(
            q,
            "configure dependabot alerts watches every"
        );
    }

    #[test]
    fn test_build_context_query_no_long_words() {
        assert!(build_context_query("a bb ccc dddd").is_none());
    }

    #[tokio::test]
    async fn test_web_search_collects_abstract_and_topics() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AbstractURL": "https://example.com/docs/new-page",
                "Heading": "New Page",
                "RelatedTopics": [
                    {"FirstURL": "https://example.com/docs/related", "Text": "Related topic"},
                    {"FirstURL": "", "Text": "no url"},
                    {"FirstURL": "https://example.com/docs/other", "Text": "Other"}
                ]
            })))
            .mount(&server)
            .await;

        let found = web_search(&client(), &server.uri(), "https://example.com/docs/old-page").await;
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].url, "https://example.com/docs/new-page");
        assert_eq!(found[0].title, "New Page");
        assert!(found.iter().all(|c| c.strategy == StrategyKind::WebSearch));
    }

    #[tokio::test]
    async fn test_semantic_search_short_context_skipped() {
        // No server: must return empty without attempting the network.
        let found = semantic_search(&client(), "http://127.0.0.1:9/", "  short  ").await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_semantic_search_topic_limit() {
        let server = MockServer::start().await;
        let topics: Vec<_> = (0..6)
            .map(|i| {
                serde_json::json!({
                    "FirstURL": format!("https://example.com/t{}", i),
                    "Text": format!("Topic {}", i)
                })
            })
            .collect();
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AbstractURL": "",
                "Heading": "",
                "RelatedTopics": topics
            })))
            .mount(&server)
            .await;

        let found = semantic_search(
            &client(),
            &server.uri(),
            "plenty of meaningful context words here",
        )
        .await;
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_search_failure_contributes_nothing() {
        let found = web_search(
            &client(),
            "http://127.0.0.1:9/",
            "https://example.com/docs/old-page",
        )
        .await;
        assert!(found.is_empty());
    }
}
