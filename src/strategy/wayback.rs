//! Archive availability lookup
//!
//! An existing snapshot is treated as evidence the dead URL pointed at real
//! content, so the original URL itself is emitted with the snapshot location
//! as a note. The snapshot URL is never proposed as the replacement.

use super::{RawCandidate, StrategyKind};
use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct AvailabilityResponse {
    #[serde(default)]
    archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
struct ArchivedSnapshots {
    closest: Option<Snapshot>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    available: bool,
    #[serde(default)]
    url: String,
}

pub async fn find(client: &Client, endpoint: &str, dead_url: &str) -> Vec<RawCandidate> {
    lookup(client, endpoint, dead_url).await.unwrap_or_default()
}

async fn lookup(client: &Client, endpoint: &str, dead_url: &str) -> Result<Vec<RawCandidate>> {
    let resp = client
        .get(endpoint)
        .query(&[("url", dead_url)])
        .send()
        .await?;
    let data: AvailabilityResponse = resp.json().await?;

    let mut candidates = Vec::new();
    if let Some(snapshot) = data.archived_snapshots.closest {
        if snapshot.available {
            let slug = dead_url.rsplit('/').next().unwrap_or_default();
            candidates.push(RawCandidate {
                url: dead_url.to_string(),
                title: format!("Archived: {}", slug),
                strategy: StrategyKind::Wayback,
                note: Some(format!("Archive available at {}", snapshot.url)),
            });
        }
    }
    Ok(candidates)
}
