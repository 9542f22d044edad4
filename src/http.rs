//! Shared HTTP plumbing: browser-identifying client and quick aliveness probe

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

/// Ordinary browser UA. Bot-defended domains answer curl-like agents with 403,
/// which would show up as false dead links.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Max redirects followed before the probe gives up with a redirect-loop error.
pub const MAX_REDIRECTS: usize = 10;

/// Build the shared client used by the checker and all search strategies.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .context("Failed to build HTTP client")
}

/// Quick "does it answer 200" probe: HEAD first, GET when HEAD is rejected
/// with 405. The body is never read. Retries transport failures up to
/// `retries` extra attempts (the domain-probe strategy passes 0).
pub async fn is_alive(client: &Client, url: &str, retries: u8) -> bool {
    for attempt in 0..=retries {
        match client.head(url).send().await {
            Ok(resp) if resp.status().as_u16() == 405 => {
                match client.get(url).send().await {
                    Ok(resp) => return resp.status().as_u16() == 200,
                    Err(_) if attempt < retries => continue,
                    Err(_) => return false,
                }
            }
            Ok(resp) => return resp.status().as_u16() == 200,
            Err(_) if attempt < retries => continue,
            Err(_) => return false,
        }
    }
    false
}
