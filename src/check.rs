//! Single-URL liveness checking
//!
//! Probes follow redirects and read only status + headers; the body is never
//! consumed. Transport faults never escape as errors - they come back as
//! `CheckOutcome` data with a sentinel status code and a populated `error`.

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

/// Sentinel status for a redirect loop (no real HTTP code was received).
pub const STATUS_TOO_MANY_REDIRECTS: u16 = 310;
/// Sentinel status for TLS/certificate failures.
pub const STATUS_TLS_ERROR: u16 = 495;
/// Sentinel status for a timeout after the retry budget is spent.
pub const STATUS_TIMEOUT: u16 = 408;

/// Coarse classification of a probe result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ok,
    Redirect,
    Blocked,
    Dead,
    ClientError,
    ServerError,
    Unknown,
}

impl Category {
    /// Pure function of the status code, total over all u16 values.
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => Category::Ok,
            301 | 302 | 303 | 307 | 308 => Category::Redirect,
            403 => Category::Blocked,
            404 => Category::Dead,
            400..=499 => Category::ClientError,
            500..=599 => Category::ServerError,
            _ => Category::Unknown,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Ok => "ok",
            Category::Redirect => "redirect",
            Category::Blocked => "blocked",
            Category::Dead => "dead",
            Category::ClientError => "client_error",
            Category::ServerError => "server_error",
            Category::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Result of probing one URL.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    /// Final HTTP status, or 0 / a sentinel for transport failures
    pub status_code: u16,
    /// Location after following redirects; equals the input URL otherwise
    pub final_url: String,
    pub category: Category,
    /// Failure detail, empty on any real HTTP response
    pub error: String,
}

impl CheckOutcome {
    fn from_status(status_code: u16, final_url: String) -> Self {
        Self {
            status_code,
            final_url,
            category: Category::from_status(status_code),
            error: String::new(),
        }
    }

    fn from_failure(failure: &TransportFailure, url: &str) -> Self {
        let status_code = failure.status_code();
        Self {
            status_code,
            final_url: url.to_string(),
            category: Category::from_status(status_code),
            error: failure.to_string(),
        }
    }
}

/// Transport-level faults, mapped onto sentinel status codes. HTTP error
/// statuses (4xx/5xx) are not faults and never appear here.
#[derive(Debug, Error)]
enum TransportFailure {
    #[error("Too many redirects")]
    TooManyRedirects,
    #[error("TLS error: {0}")]
    Tls(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Request error: {0}")]
    Other(String),
}

impl TransportFailure {
    fn classify(err: &reqwest::Error) -> Self {
        let detail = error_chain_text(err);
        let chain = detail.to_lowercase();
        if err.is_redirect() {
            TransportFailure::TooManyRedirects
        } else if chain.contains("certificate") || chain.contains("tls") || chain.contains("ssl") {
            TransportFailure::Tls(detail)
        } else if err.is_timeout() {
            TransportFailure::Timeout
        } else if err.is_connect() {
            TransportFailure::Connection(detail)
        } else {
            TransportFailure::Other(detail)
        }
    }

    fn status_code(&self) -> u16 {
        match self {
            TransportFailure::TooManyRedirects => STATUS_TOO_MANY_REDIRECTS,
            TransportFailure::Tls(_) => STATUS_TLS_ERROR,
            TransportFailure::Timeout => STATUS_TIMEOUT,
            TransportFailure::Connection(_) | TransportFailure::Other(_) => 0,
        }
    }

    /// Only connection-level faults and timeouts get another attempt.
    /// A redirect loop or TLS failure will not fix itself on retry.
    fn retryable(&self) -> bool {
        matches!(
            self,
            TransportFailure::Timeout | TransportFailure::Connection(_)
        )
    }
}

/// Flatten the full source chain: reqwest's Display alone omits the
/// underlying cause (where the certificate/DNS detail lives).
fn error_chain_text(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Probe one URL. `retries` is the number of extra attempts granted to
/// retryable transport faults; 4xx/5xx responses are terminal signal.
pub async fn check_url(client: &Client, url: &str, retries: u8) -> CheckOutcome {
    for attempt in 0..=retries {
        match client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let final_url = resp.url().to_string();
                // Drop the response without reading the body.
                return CheckOutcome::from_status(status, final_url);
            }
            Err(err) => {
                let failure = TransportFailure::classify(&err);
                if failure.retryable() && attempt < retries {
                    continue;
                }
                return CheckOutcome::from_failure(&failure, url);
            }
        }
    }
    CheckOutcome {
        status_code: 0,
        final_url: url.to_string(),
        category: Category::Unknown,
        error: "All retries exhausted".to_string(),
    }
}
