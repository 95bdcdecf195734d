// src/checker/http.rs
// =============================================================================
// This module talks HTTP. It is the only place in the program that waits on
// the network.
//
// Key functionality:
// - Existence checks: HEAD request, follow redirects, report status
// - Content fetches: GET request, return the body of pages we want to parse
// - Transport failures (DNS, refused connection, timeout, TLS, bad URL) come
//   back as a FetchError value, never as a panic
//
// Rust concepts:
// - async/await: For network I/O
// - Result<T, E>: Failures are ordinary values the caller matches on
// - thiserror: Derives Display/Error for our error enum
// =============================================================================

use reqwest::{redirect, Client};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::CheckerConfig;

// What kind of request to make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// HEAD request, no body downloaded
    Existence,
    /// GET request, body returned as text when the status is below 400
    Content,
}

// Why a fetch did not produce a response
//
// Every variant carries the human-readable description from the underlying
// error so reports can show it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("could not resolve hostname: {0}")]
    Dns(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("TLS error: {0}")]
    Tls(String),
    #[error("too many redirects: {0}")]
    TooManyRedirects(String),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("request failed: {0}")]
    Request(String),
}

// A response we actually received (any status code)
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    /// Address after following redirects
    pub final_url: String,
    /// status < 400
    pub accessible: bool,
    /// Only set for FetchMode::Content with an accessible status
    pub body: Option<String>,
}

// The verdict for one distinct address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub url: String,
    pub status: Option<u16>,
    pub reachable: bool,
    pub error: Option<FetchError>,
    pub final_url: Option<String>,
}

impl CheckOutcome {
    /// Turns the result of an existence check into an outcome for `url`
    pub fn from_fetch(url: String, result: Result<FetchedPage, FetchError>) -> Self {
        match result {
            Ok(page) => CheckOutcome {
                url,
                status: Some(page.status),
                reachable: page.accessible,
                error: None,
                final_url: Some(page.final_url),
            },
            Err(error) => CheckOutcome {
                url,
                status: None,
                reachable: false,
                error: Some(error),
                final_url: None,
            },
        }
    }

    /// True when a redirect took us somewhere other than the requested address
    pub fn was_redirected(&self) -> bool {
        self.final_url
            .as_deref()
            .is_some_and(|final_url| final_url != self.url)
    }
}

// Wraps a pooled reqwest client. Build one per operation and share it
// (by reference) between the crawler and the verifier.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &CheckerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }

    /// Makes exactly one request for `url` (plus any redirect hops).
    ///
    /// `timeout` bounds the whole request, including reading the body.
    pub async fn fetch(
        &self,
        url: &str,
        mode: FetchMode,
        timeout: Duration,
    ) -> Result<FetchedPage, FetchError> {
        // Reject malformed addresses up front so they get a clear message
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        let request = match mode {
            FetchMode::Existence => self.client.head(parsed),
            FetchMode::Content => self.client.get(parsed),
        };

        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let accessible = status < 400;

        tracing::debug!(url, status, final_url = %final_url, ?mode, "response received");

        let body = if mode == FetchMode::Content && accessible {
            Some(response.text().await.map_err(categorize_error)?)
        } else {
            None
        };

        Ok(FetchedPage {
            status,
            final_url,
            accessible,
            body,
        })
    }

    /// Existence check folded into a CheckOutcome
    pub async fn check(&self, url: &str, timeout: Duration) -> CheckOutcome {
        let result = self.fetch(url, FetchMode::Existence, timeout).await;
        if let Err(e) = &result {
            tracing::debug!(url, error = %e, "check failed");
        }
        CheckOutcome::from_fetch(url.to_string(), result)
    }
}

// Categorizes reqwest errors
//
// reqwest only exposes coarse predicates (is_timeout, is_connect, ...), so the
// finer split between DNS and TLS problems looks at the error chain text.
fn categorize_error(error: reqwest::Error) -> FetchError {
    let causes = source_chain(&error);
    let message = if causes.is_empty() {
        error.to_string()
    } else {
        format!("{error}: {causes}")
    };

    if error.is_timeout() {
        FetchError::Timeout(message)
    } else if error.is_redirect() {
        FetchError::TooManyRedirects(message)
    } else if error.is_builder() {
        FetchError::InvalidUrl(message)
    } else if error.is_connect() {
        // Only the causes are inspected: the outer message embeds the URL
        let causes = causes.to_lowercase();
        if causes.contains("dns error") || causes.contains("failed to lookup address") {
            FetchError::Dns(message)
        } else if causes.contains("certificate") || causes.contains("tls") || causes.contains("ssl") {
            FetchError::Tls(message)
        } else {
            FetchError::Connect(message)
        }
    } else if error.is_body() || error.is_decode() {
        FetchError::Body(message)
    } else {
        FetchError::Request(message)
    }
}

// reqwest's Display only shows the outermost layer; the useful part
// ("Connection refused", "dns error") sits further down the source chain.
fn source_chain(error: &reqwest::Error) -> String {
    let mut causes = Vec::new();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        causes.push(inner.to_string());
        source = inner.source();
    }
    causes.join(": ")
}
