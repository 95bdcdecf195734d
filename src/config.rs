// src/config.rs
// =============================================================================
// Runtime configuration shared by the fetcher, the crawler and the verifier.
//
// There is no config file: every value has a default here and can be
// overridden from the command line (see cli.rs).
// =============================================================================

use std::time::Duration;

/// User agent sent with every request, e.g. "link-sentry/0.1.0"
pub const DEFAULT_USER_AGENT: &str = concat!("link-sentry/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout when the caller does not pick one
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How many existence checks may be in flight in one wave
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10;

/// Redirect hops followed before a check fails with TooManyRedirects
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Default crawl depth for `scan`
pub const DEFAULT_MAX_DEPTH: usize = 2;

// Settings that stay fixed for the lifetime of one operation
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub concurrency_limit: usize,
    pub max_redirects: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl CheckerConfig {
    /// Concurrency limit as used by the verifier (never zero)
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency_limit.max(1)
    }
}

// Parameters of a single website scan
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanParams {
    pub max_depth: usize,
    pub include_external: bool,
    #[serde(rename = "timeout_secs", serialize_with = "serialize_secs")]
    pub timeout: Duration,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            include_external: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckerConfig::default();
        assert!(config.user_agent.starts_with("link-sentry/"));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.concurrency_limit, 10);

        let params = ScanParams::default();
        assert_eq!(params.max_depth, 2);
        assert!(params.include_external);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let config = CheckerConfig {
            concurrency_limit: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_concurrency(), 1);
    }

    #[test]
    fn test_scan_params_serialize_timeout_as_seconds() {
        let json = serde_json::to_value(ScanParams::default()).unwrap();
        assert_eq!(json["timeout_secs"], 10);
        assert_eq!(json["max_depth"], 2);
    }
}
