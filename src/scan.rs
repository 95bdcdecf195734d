// src/scan.rs
// =============================================================================
// The two operations the command line exposes:
//
// - scan_website_links: crawl from a base URL, then verify every distinct
//   link that was found
// - check_specific_links: verify a caller-supplied list, no crawling
//
// Both build one Fetcher and share it between crawling and verification so
// connections are pooled across the whole operation.
// =============================================================================

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::checker::{self, CheckOutcome, Fetcher, Link};
use crate::config::{CheckerConfig, ScanParams};
use crate::crawl;

// Result of a website scan
#[derive(Debug)]
pub struct ScanOutput {
    /// Every link occurrence found while crawling (after scope filtering)
    pub links: Vec<Link>,
    /// One outcome per distinct link target
    pub outcomes: BTreeMap<String, CheckOutcome>,
    pub pages_visited: usize,
    pub pages_failed: usize,
    /// mailto:, tel:, javascript: and similar references that were not checked
    pub skipped_refs: usize,
}

pub async fn scan_website_links(
    config: &CheckerConfig,
    url: &str,
    params: &ScanParams,
) -> Result<ScanOutput> {
    let fetcher = Fetcher::new(config).context("Failed to create HTTP client")?;

    let crawled = crawl::crawl_website(
        &fetcher,
        url,
        params.max_depth,
        params.include_external,
        params.timeout,
    )
    .await;

    // Verify the (possibly scope-filtered) list: excluded external links are
    // never requested
    let targets = crawled.links.iter().map(|link| link.url.as_str());
    let outcomes = checker::verify(
        &fetcher,
        targets,
        config.effective_concurrency(),
        params.timeout,
    )
    .await;

    Ok(ScanOutput {
        links: crawled.links,
        outcomes,
        pages_visited: crawled.visited.len(),
        pages_failed: crawled.pages_failed,
        skipped_refs: crawled.skipped_refs,
    })
}

pub async fn check_specific_links(
    config: &CheckerConfig,
    urls: &[String],
    timeout: Duration,
) -> Result<BTreeMap<String, CheckOutcome>> {
    let fetcher = Fetcher::new(config).context("Failed to create HTTP client")?;
    let outcomes = checker::verify(
        &fetcher,
        urls.iter().map(String::as_str),
        config.effective_concurrency(),
        timeout,
    )
    .await;
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params(max_depth: usize, include_external: bool) -> ScanParams {
        ScanParams {
            max_depth,
            include_external,
            timeout: Duration::from_secs(5),
        }
    }

    async fn site(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="/a">A</a><a href="/missing">M</a><a href="http://127.0.0.1:1/ext">Ext</a>"#,
            ))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/missing">M</a>"#))
            .mount(server)
            .await;
        for route in ["/", "/a"] {
            Mock::given(method("HEAD"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200))
                .mount(server)
                .await;
        }
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_scan_checks_every_distinct_target_once() {
        let server = MockServer::start().await;
        site(&server).await;

        let base = format!("{}/", server.uri());
        let output = scan_website_links(&CheckerConfig::default(), &base, &params(1, true))
            .await
            .unwrap();

        // /a, /missing, ext from the base page, /missing again from /a
        assert_eq!(output.links.len(), 4);
        assert_eq!(output.outcomes.len(), 3);
        // /missing is expanded too and fails with a 404
        assert_eq!(output.pages_visited, 3);
        assert_eq!(output.pages_failed, 1);

        let missing = format!("{}/missing", server.uri());
        assert_eq!(output.outcomes[&missing].status, Some(404));
        assert!(output.outcomes[&format!("{}/a", server.uri())].reachable);
        assert!(output.outcomes["http://127.0.0.1:1/ext"].error.is_some());
    }

    #[tokio::test]
    async fn test_scan_without_external_skips_external_checks() {
        let server = MockServer::start().await;
        site(&server).await;

        let base = format!("{}/", server.uri());
        let output = scan_website_links(&CheckerConfig::default(), &base, &params(1, false))
            .await
            .unwrap();

        assert!(!output.outcomes.contains_key("http://127.0.0.1:1/ext"));
        assert_eq!(output.outcomes.len(), 2);
    }

    #[tokio::test]
    async fn test_check_specific_links() {
        let server = MockServer::start().await;
        site(&server).await;

        let urls = vec![
            format!("{}/a", server.uri()),
            format!("{}/missing", server.uri()),
            "bogus".to_string(),
        ];
        let outcomes = check_specific_links(&CheckerConfig::default(), &urls, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[&urls[0]].reachable);
        assert!(!outcomes[&urls[1]].reachable);
        assert!(outcomes["bogus"].error.is_some());
    }

    #[tokio::test]
    async fn test_scan_reports_malformed_link_as_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="http://exa mple.com/">Bad</a><a href="/a">A</a>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="http://exa mple.com/">Bad</a>"#))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let base = format!("{}/", server.uri());
        let output = scan_website_links(&CheckerConfig::default(), &base, &params(1, true))
            .await
            .unwrap();

        let bad = &output.outcomes["http://exa mple.com/"];
        assert!(!bad.reachable);
        assert!(matches!(bad.error, Some(crate::checker::FetchError::InvalidUrl(_))));

        let found_on: Vec<&str> = output
            .links
            .iter()
            .filter(|l| l.url == bad.url)
            .map(|l| l.found_on.as_str())
            .collect();
        assert_eq!(found_on, vec![base.clone(), format!("{}/a", server.uri())]);
    }
}
