// src/crawl/queue.rs
// =============================================================================
// This module implements website crawling with a breadth-first approach.
//
// How it works:
// 1. Start with the base URL in a queue at depth 0
// 2. Pop the front of the queue; skip it if already visited or too deep
// 3. Fetch the page HTML and extract every link on it
// 4. Record all of those links (internal and external)
// 5. Queue the same-origin ones at depth + 1 while depth < max_depth
// 6. Repeat until the queue is empty
//
// The loop is strictly sequential: one page is fetched and parsed before the
// next one is dequeued. Duplicates may sit in the queue; the visited check at
// dequeue time guarantees no page is expanded twice.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use url::{Origin, Url};

use crate::checker::{FetchMode, Fetcher, Link, LinkExtractor};

// Represents a page in the crawl queue
#[derive(Debug, Clone)]
struct CrawlItem {
    url: String,
    depth: usize, // How many link hops from the base URL
}

// Everything a crawl discovered
#[derive(Debug, Default)]
pub struct CrawlOutput {
    /// Every link found, in discovery order, one entry per occurrence
    pub links: Vec<Link>,
    /// Pages that were expanded, in the order they were dequeued
    pub visited: Vec<String>,
    /// Expanded pages that produced no content (transport error or status >= 400)
    pub pages_failed: usize,
    /// References left out because they can't be checked over HTTP
    pub skipped_refs: usize,
    pub elapsed: Duration,
}

// Crawls a website starting from a URL
//
// Parameters:
//   fetcher: shared HTTP client
//   base_url: where to start; also the root relative links are resolved against
//   max_depth: 0 = only the base page, 1 = base page + the pages it links to, ...
//   include_external: keep links to other origins in the output
//   timeout: per-request timeout
pub async fn crawl_website(
    fetcher: &Fetcher,
    base_url: &str,
    max_depth: usize,
    include_external: bool,
    timeout: Duration,
) -> CrawlOutput {
    let started = Instant::now();
    let base_origin = origin_of(base_url);

    let mut queue = VecDeque::new();
    queue.push_back(CrawlItem {
        url: base_url.to_string(),
        depth: 0,
    });

    let extractor = LinkExtractor::new();
    let mut visited = HashSet::new();
    let mut output = CrawlOutput::default();

    while let Some(item) = queue.pop_front() {
        if item.depth > max_depth || visited.contains(&item.url) {
            continue;
        }

        visited.insert(item.url.clone());
        output.visited.push(item.url.clone());

        tracing::info!(depth = item.depth, url = %item.url, "crawling page");

        let html = match fetcher.fetch(&item.url, FetchMode::Content, timeout).await {
            Ok(page) => match page.body {
                Some(body) => body,
                None => {
                    tracing::warn!(url = %item.url, status = page.status, "page not expandable");
                    output.pages_failed += 1;
                    continue;
                }
            },
            Err(e) => {
                tracing::warn!(url = %item.url, error = %e, "failed to fetch page");
                output.pages_failed += 1;
                continue;
            }
        };

        let page = extractor.extract(&item.url, base_url, &html);
        output.skipped_refs += page.skipped;

        for link in page.links {
            if item.depth < max_depth && same_origin(&link.url, base_origin.as_ref()) {
                queue.push_back(CrawlItem {
                    url: link.url.clone(),
                    depth: item.depth + 1,
                });
            }
            output.links.push(link);
        }
    }

    // Filter external links only now, so they were still recorded while crawling
    if !include_external {
        output
            .links
            .retain(|link| same_origin(&link.url, base_origin.as_ref()));
    }

    output.elapsed = started.elapsed();
    tracing::info!(
        pages = output.visited.len(),
        failed = output.pages_failed,
        skipped = output.skipped_refs,
        links = output.links.len(),
        elapsed_ms = output.elapsed.as_millis() as u64,
        "crawl finished"
    );

    output
}

// None when the base URL can't be parsed; nothing is then same-origin
fn origin_of(url: &str) -> Option<Origin> {
    Url::parse(url).ok().map(|u| u.origin())
}

// Scheme + host + port comparison. Opaque origins never match.
fn same_origin(url: &str, base_origin: Option<&Origin>) -> bool {
    match (base_origin, origin_of(url)) {
        (Some(base), Some(origin)) => origin.is_tuple() && origin == *base,
        _ => false,
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the same URL allowed in the queue twice?
//    - Checking the queue before every push_back would be O(n) per link
//    - The visited check at pop_front() is O(1) and catches duplicates anyway
//    - A page can only be expanded once, so the crawl still terminates
//
// 2. What is url::Origin?
//    - The (scheme, host, port) triple browsers use for same-site decisions
//    - http://a.test and https://a.test are different origins
//    - mailto: and other non-hierarchical URLs get an "opaque" origin that
//      never equals anything else
//
// 3. Why filter external links at the end instead of skipping them?
//    - They have to be seen to decide they are external
//    - Keeping the filter in one place makes include_external a pure
//      post-processing step; the traversal is identical either way
// -----------------------------------------------------------------------------
