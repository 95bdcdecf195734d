// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a base URL
// - Only same-origin pages are expanded (external links are still recorded)
// - Configurable depth limit
// - Optional filtering of external links from the result
//
// Rust concepts:
// - Collections: HashSet for tracking visited URLs, VecDeque for the queue
// =============================================================================

mod queue;

// Re-export the main crawling function
pub use queue::{crawl_website, CrawlOutput};
