// src/checker/mod.rs
// =============================================================================
// This module contains the link checking building blocks.
//
// Submodules:
// - http: Fetches addresses (existence checks and page downloads)
// - html: Extracts links from HTML pages
// - verify: Checks a batch of addresses in bounded waves
//
// This file (mod.rs) is the module root: it re-exports the public API so the
// rest of the program can write `checker::verify()` instead of
// `checker::verify::verify()`.
// =============================================================================

mod html;
mod http;
mod verify;

pub use html::{Link, LinkExtractor, LinkKind, SourceTag};
pub use http::{CheckOutcome, FetchError, FetchMode, Fetcher};
pub use verify::verify;
