// src/checker/html.rs
// =============================================================================
// This module extracts outbound references from HTML pages.
//
// Two families of references are collected:
// - navigational: <a href>, <link href>
// - embedded resources: <img src>, <script src>
//
// Each reference is resolved to an absolute URL and recorded as a Link, which
// remembers the page it was found on. Links are NOT deduplicated here: the
// report needs every occurrence to say where a broken link appears.
//
// We use the `scraper` crate (html5ever underneath), which never fails on bad
// markup; garbage in simply means no elements out.
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

/// Anchor text longer than this is cut off
pub const MAX_TEXT_CHARS: usize = 100;

// One selector for every tag we care about, so matches come back in
// document order regardless of tag kind
const REFERENCE_SELECTOR: &str = "a[href], link[href], img[src], script[src]";

// The tag a link was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    #[serde(rename = "a")]
    Anchor,
    Link,
    Img,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Navigational,
    Resource,
}

impl SourceTag {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "a" => Some(SourceTag::Anchor),
            "link" => Some(SourceTag::Link),
            "img" => Some(SourceTag::Img),
            "script" => Some(SourceTag::Script),
            _ => None,
        }
    }

    pub fn kind(self) -> LinkKind {
        match self {
            SourceTag::Anchor | SourceTag::Link => LinkKind::Navigational,
            SourceTag::Img | SourceTag::Script => LinkKind::Resource,
        }
    }

    // The attribute holding the target address
    fn attribute(self) -> &'static str {
        match self.kind() {
            LinkKind::Navigational => "href",
            LinkKind::Resource => "src",
        }
    }
}

/// A reference discovered on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Absolute target address
    pub url: String,
    /// Anchor text, or the alt text of a resource
    pub text: String,
    pub tag: SourceTag,
    /// Address of the page the reference appeared on
    pub found_on: String,
}

impl Link {
    pub fn kind(&self) -> LinkKind {
        self.tag.kind()
    }
}

// What one page contributed
#[derive(Debug, Default)]
pub struct PageLinks {
    /// Every reference in document order, duplicates included
    pub links: Vec<Link>,
    /// mailto:, tel:, javascript: and similar references left out
    pub skipped: usize,
}

// Extracts links from HTML pages
//
// Holds the parsed CSS selector so a crawl parses it once, not once per page.
#[derive(Debug)]
pub struct LinkExtractor {
    selector: Selector,
}

impl LinkExtractor {
    pub fn new() -> Self {
        Self {
            // Constant selector, known to be valid
            selector: Selector::parse(REFERENCE_SELECTOR).expect("reference selector is valid CSS"),
        }
    }

    // Extracts all links from HTML content
    //
    // Parameters:
    //   page_url: the page the HTML came from (recorded as found_on)
    //   base_url: the address relative references are resolved against
    //   html: the HTML content to parse
    //
    // A reference that can't be resolved is kept as written, so the verifier
    // reports it as an invalid URL instead of it silently disappearing.
    //
    // Example:
    //   html = "<a href='/docs'>Docs</a>"
    //   base_url = "https://example.com"
    //   links = [Link { url: "https://example.com/docs", text: "Docs", .. }]
    pub fn extract(&self, page_url: &str, base_url: &str, html: &str) -> PageLinks {
        let mut page = PageLinks::default();

        let base = match Url::parse(base_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(base_url, error = %e, "cannot resolve links against an invalid base URL");
                return page;
            }
        };

        let document = Html::parse_document(html);

        for element in document.select(&self.selector) {
            let Some(tag) = SourceTag::from_name(element.value().name()) else {
                continue;
            };
            let Some(raw) = element.value().attr(tag.attribute()) else {
                continue;
            };
            let raw = raw.trim();

            let url = match base.join(raw) {
                Ok(resolved) if is_checkable_link(&resolved) => resolved.to_string(),
                Ok(_) => {
                    tracing::debug!(reference = raw, "skipping non-HTTP reference");
                    page.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::debug!(reference = raw, error = %e, "keeping unresolvable reference as written");
                    raw.to_string()
                }
            };

            page.links.push(Link {
                url,
                text: link_text(&element, tag),
                tag,
                found_on: page_url.to_string(),
            });
        }

        tracing::debug!(page_url, count = page.links.len(), skipped = page.skipped, "extracted links");
        page
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// Visible text for navigational tags, alt text for resources
fn link_text(element: &ElementRef<'_>, tag: SourceTag) -> String {
    match tag.kind() {
        LinkKind::Navigational => {
            let text: String = element.text().map(str::trim).collect();
            text.chars().take(MAX_TEXT_CHARS).collect()
        }
        LinkKind::Resource => element.value().attr("alt").unwrap_or_default().to_string(),
    }
}

// mailto:, tel:, javascript: and data: references can't be checked over HTTP
fn is_checkable_link(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
