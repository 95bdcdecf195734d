// src/report.rs
// =============================================================================
// Turns crawl and verification results into something a person can read.
//
// The crawler keeps one Link per occurrence and the verifier keeps one
// outcome per distinct address. Joining the two gives, for each broken
// address, the set of pages it was found on.
//
// Two output formats:
// - Markdown (default): summary, scan parameters, broken link details
// - JSON (--json): the same data, serialized with serde_json
// =============================================================================

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::checker::{CheckOutcome, Link, LinkKind};
use crate::config::ScanParams;
use crate::scan::ScanOutput;

/// How many "found on" pages are listed before summarizing the rest
const MAX_FOUND_ON_SHOWN: usize = 5;

#[derive(Debug, Serialize)]
pub struct BrokenLink {
    #[serde(flatten)]
    pub outcome: CheckOutcome,
    /// Distinct pages referencing this address, in discovery order
    pub found_on: Vec<String>,
    /// Raw number of references, duplicates included
    pub appearances: usize,
}

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub base_url: String,
    pub params: ScanParams,
    pub total_unique: usize,
    pub broken_count: usize,
    pub success_rate: f64,
    pub pages_visited: usize,
    pub pages_failed: usize,
    pub navigational_refs: usize,
    pub resource_refs: usize,
    pub skipped_refs: usize,
    pub broken: Vec<BrokenLink>,
    pub links: Vec<Link>,
    pub results: Vec<CheckOutcome>,
}

impl ScanReport {
    pub fn assemble(base_url: &str, params: ScanParams, output: ScanOutput) -> Self {
        let ScanOutput {
            links,
            outcomes,
            pages_visited,
            pages_failed,
            skipped_refs,
        } = output;

        let sources = sources_by_target(&links);
        let broken: Vec<BrokenLink> = outcomes
            .values()
            .filter(|outcome| !outcome.reachable)
            .map(|outcome| {
                let (found_on, appearances) = sources
                    .get(outcome.url.as_str())
                    .cloned()
                    .unwrap_or_default();
                BrokenLink {
                    outcome: outcome.clone(),
                    found_on,
                    appearances,
                }
            })
            .collect();

        let total_unique = outcomes.len();
        let broken_count = broken.len();
        let navigational_refs = links
            .iter()
            .filter(|l| l.kind() == LinkKind::Navigational)
            .count();

        Self {
            base_url: base_url.to_string(),
            params,
            total_unique,
            broken_count,
            success_rate: success_rate(total_unique, broken_count),
            pages_visited,
            pages_failed,
            navigational_refs,
            resource_refs: links.len() - navigational_refs,
            skipped_refs,
            broken,
            links,
            results: outcomes.into_values().collect(),
        }
    }

    pub fn has_broken(&self) -> bool {
        self.broken_count > 0
    }
}

// target -> (distinct found_on pages, raw appearance count)
fn sources_by_target(links: &[Link]) -> HashMap<&str, (Vec<String>, usize)> {
    let mut sources: HashMap<&str, (Vec<String>, usize)> = HashMap::new();
    for link in links {
        let (pages, appearances) = sources.entry(link.url.as_str()).or_default();
        *appearances += 1;
        if !pages.contains(&link.found_on) {
            pages.push(link.found_on.clone());
        }
    }
    sources
}

// An empty scan has nothing broken
fn success_rate(total: usize, broken: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        (total - broken) as f64 / total as f64 * 100.0
    }
}

fn status_text(outcome: &CheckOutcome) -> String {
    match outcome.status {
        Some(code) => code.to_string(),
        None => "No response".to_string(),
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Broken Link Report for {}", self.base_url)?;
        writeln!(f)?;
        writeln!(f, "## Summary")?;
        writeln!(f, "- **Total unique links found**: {}", self.total_unique)?;
        writeln!(f, "- **Broken links**: {}", self.broken_count)?;
        writeln!(f, "- **Success rate**: {:.1}%", self.success_rate)?;
        writeln!(
            f,
            "- **Pages crawled**: {} ({} without content)",
            self.pages_visited, self.pages_failed
        )?;
        writeln!(
            f,
            "- **References**: {} navigational, {} resource ({} non-HTTP skipped)",
            self.navigational_refs, self.resource_refs, self.skipped_refs
        )?;
        writeln!(f)?;
        writeln!(f, "## Scan Parameters")?;
        writeln!(f, "- Max depth: {}", self.params.max_depth)?;
        writeln!(f, "- Include external links: {}", self.params.include_external)?;
        writeln!(f, "- Timeout: {}s", self.params.timeout.as_secs())?;
        writeln!(f)?;
        writeln!(f, "## Broken Links Details")?;

        if self.broken.is_empty() {
            writeln!(f)?;
            return writeln!(f, "🎉 No broken links found!");
        }

        for broken in &self.broken {
            let outcome = &broken.outcome;
            writeln!(f)?;
            writeln!(f, "### ❌ {}", outcome.url)?;
            writeln!(f, "- **Status**: {}", status_text(outcome))?;
            match &outcome.error {
                Some(error) => writeln!(f, "- **Error**: {error}")?,
                None => writeln!(f, "- **Error**: HTTP error")?,
            }

            if !broken.found_on.is_empty() {
                writeln!(f, "- **Found on pages**:")?;
                for page in broken.found_on.iter().take(MAX_FOUND_ON_SHOWN) {
                    writeln!(f, "  - {page}")?;
                }
                if broken.found_on.len() > MAX_FOUND_ON_SHOWN {
                    writeln!(
                        f,
                        "  - ... and {} more pages",
                        broken.found_on.len() - MAX_FOUND_ON_SHOWN
                    )?;
                }
            }
        }
        Ok(())
    }
}

// Report for `check`: one entry per distinct address, in the order given
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct CheckReport {
    pub results: Vec<CheckOutcome>,
}

impl CheckReport {
    pub fn new(urls: &[String], mut outcomes: BTreeMap<String, CheckOutcome>) -> Self {
        // Removing as we go drops repeated addresses
        let results = urls.iter().filter_map(|url| outcomes.remove(url)).collect();
        Self { results }
    }

    pub fn has_broken(&self) -> bool {
        self.results.iter().any(|r| !r.reachable)
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Link Status Check Results")?;

        for result in &self.results {
            let emoji = if result.reachable { "✅" } else { "❌" };
            writeln!(f)?;
            writeln!(f, "{emoji} **{}**", result.url)?;
            writeln!(f, "   - Status: {}", status_text(result))?;
            if let Some(error) = &result.error {
                writeln!(f, "   - Error: {error}")?;
            }
            if let (true, Some(target)) = (result.was_redirected(), &result.final_url) {
                writeln!(f, "   - Redirected to: {target}")?;
            }
        }
        Ok(())
    }
}
