// src/checker/verify.rs
// =============================================================================
// Checks a batch of addresses for reachability.
//
// Addresses are deduplicated, then checked in waves: at most
// `concurrency_limit` existence checks run at once, and a wave has to finish
// completely before the next one starts. This caps the number of open
// connections against the target site. A slow link holds up its wave.
//
// Every check resolves to a CheckOutcome on its own, so one failing address
// never takes its siblings down with it.
// =============================================================================

use futures::future::join_all;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use super::http::{CheckOutcome, Fetcher};

/// Checks every distinct address in `urls`, returning one outcome per address.
pub async fn verify<I, S>(
    fetcher: &Fetcher,
    urls: I,
    concurrency_limit: usize,
    timeout: Duration,
) -> BTreeMap<String, CheckOutcome>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let distinct = distinct_urls(urls);
    let wave_size = concurrency_limit.max(1);
    let mut outcomes = BTreeMap::new();

    for (wave_number, wave) in distinct.chunks(wave_size).enumerate() {
        tracing::info!(wave = wave_number + 1, size = wave.len(), "checking wave");

        let results = join_all(wave.iter().map(|url| fetcher.check(url, timeout))).await;
        for outcome in results {
            outcomes.insert(outcome.url.clone(), outcome);
        }
    }

    let broken = outcomes.values().filter(|o| !o.reachable).count();
    tracing::info!(checked = outcomes.len(), broken, "verification finished");
    outcomes
}

// Exact string equality, first occurrence wins
fn distinct_urls<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .map(Into::into)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does join_all do?
//    - Takes many futures and drives them all at once on the current task
//    - Resolves when every one of them has finished
//    - No tokio::spawn needed: the checks only wait on the network
//
// 2. Why waves and not buffer_unordered?
//    - buffer_unordered starts a new check as soon as one finishes
//    - Waves start the next batch only after the whole batch is done
//    - Simpler to reason about: never more than N requests against the site
//
// 3. Why BTreeMap?
//    - Outcomes come back keyed by URL and sorted, so reports are stable
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::FetchError;
    use crate::config::CheckerConfig;
    use std::time::Instant;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn fetcher() -> Fetcher {
        Fetcher::new(&CheckerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_input_gives_empty_map() {
        let outcomes = verify(&fetcher(), Vec::<String>::new(), 10, TIMEOUT).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_are_checked_once() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/same"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/same", server.uri());
        let outcomes = verify(&fetcher(), vec![url.clone(), url.clone(), url.clone()], 10, TIMEOUT).await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[&url].reachable);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let ok = format!("{}/ok", server.uri());
        let gone = format!("{}/gone", server.uri());
        let refused = "http://127.0.0.1:1/".to_string();
        let malformed = "::not-a-url::".to_string();

        let outcomes = verify(
            &fetcher(),
            vec![ok.clone(), refused.clone(), gone.clone(), malformed.clone()],
            10,
            TIMEOUT,
        )
        .await;

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[&ok].reachable);

        assert!(!outcomes[&gone].reachable);
        assert_eq!(outcomes[&gone].status, Some(410));
        assert!(outcomes[&gone].error.is_none());

        assert!(!outcomes[&refused].reachable);
        assert!(outcomes[&refused].error.is_some());

        assert!(matches!(outcomes[&malformed].error, Some(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_waves_run_one_after_another() {
        let delay = Duration::from_millis(300);
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(delay))
            .mount(&server)
            .await;

        // 4 addresses with a limit of 2 means two full waves: checks inside a
        // wave overlap, the waves themselves do not
        let urls: Vec<String> = (0..4).map(|i| format!("{}/{i}", server.uri())).collect();
        let started = Instant::now();
        let outcomes = verify(&fetcher(), urls, 2, TIMEOUT).await;
        let elapsed = started.elapsed();

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.values().all(|o| o.reachable));
        assert!(elapsed >= delay * 2, "waves overlapped: {elapsed:?}");
        assert!(elapsed < delay * 3, "checks within a wave ran serially: {elapsed:?}");
    }

    #[tokio::test]
    async fn test_zero_limit_still_checks_everything() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let urls: Vec<String> = (0..3).map(|i| format!("{}/{i}", server.uri())).collect();
        let outcomes = verify(&fetcher(), urls, 0, TIMEOUT).await;
        assert_eq!(outcomes.len(), 3);
    }

    #[test]
    fn test_distinct_urls_uses_exact_strings() {
        let urls = distinct_urls([
            "https://a.test/x",
            "https://a.test/x/",
            "https://a.test/x#frag",
            "https://a.test/x",
        ]);
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[0], "https://a.test/x");
    }
}
