//! Reachability checks for external links.

use super::pacing::PacingGate;
use crate::sampling::{Estimate, SampleSpec};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Result of probing a single link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Reachable,
    Broken,
    TimedOut,
}

impl LinkStatus {
    /// Timeouts count as broken in aggregates.
    pub fn is_broken(&self) -> bool {
        !matches!(self, LinkStatus::Reachable)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Reachable => write!(f, "reachable"),
            LinkStatus::Broken => write!(f, "broken"),
            LinkStatus::TimedOut => write!(f, "timed out"),
        }
    }
}

/// One performed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalCheckOutcome {
    pub uri: String,
    pub status: LinkStatus,
    pub checked_at: DateTime<Utc>,
}

/// Anything that can tell whether a URI resolves.
///
/// Implementations must not fail: every problem maps to a [`LinkStatus`].
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn probe(&self, uri: &str) -> LinkStatus;
}

/// HTTP prober: HEAD first, GET when the server refuses HEAD.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    fn classify(result: Result<reqwest::Response, reqwest::Error>, uri: &str) -> LinkStatus {
        match result {
            Ok(response) if response.status().is_success() || response.status().is_redirection() => {
                LinkStatus::Reachable
            }
            Ok(response) => {
                debug!("{} answered {}", uri, response.status());
                LinkStatus::Broken
            }
            Err(e) if e.is_timeout() => {
                debug!("{} timed out", uri);
                LinkStatus::TimedOut
            }
            Err(e) => {
                debug!("{} unreachable: {}", uri, e);
                LinkStatus::Broken
            }
        }
    }
}

#[async_trait]
impl LinkProbe for HttpProbe {
    async fn probe(&self, uri: &str) -> LinkStatus {
        let head = self.client.head(uri).send().await;

        let refused_head = matches!(
            &head,
            Ok(response) if matches!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
            )
        );
        if refused_head {
            return Self::classify(self.client.get(uri).send().await, uri);
        }

        Self::classify(head, uri)
    }
}

/// Aggregate of a batch of link checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkReport {
    pub outcomes: Vec<ExternalCheckOutcome>,
    pub reachable: usize,
    pub broken: usize,
    pub total_checked: usize,
    /// Broken links projected to the whole population.
    pub estimate: Estimate,
}

impl LinkReport {
    pub fn broken_uris(&self) -> impl Iterator<Item = &ExternalCheckOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_broken())
    }
}

/// Verifies links through a shared [`PacingGate`].
pub struct LinkChecker {
    probe: Arc<dyn LinkProbe>,
    gate: Arc<PacingGate>,
    concurrency: usize,
}

impl LinkChecker {
    pub fn new(probe: Arc<dyn LinkProbe>, gate: Arc<PacingGate>, concurrency: usize) -> Self {
        Self {
            probe,
            gate,
            concurrency: concurrency.max(1),
        }
    }

    pub fn gate(&self) -> &Arc<PacingGate> {
        &self.gate
    }

    /// Probe every URI; outcomes are returned in input order.
    ///
    /// Up to `concurrency` probes are in flight, but each one first waits for
    /// its turn at the gate, so request starts stay spaced by the delay.
    pub async fn check_all(&self, uris: &[String]) -> Vec<ExternalCheckOutcome> {
        let checks: Vec<_> = uris
            .iter()
            .cloned()
            .map(|uri| {
                let gate = Arc::clone(&self.gate);
                let probe = Arc::clone(&self.probe);
                async move {
                    gate.wait_turn().await;
                    let checked_at = Utc::now();
                    let status = probe.probe(&uri).await;
                    ExternalCheckOutcome {
                        uri,
                        status,
                        checked_at,
                    }
                }
            })
            .collect();

        stream::iter(checks)
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Check `uris` (already a sample per `spec` when sampling is on) and
    /// extrapolate the broken count to `spec.population()`.
    pub async fn verify(&self, uris: &[String], spec: &SampleSpec) -> LinkReport {
        info!(
            "Checking {} of {} external links ({:?} apart)",
            uris.len(),
            spec.population(),
            self.gate.delay()
        );

        let outcomes = self.check_all(uris).await;
        let broken = outcomes.iter().filter(|o| o.status.is_broken()).count();
        let reachable = outcomes.len() - broken;

        LinkReport {
            reachable,
            broken,
            total_checked: outcomes.len(),
            estimate: spec.extrapolate(broken as u64),
            outcomes,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Probe that sleeps and answers from a fixed set of broken URIs.
    pub(crate) struct FakeProbe {
        pub latency: Duration,
        pub broken: HashSet<String>,
        pub timed_out: HashSet<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeProbe {
        pub(crate) fn new(latency: Duration) -> Self {
            Self {
                latency,
                broken: HashSet::new(),
                timed_out: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn with_broken(mut self, uris: &[&str]) -> Self {
            self.broken = uris.iter().map(|u| u.to_string()).collect();
            self
        }
    }

    #[async_trait]
    impl LinkProbe for FakeProbe {
        async fn probe(&self, uri: &str) -> LinkStatus {
            self.calls.lock().unwrap().push(uri.to_string());
            tokio::time::sleep(self.latency).await;
            if self.timed_out.contains(uri) {
                LinkStatus::TimedOut
            } else if self.broken.contains(uri) {
                LinkStatus::Broken
            } else {
                LinkStatus::Reachable
            }
        }
    }

    fn uris(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("http://ex.org/{}", i)).collect()
    }

    fn checker(probe: FakeProbe, delay_ms: i64, concurrency: usize) -> (LinkChecker, Arc<FakeProbe>) {
        let probe = Arc::new(probe);
        let gate = Arc::new(PacingGate::new(delay_ms).unwrap());
        (LinkChecker::new(probe.clone(), gate, concurrency), probe)
    }

    #[tokio::test]
    async fn test_five_checks_take_four_delays() {
        let (checker, _) = checker(FakeProbe::new(Duration::ZERO), 100, 1);
        let start = Instant::now();
        let outcomes = checker.check_all(&uris(5)).await;
        assert_eq!(outcomes.len(), 5);
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_concurrent_checks_still_paced() {
        let (checker, _) = checker(FakeProbe::new(Duration::from_millis(5)), 100, 5);
        let start = Instant::now();
        checker.check_all(&uris(5)).await;
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_sequence() {
        let mut probe = FakeProbe::new(Duration::ZERO).with_broken(&["http://ex.org/1"]);
        probe.timed_out.insert("http://ex.org/3".to_string());
        let (checker, probe) = checker(probe, 0, 2);

        let links = uris(5);
        let report = checker.verify(&links, &SampleSpec::exhaustive(links.len())).await;

        assert_eq!(probe.calls.lock().unwrap().len(), 5);
        assert_eq!(report.total_checked, 5);
        assert_eq!(report.broken, 2);
        assert_eq!(report.reachable, 3);
        assert_eq!(report.estimate.value, 2);
        assert_eq!(report.outcomes[3].status, LinkStatus::TimedOut);
        let broken: Vec<_> = report.broken_uris().map(|o| o.uri.as_str()).collect();
        assert_eq!(broken, vec!["http://ex.org/1", "http://ex.org/3"]);
    }

    #[tokio::test]
    async fn test_sampled_report_is_extrapolated() {
        let probe = FakeProbe::new(Duration::ZERO).with_broken(&["http://ex.org/0"]);
        let (checker, _) = checker(probe, 0, 1);

        let spec = SampleSpec::new(100, Some(10.0)).unwrap();
        let sample = uris(10);
        let report = checker.verify(&sample, &spec).await;
        assert_eq!(report.broken, 1);
        assert_eq!(report.estimate.value, 10);
        assert!(report.estimate.extrapolated);
    }
}
