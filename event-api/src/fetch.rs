use crate::config::Upstream;
use crate::retry::{RetryError, attempt};
use crate::types::EventRecord;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

/// How a single fetch attempt failed. Every variant is retryable; the
/// distinction only matters for diagnostics.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(StatusCode),
    #[error("could not parse upstream response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("upstream returned no events")]
    Empty,
}

/// Terminal "no data" outcome once the attempt budget is spent. Callers
/// cannot observe which failure mode exhausted the budget.
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("no event data after {attempts} attempts")]
pub struct FetchExhausted {
    pub attempts: u32,
}

/// Receives every non-terminal attempt failure. Observational only; never
/// affects whether another attempt runs.
pub trait FetchObserver: Send + Sync {
    fn attempt_failed(&self, attempt: u32, error: &FetchError);
}

/// Default observer backed by tracing.
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn attempt_failed(&self, attempt: u32, error: &FetchError) {
        tracing::warn!(attempt, %error, "event fetch attempt failed, retrying");
    }
}

/// Retrieves the event collection from the upstream API.
///
/// Holds the process-wide `reqwest::Client`; reqwest clients are
/// internally reference-counted and safe to share across concurrent
/// requests, so one fetcher serves the whole process.
pub struct EventFetcher {
    client: reqwest::Client,
    url: String,
    max_attempts: u32,
    observer: Arc<dyn FetchObserver>,
}

impl EventFetcher {
    pub fn new(
        upstream: &Upstream,
        observer: Arc<dyn FetchObserver>,
    ) -> Result<Self, reqwest::Error> {
        // Explicit per-attempt deadline instead of the transport default.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(upstream.request_timeout_secs))
            .build()?;

        Ok(EventFetcher {
            client,
            url: upstream.url.clone(),
            max_attempts: upstream.max_attempts,
            observer,
        })
    }

    /// Fetches the collection, retrying up to the attempt budget. Attempts
    /// are strictly sequential with no delay between them; the first
    /// non-empty parse wins.
    pub async fn fetch(&self) -> Result<Vec<EventRecord>, FetchExhausted> {
        let result = attempt(
            self.max_attempts,
            || self.fetch_once(),
            |_: &FetchError| true,
            |attempt_no, error| self.observer.attempt_failed(attempt_no, error),
        )
        .await;

        result.map_err(|err| {
            let last = match err {
                RetryError::Fatal(e) | RetryError::Exhausted(e) => e,
            };
            tracing::error!(%last, attempts = self.max_attempts, "all event fetch attempts failed");
            FetchExhausted {
                attempts: self.max_attempts,
            }
        })
    }

    async fn fetch_once(&self) -> Result<Vec<EventRecord>, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().await?;
        let events: Vec<EventRecord> = serde_json::from_str(&body)?;

        // An empty collection is indistinguishable from a transient
        // upstream hiccup, so it counts as a failed attempt.
        if events.is_empty() {
            return Err(FetchError::Empty);
        }

        Ok(events)
    }
}
