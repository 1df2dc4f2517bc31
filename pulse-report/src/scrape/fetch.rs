//! Page fetching with bounded timeouts and declarative retry.
//!
//! Every page load is a bounded blocking I/O operation: the HTTP client
//! carries an explicit timeout and the connection is released on every
//! exit path. Retries around a whole single-source scrape are expressed
//! as a [`RetryPolicy`] (max attempts, fixed backoff) instead of ad hoc
//! sleep loops.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ScrapeError;

/// Desktop user agent; several of the scraped sites serve stripped-down
/// markup to unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// ============================================================================
// Page fetcher
// ============================================================================

/// Fetches one page body. The trait seam lets tests substitute canned
/// HTML for live sources.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url`, labelling any error with `source`.
    async fn fetch_page(&self, source: &str, url: &str) -> Result<String, ScrapeError>;
}

/// HTTP page fetcher with a bounded per-request timeout.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    /// Create a fetcher with the given page-load timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, source: &str, url: &str) -> Result<String, ScrapeError> {
        debug!(source, url, "Fetching page");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ScrapeError::Timeout {
                    source: source.to_string(),
                }
            } else {
                ScrapeError::Http {
                    source: source.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Http {
                source: source.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response.text().await.map_err(|e| ScrapeError::Parse {
            source: source.to_string(),
            message: e.to_string(),
        })
    }
}

// ============================================================================
// Retry policy
// ============================================================================

/// Bounded retry with a fixed backoff, applied uniformly around a whole
/// single-source scrape.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts (first try included)
    pub max_attempts: u32,
    /// Fixed sleep between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Run `op` until it succeeds or attempts are exhausted, sleeping the
    /// backoff between attempts. Returns the last error on exhaustion.
    pub async fn run<T, F, Fut>(&self, source: &str, mut op: F) -> Result<T, ScrapeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScrapeError>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if e.is_soft() {
                        warn!(source, attempt, max_attempts = self.max_attempts, error = %e, "Scrape yielded no rows");
                    } else {
                        warn!(source, attempt, max_attempts = self.max_attempts, error = %e, "Scrape attempt failed");
                    }
                    last_error = Some(e);

                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ScrapeError::Empty {
            source: source.to_string(),
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_second_attempt() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(2)
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(ScrapeError::Empty {
                            source: "test".into(),
                        })
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_stops_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy(3)
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ScrapeError::Timeout {
                        source: "test".into(),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(ScrapeError::Timeout { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_no_extra_attempt_after_success() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(3)
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("rows") }
            })
            .await;

        assert_eq!(result.unwrap(), "rows");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_http_fetcher_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpPageFetcher::new(Duration::from_secs(5));
        let body = fetcher.fetch_page("test", &server.uri()).await.unwrap();
        assert!(body.contains("ok"));
    }

    #[tokio::test]
    async fn test_http_fetcher_maps_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpPageFetcher::new(Duration::from_secs(5));
        let err = fetcher.fetch_page("test", &server.uri()).await.unwrap_err();
        match err {
            ScrapeError::Http { source, message } => {
                assert_eq!(source, "test");
                assert!(message.contains("503"));
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }
}
