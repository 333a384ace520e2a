/// Blocking HTTP client for remote tag corpora.
///
/// This module provides `CorpusClient` for fetching a tags payload over HTTP,
/// along with its error type, a builder, and the `TagsFetcher` seam used to
/// substitute a mock in tests.
use std::thread;
use std::time::Duration;

use thiserror::Error;

/// Default request timeout. Expiry is reported as `FetchError::Timeout`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur while fetching a remote corpus.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request did not complete within the timeout
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// The tags location is not a usable URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}

/// Fetches the raw text of a tags payload.
///
/// This trait enables mocking in unit tests and keeps the corpus loader
/// independent of the HTTP transport.
pub trait TagsFetcher: Send + Sync {
    /// Returns the body found at `url`.
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Builder for constructing `CorpusClient` instances.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use jtag::corpus::CorpusClientBuilder;
///
/// let client = CorpusClientBuilder::new()
///     .timeout(Duration::from_secs(5))
///     .build()
///     .expect("Failed to create client");
/// ```
#[derive(Debug, Default)]
pub struct CorpusClientBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry_delays: Option<Vec<Duration>>,
}

impl CorpusClientBuilder {
    /// Creates a new `CorpusClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the delays between retries of transient failures.
    ///
    /// An empty list disables retries. Timeouts are never retried, so a
    /// single unresponsive host costs at most one request timeout.
    pub fn retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = Some(delays);
        self
    }

    /// Builds the `CorpusClient` with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the underlying HTTP client cannot be
    /// created.
    pub fn build(self) -> Result<CorpusClient, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
            .build()
            .map_err(FetchError::Network)?;

        Ok(CorpusClient {
            client,
            retry_delays: self.retry_delays.unwrap_or_else(default_retry_delays),
        })
    }
}

/// Synchronous HTTP client for tag corpora.
///
/// It should be constructed using `CorpusClientBuilder`.
pub struct CorpusClient {
    client: reqwest::blocking::Client,
    retry_delays: Vec<Duration>,
}

impl CorpusClient {
    fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        response.text().map_err(FetchError::from_reqwest)
    }
}

impl TagsFetcher for CorpusClient {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = normalize_url(url)?;
        tracing::debug!(%url, "Fetching remote tags");
        retry_with_backoff(&self.retry_delays, || self.fetch_once(&url))
    }
}

/// Turns a configured tags location into a fetchable URL.
///
/// Locations without a scheme are fetched over plain HTTP.
///
/// # Errors
///
/// Returns `FetchError::InvalidUrl` if the result does not parse as a URL.
pub fn normalize_url(location: &str) -> Result<String, FetchError> {
    let location = location.trim();
    let url = if location.starts_with("http://") || location.starts_with("https://") {
        location.to_string()
    } else {
        format!("http://{location}")
    };

    reqwest::Url::parse(&url).map_err(|e| FetchError::InvalidUrl(format!("{location}: {e}")))?;
    Ok(url)
}

fn default_retry_delays() -> Vec<Duration> {
    [1, 2, 4].into_iter().map(Duration::from_secs).collect()
}

/// Retries an operation with the given delays between attempts.
///
/// Only connection failures and HTTP 5xx responses are retried. A timeout is
/// returned at once. The last error is returned once the delays are exhausted.
pub fn retry_with_backoff<F, T>(delays: &[Duration], mut f: F) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut last_error = match f() {
        Ok(result) => return Ok(result),
        Err(e) if !should_retry(&e) => return Err(e),
        Err(e) => e,
    };

    for &delay in delays {
        thread::sleep(delay);

        match f() {
            Ok(result) => return Ok(result),
            Err(e) if !should_retry(&e) => return Err(e),
            Err(e) => {
                tracing::debug!("Retrying tags fetch after error: {e}");
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// Returns `true` for transient errors worth another attempt.
fn should_retry(error: &FetchError) -> bool {
    match error {
        FetchError::Network(_) => true,
        FetchError::Timeout(_) => false,
        FetchError::Http { status } => (500..600).contains(status),
        FetchError::InvalidUrl(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::net::TcpListener;
    use std::time::Instant;

    fn network_error() -> FetchError {
        FetchError::Network(
            reqwest::blocking::Client::new()
                .get("not-a-valid-url")
                .build()
                .unwrap_err(),
        )
    }

    const NO_DELAY: [Duration; 3] = [Duration::ZERO; 3];

    #[test]
    fn http_error_variant_with_status_code() {
        let error = FetchError::Http { status: 404 };

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("HTTP error"));
        assert!(error_msg.contains("404"));
    }

    #[test]
    fn normalize_url_adds_http_scheme() {
        assert_eq!(
            normalize_url("brettterpstra.com/data/tags.json").unwrap(),
            "http://brettterpstra.com/data/tags.json"
        );
        assert_eq!(
            normalize_url("https://example.com/tags.json").unwrap(),
            "https://example.com/tags.json"
        );
    }

    #[test]
    fn normalize_url_rejects_garbage() {
        assert!(matches!(
            normalize_url("http://exa mple.com/tags"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn builder_creates_client_with_defaults() {
        let client = CorpusClientBuilder::new().build();
        assert!(client.is_ok());
        assert_eq!(client.unwrap().retry_delays, default_retry_delays());
    }

    #[test]
    fn retry_succeeds_after_transient_network_error() {
        let attempts = Cell::new(0);

        let result = retry_with_backoff(&NO_DELAY, || {
            attempts.set(attempts.get() + 1);
            if attempts.get() < 2 {
                Err(network_error())
            } else {
                Ok("success")
            }
        });

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn retry_stops_after_all_delays() {
        let attempts = Cell::new(0);

        let result: Result<&str, FetchError> = retry_with_backoff(&NO_DELAY, || {
            attempts.set(attempts.get() + 1);
            Err(network_error())
        });

        assert!(result.is_err());
        // Initial attempt + 3 retries
        assert_eq!(attempts.get(), 4);
    }

    #[test]
    fn retry_does_not_occur_on_http_4xx_errors() {
        let attempts = Cell::new(0);

        let result: Result<&str, FetchError> = retry_with_backoff(&NO_DELAY, || {
            attempts.set(attempts.get() + 1);
            Err(FetchError::Http { status: 404 })
        });

        assert!(matches!(result, Err(FetchError::Http { status: 404 })));
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn timeouts_are_returned_without_retrying() {
        // The listener accepts connections but never answers
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/tags.json", listener.local_addr().unwrap());
        let client = CorpusClientBuilder::new()
            .timeout(Duration::from_millis(200))
            .retry_delays(vec![Duration::from_secs(2); 3])
            .build()
            .unwrap();

        let started = Instant::now();
        let result = client.fetch(&url);

        assert!(matches!(result, Err(FetchError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn retry_occurs_on_http_5xx_errors() {
        let attempts = Cell::new(0);

        let result = retry_with_backoff(&NO_DELAY, || {
            attempts.set(attempts.get() + 1);
            if attempts.get() < 2 {
                Err(FetchError::Http { status: 503 })
            } else {
                Ok("success")
            }
        });

        assert!(result.is_ok());
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn empty_delays_disable_retries() {
        let attempts = Cell::new(0);

        let _: Result<(), FetchError> = retry_with_backoff(&[], || {
            attempts.set(attempts.get() + 1);
            Err(network_error())
        });

        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn trait_can_be_implemented_by_mock_struct() {
        struct MockFetcher {
            body: String,
        }

        impl TagsFetcher for MockFetcher {
            fn fetch(&self, _url: &str) -> Result<String, FetchError> {
                Ok(self.body.clone())
            }
        }

        let mock = MockFetcher {
            body: r#"{"tags": ["mac"]}"#.to_string(),
        };
        let fetcher: &dyn TagsFetcher = &mock;
        assert_eq!(fetcher.fetch("example.com/tags.json").unwrap(), r#"{"tags": ["mac"]}"#);
    }
}
