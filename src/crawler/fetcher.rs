//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building one shared client with the configured user agent and timeouts
//! - Accepting invalid or self-signed TLS certificates
//! - Issuing a single GET per visit, with no retries
//! - Reducing every outcome to "got a body" or "did not"

use crate::config::HttpConfig;
use reqwest::{redirect::Policy, Client, StatusCode};

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// The server answered 200 OK and the whole body was read
    Fetched {
        /// Raw response body
        body: Vec<u8>,
    },

    /// Anything else: transport error, timeout, or a non-200 status
    Failed {
        /// Human-readable cause, for logs only
        reason: String,
    },
}

impl FetchOutcome {
    /// Returns true if the fetch produced a body
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }
}

/// Builds an HTTP client with the crawler's configuration
///
/// Certificate validation is disabled: pages across the open web are served with
/// self-signed and misconfigured certificates, and the mirror still wants them.
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests for the crawl engine
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Fetches a URL once
    ///
    /// # Outcome Rules
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | HTTP 200 (after redirects) | Fetched |
    /// | Any other status, including other 2xx | Failed |
    /// | Connect error, timeout, TLS failure | Failed |
    /// | Body read error | Failed |
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let reason = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    format!("Connection failed: {}", e)
                } else {
                    e.to_string()
                };
                return FetchOutcome::Failed { reason };
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            return FetchOutcome::Failed {
                reason: format!("HTTP {}", status.as_u16()),
            };
        }

        match response.bytes().await {
            Ok(body) => FetchOutcome::Fetched {
                body: body.to_vec(),
            },
            Err(e) => FetchOutcome::Failed {
                reason: format!("Failed to read body: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher() -> Fetcher {
        Fetcher::new(&HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = test_fetcher()
            .fetch(&format!("{}/page", server.uri()))
            .await;

        match outcome {
            FetchOutcome::Fetched { body } => assert_eq!(body, b"hello"),
            other => panic!("expected a body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_only_200_counts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/created"))
            .respond_with(ResponseTemplate::new(201).set_body_string("made"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = test_fetcher();
        let created = fetcher.fetch(&format!("{}/created", server.uri())).await;
        let missing = fetcher.fetch(&format!("{}/missing", server.uri())).await;

        assert!(!created.is_fetched());
        assert!(!missing.is_fetched());
        match missing {
            FetchOutcome::Failed { reason } => assert_eq!(reason, "HTTP 404"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = test_fetcher().fetch(&format!("{}/", server.uri())).await;
        assert!(!outcome.is_fetched());
    }

    #[tokio::test]
    async fn test_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", "/new"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let outcome = test_fetcher().fetch(&format!("{}/old", server.uri())).await;
        assert!(outcome.is_fetched());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Nothing listens on the discard port in the test environment
        let outcome = test_fetcher().fetch("http://127.0.0.1:9/").await;
        assert!(!outcome.is_fetched());
    }

    #[tokio::test]
    async fn test_unsupported_scheme_fails() {
        let outcome = test_fetcher().fetch("mailto:someone@example.com").await;
        assert!(!outcome.is_fetched());
    }
}
