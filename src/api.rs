//! Synchronous fetcher for the **countries dataset**.
//!
//! One GET to the configured endpoint returns a JSON array of country objects.
//! Transient failures (connection errors, timeouts, and the configured 5xx
//! statuses) are retried with exponential backoff; anything else fails at once.
//!
//! ### Notes
//! - The timeout applies to each attempt separately, never to the whole retry loop.
//! - Elements of the array that are not JSON objects are skipped with a warning.
//! - The HTTP layer sits behind [`Transport`] so the retry policy can be driven
//!   by scripted responses.
//!
//! Typical usage:
//! ```no_run
//! # use rcx_rs::{Client, FetchConfig};
//! let client = Client::new(FetchConfig::mirror())?;
//! let records = client.fetch()?;
//! let table = rcx_rs::normalize::normalize(&records);
//! # Ok::<(), rcx_rs::FetchError>(())
//! ```

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::models::RawRecord;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single GET attempt. Implementations report transport problems as
/// [`FetchError::Connection`] or [`FetchError::Timeout`].
pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Production transport backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: HttpClient,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .timeout(timeout) // per request, so per attempt
            .connect_timeout(timeout)
            .redirect(Policy::limited(5))
            .user_agent(concat!("rcx_rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Connection(format!("could not build HTTP client: {e}")))?;
        Ok(Self { http, timeout })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                after: self.timeout,
            }
        } else {
            FetchError::Connection(error_chain(&err))
        }
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let resp = self.http.get(url).send().map_err(|e| self.classify(e))?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Ok(HttpResponse {
                status,
                body: Vec::new(),
            });
        }
        // A transfer cut short surfaces here, after the status line arrived.
        let body = resp.bytes().map_err(|e| self.classify(e))?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// reqwest hides the root cause behind "error sending request"; keep the whole chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

/// Result of [`Client::fetch_or_empty`]: `records` is empty whenever `error` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub records: Vec<RawRecord>,
    pub error: Option<FetchError>,
}

/// Fetcher bound to one configuration.
#[derive(Debug, Clone)]
pub struct Client<T: Transport = ReqwestTransport> {
    pub config: FetchConfig,
    transport: T,
}

impl Client<ReqwestTransport> {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: FetchConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the raw record list.
    ///
    /// ### Errors
    /// - [`FetchError::Connection`] / [`FetchError::Timeout`] once the retry budget is spent
    /// - [`FetchError::HttpStatus`] for non-retryable or retry-exhausted statuses
    /// - [`FetchError::Decode`] when the body is not a JSON array
    /// - [`FetchError::EmptyResult`] when the array holds no records
    pub fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> {
        let url = self.config.source.url();
        let body = self.get_with_retry(&url)?;
        let records = decode_records(&body)?;
        if records.is_empty() {
            log::error!("GET {url} returned no records");
            return Err(FetchError::EmptyResult);
        }
        log::info!("fetched {} records from {url}", records.len());
        Ok(records)
    }

    /// Like [`Client::fetch`], but never yields partial data alongside an error.
    pub fn fetch_or_empty(&self) -> FetchOutcome {
        match self.fetch() {
            Ok(records) => FetchOutcome {
                records,
                error: None,
            },
            Err(err) => FetchOutcome {
                records: Vec::new(),
                error: Some(err),
            },
        }
    }

    fn get_with_retry(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0u32;
        loop {
            let failure = match self.transport.get(url) {
                Ok(resp) if resp.is_success() => return Ok(resp.body),
                Ok(resp) if self.config.is_retryable(resp.status) => FetchError::HttpStatus {
                    status: resp.status,
                    attempts: attempt + 1,
                },
                Ok(resp) => {
                    log::error!("GET {url} failed with HTTP {}", resp.status);
                    return Err(FetchError::HttpStatus {
                        status: resp.status,
                        attempts: attempt + 1,
                    });
                }
                Err(err) if err.is_transient() => err,
                Err(err) => return Err(err),
            };

            if attempt >= max_retries {
                log::error!("GET {url} gave up after {} attempt(s): {failure}", attempt + 1);
                return Err(failure);
            }
            let delay = self.config.backoff_for(attempt);
            log::warn!(
                "GET {url} attempt {}/{} failed ({failure}); retrying in {delay:?}",
                attempt + 1,
                max_retries + 1
            );
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            attempt += 1;
        }
    }
}

/// Parse a response body into records, skipping non-object elements.
pub fn decode_records(body: &[u8]) -> Result<Vec<RawRecord>, FetchError> {
    let v: Value = serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    let Value::Array(items) = v else {
        return Err(FetchError::Decode(
            "unexpected response shape: not a top-level array".into(),
        ));
    };
    let total = items.len();
    let records: Vec<RawRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    if records.len() < total {
        log::warn!("skipped {} non-object element(s) in response", total - records.len());
    }
    Ok(records)
}
