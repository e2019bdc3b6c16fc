//! Fetch configuration: endpoint choice and retry policy.

use std::collections::BTreeSet;
use std::time::Duration;

/// Live third-party countries API.
pub const LIVE_API_URL: &str = "https://restcountries.com/v3.1/all";
/// Static JSON mirror of the same dataset.
pub const STATIC_MIRROR_URL: &str =
    "https://raw.githubusercontent.com/jxnscv/Programacion/main/all.json";

/// Source fields requested from the live API (it rejects `/all` without a field list).
const LIVE_API_FIELDS: &str = "name,region,population,area,borders,languages,timezones";

/// Upper bound for `max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 5;
/// Per-attempt timeout used unless overridden.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Longest single wait between attempts.
pub const MAX_BACKOFF_SECS: u64 = 60;
/// Status codes that may be configured as retryable.
pub const RETRYABLE_CANDIDATES: [u16; 4] = [500, 502, 503, 504];

/// Where the raw records come from. All variants serve the same JSON shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    LiveApi,
    StaticMirror,
    Custom(String),
}

impl Source {
    pub fn url(&self) -> String {
        match self {
            Source::LiveApi => format!("{LIVE_API_URL}?fields={LIVE_API_FIELDS}"),
            Source::StaticMirror => STATIC_MIRROR_URL.to_string(),
            Source::Custom(url) => url.clone(),
        }
    }
}

/// Retry and timeout policy for the fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub source: Source,
    pub max_retries: u32,
    /// Seconds; the n-th retry waits `backoff_factor * 2^n`.
    pub backoff_factor: f64,
    pub timeout: Duration,
    pub retryable_statuses: BTreeSet<u16>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            source: Source::StaticMirror,
            max_retries: 3,
            backoff_factor: 0.5,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retryable_statuses: RETRYABLE_CANDIDATES.into_iter().collect(),
        }
    }
}

impl FetchConfig {
    pub fn live() -> Self {
        Self::default().with_source(Source::LiveApi)
    }

    pub fn mirror() -> Self {
        Self::default().with_source(Source::StaticMirror)
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    pub fn with_url(self, url: impl Into<String>) -> Self {
        self.with_source(Source::Custom(url.into()))
    }

    /// Values above [`MAX_RETRIES_LIMIT`] are clamped.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        if retries > MAX_RETRIES_LIMIT {
            log::warn!("max_retries {retries} exceeds {MAX_RETRIES_LIMIT}; clamping");
        }
        self.max_retries = retries.min(MAX_RETRIES_LIMIT);
        self
    }

    /// Negative or non-finite factors fall back to no delay.
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        if factor > MAX_BACKOFF_SECS as f64 {
            log::warn!("backoff factor {factor}s exceeds {MAX_BACKOFF_SECS}s; capping delays");
        }
        self.backoff_factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            0.0
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Only codes from [`RETRYABLE_CANDIDATES`] are kept.
    pub fn with_retryable_statuses(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_statuses = codes
            .into_iter()
            .filter(|code| {
                let ok = RETRYABLE_CANDIDATES.contains(code);
                if !ok {
                    log::warn!("ignoring non-retryable status {code} in retry policy");
                }
                ok
            })
            .collect();
        self
    }

    pub fn is_retryable(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Delay before the retry that follows failed attempt `attempt` (0-based).
    /// Never longer than [`MAX_BACKOFF_SECS`]; zero for a negative or NaN factor.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let secs = self.backoff_factor * 2f64.powi(attempt.min(16) as i32);
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        let cap = Duration::from_secs(MAX_BACKOFF_SECS);
        Duration::try_from_secs_f64(secs).map_or(cap, |d| d.min(cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let cfg = FetchConfig::default().with_backoff_factor(0.5);
        assert_eq!(cfg.backoff_for(0), Duration::from_millis(500));
        assert_eq!(cfg.backoff_for(1), Duration::from_secs(1));
        assert_eq!(cfg.backoff_for(3), Duration::from_secs(4));
    }

    #[test]
    fn backoff_is_capped_and_never_negative() {
        let huge = FetchConfig::default().with_backoff_factor(1e300);
        assert_eq!(huge.backoff_for(0), Duration::from_secs(MAX_BACKOFF_SECS));
        assert_eq!(huge.backoff_for(16), Duration::from_secs(MAX_BACKOFF_SECS));

        let mut raw = FetchConfig::default();
        raw.backoff_factor = -2.0;
        assert_eq!(raw.backoff_for(1), Duration::ZERO);
        raw.backoff_factor = f64::NAN;
        assert_eq!(raw.backoff_for(1), Duration::ZERO);
        raw.backoff_factor = f64::INFINITY;
        assert_eq!(raw.backoff_for(0), Duration::from_secs(MAX_BACKOFF_SECS));
    }

    #[test]
    fn retries_are_clamped_and_statuses_filtered() {
        let cfg = FetchConfig::default()
            .with_max_retries(9)
            .with_retryable_statuses([503, 404, 502]);
        assert_eq!(cfg.max_retries, MAX_RETRIES_LIMIT);
        assert!(cfg.is_retryable(503));
        assert!(cfg.is_retryable(502));
        assert!(!cfg.is_retryable(404));
        assert!(!cfg.is_retryable(500));
    }

    #[test]
    fn live_source_requests_field_list() {
        let url = Source::LiveApi.url();
        assert!(url.starts_with(LIVE_API_URL));
        assert!(url.contains("fields=name,region"));
        assert_eq!(Source::Custom("http://x/y.json".into()).url(), "http://x/y.json");
    }
}
