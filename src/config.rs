//! Form configuration
//!
//! [`FormConfig`] is plain data. It describes where the form talks to and how
//! its rules are tuned, but performs nothing itself.
//!
//! # Examples
//!
//! ```rust
//! use financing_form::FormConfig;
//! use std::time::Duration;
//!
//! let config = FormConfig::default()
//!     .with_submission_url("http://localhost:8080/api/requests")
//!     .with_outcome_ttl(Duration::from_millis(500));
//!
//! assert_eq!(config.outcome_ttl(), Duration::from_millis(500));
//! assert_eq!(config.min_lead_days(), 15);
//! ```

use std::time::Duration;

use serde::Deserialize;

/// Public country dataset, restricted to the two fields the form reads.
pub const DEFAULT_REFERENCE_URL: &str = "https://restcountries.com/v3.1/all?fields=name,currencies";

/// Endpoint receiving financing requests.
pub const DEFAULT_SUBMISSION_URL: &str = "http://test-noema-api.azurewebsites.net/api/requests";

/// How long a success or failure notification stays up.
pub const DEFAULT_OUTCOME_TTL: Duration = Duration::from_millis(3000);

/// Environment variable overriding [`FormConfig::reference_url`].
pub const ENV_REFERENCE_URL: &str = "FINANCING_FORM_REFERENCE_URL";
/// Environment variable overriding [`FormConfig::submission_url`].
pub const ENV_SUBMISSION_URL: &str = "FINANCING_FORM_SUBMISSION_URL";
/// Environment variable overriding [`FormConfig::outcome_ttl`], in milliseconds.
pub const ENV_OUTCOME_TTL_MS: &str = "FINANCING_FORM_OUTCOME_TTL_MS";

/// Endpoints, timeouts and rule parameters of a form session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    reference_url: String,
    submission_url: String,
    #[serde(with = "millis")]
    outcome_ttl: Duration,
    #[serde(with = "millis")]
    request_timeout: Duration,
    description_limit: usize,
    min_lead_days: u32,
    min_term_years: u32,
    max_term_years: u32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            reference_url: DEFAULT_REFERENCE_URL.to_string(),
            submission_url: DEFAULT_SUBMISSION_URL.to_string(),
            outcome_ttl: DEFAULT_OUTCOME_TTL,
            request_timeout: Duration::from_secs(10),
            description_limit: 150,
            min_lead_days: 15,
            min_term_years: 1,
            max_term_years: 3,
        }
    }
}

impl FormConfig {
    /// Defaults, overridden by any `FINANCING_FORM_*` environment variables.
    ///
    /// A TTL variable that is not a whole number of milliseconds is ignored
    /// and logged.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_REFERENCE_URL) {
            config.reference_url = url;
        }
        if let Ok(url) = std::env::var(ENV_SUBMISSION_URL) {
            config.submission_url = url;
        }
        if let Ok(raw) = std::env::var(ENV_OUTCOME_TTL_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.outcome_ttl = Duration::from_millis(ms),
                Err(_) => tracing::warn!(
                    variable = ENV_OUTCOME_TTL_MS,
                    value = %raw,
                    "ignoring non-numeric outcome TTL"
                ),
            }
        }
        config
    }

    /// Set the country dataset URL.
    pub fn with_reference_url(mut self, url: impl Into<String>) -> Self {
        self.reference_url = url.into();
        self
    }

    /// Set the submission endpoint URL.
    pub fn with_submission_url(mut self, url: impl Into<String>) -> Self {
        self.submission_url = url.into();
        self
    }

    /// Set how long outcomes stay visible.
    pub fn with_outcome_ttl(mut self, ttl: Duration) -> Self {
        self.outcome_ttl = ttl;
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the description character cap.
    pub fn with_description_limit(mut self, limit: usize) -> Self {
        self.description_limit = limit;
        self
    }

    /// Set the minimum number of days between today and the start date.
    pub fn with_min_lead_days(mut self, days: u32) -> Self {
        self.min_lead_days = days;
        self
    }

    /// Set the allowed financing term, in whole years from the start date.
    ///
    /// # Panics
    ///
    /// Panics if `min_years > max_years`.
    pub fn with_term_years(mut self, min_years: u32, max_years: u32) -> Self {
        assert!(
            min_years <= max_years,
            "minimum term must not exceed maximum term"
        );
        self.min_term_years = min_years;
        self.max_term_years = max_years;
        self
    }

    /// Country dataset URL.
    pub fn reference_url(&self) -> &str {
        &self.reference_url
    }

    /// Submission endpoint URL.
    pub fn submission_url(&self) -> &str {
        &self.submission_url
    }

    /// Outcome notification lifetime.
    pub fn outcome_ttl(&self) -> Duration {
        self.outcome_ttl
    }

    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Maximum description length, in characters.
    pub fn description_limit(&self) -> usize {
        self.description_limit
    }

    /// Minimum days between today and the start date.
    pub fn min_lead_days(&self) -> u32 {
        self.min_lead_days
    }

    /// Shortest allowed term, in years.
    pub fn min_term_years(&self) -> u32 {
        self.min_term_years
    }

    /// Longest allowed term, in years.
    pub fn max_term_years(&self) -> u32 {
        self.max_term_years
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form_rules() {
        let config = FormConfig::default();
        assert_eq!(config.outcome_ttl(), Duration::from_millis(3000));
        assert_eq!(config.description_limit(), 150);
        assert_eq!(config.min_lead_days(), 15);
        assert_eq!(config.min_term_years(), 1);
        assert_eq!(config.max_term_years(), 3);
        assert!(config.reference_url().contains("fields=name,currencies"));
    }

    #[test]
    fn test_deserializes_partial_json() {
        let config: FormConfig = serde_json::from_str(
            r#"{ "submission_url": "http://localhost/api", "outcome_ttl": 250 }"#,
        )
        .unwrap();
        assert_eq!(config.submission_url(), "http://localhost/api");
        assert_eq!(config.outcome_ttl(), Duration::from_millis(250));
        assert_eq!(config.reference_url(), DEFAULT_REFERENCE_URL);
    }

    #[test]
    #[should_panic(expected = "minimum term must not exceed maximum term")]
    fn test_term_bounds_must_be_ordered() {
        let _ = FormConfig::default().with_term_years(4, 2);
    }
}
