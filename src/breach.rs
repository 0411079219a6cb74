//! Breach corpus lookup
//!
//! Implements the k-anonymity range query: only the first five hex
//! characters of the password's SHA-1 digest are sent to the remote
//! service, and the returned candidate suffixes are matched locally.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sha1::{Digest, Sha1};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::{BreachCheckConfig, ConfigError};

/// Length of the digest prefix disclosed to the range service.
pub const PREFIX_LEN: usize = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BreachError {
    #[error("could not reach breach service: {0}")]
    Network(String),
    #[error("breach service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("breach service responded with status {0}")]
    Status(u16),
    #[error("could not parse breach service response: {0}")]
    Parse(String),
    #[error("breach check cancelled")]
    Cancelled,
}

/// Result of looking a password up in the breach corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreachOutcome {
    Secure,
    Insecure,
    /// Breach status could not be determined. Never equivalent to either
    /// of the other two outcomes.
    CheckFailed(BreachError),
}

/// Split SHA-1 digest of a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRange {
    pub prefix: String,
    pub suffix: String,
}

impl HashRange {
    /// Hashes the password into an upper-case hex digest and splits it.
    pub fn from_password(password: &SecretString) -> Self {
        let digest = Sha1::digest(password.expose_secret().as_bytes());
        let mut encoded = hex::encode_upper(digest);
        let suffix = encoded.split_off(PREFIX_LEN);
        Self { prefix: encoded, suffix }
    }
}

/// Fetches the candidate list for a digest prefix.
#[async_trait]
pub trait RangeClient: Send + Sync {
    async fn fetch_range(&self, prefix: &str) -> Result<String, BreachError>;
}

/// `RangeClient` backed by an HTTP GET of `{base_url}{prefix}`.
#[derive(Clone)]
pub struct HttpRangeClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRangeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl RangeClient for HttpRangeClient {
    async fn fetch_range(&self, prefix: &str) -> Result<String, BreachError> {
        let url = format!("{}{}", self.base_url, prefix);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BreachError::Network(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(BreachError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BreachError::Network(e.to_string()))?;

        String::from_utf8(body.to_vec()).map_err(|e| BreachError::Parse(e.to_string()))
    }
}

/// Checks passwords against the breach corpus.
#[derive(Clone)]
pub struct BreachChecker {
    enabled: bool,
    timeout: Duration,
    client: Arc<dyn RangeClient>,
}

impl BreachChecker {
    /// Builds a checker that queries the configured HTTP endpoint.
    pub fn from_config(config: &BreachCheckConfig) -> Result<Self, ConfigError> {
        let client = HttpRangeClient::new(config.url.clone())?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    pub fn with_client(config: &BreachCheckConfig, client: Arc<dyn RangeClient>) -> Self {
        Self {
            enabled: config.enabled,
            timeout: config.timeout,
            client,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn check(&self, password: &SecretString) -> BreachOutcome {
        self.check_with_cancel(password, &CancellationToken::new()).await
    }

    /// Like [`check`](Self::check), but also aborts the range query when
    /// `token` is cancelled.
    ///
    /// The query future is dropped at the timeout or on cancellation, which
    /// closes the underlying connection. Failures are never retried.
    pub async fn check_with_cancel(
        &self,
        password: &SecretString,
        token: &CancellationToken,
    ) -> BreachOutcome {
        if !self.enabled {
            return BreachOutcome::Secure;
        }

        let range = HashRange::from_password(password);

        #[cfg(feature = "tracing")]
        tracing::debug!("querying breach range {}", range.prefix);

        let fetched = tokio::select! {
            biased;
            _ = token.cancelled() => Err(BreachError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.client.fetch_range(&range.prefix)) => {
                result.unwrap_or(Err(BreachError::Timeout(self.timeout)))
            }
        };

        match fetched {
            Ok(body) if suffix_in_range(&range.suffix, &body) => BreachOutcome::Insecure,
            Ok(_) => BreachOutcome::Secure,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("breach check for range {} failed: {}", range.prefix, e);
                BreachOutcome::CheckFailed(e)
            }
        }
    }
}

/// Scans a range response for `suffix`.
///
/// Each record is `SUFFIX:COUNT`; the text before the last colon is compared
/// exactly. Lines without a colon are skipped.
pub fn suffix_in_range(suffix: &str, body: &str) -> bool {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.rfind(':').map(|idx| &line[..idx]))
        .any(|candidate| candidate == suffix)
}
