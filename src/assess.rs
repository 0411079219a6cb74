//! Password assessment pipeline
//!
//! Runs the policy rules first and, only when they all pass, the breach
//! corpus lookup.

use std::sync::Arc;
use std::time::Instant;

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use crate::breach::{BreachChecker, BreachError, BreachOutcome};
use crate::config::{ConfigError, ServiceConfig};
use crate::engine::ValidationEngine;
use crate::metrics::{MetricsSink, NoopMetrics, Stage};

/// Reason reported when the password appears in the breach corpus.
pub const COMPROMISED_REASON: &str = "password is known to be compromised";

/// Final verdict for one password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    Accepted,
    /// One or more human readable reasons, never empty.
    Rejected(Vec<String>),
    /// Breach status could not be determined. The caller decides whether
    /// to fail open or closed.
    CheckFailed(BreachError),
}

impl Assessment {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Assessment::Accepted)
    }

    fn label(&self) -> &'static str {
        match self {
            Assessment::Accepted => "accepted",
            Assessment::Rejected(_) => "rejected",
            Assessment::CheckFailed(_) => "check_failed",
        }
    }
}

/// Two-stage password assessor.
#[derive(Clone)]
pub struct Assessor {
    engine: ValidationEngine,
    checker: BreachChecker,
    metrics: Arc<dyn MetricsSink>,
}

impl Assessor {
    pub fn new(engine: ValidationEngine, checker: BreachChecker) -> Self {
        Self {
            engine,
            checker,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Builds the rules and the HTTP backed breach checker from configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let engine = ValidationEngine::from_config(&config.password);
        let checker = BreachChecker::from_config(&config.pwned)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "assessor ready: {} policy rules, breach check enabled: {}",
            engine.rule_count(),
            checker.is_enabled()
        );

        Ok(Self::new(engine, checker))
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Assesses a password. The secret is consumed and dropped before
    /// this returns.
    pub async fn assess(&self, password: SecretString) -> Assessment {
        self.assess_with_cancel(password, CancellationToken::new()).await
    }

    /// Like [`assess`](Self::assess), aborting the breach lookup when `token`
    /// is cancelled.
    pub async fn assess_with_cancel(
        &self,
        password: SecretString,
        token: CancellationToken,
    ) -> Assessment {
        if token.is_cancelled() {
            return Assessment::CheckFailed(BreachError::Cancelled);
        }

        let password = Arc::new(password);

        let start = Instant::now();
        let outcome = self.engine.evaluate(Arc::clone(&password)).await;
        let elapsed = start.elapsed();
        self.metrics.observe(
            Stage::Policy,
            if outcome.passed { "passed" } else { "failed" },
            elapsed,
        );

        #[cfg(feature = "tracing")]
        tracing::debug!("{} stage took {:?}", Stage::Policy.as_str(), elapsed);

        if !outcome.passed {
            return Assessment::Rejected(outcome.violations);
        }

        if token.is_cancelled() {
            return Assessment::CheckFailed(BreachError::Cancelled);
        }

        let start = Instant::now();
        let breach = self.checker.check_with_cancel(&password, &token).await;
        let elapsed = start.elapsed();

        let assessment = match breach {
            BreachOutcome::Secure => Assessment::Accepted,
            BreachOutcome::Insecure => Assessment::Rejected(vec![COMPROMISED_REASON.to_string()]),
            BreachOutcome::CheckFailed(e) => Assessment::CheckFailed(e),
        };
        self.metrics.observe(Stage::Breach, assessment.label(), elapsed);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "{} stage took {:?} ({})",
            Stage::Breach.as_str(),
            elapsed,
            assessment.label()
        );

        assessment
    }
}
