//! Metrics sink
//!
//! The assessor reports stage timings through an explicitly passed sink
//! instead of a process-wide registry.

use std::time::Duration;

/// Pipeline stage being measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Policy,
    Breach,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Policy => "policy",
            Stage::Breach => "breach",
        }
    }
}

/// Receives one observation per completed stage.
pub trait MetricsSink: Send + Sync {
    fn observe(&self, stage: Stage, outcome: &'static str, elapsed: Duration);
}

/// Discards every observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn observe(&self, _stage: Stage, _outcome: &'static str, _elapsed: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        assert_eq!(Stage::Policy.as_str(), "policy");
        assert_eq!(Stage::Breach.as_str(), "breach");
    }
}
