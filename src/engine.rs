//! Validation engine - runs every enabled policy rule concurrently.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use secrecy::SecretString;
use tokio::task::JoinSet;

use crate::config::PolicyConfig;
use crate::rules::{PolicyRule, RuleError, RuleResult};

/// Aggregated verdict of all policy rules for one password.
///
/// `violations` follows task completion order, which is not stable between
/// runs. Compare it as a set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub passed: bool,
    pub violations: Vec<String>,
}

/// Runs a fixed set of rules against passwords.
#[derive(Clone)]
pub struct ValidationEngine {
    rules: Vec<Arc<dyn PolicyRule>>,
}

impl ValidationEngine {
    pub fn new(rules: Vec<Arc<dyn PolicyRule>>) -> Self {
        Self { rules }
    }

    /// Builds an engine with the enabled rules from the policy.
    pub fn from_config(policy: &PolicyConfig) -> Self {
        let mut rules: Vec<Arc<dyn PolicyRule>> = Vec::with_capacity(4);
        if policy.length.enabled {
            rules.push(Arc::new(policy.length.clone()));
        }
        if policy.case.enabled {
            rules.push(Arc::new(policy.case.clone()));
        }
        if policy.symbols.enabled {
            rules.push(Arc::new(policy.symbols.clone()));
        }
        if policy.numbers.enabled {
            rules.push(Arc::new(policy.numbers.clone()));
        }
        Self::new(rules)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluates every rule and collects all violations.
    ///
    /// One task is spawned per rule and all of them are joined; a failing
    /// rule never cancels its siblings. A rule that errors or panics counts
    /// as a violation carrying the error text.
    pub async fn evaluate(&self, password: Arc<SecretString>) -> ValidationOutcome {
        #[cfg(feature = "tracing")]
        tracing::debug!("policy evaluation started with {} rules", self.rules.len());

        let mut tasks = JoinSet::new();
        for rule in &self.rules {
            let rule = Arc::clone(rule);
            let password = Arc::clone(&password);
            tasks.spawn(async move { run_rule(rule.as_ref(), &password) });
        }
        // Tasks hold the only other references; the secret is released as they finish.
        drop(password);

        let mut violations = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let verdict = match joined {
                Ok(Ok(None)) => None,
                Ok(Ok(Some(reason))) => Some(reason),
                Ok(Err(e)) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!("policy rule failed to evaluate: {}", e);
                    Some(e.to_string())
                }
                Err(join_error) => {
                    let e = RuleError::Internal {
                        rule: "task".to_string(),
                        reason: join_error.to_string(),
                    };
                    #[cfg(feature = "tracing")]
                    tracing::error!("policy rule task aborted: {}", e);
                    Some(e.to_string())
                }
            };
            if let Some(reason) = verdict {
                violations.push(reason);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("policy evaluation finished with {} violations", violations.len());

        ValidationOutcome {
            passed: violations.is_empty(),
            violations,
        }
    }
}

/// Runs one rule, turning a panic into a `RuleError`.
fn run_rule(rule: &dyn PolicyRule, password: &SecretString) -> RuleResult {
    catch_unwind(AssertUnwindSafe(|| rule.validate(password))).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panicked".to_string());
        Err(RuleError::Internal {
            rule: rule.name().to_string(),
            reason,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CaseRule, LengthRule, NumericRule, SymbolRule};
    use std::collections::HashSet;

    fn secret(s: &str) -> Arc<SecretString> {
        Arc::new(SecretString::new(s.to_string().into()))
    }

    fn as_set(violations: &[String]) -> HashSet<&str> {
        violations.iter().map(String::as_str).collect()
    }

    struct BrokenRule;

    impl PolicyRule for BrokenRule {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn validate(&self, _password: &SecretString) -> RuleResult {
            Err(RuleError::Internal {
                rule: self.name().to_string(),
                reason: "lookup table missing".to_string(),
            })
        }
    }

    struct PanickingRule;

    impl PolicyRule for PanickingRule {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn validate(&self, _password: &SecretString) -> RuleResult {
            panic!("rule blew up");
        }
    }

    #[tokio::test]
    async fn test_all_rules_disabled_passes() {
        let engine = ValidationEngine::from_config(&PolicyConfig::default());
        assert_eq!(engine.rule_count(), 0);

        for pwd in ["", "a", "Passw0rd!", "日本語"] {
            let outcome = engine.evaluate(secret(pwd)).await;
            assert!(outcome.passed);
            assert!(outcome.violations.is_empty());
        }
    }

    #[tokio::test]
    async fn test_two_of_four_rules_fail() {
        let policy = PolicyConfig {
            length: LengthRule { enabled: true, min: 12, max: 64 },
            case: CaseRule { enabled: true, min_upper: 1, ..Default::default() },
            symbols: SymbolRule { enabled: true, allow_symbols: false, ..Default::default() },
            numbers: NumericRule { enabled: true, allow_numbers: true, min: 1, ..Default::default() },
        };
        let engine = ValidationEngine::from_config(&policy);
        assert_eq!(engine.rule_count(), 4);

        let outcome = engine.evaluate(secret("Pass!1")).await;

        assert!(!outcome.passed);
        assert_eq!(outcome.violations.len(), 2);
        let expected: HashSet<&str> = [
            "password is too short: at least 12 characters required",
            "password should not contain any symbols",
        ]
        .into_iter()
        .collect();
        assert_eq!(as_set(&outcome.violations), expected);
    }

    #[tokio::test]
    async fn test_valid_password_passes_every_rule() {
        let policy = PolicyConfig {
            length: LengthRule { enabled: true, min: 8, max: 32 },
            case: CaseRule { enabled: true, min_upper: 1, min_lower: 1, ..Default::default() },
            symbols: SymbolRule {
                enabled: true,
                allow_symbols: true,
                min: 1,
                allowed_symbols: "!@#".chars().collect(),
            },
            numbers: NumericRule { enabled: true, allow_numbers: true, min: 2, ..Default::default() },
        };
        let outcome = ValidationEngine::from_config(&policy)
            .evaluate(secret("Correct#Horse42"))
            .await;

        assert_eq!(outcome, ValidationOutcome { passed: true, violations: vec![] });
    }

    #[tokio::test]
    async fn test_rule_error_becomes_violation() {
        let rules: Vec<Arc<dyn PolicyRule>> = vec![
            Arc::new(BrokenRule),
            Arc::new(LengthRule { enabled: true, min: 1, max: 10 }),
        ];
        let engine = ValidationEngine::new(rules);
        let outcome = engine.evaluate(secret("fine")).await;

        assert!(!outcome.passed);
        assert_eq!(outcome.violations.len(), 1);
        assert!(outcome.violations[0].contains("lookup table missing"));
    }

    #[tokio::test]
    async fn test_panicking_rule_does_not_abort_siblings() {
        let rules: Vec<Arc<dyn PolicyRule>> = vec![
            Arc::new(PanickingRule),
            Arc::new(LengthRule { enabled: true, min: 10, max: 20 }),
        ];
        let engine = ValidationEngine::new(rules);
        let outcome = engine.evaluate(secret("short")).await;

        assert!(!outcome.passed);
        assert_eq!(outcome.violations.len(), 2);
        assert!(outcome.violations.iter().any(|v| v.contains("too short")));
        assert!(outcome.violations.iter().any(|v| v.contains("'panicking'") && v.contains("rule blew up")));
    }

    #[tokio::test]
    async fn test_password_released_after_evaluation() {
        let rules: Vec<Arc<dyn PolicyRule>> = vec![Arc::new(LengthRule { enabled: true, min: 1, max: 5 })];
        let engine = ValidationEngine::new(rules);
        let password = secret("abc");
        engine.evaluate(Arc::clone(&password)).await;
        assert_eq!(Arc::strong_count(&password), 1);
    }
}
