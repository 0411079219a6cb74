//! Case rule - checks upper and lower case composition.

use secrecy::{ExposeSecret, SecretString};

use super::{PolicyRule, RuleResult, is_letter, is_lower, is_upper};
use crate::config::CaseRule;

impl PolicyRule for CaseRule {
    fn name(&self) -> &'static str {
        "case"
    }

    /// Reports the first failing condition in order: only-upper,
    /// only-lower, minimum lowercase, minimum uppercase.
    fn validate(&self, password: &SecretString) -> RuleResult {
        if !self.enabled {
            return Ok(None);
        }

        let pwd = password.expose_secret();

        if self.only_upper && pwd.chars().any(|c| is_letter(c) && !is_upper(c)) {
            return Ok(Some(
                "password should only contain uppercase characters".to_string(),
            ));
        }

        if self.only_lower && pwd.chars().any(|c| is_letter(c) && !is_lower(c)) {
            return Ok(Some(
                "password should only contain lowercase characters".to_string(),
            ));
        }

        let total_lower = pwd.chars().filter(|&c| is_lower(c)).count();
        if total_lower < self.min_lower {
            return Ok(Some(format!(
                "password does not contain at least {} lowercase characters",
                self.min_lower
            )));
        }

        let total_upper = pwd.chars().filter(|&c| is_upper(c)).count();
        if total_upper < self.min_upper {
            return Ok(Some(format!(
                "password does not contain at least {} uppercase characters",
                self.min_upper
            )));
        }

        Ok(None)
    }
}
