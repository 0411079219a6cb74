//! Length rule - bounds the number of codepoints in the password.

use secrecy::{ExposeSecret, SecretString};

use super::{PolicyRule, RuleResult};
use crate::config::LengthRule;

impl PolicyRule for LengthRule {
    fn name(&self) -> &'static str {
        "length"
    }

    /// Counts Unicode codepoints, not bytes.
    ///
    /// # Returns
    /// - `Ok(Some(reason))` if the password is too short or too long
    /// - `Ok(None)` if the length is within bounds or the rule is disabled
    fn validate(&self, password: &SecretString) -> RuleResult {
        if !self.enabled {
            return Ok(None);
        }

        let length = password.expose_secret().chars().count();
        if length < self.min {
            return Ok(Some(format!(
                "password is too short: at least {} characters required",
                self.min
            )));
        }
        if length > self.max {
            return Ok(Some(format!(
                "password is too long: at most {} characters allowed",
                self.max
            )));
        }
        Ok(None)
    }
}
