//! Symbol rule - checks punctuation and symbol usage against an allowed set.

use secrecy::{ExposeSecret, SecretString};

use super::{PolicyRule, RuleResult, is_symbol};
use crate::config::SymbolRule;

impl PolicyRule for SymbolRule {
    fn name(&self) -> &'static str {
        "symbols"
    }

    /// # Returns
    /// - `Ok(Some(reason))` if symbols are forbidden but present, or allowed
    ///   but missing, not in the allowed set, or fewer than `min`
    /// - `Ok(None)` otherwise
    fn validate(&self, password: &SecretString) -> RuleResult {
        if !self.enabled {
            return Ok(None);
        }

        let symbols: Vec<char> = password
            .expose_secret()
            .chars()
            .filter(|&c| is_symbol(c))
            .collect();

        if !self.allow_symbols {
            if symbols.is_empty() {
                return Ok(None);
            }
            return Ok(Some("password should not contain any symbols".to_string()));
        }

        if symbols.is_empty() {
            return Ok(Some(format!(
                "password does not contain any of the allowed symbols '{}'",
                self.allowed_display()
            )));
        }

        let (valid, invalid): (Vec<char>, Vec<char>) = symbols
            .into_iter()
            .partition(|c| self.allowed_symbols.contains(c));

        if !invalid.is_empty() {
            let invalid: String = invalid.into_iter().collect();
            return Ok(Some(format!(
                "password contains invalid symbols '{}'",
                invalid
            )));
        }

        if valid.len() < self.min {
            return Ok(Some(format!(
                "password does not contain at least {} valid symbols ({})",
                self.min,
                self.allowed_display()
            )));
        }

        Ok(None)
    }
}
