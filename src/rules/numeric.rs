//! Numeric rule - checks digit composition.

use secrecy::{ExposeSecret, SecretString};

use super::{PolicyRule, RuleResult};
use crate::config::NumericRule;

impl PolicyRule for NumericRule {
    fn name(&self) -> &'static str {
        "numbers"
    }

    fn validate(&self, password: &SecretString) -> RuleResult {
        if !self.enabled {
            return Ok(None);
        }

        let pwd = password.expose_secret();
        let total_numbers = pwd.chars().filter(|c| c.is_numeric()).count();

        if self.allow_numbers {
            if total_numbers < self.min {
                return Ok(Some(format!(
                    "password should contain at least {} numbers",
                    self.min
                )));
            }
        } else if total_numbers > 0 {
            return Ok(Some("password should not contain numbers".to_string()));
        }

        if self.only_numbers && total_numbers != pwd.chars().count() {
            return Ok(Some("password should only contain numbers".to_string()));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string().into())
    }

    fn rule(allow_numbers: bool, min: usize, only_numbers: bool) -> NumericRule {
        NumericRule { enabled: true, allow_numbers, min, only_numbers }
    }

    #[test]
    fn test_numeric_disabled() {
        let disabled = NumericRule { enabled: false, ..rule(false, 5, true) };
        assert_eq!(disabled.validate(&secret("abc123")), Ok(None));
    }

    #[test]
    fn test_minimum_numbers() {
        let min = rule(true, 3, false);
        assert!(matches!(min.validate(&secret("pass12")), Ok(Some(ref r)) if r.contains("at least 3")));
        assert_eq!(min.validate(&secret("pa1ss23")), Ok(None));
    }

    #[test]
    fn test_numbers_forbidden() {
        let forbid = rule(false, 0, false);
        assert!(matches!(
            forbid.validate(&secret("passw0rd")),
            Ok(Some(ref r)) if r.contains("should not contain")
        ));
        assert_eq!(forbid.validate(&secret("password")), Ok(None));
    }

    #[test]
    fn test_only_numbers() {
        let only = rule(true, 0, true);
        assert_eq!(only.validate(&secret("0123456789")), Ok(None));
        assert!(matches!(
            only.validate(&secret("01234a")),
            Ok(Some(ref r)) if r.contains("only contain")
        ));
    }

    #[test]
    fn test_unicode_digits_counted() {
        // Arabic-Indic digits
        let only = rule(true, 3, true);
        assert_eq!(only.validate(&secret("٣٤٥")), Ok(None));
    }

    #[test]
    fn test_empty_password() {
        assert!(matches!(rule(true, 1, false).validate(&secret("")), Ok(Some(_))));
        assert_eq!(rule(false, 0, true).validate(&secret("")), Ok(None));
    }
}
