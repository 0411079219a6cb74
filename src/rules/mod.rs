//! Password policy rules
//!
//! Each rule checks one aspect of password composition. Rules are pure:
//! they read their own immutable configuration and the password, nothing else.

mod case;
mod length;
mod numeric;
mod symbol;

use secrecy::SecretString;
use thiserror::Error;
use unicode_general_category::{GeneralCategory, get_general_category};

/// Result type for rule evaluation functions.
/// - `Ok(Some(reason))` - Rule failed with reason
/// - `Ok(None)` - Rule passed
/// - `Err(_)` - The rule could not be evaluated
pub type RuleResult = Result<Option<String>, RuleError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule '{rule}' could not be evaluated: {reason}")]
    Internal { rule: String, reason: String },
}

/// A single stateless password composition check.
pub trait PolicyRule: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    fn validate(&self, password: &SecretString) -> RuleResult;
}

/// Punctuation (P*) or symbol (S*) codepoint. Marks, format characters
/// and unassigned codepoints are neither.
pub(crate) fn is_symbol(c: char) -> bool {
    use GeneralCategory::*;
    matches!(
        get_general_category(c),
        ConnectorPunctuation
            | DashPunctuation
            | OpenPunctuation
            | ClosePunctuation
            | InitialPunctuation
            | FinalPunctuation
            | OtherPunctuation
            | MathSymbol
            | CurrencySymbol
            | ModifierSymbol
            | OtherSymbol
    )
}

/// Any letter (L*).
pub(crate) fn is_letter(c: char) -> bool {
    use GeneralCategory::*;
    matches!(
        get_general_category(c),
        UppercaseLetter | LowercaseLetter | TitlecaseLetter | ModifierLetter | OtherLetter
    )
}

/// Uppercase letter (Lu).
pub(crate) fn is_upper(c: char) -> bool {
    matches!(get_general_category(c), GeneralCategory::UppercaseLetter)
}

/// Lowercase letter (Ll).
pub(crate) fn is_lower(c: char) -> bool {
    matches!(get_general_category(c), GeneralCategory::LowercaseLetter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_and_symbols_classified() {
        for c in ['!', '#', '%', '_', '-', '(', '«', '£', '€', '+', '^', '©', '😀'] {
            assert!(is_symbol(c), "{c:?} should be a symbol");
        }
    }

    #[test]
    fn test_marks_and_format_chars_are_not_symbols() {
        // combining acute, enclosing circle, ZWJ, soft hyphen, private use
        for c in ['\u{0301}', '\u{20DD}', '\u{200D}', '\u{00AD}', '\u{E000}'] {
            assert!(!is_symbol(c), "{c:?} should not be a symbol");
        }
        for c in ['a', 'Z', '7', ' ', '\t', 'é', '日'] {
            assert!(!is_symbol(c), "{c:?} should not be a symbol");
        }
    }

    #[test]
    fn test_case_uses_letter_categories() {
        assert!(is_upper('A') && is_upper('É'));
        assert!(is_lower('a') && is_lower('é'));
        // ordinal indicators are Lo, roman numerals are Nl
        for c in ['ª', 'º', 'Ⅻ', 'ⅻ'] {
            assert!(!is_upper(c) && !is_lower(c), "{c:?} has no case");
        }
        assert!(is_letter('ª'));
        assert!(!is_letter('Ⅻ'));
    }
}
