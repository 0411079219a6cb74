//! Password policy validation with breach corpus checking
//!
//! A candidate password is first checked against a configurable composition
//! policy (length, case, symbols, numbers). Every rule runs concurrently and
//! all violations are reported together. Passwords that satisfy the policy
//! are then looked up in a public breach corpus with a k-anonymity range
//! query: only the first five hex characters of the SHA-1 digest leave the
//! process.
//!
//! # Features
//!
//! - `tracing` (default): Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! - `PWD_GUARD_CONFIG`: Custom path to the YAML configuration file
//!   (default: `./config.yaml`)
//!
//! # Example
//!
//! ```rust,no_run
//! use pwd_guard::{Assessment, Assessor, ServiceConfig};
//! use secrecy::SecretString;
//!
//! # async fn run() -> Result<(), pwd_guard::ConfigError> {
//! // Load configuration (call once at startup)
//! let config = ServiceConfig::load()?;
//! let assessor = Assessor::from_config(&config)?;
//!
//! let password = SecretString::new("MyP@ssw0rd!".to_string().into());
//! match assessor.assess(password).await {
//!     Assessment::Accepted => println!("accepted"),
//!     Assessment::Rejected(reasons) => println!("rejected: {}", reasons.join("; ")),
//!     Assessment::CheckFailed(e) => println!("breach status unknown: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

// Internal modules
mod assess;
mod breach;
mod config;
mod engine;
mod metrics;
mod rules;

// Public API
pub use assess::{Assessment, Assessor, COMPROMISED_REASON};
pub use breach::{
    BreachChecker, BreachError, BreachOutcome, HashRange, HttpRangeClient, PREFIX_LEN,
    RangeClient, suffix_in_range,
};
pub use config::{
    BreachCheckConfig, CONFIG_PATH_ENV, CaseRule, ConfigError, LengthRule, NumericRule,
    PolicyConfig, ServiceConfig, SymbolRule, config_path,
};
pub use engine::{ValidationEngine, ValidationOutcome};
pub use metrics::{MetricsSink, NoopMetrics, Stage};
pub use rules::{PolicyRule, RuleError, RuleResult};
