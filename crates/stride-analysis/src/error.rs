//! Error types surfaced by the analysis engine.
//!
//! Numeric edge cases (empty inputs, zero denominators, too few samples) never
//! produce errors; they resolve to the neutral values documented on each
//! operation. Errors are reserved for inputs a caller can fix: unknown metric
//! names and inconsistent configuration.

/// A metric name that is not part of the metric catalog.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown metric key '{key}'")]
pub struct UnknownMetricKeyError {
    /// The name that failed to parse.
    pub key: String,
}

/// An [`EngineConfig`](crate::config::EngineConfig) that failed validation.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("{name} must be a finite non-negative number, got {value}")]
    InvalidValue { name: &'static str, value: f64 },
    #[display("{name}: lower bound {lower} must be less than upper bound {upper}")]
    InvertedBand {
        name: &'static str,
        lower: f64,
        upper: f64,
    },
    #[display("{name} must be within 0..=100, got {value}")]
    RankOutOfRange { name: &'static str, value: f64 },
}
