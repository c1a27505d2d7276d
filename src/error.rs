//! Library error type.
//!
//! Contract violations (missing or unknown features, unparsable form values)
//! and reference-table validation failures. Config I/O at boot goes through
//! `anyhow` instead.

use thiserror::Error;

use crate::feature::Feature;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    /// A name that is not one of the 13 tracked features.
    #[error("unknown feature `{name}`{}", did_you_mean(.suggestion))]
    UnknownFeature {
        name: String,
        suggestion: Option<&'static str>,
    },

    /// A record or submission without a value for this feature.
    #[error("missing value for feature `{0}`")]
    MissingValue(Feature),

    /// A submitted value that is not a finite number.
    #[error("invalid value {raw:?} for feature `{feature}`")]
    InvalidValue { feature: Feature, raw: String },

    /// Reference table that does not cover exactly the 13 features or has bad numbers.
    #[error("invalid reference table: {0}")]
    InvalidTable(String),
}

pub type Result<T> = std::result::Result<T, RiskError>;

fn did_you_mean(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean `{s}`?)"),
        None => String::new(),
    }
}
