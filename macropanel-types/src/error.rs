use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DateEncoding, Frequency};

/// Row-level failure raised while normalizing a single raw record.
///
/// These never abort a pipeline run: the offending row is dropped and the
/// failure is counted in the series' normalization statistics.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The record lacks the date field or every configured value field.
    #[error("missing field: {field}")]
    MissingField {
        /// Name of the field that was expected.
        field: String,
    },

    /// The date field could not be decoded with the configured encoding.
    #[error("invalid date {raw:?} for encoding {encoding}")]
    InvalidDate {
        /// Raw text that failed to decode.
        raw: String,
        /// Encoding rule that was applied.
        encoding: DateEncoding,
    },

    /// The value field is neither numeric nor a recognized missing-value token.
    #[error("invalid value {raw:?}")]
    InvalidValue {
        /// Raw text that failed to decode.
        raw: String,
    },
}

/// Unified error type for the macropanel workspace.
///
/// Covers structural usage errors (mismatched frequencies, empty inputs,
/// incomplete configuration) and failures at the fetch boundary. Integrity
/// findings are not errors; they are reported as issues instead.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PanelError {
    /// Series handed to the merger do not share one target frequency.
    #[error("frequency mismatch for {dataset}: expected {expected}, found {found}")]
    FrequencyMismatch {
        /// Dataset whose frequency disagrees.
        dataset: String,
        /// Frequency established by the other inputs.
        expected: Frequency,
        /// Frequency of the offending dataset.
        found: Frequency,
    },

    /// No datasets (or no observations at all) were supplied.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A dataset produced no usable observations after normalization.
    #[error("dataset {dataset} has no usable observations")]
    EmptyDataset {
        /// Dataset name.
        dataset: String,
    },

    /// A dataset lacks a required piece of configuration or input.
    #[error("dataset {dataset} is missing {what}")]
    MissingConfig {
        /// Dataset name.
        dataset: String,
        /// What is missing, e.g. "an aggregation function".
        what: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with the supplied or expected data.
    #[error("data issue: {0}")]
    Data(String),

    /// A record source failed while fetching.
    #[error("source {source_name} failed: {msg}")]
    Source {
        /// Name of the record source.
        source_name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// An individual record source exceeded its timeout.
    #[error("source timed out: {source_name}")]
    SourceTimeout {
        /// Name of the record source.
        source_name: String,
    },

    /// The overall fetch fan-out exceeded the configured deadline.
    #[error("request timed out")]
    RequestTimeout,

    /// One or more sources failed; contains the individual failures.
    #[error("sources failed: {0:?}")]
    SourcesFailed(Vec<PanelError>),
}

impl PanelError {
    /// Helper: build an `EmptyInput` error.
    pub fn empty_input(what: impl Into<String>) -> Self {
        Self::EmptyInput(what.into())
    }

    /// Helper: build an `EmptyDataset` error.
    pub fn empty_dataset(dataset: impl Into<String>) -> Self {
        Self::EmptyDataset {
            dataset: dataset.into(),
        }
    }

    /// Helper: build a `MissingConfig` error.
    pub fn missing_config(dataset: impl Into<String>, what: impl Into<String>) -> Self {
        Self::MissingConfig {
            dataset: dataset.into(),
            what: what.into(),
        }
    }

    /// Helper: build an `InvalidArg` error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Helper: build a `Source` error tagged with the source name.
    pub fn source_failed(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `SourceTimeout` error.
    pub fn source_timeout(source_name: impl Into<String>) -> Self {
        Self::SourceTimeout {
            source_name: source_name.into(),
        }
    }

    /// True for errors raised at the fetch boundary rather than by the pipeline.
    #[must_use]
    pub const fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Source { .. }
                | Self::SourceTimeout { .. }
                | Self::RequestTimeout
                | Self::SourcesFailed(_)
        )
    }
}
