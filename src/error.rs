//! Error type shared by setup and extraction.

use std::io;

use arrow::error::ArrowError;
use thiserror::Error;

use crate::extractor::ExtractorState;

/// Errors surfaced while setting up or driving a regex record reader.
///
/// Setup failures (`InvalidPattern`, `NoCapturingGroups`, `InvalidColumnSpec`)
/// abort reader construction; `SourceRead` aborts the current batch. Lines that
/// fail to match the pattern are never reported here.
#[derive(Debug, Error)]
pub enum RegexFormatError {
    /// The configured expression failed to parse, or none was configured.
    #[error("failed to parse regex \"{pattern}\": {reason}")]
    InvalidPattern {
        /// Pattern text as configured.
        pattern: String,
        /// Parser diagnostic.
        reason: String,
        /// Underlying regex error, when the parser produced one.
        #[source]
        source: Option<regex::Error>,
    },
    /// The expression parsed but declares no capturing groups.
    #[error("regex contains no groups: \"{pattern}\"")]
    NoCapturingGroups {
        /// Pattern text as configured.
        pattern: String,
    },
    /// A projected column is a nested or compound reference.
    #[error("the regex format supports only simple columns, got projected column `{column}`")]
    InvalidColumnSpec {
        /// Display form of the rejected column reference.
        column: String,
    },
    /// The line source failed while reading.
    #[error("failed to read input line: {0}")]
    SourceRead(#[source] io::Error),
    /// An operation was invoked in a state that does not support it.
    #[error("cannot {operation} while extractor is {state:?}")]
    InvalidState {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the extractor was in.
        state: ExtractorState,
    },
    /// Materializing accumulated rows into Arrow arrays failed.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl RegexFormatError {
    pub(crate) fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        RegexFormatError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: source.to_string(),
            source: Some(source),
        }
    }

    pub(crate) fn missing_pattern() -> Self {
        RegexFormatError::InvalidPattern {
            pattern: String::new(),
            reason: "no regex configured".to_string(),
            source: None,
        }
    }
}
