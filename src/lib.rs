#![deny(missing_docs)]
//! Schema-on-read extraction of records from loosely structured text.
//!
//! A regular expression with capturing groups describes one record per line.
//! Each group becomes a nullable text column, named from a comma-separated
//! field list or `Column$n` when no name is configured. Callers project all
//! columns, a named subset (matched case-insensitively), or none at all for
//! pure row counts, and pull rows in bounded batches:
//!
//! ```
//! use regex_format::{
//!     IterLineSource, LineExtractor, ProjectionRequest, ReaderOptions, RegexFormatConfig,
//!     VecSink,
//! };
//!
//! let config = RegexFormatConfig::new(r"(\d{4})-(\d{2})-(\d{2}) .*").with_fields("year, month, day");
//! let lines = IterLineSource::new(vec!["2017-12-17 x", "bad-line", "2017-12-18 y"]);
//! let mut extractor =
//!     LineExtractor::open(config, ProjectionRequest::All, ReaderOptions::default(), lines)?;
//!
//! let mut sink = VecSink::new();
//! assert_eq!(extractor.next_batch(&mut sink)?, 2);
//! assert_eq!(sink.rows()[1][2].as_deref(), Some("18"));
//! assert_eq!(extractor.next_batch(&mut sink)?, 0);
//! extractor.close();
//! # Ok::<(), regex_format::RegexFormatError>(())
//! ```
//!
//! Lines that do not match the whole pattern are skipped silently. Rows can
//! also be materialized as Arrow `RecordBatch` values through [`ArrowSink`] or
//! [`LineExtractor::record_batches`].

mod logging;

pub mod config;
pub mod error;
pub mod extractor;
pub mod pattern;
pub mod projection;
pub mod schema;
pub mod sink;
pub mod source;

pub use crate::{
    config::{ReaderOptions, RegexFormatConfig, DEFAULT_BATCH_SIZE},
    error::RegexFormatError,
    extractor::{ExtractorState, LineExtractor, RecordBatches},
    pattern::Pattern,
    projection::{plan, ColumnRef, PlanEntry, ProjectionPlan, ProjectionRequest},
    schema::{resolve, CanonicalSchema, SchemaDiagnostic},
    sink::{ArrowSink, RowSink, VecSink},
    source::{IterLineSource, LineSource, ReaderLineSource},
};
