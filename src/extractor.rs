//! Streaming line extraction.
//!
//! A [`LineExtractor`] owns one line source for its whole life and pulls
//! lines from it on demand. Every line is matched in full against the
//! configured pattern; lines that match become rows, everything else is
//! dropped without a trace. Rows are pushed into a caller-supplied
//! [`RowSink`] in batches of at most [`ReaderOptions::capacity`] rows.
//!
//! The extractor moves through a small state machine:
//!
//! ```text
//! Idle --setup--> Ready <--> Reading --end of stream--> Exhausted
//!   \               \                                     /
//!    `---------------`--------------close----------------`--> Closed
//! ```

use arrow::array::RecordBatch;
use regex::Captures;

use crate::{
    config::{ReaderOptions, RegexFormatConfig},
    error::RegexFormatError,
    logging::{regex_log, LogContext},
    pattern::Pattern,
    projection::{self, ProjectionPlan, ProjectionRequest},
    schema::{self, CanonicalSchema},
    sink::{ArrowSink, RowSink},
    source::LineSource,
};

const EXTRACTOR_LOG_CTX: LogContext = LogContext::new("component=extractor");

/// Lifecycle of a [`LineExtractor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorState {
    /// Configured but not yet set up.
    Idle,
    /// Pattern, schema and plan are built; between batches.
    Ready,
    /// Inside a `next_batch` call.
    Reading,
    /// The source reported end of stream or failed.
    Exhausted,
    /// The source has been released.
    Closed,
}

/// Everything derived from the configuration at setup time.
#[derive(Debug)]
struct Session {
    pattern: Pattern,
    schema: CanonicalSchema,
    plan: ProjectionPlan,
}

/// Pull-based extractor turning lines into projected rows.
///
/// Not reentrant: drive one extractor from one thread at a time.
#[derive(Debug)]
pub struct LineExtractor<S> {
    config: RegexFormatConfig,
    request: ProjectionRequest,
    options: ReaderOptions,
    session: Option<Session>,
    source: Option<S>,
    state: ExtractorState,
    row_index: usize,
    log_ctx: LogContext,
}

impl<S: LineSource> LineExtractor<S> {
    /// Create an idle extractor. Nothing is validated until [`Self::setup`].
    pub fn new(
        config: RegexFormatConfig,
        request: ProjectionRequest,
        options: ReaderOptions,
    ) -> Self {
        let log_ctx = match options.label.as_deref() {
            Some(label) => EXTRACTOR_LOG_CTX.with_field("source", label),
            None => EXTRACTOR_LOG_CTX,
        };
        Self {
            config,
            request,
            options,
            session: None,
            source: None,
            state: ExtractorState::Idle,
            row_index: 0,
            log_ctx,
        }
    }

    /// Create and set up an extractor over `source` in one step.
    pub fn open(
        config: RegexFormatConfig,
        request: ProjectionRequest,
        options: ReaderOptions,
        source: S,
    ) -> Result<Self, RegexFormatError> {
        let mut extractor = Self::new(config, request, options);
        extractor.setup(source)?;
        Ok(extractor)
    }

    /// Compile the pattern, resolve column names and plan the projection,
    /// then take ownership of `source`.
    ///
    /// Field name mismatches and projected columns without a matching group
    /// are logged and otherwise ignored.
    pub fn setup(&mut self, source: S) -> Result<(), RegexFormatError> {
        if self.state != ExtractorState::Idle {
            return Err(RegexFormatError::InvalidState {
                operation: "set up",
                state: self.state,
            });
        }

        let text = self.config.regex().ok_or_else(RegexFormatError::missing_pattern)?;
        let pattern = Pattern::compile(text)?;

        let field_names = self.config.field_names();
        let (schema, diagnostics) = schema::resolve(&field_names, pattern.group_count());
        for diagnostic in &diagnostics {
            regex_log!(
                log::Level::Warn,
                ctx: self.log_ctx,
                diagnostic_event(diagnostic),
                "{} columns={:?} regex={}",
                diagnostic,
                field_names,
                pattern.as_str(),
            );
        }

        let plan = projection::plan(&self.request, &schema)?;
        if !plan.is_count_only() {
            for entry in plan.entries().iter().filter(|entry| entry.index.is_none()) {
                regex_log!(
                    log::Level::Debug,
                    ctx: self.log_ctx,
                    "projection_unmatched_column",
                    "column={} fill=null",
                    entry.name,
                );
            }
        }

        regex_log!(
            log::Level::Debug,
            ctx: self.log_ctx,
            "extractor_setup",
            "group_count={} projected={} count_only={} batch_size={}",
            pattern.group_count(),
            plan.len(),
            plan.is_count_only(),
            self.options.capacity(),
        );

        self.session = Some(Session {
            pattern,
            schema,
            plan,
        });
        self.source = Some(source);
        self.state = ExtractorState::Ready;
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ExtractorState {
        self.state
    }

    /// Options this extractor was created with.
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Compiled pattern, once set up.
    pub fn pattern(&self) -> Option<&Pattern> {
        self.session.as_ref().map(|session| &session.pattern)
    }

    /// Resolved column names, once set up.
    pub fn schema(&self) -> Option<&CanonicalSchema> {
        self.session.as_ref().map(|session| &session.schema)
    }

    /// Projection plan, once set up. Sinks are built from this.
    pub fn plan(&self) -> Option<&ProjectionPlan> {
        self.session.as_ref().map(|session| &session.plan)
    }

    /// Pull lines until `capacity` rows were appended to `sink` or the source
    /// ends, returning the number of rows appended.
    ///
    /// Zero means end of data; further calls keep returning zero. A read
    /// failure aborts the batch: rows already appended in this call are
    /// discarded from `sink` and the extractor is left exhausted.
    pub fn next_batch<K>(&mut self, sink: &mut K) -> Result<usize, RegexFormatError>
    where
        K: RowSink + ?Sized,
    {
        match self.state {
            ExtractorState::Ready | ExtractorState::Reading => {}
            ExtractorState::Exhausted | ExtractorState::Closed => return Ok(0),
            ExtractorState::Idle => {
                return Err(RegexFormatError::InvalidState {
                    operation: "read a batch",
                    state: self.state,
                })
            }
        }
        let (Some(session), Some(source)) = (self.session.as_ref(), self.source.as_mut()) else {
            return Err(RegexFormatError::InvalidState {
                operation: "read a batch",
                state: self.state,
            });
        };

        self.state = ExtractorState::Reading;
        self.row_index = 0;
        sink.begin_batch();
        let capacity = self.options.capacity();
        let mut lines_read = 0usize;

        while self.row_index < capacity {
            let line = match source.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.state = ExtractorState::Exhausted;
                    regex_log!(
                        log::Level::Debug,
                        ctx: self.log_ctx,
                        "extractor_exhausted",
                        "last_batch_rows={}",
                        self.row_index,
                    );
                    break;
                }
                Err(err) => {
                    self.state = ExtractorState::Exhausted;
                    sink.discard_pending();
                    regex_log!(
                        log::Level::Warn,
                        ctx: self.log_ctx,
                        "extractor_read_failed",
                        "discarded_rows={} error={}",
                        self.row_index,
                        err,
                    );
                    self.row_index = 0;
                    return Err(RegexFormatError::SourceRead(err));
                }
            };
            lines_read += 1;

            if session.plan.is_count_only() {
                if session.pattern.is_full_match(&line) {
                    sink.append_row(&[None]);
                    self.row_index += 1;
                }
            } else if let Some(captures) = session.pattern.full_match(&line) {
                load_row(&session.plan, &captures, sink);
                self.row_index += 1;
            }
        }

        if self.state == ExtractorState::Reading {
            self.state = ExtractorState::Ready;
        }
        regex_log!(
            log::Level::Trace,
            ctx: self.log_ctx,
            "extractor_batch",
            "rows={} lines_read={} lines_skipped={}",
            self.row_index,
            lines_read,
            lines_read - self.row_index,
        );
        Ok(self.row_index)
    }

    /// Release the line source. Safe to call from any state, any number of
    /// times; release failures are logged and swallowed.
    pub fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            match source.close() {
                Ok(()) => regex_log!(
                    log::Level::Debug,
                    ctx: self.log_ctx,
                    "extractor_closed",
                    "state={:?}",
                    self.state,
                ),
                Err(err) => regex_log!(
                    log::Level::Warn,
                    ctx: self.log_ctx,
                    "extractor_close_failed",
                    "error={}",
                    err,
                ),
            }
        }
        self.state = ExtractorState::Closed;
    }

    /// Iterate Arrow record batches of at most `capacity` rows each.
    ///
    /// The source is closed once it is exhausted or fails.
    pub fn record_batches(self) -> RecordBatches<S> {
        RecordBatches {
            extractor: self,
            sink: None,
            done: false,
        }
    }
}

/// Write the projected values of one matched line into `sink`.
///
/// A plan entry without an index, or a group that did not take part in the
/// match, yields null. A group that matched the empty string yields `""`.
fn load_row<K>(plan: &ProjectionPlan, captures: &Captures<'_>, sink: &mut K)
where
    K: RowSink + ?Sized,
{
    let values = plan
        .entries()
        .iter()
        .map(|entry| {
            entry
                .index
                .and_then(|index| captures.get(index + 1))
                .map(|group| group.as_str())
        })
        .collect::<Vec<_>>();
    sink.append_row(&values);
}

fn diagnostic_event(diagnostic: &schema::SchemaDiagnostic) -> &'static str {
    match diagnostic {
        schema::SchemaDiagnostic::TooFewFieldNames { .. } => "schema_too_few_field_names",
        schema::SchemaDiagnostic::TooManyFieldNames { .. } => "schema_too_many_field_names",
    }
}

/// Iterator of Arrow batches produced by [`LineExtractor::record_batches`].
#[derive(Debug)]
pub struct RecordBatches<S: LineSource> {
    extractor: LineExtractor<S>,
    sink: Option<ArrowSink>,
    done: bool,
}

impl<S: LineSource> RecordBatches<S> {
    /// Underlying extractor.
    pub fn extractor(&self) -> &LineExtractor<S> {
        &self.extractor
    }

    fn finish(&mut self) {
        self.done = true;
        self.extractor.close();
    }
}

impl<S: LineSource> Iterator for RecordBatches<S> {
    type Item = Result<RecordBatch, RegexFormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.sink.is_none() {
            if let Some(plan) = self.extractor.plan() {
                self.sink = Some(ArrowSink::new(plan, self.extractor.options().capacity()));
            }
        }
        let Some(sink) = self.sink.as_mut() else {
            self.done = true;
            return Some(Err(RegexFormatError::InvalidState {
                operation: "read a batch",
                state: self.extractor.state(),
            }));
        };

        match self.extractor.next_batch(sink) {
            Ok(0) => {
                self.finish();
                None
            }
            Ok(_) => Some(sink.finish().map_err(RegexFormatError::from)),
            Err(err) => {
                self.finish();
                Some(Err(err))
            }
        }
    }
}
