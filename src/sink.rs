//! Column sinks receiving extracted rows.

use std::sync::Arc;

use arrow::{
    array::{ArrayRef, RecordBatch, RecordBatchOptions, StringBuilder},
    datatypes::SchemaRef,
    error::ArrowError,
};

use crate::projection::ProjectionPlan;

/// Average bytes reserved per value when preallocating string columns.
const VALUE_BYTES_HINT: usize = 8;

/// Upper bound on rows preallocated per column; builders grow past it on demand.
const MAX_PREALLOCATED_ROWS: usize = 64 * 1024;

/// Consumer of extracted rows, one nullable value per plan entry.
///
/// The extractor calls [`RowSink::begin_batch`] before the first row of every
/// batch and [`RowSink::discard_pending`] when that batch fails, so a sink
/// never keeps rows of an aborted batch.
pub trait RowSink {
    /// Append one row; `values` is in plan order.
    fn append_row(&mut self, values: &[Option<&str>]);

    /// Remember the current position as the start of a new batch.
    fn begin_batch(&mut self) {}

    /// Drop every row appended since the last [`RowSink::begin_batch`].
    fn discard_pending(&mut self) {}
}

impl<K: RowSink + ?Sized> RowSink for &mut K {
    fn append_row(&mut self, values: &[Option<&str>]) {
        (**self).append_row(values)
    }

    fn begin_batch(&mut self) {
        (**self).begin_batch()
    }

    fn discard_pending(&mut self) {
        (**self).discard_pending()
    }
}

/// Builds Arrow `RecordBatch` values with one nullable Utf8 column per
/// plan entry.
#[derive(Debug)]
pub struct ArrowSink {
    schema: SchemaRef,
    builders: Vec<StringBuilder>,
    rows: usize,
    batch_start: usize,
}

impl ArrowSink {
    /// Preallocate columns for `plan`, sized for `capacity` rows.
    ///
    /// The preallocation is capped; very large capacities only bound the
    /// batch size, not the memory reserved up front.
    pub fn new(plan: &ProjectionPlan, capacity: usize) -> Self {
        let schema = plan.arrow_schema();
        let rows = capacity.min(MAX_PREALLOCATED_ROWS);
        let bytes = rows.saturating_mul(VALUE_BYTES_HINT);
        let builders = (0..schema.fields().len())
            .map(|_| StringBuilder::with_capacity(rows, bytes))
            .collect();
        Self {
            schema,
            builders,
            rows: 0,
            batch_start: 0,
        }
    }

    /// Schema of the batches this sink produces.
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Rows appended since the last [`ArrowSink::finish`].
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether no rows are pending.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Drain the pending rows into a batch and reset the builders.
    pub fn finish(&mut self) -> Result<RecordBatch, ArrowError> {
        let rows = std::mem::take(&mut self.rows);
        self.batch_start = 0;
        let columns = self
            .builders
            .iter_mut()
            .map(|builder| Arc::new(builder.finish()) as ArrayRef)
            .collect::<Vec<_>>();
        let options = RecordBatchOptions::new().with_row_count(Some(rows));
        RecordBatch::try_new_with_options(Arc::clone(&self.schema), columns, &options)
    }
}

impl RowSink for ArrowSink {
    fn append_row(&mut self, values: &[Option<&str>]) {
        // Count-only sinks have no builders and only track rows.
        for (builder, value) in self.builders.iter_mut().zip(values) {
            builder.append_option(*value);
        }
        self.rows += 1;
    }

    fn begin_batch(&mut self) {
        self.batch_start = self.rows;
    }

    fn discard_pending(&mut self) {
        if self.rows == self.batch_start {
            return;
        }
        let keep = self.batch_start;
        for builder in &mut self.builders {
            let values = builder.finish();
            builder.extend(values.iter().take(keep));
        }
        self.rows = keep;
    }
}

/// Collects rows as owned values.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VecSink {
    rows: Vec<Vec<Option<String>>>,
    batch_start: usize,
}

impl VecSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows collected so far.
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Take the collected rows, leaving the sink empty.
    pub fn take(&mut self) -> Vec<Vec<Option<String>>> {
        self.batch_start = 0;
        std::mem::take(&mut self.rows)
    }
}

impl RowSink for VecSink {
    fn append_row(&mut self, values: &[Option<&str>]) {
        self.rows
            .push(values.iter().map(|value| value.map(str::to_string)).collect());
    }

    fn begin_batch(&mut self) {
        self.batch_start = self.rows.len();
    }

    fn discard_pending(&mut self) {
        self.rows.truncate(self.batch_start);
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::{Array, AsArray};

    use super::*;
    use crate::{
        projection::{plan, ProjectionRequest},
        schema::resolve,
    };

    fn plan_for(request: ProjectionRequest) -> ProjectionPlan {
        let names = vec!["a".to_string(), "b".to_string()];
        let (schema, _) = resolve(&names, 2);
        plan(&request, &schema).expect("plan")
    }

    #[test]
    fn arrow_sink_builds_nullable_columns() {
        let mut sink = ArrowSink::new(&plan_for(ProjectionRequest::All), 4);
        sink.append_row(&[Some("1"), None]);
        sink.append_row(&[Some(""), Some("2")]);
        assert_eq!(sink.len(), 2);

        let batch = sink.finish().expect("batch");
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).name(), "a");

        let a = batch.column(0).as_string::<i32>();
        let b = batch.column(1).as_string::<i32>();
        assert_eq!(a.value(0), "1");
        assert!(!a.is_null(1));
        assert_eq!(a.value(1), "");
        assert!(b.is_null(0));
        assert_eq!(b.value(1), "2");

        assert!(sink.is_empty());
        let batch = sink.finish().expect("empty batch");
        assert_eq!(batch.num_rows(), 0);
    }

    #[test]
    fn count_only_sink_tracks_rows_without_columns() {
        let mut sink = ArrowSink::new(&plan_for(ProjectionRequest::None), 4);
        sink.append_row(&[None]);
        sink.append_row(&[None]);
        sink.append_row(&[None]);

        let batch = sink.finish().expect("batch");
        assert_eq!(batch.num_columns(), 0);
        assert_eq!(batch.num_rows(), 3);
    }

    #[test]
    fn arrow_sink_discards_only_the_failed_batch() {
        let mut sink = ArrowSink::new(&plan_for(ProjectionRequest::All), 4);
        sink.begin_batch();
        sink.append_row(&[Some("kept"), None]);
        sink.begin_batch();
        sink.append_row(&[Some("x"), Some("y")]);
        sink.append_row(&[None, Some("z")]);
        sink.discard_pending();
        assert_eq!(sink.len(), 1);

        let batch = sink.finish().expect("batch");
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.column(0).as_string::<i32>().value(0), "kept");
        assert!(batch.column(1).is_null(0));

        sink.begin_batch();
        sink.append_row(&[Some("x"), Some("y")]);
        sink.discard_pending();
        assert!(sink.is_empty());
        assert_eq!(sink.finish().expect("empty batch").num_rows(), 0);
    }

    #[test]
    fn huge_capacity_does_not_overflow_preallocation() {
        let mut sink = ArrowSink::new(&plan_for(ProjectionRequest::All), usize::MAX / 2);
        sink.append_row(&[Some("a"), Some("b")]);
        assert_eq!(sink.finish().expect("batch").num_rows(), 1);
    }

    #[test]
    fn vec_sink_discards_pending_rows() {
        let mut sink = VecSink::new();
        sink.begin_batch();
        sink.append_row(&[Some("kept")]);
        sink.begin_batch();
        sink.append_row(&[Some("dropped")]);
        sink.discard_pending();
        assert_eq!(sink.rows(), &[vec![Some("kept".to_string())]]);
    }

    #[test]
    fn vec_sink_collects_owned_rows() {
        let mut sink = VecSink::new();
        sink.append_row(&[Some("x"), None]);
        assert_eq!(sink.take(), vec![vec![Some("x".to_string()), None]]);
        assert!(sink.rows().is_empty());
    }
}
