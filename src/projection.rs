//! Projection planning: which columns a reader materializes, and from which
//! pattern group each one is filled.

use std::{fmt, sync::Arc};

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

use crate::{error::RegexFormatError, schema::CanonicalSchema};

/// Output name of the placeholder entry of a count-only plan.
pub const PLACEHOLDER_COLUMN: &str = "dummy";

/// Reference to a projected column, possibly nested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    path: Vec<String>,
}

impl ColumnRef {
    /// A flat, top-level column.
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            path: vec![name.into()],
        }
    }

    /// A column path such as `a.b`, one segment per nesting level.
    pub fn nested<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Top-level column name.
    pub fn name(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or_default()
    }

    /// Whether the reference addresses a child element.
    pub fn has_child(&self) -> bool {
        self.path.len() > 1
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "`{segment}`")?;
        }
        Ok(())
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::simple(name)
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::simple(name)
    }
}

/// Columns requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionRequest {
    /// No columns, only the row count matters.
    None,
    /// Every canonical column in canonical order.
    All,
    /// Named columns in caller order.
    Subset(Vec<ColumnRef>),
}

impl ProjectionRequest {
    /// Subset request built from flat column names.
    pub fn columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ProjectionRequest::Subset(names.into_iter().map(ColumnRef::simple).collect())
    }
}

/// One output column and the schema position feeding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// Output column name.
    pub name: String,
    /// Canonical column index (group `index + 1`); `None` keeps the column null.
    pub index: Option<usize>,
}

/// Ordered output columns of a reader session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionPlan {
    entries: Vec<PlanEntry>,
    count_only: bool,
}

impl ProjectionPlan {
    /// Plan entries in output order.
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Number of output columns, the placeholder included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: every plan has at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether this plan only counts rows.
    pub fn is_count_only(&self) -> bool {
        self.count_only
    }

    /// Arrow schema of the materialized columns: nullable Utf8 for every
    /// entry, or no fields at all for a count-only plan.
    pub fn arrow_schema(&self) -> SchemaRef {
        if self.count_only {
            return Arc::new(Schema::empty());
        }
        let fields = self
            .entries
            .iter()
            .map(|entry| Field::new(entry.name.clone(), DataType::Utf8, true))
            .collect::<Vec<_>>();
        Arc::new(Schema::new(fields))
    }
}

/// Resolve `request` against `schema`.
///
/// Subset names match canonical names case-insensitively, first match wins;
/// a name without a match becomes an always-null column.
pub fn plan(
    request: &ProjectionRequest,
    schema: &CanonicalSchema,
) -> Result<ProjectionPlan, RegexFormatError> {
    match request {
        ProjectionRequest::None => Ok(ProjectionPlan {
            entries: vec![PlanEntry {
                name: PLACEHOLDER_COLUMN.to_string(),
                index: None,
            }],
            count_only: true,
        }),
        ProjectionRequest::All => Ok(ProjectionPlan {
            entries: schema
                .names()
                .iter()
                .enumerate()
                .map(|(i, name)| PlanEntry {
                    name: name.clone(),
                    index: Some(i),
                })
                .collect(),
            count_only: false,
        }),
        ProjectionRequest::Subset(columns) => {
            debug_assert!(!columns.is_empty(), "subset projection must name a column");
            let mut entries = Vec::with_capacity(columns.len());
            for column in columns {
                if column.has_child() {
                    return Err(RegexFormatError::InvalidColumnSpec {
                        column: column.to_string(),
                    });
                }
                let name = column.name();
                entries.push(PlanEntry {
                    name: name.to_string(),
                    index: schema.position_ignore_case(name),
                });
            }
            Ok(ProjectionPlan {
                entries,
                count_only: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::resolve;

    fn schema(names: &[&str]) -> CanonicalSchema {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        resolve(&names, names.len()).0
    }

    #[test]
    fn none_plan_has_placeholder() {
        let plan = plan(&ProjectionRequest::None, &schema(&["a", "b"])).expect("plan");
        assert!(plan.is_count_only());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.entries()[0].name, PLACEHOLDER_COLUMN);
        assert_eq!(plan.entries()[0].index, None);
        assert!(plan.arrow_schema().fields().is_empty());
    }

    #[test]
    fn all_plan_follows_schema_order() {
        let plan = plan(&ProjectionRequest::All, &schema(&["year", "month", "day"])).expect("plan");
        let indices: Vec<_> = plan.entries().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);

        let arrow = plan.arrow_schema();
        assert_eq!(arrow.fields().len(), 3);
        assert_eq!(arrow.field(1).name(), "month");
        assert!(arrow.field(1).is_nullable());
        assert_eq!(arrow.field(1).data_type(), &DataType::Utf8);
    }

    #[test]
    fn subset_matches_ignoring_case_and_keeps_request_order() {
        let request = ProjectionRequest::columns(["Day", "missing", "MONTH"]);
        let plan = plan(&request, &schema(&["year", "month", "day"])).expect("plan");
        assert_eq!(
            plan.entries(),
            &[
                PlanEntry {
                    name: "Day".to_string(),
                    index: Some(2),
                },
                PlanEntry {
                    name: "missing".to_string(),
                    index: None,
                },
                PlanEntry {
                    name: "MONTH".to_string(),
                    index: Some(1),
                },
            ]
        );
    }

    #[test]
    fn subset_first_match_wins() {
        let request = ProjectionRequest::columns(["a"]);
        let plan = plan(&request, &schema(&["A", "a"])).expect("plan");
        assert_eq!(plan.entries()[0].index, Some(0));
    }

    #[test]
    fn nested_columns_are_rejected() {
        let request = ProjectionRequest::Subset(vec![
            ColumnRef::simple("a"),
            ColumnRef::nested(["a", "b"]),
        ]);
        let err = plan(&request, &schema(&["a"])).expect_err("nested column");
        match err {
            RegexFormatError::InvalidColumnSpec { column } => assert_eq!(column, "`a`.`b`"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
