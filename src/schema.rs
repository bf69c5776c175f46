//! Canonical column naming for pattern groups.
//!
//! Group `i + 1` of the pattern always feeds column `i`. Names come from the
//! configured field list where a non-empty name exists for the slot, and fall
//! back to `Column$i` otherwise.

use std::{fmt, ops::Index};

/// Ordered column names, exactly one per capturing group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSchema {
    names: Box<[String]>,
}

impl CanonicalSchema {
    /// Number of columns (equal to the pattern's group count).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the schema has no columns. Never true for a compiled pattern.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column names in group order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of the first column whose name equals `name` ignoring case.
    pub fn position_ignore_case(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| eq_ignore_case(candidate, name))
    }
}

impl Index<usize> for CanonicalSchema {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.names[index]
    }
}

/// Advisory findings while resolving names against the group count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDiagnostic {
    /// Fewer names than groups; trailing groups got synthetic names.
    TooFewFieldNames {
        /// Number of configured names.
        field_count: usize,
        /// Number of capturing groups.
        group_count: usize,
        /// Synthetic names that were generated for the missing slots.
        generated: Vec<String>,
    },
    /// More names than groups; the trailing names were dropped.
    TooManyFieldNames {
        /// Number of configured names.
        field_count: usize,
        /// Number of capturing groups.
        group_count: usize,
        /// Names that were discarded.
        discarded: Vec<String>,
    },
}

impl fmt::Display for SchemaDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaDiagnostic::TooFewFieldNames {
                field_count,
                group_count,
                generated,
            } => write!(
                f,
                "column list has fewer names than the pattern has groups, filling extras with \
                 Column$n: column_count={field_count} group_count={group_count} \
                 generated={generated:?}"
            ),
            SchemaDiagnostic::TooManyFieldNames {
                field_count,
                group_count,
                discarded,
            } => write!(
                f,
                "column list has more names than the pattern has groups, extras ignored: \
                 column_count={field_count} group_count={group_count} discarded={discarded:?}"
            ),
        }
    }
}

/// Name of the synthetic column for group slot `index`.
pub fn synthetic_name(index: usize) -> String {
    format!("Column${index}")
}

/// Reconcile `field_names` with `group_count`.
///
/// Always succeeds with exactly `group_count` names; mismatches are reported
/// through the returned diagnostics only.
pub fn resolve(
    field_names: &[String],
    group_count: usize,
) -> (CanonicalSchema, Vec<SchemaDiagnostic>) {
    let names: Box<[String]> = (0..group_count)
        .map(|i| match field_names.get(i) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => synthetic_name(i),
        })
        .collect();

    let mut diagnostics = Vec::new();
    if field_names.len() < group_count {
        diagnostics.push(SchemaDiagnostic::TooFewFieldNames {
            field_count: field_names.len(),
            group_count,
            generated: names[field_names.len()..].to_vec(),
        });
    } else if field_names.len() > group_count {
        diagnostics.push(SchemaDiagnostic::TooManyFieldNames {
            field_count: field_names.len(),
            group_count,
            discarded: field_names[group_count..].to_vec(),
        });
    }

    (CanonicalSchema { names }, diagnostics)
}

/// Case-insensitive name comparison using full Unicode lowercase mapping.
pub(crate) fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.chars()
        .flat_map(char::to_lowercase)
        .eq(right.chars().flat_map(char::to_lowercase))
}
