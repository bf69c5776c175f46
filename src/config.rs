//! Format configuration and reader options.
//!
//! The field list travels as a single comma-separated string so the whole
//! configuration stays a flat, serializable record:
//!
//! ```text
//! year, month, day
//! ```
//!
//! Any amount of whitespace may surround each comma. Nothing here is validated
//! on construction; the extractor compiles and checks the configuration when it
//! is set up.

use serde::{Deserialize, Serialize};

/// Number of rows a columnar sink preallocates per batch by default.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// Serializable configuration of the regex line format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexFormatConfig {
    /// Expression every record line must fully match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    /// Comma-separated column names, one per capturing group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    /// File suffix the format applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl RegexFormatConfig {
    /// Start a configuration for `regex` with no field names or extension.
    pub fn new(regex: impl Into<String>) -> Self {
        Self {
            regex: Some(regex.into()),
            ..Self::default()
        }
    }

    /// Set the comma-separated field name list.
    pub fn with_fields(self, fields: impl Into<String>) -> Self {
        Self {
            fields: Some(fields.into()),
            ..self
        }
    }

    /// Set the file extension this format is registered for.
    pub fn with_extension(self, extension: impl Into<String>) -> Self {
        Self {
            extension: Some(extension.into()),
            ..self
        }
    }

    /// Configured expression text, if any.
    pub fn regex(&self) -> Option<&str> {
        self.regex.as_deref()
    }

    /// Split the configured field string into trimmed, possibly empty names.
    ///
    /// Empty slots are kept so that `"a,,b"` still assigns `b` to the third
    /// group. A missing or blank field string yields no names at all.
    pub fn field_names(&self) -> Vec<String> {
        match self.fields.as_deref() {
            Some(fields) if !fields.trim().is_empty() => fields
                .split(',')
                .map(|name| name.trim().to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether `file_name` carries the configured extension.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        match self.extension.as_deref() {
            Some(extension) if !extension.is_empty() => file_name
                .strip_suffix(extension)
                .and_then(|stem| stem.strip_suffix('.'))
                .is_some_and(|stem| !stem.is_empty()),
            _ => false,
        }
    }
}

/// Runtime options of a reader session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    pub(crate) batch_size: usize,
    pub(crate) label: Option<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            batch_size: DEFAULT_BATCH_SIZE,
            label: None,
        }
    }
}

impl ReaderOptions {
    /// Maximum rows produced per batch; zero is treated as one.
    pub fn batch_size(self, batch_size: usize) -> Self {
        ReaderOptions {
            batch_size: batch_size.max(1),
            ..self
        }
    }

    /// Name of the input (file, partition) attached to every log line.
    pub fn label(self, label: impl Into<String>) -> Self {
        ReaderOptions {
            label: Some(label.into()),
            ..self
        }
    }

    /// Configured batch capacity.
    pub fn capacity(&self) -> usize {
        self.batch_size
    }
}
