//! Compiled line patterns.

use regex::{Captures, Regex};

use crate::error::RegexFormatError;

/// Immutable compiled expression plus its capturing group count.
///
/// Matching is always against the whole line: the expression is compiled a
/// second time wrapped in `^(?:...)$` so partial matches never count.
#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    anchored: Regex,
    group_count: usize,
}

impl Pattern {
    /// Compile `text`, requiring at least one capturing group.
    pub fn compile(text: &str) -> Result<Self, RegexFormatError> {
        let regex = Regex::new(text).map_err(|err| RegexFormatError::invalid_pattern(text, err))?;

        // Slot 0 is the implicit whole-match group.
        let group_count = regex.captures_len() - 1;
        if group_count == 0 {
            return Err(RegexFormatError::NoCapturingGroups {
                pattern: text.to_string(),
            });
        }

        let anchored = anchor(text)?;
        debug_assert_eq!(anchored.captures_len(), regex.captures_len());

        Ok(Self {
            text: text.to_string(),
            anchored,
            group_count,
        })
    }

    /// Number of capturing groups, excluding the whole match.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Pattern text as configured.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Match `line` in its entirety, returning the captures on success.
    pub fn full_match<'l>(&self, line: &'l str) -> Option<Captures<'l>> {
        self.anchored.captures(line)
    }

    /// Whether `line` matches in its entirety, without resolving groups.
    pub fn is_full_match(&self, line: &str) -> bool {
        self.anchored.is_match(line)
    }
}

/// Wrap an already validated expression so it only matches whole lines.
///
/// In verbose mode a trailing `#` comment runs to the end of the text and
/// would swallow the closing anchor, so it is terminated with a newline.
fn anchor(text: &str) -> Result<Regex, RegexFormatError> {
    Regex::new(&format!("^(?:{text})$"))
        .or_else(|_| Regex::new(&format!("^(?:{text}\n)$")))
        .map_err(|err| RegexFormatError::InvalidPattern {
            pattern: text.to_string(),
            reason: "expression cannot be anchored to the whole line".to_string(),
            source: Some(err),
        })
}
