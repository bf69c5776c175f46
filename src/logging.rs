//! Internal logging helpers for structured regex reader events.

use std::{borrow::Cow, fmt};

/// Single logging target for the regex format reader.
pub(crate) const LOG_TARGET: &str = "regex_format";

/// Common key/value fields appended to every log line of a scope.
///
/// Components start from a static context such as `component=extractor` and
/// extend it per session, for example with the label of the source being read.
#[derive(Clone, Debug)]
pub(crate) struct LogContext {
    common_kv: Cow<'static, str>,
}

impl LogContext {
    /// Build a context that appends the provided key/value pairs.
    pub(crate) const fn new(common_kv: &'static str) -> Self {
        Self {
            common_kv: Cow::Borrowed(common_kv),
        }
    }

    /// Copy of this context with `key=value` appended.
    pub(crate) fn with_field(&self, key: &str, value: impl fmt::Display) -> Self {
        let common_kv = if self.common_kv.is_empty() {
            format!("{key}={value}")
        } else {
            format!("{} {key}={value}", self.common_kv)
        };
        Self {
            common_kv: Cow::Owned(common_kv),
        }
    }

    pub(crate) fn common_kv(&self) -> Option<&str> {
        if self.common_kv.is_empty() {
            None
        } else {
            Some(&*self.common_kv)
        }
    }
}

macro_rules! regex_log {
    ($level:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: crate::logging::LOG_TARGET, $level) {
            log::log!(
                target: crate::logging::LOG_TARGET,
                $level,
                "event={} {}",
                $event,
                format_args!($fmt $(, $args)*)
            );
        }
    }};
    ($level:expr, ctx: $ctx:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: crate::logging::LOG_TARGET, $level) {
            if let Some(common_kv) = $ctx.common_kv() {
                log::log!(
                    target: crate::logging::LOG_TARGET,
                    $level,
                    "event={} {} {}",
                    $event,
                    common_kv,
                    format_args!($fmt $(, $args)*)
                );
            } else {
                log::log!(
                    target: crate::logging::LOG_TARGET,
                    $level,
                    "event={} {}",
                    $event,
                    format_args!($fmt $(, $args)*)
                );
            }
        }
    }};
}

pub(crate) use regex_log;
