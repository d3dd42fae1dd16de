//! File-manager logging configuration.
//!
//! The default mode is read from the `COMPILE_ASSERT_FILE_MANAGER_LOGGING`
//! environment variable:
//! - `disabled` (default): the file manager is used as-is.
//! - `enabled`: every call is logged through a [`LoggingFileManager`].
//! - `stacktraces`: as `enabled`, with the call-site stack on each entry line.
//!
//! [`LoggingFileManager`]: crate::filemanagers::LoggingFileManager

use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Name of the environment variable holding the default [`LoggingMode`].
pub const LOGGING_MODE_ENV: &str = "COMPILE_ASSERT_FILE_MANAGER_LOGGING";

/// How calls against a file manager are logged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingMode {
    Enabled,
    #[serde(alias = "stack_traces")]
    StackTraces,
    #[default]
    Disabled,
}

impl LoggingMode {
    /// Parse from string (case-insensitive). Unknown values disable logging.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "enabled" | "on" | "true" | "1" | "log" => Self::Enabled,
            "stacktraces" | "stack_traces" | "stack-traces" | "trace" | "full" => {
                Self::StackTraces
            }
            _ => Self::Disabled,
        }
    }

    /// Canonical configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::StackTraces => "stacktraces",
            Self::Disabled => "disabled",
        }
    }

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }

    #[must_use]
    pub const fn stack_traces(self) -> bool {
        matches!(self, Self::StackTraces)
    }
}

impl std::fmt::Display for LoggingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// 0=unresolved, otherwise one of the MODE_* values.
static CACHED_MODE: AtomicU8 = AtomicU8::new(MODE_UNRESOLVED);

const MODE_UNRESOLVED: u8 = 0;
const MODE_ENABLED: u8 = 1;
const MODE_STACK_TRACES: u8 = 2;
const MODE_DISABLED: u8 = 3;

fn mode_to_u8(mode: LoggingMode) -> u8 {
    match mode {
        LoggingMode::Enabled => MODE_ENABLED,
        LoggingMode::StackTraces => MODE_STACK_TRACES,
        LoggingMode::Disabled => MODE_DISABLED,
    }
}

fn u8_to_mode(v: u8) -> LoggingMode {
    match v {
        MODE_ENABLED => LoggingMode::Enabled,
        MODE_STACK_TRACES => LoggingMode::StackTraces,
        _ => LoggingMode::Disabled,
    }
}

/// Process-wide default logging mode (reads the environment on first call,
/// cached thereafter).
#[must_use]
pub fn logging_mode() -> LoggingMode {
    let cached = CACHED_MODE.load(Ordering::Acquire);
    if cached != MODE_UNRESOLVED {
        return u8_to_mode(cached);
    }

    let mode = std::env::var(LOGGING_MODE_ENV)
        .map(|v| LoggingMode::from_str_loose(&v))
        .unwrap_or_default();
    // Racing resolvers read the same environment, so the first store wins
    // with an identical value.
    let _ = CACHED_MODE.compare_exchange(
        MODE_UNRESOLVED,
        mode_to_u8(mode),
        Ordering::AcqRel,
        Ordering::Acquire,
    );
    u8_to_mode(CACHED_MODE.load(Ordering::Acquire))
}

/// Override the process-wide default logging mode.
pub fn set_logging_mode(mode: LoggingMode) {
    CACHED_MODE.store(mode_to_u8(mode), Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_logging_modes() {
        assert_eq!(LoggingMode::from_str_loose("enabled"), LoggingMode::Enabled);
        assert_eq!(LoggingMode::from_str_loose("ON"), LoggingMode::Enabled);
        assert_eq!(
            LoggingMode::from_str_loose("StackTraces"),
            LoggingMode::StackTraces
        );
        assert_eq!(
            LoggingMode::from_str_loose("stack-traces"),
            LoggingMode::StackTraces
        );
        assert_eq!(LoggingMode::from_str_loose("disabled"), LoggingMode::Disabled);
        assert_eq!(LoggingMode::from_str_loose("bogus"), LoggingMode::Disabled);
        for mode in [LoggingMode::Enabled, LoggingMode::StackTraces, LoggingMode::Disabled] {
            assert_eq!(LoggingMode::from_str_loose(mode.as_str()), mode);
        }
    }

    #[test]
    fn default_is_disabled() {
        assert_eq!(LoggingMode::default(), LoggingMode::Disabled);
        assert!(!LoggingMode::Disabled.is_enabled());
        assert!(LoggingMode::Enabled.is_enabled());
        assert!(!LoggingMode::Enabled.stack_traces());
        assert!(LoggingMode::StackTraces.stack_traces());
    }

    #[test]
    fn cached_mode_is_sticky_until_overridden() {
        let previous = CACHED_MODE.swap(MODE_ENABLED, Ordering::SeqCst);
        assert_eq!(logging_mode(), LoggingMode::Enabled);

        set_logging_mode(LoggingMode::StackTraces);
        assert_eq!(logging_mode(), LoggingMode::StackTraces);

        CACHED_MODE.store(previous, Ordering::SeqCst);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let mode: LoggingMode = serde_json::from_str(r#""stacktraces""#).unwrap();
        assert_eq!(mode, LoggingMode::StackTraces);
        assert_eq!(
            serde_json::to_string(&LoggingMode::Enabled).unwrap(),
            r#""enabled""#
        );
    }
}
