//! Call events emitted by [`LoggingFileManager`] and the sinks that record them.
//!
//! Provides:
//! - [`CallEvent`]: one entry/exit/failure record for an intercepted call.
//! - [`CallSink`]: where events go, with a level check so callers can skip
//!   expensive rendering.
//! - [`TracingSink`]: the default; emits through `tracing`.
//! - [`MemorySink`]: keeps events in memory for inspection.
//! - [`JsonlSink`]: writes one JSON object per line to any writer.
//!
//! [`LoggingFileManager`]: super::LoggingFileManager

use std::io::Write;
use std::path::Path;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::Level;

/// `tracing` target used by [`TracingSink`].
pub const TRACING_TARGET: &str = "compile_assert::filemanagers";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Which point of an intercepted call an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallEventKind {
    Entry,
    ExitNormal,
    ExitVoid,
    ExitExceptional,
}

impl CallEventKind {
    /// Entry and failure events are always louder than normal exits.
    #[must_use]
    pub const fn level(self) -> Level {
        match self {
            Self::Entry | Self::ExitExceptional => Level::INFO,
            Self::ExitNormal | Self::ExitVoid => Level::DEBUG,
        }
    }
}

/// A single logged point of an intercepted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEvent {
    pub kind: CallEventKind,
    pub thread: u64,
    pub depth: u32,
    pub return_type: String,
    pub operation: String,
    pub param_types: String,
    /// Rendered arguments (entry only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    /// Call-site stack, one `\n\t`-prefixed frame per line (entry only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    /// Rendered result (normal exit only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Rendered failure (exceptional exit only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallEvent {
    #[must_use]
    pub fn level(&self) -> Level {
        self.kind.level()
    }

    /// The human-readable log line for this event.
    ///
    /// Failures are not part of the line; sinks attach them separately.
    #[must_use]
    pub fn message(&self) -> String {
        let signature = format!(
            "[thread={}, depth={}] {} {}({})",
            self.thread, self.depth, self.return_type, self.operation, self.param_types
        );
        match self.kind {
            CallEventKind::Entry => format!(
                ">>> {signature} called with ({}){}",
                self.arguments.as_deref().unwrap_or_default(),
                self.stack_trace.as_deref().unwrap_or_default()
            ),
            CallEventKind::ExitVoid => format!("<<< {signature} completed"),
            CallEventKind::ExitNormal => format!(
                "<<< {signature} returned {}",
                self.result.as_deref().unwrap_or_default()
            ),
            CallEventKind::ExitExceptional => format!("!!! {signature} threw exception"),
        }
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Destination for call events.
pub trait CallSink: Send + Sync {
    /// Whether events at `level` would be recorded.
    fn enabled(&self, level: Level) -> bool;

    fn record(&self, event: CallEvent);
}

/// Emits events through the `tracing` macros under [`TRACING_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl CallSink for TracingSink {
    fn enabled(&self, level: Level) -> bool {
        // `enabled!` needs a constant level per callsite.
        if level == Level::ERROR {
            tracing::enabled!(target: TRACING_TARGET, Level::ERROR)
        } else if level == Level::WARN {
            tracing::enabled!(target: TRACING_TARGET, Level::WARN)
        } else if level == Level::INFO {
            tracing::enabled!(target: TRACING_TARGET, Level::INFO)
        } else if level == Level::DEBUG {
            tracing::enabled!(target: TRACING_TARGET, Level::DEBUG)
        } else {
            tracing::enabled!(target: TRACING_TARGET, Level::TRACE)
        }
    }

    fn record(&self, event: CallEvent) {
        let message = event.message();
        let error = event.error.as_deref();
        // Same constraint for `event!`; the failure travels as a field.
        let level = event.level();
        if level == Level::ERROR {
            tracing::event!(target: TRACING_TARGET, Level::ERROR, error, "{message}");
        } else if level == Level::WARN {
            tracing::event!(target: TRACING_TARGET, Level::WARN, error, "{message}");
        } else if level == Level::INFO {
            tracing::event!(target: TRACING_TARGET, Level::INFO, error, "{message}");
        } else if level == Level::DEBUG {
            tracing::event!(target: TRACING_TARGET, Level::DEBUG, error, "{message}");
        } else {
            tracing::event!(target: TRACING_TARGET, Level::TRACE, error, "{message}");
        }
    }
}

/// Keeps every recorded event in memory.
#[derive(Debug)]
pub struct MemorySink {
    max_level: Level,
    events: Mutex<Vec<CallEvent>>,
}

impl MemorySink {
    /// A sink recording events at every level.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_level(Level::TRACE)
    }

    /// A sink recording only events at `max_level` or more severe.
    #[must_use]
    pub fn with_max_level(max_level: Level) -> Self {
        Self {
            max_level,
            events: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn events(&self) -> Vec<CallEvent> {
        self.events.lock().clone()
    }

    /// Rendered log lines, in recording order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.events.lock().iter().map(CallEvent::message).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl CallSink for MemorySink {
    fn enabled(&self, level: Level) -> bool {
        level <= self.max_level
    }

    fn record(&self, event: CallEvent) {
        if self.enabled(event.level()) {
            self.events.lock().push(event);
        }
    }
}

/// Writes events as JSONL to a file or any other writer.
pub struct JsonlSink {
    max_level: Level,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonlSink {
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, max_level: Level) -> Self {
        Self {
            max_level,
            writer: Mutex::new(writer),
        }
    }

    /// Create a sink that writes to a file.
    pub fn to_file(path: &Path, max_level: Level) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(std::io::BufWriter::new(file)), max_level))
    }

    /// Flush the underlying writer.
    pub fn flush(&self) -> std::io::Result<()> {
        self.writer.lock().flush()
    }
}

impl std::fmt::Debug for JsonlSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlSink")
            .field("max_level", &self.max_level)
            .finish_non_exhaustive()
    }
}

impl CallSink for JsonlSink {
    fn enabled(&self, level: Level) -> bool {
        level <= self.max_level
    }

    fn record(&self, event: CallEvent) {
        if !self.enabled(event.level()) {
            return;
        }
        // A broken log writer must not disturb the intercepted call.
        match event.to_jsonl() {
            Ok(line) => {
                if let Err(err) = writeln!(self.writer.lock(), "{line}") {
                    tracing::warn!(target: TRACING_TARGET, %err, "failed to write call event");
                }
            }
            Err(err) => {
                tracing::warn!(target: TRACING_TARGET, %err, "failed to serialize call event");
            }
        }
    }
}
