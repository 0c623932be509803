//! Logging facility shared by every command.
//!
//! One global subscriber, installed on first use, with two sinks:
//!
//! - a console sink on stdout, threshold INFO, raised to DEBUG when the
//!   reserved `--verbose` flag is seen;
//! - an optional file sink, attachable and detachable at runtime, threshold
//!   INFO, writing either to a daily-rotated file or to a caller-supplied
//!   writer.
//!
//! Both sinks share one line format: timestamp, level, message. Runtime
//! changes go through `tracing_subscriber::reload` handles, so attaching a
//! sink never tears down the subscriber.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{Filtered, LevelFilter};
use tracing_subscriber::layer::{Layer, Layered, SubscriberExt};
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as fmt_layer, reload};

use crate::error::LoggingError;

/// Rotated log generations kept per file target.
const MAX_LOG_GENERATIONS: usize = 7;

// ============================================================================
// Global subscriber
// ============================================================================

/// A built file sink, ready to occupy the reloadable slot.
type FileLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// The swappable file sink. `None` means console-only logging.
type FileSlot = Option<FileLayer>;

/// The file slot behind its fixed INFO threshold, as installed in the stack.
type FilteredSlot = Filtered<reload::Layer<FileSlot, Registry>, LevelFilter, Registry>;

/// Subscriber stack the console sink sits on: registry plus the file slot.
type ConsoleBase = Layered<FilteredSlot, Registry>;

/// Type-erased reload handles into the installed stack.
struct Handles {
    console: Box<dyn Fn(LevelFilter) + Send + Sync>,
    file: Box<dyn Fn(FileSlot) + Send + Sync>,
}

static CONSOLE_VERBOSE: AtomicBool = AtomicBool::new(false);

static HANDLES: Lazy<Handles> = Lazy::new(|| {
    let (file_slot, file_handle): (
        reload::Layer<FileSlot, Registry>,
        reload::Handle<FileSlot, Registry>,
    ) = reload::Layer::new(None);
    // The INFO threshold wraps the slot, not the layers swapped into it.
    // Per-layer filters only work when the subscriber registers them at
    // build time, so a filter carried by a swapped-in layer would panic on
    // the first record.
    let file_slot: FilteredSlot = file_slot.with_filter(LevelFilter::INFO);

    let (console_filter, console_handle): (
        reload::Layer<LevelFilter, ConsoleBase>,
        reload::Handle<LevelFilter, ConsoleBase>,
    ) = reload::Layer::new(LevelFilter::INFO);

    let console = fmt_layer::layer()
        .with_target(false)
        .with_writer(std::io::stdout)
        .with_filter(console_filter);

    // At most one subscriber per process. If something else already
    // installed one, the stack is dropped here and the handles below turn
    // into no-ops.
    let _ = Registry::default().with(file_slot).with(console).try_init();

    Handles {
        console: Box::new(move |level| {
            let _ = console_handle.reload(level);
        }),
        file: Box::new(move |slot| {
            let _ = file_handle.reload(slot);
        }),
    }
});

/// Install the global subscriber if it is not up yet. Idempotent.
pub fn init() {
    Lazy::force(&HANDLES);
}

/// Raise or restore the console threshold. Takes effect immediately and
/// stays in effect until toggled again.
pub(crate) fn console_verbose(enabled: bool) {
    CONSOLE_VERBOSE.store(enabled, Ordering::Relaxed);
    let level = if enabled {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    (HANDLES.console)(level);
}

#[cfg(test)]
pub(crate) fn console_is_verbose() -> bool {
    CONSOLE_VERBOSE.load(Ordering::Relaxed)
}

// ============================================================================
// File sink
// ============================================================================

/// Where the file sink writes.
pub enum LogTarget {
    /// A log file path. The sink writes next to it with daily rotation,
    /// keeping a bounded number of dated generations.
    File(PathBuf),
    /// An arbitrary writer, typically an in-memory buffer in tests.
    Writer(Box<dyn Write + Send>),
}

impl LogTarget {
    /// Target a log file path.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        LogTarget::File(path.into())
    }

    /// Target a caller-supplied writer.
    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        LogTarget::Writer(Box::new(writer))
    }
}

/// Attach the file sink, replacing any previously attached one.
///
/// For a path target, missing parent directories are created and records go
/// to a daily-rotated file derived from the path's stem and extension. The
/// sink logs at INFO regardless of the console threshold.
pub fn attach_file_sink(target: LogTarget) -> Result<(), LoggingError> {
    let layer = build_file_layer(target)?;
    (HANDLES.file)(Some(layer));
    Ok(())
}

/// Detach the file sink, restoring console-only logging.
pub fn detach_file_sink() {
    (HANDLES.file)(None);
}

// Returned layers are unfiltered; the slot's threshold covers whatever
// occupies it.
fn build_file_layer(target: LogTarget) -> Result<FileLayer, LoggingError> {
    match target {
        LogTarget::File(path) => {
            if path.file_name().is_none() {
                return Err(LoggingError::InvalidTarget(path));
            }
            let directory = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
                Some(parent) => parent.to_path_buf(),
                None => PathBuf::from("."),
            };
            std::fs::create_dir_all(&directory).map_err(|source| LoggingError::CreateDir {
                path: directory.clone(),
                source,
            })?;

            let mut builder = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(MAX_LOG_GENERATIONS);
            if let Some(stem) = path.file_stem() {
                builder = builder.filename_prefix(stem.to_string_lossy());
            }
            if let Some(extension) = path.extension() {
                builder = builder.filename_suffix(extension.to_string_lossy());
            }
            let appender = builder.build(&directory)?;

            Ok(fmt_layer::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(appender)
                .boxed())
        }
        LogTarget::Writer(writer) => Ok(fmt_layer::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(writer))
            .boxed()),
    }
}

// ============================================================================
// Scoped loggers
// ============================================================================

/// A named logger for one subsystem of a command line program.
///
/// Emits through the shared sinks with a `scope` field carrying the name, so
/// lines from different subsystems stay distinguishable in one stream.
pub struct ScopedLogger {
    name: String,
}

/// Create a logger scoped under `name`.
pub fn scoped(name: impl Into<String>) -> ScopedLogger {
    init();
    ScopedLogger { name: name.into() }
}

impl ScopedLogger {
    /// The scope name records are tagged with.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self, message: impl fmt::Display) {
        tracing::debug!(scope = %self.name, "{message}");
    }

    pub fn info(&self, message: impl fmt::Display) {
        tracing::info!(scope = %self.name, "{message}");
    }

    pub fn warn(&self, message: impl fmt::Display) {
        tracing::warn!(scope = %self.name, "{message}");
    }

    pub fn error(&self, message: impl fmt::Display) {
        tracing::error!(scope = %self.name, "{message}");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_requires_a_file_name() {
        let result = build_file_layer(LogTarget::file(""));
        assert!(matches!(result, Err(LoggingError::InvalidTarget(_))));
    }

    #[test]
    fn test_file_target_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("app.log");

        build_file_layer(LogTarget::file(&nested)).unwrap();
        assert!(nested.parent().unwrap().is_dir());
    }

    #[test]
    fn test_scoped_logger_keeps_its_name() {
        let logger = scoped("worker");
        assert_eq!(logger.name(), "worker");
    }
}
