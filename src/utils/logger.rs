//! Logger utility for application-wide logging
//!
//! This module provides a custom logger implementation that works alongside
//! the standard log crate, but adds file output capabilities. The same type
//! doubles as an extraction journal: commands record every written image
//! path through [`Logger::log`].

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use log::{Log, Record, Level, Metadata, LevelFilter};

/// Custom logger implementation
///
/// Clones share the same file handle.
#[derive(Clone)]
pub struct Logger {
    /// File handle for log output
    file: Arc<Mutex<Option<File>>>,
    /// Most verbose level passed through the log facade
    level: Level,
}

impl Logger {
    /// Creates a new logger instance
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the log file
    ///
    /// # Returns
    ///
    /// A new Logger instance or an error if the file cannot be created
    pub fn new(log_file: &Path) -> io::Result<Self> {
        let file = File::create(log_file)?;
        Ok(Logger {
            file: Arc::new(Mutex::new(Some(file))),
            level: Level::Info,
        })
    }

    /// Creates a logger without a file; journal entries are discarded
    pub fn disabled() -> Self {
        Logger {
            file: Arc::new(Mutex::new(None)),
            level: Level::Info,
        }
    }

    /// Set the most verbose level passed through the log facade
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Whether messages are written to a file
    pub fn has_file(&self) -> bool {
        self.file
            .lock()
            .map(|file| file.is_some())
            .unwrap_or(false)
    }

    /// Logs a message to the log file
    ///
    /// # Arguments
    ///
    /// * `message` - The message to log
    pub fn log(&self, message: &str) -> io::Result<()> {
        let mut guard = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(file) = guard.as_mut() {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Initialize the global logger
    ///
    /// When this logger has a file, records go through a clone of it that
    /// writes them to the file and echoes them to stderr. Otherwise
    /// `env_logger` writes to stderr.
    ///
    /// # Arguments
    ///
    /// * `verbose` - Log debug records as well
    pub fn init_global_logger(&self, verbose: bool) {
        let level = if verbose { Level::Debug } else { Level::Info };

        let installed = if self.has_file() {
            let global_logger = self.clone().with_level(level);
            let result = log::set_boxed_logger(Box::new(global_logger));
            log::set_max_level(level.to_level_filter());
            result.is_ok()
        } else {
            let filter = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
            env_logger::Builder::new()
                .filter_level(filter)
                .target(env_logger::Target::Stderr)
                .format_timestamp(None)
                .try_init()
                .is_ok()
        };

        // Only called once at startup
        if !installed {
            eprintln!("Warning: Global logger was already initialized");
        }
    }
}

// Implement the Log trait to make our Logger work with the log crate
impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}", record.level(), record.args());
            let _ = self.log(&message);

            // Also print to console; stdout is reserved for image paths
            eprintln!("{}", message);
        }
    }

    fn flush(&self) {
        // Already flushing in the log method
    }
}
