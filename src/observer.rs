//! Batch observer: the engine's only notification channel.
//!
//! The engine never depends on a concrete log transport; callers inject
//! an observer (GUI log pane, bot chat, stderr) and the engine reports
//! warnings and progress through it.

use chrono::Local;

/// Severity of an observer message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

/// Capability the engine reports through.
pub trait BatchObserver {
    /// Record one message at the given severity.
    fn record(&self, level: Level, message: &str);

    /// Periodic batch progress (rows completed out of total).
    fn progress(&self, _done: usize, _total: usize) {}
}

/// Observer that discards everything. Default for embedding.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn record(&self, _level: Level, _message: &str) {}
}

/// Observer that prints timestamped lines to stderr.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl BatchObserver for ConsoleObserver {
    fn record(&self, level: Level, message: &str) {
        eprintln!(
            "{} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level.as_str(),
            message
        );
    }

    fn progress(&self, done: usize, total: usize) {
        eprintln!(
            "{} - INFO - processed {}/{} rows",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            done,
            total
        );
    }
}

/// In-memory observer used by unit and integration tests.
#[doc(hidden)]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Observer that captures messages for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingObserver {
        pub messages: Mutex<Vec<(Level, String)>>,
        pub progress_calls: Mutex<Vec<(usize, usize)>>,
    }

    impl BatchObserver for RecordingObserver {
        fn record(&self, level: Level, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push((level, message.to_string()));
        }

        fn progress(&self, done: usize, total: usize) {
            self.progress_calls.lock().unwrap().push((done, total));
        }
    }

    impl RecordingObserver {
        pub fn warnings(&self) -> Vec<String> {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == Level::Warning)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }
}
