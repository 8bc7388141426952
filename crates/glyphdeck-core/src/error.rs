//! Error types for glyphdeck core facilities.

use std::fmt;

/// The error type for core operations.
#[derive(Debug)]
pub enum CoreError {
    /// The worker thread could not be spawned.
    WorkerSpawn(String),
    /// The worker has been stopped and no longer accepts tasks.
    WorkerStopped,
    /// The worker's task queue is full.
    QueueFull,
    /// The tracing subscriber could not be installed.
    LoggingInit(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkerSpawn(msg) => write!(f, "Failed to spawn worker thread: {msg}"),
            Self::WorkerStopped => write!(f, "Worker has been stopped"),
            Self::QueueFull => write!(f, "Worker task queue is full"),
            Self::LoggingInit(msg) => write!(f, "Failed to initialize logging: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
