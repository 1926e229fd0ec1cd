//! Platform error types

use std::time::Duration;
use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// Failed to initialize the native toolkit
    #[error("Toolkit initialization failed: {0}")]
    InitFailed(String),

    /// Failed to create or run the event loop
    #[error("Event loop error: {0}")]
    EventLoop(String),

    /// Failed to create a native window
    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    /// The embedded web view failed
    #[error("Web view error: {0}")]
    WebView(String),

    /// The toolkit thread is gone, or dropped the job before running it
    #[error("Toolkit thread disconnected")]
    Disconnected,

    /// A blocking submission was not answered in time
    #[error("Timed out after {0:?} waiting for the toolkit thread")]
    Timeout(Duration),

    /// Platform not supported on this OS or thread
    #[error("Platform not supported: {0}")]
    Unsupported(String),

    /// Generic platform error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
