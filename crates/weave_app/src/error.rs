//! Error types for weave_app

use std::time::Duration;
use thiserror::Error;
use weave_platform::{PlatformError, WindowId};

/// Errors that can occur in a Weave application
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Toolkit or native window failure
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// The toolkit thread did not confirm a live event loop in time
    #[error("Toolkit did not start within {0:?}")]
    StartupTimeout(Duration),

    /// The toolkit thread panicked
    #[error("Toolkit thread panicked")]
    ToolkitPanicked,

    /// `run` was called on a window that is already realized
    #[error("{0} is already realized")]
    AlreadyRealized(WindowId),

    /// The operation needs a realized window
    #[error("{0} has not been realized")]
    NotRealized(WindowId),

    /// The native window no longer exists
    #[error("{0} has been closed")]
    WindowClosed(WindowId),

    /// Failed to read or parse configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for weave_app operations
pub type Result<T> = std::result::Result<T, AppError>;
