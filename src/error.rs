//! Error types for the eventlogger library.

use thiserror::Error;

/// The main error type for eventlogger operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection is not established.
    #[error("not connected")]
    NotConnected,

    /// A simulated click was requested with a hold time above the safe limit.
    ///
    /// Rejected before any command is sent; a too-long closure can damage
    /// whatever the switch output drives.
    #[error("click duration {requested_ms}ms exceeds the {max_ms}ms limit")]
    ClickTooLong { requested_ms: u64, max_ms: u64 },

    /// A sampling window closed without collecting any samples, so the
    /// requested average is undefined.
    #[error("no samples collected within the sampling window")]
    EmptyWindow,
}

/// Result type alias for eventlogger operations.
pub type Result<T> = std::result::Result<T, Error>;
