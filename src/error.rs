//! Error types for the motion pipeline.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context. The taxonomy mirrors where failures happen:
//!
//! - **Discovery Errors**: no attached device matched the driver registry
//! - **Port Errors**: the serial endpoint could not be opened
//! - **Transport Errors**: communication failed after a session was streaming
//! - **Parse Errors**: a single malformed device line; recovered locally
//! - **Init Errors**: a setup command write failed under the strict policy
//! - **File Errors**: a replay capture could not be read
//!
//! An underfilled history buffer is deliberately *not* an error: it is the
//! [`Decision::Warmup`](crate::types::Decision) variant, a typed "no decision
//! yet" result.
//!
//! ## Recovery
//!
//! Errors report whether they are worth retrying:
//!
//! ```rust
//! use stillpoint::MotionError;
//!
//! let error = MotionError::transport_failed("device stopped responding");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {suggestion}");
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T, E = MotionError> = std::result::Result<T, E>;

/// Main error type for motion pipeline operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MotionError {
    #[error("no compatible device with a registered driver was found ({scanned} endpoints scanned)")]
    NoCompatibleDevice { scanned: usize },

    #[error("failed to open serial port {path}")]
    Port {
        path: String,
        #[source]
        source: tokio_serial::Error,
    },

    #[error("transport failure: {reason}")]
    Transport {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{protocol} parse error: {details} (line: {line:?})")]
    Parse { protocol: &'static str, line: String, details: String },

    #[error("device init command {command:?} failed")]
    Init {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("capture file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session is closed")]
    Closed,
}

impl MotionError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            MotionError::NoCompatibleDevice { .. } => true,
            MotionError::Port { .. } => true,
            MotionError::Transport { .. } => true,
            MotionError::Init { .. } => true,
            MotionError::Parse { .. } => false,
            MotionError::File { .. } => false,
            MotionError::Closed => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            MotionError::NoCompatibleDevice { .. } => vec![
                "Check the tracker is plugged in and powered",
                "Verify the port path is registered in the device registry",
                "List available endpoints and compare against registry keys",
            ],
            MotionError::Port { .. } => vec![
                "Check the port is not held open by another process",
                "Verify serial permissions (dialout group on Linux)",
                "Confirm the port path still exists",
            ],
            MotionError::Transport { .. } => vec![
                "Check cabling and device power",
                "Restart the tracker and discover again",
            ],
            MotionError::Parse { .. } => vec![
                "Verify the registered driver matches the attached hardware",
                "Check the device output mode is continuous ASCII",
            ],
            MotionError::Init { .. } => vec![
                "Power-cycle the device and retry initialization",
                "Use best-effort init policy if the device tolerates partial setup",
            ],
            MotionError::File { .. } => vec![
                "Check the capture file exists and is readable",
                "Verify the capture is newline-delimited device output",
            ],
            MotionError::Closed => vec!["Discover a new session; closed sessions cannot be reused"],
        }
    }

    /// Helper constructor for transport errors.
    pub fn transport_failed(reason: impl Into<String>) -> Self {
        MotionError::Transport { reason: reason.into(), source: None }
    }

    /// Helper constructor for transport errors with a source.
    pub fn transport_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        MotionError::Transport { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for per-line parse errors.
    pub fn parse_error(
        protocol: &'static str,
        line: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        MotionError::Parse { protocol, line: line.into(), details: details.into() }
    }

    /// Helper constructor for capture file errors.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        MotionError::File { path, source }
    }
}

impl From<std::io::Error> for MotionError {
    fn from(err: std::io::Error) -> Self {
        MotionError::Transport { reason: err.to_string(), source: Some(Box::new(err)) }
    }
}
