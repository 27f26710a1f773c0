//! Transport abstraction over newline-delimited device I/O.
//!
//! A [`LineTransport`] is anything that can accept protocol command writes and
//! deliver raw text lines asynchronously, strictly in arrival order:
//!
//! - [`SerialTransport`] wraps a real serial port (the production path)
//! - [`ReplayTransport`] plays back a recorded capture file at a fixed pace
//! - [`MockTransport`] is channel-driven, for tests and hardware-free demos
//!
//! The session layer does not care which one it is running on; every
//! transport gets the same parse/buffer/evaluate treatment.

mod mock;
mod replay;
mod serial;

pub use mock::{MockHandle, MockTransport};
pub use replay::ReplayTransport;
pub use serial::SerialTransport;

use crate::error::{MotionError, Result};

/// Asynchronous line-oriented device connection.
#[async_trait::async_trait]
pub trait LineTransport: Send + 'static {
    /// Write one protocol command to the device.
    async fn write_command(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    /// Deliver the next raw line, without its terminator.
    ///
    /// Returns:
    /// - `Ok(Some(line))` - a complete line arrived
    /// - `Ok(None)` - the stream ended (normal termination)
    /// - `Err(e)` - a communication error occurred
    ///
    /// Empty lines are filtered out by implementations; they carry no sample.
    async fn next_line(&mut self) -> std::io::Result<Option<String>>;
}

/// Enumerate the serial endpoints currently attached to this machine.
///
/// Returns port paths (`/dev/tty...`, `COM...`) in enumeration order, the
/// order discovery matches against the registry.
pub fn available_endpoints() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports().map_err(|e| {
        MotionError::transport_failed_with_source("serial port enumeration failed", Box::new(e))
    })?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
