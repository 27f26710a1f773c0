//! Serial port transport

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info};

use crate::error::{MotionError, Result};
use crate::protocol::PortConfig;

use super::LineTransport;

/// Live serial connection to a tracking device.
///
/// Lines are read through a buffered reader and decoded lossily: stray
/// non-UTF-8 bytes become replacement characters and fail downstream as a
/// per-line parse error instead of killing the stream.
pub struct SerialTransport {
    path: String,
    reader: BufReader<SerialStream>,
    buf: Vec<u8>,
}

impl SerialTransport {
    /// Open a serial endpoint with the given protocol parameters.
    ///
    /// Must be called from within a tokio runtime; the stream registers with
    /// the reactor on open.
    pub fn open(path: &str, config: &PortConfig) -> Result<Self> {
        info!("Opening serial port {} at {} baud", path, config.baud_rate);

        let port = tokio_serial::new(path, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .open_native_async()
            .map_err(|e| MotionError::Port { path: path.to_string(), source: e })?;

        debug!("Serial port {} opened", path);
        Ok(Self { path: path.to_string(), reader: BufReader::new(port), buf: Vec::new() })
    }

    /// The endpoint this transport is attached to.
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait::async_trait]
impl LineTransport for SerialTransport {
    async fn write_command(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let port = self.reader.get_mut();
        port.write_all(bytes).await?;
        port.flush().await
    }

    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            self.buf.clear();
            let n = self.reader.read_until(b'\n', &mut self.buf).await?;
            if n == 0 {
                debug!("Serial port {} reached end of stream", self.path);
                return Ok(None);
            }

            let line = String::from_utf8_lossy(&self.buf);
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.is_empty() {
                continue;
            }
            return Ok(Some(trimmed.to_string()));
        }
    }
}
