//! Replay transport for recorded device captures

use std::collections::VecDeque;
use std::path::Path;
use tokio::time::{Duration, Interval, interval};
use tracing::{debug, info, trace};

use crate::error::{MotionError, Result};

use super::LineTransport;

/// Plays back a capture of raw device lines at a fixed pace.
///
/// A capture is a plain text file of newline-delimited device output, exactly
/// as a tracker would emit it. The replay behaves like live hardware at the
/// session level: same events, same ordering, same end-of-stream semantics.
/// Protocol commands written during init are accepted and discarded.
pub struct ReplayTransport {
    lines: VecDeque<String>,
    pace: Duration,
    ticker: Option<Interval>,
    total: usize,
}

impl ReplayTransport {
    /// Load a capture file, pacing playback at `pace_hz` lines per second.
    pub fn open<P: AsRef<Path>>(path: P, pace_hz: f64) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| MotionError::file_error(path.to_path_buf(), e))?;

        let lines: VecDeque<String> = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();

        let pace_hz = pace_hz.clamp(1.0, 10_000.0);
        let total = lines.len();
        info!("Loaded capture {} ({} lines at {}Hz)", path.display(), total, pace_hz);

        Ok(Self { lines, pace: Duration::from_secs_f64(1.0 / pace_hz), ticker: None, total })
    }

    /// Lines remaining in the capture.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }

    /// Total lines the capture held when loaded.
    pub fn total(&self) -> usize {
        self.total
    }
}

#[async_trait::async_trait]
impl LineTransport for ReplayTransport {
    async fn write_command(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        trace!("Ignoring {} command bytes during replay", bytes.len());
        Ok(())
    }

    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        let Some(line) = self.lines.pop_front() else {
            debug!("Capture exhausted after {} lines", self.total);
            return Ok(None);
        };

        // Lazy so the transport can be constructed outside a runtime
        let ticker = self.ticker.get_or_insert_with(|| interval(self.pace));
        ticker.tick().await;

        Ok(Some(line))
    }
}
