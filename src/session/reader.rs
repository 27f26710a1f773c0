//! Session reader task: byte stream in, motion events out

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::displacement;
use crate::protocol::DeviceProtocol;
use crate::transport::LineTransport;
use crate::types::{MotionReading, PositionSample, RingBuffer, WindowConfig};

use super::{SessionEvent, SessionState};

/// Mutable per-session parameters, snapshotted once per incoming line.
///
/// Settings and tolerance updates land here through a watch channel; reading
/// the snapshot exactly once per line keeps a single line's computation
/// atomic with respect to concurrent updates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ControlState {
    pub window: WindowConfig,
    pub tolerance: f64,
}

const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Reader task: owns the transport and the position history.
///
/// Processes one line to completion before accepting the next, so the ring
/// buffer needs no locking and event order matches arrival order. Lifecycle:
/// the task ends on stream end, on receiver drop, on cancellation, or after
/// too many consecutive transport errors; the state watch always lands on
/// `Closed`.
pub(crate) async fn run<T: LineTransport>(
    mut transport: T,
    protocol: Box<dyn DeviceProtocol>,
    capacity: usize,
    control: watch::Receiver<ControlState>,
    state: watch::Sender<SessionState>,
    events: mpsc::Sender<SessionEvent>,
    cancel: CancellationToken,
) {
    info!("Session reader started ({} protocol)", protocol.name());
    let mut history: RingBuffer<PositionSample> = RingBuffer::new(capacity);
    let mut line_count = 0u64;
    let mut dropped_lines = 0u64;
    let mut error_count = 0u32;

    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                info!("Session reader cancelled");
                break;
            }
            result = transport.next_line() => result,
        };

        match result {
            Ok(Some(line)) => {
                let sample = match protocol.parse_line(&line) {
                    Ok(sample) => sample,
                    Err(e) => {
                        // A malformed line never escalates past itself
                        dropped_lines += 1;
                        warn!("Dropping malformed line: {}", e);
                        continue;
                    }
                };

                line_count += 1;
                error_count = 0;
                if *state.borrow() != SessionState::Streaming {
                    state.send_replace(SessionState::Streaming);
                }

                history.push(sample);

                let snapshot = *control.borrow();
                let decision = displacement::evaluate(&history, snapshot.window, snapshot.tolerance);
                trace!(
                    "Line {}: id={} decision={:?} tolerance={}",
                    line_count, sample.id, decision, snapshot.tolerance
                );

                let reading = MotionReading { sample, decision };
                if events.send(SessionEvent::Reading(reading)).await.is_err() {
                    debug!("Event receiver dropped, shutting down");
                    break;
                }
            }
            Ok(None) => {
                info!("Device stream ended after {} lines", line_count);
                break;
            }
            Err(e) => {
                error_count += 1;
                error!(
                    "Transport error ({}/{}): {}",
                    error_count, MAX_CONSECUTIVE_ERRORS, e
                );
                state.send_replace(SessionState::Erroring);

                // Transport errors are always surfaced; retry policy is the
                // caller's decision, the session never reconnects on its own
                let event = SessionEvent::TransportError { message: e.to_string() };
                if events.send(event).await.is_err() {
                    debug!("Event receiver dropped during error, shutting down");
                    break;
                }

                if error_count >= MAX_CONSECUTIVE_ERRORS {
                    error!("Too many consecutive transport errors, closing session");
                    break;
                }

                let backoff = std::time::Duration::from_millis(50 * (1 << error_count.min(5)));
                tokio::time::sleep(backoff).await;
            }
        }
    }

    state.send_replace(SessionState::Closed);
    info!(
        "Session reader ended ({} lines processed, {} dropped)",
        line_count, dropped_lines
    );
}
