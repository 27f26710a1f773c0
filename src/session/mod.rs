//! Device session: the owner of one live motion-tracking connection.
//!
//! A [`DeviceSession`] ties together a transport, a protocol, the position
//! history, and the mutable control state (window and tolerance). It spawns a
//! single reader task that processes each incoming line to completion and
//! emits [`SessionEvent`]s in arrival order over a bounded channel. There are
//! no process-wide singletons: everything a session needs lives on the
//! session.

mod reader;

use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use futures::StreamExt;
use futures::stream::BoxStream;

use crate::error::{MotionError, Result};
use crate::protocol::{CommandOutcome, DeviceProtocol, InitPolicy, InitReport};
use crate::stream::ThrottleExt;
use crate::transport::LineTransport;
use crate::types::{Game, MotionReading, Settings, UpdateRate};

use reader::ControlState;

/// Event channel depth; the reader applies backpressure rather than dropping.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle of a device session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not yet started.
    Idle,
    /// Transport open, init commands written, waiting for the first line.
    Opening,
    /// Lines are arriving and being evaluated.
    Streaming,
    /// A transport error was surfaced; the reader is still trying.
    Erroring,
    /// Terminal: transport released, no further events.
    Closed,
}

/// One entry of the ordered session event stream.
#[derive(Debug)]
pub enum SessionEvent {
    /// A device line was parsed and evaluated.
    Reading(MotionReading),
    /// The transport reported a communication failure. The session keeps
    /// reading; whether to retry, continue degraded, or tear down is the
    /// caller's decision.
    TransportError {
        /// Description of the underlying failure.
        message: String,
    },
}

/// An active connection to one motion-tracking device.
///
/// Created by [`Stillpoint::discover`](crate::Stillpoint::discover) (or its
/// replay/mock variants). Dropping the session cancels the reader task and
/// releases the transport.
pub struct DeviceSession {
    control: watch::Sender<ControlState>,
    state: watch::Receiver<SessionState>,
    events: Option<mpsc::Receiver<SessionEvent>>,
    settings: Settings,
    init_report: InitReport,
    protocol_name: &'static str,
    cancel: CancellationToken,
}

impl DeviceSession {
    /// Start a session over an already-open transport.
    ///
    /// Writes the protocol's init command sequence (collecting per-command
    /// outcomes into the [`InitReport`]), then spawns the reader task. Under
    /// [`InitPolicy::BestEffort`] failed writes are logged and skipped; under
    /// [`InitPolicy::Strict`] the first failure aborts startup.
    ///
    /// The initial tolerance is the balloon start tolerance, matching the
    /// application's startup game.
    pub async fn start<T: LineTransport>(
        mut transport: T,
        protocol: Box<dyn DeviceProtocol>,
        settings: Settings,
        policy: InitPolicy,
    ) -> Result<Self> {
        let protocol_name = protocol.name();
        info!("Starting {} session", protocol_name);

        let mut init_report = InitReport::default();
        for command in protocol.init_commands() {
            match transport.write_command(command.bytes).await {
                Ok(()) => {
                    debug!("Init command written: {}", command.label);
                    init_report.outcomes.push(CommandOutcome { label: command.label, result: Ok(()) });
                }
                Err(e) => {
                    if policy == InitPolicy::Strict {
                        return Err(MotionError::Init {
                            command: String::from_utf8_lossy(command.bytes).into_owned(),
                            source: e,
                        });
                    }
                    warn!("Init command {} failed, continuing best-effort: {}", command.label, e);
                    init_report.outcomes.push(CommandOutcome { label: command.label, result: Err(e) });
                }
            }
        }

        let (control_tx, control_rx) = watch::channel(ControlState {
            window: settings.window(),
            tolerance: settings.balloon_tolerance_start,
        });
        let (state_tx, state_rx) = watch::channel(SessionState::Opening);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        tokio::spawn(reader::run(
            transport,
            protocol,
            settings.position_buffer_size,
            control_rx,
            state_tx,
            event_tx,
            cancel.clone(),
        ));

        Ok(Self {
            control: control_tx,
            state: state_rx,
            events: Some(event_rx),
            settings,
            init_report,
            protocol_name,
            cancel,
        })
    }

    /// The ordered event stream, at device-native rate.
    ///
    /// There is one consumer per session; a second call fails with
    /// [`MotionError::Closed`].
    pub fn events(&mut self) -> Result<ReceiverStream<SessionEvent>> {
        self.events.take().map(ReceiverStream::new).ok_or(MotionError::Closed)
    }

    /// The event stream, throttled for consumers that repaint slower than
    /// the device emits (latest-wins within each interval).
    pub fn events_at(
        &mut self,
        rate: UpdateRate,
        source_hz: f64,
    ) -> Result<BoxStream<'static, SessionEvent>> {
        let stream = self.events()?;
        Ok(match rate.throttle_interval(source_hz) {
            None => stream.boxed(),
            Some(interval) => stream.throttle(interval).boxed(),
        })
    }

    /// Replace the session settings.
    ///
    /// The baseline window takes effect from the next line; the position
    /// history is kept as-is (no resync required). The buffer capacity is
    /// fixed at session start. Tolerance is governed separately by
    /// [`DeviceSession::update_tolerance`] and the game setters.
    pub fn update_settings(&mut self, settings: &Settings) {
        self.settings = settings.clone();
        let window = settings.window();
        self.control.send_modify(|c| c.window = window);
        debug!("Session settings updated (window {:?})", window);
    }

    /// Set the active tolerance, in mm, effective from the next line.
    pub fn update_tolerance(&self, tolerance: f64) {
        self.control.send_modify(|c| c.tolerance = tolerance);
        debug!("Tolerance set to {}mm", tolerance);
    }

    /// Switch to the tolerance the given game starts with.
    pub fn set_game(&self, game: Game) {
        self.update_tolerance(self.settings.tolerance_for(game));
    }

    /// Tighten the balloon tolerance for a stage advance.
    pub fn set_balloon_stage(&self, stage: u32, total_stages: u32) {
        self.update_tolerance(self.settings.balloon_stage_tolerance(stage, total_stages));
    }

    /// The tolerance currently in effect, in mm.
    pub fn tolerance(&self) -> f64 {
        self.control.borrow().tolerance
    }

    /// The settings the session was last given.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Per-command outcomes of the device init sequence.
    pub fn init_report(&self) -> &InitReport {
        &self.init_report
    }

    /// Name of the protocol driving this session.
    pub fn protocol_name(&self) -> &'static str {
        self.protocol_name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Wait until the reader task has fully shut down.
    pub async fn wait_closed(&mut self) {
        while *self.state.borrow_and_update() != SessionState::Closed {
            if self.state.changed().await.is_err() {
                break;
            }
        }
    }

    /// Stop the session: cancel the reader task and release the transport.
    pub fn close(&self) {
        info!("Closing {} session", self.protocol_name);
        self.cancel.cancel();
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        debug!("Dropping {} session", self.protocol_name);
        self.cancel.cancel();
    }
}
