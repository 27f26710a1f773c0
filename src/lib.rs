//! Type-safe Rust library for motion-tracking serial devices.
//!
//! Stillpoint is the motion-detection core of an MRI-simulator training
//! application: it streams 3D position samples from a tracking device,
//! computes a lagged moving-window displacement signal, and emits
//! sample/threshold events that drive biofeedback games.
//!
//! # Features
//!
//! - **Driver abstraction**: incompatible hardware protocols behind one trait
//! - **Pure displacement engine**: testable lagged-window threshold decisions
//! - **Ordered events**: in-order delivery over a backpressured channel
//! - **Cross-platform replay**: recorded captures behave like live hardware
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use stillpoint::{DeviceRegistry, DriverKind, SessionEvent, Settings, Stillpoint};
//!
//! #[tokio::main]
//! async fn main() -> stillpoint::Result<()> {
//!     let mut registry = DeviceRegistry::new();
//!     registry.register("/dev/ttyUSB0", DriverKind::Liberty);
//!
//!     let mut session = Stillpoint::discover(&registry, Settings::default()).await?;
//!     let mut events = session.events()?;
//!
//!     while let Some(event) = events.next().await {
//!         match event {
//!             SessionEvent::Reading(reading) => {
//!                 if reading.decision.broke_threshold() {
//!                     println!("moved too much!");
//!                 }
//!             }
//!             SessionEvent::TransportError { message } => eprintln!("device: {message}"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
pub mod types;

// Motion pipeline
pub mod displacement;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod stream;
pub mod transport;

// Core exports
pub use error::{MotionError, Result};
pub use types::*;

pub use protocol::{DeviceProtocol, InitPolicy, InitReport, PortConfig};
pub use registry::{DeviceRegistry, DriverKind};
pub use session::{DeviceSession, SessionEvent, SessionState};
pub use transport::{
    LineTransport, MockHandle, MockTransport, ReplayTransport, SerialTransport,
    available_endpoints,
};

/// Unified entry point for motion-tracking sessions.
///
/// # Examples
///
/// ## Live hardware
/// ```rust,no_run
/// use stillpoint::{DeviceRegistry, DriverKind, Settings, Stillpoint};
///
/// #[tokio::main]
/// async fn main() -> stillpoint::Result<()> {
///     let mut registry = DeviceRegistry::new();
///     registry.register("COM6", DriverKind::Fastrak);
///     let session = Stillpoint::discover(&registry, Settings::default()).await?;
///     // Use session...
///     Ok(())
/// }
/// ```
///
/// ## Recorded capture (cross-platform)
/// ```rust,no_run
/// use stillpoint::{DriverKind, Settings, Stillpoint};
///
/// #[tokio::main]
/// async fn main() -> stillpoint::Result<()> {
///     let session =
///         Stillpoint::replay("session.capture", DriverKind::Liberty, Settings::default()).await?;
///     // Use session...
///     Ok(())
/// }
/// ```
pub struct Stillpoint;

impl Stillpoint {
    /// Discover an attached tracking device and start the one live session.
    ///
    /// Enumerates serial endpoints in order and matches them against the
    /// registry; the first registered endpoint wins. The matched driver's
    /// port parameters and init command sequence are applied best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No enumerated endpoint is present in the registry
    /// - The matched port cannot be opened
    pub async fn discover(registry: &DeviceRegistry, settings: Settings) -> Result<DeviceSession> {
        let endpoints = transport::available_endpoints()?;
        let (path, kind) = registry.match_endpoint(&endpoints)?;
        Self::attach(&path, kind, settings).await
    }

    /// Start a session on a known endpoint, bypassing discovery.
    pub async fn attach(path: &str, kind: DriverKind, settings: Settings) -> Result<DeviceSession> {
        let protocol = kind.protocol();
        let transport = SerialTransport::open(path, &protocol.port_config())?;
        DeviceSession::start(transport, protocol, settings, InitPolicy::default()).await
    }

    /// Replay a recorded capture file as if it were live hardware.
    ///
    /// The capture is newline-delimited raw device output, played back at
    /// `DEFAULT_REPLAY_HZ`. Use [`ReplayTransport`] with
    /// [`DeviceSession::start`] directly to control the pace.
    pub async fn replay<P: AsRef<std::path::Path>>(
        path: P,
        kind: DriverKind,
        settings: Settings,
    ) -> Result<DeviceSession> {
        let protocol = kind.protocol();
        let transport = ReplayTransport::open(path, DEFAULT_REPLAY_HZ)?;
        DeviceSession::start(transport, protocol, settings, InitPolicy::default()).await
    }
}

/// Playback rate used by [`Stillpoint::replay`], matching typical tracker
/// output rates.
pub const DEFAULT_REPLAY_HZ: f64 = 120.0;
