//! Core types for motion-tracking data representation.
//!
//! This module provides the foundational data structures of the pipeline:
//! - [`PositionSample`] is one parsed line of device output, normalized to mm
//! - [`RingBuffer`] keeps the bounded position history the baseline is drawn from
//! - [`Decision`] and [`MotionReading`] carry the per-line threshold verdict
//! - [`Settings`] / [`WindowConfig`] mirror the calling application's config
//! - [`UpdateRate`] controls event stream delivery rates
//!
//! Samples are immutable once created; everything downstream is derived from
//! the (history, window, tolerance) triple each time a new sample arrives.

mod ring;
mod settings;
mod update_rate;

pub use ring::RingBuffer;
pub use settings::{DEFAULT_POSITION_BUFFER_SIZE, Game, Settings, WindowConfig};
pub use update_rate::UpdateRate;

/// One 3D position sample parsed from a line of raw device output.
///
/// Positions are device units scaled by 10 to millimeters. Orientation angles
/// are reported by some hardware families only; they ride along unscaled and
/// take no part in displacement computation. Timestamping is implicit by
/// arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    /// Station/sensor number reported by the device.
    pub id: u32,
    /// Position in mm.
    pub x: f64,
    /// Position in mm.
    pub y: f64,
    /// Position in mm.
    pub z: f64,
    /// Orientation angles in degrees (azimuth, elevation, roll), if reported.
    pub angles: Option<(f64, f64, f64)>,
}

impl PositionSample {
    /// Euclidean distance to an arbitrary reference point.
    pub fn distance_to(&self, x: f64, y: f64, z: f64) -> f64 {
        let (dx, dy, dz) = (self.x - x, self.y - y, self.z - z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Threshold verdict produced for one incoming sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// The history buffer is not full yet; no decision can be made.
    /// This is a normal transient state, never an error.
    Warmup {
        /// Samples currently buffered.
        have: usize,
        /// Samples required before decisions start.
        need: usize,
    },

    /// The buffer was full and the displacement was evaluated.
    Motion {
        /// Euclidean distance from the newest sample to the baseline mean, mm.
        displacement: f64,
        /// `min(1, displacement / tolerance)`, pinned to 1 on a breach.
        /// Continuous feedback signal for UI gradients.
        threshold_pct: f64,
        /// Whether the displacement exceeded the active tolerance.
        broke_threshold: bool,
    },
}

impl Decision {
    /// Whether this decision signals a threshold breach.
    pub fn broke_threshold(&self) -> bool {
        matches!(self, Decision::Motion { broke_threshold: true, .. })
    }
}

/// A parsed sample together with its threshold verdict.
///
/// This is the fundamental unit that flows out of a session: one reading per
/// accepted device line, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionReading {
    /// The sample parsed from the device line.
    pub sample: PositionSample,
    /// The verdict computed against the history at arrival time.
    pub decision: Decision,
}
