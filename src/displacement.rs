//! Lagged moving-window displacement evaluation.
//!
//! This is the one place threshold decisions are made. Drivers only produce
//! samples; the session feeds them here together with the active window
//! configuration and tolerance. The evaluation is a pure function of
//! (history snapshot, window config, tolerance), which is what makes the
//! pipeline testable without hardware.
//!
//! The baseline is deliberately *lagged*: it averages a window of samples
//! `lag_delta` samples older than the newest one, so it represents the
//! participant's settled position rather than the latest jitter.

use crate::types::{Decision, PositionSample, RingBuffer, WindowConfig};

/// Evaluate the newest sample in `history` against its lagged baseline.
///
/// Returns [`Decision::Warmup`] until the history has filled to capacity;
/// afterwards, computes the Euclidean displacement of the newest sample from
/// the per-axis mean of the baseline window and compares it against
/// `tolerance` (mm).
///
/// Index selection: `start = len - 1 - (lag_delta + window_size)`,
/// `end = start + window_size`, both clamped into `[0, len)`. An empty window
/// (window_size 0, or a lag reaching past the history) falls back to the
/// newest sample's own coordinates, which yields zero displacement rather
/// than a division by zero.
pub fn evaluate(history: &RingBuffer<PositionSample>, window: WindowConfig, tolerance: f64) -> Decision {
    if !history.is_full() {
        return Decision::Warmup { have: history.len(), need: history.capacity() };
    }

    // is_full on a capacity >= 1 buffer guarantees a newest sample
    let Some(newest) = history.newest().copied() else {
        return Decision::Warmup { have: 0, need: history.capacity() };
    };

    let len = history.len();
    let start = (len - 1).saturating_sub(window.lag_delta + window.window_size);
    let end = (start + window.window_size).min(len);

    let (mut sum_x, mut sum_y, mut sum_z) = (0.0f64, 0.0f64, 0.0f64);
    let mut count = 0usize;
    for sample in history.range(start, end) {
        sum_x += sample.x;
        sum_y += sample.y;
        sum_z += sample.z;
        count += 1;
    }

    let (baseline_x, baseline_y, baseline_z) = if count == 0 {
        (newest.x, newest.y, newest.z)
    } else {
        let n = count as f64;
        (sum_x / n, sum_y / n, sum_z / n)
    };

    let displacement = newest.distance_to(baseline_x, baseline_y, baseline_z);
    let broke_threshold = displacement > tolerance;

    let threshold_pct = if broke_threshold {
        1.0
    } else if tolerance > 0.0 {
        (displacement / tolerance).min(1.0)
    } else {
        // tolerance <= 0 and not broken means displacement is zero too
        0.0
    };

    Decision::Motion { displacement, threshold_pct, broke_threshold }
}
