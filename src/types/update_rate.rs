//! Update rate control for session event streams

use serde::{Deserialize, Serialize};

/// Delivery rate for a session event stream.
///
/// Tracker hardware emits samples far faster than a feedback UI needs to
/// repaint; consumers that only drive a color gradient can ask for a capped
/// rate instead of the device-native one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Full speed from the device.
    Native,

    /// Throttled to at most this many events per second.
    /// If the requested rate exceeds the source rate, Native is used.
    Max(u32),
}

impl UpdateRate {
    /// Normalize against the source frequency, collapsing over-asking to Native.
    pub fn normalize(self, source_hz: f64) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(hz) if f64::from(hz) >= source_hz => UpdateRate::Native,
            UpdateRate::Max(hz) => UpdateRate::Max(hz),
        }
    }

    /// Throttle interval to apply, if any.
    pub fn throttle_interval(self, source_hz: f64) -> Option<std::time::Duration> {
        match self.normalize(source_hz) {
            UpdateRate::Native => None,
            // A zero rate is nonsensical; clamp to one event per second
            UpdateRate::Max(hz) => {
                Some(std::time::Duration::from_secs_f64(1.0 / f64::from(hz.max(1))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_asking_collapses_to_native() {
        assert_eq!(UpdateRate::Max(240).normalize(120.0), UpdateRate::Native);
        assert_eq!(UpdateRate::Max(120).normalize(120.0), UpdateRate::Native);
        assert_eq!(UpdateRate::Max(30).normalize(120.0), UpdateRate::Max(30));
    }

    #[test]
    fn throttle_interval_matches_rate() {
        assert_eq!(UpdateRate::Native.throttle_interval(120.0), None);
        let interval = UpdateRate::Max(10).throttle_interval(120.0).unwrap();
        assert_eq!(interval, std::time::Duration::from_millis(100));
    }

    #[test]
    fn zero_rate_is_clamped() {
        let interval = UpdateRate::Max(0).throttle_interval(120.0).unwrap();
        assert_eq!(interval, std::time::Duration::from_secs(1));
    }
}
