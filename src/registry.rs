//! Device discovery against a static driver registry.
//!
//! The registry maps serial endpoint identities (port paths) to the driver
//! that speaks the hardware attached there. Discovery walks the machine's
//! enumerated endpoints in order and starts a session on the first match;
//! exactly one session is active per process run.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{MotionError, Result};
use crate::protocol::{DeviceProtocol, FastrakProtocol, LibertyProtocol};

/// Variant tag for the supported hardware families.
///
/// A registry entry carries one of these instead of a driver instance, so the
/// registry stays plain data readable at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// Polhemus Liberty (115200 baud, position + orientation).
    Liberty,
    /// Polhemus Fastrak (57600 baud, position only).
    Fastrak,
}

impl DriverKind {
    /// Instantiate the protocol implementation for this kind.
    pub fn protocol(self) -> Box<dyn DeviceProtocol> {
        match self {
            DriverKind::Liberty => Box::new(LibertyProtocol),
            DriverKind::Fastrak => Box::new(FastrakProtocol),
        }
    }
}

/// Static endpoint-identity to driver mapping, read at startup.
///
/// ```rust
/// use stillpoint::{DeviceRegistry, DriverKind};
///
/// let mut registry = DeviceRegistry::new();
/// registry.register("/dev/tty.usbserial-A10NW3TT", DriverKind::Liberty);
/// registry.register("COM6", DriverKind::Fastrak);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    entries: HashMap<String, DriverKind>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver for an endpoint identity.
    pub fn register(&mut self, endpoint: impl Into<String>, kind: DriverKind) {
        self.entries.insert(endpoint.into(), kind);
    }

    /// Driver registered for an endpoint, if any.
    pub fn get(&self, endpoint: &str) -> Option<DriverKind> {
        self.entries.get(endpoint).copied()
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Match enumerated endpoints against the registry.
    ///
    /// Endpoints are checked in enumeration order; the first registered one
    /// wins. Fails with [`MotionError::NoCompatibleDevice`] after exhausting
    /// the list. This is fatal for the application (no device to drive the
    /// games) but it is a reported condition, not a panic.
    pub fn match_endpoint(&self, endpoints: &[String]) -> Result<(String, DriverKind)> {
        for endpoint in endpoints {
            if let Some(kind) = self.get(endpoint) {
                info!("Matched endpoint {} to {:?} driver", endpoint, kind);
                return Ok((endpoint.clone(), kind));
            }
            debug!("No driver registered for endpoint {}", endpoint);
        }
        Err(MotionError::NoCompatibleDevice { scanned: endpoints.len() })
    }
}

impl FromIterator<(String, DriverKind)> for DeviceRegistry {
    fn from_iter<I: IntoIterator<Item = (String, DriverKind)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> DeviceRegistry {
        let mut registry = DeviceRegistry::new();
        registry.register("/dev/ttyUSB1", DriverKind::Liberty);
        registry.register("COM6", DriverKind::Fastrak);
        registry
    }

    #[test]
    fn first_registered_endpoint_in_enumeration_order_wins() {
        let endpoints = vec![
            "/dev/ttyS0".to_string(),
            "COM6".to_string(),
            "/dev/ttyUSB1".to_string(),
        ];
        let (endpoint, kind) = registry().match_endpoint(&endpoints).expect("should match");
        assert_eq!(endpoint, "COM6");
        assert_eq!(kind, DriverKind::Fastrak);
    }

    #[test]
    fn no_match_reports_scanned_count() {
        let endpoints = vec!["/dev/ttyS0".to_string(), "/dev/ttyS1".to_string()];
        match registry().match_endpoint(&endpoints) {
            Err(MotionError::NoCompatibleDevice { scanned }) => assert_eq!(scanned, 2),
            other => panic!("expected NoCompatibleDevice, got {other:?}"),
        }
    }

    #[test]
    fn empty_endpoint_list_never_matches() {
        assert!(matches!(
            registry().match_endpoint(&[]),
            Err(MotionError::NoCompatibleDevice { scanned: 0 })
        ));
    }

    #[test]
    fn kinds_build_their_protocols() {
        assert_eq!(DriverKind::Liberty.protocol().name(), "liberty");
        assert_eq!(DriverKind::Fastrak.protocol().name(), "fastrak");
    }
}
