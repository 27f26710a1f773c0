//! Device protocol abstraction.
//!
//! Each supported hardware family implements [`DeviceProtocol`]: its serial
//! port parameters, its ordered init command sequence, and the parsing of one
//! line of raw ASCII output into a [`PositionSample`]. Drivers produce
//! samples and nothing else; displacement evaluation lives in
//! [`displacement`](crate::displacement) so it exists exactly once.
//!
//! The two concrete protocols differ only in baud rate, setup command strings,
//! and whether orientation angles are reported.

mod fastrak;
mod liberty;

pub use fastrak::FastrakProtocol;
pub use liberty::LibertyProtocol;

use tokio_serial::{DataBits, FlowControl, Parity, StopBits};

use crate::error::{MotionError, Result};
use crate::types::PositionSample;

/// Device position units scaled to millimeters.
pub(crate) const UNIT_SCALE_MM: f64 = 10.0;

/// Serial parameters a protocol requires; each driver hard-codes its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
}

impl PortConfig {
    /// 8-N-1, no flow control, at the given baud rate. Both supported
    /// hardware families use this framing.
    pub fn eight_n_one(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }
}

/// One device setup command, written during session startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitCommand {
    /// Human-readable purpose, used in logs and init reports.
    pub label: &'static str,
    /// Exact bytes written to the device.
    pub bytes: &'static [u8],
}

/// How init command write failures are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitPolicy {
    /// Log the failure and continue with the remaining commands. Matches the
    /// historical device behavior, where trackers come up usable even when
    /// individual setup writes are dropped.
    #[default]
    BestEffort,
    /// Abort session startup on the first failed write.
    Strict,
}

/// Outcome of one init command write.
#[derive(Debug)]
pub struct CommandOutcome {
    pub label: &'static str,
    pub result: std::io::Result<()>,
}

/// Per-command outcomes of a device init sequence.
///
/// Returned to the caller rather than only logged, so the tolerance for
/// partial init failure is an application decision.
#[derive(Debug, Default)]
pub struct InitReport {
    pub outcomes: Vec<CommandOutcome>,
}

impl InitReport {
    /// Whether every setup command was written successfully.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Labels of the commands that failed to write.
    pub fn failures(&self) -> Vec<&'static str> {
        self.outcomes.iter().filter(|o| o.result.is_err()).map(|o| o.label).collect()
    }
}

/// Capability contract every concrete driver implements.
///
/// Object-safe so sessions can hold `Box<dyn DeviceProtocol>` selected at
/// runtime by the registry.
pub trait DeviceProtocol: Send + Sync {
    /// Short protocol name used in logs and parse errors.
    fn name(&self) -> &'static str;

    /// Serial parameters for opening the physical port.
    fn port_config(&self) -> PortConfig;

    /// Ordered setup command sequence (mode, units, continuous output).
    fn init_commands(&self) -> &'static [InitCommand];

    /// Parse one line of raw device output into a position sample.
    ///
    /// Returns [`MotionError::Parse`] if required numeric fields are absent
    /// or non-numeric. The session drops and logs such lines; parsing never
    /// terminates a stream.
    fn parse_line(&self, line: &str) -> Result<PositionSample>;
}

/// Split a device line on whitespace into numeric fields.
///
/// All protocols report `id x y z [ax ay az]`; at least the four leading
/// fields must parse as numbers. Once those are in, the first non-numeric
/// token ends the fields: trackers append status characters after the data
/// columns, and those must not drop an otherwise valid line.
pub(crate) fn numeric_fields(protocol: &'static str, line: &str) -> Result<Vec<f64>> {
    let trimmed = line.trim();
    let mut fields = Vec::new();
    for token in trimmed.split_whitespace() {
        match token.parse::<f64>() {
            Ok(value) => fields.push(value),
            Err(_) if fields.len() >= 4 => break,
            Err(_) => {
                return Err(MotionError::parse_error(
                    protocol,
                    trimmed,
                    format!("non-numeric field {token:?}"),
                ));
            }
        }
    }
    if fields.len() < 4 {
        return Err(MotionError::parse_error(
            protocol,
            trimmed,
            format!("expected at least 4 numeric fields, got {}", fields.len()),
        ));
    }
    Ok(fields)
}
