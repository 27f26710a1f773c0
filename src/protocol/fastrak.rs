//! Polhemus Fastrak protocol.
//!
//! Fastrak trackers talk at 57600 baud. Output is `id x y z ...`; any
//! trailing orientation columns are ignored by this driver.

use crate::error::Result;
use crate::types::PositionSample;

use super::{DeviceProtocol, InitCommand, PortConfig, UNIT_SCALE_MM, numeric_fields};

const INIT_COMMANDS: &[InitCommand] = &[
    InitCommand { label: "station output", bytes: b"l1,1\r" },
    InitCommand { label: "output list", bytes: b"O1,2,1\r" },
    InitCommand { label: "increment", bytes: b"I1,0.0\r" },
    InitCommand { label: "ascii format", bytes: b"F" },
    InitCommand { label: "continuous output", bytes: b"C" },
    InitCommand { label: "metric units", bytes: b"u" },
];

/// Driver for the Polhemus Fastrak hardware family.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastrakProtocol;

impl DeviceProtocol for FastrakProtocol {
    fn name(&self) -> &'static str {
        "fastrak"
    }

    fn port_config(&self) -> PortConfig {
        PortConfig::eight_n_one(57_600)
    }

    fn init_commands(&self) -> &'static [InitCommand] {
        INIT_COMMANDS
    }

    fn parse_line(&self, line: &str) -> Result<PositionSample> {
        let fields = numeric_fields(self.name(), line)?;

        Ok(PositionSample {
            id: fields[0] as u32,
            x: fields[1] * UNIT_SCALE_MM,
            y: fields[2] * UNIT_SCALE_MM,
            z: fields[3] * UNIT_SCALE_MM,
            angles: None,
        })
    }
}
