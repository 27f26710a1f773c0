//! Polhemus Liberty protocol.
//!
//! Liberty trackers talk at 115200 baud and report position plus orientation
//! angles in continuous ASCII output: `id x y z azimuth elevation roll`.

use crate::error::Result;
use crate::types::PositionSample;

use super::{DeviceProtocol, InitCommand, PortConfig, UNIT_SCALE_MM, numeric_fields};

const INIT_COMMANDS: &[InitCommand] = &[
    InitCommand { label: "station output", bytes: b"l1,1\r" },
    InitCommand { label: "output list", bytes: b"O1,2,1\r" },
    InitCommand { label: "increment", bytes: b"I1,0.0\r" },
    InitCommand { label: "continuous output", bytes: b"C\r" },
    InitCommand { label: "metric units", bytes: b"U1\r" },
];

/// Driver for the Polhemus Liberty hardware family.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibertyProtocol;

impl DeviceProtocol for LibertyProtocol {
    fn name(&self) -> &'static str {
        "liberty"
    }

    fn port_config(&self) -> PortConfig {
        PortConfig::eight_n_one(115_200)
    }

    fn init_commands(&self) -> &'static [InitCommand] {
        INIT_COMMANDS
    }

    fn parse_line(&self, line: &str) -> Result<PositionSample> {
        let fields = numeric_fields(self.name(), line)?;
        let angles =
            if fields.len() >= 7 { Some((fields[4], fields[5], fields[6])) } else { None };

        Ok(PositionSample {
            id: fields[0] as u32,
            x: fields[1] * UNIT_SCALE_MM,
            y: fields[2] * UNIT_SCALE_MM,
            z: fields[3] * UNIT_SCALE_MM,
            angles,
        })
    }
}
