//! Application settings consumed by the motion pipeline

use serde::{Deserialize, Serialize};

/// Default hardware-side position history length.
pub const DEFAULT_POSITION_BUFFER_SIZE: usize = 300;

/// Which biofeedback game is currently active.
///
/// Each game runs against its own motion tolerance; switching games swaps the
/// tolerance on the live session without reinitializing the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    /// Inflate-a-balloon: tolerance tightens stage by stage.
    Balloon,
    /// Stay-still fixation.
    Fixation,
    /// Watch-a-video.
    Video,
}

/// Baseline window selection parameters.
///
/// The baseline window is the slice of history `lag_delta` samples older than
/// the newest sample, `window_size` samples long. The lag is intentional: the
/// baseline represents a settled position rather than the latest jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// How many samples into the past the baseline window ends.
    pub lag_delta: usize,
    /// Number of samples averaged as the baseline.
    pub window_size: usize,
}

/// Configuration object owned by the calling application.
///
/// Field names follow the application's `settings.json` (camelCase). The core
/// only reads these values and echoes them back on demand; persistence is the
/// caller's concern. Unknown fields are ignored so UI-side settings can ride
/// along in the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Balloon game tolerance at stage zero, in mm.
    pub balloon_tolerance_start: f64,
    /// Balloon game tolerance at the final stage, in mm.
    pub balloon_tolerance_end: f64,
    /// Fixation game tolerance, in mm.
    pub fixation_tolerance: f64,
    /// Video game tolerance, in mm.
    pub video_tolerance: f64,
    /// Fixation trial duration, in seconds.
    pub fixation_duration: f64,
    /// Video trial duration, in seconds.
    pub video_duration: f64,
    /// Grace period before a video trial aborts on motion, in seconds.
    pub video_timeout: f64,
    /// Baseline window lag, in samples.
    pub lag_delta: usize,
    /// Baseline window length, in samples.
    pub window_size: usize,
    /// Position history capacity, in samples.
    pub position_buffer_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            balloon_tolerance_start: 10.0,
            balloon_tolerance_end: 3.0,
            fixation_tolerance: 3.0,
            video_tolerance: 3.0,
            fixation_duration: 30.0,
            video_duration: 60.0,
            video_timeout: 5.0,
            lag_delta: 20,
            window_size: 3,
            position_buffer_size: DEFAULT_POSITION_BUFFER_SIZE,
        }
    }
}

impl Settings {
    /// Baseline window parameters for the displacement engine.
    pub fn window(&self) -> WindowConfig {
        WindowConfig { lag_delta: self.lag_delta, window_size: self.window_size }
    }

    /// Tolerance in effect when the given game starts.
    ///
    /// The balloon game starts at its stage-zero tolerance; use
    /// [`Settings::balloon_stage_tolerance`] as stages advance.
    pub fn tolerance_for(&self, game: Game) -> f64 {
        match game {
            Game::Balloon => self.balloon_tolerance_start,
            Game::Fixation => self.fixation_tolerance,
            Game::Video => self.video_tolerance,
        }
    }

    /// Balloon tolerance interpolated for `stage` of `total_stages`.
    ///
    /// Linear ramp from the start tolerance at stage 0 to the end tolerance
    /// at the final stage. A zero `total_stages` pins the ramp at the start.
    pub fn balloon_stage_tolerance(&self, stage: u32, total_stages: u32) -> f64 {
        if total_stages == 0 {
            return self.balloon_tolerance_start;
        }
        let progress = f64::from(stage) / f64::from(total_stages);
        self.balloon_tolerance_start
            + (self.balloon_tolerance_end - self.balloon_tolerance_start) * progress
    }
}
