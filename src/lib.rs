//! Balloon Pop - a single-screen tap-the-balloon arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (waves, hit testing, animation, ledger)
//! - `engine`: Scene-graph seam the simulation drives and a renderer reads
//! - `content`: Balloon texture source (remote RSVP list or built-in fallback)
//! - `intro` / `app`: Screen flow around the simulation
//! - `autoplay`: Demo player that feeds pointer input
//! - `settings`: Runtime configuration

pub mod app;
pub mod autoplay;
pub mod content;
pub mod engine;
pub mod intro;
pub mod settings;
pub mod sim;

pub use app::{App, Screen};
pub use settings::{Settings, SettingsError};

/// Simulation time in whole milliseconds
pub type Millis = u64;

/// Game configuration constants
pub mod consts {
    use super::Millis;

    /// Fixed simulation timestep (~120 Hz)
    pub const SIM_DT_MS: Millis = 8;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default viewport (portrait phone)
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 640.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 1136.0;

    /// Lives at session start
    pub const INITIAL_LIVES: i32 = 5;

    /// Difficulty curve
    pub const BASE_TRAVEL_SECS: f32 = 2.0;
    pub const TRAVEL_DECAY: f32 = 0.975;
    pub const MIN_TRAVEL_SECS: f32 = 0.25;
    pub const BASE_BALLOON_COUNT: u32 = 2;
    pub const COUNT_INCREASE_EVERY: u32 = 5;
    pub const LAUNCH_STAGGER_MS: Millis = 50;
    /// ±15% per-balloon travel variation
    pub const TRAVEL_JITTER_PCT: f32 = 0.15;

    /// Terminal wave size, launched once for effect after game over
    pub const FLOOD_WAVE_COUNT: u32 = 500;

    /// Launch geometry (fractions of the viewport, y top-to-bottom)
    pub const LAUNCH_MIN_X: f32 = 0.2;
    pub const LAUNCH_MAX_X: f32 = 0.8;
    pub const LAUNCH_Y: f32 = 1.1;
    /// Balloons fly this far past the top edge before counting as missed
    pub const EXIT_MARGIN: f32 = 50.0;

    /// Score for a pop is `POP_SCORE_CEILING_MS - travel_ms`
    pub const POP_SCORE_CEILING_MS: f32 = 2000.0;

    /// Pop flourish
    pub const POP_SPIN_MS: Millis = 100;
    pub const POP_SHRINK_MS: Millis = 500;

    /// Balloon thumbnail size
    pub const BALLOON_SIZE: f32 = 80.0;

    /// Ambient feedback
    pub const SUN_MAX_SCALE: f32 = 10.0;
    pub const SUN_RESCALE_MS: Millis = 200;
    pub const RAIN_THRESHOLD: f32 = 0.4;
    pub const RAIN_BASE_EMISSION: f32 = 350.0;
    pub const RAIN_BASE_SPEED: f32 = 130.0;
    pub const RAIN_MAX_INTENSITY: f32 = 16.0;
    pub const BACKGROUND_START_GREEN: f32 = 150.0;
    pub const BACKGROUND_END_GREEN: f32 = 50.0;

    /// Game over panel
    pub const RESTART_DISPLAY_DELAY_MS: Millis = 2000;
    pub const RESTART_BLINK_MS: Millis = 1000;
}

/// Format an integer with thousands separators (`12345` -> `"12,345"`)
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
