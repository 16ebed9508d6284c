//! Tunable constants and the run-level configuration surface.
//!
//! Every number that shapes a run is named once here and referenced
//! throughout the workspace. [`SimulationConfig`] gathers the subset that
//! adapters may override at start-up.

use serde::{Deserialize, Serialize};

/// Default viewport width in world units.
pub const VIEWPORT_WIDTH: f32 = 1280.0;
/// Default viewport height in world units.
pub const VIEWPORT_HEIGHT: f32 = 720.0;
/// Side length of a grid cell in world units.
pub const CELL_SIZE: f32 = 40.0;
/// Rows reserved for the HUD at the top of the viewport.
pub const UI_TOP_ROWS: u32 = 2;
/// Rows reserved for the build bar at the bottom of the viewport.
pub const UI_BOTTOM_ROWS: u32 = 1;

/// Cells whose centre lies within this many cells of the path belong to the track.
pub const TRACK_BLOCK_RADIUS: f32 = 0.9;

/// Gold available at the start of a run.
pub const STARTING_GOLD: u32 = 250;
/// Lives available at the start of a run.
pub const STARTING_LIVES: u32 = 20;
/// Waves per level; the last one is the boss wave.
pub const WAVES_PER_LEVEL: u32 = 16;

/// Longest wall-clock frame accepted by a tick, in seconds.
pub const MAX_FRAME_DT: f32 = 0.1;
/// Largest speed multiplier.
pub const MAX_SPEED: u8 = 4;

/// Intermission length between waves, in seconds.
pub const INTERMISSION_SECONDS: f32 = 12.0;
/// Gold for waiting out a full intermission.
pub const INTERMISSION_FULL_GOLD: u32 = 25;
/// Fraction of the elapsed-time reward paid when skipping.
pub const SKIP_GOLD_FRACTION: f32 = 0.6;
/// Largest damage buff granted by skipping at the very start of intermission.
pub const SKIP_BUFF_MAX: f32 = 0.08;
/// Flat seconds removed from every ability cooldown when skipping.
pub const SKIP_ABILITY_CUT: f32 = 3.0;
/// Base gold for clearing a wave.
pub const WAVE_CLEAR_BASE_GOLD: u32 = 20;
/// Additional wave-clear gold per wave number.
pub const WAVE_CLEAR_GOLD_PER_WAVE: u32 = 3;

/// Simulated seconds between periodic autosaves.
pub const AUTOSAVE_INTERVAL: f32 = 30.0;
/// Length of the boss cinematic phase.
pub const BOSS_CINEMATIC_SECONDS: f32 = 3.0;
/// Length of the level transition overlay.
pub const LEVEL_TRANSITION_SECONDS: f32 = 2.0;
/// Lifetime of a transient player notice.
pub const NOTICE_SECONDS: f32 = 2.5;

/// Overclock recharge time.
pub const OVERCLOCK_COOLDOWN: f32 = 45.0;
/// Overclock active duration.
pub const OVERCLOCK_DURATION: f32 = 6.0;
/// Fire-rate multiplier while Overclock is active.
pub const OVERCLOCK_RATE: f32 = 1.5;
/// Shockwave recharge time.
pub const SHOCKWAVE_COOLDOWN: f32 = 60.0;
/// Shockwave radius in world units.
pub const SHOCKWAVE_RADIUS: f32 = 120.0;
/// Shockwave true damage.
pub const SHOCKWAVE_DAMAGE: f32 = 80.0;

/// Fraction of invested gold refunded on sale.
pub const SELL_REFUND_FRACTION: f32 = 0.7;
/// Damage multiplier for turrets on purchased power tiles.
pub const POWER_TILE_DAMAGE: f32 = 1.25;
/// Range multiplier for turrets on purchased power tiles.
pub const POWER_TILE_RANGE: f32 = 1.1;

/// Fraction of a kill's base reward refunded by siphon traps.
pub const SIPHON_FRACTION: f32 = 0.2;

/// Run-level tunables adapters may override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Viewport width in world units.
    pub viewport_width: f32,
    /// Viewport height in world units.
    pub viewport_height: f32,
    /// Grid cell size in world units.
    pub cell_size: f32,
    /// Gold at the start of a run.
    pub starting_gold: u32,
    /// Lives at the start of a run.
    pub starting_lives: u32,
    /// Waves per level.
    pub waves_per_level: u32,
    /// Intermission length in seconds.
    pub intermission_seconds: f32,
    /// Simulated seconds between autosaves.
    pub autosave_interval: f32,
    /// Longest frame accepted by a tick.
    pub max_frame_dt: f32,
    /// Map seed for the first level.
    pub map_seed: u32,
    /// Environment identifier for the first level.
    pub env_id: u32,
    /// Seed for wave composition; `None` draws from entropy.
    pub composition_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            cell_size: CELL_SIZE,
            starting_gold: STARTING_GOLD,
            starting_lives: STARTING_LIVES,
            waves_per_level: WAVES_PER_LEVEL,
            intermission_seconds: INTERMISSION_SECONDS,
            autosave_interval: AUTOSAVE_INTERVAL,
            max_frame_dt: MAX_FRAME_DT,
            map_seed: 12_345,
            env_id: 0,
            composition_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Number of grid columns covering the viewport.
    #[must_use]
    pub fn columns(&self) -> u32 {
        (self.viewport_width / self.cell_size.max(1.0)).floor().max(1.0) as u32
    }

    /// Number of grid rows covering the viewport.
    #[must_use]
    pub fn rows(&self) -> u32 {
        (self.viewport_height / self.cell_size.max(1.0)).floor().max(1.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_covers_viewport() {
        let config = SimulationConfig::default();
        assert_eq!(config.columns(), 32);
        assert_eq!(config.rows(), 18);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "starting_gold": 900 }"#).expect("config parses");
        assert_eq!(config.starting_gold, 900);
        assert_eq!(config.waves_per_level, WAVES_PER_LEVEL);
    }
}
