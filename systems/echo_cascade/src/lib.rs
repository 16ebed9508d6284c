#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Echo Cascade: the kill-streak combo meter.
//!
//! Each kill inside the running window extends the streak; the window and the
//! reward multiplier are recomputed from step tables keyed by the streak
//! length. The state is run-transient and never saved.

/// Shortest combo window in seconds.
pub const WINDOW_FLOOR: f32 = 1.5;
/// Longest combo window in seconds.
pub const WINDOW_CEILING: f32 = 3.5;
/// Largest reward multiplier.
pub const MAX_MULTIPLIER: f32 = 1.5;

/// `(minimum streak, window)` pairs, highest threshold first.
pub const WINDOW_STEPS: [(u32, f32); 5] = [(20, 3.4), (12, 3.0), (6, 2.6), (3, 2.3), (0, 2.0)];
/// `(minimum streak, multiplier)` pairs, highest threshold first.
pub const MULTIPLIER_STEPS: [(u32, f32); 6] = [
    (25, 1.5),
    (15, 1.35),
    (10, 1.25),
    (6, 1.15),
    (3, 1.08),
    (0, 1.0),
];

fn step(table: &[(u32, f32)], count: u32) -> f32 {
    table
        .iter()
        .find(|(threshold, _)| count >= *threshold)
        .map_or(1.0, |(_, value)| *value)
}

/// Combo window for a streak of `count` kills.
#[must_use]
pub fn window_for(count: u32) -> f32 {
    step(&WINDOW_STEPS, count).clamp(WINDOW_FLOOR, WINDOW_CEILING)
}

/// Reward multiplier for a streak of `count` kills.
#[must_use]
pub fn multiplier_for(count: u32) -> f32 {
    step(&MULTIPLIER_STEPS, count).clamp(1.0, MAX_MULTIPLIER)
}

/// Gold paid for one kill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KillPayout {
    /// Gold granted, `round(base × multiplier)`.
    pub total: u32,
    /// Reward before the combo multiplier.
    pub base: u32,
    /// Portion of `total` contributed by the multiplier.
    pub bonus: u32,
}

/// Streak state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComboState {
    count: u32,
    timer: f32,
    window: f32,
    multiplier: f32,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            count: 0,
            timer: 0.0,
            window: window_for(0),
            multiplier: 1.0,
        }
    }
}

impl ComboState {
    /// Creates an idle meter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kills in the current streak.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Seconds left before the streak expires.
    #[must_use]
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Window granted by the current streak.
    #[must_use]
    pub fn window(&self) -> f32 {
        self.window
    }

    /// Reward multiplier of the current streak.
    #[must_use]
    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Records a kill worth `base` gold and returns the payout.
    pub fn register_kill(&mut self, base: u32) -> KillPayout {
        self.count = if self.timer > 0.0 { self.count + 1 } else { 1 };
        self.window = window_for(self.count);
        self.multiplier = multiplier_for(self.count);
        self.timer = self.window;
        let total = (base as f32 * self.multiplier).round() as u32;
        KillPayout {
            total,
            base,
            bonus: total.saturating_sub(base),
        }
    }

    /// Decays the timer, resetting the streak when it runs out.
    pub fn tick(&mut self, dt: f32) {
        if self.count == 0 || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.timer -= dt;
        if self.timer <= 0.0 {
            *self = Self::default();
        }
    }

    /// Drops the streak immediately.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
