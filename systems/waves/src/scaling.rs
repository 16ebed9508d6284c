//! Difficulty curves.

use echo_defence_core::WaveScalar;

/// Wave after which health and shields grow super-linearly.
pub const LATE_WAVE_START: u32 = 10;

const EARLY_DAMPENING: [f32; 2] = [0.78, 0.88];
const EARLY_SPEED_DAMPENING: [f32; 2] = [0.94, 0.97];

fn dampening(wave: u32, table: [f32; 2]) -> f32 {
    match wave {
        0 | 1 => table[0],
        2 => table[1],
        _ => 1.0,
    }
}

fn late_growth(wave: u32) -> f32 {
    let past = wave.saturating_sub(LATE_WAVE_START) as f32;
    0.05 * past.powf(1.6)
}

/// Difficulty factors for `wave` (one-based) on `level_index` (zero-based).
///
/// Every component except armour and reward is non-decreasing from wave 3.
#[must_use]
pub fn wave_scalar(wave: u32, level_index: u32) -> WaveScalar {
    let n = wave.max(1) as f32 - 1.0;
    let level = level_index as f32;
    let damp = dampening(wave, EARLY_DAMPENING);
    let late = late_growth(wave);

    let hp = (1.0 + 0.11 * n + 0.012 * n * n + late) * damp * 1.35_f32.powf(level);
    let spd = (1.0 + 0.012 * n).min(1.45)
        * dampening(wave, EARLY_SPEED_DAMPENING)
        * (1.0 + 0.04 * level);
    let armor = (1.0 + 0.015 * n).min(1.5) * (1.0 + 0.05 * level);
    let shield = (1.0 + 0.09 * n + 0.01 * n * n + late) * damp * 1.3_f32.powf(level);
    let regen = (1.0 + 0.07 * n + 0.5 * late) * damp * 1.25_f32.powf(level);
    let reward = (1.0 + 0.05 * n) * (1.0 + 0.15 * level);

    WaveScalar {
        hp,
        spd,
        armor,
        shield,
        regen,
        reward,
    }
    .sanitized()
}
