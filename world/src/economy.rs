//! Gold formulas that are not tied to a single action.

use echo_defence_core::config::{
    INTERMISSION_FULL_GOLD, SIPHON_FRACTION, SKIP_BUFF_MAX, SKIP_GOLD_FRACTION,
    WAVE_CLEAR_BASE_GOLD, WAVE_CLEAR_GOLD_PER_WAVE,
};

/// Gold granted for clearing `wave`.
pub(crate) fn wave_clear_bonus(wave: u32) -> u32 {
    WAVE_CLEAR_BASE_GOLD.saturating_add(WAVE_CLEAR_GOLD_PER_WAVE.saturating_mul(wave))
}

/// Gold refunded by a siphon trap. Uses the base reward so combo bonuses
/// never compound into the refund.
pub(crate) fn siphon_refund(base_reward: u32) -> u32 {
    (base_reward as f32 * SIPHON_FRACTION + 1e-4).floor() as u32
}

/// Reward granted when an intermission ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct IntermissionReward {
    pub(crate) gold: u32,
    pub(crate) buff: f32,
}

impl IntermissionReward {
    /// Reward for waiting out the whole countdown.
    pub(crate) fn full() -> Self {
        Self {
            gold: INTERMISSION_FULL_GOLD,
            buff: 0.0,
        }
    }

    /// Reward for skipping with `remaining` of `total` seconds left.
    ///
    /// Gold scales with the time already waited; the damage buff scales with
    /// the time given up.
    pub(crate) fn skipped(remaining: f32, total: f32) -> Self {
        let total = if total.is_finite() && total > 0.0 {
            total
        } else {
            return Self::full();
        };
        let left = (remaining / total).clamp(0.0, 1.0);
        let waited = 1.0 - left;
        Self {
            gold: (INTERMISSION_FULL_GOLD as f32 * SKIP_GOLD_FRACTION * waited).floor() as u32,
            buff: SKIP_BUFF_MAX * left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siphon_refunds_a_fifth_of_the_base_reward() {
        assert_eq!(siphon_refund(20), 4);
        assert_eq!(siphon_refund(6), 1);
        assert_eq!(siphon_refund(4), 0);
    }

    #[test]
    fn wave_clear_bonus_grows_per_wave() {
        assert_eq!(wave_clear_bonus(1), WAVE_CLEAR_BASE_GOLD + WAVE_CLEAR_GOLD_PER_WAVE);
        assert!(wave_clear_bonus(10) > wave_clear_bonus(9));
    }

    #[test]
    fn skipping_trades_gold_for_a_buff() {
        let immediate = IntermissionReward::skipped(12.0, 12.0);
        assert_eq!(immediate.gold, 0);
        assert!((immediate.buff - SKIP_BUFF_MAX).abs() < 1e-6);

        let late = IntermissionReward::skipped(3.0, 12.0);
        assert!(late.gold > 0);
        assert!(late.gold < IntermissionReward::full().gold);
        assert!(late.buff < immediate.buff);
    }
}
