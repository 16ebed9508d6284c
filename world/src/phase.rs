//! Run phase state machine.

use echo_defence_core::PhaseKind;

/// Phase of the run together with the countdown that drives it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Phase {
    /// Before the first wave of a level.
    Building,
    /// A wave is spawning or enemies remain alive.
    WaveActive,
    /// Countdown to the next wave.
    Intermission {
        /// Seconds left.
        remaining: f32,
    },
    /// The boss of the level died.
    BossCinematic {
        /// Seconds left.
        remaining: f32,
    },
    /// Fade into the next level. Advancement happens once, when the
    /// countdown reaches zero.
    LevelTransition {
        /// Seconds left.
        remaining: f32,
    },
    /// Lives reached zero.
    Defeat,
}

impl Phase {
    /// Coarse classification broadcast to adapters.
    pub(crate) fn kind(&self) -> PhaseKind {
        match self {
            Self::Building => PhaseKind::Building,
            Self::WaveActive => PhaseKind::WaveActive,
            Self::Intermission { .. } => PhaseKind::Intermission,
            Self::BossCinematic { .. } => PhaseKind::BossCinematic,
            Self::LevelTransition { .. } => PhaseKind::LevelTransition,
            Self::Defeat => PhaseKind::Defeat,
        }
    }

    /// Whether players may build, upgrade, sell, and use tiles.
    pub(crate) fn accepts_actions(&self) -> bool {
        matches!(
            self,
            Self::Building | Self::WaveActive | Self::Intermission { .. }
        )
    }

    /// Counts the phase timer down, returning `true` once it has run out.
    ///
    /// Phases without a timer never expire.
    pub(crate) fn count_down(&mut self, dt: f32) -> bool {
        match self {
            Self::Intermission { remaining }
            | Self::BossCinematic { remaining }
            | Self::LevelTransition { remaining } => {
                *remaining = (*remaining - dt).max(0.0);
                *remaining <= 0.0
            }
            Self::Building | Self::WaveActive | Self::Defeat => false,
        }
    }
}
