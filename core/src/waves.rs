//! Wave vocabulary shared by the scheduler, the world, and saves.

use serde::{Deserialize, Serialize};

use crate::enemies::{EliteTag, EnemyKind};

/// Multiplicative difficulty factors applied to every enemy of a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveScalar {
    /// Health multiplier.
    pub hp: f32,
    /// Speed multiplier.
    pub spd: f32,
    /// Armour multiplier.
    pub armor: f32,
    /// Shield multiplier.
    pub shield: f32,
    /// Regeneration multiplier.
    pub regen: f32,
    /// Reward multiplier.
    pub reward: f32,
}

impl Default for WaveScalar {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Smallest value a multiplicative factor may take.
pub const SCALAR_FLOOR: f32 = 0.01;

fn floored(value: f32, floor: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.max(floor)
    } else {
        fallback
    }
}

impl WaveScalar {
    /// Scalar that leaves profiles untouched.
    pub const IDENTITY: WaveScalar = WaveScalar {
        hp: 1.0,
        spd: 1.0,
        armor: 1.0,
        shield: 1.0,
        regen: 1.0,
        reward: 1.0,
    };

    /// Returns a copy with every factor finite and above its floor.
    ///
    /// Non-finite values fall back to `1.0`.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            hp: floored(self.hp, SCALAR_FLOOR, 1.0),
            spd: floored(self.spd, SCALAR_FLOOR, 1.0),
            armor: floored(self.armor, 0.0, 1.0),
            shield: floored(self.shield, SCALAR_FLOOR, 1.0),
            regen: floored(self.regen, SCALAR_FLOOR, 1.0),
            reward: floored(self.reward, SCALAR_FLOOR, 1.0),
        }
    }
}

/// One queued spawn within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// Seconds after the wave start at which the enemy enters the path.
    pub time: f32,
    /// Archetype to spawn.
    pub kind: EnemyKind,
    /// Difficulty factors for the spawn.
    pub scalar: WaveScalar,
    /// Elite modifier, if rolled.
    pub elite: Option<EliteTag>,
    /// Whether the spawn is a miniboss or level boss.
    pub is_miniboss: bool,
}

/// Wave-wide twists rolled in the mid and late game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveAnomaly {
    /// Spawns arrive closer together.
    Surge,
    /// Extra armour on every enemy.
    Fortified,
    /// Extra shields on every enemy.
    Overcharged,
    /// Higher rewards.
    Bounty,
    /// Faster enemies.
    Haste,
}

impl WaveAnomaly {
    /// Every anomaly.
    pub const ALL: [WaveAnomaly; 5] = [
        WaveAnomaly::Surge,
        WaveAnomaly::Fortified,
        WaveAnomaly::Overcharged,
        WaveAnomaly::Bounty,
        WaveAnomaly::Haste,
    ];

    /// Stable key used in saves and logs.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Surge => "SURGE",
            Self::Fortified => "FORTIFIED",
            Self::Overcharged => "OVERCHARGED",
            Self::Bounty => "BOUNTY",
            Self::Haste => "HASTE",
        }
    }

    /// Parses a key produced by [`WaveAnomaly::key`].
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|anomaly| anomaly.key() == key)
    }

    /// Applies the anomaly's factor adjustments.
    #[must_use]
    pub fn adjust(self, scalar: WaveScalar) -> WaveScalar {
        match self {
            Self::Surge => scalar,
            Self::Fortified => WaveScalar {
                armor: scalar.armor * 1.25,
                ..scalar
            },
            Self::Overcharged => WaveScalar {
                shield: scalar.shield * 1.5,
                ..scalar
            },
            Self::Bounty => WaveScalar {
                reward: scalar.reward * 1.5,
                ..scalar
            },
            Self::Haste => WaveScalar {
                spd: scalar.spd * 1.15,
                ..scalar
            },
        }
    }

    /// Multiplier applied to spawn spacing.
    #[must_use]
    pub const fn spacing_multiplier(self) -> f32 {
        match self {
            Self::Surge => 0.7,
            _ => 1.0,
        }
    }
}
