//! Enemy archetypes, their base profiles, and elite modifiers.

use serde::{Deserialize, Serialize};

/// Highest armour fraction any enemy may carry.
pub const MAX_ARMOR: f32 = 0.70;

/// Enemy archetypes that can walk the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline walker.
    Grunt,
    /// Fast and fragile.
    Runner,
    /// Slow with heavy armour.
    Armored,
    /// Breaks into swarmlings on death.
    Splitter,
    /// Small child spawned by splitters and the hivemother.
    Swarmling,
    /// Airborne; ignored by ground-only turrets.
    Flyer,
    /// Carries an energy shield.
    Shielded,
    /// Regenerates health quickly.
    Regenerator,
    /// Cloaked until revealed or approached.
    Wraith,
    /// Projects shields onto nearby allies.
    Warden,
    /// Hardens nearby allies and shakes off slows.
    Herald,
    /// Miniboss closing every fifth wave.
    Juggernaut,
    /// Boss: armour surges.
    Colossus,
    /// Boss: births a brood while walking.
    Hivemother,
    /// Boss: cloaks periodically.
    Phantom,
}

/// Bosses that may close a level.
pub const BOSS_ROSTER: [EnemyKind; 3] = [
    EnemyKind::Colossus,
    EnemyKind::Hivemother,
    EnemyKind::Phantom,
];

/// Base statistics for an enemy archetype before wave scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyProfile {
    /// Health.
    pub hp: f32,
    /// Path speed in world units per second.
    pub speed: f32,
    /// Physical damage reduction fraction.
    pub armor: f32,
    /// Energy shield.
    pub shield: f32,
    /// Health regenerated per second.
    pub regen: f32,
    /// Gold paid on death.
    pub reward: u32,
    /// Collision radius.
    pub radius: f32,
    /// Whether the enemy flies.
    pub flying: bool,
    /// Whether the enemy is cloaked.
    pub stealth: bool,
    /// Lives removed on leak.
    pub lives_cost: u32,
}

const fn profile(
    hp: f32,
    speed: f32,
    armor: f32,
    shield: f32,
    regen: f32,
    reward: u32,
    radius: f32,
) -> EnemyProfile {
    EnemyProfile {
        hp,
        speed,
        armor,
        shield,
        regen,
        reward,
        radius,
        flying: false,
        stealth: false,
        lives_cost: 1,
    }
}

impl EnemyKind {
    /// Every archetype in declaration order.
    pub const ALL: [EnemyKind; 15] = [
        EnemyKind::Grunt,
        EnemyKind::Runner,
        EnemyKind::Armored,
        EnemyKind::Splitter,
        EnemyKind::Swarmling,
        EnemyKind::Flyer,
        EnemyKind::Shielded,
        EnemyKind::Regenerator,
        EnemyKind::Wraith,
        EnemyKind::Warden,
        EnemyKind::Herald,
        EnemyKind::Juggernaut,
        EnemyKind::Colossus,
        EnemyKind::Hivemother,
        EnemyKind::Phantom,
    ];

    /// Base statistics for the archetype.
    #[must_use]
    pub const fn profile(self) -> EnemyProfile {
        match self {
            Self::Grunt => profile(60.0, 52.0, 0.0, 0.0, 0.0, 6, 11.0),
            Self::Runner => profile(38.0, 86.0, 0.0, 0.0, 0.0, 5, 9.0),
            Self::Armored => profile(120.0, 40.0, 0.40, 0.0, 0.0, 12, 13.0),
            Self::Splitter => profile(90.0, 48.0, 0.05, 0.0, 0.0, 9, 12.0),
            Self::Swarmling => profile(18.0, 70.0, 0.0, 0.0, 0.0, 2, 6.0),
            Self::Flyer => EnemyProfile {
                flying: true,
                ..profile(55.0, 64.0, 0.0, 0.0, 0.0, 8, 10.0)
            },
            Self::Shielded => profile(80.0, 46.0, 0.05, 60.0, 0.0, 11, 12.0),
            Self::Regenerator => profile(110.0, 44.0, 0.10, 0.0, 6.0, 12, 12.0),
            Self::Wraith => EnemyProfile {
                stealth: true,
                ..profile(70.0, 60.0, 0.0, 0.0, 0.0, 10, 10.0)
            },
            Self::Warden => profile(100.0, 42.0, 0.10, 40.0, 0.0, 14, 13.0),
            Self::Herald => profile(95.0, 50.0, 0.15, 0.0, 2.0, 14, 12.0),
            Self::Juggernaut => EnemyProfile {
                lives_cost: 5,
                ..profile(900.0, 34.0, 0.35, 150.0, 4.0, 80, 18.0)
            },
            Self::Colossus => EnemyProfile {
                lives_cost: 10,
                ..profile(4_200.0, 26.0, 0.45, 600.0, 10.0, 250, 24.0)
            },
            Self::Hivemother => EnemyProfile {
                lives_cost: 10,
                ..profile(3_600.0, 30.0, 0.25, 300.0, 8.0, 250, 24.0)
            },
            Self::Phantom => EnemyProfile {
                lives_cost: 10,
                stealth: true,
                ..profile(3_000.0, 38.0, 0.20, 400.0, 6.0, 250, 22.0)
            },
        }
    }

    /// Whether the archetype is a level boss.
    #[must_use]
    pub fn is_boss(self) -> bool {
        BOSS_ROSTER.contains(&self)
    }

    /// Stable key used in saves and logs.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Grunt => "grunt",
            Self::Runner => "runner",
            Self::Armored => "armored",
            Self::Splitter => "splitter",
            Self::Swarmling => "swarmling",
            Self::Flyer => "flyer",
            Self::Shielded => "shielded",
            Self::Regenerator => "regenerator",
            Self::Wraith => "wraith",
            Self::Warden => "warden",
            Self::Herald => "herald",
            Self::Juggernaut => "juggernaut",
            Self::Colossus => "colossus",
            Self::Hivemother => "hivemother",
            Self::Phantom => "phantom",
        }
    }

    /// Parses a key produced by [`EnemyKind::key`].
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

/// Rare per-enemy modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EliteTag {
    /// Tougher and better armoured.
    Hardened,
    /// Bursts on death, jamming nearby turrets.
    Volatile,
    /// Shrugs off most damage until revealed or marked.
    Phaselink,
    /// Moves faster.
    Swift,
}

impl EliteTag {
    /// Every elite tag.
    pub const ALL: [EliteTag; 4] = [
        EliteTag::Hardened,
        EliteTag::Volatile,
        EliteTag::Phaselink,
        EliteTag::Swift,
    ];

    /// Health multiplier.
    #[must_use]
    pub const fn hp_multiplier(self) -> f32 {
        match self {
            Self::Hardened => 1.3,
            Self::Volatile => 1.1,
            Self::Phaselink => 1.0,
            Self::Swift => 0.9,
        }
    }

    /// Armour added before clamping.
    #[must_use]
    pub const fn armor_bonus(self) -> f32 {
        match self {
            Self::Hardened => 0.15,
            _ => 0.0,
        }
    }

    /// Speed multiplier.
    #[must_use]
    pub const fn speed_multiplier(self) -> f32 {
        match self {
            Self::Swift => 1.25,
            _ => 1.0,
        }
    }

    /// Reward multiplier.
    #[must_use]
    pub const fn reward_multiplier(self) -> f32 {
        1.5
    }

    /// Stable key used in saves and logs.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Hardened => "HARDENED",
            Self::Volatile => "VOLATILE",
            Self::Phaselink => "PHASELINK",
            Self::Swift => "SWIFT",
        }
    }

    /// Parses a key produced by [`EliteTag::key`].
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.key() == key)
    }
}
