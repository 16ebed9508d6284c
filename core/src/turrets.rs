//! Turret archetypes, their statistics, and the upgrade tree.
//!
//! Every archetype has [`MAX_LEVEL`] sequential tiers with two mod options per
//! tier. A mod is a short list of [`StatOp`] edits applied to a turret's
//! runtime [`TurretStats`]; edits compound and are never undone within a run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of upgrade tiers per turret.
pub const MAX_LEVEL: u8 = 5;

/// Upgrade cost per tier as a multiple of the turret's build cost.
pub const TIER_COST_FACTORS: [f32; MAX_LEVEL as usize] = [0.7, 1.0, 1.4, 1.9, 2.6];

/// Index of a mod option within a tier.
pub type ModIndex = u8;

/// Damage classes and how they interact with defences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Reduced by armour.
    Physical,
    /// Absorbed by shields first.
    Energy,
    /// Delivered over time; ignores shields and armour.
    Chemical,
    /// Ignores every defence.
    True,
}

/// Policies that rank enemies inside a turret's range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetMode {
    /// Furthest along the path.
    #[default]
    First,
    /// Least far along the path.
    Last,
    /// Highest current health.
    Strongest,
    /// Highest current shield.
    MostShield,
    /// Highest armour fraction.
    MostArmor,
}

impl TargetMode {
    /// Every mode in cycling order.
    pub const ALL: [TargetMode; 5] = [
        TargetMode::First,
        TargetMode::Last,
        TargetMode::Strongest,
        TargetMode::MostShield,
        TargetMode::MostArmor,
    ];
}

/// Turret archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TurretKind {
    /// Straight-flying physical bolts.
    Bolt,
    /// Long-range instant shots that can stun and mark.
    Needle,
    /// Chemical darts that poison.
    Venom,
    /// Chain lightning.
    Arc,
    /// Cone of cold that slows.
    Frost,
    /// Continuous energy beam.
    Beam,
    /// Slow artillery shells with area blasts.
    Mortar,
    /// Launches drones that hunt independently.
    Hive,
    /// Support aura that buffs nearby turrets.
    Beacon,
    /// Charges and deploys ground traps.
    Trap,
}

impl TurretKind {
    /// Every archetype in build-bar order.
    pub const ALL: [TurretKind; 10] = [
        TurretKind::Bolt,
        TurretKind::Needle,
        TurretKind::Venom,
        TurretKind::Arc,
        TurretKind::Frost,
        TurretKind::Beam,
        TurretKind::Mortar,
        TurretKind::Hive,
        TurretKind::Beacon,
        TurretKind::Trap,
    ];

    /// Gold required to build the turret.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Bolt => 50,
            Self::Needle => 90,
            Self::Venom => 70,
            Self::Arc => 85,
            Self::Frost => 75,
            Self::Beam => 110,
            Self::Mortar => 100,
            Self::Hive => 120,
            Self::Beacon => 95,
            Self::Trap => 60,
        }
    }

    /// Damage class dealt by the turret's primary attack.
    #[must_use]
    pub const fn damage_type(self) -> DamageType {
        match self {
            Self::Bolt | Self::Needle | Self::Mortar | Self::Hive | Self::Trap => {
                DamageType::Physical
            }
            Self::Arc | Self::Frost | Self::Beam => DamageType::Energy,
            Self::Venom => DamageType::Chemical,
            Self::Beacon => DamageType::True,
        }
    }

    /// Gold required for the given tier.
    #[must_use]
    pub fn upgrade_cost(self, tier: u8) -> Option<u32> {
        TIER_COST_FACTORS
            .get(usize::from(tier))
            .map(|factor| (self.cost() as f32 * factor).round() as u32)
    }

    /// Stable key used in saves and logs.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Bolt => "bolt",
            Self::Needle => "needle",
            Self::Venom => "venom",
            Self::Arc => "arc",
            Self::Frost => "frost",
            Self::Beam => "beam",
            Self::Mortar => "mortar",
            Self::Hive => "hive",
            Self::Beacon => "beacon",
            Self::Trap => "trap",
        }
    }

    /// Parses a key produced by [`TurretKind::key`].
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Statistics of a freshly built turret.
    #[must_use]
    pub fn base_stats(self) -> TurretStats {
        let base = TurretStats {
            damage_type: self.damage_type(),
            ..TurretStats::default()
        };
        match self {
            Self::Bolt => TurretStats {
                range: 130.0,
                fire_interval: 0.55,
                damage: 14.0,
                projectile_speed: 520.0,
                hits_flying: 1.0,
                ..base
            },
            Self::Needle => TurretStats {
                range: 220.0,
                fire_interval: 1.6,
                damage: 62.0,
                hits_flying: 1.0,
                ..base
            },
            Self::Venom => TurretStats {
                range: 120.0,
                fire_interval: 0.9,
                damage: 4.0,
                projectile_speed: 420.0,
                dot_dps: 9.0,
                dot_duration: 3.0,
                ..base
            },
            Self::Arc => TurretStats {
                range: 125.0,
                fire_interval: 1.1,
                damage: 22.0,
                chain: 3.0,
                hits_flying: 1.0,
                ..base
            },
            Self::Frost => TurretStats {
                range: 105.0,
                fire_interval: 1.0,
                damage: 6.0,
                cone: 60.0,
                slow_pct: 0.35,
                slow_duration: 1.6,
                ..base
            },
            Self::Beam => TurretStats {
                range: 140.0,
                fire_interval: 0.1,
                damage: 20.0,
                hits_flying: 1.0,
                ..base
            },
            Self::Mortar => TurretStats {
                range: 190.0,
                fire_interval: 2.4,
                damage: 40.0,
                blast: 55.0,
                projectile_speed: 220.0,
                ..base
            },
            Self::Hive => TurretStats {
                range: 150.0,
                fire_interval: 0.8,
                damage: 7.0,
                projectile_speed: 600.0,
                drone_count: 2.0,
                hits_flying: 1.0,
                ..base
            },
            Self::Beacon => TurretStats {
                range: 110.0,
                fire_interval: 1.0,
                aura_damage: 0.12,
                aura_rate: 0.10,
                pulse_every: 8.0,
                hits_flying: 1.0,
                ..base
            },
            Self::Trap => TurretStats {
                range: 70.0,
                fire_interval: 1.5,
                damage: 18.0,
                blast: 40.0,
                slow_pct: 0.25,
                slow_duration: 0.5,
                max_charges: 2.0,
                charge_interval: 6.0,
                zone_duration: 3.0,
                ..base
            },
        }
    }

    /// The two mod options available at `tier`.
    #[must_use]
    pub fn mods(self, tier: u8) -> Option<&'static [ModSpec; 2]> {
        let table = match self {
            Self::Bolt => &BOLT_MODS,
            Self::Needle => &NEEDLE_MODS,
            Self::Venom => &VENOM_MODS,
            Self::Arc => &ARC_MODS,
            Self::Frost => &FROST_MODS,
            Self::Beam => &BEAM_MODS,
            Self::Mortar => &MORTAR_MODS,
            Self::Hive => &HIVE_MODS,
            Self::Beacon => &BEACON_MODS,
            Self::Trap => &TRAP_MODS,
        };
        table.get(usize::from(tier))
    }
}

/// Runtime statistics of a turret. Flags are stored as `0.0` / `1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurretStats {
    /// Damage class of the primary attack.
    pub damage_type: DamageType,
    /// Targeting radius.
    pub range: f32,
    /// Seconds between shots.
    pub fire_interval: f32,
    /// Damage per shot, or per second for beams and zones.
    pub damage: f32,
    /// Extra enemies a projectile may pass through.
    pub pierce: f32,
    /// Chain hops after the primary target.
    pub chain: f32,
    /// Cone width in degrees.
    pub cone: f32,
    /// Area radius for blasts and trap zones.
    pub blast: f32,
    /// Projectile travel speed.
    pub projectile_speed: f32,
    /// Slow strength.
    pub slow_pct: f32,
    /// Slow duration.
    pub slow_duration: f32,
    /// Poison damage per second.
    pub dot_dps: f32,
    /// Poison duration.
    pub dot_duration: f32,
    /// Damage amplification applied by marks.
    pub mark_pct: f32,
    /// Mark duration.
    pub mark_duration: f32,
    /// Chance that a hit stuns.
    pub stun_chance: f32,
    /// Every Nth arc shot releases a net burst; zero disables.
    pub net_every: f32,
    /// Every Nth frost shot releases a freeze pulse; zero disables.
    pub freeze_every: f32,
    /// Beam ramp gained per second on one target.
    pub ramp_rate: f32,
    /// Largest beam ramp bonus.
    pub ramp_max: f32,
    /// Fraction of beam damage split to a second target.
    pub split_fraction: f32,
    /// Passive area damage per second around a beam turret.
    pub chip_dps: f32,
    /// Radius of beam chip damage.
    pub chip_radius: f32,
    /// Sub-blasts released by mortar shells.
    pub cluster_count: f32,
    /// Damage per second of lingering mortar fire.
    pub linger_dps: f32,
    /// Duration of lingering mortar fire.
    pub linger_duration: f32,
    /// Drones launched by a hive.
    pub drone_count: f32,
    /// Damage bonus granted by an aura.
    pub aura_damage: f32,
    /// Fire-rate bonus granted by an aura.
    pub aura_rate: f32,
    /// Seconds between aura pulses; zero disables.
    pub pulse_every: f32,
    /// Trap charge capacity.
    pub max_charges: f32,
    /// Seconds to accumulate one trap charge.
    pub charge_interval: f32,
    /// Lifetime of a deployed trap zone.
    pub zone_duration: f32,
    /// Whether trap kills refund part of the reward.
    pub siphon: f32,
    /// Whether trap zones suppress splitting.
    pub no_split: f32,
    /// Whether the turret may target flying enemies.
    pub hits_flying: f32,
}

impl Default for TurretStats {
    fn default() -> Self {
        Self {
            damage_type: DamageType::Physical,
            range: 0.0,
            fire_interval: 1.0,
            damage: 0.0,
            pierce: 0.0,
            chain: 0.0,
            cone: 0.0,
            blast: 0.0,
            projectile_speed: 0.0,
            slow_pct: 0.0,
            slow_duration: 0.0,
            dot_dps: 0.0,
            dot_duration: 0.0,
            mark_pct: 0.0,
            mark_duration: 0.0,
            stun_chance: 0.0,
            net_every: 0.0,
            freeze_every: 0.0,
            ramp_rate: 0.0,
            ramp_max: 0.0,
            split_fraction: 0.0,
            chip_dps: 0.0,
            chip_radius: 0.0,
            cluster_count: 0.0,
            linger_dps: 0.0,
            linger_duration: 0.0,
            drone_count: 0.0,
            aura_damage: 0.0,
            aura_rate: 0.0,
            pulse_every: 0.0,
            max_charges: 0.0,
            charge_interval: 0.0,
            zone_duration: 0.0,
            siphon: 0.0,
            no_split: 0.0,
            hits_flying: 0.0,
        }
    }
}

/// Numeric turret statistics addressable by mods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum StatKey {
    Range,
    FireInterval,
    Damage,
    Pierce,
    Chain,
    Cone,
    Blast,
    ProjectileSpeed,
    SlowPct,
    SlowDuration,
    DotDps,
    DotDuration,
    MarkPct,
    MarkDuration,
    StunChance,
    NetEvery,
    FreezeEvery,
    RampRate,
    RampMax,
    SplitFraction,
    ChipDps,
    ChipRadius,
    ClusterCount,
    LingerDps,
    LingerDuration,
    DroneCount,
    AuraDamage,
    AuraRate,
    PulseEvery,
    MaxCharges,
    ChargeInterval,
    ZoneDuration,
    Siphon,
    NoSplit,
    HitsFlying,
}

impl StatKey {
    /// Every addressable statistic.
    pub const ALL: [StatKey; 35] = [
        StatKey::Range,
        StatKey::FireInterval,
        StatKey::Damage,
        StatKey::Pierce,
        StatKey::Chain,
        StatKey::Cone,
        StatKey::Blast,
        StatKey::ProjectileSpeed,
        StatKey::SlowPct,
        StatKey::SlowDuration,
        StatKey::DotDps,
        StatKey::DotDuration,
        StatKey::MarkPct,
        StatKey::MarkDuration,
        StatKey::StunChance,
        StatKey::NetEvery,
        StatKey::FreezeEvery,
        StatKey::RampRate,
        StatKey::RampMax,
        StatKey::SplitFraction,
        StatKey::ChipDps,
        StatKey::ChipRadius,
        StatKey::ClusterCount,
        StatKey::LingerDps,
        StatKey::LingerDuration,
        StatKey::DroneCount,
        StatKey::AuraDamage,
        StatKey::AuraRate,
        StatKey::PulseEvery,
        StatKey::MaxCharges,
        StatKey::ChargeInterval,
        StatKey::ZoneDuration,
        StatKey::Siphon,
        StatKey::NoSplit,
        StatKey::HitsFlying,
    ];
}

impl TurretStats {
    /// Reads a statistic.
    #[must_use]
    pub fn get(&self, key: StatKey) -> f32 {
        match key {
            StatKey::Range => self.range,
            StatKey::FireInterval => self.fire_interval,
            StatKey::Damage => self.damage,
            StatKey::Pierce => self.pierce,
            StatKey::Chain => self.chain,
            StatKey::Cone => self.cone,
            StatKey::Blast => self.blast,
            StatKey::ProjectileSpeed => self.projectile_speed,
            StatKey::SlowPct => self.slow_pct,
            StatKey::SlowDuration => self.slow_duration,
            StatKey::DotDps => self.dot_dps,
            StatKey::DotDuration => self.dot_duration,
            StatKey::MarkPct => self.mark_pct,
            StatKey::MarkDuration => self.mark_duration,
            StatKey::StunChance => self.stun_chance,
            StatKey::NetEvery => self.net_every,
            StatKey::FreezeEvery => self.freeze_every,
            StatKey::RampRate => self.ramp_rate,
            StatKey::RampMax => self.ramp_max,
            StatKey::SplitFraction => self.split_fraction,
            StatKey::ChipDps => self.chip_dps,
            StatKey::ChipRadius => self.chip_radius,
            StatKey::ClusterCount => self.cluster_count,
            StatKey::LingerDps => self.linger_dps,
            StatKey::LingerDuration => self.linger_duration,
            StatKey::DroneCount => self.drone_count,
            StatKey::AuraDamage => self.aura_damage,
            StatKey::AuraRate => self.aura_rate,
            StatKey::PulseEvery => self.pulse_every,
            StatKey::MaxCharges => self.max_charges,
            StatKey::ChargeInterval => self.charge_interval,
            StatKey::ZoneDuration => self.zone_duration,
            StatKey::Siphon => self.siphon,
            StatKey::NoSplit => self.no_split,
            StatKey::HitsFlying => self.hits_flying,
        }
    }

    fn slot(&mut self, key: StatKey) -> &mut f32 {
        match key {
            StatKey::Range => &mut self.range,
            StatKey::FireInterval => &mut self.fire_interval,
            StatKey::Damage => &mut self.damage,
            StatKey::Pierce => &mut self.pierce,
            StatKey::Chain => &mut self.chain,
            StatKey::Cone => &mut self.cone,
            StatKey::Blast => &mut self.blast,
            StatKey::ProjectileSpeed => &mut self.projectile_speed,
            StatKey::SlowPct => &mut self.slow_pct,
            StatKey::SlowDuration => &mut self.slow_duration,
            StatKey::DotDps => &mut self.dot_dps,
            StatKey::DotDuration => &mut self.dot_duration,
            StatKey::MarkPct => &mut self.mark_pct,
            StatKey::MarkDuration => &mut self.mark_duration,
            StatKey::StunChance => &mut self.stun_chance,
            StatKey::NetEvery => &mut self.net_every,
            StatKey::FreezeEvery => &mut self.freeze_every,
            StatKey::RampRate => &mut self.ramp_rate,
            StatKey::RampMax => &mut self.ramp_max,
            StatKey::SplitFraction => &mut self.split_fraction,
            StatKey::ChipDps => &mut self.chip_dps,
            StatKey::ChipRadius => &mut self.chip_radius,
            StatKey::ClusterCount => &mut self.cluster_count,
            StatKey::LingerDps => &mut self.linger_dps,
            StatKey::LingerDuration => &mut self.linger_duration,
            StatKey::DroneCount => &mut self.drone_count,
            StatKey::AuraDamage => &mut self.aura_damage,
            StatKey::AuraRate => &mut self.aura_rate,
            StatKey::PulseEvery => &mut self.pulse_every,
            StatKey::MaxCharges => &mut self.max_charges,
            StatKey::ChargeInterval => &mut self.charge_interval,
            StatKey::ZoneDuration => &mut self.zone_duration,
            StatKey::Siphon => &mut self.siphon,
            StatKey::NoSplit => &mut self.no_split,
            StatKey::HitsFlying => &mut self.hits_flying,
        }
    }

    /// Applies one edit.
    pub fn apply_op(&mut self, op: StatOp) {
        match op {
            StatOp::Add(key, value) => *self.slot(key) += value,
            StatOp::Mul(key, value) => *self.slot(key) *= value,
            StatOp::Set(key, value) => *self.slot(key) = value,
        }
        self.slow_pct = self.slow_pct.clamp(0.0, 0.9);
        self.stun_chance = self.stun_chance.clamp(0.0, 1.0);
        self.fire_interval = self.fire_interval.max(0.05);
    }

    /// Applies the mod chosen at `tier` for a turret currently at `level`.
    ///
    /// Tiers are strictly sequential: tier `N` is only accepted at level `N`.
    pub fn apply_mod(
        &mut self,
        kind: TurretKind,
        level: u8,
        tier: u8,
        mod_index: ModIndex,
    ) -> Result<(), UpgradeError> {
        let spec = resolve_mod(kind, level, tier, mod_index)?;
        for op in spec.ops {
            self.apply_op(*op);
        }
        Ok(())
    }

    /// Whether a flag statistic is set.
    #[must_use]
    pub fn flag(&self, key: StatKey) -> bool {
        self.get(key) >= 0.5
    }
}

fn resolve_mod(
    kind: TurretKind,
    level: u8,
    tier: u8,
    mod_index: ModIndex,
) -> Result<&'static ModSpec, UpgradeError> {
    if level >= MAX_LEVEL {
        return Err(UpgradeError::MaxLevel);
    }
    if tier != level {
        return Err(UpgradeError::TierMismatch { level, tier });
    }
    kind.mods(tier)
        .and_then(|options| options.get(usize::from(mod_index)))
        .ok_or(UpgradeError::UnknownMod { mod_index })
}

/// Reasons an upgrade cannot be applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum UpgradeError {
    /// The turret already has every tier.
    #[error("turret is at max level")]
    MaxLevel,
    /// The requested tier does not follow the turret's level.
    #[error("tier {tier} cannot be applied at level {level}")]
    TierMismatch {
        /// Current level.
        level: u8,
        /// Requested tier.
        tier: u8,
    },
    /// No mod exists at that index.
    #[error("no mod at index {mod_index}")]
    UnknownMod {
        /// Requested option.
        mod_index: ModIndex,
    },
}

/// One edit applied by a mod.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatOp {
    /// Adds to a statistic.
    Add(StatKey, f32),
    /// Multiplies a statistic.
    Mul(StatKey, f32),
    /// Overwrites a statistic.
    Set(StatKey, f32),
}

/// A named upgrade option.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModSpec {
    /// Display name.
    pub name: &'static str,
    /// Edits applied in order.
    pub ops: &'static [StatOp],
}

/// Statistics that an upgrade would change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatsDelta {
    /// `(stat, before, after)` for every changed statistic.
    pub changes: Vec<(StatKey, f32, f32)>,
}

impl StatsDelta {
    /// Change of a single statistic, if it changes.
    #[must_use]
    pub fn change(&self, key: StatKey) -> Option<(f32, f32)> {
        self.changes
            .iter()
            .find(|(changed, _, _)| *changed == key)
            .map(|(_, before, after)| (*before, *after))
    }
}

/// Computes what applying `mod_index` at `tier` would change, without
/// touching the turret.
pub fn preview_upgrade(
    kind: TurretKind,
    level: u8,
    stats: &TurretStats,
    tier: u8,
    mod_index: ModIndex,
) -> Result<StatsDelta, UpgradeError> {
    let mut after = *stats;
    after.apply_mod(kind, level, tier, mod_index)?;
    let changes = StatKey::ALL
        .into_iter()
        .filter_map(|key| {
            let (before, next) = (stats.get(key), after.get(key));
            ((before - next).abs() > f32::EPSILON).then_some((key, before, next))
        })
        .collect();
    Ok(StatsDelta { changes })
}

macro_rules! mods {
    ($([$($a:expr),*] / [$($b:expr),*] : $na:literal | $nb:literal),* $(,)?) => {
        [$([
            ModSpec { name: $na, ops: &[$($a),*] },
            ModSpec { name: $nb, ops: &[$($b),*] },
        ]),*]
    };
}

use StatKey as K;
use StatOp::{Add, Mul, Set};

static BOLT_MODS: [[ModSpec; 2]; 5] = mods![
    [Mul(K::Damage, 1.25)] / [Mul(K::FireInterval, 0.85)] : "Sharpened" | "Rapid Feed",
    [Add(K::Range, 20.0)] / [Add(K::Pierce, 1.0)] : "Longbow" | "Piercing",
    [Add(K::Damage, 8.0)] / [Mul(K::FireInterval, 0.8)] : "Heavy Tips" | "Twin Feed",
    [Add(K::StunChance, 0.08)] / [Mul(K::Damage, 1.2), Add(K::Range, 10.0)] : "Shock Rounds" | "Hunter",
    [Add(K::Pierce, 2.0), Mul(K::Damage, 1.3)] / [Mul(K::FireInterval, 0.6)] : "Railbolt" | "Gatling",
];

static NEEDLE_MODS: [[ModSpec; 2]; 5] = mods![
    [Mul(K::Damage, 1.2)] / [Add(K::Range, 40.0)] : "Calibrated" | "Scope",
    [Add(K::MarkPct, 0.15), Add(K::MarkDuration, 3.0)] / [Mul(K::FireInterval, 0.85)] : "Signal Mark" | "Quickload",
    [Add(K::StunChance, 0.15)] / [Add(K::Damage, 30.0)] : "Concussive" | "Hollow Point",
    [Add(K::MarkPct, 0.10), Add(K::MarkDuration, 2.0)] / [Add(K::Pierce, 1.0)] : "Deep Signal" | "Overpenetrate",
    [Mul(K::Damage, 1.5)] / [Mul(K::FireInterval, 0.7)] : "Executioner" | "Twin Barrel",
];

static VENOM_MODS: [[ModSpec; 2]; 5] = mods![
    [Mul(K::DotDps, 1.3)] / [Add(K::DotDuration, 1.5)] : "Potent" | "Lingering",
    [Add(K::Range, 20.0)] / [Mul(K::FireInterval, 0.8)] : "Reach" | "Spray",
    [Add(K::DotDps, 6.0)] / [Add(K::Blast, 30.0)] : "Corrosive" | "Splash",
    [Add(K::SlowPct, 0.2), Add(K::SlowDuration, 1.5)] / [Set(K::HitsFlying, 1.0)] : "Neurotoxin" | "Aerosol",
    [Mul(K::DotDps, 1.6)] / [Add(K::Damage, 10.0), Add(K::DotDuration, 2.0)] : "Plague" | "Catalyst",
];

static ARC_MODS: [[ModSpec; 2]; 5] = mods![
    [Mul(K::Damage, 1.2)] / [Add(K::Chain, 1.0)] : "Capacitor" | "Conductor",
    [Set(K::NetEvery, 4.0)] / [Add(K::Range, 20.0)] : "Net Burst" | "Antenna",
    [Add(K::Damage, 10.0)] / [Add(K::Chain, 2.0)] : "Overload" | "Forked",
    [Set(K::NetEvery, 3.0)] / [Mul(K::FireInterval, 0.8)] : "Tight Net" | "Cycler",
    [Add(K::Chain, 2.0), Mul(K::Damage, 1.25)] / [Mul(K::Damage, 1.5)] : "Storm" | "Ion Core",
];

static FROST_MODS: [[ModSpec; 2]; 5] = mods![
    [Add(K::SlowPct, 0.1)] / [Add(K::Cone, 20.0)] : "Deep Chill" | "Wide Nozzle",
    [Add(K::MarkPct, 0.12), Add(K::MarkDuration, 2.0)] / [Add(K::Range, 20.0)] : "Chill Mark" | "Reach",
    [Set(K::FreezeEvery, 4.0)] / [Add(K::Damage, 8.0)] : "Freeze Pulse" | "Frostbite",
    [Add(K::SlowDuration, 1.0)] / [Mul(K::FireInterval, 0.8)] : "Permafrost" | "Cadence",
    [Add(K::SlowPct, 0.15), Set(K::FreezeEvery, 3.0)] / [Add(K::MarkPct, 0.2), Mul(K::Damage, 1.4)] : "Glacial" | "Shatter",
];

static BEAM_MODS: [[ModSpec; 2]; 5] = mods![
    [Add(K::RampRate, 0.25), Add(K::RampMax, 1.0)] / [Mul(K::Damage, 1.2)] : "Focus" | "Lens",
    [Add(K::SplitFraction, 0.4)] / [Add(K::Range, 25.0)] : "Prism" | "Collimator",
    [Add(K::ChipDps, 6.0), Add(K::ChipRadius, 70.0)] / [Add(K::Damage, 8.0)] : "Scorch" | "Amplify",
    [Add(K::RampMax, 1.0)] / [Add(K::SplitFraction, 0.3)] : "Overfocus" | "Refract",
    [Mul(K::Damage, 1.5)] / [Add(K::ChipDps, 12.0), Add(K::ChipRadius, 30.0)] : "Solar" | "Inferno",
];

static MORTAR_MODS: [[ModSpec; 2]; 5] = mods![
    [Add(K::Blast, 15.0)] / [Mul(K::Damage, 1.25)] : "Big Shells" | "Black Powder",
    [Add(K::ClusterCount, 3.0)] / [Add(K::Range, 40.0)] : "Cluster" | "Longshot",
    [Add(K::LingerDps, 10.0), Add(K::LingerDuration, 3.0)] / [Mul(K::FireInterval, 0.8)] : "Napalm" | "Autoloader",
    [Add(K::ClusterCount, 2.0)] / [Add(K::Damage, 30.0)] : "Bomblets" | "Heavy Charge",
    [Mul(K::LingerDps, 2.0), Add(K::LingerDuration, 2.0)] / [Mul(K::Damage, 1.5), Add(K::Blast, 20.0)] : "Firestorm" | "Siege",
];

static HIVE_MODS: [[ModSpec; 2]; 5] = mods![
    [Add(K::DroneCount, 1.0)] / [Add(K::Damage, 3.0)] : "Extra Drone" | "Stingers",
    [Mul(K::FireInterval, 0.8)] / [Add(K::Range, 30.0)] : "Swarm" | "Patrol",
    [Add(K::DroneCount, 1.0)] / [Add(K::DotDps, 4.0), Add(K::DotDuration, 2.0)] : "Brood" | "Venom Stingers",
    [Mul(K::Damage, 1.3)] / [Add(K::MarkPct, 0.08), Add(K::MarkDuration, 2.0)] : "Hornets" | "Tracers",
    [Add(K::DroneCount, 2.0)] / [Mul(K::Damage, 1.5)] : "Legion" | "Queen",
];

static BEACON_MODS: [[ModSpec; 2]; 5] = mods![
    [Add(K::AuraDamage, 0.06)] / [Add(K::AuraRate, 0.06)] : "Amplifier" | "Metronome",
    [Add(K::Range, 30.0)] / [Mul(K::PulseEvery, 0.75), Set(K::Damage, 10.0)] : "Relay" | "Pulse",
    [Add(K::AuraDamage, 0.08)] / [Add(K::AuraRate, 0.08)] : "Resonance" | "Tempo",
    [Mul(K::PulseEvery, 0.6)] / [Add(K::Range, 40.0)] : "Revealing Pulse" | "Broadcast",
    [Add(K::AuraDamage, 0.12), Add(K::AuraRate, 0.10)] / [Add(K::Damage, 40.0)] : "Overdrive" | "Shockpulse",
];

static TRAP_MODS: [[ModSpec; 2]; 5] = mods![
    [Add(K::MaxCharges, 1.0)] / [Mul(K::ChargeInterval, 0.75)] : "Capacity" | "Quick Charge",
    [Set(K::Siphon, 1.0)] / [Add(K::Damage, 10.0)] : "Siphon" | "Barbs",
    [Add(K::SlowPct, 0.2)] / [Add(K::DotDps, 8.0), Add(K::DotDuration, 3.0)] : "Tar" | "Toxin",
    [Set(K::NoSplit, 1.0)] / [Add(K::Blast, 20.0)] : "Suppressor" | "Wide Plate",
    [Add(K::MaxCharges, 2.0), Mul(K::ChargeInterval, 0.8)] / [Mul(K::Damage, 1.8)] : "Minefield" | "Crusher",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_five_tiers_of_two_mods() {
        for kind in TurretKind::ALL {
            for tier in 0..MAX_LEVEL {
                let options = kind.mods(tier).expect("tier exists");
                assert!(options.iter().all(|spec| !spec.ops.is_empty()));
            }
            assert!(kind.mods(MAX_LEVEL).is_none());
            assert_eq!(TurretKind::from_key(kind.key()), Some(kind));
        }
    }

    #[test]
    fn tiers_must_follow_level() {
        let mut stats = TurretKind::Bolt.base_stats();
        assert_eq!(
            stats.apply_mod(TurretKind::Bolt, 0, 1, 0),
            Err(UpgradeError::TierMismatch { level: 0, tier: 1 })
        );
        assert_eq!(
            stats.apply_mod(TurretKind::Bolt, 5, 5, 0),
            Err(UpgradeError::MaxLevel)
        );
        assert_eq!(
            stats.apply_mod(TurretKind::Bolt, 0, 0, 2),
            Err(UpgradeError::UnknownMod { mod_index: 2 })
        );
        assert_eq!(stats, TurretKind::Bolt.base_stats());
    }

    #[test]
    fn mods_compound() {
        let mut stats = TurretKind::Bolt.base_stats();
        stats.apply_mod(TurretKind::Bolt, 0, 0, 0).expect("tier 0");
        stats.apply_mod(TurretKind::Bolt, 1, 1, 1).expect("tier 1");
        stats.apply_mod(TurretKind::Bolt, 2, 2, 0).expect("tier 2");
        assert!((stats.damage - (14.0 * 1.25 + 8.0)).abs() < 1e-4);
        assert_eq!(stats.pierce, 1.0);
    }

    #[test]
    fn preview_reports_only_changed_stats() {
        let stats = TurretKind::Trap.base_stats();
        let delta = preview_upgrade(TurretKind::Trap, 1, &stats, 1, 0).expect("preview");
        assert_eq!(delta.changes.len(), 1);
        assert_eq!(delta.change(StatKey::Siphon), Some((0.0, 1.0)));
        assert_eq!(delta.change(StatKey::Damage), None);
    }

    #[test]
    fn upgrade_costs_scale_with_tier() {
        assert_eq!(TurretKind::Bolt.upgrade_cost(0), Some(35));
        assert_eq!(TurretKind::Bolt.upgrade_cost(4), Some(130));
        assert_eq!(TurretKind::Bolt.upgrade_cost(5), None);
    }
}
