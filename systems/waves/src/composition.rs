//! Spawn queue composition.
//!
//! Enemy-type weighting, jitter, elite rolls and anomalies draw from a caller
//! supplied RNG so wave variety stays a gameplay feature. The level boss is
//! the exception and is picked reproducibly per map instance.

use echo_defence_core::{
    EliteTag, EnemyKind, SeededRng, SpawnEvent, WaveAnomaly, WaveScalar, BOSS_ROSTER,
};
use rand::{distributions::WeightedIndex, seq::SliceRandom, Rng};
use rand_distr::{Distribution, Normal};
use sha2::{Digest, Sha256};

use crate::scaling::wave_scalar;

/// Wave from which every seventh spawn is forced armoured.
pub const FORCED_ARMOR_WAVE: u32 = 12;
/// Spawn period of the forced armoured override.
pub const FORCED_ARMOR_PERIOD: usize = 7;
/// Waves divisible by this append a punctuation sub-wave and a miniboss.
pub const PUNCTUATION_PERIOD: u32 = 5;
/// Elite tags are rolled on waves above this one.
pub const ELITE_WAVE: u32 = 7;
/// Highest per-spawn elite probability.
pub const ELITE_CHANCE_CAP: f64 = 0.18;
/// First wave that may carry an anomaly.
pub const ANOMALY_WAVE: u32 = 6;
/// Probability that an eligible wave carries an anomaly.
pub const ANOMALY_CHANCE: f64 = 0.35;
/// Tightest spacing between consecutive spawns.
pub const MIN_SPACING: f32 = 0.32;

const MAX_COUNT: usize = 90;
const EARLY_WAVES: [(usize, f32); 4] = [(8, 1.1), (10, 1.0), (12, 0.9), (14, 0.85)];
const BOSS_LABEL: &[u8] = b"echo-defence/boss";

/// Enemy archetypes that join the pool at a wave threshold, with pick weights.
pub const UNLOCKS: [(u32, EnemyKind, f64); 10] = [
    (1, EnemyKind::Grunt, 5.0),
    (2, EnemyKind::Runner, 3.0),
    (3, EnemyKind::Armored, 2.5),
    (4, EnemyKind::Splitter, 2.0),
    (5, EnemyKind::Flyer, 2.0),
    (6, EnemyKind::Shielded, 2.0),
    (7, EnemyKind::Regenerator, 1.6),
    (8, EnemyKind::Wraith, 1.4),
    (9, EnemyKind::Warden, 1.0),
    (10, EnemyKind::Herald, 1.0),
];

/// Inputs describing which wave to compose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveContext {
    /// One-based wave number.
    pub wave: u32,
    /// Zero-based level index.
    pub level_index: u32,
    /// Seed of the current map.
    pub map_seed: u32,
    /// Waves in the level; the last one is the boss wave.
    pub waves_per_level: u32,
}

impl WaveContext {
    /// Whether the wave is the level's boss wave.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.wave >= self.waves_per_level
    }
}

/// Composed wave.
#[derive(Clone, Debug, PartialEq)]
pub struct WavePlan {
    /// One-based wave number.
    pub wave: u32,
    /// Factors shared by every spawn of the wave.
    pub scalar: WaveScalar,
    /// Anomaly rolled for the wave.
    pub anomaly: Option<WaveAnomaly>,
    /// Spawns sorted ascending by time.
    pub spawns: Vec<SpawnEvent>,
}

/// Archetypes unlocked by `wave`, with their pick weights.
#[must_use]
pub fn unlocked_pool(wave: u32) -> Vec<(EnemyKind, f64)> {
    UNLOCKS
        .iter()
        .filter(|(threshold, _, _)| *threshold <= wave.max(1))
        .map(|(_, kind, weight)| (*kind, *weight))
        .collect()
}

/// Spawn count and spacing before level and anomaly adjustments.
#[must_use]
pub fn count_and_spacing(wave: u32) -> (usize, f32) {
    let wave = wave.max(1);
    if let Some(early) = EARLY_WAVES.get(wave as usize - 1) {
        return *early;
    }
    let n = wave as usize;
    let count = (12 + 2 * n + n * n / 12).min(MAX_COUNT);
    let spacing = (0.9 - 0.03 * wave as f32).max(MIN_SPACING);
    (count, spacing)
}

/// Per-spawn elite probability for `wave`.
#[must_use]
pub fn elite_chance(wave: u32) -> f64 {
    if wave <= ELITE_WAVE {
        return 0.0;
    }
    (0.04 + 0.01 * f64::from(wave - ELITE_WAVE - 1)).min(ELITE_CHANCE_CAP)
}

/// Boss closing level `level_index` of the map seeded with `map_seed`.
#[must_use]
pub fn boss_for_level(map_seed: u32, level_index: u32) -> EnemyKind {
    let mut hasher = Sha256::new();
    hasher.update(BOSS_LABEL);
    hasher.update(map_seed.to_le_bytes());
    hasher.update(level_index.to_le_bytes());
    let digest = hasher.finalize();
    let seed = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    SeededRng::new(seed)
        .pick(&BOSS_ROSTER)
        .copied()
        .unwrap_or(EnemyKind::Colossus)
}

/// Composes the spawn queue for a wave.
pub fn build_wave<R: Rng + ?Sized>(context: &WaveContext, rng: &mut R) -> WavePlan {
    let base = wave_scalar(context.wave, context.level_index);

    if context.is_final() {
        let boss = boss_for_level(context.map_seed, context.level_index);
        return WavePlan {
            wave: context.wave,
            scalar: base,
            anomaly: None,
            spawns: vec![SpawnEvent {
                time: 0.0,
                kind: boss,
                scalar: base,
                elite: None,
                is_miniboss: true,
            }],
        };
    }

    let anomaly = if context.wave >= ANOMALY_WAVE && rng.gen_bool(ANOMALY_CHANCE) {
        WaveAnomaly::ALL.choose(rng).copied()
    } else {
        None
    };
    let scalar = anomaly.map_or(base, |anomaly| anomaly.adjust(base).sanitized());

    let (count, spacing) = count_and_spacing(context.wave);
    let count = (count + 4 * context.level_index as usize).min(MAX_COUNT);
    let spacing = anomaly.map_or(spacing, |anomaly| {
        (spacing * anomaly.spacing_multiplier()).max(MIN_SPACING)
    });

    let pool = unlocked_pool(context.wave);
    let picker = WeightedIndex::new(pool.iter().map(|(_, weight)| *weight)).ok();
    let jitter = Normal::new(0.0_f32, 0.08 * spacing).ok();
    let elite_p = elite_chance(context.wave);

    let mut spawns = Vec::with_capacity(count + 4);
    for index in 0..count {
        let forced = context.wave >= FORCED_ARMOR_WAVE && (index + 1) % FORCED_ARMOR_PERIOD == 0;
        let kind = if forced {
            EnemyKind::Armored
        } else {
            picker
                .as_ref()
                .and_then(|picker| pool.get(picker.sample(rng)))
                .map_or(EnemyKind::Grunt, |(kind, _)| *kind)
        };
        let offset = jitter.map_or(0.0, |normal| {
            normal.sample(rng).clamp(-0.35 * spacing, 0.35 * spacing)
        });
        let elite = if elite_p > 0.0 && rng.gen_bool(elite_p) {
            EliteTag::ALL.choose(rng).copied()
        } else {
            None
        };
        spawns.push(SpawnEvent {
            time: (index as f32 * spacing + offset).max(0.0),
            kind,
            scalar,
            elite,
            is_miniboss: false,
        });
    }

    if context.wave % PUNCTUATION_PERIOD == 0 {
        append_punctuation(&mut spawns, &pool, scalar, count as f32 * spacing, rng);
    }

    spawns.sort_by(|a, b| a.time.total_cmp(&b.time));

    WavePlan {
        wave: context.wave,
        scalar,
        anomaly,
        spawns,
    }
}

fn append_punctuation<R: Rng + ?Sized>(
    spawns: &mut Vec<SpawnEvent>,
    pool: &[(EnemyKind, f64)],
    scalar: WaveScalar,
    end: f32,
    rng: &mut R,
) {
    let strong: Vec<EnemyKind> = pool
        .iter()
        .map(|(kind, _)| *kind)
        .filter(|kind| !matches!(kind, EnemyKind::Grunt | EnemyKind::Runner))
        .collect();
    let hardened = WaveScalar {
        hp: scalar.hp * 1.5,
        ..scalar
    };
    for step in 0..3 {
        let kind = strong.choose(rng).copied().unwrap_or(EnemyKind::Armored);
        spawns.push(SpawnEvent {
            time: end + 1.5 + 0.8 * step as f32,
            kind,
            scalar: hardened,
            elite: None,
            is_miniboss: false,
        });
    }
    spawns.push(SpawnEvent {
        time: end + 4.5,
        kind: EnemyKind::Juggernaut,
        scalar,
        elite: None,
        is_miniboss: true,
    });
}
