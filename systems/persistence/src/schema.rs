//! Persisted save schema.
//!
//! Every struct defaults missing fields so blobs written by older builds still
//! parse. Enum-like values travel as stable string keys.

use echo_defence_core::{
    enemies::MAX_ARMOR, turrets::MAX_LEVEL, MapData, SpawnEvent, TargetMode, WaveScalar,
};
use serde::{Deserialize, Serialize};

/// Schema version written by this build.
pub const SAVE_VERSION: u32 = 1;

/// Entire mutable run state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveState {
    /// Schema version the blob was written with.
    pub version: u32,
    /// Zero-based level index.
    pub level_index: u32,
    /// Seed of the current map.
    pub map_seed: u32,
    /// Environment of the current map.
    pub env_id: u32,
    /// Normalised map geometry at save time.
    pub map_data: Option<MapData>,
    /// Gold held.
    pub gold: u32,
    /// Lives left.
    pub lives: u32,
    /// Last wave started, one-based; zero before the first wave.
    pub wave: u32,
    /// Waves in the level.
    pub wave_max: u32,
    /// Whether the first wave of the level has started.
    pub has_started: bool,
    /// Whether a wave is in progress.
    pub wave_active: bool,
    /// Whether an intermission countdown is running.
    pub intermission: bool,
    /// Seconds left in the intermission.
    pub intermission_remaining: f32,
    /// Damage buff earned by skipping.
    pub skip_buff: f32,
    /// Key of the active wave anomaly.
    pub wave_anomaly_key: Option<String>,
    /// Speed multiplier.
    pub speed: u8,
    /// Seconds since the active wave began spawning.
    pub spawn_elapsed: f32,
    /// Spawns not yet released.
    pub pending_spawns: Vec<SpawnEvent>,
    /// Overclock recharge left.
    pub overclock_cooldown: f32,
    /// Overclock active time left.
    pub overclock_active: f32,
    /// Shockwave recharge left.
    pub shockwave_cooldown: f32,
    /// Materialised tile states.
    pub tiles: Vec<TileRecord>,
    /// Turrets on the board.
    pub turrets: Vec<TurretRecord>,
    /// Living enemies.
    pub enemies: Vec<EnemyRecord>,
    /// Deployed trap zones.
    pub traps: Vec<ZoneRecord>,
    /// Lingering damage zones.
    pub lingering: Vec<ZoneRecord>,
    /// UI layout hints.
    pub layout: LayoutHints,
}

impl Default for SaveState {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            level_index: 0,
            map_seed: 0,
            env_id: 0,
            map_data: None,
            gold: 0,
            lives: 0,
            wave: 0,
            wave_max: 0,
            has_started: false,
            wave_active: false,
            intermission: false,
            intermission_remaining: 0.0,
            skip_buff: 0.0,
            wave_anomaly_key: None,
            speed: 1,
            spawn_elapsed: 0.0,
            pending_spawns: Vec::new(),
            overclock_cooldown: 0.0,
            overclock_active: 0.0,
            shockwave_cooldown: 0.0,
            tiles: Vec::new(),
            turrets: Vec::new(),
            enemies: Vec::new(),
            traps: Vec::new(),
            lingering: Vec::new(),
            layout: LayoutHints::default(),
        }
    }
}

/// Persisted tile state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileRecord {
    /// Grid column.
    pub gx: u32,
    /// Grid row.
    pub gy: u32,
    /// Corruption flag.
    pub corrupted: bool,
    /// Cleanse cost.
    pub cleanse_cost: u32,
    /// Power tile purchase flag.
    pub power_purchased: bool,
    /// Power tile unlock cost.
    pub power_unlock_cost: u32,
}

/// Persisted turret.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretRecord {
    /// Turret identifier.
    pub id: u32,
    /// Archetype key.
    pub type_key: String,
    /// World x of the turret centre.
    pub x: f32,
    /// World y of the turret centre.
    pub y: f32,
    /// Grid column.
    pub gx: u32,
    /// Grid row.
    pub gy: u32,
    /// Upgrade level.
    pub level: u8,
    /// Mod chosen at each tier, in order.
    pub mods_chosen: Vec<u8>,
    /// Seconds until the next shot.
    pub cool: f32,
    /// Trap charges held.
    pub charges: f32,
    /// Progress towards the next trap charge.
    pub charge_timer: f32,
    /// Targeting policy.
    pub target_mode: TargetMode,
    /// Whether the turret sits on a purchased power tile.
    pub boosted: bool,
    /// Shots fired, driving periodic effects.
    pub shots: u32,
    /// Beam ramp accumulated on the current target.
    pub ramp: f32,
    /// Seconds until the next aura pulse.
    pub pulse_timer: f32,
    /// Per-drone cooldowns.
    pub drones: Vec<f32>,
    /// Gold invested, used for refunds.
    pub invested: u32,
}

/// Persisted enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyRecord {
    /// Enemy identifier.
    pub id: u32,
    /// Archetype key.
    pub type_key: String,
    /// Elite tag key.
    pub elite_tag: Option<String>,
    /// Current health.
    pub hp: f32,
    /// Maximum health.
    pub max_hp: f32,
    /// Current shield.
    pub shield: f32,
    /// Maximum shield.
    pub max_shield: f32,
    /// Armour fraction.
    pub armor: f32,
    /// Distance walked along the path.
    pub path_d: f32,
    /// Slow strength.
    pub slow: f32,
    /// Slow time left.
    pub slow_t: f32,
    /// Poison damage per second.
    pub dot: f32,
    /// Poison time left.
    pub dot_t: f32,
    /// Whether the enemy is revealed.
    pub revealed: bool,
    /// Reveal time left.
    pub reveal_t: f32,
    /// Mark amplification.
    pub marked: f32,
    /// Mark time left.
    pub marked_t: f32,
    /// Whether splitting is suppressed.
    pub no_split: bool,
    /// Split suppression time left.
    pub no_split_t: f32,
    /// Wave factors the enemy spawned with.
    pub scalar: WaveScalar,
    /// Whether the enemy is a miniboss or boss.
    pub is_miniboss: bool,
    /// Seconds until the next behaviour action.
    pub behavior_timer: f32,
}

impl Default for EnemyRecord {
    fn default() -> Self {
        Self {
            id: 0,
            type_key: String::new(),
            elite_tag: None,
            hp: 1.0,
            max_hp: 1.0,
            shield: 0.0,
            max_shield: 0.0,
            armor: 0.0,
            path_d: 0.0,
            slow: 0.0,
            slow_t: 0.0,
            dot: 0.0,
            dot_t: 0.0,
            revealed: false,
            reveal_t: 0.0,
            marked: 0.0,
            marked_t: 0.0,
            no_split: false,
            no_split_t: 0.0,
            scalar: WaveScalar::IDENTITY,
            is_miniboss: false,
            behavior_timer: 0.0,
        }
    }
}

/// Persisted trap or lingering zone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneRecord {
    /// Turret that created the zone.
    pub owner: u32,
    /// World x of the centre.
    pub x: f32,
    /// World y of the centre.
    pub y: f32,
    /// Radius in world units.
    pub radius: f32,
    /// Damage per second.
    pub dps: f32,
    /// Slow applied to enemies inside.
    pub slow: f32,
    /// Poison damage per second applied to enemies inside.
    pub dot: f32,
    /// Seconds left.
    pub remaining: f32,
    /// Whether kills refund part of the reward.
    pub siphon: bool,
    /// Whether the zone suppresses splitting.
    pub no_split: bool,
}

/// Interface state restored for convenience.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutHints {
    /// Selected turret identifier.
    pub selected_turret: Option<u32>,
    /// Turret kind key held in build mode.
    pub build_mode: Option<String>,
    /// Whether the run was paused.
    pub paused: bool,
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn non_negative(value: f32) -> f32 {
    finite_or(value, 0.0).max(0.0)
}

fn fraction(value: f32, max: f32) -> f32 {
    non_negative(value).min(max)
}

impl SaveState {
    /// Returns a copy with every numeric field within its valid range.
    ///
    /// Non-finite values fall back to safe defaults.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.speed = self.speed.clamp(1, 4);
        self.intermission_remaining = non_negative(self.intermission_remaining);
        self.skip_buff = fraction(self.skip_buff, 1.0);
        self.spawn_elapsed = non_negative(self.spawn_elapsed);
        self.overclock_cooldown = non_negative(self.overclock_cooldown);
        self.overclock_active = non_negative(self.overclock_active);
        self.shockwave_cooldown = non_negative(self.shockwave_cooldown);
        self.pending_spawns.retain(|spawn| spawn.time.is_finite());
        for spawn in &mut self.pending_spawns {
            spawn.time = spawn.time.max(0.0);
            spawn.scalar = spawn.scalar.sanitized();
        }
        for tile in &mut self.tiles {
            tile.cleanse_cost = tile.cleanse_cost.max(1);
            tile.power_unlock_cost = tile.power_unlock_cost.max(1);
        }
        for turret in &mut self.turrets {
            turret.sanitize();
        }
        for enemy in &mut self.enemies {
            enemy.sanitize();
        }
        for zone in self.traps.iter_mut().chain(self.lingering.iter_mut()) {
            zone.sanitize();
        }
        self
    }
}

impl TurretRecord {
    fn sanitize(&mut self) {
        self.x = finite_or(self.x, 0.0);
        self.y = finite_or(self.y, 0.0);
        self.level = self.level.min(MAX_LEVEL);
        self.mods_chosen.truncate(usize::from(self.level));
        self.level = self.mods_chosen.len() as u8;
        self.cool = non_negative(self.cool);
        self.charges = non_negative(self.charges);
        self.charge_timer = non_negative(self.charge_timer);
        self.ramp = non_negative(self.ramp);
        self.pulse_timer = non_negative(self.pulse_timer);
        for drone in &mut self.drones {
            *drone = non_negative(*drone);
        }
    }
}

impl EnemyRecord {
    fn sanitize(&mut self) {
        self.max_hp = finite_or(self.max_hp, 1.0).max(1.0);
        self.hp = finite_or(self.hp, self.max_hp).clamp(0.0, self.max_hp);
        self.max_shield = non_negative(self.max_shield);
        self.shield = fraction(self.shield, self.max_shield);
        self.armor = fraction(self.armor, MAX_ARMOR);
        self.path_d = non_negative(self.path_d);
        self.slow = fraction(self.slow, 0.95);
        self.slow_t = non_negative(self.slow_t);
        self.dot = non_negative(self.dot);
        self.dot_t = non_negative(self.dot_t);
        self.reveal_t = non_negative(self.reveal_t);
        self.marked = fraction(self.marked, 2.0);
        self.marked_t = non_negative(self.marked_t);
        self.no_split_t = non_negative(self.no_split_t);
        self.behavior_timer = non_negative(self.behavior_timer);
        self.scalar = self.scalar.sanitized();
    }
}

impl ZoneRecord {
    fn sanitize(&mut self) {
        self.x = finite_or(self.x, 0.0);
        self.y = finite_or(self.y, 0.0);
        self.radius = non_negative(self.radius);
        self.dps = non_negative(self.dps);
        self.slow = fraction(self.slow, 0.95);
        self.dot = non_negative(self.dot);
        self.remaining = non_negative(self.remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_enemy_fields() {
        let state = SaveState {
            enemies: vec![EnemyRecord {
                hp: f32::NAN,
                max_hp: 200.0,
                shield: 90.0,
                max_shield: 40.0,
                armor: 3.0,
                slow_t: -2.0,
                path_d: f32::NEG_INFINITY,
                ..EnemyRecord::default()
            }],
            speed: 0,
            ..SaveState::default()
        }
        .sanitized();
        let enemy = &state.enemies[0];
        assert_eq!(enemy.hp, 200.0);
        assert_eq!(enemy.shield, 40.0);
        assert_eq!(enemy.armor, MAX_ARMOR);
        assert_eq!(enemy.slow_t, 0.0);
        assert_eq!(enemy.path_d, 0.0);
        assert_eq!(state.speed, 1);
    }

    #[test]
    fn sanitize_keeps_turret_level_consistent_with_mods() {
        let state = SaveState {
            turrets: vec![TurretRecord {
                level: 9,
                mods_chosen: vec![0, 1],
                cool: f32::NAN,
                ..TurretRecord::default()
            }],
            ..SaveState::default()
        }
        .sanitized();
        assert_eq!(state.turrets[0].level, 2);
        assert_eq!(state.turrets[0].cool, 0.0);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let state: SaveState =
            serde_json::from_str(r#"{ "gold": 40, "enemies": [{ "type_key": "grunt" }] }"#)
                .expect("legacy blob parses");
        assert_eq!(state.gold, 40);
        assert_eq!(state.speed, 1);
        assert_eq!(state.enemies[0].max_hp, 1.0);
        assert_eq!(state.enemies[0].scalar, WaveScalar::IDENTITY);
    }
}
