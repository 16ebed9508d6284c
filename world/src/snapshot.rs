//! Conversion between the live world and its save schema.
//!
//! Capturing is infallible. Restoring rebuilds every piece of state on the
//! side and only touches the world once the whole save has been accepted.

use std::collections::BTreeSet;

use glam::Vec2;
use log::debug;
use thiserror::Error;

use echo_defence_core::{
    config::{SimulationConfig, LEVEL_TRANSITION_SECONDS, MAX_SPEED},
    CellCoord, EliteTag, EnemyId, EnemyKind, PathGraph, TurretId, TurretKind, UpgradeError,
    WaveAnomaly,
};
use echo_defence_system_combat::{
    enemy::COLOSSUS_SURGE_THRESHOLD, Enemy, EnemyBehavior, EntityRegistry, StatusEffects, Turret,
    TurretState, Zone, ZoneKind,
};
use echo_defence_system_map_generation::{MapGenerator, MapGeneratorConfig};
use echo_defence_system_persistence::{
    decode, EnemyRecord, LayoutHints, SaveError, SaveState, TileRecord, TurretRecord, ZoneRecord,
    SAVE_VERSION,
};
use echo_defence_system_tiles::{TileState, TileStateStore};
use echo_defence_system_waves::WaveScheduler;

use crate::{abilities::AbilityTimers, phase::Phase, Level, World};

/// Reasons a save blob cannot be applied. The running world is left untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The blob could not be decoded.
    #[error(transparent)]
    Decode(#[from] SaveError),
    /// A turret record names an unknown archetype.
    #[error("unknown turret type '{0}'")]
    UnknownTurret(String),
    /// An enemy record names an unknown archetype.
    #[error("unknown enemy type '{0}'")]
    UnknownEnemy(String),
    /// A turret's upgrade history cannot be replayed.
    #[error("turret upgrade history is invalid: {0}")]
    Upgrade(#[from] UpgradeError),
    /// Two turrets claim the same cell.
    #[error("two turrets occupy cell {0:?}")]
    Overlap(CellCoord),
}

pub(crate) fn capture(world: &World) -> SaveState {
    let (intermission, intermission_remaining) = match world.phase {
        Phase::Intermission { remaining } => (true, remaining),
        _ => (false, 0.0),
    };
    SaveState {
        version: SAVE_VERSION,
        level_index: world.level.index,
        map_seed: world.level.seed,
        env_id: world.level.env_id,
        map_data: Some(world.level.map.clone()),
        gold: world.gold,
        lives: world.lives,
        wave: world.wave,
        wave_max: world.config.waves_per_level,
        has_started: world.has_started,
        wave_active: world.phase == Phase::WaveActive,
        intermission,
        intermission_remaining,
        skip_buff: world.skip_buff,
        wave_anomaly_key: world.anomaly.map(|anomaly| anomaly.key().to_owned()),
        speed: world.speed,
        spawn_elapsed: world.scheduler.elapsed(),
        pending_spawns: world.scheduler.pending().to_vec(),
        overclock_cooldown: world.abilities.overclock_cooldown,
        overclock_active: world.abilities.overclock_active,
        shockwave_cooldown: world.abilities.shockwave_cooldown,
        tiles: world
            .level
            .tiles
            .entries()
            .map(|(cell, state)| tile_record(cell, state))
            .collect(),
        turrets: world.registry.turrets().iter().map(turret_record).collect(),
        enemies: world
            .registry
            .enemies()
            .iter()
            .filter(|enemy| !enemy.handled)
            .map(enemy_record)
            .collect(),
        traps: world.registry.traps().iter().map(zone_record).collect(),
        lingering: world.registry.lingering().iter().map(zone_record).collect(),
        layout: LayoutHints {
            selected_turret: world.selected.map(|id| id.get()),
            build_mode: world.build_mode.map(|kind| kind.key().to_owned()),
            paused: world.paused,
        },
    }
}

fn tile_record(cell: CellCoord, state: TileState) -> TileRecord {
    TileRecord {
        gx: cell.column(),
        gy: cell.row(),
        corrupted: state.corrupted,
        cleanse_cost: state.cleanse_cost,
        power_purchased: state.power_purchased,
        power_unlock_cost: state.power_unlock_cost,
    }
}

fn turret_record(turret: &Turret) -> TurretRecord {
    let mut record = TurretRecord {
        id: turret.id.get(),
        type_key: turret.kind.key().to_owned(),
        x: turret.position.x,
        y: turret.position.y,
        gx: turret.cell.column(),
        gy: turret.cell.row(),
        level: turret.level,
        mods_chosen: turret.mods.clone(),
        cool: turret.cooldown,
        target_mode: turret.target_mode,
        boosted: turret.boosted,
        invested: turret.invested,
        ..TurretRecord::default()
    };
    match &turret.state {
        TurretState::Basic => {}
        TurretState::Arc { shots } | TurretState::Frost { shots } => record.shots = *shots,
        TurretState::Beam { ramp, .. } => record.ramp = *ramp,
        TurretState::Hive { drones } => record.drones = drones.clone(),
        TurretState::Beacon { pulse_timer } => record.pulse_timer = *pulse_timer,
        TurretState::Trap {
            charges,
            charge_timer,
        } => {
            record.charges = *charges as f32;
            record.charge_timer = *charge_timer;
        }
    }
    record
}

fn enemy_record(enemy: &Enemy) -> EnemyRecord {
    EnemyRecord {
        id: enemy.id.get(),
        type_key: enemy.kind.key().to_owned(),
        elite_tag: enemy.elite.map(|tag| tag.key().to_owned()),
        hp: enemy.hp,
        max_hp: enemy.max_hp,
        shield: enemy.shield,
        max_shield: enemy.max_shield,
        armor: enemy.armor,
        path_d: enemy.path_distance,
        slow: enemy.status.slow,
        slow_t: enemy.status.slow_t,
        dot: enemy.status.dot,
        dot_t: enemy.status.dot_t,
        revealed: enemy.status.revealed,
        reveal_t: enemy.status.reveal_t,
        marked: enemy.status.mark,
        marked_t: enemy.status.mark_t,
        no_split: enemy.status.no_split_t > 0.0,
        no_split_t: enemy.status.no_split_t,
        scalar: enemy.scalar,
        is_miniboss: enemy.is_miniboss,
        behavior_timer: enemy.behavior.timer(),
    }
}

fn zone_record(zone: &Zone) -> ZoneRecord {
    ZoneRecord {
        owner: zone.owner.get(),
        x: zone.position.x,
        y: zone.position.y,
        radius: zone.radius,
        dps: zone.dps,
        slow: zone.slow,
        dot: zone.dot,
        remaining: zone.remaining,
        siphon: zone.siphon,
        no_split: zone.no_split,
    }
}

/// Fully validated state waiting to replace the running one.
#[derive(Debug)]
pub(crate) struct Restored {
    level: Level,
    registry: EntityRegistry,
    scheduler: WaveScheduler,
    phase: Phase,
    abilities: AbilityTimers,
    gold: u32,
    lives: u32,
    wave: u32,
    has_started: bool,
    anomaly: Option<WaveAnomaly>,
    skip_buff: f32,
    speed: u8,
    paused: bool,
    build_mode: Option<TurretKind>,
    selected: Option<TurretId>,
}

impl Restored {
    /// Moves the restored state into `world`, keeping its seeds and adapters.
    pub(crate) fn install(self, world: &mut World) {
        world.level = self.level;
        world.registry = self.registry;
        world.scheduler = self.scheduler;
        world.phase = self.phase;
        world.abilities = self.abilities;
        world.gold = self.gold;
        world.lives = self.lives;
        world.wave = self.wave;
        world.has_started = self.has_started;
        world.anomaly = self.anomaly;
        world.skip_buff = self.skip_buff;
        world.speed = self.speed;
        world.paused = self.paused;
        world.build_mode = self.build_mode;
        world.selected = self.selected;
    }
}

/// Decodes `blob` and rebuilds the run it describes.
pub(crate) fn restore(config: &SimulationConfig, blob: &str) -> Result<Restored, LoadError> {
    let state = decode(blob)?;

    let map = match state.map_data {
        Some(map) if map.path_n.len() >= 2 => map,
        _ => {
            debug!(
                "save carries no usable map, regenerating {}/{}",
                state.map_seed, state.env_id
            );
            MapGenerator::new(MapGeneratorConfig::from_simulation(config))
                .generate(state.map_seed, state.env_id)
        }
    };
    let mut tiles = TileStateStore::new(map.seed, state.level_index);
    tiles.restore(state.tiles.iter().map(|record| {
        (
            CellCoord::new(record.gx, record.gy),
            TileState {
                corrupted: record.corrupted,
                cleanse_cost: record.cleanse_cost,
                power_purchased: record.power_purchased,
                power_unlock_cost: record.power_unlock_cost,
            },
        )
    }));
    let level = Level::from_map(config, state.level_index, map, tiles);

    let mut registry = EntityRegistry::new();
    let mut occupied = BTreeSet::new();
    for record in &state.turrets {
        let turret = restore_turret(record, level.layout.cell_size())?;
        if !occupied.insert(turret.cell) {
            return Err(LoadError::Overlap(turret.cell));
        }
        registry.insert_turret(turret);
    }
    let path = level.layout.path();
    for record in state.enemies.iter().filter(|record| record.hp > 0.0) {
        registry.insert_enemy(restore_enemy(record, path)?);
    }
    for record in &state.traps {
        registry.insert_trap(restore_zone(record, ZoneKind::Trap));
    }
    for record in &state.lingering {
        registry.insert_lingering(restore_zone(record, ZoneKind::Lingering));
    }

    let wave_max = state.wave_max.max(1);
    let phase = if state.lives == 0 {
        Phase::Defeat
    } else if state.wave_active {
        Phase::WaveActive
    } else if state.intermission {
        Phase::Intermission {
            remaining: state
                .intermission_remaining
                .min(config.intermission_seconds.max(0.0)),
        }
    } else if state.has_started && state.wave >= wave_max {
        Phase::LevelTransition {
            remaining: LEVEL_TRANSITION_SECONDS,
        }
    } else {
        Phase::Building
    };

    let mut scheduler = WaveScheduler::new();
    if phase == Phase::WaveActive {
        scheduler.restore(state.pending_spawns, state.spawn_elapsed);
    }

    let selected = state
        .layout
        .selected_turret
        .map(TurretId::new)
        .filter(|id| registry.turret(*id).is_some());

    Ok(Restored {
        level,
        registry,
        scheduler,
        phase,
        abilities: AbilityTimers {
            overclock_cooldown: state.overclock_cooldown,
            overclock_active: state.overclock_active,
            shockwave_cooldown: state.shockwave_cooldown,
        },
        gold: state.gold,
        lives: state.lives,
        wave: state.wave,
        has_started: state.has_started,
        anomaly: state
            .wave_anomaly_key
            .as_deref()
            .and_then(WaveAnomaly::from_key),
        skip_buff: state.skip_buff,
        speed: state.speed.clamp(1, MAX_SPEED),
        paused: state.layout.paused,
        build_mode: state
            .layout
            .build_mode
            .as_deref()
            .and_then(TurretKind::from_key),
        selected,
    })
}

/// Rebuilds a turret by replaying its mods tier by tier, then restores the
/// runtime state the replay cannot derive.
fn restore_turret(record: &TurretRecord, cell_size: f32) -> Result<Turret, LoadError> {
    let kind = TurretKind::from_key(&record.type_key)
        .ok_or_else(|| LoadError::UnknownTurret(record.type_key.clone()))?;
    let mut turret = Turret::replay(
        TurretId::new(record.id),
        kind,
        CellCoord::new(record.gx, record.gy),
        cell_size,
        record.boosted,
        &record.mods_chosen,
    )?;
    turret.target_mode = record.target_mode;
    turret.cooldown = record.cool;
    turret.invested = if record.invested > 0 {
        record.invested
    } else {
        (0..turret.level)
            .filter_map(|tier| kind.upgrade_cost(tier))
            .fold(kind.cost(), u32::saturating_add)
    };

    let pulse_every = turret.stats.pulse_every;
    match &mut turret.state {
        TurretState::Basic => {}
        TurretState::Arc { shots } | TurretState::Frost { shots } => *shots = record.shots,
        TurretState::Beam { ramp, .. } => *ramp = record.ramp,
        TurretState::Hive { drones } => {
            for (drone, saved) in drones.iter_mut().zip(&record.drones) {
                *drone = *saved;
            }
        }
        TurretState::Beacon { pulse_timer } => *pulse_timer = record.pulse_timer.min(pulse_every),
        TurretState::Trap {
            charges,
            charge_timer,
        } => {
            *charges = record.charges as u32;
            *charge_timer = record.charge_timer;
        }
    }
    Ok(turret)
}

fn restore_enemy(record: &EnemyRecord, path: &PathGraph) -> Result<Enemy, LoadError> {
    let kind = EnemyKind::from_key(&record.type_key)
        .ok_or_else(|| LoadError::UnknownEnemy(record.type_key.clone()))?;
    let elite = record.elite_tag.as_deref().and_then(EliteTag::from_key);
    let mut enemy = Enemy::new(
        EnemyId::new(record.id),
        kind,
        elite,
        record.scalar,
        record.is_miniboss,
    );
    enemy.max_hp = record.max_hp;
    enemy.hp = record.hp;
    enemy.max_shield = record.max_shield;
    enemy.shield = record.shield;
    enemy.armor = record.armor;
    enemy.path_distance = record.path_d.min(path.total_length());
    enemy.position = path.point_at(enemy.path_distance);
    enemy.status = StatusEffects {
        slow: record.slow,
        slow_t: record.slow_t,
        dot: record.dot,
        dot_t: record.dot_t,
        mark: record.marked,
        mark_t: record.marked_t,
        revealed: record.revealed,
        reveal_t: record.reveal_t,
        no_split_t: record.no_split_t,
    };
    enemy.behavior.set_timer(record.behavior_timer);
    if let EnemyBehavior::Colossus { surged } = &mut enemy.behavior {
        *surged = enemy.hp <= enemy.max_hp * COLOSSUS_SURGE_THRESHOLD;
    }
    Ok(enemy)
}

fn restore_zone(record: &ZoneRecord, kind: ZoneKind) -> Zone {
    Zone {
        kind,
        owner: TurretId::new(record.owner),
        position: Vec2::new(record.x, record.y),
        radius: record.radius,
        dps: record.dps,
        slow: record.slow,
        dot: record.dot,
        remaining: record.remaining,
        siphon: record.siphon,
        no_split: record.no_split,
    }
}
