#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Echo Defence.
//!
//! The [`World`] owns every system instance of a run: the generated level,
//! tile states, combat entities, the wave scheduler, the combo meter, and the
//! economy. Adapters mutate it exclusively through [`apply`] and observe it
//! through the emitted [`Event`] values and the read-only [`query`] module.

mod abilities;
pub mod audio;
mod economy;
pub mod notices;
mod phase;
mod snapshot;

use std::time::Duration;

use glam::Vec2;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use echo_defence_core::{
    config::{SimulationConfig, BOSS_CINEMATIC_SECONDS, LEVEL_TRANSITION_SECONDS, MAX_SPEED},
    mix_seed, Ability, ActionKind, CellCoord, Command, Event, MapData, ModIndex, PlacementError,
    RejectReason, TargetMode, TurretId, TurretKind, UpgradeError, WaveAnomaly,
};
use echo_defence_system_combat::{CombatEvent, CombatModifiers, CombatResolver, EntityRegistry};
use echo_defence_system_echo_cascade::ComboState;
use echo_defence_system_map_generation::{MapGenerator, MapGeneratorConfig};
use echo_defence_system_persistence::{write_best_effort, SaveSlot};
use echo_defence_system_tiles::{TileActionError, TileLayout, TileStateStore};
use echo_defence_system_waves::{build_wave, WaveContext, WaveScheduler};

pub use audio::{AudioCue, AudioSink};
pub use notices::Notice;
pub use snapshot::LoadError;

use abilities::AbilityTimers;
use audio::{AudioDispatch, HIT_CUE_COOLDOWN, KILL_CUE_COOLDOWN, SHOT_CUE_COOLDOWN};
use economy::IntermissionReward;
use notices::Notices;
use phase::Phase;

/// Longest slice of simulated time handed to the combat resolver at once.
const MAX_SUBSTEP: f32 = 0.05;
/// Decorrelates combat rolls from wave composition when both share a seed.
const RESOLVER_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Map-dependent state of the level being played.
#[derive(Debug)]
struct Level {
    index: u32,
    seed: u32,
    env_id: u32,
    map: MapData,
    layout: TileLayout,
    tiles: TileStateStore,
}

impl Level {
    /// Generates a fresh level and places its corruption.
    fn generate(config: &SimulationConfig, index: u32, seed: u32, env_id: u32) -> Self {
        let map =
            MapGenerator::new(MapGeneratorConfig::from_simulation(config)).generate(seed, env_id);
        let mut level = Self::from_map(config, index, map, TileStateStore::new(seed, index));
        let corrupted = level.tiles.place_corruption(&level.layout);
        debug!(
            "level {index}: map {seed}/{env_id} with {} corrupted tiles",
            corrupted.len()
        );
        level
    }

    /// Wraps an existing map and tile store without touching corruption.
    fn from_map(
        config: &SimulationConfig,
        index: u32,
        map: MapData,
        mut tiles: TileStateStore,
    ) -> Self {
        let layout = TileLayout::new(
            &map,
            config.viewport_width,
            config.viewport_height,
            config.cell_size,
        );
        tiles.seed_power_tiles(&layout);
        Self {
            index,
            seed: map.seed,
            env_id: map.env_id,
            map,
            layout,
            tiles,
        }
    }
}

/// Represents the authoritative Echo Defence world state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    level: Level,
    registry: EntityRegistry,
    resolver: CombatResolver,
    scheduler: WaveScheduler,
    composition: ChaCha8Rng,
    combo: ComboState,
    abilities: AbilityTimers,
    phase: Phase,
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
    autosave_timer: f32,
    notices: Notices,
    audio: AudioDispatch,
    save_slot: Option<Box<dyn SaveSlot>>,
}

impl World {
    /// Creates a world on the first level of the configured map.
    ///
    /// Wave composition draws from `config.composition_seed`, or from entropy
    /// when none is configured.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let composition_seed = config.composition_seed.unwrap_or_else(rand::random);
        let level = Level::generate(&config, 0, config.map_seed, config.env_id);
        Self {
            level,
            registry: EntityRegistry::new(),
            resolver: CombatResolver::new(composition_seed ^ RESOLVER_SEED_SALT),
            scheduler: WaveScheduler::new(),
            composition: ChaCha8Rng::seed_from_u64(composition_seed),
            combo: ComboState::new(),
            abilities: AbilityTimers::default(),
            phase: Phase::Building,
            gold: config.starting_gold,
            lives: config.starting_lives,
            wave: 0,
            has_started: false,
            anomaly: None,
            skip_buff: 0.0,
            speed: 1,
            paused: false,
            build_mode: None,
            selected: None,
            autosave_timer: 0.0,
            notices: Notices::default(),
            audio: AudioDispatch::default(),
            save_slot: None,
            config,
        }
    }

    /// Attaches the slot used by saves and autosaves.
    #[must_use]
    pub fn with_save_slot(mut self, slot: Box<dyn SaveSlot>) -> Self {
        self.save_slot = Some(slot);
        self
    }

    /// Attaches the sink receiving sound cues.
    #[must_use]
    pub fn with_audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio.attach(sink);
        self
    }

    fn enter(&mut self, phase: Phase, out_events: &mut Vec<Event>) {
        self.phase = phase;
        out_events.push(Event::PhaseChanged {
            phase: phase.kind(),
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let raw = dt.as_secs_f32().min(self.config.max_frame_dt.max(0.0));
        self.notices.tick(raw);
        if self.paused || self.phase == Phase::Defeat {
            return;
        }

        let scaled = raw * f32::from(self.speed);
        if scaled <= 0.0 {
            return;
        }
        out_events.push(Event::TimeAdvanced { dt: scaled });

        let steps = (scaled / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let step = scaled / steps as f32;
        for _ in 0..steps {
            self.step(step, out_events);
            if self.phase == Phase::Defeat {
                break;
            }
        }
    }

    fn step(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        self.audio.tick(dt);
        self.abilities.tick(dt);
        self.combo.tick(dt);

        if self.phase == Phase::WaveActive {
            self.release_spawns(dt, out_events);
        }
        self.step_combat(dt, out_events);
        if self.phase == Phase::Defeat {
            return;
        }

        let phase = self.phase;
        match phase {
            Phase::WaveActive => {
                if self.scheduler.is_exhausted() && self.registry.living_enemies() == 0 {
                    self.clear_wave(out_events);
                }
            }
            Phase::Intermission { .. } => {
                if self.phase.count_down(dt) {
                    self.end_intermission(false, out_events);
                }
            }
            Phase::BossCinematic { .. } => {
                if self.phase.count_down(dt) {
                    self.enter(
                        Phase::LevelTransition {
                            remaining: LEVEL_TRANSITION_SECONDS,
                        },
                        out_events,
                    );
                }
            }
            Phase::LevelTransition { .. } => {
                if self.phase.count_down(dt) {
                    self.advance_level(out_events);
                }
            }
            Phase::Building | Phase::Defeat => {}
        }

        self.autosave_timer += dt;
        if self.autosave_timer >= self.config.autosave_interval {
            self.autosave();
        }
    }

    fn release_spawns(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let mut released = Vec::new();
        self.scheduler.advance(dt, &mut released);
        if released.is_empty() {
            return;
        }
        let mut combat = Vec::new();
        self.resolver.admit(
            &mut self.registry,
            &released,
            self.level.layout.path(),
            &mut combat,
        );
        self.settle(combat, out_events);
    }

    fn step_combat(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let modifiers = CombatModifiers {
            damage: 1.0 + self.skip_buff,
            fire_rate: self.abilities.fire_rate(),
        };
        let mut combat = Vec::new();
        self.resolver.step(
            &mut self.registry,
            self.level.layout.path(),
            modifiers,
            dt,
            &mut combat,
        );
        self.settle(combat, out_events);
    }

    /// Pays out kills, charges leaks, and forwards combat outcomes.
    fn settle(&mut self, combat: Vec<CombatEvent>, out_events: &mut Vec<Event>) {
        for event in combat {
            match event {
                CombatEvent::Spawned { enemy, kind, elite } => {
                    out_events.push(Event::EnemySpawned { enemy, kind, elite });
                }
                CombatEvent::Shot { turret, kind } => {
                    self.audio.play_limited(AudioCue::Shot, SHOT_CUE_COOLDOWN);
                    out_events.push(Event::ShotFired { turret, kind });
                }
                CombatEvent::Hit { enemy, amount } => {
                    self.audio.play_limited(AudioCue::Hit, HIT_CUE_COOLDOWN);
                    out_events.push(Event::HitLanded { enemy, amount });
                }
                CombatEvent::ShieldBroken { enemy } => {
                    out_events.push(Event::ShieldBroken { enemy });
                }
                CombatEvent::Killed {
                    enemy,
                    kind,
                    reward,
                    siphoned,
                    ..
                } => {
                    let payout = self.combo.register_kill(reward);
                    let siphon_refund = if siphoned {
                        economy::siphon_refund(reward)
                    } else {
                        0
                    };
                    self.gold = self
                        .gold
                        .saturating_add(payout.total)
                        .saturating_add(siphon_refund);
                    self.audio.play_limited(AudioCue::Kill, KILL_CUE_COOLDOWN);
                    out_events.push(Event::EnemyKilled {
                        enemy,
                        kind,
                        reward: payout.total,
                        bonus: payout.bonus,
                        siphon_refund,
                        combo: self.combo.count(),
                    });
                }
                CombatEvent::Leaked { enemy, lives, .. } => {
                    self.lives = self.lives.saturating_sub(lives);
                    self.audio.play(AudioCue::Leak);
                    out_events.push(Event::EnemyLeaked {
                        enemy,
                        lives_lost: lives,
                    });
                    if self.lives == 0 && self.phase != Phase::Defeat {
                        info!("run lost on level {} wave {}", self.level.index, self.wave);
                        self.enter(Phase::Defeat, out_events);
                    }
                }
            }
        }
    }

    fn start_wave(&mut self, out_events: &mut Vec<Event>) {
        self.wave = self.wave.saturating_add(1);
        self.has_started = true;
        let context = WaveContext {
            wave: self.wave,
            level_index: self.level.index,
            map_seed: self.level.seed,
            waves_per_level: self.config.waves_per_level,
        };
        let plan = build_wave(&context, &mut self.composition);
        self.scheduler.begin(&plan);
        self.anomaly = plan.anomaly;
        info!(
            "level {} wave {}: {} spawns, anomaly {:?}",
            self.level.index,
            self.wave,
            plan.spawns.len(),
            plan.anomaly.map(WaveAnomaly::key)
        );
        self.audio.play(AudioCue::WaveStart);
        out_events.push(Event::WaveStarted {
            wave: self.wave,
            spawn_count: plan.spawns.len(),
            anomaly: plan.anomaly,
        });
        self.enter(Phase::WaveActive, out_events);
    }

    fn clear_wave(&mut self, out_events: &mut Vec<Event>) {
        let bonus = economy::wave_clear_bonus(self.wave);
        self.gold = self.gold.saturating_add(bonus);
        self.skip_buff = 0.0;
        self.anomaly = None;
        out_events.push(Event::WaveCleared {
            wave: self.wave,
            bonus,
        });

        if self.wave >= self.config.waves_per_level {
            self.enter(
                Phase::BossCinematic {
                    remaining: BOSS_CINEMATIC_SECONDS,
                },
                out_events,
            );
        } else {
            let seconds = self.config.intermission_seconds.max(0.0);
            self.enter(Phase::Intermission { remaining: seconds }, out_events);
            out_events.push(Event::IntermissionStarted { seconds });
        }
        self.autosave();
    }

    fn end_intermission(&mut self, skipped: bool, out_events: &mut Vec<Event>) {
        let reward = match (skipped, self.phase) {
            (true, Phase::Intermission { remaining }) => {
                IntermissionReward::skipped(remaining, self.config.intermission_seconds)
            }
            _ => IntermissionReward::full(),
        };
        self.gold = self.gold.saturating_add(reward.gold);
        self.skip_buff = reward.buff;
        if skipped {
            self.abilities.cut();
        }
        out_events.push(Event::IntermissionEnded {
            gold: reward.gold,
            buff: reward.buff,
            skipped,
        });
        self.start_wave(out_events);
    }

    fn advance_level(&mut self, out_events: &mut Vec<Event>) {
        let refund = self
            .registry
            .turrets()
            .iter()
            .fold(0_u32, |total, turret| total.saturating_add(turret.invested));
        self.gold = self.gold.saturating_add(refund);

        let index = self.level.index.saturating_add(1);
        let seed = mix_seed(self.level.seed, index);
        let env_id = self.level.env_id;
        self.level = Level::generate(&self.config, index, seed, env_id);
        self.registry.clear();
        self.scheduler.clear();
        self.combo.reset();
        self.wave = 0;
        self.has_started = false;
        self.anomaly = None;
        self.skip_buff = 0.0;
        self.selected = None;
        info!("advanced to level {index} on map {seed}, refunded {refund} gold");

        out_events.push(Event::LevelAdvanced {
            level_index: index,
            map_seed: seed,
        });
        out_events.push(Event::MapGenerated {
            seed,
            env_id,
            level_index: index,
        });
        self.enter(Phase::Building, out_events);
        self.autosave();
    }

    /// Runs a player action, turning a refusal into a notice and an event.
    fn attempt(
        &mut self,
        action: ActionKind,
        out_events: &mut Vec<Event>,
        run: impl FnOnce(&mut Self, &mut Vec<Event>) -> Result<(), RejectReason>,
    ) {
        if let Err(reason) = run(self, out_events) {
            debug!("{action:?} rejected: {reason}");
            self.notices.push(reason.to_string());
            out_events.push(Event::ActionRejected { action, reason });
        }
    }

    fn ensure_can_act(&self) -> Result<(), RejectReason> {
        if self.phase == Phase::Defeat {
            return Err(RejectReason::RunOver);
        }
        if self.paused {
            return Err(RejectReason::Paused);
        }
        if !self.phase.accepts_actions() {
            return Err(RejectReason::InvalidPhase);
        }
        Ok(())
    }

    fn spend(&mut self, cost: u32) -> Result<(), RejectReason> {
        if self.gold < cost {
            return Err(RejectReason::InsufficientFunds {
                required: cost,
                available: self.gold,
            });
        }
        self.gold -= cost;
        Ok(())
    }

    fn build_turret(
        &mut self,
        kind: TurretKind,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectReason> {
        self.ensure_can_act()?;
        self.level
            .tiles
            .check_buildable(&self.level.layout, cell)
            .map_err(RejectReason::Placement)?;
        if self.registry.turret_at(cell).is_some() {
            return Err(RejectReason::Placement(PlacementError::Occupied));
        }
        let cost = kind.cost();
        self.spend(cost)?;

        let boosted = self.level.tiles.is_powered(&self.level.layout, cell);
        let turret = self
            .registry
            .add_turret(kind, cell, self.level.layout.cell_size(), boosted);
        out_events.push(Event::TurretBuilt {
            turret,
            kind,
            cell,
            cost,
        });
        self.autosave();
        Ok(())
    }

    fn upgrade_turret(
        &mut self,
        id: TurretId,
        mod_index: ModIndex,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectReason> {
        self.ensure_can_act()?;
        let cost = self
            .registry
            .turret(id)
            .ok_or(RejectReason::UnknownTurret)?
            .next_upgrade_cost()
            .ok_or(RejectReason::Upgrade(UpgradeError::MaxLevel))?;
        if self.gold < cost {
            return Err(RejectReason::InsufficientFunds {
                required: cost,
                available: self.gold,
            });
        }

        let turret = self
            .registry
            .turret_mut(id)
            .ok_or(RejectReason::UnknownTurret)?;
        let level = turret.upgrade(mod_index).map_err(RejectReason::Upgrade)?;
        turret.invested = turret.invested.saturating_add(cost);
        self.gold -= cost;
        out_events.push(Event::TurretUpgraded {
            turret: id,
            level,
            cost,
        });
        self.autosave();
        Ok(())
    }

    fn sell_turret(
        &mut self,
        id: TurretId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectReason> {
        self.ensure_can_act()?;
        let turret = self
            .registry
            .remove_turret(id)
            .ok_or(RejectReason::UnknownTurret)?;
        let refund = turret.sell_refund();
        self.gold = self.gold.saturating_add(refund);
        if self.selected == Some(id) {
            self.selected = None;
        }
        out_events.push(Event::TurretSold { turret: id, refund });
        self.autosave();
        Ok(())
    }

    fn set_target_mode(&mut self, id: TurretId, mode: TargetMode) -> Result<(), RejectReason> {
        self.ensure_can_act()?;
        self.registry
            .turret_mut(id)
            .ok_or(RejectReason::UnknownTurret)?
            .target_mode = mode;
        Ok(())
    }

    fn cleanse_tile(
        &mut self,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectReason> {
        self.ensure_can_act()?;
        let cost = self
            .level
            .tiles
            .cleanse_tile(cell, &mut self.gold)
            .map_err(tile_rejection)?;
        out_events.push(Event::TileCleansed { cell, cost });
        Ok(())
    }

    fn purchase_power_tile(
        &mut self,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectReason> {
        self.ensure_can_act()?;
        let cost = self
            .level
            .tiles
            .purchase_power_tile(&self.level.layout, cell, &mut self.gold)
            .map_err(tile_rejection)?;
        out_events.push(Event::PowerTilePurchased { cell, cost });
        Ok(())
    }

    fn request_wave(&mut self, out_events: &mut Vec<Event>) -> Result<(), RejectReason> {
        self.ensure_can_act()?;
        match self.phase {
            Phase::Building => {
                self.start_wave(out_events);
                Ok(())
            }
            Phase::Intermission { .. } => {
                self.end_intermission(true, out_events);
                Ok(())
            }
            _ => Err(RejectReason::InvalidPhase),
        }
    }

    fn skip_intermission(&mut self, out_events: &mut Vec<Event>) -> Result<(), RejectReason> {
        self.ensure_can_act()?;
        if !matches!(self.phase, Phase::Intermission { .. }) {
            return Err(RejectReason::InvalidPhase);
        }
        self.end_intermission(true, out_events);
        Ok(())
    }

    fn use_ability(
        &mut self,
        ability: Ability,
        at: Vec2,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectReason> {
        self.ensure_can_act()?;
        if self.abilities.cooldown(ability) > 0.0 {
            return Err(RejectReason::OnCooldown);
        }
        self.abilities.trigger(ability);
        out_events.push(Event::AbilityUsed { ability });

        if ability == Ability::Shockwave {
            let mut combat = Vec::new();
            let hit = self.resolver.shockwave(
                &mut self.registry,
                self.level.layout.path(),
                at,
                &mut combat,
            );
            debug!("shockwave at {at} hit {hit} enemies");
            self.settle(combat, out_events);
        }
        Ok(())
    }

    /// Writes the run into the save slot, returning whether it succeeded.
    fn save(&mut self) -> bool {
        let state = snapshot::capture(self);
        match self.save_slot.as_deref_mut() {
            Some(slot) => write_best_effort(slot, &state),
            None => false,
        }
    }

    fn autosave(&mut self) {
        self.autosave_timer = 0.0;
        if self.save_slot.is_some() {
            let _ = self.save();
        }
    }

    fn load(&mut self, blob: &str, out_events: &mut Vec<Event>) -> Result<(), LoadError> {
        let restored = snapshot::restore(&self.config, blob)?;
        restored.install(self);
        self.combo.reset();
        self.autosave_timer = 0.0;
        info!(
            "loaded level {} wave {} with {} turrets",
            self.level.index,
            self.wave,
            self.registry.turrets().len()
        );
        out_events.push(Event::PhaseChanged {
            phase: self.phase.kind(),
        });
        Ok(())
    }
}

fn tile_rejection(error: TileActionError) -> RejectReason {
    match error {
        TileActionError::NotApplicable => RejectReason::NotApplicable,
        TileActionError::InsufficientFunds {
            required,
            available,
        } => RejectReason::InsufficientFunds {
            required,
            available,
        },
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SetSpeed { multiplier } => world.speed = multiplier.clamp(1, MAX_SPEED),
        Command::SetPaused { paused } => world.paused = paused,
        Command::SetBuildMode { kind } => world.build_mode = kind,
        Command::BuildTurret { kind, cell } => {
            world.attempt(ActionKind::Build, out_events, |world, out| {
                world.build_turret(kind, cell, out)
            });
        }
        Command::UpgradeTurret { turret, mod_index } => {
            world.attempt(ActionKind::Upgrade, out_events, |world, out| {
                world.upgrade_turret(turret, mod_index, out)
            });
        }
        Command::SellTurret { turret } => {
            world.attempt(ActionKind::Sell, out_events, |world, out| {
                world.sell_turret(turret, out)
            });
        }
        Command::SelectTurret { turret } => {
            world.selected = turret.filter(|id| world.registry.turret(*id).is_some());
        }
        Command::SellSelected => {
            world.attempt(ActionKind::Sell, out_events, |world, out| {
                let turret = world.selected.ok_or(RejectReason::UnknownTurret)?;
                world.sell_turret(turret, out)
            });
        }
        Command::SetTargetMode { turret, mode } => {
            world.attempt(ActionKind::Retarget, out_events, |world, _| {
                world.set_target_mode(turret, mode)
            });
        }
        Command::CleanseTile { cell } => {
            world.attempt(ActionKind::Cleanse, out_events, |world, out| {
                world.cleanse_tile(cell, out)
            });
        }
        Command::PurchasePowerTile { cell } => {
            world.attempt(ActionKind::PurchasePower, out_events, |world, out| {
                world.purchase_power_tile(cell, out)
            });
        }
        Command::StartWave => {
            world.attempt(ActionKind::StartWave, out_events, World::request_wave);
        }
        Command::SkipIntermission => {
            world.attempt(ActionKind::Skip, out_events, World::skip_intermission);
        }
        Command::UseAbility { ability, at } => {
            world.attempt(ActionKind::Ability, out_events, |world, out| {
                world.use_ability(ability, at, out)
            });
        }
        Command::Save => {
            if world.save() {
                out_events.push(Event::GameSaved);
            }
        }
        Command::Load { blob } => {
            let success = match world.load(&blob, out_events) {
                Ok(()) => true,
                Err(error) => {
                    warn!("load rejected: {error}");
                    false
                }
            };
            out_events.push(Event::LoadCompleted { success });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use echo_defence_core::{
        Ability, CellCoord, MapData, PathGraph, PhaseKind, TurretId, TurretKind, WaveAnomaly,
    };
    use echo_defence_system_combat::{Enemy, Turret, Zone};
    use echo_defence_system_echo_cascade::ComboState;
    use echo_defence_system_persistence::SaveState;
    use echo_defence_system_tiles::{TileLayout, TileState};

    use super::{Notice, World};

    /// Gold available to the player.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Lives left before defeat.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Number of the current or most recent wave, zero before the first.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Waves in each level; the last one is the boss wave.
    #[must_use]
    pub fn wave_max(world: &World) -> u32 {
        world.config.waves_per_level
    }

    /// Anomaly twisting the active wave.
    #[must_use]
    pub fn anomaly(world: &World) -> Option<WaveAnomaly> {
        world.anomaly
    }

    /// Zero-based index of the level being played.
    #[must_use]
    pub fn level_index(world: &World) -> u32 {
        world.level.index
    }

    /// Seed of the current level's map.
    #[must_use]
    pub fn map_seed(world: &World) -> u32 {
        world.level.seed
    }

    /// Current phase of the run.
    #[must_use]
    pub fn phase(world: &World) -> PhaseKind {
        world.phase.kind()
    }

    /// Seconds left before the current timed phase ends.
    #[must_use]
    pub fn phase_remaining(world: &World) -> Option<f32> {
        match world.phase {
            super::Phase::Intermission { remaining }
            | super::Phase::BossCinematic { remaining }
            | super::Phase::LevelTransition { remaining } => Some(remaining),
            _ => None,
        }
    }

    /// Speed multiplier applied to every tick.
    #[must_use]
    pub fn speed(world: &World) -> u8 {
        world.speed
    }

    /// Whether the tick loop is frozen.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Damage buff earned by skipping the last intermission.
    #[must_use]
    pub fn skip_buff(world: &World) -> f32 {
        world.skip_buff
    }

    /// Seconds until the ability can be used again.
    #[must_use]
    pub fn ability_cooldown(world: &World, ability: Ability) -> f32 {
        world.abilities.cooldown(ability)
    }

    /// Whether Overclock is currently boosting fire rates.
    #[must_use]
    pub fn overclock_active(world: &World) -> bool {
        world.abilities.overclock_active > 0.0
    }

    /// Turret kind chosen for placement.
    #[must_use]
    pub fn build_mode(world: &World) -> Option<TurretKind> {
        world.build_mode
    }

    /// Currently selected turret.
    #[must_use]
    pub fn selected_turret(world: &World) -> Option<&Turret> {
        world.selected.and_then(|id| world.registry.turret(id))
    }

    /// Looks up a turret.
    #[must_use]
    pub fn turret(world: &World, id: TurretId) -> Option<&Turret> {
        world.registry.turret(id)
    }

    /// Turrets in construction order.
    #[must_use]
    pub fn turrets(world: &World) -> &[Turret] {
        world.registry.turrets()
    }

    /// Enemies on the field, including those handled this tick.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        world.registry.enemies()
    }

    /// Enemies still counting towards the wave.
    #[must_use]
    pub fn living_enemies(world: &World) -> usize {
        world.registry.living_enemies()
    }

    /// Deployed trap zones.
    #[must_use]
    pub fn traps(world: &World) -> &[Zone] {
        world.registry.traps()
    }

    /// Lingering fire zones.
    #[must_use]
    pub fn lingering(world: &World) -> &[Zone] {
        world.registry.lingering()
    }

    /// Static cell classification of the current level.
    #[must_use]
    pub fn tile_layout(world: &World) -> &TileLayout {
        &world.level.layout
    }

    /// State of a single tile.
    #[must_use]
    pub fn tile_state(world: &World, cell: CellCoord) -> TileState {
        world.level.tiles.get(cell)
    }

    /// Cells a turret could be built on right now, ignoring gold.
    #[must_use]
    pub fn buildable_cells(world: &World) -> Vec<CellCoord> {
        let layout = &world.level.layout;
        layout
            .cells()
            .filter(|cell| world.level.tiles.check_buildable(layout, *cell).is_ok())
            .filter(|cell| world.registry.turret_at(*cell).is_none())
            .collect()
    }

    /// Normalised layout of the current level.
    #[must_use]
    pub fn map(world: &World) -> &MapData {
        &world.level.map
    }

    /// World-space path enemies walk along.
    #[must_use]
    pub fn path(world: &World) -> &PathGraph {
        world.level.layout.path()
    }

    /// Echo cascade meter.
    #[must_use]
    pub fn combo(world: &World) -> &ComboState {
        &world.combo
    }

    /// Notices waiting to be dismissed.
    #[must_use]
    pub fn notices(world: &World) -> &[Notice] {
        world.notices.entries()
    }

    /// Combat faults caught since the world was created.
    #[must_use]
    pub fn fault_count(world: &World) -> u64 {
        world.resolver.faults().total()
    }

    /// Captures the run in its save schema.
    #[must_use]
    pub fn snapshot(world: &World) -> SaveState {
        super::snapshot::capture(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_defence_core::{EnemyKind, PhaseKind, SpawnEvent, WaveScalar};
    use echo_defence_system_combat::{Zone, ZoneKind};

    fn seeded() -> World {
        World::new(SimulationConfig {
            composition_seed: Some(11),
            ..SimulationConfig::default()
        })
    }

    #[test]
    fn siphon_kills_refund_part_of_the_base_reward() {
        let mut world = seeded();
        let path = world.level.layout.path().clone();
        let spawn = SpawnEvent {
            time: 0.0,
            kind: EnemyKind::Grunt,
            scalar: WaveScalar::IDENTITY,
            elite: None,
            is_miniboss: false,
        };
        let enemy = world.registry.spawn_at(&spawn, &path, 60.0);
        let position = {
            let walker = world.registry.enemy_mut(enemy).expect("enemy was spawned");
            walker.reward = 20;
            walker.speed = 0.0;
            walker.position
        };
        world.registry.insert_trap(Zone {
            kind: ZoneKind::Trap,
            owner: TurretId::new(99),
            position,
            radius: 30.0,
            dps: 10_000.0,
            slow: 0.0,
            dot: 0.0,
            remaining: 5.0,
            siphon: true,
            no_split: false,
        });

        let before = world.gold;
        let mut events = Vec::new();
        world.step_combat(0.05, &mut events);

        assert_eq!(world.gold, before + 24);
        assert!(events.contains(&Event::EnemyKilled {
            enemy,
            kind: EnemyKind::Grunt,
            reward: 20,
            bonus: 0,
            siphon_refund: 4,
            combo: 1,
        }));
    }

    #[test]
    fn clearing_the_final_wave_starts_the_boss_cinematic() {
        let mut world = seeded();
        world.wave = world.config.waves_per_level;
        world.has_started = true;
        world.phase = Phase::WaveActive;

        let mut events = Vec::new();
        world.step(0.05, &mut events);

        assert_eq!(world.phase.kind(), PhaseKind::BossCinematic);
        assert!(events.contains(&Event::PhaseChanged {
            phase: PhaseKind::BossCinematic
        }));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::IntermissionStarted { .. })));
    }

    #[test]
    fn level_transition_advances_exactly_once() {
        let mut world = seeded();
        world.phase = Phase::LevelTransition { remaining: 0.1 };
        let mut events = Vec::new();
        for _ in 0..10 {
            world.step(0.05, &mut events);
        }
        let advances = events
            .iter()
            .filter(|event| matches!(event, Event::LevelAdvanced { .. }))
            .count();
        assert_eq!(advances, 1);
        assert_eq!(world.level.index, 1);
        assert_eq!(world.phase, Phase::Building);
    }
}
