use std::{
    cell::RefCell,
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    rc::Rc,
    time::Duration,
};

use echo_defence_core::{
    config::{
        SimulationConfig, INTERMISSION_FULL_GOLD, INTERMISSION_SECONDS, MAX_FRAME_DT,
        MAX_SPEED, OVERCLOCK_COOLDOWN, STARTING_GOLD, STARTING_LIVES, WAVE_CLEAR_BASE_GOLD,
        WAVE_CLEAR_GOLD_PER_WAVE,
    },
    Ability, ActionKind, CellCoord, Command, Event, PhaseKind, PlacementError, RejectReason,
    TurretId, TurretKind,
};
use echo_defence_system_persistence::{encode, MemorySlot, SaveError, SaveSlot};
use echo_defence_system_tiles::TileKind;
use echo_defence_world::{apply, query, AudioCue, AudioSink, World};
use glam::Vec2;

const FRAME: Duration = Duration::from_millis(100);

fn config() -> SimulationConfig {
    SimulationConfig {
        composition_seed: Some(0x00ec_40de),
        ..SimulationConfig::default()
    }
}

fn fresh() -> World {
    World::new(config())
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, command, &mut events);
    events
}

fn tick(world: &mut World, frames: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..frames {
        apply(world, Command::Tick { dt: FRAME }, &mut events);
    }
    events
}

/// Ticks until `done` matches an emitted event, returning everything emitted.
fn tick_until(world: &mut World, limit: usize, done: impl Fn(&Event) -> bool) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..limit {
        let start = events.len();
        apply(world, Command::Tick { dt: FRAME }, &mut events);
        if events[start..].iter().any(&done) {
            return events;
        }
    }
    panic!("condition not reached within {limit} frames");
}

fn rejection(events: &[Event]) -> Option<RejectReason> {
    events.iter().find_map(|event| match event {
        Event::ActionRejected { reason, .. } => Some(*reason),
        _ => None,
    })
}

fn first_cell(world: &World, kind: TileKind) -> CellCoord {
    let layout = query::tile_layout(world);
    layout
        .cells()
        .find(|cell| layout.kind(*cell) == Some(kind))
        .expect("layout contains the tile kind")
}

/// Buildable cell closest to the track.
fn cell_near_track(world: &World) -> CellCoord {
    let layout = query::tile_layout(world);
    query::buildable_cells(world)
        .into_iter()
        .min_by(|a, b| {
            layout
                .track_distance(*a)
                .total_cmp(&layout.track_distance(*b))
        })
        .expect("map has buildable cells")
}

fn built_turret(events: &[Event]) -> TurretId {
    events
        .iter()
        .find_map(|event| match event {
            Event::TurretBuilt { turret, .. } => Some(*turret),
            _ => None,
        })
        .expect("turret was built")
}

fn clear_first_wave(world: &mut World) -> Vec<Event> {
    let _ = run(world, Command::SetSpeed { multiplier: 4 });
    let mut events = run(world, Command::StartWave);
    events.extend(tick_until(world, 3_000, |event| {
        matches!(event, Event::WaveCleared { .. })
    }));
    events
}

#[derive(Debug, Default)]
struct SharedSlot(Rc<RefCell<Option<String>>>);

impl SaveSlot for SharedSlot {
    fn write(&mut self, blob: &str) -> Result<(), SaveError> {
        *self.0.borrow_mut() = Some(blob.to_owned());
        Ok(())
    }

    fn read(&self) -> Result<Option<String>, SaveError> {
        Ok(self.0.borrow().clone())
    }
}

#[derive(Debug, Default)]
struct Recorder(Rc<RefCell<Vec<AudioCue>>>);

impl AudioSink for Recorder {
    fn play(&mut self, cue: AudioCue) {
        self.0.borrow_mut().push(cue);
    }
}

#[test]
fn fresh_world_waits_in_the_building_phase() {
    let world = fresh();
    assert_eq!(query::gold(&world), STARTING_GOLD);
    assert_eq!(query::lives(&world), STARTING_LIVES);
    assert_eq!(query::wave(&world), 0);
    assert_eq!(query::phase(&world), PhaseKind::Building);
    assert_eq!(query::level_index(&world), 0);
    assert!(query::turrets(&world).is_empty());
}

#[test]
fn frames_are_clamped_then_scaled_by_speed() {
    let mut world = fresh();
    let events = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(5),
        },
    );
    assert_eq!(events, vec![Event::TimeAdvanced { dt: MAX_FRAME_DT }]);

    let _ = run(&mut world, Command::SetSpeed { multiplier: 9 });
    assert_eq!(query::speed(&world), MAX_SPEED);
    let events = run(&mut world, Command::Tick { dt: FRAME });
    let Some(Event::TimeAdvanced { dt }) = events.first() else {
        panic!("tick advanced time");
    };
    assert!((dt - 0.1 * f32::from(MAX_SPEED)).abs() < 1e-5);

    let _ = run(&mut world, Command::SetSpeed { multiplier: 0 });
    assert_eq!(query::speed(&world), 1);
}

#[test]
fn pausing_freezes_time_and_rejects_actions() {
    let mut world = fresh();
    let _ = run(&mut world, Command::SetPaused { paused: true });
    assert!(tick(&mut world, 5).is_empty());

    let events = run(&mut world, Command::StartWave);
    assert_eq!(rejection(&events), Some(RejectReason::Paused));
    assert_eq!(query::phase(&world), PhaseKind::Building);
    assert_eq!(query::notices(&world).len(), 1);
}

#[test]
fn building_on_the_track_is_rejected() {
    let mut world = fresh();
    let cell = first_cell(&world, TileKind::Track);
    let events = run(
        &mut world,
        Command::BuildTurret {
            kind: TurretKind::Bolt,
            cell,
        },
    );
    assert_eq!(
        events,
        vec![Event::ActionRejected {
            action: ActionKind::Build,
            reason: RejectReason::Placement(PlacementError::Track),
        }]
    );
    assert_eq!(query::gold(&world), STARTING_GOLD);
}

#[test]
fn occupied_cells_cannot_host_a_second_turret() {
    let mut world = fresh();
    let cell = cell_near_track(&world);
    let build = Command::BuildTurret {
        kind: TurretKind::Bolt,
        cell,
    };
    let _ = run(&mut world, build.clone());
    let events = run(&mut world, build);
    assert_eq!(
        rejection(&events),
        Some(RejectReason::Placement(PlacementError::Occupied))
    );
    assert_eq!(query::gold(&world), STARTING_GOLD - TurretKind::Bolt.cost());
}

#[test]
fn building_stops_when_gold_runs_out() {
    let mut world = fresh();
    let cells = query::buildable_cells(&world);
    let mut rejected = None;
    for cell in cells {
        let events = run(
            &mut world,
            Command::BuildTurret {
                kind: TurretKind::Hive,
                cell,
            },
        );
        if let Some(reason) = rejection(&events) {
            rejected = Some(reason);
            break;
        }
    }
    let cost = TurretKind::Hive.cost();
    assert_eq!(
        rejected,
        Some(RejectReason::InsufficientFunds {
            required: cost,
            available: STARTING_GOLD % cost,
        })
    );
    assert_eq!(query::turrets(&world).len() as u32, STARTING_GOLD / cost);
}

#[test]
fn power_tiles_must_be_purchased_before_building() {
    let mut world = fresh();
    let cell = query::tile_layout(&world).power_cells()[0];
    let build = Command::BuildTurret {
        kind: TurretKind::Bolt,
        cell,
    };

    let events = run(&mut world, build.clone());
    assert_eq!(
        rejection(&events),
        Some(RejectReason::Placement(PlacementError::PowerLocked))
    );

    let cost = query::tile_state(&world, cell).power_unlock_cost;
    let events = run(&mut world, Command::PurchasePowerTile { cell });
    assert_eq!(events, vec![Event::PowerTilePurchased { cell, cost }]);
    assert_eq!(query::gold(&world), STARTING_GOLD - cost);

    let events = run(&mut world, Command::PurchasePowerTile { cell });
    assert_eq!(rejection(&events), Some(RejectReason::NotApplicable));

    let turret = built_turret(&run(&mut world, build));
    assert!(query::turret(&world, turret).expect("turret exists").boosted);
}

#[test]
fn corrupted_tiles_are_cleansed_before_building() {
    let mut world = fresh();
    let layout = query::tile_layout(&world);
    let cell = layout
        .cells()
        .find(|cell| query::tile_state(&world, *cell).corrupted)
        .expect("the default map has corruption");
    let build = Command::BuildTurret {
        kind: TurretKind::Bolt,
        cell,
    };

    let events = run(&mut world, build.clone());
    assert_eq!(
        rejection(&events),
        Some(RejectReason::Placement(PlacementError::Corrupted))
    );

    let cost = query::tile_state(&world, cell).cleanse_cost;
    let events = run(&mut world, Command::CleanseTile { cell });
    assert_eq!(events, vec![Event::TileCleansed { cell, cost }]);
    let _ = built_turret(&run(&mut world, build));
    assert_eq!(
        query::gold(&world),
        STARTING_GOLD - cost - TurretKind::Bolt.cost()
    );
}

#[test]
fn upgrades_and_sales_move_gold() {
    let mut world = fresh();
    let cell = cell_near_track(&world);
    let turret = built_turret(&run(
        &mut world,
        Command::BuildTurret {
            kind: TurretKind::Bolt,
            cell,
        },
    ));

    let upgrade_cost = TurretKind::Bolt.upgrade_cost(0).expect("tier exists");
    let events = run(
        &mut world,
        Command::UpgradeTurret {
            turret,
            mod_index: 0,
        },
    );
    assert_eq!(
        events,
        vec![Event::TurretUpgraded {
            turret,
            level: 1,
            cost: upgrade_cost,
        }]
    );
    let invested = TurretKind::Bolt.cost() + upgrade_cost;
    assert_eq!(query::turret(&world, turret).expect("exists").invested, invested);

    let events = run(
        &mut world,
        Command::UpgradeTurret {
            turret,
            mod_index: 7,
        },
    );
    assert!(matches!(
        rejection(&events),
        Some(RejectReason::Upgrade(_))
    ));

    let _ = run(
        &mut world,
        Command::SelectTurret {
            turret: Some(turret),
        },
    );
    assert_eq!(query::selected_turret(&world).map(|t| t.id), Some(turret));
    let refund = query::turret(&world, turret).expect("exists").sell_refund();
    let events = run(&mut world, Command::SellSelected);
    assert_eq!(events, vec![Event::TurretSold { turret, refund }]);
    assert_eq!(query::gold(&world), STARTING_GOLD - invested + refund);
    assert!(query::selected_turret(&world).is_none());

    let events = run(&mut world, Command::SellSelected);
    assert_eq!(rejection(&events), Some(RejectReason::UnknownTurret));
}

#[test]
fn abilities_recharge_before_reuse() {
    let mut world = fresh();
    let at = Vec2::new(200.0, 200.0);
    let events = run(
        &mut world,
        Command::UseAbility {
            ability: Ability::Overclock,
            at,
        },
    );
    assert_eq!(
        events,
        vec![Event::AbilityUsed {
            ability: Ability::Overclock
        }]
    );
    assert!(query::overclock_active(&world));
    assert_eq!(
        query::ability_cooldown(&world, Ability::Overclock),
        OVERCLOCK_COOLDOWN
    );

    let events = run(
        &mut world,
        Command::UseAbility {
            ability: Ability::Overclock,
            at,
        },
    );
    assert_eq!(rejection(&events), Some(RejectReason::OnCooldown));
    assert_eq!(query::ability_cooldown(&world, Ability::Shockwave), 0.0);
}

#[test]
fn starting_a_wave_releases_enemies() {
    let recorder = Recorder::default();
    let cues = Rc::clone(&recorder.0);
    let mut world = fresh().with_audio(Box::new(recorder));

    let events = run(&mut world, Command::StartWave);
    assert!(matches!(
        events.first(),
        Some(Event::WaveStarted { wave: 1, spawn_count, .. }) if *spawn_count > 0
    ));
    assert!(events.contains(&Event::PhaseChanged {
        phase: PhaseKind::WaveActive
    }));
    assert_eq!(*cues.borrow(), vec![AudioCue::WaveStart]);

    let events = tick(&mut world, 30);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemySpawned { .. })));
    assert!(!query::enemies(&world).is_empty());

    let events = run(&mut world, Command::StartWave);
    assert_eq!(rejection(&events), Some(RejectReason::InvalidPhase));
}

#[test]
fn undefended_wave_leaks_then_clears_into_intermission() {
    let mut world = fresh();
    let events = clear_first_wave(&mut world);

    let lost: u32 = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyLeaked { lives_lost, .. } => Some(*lives_lost),
            _ => None,
        })
        .sum();
    assert!(lost > 0);
    assert_eq!(query::lives(&world), STARTING_LIVES - lost);
    assert_eq!(
        query::gold(&world),
        STARTING_GOLD + WAVE_CLEAR_BASE_GOLD + WAVE_CLEAR_GOLD_PER_WAVE
    );
    assert!(events.contains(&Event::IntermissionStarted {
        seconds: INTERMISSION_SECONDS
    }));
    assert_eq!(query::phase(&world), PhaseKind::Intermission);
}

#[test]
fn waiting_out_the_intermission_pays_in_full() {
    let mut world = fresh();
    let _ = clear_first_wave(&mut world);
    let gold = query::gold(&world);

    let events = tick_until(&mut world, 200, |event| {
        matches!(event, Event::IntermissionEnded { .. })
    });
    assert!(events.contains(&Event::IntermissionEnded {
        gold: INTERMISSION_FULL_GOLD,
        buff: 0.0,
        skipped: false,
    }));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::WaveStarted { wave: 2, .. })));
    assert!(query::gold(&world) >= gold + INTERMISSION_FULL_GOLD);
}

#[test]
fn skipping_the_intermission_trades_gold_for_a_buff() {
    let mut world = fresh();
    let _ = clear_first_wave(&mut world);
    let _ = run(
        &mut world,
        Command::UseAbility {
            ability: Ability::Shockwave,
            at: Vec2::ZERO,
        },
    );
    let cooldown = query::ability_cooldown(&world, Ability::Shockwave);

    let events = run(&mut world, Command::SkipIntermission);
    let Some(Event::IntermissionEnded {
        gold,
        buff,
        skipped,
    }) = events.first()
    else {
        panic!("intermission ended");
    };
    assert!(*skipped);
    assert!(*gold < INTERMISSION_FULL_GOLD);
    assert!(*buff > 0.0);
    assert!(query::skip_buff(&world) > 0.0);
    assert!(query::ability_cooldown(&world, Ability::Shockwave) < cooldown);
    assert_eq!(query::phase(&world), PhaseKind::WaveActive);
    assert_eq!(query::wave(&world), 2);

    let events = run(&mut world, Command::SkipIntermission);
    assert_eq!(rejection(&events), Some(RejectReason::InvalidPhase));
}

#[test]
fn losing_every_life_ends_the_run() {
    let mut world = World::new(SimulationConfig {
        starting_lives: 1,
        ..config()
    });
    let _ = run(&mut world, Command::SetSpeed { multiplier: 4 });
    let _ = run(&mut world, Command::StartWave);
    let events = tick_until(&mut world, 3_000, |event| {
        *event == Event::PhaseChanged {
            phase: PhaseKind::Defeat,
        }
    });
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyLeaked { .. })));
    assert_eq!(query::lives(&world), 0);
    assert_eq!(query::phase(&world), PhaseKind::Defeat);

    assert!(tick(&mut world, 5).is_empty());
    let events = run(&mut world, Command::StartWave);
    assert_eq!(rejection(&events), Some(RejectReason::RunOver));
}

#[test]
fn saves_restore_turrets_and_enemies() {
    let mut world = World::new(SimulationConfig {
        starting_gold: 1_000,
        ..config()
    });
    let layout = query::tile_layout(&world);
    let mut cells = query::buildable_cells(&world);
    cells.sort_by(|a, b| {
        layout
            .track_distance(*a)
            .total_cmp(&layout.track_distance(*b))
    });

    let mut built = Vec::new();
    for (kind, cell) in [TurretKind::Frost, TurretKind::Venom, TurretKind::Bolt]
        .into_iter()
        .zip(cells)
    {
        built.push(built_turret(&run(
            &mut world,
            Command::BuildTurret { kind, cell },
        )));
    }
    let bolt = built[2];
    for mod_index in [1, 0] {
        let events = run(
            &mut world,
            Command::UpgradeTurret {
                turret: bolt,
                mod_index,
            },
        );
        assert_eq!(rejection(&events), None);
    }
    assert_eq!(query::turret(&world, bolt).expect("exists").level, 2);

    let _ = run(&mut world, Command::StartWave);
    let afflicted = |world: &World| {
        query::enemies(world).iter().any(|enemy| {
            !enemy.handled && (enemy.status.slow_t > 0.0 || enemy.status.dot_t > 0.0)
        })
    };
    let mut frames = 0;
    while !afflicted(&world) {
        assert!(frames < 600, "no enemy was slowed or poisoned");
        let _ = tick(&mut world, 1);
        frames += 1;
    }
    assert!(query::living_enemies(&world) > 0);

    let snapshot = query::snapshot(&world);
    let blob = encode(&snapshot).expect("snapshot encodes");

    let mut restored = World::new(SimulationConfig {
        composition_seed: Some(1),
        ..SimulationConfig::default()
    });
    let events = run(&mut restored, Command::Load { blob });
    assert!(events.contains(&Event::LoadCompleted { success: true }));

    assert_eq!(query::turrets(&restored).len(), built.len());
    for id in &built {
        let original = query::turret(&world, *id).expect("original turret");
        let copy = query::turret(&restored, *id).expect("restored turret");
        assert_eq!(copy.kind, original.kind);
        assert_eq!(copy.cell, original.cell);
        assert_eq!(copy.stats, original.stats, "{:?} stats differ", original.kind);
        assert_eq!(copy.mods, original.mods);
        assert_eq!(copy.level, original.level);
        assert_eq!(copy.invested, original.invested);
        assert_eq!(copy.cooldown, original.cooldown);
    }

    let living = |world: &World| {
        query::enemies(world)
            .iter()
            .filter(|enemy| !enemy.handled)
            .map(|enemy| (enemy.id, enemy.hp, enemy.path_distance, enemy.status))
            .collect::<Vec<_>>()
    };
    assert_eq!(living(&restored), living(&world));
    assert!(afflicted(&restored));
    assert_eq!(query::phase(&restored), PhaseKind::WaveActive);
    assert_eq!(query::gold(&restored), query::gold(&world));
    assert_eq!(query::snapshot(&restored), snapshot);
}

#[test]
fn failed_loads_leave_the_run_untouched() {
    let mut world = fresh();
    let cell = cell_near_track(&world);
    let _ = run(
        &mut world,
        Command::BuildTurret {
            kind: TurretKind::Bolt,
            cell,
        },
    );
    let before = query::snapshot(&world);

    let events = run(
        &mut world,
        Command::Load {
            blob: "echo:v1:@@@".to_owned(),
        },
    );
    assert_eq!(events, vec![Event::LoadCompleted { success: false }]);

    let mut unknown = before.clone();
    unknown.turrets[0].type_key = "laser".to_owned();
    unknown.gold = 9_999;
    let blob = encode(&unknown).expect("state encodes");
    let events = run(&mut world, Command::Load { blob });
    assert_eq!(events, vec![Event::LoadCompleted { success: false }]);

    let mut overlapping = before.clone();
    let mut twin = overlapping.turrets[0].clone();
    twin.id += 1;
    overlapping.turrets.push(twin);
    let blob = encode(&overlapping).expect("state encodes");
    let events = run(&mut world, Command::Load { blob });
    assert_eq!(events, vec![Event::LoadCompleted { success: false }]);

    assert_eq!(query::snapshot(&world), before);
}

#[test]
fn finishing_a_level_refunds_turrets_and_regenerates_the_map() {
    let mut world = fresh();
    let cell = cell_near_track(&world);
    let _ = run(
        &mut world,
        Command::BuildTurret {
            kind: TurretKind::Bolt,
            cell,
        },
    );
    let mut state = query::snapshot(&world);
    state.has_started = true;
    state.wave = state.wave_max;
    let gold = state.gold;
    let seed = state.map_seed;
    let blob = encode(&state).expect("state encodes");

    let _ = run(&mut world, Command::Load { blob });
    assert_eq!(query::phase(&world), PhaseKind::LevelTransition);

    let events = tick_until(&mut world, 100, |event| {
        matches!(event, Event::LevelAdvanced { .. })
    });
    let advances = events
        .iter()
        .filter(|event| matches!(event, Event::LevelAdvanced { level_index: 1, .. }))
        .count();
    assert_eq!(advances, 1);
    assert_eq!(query::level_index(&world), 1);
    assert_ne!(query::map_seed(&world), seed);
    assert_eq!(query::gold(&world), gold + TurretKind::Bolt.cost());
    assert!(query::turrets(&world).is_empty());
    assert_eq!(query::wave(&world), 0);
    assert_eq!(query::phase(&world), PhaseKind::Building);
}

#[test]
fn saves_land_in_the_slot_and_failures_are_swallowed() {
    let slot = SharedSlot::default();
    let stored = Rc::clone(&slot.0);
    let mut world = fresh().with_save_slot(Box::new(slot));

    let cell = cell_near_track(&world);
    let _ = run(
        &mut world,
        Command::BuildTurret {
            kind: TurretKind::Bolt,
            cell,
        },
    );
    assert!(stored.borrow().is_some(), "building autosaves");

    let events = run(&mut world, Command::Save);
    assert_eq!(events, vec![Event::GameSaved]);
    let blob = stored.borrow().clone().expect("blob stored");
    let mut reloaded = fresh();
    let events = run(&mut reloaded, Command::Load { blob });
    assert!(events.contains(&Event::LoadCompleted { success: true }));
    assert_eq!(query::turrets(&reloaded).len(), 1);

    let mut refusing = fresh().with_save_slot(Box::new(MemorySlot::refusing()));
    assert!(run(&mut refusing, Command::Save).is_empty());
    let mut unslotted = fresh();
    assert!(run(&mut unslotted, Command::Save).is_empty());
}

fn fingerprint(seed: u64) -> u64 {
    let mut world = World::new(SimulationConfig {
        composition_seed: Some(seed),
        ..SimulationConfig::default()
    });
    let mut events = Vec::new();
    let cells = query::buildable_cells(&world);
    let layout = query::tile_layout(&world);
    let mut near: Vec<CellCoord> = cells;
    near.sort_by(|a, b| {
        layout
            .track_distance(*a)
            .total_cmp(&layout.track_distance(*b))
    });
    for (cell, kind) in near
        .into_iter()
        .zip([TurretKind::Bolt, TurretKind::Venom, TurretKind::Trap])
    {
        apply(&mut world, Command::BuildTurret { kind, cell }, &mut events);
    }
    apply(&mut world, Command::SetSpeed { multiplier: 2 }, &mut events);
    apply(&mut world, Command::StartWave, &mut events);
    for _ in 0..400 {
        apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
    }

    let mut hasher = DefaultHasher::new();
    for event in &events {
        format!("{event:?}").hash(&mut hasher);
    }
    query::gold(&world).hash(&mut hasher);
    query::lives(&world).hash(&mut hasher);
    hasher.finish()
}

#[test]
fn identical_seeds_replay_identically() {
    assert_eq!(fingerprint(42), fingerprint(42));
}
