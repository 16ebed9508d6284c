use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use echo_defence_core::{EnemyKind, SpawnEvent, TargetMode, WaveScalar};
use echo_defence_system_persistence::{
    decode, encode, EnemyRecord, MemorySlot, SaveSlot, SaveState, TileRecord, TurretRecord,
    ZoneRecord,
};

fn populated() -> SaveState {
    SaveState {
        level_index: 1,
        map_seed: 12_345,
        gold: 310,
        lives: 17,
        wave: 6,
        wave_max: 16,
        has_started: true,
        wave_active: true,
        wave_anomaly_key: Some("HASTE".to_owned()),
        speed: 2,
        spawn_elapsed: 3.5,
        pending_spawns: vec![SpawnEvent {
            time: 4.0,
            kind: EnemyKind::Shielded,
            scalar: WaveScalar {
                hp: 1.6,
                ..WaveScalar::IDENTITY
            },
            elite: None,
            is_miniboss: false,
        }],
        tiles: vec![TileRecord {
            gx: 4,
            gy: 7,
            corrupted: true,
            cleanse_cost: 41,
            power_purchased: false,
            power_unlock_cost: 133,
        }],
        turrets: vec![TurretRecord {
            id: 3,
            type_key: "needle".to_owned(),
            x: 180.0,
            y: 300.0,
            gx: 4,
            gy: 7,
            level: 2,
            mods_chosen: vec![1, 0],
            cool: 0.4,
            target_mode: TargetMode::Strongest,
            invested: 243,
            ..TurretRecord::default()
        }],
        enemies: vec![EnemyRecord {
            id: 9,
            type_key: "wraith".to_owned(),
            elite_tag: Some("PHASELINK".to_owned()),
            hp: 55.5,
            max_hp: 88.0,
            path_d: 412.25,
            slow: 0.35,
            slow_t: 1.2,
            dot: 9.0,
            dot_t: 2.5,
            revealed: true,
            reveal_t: 0.75,
            marked: 0.15,
            marked_t: 2.0,
            ..EnemyRecord::default()
        }],
        traps: vec![ZoneRecord {
            owner: 5,
            x: 200.0,
            y: 220.0,
            radius: 40.0,
            dps: 18.0,
            remaining: 2.0,
            siphon: true,
            ..ZoneRecord::default()
        }],
        ..SaveState::default()
    }
}

#[test]
fn populated_state_survives_encoding() {
    let state = populated();
    let blob = encode(&state).expect("state encodes");
    assert!(!blob.contains('\n'));
    assert_eq!(decode(&blob).expect("blob decodes"), state);
}

#[test]
fn decoding_sanitises_hostile_values() {
    let json = r#"{
        "speed": 9,
        "skip_buff": -4.0,
        "enemies": [{ "type_key": "grunt", "hp": 1e40, "max_hp": 60.0, "armor": 0.95 }],
        "tiles": [{ "gx": 1, "gy": 1, "cleanse_cost": 0 }]
    }"#;
    let blob = format!("echo:v1:{}", STANDARD_NO_PAD.encode(json));
    let state = decode(&blob).expect("blob decodes");
    assert_eq!(state.speed, 4);
    assert_eq!(state.skip_buff, 0.0);
    assert_eq!(state.enemies[0].hp, 60.0);
    assert_eq!(state.enemies[0].armor, 0.70);
    assert_eq!(state.tiles[0].cleanse_cost, 1);
}

#[test]
fn slots_hold_the_latest_blob() {
    let mut slot = MemorySlot::new();
    assert_eq!(slot.read().expect("read succeeds"), None);
    slot.write("echo:v1:first").expect("write succeeds");
    slot.write("echo:v1:second").expect("write succeeds");
    assert_eq!(
        slot.read().expect("read succeeds").as_deref(),
        Some("echo:v1:second")
    );
    assert!(MemorySlot::refusing().write("echo:v1:x").is_err());
}
