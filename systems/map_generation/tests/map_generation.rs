use echo_defence_core::config::{TRACK_BLOCK_RADIUS, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use echo_defence_system_map_generation::{
    generate_map, MapGenerator, MapGeneratorConfig, CRAMPED_PATH_RATIO, MAX_TURNS, MIN_TURNS,
    POOL_MAX, POWER_TILE_MIN,
};
use glam::Vec2;

fn turn_count(points: &[Vec2]) -> usize {
    points
        .windows(3)
        .filter(|window| {
            let first = (window[1] - window[0]).normalize_or_zero();
            let second = (window[2] - window[1]).normalize_or_zero();
            first.dot(second) < 0.999
        })
        .count()
}

#[test]
fn identical_arguments_produce_identical_maps() {
    for (seed, env) in [(12_345, 0), (7, 1), (99_001, 2), (u32::MAX, 3)] {
        let first = generate_map(seed, env);
        let second = generate_map(seed, env);
        assert_eq!(first, second, "seed {seed} env {env} must replay");
    }
}

#[test]
fn different_seeds_produce_different_paths() {
    assert_ne!(generate_map(1, 0).path_n, generate_map(2, 0).path_n);
}

#[test]
fn seed_12345_path_is_long_enough_or_fell_back() {
    let map = generate_map(12_345, 0);
    let graph = map.path_graph(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
    let shorter = VIEWPORT_WIDTH.min(VIEWPORT_HEIGHT);
    assert!(
        graph.total_length() >= CRAMPED_PATH_RATIO * shorter || map.used_full_bounds,
        "path of {} is too short without fallback",
        graph.total_length()
    );
}

#[test]
fn paths_take_between_eight_and_sixteen_turns() {
    for seed in 0..64 {
        for env in 0..2 {
            let map = generate_map(seed, env);
            let turns = turn_count(&map.path_n);
            assert!(
                (MIN_TURNS as usize..=MAX_TURNS as usize).contains(&turns),
                "seed {seed} env {env} produced {turns} turns"
            );
        }
    }
}

#[test]
fn environment_parity_selects_the_primary_axis() {
    let horizontal = generate_map(42, 0);
    let start = horizontal.path_n.first().copied().expect("path has a start");
    let end = horizontal.path_n.last().copied().expect("path has an end");
    assert_eq!(start.x, 0.0);
    assert_eq!(end.x, 1.0);

    let vertical = generate_map(42, 1);
    let start = vertical.path_n.first().copied().expect("path has a start");
    let end = vertical.path_n.last().copied().expect("path has an end");
    assert_eq!(start.y, 0.0);
    assert_eq!(end.y, 1.0);
}

#[test]
fn coordinates_are_normalised() {
    for seed in 0..16 {
        let map = generate_map(seed, seed);
        let points = map
            .path_n
            .iter()
            .chain(map.power_tiles_n.iter())
            .chain(map.pools_n.iter().map(|pool| &pool.center));
        for point in points {
            assert!((0.0..=1.0).contains(&point.x) && (0.0..=1.0).contains(&point.y));
        }
    }
}

#[test]
fn power_tiles_meet_the_floor_and_stay_off_the_track() {
    let cell = 40.0;
    for seed in 0..48 {
        let map = generate_map(seed, seed % 4);
        assert!(map.power_tiles_n.len() >= POWER_TILE_MIN, "seed {seed}");
        let graph = map.path_graph(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
        for tile in map.power_tile_points(VIEWPORT_WIDTH, VIEWPORT_HEIGHT) {
            assert!(graph.distance_to(tile) >= TRACK_BLOCK_RADIUS * cell);
        }
    }
}

#[test]
fn pools_are_optional_and_never_cover_the_path() {
    for seed in 0..32 {
        let map = generate_map(seed, 0);
        assert!(map.pools_n.len() <= POOL_MAX as usize);
        let graph = map.path_graph(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
        for pool in &map.pools_n {
            let center = Vec2::new(
                pool.center.x * VIEWPORT_WIDTH,
                pool.center.y * VIEWPORT_HEIGHT,
            );
            assert!(graph.distance_to(center) > pool.radius_cells * 40.0);
        }
    }
}

#[test]
fn cramped_viewport_falls_back_to_full_bounds() {
    let generator = MapGenerator::new(MapGeneratorConfig {
        width: 1_280.0,
        height: 120.0,
        ..MapGeneratorConfig::default()
    });
    let map = generator.generate(3, 1);
    assert!(map.used_full_bounds);
    let graph = map.path_graph(1_280.0, 120.0);
    assert!(graph.total_length() >= CRAMPED_PATH_RATIO * 120.0);
    assert_eq!(map.bounds_n.min_y, 0.0);
}
