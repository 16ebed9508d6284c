#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic map generation.
//!
//! A single `(seed, env_id)` pair fully determines the path polyline, the
//! power tile set, and the decorative pools. The generator never fails: when
//! geometry turns out cramped or sampling comes up short it relaxes its
//! constraints instead.

use echo_defence_core::{
    config::{
        SimulationConfig, CELL_SIZE, TRACK_BLOCK_RADIUS, UI_BOTTOM_ROWS, UI_TOP_ROWS,
        VIEWPORT_HEIGHT, VIEWPORT_WIDTH,
    },
    mix_seed, CellCoord, MapData, PathGraph, Pool, RectN, SeededRng,
};
use glam::Vec2;
use log::debug;

/// Paths shorter than this fraction of the viewport's shorter side are
/// regenerated with full-viewport bounds.
pub const CRAMPED_PATH_RATIO: f32 = 0.35;
/// Fewest turns a path may take.
pub const MIN_TURNS: u32 = 8;
/// Most turns a path may take.
pub const MAX_TURNS: u32 = 16;
/// Nearest a power tile is offset from the path, in cells.
pub const POWER_NEAR_MIN: f32 = 1.6;
/// Furthest a power tile is offset from the path, in cells.
pub const POWER_NEAR_MAX: f32 = 3.2;
/// Minimum spacing between power tiles, in cells.
pub const POWER_SPACING: f32 = 4.0;
/// Minimum distance between a power tile and the spawn or goal, in cells.
pub const POWER_END_CLEARANCE: f32 = 3.0;
/// Number of power tiles the primary pass aims for.
pub const POWER_TILE_TARGET: usize = 4;
/// Number of power tiles every map is guaranteed to carry.
pub const POWER_TILE_MIN: usize = 3;
/// Minimum distance between a power tile centre and the path, in cells.
pub const POWER_TRACK_CLEARANCE: f32 = TRACK_BLOCK_RADIUS + 0.3;
/// Fewest decorative pools attempted.
pub const POOL_MIN: u32 = 2;
/// Most decorative pools attempted.
pub const POOL_MAX: u32 = 4;

const POWER_ATTEMPTS: u32 = 160;
const POOL_ATTEMPTS: u32 = 80;
const POOL_RADIUS_MIN: f32 = 0.8;
const POOL_RADIUS_MAX: f32 = 1.6;
const POOL_CLEARANCE: f32 = 1.5;
const POWER_STREAM: u32 = 0x706f_7772;
const POOL_STREAM: u32 = 0x706f_6f6c;

/// Visual themes; the theme also decides the path's primary axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Grassland, runs left to right.
    Verdant,
    /// Desert, runs top to bottom.
    Dunes,
    /// Ice field, runs left to right.
    Glacier,
    /// Abyss, runs top to bottom.
    Void,
}

/// Direction in which the path crosses the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Spawn on the left edge, goal on the right.
    Horizontal,
    /// Spawn on the top edge, goal on the bottom.
    Vertical,
}

impl Environment {
    /// Themes in the order they cycle with the environment id.
    pub const ALL: [Environment; 4] = [
        Environment::Verdant,
        Environment::Dunes,
        Environment::Glacier,
        Environment::Void,
    ];

    /// Theme for an environment id.
    #[must_use]
    pub const fn from_id(env_id: u32) -> Self {
        match env_id % 4 {
            0 => Self::Verdant,
            1 => Self::Dunes,
            2 => Self::Glacier,
            _ => Self::Void,
        }
    }

    /// Primary axis of the path.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Verdant | Self::Glacier => Axis::Horizontal,
            Self::Dunes | Self::Void => Axis::Vertical,
        }
    }

    /// Stable key used in logs and saves.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Verdant => "verdant",
            Self::Dunes => "dunes",
            Self::Glacier => "glacier",
            Self::Void => "void",
        }
    }
}

/// Viewport geometry the generator lays the map out in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapGeneratorConfig {
    /// Viewport width in world units.
    pub width: f32,
    /// Viewport height in world units.
    pub height: f32,
    /// Grid cell size in world units.
    pub cell_size: f32,
    /// Rows hidden behind the top HUD.
    pub ui_top_rows: u32,
    /// Rows hidden behind the bottom build bar.
    pub ui_bottom_rows: u32,
}

impl Default for MapGeneratorConfig {
    fn default() -> Self {
        Self {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
            cell_size: CELL_SIZE,
            ui_top_rows: UI_TOP_ROWS,
            ui_bottom_rows: UI_BOTTOM_ROWS,
        }
    }
}

impl MapGeneratorConfig {
    /// Derives the generator geometry from a run configuration.
    #[must_use]
    pub fn from_simulation(config: &SimulationConfig) -> Self {
        Self {
            width: config.viewport_width,
            height: config.viewport_height,
            cell_size: config.cell_size,
            ..Self::default()
        }
    }

    fn cell(&self) -> f32 {
        self.cell_size.max(1.0)
    }

    fn columns(&self) -> u32 {
        (self.width / self.cell()).floor().max(1.0) as u32
    }

    fn rows(&self) -> u32 {
        (self.height / self.cell()).floor().max(1.0) as u32
    }

    fn bounds(&self, full: bool) -> GridBounds {
        let max_col = self.columns() - 1;
        let last_row = self.rows() - 1;
        if full {
            return GridBounds {
                min_col: 0,
                max_col,
                min_row: 0,
                max_row: last_row,
            };
        }
        let min_row = self.ui_top_rows.min(last_row);
        let max_row = last_row.saturating_sub(self.ui_bottom_rows).max(min_row);
        GridBounds {
            min_col: 0,
            max_col,
            min_row,
            max_row,
        }
    }

    fn normalize(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x / self.width, point.y / self.height)
    }

    fn denormalize(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x * self.width, point.y * self.height)
    }
}

/// Inclusive cell rectangle the generator works inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GridBounds {
    min_col: u32,
    max_col: u32,
    min_row: u32,
    max_row: u32,
}

impl GridBounds {
    fn contains(&self, cell: CellCoord) -> bool {
        (self.min_col..=self.max_col).contains(&cell.column())
            && (self.min_row..=self.max_row).contains(&cell.row())
    }

    fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.min_row..=self.max_row).flat_map(move |row| {
            (self.min_col..=self.max_col).map(move |column| CellCoord::new(column, row))
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct PowerRules {
    near_min: f32,
    near_max: f32,
    spacing: f32,
    end_clearance: f32,
}

const STRICT_POWER: PowerRules = PowerRules {
    near_min: POWER_NEAR_MIN,
    near_max: POWER_NEAR_MAX,
    spacing: POWER_SPACING,
    end_clearance: POWER_END_CLEARANCE,
};

const RELAXED_POWER: PowerRules = PowerRules {
    near_min: POWER_NEAR_MIN,
    near_max: POWER_NEAR_MAX * 1.6,
    spacing: POWER_SPACING * 0.5,
    end_clearance: POWER_END_CLEARANCE * 0.5,
};

const SWEEP_POWER: PowerRules = PowerRules {
    near_min: 0.0,
    near_max: f32::INFINITY,
    spacing: 1.0,
    end_clearance: 1.0,
};

/// Pure generator producing [`MapData`] for a viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MapGenerator {
    config: MapGeneratorConfig,
}

/// Generates a map for the default viewport.
#[must_use]
pub fn generate_map(seed: u32, env_id: u32) -> MapData {
    MapGenerator::default().generate(seed, env_id)
}

impl MapGenerator {
    /// Creates a generator for the provided viewport geometry.
    #[must_use]
    pub const fn new(config: MapGeneratorConfig) -> Self {
        Self { config }
    }

    /// Viewport geometry used by the generator.
    #[must_use]
    pub const fn config(&self) -> &MapGeneratorConfig {
        &self.config
    }

    /// Generates the layout for `seed` and `env_id`.
    #[must_use]
    pub fn generate(&self, seed: u32, env_id: u32) -> MapData {
        let environment = Environment::from_id(env_id);
        let axis = environment.axis();
        let shorter = self.config.width.min(self.config.height);

        let mut bounds = self.config.bounds(false);
        let mut path_n = self.build_path(seed, axis, bounds);
        let mut used_full_bounds = false;
        if self.graph(&path_n).total_length() < CRAMPED_PATH_RATIO * shorter {
            debug!(
                "map {seed}/{}: cramped path, retrying with full bounds",
                environment.key()
            );
            bounds = self.config.bounds(true);
            path_n = self.build_path(seed, axis, bounds);
            used_full_bounds = true;
        }

        let graph = self.graph(&path_n);
        let power = self.place_power_tiles(seed, bounds, &graph);
        let pools_n = self.place_pools(seed, bounds, &graph, &power);
        let cell = self.config.cell();
        let power_tiles_n = power
            .iter()
            .map(|tile| self.config.normalize(tile.center(cell)))
            .collect();

        MapData {
            seed,
            env_id,
            bounds_n: RectN {
                min_x: bounds.min_col as f32 * cell / self.config.width,
                min_y: bounds.min_row as f32 * cell / self.config.height,
                max_x: (bounds.max_col + 1) as f32 * cell / self.config.width,
                max_y: (bounds.max_row + 1) as f32 * cell / self.config.height,
            },
            path_n,
            power_tiles_n,
            pools_n,
            used_full_bounds,
        }
    }

    fn graph(&self, path_n: &[Vec2]) -> PathGraph {
        PathGraph::new(
            path_n
                .iter()
                .map(|point| self.config.denormalize(*point))
                .collect(),
        )
    }

    fn build_path(&self, seed: u32, axis: Axis, bounds: GridBounds) -> Vec<Vec2> {
        let mut rng = SeededRng::new(seed);
        let turns = rng.int_inclusive((MIN_TURNS / 2) as i32, (MAX_TURNS / 2) as i32) as u32 * 2;

        let (primary_min, primary_max, lateral_min, lateral_max) = match axis {
            Axis::Horizontal => (
                bounds.min_col,
                bounds.max_col,
                bounds.min_row,
                bounds.max_row,
            ),
            Axis::Vertical => (
                bounds.min_row,
                bounds.max_row,
                bounds.min_col,
                bounds.max_col,
            ),
        };
        let span = primary_max - primary_min;
        let jumps = (turns / 2 + 1).min(span.max(1));
        let stops = primary_stops(&mut rng, span, jumps);

        let (lo, hi) = if lateral_max - lateral_min >= 4 {
            (lateral_min + 1, lateral_max - 1)
        } else {
            (lateral_min, lateral_max)
        };
        let mut lateral = rng.int_inclusive(lo as i32, hi as i32) as u32;

        let mut cells = Vec::with_capacity(stops.len() * 2);
        cells.push((primary_min + stops[0], lateral));
        for (index, stop) in stops.iter().enumerate().skip(1) {
            cells.push((primary_min + stop, lateral));
            if index + 1 < stops.len() {
                lateral = next_lateral(&mut rng, lateral, lo, hi);
                cells.push((primary_min + stop, lateral));
            }
        }
        cells.dedup();

        let cell = self.config.cell();
        let extent = match axis {
            Axis::Horizontal => self.config.width,
            Axis::Vertical => self.config.height,
        };
        let last = cells.len() - 1;
        cells
            .iter()
            .enumerate()
            .map(|(index, (primary, lateral))| {
                let along = if index == 0 {
                    0.0
                } else if index == last {
                    extent
                } else {
                    (*primary as f32 + 0.5) * cell
                };
                let across = (*lateral as f32 + 0.5) * cell;
                let world = match axis {
                    Axis::Horizontal => Vec2::new(along, across),
                    Axis::Vertical => Vec2::new(across, along),
                };
                self.config.normalize(world)
            })
            .collect()
    }

    fn place_power_tiles(
        &self,
        seed: u32,
        bounds: GridBounds,
        graph: &PathGraph,
    ) -> Vec<CellCoord> {
        let mut rng = SeededRng::new(mix_seed(seed, POWER_STREAM));
        let mut tiles = Vec::with_capacity(POWER_TILE_TARGET);
        self.sample_power(&mut rng, bounds, graph, STRICT_POWER, POWER_TILE_TARGET, &mut tiles);
        if tiles.len() < POWER_TILE_MIN {
            debug!(
                "map {seed}: primary power pass found {} tiles, relaxing",
                tiles.len()
            );
            self.sample_power(&mut rng, bounds, graph, RELAXED_POWER, POWER_TILE_MIN, &mut tiles);
        }
        if tiles.len() < POWER_TILE_MIN {
            debug!("map {seed}: sweeping for remaining power tiles");
            for cell in bounds.cells() {
                if tiles.len() >= POWER_TILE_MIN {
                    break;
                }
                if self.power_candidate_ok(cell, bounds, graph, SWEEP_POWER, &tiles) {
                    tiles.push(cell);
                }
            }
        }
        tiles
    }

    fn sample_power(
        &self,
        rng: &mut SeededRng,
        bounds: GridBounds,
        graph: &PathGraph,
        rules: PowerRules,
        wanted: usize,
        tiles: &mut Vec<CellCoord>,
    ) {
        let cell = self.config.cell();
        for _ in 0..POWER_ATTEMPTS {
            if tiles.len() >= wanted {
                return;
            }
            let distance = rng.range(0.0, graph.total_length());
            let anchor = graph.point_at(distance);
            let normal = graph.direction_at(distance).perp();
            let side = if rng.chance(0.5) { 1.0 } else { -1.0 };
            let offset = rng.range(rules.near_min, rules.near_max) * cell;
            let Some(candidate) = CellCoord::containing(anchor + normal * side * offset, cell)
            else {
                continue;
            };
            if self.power_candidate_ok(candidate, bounds, graph, rules, tiles) {
                tiles.push(candidate);
            }
        }
    }

    fn power_candidate_ok(
        &self,
        candidate: CellCoord,
        bounds: GridBounds,
        graph: &PathGraph,
        rules: PowerRules,
        tiles: &[CellCoord],
    ) -> bool {
        if !bounds.contains(candidate) {
            return false;
        }
        let cell = self.config.cell();
        let center = candidate.center(cell);
        if graph.distance_to(center) < POWER_TRACK_CLEARANCE * cell {
            return false;
        }
        let end_clearance = rules.end_clearance * cell;
        if center.distance(graph.spawn()) < end_clearance
            || center.distance(graph.goal()) < end_clearance
        {
            return false;
        }
        tiles
            .iter()
            .all(|tile| tile.center(cell).distance(center) >= rules.spacing * cell)
    }

    fn place_pools(
        &self,
        seed: u32,
        bounds: GridBounds,
        graph: &PathGraph,
        power: &[CellCoord],
    ) -> Vec<Pool> {
        let mut rng = SeededRng::new(mix_seed(seed, POOL_STREAM));
        let wanted = rng.int_inclusive(POOL_MIN as i32, POOL_MAX as i32) as usize;
        let cell = self.config.cell();
        let mut placed: Vec<(Vec2, f32)> = Vec::with_capacity(wanted);

        for _ in 0..POOL_ATTEMPTS {
            if placed.len() >= wanted {
                break;
            }
            let radius = rng.range(POOL_RADIUS_MIN, POOL_RADIUS_MAX);
            let column = rng.int_inclusive(bounds.min_col as i32, bounds.max_col as i32) as u32;
            let row = rng.int_inclusive(bounds.min_row as i32, bounds.max_row as i32) as u32;
            let center = CellCoord::new(column, row).center(cell);
            let reach = (radius + POOL_CLEARANCE) * cell;
            if graph.distance_to(center) < reach {
                continue;
            }
            if power
                .iter()
                .any(|tile| tile.center(cell).distance(center) < reach)
            {
                continue;
            }
            if placed.iter().any(|(other, other_radius)| {
                other.distance(center) < (radius + other_radius + 1.0) * cell
            }) {
                continue;
            }
            placed.push((center, radius));
        }

        placed
            .into_iter()
            .map(|(center, radius_cells)| Pool {
                center: self.config.normalize(center),
                radius_cells,
            })
            .collect()
    }
}

/// Offsets along the primary axis where the path turns, from `0` to `span`.
fn primary_stops(rng: &mut SeededRng, span: u32, jumps: u32) -> Vec<u32> {
    let mut stops = Vec::with_capacity(jumps as usize + 1);
    stops.push(0);
    let step = span as f32 / jumps as f32;
    let mut previous = 0_i64;
    for k in 1..jumps {
        let jitter = rng.range(-0.3, 0.3) * step;
        let ideal = (k as f32 * step + jitter).round() as i64;
        let floor = previous + 1;
        let ceiling = i64::from(span) - i64::from(jumps - k);
        previous = ideal.clamp(floor, ceiling.max(floor));
        stops.push(previous as u32);
    }
    stops.push(span);
    stops
}

/// Picks a lateral position different from `current` when the range allows it.
fn next_lateral(rng: &mut SeededRng, current: u32, lo: u32, hi: u32) -> u32 {
    if hi <= lo {
        return current;
    }
    let candidate = rng.int_inclusive(lo as i32, hi as i32 - 1) as u32;
    if candidate >= current {
        candidate + 1
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_are_strictly_increasing() {
        let mut rng = SeededRng::new(5);
        for jumps in 1..=9 {
            let stops = primary_stops(&mut rng, 31, jumps);
            assert_eq!(stops.len(), jumps as usize + 1);
            assert!(stops.windows(2).all(|pair| pair[0] < pair[1]));
            assert_eq!(stops.last(), Some(&31));
        }
    }

    #[test]
    fn lateral_moves_always_change_row() {
        let mut rng = SeededRng::new(11);
        for _ in 0..500 {
            let next = next_lateral(&mut rng, 7, 3, 15);
            assert_ne!(next, 7);
            assert!((3..=15).contains(&next));
        }
        assert_eq!(next_lateral(&mut rng, 4, 4, 4), 4);
    }

    #[test]
    fn environments_alternate_axes() {
        assert_eq!(Environment::from_id(0).axis(), Axis::Horizontal);
        assert_eq!(Environment::from_id(1).axis(), Axis::Vertical);
        assert_eq!(Environment::from_id(6), Environment::Glacier);
    }

    #[test]
    fn constrained_bounds_skip_ui_rows() {
        let config = MapGeneratorConfig::default();
        let bounds = config.bounds(false);
        assert_eq!(bounds.min_row, UI_TOP_ROWS);
        assert_eq!(bounds.max_row, 17 - UI_BOTTOM_ROWS);
        assert_eq!(config.bounds(true).min_row, 0);
    }
}
