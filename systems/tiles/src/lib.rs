#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-cell mutable tile state: corruption, cleansing, and power tiles.
//!
//! States are materialised lazily. Default costs derive from
//! `(map_seed, column, row, level_index)` so they stay stable without being
//! persisted up front.

mod layout;

use std::collections::{BTreeMap, BTreeSet};

use echo_defence_core::{
    config::TRACK_BLOCK_RADIUS, mix_seed, CellCoord, PlacementError, SeededRng,
};
use log::debug;
use thiserror::Error;

pub use layout::{TileKind, TileLayout};

/// Base gold cost of cleansing a corrupted tile.
pub const CLEANSE_BASE_COST: u32 = 30;
/// Additional cleanse cost per level.
pub const CLEANSE_LEVEL_COST: u32 = 10;
/// Base gold cost of unlocking a power tile.
pub const POWER_BASE_COST: u32 = 120;
/// Additional unlock cost per level.
pub const POWER_LEVEL_COST: u32 = 25;
/// Cells beyond the blocked track radius that may be corrupted.
pub const CORRUPTION_BAND_CELLS: f32 = 3.0;
/// Fraction of band candidates targeted for corruption.
pub const CORRUPTION_FRACTION: f32 = 0.18;
/// Fewest corrupted tiles placed when candidates allow.
pub const CORRUPTION_FLOOR: usize = 4;
/// Most corrupted tiles placed.
pub const CORRUPTION_CEILING: usize = 18;
/// Band candidates that always stay clear.
pub const CORRUPTION_CLEAR_FLOOR: usize = 12;

/// Mutable state of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileState {
    /// Whether the cell is blocked until cleansed.
    pub corrupted: bool,
    /// Gold required to cleanse.
    pub cleanse_cost: u32,
    /// Whether the power tile was bought.
    pub power_purchased: bool,
    /// Gold required to unlock the power tile.
    pub power_unlock_cost: u32,
}

/// Reasons a tile action is refused. State is untouched in both cases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TileActionError {
    /// The cell is not in a state the action applies to.
    #[error("not applicable")]
    NotApplicable,
    /// The player cannot afford the action.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Gold required.
        required: u32,
        /// Gold available.
        available: u32,
    },
}

/// Lazily populated tile state for one map instance.
#[derive(Clone, Debug, PartialEq)]
pub struct TileStateStore {
    map_seed: u32,
    level_index: u32,
    states: BTreeMap<CellCoord, TileState>,
}

impl TileStateStore {
    /// Creates an empty store for a map instance.
    #[must_use]
    pub fn new(map_seed: u32, level_index: u32) -> Self {
        Self {
            map_seed,
            level_index,
            states: BTreeMap::new(),
        }
    }

    /// Seed of the map the store belongs to.
    #[must_use]
    pub fn map_seed(&self) -> u32 {
        self.map_seed
    }

    /// Level the store belongs to.
    #[must_use]
    pub fn level_index(&self) -> u32 {
        self.level_index
    }

    /// State the cell has before any mutation.
    #[must_use]
    pub fn default_state(&self, cell: CellCoord) -> TileState {
        let hash = mix_seed(
            mix_seed(mix_seed(self.map_seed, cell.column()), cell.row()),
            self.level_index,
        );
        TileState {
            corrupted: false,
            cleanse_cost: CLEANSE_BASE_COST + CLEANSE_LEVEL_COST * self.level_index + hash % 21,
            power_purchased: false,
            power_unlock_cost: POWER_BASE_COST
                + POWER_LEVEL_COST * self.level_index
                + (hash >> 8) % 41,
        }
    }

    /// State of the cell, materialising it on first access.
    pub fn state(&mut self, cell: CellCoord) -> &TileState {
        let fresh = self.default_state(cell);
        self.states.entry(cell).or_insert(fresh)
    }

    /// State of the cell without materialising it.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> TileState {
        self.states
            .get(&cell)
            .copied()
            .unwrap_or_else(|| self.default_state(cell))
    }

    /// Materialised states in cell order.
    pub fn entries(&self) -> impl Iterator<Item = (CellCoord, TileState)> + '_ {
        self.states.iter().map(|(cell, state)| (*cell, *state))
    }

    /// Currently corrupted cells in cell order.
    #[must_use]
    pub fn corrupted_cells(&self) -> Vec<CellCoord> {
        self.states
            .iter()
            .filter(|(_, state)| state.corrupted)
            .map(|(cell, _)| *cell)
            .collect()
    }

    /// Replaces every materialised state with saved entries.
    ///
    /// Costs are floored at one.
    pub fn restore(&mut self, entries: impl IntoIterator<Item = (CellCoord, TileState)>) {
        self.states.clear();
        for (cell, state) in entries {
            let _ = self.states.insert(
                cell,
                TileState {
                    cleanse_cost: state.cleanse_cost.max(1),
                    power_unlock_cost: state.power_unlock_cost.max(1),
                    ..state
                },
            );
        }
    }

    /// Ensures every power tile has a materialised, uncorrupted state.
    pub fn seed_power_tiles(&mut self, layout: &TileLayout) {
        for cell in layout.power_cells() {
            let fresh = self.default_state(*cell);
            let state = self.states.entry(*cell).or_insert(fresh);
            state.corrupted = false;
        }
    }

    /// Corrupts a seeded selection of cells near the track.
    ///
    /// Candidates are buildable cells whose distance to the path lies within
    /// [`CORRUPTION_BAND_CELLS`] beyond the blocked radius. Returns the cells
    /// that were corrupted.
    pub fn place_corruption(&mut self, layout: &TileLayout) -> Vec<CellCoord> {
        self.seed_power_tiles(layout);

        let cell_size = layout.cell_size();
        let blocked = TRACK_BLOCK_RADIUS * cell_size;
        let band = blocked + CORRUPTION_BAND_CELLS * cell_size;
        let mut candidates: Vec<CellCoord> = layout
            .cells()
            .filter(|cell| layout.kind(*cell) == Some(TileKind::Buildable))
            .filter(|cell| {
                let distance = layout.track_distance(*cell);
                distance > blocked && distance <= band
            })
            .collect();

        let target = corruption_target(candidates.len());
        let mut rng = SeededRng::new(mix_seed(self.map_seed, self.level_index));
        rng.shuffle(&mut candidates);

        let mut selected = BTreeSet::new();
        for (base, penalty) in [(0.55, 1.25), (0.9, 0.35)] {
            for cell in &candidates {
                if selected.len() >= target {
                    break;
                }
                if selected.contains(cell) {
                    continue;
                }
                let neighbours = selected
                    .iter()
                    .filter(|other| cell.chebyshev_distance(**other) == 1)
                    .count() as f32;
                if rng.chance(base / (1.0 + penalty * neighbours)) {
                    let _ = selected.insert(*cell);
                }
            }
        }

        for cell in &selected {
            let fresh = self.default_state(*cell);
            self.states.entry(*cell).or_insert(fresh).corrupted = true;
        }
        debug!(
            "map {} level {}: corrupted {} of {} candidates (target {target})",
            self.map_seed,
            self.level_index,
            selected.len(),
            candidates.len()
        );
        selected.into_iter().collect()
    }

    /// Removes corruption from a cell, deducting the cleanse cost.
    ///
    /// A refused cleanse leaves the store untouched.
    pub fn cleanse_tile(
        &mut self,
        cell: CellCoord,
        gold: &mut u32,
    ) -> Result<u32, TileActionError> {
        let current = self.get(cell);
        if !current.corrupted {
            return Err(TileActionError::NotApplicable);
        }
        let cost = current.cleanse_cost;
        if *gold < cost {
            return Err(TileActionError::InsufficientFunds {
                required: cost,
                available: *gold,
            });
        }
        *gold -= cost;
        self.states.entry(cell).or_insert(current).corrupted = false;
        Ok(cost)
    }

    /// Unlocks a power tile, deducting the unlock cost.
    pub fn purchase_power_tile(
        &mut self,
        layout: &TileLayout,
        cell: CellCoord,
        gold: &mut u32,
    ) -> Result<u32, TileActionError> {
        if layout.kind(cell) != Some(TileKind::Power) {
            return Err(TileActionError::NotApplicable);
        }
        let current = self.get(cell);
        if current.power_purchased {
            return Err(TileActionError::NotApplicable);
        }
        let cost = current.power_unlock_cost;
        if *gold < cost {
            return Err(TileActionError::InsufficientFunds {
                required: cost,
                available: *gold,
            });
        }
        *gold -= cost;
        self.states.entry(cell).or_insert(current).power_purchased = true;
        Ok(cost)
    }

    /// Whether a turret may be built on the cell, ignoring occupancy.
    pub fn check_buildable(
        &self,
        layout: &TileLayout,
        cell: CellCoord,
    ) -> Result<(), PlacementError> {
        match layout.kind(cell) {
            None | Some(TileKind::Reserved) => Err(PlacementError::OutOfBounds),
            Some(TileKind::Track) => Err(PlacementError::Track),
            Some(TileKind::Pool) => Err(PlacementError::Pool),
            Some(TileKind::Power) if !self.get(cell).power_purchased => {
                Err(PlacementError::PowerLocked)
            }
            Some(TileKind::Power) => Ok(()),
            Some(TileKind::Buildable) if self.get(cell).corrupted => {
                Err(PlacementError::Corrupted)
            }
            Some(TileKind::Buildable) => Ok(()),
        }
    }

    /// Whether the cell is a purchased power tile.
    #[must_use]
    pub fn is_powered(&self, layout: &TileLayout, cell: CellCoord) -> bool {
        layout.kind(cell) == Some(TileKind::Power) && self.get(cell).power_purchased
    }
}

/// Number of cells to corrupt out of `candidates` band cells.
#[must_use]
pub fn corruption_target(candidates: usize) -> usize {
    let wanted = (candidates as f32 * CORRUPTION_FRACTION).round() as usize;
    wanted
        .clamp(CORRUPTION_FLOOR, CORRUPTION_CEILING)
        .min(candidates.saturating_sub(CORRUPTION_CLEAR_FLOOR))
}
