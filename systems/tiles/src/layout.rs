//! Static classification of grid cells derived from map geometry.

use echo_defence_core::{
    config::{TRACK_BLOCK_RADIUS, UI_BOTTOM_ROWS, UI_TOP_ROWS},
    CellCoord, MapData, PathGraph,
};
use glam::Vec2;

/// What a grid cell is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Open ground that may host a turret.
    Buildable,
    /// Covered by the enemy path.
    Track,
    /// Covered by a decorative pool.
    Pool,
    /// Purchasable power tile.
    Power,
    /// Hidden behind the HUD.
    Reserved,
}

/// Cell classification for one generated map.
#[derive(Clone, Debug, PartialEq)]
pub struct TileLayout {
    columns: u32,
    rows: u32,
    cell_size: f32,
    kinds: Vec<TileKind>,
    power_cells: Vec<CellCoord>,
    path: PathGraph,
}

impl TileLayout {
    /// Classifies every cell of a `width` × `height` viewport.
    ///
    /// HUD rows are reserved unless the map fell back to full-viewport bounds.
    #[must_use]
    pub fn new(map: &MapData, width: f32, height: f32, cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let columns = (width / cell_size).floor().max(1.0) as u32;
        let rows = (height / cell_size).floor().max(1.0) as u32;
        let path = map.path_graph(width, height);
        let power_cells: Vec<CellCoord> = map
            .power_tile_points(width, height)
            .into_iter()
            .filter_map(|point| CellCoord::containing(point, cell_size))
            .collect();
        let scale = Vec2::new(width, height);
        let pools: Vec<(Vec2, f32)> = map
            .pools_n
            .iter()
            .map(|pool| (pool.center * scale, pool.radius_cells * cell_size))
            .collect();
        let (reserved_top, reserved_bottom) = if map.used_full_bounds {
            (0, 0)
        } else {
            (UI_TOP_ROWS, UI_BOTTOM_ROWS)
        };

        let mut kinds = Vec::with_capacity((columns * rows) as usize);
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                let center = cell.center(cell_size);
                let kind = if path.distance_to(center) < TRACK_BLOCK_RADIUS * cell_size {
                    TileKind::Track
                } else if power_cells.contains(&cell) {
                    TileKind::Power
                } else if pools
                    .iter()
                    .any(|(pool, radius)| pool.distance(center) <= *radius)
                {
                    TileKind::Pool
                } else if row < reserved_top || row + reserved_bottom >= rows {
                    TileKind::Reserved
                } else {
                    TileKind::Buildable
                };
                kinds.push(kind);
            }
        }

        Self {
            columns,
            rows,
            cell_size,
            kinds,
            power_cells,
            path,
        }
    }

    /// Number of grid columns.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of grid rows.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a cell in world units.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World-space path the layout was derived from.
    #[must_use]
    pub fn path(&self) -> &PathGraph {
        &self.path
    }

    /// Power tile cells.
    #[must_use]
    pub fn power_cells(&self) -> &[CellCoord] {
        &self.power_cells
    }

    /// Classification of a cell, or `None` outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<TileKind> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.kinds.get(index).copied()
    }

    /// Distance from the cell centre to the nearest path segment.
    #[must_use]
    pub fn track_distance(&self, cell: CellCoord) -> f32 {
        self.path.distance_to(cell.center(self.cell_size))
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.columns).map(move |column| CellCoord::new(column, row)))
    }
}
