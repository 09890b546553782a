//! Runtime level state built from a [`MazeBlueprint`].

use crate::config::CELL_SIZE;
use crate::geometry::Point;
use crate::maze::blueprint::{CellType, MazeBlueprint};
use crate::maze::cell::{Cell, ItemKind};
use crate::maze::grid::{Grid, GridPos};

/// Cells, coin bookkeeping and door positions of the level being played.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Materialised cells.
    pub cells: Grid<Cell>,
    /// Coins still lying in the maze.
    pub coins: usize,
    /// Set once the coin count first reaches zero.
    pub got_all_coins: bool,
    /// Door cells in row-major order.
    pub doors: Vec<GridPos>,
}

impl Level {
    /// Builds cells from `blueprint`. Every ground cell carries a coin.
    pub fn from_blueprint(blueprint: &MazeBlueprint) -> Self {
        let kinds = blueprint.to_grid();
        let (rows, cols) = (kinds.rows(), kinds.cols());
        let cells = Grid::from_fn(rows, cols, |pos| {
            let kind = kinds.get(pos).copied().unwrap_or(CellType::Wall);
            Cell::new(pos, kind, rows, cols)
        });
        let coins = cells
            .iter()
            .filter(|(_, c)| c.item.is_some_and(|i| i.kind == ItemKind::Coin))
            .count();
        let doors = cells
            .iter()
            .filter(|(_, c)| c.door.is_some())
            .map(|(pos, _)| pos)
            .collect();
        Self {
            cells,
            coins,
            got_all_coins: false,
            doors,
        }
    }

    /// Where the player starts: the first door, else the first ground cell, else the origin.
    pub fn player_spawn(&self) -> GridPos {
        self.doors
            .first()
            .copied()
            .or_else(|| self.first_of(CellType::Ground))
            .unwrap_or_default()
    }

    /// Cells that start with an enemy on them.
    pub fn enemy_spawns(&self) -> Vec<GridPos> {
        self.cells
            .iter()
            .filter(|(_, c)| c.kind == CellType::Enemy)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Cell containing `point`, if it lies inside the grid.
    pub fn cell_at(&self, point: Point) -> Option<GridPos> {
        cell_at(&self.cells, point)
    }

    /// Whether any door is currently open.
    pub fn any_door_open(&self) -> bool {
        self.doors.iter().any(|&pos| {
            self.cells
                .get(pos)
                .and_then(|c| c.door)
                .is_some_and(|d| d.is_open)
        })
    }

    /// Opens or closes every door.
    ///
    /// # Returns
    /// How many doors changed state.
    pub fn set_doors_open(&mut self, open: bool) -> usize {
        let mut changed = 0;
        for &pos in &self.doors {
            if let Some(cell) = self.cells.get_mut(pos) {
                if cell.set_door_open(open) {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Distance from `point` to the nearest door centre.
    pub fn nearest_door_distance(&self, point: Point) -> Option<f32> {
        self.doors
            .iter()
            .filter_map(|&pos| self.cells.get(pos))
            .map(|c| point.distance_to(c.center()))
            .min_by(f32::total_cmp)
    }

    fn first_of(&self, kind: CellType) -> Option<GridPos> {
        self.cells
            .iter()
            .find(|(_, c)| c.kind == kind)
            .map(|(pos, _)| pos)
    }
}

/// Cell containing `point`; coordinates are truncated, negatives fall outside.
pub fn cell_at(cells: &Grid<Cell>, point: Point) -> Option<GridPos> {
    let row = (point.y / CELL_SIZE).trunc();
    let col = (point.x / CELL_SIZE).trunc();
    if row < 0.0 || col < 0.0 {
        return None;
    }
    let pos = GridPos::new(row as usize, col as usize);
    cells.contains(pos).then_some(pos)
}
