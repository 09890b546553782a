//! Player state and movement.
//!
//! The player is a circle of [`PLAYER_RADIUS`] that moves in screen space
//! (y grows downwards). Each tick it:
//!
//! - predicts a displacement from the held directions and last tick's wall flags,
//! - commits the new position,
//! - moves its current cell if the new centre lies in a different, existing cell,
//! - recomputes the wall flags against the current cell.
//!
//! The current cell only changes when the centre has fully crossed into a
//! neighbouring cell, so the flags always describe the cell the player is
//! mostly inside.

use crate::config::{PLAYER_RADIUS, PLAYER_SPEED};
use crate::game::collision::{MovementInput, WallCollisions, predict_displacement};
use crate::game::level::cell_at;
use crate::geometry::{Circle, Point};
use crate::maze::cell::Cell;
use crate::maze::grid::{Grid, GridPos};

/// The player-controlled circle.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Centre in pixels.
    pub position: Point,
    /// Pixels per millisecond.
    pub speed: f32,
    /// Cell the player currently occupies.
    pub current_cell: GridPos,
    /// Wall flags from the end of the last tick.
    pub collisions: WallCollisions,
}

impl Player {
    /// Places the player at the centre of `spawn`.
    pub fn spawn(spawn: GridPos, cells: &Grid<Cell>) -> Self {
        let position = cells
            .get(spawn)
            .map(Cell::center)
            .unwrap_or(Point::new(0.0, 0.0));
        Self {
            position,
            speed: PLAYER_SPEED,
            current_cell: spawn,
            collisions: WallCollisions::default(),
        }
    }

    /// Collision circle at the current position.
    pub fn circle(&self) -> Circle {
        Circle::new(self.position.x, self.position.y, PLAYER_RADIUS)
    }

    /// Advances the player by `delta_ms` with `input` held.
    pub fn advance(&mut self, delta_ms: f32, input: MovementInput, cells: &Grid<Cell>) {
        let (dx, dy) = predict_displacement(input, &self.collisions, self.speed, delta_ms);
        self.set_position(
            Point::new(self.position.x + dx, self.position.y + dy),
            cells,
        );
        if let Some(cell) = cells.get(self.current_cell) {
            self.collisions = WallCollisions::detect(&self.circle(), cell, cells);
        }
    }

    /// Moves the centre and follows it into a new cell when one exists there.
    pub fn set_position(&mut self, position: Point, cells: &Grid<Cell>) {
        self.position = position;
        if let Some(pos) = cell_at(cells, position) {
            if pos != self.current_cell {
                self.current_cell = pos;
            }
        }
    }
}
