//! Door entities.
//!
//! The open/closed state lives on the door's [`Cell`]; the entity only eases
//! a visual `openness` towards it so the renderer can fade doors in and out.

use crate::maze::cell::Cell;
use crate::maze::grid::{Direction, Grid, GridPos};

/// Milliseconds a door takes to fully open or close on screen.
const DOOR_FADE_MS: f32 = 150.0;

/// A door on the maze border.
#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    /// Cell the door occupies.
    pub pos: GridPos,
    /// Border side the door faces.
    pub direction: Option<Direction>,
    /// 1.0 when drawn fully open, 0.0 when drawn fully closed.
    pub openness: f32,
}

impl Door {
    /// Door entity for the door cell at `pos`.
    pub fn new(pos: GridPos, cells: &Grid<Cell>) -> Self {
        let state = cells.get(pos).and_then(|c| c.door);
        Self {
            pos,
            direction: state.and_then(|d| d.direction),
            openness: if state.is_some_and(|d| d.is_open) { 1.0 } else { 0.0 },
        }
    }

    /// Whether the underlying cell is currently open.
    pub fn is_open(&self, cells: &Grid<Cell>) -> bool {
        cells
            .get(self.pos)
            .and_then(|c| c.door)
            .is_some_and(|d| d.is_open)
    }

    /// Eases [`Door::openness`] towards the cell's current state.
    pub fn advance(&mut self, delta_ms: f32, cells: &Grid<Cell>) {
        let target = if self.is_open(cells) { 1.0 } else { 0.0 };
        let step = delta_ms / DOOR_FADE_MS;
        self.openness += (target - self.openness).clamp(-step, step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::level::Level;
    use crate::maze::blueprint::MazeBlueprint;

    #[test]
    fn test_openness_follows_cell_state() {
        let blueprint = MazeBlueprint::new(vec![vec![0, 0, 0], vec![4, 1, 0], vec![0, 0, 0]]).unwrap();
        let mut level = Level::from_blueprint(&blueprint);
        let mut door = Door::new(GridPos::new(1, 0), &level.cells);
        assert_eq!(door.direction, Some(Direction::Left));
        assert_eq!(door.openness, 1.0);

        level.set_doors_open(false);
        door.advance(75.0, &level.cells);
        assert_eq!(door.openness, 0.5);
        door.advance(500.0, &level.cells);
        assert_eq!(door.openness, 0.0);

        level.set_doors_open(true);
        door.advance(15.0, &level.cells);
        assert!(door.openness > 0.0 && door.openness < 1.0);
        assert!(door.is_open(&level.cells));
    }
}
