//! Circle-versus-grid collision for the player.
//!
//! Movement is resolved in two phases each tick:
//!
//! 1. **Predict**: the displacement for the held directions is computed, with
//!    any axis that was flagged as blocked on the *previous* tick zeroed, and a
//!    push-back applied away from a flagged corner.
//! 2. **Correct**: after the position is committed, the eight wall flags are
//!    recomputed against the edges of the cell the entity now occupies. These
//!    flags feed the next tick's prediction.
//!
//! A cardinal flag is set when the neighbour in that direction is a wall and
//! the entity's circle crosses the shared edge of the *current* cell. A corner
//! flag additionally needs both adjacent edges crossed and the diagonal
//! neighbour to be a wall.

use crate::config::DIAGONAL_FACTOR;
use crate::geometry::{Circle, segment_intersects_circle};
use crate::maze::cell::Cell;
use crate::maze::grid::{Diagonal, Direction, Grid};

/// Held movement directions for one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovementInput {
    /// Moving up (decreasing y).
    pub up: bool,
    /// Moving right.
    pub right: bool,
    /// Moving down.
    pub down: bool,
    /// Moving left.
    pub left: bool,
}

impl MovementInput {
    /// Input holding a single direction.
    pub fn towards(direction: Direction) -> Self {
        let mut input = Self::default();
        match direction {
            Direction::Top => input.up = true,
            Direction::Right => input.right = true,
            Direction::Bottom => input.down = true,
            Direction::Left => input.left = true,
        }
        input
    }

    /// Whether a vertical and a horizontal direction are both held.
    pub fn is_diagonal(&self) -> bool {
        (self.up || self.down) && (self.left || self.right)
    }
}

/// Which neighbouring walls the entity's circle currently touches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WallCollisions {
    /// Touching the wall above.
    pub top: bool,
    /// Touching the wall to the right.
    pub right: bool,
    /// Touching the wall below.
    pub bottom: bool,
    /// Touching the wall to the left.
    pub left: bool,
    /// Wedged into the top-left corner.
    pub top_left: bool,
    /// Wedged into the top-right corner.
    pub top_right: bool,
    /// Wedged into the bottom-left corner.
    pub bottom_left: bool,
    /// Wedged into the bottom-right corner.
    pub bottom_right: bool,
}

impl WallCollisions {
    /// Cardinal flag for `direction`.
    pub fn blocked(&self, direction: Direction) -> bool {
        match direction {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    /// Corner flag for `corner`.
    pub fn wedged(&self, corner: Diagonal) -> bool {
        match corner {
            Diagonal::TopLeft => self.top_left,
            Diagonal::TopRight => self.top_right,
            Diagonal::BottomLeft => self.bottom_left,
            Diagonal::BottomRight => self.bottom_right,
        }
    }

    /// Recomputes all eight flags for `circle` inside `cell`.
    ///
    /// Neighbours outside the grid never count as walls.
    pub fn detect(circle: &Circle, cell: &Cell, cells: &Grid<Cell>) -> Self {
        let around = cells.neighborhood(cell.pos());
        let is_wall = |neighbor: Option<&Cell>| neighbor.is_some_and(Cell::is_wall);
        let crosses = |direction: Direction| {
            segment_intersects_circle(cell.lines.edge(direction), circle)
        };

        let top = crosses(Direction::Top);
        let right = crosses(Direction::Right);
        let bottom = crosses(Direction::Bottom);
        let left = crosses(Direction::Left);

        Self {
            top: is_wall(around.top) && top,
            right: is_wall(around.right) && right,
            bottom: is_wall(around.bottom) && bottom,
            left: is_wall(around.left) && left,
            top_left: is_wall(around.top_left) && top && left,
            top_right: is_wall(around.top_right) && top && right,
            bottom_left: is_wall(around.bottom_left) && bottom && left,
            bottom_right: is_wall(around.bottom_right) && bottom && right,
        }
    }
}

/// Displacement for one tick given last tick's flags.
///
/// # Arguments
/// * `input` - Held directions.
/// * `collisions` - Flags computed at the end of the previous tick.
/// * `speed` - Pixels per millisecond.
/// * `delta_ms` - Elapsed time since the previous tick.
///
/// # Returns
/// `(dx, dy)` in pixels.
pub fn predict_displacement(
    input: MovementInput,
    collisions: &WallCollisions,
    speed: f32,
    delta_ms: f32,
) -> (f32, f32) {
    let step = speed * delta_ms;
    let mut dx = 0.0;
    let mut dy = 0.0;

    if input.up {
        if collisions.top {
            dy = 0.0;
        } else {
            dy -= step;
        }
    }
    if input.down {
        if collisions.bottom {
            dy = 0.0;
        } else {
            dy += step;
        }
    }
    if input.left {
        if collisions.left {
            dx = 0.0;
        } else {
            dx -= step;
        }
    }
    if input.right {
        if collisions.right {
            dx = 0.0;
        } else {
            dx += step;
        }
    }

    // Only one corner pushes back per tick.
    if collisions.top_right {
        dx -= step;
        dy += step;
    } else if collisions.top_left {
        dx += step;
        dy += step;
    } else if collisions.bottom_right {
        dx -= step;
        dy -= step;
    } else if collisions.bottom_left {
        dx += step;
        dy -= step;
    }

    if input.is_diagonal() {
        dx *= DIAGONAL_FACTOR;
        dy *= DIAGONAL_FACTOR;
    }

    (dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::blueprint::MazeBlueprint;
    use crate::maze::grid::GridPos;

    fn cells(rows: Vec<Vec<u8>>) -> Grid<Cell> {
        let kinds = MazeBlueprint::new(rows).unwrap().to_grid();
        let (r, c) = (kinds.rows(), kinds.cols());
        Grid::from_fn(r, c, |pos| Cell::new(pos, *kinds.get(pos).unwrap(), r, c))
    }

    #[test]
    fn test_blocked_axis_is_zeroed() {
        let flags = WallCollisions {
            right: true,
            ..Default::default()
        };
        let (dx, dy) = predict_displacement(MovementInput::towards(Direction::Right), &flags, 0.25, 16.0);
        assert_eq!((dx, dy), (0.0, 0.0));
        let (dx, _) = predict_displacement(MovementInput::towards(Direction::Left), &flags, 0.25, 16.0);
        assert_eq!(dx, -4.0);
    }

    #[test]
    fn test_diagonal_input_is_scaled() {
        let input = MovementInput {
            up: true,
            right: true,
            ..Default::default()
        };
        let (dx, dy) = predict_displacement(input, &WallCollisions::default(), 0.25, 16.0);
        assert_eq!((dx, dy), (3.0, -3.0));
    }

    #[test]
    fn test_corner_push_back_uses_first_flag_only() {
        let flags = WallCollisions {
            top_right: true,
            bottom_left: true,
            ..Default::default()
        };
        let (dx, dy) = predict_displacement(MovementInput::default(), &flags, 0.25, 16.0);
        assert_eq!((dx, dy), (-4.0, 4.0));

        let flags = WallCollisions {
            bottom_left: true,
            ..Default::default()
        };
        let (dx, dy) = predict_displacement(MovementInput::default(), &flags, 0.25, 16.0);
        assert_eq!((dx, dy), (4.0, -4.0));
    }

    #[test]
    fn test_detect_cardinal_and_corner() {
        let grid = cells(vec![vec![0, 0, 0], vec![0, 1, 0], vec![0, 0, 0]]);
        let cell = grid.get(GridPos::new(1, 1)).unwrap();

        let centred = Circle::new(75.0, 75.0, 18.0);
        assert_eq!(WallCollisions::detect(&centred, cell, &grid), WallCollisions::default());

        let near_right = Circle::new(90.0, 75.0, 18.0);
        let flags = WallCollisions::detect(&near_right, cell, &grid);
        assert!(flags.right && !flags.left && !flags.top && !flags.bottom);
        assert!(!flags.top_right);

        let in_corner = Circle::new(90.0, 60.0, 18.0);
        let flags = WallCollisions::detect(&in_corner, cell, &grid);
        assert!(flags.top && flags.right && flags.top_right);
        assert!(!flags.bottom_left);
    }

    #[test]
    fn test_open_neighbors_never_flag() {
        let grid = cells(vec![vec![1, 1, 1], vec![1, 1, 1], vec![1, 1, 1]]);
        let cell = grid.get(GridPos::new(1, 1)).unwrap();
        let hugging = Circle::new(55.0, 55.0, 18.0);
        assert_eq!(WallCollisions::detect(&hugging, cell, &grid), WallCollisions::default());
    }

    /// A door on the border has no neighbour beyond it, which reads as open.
    #[test]
    fn test_missing_neighbor_is_not_a_wall() {
        let grid = cells(vec![vec![0, 0, 0], vec![4, 1, 0], vec![0, 0, 0]]);
        let door = grid.get(GridPos::new(1, 0)).unwrap();
        let leaving = Circle::new(5.0, 75.0, 18.0);
        assert!(!WallCollisions::detect(&leaving, door, &grid).left);
    }
}
