//! Runtime cells materialised from a blueprint when a level starts.

use crate::config::{CELL_SIZE, COIN_RADIUS, POWER_UP_RADIUS};
use crate::geometry::{Line, Point};
use crate::maze::blueprint::CellType;
use crate::maze::grid::{Direction, GridPos};

/// The four edges of a cell's bounding square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLines {
    /// Top edge, left to right.
    pub top: Line,
    /// Right edge, top to bottom.
    pub right: Line,
    /// Bottom edge, left to right.
    pub bottom: Line,
    /// Left edge, top to bottom.
    pub left: Line,
}

impl CellLines {
    fn new(x: f32, y: f32) -> Self {
        Self {
            top: Line::new(x, y, x + CELL_SIZE, y),
            right: Line::new(x + CELL_SIZE, y, x + CELL_SIZE, y + CELL_SIZE),
            bottom: Line::new(x, y + CELL_SIZE, x + CELL_SIZE, y + CELL_SIZE),
            left: Line::new(x, y, x, y + CELL_SIZE),
        }
    }

    /// Edge facing `direction`.
    pub fn edge(&self, direction: Direction) -> &Line {
        match direction {
            Direction::Top => &self.top,
            Direction::Right => &self.right,
            Direction::Bottom => &self.bottom,
            Direction::Left => &self.left,
        }
    }
}

/// Collectible kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Counts towards opening the doors.
    Coin,
    /// Collected but has no gameplay effect yet.
    PowerUp,
}

/// A collectible resting at a cell centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    /// What was placed.
    pub kind: ItemKind,
    /// Centre of the item.
    pub position: Point,
    /// Pickup radius.
    pub radius: f32,
}

/// Open/closed state and facing of a door cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorState {
    /// Whether the door can be walked through.
    pub is_open: bool,
    /// Border side the door sits on, if it is on the border.
    pub direction: Option<Direction>,
}

/// A single maze cell during play.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Current type. A closed door reads as [`CellType::Wall`].
    pub kind: CellType,
    /// Bounding square edges; fixed for the lifetime of the cell.
    pub lines: CellLines,
    /// Item still waiting to be collected.
    pub item: Option<Item>,
    /// Present only on door cells.
    pub door: Option<DoorState>,
}

impl Cell {
    /// Builds a cell of `kind` at `pos` inside a `rows x cols` maze.
    ///
    /// Ground cells receive a coin and power-up cells a power-up. Door cells
    /// start open and take their facing from the border they sit on.
    pub fn new(pos: GridPos, kind: CellType, rows: usize, cols: usize) -> Self {
        let x = pos.col as f32 * CELL_SIZE;
        let y = pos.row as f32 * CELL_SIZE;
        let center = Point::new(x + CELL_SIZE / 2.0, y + CELL_SIZE / 2.0);

        let item = match kind {
            CellType::Ground => Some(Item {
                kind: ItemKind::Coin,
                position: center,
                radius: COIN_RADIUS,
            }),
            CellType::PowerUp => Some(Item {
                kind: ItemKind::PowerUp,
                position: center,
                radius: POWER_UP_RADIUS,
            }),
            _ => None,
        };

        let door = (kind == CellType::Door).then(|| DoorState {
            is_open: true,
            direction: border_side(pos, rows, cols),
        });

        Self {
            row: pos.row,
            col: pos.col,
            x,
            y,
            kind,
            lines: CellLines::new(x, y),
            item,
            door,
        }
    }

    /// Grid position of the cell.
    pub fn pos(&self) -> GridPos {
        GridPos::new(self.row, self.col)
    }

    /// Centre of the cell in pixels.
    pub fn center(&self) -> Point {
        Point::new(self.x + CELL_SIZE / 2.0, self.y + CELL_SIZE / 2.0)
    }

    /// Whether the cell blocks the player.
    pub fn is_wall(&self) -> bool {
        self.kind == CellType::Wall
    }

    /// Whether an enemy may step onto the cell. Enemies never use doors.
    pub fn is_enemy_walkable(&self) -> bool {
        !matches!(self.kind, CellType::Wall | CellType::Door)
    }

    /// Removes and returns the cell's item. Once plucked the cell stays empty.
    pub fn pluck_item(&mut self) -> Option<Item> {
        self.item.take()
    }

    /// Opens or closes a door cell, mirroring the state into [`Cell::kind`].
    ///
    /// # Returns
    /// `true` when the state changed; always `false` for non-door cells.
    pub fn set_door_open(&mut self, open: bool) -> bool {
        let Some(door) = self.door.as_mut() else {
            return false;
        };
        if door.is_open == open {
            return false;
        }
        door.is_open = open;
        self.kind = if open { CellType::Door } else { CellType::Wall };
        true
    }
}

/// Border side of `pos` in a `rows x cols` grid. Later checks win at corners.
fn border_side(pos: GridPos, rows: usize, cols: usize) -> Option<Direction> {
    let mut side = None;
    if pos.row == 0 {
        side = Some(Direction::Top);
    }
    if pos.col == 0 {
        side = Some(Direction::Left);
    }
    if pos.row + 1 == rows {
        side = Some(Direction::Bottom);
    }
    if pos.col + 1 == cols {
        side = Some(Direction::Right);
    }
    side
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_and_lines() {
        let cell = Cell::new(GridPos::new(2, 3), CellType::Wall, 5, 5);
        assert_eq!((cell.x, cell.y), (150.0, 100.0));
        assert_eq!(cell.center(), Point::new(175.0, 125.0));
        assert_eq!(cell.lines.top, Line::new(150.0, 100.0, 200.0, 100.0));
        assert_eq!(cell.lines.right, Line::new(200.0, 100.0, 200.0, 150.0));
        assert_eq!(cell.lines.bottom, Line::new(150.0, 150.0, 200.0, 150.0));
        assert_eq!(cell.lines.left, Line::new(150.0, 100.0, 150.0, 150.0));
    }

    #[test]
    fn test_items_follow_type() {
        let ground = Cell::new(GridPos::new(1, 1), CellType::Ground, 3, 3);
        assert_eq!(ground.item.map(|i| i.kind), Some(ItemKind::Coin));
        let power = Cell::new(GridPos::new(1, 1), CellType::PowerUp, 3, 3);
        assert_eq!(power.item.map(|i| i.kind), Some(ItemKind::PowerUp));
        assert!(Cell::new(GridPos::new(1, 1), CellType::Enemy, 3, 3).item.is_none());
        assert!(Cell::new(GridPos::new(0, 0), CellType::Wall, 3, 3).item.is_none());
    }

    #[test]
    fn test_pluck_is_permanent() {
        let mut cell = Cell::new(GridPos::new(1, 1), CellType::Ground, 3, 3);
        assert!(cell.pluck_item().is_some());
        assert!(cell.pluck_item().is_none());
        assert!(cell.item.is_none());
    }

    #[test]
    fn test_door_direction_and_toggle() {
        let rows = 5;
        let cols = 6;
        let facing = |row, col| {
            Cell::new(GridPos::new(row, col), CellType::Door, rows, cols)
                .door
                .and_then(|d| d.direction)
        };
        assert_eq!(facing(0, 2), Some(Direction::Top));
        assert_eq!(facing(2, 0), Some(Direction::Left));
        assert_eq!(facing(4, 2), Some(Direction::Bottom));
        assert_eq!(facing(2, 5), Some(Direction::Right));

        let mut door = Cell::new(GridPos::new(0, 2), CellType::Door, rows, cols);
        assert!(door.door.is_some_and(|d| d.is_open));
        assert!(door.set_door_open(false));
        assert_eq!(door.kind, CellType::Wall);
        assert!(door.is_wall());
        assert!(!door.set_door_open(false));
        assert!(door.set_door_open(true));
        assert_eq!(door.kind, CellType::Door);

        let mut wall = Cell::new(GridPos::new(0, 1), CellType::Wall, rows, cols);
        assert!(!wall.set_door_open(true));
        assert_eq!(wall.kind, CellType::Wall);
    }

    #[test]
    fn test_enemy_walkability() {
        let kinds = [
            (CellType::Wall, false),
            (CellType::Door, false),
            (CellType::Ground, true),
            (CellType::Enemy, true),
            (CellType::PowerUp, true),
        ];
        for (kind, walkable) in kinds {
            assert_eq!(
                Cell::new(GridPos::new(1, 1), kind, 3, 3).is_enemy_walkable(),
                walkable
            );
        }
    }
}
