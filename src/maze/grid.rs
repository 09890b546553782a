//! Row-major 2D grid with constant-time neighbour lookup.
//!
//! Both the carver and the runtime level use this as their spatial index.
//! Edge-of-grid lookups are not errors: they return `None` and callers treat a
//! missing neighbour as "no wall, not carvable".

use serde::{Deserialize, Serialize};

/// Position of a cell or tile in a grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl GridPos {
    /// Creates a new position.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Position one step away in `direction`, or `None` when it would be negative.
    pub fn step(&self, direction: Direction) -> Option<Self> {
        let (dr, dc) = direction.offset();
        self.offset(dr, dc)
    }

    /// Position displaced by a signed offset, or `None` when it would be negative.
    pub fn offset(&self, dr: isize, dc: isize) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Self { row, col })
    }
}

/// The four cardinal directions, in the fixed order top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Up, decreasing row.
    Top,
    /// Right, increasing column.
    Right,
    /// Down, increasing row.
    Bottom,
    /// Left, decreasing column.
    Left,
}

impl Direction {
    /// All directions in enumeration order.
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    /// The direction pointing the other way.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// `(row, col)` offset of one step in this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Top => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Bottom => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// First letter of the direction name, used in serialized wall strings.
    pub fn letter(self) -> char {
        match self {
            Direction::Top => 't',
            Direction::Right => 'r',
            Direction::Bottom => 'b',
            Direction::Left => 'l',
        }
    }
}

/// The four diagonal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagonal {
    /// Up and left.
    TopLeft,
    /// Up and right.
    TopRight,
    /// Down and left.
    BottomLeft,
    /// Down and right.
    BottomRight,
}

impl Diagonal {
    /// All diagonals.
    pub const ALL: [Diagonal; 4] = [
        Diagonal::TopLeft,
        Diagonal::TopRight,
        Diagonal::BottomLeft,
        Diagonal::BottomRight,
    ];

    /// `(row, col)` offset of one diagonal step.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Diagonal::TopLeft => (-1, -1),
            Diagonal::TopRight => (-1, 1),
            Diagonal::BottomLeft => (1, -1),
            Diagonal::BottomRight => (1, 1),
        }
    }

    /// The two cardinal directions whose edges meet at this corner.
    pub fn sides(self) -> (Direction, Direction) {
        match self {
            Diagonal::TopLeft => (Direction::Top, Direction::Left),
            Diagonal::TopRight => (Direction::Top, Direction::Right),
            Diagonal::BottomLeft => (Direction::Bottom, Direction::Left),
            Diagonal::BottomRight => (Direction::Bottom, Direction::Right),
        }
    }
}

/// The 8-connected neighbourhood of a cell. Missing neighbours are `None`.
#[derive(Debug, Clone, Copy)]
pub struct Neighborhood<'a, T> {
    /// Neighbour above.
    pub top: Option<&'a T>,
    /// Neighbour to the right.
    pub right: Option<&'a T>,
    /// Neighbour below.
    pub bottom: Option<&'a T>,
    /// Neighbour to the left.
    pub left: Option<&'a T>,
    /// Neighbour above-left.
    pub top_left: Option<&'a T>,
    /// Neighbour above-right.
    pub top_right: Option<&'a T>,
    /// Neighbour below-left.
    pub bottom_left: Option<&'a T>,
    /// Neighbour below-right.
    pub bottom_right: Option<&'a T>,
}

impl<'a, T> Neighborhood<'a, T> {
    /// Cardinal neighbour in `direction`.
    pub fn cardinal(&self, direction: Direction) -> Option<&'a T> {
        match direction {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    /// Diagonal neighbour at `corner`.
    pub fn diagonal(&self, corner: Diagonal) -> Option<&'a T> {
        match corner {
            Diagonal::TopLeft => self.top_left,
            Diagonal::TopRight => self.top_right,
            Diagonal::BottomLeft => self.bottom_left,
            Diagonal::BottomRight => self.bottom_right,
        }
    }
}

/// A rectangular grid stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Creates a `rows x cols` grid filled with `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows * cols],
        }
    }
}

impl<T> Grid<T> {
    /// Builds a grid by calling `init` for every position in row-major order.
    pub fn from_fn(rows: usize, cols: usize, mut init: impl FnMut(GridPos) -> T) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(init(GridPos::new(row, col)));
            }
        }
        Self { rows, cols, cells }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `pos` lies inside the grid.
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Row-major index of `pos`.
    pub fn index_of(&self, pos: GridPos) -> usize {
        pos.row * self.cols + pos.col
    }

    /// Position of a row-major index.
    pub fn pos_of(&self, index: usize) -> GridPos {
        GridPos::new(index / self.cols, index % self.cols)
    }

    /// Cell at `pos`, or `None` outside the grid.
    pub fn get(&self, pos: GridPos) -> Option<&T> {
        if self.contains(pos) {
            self.cells.get(self.index_of(pos))
        } else {
            None
        }
    }

    /// Mutable cell at `pos`, or `None` outside the grid.
    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut T> {
        if self.contains(pos) {
            let index = self.index_of(pos);
            self.cells.get_mut(index)
        } else {
            None
        }
    }

    /// Cell at a signed offset from `pos`.
    pub fn get_offset(&self, pos: GridPos, dr: isize, dc: isize) -> Option<&T> {
        pos.offset(dr, dc).and_then(|p| self.get(p))
    }

    /// Cardinal neighbour of `pos`.
    pub fn neighbor(&self, pos: GridPos, direction: Direction) -> Option<&T> {
        pos.step(direction).and_then(|p| self.get(p))
    }

    /// Cardinal neighbours in top, right, bottom, left order, skipping missing ones.
    pub fn neighbors4(&self, pos: GridPos) -> Vec<(Direction, GridPos)> {
        Direction::ALL
            .iter()
            .filter_map(|&d| pos.step(d).filter(|p| self.contains(*p)).map(|p| (d, p)))
            .collect()
    }

    /// Full 8-connected neighbourhood of `pos`.
    pub fn neighborhood(&self, pos: GridPos) -> Neighborhood<'_, T> {
        Neighborhood {
            top: self.get_offset(pos, -1, 0),
            right: self.get_offset(pos, 0, 1),
            bottom: self.get_offset(pos, 1, 0),
            left: self.get_offset(pos, 0, -1),
            top_left: self.get_offset(pos, -1, -1),
            top_right: self.get_offset(pos, -1, 1),
            bottom_left: self.get_offset(pos, 1, -1),
            bottom_right: self.get_offset(pos, 1, 1),
        }
    }

    /// Iterates over `(position, cell)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &T)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (GridPos::new(i / cols, i % cols), cell))
    }

    /// Mutable iteration over cells in row-major order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut()
    }

    /// Cells of one row.
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }
}
