//! World grid generation using randomized depth-first backtracking.
//!
//! Every tile of the world grid starts with all four walls. The generator
//! carves a spanning tree over the tiles one wall removal at a time so the
//! world map screen can animate the process, or callers can run it to
//! completion with [`WorldGenerator::generate`].
//!
//! The wall state of a finished grid is persisted as one string per tile made
//! of the letters `t`, `r`, `b`, `l` for each wall still standing.

use crate::error::{MazeError, Result};
use crate::maze::grid::{Direction, Grid, GridPos};
use rand::prelude::*;
use std::fmt;

/// Which edges of a tile are impassable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walls {
    /// Wall on the top edge.
    pub top: bool,
    /// Wall on the right edge.
    pub right: bool,
    /// Wall on the bottom edge.
    pub bottom: bool,
    /// Wall on the left edge.
    pub left: bool,
}

impl Walls {
    /// All four walls standing.
    pub fn all() -> Self {
        Self {
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }

    /// No walls at all.
    pub fn none() -> Self {
        Self {
            top: false,
            right: false,
            bottom: false,
            left: false,
        }
    }

    /// Whether the wall in `direction` stands.
    pub fn get(&self, direction: Direction) -> bool {
        match direction {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    /// Raises or removes the wall in `direction`.
    pub fn set(&mut self, direction: Direction, present: bool) {
        match direction {
            Direction::Top => self.top = present,
            Direction::Right => self.right = present,
            Direction::Bottom => self.bottom = present,
            Direction::Left => self.left = present,
        }
    }

    /// Directions without a wall, in direction order.
    pub fn openings(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&d| !self.get(d))
            .collect()
    }
}

/// A tile of the world grid. Each tile hosts one maze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapTile {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
    /// Row-major index; pairs the tile with its maze.
    pub index: usize,
    /// Wall state.
    pub walls: Walls,
    /// Set once the generator has reached the tile.
    pub visited: bool,
}

impl MapTile {
    /// Creates an unvisited tile with all walls standing.
    pub fn new(row: usize, col: usize, index: usize) -> Self {
        Self {
            row,
            col,
            index,
            walls: Walls::all(),
            visited: false,
        }
    }

    /// Grid position of the tile.
    pub fn pos(&self) -> GridPos {
        GridPos::new(self.row, self.col)
    }
}

/// Step-wise generator for a world grid.
pub struct WorldGenerator<R: Rng> {
    grid: Grid<MapTile>,
    stack: Vec<GridPos>,
    rng: R,
    removed_walls: usize,
    started: bool,
    generation_complete: bool,
}

impl<R: Rng> WorldGenerator<R> {
    /// Creates a generator for a `rows x cols` world.
    pub fn new(rows: usize, cols: usize, rng: R) -> Self {
        let grid = Grid::from_fn(rows, cols, |pos| {
            MapTile::new(pos.row, pos.col, pos.row * cols + pos.col)
        });
        let generation_complete = grid.is_empty();
        Self {
            grid,
            stack: Vec::new(),
            rng,
            removed_walls: 0,
            started: false,
            generation_complete,
        }
    }

    /// Performs one step of generation.
    ///
    /// The first call picks the random start tile. Every later call either
    /// removes the wall between the tile on top of the stack and a random
    /// unvisited neighbour, or backtracks.
    ///
    /// # Returns
    /// `true` if a wall pair was removed in this step.
    pub fn step(&mut self) -> bool {
        if self.generation_complete {
            return false;
        }

        if !self.started {
            self.started = true;
            let start = GridPos::new(
                self.rng.gen_range(0..self.grid.rows()),
                self.rng.gen_range(0..self.grid.cols()),
            );
            if let Some(tile) = self.grid.get_mut(start) {
                tile.visited = true;
            }
            self.stack.push(start);
            return false;
        }

        let Some(&current) = self.stack.last() else {
            self.generation_complete = true;
            return false;
        };

        let unvisited: Vec<(Direction, GridPos)> = self
            .grid
            .neighbors4(current)
            .into_iter()
            .filter(|&(_, pos)| self.grid.get(pos).is_some_and(|t| !t.visited))
            .collect();

        match unvisited.choose(&mut self.rng) {
            Some(&(direction, next)) => {
                self.remove_walls(current, next, direction);
                if let Some(tile) = self.grid.get_mut(next) {
                    tile.visited = true;
                }
                self.stack.push(next);
                self.removed_walls += 1;
                true
            }
            None => {
                self.stack.pop();
                if self.stack.is_empty() {
                    self.generation_complete = true;
                }
                false
            }
        }
    }

    fn remove_walls(&mut self, from: GridPos, to: GridPos, direction: Direction) {
        if let Some(tile) = self.grid.get_mut(from) {
            tile.walls.set(direction, false);
        }
        if let Some(tile) = self.grid.get_mut(to) {
            tile.walls.set(direction.opposite(), false);
        }
    }

    /// Checks if generation is complete.
    pub fn is_complete(&self) -> bool {
        self.generation_complete
    }

    /// Returns `(walls removed, walls a spanning tree removes)`.
    pub fn get_progress(&self) -> (usize, usize) {
        (self.removed_walls, self.grid.len().saturating_sub(1))
    }

    /// Returns the generation progress as a ratio (0.0 to 1.0).
    pub fn get_progress_ratio(&self) -> f32 {
        let (done, total) = self.get_progress();
        if total == 0 {
            1.0
        } else {
            done as f32 / total as f32
        }
    }

    /// The grid in its current, possibly partial, state.
    pub fn grid(&self) -> &Grid<MapTile> {
        &self.grid
    }

    /// Runs the remaining steps and returns the finished grid.
    pub fn generate(mut self) -> Grid<MapTile> {
        while !self.is_complete() {
            self.step();
        }
        self.grid
    }
}

/// Serializes every tile's walls as a string over `t`, `r`, `b`, `l`.
pub fn serialize_walls(grid: &Grid<MapTile>) -> Vec<Vec<String>> {
    (0..grid.rows())
        .map(|row| {
            grid.row(row)
                .iter()
                .map(|tile| {
                    Direction::ALL
                        .iter()
                        .filter(|&&d| tile.walls.get(d))
                        .map(|d| d.letter())
                        .collect()
                })
                .collect()
        })
        .collect()
}

/// Rebuilds a tile grid from serialized wall strings.
///
/// Tiles come back marked as visited, since only finished grids are stored.
///
/// # Errors
/// Returns [`MazeError::InvalidWallString`] for an empty grid, rows of unequal
/// length, letters outside `trbl`, or a letter that appears twice.
pub fn deserialize(wall_data: &[Vec<String>]) -> Result<Grid<MapTile>> {
    let rows = wall_data.len();
    let cols = wall_data.first().map_or(0, Vec::len);
    if cols == 0 {
        return Err(MazeError::InvalidWallString {
            value: format!("{rows} rows of 0 tiles"),
            row: 0,
            col: 0,
        });
    }

    for (row, line) in wall_data.iter().enumerate() {
        if line.len() != cols {
            return Err(MazeError::InvalidWallString {
                value: format!("row of {} tiles, expected {cols}", line.len()),
                row,
                col: line.len(),
            });
        }
        for (col, value) in line.iter().enumerate() {
            let mut seen = Vec::with_capacity(4);
            for letter in value.chars() {
                let known = Direction::ALL.iter().any(|d| d.letter() == letter);
                if !known || seen.contains(&letter) {
                    return Err(MazeError::InvalidWallString {
                        value: value.clone(),
                        row,
                        col,
                    });
                }
                seen.push(letter);
            }
        }
    }

    Ok(Grid::from_fn(rows, cols, |pos| {
        let value = &wall_data[pos.row][pos.col];
        let mut walls = Walls::none();
        for direction in Direction::ALL {
            walls.set(direction, value.contains(direction.letter()));
        }
        MapTile {
            row: pos.row,
            col: pos.col,
            index: pos.row * cols + pos.col,
            walls,
            visited: true,
        }
    }))
}

/// ASCII rendering of a tile grid, one text row per tile row plus its floor.
pub struct WorldSketch<'a>(pub &'a Grid<MapTile>);

impl fmt::Display for WorldSketch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.0;
        writeln!(f, " {}", "_".repeat((grid.cols() * 2).saturating_sub(1)))?;
        for row in 0..grid.rows() {
            let mut line = String::from("|");
            for tile in grid.row(row) {
                line.push(if tile.walls.bottom { '_' } else { ' ' });
                line.push(if tile.walls.right { '|' } else { ' ' });
            }
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    /// Edges of the tile graph, one per removed wall pair.
    fn open_edges(grid: &Grid<MapTile>) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for (pos, tile) in grid.iter() {
            for direction in [Direction::Right, Direction::Bottom] {
                if let Some(other) = grid.neighbor(pos, direction) {
                    if !tile.walls.get(direction) {
                        assert!(!other.walls.get(direction.opposite()));
                        edges.push((tile.index, other.index));
                    }
                }
            }
        }
        edges
    }

    fn is_connected(count: usize, edges: &[(usize, usize)]) -> bool {
        let mut seen = HashSet::from([0]);
        let mut stack = vec![0];
        while let Some(node) = stack.pop() {
            for &(a, b) in edges {
                let other = if a == node {
                    b
                } else if b == node {
                    a
                } else {
                    continue;
                };
                if seen.insert(other) {
                    stack.push(other);
                }
            }
        }
        seen.len() == count
    }

    #[test]
    fn test_step_progress() {
        let mut generator = WorldGenerator::new(3, 4, StdRng::seed_from_u64(11));
        assert_eq!(generator.get_progress(), (0, 11));
        assert!(!generator.step());
        let mut removed = 0;
        while !generator.is_complete() {
            if generator.step() {
                removed += 1;
            }
        }
        assert_eq!(removed, 11);
        assert_eq!(generator.get_progress_ratio(), 1.0);
        assert!(generator.grid().iter().all(|(_, t)| t.visited));
        assert!(!generator.step());
    }

    #[test]
    fn test_outer_walls_stay() {
        let grid = WorldGenerator::new(4, 4, StdRng::seed_from_u64(3)).generate();
        for (pos, tile) in grid.iter() {
            if pos.row == 0 {
                assert!(tile.walls.top);
            }
            if pos.col == 0 {
                assert!(tile.walls.left);
            }
            if pos.row == 3 {
                assert!(tile.walls.bottom);
            }
            if pos.col == 3 {
                assert!(tile.walls.right);
            }
        }
    }

    #[test]
    fn test_single_tile_world() {
        let grid = WorldGenerator::new(1, 1, StdRng::seed_from_u64(0)).generate();
        assert_eq!(serialize_walls(&grid), vec![vec!["trbl".to_string()]]);
    }

    #[test]
    fn test_serialize_letter_order() {
        let mut grid = Grid::from_fn(1, 2, |p| MapTile::new(p.row, p.col, p.col));
        let first = grid.get_mut(GridPos::new(0, 0)).unwrap();
        first.walls.right = false;
        first.walls.bottom = false;
        let second = grid.get_mut(GridPos::new(0, 1)).unwrap();
        second.walls.left = false;
        assert_eq!(
            serialize_walls(&grid),
            vec![vec!["tl".to_string(), "trb".to_string()]]
        );
    }

    #[test]
    fn test_deserialize_rejects_bad_strings() {
        let bad_letter = vec![vec!["tx".to_string()]];
        assert!(deserialize(&bad_letter).is_err());
        let repeated = vec![vec!["tt".to_string()]];
        assert!(deserialize(&repeated).is_err());
        let ragged = vec![vec!["t".to_string(), "r".to_string()], vec!["b".to_string()]];
        assert!(deserialize(&ragged).is_err());
        let zero_width: Vec<Vec<String>> = vec![vec![]];
        assert!(matches!(
            deserialize(&zero_width),
            Err(MazeError::InvalidWallString { .. })
        ));
        assert!(deserialize(&[]).is_err());
        let empty_walls = vec![vec![String::new()]];
        let grid = deserialize(&empty_walls).unwrap();
        assert_eq!(grid.get(GridPos::new(0, 0)).unwrap().walls, Walls::none());
    }

    #[test]
    fn test_sketch_shape() {
        let grid = WorldGenerator::new(2, 3, StdRng::seed_from_u64(8)).generate();
        let text = WorldSketch(&grid).to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().skip(1).all(|l| l.len() == 7));
    }

    proptest! {
        #[test]
        fn prop_walls_round_trip(rows in 1usize..9, cols in 1usize..9, seed in any::<u64>()) {
            let grid = WorldGenerator::new(rows, cols, StdRng::seed_from_u64(seed)).generate();
            let restored = deserialize(&serialize_walls(&grid)).unwrap();
            prop_assert_eq!(restored.rows(), rows);
            prop_assert_eq!(restored.cols(), cols);
            for ((_, a), (_, b)) in grid.iter().zip(restored.iter()) {
                prop_assert_eq!(a.walls, b.walls);
                prop_assert_eq!(a.index, b.index);
            }
        }

        #[test]
        fn prop_world_is_a_spanning_tree(rows in 1usize..9, cols in 1usize..9, seed in any::<u64>()) {
            let grid = WorldGenerator::new(rows, cols, StdRng::seed_from_u64(seed)).generate();
            let edges = open_edges(&grid);
            prop_assert_eq!(edges.len(), rows * cols - 1);
            prop_assert!(is_connected(rows * cols, &edges));
        }
    }
}
