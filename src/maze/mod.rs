//! Maze generation and the cell model.
//!
//! - [`grid`]: spatial index shared by the carver, the world grid and levels
//! - [`blueprint`]: the persisted integer matrix and its cell types
//! - [`carver`]: randomized depth-first carving, doors and enemy spawns
//! - [`cell`]: runtime cells with edge lines, items and door state

pub mod blueprint;
pub mod carver;
pub mod cell;
pub mod grid;

pub use blueprint::{CellType, MazeBlueprint};
pub use carver::carve;
pub use grid::{Diagonal, Direction, Grid, GridPos};
