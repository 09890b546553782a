//! The overworld: tile grid generation, persisted records and progression.
//!
//! - [`generator`]: step-wise world grid carving and wall-string (de)serialization
//! - [`records`]: `World`, `Maze`, `Corridor` and the per-world `WorldMap`
//! - [`progression`]: building a world's mazes and corridors, win bookkeeping

pub mod generator;
pub mod progression;
pub mod records;

pub use generator::{MapTile, WorldGenerator};
pub use records::{Corridor, CorridorStatus, Maze, MazeStatus, World, WorldMap};
