//! Error types shared across the crate.
//!
//! Generation code never fails; everything that touches the save directory,
//! parses stored data or talks to the windowing/GPU stack returns [`Result`].

use thiserror::Error;

/// All recoverable and fatal failures surfaced by mazeworld.
#[derive(Error, Debug)]
pub enum MazeError {
    /// Reading or writing the save directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No world record exists for the requested id.
    #[error("World {id} not found in saved data")]
    WorldNotFound { id: String },

    /// A world exists but its map data has never been generated or was lost.
    #[error("Map data for world {world_id} not found")]
    MapNotFound { world_id: String },

    /// The world's map data has no maze with the requested id.
    #[error("Maze {maze_id} not found in world {world_id}")]
    MazeNotFound { world_id: String, maze_id: String },

    /// A blueprint matrix is ragged, empty or holds an unknown cell code.
    #[error("Invalid maze blueprint: {reason}")]
    InvalidBlueprint { reason: String },

    /// A serialized tile wall string holds something other than `t`, `r`, `b`, `l`.
    #[error("Invalid wall string {value:?} at row {row}, col {col}")]
    InvalidWallString {
        value: String,
        row: usize,
        col: usize,
    },

    /// The winit event loop could not be created or crashed.
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Surface, adapter or device setup failed.
    #[error("Renderer error: {0}")]
    Renderer(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MazeError>;
