//! World creation and progression bookkeeping.
//!
//! A world is built from a finished tile grid: every tile gets a maze whose
//! doors face the tile's open sides, and the doors that face a neighbouring
//! tile become corridors. Winning a maze reveals the corridors and mazes
//! around it, and completing every maze of a world unlocks a larger one.

use crate::config::{INITIAL_WORLD_SIZE, MAX_DOOR_ATTEMPTS, MAZE_SIZE_RANGE};
use crate::error::{MazeError, Result};
use crate::maze::blueprint::MazeBlueprint;
use crate::maze::carver::carve;
use crate::maze::grid::{Direction, Grid};
use crate::storage::SaveData;
use crate::world::generator::{MapTile, serialize_walls};
use crate::world::records::{
    Corridor, CorridorStatus, Maze, MazeStatus, World, WorldMap,
};
use log::{debug, info, warn};
use rand::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Builder;

const NAME_ADJECTIVES: [&str; 16] = [
    "Amber", "Silent", "Crooked", "Hollow", "Gilded", "Sunken", "Misty", "Iron",
    "Verdant", "Ashen", "Frozen", "Restless", "Copper", "Velvet", "Broken", "Lunar",
];

const NAME_NOUNS: [&str; 16] = [
    "Hollow", "Reach", "Labyrinth", "Warren", "Vale", "Keep", "Thicket", "Crossing",
    "Maze", "Grove", "Depths", "Spire", "Marsh", "Cloister", "Expanse", "Gate",
];

/// Fresh record id drawn from `rng`, formatted as a v4 UUID.
pub fn new_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    Builder::from_random_bytes(rng.r#gen()).into_uuid().to_string()
}

/// Random two-word world name such as "Amber Reach".
pub fn create_world_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = NAME_ADJECTIVES.choose(rng).copied().unwrap_or("Nameless");
    let mut noun = NAME_NOUNS.choose(rng).copied().unwrap_or("Maze");
    if noun == adjective {
        noun = "Maze";
    }
    format!("{adjective} {noun}")
}

/// The first world of a new game.
pub fn initial_world<R: Rng + ?Sized>(rng: &mut R) -> World {
    World {
        id: new_id(rng),
        index: 0,
        name: create_world_name(rng),
        size: INITIAL_WORLD_SIZE,
    }
}

/// The world that follows the highest-index world in `worlds`.
///
/// Returns the initial world when `worlds` is empty.
pub fn next_world<R: Rng + ?Sized>(worlds: &BTreeMap<String, World>, rng: &mut R) -> World {
    match worlds.values().max_by_key(|w| w.index) {
        Some(latest) => World {
            id: new_id(rng),
            index: latest.index + 1,
            name: create_world_name(rng),
            size: [latest.size[0] + 1, latest.size[1] + 1],
        },
        None => initial_world(rng),
    }
}

/// Carves a randomly sized maze with doors on `doors`.
///
/// Carving is retried when a requested door could not be placed; after
/// [`MAX_DOOR_ATTEMPTS`] the attempt with the most doors is kept.
pub fn carve_tile_maze<R: Rng + ?Sized>(doors: &[Direction], rng: &mut R) -> MazeBlueprint {
    let mut best: Option<(usize, MazeBlueprint)> = None;

    for attempt in 1..=MAX_DOOR_ATTEMPTS {
        let rows = rng.gen_range(MAZE_SIZE_RANGE);
        let cols = rng.gen_range(MAZE_SIZE_RANGE);
        let blueprint = carve(rows, cols, doors, rng);
        let placed = blueprint.door_sides().len();

        if placed == doors.len() {
            return blueprint;
        }
        debug!(
            "attempt {attempt}: {rows}x{cols} maze placed {placed} of {} doors",
            doors.len()
        );
        if best.as_ref().is_none_or(|(most, _)| placed > *most) {
            best = Some((placed, blueprint));
        }
    }

    warn!("keeping a maze with missing doors after {MAX_DOOR_ATTEMPTS} attempts");
    match best {
        Some((_, blueprint)) => blueprint,
        None => carve(
            *MAZE_SIZE_RANGE.start(),
            *MAZE_SIZE_RANGE.start(),
            doors,
            rng,
        ),
    }
}

/// Builds the stored map data for a finished tile grid.
///
/// The maze on tile 0 starts discovered so the player has an entry point;
/// every other maze starts undiscovered.
pub fn build_world_map<R: Rng + ?Sized>(grid: &Grid<MapTile>, rng: &mut R) -> WorldMap {
    let mut mazes = BTreeMap::new();

    for (_, tile) in grid.iter() {
        let doors = tile.walls.openings();
        let cells = carve_tile_maze(&doors, rng);
        let id = new_id(rng);
        let status = if tile.index == 0 {
            MazeStatus::Discovered
        } else {
            MazeStatus::Undiscovered
        };
        mazes.insert(
            id.clone(),
            Maze {
                id,
                index: tile.index,
                cells,
                status,
            },
        );
    }

    let corridors = derive_corridors(grid, &mazes, rng);
    info!(
        "built world map with {} mazes and {} corridors",
        mazes.len(),
        corridors.len()
    );

    WorldMap {
        grid_walls: serialize_walls(grid),
        mazes,
        corridors,
    }
}

/// Corridors for every maze door that faces an existing neighbour tile.
///
/// Pairs are sorted ascending and deduplicated; all corridors start undiscovered.
pub fn derive_corridors<R: Rng + ?Sized>(
    grid: &Grid<MapTile>,
    mazes: &BTreeMap<String, Maze>,
    rng: &mut R,
) -> Vec<Corridor> {
    let mut pairs = BTreeSet::new();

    for maze in mazes.values() {
        if maze.index >= grid.len() {
            continue;
        }
        let pos = grid.pos_of(maze.index);
        for side in maze.cells.door_sides() {
            if let Some(neighbor) = grid.neighbor(pos, side) {
                pairs.insert([maze.index.min(neighbor.index), maze.index.max(neighbor.index)]);
            }
        }
    }

    pairs
        .into_iter()
        .map(|tile_indices| Corridor {
            id: new_id(rng),
            status: CorridorStatus::Undiscovered,
            tile_indices,
        })
        .collect()
}

/// What a win changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinOutcome {
    /// Tile indices at either end of a corridor touching the won maze.
    pub affected: BTreeSet<usize>,
    /// Whether every maze in the world is now completed.
    pub world_completed: bool,
    /// World created because this win completed its world. Replaying a maze
    /// in an already completed world unlocks nothing.
    pub unlocked_world: Option<World>,
}

/// Applies a won level to the world's records.
///
/// Corridors touching the maze become discovered, the maze becomes completed,
/// and undiscovered mazes at the other end of those corridors become
/// discovered. When that completes the world, a new world is appended.
///
/// # Errors
/// Fails when the world, its map, or the maze is missing from `save`.
pub fn record_win<R: Rng + ?Sized>(
    save: &mut SaveData,
    world_id: &str,
    maze_id: &str,
    rng: &mut R,
) -> Result<WinOutcome> {
    if !save.worlds.contains_key(world_id) {
        return Err(MazeError::WorldNotFound {
            id: world_id.to_string(),
        });
    }
    let map = save
        .maps
        .get_mut(world_id)
        .ok_or_else(|| MazeError::MapNotFound {
            world_id: world_id.to_string(),
        })?;
    let maze_index = map
        .mazes
        .get(maze_id)
        .map(|m| m.index)
        .ok_or_else(|| MazeError::MazeNotFound {
            world_id: world_id.to_string(),
            maze_id: maze_id.to_string(),
        })?;

    let was_completed = map.is_completed();
    let mut affected = BTreeSet::new();
    for corridor in map.corridors.iter_mut().filter(|c| c.touches(maze_index)) {
        affected.extend(corridor.tile_indices);
        corridor.status = CorridorStatus::Discovered;
    }

    for maze in map.mazes.values_mut() {
        if maze.id == maze_id {
            maze.status = MazeStatus::Completed;
        } else if affected.contains(&maze.index) && maze.status == MazeStatus::Undiscovered {
            maze.status = MazeStatus::Discovered;
        }
    }

    let world_completed = map.is_completed();
    let unlocked_world = if world_completed && !was_completed {
        let world = next_world(&save.worlds, rng);
        info!("world {world_id} concluded, unlocking {:?}", world.name);
        save.worlds.insert(world.id.clone(), world.clone());
        Some(world)
    } else {
        None
    };

    Ok(WinOutcome {
        affected,
        world_completed,
        unlocked_world,
    })
}
