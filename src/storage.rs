//! Save directory persistence.
//!
//! Progress lives in two JSON files inside the save directory:
//! - `worlds.json`: world records keyed by id
//! - `maps.json`: per-world map data keyed by world id
//!
//! Missing files read as empty progress. A missing world, map or maze when a
//! level loads is an error the caller must not paper over.

use crate::error::{MazeError, Result};
use crate::world::progression::initial_world;
use crate::world::records::{Maze, World, WorldMap};
use chrono::Local;
use log::{debug, info};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const WORLDS_FILE: &str = "worlds.json";
const MAPS_FILE: &str = "maps.json";

/// All persisted progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    /// World records keyed by id.
    pub worlds: BTreeMap<String, World>,
    /// Map data keyed by world id. A world without an entry has not been generated yet.
    pub maps: BTreeMap<String, WorldMap>,
}

impl SaveData {
    /// World record for `id`.
    pub fn world(&self, id: &str) -> Result<&World> {
        self.worlds
            .get(id)
            .ok_or_else(|| MazeError::WorldNotFound { id: id.to_string() })
    }

    /// Map data for `world_id`.
    pub fn map(&self, world_id: &str) -> Result<&WorldMap> {
        self.maps.get(world_id).ok_or_else(|| MazeError::MapNotFound {
            world_id: world_id.to_string(),
        })
    }

    /// Maze `maze_id` of world `world_id`.
    pub fn maze(&self, world_id: &str, maze_id: &str) -> Result<&Maze> {
        self.world(world_id)?;
        self.map(world_id)?
            .mazes
            .get(maze_id)
            .ok_or_else(|| MazeError::MazeNotFound {
                world_id: world_id.to_string(),
                maze_id: maze_id.to_string(),
            })
    }

    /// Worlds in progression order.
    pub fn worlds_by_index(&self) -> Vec<&World> {
        let mut worlds: Vec<&World> = self.worlds.values().collect();
        worlds.sort_by_key(|w| w.index);
        worlds
    }

    /// The highest-index world.
    pub fn latest_world(&self) -> Option<&World> {
        self.worlds.values().max_by_key(|w| w.index)
    }
}

/// Reads and writes [`SaveData`] in a directory.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Storage rooted at `dir`. Nothing is touched until the first load or save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads all progress; missing files read as empty.
    pub fn load(&self) -> Result<SaveData> {
        Ok(SaveData {
            worlds: read_json(&self.dir.join(WORLDS_FILE))?.unwrap_or_default(),
            maps: read_json(&self.dir.join(MAPS_FILE))?.unwrap_or_default(),
        })
    }

    /// Loads progress, creating and saving the first world when none exists.
    pub fn load_or_init<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SaveData> {
        let mut data = self.load()?;
        if data.worlds.is_empty() {
            let world = initial_world(rng);
            info!("no saved worlds, starting with {:?}", world.name);
            data.worlds.insert(world.id.clone(), world);
            self.save(&data)?;
        }
        Ok(data)
    }

    /// Writes all progress.
    pub fn save(&self, data: &SaveData) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        write_json(&self.dir.join(WORLDS_FILE), &data.worlds)?;
        write_json(&self.dir.join(MAPS_FILE), &data.maps)?;
        debug!("saved progress to {}", self.dir.display());
        Ok(())
    }

    /// Moves existing save files into a timestamped backup directory.
    ///
    /// # Returns
    /// The backup directory, or `None` when there was nothing to archive.
    pub fn reset(&self) -> Result<Option<PathBuf>> {
        let existing: Vec<PathBuf> = [WORLDS_FILE, MAPS_FILE]
            .iter()
            .map(|name| self.dir.join(name))
            .filter(|path| path.exists())
            .collect();
        if existing.is_empty() {
            return Ok(None);
        }

        let stamp = Local::now().format("backup_%m-%d-%y_%H-%M-%S").to_string();
        let backup = self.dir.join(stamp);
        fs::create_dir_all(&backup)?;
        for path in existing {
            if let Some(name) = path.file_name() {
                fs::rename(&path, backup.join(name))?;
            }
        }
        info!("archived previous progress to {}", backup.display());
        Ok(Some(backup))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&text)?))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::blueprint::MazeBlueprint;
    use crate::world::records::MazeStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn temp_storage() -> Storage {
        let dir = std::env::temp_dir().join(format!("mazeworld-test-{}", uuid::Uuid::new_v4()));
        Storage::new(dir)
    }

    #[test]
    fn test_missing_files_load_empty() {
        let storage = temp_storage();
        let data = storage.load().unwrap();
        assert!(data.worlds.is_empty());
        assert!(data.maps.is_empty());
    }

    #[test]
    fn test_init_creates_first_world_once() {
        let storage = temp_storage();
        let mut rng = StdRng::seed_from_u64(1);
        let first = storage.load_or_init(&mut rng).unwrap();
        assert_eq!(first.worlds.len(), 1);
        let again = storage.load_or_init(&mut rng).unwrap();
        assert_eq!(again, first);
        fs::remove_dir_all(storage.dir()).unwrap();
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let storage = temp_storage();
        let mut rng = StdRng::seed_from_u64(2);
        let mut data = storage.load_or_init(&mut rng).unwrap();
        let world_id = data.latest_world().unwrap().id.clone();
        let maze = Maze {
            id: "m1".to_string(),
            index: 0,
            cells: MazeBlueprint::new(vec![vec![0, 4, 0], vec![0, 1, 0], vec![0, 0, 0]]).unwrap(),
            status: MazeStatus::Discovered,
        };
        data.maps.insert(
            world_id.clone(),
            WorldMap {
                grid_walls: vec![vec!["trbl".to_string()]],
                mazes: BTreeMap::from([("m1".to_string(), maze)]),
                corridors: Vec::new(),
            },
        );
        storage.save(&data).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded, data);
        assert_eq!(loaded.maze(&world_id, "m1").unwrap().index, 0);
        assert!(matches!(
            loaded.maze(&world_id, "m2"),
            Err(MazeError::MazeNotFound { .. })
        ));
        assert!(matches!(
            loaded.map("missing"),
            Err(MazeError::MapNotFound { .. })
        ));
        fs::remove_dir_all(storage.dir()).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let storage = temp_storage();
        fs::create_dir_all(storage.dir()).unwrap();
        fs::write(storage.dir().join(WORLDS_FILE), "{ not json").unwrap();
        assert!(matches!(
            storage.load(),
            Err(MazeError::Serialization(_))
        ));
        fs::remove_dir_all(storage.dir()).unwrap();
    }

    #[test]
    fn test_bad_blueprint_in_maps_file_is_rejected() {
        let storage = temp_storage();
        fs::create_dir_all(storage.dir()).unwrap();
        let maps = r#"{"w": {
            "gridWalls": [["trbl"]],
            "mazes": {"m": {"id": "m", "index": 0, "cells": [[0, 9], [4, 0]], "status": "discovered"}},
            "corridors": []
        }}"#;
        fs::write(storage.dir().join(MAPS_FILE), maps).unwrap();
        match storage.load() {
            Err(MazeError::Serialization(err)) => {
                assert!(err.to_string().contains("Invalid maze blueprint"));
            }
            other => panic!("expected a blueprint error, got {other:?}"),
        }
        fs::remove_dir_all(storage.dir()).unwrap();
    }

    #[test]
    fn test_reset_archives_files() {
        let storage = temp_storage();
        assert_eq!(storage.reset().unwrap(), None);
        let mut rng = StdRng::seed_from_u64(3);
        storage.load_or_init(&mut rng).unwrap();
        let backup = storage.reset().unwrap().unwrap();
        assert!(backup.join(WORLDS_FILE).exists());
        assert!(storage.load().unwrap().worlds.is_empty());
        fs::remove_dir_all(storage.dir()).unwrap();
    }
}
