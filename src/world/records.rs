//! Persisted world records.
//!
//! Records reference each other only through ids and indices so they survive
//! a JSON round trip unchanged.

use crate::maze::blueprint::MazeBlueprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discovery state of a maze on the world map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MazeStatus {
    /// Hidden on the world map and not enterable.
    Undiscovered,
    /// Visible and enterable.
    Discovered,
    /// Won at least once.
    Completed,
}

/// Discovery state of a corridor between two tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorridorStatus {
    /// Not yet revealed.
    Undiscovered,
    /// Revealed by completing one of its mazes.
    Discovered,
}

/// One procedurally generated overworld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    /// Unique id.
    pub id: String,
    /// Progression order.
    pub index: usize,
    /// Display name.
    pub name: String,
    /// `[rows, cols]` of the tile grid.
    pub size: [usize; 2],
}

/// The maze that occupies one world tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    /// Unique id.
    pub id: String,
    /// Row-major index of the owning tile.
    pub index: usize,
    /// Layout.
    pub cells: MazeBlueprint,
    /// Discovery state.
    pub status: MazeStatus,
}

/// An edge of the tile adjacency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corridor {
    /// Unique id.
    pub id: String,
    /// Discovery state.
    pub status: CorridorStatus,
    /// Tile indices, ascending.
    pub tile_indices: [usize; 2],
}

impl Corridor {
    /// Whether the corridor touches tile `index`.
    pub fn touches(&self, index: usize) -> bool {
        self.tile_indices.contains(&index)
    }
}

/// Everything stored for one world besides its [`World`] record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldMap {
    /// Serialized wall strings of the tile grid.
    pub grid_walls: Vec<Vec<String>>,
    /// Mazes keyed by id.
    pub mazes: BTreeMap<String, Maze>,
    /// Corridors between tiles.
    pub corridors: Vec<Corridor>,
}

impl WorldMap {
    /// Mazes ordered by tile index.
    pub fn mazes_by_index(&self) -> Vec<&Maze> {
        let mut mazes: Vec<&Maze> = self.mazes.values().collect();
        mazes.sort_by_key(|m| m.index);
        mazes
    }

    /// Maze on tile `index`.
    pub fn maze_at(&self, index: usize) -> Option<&Maze> {
        self.mazes.values().find(|m| m.index == index)
    }

    /// Whether every maze has been completed.
    pub fn is_completed(&self) -> bool {
        !self.mazes.is_empty()
            && self
                .mazes
                .values()
                .all(|m| m.status == MazeStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let corridor = Corridor {
            id: "c1".to_string(),
            status: CorridorStatus::Undiscovered,
            tile_indices: [1, 4],
        };
        let json = serde_json::to_value(&corridor).unwrap();
        assert_eq!(json["tileIndices"], serde_json::json!([1, 4]));
        assert_eq!(json["status"], "undiscovered");

        let map = WorldMap {
            grid_walls: vec![vec!["tl".to_string()]],
            mazes: BTreeMap::new(),
            corridors: vec![corridor],
        };
        let json = serde_json::to_value(&map).unwrap();
        assert!(json.get("gridWalls").is_some());
        let back: WorldMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_maze_lookup_and_completion() {
        let blueprint = MazeBlueprint::new(vec![vec![0]]).unwrap();
        let mut map = WorldMap {
            grid_walls: Vec::new(),
            mazes: BTreeMap::new(),
            corridors: Vec::new(),
        };
        assert!(!map.is_completed());
        for (id, index) in [("b", 1), ("a", 0)] {
            map.mazes.insert(
                id.to_string(),
                Maze {
                    id: id.to_string(),
                    index,
                    cells: blueprint.clone(),
                    status: MazeStatus::Completed,
                },
            );
        }
        let order: Vec<usize> = map.mazes_by_index().iter().map(|m| m.index).collect();
        assert_eq!(order, vec![0, 1]);
        assert_eq!(map.maze_at(1).map(|m| m.id.as_str()), Some("b"));
        assert!(map.is_completed());
    }
}
