//! The persisted integer form of a maze.
//!
//! A blueprint is a rectangular matrix whose values index into the ordered
//! cell-type list `[wall, ground, enemy, powerUp, door]`. Runtime [`Cell`]s
//! are materialised from it when a level starts.
//!
//! [`Cell`]: crate::maze::cell::Cell

use crate::error::{MazeError, Result};
use crate::maze::grid::{Direction, Grid, GridPos};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What occupies a maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellType {
    /// Impassable.
    Wall,
    /// Walkable floor carrying a coin.
    Ground,
    /// Enemy spawn point; walkable, no item.
    Enemy,
    /// Walkable floor carrying a power-up.
    PowerUp,
    /// Exit on the maze border.
    Door,
}

impl CellType {
    /// Cell types in blueprint code order.
    pub const ALL: [CellType; 5] = [
        CellType::Wall,
        CellType::Ground,
        CellType::Enemy,
        CellType::PowerUp,
        CellType::Door,
    ];

    /// Decodes a blueprint value.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Blueprint value of this type.
    pub fn code(self) -> u8 {
        match self {
            CellType::Wall => 0,
            CellType::Ground => 1,
            CellType::Enemy => 2,
            CellType::PowerUp => 3,
            CellType::Door => 4,
        }
    }

    fn symbol(self) -> char {
        match self {
            CellType::Wall => '#',
            CellType::Ground => '.',
            CellType::Enemy => 'E',
            CellType::PowerUp => 'P',
            CellType::Door => 'D',
        }
    }
}

/// A rows x cols matrix of cell codes.
///
/// Stored as a plain matrix; decoding runs the same checks as [`MazeBlueprint::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct MazeBlueprint(Vec<Vec<u8>>);

impl TryFrom<Vec<Vec<u8>>> for MazeBlueprint {
    type Error = MazeError;

    fn try_from(cells: Vec<Vec<u8>>) -> Result<Self> {
        Self::new(cells)
    }
}

impl From<MazeBlueprint> for Vec<Vec<u8>> {
    fn from(blueprint: MazeBlueprint) -> Self {
        blueprint.0
    }
}

impl MazeBlueprint {
    /// Wraps a matrix after checking it is rectangular, non-empty and uses only codes 0..=4.
    pub fn new(cells: Vec<Vec<u8>>) -> Result<Self> {
        let blueprint = Self(cells);
        blueprint.validate()?;
        Ok(blueprint)
    }

    /// Converts a carved grid without re-validating.
    pub(crate) fn from_grid(grid: &Grid<CellType>) -> Self {
        let rows = (0..grid.rows())
            .map(|r| grid.row(r).iter().map(|t| t.code()).collect())
            .collect();
        Self(rows)
    }

    /// Checks the structural rules of the blueprint format.
    pub fn validate(&self) -> Result<()> {
        let cols = match self.0.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => {
                return Err(MazeError::InvalidBlueprint {
                    reason: "blueprint has no cells".to_string(),
                });
            }
        };
        for (row, line) in self.0.iter().enumerate() {
            if line.len() != cols {
                return Err(MazeError::InvalidBlueprint {
                    reason: format!("row {row} has {} cells, expected {cols}", line.len()),
                });
            }
            if let Some((col, code)) = line.iter().enumerate().find(|(_, c)| **c > 4) {
                return Err(MazeError::InvalidBlueprint {
                    reason: format!("unknown cell code {code} at row {row}, col {col}"),
                });
            }
        }
        Ok(())
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.0.len()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }

    /// Cell type at `pos`.
    pub fn get(&self, pos: GridPos) -> Option<CellType> {
        self.0
            .get(pos.row)
            .and_then(|line| line.get(pos.col))
            .and_then(|&code| CellType::from_code(code))
    }

    /// Raw code matrix.
    pub fn cells(&self) -> &[Vec<u8>] {
        &self.0
    }

    /// Typed grid view of the blueprint. Unknown codes become walls.
    pub fn to_grid(&self) -> Grid<CellType> {
        Grid::from_fn(self.rows(), self.cols(), |pos| {
            self.get(pos).unwrap_or(CellType::Wall)
        })
    }

    /// Number of cells of `kind`.
    pub fn count(&self, kind: CellType) -> usize {
        self.0
            .iter()
            .flatten()
            .filter(|&&code| code == kind.code())
            .count()
    }

    /// Border sides that hold at least one door, in direction order.
    pub fn door_sides(&self) -> Vec<Direction> {
        let rows = self.rows();
        let cols = self.cols();
        if rows == 0 || cols == 0 {
            return Vec::new();
        }
        let door = CellType::Door.code();
        Direction::ALL
            .into_iter()
            .filter(|side| match side {
                Direction::Top => self.0[0].contains(&door),
                Direction::Bottom => self.0[rows - 1].contains(&door),
                Direction::Left => self.0.iter().any(|line| line[0] == door),
                Direction::Right => self.0.iter().any(|line| line[cols - 1] == door),
            })
            .collect()
    }
}

impl fmt::Display for MazeBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.0 {
            let text: String = line
                .iter()
                .map(|&code| CellType::from_code(code).map_or('?', CellType::symbol))
                .collect();
            writeln!(f, "{text}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for kind in CellType::ALL {
            assert_eq!(CellType::from_code(kind.code()), Some(kind));
        }
        assert_eq!(CellType::from_code(5), None);
    }

    #[test]
    fn test_rejects_ragged_and_unknown() {
        assert!(MazeBlueprint::new(vec![]).is_err());
        assert!(MazeBlueprint::new(vec![vec![0, 0], vec![0]]).is_err());
        assert!(MazeBlueprint::new(vec![vec![0, 7]]).is_err());
        assert!(MazeBlueprint::new(vec![vec![0, 1, 2, 3, 4]]).is_ok());
    }

    #[test]
    fn test_door_sides_and_counts() {
        let blueprint = MazeBlueprint::new(vec![
            vec![0, 4, 0, 0],
            vec![0, 1, 1, 4],
            vec![0, 2, 3, 0],
            vec![0, 0, 0, 0],
        ])
        .unwrap();
        assert_eq!(blueprint.door_sides(), vec![Direction::Top, Direction::Right]);
        assert_eq!(blueprint.count(CellType::Ground), 2);
        assert_eq!(blueprint.count(CellType::Door), 2);
        assert_eq!(blueprint.get(GridPos::new(2, 2)), Some(CellType::PowerUp));
        assert_eq!(blueprint.get(GridPos::new(9, 9)), None);
    }

    #[test]
    fn test_serializes_as_plain_matrix() {
        let blueprint = MazeBlueprint::new(vec![vec![0, 1], vec![4, 0]]).unwrap();
        let json = serde_json::to_string(&blueprint).unwrap();
        assert_eq!(json, "[[0,1],[4,0]]");
        let back: MazeBlueprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, blueprint);
    }

    #[test]
    fn test_decoding_validates() {
        assert!(serde_json::from_str::<MazeBlueprint>("[[0,9],[4,0]]").is_err());
        assert!(serde_json::from_str::<MazeBlueprint>("[[0,1],[4]]").is_err());
        assert!(serde_json::from_str::<MazeBlueprint>("[]").is_err());
    }

    #[test]
    fn test_display() {
        let blueprint = MazeBlueprint::new(vec![vec![0, 4, 0], vec![0, 1, 0]]).unwrap();
        assert_eq!(blueprint.to_string(), "#D#\n#.#\n");
    }
}
