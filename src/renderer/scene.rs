//! Turns game state into [`Rectangle`]s.
//!
//! Scene building is pure so it can be tested without a GPU. Both scenes are
//! scaled to fit the window and centred in it.

use crate::config::{CELL_SIZE, ENEMY_RADIUS, PLAYER_RADIUS};
use crate::game::{Entity, LevelSession};
use crate::maze::blueprint::CellType;
use crate::maze::cell::ItemKind;
use crate::maze::grid::{Direction, Grid};
use crate::renderer::rectangle::Rectangle;
use crate::world::generator::MapTile;
use crate::world::records::{CorridorStatus, MazeStatus, WorldMap};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Window clear colour.
pub const BACKGROUND: [f64; 4] = [0.07, 0.07, 0.10, 1.0];

const TILE_SIZE: f32 = 96.0;
const TILE_WALL: f32 = 6.0;
const MARGIN: f32 = 0.9;
const MAX_SCALE: f32 = 2.0;

const PLAYER_COLOR: [f32; 4] = [0.96, 0.80, 0.25, 1.0];
const ENEMY_COLOR: [f32; 4] = [0.90, 0.30, 0.35, 1.0];
const COIN_COLOR: [f32; 4] = [1.00, 0.85, 0.35, 1.0];
const POWER_UP_COLOR: [f32; 4] = [0.45, 0.85, 1.00, 1.0];
const SELECTION_COLOR: [f32; 4] = [0.96, 0.80, 0.25, 1.0];
const TILE_WALL_COLOR: [f32; 4] = [0.85, 0.85, 0.90, 1.0];
const CORRIDOR_COLOR: [f32; 4] = [0.55, 0.75, 0.55, 1.0];

lazy_static! {
    /// Fill colour per cell type. Closed doors read as walls.
    static ref CELL_COLORS: HashMap<CellType, [f32; 4]> = HashMap::from([
        (CellType::Wall, [0.20, 0.22, 0.30, 1.0]),
        (CellType::Ground, [0.12, 0.13, 0.17, 1.0]),
        (CellType::Enemy, [0.12, 0.13, 0.17, 1.0]),
        (CellType::PowerUp, [0.12, 0.13, 0.17, 1.0]),
        (CellType::Door, [0.35, 0.65, 0.40, 1.0]),
    ]);

    /// Tile fill per maze status on the world map.
    static ref STATUS_COLORS: HashMap<MazeStatus, [f32; 4]> = HashMap::from([
        (MazeStatus::Undiscovered, [0.16, 0.17, 0.22, 1.0]),
        (MazeStatus::Discovered, [0.25, 0.35, 0.55, 1.0]),
        (MazeStatus::Completed, [0.30, 0.55, 0.35, 1.0]),
    ]);
}

fn cell_color(kind: CellType) -> [f32; 4] {
    CELL_COLORS.get(&kind).copied().unwrap_or([1.0, 0.0, 1.0, 1.0])
}

fn lerp(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

/// Scale and offset placing `content` centred in `viewport`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fit {
    scale: f32,
    dx: f32,
    dy: f32,
}

impl Fit {
    fn new(content: (f32, f32), viewport: (f32, f32)) -> Self {
        let (cw, ch) = (content.0.max(1.0), content.1.max(1.0));
        let scale = (viewport.0 * MARGIN / cw)
            .min(viewport.1 * MARGIN / ch)
            .min(MAX_SCALE);
        Self {
            scale,
            dx: (viewport.0 - cw * scale) / 2.0,
            dy: (viewport.1 - ch * scale) / 2.0,
        }
    }

    fn rect(&self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) -> Rectangle {
        Rectangle::new(
            self.dx + x * self.scale,
            self.dy + y * self.scale,
            w * self.scale,
            h * self.scale,
            color,
        )
    }

    fn circle(&self, cx: f32, cy: f32, radius: f32, color: [f32; 4]) -> Rectangle {
        Rectangle::circle(
            self.dx + cx * self.scale,
            self.dy + cy * self.scale,
            radius * self.scale,
            color,
        )
    }
}

/// Cells, items, doors and entities of a running level.
pub fn level_scene(session: &LevelSession, viewport: (f32, f32)) -> Vec<Rectangle> {
    let cells = &session.level.cells;
    let fit = Fit::new(
        (cells.cols() as f32 * CELL_SIZE, cells.rows() as f32 * CELL_SIZE),
        viewport,
    );
    let mut out = Vec::with_capacity(cells.len() * 2 + session.entities().len());

    for (_, cell) in cells.iter() {
        // Doors are drawn by their entity so they can fade.
        if cell.door.is_none() {
            out.push(fit.rect(cell.x, cell.y, CELL_SIZE, CELL_SIZE, cell_color(cell.kind)));
        }
        if let Some(item) = cell.item {
            let color = match item.kind {
                ItemKind::Coin => COIN_COLOR,
                ItemKind::PowerUp => POWER_UP_COLOR,
            };
            out.push(fit.circle(item.position.x, item.position.y, item.radius, color));
        }
    }

    for entity in session.entities() {
        match entity {
            Entity::Door(door) => {
                if let Some(cell) = cells.get(door.pos) {
                    let color = lerp(
                        cell_color(CellType::Wall),
                        cell_color(CellType::Door),
                        door.openness,
                    );
                    out.push(fit.rect(cell.x, cell.y, CELL_SIZE, CELL_SIZE, color));
                }
            }
            Entity::Player(player) => out.push(fit.circle(
                player.position.x,
                player.position.y,
                PLAYER_RADIUS,
                PLAYER_COLOR,
            )),
            Entity::Enemy(enemy) => out.push(fit.circle(
                enemy.position.x,
                enemy.position.y,
                ENEMY_RADIUS,
                ENEMY_COLOR,
            )),
        }
    }
    out
}

/// What the world map screen shows.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    /// Tile grid, possibly still being generated.
    pub tiles: &'a Grid<MapTile>,
    /// Stored map data; `None` while the grid is still being generated.
    pub map: Option<&'a WorldMap>,
    /// Selected tile index.
    pub selected: Option<usize>,
}

/// Tiles, walls, discovered corridors and the selection marker.
pub fn world_scene(view: WorldView<'_>, viewport: (f32, f32)) -> Vec<Rectangle> {
    let tiles = view.tiles;
    let fit = Fit::new(
        (tiles.cols() as f32 * TILE_SIZE, tiles.rows() as f32 * TILE_SIZE),
        viewport,
    );
    let mut out = Vec::new();

    for (_, tile) in tiles.iter() {
        let x = tile.col as f32 * TILE_SIZE;
        let y = tile.row as f32 * TILE_SIZE;
        if view.selected == Some(tile.index) {
            out.push(
                fit.rect(x, y, TILE_SIZE, TILE_SIZE, SELECTION_COLOR)
                    .with_corner_radius(8.0 * fit.scale),
            );
        }

        let status = view
            .map
            .and_then(|m| m.maze_at(tile.index))
            .map(|m| m.status);
        let fill = match status {
            Some(status) => STATUS_COLORS
                .get(&status)
                .copied()
                .unwrap_or(cell_color(CellType::Ground)),
            None if tile.visited => cell_color(CellType::Ground),
            None => cell_color(CellType::Wall),
        };
        let inset = TILE_WALL;
        out.push(
            fit.rect(
                x + inset,
                y + inset,
                TILE_SIZE - inset * 2.0,
                TILE_SIZE - inset * 2.0,
                fill,
            )
            .with_corner_radius(4.0 * fit.scale),
        );

        for side in Direction::ALL {
            if !tile.walls.get(side) {
                continue;
            }
            let (wx, wy, ww, wh) = match side {
                Direction::Top => (x, y, TILE_SIZE, TILE_WALL),
                Direction::Right => (x + TILE_SIZE - TILE_WALL, y, TILE_WALL, TILE_SIZE),
                Direction::Bottom => (x, y + TILE_SIZE - TILE_WALL, TILE_SIZE, TILE_WALL),
                Direction::Left => (x, y, TILE_WALL, TILE_SIZE),
            };
            out.push(fit.rect(wx, wy, ww, wh, TILE_WALL_COLOR));
        }
    }

    if let Some(map) = view.map {
        for corridor in map
            .corridors
            .iter()
            .filter(|c| c.status == CorridorStatus::Discovered)
        {
            let [a, b] = corridor.tile_indices;
            if a >= tiles.len() || b >= tiles.len() {
                continue;
            }
            let (pa, pb) = (tiles.pos_of(a), tiles.pos_of(b));
            let half = TILE_SIZE / 2.0;
            let (ax, ay) = (pa.col as f32 * TILE_SIZE + half, pa.row as f32 * TILE_SIZE + half);
            let (bx, by) = (pb.col as f32 * TILE_SIZE + half, pb.row as f32 * TILE_SIZE + half);
            let thickness = TILE_SIZE / 6.0;
            let (x, y, w, h) = if pa.row == pb.row {
                (ax.min(bx), ay - thickness / 2.0, (bx - ax).abs(), thickness)
            } else {
                (ax - thickness / 2.0, ay.min(by), thickness, (by - ay).abs())
            };
            out.push(fit.rect(x, y, w, h, CORRIDOR_COLOR));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::blueprint::MazeBlueprint;
    use crate::world::generator::WorldGenerator;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_fit_centres_content() {
        let fit = Fit::new((100.0, 50.0), (400.0, 400.0));
        assert_eq!(fit.scale, 2.0);
        assert_eq!((fit.dx, fit.dy), (100.0, 150.0));
    }

    #[test]
    fn test_level_scene_draws_every_cell_and_entity() {
        let blueprint =
            MazeBlueprint::new(vec![vec![0, 4, 0], vec![0, 1, 0], vec![0, 2, 0], vec![0, 0, 0]])
                .unwrap();
        let session = LevelSession::new(blueprint, StdRng::seed_from_u64(1));
        let rects = level_scene(&session, (1360.0, 768.0));
        // 11 non-door cells, 1 coin, 1 door, 1 player, 1 enemy.
        assert_eq!(rects.len(), 15);
        let player = &rects[rects.len() - 2];
        assert_eq!(player.color, PLAYER_COLOR);
        assert_eq!(player.corner_radius, player.width / 2.0);
    }

    #[test]
    fn test_world_scene_marks_selection() {
        let tiles = WorldGenerator::new(2, 2, StdRng::seed_from_u64(3)).generate();
        let plain = world_scene(
            WorldView {
                tiles: &tiles,
                map: None,
                selected: None,
            },
            (800.0, 600.0),
        );
        let selected = world_scene(
            WorldView {
                tiles: &tiles,
                map: None,
                selected: Some(0),
            },
            (800.0, 600.0),
        );
        assert_eq!(selected.len(), plain.len() + 1);
        assert_eq!(selected[0].color, SELECTION_COLOR);
    }
}
