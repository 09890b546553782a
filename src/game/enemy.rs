//! Wandering enemies.
//!
//! An enemy walks from cell centre to cell centre. Once it is within
//! [`ENEMY_TARGET_EPSILON`] of its target it picks a random walkable
//! orthogonal neighbour, never turning back while another way is open.
//! Enemies ignore the player; they only patrol.

use crate::config::{ENEMY_RADIUS, ENEMY_SPEED, ENEMY_TARGET_EPSILON};
use crate::game::level::cell_at;
use crate::geometry::{Circle, Point};
use crate::maze::cell::Cell;
use crate::maze::grid::{Direction, Grid, GridPos};
use rand::prelude::*;

/// A patrolling enemy.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    /// Centre in pixels.
    pub position: Point,
    /// Cell centre the enemy is walking towards.
    pub target: Point,
    /// Last straight-line heading; `None` until the first move.
    pub direction: Option<Direction>,
    /// Pixels per millisecond.
    pub speed: f32,
}

impl Enemy {
    /// Enemy resting at the centre of `spawn`.
    pub fn spawn(spawn: GridPos, cells: &Grid<Cell>) -> Self {
        let position = cells
            .get(spawn)
            .map(Cell::center)
            .unwrap_or(Point::new(0.0, 0.0));
        Self {
            position,
            target: position,
            direction: None,
            speed: ENEMY_SPEED,
        }
    }

    /// Collision circle at the current position.
    pub fn circle(&self) -> Circle {
        Circle::new(self.position.x, self.position.y, ENEMY_RADIUS)
    }

    /// Picks a new target if the current one was reached, then steps towards it.
    pub fn advance<R: Rng + ?Sized>(&mut self, delta_ms: f32, cells: &Grid<Cell>, rng: &mut R) {
        if self.position.distance_to(self.target) <= ENEMY_TARGET_EPSILON {
            self.retarget(cells, rng);
        }

        // Each axis closes in on its own and never overshoots the target.
        let step = self.speed * delta_ms;
        let dx = (self.target.x - self.position.x).clamp(-step, step);
        let dy = (self.target.y - self.position.y).clamp(-step, step);

        if dy == 0.0 && dx != 0.0 {
            self.direction = Some(if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            });
        } else if dx == 0.0 && dy != 0.0 {
            self.direction = Some(if dy > 0.0 {
                Direction::Bottom
            } else {
                Direction::Top
            });
        }

        self.position = Point::new(self.position.x + dx, self.position.y + dy);
    }

    fn retarget<R: Rng + ?Sized>(&mut self, cells: &Grid<Cell>, rng: &mut R) {
        let Some(here) = cell_at(cells, self.position) else {
            return;
        };
        let mut options: Vec<(Direction, Point)> = Direction::ALL
            .iter()
            .filter_map(|&d| {
                cells
                    .neighbor(here, d)
                    .filter(|c| c.is_enemy_walkable())
                    .map(|c| (d, c.center()))
            })
            .collect();

        // Dead ends are the only place an enemy turns around.
        if let Some(heading) = self.direction {
            if options.len() > 1 {
                options.retain(|(d, _)| *d != heading.opposite());
            }
        }

        if let Some(&(_, target)) = options.choose(rng) {
            self.target = target;
        }
    }
}
