//! Level play: entities, collision and the per-level state machine.
//!
//! A [`LevelSession`] owns everything mutable about one attempt at a maze. The
//! app feeds it one [`LevelSession::tick`] per frame; the session advances its
//! entities in registration order (doors, then the player, then enemies) and
//! then applies the level rules:
//!
//! - stepping onto ground while coins remain closes every open door,
//! - the tick the last coin is gone, every door opens again,
//! - with all coins collected, reaching a door centre wins,
//! - touching an enemy loses.
//!
//! Once the session leaves [`SessionState::Playing`] further ticks do nothing.

pub mod collision;
pub mod door;
pub mod enemy;
pub mod keys;
pub mod level;
pub mod player;

use self::collision::MovementInput;
use self::door::Door;
use self::enemy::Enemy;
use self::level::Level;
use self::player::Player;
use crate::config::{ENEMY_RADIUS, MAX_STEP_MS, PLAYER_RADIUS};
use crate::geometry::Point;
use crate::maze::blueprint::{CellType, MazeBlueprint};
use crate::maze::cell::{Cell, ItemKind};
use crate::maze::grid::Grid;
use log::{debug, info};
use rand::Rng;
use rand::rngs::StdRng;

/// Where a level attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ticks are being processed.
    Playing,
    /// The player reached a door with every coin collected.
    Won,
    /// An enemy caught the player.
    Lost,
}

/// Something that happened during a tick, for the app to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// The doors shut behind the player.
    DoorsClosed,
    /// The last coin was collected and the doors opened.
    DoorsOpened,
    /// A coin was picked up.
    CoinCollected {
        /// Coins still in the maze.
        remaining: usize,
    },
    /// A power-up was picked up.
    PowerUpCollected,
    /// The level was won.
    Won,
    /// The level was lost.
    Lost,
}

/// Anything that advances once per tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// A border door.
    Door(Door),
    /// The player.
    Player(Player),
    /// A patrolling enemy.
    Enemy(Enemy),
}

impl Entity {
    fn advance<R: Rng + ?Sized>(
        &mut self,
        delta_ms: f32,
        input: MovementInput,
        cells: &Grid<Cell>,
        rng: &mut R,
    ) {
        match self {
            Entity::Door(door) => door.advance(delta_ms, cells),
            Entity::Player(player) => player.advance(delta_ms, input, cells),
            Entity::Enemy(enemy) => enemy.advance(delta_ms, cells, rng),
        }
    }

    /// Centre of the entity in pixels.
    pub fn position(&self, cells: &Grid<Cell>) -> Option<Point> {
        match self {
            Entity::Door(door) => cells.get(door.pos).map(Cell::center),
            Entity::Player(player) => Some(player.position),
            Entity::Enemy(enemy) => Some(enemy.position),
        }
    }
}

/// One attempt at a maze.
#[derive(Debug)]
pub struct LevelSession {
    blueprint: MazeBlueprint,
    /// Cells, coins and doors.
    pub level: Level,
    entities: Vec<Entity>,
    state: SessionState,
    rng: StdRng,
}

impl LevelSession {
    /// Starts a session on `blueprint`. `rng` drives enemy wandering.
    pub fn new(blueprint: MazeBlueprint, rng: StdRng) -> Self {
        let level = Level::from_blueprint(&blueprint);
        let entities = populate(&level);
        info!(
            "level started: {}x{}, {} coins, {} doors",
            blueprint.rows(),
            blueprint.cols(),
            level.coins,
            level.doors.len()
        );
        Self {
            blueprint,
            level,
            entities,
            state: SessionState::Playing,
            rng,
        }
    }

    /// Resets cells, coins and entities to their starting state.
    pub fn restart(&mut self) {
        self.level = Level::from_blueprint(&self.blueprint);
        self.entities = populate(&self.level);
        self.state = SessionState::Playing;
        info!("level restarted");
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Layout this session was built from.
    pub fn blueprint(&self) -> &MazeBlueprint {
        &self.blueprint
    }

    /// Entities in update order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The player, if the level has one.
    pub fn player(&self) -> Option<&Player> {
        self.entities.iter().find_map(|e| match e {
            Entity::Player(player) => Some(player),
            _ => None,
        })
    }

    /// All enemies.
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Enemy(enemy) => Some(enemy),
            _ => None,
        })
    }

    /// All door entities.
    pub fn doors(&self) -> impl Iterator<Item = &Door> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Door(door) => Some(door),
            _ => None,
        })
    }

    /// Advances the level by `delta_ms` with `input` held.
    ///
    /// Deltas longer than [`MAX_STEP_MS`] run as equal sub-steps so a slow
    /// frame cannot carry the player past a wall edge.
    ///
    /// # Returns
    /// What happened this tick, in order. Empty once the session has ended.
    pub fn tick(&mut self, delta_ms: f32, input: MovementInput) -> Vec<TickEvent> {
        let mut events = Vec::new();
        let steps = (delta_ms / MAX_STEP_MS).ceil().max(1.0) as usize;
        let step_ms = delta_ms / steps as f32;
        for _ in 0..steps {
            if self.state != SessionState::Playing {
                break;
            }
            self.step(step_ms, input, &mut events);
        }
        events
    }

    /// One simulation step: entities, door rule, win, pickup, lose.
    fn step(&mut self, delta_ms: f32, input: MovementInput, events: &mut Vec<TickEvent>) {

        let cells = &self.level.cells;
        let rng = &mut self.rng;
        for entity in self.entities.iter_mut() {
            entity.advance(delta_ms, input, cells, rng);
        }

        let Some((position, cell)) = self.player().map(|p| (p.position, p.current_cell)) else {
            return;
        };

        let on_ground = self
            .level
            .cells
            .get(cell)
            .is_some_and(|c| c.kind == CellType::Ground);
        if on_ground && !self.level.got_all_coins && self.level.any_door_open() {
            self.level.set_doors_open(false);
            debug!("doors closed, {} coins left", self.level.coins);
            events.push(TickEvent::DoorsClosed);
        }

        if self.level.coins == 0 {
            if !self.level.got_all_coins {
                self.level.got_all_coins = true;
                self.level.set_doors_open(true);
                info!("all coins collected, doors open");
                events.push(TickEvent::DoorsOpened);
            }
            if self
                .level
                .nearest_door_distance(position)
                .is_some_and(|d| d < PLAYER_RADIUS)
            {
                self.state = SessionState::Won;
                info!("level won");
                events.push(TickEvent::Won);
                return;
            }
        }

        if let Some(cell) = self.level.cells.get_mut(cell) {
            let reachable = cell
                .item
                .is_some_and(|item| position.distance_to(item.position) <= PLAYER_RADIUS + item.radius);
            if reachable {
                match cell.pluck_item().map(|item| item.kind) {
                    Some(ItemKind::Coin) => {
                        self.level.coins = self.level.coins.saturating_sub(1);
                        debug!("coin collected, {} left", self.level.coins);
                        events.push(TickEvent::CoinCollected {
                            remaining: self.level.coins,
                        });
                    }
                    Some(ItemKind::PowerUp) => {
                        debug!("power-up collected");
                        events.push(TickEvent::PowerUpCollected);
                    }
                    None => {}
                }
            }
        }

        if self
            .enemies()
            .any(|e| e.position.distance_to(position) < PLAYER_RADIUS + ENEMY_RADIUS)
        {
            self.state = SessionState::Lost;
            info!("level lost");
            events.push(TickEvent::Lost);
        }
    }
}

/// Entities in registration order: doors, the player, enemies.
fn populate(level: &Level) -> Vec<Entity> {
    let mut entities: Vec<Entity> = level
        .doors
        .iter()
        .map(|&pos| Entity::Door(Door::new(pos, &level.cells)))
        .collect();
    entities.push(Entity::Player(Player::spawn(
        level.player_spawn(),
        &level.cells,
    )));
    entities.extend(
        level
            .enemy_spawns()
            .into_iter()
            .map(|pos| Entity::Enemy(Enemy::spawn(pos, &level.cells))),
    );
    entities
}
