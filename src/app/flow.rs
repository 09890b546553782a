//! Screen flow between world generation, the world map and level play.
//!
//! [`GameFlow`] owns saved progress and the current [`Screen`]. It knows
//! nothing about windows or the GPU: the event handler forwards keys and
//! redraws to it and renders whatever [`GameFlow::scene`] returns.

use crate::error::{MazeError, Result};
use crate::game::collision::MovementInput;
use crate::game::keys::GameKey;
use crate::game::{LevelSession, SessionState, TickEvent};
use crate::maze::grid::Grid;
use crate::renderer::rectangle::Rectangle;
use crate::renderer::scene::{WorldView, level_scene, world_scene};
use crate::scheduler::FrameScheduler;
use crate::storage::{SaveData, Storage};
use crate::world::generator::{MapTile, WorldGenerator, deserialize};
use crate::world::progression::{build_world_map, record_win};
use crate::world::records::MazeStatus;
use log::{debug, info};
use rand::prelude::*;
use std::time::{Duration, Instant};

/// How long a won or lost level stays on screen before moving on.
pub const OUTCOME_PAUSE: Duration = Duration::from_millis(1500);

/// World generation steps taken per redraw.
const GENERATION_STEPS_PER_FRAME: usize = 2;

/// What the window is showing.
pub enum Screen {
    /// A world's tile grid is being carved, one step at a time.
    Generating {
        /// World being generated.
        world_id: String,
        /// Step-wise generator; its partial grid is drawn every frame.
        generator: WorldGenerator<StdRng>,
    },
    /// Tile selection for a world whose map exists.
    WorldMap {
        /// World shown.
        world_id: String,
        /// Tile grid rebuilt from the stored wall strings.
        tiles: Grid<MapTile>,
        /// Selected tile index.
        selected: usize,
    },
    /// A maze being played.
    Level {
        /// Owning world.
        world_id: String,
        /// Maze being played.
        maze_id: String,
        /// Tile index of the maze, to reselect it on the way back.
        tile: usize,
        /// The attempt in progress.
        session: LevelSession,
        /// When the attempt was won or lost.
        ended_at: Option<Instant>,
    },
}

/// What the window should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    /// Keep running.
    Continue,
    /// Close the window.
    Quit,
}

/// Saved progress plus the current screen.
pub struct GameFlow {
    storage: Storage,
    save: SaveData,
    rng: StdRng,
    screen: Screen,
    scheduler: FrameScheduler,
}

impl GameFlow {
    /// Loads progress and opens `world`, or the latest world when `None`.
    ///
    /// # Errors
    /// Fails when the save directory cannot be read or `world` does not exist.
    pub fn new(storage: Storage, mut rng: StdRng, world: Option<&str>) -> Result<Self> {
        let save = storage.load_or_init(&mut rng)?;
        let world_id = match world {
            Some(id) => save.world(id)?.id.clone(),
            None => save
                .latest_world()
                .map(|w| w.id.clone())
                .ok_or_else(|| MazeError::WorldNotFound {
                    id: "latest".to_string(),
                })?,
        };
        let screen = world_screen(&save, &world_id, 0, &mut rng)?;
        Ok(Self {
            storage,
            save,
            rng,
            screen,
            scheduler: FrameScheduler::new(),
        })
    }

    /// Current screen.
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Advances whatever the current screen animates.
    ///
    /// # Errors
    /// Fails when saving progress fails or stored data went missing.
    pub fn update(&mut self, now: Instant, input: MovementInput) -> Result<()> {
        match &mut self.screen {
            Screen::Generating {
                world_id,
                generator,
            } => {
                for _ in 0..GENERATION_STEPS_PER_FRAME {
                    if generator.is_complete() {
                        break;
                    }
                    generator.step();
                }
                if generator.is_complete() {
                    let world_id = world_id.clone();
                    let tiles = generator.grid().clone();
                    let map = build_world_map(&tiles, &mut self.rng);
                    self.save.maps.insert(world_id.clone(), map);
                    self.storage.save(&self.save)?;
                    info!("world {world_id} generated and saved");
                    self.screen = Screen::WorldMap {
                        world_id,
                        tiles,
                        selected: 0,
                    };
                }
            }
            Screen::WorldMap { .. } => {}
            Screen::Level {
                world_id,
                maze_id,
                tile,
                session,
                ended_at,
            } => {
                if let Some(ended) = *ended_at {
                    if now.saturating_duration_since(ended) < OUTCOME_PAUSE {
                        return Ok(());
                    }
                    if session.state() == SessionState::Won {
                        let (world_id, tile) = (world_id.clone(), *tile);
                        self.screen = world_screen(&self.save, &world_id, tile, &mut self.rng)?;
                    } else {
                        session.restart();
                        *ended_at = None;
                        self.scheduler.start(now);
                    }
                    return Ok(());
                }

                let Some(delta) = self.scheduler.tick(now) else {
                    return Ok(());
                };
                for event in session.tick(delta, input) {
                    match event {
                        TickEvent::Won => {
                            self.scheduler.stop();
                            *ended_at = Some(now);
                            let outcome =
                                record_win(&mut self.save, world_id, maze_id, &mut self.rng)?;
                            self.storage.save(&self.save)?;
                            info!(
                                "maze {maze_id} completed, revealed tiles {:?}",
                                outcome.affected
                            );
                            if let Some(world) = outcome.unlocked_world {
                                info!("new world unlocked: {} ({})", world.name, world.id);
                            }
                        }
                        TickEvent::Lost => {
                            self.scheduler.stop();
                            *ended_at = Some(now);
                        }
                        other => debug!("{other:?}"),
                    }
                }
            }
        }
        Ok(())
    }

    /// Reacts to the initial press of `key`.
    ///
    /// # Errors
    /// Fails when stored data for the chosen maze or world is missing.
    pub fn handle_key(&mut self, key: GameKey, now: Instant) -> Result<FlowAction> {
        if key == GameKey::Quit {
            return Ok(FlowAction::Quit);
        }

        match &mut self.screen {
            Screen::Generating { .. } => {}
            Screen::WorldMap {
                world_id,
                tiles,
                selected,
            } => match key {
                GameKey::Confirm => {
                    let (world_id, tile) = (world_id.clone(), *selected);
                    self.enter_maze(&world_id, tile, now)?;
                }
                GameKey::NextWorld => self.switch_world(1)?,
                GameKey::PrevWorld => self.switch_world(-1)?,
                _ => {
                    if let Some(direction) = key.direction() {
                        let pos = tiles.pos_of(*selected);
                        if let Some(next) = pos.step(direction).filter(|p| tiles.contains(*p)) {
                            *selected = tiles.index_of(next);
                        }
                    }
                }
            },
            Screen::Level {
                world_id,
                tile,
                session,
                ended_at,
                ..
            } => match key {
                GameKey::Escape => {
                    self.scheduler.stop();
                    let (world_id, tile) = (world_id.clone(), *tile);
                    self.screen = world_screen(&self.save, &world_id, tile, &mut self.rng)?;
                }
                GameKey::Restart => {
                    session.restart();
                    *ended_at = None;
                    self.scheduler.start(now);
                }
                _ => {}
            },
        }
        Ok(FlowAction::Continue)
    }

    /// Rectangles for the current screen.
    pub fn scene(&self, viewport: (f32, f32)) -> Vec<Rectangle> {
        match &self.screen {
            Screen::Generating { generator, .. } => world_scene(
                WorldView {
                    tiles: generator.grid(),
                    map: None,
                    selected: None,
                },
                viewport,
            ),
            Screen::WorldMap {
                world_id,
                tiles,
                selected,
            } => world_scene(
                WorldView {
                    tiles,
                    map: self.save.maps.get(world_id),
                    selected: Some(*selected),
                },
                viewport,
            ),
            Screen::Level { session, .. } => level_scene(session, viewport),
        }
    }

    /// Window title describing the current screen.
    pub fn title(&self) -> String {
        let name = |id: &str| {
            self.save
                .worlds
                .get(id)
                .map(|w| w.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        match &self.screen {
            Screen::Generating {
                world_id,
                generator,
            } => {
                let (done, total) = generator.get_progress();
                format!("{} - generating {done}/{total}", name(world_id))
            }
            Screen::WorldMap {
                world_id, selected, ..
            } => {
                let status = self
                    .save
                    .maps
                    .get(world_id)
                    .and_then(|m| m.maze_at(*selected))
                    .map(|m| match m.status {
                        MazeStatus::Undiscovered => "undiscovered",
                        MazeStatus::Discovered => "discovered",
                        MazeStatus::Completed => "completed",
                    })
                    .unwrap_or("empty");
                format!(
                    "{} - maze {} ({status}) - Enter to play, N/P to switch worlds",
                    name(world_id),
                    selected + 1
                )
            }
            Screen::Level {
                world_id, session, ..
            } => {
                let state = match session.state() {
                    SessionState::Playing => format!("coins left: {}", session.level.coins),
                    SessionState::Won => "escaped!".to_string(),
                    SessionState::Lost => "caught!".to_string(),
                };
                format!("{} - {state}", name(world_id))
            }
        }
    }

    /// Opens the maze on `tile` if it has been discovered.
    fn enter_maze(&mut self, world_id: &str, tile: usize, now: Instant) -> Result<()> {
        let Some(maze_id) = self.save.map(world_id)?.maze_at(tile).map(|m| m.id.clone()) else {
            debug!("tile {tile} has no maze");
            return Ok(());
        };
        let maze = self.save.maze(world_id, &maze_id)?;
        if maze.status == MazeStatus::Undiscovered {
            info!("maze on tile {tile} is still undiscovered");
            return Ok(());
        }

        let session = LevelSession::new(
            maze.cells.clone(),
            StdRng::seed_from_u64(self.rng.r#gen()),
        );
        self.scheduler.start(now);
        self.screen = Screen::Level {
            world_id: world_id.to_string(),
            maze_id,
            tile,
            session,
            ended_at: None,
        };
        Ok(())
    }

    /// Moves `offset` worlds along the progression order.
    fn switch_world(&mut self, offset: isize) -> Result<()> {
        let Screen::WorldMap { world_id, .. } = &self.screen else {
            return Ok(());
        };
        let worlds = self.save.worlds_by_index();
        let Some(current) = worlds.iter().position(|w| &w.id == world_id) else {
            return Ok(());
        };
        let Some(target) = current
            .checked_add_signed(offset)
            .and_then(|i| worlds.get(i))
            .map(|w| w.id.clone())
        else {
            return Ok(());
        };
        info!("switching to world {target}");
        self.screen = world_screen(&self.save, &target, 0, &mut self.rng)?;
        Ok(())
    }
}

/// World map for `world_id`, or its generator when no map is stored yet.
fn world_screen(
    save: &SaveData,
    world_id: &str,
    selected: usize,
    rng: &mut StdRng,
) -> Result<Screen> {
    let world = save.world(world_id)?;
    match save.maps.get(world_id) {
        Some(map) => Ok(Screen::WorldMap {
            world_id: world_id.to_string(),
            tiles: deserialize(&map.grid_walls)?,
            selected,
        }),
        None => {
            info!("generating world {:?} ({}x{})", world.name, world.size[0], world.size[1]);
            Ok(Screen::Generating {
                world_id: world_id.to_string(),
                generator: WorldGenerator::new(
                    world.size[0],
                    world.size[1],
                    StdRng::seed_from_u64(rng.r#gen()),
                ),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::blueprint::MazeBlueprint;
    use crate::maze::grid::Direction;
    use crate::world::records::{Maze, World, WorldMap};
    use std::collections::BTreeMap;
    use std::fs;

    fn temp_storage() -> Storage {
        Storage::new(std::env::temp_dir().join(format!("mazeworld-flow-{}", uuid::Uuid::new_v4())))
    }

    /// A one-tile world whose only maze is `cells`.
    fn single_maze_storage(cells: Vec<Vec<u8>>) -> Storage {
        let storage = temp_storage();
        let world = World {
            id: "w".to_string(),
            index: 0,
            name: "Test".to_string(),
            size: [1, 1],
        };
        let maze = Maze {
            id: "m".to_string(),
            index: 0,
            cells: MazeBlueprint::new(cells).unwrap(),
            status: MazeStatus::Discovered,
        };
        let save = SaveData {
            worlds: BTreeMap::from([("w".to_string(), world)]),
            maps: BTreeMap::from([(
                "w".to_string(),
                WorldMap {
                    grid_walls: vec![vec!["trbl".to_string()]],
                    mazes: BTreeMap::from([("m".to_string(), maze)]),
                    corridors: Vec::new(),
                },
            )]),
        };
        storage.save(&save).unwrap();
        storage
    }

    fn ms(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn test_new_game_generates_and_saves_world() {
        let storage = temp_storage();
        let mut flow = GameFlow::new(storage.clone(), StdRng::seed_from_u64(8), None).unwrap();
        assert!(matches!(flow.screen(), Screen::Generating { .. }));
        assert!(flow.title().contains("generating"));

        let start = Instant::now();
        for frame in 0..200 {
            flow.update(ms(start, frame * 16), MovementInput::default()).unwrap();
            if matches!(flow.screen(), Screen::WorldMap { .. }) {
                break;
            }
        }
        let Screen::WorldMap { world_id, tiles, .. } = flow.screen() else {
            panic!("world was not generated");
        };
        assert_eq!((tiles.rows(), tiles.cols()), (3, 3));
        let stored = storage.load().unwrap();
        let map = stored.map(world_id).unwrap();
        assert_eq!(map.mazes.len(), 9);
        assert_eq!(map.maze_at(0).unwrap().status, MazeStatus::Discovered);
        fs::remove_dir_all(storage.dir()).unwrap();
    }

    #[test]
    fn test_selection_and_undiscovered_mazes() {
        let storage = temp_storage();
        let mut flow = GameFlow::new(storage.clone(), StdRng::seed_from_u64(9), None).unwrap();
        let start = Instant::now();
        while !matches!(flow.screen(), Screen::WorldMap { .. }) {
            flow.update(start, MovementInput::default()).unwrap();
        }

        flow.handle_key(GameKey::MoveLeft, start).unwrap();
        flow.handle_key(GameKey::MoveUp, start).unwrap();
        assert!(matches!(flow.screen(), Screen::WorldMap { selected: 0, .. }));

        flow.handle_key(GameKey::MoveRight, start).unwrap();
        assert!(matches!(flow.screen(), Screen::WorldMap { selected: 1, .. }));
        flow.handle_key(GameKey::Confirm, start).unwrap();
        assert!(matches!(flow.screen(), Screen::WorldMap { .. }));

        flow.handle_key(GameKey::MoveLeft, start).unwrap();
        flow.handle_key(GameKey::Confirm, start).unwrap();
        assert!(matches!(flow.screen(), Screen::Level { tile: 0, .. }));

        flow.handle_key(GameKey::Escape, start).unwrap();
        assert!(matches!(flow.screen(), Screen::WorldMap { selected: 0, .. }));
        assert_eq!(flow.handle_key(GameKey::Quit, start).unwrap(), FlowAction::Quit);
        fs::remove_dir_all(storage.dir()).unwrap();
    }

    #[test]
    fn test_win_is_recorded_and_unlocks_next_world() {
        let storage = single_maze_storage(vec![vec![0, 4, 0], vec![0, 3, 0], vec![0, 0, 0]]);
        let mut flow = GameFlow::new(storage.clone(), StdRng::seed_from_u64(1), None).unwrap();
        let start = Instant::now();
        flow.handle_key(GameKey::Confirm, start).unwrap();
        assert!(matches!(flow.screen(), Screen::Level { .. }));

        flow.update(ms(start, 16), MovementInput::default()).unwrap();
        assert!(flow.title().contains("escaped"));
        let stored = storage.load().unwrap();
        assert_eq!(stored.maze("w", "m").unwrap().status, MazeStatus::Completed);
        assert_eq!(stored.worlds.len(), 2);

        flow.update(ms(start, 100), MovementInput::default()).unwrap();
        assert!(matches!(flow.screen(), Screen::Level { .. }));
        flow.update(ms(start, 2000), MovementInput::default()).unwrap();
        assert!(matches!(flow.screen(), Screen::WorldMap { .. }));

        flow.handle_key(GameKey::NextWorld, start).unwrap();
        assert!(matches!(flow.screen(), Screen::Generating { .. }));
        fs::remove_dir_all(storage.dir()).unwrap();
    }

    #[test]
    fn test_loss_restarts_level_after_pause() {
        let storage = single_maze_storage(vec![vec![0, 0, 0, 0], vec![4, 1, 2, 0], vec![0, 0, 0, 0]]);
        let mut flow = GameFlow::new(storage.clone(), StdRng::seed_from_u64(2), None).unwrap();
        let start = Instant::now();
        flow.handle_key(GameKey::Confirm, start).unwrap();

        let right = MovementInput::towards(Direction::Right);
        let mut lost_at = None;
        for frame in 1..=80 {
            let now = ms(start, frame * 16);
            flow.update(now, right).unwrap();
            if let Screen::Level { session, .. } = flow.screen() {
                if session.state() == SessionState::Lost {
                    lost_at = Some(now);
                    break;
                }
            }
        }
        let lost_at = lost_at.expect("enemy never reached the player");
        assert!(flow.title().contains("caught"));

        flow.update(lost_at + OUTCOME_PAUSE, MovementInput::default()).unwrap();
        let Screen::Level { session, ended_at, .. } = flow.screen() else {
            panic!("left the level after losing");
        };
        assert_eq!(session.state(), SessionState::Playing);
        assert!(ended_at.is_none());
        fs::remove_dir_all(storage.dir()).unwrap();
    }

    #[test]
    fn test_unknown_world_is_an_error() {
        let storage = single_maze_storage(vec![vec![0, 4, 0], vec![0, 3, 0], vec![0, 0, 0]]);
        let result = GameFlow::new(storage.clone(), StdRng::seed_from_u64(3), Some("nope"));
        assert!(matches!(result, Err(MazeError::WorldNotFound { .. })));
        fs::remove_dir_all(storage.dir()).unwrap();
    }
}
