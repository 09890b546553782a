//! Command-line options and gameplay constants.

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Side length of a maze cell in pixels.
pub const CELL_SIZE: f32 = 50.0;
/// Bounding radius of the player.
pub const PLAYER_RADIUS: f32 = 18.0;
/// Bounding radius of an enemy.
pub const ENEMY_RADIUS: f32 = 14.0;
/// Pickup radius of a coin.
pub const COIN_RADIUS: f32 = 6.0;
/// Pickup radius of a power-up.
pub const POWER_UP_RADIUS: f32 = 10.0;
/// Player speed in pixels per millisecond.
pub const PLAYER_SPEED: f32 = 0.25;
/// Enemy speed in pixels per millisecond.
pub const ENEMY_SPEED: f32 = 0.125;
/// Scale applied to both components of diagonal player movement.
pub const DIAGONAL_FACTOR: f32 = 0.75;
/// Distance at which an enemy counts as having reached its target.
pub const ENEMY_TARGET_EPSILON: f32 = 2.0;
/// Interior rows and cols drawn for each tile's maze.
pub const MAZE_SIZE_RANGE: RangeInclusive<usize> = 2..=14;
/// `[rows, cols]` of the first world.
pub const INITIAL_WORLD_SIZE: [usize; 2] = [3, 3];
/// Carving attempts per tile before accepting a maze with missing doors.
pub const MAX_DOOR_ATTEMPTS: usize = 16;
/// Longest frame delta fed to the simulation, in milliseconds.
pub const MAX_DELTA_MS: f32 = 100.0;
/// Longest single simulation step, in milliseconds. Longer ticks are split.
///
/// Wall flags only catch a circle whose centre is within `PLAYER_RADIUS` of
/// an edge, so one step must move the player less than that band.
pub const MAX_STEP_MS: f32 = 16.0;

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding worlds.json and maps.json
    #[arg(long, default_value = "saves")]
    pub save_dir: PathBuf,

    /// Seed for every random generator (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Archive existing progress and start from a fresh first world
    #[arg(long)]
    pub reset: bool,

    /// Open this world id directly instead of the latest one
    #[arg(long)]
    pub world: Option<String>,

    /// Initial window width
    #[arg(long, default_value_t = 1360)]
    pub width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 768)]
    pub height: u32,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("saves"),
            seed: None,
            reset: false,
            world: None,
            width: 1360,
            height: 768,
        }
    }
}

impl Args {
    /// Random generator honouring `--seed`.
    pub fn make_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_parse_defaults() {
        let args = Args::parse_from(["mazeworld"]);
        assert_eq!(args.save_dir, PathBuf::from("saves"));
        assert_eq!(args.seed, None);
        assert!(!args.reset);
        assert_eq!((args.width, args.height), (1360, 768));
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "mazeworld",
            "--save-dir",
            "/tmp/mw",
            "--seed",
            "42",
            "--reset",
            "--world",
            "abc",
        ]);
        assert_eq!(args.save_dir, PathBuf::from("/tmp/mw"));
        assert_eq!(args.seed, Some(42));
        assert!(args.reset);
        assert_eq!(args.world.as_deref(), Some("abc"));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let args = Args {
            seed: Some(9),
            ..Args::default()
        };
        let a: u64 = args.make_rng().r#gen();
        let b: u64 = args.make_rng().r#gen();
        assert_eq!(a, b);
    }
}
