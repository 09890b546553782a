//! Mazeworld - a 2D maze game on a map of mazes.
//!
//! Each world is a grid of tiles joined by corridors; every tile holds a
//! procedurally carved maze. Collect every coin in a maze while dodging its
//! enemies, then leave through a door to complete it and reveal the corridors
//! to neighbouring tiles. Completing every maze of a world unlocks a larger one.
//!
//! # Architecture
//! - `maze/`: grid indexing, blueprint format, maze carving, runtime cells
//! - `world/`: world tile generation, persisted records, progression rules
//! - `game/`: level session state machine, entities, collision, input
//! - `renderer/`: wgpu rectangle pipeline and scene building
//! - `app/`: window event handling and screen flow
//!
//! # Usage
//! `mazeworld --save-dir saves --seed 42`. Set `RUST_LOG=debug` for per-tick events.

#![warn(missing_docs)]
pub mod app;
pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod maze;
pub mod renderer;
pub mod scheduler;
pub mod storage;
pub mod world;

use crate::app::flow::GameFlow;
use crate::config::Args;
use crate::error::Result;
use crate::storage::Storage;
use clap::Parser;
use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use winit::event_loop::{ControlFlow, EventLoop};

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        error!("{err}");
        std::process::exit(1);
    }
}

/// Loads progress, opens the window and runs until it closes.
///
/// # Errors
/// Fails when the save directory is unusable, the requested world does not
/// exist, or the window and GPU cannot be set up.
fn run(args: Args) -> Result<()> {
    let storage = Storage::new(args.save_dir.clone());
    if args.reset {
        match storage.reset()? {
            Some(backup) => info!("previous progress archived to {}", backup.display()),
            None => info!("no saved progress to reset"),
        }
    }

    let flow = GameFlow::new(storage, args.make_rng(), args.world.as_deref())?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    if let Err(err) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("Ctrl-C handler not installed: {err}");
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new(flow, args.width, args.height, shutdown);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
