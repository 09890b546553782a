//! Application module.
//!
//! Connects the window to the game.
//!
//! # Module Structure
//!
//! - [`app_state`]: [`AppState`], the renderer, pressed keys and game flow
//! - [`event_handler`]: [`App`], the winit event handler
//! - [`flow`]: [`flow::GameFlow`], screen transitions between world generation,
//!   the world map and level play
//!
//! # Event Flow
//!
//! 1. **Input Events**: key presses reach the flow once; held keys form the
//!    movement input read every frame
//! 2. **State Updates**: each redraw advances the current screen by the
//!    frame's delta time
//! 3. **Rendering**: the current screen is turned into rectangles and drawn

pub mod app_state;
pub mod event_handler;
pub mod flow;

pub use app_state::AppState;
pub use event_handler::App;
