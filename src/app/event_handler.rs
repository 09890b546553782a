//! Event handler module.
//!
//! Contains the App struct and its event handling logic.

use crate::app::app_state::AppState;
use crate::app::flow::{FlowAction, GameFlow};
use crate::error::{MazeError, Result};
use crate::game::keys::winit_key_to_game_key;
use log::{error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

/// Main application struct that manages the window lifecycle and event handling.
///
/// # Lifecycle
/// 1. Created with [`App::new`] holding an already loaded [`GameFlow`]
/// 2. `resumed` creates the window, surface and [`AppState`]
/// 3. Events are handled via [`ApplicationHandler`] until the window closes,
///    `Quit` is pressed or the shutdown flag is raised
pub struct App {
    /// The WGPU instance for graphics operations.
    pub instance: wgpu::Instance,
    /// The current application state, None until the window exists.
    pub state: Option<AppState>,
    /// The application window, None until created.
    pub window: Option<Arc<Window>>,
    /// Flow waiting for the window; moved into [`AppState`] on resume.
    pending_flow: Option<GameFlow>,
    size: PhysicalSize<u32>,
    shutdown: Arc<AtomicBool>,
    error: Option<MazeError>,
}

impl App {
    /// Creates an [`App`] that opens a `width x height` window for `flow`.
    ///
    /// Raising `shutdown` from another thread closes the window on the next event.
    pub fn new(flow: GameFlow, width: u32, height: u32, shutdown: Arc<AtomicBool>) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        Self {
            instance,
            state: None,
            window: None,
            pending_flow: Some(flow),
            size: PhysicalSize::new(width, height),
            shutdown,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<MazeError> {
        self.error.take()
    }

    /// Sets up the window surface and application state.
    async fn set_window(&mut self, window: Window) -> Result<()> {
        let window = Arc::new(window);
        let _ = window.request_inner_size(self.size);

        let surface = self
            .instance
            .create_surface(window.clone())
            .map_err(|err| MazeError::Renderer(format!("failed to create surface: {err}")))?;
        let flow = self
            .pending_flow
            .take()
            .ok_or_else(|| MazeError::Renderer("window resumed twice".to_string()))?;

        let state = AppState::new(
            &self.instance,
            surface,
            self.size.width,
            self.size.height,
            flow,
        )
        .await?;

        window.set_title(&state.flow.title());
        self.window.get_or_insert(window);
        self.state.get_or_insert(state);
        Ok(())
    }

    /// Records `err` and stops the event loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: MazeError) {
        error!("{err}");
        self.error = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.wgpu_renderer.cleanup();
        }
        event_loop.exit();
    }

    fn handle_key(&mut self, event: &KeyEvent) -> Result<FlowAction> {
        let Some(state) = self.state.as_mut() else {
            return Ok(FlowAction::Continue);
        };
        match event.state {
            ElementState::Pressed => match winit_key_to_game_key(&event.logical_key) {
                Some(key) => state.key_pressed(event.physical_key, key, Instant::now()),
                None => Ok(FlowAction::Continue),
            },
            ElementState::Released => {
                state.key_released(event.physical_key);
                Ok(FlowAction::Continue)
            }
        }
    }
}

impl ApplicationHandler for App {
    /// Creates the window and initializes the application state.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = match event_loop.create_window(Window::default_attributes()) {
            Ok(window) => window,
            Err(err) => {
                self.fail(event_loop, MazeError::Renderer(format!("failed to create window: {err}")));
                return;
            }
        };
        if let Err(err) = pollster::block_on(self.set_window(window)) {
            self.fail(event_loop, err);
        }
    }

    /// Handles keyboard input, resizes, close requests and redraws.
    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        if self.shutdown.load(Ordering::SeqCst) {
            info!("interrupted, closing window");
            self.shutdown(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("window closed");
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.resize_surface(size.width, size.height);
                }
            }
            WindowEvent::Focused(false) => {
                // Releases are lost while unfocused.
                if let Some(state) = self.state.as_mut() {
                    state.key_state.clear();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => match self.handle_key(&event) {
                Ok(FlowAction::Continue) => {}
                Ok(FlowAction::Quit) => {
                    info!("quit requested");
                    self.shutdown(event_loop);
                }
                Err(err) => self.fail(event_loop, err),
            },
            WindowEvent::RedrawRequested => {
                let (Some(state), Some(window)) = (self.state.as_mut(), self.window.as_ref())
                else {
                    return;
                };
                match state.redraw(window, Instant::now()) {
                    Ok(()) => window.request_redraw(),
                    Err(err) => self.fail(event_loop, err),
                }
            }
            _ => {}
        }
    }

    /// Polls the shutdown flag while no window events arrive.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.shutdown.load(Ordering::SeqCst) {
            info!("interrupted, closing window");
            self.shutdown(event_loop);
        }
    }
}
