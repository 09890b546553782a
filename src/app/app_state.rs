//! AppState module.
//!
//! This module defines the [`AppState`] struct, which holds everything a
//! running window needs: the GPU renderer, the pressed keys and the game flow.

use crate::app::flow::{FlowAction, GameFlow};
use crate::error::Result;
use crate::game::keys::{GameKey, KeyState};
use crate::renderer::wgpu_lib::WgpuRenderer;
use std::time::Instant;
use winit::keyboard::PhysicalKey;
use winit::window::Window;

/// Holds all state required for a running game window.
pub struct AppState {
    /// The WGPU renderer.
    pub wgpu_renderer: WgpuRenderer,
    /// The current input state (pressed keys).
    pub key_state: KeyState,
    /// Screens, saved progress and the running level.
    pub flow: GameFlow,
}

impl AppState {
    /// Asynchronously creates a new [`AppState`] with an initialized renderer.
    ///
    /// # Arguments
    /// - `instance`: The WGPU instance.
    /// - `surface`: The WGPU surface for rendering.
    /// - `width`: Initial window width.
    /// - `height`: Initial window height.
    /// - `flow`: Game flow loaded before the window opened.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
        flow: GameFlow,
    ) -> Result<Self> {
        let wgpu_renderer = WgpuRenderer::new(instance, surface, width, height).await?;
        Ok(Self {
            wgpu_renderer,
            key_state: KeyState::new(),
            flow,
        })
    }

    /// Resizes the WGPU surface and updates the configuration.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.wgpu_renderer.resize(width, height);
    }

    /// Records a key press; only the initial press of an action reaches the flow.
    pub fn key_pressed(
        &mut self,
        physical: PhysicalKey,
        key: GameKey,
        now: Instant,
    ) -> Result<FlowAction> {
        if self.key_state.press_key(physical, key) {
            self.flow.handle_key(key, now)
        } else {
            Ok(FlowAction::Continue)
        }
    }

    /// Records a key release.
    pub fn key_released(&mut self, physical: PhysicalKey) {
        self.key_state.release_key(physical);
    }

    /// Advances the flow and draws one frame.
    pub fn redraw(&mut self, window: &Window, now: Instant) -> Result<()> {
        self.flow.update(now, self.key_state.movement_input())?;
        let rectangles = self.flow.scene(self.wgpu_renderer.viewport());
        self.wgpu_renderer.render(rectangles)?;
        window.set_title(&self.flow.title());
        Ok(())
    }
}
