//! WGPU renderer.
//!
//! [`WgpuRenderer`] owns the surface, device and queue plus the single
//! rectangle pipeline every screen draws through. Each frame the app hands
//! it the rectangles built by [`crate::renderer::scene`].

use crate::error::{MazeError, Result};
use crate::renderer::rectangle::{Rectangle, RectangleRenderer};
use crate::renderer::scene::BACKGROUND;
use log::{info, warn};

/// Surface, device and pipelines for the game window.
pub struct WgpuRenderer {
    /// The WGPU surface for presenting rendered frames.
    pub surface: wgpu::Surface<'static>,
    /// The surface configuration (format, size, etc.).
    pub surface_config: wgpu::SurfaceConfiguration,
    /// The WGPU device for resource creation.
    pub device: wgpu::Device,
    /// The WGPU queue for submitting commands.
    pub queue: wgpu::Queue,
    /// Batched rounded-rectangle pipeline.
    pub rectangle_renderer: RectangleRenderer,
}

impl WgpuRenderer {
    /// Initializes the adapter, device, surface configuration and pipeline.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let adapter = Self::create_adapter(instance, &surface).await?;
        let (device, queue) = Self::create_device(&adapter).await?;
        let surface_config = Self::create_surface_config(&surface, &adapter, width, height)?;

        surface.configure(&device, &surface_config);
        info!(
            "renderer ready: {:?}, {}x{}",
            surface_config.format, width, height
        );

        let rectangle_renderer = RectangleRenderer::new(
            &device,
            surface_config.format,
            width as f32,
            height as f32,
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            rectangle_renderer,
        })
    }

    /// Reconfigures the surface for a new window size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.rectangle_renderer.resize(width as f32, height as f32);
    }

    /// Current surface size in pixels.
    pub fn viewport(&self) -> (f32, f32) {
        (
            self.surface_config.width as f32,
            self.surface_config.height as f32,
        )
    }

    /// Clears the window and draws `rectangles` in order.
    ///
    /// An outdated or lost surface is reconfigured and the frame skipped.
    pub fn render(&mut self, rectangles: Vec<Rectangle>) -> Result<()> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                warn!("surface outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(err) => {
                return Err(MazeError::Renderer(format!(
                    "failed to acquire next swap chain texture: {err}"
                )));
            }
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.rectangle_renderer.set_rectangles(rectangles);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: BACKGROUND[0],
                            g: BACKGROUND[1],
                            b: BACKGROUND[2],
                            a: BACKGROUND[3],
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.rectangle_renderer
                .render(&self.device, &mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Waits for queued GPU work before shutdown.
    pub fn cleanup(&self) {
        let _ = self.device.poll(wgpu::Maintain::Wait);
    }

    async fn create_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'static>,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(surface),
            })
            .await
            .ok_or_else(|| MazeError::Renderer("no suitable graphics adapter".to_string()))
    }

    async fn create_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: Default::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|err| MazeError::Renderer(format!("failed to create device: {err}")))
    }

    fn create_surface_config(
        surface: &wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let capabilities = surface.get_capabilities(adapter);
        let format = capabilities
            .formats
            .iter()
            .find(|f| **f == wgpu::TextureFormat::Bgra8UnormSrgb)
            .or_else(|| capabilities.formats.iter().find(|f| f.is_srgb()))
            .or_else(|| capabilities.formats.first())
            .copied()
            .ok_or_else(|| MazeError::Renderer("surface reports no texture formats".to_string()))?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        })
    }
}
