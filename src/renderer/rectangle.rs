//! Batched rounded-rectangle renderer.
//!
//! Everything on screen is a [`Rectangle`]: maze cells and map tiles are
//! squares, while items, the player and enemies are squares whose corner
//! radius equals half their side, which the fragment shader turns into a
//! circle. All rectangles queued for a frame go out in one indexed draw call.

use std::mem;
use wgpu::{
    self, BlendState, BufferUsages, ColorTargetState, ColorWrites, Device, FragmentState,
    MultisampleState, PrimitiveState, RenderPass, RenderPipeline, VertexAttribute,
    VertexBufferLayout, VertexFormat, VertexState, util::DeviceExt,
};

/// Per-vertex data; 48 bytes with the trailing padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    /// Normalized device coordinates.
    position: [f32; 2],
    /// RGBA, 0.0 to 1.0.
    color: [f32; 4],
    /// Pixel offset from the rectangle's top-left corner.
    uv: [f32; 2],
    /// Rectangle size in pixels.
    rect_size: [f32; 2],
    /// Corner radius in pixels.
    corner_radius: f32,
    _padding: f32,
}

impl Vertex {
    /// Buffer layout matching the inputs of `shaders/rectangle.wgsl`.
    ///
    /// - Location 0: Position (vec2)
    /// - Location 1: Color (vec4)
    /// - Location 2: UV (vec2)
    /// - Location 3: Rectangle size (vec2)
    /// - Location 4: Corner radius (float)
    fn desc<'a>() -> VertexBufferLayout<'a> {
        const F2: usize = mem::size_of::<[f32; 2]>();
        const F4: usize = mem::size_of::<[f32; 4]>();
        VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x2,
                },
                VertexAttribute {
                    offset: F2 as wgpu::BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x4,
                },
                VertexAttribute {
                    offset: (F2 + F4) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: VertexFormat::Float32x2,
                },
                VertexAttribute {
                    offset: (F2 + F4 + F2) as wgpu::BufferAddress,
                    shader_location: 3,
                    format: VertexFormat::Float32x2,
                },
                VertexAttribute {
                    offset: (F2 + F4 + F2 + F2) as wgpu::BufferAddress,
                    shader_location: 4,
                    format: VertexFormat::Float32,
                },
            ],
        }
    }
}

/// A screen-space rectangle; (0, 0) is the top-left of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// RGBA, 0.0 to 1.0.
    pub color: [f32; 4],
    /// Corner radius in pixels; 0.0 for sharp corners.
    pub corner_radius: f32,
}

impl Rectangle {
    /// Rectangle with sharp corners.
    pub fn new(x: f32, y: f32, width: f32, height: f32, color: [f32; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color,
            corner_radius: 0.0,
        }
    }

    /// Circle of `radius` centred on `(cx, cy)`.
    pub fn circle(cx: f32, cy: f32, radius: f32, color: [f32; 4]) -> Self {
        Self::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0, color)
            .with_corner_radius(radius)
    }

    /// Sets the corner radius for all four corners.
    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    /// Corner vertices in NDC for a `width x height` window, clockwise from top-left.
    fn vertices(&self, window_width: f32, window_height: f32) -> [Vertex; 4] {
        // Screen space has y down; NDC has y up.
        let x = (self.x / window_width) * 2.0 - 1.0;
        let y = 1.0 - (self.y / window_height) * 2.0;
        let w = (self.width / window_width) * 2.0;
        let h = -(self.height / window_height) * 2.0;

        let corner = |position: [f32; 2], uv: [f32; 2]| Vertex {
            position,
            color: self.color,
            uv,
            rect_size: [self.width, self.height],
            corner_radius: self.corner_radius,
            _padding: 0.0,
        };
        [
            corner([x, y], [0.0, 0.0]),
            corner([x + w, y], [self.width, 0.0]),
            corner([x + w, y + h], [self.width, self.height]),
            corner([x, y + h], [0.0, self.height]),
        ]
    }
}

/// Renders a batch of [`Rectangle`]s in one draw call.
pub struct RectangleRenderer {
    render_pipeline: RenderPipeline,
    rectangles: Vec<Rectangle>,
    window_width: f32,
    window_height: f32,
}

impl RectangleRenderer {
    /// Builds the pipeline for `surface_format` with alpha blending enabled.
    pub fn new(device: &Device, surface_format: wgpu::TextureFormat, width: f32, height: f32) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Rectangle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/rectangle.wgsl").into()),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Rectangle Pipeline Layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Rectangle Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Self {
            render_pipeline,
            rectangles: Vec::new(),
            window_width: width,
            window_height: height,
        }
    }

    /// Replaces the queued rectangles for the next draw.
    pub fn set_rectangles(&mut self, rectangles: Vec<Rectangle>) {
        self.rectangles = rectangles;
    }

    /// Updates the window size used for the NDC transform.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.window_width = width;
        self.window_height = height;
    }

    /// Draws every queued rectangle, back to front in queue order.
    pub fn render(&self, device: &Device, render_pass: &mut RenderPass) {
        if self.rectangles.is_empty() {
            return;
        }
        let (vertices, indices) =
            batch(&self.rectangles, self.window_width, self.window_height);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Rectangle Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Rectangle Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: BufferUsages::INDEX,
        });

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..indices.len() as u32, 0, 0..1);
    }
}

/// Vertices and triangle indices for `rectangles`, two triangles each.
fn batch(rectangles: &[Rectangle], width: f32, height: f32) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(rectangles.len() * 4);
    let mut indices = Vec::with_capacity(rectangles.len() * 6);
    for (i, rectangle) in rectangles.iter().enumerate() {
        vertices.extend_from_slice(&rectangle.vertices(width, height));
        let base = (i * 4) as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}
