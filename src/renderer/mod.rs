//! Main renderer module.
//!
//! Everything is drawn as rounded rectangles through one pipeline; the
//! scene module decides what those rectangles are for each screen.

/// Batched rounded-rectangle pipeline.
pub mod rectangle;
/// Game state to rectangles.
pub mod scene;
/// Core WGPU setup and frame submission.
pub mod wgpu_lib;
