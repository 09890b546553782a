//! Frame scheduler driving level ticks from the redraw loop.
//!
//! The scheduler does not own a thread or timer: the app calls
//! [`FrameScheduler::tick`] once per redraw with the current time and, while
//! running, receives the elapsed milliseconds since the previous tick.
//! Stopping suppresses every later tick until the scheduler is started again.

use crate::config::MAX_DELTA_MS;
use std::time::Instant;

/// Produces per-frame delta times while running.
#[derive(Debug, Default, Clone)]
pub struct FrameScheduler {
    last_tick: Option<Instant>,
    running: bool,
    frames: u64,
}

impl FrameScheduler {
    /// A stopped scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts ticking; the first tick after this measures from `now`.
    pub fn start(&mut self, now: Instant) {
        self.running = true;
        self.last_tick = Some(now);
        self.frames = 0;
    }

    /// Stops ticking. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
        self.last_tick = None;
    }

    /// Whether ticks are being produced.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks produced since the last start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Elapsed milliseconds since the previous tick, or `None` while stopped.
    ///
    /// Long stalls (window drags, breakpoints) are capped at [`MAX_DELTA_MS`]
    /// so entities never jump through walls.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        if !self.running {
            return None;
        }
        let previous = self.last_tick.replace(now).unwrap_or(now);
        let delta = now.saturating_duration_since(previous).as_secs_f32() * 1000.0;
        self.frames += 1;
        Some(delta.min(MAX_DELTA_MS))
    }
}
