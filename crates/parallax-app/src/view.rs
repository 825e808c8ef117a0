//! The parallax background as a mountable view.
//!
//! A view owns one [`StarfieldEngine`] and drives it from the host's frame
//! callbacks. It re-requests a frame every time it runs and cancels the
//! outstanding request on unmount, so no frame loop outlives the view.

use glam::UVec2;
use parallax_starfield::{FieldError, FieldSettings, StarfieldEngine, TickReport};
use rand::Rng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::frame::{FrameClock, FrameHandle, FrameScheduler};

/// What a view produced for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Frames handled by this view so far, starting at 1.
    pub index: u64,
    pub timestamp: f64,
    pub elapsed: f64,
    pub viewport: UVec2,
    pub report: TickReport,
}

pub struct ParallaxView<R = SmallRng> {
    engine: StarfieldEngine<R>,
    clock: FrameClock,
    pending: Option<FrameHandle>,
    title: String,
}

impl ParallaxView {
    pub fn new(settings: FieldSettings, title: impl Into<String>) -> Result<Self, FieldError> {
        Ok(Self::with_engine(StarfieldEngine::new(settings)?, title))
    }
}

impl<R: Rng> ParallaxView<R> {
    pub fn with_engine(engine: StarfieldEngine<R>, title: impl Into<String>) -> Self {
        Self {
            engine,
            clock: FrameClock::new(),
            pending: None,
            title: title.into(),
        }
    }

    pub fn engine(&self) -> &StarfieldEngine<R> {
        &self.engine
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_mounted(&self) -> bool {
        self.pending.is_some()
    }

    /// Start the frame loop. Mounting twice keeps the existing request.
    pub fn mount(&mut self, scheduler: &mut FrameScheduler, timestamp: f64) {
        if self.pending.is_some() {
            return;
        }
        self.clock.start(timestamp);
        self.pending = Some(scheduler.request_frame());
        info!("parallax view mounted");
    }

    /// Run one frame if `handle` is this view's pending request.
    ///
    /// Coverage is brought up to `viewport` before stars move, then the next
    /// frame is requested. Returns `None` for handles that belong to someone
    /// else or were cancelled.
    pub fn on_frame(
        &mut self,
        scheduler: &mut FrameScheduler,
        handle: FrameHandle,
        timestamp: f64,
        viewport: UVec2,
    ) -> Option<Frame> {
        if self.pending != Some(handle) {
            return None;
        }

        let elapsed = self.clock.tick(timestamp);
        let report = self.engine.tick(viewport.x, viewport.y, elapsed as f32);
        if report.tiles_materialized > 0 {
            debug!(
                tiles = report.tiles_materialized,
                live = report.live_stars,
                "coverage extended for {}x{}",
                viewport.x,
                viewport.y
            );
        }

        self.pending = Some(scheduler.request_frame());
        Some(Frame {
            index: self.clock.frame_count(),
            timestamp,
            elapsed,
            viewport,
            report,
        })
    }

    /// Stop the frame loop. The engine state stays intact.
    pub fn unmount(&mut self, scheduler: &mut FrameScheduler) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
            info!(
                frames = self.clock.frame_count(),
                live = self.engine.live_star_count(),
                "parallax view unmounted"
            );
        }
    }
}
