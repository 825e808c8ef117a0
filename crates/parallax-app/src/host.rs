//! Headless host: mounts a [`ParallaxView`], runs frames until the view is
//! torn down, and writes snapshots along the way.

use std::time::{Duration, Instant};

use glam::UVec2;
use parallax_config::Config;
use parallax_starfield::{FieldError, StarSprite, TickReport};
use rand::Rng;
use tracing::info;

use crate::frame::FrameScheduler;
use crate::output::{FrameWriter, OutputError};
use crate::view::ParallaxView;

/// Errors that end a host run.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("invalid starfield settings: {0}")]
    Field(#[from] FieldError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// How frame timestamps are produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pacing {
    /// Sleep between frames and read the wall clock.
    Realtime { fps: u32 },
    /// Run unthrottled with a fixed simulated step in seconds.
    Simulated { step: f64 },
}

impl Pacing {
    /// `0` means unthrottled at a simulated 60 Hz.
    pub fn from_fps(fps: u32) -> Self {
        if fps == 0 {
            Self::Simulated { step: 1.0 / 60.0 }
        } else {
            Self::Realtime { fps }
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub files_written: usize,
    pub final_viewport: UVec2,
    pub final_report: TickReport,
}

/// Viewport for frame `frame` of `frames`, growing linearly from `start`
/// toward `grow_to`. Never smaller than `start` and never shrinking.
pub fn viewport_at(start: UVec2, grow_to: Option<(u32, u32)>, frame: u32, frames: u32) -> UVec2 {
    let Some((gw, gh)) = grow_to else {
        return start;
    };
    let target = start.max(UVec2::new(gw, gh));
    let t = if frames <= 1 {
        1.0
    } else {
        f64::from(frame.min(frames - 1)) / f64::from(frames - 1)
    };
    let lerp = |a: u32, b: u32| a + (f64::from(b - a) * t).round() as u32;
    UVec2::new(lerp(start.x, target.x), lerp(start.y, target.y))
}

fn is_snapshot(index: u64, frames: u64, every: u32) -> bool {
    index == frames || (every > 0 && index % u64::from(every) == 0)
}

/// Build a view from `config` and run it to completion.
pub fn run(config: &Config) -> Result<RunSummary, HostError> {
    let view = ParallaxView::new(config.starfield.to_settings(), config.window.title.clone())?;
    run_view(view, config, Pacing::from_fps(config.render.target_fps))
}

/// Drive `view` for `config.render.frames` frames, then unmount it.
pub fn run_view<R: Rng>(
    mut view: ParallaxView<R>,
    config: &Config,
    pacing: Pacing,
) -> Result<RunSummary, HostError> {
    let render = &config.render;
    let frames = u64::from(render.frames);
    let start_viewport = UVec2::new(config.window.width, config.window.height);
    let writer = FrameWriter::new(&render.output_dir, render.write_svg, render.write_png);

    let mut summary = RunSummary {
        final_viewport: start_viewport,
        ..RunSummary::default()
    };
    if frames == 0 {
        return Ok(summary);
    }

    let mut scheduler = FrameScheduler::new();
    let started = Instant::now();
    view.mount(&mut scheduler, 0.0);
    info!(
        frames,
        width = start_viewport.x,
        height = start_viewport.y,
        "starting headless run"
    );

    let mut ran: u32 = 0;
    while !scheduler.is_idle() {
        let due = scheduler.take_due();
        let timestamp = match pacing {
            Pacing::Realtime { fps } => {
                let target = Duration::from_secs_f64(f64::from(ran + 1) / f64::from(fps));
                if let Some(wait) = target.checked_sub(started.elapsed()) {
                    std::thread::sleep(wait);
                }
                started.elapsed().as_secs_f64()
            }
            Pacing::Simulated { step } => f64::from(ran + 1) * step,
        };
        let viewport = viewport_at(start_viewport, render.grow_to, ran, render.frames);

        for handle in due {
            let Some(frame) = view.on_frame(&mut scheduler, handle, timestamp, viewport) else {
                continue;
            };
            ran += 1;
            summary.frames = frame.index;
            summary.final_viewport = frame.viewport;
            summary.final_report = frame.report;

            if is_snapshot(frame.index, frames, render.snapshot_every) && writer.is_enabled() {
                let engine = view.engine();
                let sprites: Vec<StarSprite> = engine.sprites().collect();
                let written = writer.write(
                    frame.index,
                    engine.palette(),
                    &sprites,
                    frame.viewport,
                    view.title(),
                    frame.timestamp as f32,
                )?;
                summary.files_written += written.len();
            }

            if frame.index >= frames {
                view.unmount(&mut scheduler);
            }
        }
    }

    info!(
        frames = summary.frames,
        files = summary.files_written,
        live = summary.final_report.live_stars,
        "headless run finished"
    );
    Ok(summary)
}
