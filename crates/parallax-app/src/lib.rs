//! Headless host for the parallax homepage.
//!
//! Stands in for the browser: schedules frames, feeds the starfield the
//! viewport and elapsed time, and renders the page to SVG or PNG.

pub mod frame;
pub mod host;
pub mod output;
pub mod platform;
pub mod raster;
pub mod svg;
pub mod view;

pub use frame::{FrameClock, FrameHandle, FrameScheduler, MAX_FRAME_TIME};
pub use host::{HostError, Pacing, RunSummary, run, run_view, viewport_at};
pub use output::{FrameWriter, OutputError};
pub use platform::{PlatformDirs, PlatformError};
pub use view::{Frame, ParallaxView};
