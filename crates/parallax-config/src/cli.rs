//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Parallax homepage renderer command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "parallax", about = "Render the parallax starfield homepage")]
pub struct CliArgs {
    /// Viewport width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Host frame rate (0 = unthrottled).
    #[arg(long)]
    pub fps: Option<u32>,

    /// Directory for written frames.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also write PNG frames.
    #[arg(long)]
    pub png: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(frames) = args.frames {
            self.render.frames = frames;
        }
        if let Some(fps) = args.fps {
            self.render.target_fps = fps;
        }
        if let Some(ref dir) = args.output {
            self.render.output_dir = dir.clone();
        }
        if args.png {
            self.render.write_png = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
