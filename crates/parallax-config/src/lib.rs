//! Configuration for the parallax homepage renderer.
//!
//! Settings persist to disk as RON and accept CLI overrides via clap. They are
//! read once at startup; the starfield is fixed for the life of a run. Missing
//! fields fall back to defaults so old files keep loading as new settings are
//! added.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, LayerConfig, RenderConfig, StarfieldConfig, WindowConfig,
};
pub use error::ConfigError;
