//! Renders the parallax homepage headlessly.
//!
//! Configuration is loaded from `config.ron` in the platform config directory
//! (or `--config`) and can be overridden via CLI flags, e.g.
//! `parallax --width 1920 --height 1080 --frames 300 --png`.

use anyhow::Context;
use clap::Parser;
use parallax_app::PlatformDirs;
use parallax_config::{CliArgs, Config};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let dirs = match &args.config {
        Some(root) => PlatformDirs::resolve_with_root(root),
        None => PlatformDirs::resolve().context("resolving platform directories")?,
    };
    dirs.create_dirs()
        .context("creating configuration directories")?;

    let mut config = Config::load_or_create(&dirs.config_dir)
        .with_context(|| format!("loading config from {}", dirs.config_dir.display()))?;
    config.apply_cli_overrides(&args);

    let log_to_file = config.debug.log_to_file;
    parallax_log::init_logging(
        log_to_file.then_some(dirs.log_dir.as_path()),
        cfg!(debug_assertions) || log_to_file,
        Some(&config),
    );
    info!(
        config = %dirs.config_dir.display(),
        output = %config.render.output_dir.display(),
        "parallax starting"
    );

    let summary = parallax_app::run(&config).context("rendering starfield")?;
    info!(
        frames = summary.frames,
        files = summary.files_written,
        "done"
    );
    Ok(())
}
