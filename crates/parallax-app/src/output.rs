//! Writing rendered frames to disk.

use std::path::{Path, PathBuf};

use glam::UVec2;
use parallax_starfield::{GradientDef, StarSprite};
use tracing::debug;

use crate::raster::{encode_png, rasterize};
use crate::svg::render_page;

/// Errors raised while writing frames.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Creating the output directory or writing a file failed.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// PNG encoding failed.
    #[error("failed to encode png: {0}")]
    Png(#[from] png::EncodingError),
}

/// Which formats to write and where.
#[derive(Debug, Clone)]
pub struct FrameWriter {
    dir: PathBuf,
    svg: bool,
    png: bool,
}

impl FrameWriter {
    pub fn new(dir: impl Into<PathBuf>, svg: bool, png: bool) -> Self {
        Self {
            dir: dir.into(),
            svg,
            png,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.svg || self.png
    }

    /// Write frame `index` in every enabled format. Returns the written paths.
    pub fn write(
        &self,
        index: u64,
        palette: &[GradientDef],
        sprites: &[StarSprite],
        viewport: UVec2,
        title: &str,
        time: f32,
    ) -> Result<Vec<PathBuf>, OutputError> {
        if !self.is_enabled() || viewport.x == 0 || viewport.y == 0 {
            return Ok(Vec::new());
        }
        std::fs::create_dir_all(&self.dir).map_err(|source| OutputError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut written = Vec::new();
        if self.svg {
            let path = self.dir.join(format!("frame-{index:05}.svg"));
            let page = render_page(palette, sprites.iter().copied(), viewport, title);
            write_file(&path, page.as_bytes())?;
            written.push(path);
        }
        if self.png {
            let path = self.dir.join(format!("frame-{index:05}.png"));
            let canvas = rasterize(palette, sprites.iter().copied(), viewport, time);
            write_file(&path, &encode_png(&canvas)?)?;
            written.push(path);
        }
        debug!(index, files = written.len(), "frame written");
        Ok(written)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    std::fs::write(path, bytes).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
