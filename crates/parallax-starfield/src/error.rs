//! Starfield construction errors.

/// Errors raised when a [`FieldSettings`](crate::FieldSettings) cannot drive an engine.
///
/// Only construction can fail. Once built, coverage and animation never error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// No layers were configured.
    #[error("starfield needs at least one layer")]
    NoLayers,

    /// Tile side length is zero, negative, or not finite.
    #[error("tile size must be a positive finite number, got {0}")]
    InvalidTileSize(f32),

    /// Palette must hold at least one color.
    #[error("palette size must be at least 1")]
    EmptyPalette,

    /// Speed variance outside `[0, 2]` would allow negative star speeds.
    #[error("speed variance must be within [0, 2], got {0}")]
    InvalidSpeedVariance(f32),

    /// A layer definition carries an out-of-range value.
    #[error("layer {index}: {reason}")]
    InvalidLayer {
        /// Position of the offending layer (0 = nearest).
        index: usize,
        /// Which field is invalid.
        reason: &'static str,
    },
}
