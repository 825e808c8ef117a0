//! Parallax starfield: lazily tiled, depth-layered point lights that scroll
//! upward at per-layer speeds.
//!
//! The engine is host-agnostic. A host reports the viewport size, supplies the
//! elapsed time for each frame, and paints the [`StarSprite`] records it gets
//! back using the gradients from [`StarfieldEngine::palette`].

pub mod engine;
pub mod error;
pub mod layer;
pub mod palette;
pub mod star;
pub mod tile;

pub use engine::{FieldSettings, StarfieldEngine, TickReport};
pub use error::FieldError;
pub use layer::{Layer, LayerDefinition};
pub use palette::{GradientDef, GradientStop, PaletteRef, hsl_to_hex, hsl_to_rgb};
pub use star::{Star, StarSprite};
pub use tile::{TileCoord, TileExtent};
