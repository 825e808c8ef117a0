//! The starfield engine: coverage, animation, and draw output for all layers.
//!
//! The engine performs no scheduling of its own. The host calls
//! [`StarfieldEngine::tick`] (or [`ensure_coverage`](StarfieldEngine::ensure_coverage)
//! followed by [`advance`](StarfieldEngine::advance)) once per frame with the
//! time elapsed since the previous frame, then paints the sprites.

use glam::{UVec2, Vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::FieldError;
use crate::layer::{Layer, LayerDefinition};
use crate::palette::{GradientDef, build_palette};
use crate::star::StarSprite;
use crate::tile::TileExtent;

/// Construction-time configuration of a starfield.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSettings {
    /// Layers ordered nearest first.
    pub layers: Vec<LayerDefinition>,
    /// Side length of a tile in pixels.
    pub tile_size: f32,
    /// Number of hues per layer.
    pub palette_size: u32,
    /// Relative spread of per-star speed around the layer speed.
    pub speed_variance: f32,
}

impl FieldSettings {
    /// Derive settings from a density grid and a scatter coefficient.
    ///
    /// Tiles grow by `sqrt(scatter)` per side and each layer's density by
    /// `scatter`, which keeps stars per area constant while breaking up the
    /// visible regularity of one star per small cell.
    pub fn scattered(
        density_tile_size: f32,
        scatter_coefficient: u32,
        palette_size: u32,
        speed_variance: f32,
        base_layers: &[LayerDefinition],
    ) -> Self {
        let scatter = scatter_coefficient.max(1);
        Self {
            layers: base_layers
                .iter()
                .enumerate()
                .map(|(index, layer)| LayerDefinition {
                    index,
                    density: layer.density * scatter,
                    ..*layer
                })
                .collect(),
            tile_size: density_tile_size * (scatter as f32).sqrt(),
            palette_size,
            speed_variance,
        }
    }

    /// Largest star radius across all layers.
    pub fn max_radius(&self) -> f32 {
        self.layers
            .iter()
            .map(|layer| layer.radius)
            .fold(0.0, f32::max)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.layers.is_empty() {
            return Err(FieldError::NoLayers);
        }
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(FieldError::InvalidTileSize(self.tile_size));
        }
        if self.palette_size == 0 {
            return Err(FieldError::EmptyPalette);
        }
        if !(0.0..=2.0).contains(&self.speed_variance) {
            return Err(FieldError::InvalidSpeedVariance(self.speed_variance));
        }
        for (index, layer) in self.layers.iter().enumerate() {
            let reason = if !(0.0..=1.0).contains(&layer.brightness) {
                Some("brightness must be within [0, 1]")
            } else if !layer.radius.is_finite() || layer.radius < 0.0 {
                Some("radius must be finite and non-negative")
            } else if !layer.speed.is_finite() || layer.speed < 0.0 {
                Some("speed must be finite and non-negative")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(FieldError::InvalidLayer { index, reason });
            }
        }
        Ok(())
    }
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self::scattered(
            100.0,
            3,
            10,
            0.8,
            &[
                LayerDefinition::new(0, 1.0, 1, 2.5, 4.0),
                LayerDefinition::new(1, 0.5, 2, 2.0, 2.0),
                LayerDefinition::new(2, 0.25, 3, 1.5, 1.0),
            ],
        )
    }
}

/// Summary of one [`StarfieldEngine::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tiles_materialized: usize,
    pub stars_culled: usize,
    pub live_stars: usize,
    pub visible_stars: usize,
}

/// Owns every layer of one starfield instance.
pub struct StarfieldEngine<R = SmallRng> {
    settings: FieldSettings,
    layers: Vec<Layer>,
    palette: Vec<GradientDef>,
    max_radius: f32,
    viewport: UVec2,
    rng: R,
}

impl StarfieldEngine {
    /// Create an engine with an OS-seeded random source.
    pub fn new(settings: FieldSettings) -> Result<Self, FieldError> {
        Self::with_rng(settings, SmallRng::from_os_rng())
    }
}

impl<R: Rng> StarfieldEngine<R> {
    /// Create an engine drawing randomness from `rng`.
    pub fn with_rng(settings: FieldSettings, rng: R) -> Result<Self, FieldError> {
        settings.validate()?;

        let definitions: Vec<LayerDefinition> = settings
            .layers
            .iter()
            .enumerate()
            .map(|(index, layer)| LayerDefinition { index, ..*layer })
            .collect();
        let palette = build_palette(&definitions, settings.palette_size);
        let max_radius = settings.max_radius();
        let layers = definitions.into_iter().map(Layer::new).collect();

        log::info!(
            "starfield: {} layers, tile {:.1}px, {} gradients",
            settings.layers.len(),
            settings.tile_size,
            palette.len()
        );

        Ok(Self {
            settings,
            layers,
            palette,
            max_radius,
            viewport: UVec2::ZERO,
            rng,
        })
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Gradient definitions, one per `(layer, color)`. Register these with the
    /// renderer before drawing any sprite.
    pub fn palette(&self) -> &[GradientDef] {
        &self.palette
    }

    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    /// Viewport most recently passed to [`ensure_coverage`](Self::ensure_coverage).
    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    /// Make sure every layer has stars for a `width` x `height` viewport.
    ///
    /// Only missing tiles are created; a repeated call with the same or a
    /// smaller viewport creates nothing. A zero dimension means there is
    /// nothing to cover yet. Returns the number of tiles created.
    pub fn ensure_coverage(&mut self, width: u32, height: u32) -> usize {
        if width == 0 || height == 0 {
            return 0;
        }

        let viewport = UVec2::new(width, height);
        let limit = self.visible_limit(viewport);
        let tile_size = self.settings.tile_size;
        let target = TileExtent::covering(width, height, self.max_radius, tile_size);

        let mut created = 0;
        for layer in &mut self.layers {
            layer.retire_scrolled_rows(tile_size);
            created += layer
                .materialize(target, &self.settings, limit, &mut self.rng)
                .len();
        }

        if viewport != self.viewport {
            log::debug!(
                "starfield viewport {}x{} -> {}x{}",
                self.viewport.x,
                self.viewport.y,
                width,
                height
            );
            for layer in &mut self.layers {
                layer.refresh_visibility(limit);
            }
            self.viewport = viewport;
        }
        created
    }

    /// Scroll every star by `elapsed_seconds` and cull the ones that left
    /// through the top. Returns the number of stars culled.
    ///
    /// Zero, negative, or non-finite elapsed time changes nothing.
    pub fn advance(&mut self, elapsed_seconds: f32) -> usize {
        if !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
            return 0;
        }
        let limit = self.visible_limit(self.viewport);
        self.layers
            .iter_mut()
            .map(|layer| layer.advance(elapsed_seconds, limit))
            .sum()
    }

    /// One frame: coverage first, then motion, so newly exposed area is
    /// never drawn empty.
    pub fn tick(&mut self, width: u32, height: u32, elapsed_seconds: f32) -> TickReport {
        let tiles_materialized = self.ensure_coverage(width, height);
        let stars_culled = self.advance(elapsed_seconds);
        TickReport {
            tiles_materialized,
            stars_culled,
            live_stars: self.live_star_count(),
            visible_stars: self.visible_sprites().count(),
        }
    }

    pub fn live_star_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.stars().len()).sum()
    }

    /// Every live star, hidden ones included, farthest layer first so nearer
    /// layers paint on top.
    pub fn sprites(&self) -> impl Iterator<Item = StarSprite> + '_ {
        self.layers.iter().rev().flat_map(Layer::sprites)
    }

    pub fn visible_sprites(&self) -> impl Iterator<Item = StarSprite> + '_ {
        self.sprites().filter(|sprite| sprite.visible)
    }

    fn visible_limit(&self, viewport: UVec2) -> Vec2 {
        viewport.as_vec2() + Vec2::splat(self.max_radius)
    }
}
