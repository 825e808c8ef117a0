//! Individual stars and the draw records handed to the host.

use glam::Vec2;
use rand::Rng;

use crate::layer::LayerDefinition;
use crate::palette::PaletteRef;

/// Length of one pulse cycle in seconds. Star phases are spread across it.
pub const PULSE_PERIOD: f32 = 2.0;

/// A live star, owned by its layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    /// Position in layer-local pixels, origin at the top-left of the screen.
    pub position: Vec2,
    /// Palette index in `0..palette_size`, fixed at birth.
    pub color: u32,
    /// Upward velocity in pixels per second.
    pub speed: f32,
    /// Offset into the pulse cycle, in seconds.
    pub animation_delay: f32,
    /// Whether the star falls inside the drawable area.
    pub visible: bool,
}

impl Star {
    /// Spawn a star uniformly inside the square tile at `origin`.
    pub fn spawn<R: Rng>(
        definition: &LayerDefinition,
        origin: Vec2,
        tile_size: f32,
        palette_size: u32,
        speed_variance: f32,
        rng: &mut R,
    ) -> Self {
        let position = origin + Vec2::new(rng.random::<f32>(), rng.random::<f32>()) * tile_size;
        let color = rng.random_range(0..palette_size.max(1));
        let speed = jittered_speed(definition.speed, speed_variance, rng.random::<f32>());
        let animation_delay = rng.random::<f32>() * PULSE_PERIOD;
        Self {
            position,
            color,
            speed,
            animation_delay,
            visible: true,
        }
    }

    /// Recompute the visibility flag against the drawable limit `(max_x, max_y)`.
    pub fn update_visibility(&mut self, limit: Vec2) {
        self.visible = self.position.x <= limit.x && self.position.y <= limit.y;
    }

    pub fn sprite(&self, definition: &LayerDefinition) -> StarSprite {
        StarSprite {
            layer: definition.index,
            position: self.position,
            radius: definition.radius,
            opacity: definition.brightness,
            fill: PaletteRef::new(definition.index, self.color),
            phase: self.animation_delay,
            visible: self.visible,
        }
    }
}

/// Map a uniform `sample` in `[0, 1)` to a speed in `base * (1 +- variance / 2)`.
pub fn jittered_speed(base: f32, variance: f32, sample: f32) -> f32 {
    base - variance * base / 2.0 + sample * variance * base
}

/// Everything a host needs to paint one star.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarSprite {
    pub layer: usize,
    pub position: Vec2,
    pub radius: f32,
    pub opacity: f32,
    pub fill: PaletteRef,
    /// Pulse phase offset in seconds.
    pub phase: f32,
    /// Hidden sprites are kept alive but should not be drawn.
    pub visible: bool,
}
