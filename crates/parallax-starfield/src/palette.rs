//! Star colors: a small fixed set of radial gradients per layer.
//!
//! Stars carry only a palette index. Each `(layer, color)` pair maps to one
//! gradient, so the number of distinct visual styles is bounded by
//! `layers * palette_size` no matter how many stars are alive.

use std::fmt;

use crate::layer::LayerDefinition;

/// Saturation used for every palette hue, in percent.
pub const PALETTE_SATURATION: f32 = 80.0;
/// Lightness used for every palette hue, in percent.
pub const PALETTE_LIGHTNESS: f32 = 85.0;

/// Reference from a star to its gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaletteRef {
    pub layer: usize,
    pub color: u32,
}

impl PaletteRef {
    pub fn new(layer: usize, color: u32) -> Self {
        Self { layer, color }
    }
}

impl fmt::Display for PaletteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}-color-{}", self.layer, self.color)
    }
}

/// One color stop of a radial gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the radius in `[0, 1]`.
    pub offset: f32,
    pub color: [u8; 3],
    pub opacity: f32,
}

impl GradientStop {
    /// Color as `#rrggbb`.
    pub fn hex(&self) -> String {
        rgb_to_hex(self.color)
    }
}

/// A centered radial gradient that fades a tinted core out to transparent white.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientDef {
    pub id: PaletteRef,
    /// Center in object bounding box units.
    pub center: [f32; 2],
    /// Radius in object bounding box units.
    pub radius: f32,
    pub inner: GradientStop,
    pub outer: GradientStop,
}

impl GradientDef {
    /// Gradient for `color_index` out of `palette_size` hues on `layer`.
    ///
    /// Hues are spread evenly around the wheel; layer brightness becomes the
    /// opacity of the core.
    pub fn for_layer(layer: &LayerDefinition, color_index: u32, palette_size: u32) -> Self {
        let hue = color_index as f32 / palette_size.max(1) as f32 * 360.0;
        Self {
            id: PaletteRef::new(layer.index, color_index),
            center: [0.5, 0.5],
            radius: 0.5,
            inner: GradientStop {
                offset: 0.0,
                color: hsl_to_rgb(hue, PALETTE_SATURATION, PALETTE_LIGHTNESS),
                opacity: layer.brightness,
            },
            outer: GradientStop {
                offset: 1.0,
                color: [0xff, 0xff, 0xff],
                opacity: 0.0,
            },
        }
    }

    /// Color and opacity at normalized distance `t` from the center.
    ///
    /// Values outside the stops are padded with the nearest stop.
    pub fn sample(&self, t: f32) -> ([f32; 3], f32) {
        let span = (self.outer.offset - self.inner.offset).max(f32::EPSILON);
        let k = ((t - self.inner.offset) / span).clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * k) / 255.0;
        let color = [
            mix(self.inner.color[0], self.outer.color[0]),
            mix(self.inner.color[1], self.outer.color[1]),
            mix(self.inner.color[2], self.outer.color[2]),
        ];
        let opacity = self.inner.opacity + (self.outer.opacity - self.inner.opacity) * k;
        (color, opacity)
    }
}

/// Builds the full palette, ordered by layer then color index.
pub fn build_palette(layers: &[LayerDefinition], palette_size: u32) -> Vec<GradientDef> {
    layers
        .iter()
        .flat_map(|layer| {
            (0..palette_size).map(move |color| GradientDef::for_layer(layer, color, palette_size))
        })
        .collect()
}

/// Convert HSL (hue in degrees, saturation and lightness in percent) to 8-bit RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let l = (lightness / 100.0).clamp(0.0, 1.0);
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let a = s * l.min(1.0 - l);
    let hue = hue.rem_euclid(360.0);
    let channel = |n: f32| {
        let k = (n + hue / 30.0) % 12.0;
        let value = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (255.0 * value).round().clamp(0.0, 255.0) as u8
    };
    [channel(0.0), channel(8.0), channel(4.0)]
}

/// Convert HSL to a `#rrggbb` string.
pub fn hsl_to_hex(hue: f32, saturation: f32, lightness: f32) -> String {
    rgb_to_hex(hsl_to_rgb(hue, saturation, lightness))
}

fn rgb_to_hex([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}
