//! CPU rasterization of a starfield frame into an RGBA image.
//!
//! Each visible star is painted as a disc filled with its radial gradient and
//! composited source-over onto black. The title is not rasterized.

use std::collections::HashMap;

use glam::{UVec2, Vec2};
use parallax_starfield::star::PULSE_PERIOD;
use parallax_starfield::{GradientDef, PaletteRef, StarSprite};

use crate::output::OutputError;

/// Linear RGB pixel buffer.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pixels: Vec<[f32; 3]>,
}

impl Canvas {
    /// Black canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 3]; width as usize * height as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 3]> {
        if x < self.width && y < self.height {
            Some(self.pixels[pixel_index(self.width, x, y)])
        } else {
            None
        }
    }

    fn blend(&mut self, x: u32, y: u32, color: [f32; 3], alpha: f32) {
        let pixel = &mut self.pixels[pixel_index(self.width, x, y)];
        for c in 0..3 {
            pixel[c] = pixel[c] * (1.0 - alpha) + color[c] * alpha;
        }
    }

    /// Opaque RGBA8 bytes, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.push((pixel[0].clamp(0.0, 1.0) * 255.0) as u8);
            bytes.push((pixel[1].clamp(0.0, 1.0) * 255.0) as u8);
            bytes.push((pixel[2].clamp(0.0, 1.0) * 255.0) as u8);
            bytes.push(255);
        }
        bytes
    }

    /// Number of pixels that are not pure black.
    pub fn lit_pixels(&self) -> usize {
        self.pixels
            .iter()
            .filter(|p| p[0] > 0.0 || p[1] > 0.0 || p[2] > 0.0)
            .count()
    }
}

/// Row-major offset of `(x, y)`, computed in `usize` so wide canvases do not
/// wrap.
fn pixel_index(width: u32, x: u32, y: u32) -> usize {
    y as usize * width as usize + x as usize
}

/// Opacity multiplier of the pulse animation at `time` for a star with `phase`.
///
/// Swings between 1.0 and 0.5 over one [`PULSE_PERIOD`].
pub fn pulse_factor(time: f32, phase: f32) -> f32 {
    let t = (time - phase) / PULSE_PERIOD;
    0.75 + 0.25 * (t * std::f32::consts::TAU).cos()
}

/// Paint `sprites` into a canvas the size of `viewport`.
///
/// Hidden sprites and sprites whose gradient is missing from `palette` are
/// skipped.
pub fn rasterize(
    palette: &[GradientDef],
    sprites: impl IntoIterator<Item = StarSprite>,
    viewport: UVec2,
    time: f32,
) -> Canvas {
    let mut canvas = Canvas::new(viewport.x, viewport.y);
    let gradients: HashMap<PaletteRef, &GradientDef> =
        palette.iter().map(|gradient| (gradient.id, gradient)).collect();

    for sprite in sprites {
        if !sprite.visible || sprite.radius <= 0.0 {
            continue;
        }
        let Some(gradient) = gradients.get(&sprite.fill) else {
            continue;
        };
        let pulse = pulse_factor(time, sprite.phase);
        paint_disc(&mut canvas, gradient, sprite.position, sprite.radius, pulse);
    }
    canvas
}

fn paint_disc(canvas: &mut Canvas, gradient: &GradientDef, center: Vec2, radius: f32, pulse: f32) {
    if canvas.width == 0 || canvas.height == 0 {
        return;
    }
    let min = (center - Vec2::splat(radius)).floor().max(Vec2::ZERO);
    let max = (center + Vec2::splat(radius))
        .ceil()
        .min(Vec2::new(canvas.width as f32 - 1.0, canvas.height as f32 - 1.0));
    if min.x > max.x || min.y > max.y {
        return;
    }

    for y in min.y as u32..=max.y as u32 {
        for x in min.x as u32..=max.x as u32 {
            let sample = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let t = sample.distance(center) / radius;
            if t > 1.0 {
                continue;
            }
            let (color, opacity) = gradient.sample(t);
            let alpha = (opacity * pulse).clamp(0.0, 1.0);
            if alpha > 0.0 {
                canvas.blend(x, y, color, alpha);
            }
        }
    }
}

/// Encode a canvas as PNG.
pub fn encode_png(canvas: &Canvas) -> Result<Vec<u8>, OutputError> {
    let mut png_buf = Vec::new();
    {
        let mut encoder =
            png::Encoder::new(std::io::Cursor::new(&mut png_buf), canvas.width, canvas.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&canvas.to_rgba8())?;
    }
    Ok(png_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_starfield::{FieldSettings, LayerDefinition, StarfieldEngine};

    fn gradient() -> GradientDef {
        GradientDef::for_layer(&LayerDefinition::new(0, 1.0, 1, 4.0, 1.0), 0, 10)
    }

    fn sprite(position: Vec2, visible: bool) -> StarSprite {
        StarSprite {
            layer: 0,
            position,
            radius: 4.0,
            opacity: 1.0,
            fill: PaletteRef::new(0, 0),
            phase: 0.0,
            visible,
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_pixel_index_does_not_wrap() {
        // 70_000 * 70_000 exceeds u32::MAX.
        assert_eq!(pixel_index(70_000, 5, 70_000), 4_900_000_005);
        assert_eq!(pixel_index(20, 3, 2), 43);
    }

    #[test]
    fn test_pulse_factor_range() {
        assert!((pulse_factor(0.0, 0.0) - 1.0).abs() < 1e-6);
        assert!((pulse_factor(1.0, 0.0) - 0.5).abs() < 1e-6);
        for i in 0..100 {
            let f = pulse_factor(i as f32 * 0.037, 0.3);
            assert!((0.5..=1.0).contains(&f));
        }
    }

    #[test]
    fn test_star_lights_its_center() {
        let palette = [gradient()];
        let canvas = rasterize(&palette, [sprite(Vec2::new(10.0, 10.0), true)], UVec2::new(20, 20), 0.0);
        let center = canvas.pixel(9, 9).unwrap();
        assert!(center[0] > 0.5, "center should be bright, got {center:?}");
        assert_eq!(canvas.pixel(0, 0).unwrap(), [0.0; 3]);
        assert!(canvas.lit_pixels() > 10);
    }

    #[test]
    fn test_hidden_and_unknown_sprites_skipped() {
        let palette = [gradient()];
        let mut foreign = sprite(Vec2::new(10.0, 10.0), true);
        foreign.fill = PaletteRef::new(3, 3);
        let canvas = rasterize(
            &palette,
            [sprite(Vec2::new(10.0, 10.0), false), foreign],
            UVec2::new(20, 20),
            0.0,
        );
        assert_eq!(canvas.lit_pixels(), 0);
    }

    #[test]
    fn test_partially_offscreen_star_is_clipped() {
        let palette = [gradient()];
        let canvas = rasterize(&palette, [sprite(Vec2::new(-1.0, 19.0), true)], UVec2::new(20, 20), 0.0);
        assert!(canvas.lit_pixels() > 0);
        let far = rasterize(&palette, [sprite(Vec2::new(-50.0, 5.0), true)], UVec2::new(20, 20), 0.0);
        assert_eq!(far.lit_pixels(), 0);
    }

    #[test]
    fn test_png_encoding_has_signature() {
        let mut engine = StarfieldEngine::new(FieldSettings::default()).unwrap();
        engine.ensure_coverage(64, 48);
        let canvas = rasterize(engine.palette(), engine.sprites(), engine.viewport(), 0.0);
        assert_eq!(canvas.to_rgba8().len(), 64 * 48 * 4);
        let bytes = encode_png(&canvas).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
