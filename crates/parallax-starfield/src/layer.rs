//! Depth layers: each owns its stars, its tile coverage, and the vertical
//! travel accumulated since rows were last recycled.

use glam::Vec2;
use rand::Rng;

use crate::engine::FieldSettings;
use crate::star::{Star, StarSprite};
use crate::tile::{TileCoord, TileExtent};

/// Static description of one depth plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerDefinition {
    /// Stable identity; 0 is the nearest layer.
    pub index: usize,
    /// Core opacity of this layer's gradients, in `[0, 1]`.
    pub brightness: f32,
    /// Stars spawned per tile.
    pub density: u32,
    /// Drawn radius in pixels.
    pub radius: f32,
    /// Scroll rate in pixels per second. Nearer layers move faster.
    pub speed: f32,
}

impl LayerDefinition {
    pub fn new(index: usize, brightness: f32, density: u32, radius: f32, speed: f32) -> Self {
        Self {
            index,
            brightness,
            density,
            radius,
            speed,
        }
    }
}

/// Mutable state of one depth plane.
#[derive(Clone, Debug)]
pub struct Layer {
    definition: LayerDefinition,
    stars: Vec<Star>,
    /// Travel since the last recycled row, in pixels. Always below one tile
    /// after [`retire_scrolled_rows`](Self::retire_scrolled_rows).
    distance_traveled: f32,
    coverage: TileExtent,
    retired_rows: u64,
    tiles_materialized: u64,
}

impl Layer {
    pub fn new(definition: LayerDefinition) -> Self {
        Self {
            definition,
            stars: Vec::new(),
            distance_traveled: 0.0,
            coverage: TileExtent::EMPTY,
            retired_rows: 0,
            tiles_materialized: 0,
        }
    }

    pub fn definition(&self) -> &LayerDefinition {
        &self.definition
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn coverage(&self) -> TileExtent {
        self.coverage
    }

    pub fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }

    /// Rows that have scrolled past the top since the layer was created.
    pub fn retired_rows(&self) -> u64 {
        self.retired_rows
    }

    pub fn tiles_materialized(&self) -> u64 {
        self.tiles_materialized
    }

    /// Drop one covered row from the top for every whole tile of travel.
    ///
    /// The stars of that row have moved up by a tile, so the bottom of the
    /// covered region is now a tile short and must be refilled. Travel past
    /// every covered row empties the coverage and resets the accumulator.
    pub fn retire_scrolled_rows(&mut self, tile_size: f32) {
        if self.distance_traveled < tile_size {
            return;
        }
        let mut whole = (self.distance_traveled / tile_size).floor();
        if self.distance_traveled - whole * tile_size >= tile_size {
            // Division rounded just below an integer.
            whole += 1.0;
        }
        let covered = self.coverage.rows;

        if !whole.is_finite() || whole >= covered as f32 {
            self.retired_rows = self.retired_rows.saturating_add(u64::from(covered));
            self.coverage.rows = 0;
            self.distance_traveled = 0.0;
            log::debug!(
                "layer {}: scrolled past all {covered} covered rows",
                self.definition.index
            );
            return;
        }

        // whole < covered, so it fits in u32.
        let rows = whole as u32;
        self.distance_traveled = (self.distance_traveled - whole * tile_size).max(0.0);
        self.retired_rows = self.retired_rows.saturating_add(u64::from(rows));
        self.coverage.rows = covered - rows;
    }

    /// Grow coverage to at least `target`, spawning stars only in new tiles.
    ///
    /// Returns the coordinates of the tiles created by this call.
    pub fn materialize<R: Rng>(
        &mut self,
        target: TileExtent,
        settings: &FieldSettings,
        visible_limit: Vec2,
        rng: &mut R,
    ) -> Vec<TileCoord> {
        let previous = self.coverage;
        let next = previous.max(target);
        if next == previous {
            return Vec::new();
        }

        let tile_size = settings.tile_size;
        let mut created = Vec::new();
        for (column, row) in next.fresh_cells(previous) {
            let origin = Vec2::new(column as f32, row as f32) * tile_size;
            for _ in 0..self.definition.density {
                let mut star = Star::spawn(
                    &self.definition,
                    origin,
                    tile_size,
                    settings.palette_size,
                    settings.speed_variance,
                    rng,
                );
                star.update_visibility(visible_limit);
                self.stars.push(star);
            }
            created.push(TileCoord {
                column,
                row: self.retired_rows.saturating_add(u64::from(row)),
            });
        }

        self.coverage = next;
        self.tiles_materialized += created.len() as u64;
        log::debug!(
            "layer {}: materialized {} tiles, coverage {}x{}, {} live stars",
            self.definition.index,
            created.len(),
            next.columns,
            next.rows,
            self.stars.len()
        );
        created
    }

    /// Move every star up by its own speed, cull stars above the top edge,
    /// and refresh visibility of the rest. Returns the number culled.
    pub fn advance(&mut self, elapsed_seconds: f32, visible_limit: Vec2) -> usize {
        self.distance_traveled += self.definition.speed * elapsed_seconds;

        let radius = self.definition.radius;
        let before = self.stars.len();
        let mut i = 0;
        while i < self.stars.len() {
            let star = &mut self.stars[i];
            star.position.y -= star.speed * elapsed_seconds;
            if star.position.y + radius < 0.0 {
                self.stars.swap_remove(i);
                continue;
            }
            star.update_visibility(visible_limit);
            i += 1;
        }

        let culled = before - self.stars.len();
        if culled > 0 {
            log::trace!("layer {}: culled {culled} stars", self.definition.index);
        }
        culled
    }

    pub fn refresh_visibility(&mut self, visible_limit: Vec2) {
        for star in &mut self.stars {
            star.update_visibility(visible_limit);
        }
    }

    pub fn sprites(&self) -> impl Iterator<Item = StarSprite> + '_ {
        self.stars.iter().map(|star| star.sprite(&self.definition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn settings() -> FieldSettings {
        FieldSettings {
            layers: vec![LayerDefinition::new(0, 1.0, 3, 2.5, 4.0)],
            tile_size: 100.0,
            palette_size: 10,
            speed_variance: 0.8,
        }
    }

    fn far_limit() -> Vec2 {
        Vec2::splat(f32::MAX)
    }

    #[test]
    fn test_materialize_spawns_density_per_tile() {
        let settings = settings();
        let mut layer = Layer::new(settings.layers[0]);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let created = layer.materialize(TileExtent::new(2, 3), &settings, far_limit(), &mut rng);
        assert_eq!(created.len(), 6);
        assert_eq!(layer.stars().len(), 18);

        for coord in &created {
            let min = Vec2::new(coord.column as f32, coord.row as f32) * 100.0;
            let inside = layer
                .stars()
                .iter()
                .filter(|s| {
                    (min.x..min.x + 100.0).contains(&s.position.x)
                        && (min.y..min.y + 100.0).contains(&s.position.y)
                })
                .count();
            assert_eq!(inside, 3, "tile {coord:?} holds {inside} stars");
        }
    }

    #[test]
    fn test_materialize_same_target_is_noop() {
        let settings = settings();
        let mut layer = Layer::new(settings.layers[0]);
        let mut rng = ChaCha8Rng::seed_from_u64(12);

        layer.materialize(TileExtent::new(4, 4), &settings, far_limit(), &mut rng);
        let count = layer.stars().len();
        let created = layer.materialize(TileExtent::new(4, 4), &settings, far_limit(), &mut rng);
        assert!(created.is_empty());
        assert_eq!(layer.stars().len(), count);

        // Shrinking never removes coverage.
        let created = layer.materialize(TileExtent::new(1, 1), &settings, far_limit(), &mut rng);
        assert!(created.is_empty());
        assert_eq!(layer.coverage(), TileExtent::new(4, 4));
    }

    #[test]
    fn test_retire_rows_consumes_whole_tiles() {
        let settings = settings();
        let mut layer = Layer::new(settings.layers[0]);
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        layer.materialize(TileExtent::new(3, 4), &settings, far_limit(), &mut rng);

        layer.distance_traveled = 250.0;
        layer.retire_scrolled_rows(100.0);
        assert_eq!(layer.retired_rows(), 2);
        assert_eq!(layer.coverage().rows, 2);
        assert!((layer.distance_traveled() - 50.0).abs() < 1e-4);

        // Less than a tile leaves coverage alone.
        layer.retire_scrolled_rows(100.0);
        assert_eq!(layer.coverage().rows, 2);
    }

    #[test]
    fn test_retire_past_all_rows_resets_coverage() {
        let settings = settings();
        let mut rng = ChaCha8Rng::seed_from_u64(18);

        for travel in [400.0, 1e21, f32::MAX, f32::INFINITY] {
            let mut layer = Layer::new(settings.layers[0]);
            layer.materialize(TileExtent::new(3, 4), &settings, far_limit(), &mut rng);
            layer.distance_traveled = travel;
            layer.retire_scrolled_rows(100.0);

            assert_eq!(layer.retired_rows(), 4, "travel {travel}");
            assert_eq!(layer.coverage(), TileExtent::new(3, 0));
            assert_eq!(layer.distance_traveled(), 0.0);

            // Refilled rows continue after the retired ones.
            let created = layer.materialize(TileExtent::new(3, 4), &settings, far_limit(), &mut rng);
            assert_eq!(created.len(), 12);
            assert!(created.iter().all(|coord| coord.row >= 4));
        }
    }

    #[test]
    fn test_tiles_are_never_materialized_twice() {
        let settings = settings();
        let mut layer = Layer::new(settings.layers[0]);
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        let mut seen = HashSet::new();

        let targets = [
            TileExtent::new(2, 2),
            TileExtent::new(3, 2),
            TileExtent::new(3, 4),
            TileExtent::new(3, 4),
            TileExtent::new(5, 4),
        ];
        for (step, target) in targets.into_iter().enumerate() {
            layer.distance_traveled += 130.0 * step as f32;
            layer.retire_scrolled_rows(settings.tile_size);
            for coord in layer.materialize(target, &settings, far_limit(), &mut rng) {
                assert!(seen.insert(coord), "tile {coord:?} created twice");
            }
        }
        assert_eq!(seen.len() as u64, layer.tiles_materialized());
    }

    #[test]
    fn test_advance_culls_above_top_edge() {
        let settings = settings();
        let mut layer = Layer::new(settings.layers[0]);
        let mut rng = ChaCha8Rng::seed_from_u64(15);
        layer.materialize(TileExtent::new(1, 1), &settings, far_limit(), &mut rng);

        for (i, star) in layer.stars.iter_mut().enumerate() {
            star.speed = 10.0;
            star.position.y = if i == 0 { 5.0 } else { 50.0 };
        }
        // First star ends at -5, fully past the 2.5px radius.
        let culled = layer.advance(1.0, far_limit());
        assert_eq!(culled, 1);
        assert_eq!(layer.stars().len(), 2);
        assert!(layer.stars().iter().all(|s| s.position.y + 2.5 >= 0.0));
        assert!((layer.distance_traveled() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_advance_keeps_partially_visible_star() {
        let settings = settings();
        let mut layer = Layer::new(settings.layers[0]);
        let mut rng = ChaCha8Rng::seed_from_u64(16);
        layer.materialize(TileExtent::new(1, 1), &settings, far_limit(), &mut rng);
        layer.stars.truncate(1);
        layer.stars[0].speed = 1.0;
        layer.stars[0].position.y = 0.0;

        // y = -2.0, radius 2.5: still peeking over the edge.
        assert_eq!(layer.advance(2.0, far_limit()), 0);
        assert_eq!(layer.stars().len(), 1);
    }

    #[test]
    fn test_advance_hides_without_culling() {
        let settings = settings();
        let mut layer = Layer::new(settings.layers[0]);
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        layer.materialize(TileExtent::new(1, 1), &settings, far_limit(), &mut rng);
        layer.stars.truncate(1);
        layer.stars[0].position = Vec2::new(90.0, 40.0);
        layer.stars[0].speed = 0.0;

        layer.advance(0.5, Vec2::new(50.0, 200.0));
        assert_eq!(layer.stars().len(), 1);
        assert!(!layer.stars()[0].visible);
    }
}
