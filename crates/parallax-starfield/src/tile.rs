//! Tile grid arithmetic: how many tiles cover a viewport, and which cells are
//! new when coverage grows.

/// Identity of a materialized tile within one layer.
///
/// `row` is absolute: it counts rows that have already scrolled off the top,
/// so a tile keeps its identity while the field moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub column: u32,
    pub row: u64,
}

/// Materialized coverage of a layer, in whole tiles from the top-left corner
/// of the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileExtent {
    pub columns: u32,
    pub rows: u32,
}

impl TileExtent {
    pub const EMPTY: Self = Self {
        columns: 0,
        rows: 0,
    };

    pub fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Extent required to fill a `width` x `height` viewport.
    ///
    /// Each axis gets `ceil((size + max_radius) / tile_size)` tiles plus one
    /// tile of lookahead, so stars straddling the far edge and rows scrolling
    /// in from below are already present when they become visible.
    pub fn covering(width: u32, height: u32, max_radius: f32, tile_size: f32) -> Self {
        Self {
            columns: tiles_needed(width, max_radius, tile_size),
            rows: tiles_needed(height, max_radius, tile_size),
        }
    }

    /// Component-wise maximum. Coverage never shrinks.
    pub fn max(self, other: Self) -> Self {
        Self {
            columns: self.columns.max(other.columns),
            rows: self.rows.max(other.rows),
        }
    }

    pub fn contains(&self, other: Self) -> bool {
        self.columns >= other.columns && self.rows >= other.rows
    }

    pub fn tile_count(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }

    /// Covered size in pixels as `(width, height)`.
    pub fn pixel_size(&self, tile_size: f32) -> (f32, f32) {
        (
            self.columns as f32 * tile_size,
            self.rows as f32 * tile_size,
        )
    }

    /// Screen cells `(column, row)` inside `self` that lie outside `previous`.
    ///
    /// Rows are yielded top to bottom, columns left to right.
    pub fn fresh_cells(self, previous: Self) -> impl Iterator<Item = (u32, u32)> {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns)
                .filter(move |&column| row >= previous.rows || column >= previous.columns)
                .map(move |column| (column, row))
        })
    }
}

/// Tiles along one axis for a viewport dimension, including one lookahead tile.
pub fn tiles_needed(size_px: u32, max_radius: f32, tile_size: f32) -> u32 {
    let span = (size_px as f32 + max_radius.max(0.0)) / tile_size;
    (span.ceil() as u32).saturating_add(1)
}
