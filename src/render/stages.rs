// ============================================================================
// Stage Tables
// Per-stage shuffled tile-origin tables for progressive refinement
// ============================================================================

use rand::seq::SliceRandom;
use rand::thread_rng;

/// Tile side length in pixels, indexed by stage (stage 4 is coarsest).
pub const TILE_SIDES: [u32; 5] = [1, 2, 4, 8, 16];

/// Number of refinement stages per pass.
pub const STAGE_COUNT: usize = TILE_SIDES.len();

/// Per-stage progress weighting, interactive preview tier.
pub const PROGRESS_SCALES: [f64; 5] = [0.5, 0.25, 0.125, 0.0625, 0.0625];
pub const PROGRESS_OFFSETS: [f64; 5] = [0.5, 0.25, 0.125, 0.0625, 0.0];

/// Shuffled tile-origin tables for one surface size, one table per stage.
///
/// Each entry packs a tile coordinate as `(tile_y << 16) | tile_x`; workers
/// multiply by the stage's tile side to recover the pixel origin. Every tile
/// coordinate in `[0, tiles_per_axis)` appears exactly once per stage. The
/// shuffle only affects the visual reveal order, never which pixels get
/// computed. Tables are built once per resolution change and read-only
/// afterwards.
#[derive(Debug)]
pub struct StageTables {
    tables: [Vec<u32>; STAGE_COUNT],
    width: u32,
    height: u32,
}

impl StageTables {
    /// Build and shuffle the tables for a surface of `width` x `height`.
    pub fn build(width: u32, height: u32) -> Self {
        let mut rng = thread_rng();
        let tables = std::array::from_fn(|stage| {
            let side = TILE_SIDES[stage];
            let tiles_x = width / side;
            let tiles_y = height / side;
            let mut table = Vec::with_capacity((tiles_x * tiles_y) as usize);
            for x in 0..tiles_x {
                for y in 0..tiles_y {
                    table.push((y << 16) | x);
                }
            }
            table.shuffle(&mut rng);
            table
        });
        Self {
            tables,
            width,
            height,
        }
    }

    #[inline]
    pub fn table(&self, stage: usize) -> &[u32] {
        &self.tables[stage]
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Decode a packed table entry into a pixel-space tile origin.
    #[inline]
    pub fn decode_origin(entry: u32, stage: usize) -> (u32, u32) {
        let x = (entry & 0x0000_ffff) * TILE_SIDES[stage];
        let y = (entry >> 16) * TILE_SIDES[stage];
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_lengths() {
        let tables = StageTables::build(64, 32);
        assert_eq!(tables.table(0).len(), 64 * 32);
        assert_eq!(tables.table(1).len(), 32 * 16);
        assert_eq!(tables.table(4).len(), 4 * 2);
    }

    #[test]
    fn test_each_tile_appears_exactly_once() {
        let tables = StageTables::build(48, 48);
        for stage in 0..STAGE_COUNT {
            let entries: HashSet<u32> = tables.table(stage).iter().copied().collect();
            assert_eq!(
                entries.len(),
                tables.table(stage).len(),
                "duplicate tile at stage {stage}"
            );
            let tiles = 48 / TILE_SIDES[stage];
            for x in 0..tiles {
                for y in 0..tiles {
                    assert!(entries.contains(&((y << 16) | x)));
                }
            }
        }
    }

    #[test]
    fn test_decode_origin_scales_by_tile_side() {
        let entry = (3 << 16) | 5;
        assert_eq!(StageTables::decode_origin(entry, 0), (5, 3));
        assert_eq!(StageTables::decode_origin(entry, 4), (80, 48));
    }

    #[test]
    fn test_non_divisible_dimensions_truncate() {
        // 50 px at side 16 leaves a 2 px margin covered only by finer stages
        let tables = StageTables::build(50, 50);
        assert_eq!(tables.table(4).len(), 3 * 3);
        assert_eq!(tables.table(0).len(), 50 * 50);
    }
}
