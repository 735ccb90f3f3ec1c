// ============================================================================
// Color Mapper Interface
// Contract for mapping iteration counts to display colors
// ============================================================================

/// Maps an escape-time iteration count to a packed ARGB color.
///
/// Color mapping lives outside the scheduler core; workers call into this
/// seam right after computing a pixel so coarse preview tiles are already
/// colored. Implementations must be pure: the same `(iterations, limit)`
/// pair always yields the same color.
pub trait ColorMapper: Send + Sync {
    /// Color for a pixel that bailed out after `iterations` of `limit`.
    fn color_for(&self, iterations: u32, limit: u32) -> u32;
}

/// Monochrome brightness ramp; points that never escape render black.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonochromeMapper;

impl ColorMapper for MonochromeMapper {
    fn color_for(&self, iterations: u32, limit: u32) -> u32 {
        if limit == 0 || iterations >= limit {
            return 0xFF00_0000;
        }
        let level = (iterations as u64 * 255 / limit as u64) as u32;
        0xFF00_0000 | (level << 16) | (level << 8) | level
    }
}

/// Identity mapper for tests: the packed color is the iteration count.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterationMapper;

impl ColorMapper for IterationMapper {
    fn color_for(&self, iterations: u32, _limit: u32) -> u32 {
        iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monochrome_interior_is_black() {
        let mapper = MonochromeMapper;
        assert_eq!(mapper.color_for(100, 100), 0xFF00_0000);
        assert_eq!(mapper.color_for(250, 100), 0xFF00_0000);
    }

    #[test]
    fn test_monochrome_ramp_is_monotone() {
        let mapper = MonochromeMapper;
        let low = mapper.color_for(10, 100) & 0xFF;
        let high = mapper.color_for(90, 100) & 0xFF;
        assert!(low < high);
    }

    #[test]
    fn test_monochrome_zero_limit_does_not_divide() {
        let mapper = MonochromeMapper;
        assert_eq!(mapper.color_for(0, 0), 0xFF00_0000);
    }

    #[test]
    fn test_iteration_mapper_is_identity() {
        let mapper = IterationMapper;
        assert_eq!(mapper.color_for(42, 100), 42);
    }
}
