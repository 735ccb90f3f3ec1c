// ============================================================================
// Render Progress
// Weighted progress fractions for the preview and export tiers
// ============================================================================

use super::stages::{PROGRESS_OFFSETS, PROGRESS_SCALES};

/// Progress of an interactive preview pass, in `[0, 1]`.
///
/// `average_index` is the mean per-worker position within the current stage
/// table of `table_len` entries. Coarse stages contribute exponentially less
/// weight than fine ones (a stage has a quarter of the next finer stage's
/// work), and the result is squared so the bar tracks perceived refinement
/// rather than raw work items.
pub fn preview_progress(stage: usize, average_index: usize, table_len: usize) -> f64 {
    if table_len == 0 {
        return 0.0;
    }
    let within = average_index as f64 / table_len as f64;
    let weighted = within * PROGRESS_SCALES[stage] + PROGRESS_OFFSETS[stage];
    (weighted * weighted).clamp(0.0, 1.0)
}

/// Progress of an export pass (stages 1 then 0 only): the coarse stage
/// covers the first quarter of the bar, the full-resolution stage the rest.
pub fn export_progress(stage: usize, average_index: usize, table_len: usize) -> f64 {
    if table_len == 0 {
        return 0.0;
    }
    let within = average_index as f64 / table_len as f64;
    let weighted = match stage {
        1 => within * 0.25,
        0 => within * 0.75 + 0.25,
        _ => 0.0,
    };
    weighted.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_progress_starts_at_zero() {
        assert_eq!(preview_progress(4, 0, 100), 0.0);
    }

    #[test]
    fn test_preview_progress_ends_at_one() {
        let progress = preview_progress(0, 100, 100);
        assert!((progress - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_preview_progress_monotone_across_stages() {
        // end of each coarser stage meets the start of the next finer one
        for stage in (1..5).rev() {
            let end = preview_progress(stage, 100, 100);
            let start = preview_progress(stage - 1, 0, 100);
            assert!((end - start).abs() < 1e-12, "gap at stage {stage}");
        }
    }

    #[test]
    fn test_export_progress_split() {
        assert_eq!(export_progress(1, 0, 100), 0.0);
        assert!((export_progress(1, 100, 100) - 0.25).abs() < 1e-12);
        assert!((export_progress(0, 0, 100) - 0.25).abs() < 1e-12);
        assert!((export_progress(0, 100, 100) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_table_reports_zero() {
        assert_eq!(preview_progress(2, 0, 0), 0.0);
        assert_eq!(export_progress(1, 0, 0), 0.0);
    }
}
