// ============================================================================
// Fractal View
// Immutable per-pass snapshot of the current view parameters
// ============================================================================

use super::FractalKind;
use crate::numeric::{BigDecimal, PrecisionContext};

/// The complete view state a render pass evaluates against.
///
/// Built whole and never partially mutated: the render engine installs a
/// fresh snapshot (behind an `Arc`) whenever the view changes, and resets
/// the pass before any worker can observe it. That reset is the
/// synchronization boundary between the single writer (the view-control
/// path) and the many reading workers.
#[derive(Debug, Clone)]
pub struct FractalView {
    width: u32,
    height: u32,
    center_x: BigDecimal,
    center_y: BigDecimal,
    scale: BigDecimal,
    context: PrecisionContext,
    kind: FractalKind,
    iteration_limit: u32,
    /// Aspect-ratio half-width, `0.5 * width / height`, precomputed for the
    /// pixel-to-plane mapping.
    rhalf: f64,
}

impl FractalView {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: u32,
        height: u32,
        center_x: BigDecimal,
        center_y: BigDecimal,
        scale: BigDecimal,
        context: PrecisionContext,
        kind: FractalKind,
        iteration_limit: u32,
    ) -> Self {
        let rhalf = 0.5 * width as f64 / height as f64;
        Self {
            width,
            height,
            center_x,
            center_y,
            scale,
            context,
            kind,
            iteration_limit,
            rhalf,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn context(&self) -> PrecisionContext {
        self.context
    }

    #[inline]
    pub fn kind(&self) -> FractalKind {
        self.kind
    }

    #[inline]
    pub fn iteration_limit(&self) -> u32 {
        self.iteration_limit
    }

    pub fn scale(&self) -> &BigDecimal {
        &self.scale
    }

    /// Map integer pixel coordinates to plane coordinates.
    ///
    /// The offset within the view is computed in native f64 (the sub-pixel
    /// offset only needs native precision), then promoted to BigDecimal at
    /// the view context, scaled, and translated by the center — the
    /// absolute plane position is where arbitrary precision matters.
    pub fn map_pixel(&self, px: u32, py: u32) -> (BigDecimal, BigDecimal) {
        let dx = px as f64 / self.height as f64 - self.rhalf;
        let dy = py as f64 / self.height as f64 - 0.5;

        let cx = BigDecimal::from_f64(dx, self.context);
        let cy = BigDecimal::from_f64(-dy, self.context);

        let cx = BigDecimal::mul_with(&cx, &self.scale, self.context);
        let cy = BigDecimal::mul_with(&cy, &self.scale, self.context);

        let cx = BigDecimal::add_with(&cx, &self.center_x, self.context);
        let cy = BigDecimal::add_with(&cy, &self.center_y, self.context);

        (cx, cy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin_view(width: u32, height: u32) -> FractalView {
        let ctx = PrecisionContext::new(8);
        FractalView::new(
            width,
            height,
            BigDecimal::zero(ctx),
            BigDecimal::zero(ctx),
            BigDecimal::one(ctx),
            ctx,
            FractalKind::MandelbrotPower2,
            100,
        )
    }

    #[test]
    fn test_center_pixel_maps_to_center() {
        let view = origin_view(4, 4);
        let (cx, cy) = view.map_pixel(2, 2);
        assert!(cx.is_zero());
        assert!(cy.is_zero());
    }

    #[test]
    fn test_y_axis_is_negated() {
        let view = origin_view(4, 4);
        // py above center maps to positive plane y
        let (_, cy_top) = view.map_pixel(2, 0);
        let (_, cy_bottom) = view.map_pixel(2, 4);
        assert!(!cy_top.is_negative());
        assert!(cy_bottom.is_negative());
    }

    #[test]
    fn test_scale_multiplies_offsets() {
        let ctx = PrecisionContext::new(8);
        let wide = FractalView::new(
            4,
            4,
            BigDecimal::zero(ctx),
            BigDecimal::zero(ctx),
            BigDecimal::from_i32(4, ctx),
            ctx,
            FractalKind::MandelbrotPower2,
            100,
        );
        let (cx, _) = wide.map_pixel(4, 2);
        // offset 0.5 at scale 4 lands at plane x = 2
        assert_eq!(cx.to_string(), "2.00000000");
    }

    #[test]
    fn test_center_translates_mapping() {
        let ctx = PrecisionContext::new(8);
        let view = FractalView::new(
            4,
            4,
            BigDecimal::from_i32(2, ctx),
            BigDecimal::from_i32(2, ctx),
            BigDecimal::one(ctx),
            ctx,
            FractalKind::MandelbrotPower2,
            100,
        );
        let (cx, cy) = view.map_pixel(2, 2);
        assert_eq!(cx.to_string(), "2.00000000");
        assert_eq!(cy.to_string(), "2.00000000");
    }

    #[test]
    fn test_rhalf_accounts_for_aspect_ratio() {
        let view = origin_view(8, 4);
        // with rhalf = 1.0 the left edge maps to plane x = -1
        let (cx, _) = view.map_pixel(0, 2);
        assert_eq!(cx.to_string(), "-1.00000000");
    }
}
