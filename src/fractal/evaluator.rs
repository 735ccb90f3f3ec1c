// ============================================================================
// Escape-Time Evaluator
// Per-pixel iteration counts for every fractal variant
// ============================================================================

use super::view::FractalView;
use super::{FractalKind, BAILOUT_MAGNITUDE_SQUARED, CIRCLE_BONUS};
use crate::numeric::{BigDecimal, PrecisionContext};
use rust_decimal::Decimal;

/// Compute the escape-time iteration count for one pixel.
///
/// Pure function of the pixel coordinates and the view snapshot: identical
/// inputs always produce identical outputs regardless of which worker thread
/// evaluates them.
///
/// All Mandelbrot variants bail out when `zx^2 + zy^2 >= 4` or when the
/// iteration count reaches the view's limit; the bailout test runs before
/// each update, so a point whose very first update escapes reports count 1
/// and a point past the bailout radius at z = 0 would report 0.
pub fn iteration_for_pixel(view: &FractalView, px: u32, py: u32) -> u32 {
    let (cx, cy) = view.map_pixel(px, py);
    let limit = view.iteration_limit();
    let ctx = view.context();

    match view.kind() {
        FractalKind::MandelbrotPower2 => mandelbrot_power2(&cx, &cy, limit, ctx),
        FractalKind::MandelbrotPower3 => mandelbrot_power3(&cx, &cy, limit, ctx),
        FractalKind::MandelbrotPower4 => mandelbrot_power4(&cx, &cy, limit, ctx),
        FractalKind::MandelbrotPower5 => mandelbrot_power5(&cx, &cy, limit, ctx),
        FractalKind::MandelbrotPower6 => mandelbrot_power6(&cx, &cy, limit, ctx),
        FractalKind::MandelbrotPower2Native => mandelbrot_power2_native(&cx, &cy, limit),
        FractalKind::Circle => circle(&cx, &cy, ctx),
    }
}

/// `z <- z^2 + c` on BigDecimal, squares tracked incrementally.
fn mandelbrot_power2(cx: &BigDecimal, cy: &BigDecimal, limit: u32, ctx: PrecisionContext) -> u32 {
    let four = BigDecimal::from_i32(BAILOUT_MAGNITUDE_SQUARED, ctx);

    let mut zx = BigDecimal::zero(ctx);
    let mut zy = BigDecimal::zero(ctx);
    let mut zx_sq = BigDecimal::zero(ctx);
    let mut zy_sq = BigDecimal::zero(ctx);

    let mut count = 0;
    while (&zx_sq + &zy_sq) < four && count < limit {
        let next_zx = &(&zx_sq - &zy_sq) + cx;
        let next_zy = &(&zx * &zy).mul_small(2) + cy;

        zx = next_zx;
        zy = next_zy;

        zx_sq = &zx * &zx;
        zy_sq = &zy * &zy;

        count += 1;
    }
    count
}

/// `z <- z^3 + c`: `zx' = zx^3 - 3 zx zy^2`, `zy' = 3 zx^2 zy - zy^3`.
fn mandelbrot_power3(cx: &BigDecimal, cy: &BigDecimal, limit: u32, ctx: PrecisionContext) -> u32 {
    let four = BigDecimal::from_i32(BAILOUT_MAGNITUDE_SQUARED, ctx);

    let mut zx = BigDecimal::zero(ctx);
    let mut zy = BigDecimal::zero(ctx);
    let mut zx_p2 = BigDecimal::zero(ctx);
    let mut zy_p2 = BigDecimal::zero(ctx);
    let mut zx_p3 = BigDecimal::zero(ctx);
    let mut zy_p3 = BigDecimal::zero(ctx);

    let mut count = 0;
    while (&zx_p2 + &zy_p2) < four && count < limit {
        let real = &zx_p3 - &(&zx * &zy_p2).mul_small(3);
        let imag = &(&zx_p2 * &zy).mul_small(3) - &zy_p3;

        zx = &real + cx;
        zy = &imag + cy;

        zx_p2 = &zx * &zx;
        zy_p2 = &zy * &zy;
        zx_p3 = &zx_p2 * &zx;
        zy_p3 = &zy_p2 * &zy;

        count += 1;
    }
    count
}

/// `z <- z^4 + c`: `zx' = zx^4 - 6 zx^2 zy^2 + zy^4`,
/// `zy' = 4 (zx^3 zy - zx zy^3)`.
fn mandelbrot_power4(cx: &BigDecimal, cy: &BigDecimal, limit: u32, ctx: PrecisionContext) -> u32 {
    let four = BigDecimal::from_i32(BAILOUT_MAGNITUDE_SQUARED, ctx);

    let mut zx = BigDecimal::zero(ctx);
    let mut zy = BigDecimal::zero(ctx);
    let mut zx_p2 = BigDecimal::zero(ctx);
    let mut zy_p2 = BigDecimal::zero(ctx);
    let mut zx_p3 = BigDecimal::zero(ctx);
    let mut zy_p3 = BigDecimal::zero(ctx);
    let mut zx_p4 = BigDecimal::zero(ctx);
    let mut zy_p4 = BigDecimal::zero(ctx);

    let mut count = 0;
    while (&zx_p2 + &zy_p2) < four && count < limit {
        let real = &(&zx_p4 - &(&zx_p2 * &zy_p2).mul_small(6)) + &zy_p4;
        let imag = (&(&zx_p3 * &zy) - &(&zx * &zy_p3)).mul_small(4);

        zx = &real + cx;
        zy = &imag + cy;

        zx_p2 = &zx * &zx;
        zy_p2 = &zy * &zy;
        zx_p3 = &zx_p2 * &zx;
        zy_p3 = &zy_p2 * &zy;
        zx_p4 = &zx_p3 * &zx;
        zy_p4 = &zy_p3 * &zy;

        count += 1;
    }
    count
}

/// `z <- z^5 + c`: `zx' = zx^5 - 10 zx^3 zy^2 + 5 zx zy^4`,
/// `zy' = 5 zx^4 zy - 10 zx^2 zy^3 + zy^5`.
fn mandelbrot_power5(cx: &BigDecimal, cy: &BigDecimal, limit: u32, ctx: PrecisionContext) -> u32 {
    let four = BigDecimal::from_i32(BAILOUT_MAGNITUDE_SQUARED, ctx);

    let mut zx = BigDecimal::zero(ctx);
    let mut zy = BigDecimal::zero(ctx);
    let mut zx_p2 = BigDecimal::zero(ctx);
    let mut zy_p2 = BigDecimal::zero(ctx);
    let mut zx_p3 = BigDecimal::zero(ctx);
    let mut zy_p3 = BigDecimal::zero(ctx);
    let mut zx_p4 = BigDecimal::zero(ctx);
    let mut zy_p4 = BigDecimal::zero(ctx);
    let mut zx_p5 = BigDecimal::zero(ctx);
    let mut zy_p5 = BigDecimal::zero(ctx);

    let mut count = 0;
    while (&zx_p2 + &zy_p2) < four && count < limit {
        let real = &(&zx_p5 - &(&zx_p3 * &zy_p2).mul_small(10)) + &(&zx * &zy_p4).mul_small(5);
        let imag = &(&(&zx_p4 * &zy).mul_small(5) - &(&zx_p2 * &zy_p3).mul_small(10)) + &zy_p5;

        zx = &real + cx;
        zy = &imag + cy;

        zx_p2 = &zx * &zx;
        zy_p2 = &zy * &zy;
        zx_p3 = &zx_p2 * &zx;
        zy_p3 = &zy_p2 * &zy;
        zx_p4 = &zx_p3 * &zx;
        zy_p4 = &zy_p3 * &zy;
        zx_p5 = &zx_p4 * &zx;
        zy_p5 = &zy_p4 * &zy;

        count += 1;
    }
    count
}

/// `z <- z^6 + c`: `zx' = zx^6 - 15 zx^4 zy^2 + 15 zx^2 zy^4 - zy^6`,
/// `zy' = 6 zx^5 zy - 20 zx^3 zy^3 + 6 zx zy^5`.
fn mandelbrot_power6(cx: &BigDecimal, cy: &BigDecimal, limit: u32, ctx: PrecisionContext) -> u32 {
    let four = BigDecimal::from_i32(BAILOUT_MAGNITUDE_SQUARED, ctx);

    let mut zx = BigDecimal::zero(ctx);
    let mut zy = BigDecimal::zero(ctx);
    let mut zx_p2 = BigDecimal::zero(ctx);
    let mut zy_p2 = BigDecimal::zero(ctx);
    let mut zx_p3 = BigDecimal::zero(ctx);
    let mut zy_p3 = BigDecimal::zero(ctx);
    let mut zx_p4 = BigDecimal::zero(ctx);
    let mut zy_p4 = BigDecimal::zero(ctx);
    let mut zx_p5 = BigDecimal::zero(ctx);
    let mut zy_p5 = BigDecimal::zero(ctx);
    let mut zx_p6 = BigDecimal::zero(ctx);
    let mut zy_p6 = BigDecimal::zero(ctx);

    let mut count = 0;
    while (&zx_p2 + &zy_p2) < four && count < limit {
        let real = &(&(&zx_p6 - &(&zx_p4 * &zy_p2).mul_small(15))
            + &(&zx_p2 * &zy_p4).mul_small(15))
            - &zy_p6;
        let imag = &(&(&zx_p5 * &zy).mul_small(6) - &(&zx_p3 * &zy_p3).mul_small(20))
            + &(&zx * &zy_p5).mul_small(6);

        zx = &real + cx;
        zy = &imag + cy;

        zx_p2 = &zx * &zx;
        zy_p2 = &zy * &zy;
        zx_p3 = &zx_p2 * &zx;
        zy_p3 = &zy_p2 * &zy;
        zx_p4 = &zx_p3 * &zx;
        zy_p4 = &zy_p3 * &zy;
        zx_p5 = &zx_p4 * &zx;
        zy_p5 = &zy_p4 * &zy;
        zx_p6 = &zx_p5 * &zx;
        zy_p6 = &zy_p5 * &zy;

        count += 1;
    }
    count
}

/// Power-2 recurrence on native `rust_decimal::Decimal`.
///
/// The coordinates are demoted through [`BigDecimal::to_decimal`]; loop
/// and update ordering intentionally mirror the decimal-native reference
/// rather than the big-decimal path.
fn mandelbrot_power2_native(cx: &BigDecimal, cy: &BigDecimal, limit: u32) -> u32 {
    let four = Decimal::from(BAILOUT_MAGNITUDE_SQUARED);
    let two = Decimal::from(2);

    let cx = cx.to_decimal();
    let cy = cy.to_decimal();

    let mut zx = Decimal::ZERO;
    let mut zy = Decimal::ZERO;
    let mut zx_sq = Decimal::ZERO;
    let mut zy_sq = Decimal::ZERO;

    let mut count = 0;
    while zx_sq + zy_sq < four && count < limit {
        let next_zx = zx_sq - zy_sq + cx;
        let next_zy = two * zx * zy + cy;

        zx = next_zx;
        zy = next_zy;

        zx_sq = zx * zx;
        zy_sq = zy * zy;

        count += 1;
    }
    count
}

/// Membership test `x^2 + y^2 < 1`; returns a fixed bonus count instead of
/// iterating.
fn circle(cx: &BigDecimal, cy: &BigDecimal, ctx: PrecisionContext) -> u32 {
    let one = BigDecimal::one(ctx);
    let magnitude_sq = &(cx * cx) + &(cy * cy);
    if one > magnitude_sq {
        CIRCLE_BONUS
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_at(center_x: i32, center_y: i32, kind: FractalKind, limit: u32) -> FractalView {
        let ctx = PrecisionContext::new(8);
        FractalView::new(
            4,
            4,
            BigDecimal::from_i32(center_x, ctx),
            BigDecimal::from_i32(center_y, ctx),
            BigDecimal::one(ctx),
            ctx,
            kind,
            limit,
        )
    }

    // pixel (2,2) of a 4x4 square view maps to the view center

    #[test]
    fn test_origin_never_escapes() {
        let view = view_at(0, 0, FractalKind::MandelbrotPower2, 100);
        assert_eq!(iteration_for_pixel(&view, 2, 2), 100);
    }

    #[test]
    fn test_far_point_escapes_after_first_update() {
        // |2 + 2i|^2 = 8 >= 4, caught by the check after one update
        let view = view_at(2, 2, FractalKind::MandelbrotPower2, 100);
        assert_eq!(iteration_for_pixel(&view, 2, 2), 1);
    }

    #[test]
    fn test_origin_never_escapes_all_powers() {
        for kind in [
            FractalKind::MandelbrotPower3,
            FractalKind::MandelbrotPower4,
            FractalKind::MandelbrotPower5,
            FractalKind::MandelbrotPower6,
        ] {
            let view = view_at(0, 0, kind, 50);
            assert_eq!(iteration_for_pixel(&view, 2, 2), 50, "{}", kind);
        }
    }

    #[test]
    fn test_power3_known_escape_count() {
        // c = -1: z1 = -1, z2 = (-1)^3 - 1 = -2, |z2|^2 = 4 fails the check
        let view = view_at(-1, 0, FractalKind::MandelbrotPower3, 100);
        assert_eq!(iteration_for_pixel(&view, 2, 2), 2);
    }

    #[test]
    fn test_native_variant_agrees_on_anchor_points() {
        let big = view_at(0, 0, FractalKind::MandelbrotPower2, 100);
        let native = view_at(0, 0, FractalKind::MandelbrotPower2Native, 100);
        assert_eq!(
            iteration_for_pixel(&big, 2, 2),
            iteration_for_pixel(&native, 2, 2)
        );

        let big = view_at(2, 2, FractalKind::MandelbrotPower2, 100);
        let native = view_at(2, 2, FractalKind::MandelbrotPower2Native, 100);
        assert_eq!(iteration_for_pixel(&big, 2, 2), 1);
        assert_eq!(iteration_for_pixel(&native, 2, 2), 1);
    }

    #[test]
    fn test_circle_membership() {
        let inside = view_at(0, 0, FractalKind::Circle, 100);
        assert_eq!(iteration_for_pixel(&inside, 2, 2), CIRCLE_BONUS);

        let outside = view_at(2, 2, FractalKind::Circle, 100);
        assert_eq!(iteration_for_pixel(&outside, 2, 2), 0);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let view = view_at(0, 0, FractalKind::MandelbrotPower2, 64);
        for px in 0..4 {
            for py in 0..4 {
                let first = iteration_for_pixel(&view, px, py);
                let second = iteration_for_pixel(&view, px, py);
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn test_iteration_limit_bounds_count() {
        let view = view_at(0, 0, FractalKind::MandelbrotPower2, 7);
        assert_eq!(iteration_for_pixel(&view, 2, 2), 7);
    }
}
