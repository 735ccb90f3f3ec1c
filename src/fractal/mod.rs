// ============================================================================
// Fractal Module
// View state and escape-time evaluation over BigDecimal coordinates
// ============================================================================

mod evaluator;
mod view;

pub use evaluator::iteration_for_pixel;
pub use view::FractalView;

/// Escape-time bailout radius squared (|z|^2 >= 4 escapes).
pub const BAILOUT_MAGNITUDE_SQUARED: i32 = 4;

/// Iteration count awarded to points inside the circle sanity-check variant.
pub const CIRCLE_BONUS: u32 = 250;

/// The fractal recurrence evaluated per pixel.
///
/// The Mandelbrot powers expand `z <- z^n + c` analytically into
/// real/imaginary polynomial updates. `MandelbrotPower2Native` runs the
/// power-2 recurrence on `rust_decimal::Decimal` instead of [`BigDecimal`]
/// for precision/performance comparison; it is deliberately kept as a
/// distinct, independently tested variant rather than unified with the
/// big-decimal path. `Circle` is a cheap membership test used as a render
/// pipeline sanity check.
///
/// [`BigDecimal`]: crate::numeric::BigDecimal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FractalKind {
    MandelbrotPower2,
    MandelbrotPower3,
    MandelbrotPower4,
    MandelbrotPower5,
    MandelbrotPower6,
    MandelbrotPower2Native,
    Circle,
}

impl Default for FractalKind {
    fn default() -> Self {
        FractalKind::MandelbrotPower2
    }
}

impl std::fmt::Display for FractalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FractalKind::MandelbrotPower2 => "mandelbrot-power2",
            FractalKind::MandelbrotPower3 => "mandelbrot-power3",
            FractalKind::MandelbrotPower4 => "mandelbrot-power4",
            FractalKind::MandelbrotPower5 => "mandelbrot-power5",
            FractalKind::MandelbrotPower6 => "mandelbrot-power6",
            FractalKind::MandelbrotPower2Native => "mandelbrot-power2-native",
            FractalKind::Circle => "circle",
        };
        write!(f, "{}", name)
    }
}
