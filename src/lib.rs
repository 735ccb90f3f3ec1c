// ============================================================================
// Fractal Explorer Library
// Arbitrary-precision escape-time rendering with progressive tile refinement
// ============================================================================

//! # Fractal Explorer
//!
//! An escape-time fractal engine that stays numerically honest at zoom
//! depths far beyond native floating point.
//!
//! ## Features
//!
//! - **Arbitrary-precision fixed-point decimals** over base-10^8 limbs with
//!   caller-selectable precision contexts
//! - **Progressive five-stage tile scheduler**: a joinable worker pool
//!   refines the image from 16 px tiles down to single pixels
//! - **Dynamic precision rescaling** keeps numeric cost proportional to the
//!   current zoom depth
//! - **SIMD-batched limb addition** (AVX2 on x86_64, NEON on aarch64) behind
//!   a portable scalar fallback
//! - **Single-image and zoom-sequence PNG export**
//!
//! ## Example
//!
//! ```rust
//! use fractal_explorer::prelude::*;
//! use std::time::Duration;
//!
//! let config = RenderConfig::new(64, 48)
//!     .with_kind(FractalKind::Circle)
//!     .with_worker_threads(2);
//! let engine = RenderEngine::with_defaults(config).unwrap();
//!
//! assert!(engine.wait_until_idle(Duration::from_secs(30)));
//! let iterations = engine.iteration_snapshot();
//! assert_eq!(iterations.len(), 64 * 48);
//! ```

pub mod fractal;
pub mod interfaces;
pub mod numeric;
pub mod render;
pub mod simd;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::fractal::{iteration_for_pixel, FractalKind, FractalView};
    pub use crate::interfaces::{
        ColorMapper, FrameSink, FrameSnapshot, IterationMapper, LoggingFrameSink,
        MonochromeMapper, NoOpFrameSink,
    };
    pub use crate::numeric::{BigDecimal, MergePolicy, NumericError, PrecisionContext};
    pub use crate::render::{RenderConfig, RenderEngine, RenderMode};
}
