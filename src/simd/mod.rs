// ============================================================================
// SIMD Optimizations Module
// Platform-specific batched limb addition for BigDecimal
//
// Supported architectures:
// - x86_64: AVX2 (256-bit registers, 8x u32 parallel)
// - aarch64: NEON (128-bit registers, 4x u32 parallel)
// - Other: Scalar fallback
//
// The batch only performs the element-wise limb sum; the scalar carry pass
// in the numeric module is mandatory either way, so correctness never
// depends on SIMD availability.
// ============================================================================

#[cfg(target_arch = "x86_64")]
mod avx2;
mod detector;
#[cfg(target_arch = "aarch64")]
mod neon;
mod scalar;
mod traits;

#[cfg(target_arch = "x86_64")]
pub use avx2::Avx2Adder;
pub use detector::{
    create_limb_adder, create_scalar_adder, Architecture, CpuCapabilities, SimdLevel,
};
#[cfg(target_arch = "aarch64")]
pub use neon::NeonAdder;
pub use scalar::ScalarAdder;
pub use traits::LimbAdder;
