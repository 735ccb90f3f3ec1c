// ============================================================================
// aarch64 NEON Implementation
// SIMD limb addition using NEON instructions (128-bit, 4x u32)
// ============================================================================

use super::traits::LimbAdder;

/// NEON limb adder.
///
/// Uses 128-bit NEON registers to sum 4 u32 limbs per iteration. NEON is
/// always available on aarch64.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeonAdder;

impl NeonAdder {
    pub fn new() -> Self {
        Self
    }
}

impl LimbAdder for NeonAdder {
    fn add_limbs(&self, a: &[u32], b: &[u32], out: &mut [u32]) {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), out.len());
        // Safety: NEON is baseline on aarch64
        unsafe { neon_add_limbs(a, b, out) }
    }

    fn name(&self) -> &'static str {
        "NEON"
    }
}

/// NEON-accelerated element-wise limb addition.
///
/// # Safety
/// aarch64 only; NEON is part of the baseline instruction set there.
unsafe fn neon_add_limbs(a: &[u32], b: &[u32], out: &mut [u32]) {
    use std::arch::aarch64::*;

    let lanes = a.len() / 4 * 4;
    let mut i = 0;
    while i < lanes {
        let av = vld1q_u32(a.as_ptr().add(i));
        let bv = vld1q_u32(b.as_ptr().add(i));
        let sum = vaddq_u32(av, bv);
        vst1q_u32(out.as_mut_ptr().add(i), sum);
        i += 4;
    }

    // Handle remainder with scalar code
    for j in lanes..a.len() {
        out[j] = a[j] + b[j];
    }
}
