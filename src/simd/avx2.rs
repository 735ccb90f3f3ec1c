// ============================================================================
// x86_64 AVX2 Implementation
// SIMD limb addition using AVX2 instructions (256-bit, 8x u32)
// ============================================================================

use super::traits::LimbAdder;

/// AVX2 limb adder.
///
/// Uses 256-bit AVX2 registers to sum 8 u32 limbs per iteration. Requires
/// runtime detection of AVX2 support.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avx2Adder;

impl Avx2Adder {
    /// Create a new AVX2 adder.
    ///
    /// # Panics
    /// Panics if AVX2 is not available on this CPU.
    /// Use `is_available()` to check before creating.
    pub fn new() -> Self {
        assert!(Self::is_available(), "AVX2 is not available on this CPU");
        Self
    }

    /// Check if AVX2 is available on this CPU.
    #[inline]
    pub fn is_available() -> bool {
        is_x86_feature_detected!("avx2")
    }
}

impl LimbAdder for Avx2Adder {
    fn add_limbs(&self, a: &[u32], b: &[u32], out: &mut [u32]) {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), out.len());
        // Safety: We checked AVX2 availability in new()
        unsafe { avx2_add_limbs(a, b, out) }
    }

    fn name(&self) -> &'static str {
        "AVX2"
    }
}

/// AVX2-accelerated element-wise limb addition.
///
/// Limbs never exceed 10^8, so lane sums stay far below u32::MAX and no
/// saturation handling is needed.
///
/// # Safety
/// Caller must ensure AVX2 is available.
#[target_feature(enable = "avx2")]
unsafe fn avx2_add_limbs(a: &[u32], b: &[u32], out: &mut [u32]) {
    use std::arch::x86_64::*;

    let lanes = a.len() / 8 * 8;
    let mut i = 0;
    while i < lanes {
        let av = _mm256_loadu_si256(a.as_ptr().add(i) as *const __m256i);
        let bv = _mm256_loadu_si256(b.as_ptr().add(i) as *const __m256i);
        let sum = _mm256_add_epi32(av, bv);
        _mm256_storeu_si256(out.as_mut_ptr().add(i) as *mut __m256i, sum);
        i += 8;
    }

    // Handle remainder with scalar code
    for j in lanes..a.len() {
        out[j] = a[j] + b[j];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avx2_matches_scalar() {
        if !Avx2Adder::is_available() {
            return;
        }
        let adder = Avx2Adder::new();
        let a: Vec<u32> = (0..21).map(|i| i * 12_345_678 % 100_000_000).collect();
        let b: Vec<u32> = (0..21).map(|i| i * 87_654_321 % 100_000_000).collect();
        let mut out = vec![0u32; 21];
        adder.add_limbs(&a, &b, &mut out);
        for i in 0..21 {
            assert_eq!(out[i], a[i] + b[i]);
        }
    }
}
