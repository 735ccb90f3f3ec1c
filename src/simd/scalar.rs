// ============================================================================
// Scalar Implementation
// Portable fallback for batched limb addition
// ============================================================================

use super::traits::LimbAdder;

/// Scalar limb adder, available on every platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarAdder;

impl ScalarAdder {
    pub fn new() -> Self {
        Self
    }
}

impl LimbAdder for ScalarAdder {
    fn add_limbs(&self, a: &[u32], b: &[u32], out: &mut [u32]) {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), out.len());
        for i in 0..a.len() {
            out[i] = a[i] + b[i];
        }
    }

    fn name(&self) -> &'static str {
        "Scalar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_add() {
        let adder = ScalarAdder::new();
        let a = [1, 99_999_999, 0, 42];
        let b = [2, 1, 7, 58];
        let mut out = [0u32; 4];
        adder.add_limbs(&a, &b, &mut out);
        assert_eq!(out, [3, 100_000_000, 7, 100]);
    }

    #[test]
    fn test_scalar_name() {
        assert_eq!(ScalarAdder::new().name(), "Scalar");
    }
}
