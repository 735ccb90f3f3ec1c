// ============================================================================
// Limb Adder Trait
// Contract for batched element-wise limb addition
// ============================================================================

/// Batched element-wise addition of base-10^8 limb arrays.
///
/// Implementations add `a[i] + b[i]` into `out[i]` without propagating
/// carries: every limb stays below 10^8, so the element-wise sum fits a u32
/// with room to spare. The caller runs the mandatory scalar carry pass
/// afterwards, which is what makes the batch a pure optimization.
pub trait LimbAdder: Send + Sync {
    /// Element-wise sum of two equal-length limb slices.
    ///
    /// All three slices must have the same length.
    fn add_limbs(&self, a: &[u32], b: &[u32], out: &mut [u32]);

    /// Implementation name for diagnostics.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_object_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn LimbAdder>();
    }
}
