// ============================================================================
// Precision Context
// Caller-selectable decimal digit precision for BigDecimal values
// ============================================================================

/// Default precision in decimal digits.
pub const DEFAULT_PRECISION: u32 = 8;

/// How two contexts combine when operands of different precision interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MergePolicy {
    /// Take the smaller precision
    Min,
    /// Take the integer average of both precisions
    Avg,
    /// Take the larger precision (default; never loses precision silently)
    Max,
}

/// Immutable description of the fractional digit precision of a
/// [`BigDecimal`](super::BigDecimal).
///
/// The precision determines the limb-array length: `ceil(digits / 8) + 1`,
/// where limb 0 holds the integer part and the remaining limbs hold eight
/// fractional digits each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrecisionContext {
    digits: u32,
}

impl PrecisionContext {
    /// Create a context for the given number of fractional decimal digits.
    ///
    /// Negative input falls back to the default precision of 8 digits.
    pub fn new(digits: i32) -> Self {
        if digits < 0 {
            Self {
                digits: DEFAULT_PRECISION,
            }
        } else {
            Self {
                digits: digits as u32,
            }
        }
    }

    /// The configured number of fractional decimal digits.
    #[inline]
    pub const fn digits(&self) -> u32 {
        self.digits
    }

    /// Number of base-10^8 limbs a value at this precision occupies,
    /// including the integer limb.
    #[inline]
    pub const fn limb_count(&self) -> usize {
        (self.digits as usize).div_ceil(8) + 1
    }

    /// Combine two contexts according to the given policy.
    pub fn merge(a: Self, b: Self, policy: MergePolicy) -> Self {
        let digits = match policy {
            MergePolicy::Min => a.digits.min(b.digits),
            MergePolicy::Avg => (a.digits + b.digits) / 2,
            MergePolicy::Max => a.digits.max(b.digits),
        };
        Self { digits }
    }
}

impl Default for PrecisionContext {
    #[inline]
    fn default() -> Self {
        Self {
            digits: DEFAULT_PRECISION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_digits_clamp_to_default() {
        let ctx = PrecisionContext::new(-5);
        assert_eq!(ctx.digits(), DEFAULT_PRECISION);
    }

    #[test]
    fn test_limb_count() {
        assert_eq!(PrecisionContext::new(0).limb_count(), 1);
        assert_eq!(PrecisionContext::new(1).limb_count(), 2);
        assert_eq!(PrecisionContext::new(8).limb_count(), 2);
        assert_eq!(PrecisionContext::new(9).limb_count(), 3);
        assert_eq!(PrecisionContext::new(16).limb_count(), 3);
        assert_eq!(PrecisionContext::new(24).limb_count(), 4);
    }

    #[test]
    fn test_merge_policies() {
        let a = PrecisionContext::new(8);
        let b = PrecisionContext::new(24);

        assert_eq!(PrecisionContext::merge(a, b, MergePolicy::Min).digits(), 8);
        assert_eq!(PrecisionContext::merge(a, b, MergePolicy::Avg).digits(), 16);
        assert_eq!(PrecisionContext::merge(a, b, MergePolicy::Max).digits(), 24);
    }

    #[test]
    fn test_merge_is_symmetric() {
        let a = PrecisionContext::new(16);
        let b = PrecisionContext::new(40);
        for policy in [MergePolicy::Min, MergePolicy::Avg, MergePolicy::Max] {
            assert_eq!(
                PrecisionContext::merge(a, b, policy),
                PrecisionContext::merge(b, a, policy)
            );
        }
    }
}
