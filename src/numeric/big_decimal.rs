// ============================================================================
// BigDecimal
// Arbitrary-precision signed fixed-point decimal over base-10^8 limbs
// ============================================================================

use super::context::{MergePolicy, PrecisionContext};
use super::errors::{NumericError, NumericResult};
use crate::simd::{self, LimbAdder};
use smallvec::{smallvec, SmallVec};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::{Arc, OnceLock};

/// One limb holds eight decimal digits.
pub const LIMB_BASE: u64 = 100_000_000;

/// Decimal digits stored per limb.
pub const DIGITS_PER_LIMB: u32 = 8;

/// Inline capacity covers contexts up to 56 fractional digits without a
/// heap allocation.
type Limbs = SmallVec<[u32; 8]>;

/// Batched limb addition only pays off once a value spans several limbs.
const BATCH_MIN_LIMBS: usize = 8;

fn limb_adder() -> &'static Arc<dyn LimbAdder> {
    static ADDER: OnceLock<Arc<dyn LimbAdder>> = OnceLock::new();
    ADDER.get_or_init(simd::create_limb_adder)
}

/// Arbitrary-precision signed fixed-point decimal.
///
/// Internally stores a sign flag and a most-significant-first sequence of
/// base-10^8 limbs: limb 0 is the integer part, limbs 1.. each hold eight
/// fractional digits. The limb-array length is fixed by the
/// [`PrecisionContext`]: `ceil(digits / 8) + 1`.
///
/// Values are immutable; every arithmetic operation returns a freshly
/// allocated result sized to the merged output context. Mixed-precision
/// operands merge with [`MergePolicy::Max`], so precision is never silently
/// lost.
///
/// # Example
/// ```
/// use fractal_explorer::numeric::{BigDecimal, PrecisionContext};
///
/// let ctx = PrecisionContext::new(8);
/// let a = BigDecimal::parse("1.5", ctx).unwrap();
/// let b = BigDecimal::parse("2.25", ctx).unwrap();
/// assert_eq!((&a + &b).to_string(), "3.75000000");
/// ```
#[derive(Debug, Clone)]
pub struct BigDecimal {
    sign: bool,
    limbs: Limbs,
    context: PrecisionContext,
}

impl BigDecimal {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Zero at the given precision.
    pub fn zero(context: PrecisionContext) -> Self {
        Self {
            sign: false,
            limbs: smallvec![0; context.limb_count()],
            context,
        }
    }

    /// One at the given precision.
    pub fn one(context: PrecisionContext) -> Self {
        Self::from_i32(1, context)
    }

    /// Create from a native signed integer.
    pub fn from_i32(value: i32, context: PrecisionContext) -> Self {
        let mut limbs: Limbs = smallvec![0; context.limb_count()];
        limbs[0] = value.unsigned_abs();
        Self {
            sign: value < 0,
            limbs,
            context,
        }
    }

    /// Create from a native unsigned integer.
    pub fn from_u32(value: u32, context: PrecisionContext) -> Self {
        let mut limbs: Limbs = smallvec![0; context.limb_count()];
        limbs[0] = value;
        Self {
            sign: false,
            limbs,
            context,
        }
    }

    /// Create from a native float.
    ///
    /// Only the integer limb and the first fractional limb are populated:
    /// an f64 carries no more useful digits, and callers that need full
    /// precision promote through [`BigDecimal::parse`] instead.
    pub fn from_f64(value: f64, context: PrecisionContext) -> Self {
        let mut limbs: Limbs = smallvec![0; context.limb_count()];
        let magnitude = value.abs();
        limbs[0] = magnitude.floor() as u32;
        if limbs.len() > 1 {
            limbs[1] = (magnitude.fract() * LIMB_BASE as f64) as u32;
        }
        Self {
            sign: value < 0.0,
            limbs,
            context,
        }
    }

    /// Parse a decimal string at the given precision.
    ///
    /// Accepts an optional leading `-` and either `.` or `,` as the decimal
    /// separator. Fractional digits are right-padded with zeros to the
    /// context's digit count; digits beyond the context are truncated.
    ///
    /// # Errors
    /// - `InvalidInput` for empty or non-numeric text
    /// - `Overflow` if the integer part does not fit an i32
    pub fn parse(text: &str, context: PrecisionContext) -> NumericResult<Self> {
        let s = text.trim();
        if s.is_empty() {
            return Err(NumericError::InvalidInput);
        }

        let (sign, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let len = context.limb_count();
        let mut limbs: Limbs = smallvec![0; len];

        let (int_str, frac_str) = match s.find(['.', ',']) {
            Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
            None => (s, None),
        };

        let int_val: i64 = int_str.parse().map_err(|_| NumericError::InvalidInput)?;
        if int_val > i32::MAX as i64 {
            return Err(NumericError::Overflow);
        }
        limbs[0] = int_val as u32;

        if let Some(frac) = frac_str {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(NumericError::InvalidInput);
            }
            let required = (len - 1) * DIGITS_PER_LIMB as usize;
            let mut padded = String::with_capacity(required);
            padded.push_str(frac);
            while padded.len() < required {
                padded.push('0');
            }
            for (i, limb) in limbs.iter_mut().skip(1).enumerate() {
                let start = i * DIGITS_PER_LIMB as usize;
                let chunk = &padded[start..start + DIGITS_PER_LIMB as usize];
                *limb = chunk.parse().map_err(|_| NumericError::InvalidInput)?;
            }
        }

        Ok(Self {
            sign,
            limbs,
            context,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The precision context this value was built at.
    #[inline]
    pub fn context(&self) -> PrecisionContext {
        self.context
    }

    /// Raw limb sequence, most-significant first. Limb 0 is the integer
    /// part; each remaining limb holds eight fractional digits.
    #[inline]
    pub fn limbs(&self) -> &[u32] {
        &self.limbs
    }

    /// True when every limb is zero, regardless of sign.
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&limb| limb == 0)
    }

    /// True when the sign flag marks this value as negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.sign
    }

    /// The value with its sign flipped.
    pub fn negate(&self) -> Self {
        Self {
            sign: !self.sign,
            limbs: self.limbs.clone(),
            context: self.context,
        }
    }

    /// Lossy conversion to a native `rust_decimal::Decimal`.
    ///
    /// Fractional limbs beyond `Decimal`'s 28-digit significand are
    /// discarded. Used by the decimal-native evaluator variant.
    pub fn to_decimal(&self) -> rust_decimal::Decimal {
        let mut d = rust_decimal::Decimal::from(self.limbs[0]);
        for (i, &limb) in self.limbs.iter().enumerate().skip(1) {
            let scale = DIGITS_PER_LIMB * i as u32;
            if scale > 28 {
                break;
            }
            d += rust_decimal::Decimal::new(limb as i64, scale);
        }
        if self.sign {
            -d
        } else {
            d
        }
    }

    // ========================================================================
    // Signed arithmetic
    // ========================================================================

    /// Signed addition into an explicit output context.
    pub fn add_with(a: &Self, b: &Self, context: PrecisionContext) -> Self {
        let (sign, limbs) = if a.sign == b.sign {
            (a.sign, add_magnitude(&a.limbs, &b.limbs, context))
        } else if abs_cmp(&a.limbs, &b.limbs) != Ordering::Less {
            (a.sign, sub_magnitude(&a.limbs, &b.limbs, context))
        } else {
            (b.sign, sub_magnitude(&b.limbs, &a.limbs, context))
        };
        Self {
            sign,
            limbs,
            context,
        }
    }

    /// Signed subtraction into an explicit output context.
    pub fn sub_with(a: &Self, b: &Self, context: PrecisionContext) -> Self {
        let (sign, limbs) = if a.sign == b.sign {
            if abs_cmp(&a.limbs, &b.limbs) != Ordering::Less {
                (a.sign, sub_magnitude(&a.limbs, &b.limbs, context))
            } else {
                (!a.sign, sub_magnitude(&b.limbs, &a.limbs, context))
            }
        } else {
            (a.sign, add_magnitude(&a.limbs, &b.limbs, context))
        };
        Self {
            sign,
            limbs,
            context,
        }
    }

    /// Signed multiplication into an explicit output context.
    pub fn mul_with(a: &Self, b: &Self, context: PrecisionContext) -> Self {
        Self {
            sign: a.sign ^ b.sign,
            limbs: mul_magnitude(&a.limbs, &b.limbs, context),
            context,
        }
    }

    /// Scalar fast path for small integer coefficients (the ×2, ×3, ×4 …
    /// terms of the iteration formulas). Keeps this value's context and
    /// avoids the full limb convolution.
    pub fn mul_small(&self, k: i32) -> Self {
        let mut limbs: Limbs = smallvec![0; self.limbs.len()];
        let factor = k.unsigned_abs() as u64;
        let mut carry = 0u64;
        for i in (0..self.limbs.len()).rev() {
            let v = self.limbs[i] as u64 * factor + carry;
            limbs[i] = (v % LIMB_BASE) as u32;
            carry = v / LIMB_BASE;
        }
        // carry out of the integer limb wraps, same as the convolution path
        Self {
            sign: self.sign ^ (k < 0),
            limbs,
            context: self.context,
        }
    }

    fn merged(a: &Self, b: &Self) -> PrecisionContext {
        PrecisionContext::merge(a.context, b.context, MergePolicy::Max)
    }
}

// ============================================================================
// Magnitude helpers
// All operate on most-significant-first limb slices; output is sized to the
// target context and missing input limbs read as zero.
// ============================================================================

#[inline]
fn limb_at(limbs: &[u32], index: usize) -> u32 {
    limbs.get(index).copied().unwrap_or(0)
}

/// Lexicographic magnitude comparison over the shared limb window.
fn abs_cmp(a: &[u32], b: &[u32]) -> Ordering {
    let n = a.len().min(b.len());
    for i in 0..n {
        match a[i].cmp(&b[i]) {
            Ordering::Equal => {},
            ord => return ord,
        }
    }
    Ordering::Equal
}

/// `|a| + |b|` at fixed width. The batched element-wise sum cannot wrap a
/// u32 because limbs stay below 10^8; the scalar carry pass afterwards is
/// mandatory and restores the limb invariant. Carry out of the integer limb
/// is discarded (fixed-point wrap).
fn add_magnitude(a: &[u32], b: &[u32], context: PrecisionContext) -> Limbs {
    let len = context.limb_count();
    let mut out: Limbs = smallvec![0; len];

    if len >= BATCH_MIN_LIMBS {
        let mut av: Limbs = smallvec![0; len];
        let mut bv: Limbs = smallvec![0; len];
        let an = a.len().min(len);
        let bn = b.len().min(len);
        av[..an].copy_from_slice(&a[..an]);
        bv[..bn].copy_from_slice(&b[..bn]);
        limb_adder().add_limbs(&av, &bv, &mut out);
    } else {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = limb_at(a, i) + limb_at(b, i);
        }
    }

    let mut carry = 0u32;
    for i in (0..len).rev() {
        let v = out[i] + carry;
        out[i] = (v as u64 % LIMB_BASE) as u32;
        carry = (v as u64 / LIMB_BASE) as u32;
    }
    out
}

/// `|a| - |b|` at fixed width; callers guarantee `|a| >= |b|` over the
/// output window. Borrow out of the integer limb is discarded.
fn sub_magnitude(a: &[u32], b: &[u32], context: PrecisionContext) -> Limbs {
    let len = context.limb_count();
    let mut out: Limbs = smallvec![0; len];
    let mut borrow = 0i64;
    for i in (0..len).rev() {
        let mut v = limb_at(a, i) as i64 - limb_at(b, i) as i64 - borrow;
        if v < 0 {
            v += LIMB_BASE as i64;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out[i] = v as u32;
    }
    out
}

/// Schoolbook `|a| * |b|` truncated to the output width.
///
/// Limb `i` carries weight 10^(-8i), so the product of limbs `i` and `j`
/// lands at index `i + j`. Products past the output length are dropped,
/// except index `len` whose upper half is absorbed into the last kept limb.
fn mul_magnitude(a: &[u32], b: &[u32], context: PrecisionContext) -> Limbs {
    let len = context.limb_count();
    let mut acc: Vec<u64> = vec![0; len];

    for (i, &ai) in a.iter().enumerate() {
        if ai == 0 {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            let idx = i + j;
            let prod = ai as u64 * bj as u64;
            if idx < len {
                acc[idx] += prod;
            } else if idx == len {
                acc[len - 1] += prod / LIMB_BASE;
            }
        }
    }

    let mut out: Limbs = smallvec![0; len];
    let mut carry = 0u64;
    for i in (0..len).rev() {
        let v = acc[i] + carry;
        out[i] = (v % LIMB_BASE) as u32;
        carry = v / LIMB_BASE;
    }
    out
}

// ============================================================================
// Operators
// Reference-based so iteration formulas can reuse operands; contexts merge
// with the Max policy.
// ============================================================================

impl Add for &BigDecimal {
    type Output = BigDecimal;

    fn add(self, rhs: Self) -> BigDecimal {
        BigDecimal::add_with(self, rhs, BigDecimal::merged(self, rhs))
    }
}

impl Sub for &BigDecimal {
    type Output = BigDecimal;

    fn sub(self, rhs: Self) -> BigDecimal {
        BigDecimal::sub_with(self, rhs, BigDecimal::merged(self, rhs))
    }
}

impl Mul for &BigDecimal {
    type Output = BigDecimal;

    fn mul(self, rhs: Self) -> BigDecimal {
        BigDecimal::mul_with(self, rhs, BigDecimal::merged(self, rhs))
    }
}

impl Neg for &BigDecimal {
    type Output = BigDecimal;

    fn neg(self) -> BigDecimal {
        self.negate()
    }
}

// ============================================================================
// Comparison
// Sign first (negative < positive unless both magnitudes are zero), then
// limbs lexicographically, most-significant first.
// ============================================================================

impl PartialEq for BigDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BigDecimal {}

impl PartialOrd for BigDecimal {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.sign, other.sign) {
            (false, false) => abs_cmp(&self.limbs, &other.limbs),
            (true, true) => abs_cmp(&other.limbs, &self.limbs),
            (true, false) => {
                if self.is_zero() && other.is_zero() {
                    Ordering::Equal
                } else {
                    Ordering::Less
                }
            },
            (false, true) => {
                if self.is_zero() && other.is_zero() {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            },
        }
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for BigDecimal {
    /// Renders sign, integer limb, then each fractional limb zero-padded to
    /// eight digits, truncating the final limb to the exact digit count the
    /// context implies.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign {
            write!(f, "-")?;
        }
        write!(f, "{}", self.limbs[0])?;
        if self.limbs.len() > 1 {
            write!(f, ".")?;
            let last = self.limbs.len() - 1;
            for (i, &limb) in self.limbs.iter().enumerate().skip(1) {
                let chunk = format!("{:08}", limb);
                if i == last {
                    let keep = ((self.context.digits() - 1) % DIGITS_PER_LIMB + 1) as usize;
                    f.write_str(&chunk[..keep])?;
                } else {
                    f.write_str(&chunk)?;
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(digits: i32) -> PrecisionContext {
        PrecisionContext::new(digits)
    }

    fn dec(s: &str, digits: i32) -> BigDecimal {
        BigDecimal::parse(s, ctx(digits)).unwrap()
    }

    #[test]
    fn test_parse_and_display_roundtrip() {
        let x = dec("1.5", 8);
        assert_eq!(x.to_string(), "1.50000000");
        assert_eq!(
            BigDecimal::parse(&x.to_string(), ctx(8)).unwrap(),
            x
        );

        let y = dec("-0.25", 8);
        assert_eq!(y.to_string(), "-0.25000000");

        let z = dec("42", 8);
        assert_eq!(z.to_string(), "42.00000000");
    }

    #[test]
    fn test_parse_comma_separator() {
        assert_eq!(dec("3,14", 8), dec("3.14", 8));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            BigDecimal::parse("", ctx(8)),
            Err(NumericError::InvalidInput)
        );
        assert_eq!(
            BigDecimal::parse("abc", ctx(8)),
            Err(NumericError::InvalidInput)
        );
        assert_eq!(
            BigDecimal::parse("1.2e3", ctx(8)),
            Err(NumericError::InvalidInput)
        );
        assert_eq!(
            BigDecimal::parse("99999999999", ctx(8)),
            Err(NumericError::Overflow)
        );
    }

    #[test]
    fn test_parse_truncates_excess_fraction() {
        // 10 fractional digits into an 8-digit context
        let x = dec("0.1234567891", 8);
        assert_eq!(x.to_string(), "0.12345678");
    }

    #[test]
    fn test_display_truncates_last_limb() {
        let x = dec("0.123456789", 9);
        // 9 digits: one full limb plus a single digit of the second
        assert_eq!(x.to_string(), "0.123456789");

        let y = dec("0.123", 3);
        assert_eq!(y.to_string(), "0.123");
    }

    #[test]
    fn test_addition_scenario() {
        let a = dec("1.5", 8);
        let b = dec("2.25", 8);
        assert_eq!((&a + &b).to_string(), "3.75000000");
    }

    #[test]
    fn test_multiplication_scenario() {
        let a = dec("1.5", 8);
        let b = dec("2.25", 8);
        assert_eq!((&a * &b).to_string(), "3.37500000");
    }

    #[test]
    fn test_additive_identity_and_inverse() {
        let x = dec("123.456", 8);
        let zero = BigDecimal::zero(ctx(8));
        assert_eq!(&x + &zero, x);
        assert_eq!(&x + &x.negate(), zero);
    }

    #[test]
    fn test_mixed_sign_addition() {
        let a = dec("5.5", 8);
        let b = dec("-2.25", 8);
        assert_eq!((&a + &b).to_string(), "3.25000000");
        assert_eq!((&b + &a).to_string(), "3.25000000");

        let c = dec("-5.5", 8);
        let d = dec("2.25", 8);
        assert_eq!((&c + &d).to_string(), "-3.25000000");
    }

    #[test]
    fn test_subtraction() {
        let a = dec("5.5", 8);
        let b = dec("2.25", 8);
        assert_eq!((&a - &b).to_string(), "3.25000000");
        assert_eq!((&b - &a).to_string(), "-3.25000000");

        // differing signs add magnitudes
        let c = dec("-1.5", 8);
        assert_eq!((&a - &c).to_string(), "7.00000000");
    }

    #[test]
    fn test_borrow_propagation() {
        let a = dec("1", 16);
        let b = dec("0.0000000000000001", 16);
        assert_eq!((&a - &b).to_string(), "0.9999999999999999");
    }

    #[test]
    fn test_carry_propagation() {
        let a = dec("0.99999999", 16);
        let b = dec("0.00000001", 16);
        assert_eq!((&a + &b).to_string(), "1.0000000000000000");
    }

    #[test]
    fn test_multiplication_signs() {
        let a = dec("2", 8);
        let b = dec("-3", 8);
        assert_eq!((&a * &b).to_string(), "-6.00000000");
        assert_eq!((&b * &b).to_string(), "9.00000000");
    }

    #[test]
    fn test_multiplication_cross_limb() {
        let a = dec("0.5", 16);
        assert_eq!((&a * &a).to_string(), "0.2500000000000000");

        let b = dec("0.00000001", 16);
        // 10^-8 squared lands exactly in the second fractional limb
        assert_eq!((&b * &b).to_string(), "0.0000000000000001");
    }

    #[test]
    fn test_mul_small() {
        let a = dec("1.25", 8);
        assert_eq!(a.mul_small(2).to_string(), "2.50000000");
        assert_eq!(a.mul_small(-4).to_string(), "-5.00000000");
        assert_eq!(dec("-0.5", 8).mul_small(3).to_string(), "-1.50000000");
    }

    #[test]
    fn test_mul_small_matches_full_multiply() {
        let a = dec("12.34567891", 16);
        let three = dec("3", 16);
        assert_eq!(a.mul_small(3), &a * &three);
    }

    #[test]
    fn test_context_merge_on_operation() {
        let a = dec("1.5", 8);
        let b = dec("2.5", 24);
        let sum = &a + &b;
        assert_eq!(sum.context().digits(), 24);
        assert_eq!(sum.limbs().len(), ctx(24).limb_count());
    }

    #[test]
    fn test_comparisons() {
        let a = dec("1.5", 8);
        let b = dec("2.25", 8);
        assert!(a < b);
        assert!(b > a);
        assert!(a <= a);
        assert!(a >= a);
        assert_ne!(a, b);

        let neg = dec("-1.5", 8);
        assert!(neg < a);
        assert!(neg < BigDecimal::zero(ctx(8)));
        assert!(dec("-1.5", 8) > dec("-2.25", 8));
    }

    #[test]
    fn test_signed_zero_equality() {
        let zero = BigDecimal::zero(ctx(8));
        let neg_zero = zero.negate();
        assert_eq!(zero, neg_zero);
        assert_eq!(zero.cmp(&neg_zero), Ordering::Equal);
    }

    #[test]
    fn test_from_f64() {
        let x = BigDecimal::from_f64(2.5, ctx(8));
        assert_eq!(x.to_string(), "2.50000000");

        let y = BigDecimal::from_f64(-0.25, ctx(8));
        assert_eq!(y.to_string(), "-0.25000000");
    }

    #[test]
    fn test_to_decimal() {
        let x = dec("3.375", 8);
        assert_eq!(x.to_decimal().to_string(), "3.37500000");

        let y = dec("-0.5", 8);
        assert!(y.to_decimal().is_sign_negative());
    }

    #[test]
    fn test_deep_precision_arithmetic() {
        let ctx40 = ctx(40);
        let tiny = BigDecimal::parse("0.0000000000000000000000000000000000000005", ctx40).unwrap();
        let doubled = tiny.mul_small(2);
        assert_eq!(
            doubled.to_string(),
            "0.0000000000000000000000000000000000000010"
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_decimal() -> impl Strategy<Value = BigDecimal> {
            (any::<bool>(), 0u32..10_000, 0u32..100_000_000).prop_map(|(neg, int, frac)| {
                let s = format!("{}{}.{:08}", if neg { "-" } else { "" }, int, frac);
                BigDecimal::parse(&s, PrecisionContext::new(16)).unwrap()
            })
        }

        proptest! {
            #[test]
            fn roundtrip_through_display(x in arb_decimal()) {
                let reparsed = BigDecimal::parse(&x.to_string(), x.context()).unwrap();
                prop_assert_eq!(reparsed, x);
            }

            #[test]
            fn addition_commutes(a in arb_decimal(), b in arb_decimal()) {
                prop_assert_eq!(&a + &b, &b + &a);
            }

            #[test]
            fn multiplication_commutes(a in arb_decimal(), b in arb_decimal()) {
                prop_assert_eq!(&a * &b, &b * &a);
            }

            #[test]
            fn additive_inverse_is_zero(a in arb_decimal()) {
                prop_assert!((&a + &a.negate()).is_zero());
            }

            #[test]
            fn comparison_trichotomy(a in arb_decimal(), b in arb_decimal()) {
                let outcomes =
                    [a < b, a == b, a > b].iter().filter(|&&o| o).count();
                prop_assert_eq!(outcomes, 1);
                prop_assert_eq!(a >= b, !(a < b));
            }
        }
    }
}
