// ============================================================================
// Numeric Module
// Arbitrary-precision fixed-point decimal arithmetic for deep-zoom rendering
// ============================================================================
//
// This module provides:
// - BigDecimal: signed fixed-point decimal over base-10^8 limbs
// - PrecisionContext: caller-selectable digit precision with merge policies
// - NumericError: error types for parsing and construction
//
// Design principles:
// - Base 10^8 so decimal parsing/formatting needs no base conversion
// - Immutable values; operations allocate into the merged output context
// - Parse/construction return Result; arithmetic on valid values is total
// - Batched SIMD limb addition is an optimization, never a correctness
//   requirement

mod big_decimal;
mod context;
mod errors;

pub use big_decimal::{BigDecimal, DIGITS_PER_LIMB, LIMB_BASE};
pub use context::{MergePolicy, PrecisionContext, DEFAULT_PRECISION};
pub use errors::{NumericError, NumericResult};
