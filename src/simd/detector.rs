// ============================================================================
// CPU Detection and Limb Adder Factory
// Runtime detection of CPU capabilities and optimal adder selection
// ============================================================================

use super::scalar::ScalarAdder;
use super::traits::LimbAdder;
use std::sync::Arc;

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// x86_64 (Intel/AMD 64-bit)
    X86_64,
    /// aarch64 (ARM 64-bit, including Apple Silicon)
    Aarch64,
    /// Unknown or unsupported architecture
    Other,
}

impl Architecture {
    /// Detect the current CPU architecture.
    #[inline]
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Architecture::X86_64
        }
        #[cfg(target_arch = "aarch64")]
        {
            Architecture::Aarch64
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Architecture::Other
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::Aarch64 => write!(f, "aarch64"),
            Architecture::Other => write!(f, "other"),
        }
    }
}

/// SIMD capability level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimdLevel {
    /// No SIMD, scalar operations only
    None,
    /// ARM NEON (128-bit, 4x u32)
    Neon,
    /// x86 AVX2 (256-bit, 8x u32)
    Avx2,
}

impl SimdLevel {
    /// Detect the highest available SIMD level for the current CPU.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") {
                return SimdLevel::Avx2;
            }
            SimdLevel::None
        }

        #[cfg(target_arch = "aarch64")]
        {
            // NEON is always available on aarch64
            SimdLevel::Neon
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            SimdLevel::None
        }
    }
}

impl std::fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimdLevel::None => write!(f, "None (Scalar)"),
            SimdLevel::Neon => write!(f, "ARM NEON"),
            SimdLevel::Avx2 => write!(f, "AVX2"),
        }
    }
}

/// Detected CPU capabilities.
#[derive(Debug, Clone, Copy)]
pub struct CpuCapabilities {
    /// The CPU architecture
    pub architecture: Architecture,
    /// The highest available SIMD level
    pub simd_level: SimdLevel,
}

impl CpuCapabilities {
    /// Detect CPU capabilities at runtime.
    pub fn detect() -> Self {
        Self {
            architecture: Architecture::detect(),
            simd_level: SimdLevel::detect(),
        }
    }
}

impl std::fmt::Display for CpuCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CPU: {} with {}", self.architecture, self.simd_level)
    }
}

/// Create the optimal limb adder for the current CPU.
///
/// - AVX2 on x86_64 with AVX2 support
/// - NEON on aarch64 (always available)
/// - Scalar fallback on other platforms
pub fn create_limb_adder() -> Arc<dyn LimbAdder> {
    let caps = CpuCapabilities::detect();

    match caps.simd_level {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => {
            use super::avx2::Avx2Adder;
            Arc::new(Avx2Adder::new())
        },

        #[cfg(target_arch = "aarch64")]
        SimdLevel::Neon => {
            use super::neon::NeonAdder;
            Arc::new(NeonAdder::new())
        },

        _ => Arc::new(ScalarAdder::new()),
    }
}

/// Create a scalar adder (for testing or comparison).
pub fn create_scalar_adder() -> Arc<dyn LimbAdder> {
    Arc::new(ScalarAdder::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_architecture_detect() {
        let arch = Architecture::detect();
        assert!(matches!(
            arch,
            Architecture::X86_64 | Architecture::Aarch64 | Architecture::Other
        ));
    }

    #[test]
    fn test_simd_level_detect() {
        let level = SimdLevel::detect();
        assert!(matches!(
            level,
            SimdLevel::None | SimdLevel::Neon | SimdLevel::Avx2
        ));
    }

    #[test]
    fn test_create_limb_adder() {
        let adder = create_limb_adder();
        let name = adder.name();

        #[cfg(target_arch = "aarch64")]
        assert_eq!(name, "NEON");

        #[cfg(target_arch = "x86_64")]
        assert!(
            name == "AVX2" || name == "Scalar",
            "Unexpected adder name: {}",
            name
        );
    }

    #[test]
    fn test_create_scalar_adder() {
        assert_eq!(create_scalar_adder().name(), "Scalar");
    }

    #[test]
    fn test_detected_adder_matches_scalar() {
        let simd = create_limb_adder();
        let scalar = create_scalar_adder();

        let a: Vec<u32> = (0..37).map(|i| i * 7_654_321 % 100_000_000).collect();
        let b: Vec<u32> = (0..37).map(|i| i * 1_234_567 % 100_000_000).collect();
        let mut simd_out = vec![0u32; 37];
        let mut scalar_out = vec![0u32; 37];

        simd.add_limbs(&a, &b, &mut simd_out);
        scalar.add_limbs(&a, &b, &mut scalar_out);

        assert_eq!(simd_out, scalar_out);
    }

    #[test]
    fn test_simd_level_ordering() {
        assert!(SimdLevel::None < SimdLevel::Neon);
        assert!(SimdLevel::Neon < SimdLevel::Avx2);
    }
}
