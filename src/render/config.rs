// ============================================================================
// Render Configuration
// Comprehensive configuration for the render engine and export pipeline
// ============================================================================

use crate::fractal::FractalKind;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a [`RenderEngine`](crate::render::RenderEngine) instance.
///
/// Preview dimensions describe the interactive display surface; export
/// dimensions are independent and only used by the image/sequence modes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RenderConfig {
    /// Interactive preview surface width in pixels
    pub preview_width: u32,

    /// Interactive preview surface height in pixels
    pub preview_height: u32,

    /// Export image width in pixels
    pub export_width: u32,

    /// Export image height in pixels
    pub export_height: u32,

    /// Directory receiving exported images
    pub output_dir: PathBuf,

    /// Fractal variant to evaluate
    pub kind: FractalKind,

    /// Escape-time iteration limit
    pub iteration_limit: u32,

    /// Initial decimal precision in digits
    pub precision_digits: u32,

    /// Worker thread count; `None` uses available hardware parallelism
    pub worker_threads: Option<usize>,
}

impl RenderConfig {
    pub fn new(preview_width: u32, preview_height: u32) -> Self {
        Self {
            preview_width,
            preview_height,
            export_width: 1920,
            export_height: 1080,
            output_dir: PathBuf::from("."),
            kind: FractalKind::default(),
            iteration_limit: 100,
            precision_digits: 8,
            worker_threads: None,
        }
    }

    /// Builder: set export dimensions
    pub fn with_export_resolution(mut self, width: u32, height: u32) -> Self {
        self.export_width = width;
        self.export_height = height;
        self
    }

    /// Builder: set output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Builder: set fractal variant
    pub fn with_kind(mut self, kind: FractalKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder: set iteration limit
    pub fn with_iteration_limit(mut self, limit: u32) -> Self {
        self.iteration_limit = limit;
        self
    }

    /// Builder: set initial precision in decimal digits
    pub fn with_precision_digits(mut self, digits: u32) -> Self {
        self.precision_digits = digits;
        self
    }

    /// Builder: fix the worker thread count
    pub fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = Some(workers);
        self
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.preview_width == 0 || self.preview_height == 0 {
            return Err("preview dimensions must be non-zero".to_string());
        }
        if self.export_width == 0 || self.export_height == 0 {
            return Err("export dimensions must be non-zero".to_string());
        }
        if self.iteration_limit == 0 {
            return Err("iteration limit must be non-zero".to_string());
        }
        if let Some(workers) = self.worker_threads {
            if workers == 0 {
                return Err("worker thread count must be non-zero".to_string());
            }
        }
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

// ============================================================================
// Preset Configurations
// ============================================================================

impl RenderConfig {
    /// Default interactive preview setup
    pub fn preview_default() -> Self {
        Self::new(800, 600)
    }

    /// 1080p export with a standard preview surface
    pub fn export_1080p() -> Self {
        Self::new(800, 600).with_export_resolution(1920, 1080)
    }

    /// 4K export
    pub fn export_4k() -> Self {
        Self::new(800, 600).with_export_resolution(3840, 2160)
    }

    /// Small single-threaded setup for deterministic tests
    pub fn test_small() -> Self {
        Self::new(16, 16)
            .with_export_resolution(16, 16)
            .with_iteration_limit(50)
            .with_worker_threads(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = RenderConfig::new(0, 600);
        assert!(config.validate().is_err());

        let config = RenderConfig::new(800, 600).with_export_resolution(1920, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = RenderConfig::default().with_worker_threads(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_chain() {
        let config = RenderConfig::new(640, 480)
            .with_kind(FractalKind::MandelbrotPower3)
            .with_iteration_limit(500)
            .with_precision_digits(16)
            .with_worker_threads(4);
        assert_eq!(config.kind, FractalKind::MandelbrotPower3);
        assert_eq!(config.iteration_limit, 500);
        assert_eq!(config.precision_digits, 16);
        assert_eq!(config.worker_threads, Some(4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(RenderConfig::export_1080p().export_width, 1920);
        assert_eq!(RenderConfig::export_4k().export_height, 2160);
        assert_eq!(RenderConfig::test_small().worker_threads, Some(1));
    }
}
