// ============================================================================
// Interfaces Module
// Seams toward the excluded UI/display/export collaborators
// ============================================================================

mod color_mapper;
mod frame_sink;

pub use color_mapper::{ColorMapper, IterationMapper, MonochromeMapper};
pub use frame_sink::{FrameSink, FrameSnapshot, LoggingFrameSink, NoOpFrameSink};
