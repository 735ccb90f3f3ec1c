// ============================================================================
// Render Module
// Progressive multithreaded tile scheduler over the fractal evaluator
// ============================================================================
//
// A render pass refines the surface in five stages, from 16 px tiles down
// to single pixels. Worker threads own disjoint strided partitions of a
// shuffled per-stage tile table; a supervisor thread acts as the barrier
// between stages and drives export continuations. View changes install a
// new pass plan under a bumped epoch, which doubles as the cancellation
// signal for in-flight workers.

mod buffer;
mod config;
mod engine;
mod export;
mod progress;
mod scheduler;
mod stages;

pub use buffer::PixelBuffer;
pub use config::RenderConfig;
pub use engine::{RenderEngine, RenderMode, EXPORT_START_STAGE, PREVIEW_START_STAGE};
pub use export::{frame_file_name, save_frame, ExportError};
pub use progress::{export_progress, preview_progress};
pub use stages::{StageTables, PROGRESS_OFFSETS, PROGRESS_SCALES, STAGE_COUNT, TILE_SIDES};
