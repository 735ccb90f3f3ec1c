// ============================================================================
// Frame Sink Interface
// Defines the contract for display/export collaborators
// ============================================================================

/// A completed (or partially refined) frame handed to a collaborator.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub width: u32,
    pub height: u32,
    /// Escape-time counts, indexed `x + width * y`.
    pub iterations: Vec<u32>,
    /// Packed ARGB colors, same indexing.
    pub colors: Vec<u32>,
}

/// Receives render progress notifications from the scheduler.
///
/// Implementations can drive a display surface, collect statistics, or do
/// nothing at all; the scheduler never blocks on them for correctness.
pub trait FrameSink: Send + Sync {
    /// A refinement stage finished; coarser data for the whole frame is now
    /// visible in the shared buffers.
    fn on_stage_complete(&self, stage: usize);

    /// A full pass (stage 0 inclusive) finished.
    fn on_pass_complete(&self, frame: FrameSnapshot);
}

/// No-op sink for testing.
pub struct NoOpFrameSink;

impl FrameSink for NoOpFrameSink {
    fn on_stage_complete(&self, _stage: usize) {}

    fn on_pass_complete(&self, _frame: FrameSnapshot) {}
}

/// Logging sink.
pub struct LoggingFrameSink;

impl FrameSink for LoggingFrameSink {
    fn on_stage_complete(&self, stage: usize) {
        tracing::debug!(stage, "render stage complete");
    }

    fn on_pass_complete(&self, frame: FrameSnapshot) {
        tracing::info!(
            width = frame.width,
            height = frame.height,
            "render pass complete"
        );
    }
}
