// ============================================================================
// Render Engine
// Owns the view state, worker pool, supervisor, and per-pass buffers
// ============================================================================

use crate::fractal::{FractalKind, FractalView};
use crate::interfaces::{ColorMapper, FrameSink, FrameSnapshot, MonochromeMapper, NoOpFrameSink};
use crate::numeric::{BigDecimal, PrecisionContext};
use crate::render::buffer::PixelBuffer;
use crate::render::config::RenderConfig;
use crate::render::export::{self, ExportError};
use crate::render::progress::{export_progress, preview_progress};
use crate::render::scheduler::{self, StageDone};
use crate::render::stages::StageTables;
use crossbeam::channel::{self, Sender};
use parking_lot::{Condvar, Mutex, RwLock};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Stage a fresh preview pass starts at (coarsest, 16 px tiles).
pub const PREVIEW_START_STAGE: usize = 4;

/// Stage export passes start at (2 px tiles; the coarse reveal stages add
/// nothing to a non-interactive render).
pub const EXPORT_START_STAGE: usize = 1;

/// Scale limb threshold for the dynamic precision heuristics (`10^7`, one
/// decimal order below the limb base).
const PRECISION_LIMB_THRESHOLD: u32 = 10_000_000;

/// Zoom-sequence frames start from this plane scale and halve per frame.
const SEQUENCE_START_SCALE: i32 = 10;

// ============================================================================
// Render Mode
// ============================================================================

/// What the engine is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Interactive refinement of the display surface
    Preview,
    /// One full-resolution export pass
    RenderImage,
    /// One pass per zoom step, each saved as a numbered frame
    RenderImageSequence { frame: usize, frame_count: usize },
}

// ============================================================================
// Pass Plan
// ============================================================================

/// Immutable snapshot of everything a render pass needs.
///
/// A new plan is installed (with a bumped epoch) on every view change; the
/// epoch is the cancellation token workers check between work items. Buffers
/// and tables are shared via `Arc` so a stale pass can finish its current
/// work item harmlessly while a fresh pass overwrites the same surface.
pub(crate) struct PassPlan {
    pub(crate) epoch: u64,
    pub(crate) mode: RenderMode,
    pub(crate) view: Arc<FractalView>,
    pub(crate) tables: Arc<StageTables>,
    pub(crate) iterations: Arc<PixelBuffer>,
    pub(crate) colors: Arc<PixelBuffer>,
}

/// Where the current pass stands: which epoch and which stage (None = the
/// pass is complete and workers are parked).
pub(crate) struct Cursor {
    pub(crate) epoch: u64,
    pub(crate) stage: Option<usize>,
}

// ============================================================================
// View Control State
// ============================================================================

/// The single-writer view state behind the pan/zoom/limit mutators.
pub(crate) struct ViewControl {
    pub(crate) center_x: BigDecimal,
    pub(crate) center_y: BigDecimal,
    pub(crate) scale: BigDecimal,
    pub(crate) context: PrecisionContext,
    pub(crate) kind: FractalKind,
    pub(crate) iteration_limit: u32,
    pub(crate) surface_width: u32,
    pub(crate) surface_height: u32,
    pub(crate) export_width: u32,
    pub(crate) export_height: u32,
    pub(crate) last_export_error: Option<ExportError>,
}

impl ViewControl {
    /// Build the immutable per-pass view snapshot, optionally overriding the
    /// scale (zoom-sequence frames render at a per-frame scale).
    pub(crate) fn view(&self, width: u32, height: u32, scale: Option<BigDecimal>) -> FractalView {
        FractalView::new(
            width,
            height,
            self.center_x.clone(),
            self.center_y.clone(),
            scale.unwrap_or_else(|| self.scale.clone()),
            self.context,
            self.kind,
            self.iteration_limit,
        )
    }
}

// ============================================================================
// Shared Engine State
// ============================================================================

/// State shared between the engine facade, its workers, and the supervisor.
pub(crate) struct EngineShared {
    pub(crate) plan: RwLock<Arc<PassPlan>>,
    pub(crate) cursor: Mutex<Cursor>,
    pub(crate) wake: Condvar,
    /// Epoch of the most recently installed pass; workers compare against
    /// their pass's epoch between work items and abandon stale partitions.
    pub(crate) current_epoch: AtomicU64,
    /// Per-worker position within the current stage table
    pub(crate) progress: Vec<AtomicUsize>,
    pub(crate) worker_count: usize,
    pub(crate) stage_done: Sender<StageDone>,
    pub(crate) shutdown: AtomicBool,
    pub(crate) color_mapper: Arc<dyn ColorMapper>,
    pub(crate) sink: Arc<dyn FrameSink>,
    pub(crate) control: Mutex<ViewControl>,
    pub(crate) output_dir: PathBuf,
}

impl EngineShared {
    /// Install a new pass: bump the epoch, swap the plan, reset the
    /// per-worker progress counters, point the cursor at `start_stage`, and
    /// wake the pool. This is the synchronization boundary between view
    /// mutations and worker reads.
    ///
    /// `reuse_surface` keeps the previous plan's tables and buffers when the
    /// dimensions match (preview resets), so the stale image stays on screen
    /// while the new pass refines over it.
    pub(crate) fn install_pass(
        &self,
        mode: RenderMode,
        width: u32,
        height: u32,
        view: FractalView,
        start_stage: usize,
        reuse_surface: bool,
    ) -> u64 {
        let mut cursor = self.cursor.lock();
        let epoch = self.current_epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let (tables, iterations, colors) = {
            let prev = self.plan.read();
            if reuse_surface && prev.tables.width() == width && prev.tables.height() == height {
                (
                    Arc::clone(&prev.tables),
                    Arc::clone(&prev.iterations),
                    Arc::clone(&prev.colors),
                )
            } else {
                (
                    Arc::new(StageTables::build(width, height)),
                    Arc::new(PixelBuffer::new(width, height)),
                    Arc::new(PixelBuffer::new(width, height)),
                )
            }
        };

        *self.plan.write() = Arc::new(PassPlan {
            epoch,
            mode,
            view: Arc::new(view),
            tables,
            iterations,
            colors,
        });
        for (worker, position) in self.progress.iter().enumerate() {
            position.store(worker, Ordering::Relaxed);
        }
        cursor.epoch = epoch;
        cursor.stage = Some(start_stage);
        drop(cursor);
        self.wake.notify_all();

        tracing::debug!(epoch, ?mode, width, height, start_stage, "render pass installed");
        epoch
    }

    /// Start (or restart) an interactive preview pass from the control state.
    pub(crate) fn begin_preview_pass(&self, control: &ViewControl, reuse_surface: bool) {
        let view = control.view(control.surface_width, control.surface_height, None);
        self.install_pass(
            RenderMode::Preview,
            control.surface_width,
            control.surface_height,
            view,
            PREVIEW_START_STAGE,
            reuse_surface,
        );
    }

    /// Save a completed export pass and continue: revert to preview after a
    /// single image, advance to the next frame of a sequence. On failure the
    /// error is recorded for retry and the buffers and mode stay untouched.
    pub(crate) fn complete_export_pass(&self, plan: &PassPlan) {
        let mut control = self.control.lock();
        let frame = match plan.mode {
            RenderMode::RenderImageSequence { frame, .. } => Some(frame),
            _ => None,
        };
        let colors = plan.colors.snapshot();
        let result = export::save_frame(
            &self.output_dir,
            plan.tables.width(),
            plan.tables.height(),
            &colors,
            control.export_width,
            control.export_height,
            frame,
        );

        match result {
            Ok(path) => {
                tracing::info!(path = %path.display(), "frame exported");
                control.last_export_error = None;
                match plan.mode {
                    RenderMode::RenderImage => self.begin_preview_pass(&control, false),
                    RenderMode::RenderImageSequence { frame, frame_count } => {
                        let next = frame + 1;
                        if next < frame_count {
                            let scale = sequence_frame_scale(control.context, next);
                            let width = control.export_width * 2;
                            let height = control.export_height * 2;
                            let view = control.view(width, height, Some(scale));
                            self.install_pass(
                                RenderMode::RenderImageSequence {
                                    frame: next,
                                    frame_count,
                                },
                                width,
                                height,
                                view,
                                EXPORT_START_STAGE,
                                true,
                            );
                        } else {
                            self.begin_preview_pass(&control, false);
                        }
                    }
                    RenderMode::Preview => {}
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "frame export failed; buffers retained for retry");
                control.last_export_error = Some(err);
            }
        }
    }
}

// ============================================================================
// Dynamic Precision Heuristics
// ============================================================================

/// The scale has zoomed deep enough that only the last limb carries digits
/// and even that is small: grow the context by one limb width.
pub(crate) fn requires_more_precision(limbs: &[u32]) -> bool {
    match limbs.split_last() {
        Some((last, rest)) => rest.iter().all(|&limb| limb == 0) && *last < PRECISION_LIMB_THRESHOLD,
        None => false,
    }
}

/// The scale has grown back out: digits live in the upper limbs again, so
/// one limb width of precision can be shed.
pub(crate) fn requires_less_precision(limbs: &[u32]) -> bool {
    if limbs.len() < 2 {
        return false;
    }
    if limbs[..limbs.len() - 2].iter().any(|&limb| limb != 0) {
        return true;
    }
    limbs[limbs.len() - 2] > PRECISION_LIMB_THRESHOLD
}

// ============================================================================
// Zoom Sequence Helpers
// ============================================================================

/// Scale of sequence frame `frame`: the starting scale halved `frame` times.
pub(crate) fn sequence_frame_scale(context: PrecisionContext, frame: usize) -> BigDecimal {
    let half = BigDecimal::from_f64(0.5, context);
    let mut scale = BigDecimal::from_i32(SEQUENCE_START_SCALE, context);
    for _ in 0..frame {
        scale = BigDecimal::mul_with(&scale, &half, context);
    }
    scale
}

/// Number of halvings needed to bring the starting scale down to `scale`.
/// A scale at or below zero has no frame that reaches it; the halving
/// sequence only ever converges onto strictly positive targets.
pub(crate) fn sequence_frame_count(scale: &BigDecimal, context: PrecisionContext) -> usize {
    if scale.is_negative() || scale.is_zero() {
        return 0;
    }
    let half = BigDecimal::from_f64(0.5, context);
    let mut test = BigDecimal::from_i32(SEQUENCE_START_SCALE, context);
    let mut frames = 0;
    while &test > scale {
        test = BigDecimal::mul_with(&test, &half, context);
        frames += 1;
    }
    frames
}

fn decimal_literal(value: f64) -> String {
    format!("{value:.16}")
}

// ============================================================================
// Render Engine
// ============================================================================

/// Progressive multithreaded fractal renderer.
///
/// Owns a joinable worker pool and a supervisor thread; all view state and
/// pixel buffers live on the instance, so independent engines can coexist
/// (one per display surface, or several in tests). Dropping the engine
/// signals shutdown and joins every thread.
pub struct RenderEngine {
    shared: Arc<EngineShared>,
    workers: Vec<JoinHandle<()>>,
    supervisor: Option<JoinHandle<()>>,
}

impl RenderEngine {
    /// Create an engine with explicit collaborators and start rendering the
    /// initial view (Mandelbrot power 2 framing at scale 4 unless the config
    /// says otherwise).
    pub fn new(
        config: RenderConfig,
        color_mapper: Arc<dyn ColorMapper>,
        sink: Arc<dyn FrameSink>,
    ) -> Result<Self, String> {
        config.validate()?;

        let worker_count = config
            .worker_threads
            .unwrap_or_else(crate::utils::worker_count);
        let context = PrecisionContext::new(config.precision_digits as i32);

        let control = ViewControl {
            center_x: BigDecimal::zero(context),
            center_y: BigDecimal::zero(context),
            scale: BigDecimal::from_i32(4, context),
            context,
            kind: config.kind,
            iteration_limit: config.iteration_limit,
            surface_width: config.preview_width,
            surface_height: config.preview_height,
            export_width: config.export_width,
            export_height: config.export_height,
            last_export_error: None,
        };
        let initial_view = control.view(config.preview_width, config.preview_height, None);
        let initial_plan = PassPlan {
            epoch: 1,
            mode: RenderMode::Preview,
            view: Arc::new(initial_view),
            tables: Arc::new(StageTables::build(
                config.preview_width,
                config.preview_height,
            )),
            iterations: Arc::new(PixelBuffer::new(config.preview_width, config.preview_height)),
            colors: Arc::new(PixelBuffer::new(config.preview_width, config.preview_height)),
        };

        let (stage_done, stage_done_rx) = channel::unbounded();
        let shared = Arc::new(EngineShared {
            plan: RwLock::new(Arc::new(initial_plan)),
            cursor: Mutex::new(Cursor {
                epoch: 1,
                stage: Some(PREVIEW_START_STAGE),
            }),
            wake: Condvar::new(),
            current_epoch: AtomicU64::new(1),
            progress: (0..worker_count).map(AtomicUsize::new).collect(),
            worker_count,
            stage_done,
            shutdown: AtomicBool::new(false),
            color_mapper,
            sink,
            control: Mutex::new(control),
            output_dir: config.output_dir.clone(),
        });

        let mut workers = Vec::with_capacity(worker_count);
        for worker in 0..worker_count {
            let shared = Arc::clone(&shared);
            let handle = std::thread::Builder::new()
                .name(format!("render-worker-{worker}"))
                .spawn(move || scheduler::worker_loop(shared, worker))
                .map_err(|err| format!("failed to spawn worker thread: {err}"))?;
            workers.push(handle);
        }
        let supervisor = {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name("render-supervisor".to_string())
                .spawn(move || scheduler::supervisor_loop(shared, stage_done_rx))
                .map_err(|err| format!("failed to spawn supervisor thread: {err}"))?
        };

        tracing::info!(
            workers = worker_count,
            width = config.preview_width,
            height = config.preview_height,
            "render engine started"
        );

        Ok(Self {
            shared,
            workers,
            supervisor: Some(supervisor),
        })
    }

    /// Engine with the stock monochrome mapper and no frame sink.
    pub fn with_defaults(config: RenderConfig) -> Result<Self, String> {
        Self::new(config, Arc::new(MonochromeMapper), Arc::new(NoOpFrameSink))
    }

    // ------------------------------------------------------------------------
    // View control
    // ------------------------------------------------------------------------

    /// Replace the whole view atomically and restart the preview pass.
    #[allow(clippy::too_many_arguments)]
    pub fn set_view_state(
        &self,
        width: u32,
        height: u32,
        center_x: BigDecimal,
        center_y: BigDecimal,
        scale: BigDecimal,
        context: PrecisionContext,
        kind: FractalKind,
        iteration_limit: u32,
    ) {
        let mut control = self.shared.control.lock();
        control.surface_width = width;
        control.surface_height = height;
        control.center_x = center_x;
        control.center_y = center_y;
        control.scale = scale;
        control.context = context;
        control.kind = kind;
        control.iteration_limit = iteration_limit;
        self.apply_view(&mut control);
    }

    /// Pan by a pixel-space delta, converted to a plane-space offset at the
    /// current scale.
    pub fn pan_view(&self, dx_pixels: f64, dy_pixels: f64) {
        let mut control = self.shared.control.lock();
        let ctx = control.context;
        let dx = match BigDecimal::parse(&decimal_literal(0.0005 * dx_pixels), ctx) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "pan delta not representable");
                return;
            }
        };
        let dy = match BigDecimal::parse(&decimal_literal(0.0005 * dy_pixels), ctx) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "pan delta not representable");
                return;
            }
        };
        let dx = BigDecimal::mul_with(&dx, &control.scale, ctx);
        let dy = BigDecimal::mul_with(&dy, &control.scale, ctx);
        control.center_x = BigDecimal::sub_with(&control.center_x, &dx, ctx);
        control.center_y = BigDecimal::sub_with(&control.center_y, &dy, ctx);
        self.apply_view(&mut control);
    }

    /// Zoom by a wheel delta: `scale *= 1 - 0.0005 * delta`.
    pub fn zoom_view(&self, wheel_delta: f64) {
        let mut control = self.shared.control.lock();
        let ctx = control.context;
        let factor = match BigDecimal::parse(&decimal_literal(1.0 - 0.0005 * wheel_delta), ctx) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "zoom factor not representable");
                return;
            }
        };
        control.scale = BigDecimal::mul_with(&control.scale, &factor, ctx);
        self.apply_view(&mut control);
    }

    /// Adjust the iteration limit; a result at or below zero snaps back to
    /// the default of 100.
    pub fn change_iteration_limit(&self, delta: i32) {
        let mut control = self.shared.control.lock();
        let limit = control.iteration_limit as i64 + delta as i64;
        control.iteration_limit = if limit <= 0 { 100 } else { limit as u32 };
        self.apply_view(&mut control);
    }

    /// Configure export dimensions, independent of the display surface.
    pub fn set_export_resolution(&self, width: u32, height: u32) {
        let mut control = self.shared.control.lock();
        control.export_width = width;
        control.export_height = height;
    }

    /// Resize the preview surface, reallocating buffers and restarting the
    /// pass. Ignored while an export is in flight.
    pub fn resize_surface(&self, width: u32, height: u32) {
        let mut control = self.shared.control.lock();
        control.surface_width = width;
        control.surface_height = height;
        if self.mode() == RenderMode::Preview {
            self.shared.begin_preview_pass(&control, false);
        }
    }

    /// Re-evaluate precision against the current scale, re-parse the view
    /// values into any new context, and restart the preview pass. No-op
    /// outside Preview mode (export passes run to completion).
    fn apply_view(&self, control: &mut ViewControl) {
        if self.mode() != RenderMode::Preview {
            return;
        }

        let digits = control.context.digits() as i32;
        let new_digits = if requires_more_precision(control.scale.limbs()) {
            Some(digits + 8)
        } else if requires_less_precision(control.scale.limbs()) {
            Some(digits - 8)
        } else {
            None
        };
        if let Some(new_digits) = new_digits {
            let new_context = PrecisionContext::new(new_digits);
            match reparse_at(control, new_context) {
                Ok(()) => {
                    tracing::info!(
                        from = digits,
                        to = new_context.digits(),
                        "adjusted render precision"
                    );
                }
                Err(err) => {
                    tracing::warn!(error = %err, "precision change failed; keeping current context");
                }
            }
        }

        self.shared.begin_preview_pass(control, true);
    }

    // ------------------------------------------------------------------------
    // Export modes
    // ------------------------------------------------------------------------

    /// Render one image at export resolution and save it, then revert to
    /// preview. Ignored unless currently previewing.
    pub fn render_image(&self) {
        let control = self.shared.control.lock();
        if self.mode() != RenderMode::Preview {
            return;
        }
        let width = control.export_width;
        let height = control.export_height;
        let view = control.view(width, height, None);
        self.shared.install_pass(
            RenderMode::RenderImage,
            width,
            height,
            view,
            EXPORT_START_STAGE,
            false,
        );
    }

    /// Render a zoom sequence: one frame per halving of the starting scale
    /// down to the current scale, each at twice the export resolution.
    /// Ignored unless currently previewing, or when already zoomed out past
    /// the starting scale.
    pub fn render_image_sequence(&self) {
        let control = self.shared.control.lock();
        if self.mode() != RenderMode::Preview {
            return;
        }
        let frame_count = sequence_frame_count(&control.scale, control.context);
        if frame_count == 0 {
            tracing::warn!("zoom sequence skipped: current scale is at or above the start scale");
            return;
        }
        let width = control.export_width * 2;
        let height = control.export_height * 2;
        let scale = sequence_frame_scale(control.context, 0);
        let view = control.view(width, height, Some(scale));
        self.shared.install_pass(
            RenderMode::RenderImageSequence {
                frame: 0,
                frame_count,
            },
            width,
            height,
            view,
            EXPORT_START_STAGE,
            false,
        );
    }

    /// Re-attempt the save of a completed export pass whose previous save
    /// failed. Returns false when there is nothing to retry.
    pub fn retry_export(&self) -> bool {
        let plan = Arc::clone(&self.shared.plan.read());
        if plan.mode == RenderMode::Preview || !self.is_idle() {
            return false;
        }
        if self.shared.control.lock().last_export_error.is_none() {
            return false;
        }
        self.shared.complete_export_pass(&plan);
        self.shared.control.lock().last_export_error.is_none()
    }

    /// True when the last export attempt failed and has not been retried.
    pub fn has_export_error(&self) -> bool {
        self.shared.control.lock().last_export_error.is_some()
    }

    /// Take the most recent export failure, if any.
    pub fn take_export_error(&self) -> Option<ExportError> {
        self.shared.control.lock().last_export_error.take()
    }

    // ------------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------------

    /// Current render mode.
    pub fn mode(&self) -> RenderMode {
        self.shared.plan.read().mode
    }

    /// Stage the current pass is refining, `None` once it has converged.
    pub fn current_stage(&self) -> Option<usize> {
        self.shared.cursor.lock().stage
    }

    /// True when the current pass has run to completion.
    pub fn is_idle(&self) -> bool {
        self.current_stage().is_none()
    }

    /// Block until the current pass completes or `timeout` elapses.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_idle() {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        true
    }

    /// Weighted progress fraction in `[0, 1]` for the current pass.
    pub fn progress(&self) -> f64 {
        let plan = Arc::clone(&self.shared.plan.read());
        let stage = {
            let cursor = self.shared.cursor.lock();
            if cursor.epoch != plan.epoch {
                return 0.0;
            }
            match cursor.stage {
                Some(stage) => stage,
                None => return 1.0,
            }
        };
        let table_len = plan.tables.table(stage).len();
        let sum: usize = self
            .shared
            .progress
            .iter()
            .map(|position| position.load(Ordering::Relaxed))
            .sum();
        let average = (sum / self.shared.worker_count).min(table_len);
        match plan.mode {
            RenderMode::Preview => preview_progress(stage, average, table_len),
            _ => export_progress(stage, average, table_len),
        }
    }

    /// Dimensions of the surface the current pass renders to.
    pub fn surface_size(&self) -> (u32, u32) {
        let plan = self.shared.plan.read();
        (plan.tables.width(), plan.tables.height())
    }

    /// Copy of the iteration buffer.
    pub fn iteration_snapshot(&self) -> Vec<u32> {
        self.shared.plan.read().iterations.snapshot()
    }

    /// Copy of the color buffer.
    pub fn color_snapshot(&self) -> Vec<u32> {
        self.shared.plan.read().colors.snapshot()
    }

    /// Full frame snapshot (dimensions plus both buffers).
    pub fn frame_snapshot(&self) -> FrameSnapshot {
        let plan = Arc::clone(&self.shared.plan.read());
        FrameSnapshot {
            width: plan.tables.width(),
            height: plan.tables.height(),
            iterations: plan.iterations.snapshot(),
            colors: plan.colors.snapshot(),
        }
    }

    /// Current precision in decimal digits.
    pub fn precision_digits(&self) -> u32 {
        self.shared.control.lock().context.digits()
    }

    /// Current iteration limit.
    pub fn iteration_limit(&self) -> u32 {
        self.shared.control.lock().iteration_limit
    }

    /// Current plane-units-per-view scale.
    pub fn scale(&self) -> BigDecimal {
        self.shared.control.lock().scale.clone()
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.shared.worker_count
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Signal shutdown and join the worker pool and supervisor.
    pub fn shutdown(&mut self) {
        if self.shared.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        // take the cursor lock so no worker can slip between its shutdown
        // check and the condvar wait without seeing the flag
        drop(self.shared.cursor.lock());
        self.shared.wake.notify_all();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        if let Some(handle) = self.supervisor.take() {
            let _ = handle.join();
        }
        tracing::info!("render engine stopped");
    }
}

impl Drop for RenderEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Redistribute the view values into a new precision context via their
/// string renderings. All three must re-parse before any is committed.
fn reparse_at(
    control: &mut ViewControl,
    context: PrecisionContext,
) -> Result<(), crate::numeric::NumericError> {
    let center_x = BigDecimal::parse(&control.center_x.to_string(), context)?;
    let center_y = BigDecimal::parse(&control.center_y.to_string(), context)?;
    let scale = BigDecimal::parse(&control.scale.to_string(), context)?;
    control.center_x = center_x;
    control.center_y = center_y;
    control.scale = scale;
    control.context = context;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limbs_of(text: &str, digits: i32) -> Vec<u32> {
        let ctx = PrecisionContext::new(digits);
        BigDecimal::parse(text, ctx).unwrap().limbs().to_vec()
    }

    #[test]
    fn test_requires_more_precision_at_deep_zoom() {
        // scale 0.001 at 8 digits: limbs [0, 00100000] -> last limb small
        assert!(requires_more_precision(&limbs_of("0.001", 8)));
        // scale 0.5: last limb 50000000, well above the threshold
        assert!(!requires_more_precision(&limbs_of("0.5", 8)));
        // scale 4: integer limb non-zero
        assert!(!requires_more_precision(&limbs_of("4", 8)));
    }

    #[test]
    fn test_requires_less_precision_when_zoomed_out() {
        // a non-zero limb above the last two means the value is large
        assert!(requires_less_precision(&limbs_of("4", 16)));
        // deep fraction at wide context: digits only in the last limb
        assert!(!requires_less_precision(&limbs_of("0.0000000001", 16)));
        // single-limb values never shrink
        assert!(!requires_less_precision(&[0]));
    }

    #[test]
    fn test_precision_heuristics_disjoint() {
        // no limb pattern may demand both adjustments at once
        for text in ["0.001", "0.5", "4", "0.25", "123.456"] {
            for digits in [8, 16, 24] {
                let limbs = limbs_of(text, digits);
                assert!(
                    !(requires_more_precision(&limbs) && requires_less_precision(&limbs)),
                    "both heuristics fired for {text} at {digits} digits"
                );
            }
        }
    }

    #[test]
    fn test_sequence_frame_count_halvings() {
        let ctx = PrecisionContext::new(8);
        // scale 10 needs no frames; 5 needs one halving; 2.5 needs two
        assert_eq!(sequence_frame_count(&BigDecimal::from_i32(10, ctx), ctx), 0);
        assert_eq!(sequence_frame_count(&BigDecimal::from_i32(5, ctx), ctx), 1);
        assert_eq!(
            sequence_frame_count(&BigDecimal::parse("2.5", ctx).unwrap(), ctx),
            2
        );
    }

    #[test]
    fn test_sequence_frame_count_non_positive_scale() {
        // halving from 10 never reaches zero or a negative value; without
        // the guard the count loop would never terminate
        let ctx = PrecisionContext::new(8);
        let negative = BigDecimal::parse("-0.5", ctx).unwrap();
        assert_eq!(sequence_frame_count(&negative, ctx), 0);
        assert_eq!(sequence_frame_count(&BigDecimal::zero(ctx), ctx), 0);
        assert_eq!(
            sequence_frame_count(&BigDecimal::zero(ctx).negate(), ctx),
            0
        );
    }

    #[test]
    fn test_sequence_frame_scale_halves_per_frame() {
        let ctx = PrecisionContext::new(8);
        assert_eq!(sequence_frame_scale(ctx, 0).to_string(), "10.00000000");
        assert_eq!(sequence_frame_scale(ctx, 1).to_string(), "5.00000000");
        assert_eq!(sequence_frame_scale(ctx, 2).to_string(), "2.50000000");
    }

    #[test]
    fn test_decimal_literal_round_trips_small_deltas() {
        let ctx = PrecisionContext::new(16);
        let parsed = BigDecimal::parse(&decimal_literal(0.0005 * 3.0), ctx).unwrap();
        assert_eq!(parsed.to_string(), "0.0015000000000000");
    }

    #[test]
    fn test_reparse_preserves_value_across_contexts() {
        let ctx = PrecisionContext::new(8);
        let mut control = ViewControl {
            center_x: BigDecimal::parse("-0.5", ctx).unwrap(),
            center_y: BigDecimal::parse("0.25", ctx).unwrap(),
            scale: BigDecimal::parse("0.001", ctx).unwrap(),
            context: ctx,
            kind: FractalKind::MandelbrotPower2,
            iteration_limit: 100,
            surface_width: 16,
            surface_height: 16,
            export_width: 16,
            export_height: 16,
            last_export_error: None,
        };
        let wide = PrecisionContext::new(16);
        reparse_at(&mut control, wide).unwrap();
        assert_eq!(control.context.digits(), 16);
        assert_eq!(control.center_x.to_string(), "-0.5000000000000000");
        assert_eq!(control.scale.to_string(), "0.0010000000000000");
    }
}
