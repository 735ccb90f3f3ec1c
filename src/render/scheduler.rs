// ============================================================================
// Tile Scheduler
// Worker and supervisor loops driving progressive stage refinement
// ============================================================================

use crate::fractal::iteration_for_pixel;
use crate::interfaces::FrameSnapshot;
use crate::render::engine::{EngineShared, PassPlan, RenderMode};
use crate::render::stages::{StageTables, TILE_SIDES};
use crossbeam::channel::{Receiver, RecvTimeoutError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// One worker finished its partition of a stage.
pub(crate) struct StageDone {
    pub(crate) epoch: u64,
    pub(crate) stage: usize,
    pub(crate) worker: usize,
}

// ============================================================================
// Worker Loop
// ============================================================================

/// Body of one pool thread.
///
/// Parks on the cursor condvar until a pass needs the worker, runs its
/// strided partition of the current stage table, reports completion over the
/// stage-done channel, and parks again. A bumped epoch observed between work
/// items abandons the partition without reporting.
pub(crate) fn worker_loop(shared: Arc<EngineShared>, worker: usize) {
    #[cfg(feature = "numa")]
    crate::utils::pin_worker(worker);

    tracing::debug!(worker, "render worker started");
    let mut last_done: Option<(u64, usize)> = None;

    loop {
        let (epoch, stage) = {
            let mut cursor = shared.cursor.lock();
            loop {
                if shared.shutdown.load(Ordering::Acquire) {
                    tracing::debug!(worker, "render worker stopping");
                    return;
                }
                match cursor.stage {
                    Some(stage) if last_done != Some((cursor.epoch, stage)) => {
                        break (cursor.epoch, stage);
                    }
                    _ => shared.wake.wait(&mut cursor),
                }
            }
        };

        let plan = Arc::clone(&shared.plan.read());
        if plan.epoch != epoch {
            // cursor moved on between the two reads; re-sync
            continue;
        }

        let completed = run_partition(&shared, &plan, stage, worker);
        last_done = Some((epoch, stage));
        if completed {
            let _ = shared.stage_done.send(StageDone {
                epoch,
                stage,
                worker,
            });
        }
    }
}

/// Process every table index owned by `worker` at the given stage. Returns
/// false when the pass was superseded mid-partition.
///
/// At stage 0 the partition runs in two sweeps, even-parity pixels first,
/// so the interpolation shortcut for odd-parity pixels reads neighbors this
/// worker has already refined rather than coarse-stage leftovers.
fn run_partition(shared: &EngineShared, plan: &PassPlan, stage: usize, worker: usize) -> bool {
    if stage == 0 {
        run_sweep(shared, plan, stage, worker, Some(0)) && run_sweep(shared, plan, stage, worker, Some(1))
    } else {
        run_sweep(shared, plan, stage, worker, None)
    }
}

fn run_sweep(
    shared: &EngineShared,
    plan: &PassPlan,
    stage: usize,
    worker: usize,
    parity: Option<u32>,
) -> bool {
    let table = plan.tables.table(stage);
    let stride = shared.worker_count;
    let mut index = worker;

    while index < table.len() {
        // cancellation point between work items
        if shared.current_epoch.load(Ordering::Acquire) != plan.epoch {
            return false;
        }
        // no two workers may ever own the same table index within a stage;
        // disjointness is what makes the unlocked buffer writes safe
        debug_assert_eq!(index % stride, worker, "strided partition violated");

        let (x, y) = StageTables::decode_origin(table[index], stage);
        if parity.map_or(true, |p| (x + y) % 2 == p) {
            fill_tile(shared, plan, stage, x, y);
        }

        shared.progress[worker].store(index, Ordering::Relaxed);
        index += stride;
    }
    true
}

/// Compute one tile and write its footprint into the shared buffers.
///
/// At stage 0, odd-parity interior pixels whose four axis neighbors already
/// hold one identical iteration count copy that value instead of iterating —
/// escape-time fields are locally flat almost everywhere, and the neighbors
/// were computed at finer density than anything this pixel has seen yet.
/// With more than one worker a neighbor owned by another partition may still
/// hold coarse-stage data when the shortcut reads it, so the copied value is
/// best-effort across workers; within a single worker's partition the parity
/// sweeps guarantee refined neighbors.
fn fill_tile(shared: &EngineShared, plan: &PassPlan, stage: usize, x: u32, y: u32) {
    let width = plan.tables.width();
    let height = plan.tables.height();
    let side = TILE_SIDES[stage];
    let limit = plan.view.iteration_limit();
    let offset = (x + width * y) as usize;

    if stage == 0 && (x + y) % 2 != 0 && x > 0 && x + 1 < width && y > 0 && y + 1 < height {
        let left = plan.iterations.load(offset - 1);
        if left == plan.iterations.load(offset + 1)
            && left == plan.iterations.load(offset + width as usize)
            && left == plan.iterations.load(offset - width as usize)
        {
            plan.iterations.store(offset, left);
            plan.colors.store(offset, shared.color_mapper.color_for(left, limit));
            return;
        }
    }

    let iterations = iteration_for_pixel(&plan.view, x, y);
    let color = shared.color_mapper.color_for(iterations, limit);

    let x_end = (x + side).min(width);
    let y_end = (y + side).min(height);
    for py in y..y_end {
        let row = (py * width) as usize;
        for px in x..x_end {
            plan.iterations.store(row + px as usize, iterations);
            plan.colors.store(row + px as usize, color);
        }
    }
}

// ============================================================================
// Supervisor Loop
// ============================================================================

/// Distinct-worker tally behind the stage barrier.
///
/// Counting identities rather than raw reports keeps the barrier correct
/// even if a worker were ever to report the same (epoch, stage) twice.
struct StageTally {
    reported: HashMap<(u64, usize), HashSet<usize>>,
}

impl StageTally {
    fn new() -> Self {
        Self {
            reported: HashMap::new(),
        }
    }

    /// Record one worker's report; true exactly once, when the last worker
    /// in the pool reports this (epoch, stage).
    fn record(&mut self, epoch: u64, stage: usize, worker: usize, worker_count: usize) -> bool {
        let workers = self.reported.entry((epoch, stage)).or_default();
        if workers.len() >= worker_count {
            return false;
        }
        workers.insert(worker);
        workers.len() >= worker_count
    }

    /// Drop every entry not belonging to `epoch`.
    fn prune(&mut self, epoch: u64) {
        self.reported.retain(|&(e, _), _| e == epoch);
    }
}

/// Tallies stage-done reports and acts as the barrier between stages: only
/// when every worker has reported the current (epoch, stage) does the cursor
/// move to the next finer stage. Reports from superseded epochs are dropped.
pub(crate) fn supervisor_loop(shared: Arc<EngineShared>, reports: Receiver<StageDone>) {
    tracing::debug!("render supervisor started");
    let mut tally = StageTally::new();

    loop {
        if shared.shutdown.load(Ordering::Acquire) {
            tracing::debug!("render supervisor stopping");
            return;
        }
        let report = match reports.recv_timeout(Duration::from_millis(50)) {
            Ok(report) => report,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return,
        };

        let current = shared.current_epoch.load(Ordering::Acquire);
        if report.epoch != current {
            tally.prune(current);
            continue;
        }

        if tally.record(report.epoch, report.stage, report.worker, shared.worker_count) {
            tally.prune(report.epoch);
            advance(&shared, report.epoch, report.stage);
        }
    }
}

/// All workers finished `completed_stage`: move to the next finer stage, or
/// finish the pass at stage 0.
fn advance(shared: &EngineShared, epoch: u64, completed_stage: usize) {
    if completed_stage > 0 {
        for (worker, position) in shared.progress.iter().enumerate() {
            position.store(worker, Ordering::Relaxed);
        }
        {
            let mut cursor = shared.cursor.lock();
            if cursor.epoch != epoch {
                return;
            }
            cursor.stage = Some(completed_stage - 1);
        }
        shared.wake.notify_all();
        shared.sink.on_stage_complete(completed_stage);
        tracing::debug!(epoch, stage = completed_stage - 1, "stage barrier crossed");
        return;
    }

    {
        let mut cursor = shared.cursor.lock();
        if cursor.epoch != epoch {
            return;
        }
        cursor.stage = None;
    }
    let plan = Arc::clone(&shared.plan.read());
    if plan.epoch != epoch {
        return;
    }
    shared.sink.on_stage_complete(0);
    shared.sink.on_pass_complete(FrameSnapshot {
        width: plan.tables.width(),
        height: plan.tables.height(),
        iterations: plan.iterations.snapshot(),
        colors: plan.colors.snapshot(),
    });
    tracing::info!(epoch, ?plan.mode, "render pass complete");

    if plan.mode != RenderMode::Preview {
        shared.complete_export_pass(&plan);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_completes_on_distinct_workers() {
        let mut tally = StageTally::new();
        assert!(!tally.record(1, 4, 0, 3));
        assert!(!tally.record(1, 4, 1, 3));
        assert!(tally.record(1, 4, 2, 3));
    }

    #[test]
    fn test_tally_ignores_duplicate_worker_reports() {
        let mut tally = StageTally::new();
        assert!(!tally.record(1, 4, 0, 2));
        // the same worker reporting again must not stand in for the other
        assert!(!tally.record(1, 4, 0, 2));
        assert!(tally.record(1, 4, 1, 2));
    }

    #[test]
    fn test_tally_completes_exactly_once() {
        let mut tally = StageTally::new();
        assert!(tally.record(1, 0, 0, 1));
        // a late duplicate after completion must not re-cross the barrier
        assert!(!tally.record(1, 0, 0, 1));
    }

    #[test]
    fn test_tally_prune_drops_stale_epochs() {
        let mut tally = StageTally::new();
        assert!(!tally.record(1, 4, 0, 2));
        tally.prune(2);
        // the stale partial count is gone; epoch 2 starts fresh
        assert!(!tally.record(2, 4, 0, 2));
        assert!(tally.record(2, 4, 1, 2));
    }

    #[test]
    fn test_tally_tracks_stages_independently() {
        let mut tally = StageTally::new();
        assert!(tally.record(1, 4, 0, 1));
        assert!(tally.record(1, 3, 0, 1));
    }
}
