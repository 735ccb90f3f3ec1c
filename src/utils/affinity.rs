// ============================================================================
// Core Affinity
// Pins render workers to physical cores to reduce cross-core migration
// ============================================================================

/// Pin the calling worker thread to a core, round-robin over the cores the
/// OS reports. Pinning failures are logged and ignored; affinity is an
/// optimization, never a requirement.
pub fn pin_worker(worker: usize) {
    let Some(cores) = core_affinity::get_core_ids() else {
        tracing::warn!(worker, "core enumeration unavailable; worker left unpinned");
        return;
    };
    if cores.is_empty() {
        return;
    }
    let core = cores[worker % cores.len()];
    if core_affinity::set_for_current(core) {
        tracing::debug!(worker, core = core.id, "worker pinned to core");
    } else {
        tracing::warn!(worker, core = core.id, "failed to pin worker to core");
    }
}
