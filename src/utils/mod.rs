// ============================================================================
// Utilities Module
// Worker-count detection and optional core pinning
// ============================================================================

#[cfg(feature = "numa")]
mod affinity;

#[cfg(feature = "numa")]
pub use affinity::pin_worker;

/// Number of worker threads to run when the config does not override it.
pub fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_is_positive() {
        assert!(worker_count() >= 1);
    }
}
