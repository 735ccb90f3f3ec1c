// ============================================================================
// Pixel Buffers
// Lock-free shared iteration/color storage for one render surface
// ============================================================================

use std::sync::atomic::{AtomicU32, Ordering};

/// Flat `width * height` buffer of atomically written u32 values, indexed
/// `x + width * y`.
///
/// Workers write disjoint pixels within a stage (each owns a strided
/// partition of the tile table), so relaxed atomics suffice: the stage
/// barrier orders cross-stage reads, and within a stage no pixel has two
/// writers. Using atomics keeps every access well-defined even when a stale
/// pass races a freshly reset one, which Preview mode tolerates by design.
pub struct PixelBuffer {
    data: Vec<AtomicU32>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(len);
        data.resize_with(len, || AtomicU32::new(0));
        Self {
            data,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn load(&self, index: usize) -> u32 {
        self.data[index].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn store(&self, index: usize, value: u32) {
        self.data[index].store(value, Ordering::Relaxed);
    }

    /// Copy the buffer into a plain vector for display or encoding.
    pub fn snapshot(&self) -> Vec<u32> {
        self.data
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_buffer_is_zeroed() {
        let buffer = PixelBuffer::new(4, 4);
        assert_eq!(buffer.len(), 16);
        assert!(buffer.snapshot().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_store_load_roundtrip() {
        let buffer = PixelBuffer::new(8, 8);
        buffer.store(3 + 8 * 5, 42);
        assert_eq!(buffer.load(3 + 8 * 5), 42);
    }

    #[test]
    fn test_concurrent_disjoint_writes() {
        let buffer = Arc::new(PixelBuffer::new(16, 16));
        let workers = 4;
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let buffer = Arc::clone(&buffer);
                std::thread::spawn(move || {
                    let mut index = worker;
                    while index < buffer.len() {
                        buffer.store(index, worker as u32 + 1);
                        index += workers;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let snapshot = buffer.snapshot();
        for (index, &value) in snapshot.iter().enumerate() {
            assert_eq!(value, (index % workers) as u32 + 1);
        }
    }
}
