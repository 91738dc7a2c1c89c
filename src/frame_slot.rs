use crate::frame::FrameData;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Single-slot, most-recent-wins frame buffer shared between the capture
/// loop and its consumers. The lock is only held for the swap or clone.
#[derive(Debug, Default)]
pub struct FrameSlot {
    latest: Mutex<Option<FrameData>>,
    stores: AtomicU64,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame; any unread frame is dropped
    pub fn store(&self, frame: FrameData) {
        trace!("Storing frame {}", frame.id);
        *self.latest.lock() = Some(frame);
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    /// Clone of the newest frame, never blocking on the producer for longer than the swap
    pub fn latest(&self) -> Option<FrameData> {
        self.latest.lock().clone()
    }

    pub fn clear(&self) {
        *self.latest.lock() = None;
    }

    pub fn is_empty(&self) -> bool {
        self.latest.lock().is_none()
    }

    /// Frames written since creation
    pub fn store_count(&self) -> u64 {
        self.stores.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameFormat;
    use std::sync::Arc;
    use std::time::SystemTime;

    fn create_test_frame(id: u64) -> FrameData {
        FrameData::new(id, SystemTime::now(), vec![0; 12], 2, 2, FrameFormat::Rgb24)
    }

    #[test]
    fn test_empty_slot() {
        let slot = FrameSlot::new();
        assert!(slot.is_empty());
        assert!(slot.latest().is_none());
    }

    #[test]
    fn test_newest_frame_wins() {
        let slot = FrameSlot::new();
        slot.store(create_test_frame(1));
        slot.store(create_test_frame(2));

        assert_eq!(slot.latest().unwrap().id, 2);
        assert_eq!(slot.latest().unwrap().id, 2);
        assert_eq!(slot.store_count(), 2);

        slot.clear();
        assert!(slot.latest().is_none());
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let slot = Arc::new(FrameSlot::new());

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let slot = Arc::clone(&slot);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        slot.store(create_test_frame(w * 1000 + i));
                        let _ = slot.latest();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(slot.store_count(), 400);
        assert!(slot.latest().is_some());
    }
}
