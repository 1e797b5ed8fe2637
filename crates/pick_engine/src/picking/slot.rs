//! Cross-thread cache cell holding the latest result of one pick

use std::sync::{Arc, PoisonError, RwLock};

use super::result::PickResult;

/// Single-writer, multi-reader cell for the most recent [`PickResult`]
///
/// The writer swaps in a complete `Arc`; readers clone the `Arc` under a
/// short read lock. A reader therefore sees either the previous result or the
/// new one, never a partially written value, and holds on to its snapshot
/// for as long as it likes without blocking the next write.
#[derive(Debug, Default)]
pub struct ResultSlot {
    current: RwLock<Option<Arc<PickResult>>>,
}

impl ResultSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the latest result, if one has been produced
    pub fn load(&self) -> Option<Arc<PickResult>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the cached result
    pub fn store(&self, result: PickResult) {
        let result = Arc::new(result);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(result);
    }

    /// Drop the cached result
    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::Ray;
    use std::thread;

    #[test]
    fn test_empty_until_stored() {
        let slot = ResultSlot::new();
        assert!(slot.load().is_none());

        slot.store(PickResult::unresolved());
        assert!(slot.load().is_some());

        slot.clear();
        assert!(slot.load().is_none());
    }

    #[test]
    fn test_reader_snapshot_survives_replacement() {
        let slot = ResultSlot::new();
        slot.store(PickResult::unresolved());
        let snapshot = slot.load().unwrap();

        slot.store(PickResult::miss(Ray::new(Vec3::zeros(), Vec3::new(0.0, -1.0, 0.0))));

        assert!(snapshot.as_surface().unwrap().search_ray.is_none());
        assert!(slot.load().unwrap().as_surface().unwrap().search_ray.is_some());
    }

    #[test]
    fn test_concurrent_readers_see_whole_results() {
        let slot = Arc::new(ResultSlot::new());
        let writer_slot = Arc::clone(&slot);

        let writer = thread::spawn(move || {
            for i in 0..500 {
                let origin = Vec3::new(i as f32, i as f32, i as f32);
                writer_slot.store(PickResult::miss(Ray::new(origin, Vec3::new(0.0, -1.0, 0.0))));
            }
        });

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let slot = Arc::clone(&slot);
                thread::spawn(move || {
                    for _ in 0..500 {
                        if let Some(result) = slot.load() {
                            let ray = result.as_surface().unwrap().search_ray.unwrap();
                            // Every component was written together
                            assert_eq!(ray.origin.x, ray.origin.y);
                            assert_eq!(ray.origin.y, ray.origin.z);
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
