//! Shared landmark map with whole-generation replacement
//!
//! The map is held as one `Arc<LandmarkMap>` per generation. An update builds
//! the next generation completely and then swaps the pointer under a short
//! write lock, so a reader holding a snapshot sees either the old or the new
//! map, never a partially filled one. The previous generation is freed when
//! its last snapshot is dropped.

use log::{debug, trace};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::mapping::landmark::{Landmark, LandmarkMap};

#[derive(Debug, Default)]
pub struct MapStore {
    current: RwLock<Arc<LandmarkMap>>,
    generation: AtomicU64,
    has_map: AtomicBool,
    loop_closed: AtomicBool,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the map with `landmarks`; an empty update is ignored
    ///
    /// Returns whether the map was replaced.
    pub fn update_map<I>(&self, landmarks: I) -> bool
    where
        I: IntoIterator<Item = Landmark>,
    {
        let next: LandmarkMap = landmarks.into_iter().collect();
        if next.is_empty() {
            trace!("[MapStore] ignoring empty map update");
            return false;
        }

        let count = next.len();
        let next = Arc::new(next);
        {
            let mut current = self.current.write();
            *current = next;
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.has_map.store(true, Ordering::Release);
        debug!("[MapStore] map generation {} with {} landmarks", generation, count);
        true
    }

    /// Current map generation; cheap, no landmark copy
    pub fn snapshot(&self) -> Arc<LandmarkMap> {
        Arc::clone(&*self.current.read())
    }

    /// Number of accepted map updates
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn has_map(&self) -> bool {
        self.has_map.load(Ordering::Acquire)
    }

    pub fn set_loop_closed(&self, closed: bool) {
        if self.loop_closed.swap(closed, Ordering::AcqRel) != closed {
            debug!("[MapStore] loop closed: {}", closed);
        }
    }

    pub fn is_loop_closed(&self) -> bool {
        self.loop_closed.load(Ordering::Acquire)
    }

    /// Restore flags from a checkpoint; the landmarks themselves are not persisted
    pub(crate) fn restore_flags(&self, has_map: bool, loop_closed: bool) {
        self.has_map.store(has_map, Ordering::Release);
        self.loop_closed.store(loop_closed, Ordering::Release);
    }
}
