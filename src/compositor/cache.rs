use std::collections::{HashMap, VecDeque};

use crate::compositor::composite::composite;
use crate::compositor::fingerprint::{CompositeFingerprint, fingerprint_frame};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::LedResult;
use crate::pattern::model::Pattern;
use crate::pixel::buffer::PixelBuffer;

type CacheKey = (FrameIndex, CompositeFingerprint);

/// Bounded composite cache keyed by `(frame, content fingerprint)`.
///
/// Any edit that changes what a frame would look like changes its fingerprint, so stale
/// entries are never returned; they simply age out. There is no explicit invalidation.
#[derive(Debug)]
pub struct CompositeCache {
    capacity: usize,
    entries: HashMap<CacheKey, PixelBuffer>,
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
}

impl Default for CompositeCache {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl CompositeCache {
    /// A capacity of 0 disables storage; every lookup is a miss.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Composite `frame`, reusing a cached buffer when the frame's content is unchanged.
    ///
    /// The returned buffer is always a fresh copy.
    pub fn get_or_composite(
        &mut self,
        pattern: &Pattern,
        frame: FrameIndex,
    ) -> LedResult<PixelBuffer> {
        pattern.ensure_frame(frame)?;
        let key = (
            frame,
            fingerprint_frame(pattern.canvas(), pattern.tracks(), pattern.groups(), frame),
        );
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(hit.clone());
        }
        self.misses += 1;
        let out = composite(pattern.canvas(), pattern.tracks(), pattern.groups(), frame)?;
        self.store(key, out.clone());
        Ok(out)
    }

    fn store(&mut self, key: CacheKey, value: PixelBuffer) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            let Some(old) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&old);
        }
        self.order.push_back(key);
        self.entries.insert(key, value);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/cache.rs"]
mod tests;
