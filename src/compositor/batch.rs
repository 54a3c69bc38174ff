use rayon::prelude::*;

use crate::compositor::composite::composite;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LedError, LedResult};
use crate::pattern::model::Pattern;
use crate::pixel::buffer::PixelBuffer;

/// Threading and chunking controls for multi-frame compositing.
#[derive(Clone, Debug)]
pub struct CompositeThreading {
    /// Composite frames on a rayon pool when `true`.
    pub parallel: bool,
    /// Frames handed to the pool per batch.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for CompositeThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Composite many frames. Output order matches `frames`.
///
/// Each frame is independent and read-only, so the parallel path produces exactly the same
/// buffers as the sequential one.
#[tracing::instrument(skip(pattern, frames), fields(frames = frames.len(), parallel = threading.parallel))]
pub fn composite_frames(
    pattern: &Pattern,
    frames: &[FrameIndex],
    threading: &CompositeThreading,
) -> LedResult<Vec<PixelBuffer>> {
    for &f in frames {
        pattern.ensure_frame(f)?;
    }
    let canvas = pattern.canvas();
    let one = |f: FrameIndex| composite(canvas, pattern.tracks(), pattern.groups(), f);

    if !threading.parallel {
        return frames.iter().map(|&f| one(f)).collect();
    }

    let pool = build_thread_pool(threading.threads)?;
    let chunk_size = threading.chunk_size.max(1);
    let mut out = Vec::with_capacity(frames.len());
    for chunk in frames.chunks(chunk_size) {
        let mut rendered = pool.install(|| {
            chunk
                .par_iter()
                .map(|&f| one(f))
                .collect::<LedResult<Vec<_>>>()
        })?;
        out.append(&mut rendered);
    }
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> LedResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LedError::precondition(
            "composite 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LedError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/batch.rs"]
mod tests;
