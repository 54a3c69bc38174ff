use crate::foundation::core::FrameIndex;
use crate::foundation::error::LedResult;
use crate::pattern::model::Pattern;
use crate::pixel::buffer::PixelBuffer;

/// One frame whose stored composite disagrees with a fresh one.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SyncMismatch {
    pub frame: FrameIndex,
    /// Row-major index of the first differing pixel; `None` when the dimensions differ.
    pub first_diff: Option<usize>,
    pub differing_pixels: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncReport {
    pub frames_checked: usize,
    pub out_of_sync: Vec<SyncMismatch>,
}

impl SyncReport {
    pub fn is_in_sync(&self) -> bool {
        self.out_of_sync.is_empty()
    }
}

fn compare(frame: FrameIndex, stored: &PixelBuffer, fresh: &PixelBuffer) -> Option<SyncMismatch> {
    if stored.canvas() != fresh.canvas() {
        return Some(SyncMismatch {
            frame,
            first_diff: None,
            differing_pixels: fresh.len(),
        });
    }
    let mut diffs = stored
        .pixels()
        .iter()
        .zip(fresh.pixels())
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, _)| i);
    let first = diffs.next()?;
    Some(SyncMismatch {
        frame,
        first_diff: Some(first),
        differing_pixels: 1 + diffs.count(),
    })
}

/// `true` when the stored composite of `frame` equals a fresh composite byte for byte.
pub fn check_sync(pattern: &Pattern, frame: FrameIndex) -> LedResult<bool> {
    let fresh = pattern.get_composite(frame)?;
    let stored = &pattern.frames()[frame.as_usize()].pixels;
    let mismatch = compare(frame, stored, &fresh);
    if let Some(m) = &mismatch {
        tracing::warn!(
            frame = frame.0,
            differing = m.differing_pixels,
            "stored composite is out of sync"
        );
    }
    Ok(mismatch.is_none())
}

/// Overwrite the stored composite of `frame`. Idempotent.
pub fn resync(pattern: &mut Pattern, frame: FrameIndex) -> LedResult<()> {
    pattern.recomposite(frame)
}

pub fn resync_all(pattern: &mut Pattern) -> LedResult<()> {
    pattern.recomposite_all()
}

/// Check every frame. Mismatches are reported, never corrected.
#[tracing::instrument(skip(pattern), fields(frames = pattern.frame_count()))]
pub fn sync_report(pattern: &Pattern) -> LedResult<SyncReport> {
    let mut report = SyncReport {
        frames_checked: pattern.frame_count(),
        out_of_sync: Vec::new(),
    };
    for (i, frame) in pattern.frames().iter().enumerate() {
        let idx = FrameIndex(i as u64);
        let fresh = pattern.get_composite(idx)?;
        if let Some(m) = compare(idx, &frame.pixels, &fresh) {
            report.out_of_sync.push(m);
        }
    }
    if !report.is_in_sync() {
        tracing::warn!(
            frames = report.out_of_sync.len(),
            "pattern has out-of-sync composites"
        );
    }
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/sync/monitor.rs"]
mod tests;
