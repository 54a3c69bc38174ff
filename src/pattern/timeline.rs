use std::collections::BTreeMap;

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{LedError, LedResult};
use crate::layers::frame::LayerFrame;
use crate::pattern::model::{Frame, Pattern};

/// Frame-level edits that keep every track's layer frames aligned with the timeline.
impl Pattern {
    /// Insert `count` blank frames before `index` (`index == frame_count` appends).
    ///
    /// No track has content at the new indices, so their black composites are already in sync.
    pub fn insert_frames(&mut self, index: usize, count: usize) -> LedResult<()> {
        if index > self.frames.len() {
            return Err(LedError::precondition(format!(
                "insert position {index} is past the end ({} frames)",
                self.frames.len()
            )));
        }
        if count == 0 {
            return Ok(());
        }
        let canvas = self.canvas;
        let (at, n) = (index as u64, count as u64);
        self.frames
            .splice(index..index, (0..count).map(|_| Frame::blank(canvas)));
        for t in &mut self.tracks {
            t.frames = remap_keys(std::mem::take(&mut t.frames), |k| {
                Some(if k >= at { k + n } else { k })
            });
            t.start_frame = t.start_frame.map(|s| shift_up(s, at, n));
            t.end_frame = t.end_frame.map(|e| shift_up(e, at, n));
        }
        Ok(())
    }

    /// Delete frames `[index, index + count)` and every layer frame stored there.
    pub fn delete_frames(&mut self, index: usize, count: usize) -> LedResult<()> {
        let end = index
            .checked_add(count)
            .filter(|&e| e <= self.frames.len())
            .ok_or_else(|| LedError::precondition("frame deletion range out of bounds"))?;
        if count == 0 {
            return Ok(());
        }
        if count >= self.frames.len() {
            return Err(LedError::precondition("pattern needs at least one frame"));
        }
        let (at, n) = (index as u64, count as u64);
        self.frames.drain(index..end);
        for t in &mut self.tracks {
            t.frames = remap_keys(std::mem::take(&mut t.frames), |k| {
                if k < at {
                    Some(k)
                } else if k >= at + n {
                    Some(k - n)
                } else {
                    None
                }
            });
            let start = t.start_frame.map(|s| shift_down(s, at, n));
            let end = t.end_frame.map(|e| shift_down(e, at, n));
            t.start_frame = start;
            // A window lying entirely inside the deleted range collapses to one frame.
            t.end_frame = match (start, end) {
                (Some(s), Some(e)) if e < s => Some(s),
                _ => end,
            };
        }
        Ok(())
    }

    /// Insert a copy of frame `src` at position `dest`, carrying every track's layer frame.
    pub fn duplicate_frame(&mut self, src: FrameIndex, dest: usize) -> LedResult<()> {
        self.ensure_frame(src)?;
        if dest > self.frames.len() {
            return Err(LedError::precondition(format!(
                "duplicate target {dest} is past the end ({} frames)",
                self.frames.len()
            )));
        }
        self.insert_frames(dest, 1)?;
        let src = if src.as_usize() >= dest {
            src.0 + 1
        } else {
            src.0
        };
        let dest = dest as u64;
        for t in &mut self.tracks {
            match t.frames.get(&src).cloned() {
                Some(f) => {
                    t.frames.insert(dest, f);
                }
                None => {
                    t.frames.remove(&dest);
                }
            }
        }
        self.frames[dest as usize] = self.frames[src as usize].clone();
        Ok(())
    }

    /// Move frame `src` so that it ends up at index `dest`.
    pub fn move_frame(&mut self, src: FrameIndex, dest: FrameIndex) -> LedResult<()> {
        self.ensure_frame(src)?;
        self.ensure_frame(dest)?;
        if src == dest {
            return Ok(());
        }
        let frame = self.frames.remove(src.as_usize());
        self.frames.insert(dest.as_usize(), frame);
        let (s, d) = (src.0, dest.0);
        for t in &mut self.tracks {
            t.frames = remap_keys(std::mem::take(&mut t.frames), |k| {
                Some(if k == s {
                    d
                } else if s < d && s < k && k <= d {
                    k - 1
                } else if d < s && d <= k && k < s {
                    k + 1
                } else {
                    k
                })
            });
        }
        Ok(())
    }

    /// Crop or pad every buffer to the new dimensions, anchored top-left, then recomposite.
    #[tracing::instrument(skip(self))]
    pub fn resize(&mut self, width: u32, height: u32) -> LedResult<()> {
        let canvas = Canvas::new(width, height)?;
        if canvas == self.canvas {
            return Ok(());
        }
        for t in &mut self.tracks {
            let resized: BTreeMap<u64, LayerFrame> = t
                .frames
                .iter()
                .map(|(&k, f)| (k, f.resized(canvas)))
                .collect();
            t.frames = resized;
        }
        self.canvas = canvas;
        for f in &mut self.frames {
            f.pixels = f.pixels.resized(canvas);
        }
        self.recomposite_all()
    }
}

fn remap_keys(
    frames: BTreeMap<u64, LayerFrame>,
    mut f: impl FnMut(u64) -> Option<u64>,
) -> BTreeMap<u64, LayerFrame> {
    frames
        .into_iter()
        .filter_map(|(k, v)| f(k).map(|k| (k, v)))
        .collect()
}

fn shift_up(f: FrameIndex, at: u64, n: u64) -> FrameIndex {
    if f.0 >= at { FrameIndex(f.0 + n) } else { f }
}

fn shift_down(f: FrameIndex, at: u64, n: u64) -> FrameIndex {
    if f.0 >= at + n {
        FrameIndex(f.0 - n)
    } else if f.0 >= at {
        FrameIndex(at)
    } else {
        f
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/timeline.rs"]
mod tests;
