use std::collections::BTreeSet;

use crate::compositor::batch::{CompositeThreading, composite_frames};
use crate::compositor::composite::composite;
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{LedError, LedResult};
use crate::layers::group::{GroupId, LayerGroup};
use crate::layers::track::{LayerTrack, TrackId};
use crate::pixel::buffer::PixelBuffer;

pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

/// One timeline frame.
///
/// `pixels` is the stored composite. Only [`Pattern::recomposite`] and friends write it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    pub(crate) pixels: PixelBuffer,
    #[serde(default = "default_duration")]
    pub duration_ms: u32,
}

fn default_duration() -> u32 {
    DEFAULT_FRAME_DURATION_MS
}

impl Frame {
    pub(crate) fn blank(canvas: Canvas) -> Self {
        Self {
            pixels: PixelBuffer::black(canvas),
            duration_ms: DEFAULT_FRAME_DURATION_MS,
        }
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }
}

/// Root of all editor state: frames, layer tracks and groups.
///
/// Invariants held by every public operation:
/// - at least one frame and one track exist
/// - every buffer matches `canvas`
/// - track and group ids are unique
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawPattern")]
pub struct Pattern {
    pub(crate) canvas: Canvas,
    pub(crate) frames: Vec<Frame>,
    pub(crate) tracks: Vec<LayerTrack>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) groups: Vec<LayerGroup>,
    pub(crate) next_id: u64,
}

#[derive(serde::Deserialize)]
struct RawPattern {
    canvas: Canvas,
    frames: Vec<Frame>,
    tracks: Vec<LayerTrack>,
    #[serde(default)]
    groups: Vec<LayerGroup>,
    #[serde(default)]
    next_id: u64,
}

impl TryFrom<RawPattern> for Pattern {
    type Error = LedError;

    fn try_from(raw: RawPattern) -> LedResult<Self> {
        let max_id = raw
            .tracks
            .iter()
            .map(|t| t.id.0)
            .chain(raw.groups.iter().map(|g| g.id.0))
            .max()
            .unwrap_or(0);
        let p = Self {
            canvas: raw.canvas,
            frames: raw.frames,
            tracks: raw.tracks,
            groups: raw.groups,
            next_id: raw.next_id.max(max_id + 1),
        };
        p.validate()?;
        Ok(p)
    }
}

impl Pattern {
    /// New pattern with `frame_count` black frames and one empty track named "Layer 1".
    pub fn new(width: u32, height: u32, frame_count: usize) -> LedResult<Self> {
        let canvas = Canvas::new(width, height)?;
        if frame_count == 0 {
            return Err(LedError::precondition("pattern needs at least one frame"));
        }
        Ok(Self {
            canvas,
            frames: (0..frame_count).map(|_| Frame::blank(canvas)).collect(),
            tracks: vec![LayerTrack::new(TrackId(1), "Layer 1", 0)],
            groups: Vec::new(),
            next_id: 2,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, frame: FrameIndex) -> Option<&Frame> {
        self.frames.get(frame.as_usize())
    }

    /// Set how long a frame is shown. The duration is metadata and does not affect pixels.
    pub fn set_frame_duration(&mut self, frame: FrameIndex, duration_ms: u32) -> LedResult<()> {
        self.ensure_frame(frame)?;
        self.frames[frame.as_usize()].duration_ms = duration_ms;
        Ok(())
    }

    /// Tracks in insertion order.
    pub fn tracks(&self) -> &[LayerTrack] {
        &self.tracks
    }

    /// Tracks bottom to top, the order the compositor stacks them.
    pub fn tracks_by_z(&self) -> Vec<&LayerTrack> {
        let mut out: Vec<&LayerTrack> = self.tracks.iter().collect();
        out.sort_by_key(|t| t.z_index);
        out
    }

    pub fn track(&self, id: TrackId) -> Option<&LayerTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Direct mutable access. Writes made here bypass lock checks; use the editing methods
    /// for user edits.
    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut LayerTrack> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn groups(&self) -> &[LayerGroup] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&LayerGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn ensure_frame(&self, frame: FrameIndex) -> LedResult<()> {
        if frame.as_usize() >= self.frames.len() {
            return Err(LedError::precondition(format!(
                "frame {} out of range (pattern has {} frames)",
                frame.0,
                self.frames.len()
            )));
        }
        Ok(())
    }

    pub(crate) fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn track_pos(&self, id: TrackId) -> LedResult<usize> {
        self.tracks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| LedError::precondition(format!("unknown track {id}")))
    }

    pub(crate) fn track_ref(&self, id: TrackId) -> LedResult<&LayerTrack> {
        let pos = self.track_pos(id)?;
        Ok(&self.tracks[pos])
    }

    pub(crate) fn track_slot(&mut self, id: TrackId) -> LedResult<&mut LayerTrack> {
        let pos = self.track_pos(id)?;
        Ok(&mut self.tracks[pos])
    }

    /// z_index a new track directly above `below` would get.
    ///
    /// Fails when that slot, or shifting the tracks above it, would pass `i32::MAX`.
    pub(crate) fn z_above(&self, below: TrackId) -> LedResult<i32> {
        let z = self.track_ref(below)?.z_index;
        let top = self.tracks.iter().map(|t| t.z_index).max().unwrap_or(z);
        match (z.checked_add(1), top.checked_add(1)) {
            (Some(slot), Some(_)) => Ok(slot),
            _ => Err(LedError::precondition(format!(
                "no z_index left above track {below}"
            ))),
        }
    }

    /// Insert `track` directly above `below`, shifting every higher track up by one.
    pub(crate) fn insert_track_above(
        &mut self,
        below: TrackId,
        mut track: LayerTrack,
    ) -> LedResult<TrackId> {
        let slot = self.z_above(below)?;
        let z = slot - 1;
        for t in &mut self.tracks {
            if t.z_index > z {
                t.z_index += 1;
            }
        }
        track.z_index = slot;
        let id = track.id;
        self.tracks.push(track);
        Ok(id)
    }

    /// Check every structural invariant.
    pub fn validate(&self) -> LedResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        if self.frames.is_empty() {
            return Err(LedError::precondition("pattern needs at least one frame"));
        }
        if self.tracks.is_empty() {
            return Err(LedError::precondition(
                "pattern needs at least one layer track",
            ));
        }
        for (i, f) in self.frames.iter().enumerate() {
            f.pixels
                .ensure_canvas(self.canvas, &format!("frame {i} composite"))?;
        }

        let mut ids = BTreeSet::new();
        for g in &self.groups {
            if !ids.insert(g.id.0) {
                return Err(LedError::precondition(format!(
                    "duplicate group id {}",
                    g.id.0
                )));
            }
            if !(g.opacity.is_finite() && (0.0..=1.0).contains(&g.opacity)) {
                return Err(LedError::precondition(format!(
                    "group {} opacity must be in [0, 1]",
                    g.id.0
                )));
            }
        }
        for t in &self.tracks {
            if !ids.insert(t.id.0) {
                return Err(LedError::precondition(format!("duplicate track id {}", t.id)));
            }
            if let Some(g) = t.group_id
                && self.group(g).is_none()
            {
                return Err(LedError::precondition(format!(
                    "track {} references unknown group {}",
                    t.id, g.0
                )));
            }
            t.validate(self.canvas)?;
        }
        if ids.last().is_some_and(|&max| max >= self.next_id) {
            return Err(LedError::precondition("next_id must exceed every used id"));
        }
        Ok(())
    }

    /// Fresh composite of `frame`. Does not touch stored frame pixels.
    pub fn get_composite(&self, frame: FrameIndex) -> LedResult<PixelBuffer> {
        self.ensure_frame(frame)?;
        composite(self.canvas, &self.tracks, &self.groups, frame)
    }

    /// Recompute and store the composite of `frame`.
    #[tracing::instrument(skip(self))]
    pub fn recomposite(&mut self, frame: FrameIndex) -> LedResult<()> {
        let pixels = self.get_composite(frame)?;
        self.frames[frame.as_usize()].pixels = pixels;
        Ok(())
    }

    /// Recompute every stored composite. All-or-nothing.
    #[tracing::instrument(skip(self), fields(frames = self.frames.len()))]
    pub fn recomposite_all(&mut self) -> LedResult<()> {
        let all: Vec<FrameIndex> = (0..self.frames.len() as u64).map(FrameIndex).collect();
        let fresh = composite_frames(self, &all, &CompositeThreading::default())?;
        for (frame, pixels) in self.frames.iter_mut().zip(fresh) {
            frame.pixels = pixels;
        }
        Ok(())
    }

    pub fn composite_frames(
        &self,
        frames: &[FrameIndex],
        threading: &CompositeThreading,
    ) -> LedResult<Vec<PixelBuffer>> {
        composite_frames(self, frames, threading)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/model.rs"]
mod tests;
