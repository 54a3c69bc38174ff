use std::collections::BTreeSet;

use crate::foundation::core::{FrameIndex, Rgb8};
use crate::foundation::error::{LedError, LedResult};
use crate::foundation::math::{clamp_unit, round_channel};
use crate::layers::blend::BlendMode;
use crate::layers::frame::LayerFrame;
use crate::layers::group::{GroupId, LayerGroup};
use crate::layers::track::{LayerTrack, TrackId};
use crate::pattern::model::Pattern;
use crate::pixel::buffer::PixelBuffer;

fn checked_opacity(opacity: f64) -> LedResult<f64> {
    if !opacity.is_finite() {
        return Err(LedError::precondition("opacity must be finite"));
    }
    Ok(clamp_unit(opacity))
}

/// Track, group and pixel edits.
///
/// None of these recomposite. Call [`Pattern::recomposite`] (or run the sync monitor) before
/// reading `Frame::pixels` again.
impl Pattern {
    /// Add an empty track on top of the stack.
    ///
    /// Fails when the topmost track already sits at `i32::MAX`.
    pub fn add_layer_track(&mut self, name: impl Into<String>) -> LedResult<TrackId> {
        let z = match self.tracks.iter().map(|t| t.z_index).max() {
            Some(top) => top.checked_add(1).ok_or_else(|| {
                LedError::precondition("no z_index left above the topmost track")
            })?,
            None => 0,
        };
        let id = TrackId(self.alloc_id());
        let track = LayerTrack::new(id, name, z);
        tracing::debug!(track = %id, name = %track.name, z, "added layer track");
        self.tracks.push(track);
        Ok(id)
    }

    /// Remove a track. The last remaining track cannot be removed.
    pub fn remove_layer_track(&mut self, id: TrackId) -> LedResult<LayerTrack> {
        let pos = self.track_pos(id)?;
        if self.tracks.len() == 1 {
            return Err(LedError::precondition(
                "cannot remove the last layer track",
            ));
        }
        let removed = self.tracks.remove(pos);
        tracing::debug!(track = %id, "removed layer track");
        Ok(removed)
    }

    pub fn reorder_layer_track(&mut self, id: TrackId, new_z_index: i32) -> LedResult<()> {
        self.track_slot(id)?.z_index = new_z_index;
        Ok(())
    }

    pub fn rename_layer_track(&mut self, id: TrackId, name: impl Into<String>) -> LedResult<()> {
        self.track_slot(id)?.name = name.into();
        Ok(())
    }

    pub fn set_locked(&mut self, id: TrackId, locked: bool) -> LedResult<()> {
        self.track_slot(id)?.locked = locked;
        Ok(())
    }

    pub fn set_blend_mode(&mut self, id: TrackId, mode: BlendMode) -> LedResult<()> {
        self.track_slot(id)?.blend_mode = mode;
        Ok(())
    }

    /// Limit a track to the inclusive frame window `[start, end]`. `None` leaves that side open.
    pub fn set_track_window(
        &mut self,
        id: TrackId,
        start: Option<FrameIndex>,
        end: Option<FrameIndex>,
    ) -> LedResult<()> {
        if let (Some(s), Some(e)) = (start, end)
            && s > e
        {
            return Err(LedError::precondition("track window start must be <= end"));
        }
        let track = self.track_slot(id)?;
        track.start_frame = start;
        track.end_frame = end;
        Ok(())
    }

    /// `frame = None` sets the track default; `Some(frame)` sets a per-frame override.
    pub fn set_visibility(
        &mut self,
        id: TrackId,
        frame: Option<FrameIndex>,
        visible: bool,
    ) -> LedResult<()> {
        match frame {
            None => self.track_slot(id)?.visible = visible,
            Some(f) => self.layer_frame_mut(id, f)?.visible_override = Some(visible),
        }
        Ok(())
    }

    /// Same addressing as [`Pattern::set_visibility`]. Values are clamped to `[0, 1]`.
    pub fn set_opacity(
        &mut self,
        id: TrackId,
        frame: Option<FrameIndex>,
        opacity: f64,
    ) -> LedResult<()> {
        let opacity = checked_opacity(opacity)?;
        match frame {
            None => self.track_slot(id)?.opacity = opacity,
            Some(f) => self.layer_frame_mut(id, f)?.opacity_override = Some(opacity),
        }
        Ok(())
    }

    pub fn clear_overrides(&mut self, id: TrackId, frame: FrameIndex) -> LedResult<()> {
        self.ensure_frame(frame)?;
        if let Some(f) = self.track_slot(id)?.frame_mut(frame) {
            f.clear_overrides();
        }
        Ok(())
    }

    pub fn paint_pixel(
        &mut self,
        id: TrackId,
        frame: FrameIndex,
        x: u32,
        y: u32,
        color: Rgb8,
    ) -> LedResult<()> {
        self.ensure_in_canvas(x, y)?;
        self.writable_frame(id, frame)?.paint(x, y, color)
    }

    pub fn erase_pixel(&mut self, id: TrackId, frame: FrameIndex, x: u32, y: u32) -> LedResult<()> {
        self.ensure_in_canvas(x, y)?;
        self.writable_frame(id, frame)?.erase(x, y)
    }

    pub fn fill_frame(&mut self, id: TrackId, frame: FrameIndex, color: Rgb8) -> LedResult<()> {
        self.writable_frame(id, frame)?.fill(color);
        Ok(())
    }

    /// Replace a whole layer frame's pixels; the frame becomes fully opaque.
    pub fn replace_pixels(
        &mut self,
        id: TrackId,
        frame: FrameIndex,
        pixels: PixelBuffer,
    ) -> LedResult<()> {
        pixels.ensure_canvas(self.canvas, "replacement pixels")?;
        self.writable_frame(id, frame)?.replace_pixels(pixels)
    }

    pub fn set_mask(&mut self, id: TrackId, frame: FrameIndex, mask: Vec<f32>) -> LedResult<()> {
        let canvas = self.canvas;
        self.ensure_frame(frame)?;
        let track = self.track_slot(id)?;
        track.ensure_unlocked()?;
        // Validate on a scratch frame so a bad mask never creates an empty layer frame.
        let mut scratch = track
            .frame(frame)
            .cloned()
            .unwrap_or_else(|| LayerFrame::transparent(canvas));
        scratch.set_mask(mask)?;
        *track.frame_or_insert(frame, canvas) = scratch;
        Ok(())
    }

    pub fn clear_mask(&mut self, id: TrackId, frame: FrameIndex) -> LedResult<()> {
        self.ensure_frame(frame)?;
        let track = self.track_slot(id)?;
        track.ensure_unlocked()?;
        if let Some(f) = track.frame_mut(frame) {
            f.clear_mask();
        }
        Ok(())
    }

    /// Deep copy one layer frame (pixels, alpha, overrides, mask) onto other frames.
    pub fn copy_layer_to_frames(
        &mut self,
        id: TrackId,
        source: FrameIndex,
        targets: &[FrameIndex],
    ) -> LedResult<()> {
        self.ensure_frame(source)?;
        for &t in targets {
            self.ensure_frame(t)?;
        }
        let canvas = self.canvas;
        let track = self.track_slot(id)?;
        track.ensure_unlocked()?;
        let src = track.frame_or_transparent(source, canvas);
        for &t in targets {
            if t != source {
                track.frames.insert(t.0, src.clone());
            }
        }
        Ok(())
    }

    /// Flatten `ids` into `target`, then drop the other tracks.
    ///
    /// Sources are stacked by ascending z with their own blend mode and effective opacity;
    /// hidden sources are skipped. The target keeps its own settings.
    #[tracing::instrument(skip(self))]
    pub fn merge_layer_tracks(&mut self, ids: &[TrackId], target: TrackId) -> LedResult<()> {
        let unique: BTreeSet<TrackId> = ids.iter().copied().collect();
        if unique.len() < 2 {
            return Err(LedError::precondition("merge needs at least two tracks"));
        }
        if !unique.contains(&target) {
            return Err(LedError::precondition("merge target must be one of the sources"));
        }
        for &id in &unique {
            self.track_pos(id)?;
        }
        self.track_ref(target)?.ensure_unlocked()?;

        let canvas = self.canvas;
        let frame_count = self.frames.len() as u64;
        let mut sources: Vec<&LayerTrack> = self
            .tracks
            .iter()
            .filter(|t| t.id != target && unique.contains(&t.id))
            .collect();
        sources.sort_by_key(|t| t.z_index);

        let touched: BTreeSet<u64> = sources
            .iter()
            .flat_map(|t| t.frames.keys().copied())
            .filter(|&f| f < frame_count)
            .collect();

        let base = self.track_ref(target)?;
        let mut merged = Vec::with_capacity(touched.len());
        for &f in &touched {
            let frame = FrameIndex(f);
            let mut out = base.frame_or_transparent(frame, canvas);
            let mut alpha = out.alpha_plane();
            for src in &sources {
                let group = src.group_id.and_then(|g| self.group(g));
                if !src.effective_visibility(frame, group) {
                    continue;
                }
                let Some(sf) = src.frame(frame) else {
                    continue;
                };
                sf.validate(canvas)?;
                let opacity = src.effective_opacity(frame, group);
                for (i, px) in out.pixels.pixels_mut().iter_mut().enumerate() {
                    let a = opacity * sf.coverage(i);
                    if a <= 0.0 {
                        continue;
                    }
                    let under = f64::from(alpha[i]) / 255.0;
                    let src_px = sf.pixels.pixels()[i];
                    *px = if under <= 0.0 {
                        src_px
                    } else {
                        src.blend_mode.blend(*px, src_px, a)
                    };
                    alpha[i] = round_channel(255.0 * (under + a * (1.0 - under)));
                }
            }
            let mut merged_frame = LayerFrame::from_parts(out.pixels, alpha);
            merged_frame.visible_override = out.visible_override;
            merged_frame.opacity_override = out.opacity_override;
            merged_frame.mask = out.mask;
            merged.push((f, merged_frame));
        }

        let target_track = self.track_slot(target)?;
        for (f, frame) in merged {
            target_track.frames.insert(f, frame);
        }
        self.tracks
            .retain(|t| t.id == target || !unique.contains(&t.id));
        tracing::debug!(track = %target, merged = unique.len(), "merged layer tracks");
        Ok(())
    }

    pub fn create_group(&mut self, name: impl Into<String>) -> GroupId {
        let id = GroupId(self.alloc_id());
        self.groups.push(LayerGroup::new(id, name));
        id
    }

    /// Remove a group; its member tracks become ungrouped.
    pub fn remove_group(&mut self, id: GroupId) -> LedResult<LayerGroup> {
        let pos = self.group_pos(id)?;
        for t in &mut self.tracks {
            if t.group_id == Some(id) {
                t.group_id = None;
            }
        }
        Ok(self.groups.remove(pos))
    }

    pub fn assign_group(&mut self, track: TrackId, group: Option<GroupId>) -> LedResult<()> {
        if let Some(g) = group {
            self.group_pos(g)?;
        }
        self.track_slot(track)?.group_id = group;
        Ok(())
    }

    pub fn set_group_visible(&mut self, id: GroupId, visible: bool) -> LedResult<()> {
        let pos = self.group_pos(id)?;
        self.groups[pos].visible = visible;
        Ok(())
    }

    pub fn set_group_opacity(&mut self, id: GroupId, opacity: f64) -> LedResult<()> {
        let opacity = checked_opacity(opacity)?;
        let pos = self.group_pos(id)?;
        self.groups[pos].opacity = opacity;
        Ok(())
    }

    fn group_pos(&self, id: GroupId) -> LedResult<usize> {
        self.groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| LedError::precondition(format!("unknown group {}", id.0)))
    }

    fn ensure_in_canvas(&self, x: u32, y: u32) -> LedResult<()> {
        if self.canvas.index(x, y).is_none() {
            return Err(LedError::precondition(format!(
                "pixel ({x}, {y}) is outside {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        Ok(())
    }

    fn layer_frame_mut(&mut self, id: TrackId, frame: FrameIndex) -> LedResult<&mut LayerFrame> {
        self.ensure_frame(frame)?;
        let canvas = self.canvas;
        Ok(self.track_slot(id)?.frame_or_insert(frame, canvas))
    }

    fn writable_frame(&mut self, id: TrackId, frame: FrameIndex) -> LedResult<&mut LayerFrame> {
        self.ensure_frame(frame)?;
        let canvas = self.canvas;
        let track = self.track_slot(id)?;
        track.ensure_unlocked()?;
        Ok(track.frame_or_insert(frame, canvas))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/edit.rs"]
mod tests;
