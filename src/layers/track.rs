use std::collections::BTreeMap;

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{LedError, LedResult};
use crate::foundation::math::clamp_unit;
use crate::layers::blend::BlendMode;
use crate::layers::frame::LayerFrame;
use crate::layers::group::{GroupId, LayerGroup};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named layer spanning every frame of a pattern.
///
/// `frames` only holds the frame indices that have been written; reading any other index
/// yields a transparent frame. `visible`/`opacity` are the track-global defaults, per-frame
/// overrides live on the [`LayerFrame`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerTrack {
    pub id: TrackId,
    pub name: String,
    pub z_index: i32,
    pub visible: bool,
    pub opacity: f64,
    #[serde(default)]
    pub blend_mode: BlendMode,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// First active frame (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_frame: Option<FrameIndex>,
    /// Last active frame (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_frame: Option<FrameIndex>,
    #[serde(default)]
    pub frames: BTreeMap<u64, LayerFrame>,
}

impl LayerTrack {
    pub fn new(id: TrackId, name: impl Into<String>, z_index: i32) -> Self {
        Self {
            id,
            name: name.into(),
            z_index,
            visible: true,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            locked: false,
            group_id: None,
            start_frame: None,
            end_frame: None,
            frames: BTreeMap::new(),
        }
    }

    /// Whether `frame` falls inside the track's timing window.
    pub fn is_active(&self, frame: FrameIndex) -> bool {
        self.start_frame.is_none_or(|s| frame >= s) && self.end_frame.is_none_or(|e| frame <= e)
    }

    pub fn frame(&self, frame: FrameIndex) -> Option<&LayerFrame> {
        self.frames.get(&frame.0)
    }

    pub fn frame_mut(&mut self, frame: FrameIndex) -> Option<&mut LayerFrame> {
        self.frames.get_mut(&frame.0)
    }

    /// Fetch the frame for writing, creating a transparent one on first touch.
    pub fn frame_or_insert(&mut self, frame: FrameIndex, canvas: Canvas) -> &mut LayerFrame {
        self.frames
            .entry(frame.0)
            .or_insert_with(|| LayerFrame::transparent(canvas))
    }

    /// Frame content for reading; a missing index materializes as transparent.
    pub fn frame_or_transparent(&self, frame: FrameIndex, canvas: Canvas) -> LayerFrame {
        self.frame(frame)
            .cloned()
            .unwrap_or_else(|| LayerFrame::transparent(canvas))
    }

    /// `visible_override ?? visible`, gated by the timing window and the group.
    pub fn effective_visibility(&self, frame: FrameIndex, group: Option<&LayerGroup>) -> bool {
        if !self.is_active(frame) || group.is_some_and(|g| !g.visible) {
            return false;
        }
        self.frame(frame)
            .and_then(|f| f.visible_override)
            .unwrap_or(self.visible)
    }

    /// `(opacity_override ?? opacity) * group_opacity`.
    pub fn effective_opacity(&self, frame: FrameIndex, group: Option<&LayerGroup>) -> f64 {
        let base = self
            .frame(frame)
            .and_then(|f| f.opacity_override)
            .unwrap_or(self.opacity);
        let group_opacity = group.map_or(1.0, |g| g.opacity);
        clamp_unit(base * group_opacity)
    }

    pub(crate) fn ensure_unlocked(&self) -> LedResult<()> {
        if self.locked {
            return Err(LedError::precondition(format!(
                "track {} '{}' is locked",
                self.id, self.name
            )));
        }
        Ok(())
    }

    pub fn validate(&self, canvas: Canvas) -> LedResult<()> {
        if !(self.opacity.is_finite() && (0.0..=1.0).contains(&self.opacity)) {
            return Err(LedError::precondition(format!(
                "track {} opacity must be in [0, 1]",
                self.id
            )));
        }
        if let (Some(s), Some(e)) = (self.start_frame, self.end_frame)
            && s > e
        {
            return Err(LedError::precondition(format!(
                "track {} window starts after it ends",
                self.id
            )));
        }
        for (idx, frame) in &self.frames {
            frame.validate(canvas).map_err(|e| {
                LedError::precondition(format!("track {} frame {idx}: {e}", self.id))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/track.rs"]
mod tests;
