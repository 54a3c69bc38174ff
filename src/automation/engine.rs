use std::collections::BTreeSet;

use crate::automation::action::DesignAction;
use crate::automation::transform::{ActionContext, Plane, apply_plane};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LedError, LedResult};
use crate::layers::frame::LayerFrame;
use crate::layers::track::{LayerTrack, TrackId};
use crate::pattern::model::Pattern;
use crate::pixel::buffer::PixelBuffer;

/// Queue of pending actions with side-effect-free preview and atomic commit.
#[derive(Clone, Debug, Default)]
pub struct AutomationEngine {
    queue: Vec<DesignAction>,
}

impl AutomationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append an action. Invalid actions never enter the queue.
    pub fn queue_action(&mut self, action: DesignAction) -> LedResult<()> {
        action.validate()?;
        self.queue.push(action);
        Ok(())
    }

    pub fn queued(&self) -> &[DesignAction] {
        &self.queue
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    /// Result of `action` on `source`'s layer frame at `frame`, as the frame would look alone.
    ///
    /// Nothing is written to the pattern. Quarter-turn rotations come back with swapped
    /// dimensions.
    pub fn preview_action(
        &self,
        pattern: &Pattern,
        source: TrackId,
        action: &DesignAction,
        frame: FrameIndex,
    ) -> LedResult<PixelBuffer> {
        pattern.ensure_frame(frame)?;
        let track = pattern.track_ref(source)?;
        let plane = Plane::from_layer(&track.frame_or_transparent(frame, pattern.canvas()));
        let out = apply_plane(action, &plane, &ActionContext::single(frame))?;
        Ok(out.into_layer()?.pixels)
    }

    /// Commit the whole queue, in order, as one new track above `active`.
    ///
    /// On success the queue is emptied. On failure the queue and the pattern are unchanged.
    pub fn commit_actions(
        &mut self,
        pattern: &mut Pattern,
        active: TrackId,
        frames: &[FrameIndex],
    ) -> LedResult<TrackId> {
        let id = commit_chain(&self.queue, pattern, active, frames)?;
        self.queue.clear();
        Ok(id)
    }
}

/// Commit a single action over `frames` as a new track above `active`.
pub fn commit(
    action: &DesignAction,
    pattern: &mut Pattern,
    frames: &[FrameIndex],
    active: TrackId,
) -> LedResult<TrackId> {
    commit_chain(std::slice::from_ref(action), pattern, active, frames)
}

/// Existing tracks are only read. Every frame is computed before the pattern is touched, so
/// a failure on any frame leaves it exactly as it was.
#[tracing::instrument(skip(actions, pattern, frames), fields(actions = actions.len(), frames = frames.len()))]
fn commit_chain(
    actions: &[DesignAction],
    pattern: &mut Pattern,
    active: TrackId,
    frames: &[FrameIndex],
) -> LedResult<TrackId> {
    if actions.is_empty() {
        return Err(LedError::precondition("no actions to commit"));
    }
    for a in actions {
        a.validate()?;
    }
    let selection: BTreeSet<FrameIndex> = frames.iter().copied().collect();
    if selection.is_empty() {
        return Err(LedError::precondition("commit needs at least one frame"));
    }
    for &f in &selection {
        pattern.ensure_frame(f)?;
    }

    let canvas = pattern.canvas();
    let source = pattern.track_ref(active)?;
    let count = selection.len() as u64;
    let mut produced: Vec<(u64, LayerFrame)> = Vec::with_capacity(selection.len());
    for (position, &frame) in selection.iter().enumerate() {
        let ctx = ActionContext {
            frame,
            position: position as u64,
            count,
        };
        let mut plane = Plane::from_layer(&source.frame_or_transparent(frame, canvas));
        for a in actions {
            plane = apply_plane(a, &plane, &ctx)?;
        }
        if plane.canvas() != canvas {
            return Err(LedError::transform(format!(
                "actions turn the {}x{} pattern into {}x{}; resize the pattern before committing a quarter-turn rotation",
                canvas.width,
                canvas.height,
                plane.canvas().width,
                plane.canvas().height
            )));
        }
        produced.push((frame.0, plane.into_layer()?));
    }

    let name = format!(
        "Auto: {}",
        actions
            .iter()
            .map(|a| a.kind().as_str())
            .collect::<Vec<_>>()
            .join("+")
    );
    let group = source.group_id;
    pattern.z_above(active)?;
    let id = TrackId(pattern.alloc_id());
    let mut track = LayerTrack::new(id, name, 0);
    track.group_id = group;
    track.frames = produced.into_iter().collect();
    pattern.insert_track_above(active, track)?;
    tracing::info!(track = %id, above = %active, frames = count, "committed automation track");
    Ok(id)
}

#[cfg(test)]
#[path = "../../tests/unit/automation/engine.rs"]
mod tests;
