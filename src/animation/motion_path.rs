use crate::{
    animation::keyframes::Lerp,
    foundation::core::{FrameIndex, Vec2},
    foundation::error::{LedError, LedResult},
};

/// One `(frame, x, y)` anchor of a motion path.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(u64, f64, f64)", into = "(u64, f64, f64)")]
pub struct PathKey {
    pub frame: FrameIndex,
    pub pos: Vec2,
}

impl PathKey {
    pub fn new(frame: u64, x: f64, y: f64) -> Self {
        Self {
            frame: FrameIndex(frame),
            pos: Vec2::new(x, y),
        }
    }
}

impl From<(u64, f64, f64)> for PathKey {
    fn from((frame, x, y): (u64, f64, f64)) -> Self {
        Self::new(frame, x, y)
    }
}

impl From<PathKey> for (u64, f64, f64) {
    fn from(k: PathKey) -> Self {
        (k.frame.0, k.pos.x, k.pos.y)
    }
}

/// Positional keyframes interpolated linearly over time.
///
/// Easing curves are deliberately not applied to motion paths.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawMotionPath")]
pub struct MotionPath {
    keyframes: Vec<PathKey>,
    #[serde(rename = "loop")]
    looping: bool,
    closed: bool,
}

#[derive(serde::Deserialize)]
struct RawMotionPath {
    #[serde(default)]
    keyframes: Vec<PathKey>,
    #[serde(default, rename = "loop")]
    looping: bool,
    #[serde(default)]
    closed: bool,
}

impl TryFrom<RawMotionPath> for MotionPath {
    type Error = LedError;

    fn try_from(raw: RawMotionPath) -> LedResult<Self> {
        Self::new(raw.keyframes, raw.looping, raw.closed)
    }
}

impl MotionPath {
    /// Build a path; keys are sorted by frame and duplicate frames are rejected.
    pub fn new(mut keyframes: Vec<PathKey>, looping: bool, closed: bool) -> LedResult<Self> {
        if keyframes
            .iter()
            .any(|k| !k.pos.x.is_finite() || !k.pos.y.is_finite())
        {
            return Err(LedError::animation("motion path positions must be finite"));
        }
        keyframes.sort_by_key(|k| k.frame);
        if let Some(w) = keyframes.windows(2).find(|w| w[0].frame == w[1].frame) {
            return Err(LedError::precondition(format!(
                "motion path has two keys at frame {}",
                w[0].frame.0
            )));
        }
        Ok(Self {
            keyframes,
            looping,
            closed,
        })
    }

    pub fn keyframes(&self) -> &[PathKey] {
        &self.keyframes
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Position at `frame`, or `None` for a path without keys.
    ///
    /// Looping paths first reduce `frame` modulo `total_frames`. Closed paths travel from the
    /// last key back to the first across the wrap (`last .. total_frames + first`).
    pub fn position_at(&self, frame: FrameIndex, total_frames: u64) -> Option<Vec2> {
        let first = *self.keyframes.first()?;
        let last = *self.keyframes.last()?;

        let mut f = frame.0;
        if self.looping && total_frames > 0 {
            f %= total_frames;
        }

        if self.closed && self.keyframes.len() >= 2 && total_frames > last.frame.0 {
            let span = total_frames + first.frame.0 - last.frame.0;
            let wrapped = if f > last.frame.0 {
                Some(f - last.frame.0)
            } else if f < first.frame.0 {
                Some(f + total_frames - last.frame.0)
            } else {
                None
            };
            if let Some(offset) = wrapped
                && offset < span
            {
                let t = offset as f64 / span as f64;
                return Some(<Vec2 as Lerp>::lerp(&last.pos, &first.pos, t));
            }
        }

        let idx = self.keyframes.partition_point(|k| k.frame.0 <= f);
        if idx == 0 {
            return Some(first.pos);
        }
        if idx >= self.keyframes.len() {
            return Some(last.pos);
        }
        let a = self.keyframes[idx - 1];
        let b = self.keyframes[idx];
        let t = ((f - a.frame.0) as f64) / ((b.frame.0 - a.frame.0) as f64);
        Some(<Vec2 as Lerp>::lerp(&a.pos, &b.pos, t))
    }
}

/// Evaluate a motion path at `frame` for a pattern of `total_frames` frames.
pub fn evaluate_motion_path(path: &MotionPath, frame: FrameIndex, total_frames: u64) -> Option<Vec2> {
    path.position_at(frame, total_frames)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/motion_path.rs"]
mod tests;
