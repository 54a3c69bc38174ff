//! ledtrack is the layer-track compositing and animation core of an LED-matrix pattern editor.
//!
//! A [`Pattern`] owns a timeline of [`Frame`]s and a stack of [`LayerTrack`]s. Each track holds
//! per-frame [`LayerFrame`]s that are blended bottom to top into each frame's stored composite.
//!
//! # Pipeline overview
//!
//! 1. **Edit**: paint, fill, mask or automate a track's layer frames
//! 2. **Composite**: `tracks + FrameIndex -> PixelBuffer` ([`composite`], [`Pattern::recomposite`])
//! 3. **Check**: compare stored composites against fresh ones ([`check_sync`], [`sync_report`])
//! 4. **Export**: hand composites to a renderer (the `ledtrack frame` subcommand writes PNGs)
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: compositing, automation transforms and interpolation are pure; the same
//!   inputs give byte-identical pixels.
//! - **Non-destructive automation**: committing design actions always creates a new track.
//! - **Fail closed**: an operation that returns an error has not mutated the pattern.
#![forbid(unsafe_code)]

mod animation;
mod automation;
mod compositor;
mod foundation;
mod layers;
mod pattern;
mod pixel;
mod sync;

pub use animation::curve::AnimationCurve;
pub use animation::keyframes::{
    AnimValue, AnimationSet, Keyframe, KeyframeAnimation, Lerp, Property, ValueKind,
    evaluate_keyframes,
};
pub use animation::motion_path::{MotionPath, PathKey, evaluate_motion_path};
pub use automation::action::{
    ActionKind, Axis, CycleMode, DesignAction, Direction, RadialStyle, Rotation,
};
pub use automation::engine::{AutomationEngine, commit};
pub use automation::transform::{ActionContext, apply};
pub use compositor::batch::{CompositeThreading, composite_frames};
pub use compositor::cache::CompositeCache;
pub use compositor::composite::composite;
pub use compositor::fingerprint::{CompositeFingerprint, fingerprint_frame};
pub use foundation::core::{Canvas, FrameIndex, FrameRange, Rgb8, Vec2};
pub use foundation::error::{LedError, LedResult};
pub use layers::blend::BlendMode;
pub use layers::frame::LayerFrame;
pub use layers::group::{GroupId, LayerGroup};
pub use layers::track::{LayerTrack, TrackId};
pub use pattern::model::{DEFAULT_FRAME_DURATION_MS, Frame, Pattern};
pub use pixel::buffer::PixelBuffer;
pub use sync::monitor::{SyncMismatch, SyncReport, check_sync, resync, resync_all, sync_report};
