use std::collections::BTreeMap;

use crate::{
    animation::curve::AnimationCurve,
    animation::motion_path::MotionPath,
    foundation::core::{FrameIndex, Rgb8, Vec2},
    foundation::error::{LedError, LedResult},
    foundation::math::lerp_u8,
};

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Rgb8 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Rgb8::new(lerp_u8(a.r, b.r, t), lerp_u8(a.g, b.g, t), lerp_u8(a.b, b.b, t))
    }
}

/// Animatable layer properties.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Color,
    Position,
    Scale,
    Rotation,
    Opacity,
}

impl Property {
    /// The only value kind keyframes of this property may hold.
    pub fn value_kind(self) -> ValueKind {
        match self {
            Self::Color => ValueKind::Color,
            Self::Position => ValueKind::Point,
            Self::Scale | Self::Rotation | Self::Opacity => ValueKind::Scalar,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Color,
    Scalar,
    Point,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimValue {
    Color(Rgb8),
    Scalar(f64),
    Point(Vec2),
}

impl AnimValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Color(_) => ValueKind::Color,
            Self::Scalar(_) => ValueKind::Scalar,
            Self::Point(_) => ValueKind::Point,
        }
    }

    pub fn as_color(&self) -> Option<Rgb8> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Vec2> {
        match self {
            Self::Point(p) => Some(*p),
            _ => None,
        }
    }

    /// Interpolate towards `other` by eased progress `t`.
    ///
    /// Callers guarantee both values have the same kind; on a mismatch `self` is returned.
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        match (self, other) {
            (Self::Color(a), Self::Color(b)) => Self::Color(<Rgb8 as Lerp>::lerp(a, b, t)),
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(<f64 as Lerp>::lerp(a, b, t)),
            (Self::Point(a), Self::Point(b)) => Self::Point(<Vec2 as Lerp>::lerp(a, b, t)),
            _ => *self,
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Self::Color(_) => true,
            Self::Scalar(v) => v.is_finite(),
            Self::Point(p) => p.x.is_finite() && p.y.is_finite(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    pub frame: FrameIndex,
    pub value: AnimValue,
    #[serde(default)]
    pub curve: AnimationCurve, // eases the segment arriving at this key
}

impl Keyframe {
    pub fn new(frame: FrameIndex, value: AnimValue, curve: AnimationCurve) -> Self {
        Self {
            frame,
            value,
            curve,
        }
    }
}

/// Keyframes of one property, kept sorted by frame with at most one key per frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawKeyframeAnimation")]
pub struct KeyframeAnimation {
    property: Property,
    keyframes: Vec<Keyframe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    motion_path: Option<MotionPath>,
}

#[derive(serde::Deserialize)]
struct RawKeyframeAnimation {
    property: Property,
    #[serde(default)]
    keyframes: Vec<Keyframe>,
    #[serde(default)]
    motion_path: Option<MotionPath>,
}

impl TryFrom<RawKeyframeAnimation> for KeyframeAnimation {
    type Error = LedError;

    fn try_from(raw: RawKeyframeAnimation) -> LedResult<Self> {
        let mut anim = Self::new(raw.property);
        for key in raw.keyframes {
            anim.insert(key)?;
        }
        if let Some(path) = raw.motion_path {
            anim.set_motion_path(Some(path))?;
        }
        Ok(anim)
    }
}

impl KeyframeAnimation {
    pub fn new(property: Property) -> Self {
        Self {
            property,
            keyframes: Vec::new(),
            motion_path: None,
        }
    }

    pub fn property(&self) -> Property {
        self.property
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn motion_path(&self) -> Option<&MotionPath> {
        self.motion_path.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Insert a new keyframe.
    ///
    /// Rejects a key at a frame that already holds one; use [`KeyframeAnimation::replace`]
    /// to overwrite explicitly.
    pub fn insert(&mut self, key: Keyframe) -> LedResult<()> {
        self.check_value(&key)?;
        match self.search(key.frame) {
            Ok(_) => Err(LedError::precondition(format!(
                "{:?} already has a keyframe at frame {}",
                self.property, key.frame.0
            ))),
            Err(pos) => {
                self.keyframes.insert(pos, key);
                Ok(())
            }
        }
    }

    /// Insert or overwrite the keyframe at `key.frame`, returning the previous key.
    pub fn replace(&mut self, key: Keyframe) -> LedResult<Option<Keyframe>> {
        self.check_value(&key)?;
        match self.search(key.frame) {
            Ok(pos) => Ok(Some(std::mem::replace(&mut self.keyframes[pos], key))),
            Err(pos) => {
                self.keyframes.insert(pos, key);
                Ok(None)
            }
        }
    }

    pub fn remove(&mut self, frame: FrameIndex) -> Option<Keyframe> {
        self.search(frame).ok().map(|pos| self.keyframes.remove(pos))
    }

    pub fn key_at(&self, frame: FrameIndex) -> Option<&Keyframe> {
        self.search(frame).ok().map(|pos| &self.keyframes[pos])
    }

    /// Attach or detach a motion path; only position animations accept one.
    pub fn set_motion_path(&mut self, path: Option<MotionPath>) -> LedResult<()> {
        if path.is_some() && self.property != Property::Position {
            return Err(LedError::animation(format!(
                "{:?} cannot carry a motion path",
                self.property
            )));
        }
        self.motion_path = path;
        Ok(())
    }

    /// Interpolated value at `frame`, or `None` when there are no keyframes.
    ///
    /// Frames before the first key hold the first value and frames after the last key hold the
    /// last value; there is no extrapolation.
    pub fn value_at(&self, frame: FrameIndex) -> Option<AnimValue> {
        let first = self.keyframes.first()?;
        let f = frame.0;
        let idx = self.keyframes.partition_point(|k| k.frame.0 <= f);

        if idx == 0 {
            return Some(first.value);
        }
        if idx >= self.keyframes.len() {
            return self.keyframes.last().map(|k| k.value);
        }

        let a = &self.keyframes[idx - 1];
        let b = &self.keyframes[idx];
        if a.frame.0 == f {
            return Some(a.value);
        }
        let t = ((f - a.frame.0) as f64) / ((b.frame.0 - a.frame.0) as f64);
        let te = b.curve.apply(t);
        Some(a.value.interpolate(&b.value, te))
    }

    fn search(&self, frame: FrameIndex) -> Result<usize, usize> {
        self.keyframes.binary_search_by_key(&frame, |k| k.frame)
    }

    fn check_value(&self, key: &Keyframe) -> LedResult<()> {
        let want = self.property.value_kind();
        if key.value.kind() != want {
            return Err(LedError::animation(format!(
                "{:?} keyframes hold {:?} values, got {:?}",
                self.property,
                want,
                key.value.kind()
            )));
        }
        if !key.value.is_finite() {
            return Err(LedError::animation("keyframe value must be finite"));
        }
        Ok(())
    }
}

/// All animated properties of one layer.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<KeyframeAnimation>", into = "Vec<KeyframeAnimation>")]
pub struct AnimationSet {
    animations: BTreeMap<Property, KeyframeAnimation>,
}

impl TryFrom<Vec<KeyframeAnimation>> for AnimationSet {
    type Error = LedError;

    fn try_from(list: Vec<KeyframeAnimation>) -> LedResult<Self> {
        let mut set = Self::default();
        for anim in list {
            if set.animations.contains_key(&anim.property) {
                return Err(LedError::precondition(format!(
                    "duplicate animation for {:?}",
                    anim.property
                )));
            }
            set.animations.insert(anim.property, anim);
        }
        Ok(set)
    }
}

impl From<AnimationSet> for Vec<KeyframeAnimation> {
    fn from(set: AnimationSet) -> Self {
        set.animations.into_values().collect()
    }
}

impl AnimationSet {
    pub fn get(&self, property: Property) -> Option<&KeyframeAnimation> {
        self.animations.get(&property)
    }

    /// The animation for `property`, created empty on first access.
    pub fn animation_mut(&mut self, property: Property) -> &mut KeyframeAnimation {
        self.animations
            .entry(property)
            .or_insert_with(|| KeyframeAnimation::new(property))
    }

    pub fn insert(&mut self, property: Property, key: Keyframe) -> LedResult<()> {
        self.animation_mut(property).insert(key)
    }

    pub fn remove_property(&mut self, property: Property) -> Option<KeyframeAnimation> {
        self.animations.remove(&property)
    }

    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.animations.keys().copied()
    }

    pub fn value_at(&self, property: Property, frame: FrameIndex) -> Option<AnimValue> {
        self.animations.get(&property)?.value_at(frame)
    }

    /// Position at `frame`: the motion path wins when present, keyframes otherwise.
    pub fn position_at(&self, frame: FrameIndex, total_frames: u64) -> Option<Vec2> {
        let anim = self.animations.get(&Property::Position)?;
        if let Some(path) = anim.motion_path() {
            return path.position_at(frame, total_frames);
        }
        anim.value_at(frame).and_then(|v| v.as_point())
    }
}

/// Evaluate one property animation at `frame`.
pub fn evaluate_keyframes(animation: &KeyframeAnimation, frame: FrameIndex) -> Option<AnimValue> {
    animation.value_at(frame)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframes.rs"]
mod tests;
