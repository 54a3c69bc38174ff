use super::*;

fn scalar_anim(keys: &[(u64, f64, AnimationCurve)]) -> KeyframeAnimation {
    let mut anim = KeyframeAnimation::new(Property::Opacity);
    for &(frame, v, curve) in keys {
        anim.insert(Keyframe::new(FrameIndex(frame), AnimValue::Scalar(v), curve))
            .unwrap();
    }
    anim
}

#[test]
fn empty_animation_has_no_value() {
    let anim = KeyframeAnimation::new(Property::Scale);
    assert_eq!(anim.value_at(FrameIndex(3)), None);
}

#[test]
fn holds_first_and_last_values_without_extrapolation() {
    let anim = scalar_anim(&[
        (5, 0.2, AnimationCurve::Linear),
        (15, 0.8, AnimationCurve::EaseInOutCubic),
    ]);
    assert_eq!(anim.value_at(FrameIndex(3)), anim.value_at(FrameIndex(5)));
    assert_eq!(anim.value_at(FrameIndex(20)), anim.value_at(FrameIndex(15)));
    assert_eq!(anim.value_at(FrameIndex(0)), Some(AnimValue::Scalar(0.2)));
    assert_eq!(anim.value_at(FrameIndex(99)), Some(AnimValue::Scalar(0.8)));
}

#[test]
fn scalar_interpolates_linearly() {
    let anim = scalar_anim(&[
        (0, 0.0, AnimationCurve::Linear),
        (10, 10.0, AnimationCurve::Linear),
    ]);
    assert_eq!(anim.value_at(FrameIndex(5)), Some(AnimValue::Scalar(5.0)));
}

#[test]
fn curve_of_the_next_key_eases_the_segment() {
    let anim = scalar_anim(&[
        (0, 0.0, AnimationCurve::Linear),
        (10, 1.0, AnimationCurve::EaseInQuad),
        (20, 0.0, AnimationCurve::Linear),
    ]);
    // Segment 0..10 uses the quad curve of key 10.
    assert_eq!(anim.value_at(FrameIndex(5)), Some(AnimValue::Scalar(0.25)));
    // Segment 10..20 uses the linear curve of key 20.
    assert_eq!(anim.value_at(FrameIndex(15)), Some(AnimValue::Scalar(0.5)));
}

#[test]
fn color_interpolates_per_channel_with_rounding() {
    let mut anim = KeyframeAnimation::new(Property::Color);
    anim.insert(Keyframe::new(
        FrameIndex(0),
        AnimValue::Color(Rgb8::new(0, 0, 0)),
        AnimationCurve::Linear,
    ))
    .unwrap();
    anim.insert(Keyframe::new(
        FrameIndex(2),
        AnimValue::Color(Rgb8::new(255, 100, 1)),
        AnimationCurve::Linear,
    ))
    .unwrap();
    assert_eq!(
        anim.value_at(FrameIndex(1)),
        Some(AnimValue::Color(Rgb8::new(128, 50, 1)))
    );
}

#[test]
fn position_interpolates_component_wise() {
    let mut anim = KeyframeAnimation::new(Property::Position);
    anim.insert(Keyframe::new(
        FrameIndex(0),
        AnimValue::Point(Vec2::new(0.0, 10.0)),
        AnimationCurve::Linear,
    ))
    .unwrap();
    anim.insert(Keyframe::new(
        FrameIndex(4),
        AnimValue::Point(Vec2::new(8.0, 2.0)),
        AnimationCurve::Linear,
    ))
    .unwrap();
    assert_eq!(
        anim.value_at(FrameIndex(1)).and_then(|v| v.as_point()),
        Some(Vec2::new(2.0, 8.0))
    );
}

#[test]
fn duplicate_frame_is_rejected_but_replace_overwrites() {
    let mut anim = scalar_anim(&[(3, 1.0, AnimationCurve::Linear)]);
    let dup = Keyframe::new(FrameIndex(3), AnimValue::Scalar(2.0), AnimationCurve::Linear);
    assert!(matches!(anim.insert(dup), Err(LedError::Precondition(_))));
    assert_eq!(anim.keyframes().len(), 1);
    assert_eq!(anim.value_at(FrameIndex(3)), Some(AnimValue::Scalar(1.0)));

    let old = anim.replace(dup).unwrap();
    assert_eq!(old.map(|k| k.value), Some(AnimValue::Scalar(1.0)));
    assert_eq!(anim.value_at(FrameIndex(3)), Some(AnimValue::Scalar(2.0)));
}

#[test]
fn keys_stay_sorted_regardless_of_insert_order() {
    let anim = scalar_anim(&[
        (9, 0.0, AnimationCurve::Linear),
        (1, 0.0, AnimationCurve::Linear),
        (4, 0.0, AnimationCurve::Linear),
    ]);
    let frames: Vec<u64> = anim.keyframes().iter().map(|k| k.frame.0).collect();
    assert_eq!(frames, vec![1, 4, 9]);
}

#[test]
fn value_kind_must_match_property() {
    let mut anim = KeyframeAnimation::new(Property::Color);
    let err = anim
        .insert(Keyframe::new(
            FrameIndex(0),
            AnimValue::Scalar(1.0),
            AnimationCurve::Linear,
        ))
        .unwrap_err();
    assert!(matches!(err, LedError::Animation(_)));
}

#[test]
fn remove_and_key_at() {
    let mut anim = scalar_anim(&[
        (0, 0.0, AnimationCurve::Linear),
        (5, 1.0, AnimationCurve::Linear),
    ]);
    assert!(anim.key_at(FrameIndex(5)).is_some());
    assert!(anim.remove(FrameIndex(5)).is_some());
    assert!(anim.remove(FrameIndex(5)).is_none());
    assert_eq!(anim.value_at(FrameIndex(9)), Some(AnimValue::Scalar(0.0)));
}

#[test]
fn only_position_accepts_a_motion_path() {
    let path = MotionPath::new(vec![], false, false).unwrap();
    let mut color = KeyframeAnimation::new(Property::Color);
    assert!(color.set_motion_path(Some(path.clone())).is_err());
    let mut pos = KeyframeAnimation::new(Property::Position);
    assert!(pos.set_motion_path(Some(path)).is_ok());
}

#[test]
fn animation_set_prefers_motion_path_for_position() {
    let mut set = AnimationSet::default();
    set.insert(
        Property::Position,
        Keyframe::new(
            FrameIndex(0),
            AnimValue::Point(Vec2::new(100.0, 100.0)),
            AnimationCurve::Linear,
        ),
    )
    .unwrap();
    assert_eq!(
        set.position_at(FrameIndex(0), 10),
        Some(Vec2::new(100.0, 100.0))
    );

    let path = MotionPath::new(
        vec![
            crate::animation::motion_path::PathKey::new(0, 0.0, 0.0),
            crate::animation::motion_path::PathKey::new(10, 10.0, 0.0),
        ],
        false,
        false,
    )
    .unwrap();
    set.animation_mut(Property::Position)
        .set_motion_path(Some(path))
        .unwrap();
    assert_eq!(set.position_at(FrameIndex(5), 10), Some(Vec2::new(5.0, 0.0)));
}

#[test]
fn serialized_layout_round_trips() {
    let anim = scalar_anim(&[
        (2, 0.5, AnimationCurve::Bounce),
        (8, 1.0, AnimationCurve::Elastic),
    ]);
    let json = serde_json::to_value(&anim).unwrap();
    assert_eq!(json["property"], "opacity");
    assert_eq!(json["keyframes"][0]["frame"], 2);
    assert_eq!(json["keyframes"][1]["curve"], "elastic");
    assert!(json.get("motion_path").is_none());

    let back: KeyframeAnimation = serde_json::from_value(json).unwrap();
    assert_eq!(back, anim);
}

#[test]
fn deserialize_rejects_duplicate_frames() {
    let json = r#"{
        "property": "scale",
        "keyframes": [
            {"frame": 1, "value": {"scalar": 1.0}, "curve": "linear"},
            {"frame": 1, "value": {"scalar": 2.0}, "curve": "linear"}
        ]
    }"#;
    assert!(serde_json::from_str::<KeyframeAnimation>(json).is_err());
}

#[test]
fn evaluate_keyframes_matches_value_at() {
    let anim = scalar_anim(&[
        (0, 0.0, AnimationCurve::Linear),
        (4, 4.0, AnimationCurve::Linear),
    ]);
    for f in 0..6 {
        assert_eq!(
            evaluate_keyframes(&anim, FrameIndex(f)),
            anim.value_at(FrameIndex(f))
        );
    }
}
