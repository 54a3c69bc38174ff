use super::*;

fn pattern() -> (Pattern, TrackId) {
    let p = Pattern::new(2, 2, 3).unwrap();
    let id = p.tracks()[0].id;
    (p, id)
}

#[test]
fn add_places_track_on_top_with_fresh_id() {
    let (mut p, base) = pattern();
    let a = p.add_layer_track("a").unwrap();
    let b = p.add_layer_track("b").unwrap();
    assert_ne!(a, base);
    assert_ne!(a, b);
    assert_eq!(p.track(a).unwrap().z_index, 1);
    assert_eq!(p.track(b).unwrap().z_index, 2);
}

#[test]
fn add_above_max_z_is_rejected_without_mutation() {
    let (mut p, base) = pattern();
    p.reorder_layer_track(base, i32::MAX).unwrap();
    let before = p.clone();
    assert!(matches!(
        p.add_layer_track("next"),
        Err(LedError::Precondition(_))
    ));
    assert_eq!(p, before);

    p.reorder_layer_track(base, i32::MAX - 1).unwrap();
    let top = p.add_layer_track("top").unwrap();
    assert_eq!(p.track(top).unwrap().z_index, i32::MAX);
}

#[test]
fn last_track_cannot_be_removed() {
    let (mut p, base) = pattern();
    let before = p.clone();
    assert!(matches!(
        p.remove_layer_track(base),
        Err(LedError::Precondition(_))
    ));
    assert_eq!(p, before);

    let other = p.add_layer_track("other").unwrap();
    p.remove_layer_track(base).unwrap();
    assert_eq!(p.tracks().len(), 1);
    assert_eq!(p.tracks()[0].id, other);
}

#[test]
fn unknown_ids_are_rejected() {
    let (mut p, _) = pattern();
    assert!(p.reorder_layer_track(TrackId(99), 3).is_err());
    assert!(p.set_group_visible(GroupId(99), false).is_err());
}

#[test]
fn visibility_and_opacity_address_default_or_override() {
    let (mut p, id) = pattern();
    p.set_visibility(id, None, false).unwrap();
    p.set_visibility(id, Some(FrameIndex(1)), true).unwrap();
    let t = p.track(id).unwrap();
    assert!(!t.effective_visibility(FrameIndex(0), None));
    assert!(t.effective_visibility(FrameIndex(1), None));

    p.set_opacity(id, Some(FrameIndex(2)), 3.0).unwrap();
    assert_eq!(p.track(id).unwrap().effective_opacity(FrameIndex(2), None), 1.0);
    assert!(p.set_opacity(id, None, f64::NAN).is_err());

    p.clear_overrides(id, FrameIndex(1)).unwrap();
    assert!(!p.track(id).unwrap().effective_visibility(FrameIndex(1), None));
}

#[test]
fn locked_track_rejects_pixel_writes_but_keeps_state() {
    let (mut p, id) = pattern();
    p.set_locked(id, true).unwrap();
    let before = p.clone();
    assert!(p.paint_pixel(id, FrameIndex(0), 0, 0, Rgb8::WHITE).is_err());
    assert!(p.fill_frame(id, FrameIndex(0), Rgb8::WHITE).is_err());
    assert!(p.set_mask(id, FrameIndex(0), vec![1.0; 4]).is_err());
    assert_eq!(p, before);
}

#[test]
fn paint_outside_canvas_or_timeline_fails_without_creating_frames() {
    let (mut p, id) = pattern();
    assert!(p.paint_pixel(id, FrameIndex(0), 2, 0, Rgb8::WHITE).is_err());
    assert!(p.paint_pixel(id, FrameIndex(3), 0, 0, Rgb8::WHITE).is_err());
    assert!(p.track(id).unwrap().frames.is_empty());
}

#[test]
fn paint_and_erase_show_up_after_recomposite() {
    let (mut p, id) = pattern();
    p.paint_pixel(id, FrameIndex(0), 1, 0, Rgb8::new(1, 2, 3)).unwrap();
    p.recomposite(FrameIndex(0)).unwrap();
    assert_eq!(p.frames()[0].pixels().get(1, 0), Some(Rgb8::new(1, 2, 3)));

    p.erase_pixel(id, FrameIndex(0), 1, 0).unwrap();
    p.recomposite(FrameIndex(0)).unwrap();
    assert_eq!(p.frames()[0].pixels().get(1, 0), Some(Rgb8::BLACK));
}

#[test]
fn bad_mask_does_not_create_a_layer_frame() {
    let (mut p, id) = pattern();
    assert!(p.set_mask(id, FrameIndex(0), vec![0.5; 3]).is_err());
    assert!(p.track(id).unwrap().frame(FrameIndex(0)).is_none());
    p.set_mask(id, FrameIndex(0), vec![0.5; 4]).unwrap();
    assert!(p.track(id).unwrap().frame(FrameIndex(0)).is_some());
    p.clear_mask(id, FrameIndex(0)).unwrap();
    assert!(p.track(id).unwrap().frame(FrameIndex(0)).unwrap().mask.is_none());
}

#[test]
fn replace_pixels_checks_dimensions() {
    let (mut p, id) = pattern();
    let wrong = PixelBuffer::black(crate::foundation::core::Canvas::new(3, 3).unwrap());
    assert!(p.replace_pixels(id, FrameIndex(0), wrong).is_err());
    let ok = PixelBuffer::filled(p.canvas(), Rgb8::WHITE);
    p.replace_pixels(id, FrameIndex(0), ok.clone()).unwrap();
    assert_eq!(p.track(id).unwrap().frame(FrameIndex(0)).unwrap().pixels, ok);
}

#[test]
fn copy_layer_to_frames_is_a_deep_copy() {
    let (mut p, id) = pattern();
    p.fill_frame(id, FrameIndex(0), Rgb8::WHITE).unwrap();
    p.copy_layer_to_frames(id, FrameIndex(0), &[FrameIndex(1), FrameIndex(2)])
        .unwrap();
    p.paint_pixel(id, FrameIndex(1), 0, 0, Rgb8::BLACK).unwrap();
    let t = p.track(id).unwrap();
    assert_eq!(t.frame(FrameIndex(0)).unwrap().pixels.get(0, 0), Some(Rgb8::WHITE));
    assert_eq!(t.frame(FrameIndex(2)).unwrap().pixels.get(0, 0), Some(Rgb8::WHITE));
    assert_eq!(t.frame(FrameIndex(1)).unwrap().pixels.get(0, 0), Some(Rgb8::BLACK));
    assert!(p.copy_layer_to_frames(id, FrameIndex(0), &[FrameIndex(9)]).is_err());
}

#[test]
fn merge_flattens_sources_into_target() {
    let (mut p, base) = pattern();
    p.fill_frame(base, FrameIndex(0), Rgb8::new(255, 0, 0)).unwrap();
    let top = p.add_layer_track("top").unwrap();
    p.paint_pixel(top, FrameIndex(0), 0, 0, Rgb8::new(0, 0, 255)).unwrap();
    p.paint_pixel(top, FrameIndex(1), 1, 1, Rgb8::WHITE).unwrap();
    let expected: Vec<_> = (0..2)
        .map(|f| p.get_composite(FrameIndex(f)).unwrap())
        .collect();

    p.merge_layer_tracks(&[base, top], base).unwrap();
    assert_eq!(p.tracks().len(), 1);
    for (f, want) in expected.iter().enumerate() {
        assert_eq!(&p.get_composite(FrameIndex(f as u64)).unwrap(), want);
    }
    // Untouched pixels of frame 1 stay transparent in the merged track.
    let merged = p.track(base).unwrap().frame(FrameIndex(1)).unwrap();
    assert_eq!(merged.alpha_at(0), 0);
    assert_eq!(merged.alpha_at(3), 255);
}

#[test]
fn merge_requires_target_among_sources() {
    let (mut p, base) = pattern();
    let a = p.add_layer_track("a").unwrap();
    let b = p.add_layer_track("b").unwrap();
    assert!(p.merge_layer_tracks(&[a, b], base).is_err());
    assert!(p.merge_layer_tracks(&[a], a).is_err());
    assert_eq!(p.tracks().len(), 3);
}

#[test]
fn groups_hide_and_ungroup_on_removal() {
    let (mut p, id) = pattern();
    p.fill_frame(id, FrameIndex(0), Rgb8::WHITE).unwrap();
    let g = p.create_group("g");
    p.assign_group(id, Some(g)).unwrap();
    p.set_group_visible(g, false).unwrap();
    assert_eq!(
        p.get_composite(FrameIndex(0)).unwrap().get(0, 0),
        Some(Rgb8::BLACK)
    );
    p.set_group_visible(g, true).unwrap();
    p.set_group_opacity(g, 0.5).unwrap();
    assert_eq!(
        p.get_composite(FrameIndex(0)).unwrap().get(0, 0),
        Some(Rgb8::new(128, 128, 128))
    );
    p.remove_group(g).unwrap();
    assert_eq!(p.track(id).unwrap().group_id, None);
    assert!(p.assign_group(id, Some(g)).is_err());
    p.validate().unwrap();
}

#[test]
fn track_window_limits_contribution() {
    let (mut p, id) = pattern();
    for f in 0..3 {
        p.fill_frame(id, FrameIndex(f), Rgb8::WHITE).unwrap();
    }
    p.set_track_window(id, Some(FrameIndex(1)), Some(FrameIndex(1)))
        .unwrap();
    assert_eq!(p.get_composite(FrameIndex(0)).unwrap().get(0, 0), Some(Rgb8::BLACK));
    assert_eq!(p.get_composite(FrameIndex(1)).unwrap().get(0, 0), Some(Rgb8::WHITE));
    assert!(p.set_track_window(id, Some(FrameIndex(2)), Some(FrameIndex(1))).is_err());
}

#[test]
fn rename_and_blend_mode_are_stored() {
    let (mut p, id) = pattern();
    p.rename_layer_track(id, "Background").unwrap();
    p.set_blend_mode(id, BlendMode::Screen).unwrap();
    let t = p.track(id).unwrap();
    assert_eq!(t.name, "Background");
    assert_eq!(t.blend_mode, BlendMode::Screen);
}
