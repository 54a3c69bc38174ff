use super::*;
use crate::foundation::error::LedError;

const A: Rgb8 = Rgb8::new(1, 0, 0);
const B: Rgb8 = Rgb8::new(2, 0, 0);
const C: Rgb8 = Rgb8::new(3, 0, 0);
const D: Rgb8 = Rgb8::new(4, 0, 0);
const E: Rgb8 = Rgb8::new(5, 0, 0);
const F: Rgb8 = Rgb8::new(6, 0, 0);

fn buf(w: u32, h: u32, px: &[Rgb8]) -> PixelBuffer {
    PixelBuffer::from_pixels(w, h, px.to_vec()).unwrap()
}

fn ctx() -> ActionContext {
    ActionContext::single(FrameIndex(0))
}

fn scroll(direction: Direction, distance: i64) -> DesignAction {
    DesignAction::Scroll {
        direction,
        distance,
        step: 0,
    }
}

#[test]
fn scroll_right_wraps_around() {
    let row = buf(4, 1, &[A, B, C, D]);
    let out = apply(&scroll(Direction::Right, 1), &row, &ctx()).unwrap();
    assert_eq!(out.pixels(), &[D, A, B, C]);
}

#[test]
fn four_single_scrolls_return_to_start() {
    let row = buf(4, 1, &[A, B, C, D]);
    let mut cur = row.clone();
    for _ in 0..4 {
        cur = apply(&scroll(Direction::Right, 1), &cur, &ctx()).unwrap();
    }
    assert_eq!(cur, row);
}

#[test]
fn scroll_left_and_vertical() {
    let row = buf(4, 1, &[A, B, C, D]);
    let out = apply(&scroll(Direction::Left, 5), &row, &ctx()).unwrap();
    assert_eq!(out.pixels(), &[B, C, D, A]);

    let col = buf(1, 3, &[A, B, C]);
    let down = apply(&scroll(Direction::Down, 1), &col, &ctx()).unwrap();
    assert_eq!(down.pixels(), &[C, A, B]);
    let up = apply(&scroll(Direction::Up, 1), &col, &ctx()).unwrap();
    assert_eq!(up.pixels(), &[B, C, A]);
}

#[test]
fn scroll_step_grows_with_position() {
    let row = buf(4, 1, &[A, B, C, D]);
    let action = DesignAction::Scroll {
        direction: Direction::Right,
        distance: 0,
        step: 1,
    };
    let third = ActionContext {
        frame: FrameIndex(7),
        position: 2,
        count: 4,
    };
    assert_eq!(apply(&action, &row, &third).unwrap().pixels(), &[C, D, A, B]);
}

#[test]
fn negative_distance_is_rejected() {
    let row = buf(4, 1, &[A, B, C, D]);
    assert!(apply(&scroll(Direction::Right, -2), &row, &ctx()).is_err());
}

#[test]
fn extreme_offsets_wrap_without_overflow() {
    let row = buf(4, 1, &[A, B, C, D]);
    // i64::MAX = 3 (mod 4)
    let left = apply(&scroll(Direction::Left, i64::MAX), &row, &ctx()).unwrap();
    assert_eq!(left.pixels(), &[D, A, B, C]);
    let right = apply(&scroll(Direction::Right, i64::MAX), &row, &ctx()).unwrap();
    assert_eq!(right.pixels(), &[B, C, D, A]);

    let col = buf(1, 4, &[A, B, C, D]);
    let up = apply(&scroll(Direction::Up, i64::MAX), &col, &ctx()).unwrap();
    assert_eq!(up.pixels(), &[D, A, B, C]);

    let stepped = DesignAction::Scroll {
        direction: Direction::Left,
        distance: i64::MAX,
        step: i64::MAX,
    };
    let late = ActionContext {
        frame: FrameIndex(9),
        position: 9,
        count: 10,
    };
    assert_eq!(apply(&stepped, &row, &late).unwrap(), left);

    for f in 0..8 {
        let bounce = DesignAction::Bounce {
            axis: Axis::Horizontal,
            amplitude: i64::MAX,
            period: 8,
        };
        let out = apply(&bounce, &row, &ActionContext::single(FrameIndex(f))).unwrap();
        assert_eq!(out.len(), 4);
    }
}

#[test]
fn rotate_clockwise_swaps_dimensions() {
    // A B C
    // D E F
    let src = buf(3, 2, &[A, B, C, D, E, F]);
    let cw = apply(
        &DesignAction::Rotate {
            rotation: Rotation::Clockwise90,
        },
        &src,
        &ctx(),
    )
    .unwrap();
    assert_eq!((cw.width(), cw.height()), (2, 3));
    // D A
    // E B
    // F C
    assert_eq!(cw.pixels(), &[D, A, E, B, F, C]);

    let back = apply(
        &DesignAction::Rotate {
            rotation: Rotation::CounterClockwise90,
        },
        &cw,
        &ctx(),
    )
    .unwrap();
    assert_eq!(back, src);
}

#[test]
fn half_turn_reverses_everything() {
    let src = buf(3, 2, &[A, B, C, D, E, F]);
    let out = apply(
        &DesignAction::Rotate {
            rotation: Rotation::Half,
        },
        &src,
        &ctx(),
    )
    .unwrap();
    assert_eq!(out.pixels(), &[F, E, D, C, B, A]);
}

#[test]
fn mirror_and_flip_reverse_one_axis() {
    let src = buf(3, 2, &[A, B, C, D, E, F]);
    let m = apply(
        &DesignAction::Mirror {
            axis: Axis::Horizontal,
        },
        &src,
        &ctx(),
    )
    .unwrap();
    assert_eq!(m.pixels(), &[C, B, A, F, E, D]);
    let f = apply(
        &DesignAction::Flip {
            axis: Axis::Vertical,
        },
        &src,
        &ctx(),
    )
    .unwrap();
    assert_eq!(f.pixels(), &[D, E, F, A, B, C]);
}

#[test]
fn invert_flips_channels() {
    let src = buf(2, 1, &[Rgb8::WHITE, Rgb8::new(10, 20, 30)]);
    let out = apply(&DesignAction::Invert, &src, &ctx()).unwrap();
    assert_eq!(out.pixels(), &[Rgb8::BLACK, Rgb8::new(245, 235, 225)]);
}

#[test]
fn wipe_keeps_leading_fraction() {
    let src = buf(4, 1, &[A, B, C, D]);
    let wipe = |direction, progress| DesignAction::Wipe {
        direction,
        progress: Some(progress),
        fill: Rgb8::WHITE,
    };
    let out = apply(&wipe(Direction::Right, 0.5), &src, &ctx()).unwrap();
    assert_eq!(out.pixels(), &[A, B, Rgb8::WHITE, Rgb8::WHITE]);
    let out = apply(&wipe(Direction::Left, 0.25), &src, &ctx()).unwrap();
    assert_eq!(out.pixels(), &[Rgb8::WHITE, Rgb8::WHITE, Rgb8::WHITE, D]);
    let out = apply(&wipe(Direction::Right, 1.0), &src, &ctx()).unwrap();
    assert_eq!(out, src);
}

#[test]
fn wipe_is_monotonic_in_progress() {
    let src = buf(8, 1, &[A; 8]);
    let mut kept_before = 0;
    for i in 0..=10 {
        let action = DesignAction::Wipe {
            direction: Direction::Right,
            progress: Some(f64::from(i) / 10.0),
            fill: Rgb8::WHITE,
        };
        let out = apply(&action, &src, &ctx()).unwrap();
        let kept = out.pixels().iter().filter(|&&p| p == A).count();
        assert!(kept >= kept_before);
        kept_before = kept;
    }
    assert_eq!(kept_before, 8);
}

#[test]
fn reveal_hides_leading_fraction() {
    let src = buf(4, 1, &[A, B, C, D]);
    let action = DesignAction::Reveal {
        direction: Direction::Right,
        progress: Some(0.5),
    };
    let out = apply(&action, &src, &ctx()).unwrap();
    assert_eq!(out.pixels(), &[Rgb8::BLACK, Rgb8::BLACK, C, D]);
}

#[test]
fn progress_ramps_across_the_selection() {
    let ramp = |position| ActionContext {
        frame: FrameIndex(position),
        position,
        count: 5,
    };
    assert_eq!(ramp(0).ramp(), 0.0);
    assert_eq!(ramp(2).ramp(), 0.5);
    assert_eq!(ramp(4).ramp(), 1.0);
    assert_eq!(ActionContext::single(FrameIndex(3)).ramp(), 1.0);

    let src = buf(4, 1, &[A, B, C, D]);
    let action = DesignAction::Reveal {
        direction: Direction::Right,
        progress: None,
    };
    assert_eq!(apply(&action, &src, &ramp(0)).unwrap(), src);
}

#[test]
fn bounce_follows_a_sine() {
    assert_eq!(bounce_offset(2, 4, FrameIndex(0)), 0);
    assert_eq!(bounce_offset(2, 4, FrameIndex(1)), 2);
    assert_eq!(bounce_offset(2, 4, FrameIndex(2)), 0);
    assert_eq!(bounce_offset(2, 4, FrameIndex(3)), -2);
    assert_eq!(bounce_offset(2, 4, FrameIndex(5)), 2);

    let row = buf(4, 1, &[A, B, C, D]);
    let action = DesignAction::Bounce {
        axis: Axis::Horizontal,
        amplitude: 1,
        period: 4,
    };
    let at = |f| ActionContext::single(FrameIndex(f));
    assert_eq!(apply(&action, &row, &at(1)).unwrap().pixels(), &[D, A, B, C]);
    assert_eq!(apply(&action, &row, &at(3)).unwrap().pixels(), &[B, C, D, A]);
}

#[test]
fn colour_cycle_rotates_channels() {
    let src = buf(1, 1, &[Rgb8::new(1, 2, 3)]);
    let rgb = apply(
        &DesignAction::ColourCycle {
            mode: CycleMode::Rgb,
        },
        &src,
        &ctx(),
    )
    .unwrap();
    assert_eq!(rgb.pixels(), &[Rgb8::new(2, 3, 1)]);
    let ryb = apply(
        &DesignAction::ColourCycle {
            mode: CycleMode::Ryb,
        },
        &src,
        &ctx(),
    )
    .unwrap();
    assert_eq!(ryb.pixels(), &[Rgb8::new(3, 1, 2)]);
}

#[test]
fn pulse_dims_corners_more_than_centre() {
    let src = buf(3, 3, &[Rgb8::WHITE; 9]);
    let out = apply(
        &DesignAction::Radial {
            style: RadialStyle::Pulse,
        },
        &src,
        &ActionContext::single(FrameIndex(5)),
    )
    .unwrap();
    assert_eq!(out.get(1, 1), Some(Rgb8::WHITE));
    assert_eq!(out.get(0, 0), Some(Rgb8::new(128, 128, 128)));
}

#[test]
fn spiral_is_deterministic_and_keeps_the_centre() {
    let px: Vec<Rgb8> = (0..25).map(|i| Rgb8::new(i, 0, 0)).collect();
    let src = buf(5, 5, &px);
    let action = DesignAction::Radial {
        style: RadialStyle::Spiral,
    };
    let a = apply(&action, &src, &ActionContext::single(FrameIndex(3))).unwrap();
    let b = apply(&action, &src, &ActionContext::single(FrameIndex(3))).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.get(2, 2), src.get(2, 2));
    assert_eq!((a.width(), a.height()), (5, 5));
}

#[test]
fn layer_coverage_travels_with_pixels() {
    let mut frame = LayerFrame::transparent(Canvas::new(3, 1).unwrap());
    frame.paint(0, 0, Rgb8::WHITE).unwrap();
    let plane = Plane::from_layer(&frame);
    let out = apply_plane(&scroll(Direction::Right, 1), &plane, &ctx())
        .unwrap()
        .into_layer()
        .unwrap();
    assert_eq!(out.alpha_at(0), 0);
    assert_eq!(out.alpha_at(1), 255);
    assert_eq!(out.pixels.get(1, 0), Some(Rgb8::WHITE));
}

#[test]
fn empty_buffers_are_rejected() {
    let empty = PixelBuffer::filled(
        Canvas {
            width: 0,
            height: 0,
        },
        Rgb8::WHITE,
    );
    for style in [RadialStyle::Pulse, RadialStyle::Spiral] {
        assert!(matches!(
            apply(&DesignAction::Radial { style }, &empty, &ctx()),
            Err(LedError::Precondition(_))
        ));
    }
}
