use std::f64::consts::TAU;

use crate::automation::action::{Axis, CycleMode, DesignAction, Direction, RadialStyle, Rotation};
use crate::foundation::core::{Canvas, FrameIndex, Rgb8};
use crate::foundation::error::LedResult;
use crate::foundation::math::round_channel;
use crate::layers::frame::LayerFrame;
use crate::pixel::buffer::PixelBuffer;

/// Where a transform runs: the frame being produced and its place in the committed selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionContext {
    pub frame: FrameIndex,
    /// Zero-based position of `frame` within the selection.
    pub position: u64,
    /// Number of frames in the selection.
    pub count: u64,
}

impl ActionContext {
    /// Context for a lone frame (preview).
    pub fn single(frame: FrameIndex) -> Self {
        Self {
            frame,
            position: 0,
            count: 1,
        }
    }

    /// 0 on the first selected frame, 1 on the last.
    pub fn ramp(&self) -> f64 {
        if self.count <= 1 {
            1.0
        } else {
            self.position as f64 / (self.count - 1) as f64
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Texel {
    color: Rgb8,
    alpha: u8,
}

const CLEAR: Texel = Texel {
    color: Rgb8::BLACK,
    alpha: 0,
};

/// Colors plus coverage, the unit every transform works on.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Plane {
    canvas: Canvas,
    texels: Vec<Texel>,
}

impl Plane {
    fn opaque(buf: &PixelBuffer) -> Self {
        Self {
            canvas: buf.canvas(),
            texels: buf
                .pixels()
                .iter()
                .map(|&color| Texel { color, alpha: 255 })
                .collect(),
        }
    }

    /// Alpha and mask are folded into one coverage byte.
    pub(crate) fn from_layer(frame: &LayerFrame) -> Self {
        Self {
            canvas: frame.canvas(),
            texels: frame
                .pixels
                .pixels()
                .iter()
                .enumerate()
                .map(|(i, &color)| Texel {
                    color,
                    alpha: round_channel(frame.coverage(i) * 255.0),
                })
                .collect(),
        }
    }

    pub(crate) fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn into_buffer(self) -> LedResult<PixelBuffer> {
        PixelBuffer::from_pixels(
            self.canvas.width,
            self.canvas.height,
            self.texels.into_iter().map(|t| t.color).collect(),
        )
    }

    pub(crate) fn into_layer(self) -> LedResult<LayerFrame> {
        let alpha = self.texels.iter().map(|t| t.alpha).collect();
        let pixels = PixelBuffer::from_pixels(
            self.canvas.width,
            self.canvas.height,
            self.texels.iter().map(|t| t.color).collect(),
        )?;
        Ok(LayerFrame::from_parts(pixels, alpha))
    }

    fn at(&self, x: u32, y: u32) -> Texel {
        self.canvas
            .index(x, y)
            .map_or(CLEAR, |i| self.texels[i])
    }

    /// Build an `out`-sized plane; `f` names the source pixel for each destination pixel.
    fn remap(&self, out: Canvas, f: impl Fn(u32, u32) -> Option<(u32, u32)>) -> Self {
        let mut texels = Vec::with_capacity(out.pixel_count());
        for y in 0..out.height {
            for x in 0..out.width {
                texels.push(f(x, y).map_or(CLEAR, |(sx, sy)| self.at(sx, sy)));
            }
        }
        Self {
            canvas: out,
            texels,
        }
    }

    fn map_indexed(&self, f: impl Fn(u32, u32, Texel) -> Texel) -> Self {
        let w = self.canvas.width;
        Self {
            canvas: self.canvas,
            texels: self
                .texels
                .iter()
                .enumerate()
                .map(|(i, &t)| f(i as u32 % w, i as u32 / w, t))
                .collect(),
        }
    }

    fn map_colors(&self, f: impl Fn(Rgb8) -> Rgb8) -> Self {
        self.map_indexed(|_, _, t| Texel {
            color: f(t.color),
            ..t
        })
    }
}

/// Apply one action to an opaque buffer.
///
/// Pure: `source` is untouched and the result is newly allocated. Quarter-turn rotations
/// return a buffer with width and height swapped. Hidden pixels come back black.
/// Zero-sized buffers are rejected.
pub fn apply(action: &DesignAction, source: &PixelBuffer, ctx: &ActionContext) -> LedResult<PixelBuffer> {
    Canvas::new(source.width(), source.height())?;
    apply_plane(action, &Plane::opaque(source), ctx)?.into_buffer()
}

pub(crate) fn apply_plane(action: &DesignAction, src: &Plane, ctx: &ActionContext) -> LedResult<Plane> {
    action.validate()?;
    let out = match action {
        DesignAction::Scroll {
            direction,
            distance,
            step,
        } => {
            let d = distance.saturating_add(step.saturating_mul(ctx.position as i64));
            let (dx, dy) = match direction {
                Direction::Right => (d, 0),
                Direction::Left => (-d, 0),
                Direction::Down => (0, d),
                Direction::Up => (0, -d),
            };
            shift(src, dx, dy)
        }
        DesignAction::Rotate { rotation } => rotate(src, *rotation),
        DesignAction::Mirror { axis } | DesignAction::Flip { axis } => reverse(src, *axis),
        DesignAction::Invert => src.map_colors(|c| c.map(|v| 255 - v)),
        DesignAction::Wipe {
            direction,
            progress,
            fill,
        } => {
            let keep = cutoff(src.canvas, *direction, progress.unwrap_or_else(|| ctx.ramp()));
            let fill = Texel {
                color: *fill,
                alpha: 255,
            };
            src.map_indexed(|x, y, t| {
                if along(src.canvas, *direction, x, y) >= keep {
                    fill
                } else {
                    t
                }
            })
        }
        DesignAction::Reveal {
            direction,
            progress,
        } => {
            let hide = cutoff(src.canvas, *direction, progress.unwrap_or_else(|| ctx.ramp()));
            src.map_indexed(|x, y, t| {
                if along(src.canvas, *direction, x, y) < hide {
                    CLEAR
                } else {
                    t
                }
            })
        }
        DesignAction::Bounce {
            axis,
            amplitude,
            period,
        } => {
            let offset = bounce_offset(*amplitude, *period, ctx.frame);
            match axis {
                Axis::Horizontal => shift(src, offset, 0),
                Axis::Vertical => shift(src, 0, offset),
            }
        }
        DesignAction::ColourCycle { mode } => match mode {
            CycleMode::Rgb => src.map_colors(|c| Rgb8::new(c.g, c.b, c.r)),
            CycleMode::Ryb => src.map_colors(|c| Rgb8::new(c.b, c.r, c.g)),
        },
        DesignAction::Radial { style } => match style {
            RadialStyle::Pulse => pulse(src, ctx.frame),
            RadialStyle::Spiral => spiral(src, ctx.frame),
        },
    };
    Ok(out)
}

/// `round(amplitude * sin(2*pi*frame/period))`, in whole pixels.
pub(crate) fn bounce_offset(amplitude: i64, period: u64, frame: FrameIndex) -> i64 {
    let phase = (frame.0 % period) as f64 / period as f64;
    (amplitude as f64 * (TAU * phase).sin()).round() as i64
}

fn shift(src: &Plane, dx: i64, dy: i64) -> Plane {
    let w = i64::from(src.canvas.width);
    let h = i64::from(src.canvas.height);
    // Reduce first so huge offsets cannot overflow the subtraction below.
    let (dx, dy) = (dx.rem_euclid(w), dy.rem_euclid(h));
    src.remap(src.canvas, |x, y| {
        let sx = (i64::from(x) - dx).rem_euclid(w);
        let sy = (i64::from(y) - dy).rem_euclid(h);
        Some((sx as u32, sy as u32))
    })
}

fn rotate(src: &Plane, rotation: Rotation) -> Plane {
    let Canvas { width: w, height: h } = src.canvas;
    match rotation {
        Rotation::Clockwise90 => src.remap(Canvas { width: h, height: w }, |x, y| {
            Some((y, h - 1 - x))
        }),
        Rotation::CounterClockwise90 => src.remap(Canvas { width: h, height: w }, |x, y| {
            Some((w - 1 - y, x))
        }),
        Rotation::Half => src.remap(src.canvas, |x, y| Some((w - 1 - x, h - 1 - y))),
    }
}

fn reverse(src: &Plane, axis: Axis) -> Plane {
    let Canvas { width: w, height: h } = src.canvas;
    match axis {
        Axis::Horizontal => src.remap(src.canvas, |x, y| Some((w - 1 - x, y))),
        Axis::Vertical => src.remap(src.canvas, |x, y| Some((x, h - 1 - y))),
    }
}

/// Distance of `(x, y)` from the edge a sweep in `dir` starts at.
fn along(canvas: Canvas, dir: Direction, x: u32, y: u32) -> u32 {
    match dir {
        Direction::Right => x,
        Direction::Left => canvas.width - 1 - x,
        Direction::Down => y,
        Direction::Up => canvas.height - 1 - y,
    }
}

/// Number of leading columns/rows covered by `progress`.
fn cutoff(canvas: Canvas, dir: Direction, progress: f64) -> u32 {
    let len = match dir {
        Direction::Left | Direction::Right => canvas.width,
        Direction::Up | Direction::Down => canvas.height,
    };
    (progress.clamp(0.0, 1.0) * f64::from(len)).round() as u32
}

fn centre(canvas: Canvas) -> (f64, f64, f64) {
    let cx = f64::from(canvas.width.saturating_sub(1)) / 2.0;
    let cy = f64::from(canvas.height.saturating_sub(1)) / 2.0;
    (cx, cy, cx.hypot(cy))
}

/// Dim with distance from the centre, breathing on a 10-frame cycle.
fn pulse(src: &Plane, frame: FrameIndex) -> Plane {
    let (cx, cy, max_dist) = centre(src.canvas);
    let phase = (frame.0 % 10) as f64 / 10.0;
    let breath = 0.5 + 0.5 * (1.0 - (phase - 0.5).abs() * 2.0);
    src.map_indexed(|x, y, t| {
        let dist = (f64::from(x) - cx).hypot(f64::from(y) - cy);
        let falloff = if max_dist > 0.0 { dist / max_dist } else { 0.0 };
        let factor = (1.0 - falloff * 0.5) * breath;
        Texel {
            color: t.color.map(|v| round_channel(f64::from(v) * factor)),
            ..t
        }
    })
}

/// Twist around the centre with outer pixels turning further.
///
/// The base angle grows by 0.1 rad per frame and wraps after 63 frames, roughly one turn.
fn spiral(src: &Plane, frame: FrameIndex) -> Plane {
    let (cx, cy, max_dist) = centre(src.canvas);
    let Canvas { width, height } = src.canvas;
    let base = 0.1 * (frame.0 % 63 + 1) as f64;
    src.remap(src.canvas, |x, y| {
        let dx = f64::from(x) - cx;
        let dy = f64::from(y) - cy;
        let dist = dx.hypot(dy);
        let falloff = if max_dist > 0.0 { dist / max_dist } else { 0.0 };
        let (sin, cos) = (-(base * (1.0 + falloff))).sin_cos();
        let sx = (cx + dx * cos - dy * sin).round();
        let sy = (cy + dx * sin + dy * cos).round();
        if sx < 0.0 || sy < 0.0 || sx >= f64::from(width) || sy >= f64::from(height) {
            return None;
        }
        Some((sx as u32, sy as u32))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/automation/transform.rs"]
mod tests;
