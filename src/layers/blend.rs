use crate::foundation::core::Rgb8;
use crate::foundation::math::round_channel;

/// Per-pixel rule used when stacking a layer onto the accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// `out = src*alpha + dst*(1-alpha)`
    #[default]
    Normal,
    /// `out = clamp(dst + src*alpha)`
    Add,
    /// `out = dst * (src*alpha + (1-alpha))`, normalized
    Multiply,
    /// `out = 255 - (255-dst)*(255-src*alpha)/255`
    Screen,
    Subtract,
    Difference,
    Overlay,
}

impl BlendMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "add" => Some(Self::Add),
            "multiply" => Some(Self::Multiply),
            "screen" => Some(Self::Screen),
            "subtract" => Some(Self::Subtract),
            "difference" => Some(Self::Difference),
            "overlay" => Some(Self::Overlay),
            _ => None,
        }
    }

    fn blend_channel(self, dst: u8, src: u8, alpha: f64) -> u8 {
        let d = f64::from(dst);
        let s = f64::from(src);
        let out = match self {
            Self::Normal => s * alpha + d * (1.0 - alpha),
            Self::Add => d + s * alpha,
            Self::Multiply => d * ((s / 255.0) * alpha + (1.0 - alpha)),
            Self::Screen => 255.0 - (255.0 - d) * (255.0 - s * alpha) / 255.0,
            Self::Subtract => mix(d, (d - s).max(0.0), alpha),
            Self::Difference => mix(d, (d - s).abs(), alpha),
            Self::Overlay => {
                let f = if d < 128.0 {
                    2.0 * d * s / 255.0
                } else {
                    255.0 - 2.0 * (255.0 - d) * (255.0 - s) / 255.0
                };
                mix(d, f, alpha)
            }
        };
        round_channel(out)
    }

    /// Blend `src` over `dst` with per-pixel alpha in `[0, 1]`.
    pub fn blend(self, dst: Rgb8, src: Rgb8, alpha: f64) -> Rgb8 {
        if alpha <= 0.0 || alpha.is_nan() {
            return dst;
        }
        let alpha = alpha.min(1.0);
        Rgb8::new(
            self.blend_channel(dst.r, src.r, alpha),
            self.blend_channel(dst.g, src.g, alpha),
            self.blend_channel(dst.b, src.b, alpha),
        )
    }
}

fn mix(d: f64, f: f64, alpha: f64) -> f64 {
    d + (f - d) * alpha
}

#[cfg(test)]
#[path = "../../tests/unit/layers/blend.rs"]
mod tests;
