use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{LedError, LedResult};
use crate::pixel::buffer::{PixelBuffer, resize_plane};

/// One track's content at one frame.
///
/// `alpha` is per-pixel coverage; `None` means fully opaque. Frames created lazily by the
/// editor start black with alpha 0, so an untouched layer never darkens what is below it.
/// `mask` multiplies coverage per pixel (values in `[0, 1]`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerFrame {
    pub pixels: PixelBuffer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_override: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity_override: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Vec<f32>>,
}

impl LayerFrame {
    /// Fully opaque frame wrapping `pixels`.
    pub fn opaque(pixels: PixelBuffer) -> Self {
        Self {
            pixels,
            alpha: None,
            visible_override: None,
            opacity_override: None,
            mask: None,
        }
    }

    /// Black frame with zero coverage everywhere.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            pixels: PixelBuffer::black(canvas),
            alpha: Some(vec![0; canvas.pixel_count()]),
            visible_override: None,
            opacity_override: None,
            mask: None,
        }
    }

    pub(crate) fn from_parts(pixels: PixelBuffer, alpha: Vec<u8>) -> Self {
        let alpha = if alpha.iter().all(|&a| a == u8::MAX) {
            None
        } else {
            Some(alpha)
        };
        Self {
            alpha,
            ..Self::opaque(pixels)
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.pixels.canvas()
    }

    pub fn alpha_at(&self, idx: usize) -> u8 {
        self.alpha
            .as_ref()
            .and_then(|a| a.get(idx).copied())
            .unwrap_or(u8::MAX)
    }

    /// Alpha plane materialized, one byte per pixel.
    pub fn alpha_plane(&self) -> Vec<u8> {
        match &self.alpha {
            Some(a) => a.clone(),
            None => vec![u8::MAX; self.pixels.len()],
        }
    }

    /// Coverage of pixel `idx` in `[0, 1]`: alpha times mask.
    pub fn coverage(&self, idx: usize) -> f64 {
        let alpha = f64::from(self.alpha_at(idx)) / 255.0;
        let mask = self
            .mask
            .as_ref()
            .and_then(|m| m.get(idx).copied())
            .map_or(1.0, f64::from);
        alpha * mask.clamp(0.0, 1.0)
    }

    pub fn paint(&mut self, x: u32, y: u32, color: Rgb8) -> LedResult<()> {
        self.pixels.set(x, y, color)?;
        let idx = self.index(x, y)?;
        if let Some(alpha) = self.alpha.as_mut() {
            alpha[idx] = u8::MAX;
        }
        Ok(())
    }

    /// Clear one pixel back to transparent black.
    pub fn erase(&mut self, x: u32, y: u32) -> LedResult<()> {
        self.pixels.set(x, y, Rgb8::BLACK)?;
        let idx = self.index(x, y)?;
        let len = self.pixels.len();
        self.alpha.get_or_insert_with(|| vec![u8::MAX; len])[idx] = 0;
        Ok(())
    }

    pub fn fill(&mut self, color: Rgb8) {
        self.pixels.fill(color);
        self.alpha = None;
    }

    pub fn replace_pixels(&mut self, pixels: PixelBuffer) -> LedResult<()> {
        pixels.ensure_canvas(self.canvas(), "replacement pixels")?;
        self.pixels = pixels;
        self.alpha = None;
        Ok(())
    }

    pub fn set_mask(&mut self, mask: Vec<f32>) -> LedResult<()> {
        if mask.len() != self.pixels.len() {
            return Err(LedError::precondition(format!(
                "mask has {} values, frame has {} pixels",
                mask.len(),
                self.pixels.len()
            )));
        }
        if mask.iter().any(|v| !v.is_finite() || !(0.0..=1.0).contains(v)) {
            return Err(LedError::precondition("mask values must be in [0, 1]"));
        }
        self.mask = Some(mask);
        Ok(())
    }

    pub fn clear_mask(&mut self) {
        self.mask = None;
    }

    pub fn clear_overrides(&mut self) {
        self.visible_override = None;
        self.opacity_override = None;
    }

    pub fn validate(&self, canvas: Canvas) -> LedResult<()> {
        self.pixels.ensure_canvas(canvas, "layer frame")?;
        let n = canvas.pixel_count();
        if self.alpha.as_ref().is_some_and(|a| a.len() != n) {
            return Err(LedError::precondition("layer frame alpha length mismatch"));
        }
        if self.mask.as_ref().is_some_and(|m| m.len() != n) {
            return Err(LedError::precondition("layer frame mask length mismatch"));
        }
        if let Some(o) = self.opacity_override
            && !(o.is_finite() && (0.0..=1.0).contains(&o))
        {
            return Err(LedError::precondition(
                "layer frame opacity override must be in [0, 1]",
            ));
        }
        Ok(())
    }

    /// Crop or pad to `canvas`, keeping the top-left corner. New pixels are transparent.
    pub fn resized(&self, canvas: Canvas) -> Self {
        let from = self.canvas();
        let alpha = resize_plane(&self.alpha_plane(), from, canvas, 0);
        let mut out = Self::from_parts(self.pixels.resized(canvas), alpha);
        out.visible_override = self.visible_override;
        out.opacity_override = self.opacity_override;
        out.mask = self
            .mask
            .as_ref()
            .map(|m| resize_plane(m, from, canvas, 1.0));
        out
    }

    fn index(&self, x: u32, y: u32) -> LedResult<usize> {
        self.canvas()
            .index(x, y)
            .ok_or_else(|| LedError::precondition(format!("pixel ({x}, {y}) out of bounds")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/frame.rs"]
mod tests;
