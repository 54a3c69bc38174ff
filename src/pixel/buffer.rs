use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{LedError, LedResult};

/// Row-major RGB pixels sized `width * height`.
///
/// The atomic unit every other component reads and writes. A buffer always holds exactly
/// `width * height` pixels; constructors reject anything else.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawPixelBuffer")]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb8>,
}

#[derive(serde::Deserialize)]
struct RawPixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb8>,
}

impl TryFrom<RawPixelBuffer> for PixelBuffer {
    type Error = LedError;

    fn try_from(raw: RawPixelBuffer) -> LedResult<Self> {
        Self::from_pixels(raw.width, raw.height, raw.pixels)
    }
}

impl PixelBuffer {
    /// Buffer filled with a single color.
    pub fn filled(canvas: Canvas, color: Rgb8) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            pixels: vec![color; canvas.pixel_count()],
        }
    }

    /// Opaque black buffer, the compositor's starting accumulator.
    pub fn black(canvas: Canvas) -> Self {
        Self::filled(canvas, Rgb8::BLACK)
    }

    /// Wrap existing pixels, rejecting zero dimensions or a length that does not match them.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb8>) -> LedResult<Self> {
        let expected = Canvas::new(width, height)?.pixel_count();
        if pixels.len() != expected {
            return Err(LedError::precondition(format!(
                "pixel buffer expects {expected} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Rgb8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgb8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<Rgb8> {
        self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb8> {
        self.canvas().index(x, y).map(|i| self.pixels[i])
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgb8) -> LedResult<()> {
        let idx = self.canvas().index(x, y).ok_or_else(|| {
            LedError::precondition(format!(
                "pixel ({x},{y}) is outside {}x{}",
                self.width, self.height
            ))
        })?;
        self.pixels[idx] = color;
        Ok(())
    }

    pub fn fill(&mut self, color: Rgb8) {
        self.pixels.fill(color);
    }

    /// Row-major RGB8 bytes, three per pixel.
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            out.extend_from_slice(&p.channels());
        }
        out
    }

    /// Copy into new dimensions, anchored top-left; new area is black.
    pub fn resized(&self, canvas: Canvas) -> Self {
        let pixels = resize_plane(&self.pixels, self.canvas(), canvas, Rgb8::BLACK);
        Self {
            width: canvas.width,
            height: canvas.height,
            pixels,
        }
    }

    /// Fails unless this buffer has exactly the given dimensions.
    pub fn ensure_canvas(&self, canvas: Canvas, what: &str) -> LedResult<()> {
        if self.width != canvas.width
            || self.height != canvas.height
            || self.pixels.len() != canvas.pixel_count()
        {
            return Err(LedError::precondition(format!(
                "{what} is {}x{} ({} pixels) but the pattern is {}x{}",
                self.width,
                self.height,
                self.pixels.len(),
                canvas.width,
                canvas.height
            )));
        }
        Ok(())
    }
}

/// Crop/pad any per-pixel plane (colors, alpha, mask) to new dimensions.
pub(crate) fn resize_plane<T: Copy>(src: &[T], from: Canvas, to: Canvas, pad: T) -> Vec<T> {
    let mut out = vec![pad; to.pixel_count()];
    let w = from.width.min(to.width) as usize;
    let h = from.height.min(to.height) as usize;
    for y in 0..h {
        let s = y * from.width as usize;
        let d = y * to.width as usize;
        if s + w <= src.len() {
            out[d..d + w].copy_from_slice(&src[s..s + w]);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/buffer.rs"]
mod tests;
