use xxhash_rust::xxh3::Xxh3;

use crate::compositor::composite::resolve_layers;
use crate::foundation::core::{Canvas, FrameIndex};
use crate::layers::blend::BlendMode;
use crate::layers::group::LayerGroup;
use crate::layers::track::LayerTrack;

const XXH3_SEED: u64 = 0x8b5ad4a0c7d8e9f1;

/// Content hash of everything that influences one frame's composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CompositeFingerprint {
    pub hi: u64,
    pub lo: u64,
}

/// Fingerprint the visible, resolved layer state at `frame`.
///
/// Hidden tracks are skipped entirely, so toggling a track that is already invisible elsewhere
/// does not change the fingerprint of unrelated frames.
pub fn fingerprint_frame(
    canvas: Canvas,
    tracks: &[LayerTrack],
    groups: &[LayerGroup],
    frame: FrameIndex,
) -> CompositeFingerprint {
    let mut h = StableHasher::new();
    h.write_u32(canvas.width);
    h.write_u32(canvas.height);

    let layers = resolve_layers(tracks, groups, frame);
    h.write_u32(layers.len() as u32);
    for l in &layers {
        h.write_u64(l.track.id.0);
        h.write_u32(l.track.z_index as u32);
        h.write_u8(blend_tag(l.blend));
        h.write_f64(l.opacity);
        let Some(f) = l.frame else {
            h.write_u8(0);
            continue;
        };
        h.write_u8(1);
        h.write_u32(f.pixels.width());
        h.write_u32(f.pixels.height());
        for p in f.pixels.pixels() {
            h.write_bytes(&p.channels());
        }
        match &f.alpha {
            Some(a) => {
                h.write_u8(1);
                h.write_bytes(a);
            }
            None => h.write_u8(0),
        }
        match &f.mask {
            Some(m) => {
                h.write_u8(1);
                for v in m {
                    h.write_f32(*v);
                }
            }
            None => h.write_u8(0),
        }
    }
    h.finish()
}

fn blend_tag(mode: BlendMode) -> u8 {
    match mode {
        BlendMode::Normal => 0,
        BlendMode::Add => 1,
        BlendMode::Multiply => 2,
        BlendMode::Screen => 3,
        BlendMode::Subtract => 4,
        BlendMode::Difference => 5,
        BlendMode::Overlay => 6,
    }
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn finish(self) -> CompositeFingerprint {
        let v = self.inner.digest128();
        CompositeFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/fingerprint.rs"]
mod tests;
