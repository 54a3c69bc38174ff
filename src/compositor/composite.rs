use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{LedError, LedResult};
use crate::layers::blend::BlendMode;
use crate::layers::frame::LayerFrame;
use crate::layers::group::LayerGroup;
use crate::layers::track::LayerTrack;
use crate::pixel::buffer::PixelBuffer;

/// One track's resolved contribution to a frame.
pub(crate) struct ResolvedLayer<'a> {
    pub(crate) track: &'a LayerTrack,
    pub(crate) frame: Option<&'a LayerFrame>,
    pub(crate) blend: BlendMode,
    pub(crate) opacity: f64,
}

/// Visible tracks at `frame`, bottom to top.
///
/// Ties on `z_index` keep slice order, which is track insertion order.
pub(crate) fn resolve_layers<'a>(
    tracks: &'a [LayerTrack],
    groups: &'a [LayerGroup],
    frame: FrameIndex,
) -> Vec<ResolvedLayer<'a>> {
    let mut out: Vec<ResolvedLayer<'a>> = tracks
        .iter()
        .filter_map(|track| {
            let group = track
                .group_id
                .and_then(|id| groups.iter().find(|g| g.id == id));
            if !track.effective_visibility(frame, group) {
                return None;
            }
            Some(ResolvedLayer {
                track,
                frame: track.frame(frame),
                blend: track.blend_mode,
                opacity: track.effective_opacity(frame, group),
            })
        })
        .collect();
    out.sort_by_key(|l| l.track.z_index);
    out
}

/// Blend every visible track at `frame` over opaque black.
///
/// Pure: the output depends only on the arguments. A track frame whose dimensions disagree
/// with `canvas` is a precondition failure; nothing is resized implicitly.
#[tracing::instrument(skip(tracks, groups), fields(tracks = tracks.len()))]
pub fn composite(
    canvas: Canvas,
    tracks: &[LayerTrack],
    groups: &[LayerGroup],
    frame: FrameIndex,
) -> LedResult<PixelBuffer> {
    let layers = resolve_layers(tracks, groups, frame);
    let mut acc = PixelBuffer::black(canvas);

    for layer in &layers {
        // Missing frames are transparent and contribute nothing.
        let Some(src) = layer.frame else {
            continue;
        };
        src.validate(canvas).map_err(|e| {
            LedError::precondition(format!(
                "cannot composite track {} at frame {}: {e}",
                layer.track.id, frame.0
            ))
        })?;
        if layer.opacity <= 0.0 {
            continue;
        }
        blend_layer(&mut acc, src, layer.blend, layer.opacity);
    }

    Ok(acc)
}

pub(crate) fn blend_layer(acc: &mut PixelBuffer, src: &LayerFrame, mode: BlendMode, opacity: f64) {
    for (i, (dst, &px)) in acc
        .pixels_mut()
        .iter_mut()
        .zip(src.pixels.pixels())
        .enumerate()
    {
        let alpha = opacity * src.coverage(i);
        *dst = mode.blend(*dst, px, alpha);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/composite.rs"]
mod tests;
