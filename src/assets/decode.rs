use std::sync::Arc;

use crate::foundation::{
    core::Resolution,
    error::{FrameError, FrameResult},
    math::{Fnv1a64, premultiply_rgba8_in_place},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Content-derived identifier of a prepared image.
pub struct ImageId(pub(crate) u64);

impl ImageId {
    /// Access raw 64-bit identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    id: ImageId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap premultiplied RGBA8 bytes, checking the buffer length against the dimensions.
    pub fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> FrameResult<Self> {
        if width == 0 || height == 0 {
            return Err(FrameError::load("image has zero width or height"));
        }
        if width > Resolution::MAX || height > Resolution::MAX {
            return Err(FrameError::load(format!(
                "image {width}x{height} exceeds max edge {}",
                Resolution::MAX
            )));
        }
        if rgba8_premul.len() != width as usize * height as usize * 4 {
            return Err(FrameError::load("image byte length mismatch"));
        }

        let mut h = Fnv1a64::new_default();
        h.write_u32(width);
        h.write_u32(height);
        h.write_bytes(&rgba8_premul);

        Ok(Self {
            id: ImageId(h.finish()),
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn size(&self) -> (f64, f64) {
        (f64::from(self.width), f64::from(self.height))
    }
}

/// Decode encoded raster bytes (PNG, JPEG, ...) and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> FrameResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FrameError::load(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage::from_premul_rgba8(width, height, rgba8_premul)
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> FrameResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts).map_err(|e| FrameError::load(format!("parse svg tree: {e}")))
}

/// Rasterize an SVG stretched to a `size x size` square.
///
/// Frame artwork is drawn stretched to the full surface anyway, so rasterizing at the surface
/// resolution keeps edges crisp instead of upscaling a small intrinsic size.
pub fn rasterize_svg(tree: &usvg::Tree, size: Resolution) -> FrameResult<PreparedImage> {
    let px = size.px();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(px, px)
        .ok_or_else(|| FrameError::load("failed to allocate svg pixmap"))?;

    let (w, h) = (tree.size().width(), tree.size().height());
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(FrameError::load("svg has invalid width/height"));
    }
    let xform = resvg::tiny_skia::Transform::from_scale(px as f32 / w, px as f32 / h);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    PreparedImage::from_premul_rgba8(px, px, pixmap.data().to_vec())
}

/// Cheap content sniff used when the artwork URI has no telling extension.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
