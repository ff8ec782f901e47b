use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::decode::{ImageId, PreparedImage},
    foundation::{
        core::{Affine, Rect, Rgba8Premul},
        error::{FrameError, FrameResult},
    },
    render::surface::Surface,
    transform::state::TransformState,
};

/// Straight RGBA8 fill shown wherever neither layer is opaque.
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Draws the photo and frame layers onto a [`Surface`].
///
/// Holds converted image paints between renders; the cache only ever keeps the images of the
/// most recent render.
pub struct Compositor {
    background: [u8; 4],
    paint_cache: HashMap<ImageId, vello_cpu::Image>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(WHITE)
    }
}

impl Compositor {
    pub fn new(background: [u8; 4]) -> Self {
        Self {
            background,
            paint_cache: HashMap::new(),
        }
    }

    pub fn background(&self) -> [u8; 4] {
        self.background
    }

    /// Composite `state` onto `surface`.
    ///
    /// Layer order: transparent clear, background fill, transformed photo (if any), frame
    /// artwork stretched over the whole surface (if loaded). `state` is only read, so repeated
    /// calls with the same state produce identical pixels.
    pub fn render(&mut self, surface: &mut Surface, state: &TransformState) -> FrameResult<()> {
        let size = surface.size();
        let edge = surface.edge_u16();

        surface.clear(Rgba8Premul::transparent());

        let mut ctx = vello_cpu::RenderContext::new(edge, edge);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let [r, g, b, a] = self.background;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&rect_to_cpu(size.rect()));

        if let Some(photo) = &state.user_image {
            let (w, h) = photo.size();
            let paint = self.image_paint_for(photo)?;
            ctx.set_transform(affine_to_cpu(state.placement(size, w, h)));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        }

        if let Some(frame) = &state.frame_image {
            let (w, h) = frame.size();
            let paint = self.image_paint_for(frame)?;
            let stretch = Affine::scale_non_uniform(size.as_f64() / w, size.as_f64() / h);
            ctx.set_transform(affine_to_cpu(stretch));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        }

        ctx.flush();
        ctx.render_to_pixmap(surface.pixmap_mut());

        let live = [
            state.user_image.as_ref().map(PreparedImage::id),
            state.frame_image.as_ref().map(PreparedImage::id),
        ];
        self.paint_cache.retain(|id, _| live.contains(&Some(*id)));
        Ok(())
    }

    fn image_paint_for(&mut self, img: &PreparedImage) -> FrameResult<vello_cpu::Image> {
        if let Some(paint) = self.paint_cache.get(&img.id()) {
            return Ok(paint.clone());
        }

        let pixmap =
            image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.paint_cache.insert(img.id(), paint.clone());
        Ok(paint)
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> FrameResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FrameError::validation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FrameError::validation("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(FrameError::validation("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
