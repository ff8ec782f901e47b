use crate::foundation::{
    core::{Resolution, Rgba8Premul},
    error::{FrameError, FrameResult},
    math::unpremultiply_rgba8_in_place,
};

/// Fixed-resolution square raster that frames are composited into and exported from.
///
/// Pixels are premultiplied RGBA8, row-major.
pub struct Surface {
    size: Resolution,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").field("size", &self.size).finish()
    }
}

impl Surface {
    pub fn new(size: Resolution) -> FrameResult<Self> {
        let edge: u16 = size
            .px()
            .try_into()
            .map_err(|_| FrameError::validation("surface edge exceeds u16"))?;
        Ok(Self {
            size,
            pixmap: vello_cpu::Pixmap::new(edge, edge),
        })
    }

    pub fn size(&self) -> Resolution {
        self.size
    }

    pub(crate) fn edge_u16(&self) -> u16 {
        self.pixmap.width()
    }

    pub fn clear(&mut self, color: Rgba8Premul) {
        let rgba = color.to_array();
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn data_premul(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let edge = self.size.px();
        if x >= edge || y >= edge {
            return None;
        }
        let i = (y as usize * edge as usize + x as usize) * 4;
        let d = self.data_premul();
        Some([d[i], d[i + 1], d[i + 2], d[i + 3]])
    }

    /// Copy of the pixels converted to straight (non-premultiplied) RGBA8.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data_premul().to_vec();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
