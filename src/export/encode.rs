use std::io::Cursor;

use anyhow::Context;

use crate::{
    foundation::error::{FrameError, FrameResult},
    render::surface::Surface,
};

/// Encode straight RGBA8 pixels as PNG bytes.
pub fn encode_png(width: u32, height: u32, rgba8_straight: Vec<u8>) -> FrameResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(width, height, rgba8_straight)
        .ok_or_else(|| FrameError::encode("invalid rgba buffer size"))?;
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| FrameError::encode(format!("png: {e}")))?;
    Ok(out)
}

/// Snapshot `surface` and encode it as PNG off the calling task.
///
/// The pixels are copied before the future is returned, so the surface is free to be redrawn
/// while the encode runs.
pub fn export_png(surface: &Surface) -> impl Future<Output = FrameResult<Vec<u8>>> + use<> {
    let edge = surface.size().px();
    let straight = surface.to_straight_rgba8();
    async move {
        tokio::task::spawn_blocking(move || encode_png(edge, edge, straight))
            .await
            .context("join png encode task")?
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/encode.rs"]
mod tests;
