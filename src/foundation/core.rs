use crate::foundation::error::{FrameError, FrameResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Internal resolution used when nothing else is configured.
pub const DEFAULT_RESOLUTION: u32 = 1080;

/// Edge length of the square compositing surface, in internal pixels.
///
/// Offsets and exports are always expressed in this space, never in display space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Resolution(u32);

impl Resolution {
    /// Largest edge the CPU rasterizer can address.
    pub const MAX: u32 = u16::MAX as u32;

    pub fn new(px: u32) -> FrameResult<Self> {
        if px == 0 {
            return Err(FrameError::validation("resolution must be > 0"));
        }
        if px > Self::MAX {
            return Err(FrameError::validation(format!(
                "resolution {px} exceeds max {}",
                Self::MAX
            )));
        }
        Ok(Self(px))
    }

    pub fn px(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    pub fn center(self) -> Point {
        let half = self.as_f64() / 2.0;
        Point::new(half, half)
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.as_f64(), self.as_f64())
    }
}

impl TryFrom<u32> for Resolution {
    type Error = FrameError;

    fn try_from(px: u32) -> FrameResult<Self> {
        Self::new(px)
    }
}

impl From<Resolution> for u32 {
    fn from(r: Resolution) -> Self {
        r.0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(DEFAULT_RESOLUTION)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn white() -> Self {
        Self {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
