use crate::{
    assets::decode::PreparedImage,
    foundation::core::{Affine, Point, Resolution, Vec2},
};

/// Inclusive numeric range of a caller-owned slider control.
///
/// `TransformState` never enforces these bounds; they document what the controls produce.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
}

impl SliderRange {
    pub const SCALE: Self = Self { min: 0.1, max: 3.0 };
    pub const ROTATION_DEG: Self = Self {
        min: -180.0,
        max: 180.0,
    };

    pub fn clamp(self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }

    pub fn contains(self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }
}

/// One change to the logical transform, produced by the interaction engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformDelta {
    /// Add to the offset, in internal-resolution pixels.
    Translate(Vec2),
    SetScale(f64),
    SetRotation(f64),
}

/// Transient pointer bookkeeping. Not part of the logical transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragState {
    pub active: bool,
    /// Last pointer position in display space.
    pub last: Point,
}

/// Placement of the user photo plus the two image layers.
#[derive(Clone, Debug)]
pub struct TransformState {
    pub scale: f64,
    /// Degrees, positive is clockwise on screen. Unbounded; wraps visually every 360.
    pub rotation_deg: f64,
    /// Offset of the photo center from the surface center, in internal-resolution pixels.
    pub offset: Vec2,
    pub user_image: Option<PreparedImage>,
    pub frame_image: Option<PreparedImage>,
    pub drag: DragState,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_deg: 0.0,
            offset: Vec2::ZERO,
            user_image: None,
            frame_image: None,
            drag: DragState::default(),
        }
    }
}

impl TransformState {
    /// Back to identity placement. Image layers are left alone.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.rotation_deg = 0.0;
        self.offset = Vec2::ZERO;
        self.drag = DragState::default();
    }

    pub fn apply(&mut self, delta: TransformDelta) {
        match delta {
            TransformDelta::Translate(d) => self.offset += d,
            TransformDelta::SetScale(s) => self.scale = s,
            TransformDelta::SetRotation(deg) => self.rotation_deg = deg,
        }
    }

    /// Swap in a new photo, discarding the previous one, and re-center it.
    pub fn replace_user_image(&mut self, image: PreparedImage) {
        self.user_image = Some(image);
        self.reset();
    }

    pub fn has_user_image(&self) -> bool {
        self.user_image.is_some()
    }

    /// Affine mapping user-image pixel space onto the surface.
    ///
    /// Order: translate to the moved center, rotate, scale, then shift by half the image so
    /// rotation and scale pivot around the image center.
    pub fn placement(&self, size: Resolution, image_w: f64, image_h: f64) -> Affine {
        let origin = size.center() + self.offset;
        Affine::translate(origin.to_vec2())
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale(self.scale)
            * Affine::translate(Vec2::new(-image_w / 2.0, -image_h / 2.0))
    }

    /// Logical transform equality, ignoring image layers and drag bookkeeping.
    pub fn same_transform(&self, other: &Self) -> bool {
        self.scale == other.scale
            && self.rotation_deg == other.rotation_deg
            && self.offset == other.offset
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/state.rs"]
mod tests;
