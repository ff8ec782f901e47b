use crate::{
    foundation::{
        core::{Point, Rect, Resolution},
        error::{FrameError, FrameResult},
    },
    transform::state::{TransformDelta, TransformState},
};

/// On-screen size of the surface, in display (CSS) pixels.
///
/// The surface is assumed to be displayed as a square, so one width yields a single uniform
/// display-to-internal ratio for both axes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DisplayMetrics {
    display_width: f64,
}

impl DisplayMetrics {
    pub fn new(display_width: f64) -> FrameResult<Self> {
        if !display_width.is_finite() || display_width <= 0.0 {
            return Err(FrameError::validation(format!(
                "display width must be finite and > 0, got {display_width}"
            )));
        }
        Ok(Self { display_width })
    }

    /// Surface shown at its internal resolution (ratio 1).
    pub fn native(resolution: Resolution) -> Self {
        Self {
            display_width: resolution.as_f64(),
        }
    }

    pub fn display_width(self) -> f64 {
        self.display_width
    }

    /// Internal pixels per display pixel.
    pub fn ratio(self, resolution: Resolution) -> f64 {
        resolution.as_f64() / self.display_width
    }
}

impl TryFrom<f64> for DisplayMetrics {
    type Error = FrameError;

    fn try_from(display_width: f64) -> FrameResult<Self> {
        Self::new(display_width)
    }
}

impl From<DisplayMetrics> for f64 {
    fn from(m: DisplayMetrics) -> Self {
        m.display_width
    }
}

/// Mouse/pen input, in surface-local display coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Touch input in client (viewport) coordinates.
///
/// Only the first touch point is used. `bounds` is the surface's on-screen bounding box in the
/// same client space.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub touches: Vec<Point>,
    pub bounds: Rect,
}

impl TouchEvent {
    /// First touch point relative to the surface's top-left corner.
    pub fn local_point(&self) -> Option<Point> {
        self.touches
            .first()
            .map(|p| Point::new(p.x - self.bounds.x0, p.y - self.bounds.y0))
    }
}

/// Whether the caller should re-render after an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Idle,
    Redraw,
}

/// Turns drags and slider input into [`TransformState`] updates.
#[derive(Clone, Copy, Debug)]
pub struct InteractionEngine {
    resolution: Resolution,
    metrics: DisplayMetrics,
}

impl InteractionEngine {
    pub fn new(resolution: Resolution, metrics: DisplayMetrics) -> Self {
        Self {
            resolution,
            metrics,
        }
    }

    /// Layout changed; later drags use the new ratio.
    pub fn resize(&mut self, metrics: DisplayMetrics) {
        self.metrics = metrics;
    }

    pub fn metrics(&self) -> DisplayMetrics {
        self.metrics
    }

    pub fn ratio(&self) -> f64 {
        self.metrics.ratio(self.resolution)
    }

    pub fn pointer(&self, state: &mut TransformState, ev: PointerEvent) -> Outcome {
        match ev {
            PointerEvent::Down(p) => self.drag_start(state, p),
            PointerEvent::Move(p) => self.drag_move(state, p),
            PointerEvent::Up => self.drag_end(state),
        }
    }

    pub fn touch(&self, state: &mut TransformState, ev: &TouchEvent) -> Outcome {
        match ev.phase {
            TouchPhase::End | TouchPhase::Cancel => self.drag_end(state),
            TouchPhase::Start => match ev.local_point() {
                Some(p) => self.drag_start(state, p),
                None => Outcome::Idle,
            },
            TouchPhase::Move => match ev.local_point() {
                Some(p) => self.drag_move(state, p),
                None => Outcome::Idle,
            },
        }
    }

    /// Ignored unless a photo is loaded.
    pub fn drag_start(&self, state: &mut TransformState, at: Point) -> Outcome {
        if !state.has_user_image() {
            return Outcome::Idle;
        }
        state.drag.active = true;
        state.drag.last = at;
        Outcome::Idle
    }

    pub fn drag_move(&self, state: &mut TransformState, at: Point) -> Outcome {
        if !state.drag.active {
            return Outcome::Idle;
        }
        let delta = (at - state.drag.last) * self.ratio();
        state.apply(TransformDelta::Translate(delta));
        state.drag.last = at;
        Outcome::Redraw
    }

    pub fn drag_end(&self, state: &mut TransformState) -> Outcome {
        state.drag.active = false;
        Outcome::Idle
    }

    pub fn set_scale(&self, state: &mut TransformState, scale: f64) -> Outcome {
        state.apply(TransformDelta::SetScale(scale));
        Outcome::Redraw
    }

    pub fn set_rotation(&self, state: &mut TransformState, degrees: f64) -> Outcome {
        state.apply(TransformDelta::SetRotation(degrees));
        Outcome::Redraw
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/engine.rs"]
mod tests;
