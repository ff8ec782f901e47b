//! framecast composites a user photo under event frame artwork and exports the result as PNG.
//!
//! # Pipeline overview
//!
//! 1. **Select**: pick a [`FrameTemplate`] from a [`FrameCatalog`]; its artwork loads
//!    asynchronously, tagged with a [`LoadTicket`] so superseded loads are dropped.
//! 2. **Place**: pointer/touch drags and scale/rotation sliders update a [`TransformState`]
//!    through the [`InteractionEngine`]. Offsets live in the fixed internal resolution, not in
//!    display pixels.
//! 3. **Render**: the [`Compositor`] clears the [`Surface`], fills the background, draws the
//!    transformed photo and then the frame artwork stretched over the whole surface.
//! 4. **Export**: the surface is encoded to PNG off the calling task.
//!
//! [`EditorSession`] owns all of the above and is the usual entry point.
#![forbid(unsafe_code)]

mod assets;
mod catalog;
mod export;
mod foundation;
mod interaction;
mod render;
mod session;
mod telemetry;
mod transform;

pub use assets::decode::{
    ImageId, PreparedImage, decode_image, looks_like_svg, parse_svg, rasterize_svg,
};
pub use assets::loader::{AssetLoader, AssetSource, decode_image_async};
pub use catalog::model::{FrameCatalog, FrameTemplate};
pub use export::encode::{encode_png, export_png};
pub use export::filename::{EXPORT_EXTENSION, export_filename, now_ms, sanitize_component};
pub use foundation::core::{
    Affine, DEFAULT_RESOLUTION, Point, Rect, Resolution, Rgba8Premul, Vec2,
};
pub use foundation::error::{FrameError, FrameResult};
pub use interaction::engine::{
    DisplayMetrics, InteractionEngine, Outcome, PointerEvent, TouchEvent, TouchPhase,
};
pub use render::compositor::{Compositor, WHITE};
pub use render::surface::Surface;
pub use session::config::{
    ENV_RESOLUTION, ENV_TELEMETRY_TIMEOUT_MS, ENV_TELEMETRY_URL, EditorConfig,
};
pub use session::editor::{
    Download, DownloadForm, EditorSession, LoadOutcome, LoadSlot, LoadState, LoadTicket,
};
pub use telemetry::client::{TelemetryClient, TelemetryConfig};
pub use transform::state::{DragState, SliderRange, TransformDelta, TransformState};
