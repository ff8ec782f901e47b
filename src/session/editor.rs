use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    assets::{
        decode::PreparedImage,
        loader::{AssetLoader, decode_image_async},
    },
    catalog::model::FrameTemplate,
    export::{
        encode::export_png,
        filename::{export_filename, now_ms},
    },
    foundation::{
        core::Resolution,
        error::{FrameError, FrameResult},
    },
    interaction::engine::{DisplayMetrics, InteractionEngine, Outcome, PointerEvent, TouchEvent},
    render::{compositor::Compositor, surface::Surface},
    session::config::EditorConfig,
    telemetry::client::TelemetryClient,
    transform::state::TransformState,
};

/// Progress of one image layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed { reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSlot {
    Frame,
    Photo,
}

/// Identifies one asynchronous load. Completions whose ticket is no longer current are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub slot: LoadSlot,
    pub generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result (image or failure) was recorded.
    Applied,
    /// A newer selection superseded this load; the result was discarded.
    Stale,
}

/// Details the user must fill in before a download is offered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DownloadForm {
    pub user_name: String,
    pub user_email: String,
}

impl DownloadForm {
    pub fn is_ready(&self, has_photo: bool) -> bool {
        !self.user_name.trim().is_empty() && !self.user_email.trim().is_empty() && has_photo
    }
}

/// A finished export plus the name to save it under.
#[derive(Clone, Debug)]
pub struct Download {
    pub filename: String,
    pub png: Vec<u8>,
}

/// Everything one editing session needs: selected template, transform, surface and loads.
///
/// All mutation goes through `&mut self`, so a host drives it from a single task and events are
/// applied strictly in dispatch order.
pub struct EditorSession {
    resolution: Resolution,
    template: Option<FrameTemplate>,
    state: TransformState,
    surface: Surface,
    compositor: Compositor,
    engine: InteractionEngine,
    telemetry: Option<TelemetryClient>,
    pending_telemetry: Vec<JoinHandle<()>>,
    generation: u64,
    frame_ticket: Option<LoadTicket>,
    photo_ticket: Option<LoadTicket>,
    frame_load: LoadState,
    photo_load: LoadState,
}

impl EditorSession {
    pub fn new(config: &EditorConfig) -> FrameResult<Self> {
        config.validate()?;
        let resolution = config.resolution_checked()?;
        let telemetry = config
            .telemetry
            .as_ref()
            .map(TelemetryClient::new)
            .transpose()?;

        Ok(Self {
            resolution,
            template: None,
            state: TransformState::default(),
            surface: Surface::new(resolution)?,
            compositor: Compositor::new(config.background_rgba),
            engine: InteractionEngine::new(resolution, config.display_metrics()?),
            telemetry,
            pending_telemetry: Vec::new(),
            generation: 0,
            frame_ticket: None,
            photo_ticket: None,
            frame_load: LoadState::Idle,
            photo_load: LoadState::Idle,
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn template(&self) -> Option<&FrameTemplate> {
        self.template.as_ref()
    }

    pub fn state(&self) -> &TransformState {
        &self.state
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn frame_load_state(&self) -> &LoadState {
        &self.frame_load
    }

    pub fn photo_load_state(&self) -> &LoadState {
        &self.photo_load
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn next_ticket(&mut self, slot: LoadSlot) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            slot,
            generation: self.generation,
        }
    }

    /// Switch to `template`: drops the previous transform, photo and artwork, and any loads
    /// still in flight for them. Returns the ticket the artwork load must complete with.
    #[tracing::instrument(skip(self, template), fields(template = template.id))]
    pub fn select_template(&mut self, template: FrameTemplate) -> LoadTicket {
        let ticket = self.next_ticket(LoadSlot::Frame);
        self.template = Some(template);
        self.state = TransformState::default();
        self.frame_ticket = Some(ticket);
        self.photo_ticket = None;
        self.frame_load = LoadState::Loading;
        self.photo_load = LoadState::Idle;
        ticket
    }

    #[tracing::instrument(skip(self, result))]
    pub fn complete_frame_load(
        &mut self,
        ticket: LoadTicket,
        result: FrameResult<PreparedImage>,
    ) -> LoadOutcome {
        if self.frame_ticket != Some(ticket) {
            debug!(?ticket, current = ?self.frame_ticket, "discarding stale frame load");
            return LoadOutcome::Stale;
        }
        self.frame_ticket = None;

        match result {
            Ok(img) => {
                debug!(width = img.width, height = img.height, "frame artwork ready");
                self.state.frame_image = Some(img);
                self.state.reset();
                self.frame_load = LoadState::Ready;
                self.redraw();
            }
            Err(err) => {
                warn!(error = %err, "frame artwork failed to load");
                self.frame_load = LoadState::Failed {
                    reason: err.to_string(),
                };
            }
        }
        LoadOutcome::Applied
    }

    /// Start a photo load. Any earlier photo load still in flight becomes stale.
    pub fn begin_photo_load(&mut self) -> LoadTicket {
        let ticket = self.next_ticket(LoadSlot::Photo);
        self.photo_ticket = Some(ticket);
        self.photo_load = LoadState::Loading;
        ticket
    }

    /// Record a photo load. On success the new photo replaces the old one and is re-centered;
    /// on failure the previous photo, if any, stays in place.
    #[tracing::instrument(skip(self, result))]
    pub fn complete_photo_load(
        &mut self,
        ticket: LoadTicket,
        result: FrameResult<PreparedImage>,
    ) -> LoadOutcome {
        if self.photo_ticket != Some(ticket) {
            debug!(?ticket, current = ?self.photo_ticket, "discarding stale photo load");
            return LoadOutcome::Stale;
        }
        self.photo_ticket = None;

        match result {
            Ok(img) => {
                debug!(width = img.width, height = img.height, "photo ready");
                self.state.replace_user_image(img);
                self.photo_load = LoadState::Ready;
                self.redraw();
            }
            Err(err) => {
                warn!(error = %err, "photo failed to load");
                self.photo_load = LoadState::Failed {
                    reason: err.to_string(),
                };
            }
        }
        LoadOutcome::Applied
    }

    /// Select `template` and load its artwork.
    pub async fn open_template(
        &mut self,
        loader: &AssetLoader,
        template: FrameTemplate,
    ) -> FrameResult<()> {
        let uri = template.frame_path.clone();
        let ticket = self.select_template(template);
        let result = loader.load_frame(&uri, self.resolution).await;
        self.complete_frame_load(ticket, result);
        self.check_loaded(&self.frame_load)
    }

    /// Load a photo from a path or URI.
    pub async fn upload_photo(&mut self, loader: &AssetLoader, uri: &str) -> FrameResult<()> {
        let ticket = self.begin_photo_load();
        let result = loader.load_photo(uri).await;
        self.complete_photo_load(ticket, result);
        self.check_loaded(&self.photo_load)
    }

    /// Load a photo from encoded bytes, e.g. the contents of a file picker.
    pub async fn upload_photo_bytes(&mut self, bytes: Vec<u8>) -> FrameResult<()> {
        let ticket = self.begin_photo_load();
        let result = decode_image_async(bytes).await;
        self.complete_photo_load(ticket, result);
        self.check_loaded(&self.photo_load)
    }

    fn check_loaded(&self, state: &LoadState) -> FrameResult<()> {
        match state {
            LoadState::Failed { reason } => Err(FrameError::load(reason.clone())),
            _ => Ok(()),
        }
    }

    pub fn pointer(&mut self, ev: PointerEvent) -> Outcome {
        let out = self.engine.pointer(&mut self.state, ev);
        self.after(out)
    }

    pub fn touch(&mut self, ev: &TouchEvent) -> Outcome {
        let out = self.engine.touch(&mut self.state, ev);
        self.after(out)
    }

    pub fn set_scale(&mut self, scale: f64) -> Outcome {
        let out = self.engine.set_scale(&mut self.state, scale);
        self.after(out)
    }

    pub fn set_rotation(&mut self, degrees: f64) -> Outcome {
        let out = self.engine.set_rotation(&mut self.state, degrees);
        self.after(out)
    }

    /// The surface's on-screen size changed.
    pub fn resize(&mut self, metrics: DisplayMetrics) {
        self.engine.resize(metrics);
    }

    fn after(&mut self, out: Outcome) -> Outcome {
        if out == Outcome::Redraw {
            self.redraw();
        }
        out
    }

    /// Re-render if the artwork is in place; render failures are logged and absorbed.
    fn redraw(&mut self) {
        if self.frame_load != LoadState::Ready {
            return;
        }
        if let Err(err) = self.compositor.render(&mut self.surface, &self.state) {
            warn!(error = %err, "render failed");
        }
    }

    /// Encode the current composite as PNG.
    ///
    /// Rejected with [`FrameError::NotReady`] until the frame artwork has loaded. A photo is not
    /// required: without one the frame is exported over the background.
    #[tracing::instrument(skip(self))]
    pub async fn export(&mut self) -> FrameResult<Vec<u8>> {
        if self.frame_load != LoadState::Ready {
            return Err(FrameError::not_ready("frame artwork has not loaded"));
        }
        self.compositor.render(&mut self.surface, &self.state)?;
        export_png(&self.surface).await
    }

    /// Validate the form, send the download notification, export and name the file.
    ///
    /// The notification is spawned before the export and never awaited here; its outcome has no
    /// effect on the download.
    #[tracing::instrument(skip(self, form))]
    pub async fn download(&mut self, form: &DownloadForm) -> FrameResult<Download> {
        if !form.is_ready(self.state.has_user_image()) {
            return Err(FrameError::validation(
                "name, email and a photo are required before downloading",
            ));
        }
        let event_name = self
            .template
            .as_ref()
            .map(|t| t.event_name.clone())
            .ok_or_else(|| FrameError::not_ready("no frame template selected"))?;

        if let Some(client) = &self.telemetry {
            self.pending_telemetry
                .retain(|handle| !handle.is_finished());
            self.pending_telemetry
                .push(client.send_detached(form.user_name.trim(), form.user_email.trim()));
        }

        let png = self.export().await?;
        let filename = export_filename(&event_name, form.user_name.trim(), now_ms());
        debug!(%filename, bytes = png.len(), "download ready");
        Ok(Download { filename, png })
    }

    /// Wait for outstanding download notifications, e.g. before the process exits.
    pub async fn flush_telemetry(&mut self) {
        for handle in self.pending_telemetry.drain(..) {
            if let Err(err) = handle.await {
                warn!(error = %err, "telemetry task panicked");
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
