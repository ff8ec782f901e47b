use tracing::warn;

use crate::{
    foundation::{
        core::{DEFAULT_RESOLUTION, Resolution},
        error::{FrameError, FrameResult},
    },
    interaction::engine::DisplayMetrics,
    render::compositor::WHITE,
    telemetry::client::TelemetryConfig,
};

pub const ENV_RESOLUTION: &str = "FRAMECAST_RESOLUTION";
pub const ENV_TELEMETRY_URL: &str = "FRAMECAST_TELEMETRY_URL";
pub const ENV_TELEMETRY_TIMEOUT_MS: &str = "FRAMECAST_TELEMETRY_TIMEOUT_MS";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Settings for one [`crate::EditorSession`].
pub struct EditorConfig {
    /// Square surface edge in internal pixels; also the export size.
    pub resolution: u32,
    /// Straight RGBA8 background under both layers.
    pub background_rgba: [u8; 4],
    /// On-screen width of the surface. `None` means shown at native size.
    pub display_width: Option<f64>,
    /// Download notification endpoint. `None` disables it.
    pub telemetry: Option<TelemetryConfig>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            background_rgba: WHITE,
            display_width: None,
            telemetry: None,
        }
    }
}

impl EditorConfig {
    /// Defaults overlaid with `FRAMECAST_*` environment variables.
    pub fn from_env() -> FrameResult<Self> {
        let cfg = Self::default().with_overrides(|k| std::env::var(k).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> FrameResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| FrameError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides from `lookup`; unparsable values are logged and skipped.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_RESOLUTION) {
            match raw.trim().parse::<u32>() {
                Ok(v) => self.resolution = v,
                Err(_) => warn!(key = ENV_RESOLUTION, value = %raw, "ignoring unparsable override"),
            }
        }
        if let Some(url) = lookup(ENV_TELEMETRY_URL).filter(|u| !u.trim().is_empty()) {
            let timeout_ms = self.telemetry.as_ref().map(|t| t.timeout_ms);
            let mut t = TelemetryConfig::new(url.trim());
            if let Some(ms) = timeout_ms {
                t.timeout_ms = ms;
            }
            self.telemetry = Some(t);
        }
        if let Some(raw) = lookup(ENV_TELEMETRY_TIMEOUT_MS) {
            match (raw.trim().parse::<u64>(), self.telemetry.as_mut()) {
                (Ok(ms), Some(t)) => t.timeout_ms = ms,
                (Ok(_), None) => {}
                (Err(_), _) => {
                    warn!(key = ENV_TELEMETRY_TIMEOUT_MS, value = %raw, "ignoring unparsable override");
                }
            }
        }
        self
    }

    pub fn validate(&self) -> FrameResult<()> {
        self.resolution_checked()?;
        self.display_metrics()?;
        if self.background_rgba[3] != u8::MAX {
            return Err(FrameError::validation(format!(
                "background must be opaque, got alpha {}",
                self.background_rgba[3]
            )));
        }
        Ok(())
    }

    pub fn resolution_checked(&self) -> FrameResult<Resolution> {
        Resolution::new(self.resolution)
    }

    pub fn display_metrics(&self) -> FrameResult<DisplayMetrics> {
        match self.display_width {
            Some(w) => DisplayMetrics::new(w),
            None => Ok(DisplayMetrics::native(self.resolution_checked()?)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
