use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{FrameError, FrameResult};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One selectable event frame: display metadata plus the overlay artwork URI.
pub struct FrameTemplate {
    /// Catalog-unique identifier.
    pub id: u32,
    /// Event title; also the first component of export filenames.
    pub event_name: String,
    /// Short descriptive text.
    pub details: String,
    /// Organizer attribution.
    pub event_by: String,
    /// Artwork attribution.
    pub graphics_by: String,
    /// Link for the artwork attribution.
    pub social_link: String,
    /// URI or path of the overlay artwork (PNG/JPEG/WebP raster, or SVG).
    pub frame_path: String,
}

impl FrameTemplate {
    /// Organizer line shown under the event title.
    pub fn byline(&self) -> String {
        format!("By {} | {}", self.event_by, self.details)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
/// Ordered, read-only list of frame templates.
pub struct FrameCatalog {
    templates: Vec<FrameTemplate>,
}

impl FrameCatalog {
    /// Build a catalog, rejecting duplicate ids and empty artwork paths.
    pub fn new(templates: Vec<FrameTemplate>) -> FrameResult<Self> {
        let out = Self { templates };
        out.validate()?;
        Ok(out)
    }

    /// Parse a JSON array of templates.
    pub fn from_json_str(s: &str) -> FrameResult<Self> {
        let templates: Vec<FrameTemplate> =
            serde_json::from_str(s).map_err(|e| FrameError::serde(e.to_string()))?;
        Self::new(templates)
    }

    /// Read and parse a JSON catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> FrameResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> FrameResult<()> {
        let mut seen = std::collections::HashSet::new();
        for t in &self.templates {
            if !seen.insert(t.id) {
                return Err(FrameError::validation(format!(
                    "duplicate template id {}",
                    t.id
                )));
            }
            if t.frame_path.trim().is_empty() {
                return Err(FrameError::validation(format!(
                    "template {} has an empty framePath",
                    t.id
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&FrameTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/model.rs"]
mod tests;
