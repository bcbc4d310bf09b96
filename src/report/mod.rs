//! Turns report entries into files: a document with a map, or a JSON feed with a static page.
pub mod document;
pub mod feed;
pub mod map;

use crate::features::error::ReportError;
use crate::structs::ReportEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DOCUMENT_FILE: &str = "photo_weather.md";
pub const MAP_FILE: &str = "photo_weather_map.html";
pub const POINTS_FILE: &str = "points.json";
pub const INDEX_FILE: &str = "index.html";
pub const SCRIPT_FILE: &str = "script.js";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Markdown document plus an HTML map.
    #[default]
    Document,
    /// `points.json` with charts, plus a static page rendering it.
    Feed,
    /// Both of the above.
    All,
}

impl ReportFormat {
    const fn writes_document(self) -> bool {
        matches!(self, Self::Document | Self::All)
    }

    const fn writes_feed(self) -> bool {
        matches!(self, Self::Feed | Self::All)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Document,
    Map,
    Points,
    Page,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "Document",
            Self::Map => "Interactive map",
            Self::Points => "Point feed",
            Self::Page => "Map page",
        };
        f.write_str(name)
    }
}

/// A file written by [`write_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

/// Replaces `path` with `content`. Earlier runs are overwritten, never merged.
fn save(path: PathBuf, content: &str, kind: ArtifactKind) -> Result<Artifact, ReportError> {
    fs::write(&path, content)?;
    tracing::info!(path = %path.display(), "{kind} saved");
    Ok(Artifact { kind, path })
}

/// Writes the report for `entries` into `output_dir` in the requested format.
///
/// # Errors
///
/// Fails if the directory cannot be written or the feed cannot be serialized.
pub fn write_report(
    entries: &[ReportEntry],
    output_dir: &Path,
    format: ReportFormat,
) -> Result<Vec<Artifact>, ReportError> {
    fs::create_dir_all(output_dir)?;
    let mut artifacts = Vec::new();

    if format.writes_document() {
        artifacts.push(save(
            output_dir.join(DOCUMENT_FILE),
            &document::render_document(entries),
            ArtifactKind::Document,
        )?);
        artifacts.push(save(
            output_dir.join(MAP_FILE),
            &map::render_map(entries)?,
            ArtifactKind::Map,
        )?);
    }

    if format.writes_feed() {
        artifacts.push(save(
            output_dir.join(POINTS_FILE),
            &feed::render_points(entries)?,
            ArtifactKind::Points,
        )?);
        artifacts.push(save(
            output_dir.join(INDEX_FILE),
            feed::INDEX_HTML,
            ArtifactKind::Page,
        )?);
        artifacts.push(save(
            output_dir.join(SCRIPT_FILE),
            feed::SCRIPT_JS,
            ArtifactKind::Page,
        )?);
    }

    Ok(artifacts)
}

/// JSON that can sit inside a `<script>` element.
pub(crate) fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/")
}
