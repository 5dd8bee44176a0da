//! Project export serializers and sharing links.
//!
//! # Responsibility
//! - Describe the export formats offered to users.
//! - Turn the current project into a downloadable document.
//!
//! # Invariants
//! - Serializers are pure: the same project, options and date always
//!   produce the same bytes.
//! - Raster/PDF/Draw.io formats never produce a document; they return a
//!   placeholder notice.

pub mod json;
pub mod markdown;
pub mod mermaid;
pub mod share;
pub mod svg;

use crate::model::project::Project;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::project_store::ProjectStore;
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Product name stamped into generated documents.
pub const PRODUCT_NAME: &str = "ArchSketch";

#[derive(Debug)]
pub enum ExportError {
    NoProject,
    /// SVG export of a project without nodes.
    EmptyProject,
    Encode(serde_json::Error),
    Render(std::fmt::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoProject => write!(f, "no project to export"),
            Self::EmptyProject => write!(f, "no nodes to export"),
            Self::Encode(err) => write!(f, "failed to encode project: {err}"),
            Self::Render(err) => write!(f, "failed to render document: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Render(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<std::fmt::Error> for ExportError {
    fn from(value: std::fmt::Error) -> Self {
        Self::Render(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpg,
    Svg,
    Pdf,
    Json,
    Markdown,
    Mermaid,
    Drawio,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 8] = [
        Self::Png,
        Self::Jpg,
        Self::Svg,
        Self::Pdf,
        Self::Json,
        Self::Markdown,
        Self::Mermaid,
        Self::Drawio,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Mermaid => "mermaid",
            Self::Drawio => "drawio",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Png => "PNG Image",
            Self::Jpg => "JPEG Image",
            Self::Svg => "SVG Vector",
            Self::Pdf => "PDF Document",
            Self::Json => "JSON Data",
            Self::Markdown => "Markdown Documentation",
            Self::Mermaid => "Mermaid Diagram",
            Self::Drawio => "Draw.io XML",
        }
    }

    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => ".png",
            Self::Jpg => ".jpg",
            Self::Svg => ".svg",
            Self::Pdf => ".pdf",
            Self::Json => ".json",
            Self::Markdown => ".md",
            Self::Mermaid => ".mmd",
            Self::Drawio => ".drawio",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::Svg => "image/svg+xml",
            Self::Pdf => "application/pdf",
            Self::Json => "application/json",
            Self::Markdown => "text/markdown",
            Self::Mermaid => "text/plain",
            Self::Drawio => "application/xml",
        }
    }

    /// Whether this build can produce a document in this format.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Svg | Self::Json | Self::Markdown | Self::Mermaid)
    }

    /// Accepts a format id or its extension (`md`, `mmd`, `jpeg`).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().trim_start_matches('.').to_ascii_lowercase();
        match value.as_str() {
            "md" => Some(Self::Markdown),
            "mmd" => Some(Self::Mermaid),
            "jpeg" => Some(Self::Jpg),
            _ => Self::ALL.into_iter().find(|format| format.id() == value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// SVG only: paint a light background rectangle.
    pub include_background: bool,
    /// Date stamped into the Markdown footer.
    pub generated_on: NaiveDate,
}

impl ExportOptions {
    pub fn new(generated_on: NaiveDate) -> Self {
        Self {
            include_background: true,
            generated_on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutput {
    Document {
        file_name: String,
        mime_type: &'static str,
        contents: String,
    },
    /// Format not implemented yet; `notice` is shown to the user instead.
    Placeholder {
        format: ExportFormat,
        notice: String,
    },
}

/// Download file name: project name plus extension.
///
/// Path separators and other characters most file systems reject are
/// replaced by `_`; a blank name becomes `project`.
pub fn export_file_name(project: &Project, format: ExportFormat) -> String {
    let cleaned = project
        .name
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect::<String>();
    let stem = if cleaned.is_empty() {
        "project"
    } else {
        cleaned.as_str()
    };
    format!("{stem}{}", format.extension())
}

/// "Coming soon" notice for formats without a serializer.
pub fn placeholder_notice(format: ExportFormat) -> String {
    match format {
        ExportFormat::Pdf => "PDF export coming soon! Use SVG export for now.".to_string(),
        other => format!("{} export coming soon!", other.display_name()),
    }
}

/// Exports the store's current project in `format`.
///
/// # Errors
/// - `ExportError::NoProject` without a current project.
/// - `ExportError::EmptyProject` for SVG of a project without nodes.
pub fn export_current<K: KeyValueStore>(
    store: &ProjectStore<K>,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportOutput, ExportError> {
    let project = store.current_project().ok_or(ExportError::NoProject)?;
    if !format.is_supported() {
        return Ok(ExportOutput::Placeholder {
            format,
            notice: placeholder_notice(format),
        });
    }

    let contents = match format {
        ExportFormat::Json => {
            let snapshot = store.export_project().ok_or(ExportError::NoProject)?;
            json::to_json(&snapshot)?
        }
        ExportFormat::Markdown => markdown::to_markdown(project, options.generated_on)?,
        ExportFormat::Mermaid => mermaid::to_mermaid(project)?,
        _ => svg::to_svg(project, options.include_background)?,
    };
    info!(
        "event=project_export module=export status=ok format={} bytes={}",
        format.id(),
        contents.len()
    );
    Ok(ExportOutput::Document {
        file_name: export_file_name(project, format),
        mime_type: format.mime_type(),
        contents,
    })
}

#[cfg(test)]
mod tests {
    use super::{export_file_name, placeholder_notice, ExportFormat};
    use crate::model::project::Project;
    use chrono::Utc;

    #[test]
    fn parse_accepts_ids_and_extensions() {
        assert_eq!(ExportFormat::parse("md"), Some(ExportFormat::Markdown));
        assert_eq!(ExportFormat::parse(".MMD"), Some(ExportFormat::Mermaid));
        assert_eq!(ExportFormat::parse("drawio"), Some(ExportFormat::Drawio));
        assert_eq!(ExportFormat::parse("gif"), None);
    }

    #[test]
    fn file_name_sanitizes_separators() {
        let project = Project::new("Payments / v2", "", Utc::now());
        assert_eq!(
            export_file_name(&project, ExportFormat::Mermaid),
            "Payments _ v2.mmd"
        );
        let blank = Project::new("   ", "", Utc::now());
        assert_eq!(export_file_name(&blank, ExportFormat::Json), "project.json");
    }

    #[test]
    fn only_text_formats_are_supported() {
        let supported = ExportFormat::ALL
            .into_iter()
            .filter(|format| format.is_supported())
            .count();
        assert_eq!(supported, 4);
        assert!(placeholder_notice(ExportFormat::Drawio).contains("coming soon"));
    }
}
