//! End-to-end report generation: record in, named PDF out.

use std::fmt;

use log::info;

use crate::assets::{AssetError, AssetLoader};
use crate::format::report_filename;
use crate::layout::resolve;
use crate::model::ReportRecord;
use crate::overlay::{self, RenderError};

/// Errors that can occur while generating a report.
#[derive(Debug)]
pub enum ReportError {
    /// A template or the font could not be loaded.
    Asset(AssetError),
    /// The overlays could not be rendered onto the template.
    Render(RenderError),
}

impl From<AssetError> for ReportError {
    fn from(err: AssetError) -> Self {
        Self::Asset(err)
    }
}

impl From<RenderError> for ReportError {
    fn from(err: RenderError) -> Self {
        Self::Render(err)
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset(_) => write!(f, "Failed to load report assets"),
            Self::Render(_) => write!(f, "Failed to render report"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Asset(err) => Some(err),
            Self::Render(err) => Some(err),
        }
    }
}

/// A rendered report ready to be written to disk or sent as a download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedReport {
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
    /// Suggested file name, see [`crate::format::report_filename`].
    pub filename: String,
}

impl GeneratedReport {
    /// MIME type of the rendered document.
    pub const CONTENT_TYPE: &'static str = "application/pdf";
}

/// Produces referee reports from records using templates supplied by `L`.
#[derive(Clone, Debug)]
pub struct ReportGenerator<L> {
    assets: L,
}

impl<L: AssetLoader> ReportGenerator<L> {
    pub fn new(assets: L) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &L {
        &self.assets
    }

    /// Resolves the record's layout and renders it onto the category's template.
    pub fn generate(&self, record: &ReportRecord) -> Result<GeneratedReport, ReportError> {
        let category = record.age_category();
        let placements = resolve(record);
        let template = self.assets.template(category)?;
        let font = self.assets.font()?;

        let bytes = overlay::render(category, &placements, &template, &font)?;
        let filename = report_filename(record);
        info!("Generated {} ({} bytes)", filename, bytes.len());

        Ok(GeneratedReport { bytes, filename })
    }
}
