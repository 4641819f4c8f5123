//! Core entry point for the referee_report crate.
//!
//! Fills the fixed-layout referee report templates with match data: [`layout`]
//! maps a [`ReportRecord`] to positioned text, [`overlay`] draws that text onto
//! the category's PDF template, and [`ReportGenerator`] ties both to an
//! [`AssetLoader`].

pub mod assets;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod model;
pub mod overlay;
pub mod report;

pub use assets::{AssetError, AssetLoader, CachedAssets, DirectoryAssets};
pub use model::{AgeCategory, Placement, ReportRecord, UnsupportedCategoryError};
pub use overlay::RenderError;
pub use report::{GeneratedReport, ReportError, ReportGenerator};
