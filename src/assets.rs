//! Loading the report templates and font.
//!
//! The renderer never touches the filesystem itself; it receives bytes from an
//! [`AssetLoader`]. [`DirectoryAssets`] reads the files on every call, and
//! [`CachedAssets`] wraps any loader to keep the bytes in memory once read. Which
//! one is used is decided by whoever constructs the [`crate::ReportGenerator`].

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use crate::fonts::{self, DEFAULT_FONT_FILE};
use crate::model::AgeCategory;

/// Environment variable overriding the asset directory searched by [`DirectoryAssets::discover`].
pub const ASSETS_DIR_ENV: &str = "REFEREE_REPORT_ASSETS_DIR";

const TEMPLATES_SUBDIR: &str = "reports";
const FONTS_SUBDIR: &str = "fonts";

/// Errors raised while locating or reading report assets.
#[derive(Debug)]
pub enum AssetError {
    /// No candidate location held the asset.
    Missing {
        /// Name of the asset that could not be found.
        asset: String,
        /// Every location that was checked, in search order.
        searched: Vec<PathBuf>,
    },
    /// The asset exists but could not be read.
    Read { path: PathBuf, source: io::Error },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { asset, searched } => {
                let searched = searched
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Unable to locate {asset}. Checked: {searched}")
            }
            Self::Read { path, .. } => write!(f, "Failed to read asset {}", path.display()),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Missing { .. } => None,
        }
    }
}

/// Supplies template and font bytes to the report generator.
pub trait AssetLoader {
    /// Returns the PDF template for `category`.
    fn template(&self, category: AgeCategory) -> Result<Arc<[u8]>, AssetError>;

    /// Returns the TrueType font used for every overlay.
    fn font(&self) -> Result<Arc<[u8]>, AssetError>;
}

impl<L: AssetLoader + ?Sized> AssetLoader for &L {
    fn template(&self, category: AgeCategory) -> Result<Arc<[u8]>, AssetError> {
        (**self).template(category)
    }

    fn font(&self) -> Result<Arc<[u8]>, AssetError> {
        (**self).font()
    }
}

impl<L: AssetLoader + ?Sized> AssetLoader for Arc<L> {
    fn template(&self, category: AgeCategory) -> Result<Arc<[u8]>, AssetError> {
        (**self).template(category)
    }

    fn font(&self) -> Result<Arc<[u8]>, AssetError> {
        (**self).font()
    }
}

fn read_asset(path: &Path) -> Result<Arc<[u8]>, AssetError> {
    if !path.is_file() {
        return Err(AssetError::Missing {
            asset: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            searched: vec![path.to_path_buf()],
        });
    }

    let bytes = fs::read(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes.into())
}

/// Reads assets from a deployment directory on every request.
///
/// Expected layout:
///
/// ```text
/// <root>/reports/referee_template_u9.pdf
/// <root>/reports/referee_template_u11.pdf
/// <root>/reports/referee_template_u13.pdf
/// <root>/reports/referee_template_u15.pdf
/// <root>/fonts/Roboto-Medium.ttf
/// ```
#[derive(Clone, Debug)]
pub struct DirectoryAssets {
    root: PathBuf,
    font_path: PathBuf,
}

impl DirectoryAssets {
    /// Uses `root` with the standard layout.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let font_path = root.join(FONTS_SUBDIR).join(DEFAULT_FONT_FILE);
        Self { root, font_path }
    }

    /// Reads the font from `path` instead of `<root>/fonts`.
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = path.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn font_path(&self) -> &Path {
        &self.font_path
    }

    /// Returns the path of the template used for `category`.
    pub fn template_path(&self, category: AgeCategory) -> PathBuf {
        self.root
            .join(TEMPLATES_SUBDIR)
            .join(category.template_file_name())
    }

    fn has_all_templates(&self) -> bool {
        AgeCategory::ALL
            .iter()
            .all(|&category| self.template_path(category).is_file())
    }

    /// Finds an asset directory holding all four templates.
    ///
    /// Checks `REFEREE_REPORT_ASSETS_DIR`, `assets` next to the running binary, then the
    /// crate's bundled `assets`. When the chosen directory has no font, the font is
    /// located through [`fonts::locate_font`].
    pub fn discover() -> Result<Self, AssetError> {
        let mut candidates = Vec::new();

        if let Some(path) = env::var_os(ASSETS_DIR_ENV).filter(|value| !value.is_empty()) {
            candidates.push(PathBuf::from(path));
        }

        if let Ok(current_exe) = env::current_exe() {
            if let Some(bin_dir) = current_exe.parent() {
                candidates.push(bin_dir.join("assets"));
            }
        }

        let bundled = fonts::bundled_assets_dir();
        if !candidates.contains(&bundled) {
            candidates.push(bundled);
        }

        let Some(assets) = candidates
            .iter()
            .map(DirectoryAssets::new)
            .find(DirectoryAssets::has_all_templates)
        else {
            return Err(AssetError::Missing {
                asset: "referee report templates".to_owned(),
                searched: candidates
                    .into_iter()
                    .map(|dir| dir.join(TEMPLATES_SUBDIR))
                    .collect(),
            });
        };

        if assets.font_path.is_file() {
            Ok(assets)
        } else {
            let font_path = fonts::locate_font()?;
            Ok(assets.with_font_path(font_path))
        }
    }
}

impl AssetLoader for DirectoryAssets {
    fn template(&self, category: AgeCategory) -> Result<Arc<[u8]>, AssetError> {
        read_asset(&self.template_path(category))
    }

    fn font(&self) -> Result<Arc<[u8]>, AssetError> {
        read_asset(&self.font_path)
    }
}

/// Keeps every asset in memory after the first successful load.
///
/// Failed loads are not cached, so a missing file that appears later is picked up
/// on the next request.
#[derive(Debug)]
pub struct CachedAssets<L> {
    inner: L,
    templates: Mutex<HashMap<AgeCategory, Arc<[u8]>>>,
    font: Mutex<Option<Arc<[u8]>>>,
}

impl<L: AssetLoader> CachedAssets<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            templates: Mutex::new(HashMap::new()),
            font: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: AssetLoader> AssetLoader for CachedAssets<L> {
    fn template(&self, category: AgeCategory) -> Result<Arc<[u8]>, AssetError> {
        let mut templates = self
            .templates
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(bytes) = templates.get(&category) {
            return Ok(Arc::clone(bytes));
        }

        let bytes = self.inner.template(category)?;
        templates.insert(category, Arc::clone(&bytes));
        Ok(bytes)
    }

    fn font(&self) -> Result<Arc<[u8]>, AssetError> {
        let mut font = self.font.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bytes) = font.as_ref() {
            return Ok(Arc::clone(bytes));
        }

        let bytes = self.inner.font()?;
        *font = Some(Arc::clone(&bytes));
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetError, AssetLoader, CachedAssets, DirectoryAssets};
    use crate::model::AgeCategory;
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingLoader {
        template_loads: Cell<usize>,
        font_loads: Cell<usize>,
    }

    impl AssetLoader for CountingLoader {
        fn template(&self, category: AgeCategory) -> Result<Arc<[u8]>, AssetError> {
            self.template_loads.set(self.template_loads.get() + 1);
            Ok(Arc::from(category.as_str().as_bytes()))
        }

        fn font(&self) -> Result<Arc<[u8]>, AssetError> {
            self.font_loads.set(self.font_loads.get() + 1);
            Ok(Arc::from(&b"font"[..]))
        }
    }

    #[test]
    fn directory_layout_matches_deployment() {
        let assets = DirectoryAssets::new("/srv/public");
        assert_eq!(
            assets.template_path(AgeCategory::U13),
            PathBuf::from("/srv/public/reports/referee_template_u13.pdf")
        );
        assert_eq!(
            assets.font_path(),
            PathBuf::from("/srv/public/fonts/Roboto-Medium.ttf")
        );
    }

    #[test]
    fn missing_template_reports_its_path() {
        let assets = DirectoryAssets::new("/__referee_report_missing_assets__");
        match assets.template(AgeCategory::U9) {
            Err(AssetError::Missing { asset, searched }) => {
                assert_eq!(asset, "referee_template_u9.pdf");
                assert_eq!(searched.len(), 1);
            }
            other => panic!("expected a missing asset error, got {other:?}"),
        }
    }

    #[test]
    fn cache_loads_each_asset_once() {
        let cached = CachedAssets::new(CountingLoader::default());

        for _ in 0..3 {
            assert_eq!(&*cached.template(AgeCategory::U9).expect("template"), b"U9");
            assert_eq!(&*cached.font().expect("font"), b"font");
        }
        cached.template(AgeCategory::U15).expect("template");

        assert_eq!(cached.inner().template_loads.get(), 2);
        assert_eq!(cached.inner().font_loads.get(), 1);
    }
}
