//! Locating and embedding the TrueType font used for every report overlay.

mod embed;

pub use embed::{EmbeddedFont, EncodedRun, GlyphCoverageError};

use std::env;
use std::path::{Path, PathBuf};

use log::warn;

use crate::assets::AssetError;

/// File name of the font shipped with the report assets.
pub const DEFAULT_FONT_FILE: &str = "Roboto-Medium.ttf";

/// Environment variable pointing directly at a font file to use instead of the bundled one.
pub const FONT_PATH_ENV: &str = "REFEREE_REPORT_FONT";

// Fonts with Romanian diacritics that are commonly installed on Linux, macOS and Windows.
const SYSTEM_FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

/// Returns the directory the crate ships its assets from.
pub fn bundled_assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn font_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONT_PATH_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            candidates.push(bin_dir.join("assets/fonts").join(DEFAULT_FONT_FILE));
        }
    }

    let bundled = bundled_assets_dir().join("fonts").join(DEFAULT_FONT_FILE);
    if !candidates.contains(&bundled) {
        candidates.push(bundled);
    }

    candidates
}

fn first_existing(candidates: &[PathBuf]) -> Option<&Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|path| path.is_file())
}

/// Finds the report font.
///
/// The search order is the `REFEREE_REPORT_FONT` path, `assets/fonts` next to the running
/// binary, then the crate's bundled `assets/fonts`. When none of these hold the font a
/// system font with the same character coverage is used and a warning is logged.
pub fn locate_font() -> Result<PathBuf, AssetError> {
    let candidates = font_candidates();
    if let Some(path) = first_existing(&candidates) {
        return Ok(path.to_path_buf());
    }

    let fallbacks: Vec<PathBuf> = SYSTEM_FALLBACK_FONTS.iter().map(PathBuf::from).collect();
    match first_existing(&fallbacks) {
        Some(fallback) => {
            warn!(
                "{} not found in any asset directory; falling back to system font {}",
                DEFAULT_FONT_FILE,
                fallback.display()
            );
            Ok(fallback.to_path_buf())
        }
        None => Err(AssetError::Missing {
            asset: DEFAULT_FONT_FILE.to_owned(),
            searched: candidates.into_iter().chain(fallbacks).collect(),
        }),
    }
}
