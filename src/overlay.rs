//! Drawing resolved placements onto a PDF template with `lopdf`.

use std::collections::BTreeMap;
use std::fmt;
use std::io;

use log::{debug, warn};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use ttf_parser::FaceParsingError;

use crate::fonts::{EmbeddedFont, EncodedRun};
use crate::model::{AgeCategory, Placement};

/// Size of every overlay text run, in points.
pub const FONT_SIZE: f32 = 13.0;

/// RGB fill color of every overlay text run.
pub const TEXT_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

/// Baseline distance between the lines of a multi-line placement, in points.
pub const LINE_HEIGHT: f32 = 24.0;

const FONT_RESOURCE_PREFIX: &str = "FReport";

// Guards against malformed page trees whose Parent links form a cycle.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Errors that can occur while rendering overlays onto a template.
#[derive(Debug)]
pub enum RenderError {
    /// The template bytes could not be parsed as a PDF document.
    TemplateLoad(lopdf::Error),
    /// The font bytes could not be parsed as a TrueType font.
    FontLoad(FaceParsingError),
    /// A placement contains a character the font has no glyph for.
    GlyphEncoding {
        /// The unsupported character.
        character: char,
        /// The placement text containing it.
        text: String,
    },
    /// A page object of the template is not a dictionary.
    InvalidPage {
        /// Zero-based index of the page.
        page_index: usize,
    },
    /// The modified document could not be written.
    Serialize(io::Error),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        Self::TemplateLoad(err)
    }
}

impl From<FaceParsingError> for RenderError {
    fn from(err: FaceParsingError) -> Self {
        Self::FontLoad(err)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemplateLoad(err) => write!(f, "Failed to load PDF template: {err}"),
            Self::FontLoad(err) => write!(f, "Failed to load font: {err}"),
            Self::GlyphEncoding { character, text } => write!(
                f,
                "Font cannot encode '{}' (U+{:04X}) in \"{}\"",
                character, *character as u32, text
            ),
            Self::InvalidPage { page_index } => {
                write!(f, "Template page {page_index} is not a page dictionary")
            }
            Self::Serialize(err) => write!(f, "Failed to serialize PDF: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TemplateLoad(err) => Some(err),
            Self::FontLoad(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::GlyphEncoding { .. } | Self::InvalidPage { .. } => None,
        }
    }
}

struct EncodedPlacement<'p> {
    placement: &'p Placement,
    lines: Vec<EncodedRun>,
}

/// Draws `placements` onto a fresh copy of `template_bytes` and returns the new PDF.
///
/// Placements are grouped by page. Pages beyond the end of the template are skipped
/// with a warning, and blank placements are never drawn. Text containing line breaks
/// is drawn as several lines [`LINE_HEIGHT`] apart, starting at the placement's
/// position. Every drawn character must exist in the font; this is checked before the
/// document is modified. The input bytes are not touched and no state survives the call.
pub fn render(
    category: AgeCategory,
    placements: &[Placement],
    template_bytes: &[u8],
    font_bytes: &[u8],
) -> Result<Vec<u8>, RenderError> {
    let mut document = Document::load_mem(template_bytes)?;
    let mut font = EmbeddedFont::parse(font_bytes)?;

    let pages = document.get_pages();
    let page_count = pages.len();

    let mut by_page: BTreeMap<usize, Vec<&Placement>> = BTreeMap::new();
    for placement in placements {
        by_page
            .entry(placement.page_index())
            .or_default()
            .push(placement);
    }

    let mut encoded: BTreeMap<ObjectId, (usize, Vec<EncodedPlacement<'_>>)> = BTreeMap::new();
    for (page_index, group) in by_page {
        let Some(&page_id) = u32::try_from(page_index + 1)
            .ok()
            .and_then(|page_number| pages.get(&page_number))
        else {
            warn!(
                "Skipping {} placement(s) for page {} of the {} template: it only has {} page(s)",
                group.len(),
                page_index,
                category,
                page_count
            );
            continue;
        };

        let mut runs = Vec::new();
        for placement in group.into_iter().filter(|p| !p.is_blank()) {
            let lines = placement
                .text()
                .lines()
                .map(|line| {
                    font.encode(line).map_err(|err| RenderError::GlyphEncoding {
                        character: err.character,
                        text: placement.text().to_owned(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            runs.push(EncodedPlacement { placement, lines });
        }

        if !runs.is_empty() {
            encoded.insert(page_id, (page_index, runs));
        }
    }

    if !encoded.is_empty() {
        let font_id = font.embed(&mut document);
        for (page_id, (page_index, runs)) in &encoded {
            let resource_name = add_font_resource(&mut document, *page_id, *page_index, font_id)?;
            let content = overlay_content(&resource_name, runs);
            append_page_content(&mut document, *page_id, *page_index, content)?;
            debug!(
                "Drew {} placement(s) on page {} of the {} template",
                runs.len(),
                page_index,
                category
            );
        }
    }

    let mut buffer = Vec::new();
    document.save_to(&mut buffer).map_err(RenderError::Serialize)?;
    Ok(buffer)
}

fn overlay_content(resource_name: &str, runs: &[EncodedPlacement<'_>]) -> Vec<u8> {
    let [r, g, b] = TEXT_COLOR;
    let mut content = format!("q\n{r} {g} {b} rg\n");

    for EncodedPlacement { placement, lines } in runs {
        content.push_str(&format!("BT\n/{resource_name} {FONT_SIZE} Tf\n"));
        if lines.len() > 1 {
            content.push_str(&format!("{LINE_HEIGHT} TL\n"));
        }
        content.push_str(&format!("{} {} Td\n", placement.x(), placement.y()));
        let shown: Vec<String> = lines
            .iter()
            .map(|line| format!("<{}> Tj\n", line.to_hex()))
            .collect();
        content.push_str(&shown.join("T*\n"));
        content.push_str("ET\n");
    }
    content.push_str("Q\n");

    content.into_bytes()
}

/// Looks up `key` on the page or, failing that, on its ancestors in the page tree.
fn inherited_attribute(document: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = document.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = document.get_dictionary(parent).ok()?;
    }
    None
}

fn resolved_dictionary(document: &Document, object: Option<Object>) -> Dictionary {
    match object {
        Some(Object::Dictionary(dictionary)) => dictionary,
        Some(Object::Reference(id)) => document
            .get_dictionary(id)
            .cloned()
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    }
}

fn page_dictionary_mut(
    document: &mut Document,
    page_id: ObjectId,
    page_index: usize,
) -> Result<&mut Dictionary, RenderError> {
    document
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| RenderError::InvalidPage { page_index })
}

/// Registers the font in the page's own resources and returns its resource name.
///
/// The effective resources (possibly inherited or shared with other pages) are copied
/// onto the page, so no object shared with other pages is modified.
fn add_font_resource(
    document: &mut Document,
    page_id: ObjectId,
    page_index: usize,
    font_id: ObjectId,
) -> Result<String, RenderError> {
    let resources = inherited_attribute(document, page_id, b"Resources");
    let mut resources = resolved_dictionary(document, resources);
    let mut fonts = resolved_dictionary(document, resources.get(b"Font").ok().cloned());

    let mut resource_name = FONT_RESOURCE_PREFIX.to_owned();
    let mut suffix = 0;
    while fonts.has(resource_name.as_bytes()) {
        suffix += 1;
        resource_name = format!("{FONT_RESOURCE_PREFIX}{suffix}");
    }

    fonts.set(resource_name.as_str(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    page_dictionary_mut(document, page_id, page_index)?
        .set("Resources", Object::Dictionary(resources));
    Ok(resource_name)
}

/// Appends `content` to the page, isolating it from the template's graphics state.
fn append_page_content(
    document: &mut Document,
    page_id: ObjectId,
    page_index: usize,
    content: Vec<u8>,
) -> Result<(), RenderError> {
    let current = page_dictionary_mut(document, page_id, page_index)?
        .get(b"Contents")
        .ok()
        .cloned();
    // An indirect array is spliced in; the array object itself may be shared.
    let existing = match current {
        Some(Object::Reference(id)) => match document.get_object(id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(id)],
        },
        Some(Object::Array(items)) => items,
        _ => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    if !existing.is_empty() {
        let save_id = document.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        contents.push(Object::Reference(save_id));
        contents.extend(existing);
        let restore_id = document.add_object(Stream::new(Dictionary::new(), b"Q\n".to_vec()));
        contents.push(Object::Reference(restore_id));
    }
    let overlay_id = document.add_object(Stream::new(Dictionary::new(), content));
    contents.push(Object::Reference(overlay_id));

    page_dictionary_mut(document, page_id, page_index)?.set("Contents", Object::Array(contents));
    Ok(())
}
