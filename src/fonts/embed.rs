//! Embedding a TrueType program as a composite (Type0 / CIDFontType2) PDF font.
//!
//! Text is written with the `Identity-H` encoding, so every string in the content
//! stream is a sequence of big-endian glyph ids. Only the glyphs actually used get
//! widths and `ToUnicode` entries; the font program itself is embedded whole.

use std::collections::BTreeMap;
use std::fmt;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use ttf_parser::{name_id, Face, FaceParsingError, GlyphId};

const FALLBACK_BASE_FONT: &str = "EmbeddedFont";

// Nonsymbolic: the font uses the standard Latin character set.
const FONT_FLAGS: i64 = 32;

const TO_UNICODE_CHUNK: usize = 100;

/// A character in the text that the font has no glyph for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphCoverageError {
    pub character: char,
}

impl fmt::Display for GlyphCoverageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "font has no glyph for '{}' (U+{:04X})",
            self.character, self.character as u32
        )
    }
}

impl std::error::Error for GlyphCoverageError {}

/// Glyph ids for one text run, ready to be written with `Tj`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedRun {
    glyphs: Vec<u16>,
}

impl EncodedRun {
    pub fn glyphs(&self) -> &[u16] {
        &self.glyphs
    }

    /// Returns the run as the body of a PDF hex string.
    pub fn to_hex(&self) -> String {
        self.glyphs
            .iter()
            .map(|glyph| format!("{glyph:04X}"))
            .collect()
    }
}

/// A parsed font program together with the glyphs used so far.
pub struct EmbeddedFont<'a> {
    data: &'a [u8],
    face: Face<'a>,
    used: BTreeMap<u16, char>,
}

impl<'a> EmbeddedFont<'a> {
    /// Parses `data` as a TrueType font.
    pub fn parse(data: &'a [u8]) -> Result<Self, FaceParsingError> {
        let face = Face::parse(data, 0)?;
        Ok(Self {
            data,
            face,
            used: BTreeMap::new(),
        })
    }

    /// Maps `text` to glyph ids and records them for embedding.
    ///
    /// Nothing is recorded when any character is missing from the font.
    pub fn encode(&mut self, text: &str) -> Result<EncodedRun, GlyphCoverageError> {
        let mapped = text
            .chars()
            .map(|character| {
                self.face
                    .glyph_index(character)
                    .map(|glyph| (glyph.0, character))
                    .ok_or(GlyphCoverageError { character })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let glyphs = mapped
            .into_iter()
            .map(|(glyph, character)| {
                self.used.entry(glyph).or_insert(character);
                glyph
            })
            .collect();

        Ok(EncodedRun { glyphs })
    }

    /// Returns the PostScript name of the font, reduced to characters valid in a PDF name.
    pub fn base_font_name(&self) -> String {
        let name = self
            .face
            .names()
            .into_iter()
            .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string())
            .unwrap_or_default();

        let sanitized: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '-' | '_'))
            .collect();

        if sanitized.is_empty() {
            FALLBACK_BASE_FONT.to_owned()
        } else {
            sanitized
        }
    }

    fn scaled(&self, units: f32) -> i64 {
        let units_per_em = f32::from(self.face.units_per_em().max(1));
        (units * 1000.0 / units_per_em).round() as i64
    }

    fn glyph_width(&self, glyph: u16) -> i64 {
        let advance = self.face.glyph_hor_advance(GlyphId(glyph)).unwrap_or(0);
        self.scaled(f32::from(advance))
    }

    fn widths(&self) -> Vec<Object> {
        self.used
            .keys()
            .flat_map(|&glyph| {
                [
                    Object::Integer(i64::from(glyph)),
                    Object::Array(vec![Object::Integer(self.glyph_width(glyph))]),
                ]
            })
            .collect()
    }

    fn descriptor(&self, base_font: &str, font_file_id: ObjectId) -> Dictionary {
        let bbox = self.face.global_bounding_box();
        let ascent = self.scaled(f32::from(self.face.ascender()));
        let cap_height = self
            .face
            .capital_height()
            .map(|height| self.scaled(f32::from(height)))
            .unwrap_or(ascent);

        dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => base_font,
            "Flags" => FONT_FLAGS,
            "FontBBox" => vec![
                Object::Integer(self.scaled(f32::from(bbox.x_min))),
                Object::Integer(self.scaled(f32::from(bbox.y_min))),
                Object::Integer(self.scaled(f32::from(bbox.x_max))),
                Object::Integer(self.scaled(f32::from(bbox.y_max))),
            ],
            "ItalicAngle" => self.face.italic_angle().unwrap_or(0.0),
            "Ascent" => ascent,
            "Descent" => self.scaled(f32::from(self.face.descender())),
            "CapHeight" => cap_height,
            "StemV" => 80,
            "FontFile2" => font_file_id,
        }
    }

    fn to_unicode_cmap(&self) -> Vec<u8> {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );

        let entries: Vec<(&u16, &char)> = self.used.iter().collect();
        for chunk in entries.chunks(TO_UNICODE_CHUNK) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (glyph, character) in chunk {
                let mut units = [0u16; 2];
                let utf16: String = character
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|unit| format!("{unit:04X}"))
                    .collect();
                cmap.push_str(&format!("<{glyph:04X}> <{utf16}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str(
            "endcmap\n\
             CMapName currentdict /CMap defineresource pop\n\
             end\n\
             end\n",
        );
        cmap.into_bytes()
    }

    /// Adds the font program and its dictionaries to `document`, returning the Type0 font id.
    pub fn embed(&self, document: &mut Document) -> ObjectId {
        let base_font = self.base_font_name();

        let font_file = Stream::new(
            dictionary! { "Length1" => self.data.len() as i64 },
            self.data.to_vec(),
        )
        .with_compression(false);
        let font_file_id = document.add_object(font_file);

        let descriptor_id = document.add_object(self.descriptor(&base_font, font_file_id));

        let cid_font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => base_font.as_str(),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "CIDToGIDMap" => "Identity",
            "DW" => 1000,
            "W" => self.widths(),
        });

        let to_unicode_id =
            document.add_object(Stream::new(Dictionary::new(), self.to_unicode_cmap()));

        document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => base_font.as_str(),
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        })
    }
}
