#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use referee_report::fonts;
use referee_report::{AgeCategory, ReportRecord};

/// A4 portrait, in points.
const MEDIA_BOX: [i64; 4] = [0, 0, 595, 842];

/// Builds a template with `page_count` pages, each holding a filled rectangle.
///
/// Resources live on the page tree root so overlays have to deal with inherited
/// resources, as they do with real templates.
pub fn blank_template(page_count: usize) -> Vec<u8> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();

    let kids: Vec<Object> = (0..page_count)
        .map(|_| {
            let content_id = document.add_object(Stream::new(
                dictionary! {},
                b"0.5 g\n20 20 40 40 re f\n".to_vec(),
            ));
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            Object::Reference(page_id)
        })
        .collect();

    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! {},
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count as i64,
        "Resources" => resources_id,
        "MediaBox" => MEDIA_BOX.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
    };
    document.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    document
        .save_to(&mut buffer)
        .expect("serialize fixture template");
    buffer
}

/// Builds a one-page template whose `Contents` is a reference to an array of two
/// streams, the second of which draws a filled rectangle.
pub fn indirect_contents_template() -> Vec<u8> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();

    let color_id = document.add_object(Stream::new(dictionary! {}, b"0.5 g\n".to_vec()));
    let shape_id = document.add_object(Stream::new(
        dictionary! {},
        b"20 20 40 40 re f\n".to_vec(),
    ));
    let contents_id = document.add_object(vec![
        Object::Reference(color_id),
        Object::Reference(shape_id),
    ]);
    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => contents_id,
        "Resources" => dictionary! {},
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => 1,
        "MediaBox" => MEDIA_BOX.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
    };
    document.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    document
        .save_to(&mut buffer)
        .expect("serialize fixture template");
    buffer
}

/// Loads the report font, or `None` when no font is available on this machine.
pub fn report_font() -> Option<Vec<u8>> {
    let path = fonts::locate_font().ok()?;
    fs::read(path).ok()
}

pub fn skip(test: &str) {
    eprintln!(
        "Skipping {test}: no report font found. Set REFEREE_REPORT_FONT or copy Roboto-Medium.ttf to assets/fonts."
    );
}

pub fn record(category: AgeCategory) -> ReportRecord {
    ReportRecord::new(
        category,
        "John Doe",
        NaiveDate::from_ymd_opt(2023, 10, 27).expect("valid date"),
        NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
        "Team A",
        "Team B",
    )
}

pub fn page_ids(pdf: &[u8]) -> (Document, Vec<ObjectId>) {
    let document = Document::load_mem(pdf).expect("rendered output parses");
    let ids = document.get_pages().into_values().collect();
    (document, ids)
}

/// Decodes the concatenated content streams of the page.
pub fn operations_on(document: &Document, page_id: ObjectId) -> Vec<Operation> {
    let bytes = document
        .get_page_content(page_id)
        .expect("page content readable");
    Content::decode(&bytes)
        .expect("page content decodes")
        .operations
}

/// Returns the number of `Tj` operators on the page.
pub fn text_runs_on(document: &Document, page_id: ObjectId) -> usize {
    operations_on(document, page_id)
        .iter()
        .filter(|operation| operation.operator == "Tj")
        .count()
}

/// Returns the `(x, y)` operands of every `Td` operator on the page.
pub fn text_positions_on(document: &Document, page_id: ObjectId) -> Vec<(f32, f32)> {
    operations_on(document, page_id)
        .iter()
        .filter(|operation| operation.operator == "Td")
        .map(|operation| {
            let x = operation.operands[0].as_float().expect("numeric x");
            let y = operation.operands[1].as_float().expect("numeric y");
            (x, y)
        })
        .collect()
}

pub fn write_assets(root: &Path, template_pages: usize, font: &[u8]) {
    let reports = root.join("reports");
    let font_dir = root.join("fonts");
    fs::create_dir_all(&reports).expect("create reports dir");
    fs::create_dir_all(&font_dir).expect("create fonts dir");
    for category in AgeCategory::ALL {
        fs::write(
            reports.join(category.template_file_name()),
            blank_template(template_pages),
        )
        .expect("write template");
    }
    fs::write(font_dir.join(fonts::DEFAULT_FONT_FILE), font).expect("write font");
}
