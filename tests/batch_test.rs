//! End-to-end tests over real PDF files on disk.

use std::fs;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use docsift::batch::{analyze_collection, extract_outlines, list_pdfs};
use docsift::persist::read_outline;
use docsift::{extract_outline_bytes, load_bytes, AnalysisOptions, Docsift, TextSource};

/// A line of text: (font resource, size, x, y, text).
type Line = (&'static str, i64, i64, i64, &'static str);

/// Build a single-page PDF from positioned lines.
fn build_pdf(lines: &[Line]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut operations = Vec::new();
    for (font, size, x, y, text) in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![(*font).into(), (*size).into()]));
        operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

const BODY: [&str; 4] = [
    "The harbour front has a long sandy beach with calm water.",
    "Families swim at the beach in the morning before the wind.",
    "Small boats leave the harbour every hour for the islands.",
    "Cafes along the promenade stay open late in the summer.",
];

fn guide_pdf() -> Vec<u8> {
    let mut lines: Vec<Line> = vec![("F2", 24, 180, 720, "Coastal Weekend Guide")];
    for (i, text) in BODY.into_iter().enumerate() {
        lines.push(("F1", 10, 72, 660 - i as i64 * 14, text));
    }
    lines.push(("F2", 16, 72, 560, "Beaches and Swimming"));
    for (i, text) in BODY.into_iter().enumerate() {
        lines.push(("F1", 10, 72, 530 - i as i64 * 14, text));
    }
    build_pdf(&lines)
}

fn write_guide(dir: &Path, name: &str) {
    fs::write(dir.join(name), guide_pdf()).unwrap();
}

#[test]
fn test_load_generated_pdf() {
    let layout = load_bytes(&guide_pdf()).unwrap();
    assert_eq!(layout.page_count(), 1);

    let page = layout.page(1).unwrap();
    assert_eq!(page.width, 612.0);
    assert_eq!(page.height, 792.0);

    let text = layout.text_in_rect(1, page.rect());
    assert!(text.contains("Coastal Weekend Guide"));
    assert!(text.contains("Beaches and Swimming"));

    let title_rect = layout.search_for(1, "coastal weekend guide").unwrap();
    let heading_rect = layout.search_for(1, "Beaches and Swimming").unwrap();
    assert!(title_rect.y1 < heading_rect.y0);
}

#[test]
fn test_outline_from_generated_pdf() {
    let outline = extract_outline_bytes(&guide_pdf()).unwrap();
    assert_eq!(outline.title, "Coastal Weekend Guide");
    assert_eq!(outline.outline.len(), 1);
    assert_eq!(outline.outline[0].text, "Beaches and Swimming");
    assert_eq!(outline.outline[0].page, 1);
}

#[test]
fn test_batch_outline_then_analyze() {
    let input = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_guide(input.path(), "b_guide.pdf");
    write_guide(input.path(), "A_guide.PDF");
    fs::write(input.path().join("notes.txt"), "not a pdf").unwrap();

    let outlines = work.path().join("outlines");
    let report = extract_outlines(input.path(), &outlines).unwrap();
    assert!(report.is_success());
    assert_eq!(report.succeeded.len(), 2);

    let outline = read_outline(outlines.join("b_guide.json")).unwrap();
    assert_eq!(outline.title, "Coastal Weekend Guide");
    let raw = fs::read_to_string(outlines.join("A_guide.json")).unwrap();
    assert!(raw.contains("\n    \"title\""));

    let result = analyze_collection(
        input.path(),
        &outlines,
        &AnalysisOptions::default(),
        "Travel Planner",
        "Find a quiet beach for swimming",
    )
    .unwrap();

    assert_eq!(
        result.metadata.input_documents,
        ["A_guide.PDF", "b_guide.pdf"]
    );
    assert!(!result.extracted_sections.is_empty());
    assert!(result.extracted_sections.len() <= 5);
    for (i, section) in result.extracted_sections.iter().enumerate() {
        assert_eq!(section.importance_rank, i + 1);
        assert_eq!(section.page_number, 1);
    }
    assert_eq!(
        result.subsection_analysis.len(),
        result.extracted_sections.len()
    );
}

#[test]
fn test_missing_outline_skips_document() {
    let input = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_guide(input.path(), "guide.pdf");
    write_guide(input.path(), "other.pdf");

    let outlines = work.path().join("outlines");
    extract_outlines(input.path(), &outlines).unwrap();
    fs::remove_file(outlines.join("other.json")).unwrap();

    let result = Docsift::new()
        .with_persona("Travel Planner")
        .with_job("Find a beach")
        .analyze_dir(input.path(), &outlines)
        .unwrap();

    assert_eq!(result.metadata.input_documents.len(), 2);
    assert!(result
        .extracted_sections
        .iter()
        .all(|s| s.document == "guide.pdf"));
}

#[test]
fn test_list_pdfs_ignores_other_files() {
    let dir = tempfile::tempdir().unwrap();
    write_guide(dir.path(), "one.pdf");
    fs::write(dir.path().join("one.json"), "{}").unwrap();
    assert_eq!(list_pdfs(dir.path()).unwrap().len(), 1);
}
