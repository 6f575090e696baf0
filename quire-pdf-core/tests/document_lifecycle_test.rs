//! Document lifecycle and file structure tests
//!
//! Builds complete documents through the public API and checks the emitted
//! bytes: object layout, cross-reference offsets, idempotent close and the
//! error taxonomy.

use pretty_assertions::assert_eq;
use quire_pdf::{
    CellOptions, Destination, Document, ErrorCategory, HttpResponse, LineFeed, MultiCellOptions,
    Orientation, PageDecorator, PageSize, PdfError, Result, TextAlign, Unit,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

/// Parses the xref table: one offset per in-use object, in object order.
fn xref_offsets(pdf: &[u8]) -> Vec<usize> {
    let start = find(pdf, b"\nxref\n").expect("xref table") + 1;
    let text = String::from_utf8_lossy(&pdf[start..]).into_owned();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("xref"));
    let header: Vec<usize> = lines
        .next()
        .unwrap()
        .split(' ')
        .map(|n| n.parse().unwrap())
        .collect();
    assert_eq!(header[0], 0);
    assert_eq!(lines.next(), Some("0000000000 65535 f "));
    let offsets: Vec<usize> = lines
        .take(header[1] - 1)
        .map(|line| {
            assert_eq!(line.len(), 19);
            assert!(line.ends_with(" 00000 n "));
            line[..10].parse().unwrap()
        })
        .collect();
    assert_eq!(offsets.len(), header[1] - 1);
    offsets
}

fn uncompressed() -> Document {
    let mut doc = Document::new(Orientation::Portrait, Unit::Millimeter, PageSize::A4).unwrap();
    doc.set_compression(false);
    doc
}

#[test]
fn test_object_count_and_offsets() {
    for pages in 1..=4 {
        let mut doc = Document::default();
        doc.set_font("Helvetica", "", 12.0).unwrap();
        for _ in 0..pages {
            doc.add_page().unwrap();
            doc.cell(0.0, 10.0, "Line", &CellOptions::new()).unwrap();
        }
        let pdf = doc.to_bytes().unwrap();

        let offsets = xref_offsets(&pdf);
        // 2 + 2N + font + info + catalog
        assert_eq!(offsets.len(), 2 + 2 * pages + 3);
        for (index, offset) in offsets.iter().enumerate() {
            let marker = format!("{} 0 obj", index + 1);
            assert_eq!(
                &pdf[*offset..*offset + marker.len()],
                marker.as_bytes(),
                "object {} offset",
                index + 1
            );
        }

        let trailer = String::from_utf8_lossy(&pdf[find(&pdf, b"trailer").unwrap()..]).into_owned();
        assert!(trailer.contains(&format!("/Size {}", offsets.len() + 1)));
        assert!(trailer.contains("/Root "));
        assert!(trailer.contains("/Info "));
        assert!(pdf.ends_with(b"%%EOF\n"));
    }
}

#[test]
fn test_startxref_points_at_table() {
    let mut doc = Document::default();
    doc.add_page().unwrap();
    let pdf = doc.to_bytes().unwrap();
    let at = find(&pdf, b"startxref\n").unwrap() + 10;
    let declared: usize = String::from_utf8_lossy(&pdf[at..])
        .lines()
        .next()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(&pdf[declared..declared + 5], b"xref\n");
}

#[test]
fn test_close_is_idempotent() {
    let mut doc = Document::default();
    doc.add_page().unwrap();
    doc.set_font("Times", "B", 14.0).unwrap();
    doc.cell(40.0, 10.0, "Once", &CellOptions::new()).unwrap();

    doc.close().unwrap();
    let first = doc.buffer().unwrap().to_vec();
    doc.close().unwrap();
    assert_eq!(doc.buffer().unwrap(), first.as_slice());
    assert_eq!(doc.to_bytes().unwrap(), first);
}

#[test]
fn test_drawing_after_close_fails() {
    let mut doc = Document::default();
    doc.set_font("Courier", "", 10.0).unwrap();
    doc.close().unwrap();

    let err = doc.cell(10.0, 10.0, "late", &CellOptions::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::State);
    assert!(doc.add_page().is_err());
    assert!(doc.set_font("Courier", "", 12.0).is_err());
}

#[test]
fn test_empty_document_gets_one_page() {
    let mut doc = Document::default();
    let pdf = doc.to_bytes().unwrap();
    assert_eq!(doc.page_no(), 1);
    assert_eq!(count(&pdf, b"/Type /Page\n"), 1);
}

#[test]
fn test_cell_without_font() {
    let mut doc = Document::new(Orientation::Portrait, Unit::Millimeter, PageSize::A4).unwrap();
    doc.add_page().unwrap();
    let err = doc.cell(0.0, 10.0, "Hello", &CellOptions::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Font);
    assert_eq!(err.to_string(), "Font error: No font has been set");
}

#[test]
fn test_hello_world_page() {
    let mut doc = uncompressed();
    doc.add_page().unwrap();
    doc.set_font("Helvetica", "", 12.0).unwrap();
    doc.cell(0.0, 10.0, "Hello", &CellOptions::new()).unwrap();
    let pdf = doc.to_bytes().unwrap();

    assert!(pdf.starts_with(b"%PDF-1.3\n"));
    assert_eq!(count(&pdf, b") Tj ET"), 1);
    assert_eq!(count(&pdf, b"(Hello) Tj ET"), 1);

    let page = find(&pdf, b"3 0 obj").unwrap();
    let page_end = page + find(&pdf[page..], b"endobj").unwrap();
    assert!(find(&pdf[page..page_end], b"/MediaBox").is_none());
    assert!(find(&pdf[page..page_end], b"/Parent 1 0 R").is_some());
}

#[test]
fn test_configuration_errors() {
    let err = Document::new(
        Orientation::Portrait,
        Unit::Millimeter,
        PageSize::Custom {
            width: -10.0,
            height: 20.0,
        },
    )
    .err()
    .unwrap();
    assert_eq!(err.category(), ErrorCategory::Configuration);

    assert!("yards".parse::<Unit>().is_err());
    assert!("sideways".parse::<Orientation>().is_err());

    let mut doc = Document::default();
    let err = doc.add_page_with(None, None, 45).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_standard_page_sizes() {
    let sizes = [
        (PageSize::A3, 841.89, 1190.55),
        (PageSize::A4, 595.28, 841.89),
        (PageSize::A5, 420.94, 595.28),
        (PageSize::Letter, 612.0, 792.0),
        (PageSize::Legal, 612.0, 1008.0),
    ];
    for (size, w, h) in sizes {
        let doc = Document::new(Orientation::Portrait, Unit::Point, size).unwrap();
        assert!((doc.page_width() - w).abs() < 0.01, "{size:?}");
        assert!((doc.page_height() - h).abs() < 0.01, "{size:?}");
    }
}

#[test]
fn test_mixed_page_sizes() {
    let mut doc = uncompressed();
    doc.add_page().unwrap();
    doc.add_page_with(Some(Orientation::Landscape), Some(PageSize::A5), 0)
        .unwrap();
    doc.add_page().unwrap();
    let pdf = String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned();

    assert_eq!(pdf.matches("/MediaBox").count(), 2);
    assert!(pdf.contains("/MediaBox [0 0 595.28 420.94]"));
    assert!(pdf.contains("/MediaBox [0 0 595.28 841.89]"));
}

#[derive(Clone, Default)]
struct Report {
    log: Arc<Mutex<Vec<String>>>,
}

impl PageDecorator for Report {
    fn header(&mut self, doc: &mut Document) -> Result<()> {
        self.log.lock().unwrap().push(format!("header {}", doc.page_no()));
        doc.set_font("Helvetica", "B", 14.0)?;
        doc.cell(
            0.0,
            10.0,
            "Inventory",
            &CellOptions::new()
                .align(TextAlign::Center)
                .line_feed(LineFeed::NextLine),
        )
    }

    fn footer(&mut self, doc: &mut Document) -> Result<()> {
        self.log.lock().unwrap().push(format!("footer {}", doc.page_no()));
        doc.set_y(-15.0);
        doc.set_font("Helvetica", "I", 8.0)?;
        let label = format!("Page {}/{{nb}}", doc.page_no());
        doc.cell(0.0, 10.0, &label, &CellOptions::new().align(TextAlign::Center))
    }
}

#[test]
fn test_report_with_automatic_page_breaks() {
    let report = Report::default();
    let log = report.log.clone();

    let mut doc = uncompressed();
    doc.set_page_decorator(report);
    doc.alias_nb_pages(None);
    doc.add_page().unwrap();
    doc.set_font("Times", "", 12.0).unwrap();
    for i in 1..=60 {
        doc.cell(0.0, 10.0, &format!("Item {i}"), &CellOptions::new().line_feed(LineFeed::NextLine))
            .unwrap();
    }
    let pdf = String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned();
    let pages = doc.page_no();
    assert!(pages >= 3);

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 2 * pages);
    assert_eq!(log[0], "header 1");
    assert_eq!(log.last().unwrap(), &format!("footer {pages}"));

    assert_eq!(pdf.matches("(Inventory) Tj").count(), pages);
    assert!(pdf.contains(&format!("(Page 1/{pages}) Tj")));
    assert!(pdf.contains(&format!("(Page {pages}/{pages}) Tj")));
    assert!(pdf.contains("(Item 60) Tj"));
}

#[test]
fn test_multi_cell_paragraph_spans_pages() {
    let mut doc = uncompressed();
    doc.add_page().unwrap();
    doc.set_font("Courier", "", 12.0).unwrap();
    let paragraph = "lorem ipsum dolor sit amet ".repeat(200);
    doc.multi_cell(0.0, 6.0, &paragraph, &MultiCellOptions::new())
        .unwrap();
    assert!(doc.page_no() > 1);

    let pdf = doc.to_bytes().unwrap();
    assert!(count(&pdf, b" Tw") > 0);
    assert!(count(&pdf, b"0 Tw") > 0);
}

#[test]
fn test_output_destinations() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.pdf");

    let mut doc = Document::default();
    doc.set_title("Destinations");
    doc.add_page().unwrap();
    doc.save(&path).unwrap();
    let on_disk = std::fs::read(&path).unwrap();

    let returned = doc.output(Destination::ReturnBytes).unwrap().unwrap();
    assert_eq!(returned, on_disk);

    let mut response = HttpResponse::new();
    doc.output(Destination::Download {
        sink: &mut response,
        name: Some("report.pdf"),
    })
    .unwrap();
    assert_eq!(response.body(), on_disk.as_slice());
    assert_eq!(
        response.header("Content-Disposition"),
        Some("attachment; filename=\"report.pdf\"")
    );

    let err = doc
        .output(Destination::Inline {
            sink: &mut response,
            name: None,
        })
        .unwrap_err();
    assert!(matches!(err, PdfError::OutputStarted));
}
