//! Document serializer.
//!
//! The body is laid out in an [`ObjectArena`] first, then written in one
//! forward pass that records each object's byte span. Object numbers:
//! 1 is the page tree root, 2 the shared resource dictionary, then a page and
//! its content stream for every page, fonts, images (each followed by its soft
//! mask or palette), the info dictionary and the catalog.

use crate::annotations::{LinkDestination, LinkId, LinkTarget};
use crate::config::{Layout, Zoom};
use crate::document::Document;
use crate::error::Result;
use crate::graphics::{ColorSpace, Image};
use crate::objects::{Dictionary, Object, ObjectArena, ObjectId, Stream};
use crate::text::{escape, text_string};
use chrono::{DateTime, Offset, TimeZone};
use std::io::Write;

pub struct PdfWriter<W: Write> {
    writer: W,
    current_position: u64,
}

/// Object numbers the trailer points at.
#[derive(Debug, Clone, Copy)]
struct Body {
    catalog: ObjectId,
    info: ObjectId,
}

impl<W: Write> PdfWriter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self {
            writer,
            current_position: 0,
        }
    }

    /// Writes the whole file. Image payloads are moved out of the document
    /// and released as soon as they are written.
    pub fn write_document(&mut self, document: &mut Document) -> Result<()> {
        let with_alpha = document.images.iter().any(|r| r.image.has_alpha());
        let version = if with_alpha { "1.4" } else { "1.3" };
        tracing::debug!(
            pages = document.pages.len(),
            fonts = document.fonts.len(),
            images = document.images.len(),
            version,
            "writing document"
        );

        let mut arena = ObjectArena::new();
        let body = build_body(document, &mut arena, with_alpha)?;

        self.write_header(version)?;
        for id in arena.ids() {
            let object = arena.take(id)?;
            let start = self.current_position;
            self.write_object(id, &object)?;
            arena.set_span(id, start..self.current_position)?;
        }

        let xref_position = self.current_position;
        self.write_xref(&arena.offsets()?)?;
        self.write_trailer(arena.len(), body.catalog, body.info, xref_position)?;
        self.writer.flush()?;

        tracing::debug!(
            objects = arena.len(),
            bytes = self.current_position,
            "document written"
        );
        Ok(())
    }

    fn write_header(&mut self, version: &str) -> Result<()> {
        self.write_bytes(format!("%PDF-{version}\n").as_bytes())?;
        // Binary comment to ensure file is treated as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        Ok(())
    }

    fn write_object(&mut self, id: ObjectId, object: &Object) -> Result<()> {
        tracing::trace!(object = id.number(), "writing object");
        let header = format!("{} {} obj\n", id.number(), id.generation());
        self.write_bytes(header.as_bytes())?;

        self.write_object_value(object)?;

        self.write_bytes(b"\nendobj\n")?;
        Ok(())
    }

    fn write_object_value(&mut self, object: &Object) -> Result<()> {
        match object {
            Object::Null => self.write_bytes(b"null")?,
            Object::Boolean(b) => self.write_bytes(if *b { b"true" } else { b"false" })?,
            Object::Integer(i) => self.write_bytes(i.to_string().as_bytes())?,
            Object::Real(f) => self.write_bytes(format_real(*f).as_bytes())?,
            Object::String(s) => {
                self.write_bytes(b"(")?;
                self.write_bytes(&escape(s))?;
                self.write_bytes(b")")?;
            }
            Object::Name(n) => {
                self.write_bytes(b"/")?;
                self.write_bytes(n.as_bytes())?;
            }
            Object::Array(arr) => {
                self.write_bytes(b"[")?;
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        self.write_bytes(b" ")?;
                    }
                    self.write_object_value(obj)?;
                }
                self.write_bytes(b"]")?;
            }
            Object::Dictionary(dict) => self.write_dictionary(dict)?,
            Object::Stream(dict, data) => {
                self.write_dictionary(dict)?;
                self.write_bytes(b"\nstream\n")?;
                self.write_bytes(data)?;
                self.write_bytes(b"\nendstream")?;
            }
            Object::Reference(id) => {
                let ref_str = format!("{} {} R", id.number(), id.generation());
                self.write_bytes(ref_str.as_bytes())?;
            }
        }
        Ok(())
    }

    fn write_dictionary(&mut self, dict: &Dictionary) -> Result<()> {
        self.write_bytes(b"<<")?;
        for (key, value) in dict.iter() {
            self.write_bytes(b"\n/")?;
            self.write_bytes(key.as_bytes())?;
            self.write_bytes(b" ")?;
            self.write_object_value(value)?;
        }
        self.write_bytes(b"\n>>")?;
        Ok(())
    }

    /// One subsection from object 0; `offsets[i]` belongs to object `i + 1`.
    fn write_xref(&mut self, offsets: &[u64]) -> Result<()> {
        self.write_bytes(b"xref\n")?;
        self.write_bytes(format!("0 {}\n", offsets.len() + 1).as_bytes())?;
        self.write_bytes(b"0000000000 65535 f \n")?;
        for offset in offsets {
            let entry = format!("{offset:010} 00000 n \n");
            self.write_bytes(entry.as_bytes())?;
        }
        Ok(())
    }

    fn write_trailer(
        &mut self,
        object_count: usize,
        catalog_id: ObjectId,
        info_id: ObjectId,
        xref_position: u64,
    ) -> Result<()> {
        let trailer = Dictionary::new()
            .with("Size", object_count + 1)
            .with("Root", catalog_id)
            .with("Info", info_id);

        self.write_bytes(b"trailer\n")?;
        self.write_dictionary(&trailer)?;
        self.write_bytes(b"\nstartxref\n")?;
        self.write_bytes(xref_position.to_string().as_bytes())?;
        self.write_bytes(b"\n%%EOF\n")?;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.current_position += data.len() as u64;
        Ok(())
    }
}

fn build_body(document: &mut Document, arena: &mut ObjectArena, with_alpha: bool) -> Result<Body> {
    let pages_id = arena.reserve();
    let resources_id = arena.reserve();
    let page_ids: Vec<(ObjectId, ObjectId)> = document
        .pages
        .iter()
        .map(|_| (arena.reserve(), arena.reserve()))
        .collect();

    let page_count = document.pages.len().to_string();
    for (page, &(page_id, content_id)) in document.pages.iter().zip(&page_ids) {
        let mut dict = Dictionary::new()
            .with("Type", Object::name("Page"))
            .with("Parent", pages_id);
        if let Some((width, height)) = page.media_box() {
            dict.set("MediaBox", media_box(width, height));
        }
        if page.rotation() != 0 {
            dict.set("Rotate", page.rotation() as i64);
        }
        dict.set("Resources", resources_id);

        let annots: Vec<Object> = page
            .links()
            .iter()
            .filter_map(|link| {
                let destination = match &link.target {
                    LinkTarget::Internal(id) => {
                        let resolved = resolve_destination(document, &page_ids, *id);
                        if resolved.is_none() {
                            tracing::warn!(link = id.get(), "internal link has no destination, skipped");
                        }
                        resolved
                    }
                    LinkTarget::Uri(_) => None,
                };
                link.to_annotation(destination).map(Object::Dictionary)
            })
            .collect();
        if !annots.is_empty() {
            dict.set("Annots", annots);
        }
        if with_alpha {
            dict.set(
                "Group",
                Dictionary::new()
                    .with("Type", Object::name("Group"))
                    .with("S", Object::name("Transparency"))
                    .with("CS", Object::name("DeviceRGB")),
            );
        }
        dict.set("Contents", content_id);
        arena.fill(page_id, Object::Dictionary(dict))?;

        let content = match &document.nb_pages_alias {
            Some(alias) => page.content_with_alias(alias, &page_count),
            None => page.content().to_vec(),
        };
        arena.fill(content_id, stream_object(content, document.compression)?)?;
    }

    let (width, height) = document.default_page_points();
    let kids: Vec<Object> = page_ids.iter().map(|(p, _)| Object::Reference(*p)).collect();
    arena.fill(
        pages_id,
        Object::Dictionary(
            Dictionary::new()
                .with("Type", Object::name("Pages"))
                .with("Kids", kids)
                .with("Count", page_ids.len())
                .with("MediaBox", media_box(width, height)),
        ),
    )?;

    let mut fonts = Dictionary::new();
    for (index, font) in document.fonts.iter() {
        let mut dict = Dictionary::new()
            .with("Type", Object::name("Font"))
            .with("BaseFont", Object::name(font.pdf_name()))
            .with("Subtype", Object::name("Type1"));
        if !font.is_symbolic() {
            dict.set("Encoding", Object::name("WinAnsiEncoding"));
        }
        let id = arena.push(Object::Dictionary(dict));
        fonts.set(format!("F{index}"), id);
    }

    let mut xobjects = Dictionary::new();
    let compression = document.compression;
    for registered in document.images.iter_mut() {
        let id = push_image(arena, &mut registered.image, compression)?;
        xobjects.set(format!("I{}", registered.index), id);
    }

    let procset: Vec<Object> = ["PDF", "Text", "ImageB", "ImageC", "ImageI"]
        .iter()
        .map(|&n| Object::name(n))
        .collect();
    let mut resources = Dictionary::new()
        .with("ProcSet", procset)
        .with("Font", fonts);
    if !xobjects.is_empty() {
        resources.set("XObject", xobjects);
    }
    arena.fill(resources_id, Object::Dictionary(resources))?;

    let info = arena.push(Object::Dictionary(info_dictionary(document)));
    let catalog = arena.push(Object::Dictionary(catalog_dictionary(
        document,
        pages_id,
        page_ids.first().map(|(p, _)| *p),
    )));

    Ok(Body { catalog, info })
}

fn resolve_destination(
    document: &Document,
    page_ids: &[(ObjectId, ObjectId)],
    link: LinkId,
) -> Option<Object> {
    let destination = document.links.get(link.get().checked_sub(1)?)?.as_ref()?;
    let index = destination.page.checked_sub(1)?;
    let (page_id, _) = page_ids.get(index)?;
    let page = document.pages.get(index)?;
    Some(LinkDestination::to_array(
        *page_id,
        page.height() - destination.y * document.scale_factor(),
    ))
}

/// Pushes an image XObject followed by its soft mask or palette.
fn push_image(arena: &mut ObjectArena, image: &mut Image, compression: bool) -> Result<ObjectId> {
    let id = arena.reserve();
    let dict = if let Some(mask) = image.soft_mask.as_deref_mut() {
        let mask_id = push_image(arena, mask, compression)?;
        image.xobject_dictionary(Some(mask_id))
    } else if image.color_space == ColorSpace::Indexed {
        let palette_id = arena.reserve();
        let dict = image.xobject_dictionary(Some(palette_id));
        let palette = std::mem::take(&mut image.palette);
        arena.fill(palette_id, stream_object(palette, compression)?)?;
        dict
    } else {
        image.xobject_dictionary(None)
    };

    let data = std::mem::take(&mut image.data);
    arena.fill(id, Stream::with_dictionary(dict, data).into_object())?;
    Ok(id)
}

fn stream_object(data: Vec<u8>, compression: bool) -> Result<Object> {
    let mut stream = Stream::new(data);
    if compression {
        stream.compress_flate()?;
    }
    Ok(stream.into_object())
}

fn info_dictionary(document: &Document) -> Dictionary {
    let metadata = &document.metadata;
    let mut info = Dictionary::new().with("Producer", text_string(&metadata.producer));
    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Keywords", &metadata.keywords),
        ("Creator", &metadata.creator),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            info.set(key, text_string(value));
        }
    }
    info.set(
        "CreationDate",
        format_pdf_date(&metadata.creation_date).into_bytes(),
    );
    info
}

fn catalog_dictionary(
    document: &Document,
    pages_id: ObjectId,
    first_page: Option<ObjectId>,
) -> Dictionary {
    let mut catalog = Dictionary::new()
        .with("Type", Object::name("Catalog"))
        .with("Pages", pages_id);

    if let Some(first) = first_page {
        let page = Object::Reference(first);
        let action = match document.display.zoom {
            Zoom::Default => None,
            Zoom::FullPage => Some(vec![page, Object::name("Fit")]),
            Zoom::FullWidth => Some(vec![page, Object::name("FitH"), Object::Null]),
            Zoom::Real => Some(vec![
                page,
                Object::name("XYZ"),
                Object::Null,
                Object::Null,
                Object::Integer(1),
            ]),
            Zoom::Percent(percent) => Some(vec![
                page,
                Object::name("XYZ"),
                Object::Null,
                Object::Null,
                Object::Real(percent / 100.0),
            ]),
        };
        if let Some(action) = action {
            catalog.set("OpenAction", action);
        }
    }

    let layout = match document.display.layout {
        Layout::Default => None,
        Layout::Single => Some("SinglePage"),
        Layout::Continuous => Some("OneColumn"),
        Layout::Two => Some("TwoColumnLeft"),
    };
    if let Some(layout) = layout {
        catalog.set("PageLayout", Object::name(layout));
    }
    catalog
}

fn media_box(width: f64, height: f64) -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(round_points(width)),
        Object::Real(round_points(height)),
    ]
}

fn round_points(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn format_real(value: f64) -> String {
    let formatted = format!("{value:.6}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Formats a date as a PDF date string (D:YYYYMMDDHHmmSS+HH'mm')
fn format_pdf_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let offset = date.offset().fix().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let minutes = offset.abs() / 60;
    format!(
        "{}{}{:02}'{:02}'",
        date.format("D:%Y%m%d%H%M%S"),
        sign,
        minutes / 60,
        minutes % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression;
    use crate::config::{DisplayMode, Orientation, PageSize, Unit};
    use crate::document::CellOptions;
    use chrono::{FixedOffset, Local};
    use std::io::{self, ErrorKind};

    fn render(doc: &mut Document) -> Vec<u8> {
        doc.to_bytes().unwrap()
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn xref_offsets(pdf: &[u8]) -> Vec<usize> {
        let start = find(pdf, b"xref\n").unwrap();
        let text = String::from_utf8_lossy(&pdf[start..]).into_owned();
        text.lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect()
    }

    #[test]
    fn test_pdf_writer_new_with_writer() {
        let buffer = Vec::new();
        let writer = PdfWriter::new_with_writer(buffer);
        assert_eq!(writer.current_position, 0);
    }

    #[test]
    fn test_write_header() {
        let mut buffer = Vec::new();
        {
            let mut writer = PdfWriter::new_with_writer(&mut buffer);
            writer.write_header("1.3").unwrap();
        }
        assert!(buffer.starts_with(b"%PDF-1.3\n"));
        assert_eq!(buffer.len(), 15);
    }

    #[test]
    fn test_write_object() {
        let mut buffer = Vec::new();
        {
            let mut writer = PdfWriter::new_with_writer(&mut buffer);
            let dict = Dictionary::new()
                .with("Type", Object::name("Font"))
                .with("Widths", vec![Object::Integer(1), Object::Real(0.5)]);
            writer
                .write_object(ObjectId::new(3, 0), &Object::Dictionary(dict))
                .unwrap();
        }
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "3 0 obj\n<<\n/Type /Font\n/Widths [1 0.5]\n>>\nendobj\n"
        );
    }

    #[test]
    fn test_write_string_is_escaped() {
        let mut buffer = Vec::new();
        {
            let mut writer = PdfWriter::new_with_writer(&mut buffer);
            writer
                .write_object_value(&Object::String(b"a(b)\\c".to_vec()))
                .unwrap();
        }
        assert_eq!(buffer, b"(a\\(b\\)\\\\c)".to_vec());
    }

    #[test]
    fn test_write_stream() {
        let mut buffer = Vec::new();
        {
            let mut writer = PdfWriter::new_with_writer(&mut buffer);
            let stream = Stream::new(b"2 J".to_vec()).into_object();
            writer.write_object_value(&stream).unwrap();
        }
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "<<\n/Length 3\n>>\nstream\n2 J\nendstream"
        );
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(612.0), "612");
        assert_eq!(format_real(595.28), "595.28");
        assert_eq!(format_real(0.0), "0");
        assert_eq!(format_real(-0.0), "0");
        assert_eq!(format_real(-1.5), "-1.5");
        assert_eq!(format_real(1.0 / 3.0), "0.333333");
    }

    #[test]
    fn test_write_xref() {
        let mut buffer = Vec::new();
        {
            let mut writer = PdfWriter::new_with_writer(&mut buffer);
            writer.write_xref(&[15, 120]).unwrap();
        }
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "xref\n0 3\n0000000000 65535 f \n0000000015 00000 n \n0000000120 00000 n \n"
        );
    }

    #[test]
    fn test_write_trailer() {
        let mut buffer = Vec::new();
        {
            let mut writer = PdfWriter::new_with_writer(&mut buffer);
            writer
                .write_trailer(7, ObjectId::new(7, 0), ObjectId::new(6, 0), 1234)
                .unwrap();
        }
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "trailer\n<<\n/Size 8\n/Root 7 0 R\n/Info 6 0 R\n>>\nstartxref\n1234\n%%EOF\n"
        );
    }

    #[test]
    fn test_format_pdf_date() {
        let date = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 15, 14, 30, 45)
            .unwrap();
        assert_eq!(format_pdf_date(&date), "D:20240115143045+02'00'");

        let west = FixedOffset::west_opt(5 * 3600 + 30 * 60)
            .unwrap()
            .with_ymd_and_hms(2023, 12, 31, 23, 59, 59)
            .unwrap();
        assert_eq!(format_pdf_date(&west), "D:20231231235959-05'30'");

        assert!(format_pdf_date(&Local::now()).starts_with("D:"));
    }

    #[test]
    fn test_object_layout_and_offsets() {
        let mut doc = Document::default();
        doc.set_font("Helvetica", "", 12.0).unwrap();
        doc.add_page().unwrap();
        doc.add_page().unwrap();
        let pdf = render(&mut doc);

        // pages root, resources, two page/content pairs, font, info, catalog
        let offsets = xref_offsets(&pdf);
        assert_eq!(offsets.len(), 2 + 2 * 2 + 3);
        for (i, offset) in offsets.iter().enumerate() {
            let marker = format!("{} 0 obj", i + 1);
            assert_eq!(&pdf[*offset..*offset + marker.len()], marker.as_bytes());
        }

        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("/Size 10\n/Root 9 0 R\n/Info 8 0 R"));
        assert!(text.contains("/Kids [3 0 R 5 0 R]\n/Count 2\n/MediaBox [0 0 595.28 841.89]"));
        assert!(text.contains("/BaseFont /Helvetica\n/Subtype /Type1\n/Encoding /WinAnsiEncoding"));

        let startxref = find(&pdf, b"startxref\n").unwrap();
        let declared: usize = String::from_utf8_lossy(&pdf[startxref + 10..])
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(&pdf[declared..declared + 4], b"xref");
    }

    #[test]
    fn test_page_dictionary_entries() {
        let mut doc = Document::default();
        doc.set_compression(false);
        doc.add_page().unwrap();
        doc.add_page_with(Some(Orientation::Landscape), None, 90)
            .unwrap();
        let pdf = String::from_utf8_lossy(&render(&mut doc)).into_owned();

        let first = pdf.find("3 0 obj").unwrap();
        let second = pdf.find("5 0 obj").unwrap();
        assert!(!pdf[first..second].contains("/MediaBox"));
        assert!(pdf[second..].contains("/MediaBox [0 0 841.89 595.28]\n/Rotate 90"));
        assert!(pdf.contains("4 0 obj\n<<\n/Length 11\n>>\nstream\n2 J\n0.57 w\n\nendstream"));
    }

    #[test]
    fn test_content_streams_are_compressed() {
        let mut doc = Document::default();
        doc.add_page().unwrap();
        let pdf = render(&mut doc);
        let start = find(&pdf, b"4 0 obj\n").unwrap();
        let text = String::from_utf8_lossy(&pdf[start..]).into_owned();
        assert!(text.contains("/Filter /FlateDecode"));

        let data_start = start + find(&pdf[start..], b"stream\n").unwrap() + 7;
        let data_end = start + find(&pdf[start..], b"\nendstream").unwrap();
        let inflated = compression::decompress(&pdf[data_start..data_end]).unwrap();
        assert_eq!(inflated, b"2 J\n0.57 w\n".to_vec());
    }

    #[test]
    fn test_alias_nb_pages() {
        let mut doc = Document::default();
        doc.set_compression(false);
        doc.alias_nb_pages(None);
        doc.set_font("Courier", "", 10.0).unwrap();
        for _ in 0..3 {
            doc.add_page().unwrap();
            doc.cell(0.0, 10.0, "Page of {nb}", &CellOptions::new())
                .unwrap();
        }
        let pdf = String::from_utf8_lossy(&render(&mut doc)).into_owned();
        assert_eq!(pdf.matches("(Page of 3)").count(), 3);
        assert!(!pdf.contains("{nb}"));
    }

    #[test]
    fn test_metadata_and_catalog() {
        let mut doc = Document::default();
        doc.set_title("Ünïcode");
        doc.set_author("Ops");
        doc.set_display_mode(DisplayMode::new(Zoom::FullPage, Layout::Continuous));
        let pdf = render(&mut doc);
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("/Author (Ops)"));
        assert!(text.contains("/Producer (quire-pdf "));
        assert!(text.contains("/CreationDate (D:"));
        assert!(find(&pdf, b"/Title (\xFE\xFF\x00\xDC").is_some());
        assert!(text.contains("/OpenAction [3 0 R /Fit]"));
        assert!(text.contains("/PageLayout /OneColumn"));
    }

    #[test]
    fn test_all_info_fields() {
        let mut doc = Document::default();
        doc.set_subject("Stock count");
        doc.set_keywords("inventory, q3");
        doc.set_creator("warehouse-app");
        doc.set_producer("custom producer");
        let date = Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        doc.set_creation_date(date);
        let text = String::from_utf8_lossy(&render(&mut doc)).into_owned();
        assert!(text.contains("/Subject (Stock count)"));
        assert!(text.contains("/Keywords (inventory, q3)"));
        assert!(text.contains("/Creator (warehouse-app)"));
        assert!(text.contains("/Producer (custom producer)"));
        assert!(text.contains("/CreationDate (D:20240506070809"));
        assert!(!text.contains("/Title"));
    }

    #[test]
    fn test_links_become_annotations() {
        let mut doc = Document::new(Orientation::Portrait, Unit::Point, PageSize::A4).unwrap();
        doc.set_compression(false);
        doc.add_page().unwrap();
        let target = doc.add_link();
        let dangling = doc.add_link();
        doc.link(10.0, 10.0, 50.0, 10.0, "https://example.com").unwrap();
        doc.link(10.0, 30.0, 50.0, 10.0, target).unwrap();
        doc.link(10.0, 50.0, 50.0, 10.0, dangling).unwrap();
        doc.add_page().unwrap();
        doc.set_link(target, Some(100.0), None).unwrap();
        let pdf = String::from_utf8_lossy(&render(&mut doc)).into_owned();

        assert_eq!(pdf.matches("/Subtype /Link").count(), 2);
        assert!(pdf.contains("/Rect [10 831.89 60 821.89]"));
        assert!(pdf.contains("/URI (https://example.com)"));
        assert!(pdf.contains("/Dest [5 0 R /XYZ 0 741.89 null]"));
    }

    struct FailingWriter {
        fail_after: usize,
        written: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written >= self.fail_after {
                return Err(io::Error::new(ErrorKind::PermissionDenied, "Simulated write error"));
            }
            self.written += buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        for fail_after in [0, 5, 200] {
            let mut doc = Document::default();
            doc.add_page().unwrap();
            let mut writer = PdfWriter::new_with_writer(FailingWriter {
                fail_after,
                written: 0,
            });
            let err = writer.write_document(&mut doc).unwrap_err();
            assert!(matches!(err, crate::error::PdfError::Io(_)));
        }
    }
}
