//! Multi-page inventory report with a running header, page-numbered footer
//! and a striped table that breaks across pages

use quire_pdf::{
    Border, BorderSides, CellOptions, Color, Document, LineFeed, MultiCellOptions, PageDecorator,
    Result, TextAlign,
};
use std::env;

struct ReportChrome {
    title: String,
}

impl PageDecorator for ReportChrome {
    fn header(&mut self, doc: &mut Document) -> Result<()> {
        doc.set_font("Helvetica", "B", 15.0)?;
        doc.cell(
            0.0,
            10.0,
            &self.title,
            &CellOptions::new()
                .border(Border::Sides(BorderSides::BOTTOM))
                .align(TextAlign::Center)
                .line_feed(LineFeed::NextLine),
        )?;
        doc.ln(Some(6.0));
        Ok(())
    }

    fn footer(&mut self, doc: &mut Document) -> Result<()> {
        doc.set_y(-15.0);
        doc.set_font("Helvetica", "I", 8.0)?;
        doc.set_text_color(Color::gray8(128))?;
        let label = format!("Page {}/{{nb}}", doc.page_no());
        doc.cell(0.0, 10.0, &label, &CellOptions::new().align(TextAlign::Center))
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let output_path = args.get(1).map(String::as_str).unwrap_or("inventory_report.pdf");

    println!("Creating inventory report: {output_path}");

    let mut doc = Document::default();
    doc.set_title("Warehouse inventory");
    doc.set_author("quire-pdf");
    doc.set_page_decorator(ReportChrome {
        title: "Warehouse inventory".to_string(),
    });
    doc.alias_nb_pages(None);
    doc.add_page()?;

    doc.set_font("Times", "", 11.0)?;
    doc.multi_cell(
        0.0,
        5.0,
        "Stock levels as counted at the end of the quarter. Items below their \
         reorder point are highlighted; quantities are in units, values in euro.",
        &MultiCellOptions::new(),
    )?;
    doc.ln(Some(4.0));

    let widths = [25.0, 85.0, 30.0, 40.0];
    let heading = ["SKU", "Description", "Qty", "Value"];

    doc.set_fill_color(Color::rgb8(30, 60, 110))?;
    doc.set_text_color(Color::white())?;
    doc.set_font("Helvetica", "B", 10.0)?;
    for (label, width) in heading.iter().zip(widths) {
        doc.cell(
            width,
            7.0,
            label,
            &CellOptions::new()
                .border(Border::Frame)
                .align(TextAlign::Center)
                .fill(true),
        )?;
    }
    doc.ln(None);

    doc.set_text_color(Color::black())?;
    doc.set_font("Helvetica", "", 9.0)?;
    for item in 1..=120u32 {
        let qty = (item * 37) % 250;
        let low = qty < 20;
        doc.set_fill_color(if low {
            Color::rgb8(250, 220, 210)
        } else if item % 2 == 0 {
            Color::gray8(240)
        } else {
            Color::white()
        })?;
        let row = CellOptions::new().border("LR".parse::<Border>()?).fill(true);
        doc.cell(widths[0], 6.0, &format!("SK-{item:04}"), &row)?;
        doc.cell(widths[1], 6.0, &format!("Storage bin, size {}", item % 7 + 1), &row)?;
        doc.cell(widths[2], 6.0, &qty.to_string(), &row.clone().align(TextAlign::Right))?;
        doc.cell(
            widths[3],
            6.0,
            &format!("{:.2} €", qty as f64 * 4.75),
            &row.clone().align(TextAlign::Right),
        )?;
        doc.ln(None);
    }
    let (x, y) = (doc.get_x(), doc.get_y());
    doc.line(x, y, x + widths.iter().sum::<f64>(), y)?;

    doc.save(output_path)?;
    println!("✓ Wrote {} pages to {output_path}", doc.page_no());
    Ok(())
}
