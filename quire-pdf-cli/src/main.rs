use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quire_pdf::script::{run, RunOptions, Script};
use quire_pdf::{
    Border, CellOptions, Color, Document, DocumentConfig, ImagePlacement, LineFeed, LinkTarget,
    MultiCellOptions, Orientation, PageDecorator, PageSize, PaintStyle, TextAlign, Unit,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quirepdf",
    about = "Generate PDF documents from layout scripts and plain text",
    version,
    author
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON layout script
    Render {
        /// Layout script file
        script: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Typeset a plain-text file as wrapped paragraphs
    Text {
        /// Input text file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Core font family (Helvetica, Times, Courier, Arial)
        #[arg(short, long, default_value = "Times")]
        font: String,

        /// Font size in points
        #[arg(short, long, default_value_t = 12.0)]
        size: f64,

        /// Page orientation (P or L)
        #[arg(long, default_value = "P")]
        orientation: Orientation,

        /// Page size (a3, a4, a5, letter, legal)
        #[arg(long, default_value = "a4")]
        page_size: PageSize,

        /// Document title, also printed as a heading
        #[arg(short, long)]
        title: Option<String>,

        /// Don't justify paragraphs
        #[arg(long)]
        ragged: bool,
    },

    /// Create a single-page PDF with a line of text
    Create {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Text to include in the PDF
        #[arg(short, long)]
        text: String,
    },

    /// Generate a demo PDF showing cells, colors and links
    Demo {
        /// Output file path
        #[arg(short, long, default_value = "demo.pdf")]
        output: PathBuf,

        /// JPEG or PNG image to place on the first page
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render { script, output } => {
            let json = std::fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let parsed = Script::from_json(&json)?;
            let options = RunOptions {
                allow_files: true,
                base_dir: script.parent().map(Path::to_path_buf),
            };
            let mut doc = run(&parsed, &options)?;
            doc.save(&output)?;
            println!(
                "✓ Rendered {} page(s) to {}",
                doc.page_no(),
                output.display()
            );
        }

        Commands::Text {
            input,
            output,
            font,
            size,
            orientation,
            page_size,
            title,
            ragged,
        } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let config = DocumentConfig {
                orientation,
                page_size,
                title: title.clone(),
                creator: Some("quirepdf".to_string()),
                ..DocumentConfig::default()
            };
            let mut doc = typeset(&config, &text, &font, size, title.as_deref(), !ragged)?;
            doc.save(&output)?;
            println!(
                "✓ Typeset {} page(s) to {}",
                doc.page_no(),
                output.display()
            );
        }

        Commands::Create { output, text } => {
            let mut doc = Document::new(Orientation::Portrait, Unit::Point, PageSize::A4)?;
            doc.add_page()?;
            doc.set_font("Helvetica", "", 24.0)?;
            doc.text(50.0, 92.0, &text)?;
            doc.save(&output)?;

            println!("PDF created successfully!");
        }

        Commands::Demo { output, image } => {
            let mut doc = demo(image.as_deref())?;
            doc.save(&output)?;

            println!("Demo PDF created successfully!");
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "quire_pdf=debug,quirepdf=debug",
        _ => "quire_pdf=trace,quirepdf=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Centered page numbers in the bottom margin.
struct PageNumbers;

impl PageDecorator for PageNumbers {
    fn footer(&mut self, doc: &mut Document) -> quire_pdf::Result<()> {
        doc.set_y(-15.0);
        doc.set_font("Helvetica", "I", 8.0)?;
        let label = format!("{}/{{nb}}", doc.page_no());
        doc.cell(0.0, 10.0, &label, &CellOptions::new().align(TextAlign::Center))
    }
}

fn typeset(
    config: &DocumentConfig,
    text: &str,
    font: &str,
    size: f64,
    title: Option<&str>,
    justify: bool,
) -> Result<Document> {
    let mut doc = Document::with_config(config)?;
    doc.set_page_decorator(PageNumbers);
    doc.alias_nb_pages(None);
    doc.add_page()?;

    if let Some(title) = title {
        doc.set_font(font, "B", size * 1.5)?;
        doc.multi_cell(0.0, size * 0.7, title, &MultiCellOptions::new().align(TextAlign::Left))?;
        doc.ln(Some(size * 0.4));
    }

    doc.set_font(font, "", size)?;
    let align = if justify {
        TextAlign::Justified
    } else {
        TextAlign::Left
    };
    // leading of 1.2 em, in millimeters
    let line_height = size * 1.2 * 25.4 / 72.0;
    for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let joined = paragraph.lines().map(str::trim).collect::<Vec<_>>().join(" ");
        doc.multi_cell(0.0, line_height, &joined, &MultiCellOptions::new().align(align))?;
        doc.ln(Some(line_height / 2.0));
    }
    tracing::debug!(pages = doc.page_no(), "typeset text");
    Ok(doc)
}

fn demo(image: Option<&Path>) -> Result<Document> {
    let mut doc = Document::default();
    doc.set_title("quire-pdf Demo");
    doc.set_author("quirepdf");
    doc.set_page_decorator(PageNumbers);
    doc.alias_nb_pages(None);
    doc.add_page()?;

    doc.set_font("Helvetica", "B", 24.0)?;
    doc.cell(
        0.0,
        14.0,
        "quire-pdf Demo",
        &CellOptions::new()
            .align(TextAlign::Center)
            .line_feed(LineFeed::NextLine),
    )?;
    doc.ln(Some(4.0));

    // table header
    doc.set_font("Helvetica", "B", 11.0)?;
    doc.set_fill_color(Color::rgb8(40, 70, 120))?;
    doc.set_text_color(Color::gray(1.0))?;
    doc.set_draw_color(Color::rgb8(40, 70, 120))?;
    let widths = [30.0, 100.0, 40.0];
    for (label, w) in ["Tag", "Asset", "Status"].iter().zip(widths) {
        doc.cell(w, 8.0, label, &CellOptions::new().border(Border::Frame).fill(true))?;
    }
    doc.ln(None);

    doc.set_font("Helvetica", "", 10.0)?;
    doc.set_text_color(Color::black())?;
    let rows = [
        ("A-0001", "Forklift, electric", "Approved"),
        ("A-0002", "Laptop 14\"", "Pending"),
        ("A-0003", "Pallet scanner", "Retired"),
    ];
    for (i, (tag, asset, status)) in rows.iter().enumerate() {
        doc.set_fill_color(if i % 2 == 0 {
            Color::gray8(235)
        } else {
            Color::gray(1.0)
        })?;
        let sides: Border = "LR".parse()?;
        let row = CellOptions::new().border(sides).fill(true);
        doc.cell(widths[0], 7.0, tag, &row)?;
        doc.cell(widths[1], 7.0, asset, &row)?;
        doc.cell(widths[2], 7.0, status, &row.clone().align(TextAlign::Right))?;
        doc.ln(None);
    }
    let x = doc.get_x();
    let y = doc.get_y();
    doc.line(x, y, x + widths.iter().sum::<f64>(), y)?;
    doc.ln(Some(8.0));

    doc.set_font("Times", "", 12.0)?;
    let appendix = doc.add_link();
    doc.write(6.0, "Paragraphs flow across the page with ", None)?;
    doc.set_font("Times", "U", 12.0)?;
    doc.write(6.0, "internal links", Some(&LinkTarget::from(appendix)))?;
    doc.set_font("Times", "", 12.0)?;
    doc.write(6.0, " and ", None)?;
    doc.set_text_color(Color::rgb8(0, 0, 200))?;
    doc.write(6.0, "external ones", Some(&LinkTarget::from("https://www.rust-lang.org")))?;
    doc.set_text_color(Color::black())?;
    doc.write(6.0, ".", None)?;
    doc.ln(Some(12.0));

    doc.set_draw_color(Color::rgb(0.8, 0.1, 0.1))?;
    doc.set_line_width(0.8)?;
    doc.set_fill_color(Color::cmyk(0.0, 0.2, 0.8, 0.0))?;
    let y = doc.get_y();
    doc.rect(20.0, y, 50.0, 25.0, PaintStyle::FillStroke)?;
    doc.rect(80.0, y, 50.0, 25.0, PaintStyle::Stroke)?;
    doc.set_y(y + 30.0);

    if let Some(path) = image {
        doc.image(path, &ImagePlacement::new().size(60.0, 0.0))?;
    }

    doc.add_page()?;
    doc.set_link(appendix, Some(0.0), None)?;
    doc.set_font("Courier", "", 10.0)?;
    doc.multi_cell(
        0.0,
        5.0,
        "Appendix\n\nThis page is the target of the internal link on page 1.",
        &MultiCellOptions::new().border(Border::Frame).align(TextAlign::Left),
    )?;
    Ok(doc)
}
