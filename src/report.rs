//! PDF report: summary of the loaded dataset followed by one section per
//! displayed chart.
//!
//! Text is set in the built-in Helvetica font, which only covers Latin-1;
//! anything outside it is replaced with `?`. A chart that fails to rasterize
//! loses its image but keeps its heading, and the report is still written.
use crate::chart::{ChartSpec, ChartType};
use crate::dataset::Dataset;
use crate::error::{DashError, Result};
use crate::stats::dataset_summary;
use crate::storage::timestamped_path;
use crate::viz;
use chrono::Local;
use log::{info, warn};
use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use std::path::{Path, PathBuf};

pub const REPORT_TITLE: &str = "Global Economic Dashboard Report";
pub const DATA_SOURCE: &str = "Data source: World Bank Open Data API";
pub const SUMMARY_HEADING: &str = "Data Summary";

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 20.0;
const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN;
const CONTENT_H: f32 = PAGE_H - 2.0 * MARGIN;
const PT_TO_MM: f32 = 0.3528;

/// One displayed chart: which indicator, drawn how.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSection {
    pub indicator: String,
    pub chart_type: ChartType,
    pub spec: ChartSpec,
}

/// Pixel size charts are rasterized at before being placed on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: viz::CHART_WIDTH,
            height: viz::CHART_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfExport {
    pub path: PathBuf,
    /// Indicators whose chart image had to be left out.
    pub omitted_images: Vec<String>,
}

/// Replace every character the built-in fonts cannot encode with `?`.
pub fn sanitize_latin1(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            ' '..='~' | '\u{A0}'..='\u{FF}' => c,
            _ => '?',
        })
        .collect()
}

/// Vertical flow of text and images across A4 pages.
struct Composer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Distance of the next baseline from the bottom edge, in mm.
    y: f32,
    pages: usize,
}

impl Composer {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_H - MARGIN,
            pages: 1,
        })
    }

    /// Start a new page unless `needed_mm` still fits above the bottom margin.
    fn ensure_space(&mut self, needed_mm: f32) {
        if self.y - needed_mm >= MARGIN {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_W),
            Mm(PAGE_H),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_H - MARGIN;
    }

    fn line(&mut self, text: &str, size_pt: f32, bold: bool) {
        let height = size_pt * PT_TO_MM * 1.4;
        self.ensure_space(height);
        self.y -= size_pt * PT_TO_MM;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(sanitize_latin1(text), size_pt, Mm(MARGIN), Mm(self.y), font);
        self.y -= height - size_pt * PT_TO_MM;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    /// Place an RGB8 buffer scaled to the content width.
    fn image(&mut self, rgb: Vec<u8>, size: ImageSize) -> Result<()> {
        let buffer = RgbImage::from_raw(size.width, size.height, rgb)
            .ok_or_else(|| DashError::Pdf("image buffer does not match its size".into()))?;
        let (dpi, height_mm) = image_fit(size);
        self.ensure_space(height_mm);
        self.y -= height_mm;
        Image::from_dynamic_image(&DynamicImage::ImageRgb8(buffer)).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(self.y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc.save_to_bytes().map_err(pdf_err)
    }
}

fn chart_type_line(t: ChartType) -> String {
    format!("Chart Type: {}", t.label())
}

/// DPI that scales `size` to the content width, lowered further when the
/// result would be taller than one page of content. Returns `(dpi, height_mm)`.
fn image_fit(size: ImageSize) -> (f32, f32) {
    let mm_per_px = (CONTENT_W / size.width as f32).min(CONTENT_H / size.height as f32);
    (25.4 / mm_per_px, size.height as f32 * mm_per_px)
}

fn pdf_err(e: printpdf::Error) -> DashError {
    DashError::Pdf(e.to_string())
}

/// Compose the report in memory.
///
/// Returns the PDF bytes and the indicators whose image was omitted.
pub fn build_pdf(ds: &Dataset, charts: &[ChartSection], size: ImageSize) -> Result<(Vec<u8>, Vec<String>)> {
    let mut c = Composer::new(REPORT_TITLE)?;
    c.line(REPORT_TITLE, 20.0, true);
    c.line(
        &format!("Generated on: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
        10.0,
        false,
    );
    c.gap(6.0);

    let summary = dataset_summary(ds);
    c.line(SUMMARY_HEADING, 14.0, true);
    c.line(&format!("Total data points: {}", summary.rows), 11.0, false);
    c.line(&format!("Countries analyzed: {}", summary.countries), 11.0, false);
    c.line(&format!("Economic indicators: {}", summary.indicators), 11.0, false);
    c.line(&format!("Time period: {}", summary.time_period()), 11.0, false);
    c.line(&format!("Latest data year: {}", summary.latest_year()), 11.0, false);
    c.gap(6.0);

    let mut omitted = Vec::new();
    if !charts.is_empty() {
        c.line("Visual Analysis", 14.0, true);
        for (i, chart) in charts.iter().enumerate() {
            c.gap(4.0);
            c.line(&format!("{}. {}", i + 1, chart.indicator), 12.0, true);
            c.line(&chart_type_line(chart.chart_type), 10.0, false);
            match viz::rasterize(&chart.spec, size.width, size.height) {
                Ok(rgb) => c.image(rgb, size)?,
                Err(e) => {
                    warn!("chart image for '{}' omitted: {}", chart.indicator, e);
                    c.line("(chart image unavailable)", 10.0, false);
                    omitted.push(chart.indicator.clone());
                }
            }
        }
    }

    c.gap(8.0);
    c.line(DATA_SOURCE, 8.0, false);
    Ok((c.finish()?, omitted))
}

/// Write the report under `dir` and return where it went.
pub fn export_pdf<P: AsRef<Path>>(
    ds: &Dataset,
    charts: &[ChartSection],
    dir: P,
    size: ImageSize,
) -> Result<PdfExport> {
    let (bytes, omitted_images) = build_pdf(ds, charts, size)?;
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = timestamped_path(dir, "economic_report", "pdf");
    std::fs::write(&path, bytes)?;
    let path = path.canonicalize()?;
    info!(
        "report with {} charts written to {}",
        charts.len(),
        path.display()
    );
    Ok(PdfExport {
        path,
        omitted_images,
    })
}
