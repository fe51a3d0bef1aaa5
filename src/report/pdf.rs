//! PDF composition with pdfium.
//!
//! pdfium is bound at runtime: an explicit path from [`PdfOptions`], then
//! `PDFIUM_LIB_PATH`, then the system library search path. All calls are
//! blocking; the service runs them under `spawn_blocking`.

use crate::error::AdvisorError;
use crate::report::layout::{paginate, Block, DrawOp, ReportLayout, Rgb, PAGE_HEIGHT, PAGE_WIDTH};
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Where to find libpdfium.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfOptions {
    /// Directory containing libpdfium, or the library file itself.
    pub library_path: Option<PathBuf>,
}

impl PdfOptions {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    /// Explicit path, else `PDFIUM_LIB_PATH`, else none.
    pub fn resolved_library_path(&self) -> Option<PathBuf> {
        self.library_path.clone().or_else(|| {
            std::env::var_os("PDFIUM_LIB_PATH")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
    }
}

fn pdf_err(context: &str) -> impl Fn(PdfiumError) -> AdvisorError + '_ {
    move |e| AdvisorError::Pdf(format!("{context}: {e:?}"))
}

/// Bind to libpdfium.
pub fn bind_pdfium(options: &PdfOptions) -> Result<Pdfium, AdvisorError> {
    let bindings = match options.resolved_library_path() {
        Some(path) => {
            let file = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            debug!("Binding pdfium from {}", file.display());
            Pdfium::bind_to_library(&file)
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(pdf_err("cannot bind libpdfium"))?;
    Ok(Pdfium::new(bindings))
}

fn color((r, g, b): Rgb) -> PdfColor {
    PdfColor::new(r, g, b, 255)
}

/// Compose `layout` into PDF bytes.
pub fn render_pdf(layout: &ReportLayout, options: &PdfOptions) -> Result<Vec<u8>, AdvisorError> {
    let start = Instant::now();
    let pages = paginate(layout);
    let pdfium = bind_pdfium(options)?;

    let mut document = pdfium
        .create_new_pdf()
        .map_err(pdf_err("cannot create document"))?;
    let regular = document.fonts_mut().helvetica();
    let bold = document.fonts_mut().helvetica_bold();

    for plan in &pages {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::from_points(
                PdfPoints::new(PAGE_WIDTH),
                PdfPoints::new(PAGE_HEIGHT),
            ))
            .map_err(pdf_err("cannot add page"))?;

        for op in &plan.ops {
            match op {
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                    stroke,
                } => {
                    page.objects_mut()
                        .create_path_object_rect(
                            PdfRect::new_from_values(*y, *x, y + height, x + width),
                            stroke.then(|| color((0, 0, 0))),
                            stroke.then(|| PdfPoints::new(1.0)),
                            fill.map(color),
                        )
                        .map_err(pdf_err("cannot draw table cell"))?;
                }
                DrawOp::Text {
                    x,
                    y,
                    text,
                    size,
                    bold: is_bold,
                    color: rgb,
                } => {
                    let font = if *is_bold { bold } else { regular };
                    let mut object = page
                        .objects_mut()
                        .create_text_object(
                            PdfPoints::new(*x),
                            PdfPoints::new(*y),
                            text,
                            font,
                            PdfPoints::new(*size),
                        )
                        .map_err(pdf_err("cannot draw text"))?;
                    if *rgb != (0, 0, 0) {
                        object
                            .set_fill_color(color(*rgb))
                            .map_err(pdf_err("cannot colour text"))?;
                    }
                }
                DrawOp::Image {
                    block,
                    x,
                    y,
                    width,
                    height,
                } => {
                    let Some(Block::Image { png, kind, .. }) = layout.blocks.get(*block) else {
                        return Err(AdvisorError::Internal(format!(
                            "page plan references block {block}, which is not an image"
                        )));
                    };
                    let image = image::load_from_memory(png).map_err(|e| {
                        AdvisorError::Pdf(format!("cannot decode {kind} chart: {e}"))
                    })?;
                    page.objects_mut()
                        .create_image_object(
                            PdfPoints::new(*x),
                            PdfPoints::new(*y),
                            &image,
                            Some(PdfPoints::new(*width)),
                            Some(PdfPoints::new(*height)),
                        )
                        .map_err(pdf_err("cannot place chart"))?;
                }
            }
        }
    }

    let bytes = document
        .save_to_bytes()
        .map_err(pdf_err("cannot serialise document"))?;
    info!(
        "Composed report: {} page(s), {} bytes in {:?}",
        pages.len(),
        bytes.len(),
        start.elapsed()
    );
    Ok(bytes)
}
