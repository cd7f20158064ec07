//! Page rasterization using PDFium

use std::path::{Path, PathBuf};

use image::RgbImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};

/// PDF user space units per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// A document whose pages can be turned into RGB rasters
///
/// The pipeline only sees this trait, so anything that can produce page
/// images (a PDFium document, an in-memory page list) can be scanned.
pub trait PageSource {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Render page `index` (zero-based) at `dpi`.
    ///
    /// The page's native size in points is scaled by `dpi / 72` in both axes.
    fn rasterize(&self, index: usize, dpi: u32) -> Result<RgbImage>;
}

/// Binding to the PDFium shared library
pub struct Rasterizer {
    pdfium: Pdfium,
}

impl Rasterizer {
    /// Bind to PDFium, trying the executable's directory, the working
    /// directory, then the system library path.
    pub fn new() -> Result<Self> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf));

        if let Some(dir) = exe_dir {
            if let Ok(bindings) =
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
            {
                return Ok(Self {
                    pdfium: Pdfium::new(bindings),
                });
            }
        }

        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| Error::RendererUnavailable(e.to_string()))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Open a PDF file for rasterization
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn open(&self, path: &Path) -> Result<PdfiumSource<'_>> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| Error::Open {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let source = PdfiumSource {
            document,
            path: path.to_path_buf(),
        };
        if source.page_count() == 0 {
            return Err(Error::EmptyPdf(source.path));
        }

        info!(pages = source.page_count(), "Input document opened");
        Ok(source)
    }
}

/// A PDF opened through PDFium
pub struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
    path: PathBuf,
}

impl PdfiumSource<'_> {
    /// Path the document was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PageSource for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn rasterize(&self, index: usize, dpi: u32) -> Result<RgbImage> {
        let render_error = |message: String| Error::Render {
            page: index,
            message,
        };

        let page_index = PdfPageIndex::try_from(index)
            .map_err(|_| render_error(format!("page index {} out of range", index)))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| render_error(e.to_string()))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / POINTS_PER_INCH);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| render_error(e.to_string()))?;

        let image = bitmap.as_image().to_rgb8();
        debug!(
            page = index,
            dpi,
            width = image.width(),
            height = image.height(),
            "Page rasterized"
        );
        Ok(image)
    }
}

/// Pixel dimensions of a page of `width_pt` x `height_pt` points at `dpi`.
pub fn raster_size(width_pt: f32, height_pt: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    (
        (width_pt * scale).round() as u32,
        (height_pt * scale).round() as u32,
    )
}
