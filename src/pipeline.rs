//! Scan pipeline: rasterize, apply effects, re-encode, assemble
//!
//! Pages are processed one at a time in index order. The first failure on
//! any page aborts the run and nothing is written.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::RgbImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use crate::config::{ScanConfig, ScanOptions};
use crate::effects::{apply_stages, Stage};
use crate::error::{Error, Result};
use crate::pdf::{encode, DocumentAssembler, EncodedPage, PageSource, Rasterizer, ScannerMetadata};

/// Progress callback for the page loop
pub trait ProgressCallback: Send + Sync {
    /// Called before page `index` (zero-based) of `total` is rasterized
    fn on_page_start(&self, index: usize, total: usize);
    /// Called once page `index` has been added to the output
    fn on_page_complete(&self, index: usize, total: usize);
}

/// No-op progress callback (silent mode)
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_page_start(&self, _index: usize, _total: usize) {}
    fn on_page_complete(&self, _index: usize, _total: usize) {}
}

/// Shared flag for stopping a run between pages
///
/// Clones share the flag, so one can be handed to another thread while the
/// pipeline holds the other. A page already in progress always finishes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Pages written to the output
    pub page_count: usize,
    /// Info dictionary stamped onto the output
    pub metadata: ScannerMetadata,
}

/// The configured effect chain plus the per-page driver
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ScanConfig,
    stages: Vec<Stage>,
    cancel: CancelToken,
}

impl Pipeline {
    pub fn new(config: ScanConfig) -> Self {
        let stages = config.stages();
        Self {
            config,
            stages,
            cancel: CancelToken::new(),
        }
    }

    /// Stop runs of this pipeline when `token` is cancelled
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Enabled stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Handle for cancelling runs of this pipeline
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Random source for one run: seeded from the config, or from OS entropy
    pub fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Apply the effect chain to one rasterized page.
    pub fn process_page<R: Rng + ?Sized>(&self, image: RgbImage, rng: &mut R) -> RgbImage {
        apply_stages(&self.stages, image, rng)
    }

    /// Rasterize, transform and encode page `index` of `source`.
    pub fn render_page<S, R>(&self, source: &S, index: usize, rng: &mut R) -> Result<EncodedPage>
    where
        S: PageSource + ?Sized,
        R: Rng + ?Sized,
    {
        let raster = source.rasterize(index, self.config.dpi)?;
        let image = self.process_page(raster, rng);
        encode(&image, self.config.jpeg_quality)
    }

    /// Build the output document for every page of `source`.
    pub fn run<S, R>(&self, source: &S, rng: &mut R) -> Result<DocumentAssembler>
    where
        S: PageSource + ?Sized,
        R: Rng + ?Sized,
    {
        self.run_with_progress(source, rng, &SilentProgress)
    }

    /// Like [`run`](Self::run), reporting each page to `progress`.
    #[instrument(skip_all, fields(stages = self.stages.len(), dpi = self.config.dpi))]
    pub fn run_with_progress<S, R, P>(
        &self,
        source: &S,
        rng: &mut R,
        progress: &P,
    ) -> Result<DocumentAssembler>
    where
        S: PageSource + ?Sized,
        R: Rng + ?Sized,
        P: ProgressCallback + ?Sized,
    {
        let total = source.page_count();
        if total == 0 {
            return Err(Error::General("Input document has no pages".to_string()));
        }

        let mut assembler = DocumentAssembler::new();
        for index in 0..total {
            if self.cancel.is_cancelled() {
                info!(completed = index, total, "Run cancelled");
                return Err(Error::Cancelled { completed: index });
            }

            progress.on_page_start(index, total);
            let page = self
                .render_page(source, index, rng)
                .map_err(|e| e.at_page(index))?;
            debug!(page = index, bytes = page.data.len(), "Page ready");
            assembler.new_page(page).map_err(|e| e.at_page(index))?;
            progress.on_page_complete(index, total);

            info!(page = index + 1, total, "Page processed");
        }

        Ok(assembler)
    }

    /// Scan every page of `source` and write the result to `output`.
    pub fn scan_source<S, P>(&self, source: &S, output: &Path, progress: &P) -> Result<ScanReport>
    where
        S: PageSource + ?Sized,
        P: ProgressCallback + ?Sized,
    {
        let mut rng = self.rng();
        let mut assembler = self.run_with_progress(source, &mut rng, progress)?;

        let metadata = ScannerMetadata::synthesize(&self.config.scanner_name);
        assembler.attach_metadata(metadata.clone());

        let page_count = assembler.page_count();
        assembler.write(output)?;

        Ok(ScanReport {
            page_count,
            metadata,
        })
    }

    /// Scan the PDF at `input` and write the result to `output`.
    ///
    /// A missing input fails before the renderer is loaded, so no output is
    /// created.
    #[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
    pub fn scan_file<P>(&self, input: &Path, output: &Path, progress: &P) -> Result<ScanReport>
    where
        P: ProgressCallback + ?Sized,
    {
        if !input.exists() {
            return Err(Error::FileNotFound(input.to_path_buf()));
        }

        let rasterizer = Rasterizer::new()?;
        let source = rasterizer.open(input)?;
        let report = self.scan_source(&source, output, progress)?;

        info!(pages = report.page_count, "Scan complete");
        Ok(report)
    }
}

/// Convert `options.input_path` into a scanned-looking PDF at `options.output_path`
///
/// # Example
///
/// ```no_run
/// use pdf_scanify::{scan_pdf, ScanConfig, ScanOptions};
/// use std::path::PathBuf;
///
/// let options = ScanOptions {
///     input_path: PathBuf::from("report.pdf"),
///     output_path: PathBuf::from("report_scanned.pdf"),
///     config: ScanConfig::default(),
/// };
///
/// scan_pdf(&options).expect("Failed to scan");
/// ```
pub fn scan_pdf(options: &ScanOptions) -> Result<ScanReport> {
    Pipeline::new(options.config.clone()).scan_file(
        &options.input_path,
        &options.output_path,
        &SilentProgress,
    )
}
