//! Poppler `pdftoppm` slide renderer adapter

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;

use crate::application::ports::{SlideError, SlideRenderer};
use crate::domain::slides::{Slide, SlideDeck};

/// Magic bytes every PDF starts with
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Output prefix handed to pdftoppm; pages come back as `page-<n>.png`
const PAGE_PREFIX: &str = "page";

/// Renders PDF pages to PNG through poppler
pub struct PdftoppmRenderer {
    binary: String,
}

impl PdftoppmRenderer {
    pub fn new() -> Self {
        Self::with_binary("pdftoppm")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn build_args(dpi: u32, input: &Path, prefix: &Path) -> Vec<String> {
        vec![
            "-png".to_string(),
            "-r".to_string(),
            dpi.to_string(),
            input.to_string_lossy().to_string(),
            prefix.to_string_lossy().to_string(),
        ]
    }

    /// Page number of a `page-007.png` style name
    fn page_number(path: &Path) -> Option<usize> {
        let stem = path.file_stem()?.to_str()?;
        stem.strip_prefix(PAGE_PREFIX)?
            .trim_start_matches('-')
            .parse()
            .ok()
    }

    /// Rendered page files, in page order
    async fn collect_pages(dir: &Path) -> Result<Vec<PathBuf>, SlideError> {
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| SlideError::ReadFailed(e.to_string()))?;

        let mut pages = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SlideError::ReadFailed(e.to_string()))?
        {
            let path = entry.path();
            if let Some(number) = Self::page_number(&path) {
                pages.push((number, path));
            }
        }

        pages.sort_by_key(|(number, _)| *number);
        Ok(pages.into_iter().map(|(_, path)| path).collect())
    }
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Width and height from a PNG header
pub fn png_dimensions(data: &[u8]) -> Result<(u32, u32), SlideError> {
    let reader = png::Decoder::new(Cursor::new(data))
        .read_info()
        .map_err(|e| SlideError::ReadFailed(e.to_string()))?;
    let info = reader.info();
    Ok((info.width, info.height))
}

#[async_trait]
impl SlideRenderer for PdftoppmRenderer {
    async fn render(&self, pdf: &[u8], scale: f32) -> Result<SlideDeck, SlideError> {
        if !pdf.starts_with(PDF_MAGIC) {
            return Err(SlideError::InvalidPdf);
        }

        let workdir = tempfile::tempdir().map_err(|e| SlideError::RenderFailed(e.to_string()))?;
        let input = workdir.path().join("input.pdf");
        fs::write(&input, pdf)
            .await
            .map_err(|e| SlideError::RenderFailed(e.to_string()))?;

        let dpi = SlideDeck::dpi_for_scale(scale);
        let args = Self::build_args(dpi, &input, &workdir.path().join(PAGE_PREFIX));
        tracing::debug!(dpi, "rendering slides");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SlideError::RendererNotFound
                } else {
                    SlideError::RenderFailed(e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlideError::RenderFailed(
                stderr
                    .lines()
                    .last()
                    .unwrap_or("pdftoppm exited with an error")
                    .to_string(),
            ));
        }

        let mut slides = Vec::new();
        for (index, path) in Self::collect_pages(workdir.path()).await?.into_iter().enumerate() {
            let png = fs::read(&path)
                .await
                .map_err(|e| SlideError::ReadFailed(e.to_string()))?;
            let (width, height) = png_dimensions(&png)?;
            slides.push(Slide {
                index,
                width,
                height,
                png,
            });
        }

        tracing::info!(pages = slides.len(), "slides rendered");
        Ok(SlideDeck::new(slides))
    }
}
