//! Rendered slide deck

/// Zoom applied when rasterizing PDF pages, for crisp text and figures
pub const DEFAULT_RENDER_SCALE: f32 = 4.0;

/// PDF user space unit: 72 points per inch at 1.0x
pub const PDF_POINTS_PER_INCH: f32 = 72.0;

/// One rasterized page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// Zero-based page number
    pub index: usize,
    pub width: u32,
    pub height: u32,
    /// PNG-encoded image
    pub png: Vec<u8>,
}

/// Ordered pages of one PDF
#[derive(Debug, Clone, Default)]
pub struct SlideDeck {
    slides: Vec<Slide>,
}

impl SlideDeck {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Slide at `index`, clamped to the last slide
    pub fn get(&self, index: usize) -> Option<&Slide> {
        let last = self.slides.len().checked_sub(1)?;
        self.slides.get(index.min(last))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }

    /// Resolution used for a scale factor
    pub fn dpi_for_scale(scale: f32) -> u32 {
        (PDF_POINTS_PER_INCH * scale).round() as u32
    }
}
