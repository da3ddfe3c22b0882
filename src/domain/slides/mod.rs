//! Slide deck domain module

mod deck;

pub use deck::{Slide, SlideDeck, DEFAULT_RENDER_SCALE, PDF_POINTS_PER_INCH};
