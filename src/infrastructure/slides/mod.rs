//! Slide rendering adapters

mod pdftoppm;

pub use pdftoppm::{png_dimensions, PdftoppmRenderer};
