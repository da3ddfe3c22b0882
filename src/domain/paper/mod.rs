//! Paper metadata domain module

mod doi;
mod metadata;

pub use doi::Doi;
pub use metadata::{PaperMetadata, MAX_LISTED_AUTHORS, UNKNOWN_TITLE};
