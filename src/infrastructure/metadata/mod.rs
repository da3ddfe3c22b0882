//! Paper metadata adapters

mod crossref;

pub use crossref::CrossrefClient;
