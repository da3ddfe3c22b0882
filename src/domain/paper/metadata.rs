//! Paper metadata value object

use serde::{Deserialize, Serialize};

/// Title used when the provider has none
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Authors shown before the list is truncated
pub const MAX_LISTED_AUTHORS: usize = 3;

/// Bibliographic record for one paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMetadata {
    pub title: String,
    /// "Given Family" names in publication order
    pub authors: Vec<String>,
    /// Container (journal) name, possibly empty
    pub journal: String,
    /// Year of record creation, 0 when unknown
    pub year: i32,
}

impl PaperMetadata {
    pub fn new(
        title: impl Into<String>,
        authors: Vec<String>,
        journal: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            title: title.into(),
            authors,
            journal: journal.into(),
            year,
        }
    }

    /// First three authors joined by ", ", with "..." appended when more exist
    pub fn authors_display(&self) -> String {
        let shown: Vec<&str> = self
            .authors
            .iter()
            .take(MAX_LISTED_AUTHORS)
            .map(String::as_str)
            .collect();
        let mut out = shown.join(", ");
        if self.authors.len() > MAX_LISTED_AUTHORS {
            out.push_str("...");
        }
        out
    }

    /// "<journal> (<year>)"
    pub fn journal_display(&self) -> String {
        format!("{} ({})", self.journal, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(authors: &[&str]) -> PaperMetadata {
        PaperMetadata::new(
            "Title",
            authors.iter().map(|a| a.to_string()).collect(),
            "Nature",
            2025,
        )
    }

    #[test]
    fn authors_display_three_or_fewer() {
        assert_eq!(paper(&["A B", "C D"]).authors_display(), "A B, C D");
        assert_eq!(
            paper(&["A B", "C D", "E F"]).authors_display(),
            "A B, C D, E F"
        );
    }

    #[test]
    fn authors_display_truncates() {
        let p = paper(&["A B", "C D", "E F", "G H"]);
        assert_eq!(p.authors_display(), "A B, C D, E F...");
    }

    #[test]
    fn authors_display_empty() {
        assert_eq!(paper(&[]).authors_display(), "");
    }

    #[test]
    fn journal_display_includes_year() {
        assert_eq!(paper(&[]).journal_display(), "Nature (2025)");
        let unknown = PaperMetadata::new(UNKNOWN_TITLE, vec![], "", 0);
        assert_eq!(unknown.journal_display(), " (0)");
    }
}
