//! Stored filename for a published trailer

use std::fmt;

use crate::domain::paper::PaperMetadata;

/// Characters of the journal label kept in the filename
pub const JOURNAL_CHARS: usize = 20;

/// Characters of the title kept in the filename
pub const TITLE_CHARS: usize = 30;

const UNKNOWN_TITLE: &str = "UnknownTitle";
const UNKNOWN_JOURNAL: &str = "UnknownJournal";

/// Strip the characters that never survive into a stored filename
pub fn normalize_user(user: &str) -> String {
    sanitize(user)
}

fn sanitize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '/' | '\\'))
        .collect()
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// `<user>_<journal>_<title>.webm` with spaces and path separators removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishName(String);

impl PublishName {
    pub fn build(user: &str, paper: Option<&PaperMetadata>) -> Self {
        let journal = paper
            .map(PaperMetadata::journal_display)
            .unwrap_or_else(|| UNKNOWN_JOURNAL.to_string());
        let title = paper
            .map(|p| p.title.clone())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let name = format!(
            "{}_{}_{}.webm",
            user,
            truncate_chars(&journal, JOURNAL_CHARS),
            truncate_chars(&title, TITLE_CHARS)
        );
        Self(sanitize(&name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublishName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
