//! Feed entry parsed from a stored filename

/// Extensions listed in the feed
pub const VIDEO_EXTENSIONS: &[&str] = &[".webm", ".mp4"];

/// Journal label shown when the filename carries none
pub const DEFAULT_JOURNAL_LABEL: &str = "Research";

/// Whether a stored file belongs in the feed
pub fn is_video_file(file_name: &str) -> bool {
    VIDEO_EXTENSIONS.iter().any(|ext| file_name.ends_with(ext))
}

/// One published trailer, described by its `User_Journal_Title.webm` name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub file_name: String,
    pub title: String,
    pub user: String,
    pub journal: String,
}

impl FeedEntry {
    /// Parse a stored filename.
    ///
    /// Names with fewer than three `_`-separated parts fall back to the
    /// whole filename as title and "Research" as journal.
    pub fn parse(file_name: &str) -> Self {
        let parts: Vec<&str> = file_name.split('_').collect();

        let title = match parts.get(2) {
            Some(title) => title.replace(".webm", ""),
            None => file_name.to_string(),
        };
        let journal = parts
            .get(1)
            .map(|j| j.to_string())
            .unwrap_or_else(|| DEFAULT_JOURNAL_LABEL.to_string());

        Self {
            file_name: file_name.to_string(),
            title,
            user: parts[0].to_string(),
            journal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_name() {
        let entry = FeedEntry::parse("Dr.Miguel_Nature(2025)_DeepSeaVents.webm");
        assert_eq!(entry.user, "Dr.Miguel");
        assert_eq!(entry.journal, "Nature(2025)");
        assert_eq!(entry.title, "DeepSeaVents");
    }

    #[test]
    fn parse_short_name_falls_back() {
        let entry = FeedEntry::parse("clip.mp4");
        assert_eq!(entry.title, "clip.mp4");
        assert_eq!(entry.user, "clip.mp4");
        assert_eq!(entry.journal, "Research");
    }

    #[test]
    fn parse_two_parts() {
        let entry = FeedEntry::parse("Sarah_talk.webm");
        assert_eq!(entry.user, "Sarah");
        assert_eq!(entry.journal, "talk.webm");
        assert_eq!(entry.title, "Sarah_talk.webm");
    }

    #[test]
    fn video_extensions() {
        assert!(is_video_file("a.webm"));
        assert!(is_video_file("a.mp4"));
        assert!(!is_video_file("a.pdf"));
        assert!(!is_video_file("webm"));
    }
}
