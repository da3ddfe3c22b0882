//! Feed domain module

mod entry;
mod publish_name;

pub use entry::{is_video_file, FeedEntry, DEFAULT_JOURNAL_LABEL, VIDEO_EXTENSIONS};
pub use publish_name::{normalize_user, PublishName, JOURNAL_CHARS, TITLE_CHARS};
