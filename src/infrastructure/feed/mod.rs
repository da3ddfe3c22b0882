//! Feed storage adapters

mod directory;

pub use directory::DirectoryFeedStore;
