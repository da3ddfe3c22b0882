//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, CaptureConfig, CrossrefConfig, SlidesConfig, DEFAULT_CROSSREF_URL,
    DEFAULT_UPLOADS_DIR, DEFAULT_USERS,
};
