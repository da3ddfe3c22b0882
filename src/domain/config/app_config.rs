//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::capture::DEFAULT_OUTPUT_NAME;
use crate::domain::duration::Duration;
use crate::domain::slides::DEFAULT_RENDER_SCALE;

/// Accounts offered by the login selector
pub const DEFAULT_USERS: &[&str] = &["Dr. Miguel", "Prof. Sarah"];

/// Directory holding published trailers
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// CrossRef REST API root
pub const DEFAULT_CROSSREF_URL: &str = "https://api.crossref.org";

/// Capture settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub permission_timeout: Option<String>,
    pub output_name: Option<String>,
}

/// Metadata provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossrefConfig {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

/// Slide rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlidesConfig {
    pub scale: Option<f32>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub user: Option<String>,
    pub users: Option<Vec<String>>,
    pub uploads_dir: Option<String>,
    pub output_dir: Option<String>,
    pub notify: Option<bool>,
    pub capture: Option<CaptureConfig>,
    pub crossref: Option<CrossrefConfig>,
    pub slides: Option<SlidesConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            user: Some(DEFAULT_USERS[0].to_string()),
            users: Some(DEFAULT_USERS.iter().map(|u| u.to_string()).collect()),
            uploads_dir: Some(DEFAULT_UPLOADS_DIR.to_string()),
            output_dir: None,
            notify: Some(false),
            capture: Some(CaptureConfig {
                permission_timeout: Some(Duration::default_permission_timeout().to_string()),
                output_name: Some(DEFAULT_OUTPUT_NAME.to_string()),
            }),
            crossref: Some(CrossrefConfig {
                base_url: Some(DEFAULT_CROSSREF_URL.to_string()),
                timeout: Some(Duration::default_lookup_timeout().to_string()),
            }),
            slides: Some(SlidesConfig {
                scale: Some(DEFAULT_RENDER_SCALE),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            user: other.user.or(self.user),
            users: other.users.or(self.users),
            uploads_dir: other.uploads_dir.or(self.uploads_dir),
            output_dir: other.output_dir.or(self.output_dir),
            notify: other.notify.or(self.notify),
            capture: match (self.capture, other.capture) {
                (Some(b), Some(o)) => Some(CaptureConfig {
                    permission_timeout: o.permission_timeout.or(b.permission_timeout),
                    output_name: o.output_name.or(b.output_name),
                }),
                (b, o) => o.or(b),
            },
            crossref: match (self.crossref, other.crossref) {
                (Some(b), Some(o)) => Some(CrossrefConfig {
                    base_url: o.base_url.or(b.base_url),
                    timeout: o.timeout.or(b.timeout),
                }),
                (b, o) => o.or(b),
            },
            slides: match (self.slides, other.slides) {
                (Some(b), Some(o)) => Some(SlidesConfig {
                    scale: o.scale.or(b.scale),
                }),
                (b, o) => o.or(b),
            },
        }
    }

    /// Get the current user, or the first roster entry
    pub fn user_or_default(&self) -> String {
        self.user
            .clone()
            .unwrap_or_else(|| self.users_or_default()[0].clone())
    }

    /// Get the roster, or the built-in accounts if not set/empty
    pub fn users_or_default(&self) -> Vec<String> {
        match &self.users {
            Some(users) if !users.is_empty() => users.clone(),
            _ => DEFAULT_USERS.iter().map(|u| u.to_string()).collect(),
        }
    }

    /// Whether `user` is one of the roster accounts
    pub fn is_known_user(&self, user: &str) -> bool {
        self.users_or_default().iter().any(|u| u == user)
    }

    /// Get uploads directory, or "uploads" if not set
    pub fn uploads_dir_or_default(&self) -> &str {
        self.uploads_dir.as_deref().unwrap_or(DEFAULT_UPLOADS_DIR)
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    /// Get permission timeout as parsed Duration, or default if not set/invalid
    pub fn permission_timeout_or_default(&self) -> Duration {
        self.capture
            .as_ref()
            .and_then(|c| c.permission_timeout.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_permission_timeout)
    }

    /// Get the suggested download name, or "research_trailer.webm" if not set
    pub fn output_name_or_default(&self) -> &str {
        self.capture
            .as_ref()
            .and_then(|c| c.output_name.as_deref())
            .unwrap_or(DEFAULT_OUTPUT_NAME)
    }

    /// Get the CrossRef base URL, or the public API if not set
    pub fn crossref_url_or_default(&self) -> &str {
        self.crossref
            .as_ref()
            .and_then(|c| c.base_url.as_deref())
            .unwrap_or(DEFAULT_CROSSREF_URL)
    }

    /// Get lookup timeout as parsed Duration, or default if not set/invalid
    pub fn lookup_timeout_or_default(&self) -> Duration {
        self.crossref
            .as_ref()
            .and_then(|c| c.timeout.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_lookup_timeout)
    }

    /// Get slide scale, or 4.0 if not set/non-positive
    pub fn slide_scale_or_default(&self) -> f32 {
        self.slides
            .as_ref()
            .and_then(|s| s.scale)
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_RENDER_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.user, Some("Dr. Miguel".to_string()));
        assert_eq!(config.users_or_default().len(), 2);
        assert_eq!(config.uploads_dir_or_default(), "uploads");
        assert!(!config.notify_or_default());
        assert_eq!(config.permission_timeout_or_default().as_secs(), 60);
        assert_eq!(config.output_name_or_default(), "research_trailer.webm");
        assert_eq!(config.crossref_url_or_default(), "https://api.crossref.org");
        assert_eq!(config.lookup_timeout_or_default().as_secs(), 5);
        assert_eq!(config.slide_scale_or_default(), 4.0);
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.user.is_none());
        assert!(config.users.is_none());
        assert!(config.capture.is_none());
        assert!(config.crossref.is_none());
        assert!(config.slides.is_none());
    }

    #[test]
    fn empty_falls_back_to_defaults() {
        let config = AppConfig::empty();
        assert_eq!(config.user_or_default(), "Dr. Miguel");
        assert_eq!(config.uploads_dir_or_default(), "uploads");
        assert_eq!(config.output_name_or_default(), "research_trailer.webm");
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            user: Some("Dr. Miguel".to_string()),
            uploads_dir: Some("uploads".to_string()),
            ..Default::default()
        };
        let other = AppConfig {
            user: Some("Prof. Sarah".to_string()),
            uploads_dir: None,
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.user, Some("Prof. Sarah".to_string()));
        assert_eq!(merged.uploads_dir, Some("uploads".to_string()));
    }

    #[test]
    fn merge_nested_sections_field_by_field() {
        let base = AppConfig::defaults();
        let other = AppConfig {
            crossref: Some(CrossrefConfig {
                base_url: Some("http://localhost:9999".to_string()),
                timeout: None,
            }),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.crossref_url_or_default(), "http://localhost:9999");
        assert_eq!(merged.lookup_timeout_or_default().as_secs(), 5);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = AppConfig {
            capture: Some(CaptureConfig {
                permission_timeout: Some("soon".to_string()),
                output_name: None,
            }),
            slides: Some(SlidesConfig { scale: Some(-1.0) }),
            ..Default::default()
        };
        assert_eq!(config.permission_timeout_or_default().as_secs(), 60);
        assert_eq!(config.slide_scale_or_default(), 4.0);
    }

    #[test]
    fn known_users() {
        let config = AppConfig::defaults();
        assert!(config.is_known_user("Prof. Sarah"));
        assert!(!config.is_known_user("Mallory"));

        let custom = AppConfig {
            users: Some(vec!["Ann".to_string()]),
            ..Default::default()
        };
        assert!(custom.is_known_user("Ann"));
        assert_eq!(custom.user_or_default(), "Ann");
    }
}
