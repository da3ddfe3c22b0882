//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, CaptureConfig, CrossrefConfig, SlidesConfig};
use crate::domain::duration::Duration;
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    presenter.output(read_value(&config, key).as_deref().unwrap_or(NOT_SET));

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, read_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Comma-separated roster, blanks dropped
fn parse_users(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate `value` for `key` and store it in `config`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "user" => {
            if !config.is_known_user(value) {
                return Err(invalid(
                    key,
                    format!(
                        "Unknown user '{}'. Known users: {}",
                        value,
                        config.users_or_default().join(", ")
                    ),
                ));
            }
            config.user = Some(value.to_string());
        }
        "users" => {
            let users = parse_users(value);
            if users.is_empty() {
                return Err(invalid(key, "Give at least one name, separated by commas"));
            }
            config.users = Some(users);
        }
        "uploads_dir" => config.uploads_dir = Some(value.to_string()),
        "output_dir" => config.output_dir = Some(value.to_string()),
        "notify" => {
            config.notify =
                Some(parse_bool(value).map_err(|_| invalid(key, "Value must be 'true' or 'false'"))?)
        }
        "capture.permission_timeout" | "crossref.timeout" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
            if key == "capture.permission_timeout" {
                config
                    .capture
                    .get_or_insert_with(CaptureConfig::default)
                    .permission_timeout = Some(value.to_string());
            } else {
                config.crossref.get_or_insert_with(CrossrefConfig::default).timeout =
                    Some(value.to_string());
            }
        }
        "capture.output_name" => {
            if value.is_empty() || value.contains(|c: char| c == '/' || c == '\\') {
                return Err(invalid(key, "Value must be a plain file name"));
            }
            config
                .capture
                .get_or_insert_with(CaptureConfig::default)
                .output_name = Some(value.to_string());
        }
        "crossref.base_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid(key, "Value must be an http(s) URL"));
            }
            config.crossref.get_or_insert_with(CrossrefConfig::default).base_url =
                Some(value.to_string());
        }
        "slides.scale" => {
            let scale = parse_scale(value).map_err(|_| invalid(key, "Value must be a positive number"))?;
            config.slides.get_or_insert_with(SlidesConfig::default).scale = Some(scale);
        }
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

/// Stored value for `key`, as text
fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    let capture = config.capture.as_ref();
    let crossref = config.crossref.as_ref();
    match key {
        "user" => config.user.clone(),
        "users" => config.users.as_ref().map(|u| u.join(", ")),
        "uploads_dir" => config.uploads_dir.clone(),
        "output_dir" => config.output_dir.clone(),
        "notify" => config.notify.map(|b| b.to_string()),
        "capture.permission_timeout" => capture.and_then(|c| c.permission_timeout.clone()),
        "capture.output_name" => capture.and_then(|c| c.output_name.clone()),
        "crossref.base_url" => crossref.and_then(|c| c.base_url.clone()),
        "crossref.timeout" => crossref.and_then(|c| c.timeout.clone()),
        "slides.scale" => config
            .slides
            .as_ref()
            .and_then(|s| s.scale)
            .map(|s| s.to_string()),
        _ => None,
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}

/// Parse a finite, positive zoom factor
fn parse_scale(value: &str) -> Result<f32, ()> {
    match value.parse::<f32>() {
        Ok(scale) if scale.is_finite() && scale > 0.0 => Ok(scale),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::XdgConfigStore;
    use tempfile::TempDir;

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("NO"), Ok(false));
        assert_eq!(parse_bool("1"), Ok(true));
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn parse_scale_values() {
        assert_eq!(parse_scale("2.5"), Ok(2.5));
        assert!(parse_scale("0").is_err());
        assert!(parse_scale("-1").is_err());
        assert!(parse_scale("NaN").is_err());
        assert!(parse_scale("big").is_err());
    }

    #[test]
    fn user_must_be_in_roster() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "user", "Prof. Sarah").is_ok());
        assert!(apply_value(&mut config, "user", "Mallory").is_err());

        apply_value(&mut config, "users", "Ann, Bob").unwrap();
        assert!(apply_value(&mut config, "user", "Bob").is_ok());
        assert_eq!(read_value(&config, "users").as_deref(), Some("Ann, Bob"));
    }

    #[test]
    fn empty_roster_rejected() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "users", " , ").is_err());
    }

    #[test]
    fn durations_validated() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "capture.permission_timeout", "2m30s").is_ok());
        assert!(apply_value(&mut config, "crossref.timeout", "soon").is_err());
        assert_eq!(config.permission_timeout_or_default().as_secs(), 150);
    }

    #[test]
    fn output_name_must_be_plain() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "capture.output_name", "talk.webm").is_ok());
        assert!(apply_value(&mut config, "capture.output_name", "../talk.webm").is_err());
    }

    #[test]
    fn base_url_needs_scheme() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "crossref.base_url", "api.crossref.org").is_err());
        assert!(apply_value(&mut config, "crossref.base_url", "http://localhost:8080").is_ok());
        assert_eq!(config.crossref_url_or_default(), "http://localhost:8080");
    }

    #[test]
    fn every_key_reads_back() {
        let config = AppConfig::defaults();
        for key in VALID_CONFIG_KEYS.iter().filter(|k| **k != "output_dir") {
            assert!(read_value(&config, key).is_some(), "{} unset", key);
        }
    }

    #[tokio::test]
    async fn set_persists_nested_value() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        handle_config_command(
            ConfigAction::Set {
                key: "slides.scale".to_string(),
                value: "2".to_string(),
            },
            &store,
            &presenter,
        )
        .await
        .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.slide_scale_or_default(), 2.0);
    }

    #[tokio::test]
    async fn unknown_key_rejected() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let err = handle_config_command(
            ConfigAction::Get {
                key: "api_key".to_string(),
            },
            &store,
            &Presenter::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }
}
