//! Command runners

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::application::ports::{
    ConfigStore, MetadataError, MetadataProvider, SlideError, SlideRenderer,
};
use crate::application::{
    BrowseFeedUseCase, CaptureController, CaptureSettings, CaptureUpdate, PublishInput,
    PublishTrailerUseCase,
};
use crate::domain::config::{AppConfig, CrossrefConfig};
use crate::domain::duration::Duration;
use crate::domain::feed::FeedEntry;
use crate::domain::paper::Doi;
use crate::infrastructure::notification::create_notifier;
use crate::infrastructure::{
    CrossrefClient, DirectoryFeedStore, DownloadDirSink, FfmpegCaptureDevices,
    FfmpegMediaRecorder, PdftoppmRenderer, XdgConfigStore,
};

use super::presenter::Presenter;
use super::signals::{wait_for_stop, StopTrigger};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment overrides
pub const ENV_USER: &str = "JCLUB_USER";
pub const ENV_UPLOADS_DIR: &str = "JCLUB_UPLOADS_DIR";
pub const ENV_CROSSREF_URL: &str = "JCLUB_CROSSREF_URL";

/// Install the stderr log subscriber.
///
/// `-v` forces debug output for this crate; otherwise `RUST_LOG` applies,
/// falling back to warnings only.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("jclub=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        tracing::debug!(error = %e, "log subscriber already installed");
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    let env_config = AppConfig {
        user: env_value(ENV_USER),
        uploads_dir: env_value(ENV_UPLOADS_DIR),
        crossref: env_value(ENV_CROSSREF_URL).map(|url| CrossrefConfig {
            base_url: Some(url),
            timeout: None,
        }),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

fn crossref_client(config: &AppConfig) -> CrossrefClient {
    CrossrefClient::with_base_url(config.crossref_url_or_default())
        .timeout(config.lookup_timeout_or_default())
}

fn exit(code: u8) -> ExitCode {
    ExitCode::from(code)
}

/// `jclub lookup <DOI>`
pub async fn run_lookup(doi: &str, config: &AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    let doi: Doi = match doi.parse() {
        Ok(doi) => doi,
        Err(e) => {
            presenter.error(&e.to_string());
            return exit(EXIT_USAGE_ERROR);
        }
    };

    presenter.start_spinner("Verifying DOI...");
    match crossref_client(config).lookup(&doi).await {
        Ok(paper) => {
            presenter.spinner_success("Verified Paper Found!");
            presenter.paper(&paper);
            exit(EXIT_SUCCESS)
        }
        Err(MetadataError::NotFound) => {
            presenter.spinner_fail("DOI not found. Please check the string.");
            exit(EXIT_ERROR)
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            exit(EXIT_ERROR)
        }
    }
}

/// Default directory for rendered slides: `<pdf stem>-slides`
fn default_slides_dir(pdf: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "paper".to_string());
    PathBuf::from(format!("{}-slides", stem))
}

/// Name of the n-th (zero-based) slide image
pub fn slide_file_name(index: usize) -> String {
    format!("slide-{:03}.png", index + 1)
}

/// `jclub slides <PDF>`
pub async fn run_slides(
    pdf: &Path,
    out: Option<PathBuf>,
    scale: Option<f32>,
    config: &AppConfig,
) -> ExitCode {
    let mut presenter = Presenter::new();

    let scale = match scale {
        Some(s) if !(s.is_finite() && s > 0.0) => {
            presenter.error("Scale must be a positive number");
            return exit(EXIT_USAGE_ERROR);
        }
        Some(s) => s,
        None => config.slide_scale_or_default(),
    };
    let out = out.unwrap_or_else(|| default_slides_dir(pdf));

    let bytes = match fs::read(pdf).await {
        Ok(bytes) => bytes,
        Err(e) => {
            presenter.error(&format!("Failed to read {}: {}", pdf.display(), e));
            return exit(EXIT_ERROR);
        }
    };

    presenter.start_spinner("Rendering High-Res Slides...");
    let deck = match PdftoppmRenderer::new().render(&bytes, scale).await {
        Ok(deck) => deck,
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            return exit(if matches!(e, SlideError::InvalidPdf) {
                EXIT_USAGE_ERROR
            } else {
                EXIT_ERROR
            });
        }
    };

    if let Err(e) = fs::create_dir_all(&out).await {
        presenter.spinner_fail(&format!("Failed to create {}: {}", out.display(), e));
        return exit(EXIT_ERROR);
    }
    for slide in deck.iter() {
        let path = out.join(slide_file_name(slide.index));
        if let Err(e) = fs::write(&path, &slide.png).await {
            presenter.spinner_fail(&format!("Failed to write {}: {}", path.display(), e));
            return exit(EXIT_ERROR);
        }
    }

    presenter.spinner_success(&format!(
        "Rendered {} slides into {}",
        deck.len(),
        out.display()
    ));
    if let Some(first) = deck.get(0) {
        presenter.info(&format!("{}x{} px per slide", first.width, first.height));
    }
    exit(EXIT_SUCCESS)
}

/// `jclub record`
pub async fn run_record(
    out: Option<PathBuf>,
    permission_timeout: Option<Duration>,
    config: &AppConfig,
) -> ExitCode {
    let mut presenter = Presenter::new();

    let sink = match out.or_else(|| config.output_dir.as_ref().map(PathBuf::from)) {
        Some(dir) => DownloadDirSink::with_dir(dir),
        None => DownloadDirSink::new(),
    };
    let settings = CaptureSettings {
        permission_timeout: permission_timeout
            .unwrap_or_else(|| config.permission_timeout_or_default()),
        output_name: config.output_name_or_default().to_string(),
        ..Default::default()
    };

    let controller = Arc::new(CaptureController::new(
        FfmpegCaptureDevices::new(),
        FfmpegMediaRecorder::new(),
        sink,
        create_notifier(config.notify_or_default()),
        settings,
    ));

    presenter.start_spinner("Waiting for screen and microphone access...");
    if let Err(e) = controller.start().await {
        presenter.spinner_fail(&e.to_string());
        return exit(EXIT_ERROR);
    }
    presenter.update_spinner(&presenter.format_recording(0));

    // Events are applied on their own task so a stop keypress never
    // interrupts a half-applied event
    let (tx, mut updates) = mpsc::unbounded_channel();
    let pump = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            loop {
                let update = controller.process_next_event().await;
                let done = !matches!(update, Ok(CaptureUpdate::Data { .. }));
                if tx.send(update).is_err() || done {
                    break;
                }
            }
        })
    };

    let stop = wait_for_stop();
    tokio::pin!(stop);
    let mut stop_sent = false;

    let outcome = loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(Ok(CaptureUpdate::Data { bytes, .. })) => {
                    if !stop_sent {
                        presenter.update_spinner(&presenter.format_recording(bytes));
                    }
                }
                Some(Ok(CaptureUpdate::Finished(output))) => break Ok(output),
                Some(Err(e)) => break Err(e.to_string()),
                None => break Err("recorder events ended unexpectedly".to_string()),
            },
            trigger = &mut stop, if !stop_sent => {
                stop_sent = true;
                match trigger {
                    Ok(StopTrigger::Interrupt) => tracing::debug!("stop requested by Ctrl-C"),
                    Ok(StopTrigger::Enter) => tracing::debug!("stop requested from terminal"),
                    Err(e) => tracing::warn!(error = %e, "stop trigger failed; stopping"),
                }
                presenter.update_spinner("Finalizing recording...");
                if let Err(e) = controller.stop().await {
                    break Err(e.to_string());
                }
            }
        }
    };
    pump.abort();

    match outcome {
        Ok(output) => {
            presenter.spinner_success(&format!(
                "Trailer saved: {} ({})",
                output.path.display(),
                output.human_readable_size()
            ));
            exit(EXIT_SUCCESS)
        }
        Err(message) => {
            presenter.spinner_fail(&message);
            exit(EXIT_ERROR)
        }
    }
}

/// `jclub publish <VIDEO>`
pub async fn run_publish(video: &Path, doi: Option<String>, config: &AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    let doi = match doi.map(|d| d.parse::<Doi>()).transpose() {
        Ok(doi) => doi,
        Err(e) => {
            presenter.error(&e.to_string());
            return exit(EXIT_USAGE_ERROR);
        }
    };

    let bytes = match fs::read(video).await {
        Ok(bytes) => bytes,
        Err(e) => {
            presenter.error(&format!("Failed to read {}: {}", video.display(), e));
            return exit(EXIT_ERROR);
        }
    };

    let feed = DirectoryFeedStore::with_root(config.uploads_dir_or_default());
    let use_case = PublishTrailerUseCase::new(feed, crossref_client(config));

    presenter.start_spinner("Publishing...");
    let input = PublishInput {
        user: config.user_or_default(),
        video: bytes,
        doi,
    };

    match use_case.execute(input).await {
        Ok(output) => {
            presenter.spinner_success("Published!");
            if let Some(e) = output.lookup_error {
                presenter.warn(&format!(
                    "Paper metadata unavailable ({}); filed under placeholders",
                    e
                ));
            }
            presenter.key_value("File", &output.entry.file_name);
            exit(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            exit(EXIT_ERROR)
        }
    }
}

fn print_entries(presenter: &Presenter, uploads: &Path, entries: &[FeedEntry]) {
    for entry in entries {
        let path = uploads.join(&entry.file_name);
        presenter.feed_entry(entry, &path.to_string_lossy());
    }
}

/// `jclub feed`
pub async fn run_feed(config: &AppConfig) -> ExitCode {
    let presenter = Presenter::new();
    let uploads = PathBuf::from(config.uploads_dir_or_default());
    let use_case = BrowseFeedUseCase::new(DirectoryFeedStore::with_root(&uploads));

    match use_case.home().await {
        Ok(entries) if entries.is_empty() => {
            presenter.info("No research trailers published yet.");
            exit(EXIT_SUCCESS)
        }
        Ok(entries) => {
            print_entries(&presenter, &uploads, &entries);
            exit(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            exit(EXIT_ERROR)
        }
    }
}

/// `jclub profile`
pub async fn run_profile(config: &AppConfig) -> ExitCode {
    let presenter = Presenter::new();
    let user = config.user_or_default();
    let uploads = PathBuf::from(config.uploads_dir_or_default());
    let use_case = BrowseFeedUseCase::new(DirectoryFeedStore::with_root(&uploads));

    presenter.output(&format!("Profile: {}", user));
    match use_case.profile(&user).await {
        Ok(entries) if entries.is_empty() => {
            presenter.info("No trailers published yet.");
            exit(EXIT_SUCCESS)
        }
        Ok(entries) => {
            print_entries(&presenter, &uploads, &entries);
            exit(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            exit(EXIT_ERROR)
        }
    }
}
