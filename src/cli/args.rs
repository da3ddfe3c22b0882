//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// J-Club - research trailers for journal clubs
#[derive(Parser, Debug)]
#[command(name = "jclub")]
#[command(version)]
#[command(about = "Turn papers into short screen-recorded research trailers and share them")]
#[command(long_about = None)]
pub struct Cli {
    /// Account to act as (must be one of the configured users)
    #[arg(short = 'u', long, global = true, value_name = "NAME")]
    pub user: Option<String>,

    /// Show desktop notifications
    #[arg(short = 'n', long, global = true)]
    pub notify: bool,

    /// Print debug logs to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify a DOI and show the paper's metadata
    Lookup {
        /// DOI, e.g. 10.1038/s41586-025-10062-6
        doi: String,
    },
    /// Render a PDF into high-resolution slide images
    Slides {
        /// PDF to render
        pdf: PathBuf,
        /// Directory for slide-001.png, slide-002.png, ...
        #[arg(short = 'o', long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Zoom factor (72 dpi per 1.0)
        #[arg(short = 's', long, value_name = "FACTOR")]
        scale: Option<f32>,
    },
    /// Record screen and microphone into a WebM trailer
    Record {
        /// Directory to save the recording in (default: downloads)
        #[arg(short = 'o', long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// How long to wait for capture permission (e.g., 30s, 1m)
        #[arg(long, value_name = "TIME")]
        permission_timeout: Option<String>,
    },
    /// Publish a recorded trailer to the feed
    Publish {
        /// WebM file to publish
        video: PathBuf,
        /// DOI of the presented paper, used to name the trailer
        #[arg(short = 'd', long)]
        doi: Option<String>,
    },
    /// Show every published trailer
    Feed,
    /// Show the trailers published by the current user
    Profile,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "user",
    "users",
    "uploads_dir",
    "output_dir",
    "notify",
    "capture.permission_timeout",
    "capture.output_name",
    "crossref.base_url",
    "crossref.timeout",
    "slides.scale",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_feed() {
        let cli = Cli::parse_from(["jclub", "feed"]);
        assert!(matches!(cli.command, Commands::Feed));
        assert!(cli.user.is_none());
        assert!(!cli.notify);
        assert!(!cli.verbose);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["jclub", "profile", "--user", "Prof. Sarah", "-v"]);
        assert_eq!(cli.user.as_deref(), Some("Prof. Sarah"));
        assert!(cli.verbose);
    }

    #[test]
    fn cli_parses_lookup() {
        let cli = Cli::parse_from(["jclub", "lookup", "10.1038/nature12373"]);
        if let Commands::Lookup { doi } = cli.command {
            assert_eq!(doi, "10.1038/nature12373");
        } else {
            panic!("Expected Lookup command");
        }
    }

    #[test]
    fn cli_parses_slides_options() {
        let cli = Cli::parse_from(["jclub", "slides", "paper.pdf", "-o", "out", "--scale", "2"]);
        if let Commands::Slides { pdf, out, scale } = cli.command {
            assert_eq!(pdf, PathBuf::from("paper.pdf"));
            assert_eq!(out, Some(PathBuf::from("out")));
            assert_eq!(scale, Some(2.0));
        } else {
            panic!("Expected Slides command");
        }
    }

    #[test]
    fn cli_parses_record() {
        let cli = Cli::parse_from(["jclub", "record", "--permission-timeout", "30s"]);
        if let Commands::Record {
            out,
            permission_timeout,
        } = cli.command
        {
            assert!(out.is_none());
            assert_eq!(permission_timeout.as_deref(), Some("30s"));
        } else {
            panic!("Expected Record command");
        }
    }

    #[test]
    fn cli_parses_publish_with_doi() {
        let cli = Cli::parse_from(["jclub", "publish", "trailer.webm", "--doi", "10.1/x"]);
        if let Commands::Publish { video, doi } = cli.command {
            assert_eq!(video, PathBuf::from("trailer.webm"));
            assert_eq!(doi.as_deref(), Some("10.1/x"));
        } else {
            panic!("Expected Publish command");
        }
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["jclub", "config", "set", "slides.scale", "2.5"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "slides.scale");
            assert_eq!(value, "2.5");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["jclub"]).is_err());
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("user"));
        assert!(is_valid_config_key("capture.permission_timeout"));
        assert!(is_valid_config_key("crossref.base_url"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
