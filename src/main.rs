//! J-Club CLI entry point

use std::process::ExitCode;

use clap::Parser;

use jclub::cli::{
    app::{
        init_tracing, load_merged_config, run_feed, run_lookup, run_profile, run_publish,
        run_record, run_slides, EXIT_ERROR, EXIT_USAGE_ERROR,
    },
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use jclub::domain::config::AppConfig;
use jclub::domain::duration::Duration;
use jclub::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let presenter = Presenter::new();

    let command = match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        command => command,
    };

    // Build CLI config from args
    let cli_config = AppConfig {
        user: cli.user.clone(),
        notify: if cli.notify { Some(true) } else { None },
        ..Default::default()
    };

    let config = load_merged_config(cli_config).await;
    tracing::debug!(?config, "configuration loaded");

    let user = config.user_or_default();
    if !config.is_known_user(&user) {
        presenter.error(&format!(
            "Unknown user '{}'. Known users: {}",
            user,
            config.users_or_default().join(", ")
        ));
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    match command {
        Commands::Lookup { doi } => run_lookup(&doi, &config).await,
        Commands::Slides { pdf, out, scale } => run_slides(&pdf, out, scale, &config).await,
        Commands::Record {
            out,
            permission_timeout,
        } => {
            let permission_timeout = match permission_timeout.map(|s| s.parse::<Duration>()) {
                Some(Ok(d)) => Some(d),
                Some(Err(e)) => {
                    presenter.error(&format!("Invalid permission-timeout: {}", e));
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
                None => None,
            };
            run_record(out, permission_timeout, &config).await
        }
        Commands::Publish { video, doi } => run_publish(&video, doi, &config).await,
        Commands::Feed => run_feed(&config).await,
        Commands::Profile => run_profile(&config).await,
        Commands::Config { .. } => ExitCode::SUCCESS,
    }
}
