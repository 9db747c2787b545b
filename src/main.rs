use std::time::Duration;

use clap::Parser;
use itsalltext::cli::commands::{cmd_cleanup, cmd_edit, cmd_locate, cmd_save_extension};
use itsalltext::cli::config::{Cli, Commands, log_filter, resolve_preferences};
use itsalltext::config::preferences::load_config;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Resolve preferences: CLI > config file > defaults
    let prefs = resolve_preferences(&cli, load_config(cli.config.as_deref()));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose, prefs.debug)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = prefs.hotkey() {
        tracing::warn!(error = %e, "ignoring hotkey preference");
    }

    match cli.command {
        Commands::Edit {
            page,
            field,
            extension,
            watch_secs,
            save_extension,
        } => {
            if let (true, Some(ext)) = (save_extension, extension.as_deref()) {
                cmd_save_extension(cli.config.as_deref(), ext)?;
            }
            let values = cmd_edit(
                prefs,
                &page,
                &field,
                extension.as_deref(),
                Duration::from_secs(watch_secs),
            )?;
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
        Commands::Cleanup { force } => {
            let report = cmd_cleanup(prefs, force)?;
            println!(
                "Removed {} files ({} kept, {} failed)",
                report.removed.len(),
                report.kept,
                report.failed
            );
        }
        Commands::Locate {
            url,
            field,
            extension,
        } => {
            let path = cmd_locate(prefs, &url, &field, extension.as_deref())?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
