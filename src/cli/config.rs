use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::preferences::Preferences;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "itsalltext",
    version,
    about = "Edit text fields in an external editor and sync the changes back"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: itsalltext.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Editor executable, overrides the config file
    #[arg(long, global = true)]
    pub editor: Option<PathBuf>,

    /// Working directory for field files, overrides the config file
    #[arg(long, global = true)]
    pub working_directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open a field of a page description in the editor and sync edits back
    Edit {
        /// Page description (YAML or JSON)
        #[arg(long)]
        page: PathBuf,

        /// Id of the field to edit
        #[arg(long)]
        field: String,

        /// Extension to edit with, e.g. .md
        #[arg(long)]
        extension: Option<String>,

        /// How long to keep watching for changes
        #[arg(long, default_value_t = 30)]
        watch_secs: u64,

        /// Also add --extension to the config file's extension list
        #[arg(long, requires = "extension")]
        save_extension: bool,
    },

    /// Remove stale files from the working directory
    Cleanup {
        /// Remove every file regardless of age
        #[arg(long)]
        force: bool,
    },

    /// Print the file a field would be edited in
    Locate {
        /// Document URL
        #[arg(long)]
        url: String,

        /// Field id
        #[arg(long)]
        field: String,

        /// Extension, defaults to the configured one
        #[arg(long)]
        extension: Option<String>,
    },
}

// ============================================================================
// Merging CLI args with the config file
// ============================================================================

/// CLI flags win over config file values.
pub fn resolve_preferences(cli: &Cli, mut prefs: Preferences) -> Preferences {
    if let Some(editor) = &cli.editor {
        prefs.editor = Some(editor.clone());
    }
    if let Some(dir) = &cli.working_directory {
        prefs.working_directory = Some(dir.clone());
    }
    if cli.verbose > 0 {
        prefs.debug = true;
    }
    prefs
}

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn log_filter(verbose: u8, debug: bool) -> &'static str {
    match (verbose, debug) {
        (v, _) if v >= 2 => "trace",
        (_, true) => "debug",
        (1, _) => "debug",
        _ => "info",
    }
}
