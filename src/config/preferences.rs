use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::hotkey::{HotKey, HotKeyError};
use crate::record::charset::Charset;

/// Lower bound on the scan interval, to keep disk polling reasonable.
pub const MIN_REFRESH_SECS: u64 = 1;

/// Fallback when no extension list is configured.
pub const FALLBACK_EXTENSION: &str = ".txt";

/// Config file looked up in the current directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "itsalltext.yaml";

const SECS_PER_DAY: u64 = 24 * 60 * 60;

// ============================================================================
// Preferences model (optional YAML)
// ============================================================================

/// User preferences: `itsalltext.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Editor executable (or application bundle on macOS).
    #[serde(default)]
    pub editor: Option<PathBuf>,

    /// Defaults to `<data dir>/itsalltext`.
    #[serde(default)]
    pub working_directory: Option<PathBuf>,

    #[serde(default = "default_refresh")]
    pub refresh_secs: u64,

    #[serde(default)]
    pub debug: bool,

    /// Comma separated, e.g. `.txt, .md`.
    #[serde(default = "default_extensions")]
    pub extensions: String,

    #[serde(default = "default_gumdrop")]
    pub gumdrop_position: GumdropPosition,

    /// Affordance fade duration in seconds.
    #[serde(default = "default_fade")]
    pub fade_time: f32,

    #[serde(default)]
    pub hotkey: Option<String>,

    /// Stale files older than this are removed from the working directory.
    #[serde(default = "default_retention")]
    pub retention_days: u64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            charset: default_charset(),
            editor: None,
            working_directory: None,
            refresh_secs: default_refresh(),
            debug: false,
            extensions: default_extensions(),
            gumdrop_position: default_gumdrop(),
            fade_time: default_fade(),
            hotkey: None,
            retention_days: default_retention(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GumdropPosition {
    LowerRight,
    UpperRight,
    LowerLeft,
    UpperLeft,
    /// Affordances disabled.
    None,
}

impl GumdropPosition {
    pub fn is_enabled(self) -> bool {
        self != GumdropPosition::None
    }
}

// Serde default helpers
fn default_charset() -> String { "UTF-8".to_string() }
fn default_refresh() -> u64 { 2 }
fn default_extensions() -> String { ".txt,.html,.css,.xml,.xsl,.js".to_string() }
fn default_gumdrop() -> GumdropPosition { GumdropPosition::LowerRight }
fn default_fade() -> f32 { 1.15 }
fn default_retention() -> u64 { 7 }

impl Preferences {
    /// Scan interval, clamped to `MIN_REFRESH_SECS`.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(MIN_REFRESH_SECS))
    }

    /// Saturates instead of overflowing for absurd day counts.
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(SECS_PER_DAY))
    }

    /// Non-finite or out of range fade times fall back to the default.
    pub fn fade_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.fade_time.max(0.0))
            .unwrap_or_else(|_| Duration::from_secs_f32(default_fade()))
    }

    pub fn charset(&self) -> Charset {
        Charset::from_name(&self.charset).unwrap_or_else(|| {
            tracing::warn!(charset = %self.charset, "unsupported charset, using UTF-8");
            Charset::Utf8
        })
    }

    /// Configured extensions, normalized to a leading dot, without blanks
    /// or duplicates, in declaration order.
    pub fn extension_list(&self) -> Vec<String> {
        let mut list: Vec<String> = Vec::new();
        for raw in self.extensions.split(',') {
            if let Some(ext) = normalize_extension(raw) {
                if !list.contains(&ext) {
                    list.push(ext);
                }
            }
        }
        list
    }

    /// First configured extension, or `.txt`.
    pub fn default_extension(&self) -> String {
        self.extension_list()
            .into_iter()
            .next()
            .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
    }

    /// Add `raw` to the configured extensions unless already listed.
    /// Returns true when the list changed.
    pub fn append_extension(&mut self, raw: &str) -> bool {
        let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let Some(ext) = normalize_extension(&stripped) else {
            return false;
        };
        if self.extension_list().contains(&ext) {
            return false;
        }
        if self.extensions.trim().is_empty() {
            self.extensions = ext;
        } else {
            self.extensions = format!("{},{}", self.extensions, ext);
        }
        true
    }

    pub fn hotkey(&self) -> Result<Option<HotKey>, HotKeyError> {
        match self.hotkey.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(descriptor) => HotKey::parse(descriptor).map(Some),
        }
    }
}

/// `"md"` / `" .md "` → `".md"`. Blank input, or anything but ASCII
/// letters, digits and dots, yields `None`: the result becomes part of a
/// file name in the working directory.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '.') {
        return None;
    }
    Some(format!(".{}", trimmed))
}

// ============================================================================
// Loading
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("could not write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Strict loader: reports unreadable or malformed files.
pub fn load_preferences(path: &Path) -> Result<Preferences, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `prefs` back as YAML, replacing `path`.
pub fn save_preferences(path: &Path, prefs: &Preferences) -> Result<(), ConfigError> {
    let content = serde_yaml::to_string(prefs).map_err(ConfigError::Serialize)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Load preferences from YAML. Returns defaults if the file is missing or
/// malformed.
pub fn load_config(path: Option<&Path>) -> Preferences {
    let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    match load_preferences(path) {
        Ok(prefs) => prefs,
        Err(ConfigError::Read { .. }) => Preferences::default(),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed config");
            Preferences::default()
        }
    }
}
