use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::preferences::{
    ConfigError, DEFAULT_CONFIG_FILE, Preferences, load_preferences, save_preferences,
};
use crate::config::store::{ConfigPort, PrefStore};
use crate::dom::memory::{MemoryDocument, PageDescription};
use crate::dom::{Document, TextField};
use crate::monitor::monitor::Monitor;
use crate::session::Session;
use crate::store::file_store::{CleanupPolicy, CleanupReport};

/// Poll period of the edit loop; the monitor's own interval still applies.
const POLL_STEP: Duration = Duration::from_millis(250);

// ============================================================================
// edit subcommand
// ============================================================================

/// Edit one field of a described page, watch for changes, and return the
/// final field values keyed by field id.
pub fn cmd_edit(
    prefs: Preferences,
    page_path: &Path,
    field_id: &str,
    extension: Option<&str>,
    watch: Duration,
) -> Result<BTreeMap<String, String>, Box<dyn std::error::Error>> {
    let page = load_page(page_path)?;
    let document = MemoryDocument::from_description(&page)?;

    let session = Rc::new(Session::local(prefs));
    if let Err(e) = session.startup(false) {
        tracing::warn!(error = %e, "working directory cleanup failed");
    }

    let field = document
        .field_by_id(field_id)
        .ok_or_else(|| format!("no field with id '{}' in {}", field_id, page_path.display()))?;

    let monitor = Rc::new(Monitor::new(session.clone()));
    monitor.observe(&document);

    let doc: Rc<dyn Document> = document.clone();
    monitor.watch(doc.clone());

    let field: Rc<dyn TextField> = field;
    let path = monitor.edit_field(&doc, &field, extension)?;
    eprintln!("Editing {}", path.display());

    let start = Instant::now();
    while start.elapsed() < watch {
        std::thread::sleep(POLL_STEP);
        if let Some(report) = monitor.tick() {
            if report.updated > 0 {
                eprintln!("  field updated from {}", path.display());
            }
        }
        if session.launcher().pending() == 0 {
            break;
        }
    }

    // Pick up whatever the editor saved last.
    monitor.scan_document(&doc);

    Ok(field_values(&document))
}

/// Load a page description from YAML (JSON is valid YAML).
pub fn load_page(path: &Path) -> Result<PageDescription, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

fn field_values(document: &MemoryDocument) -> BTreeMap<String, String> {
    document
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let id = f.element_id().unwrap_or_else(|| format!("#{}", i));
            (id, f.value())
        })
        .collect()
}

/// Add `extension` to the extension list of the config file at `path`
/// (default `itsalltext.yaml`), creating the file if needed. Returns true
/// when the file was rewritten.
pub fn cmd_save_extension(path: Option<&Path>, extension: &str) -> Result<bool, ConfigError> {
    let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    let prefs = if path.exists() {
        load_preferences(path)?
    } else {
        Preferences::default()
    };

    let store = PrefStore::new(prefs);
    let changed = store.update(&mut |p| {
        p.append_extension(extension);
    });
    if changed.is_empty() {
        return Ok(false);
    }
    save_preferences(path, &store.snapshot())?;
    tracing::info!(extension, path = %path.display(), "saved extension to config");
    Ok(true)
}

// ============================================================================
// cleanup subcommand
// ============================================================================

pub fn cmd_cleanup(prefs: Preferences, force: bool) -> Result<CleanupReport, Box<dyn std::error::Error>> {
    let session = Session::local(prefs);
    let policy = if force {
        CleanupPolicy::Force
    } else {
        CleanupPolicy::OlderThan(session.prefs().retention())
    };
    Ok(session.store().cleanup(policy)?)
}

// ============================================================================
// locate subcommand
// ============================================================================

/// Path the field `field_id` of the page at `url` is edited in.
pub fn cmd_locate(
    prefs: Preferences,
    url: &str,
    field_id: &str,
    extension: Option<&str>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let session = Session::local(prefs);
    let document = MemoryDocument::new(url)?;
    let field = crate::dom::memory::MemoryField::new(Some(field_id), "");
    document.insert_field(field.clone());

    let doc: Rc<dyn Document> = document;
    let field: Rc<dyn TextField> = field;
    let mut record = crate::record::field_record::FieldRecord::new(&session, &doc, field)?;
    if let Some(ext) = extension {
        record.set_extension(&session, ext)?;
    }
    Ok(record.path().to_path_buf())
}
