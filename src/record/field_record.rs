use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use crate::config::preferences::normalize_extension;
use crate::dom::{Document, TextField};
use crate::identity::field_key::{FieldKey, Uid};
use crate::ports::fs::{FileStamp, is_name_too_long};
use crate::record::error::EditError;
use crate::session::Session;
use crate::store::error::StoreError;
use crate::store::naming::BaseName;
use crate::{EXTENSION_ATTRIBUTE, UID_ATTRIBUTE};

/// Binds one text field to one file in the working directory.
///
/// The record starts out not watching. It switches to watching once a file
/// from an earlier session is adopted or an editor was launched, and stays
/// that way for the rest of its life.
pub struct FieldRecord {
    uid: Uid,
    key: FieldKey,
    base: BaseName,
    field: Rc<dyn TextField>,
    document: Weak<dyn Document>,

    extension: String,
    path: PathBuf,

    /// Stamp of the file as of our last write or read.
    cached: Option<FileStamp>,
    watching: bool,
    edit_count: u32,
    affordance_attached: bool,
}

impl FieldRecord {
    /// Create a record for `field` and tag the node with its uid.
    pub fn new(
        session: &Session,
        document: &Rc<dyn Document>,
        field: Rc<dyn TextField>,
    ) -> Result<Self, StoreError> {
        let key = FieldKey::for_field(document.as_ref(), field.as_ref());
        let uid = Uid::generate(&key);
        let base = BaseName::for_key(&key);
        let store = session.store();

        let existing = store.find_existing(&base);
        let declared = field
            .attribute(EXTENSION_ATTRIBUTE)
            .and_then(|ext| normalize_extension(&ext));
        let extension = resolve_extension(
            None,
            declared.as_deref(),
            existing.as_ref().map(|e| e.extension.as_str()),
            &session.prefs().extension_list(),
        );
        let path = store.file_for(&base, &extension)?;

        field.set_attribute(UID_ATTRIBUTE, uid.as_str());

        let mut record = FieldRecord {
            uid,
            key,
            base,
            field,
            document: Rc::downgrade(document),
            extension,
            path,
            cached: None,
            watching: false,
            edit_count: 0,
            affordance_attached: false,
        };

        match existing {
            Some(found) if found.extension == record.extension => {
                tracing::debug!(
                    key = %record.key,
                    path = %found.path.display(),
                    "adopted existing file"
                );
                store.remove_siblings(&record.base, &found.path);
                record.cached = Some(found.stamp);
                record.watching = true;
            }
            _ => record.cached = session.fs().stat(&record.path).ok(),
        }

        Ok(record)
    }

    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    pub fn key(&self) -> &FieldKey {
        &self.key
    }

    pub fn base_name(&self) -> &BaseName {
        &self.base
    }

    pub fn field(&self) -> &Rc<dyn TextField> {
        &self.field
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }

    /// Successful editor launches so far.
    pub fn edit_count(&self) -> u32 {
        self.edit_count
    }

    /// True when re-opening would resume earlier work rather than start fresh.
    pub fn has_previous_file(&self, session: &Session) -> bool {
        self.edit_count > 0 || session.fs().exists(&self.path)
    }

    /// Configured extensions with the current one first.
    pub fn extension_choices(&self, session: &Session) -> Vec<String> {
        let mut choices = vec![self.extension.clone()];
        for ext in session.prefs().extension_list() {
            if ext != self.extension {
                choices.push(ext);
            }
        }
        choices
    }

    /// Whether this record still tracks `field` (and not a recreated node).
    pub fn is_node(&self, field: &Rc<dyn TextField>) -> bool {
        Rc::ptr_eq(&self.field, field)
    }

    pub fn belongs_to(&self, document: &Rc<dyn Document>) -> bool {
        Weak::ptr_eq(&self.document, &Rc::downgrade(document))
    }

    pub fn is_document_live(&self) -> bool {
        self.document.upgrade().is_some_and(|doc| doc.is_live())
    }

    pub fn document_identity(&self) -> String {
        self.key.document_identity()
    }

    pub fn affordance_attached(&self) -> bool {
        self.affordance_attached
    }

    pub fn mark_affordance_attached(&mut self) {
        self.affordance_attached = true;
    }

    /// Point the record at `<base><extension>`. The old file is left alone.
    pub fn set_extension(&mut self, session: &Session, extension: &str) -> Result<&Path, StoreError> {
        let Some(extension) = normalize_extension(extension) else {
            tracing::debug!(key = %self.key, extension, "ignoring unusable extension");
            return Ok(&self.path);
        };
        if extension == self.extension {
            return Ok(&self.path);
        }

        self.path = session.store().file_for(&self.base, &extension)?;
        self.extension = extension;
        self.cached = session.fs().stat(&self.path).ok();
        tracing::debug!(key = %self.key, path = %self.path.display(), "extension changed");
        Ok(&self.path)
    }

    /// Write the field's text to the file.
    ///
    /// Without `clobber` nothing is written; the cached stamp is dropped so
    /// the next `update()` reloads the file.
    pub fn write(&mut self, session: &Session, clobber: bool) -> Result<PathBuf, StoreError> {
        if !clobber {
            self.cached = None;
            return Ok(self.path.clone());
        }

        let bytes = session.prefs().charset().encode(&self.field.value());
        loop {
            match session.fs().write(&self.path, &bytes) {
                Ok(()) => break,
                Err(e) if is_name_too_long(&e) => {
                    let Some(shorter) = self.base.shortened() else {
                        return Err(StoreError::Write {
                            path: self.path.clone(),
                            source: e,
                        });
                    };
                    tracing::debug!(prefix = shorter.prefix(), "file name too long, shortening");
                    self.base = shorter;
                    self.path = session.store().file_for(&self.base, &self.extension)?;
                }
                Err(source) => {
                    return Err(StoreError::Write {
                        path: self.path.clone(),
                        source,
                    });
                }
            }
        }

        // Our own write must not look like an external edit.
        self.cached = session.fs().stat(&self.path).ok();
        tracing::debug!(key = %self.key, path = %self.path.display(), "wrote field to file");
        Ok(self.path.clone())
    }

    /// Decode the file. `None` on any I/O failure; the next scan retries.
    pub fn read(&mut self, session: &Session) -> Option<String> {
        let fs = session.fs();
        let stamp = fs.stat(&self.path).ok()?;
        let bytes = match fs.read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "read failed, retrying next scan");
                return None;
            }
        };
        self.cached = Some(stamp);
        Some(session.prefs().charset().decode(&bytes))
    }

    /// Watching, and the file's timestamp or size moved since we last
    /// touched it.
    pub fn has_changed(&self, session: &Session) -> bool {
        if !self.watching {
            return false;
        }
        let fs = session.fs();
        if !fs.exists(&self.path) || !fs.is_readable(&self.path) {
            return false;
        }
        match fs.stat(&self.path) {
            Ok(stamp) => self.cached != Some(stamp),
            Err(_) => false,
        }
    }

    /// Replace the field's value from disk if the file changed.
    /// Returns whether the value was replaced.
    pub fn update(&mut self, session: &Session) -> bool {
        if !self.has_changed(session) {
            return false;
        }
        match self.read(session) {
            Some(text) => {
                self.field.set_value(&text);
                tracing::debug!(key = %self.key, "field refreshed from file");
                true
            }
            None => false,
        }
    }

    /// Write the file and open it in the configured editor.
    ///
    /// A launch failure leaves the written file in place and does not
    /// change the watching state.
    pub fn edit(
        &mut self,
        session: &Session,
        extension: Option<&str>,
        clobber: bool,
    ) -> Result<PathBuf, EditError> {
        if let Some(ext) = extension {
            self.set_extension(session, ext)?;
        }
        let path = self.write(session, clobber)?;

        let editor = session.prefs().editor;
        session.launcher().launch(editor.as_deref(), &path)?;

        self.watching = true;
        self.edit_count += 1;
        Ok(path)
    }

    /// Best-effort delete of the backing file.
    pub fn remove(&self, session: &Session) -> bool {
        match session.store().remove(&self.path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "could not remove field file");
                false
            }
        }
    }
}

/// Pick an extension: explicit argument, then the field's declared default,
/// then an adopted on-disk extension, then the first configured one, then
/// `.txt`.
pub fn resolve_extension(
    explicit: Option<&str>,
    declared: Option<&str>,
    adopted: Option<&str>,
    configured: &[String],
) -> String {
    explicit
        .into_iter()
        .chain(declared)
        .chain(adopted)
        .chain(configured.iter().map(String::as_str))
        .find_map(normalize_extension)
        .unwrap_or_else(|| crate::config::preferences::FALLBACK_EXTENSION.to_string())
}
