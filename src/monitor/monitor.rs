use std::cell::{Cell, Ref, RefCell, RefMut};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::preferences::GumdropPosition;
use crate::config::store::PrefKey;
use crate::dom::memory::MemoryDocument;
use crate::dom::{Document, TextField};
use crate::monitor::lock::{LockGuard, ReentrancyLock};
use crate::ports::clock::{Clock, SystemClock};
use crate::record::error::EditError;
use crate::record::field_record::FieldRecord;
use crate::session::Session;
use crate::tracker::tracker::Tracker;

/// Ticks arriving before this fraction of the interval has elapsed are skipped.
pub const TICK_SLACK: f64 = 0.9;

// ============================================================================
// AffordanceHook
// ============================================================================

/// Visual affordance ("gumdrop") management, implemented by the host UI.
///
/// Both calls happen under the re-entrancy lock, so DOM insertions they
/// perform never retrigger a scan.
pub trait AffordanceHook {
    fn attach(&self, document: &Rc<dyn Document>, record: &FieldRecord, position: GumdropPosition);

    /// The field's value was just replaced from disk. `fade` is how long
    /// the highlight should take to fade out.
    fn refreshed(&self, _record: &FieldRecord, _fade: Duration) {}
}

/// What one scan did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub documents: usize,
    pub fields: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

impl ScanReport {
    fn merge(&mut self, other: &ScanReport) {
        self.documents += other.documents;
        self.fields += other.fields;
        self.created += other.created;
        self.updated += other.updated;
        self.failed += other.failed;
    }
}

// ============================================================================
// Monitor
// ============================================================================

/// Drives timer- and mutation-triggered scans over the watched documents.
pub struct Monitor {
    session: Rc<Session>,
    tracker: RefCell<Tracker>,
    documents: RefCell<Vec<Rc<dyn Document>>>,
    lock: ReentrancyLock,
    clock: Rc<dyn Clock>,
    last_scan: Cell<Option<Instant>>,
    interval_changed: Rc<Cell<bool>>,
    affordance: Option<Box<dyn AffordanceHook>>,
}

impl Monitor {
    pub fn new(session: Rc<Session>) -> Self {
        let interval_changed = Rc::new(Cell::new(false));
        let flag = interval_changed.clone();
        session.config().subscribe(Box::new(move |keys, _| {
            if keys.contains(&PrefKey::RefreshSecs) {
                flag.set(true);
            }
        }));

        Monitor {
            session,
            tracker: RefCell::new(Tracker::new()),
            documents: RefCell::new(Vec::new()),
            lock: ReentrancyLock::new(),
            clock: Rc::new(SystemClock),
            last_scan: Cell::new(None),
            interval_changed,
            affordance: None,
        }
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_affordance(mut self, hook: Box<dyn AffordanceHook>) -> Self {
        self.affordance = Some(hook);
        self
    }

    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    pub fn tracker(&self) -> Ref<'_, Tracker> {
        self.tracker.borrow()
    }

    pub fn tracker_mut(&self) -> RefMut<'_, Tracker> {
        self.tracker.borrow_mut()
    }

    /// Hold while the host performs its own mutations on a watched document.
    pub fn lock(&self) -> LockGuard<'_> {
        self.lock.hold()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_held()
    }

    pub fn watched(&self) -> usize {
        self.documents.borrow().len()
    }

    /// Start watching `document` and scan it right away.
    pub fn watch(&self, document: Rc<dyn Document>) -> Option<ScanReport> {
        let known = self
            .documents
            .borrow()
            .iter()
            .any(|d| Rc::ptr_eq(d, &document));
        if !known {
            tracing::debug!(location = %document.location(), "watching document");
            self.documents.borrow_mut().push(document.clone());
        }
        self.scan_document(&document)
    }

    /// Forward structural changes of a memory document to this monitor.
    pub fn observe(self: &Rc<Self>, document: &Rc<MemoryDocument>) {
        let monitor = Rc::downgrade(self);
        let weak_doc = Rc::downgrade(document);
        document.observe(move || {
            if let (Some(monitor), Some(doc)) = (monitor.upgrade(), weak_doc.upgrade()) {
                let doc: Rc<dyn Document> = doc;
                monitor.on_structure_changed(&doc);
            }
        });
    }

    /// Teardown of `document`: stop watching and release its records.
    pub fn unload(&self, document: &Rc<dyn Document>) -> usize {
        self.documents
            .borrow_mut()
            .retain(|d| !Rc::ptr_eq(d, document));

        let mut tracker = self.tracker.borrow_mut();
        let mut released = forget_tree(&mut tracker, document);
        released += tracker.sweep();
        tracing::debug!(location = %document.location(), released, "document unloaded");
        released
    }

    /// Timer entry point. Scans every watched document unless the previous
    /// scan was too recent or a scan is already running.
    pub fn tick(&self) -> Option<ScanReport> {
        self.session.launcher().drain_completions();

        let now = self.clock.now();
        let interval = self.session.prefs().refresh_interval();
        if self.interval_changed.replace(false) {
            self.last_scan.set(None);
        }

        if let Some(last) = self.last_scan.get() {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < interval.mul_f64(TICK_SLACK) {
                tracing::trace!(?elapsed, ?interval, "tick skipped, scanned recently");
                return None;
            }
        }
        if self.lock.is_held() {
            tracing::debug!("tick skipped, scan in progress");
            return None;
        }
        self.last_scan.set(Some(now));

        self.release_dead_documents();
        let documents: Vec<Rc<dyn Document>> = self.documents.borrow().clone();
        let mut report = ScanReport::default();
        for document in &documents {
            if let Some(scanned) = self.scan_document(document) {
                report.merge(&scanned);
            }
        }
        Some(report)
    }

    /// Host signal that `document`'s set of fields may have changed.
    /// Ignored while the monitor itself is mutating the DOM.
    pub fn on_structure_changed(&self, document: &Rc<dyn Document>) -> Option<ScanReport> {
        if self.lock.is_held() {
            tracing::trace!("ignoring self-induced structural change");
            return None;
        }
        self.scan_document(document)
    }

    /// Scan one document tree. `None` when a scan is already in progress.
    pub fn scan_document(&self, document: &Rc<dyn Document>) -> Option<ScanReport> {
        if self.lock.is_held() {
            return None;
        }
        let _guard = self.lock.hold();
        let mut tracker = self.tracker.borrow_mut();
        let mut report = ScanReport::default();
        self.scan_tree(&mut tracker, document, &mut report);
        Some(report)
    }

    /// Get-or-create the record for `field` and open it in the editor.
    pub fn edit_field(
        &self,
        document: &Rc<dyn Document>,
        field: &Rc<dyn TextField>,
        extension: Option<&str>,
    ) -> Result<PathBuf, EditError> {
        let _guard = self.lock.hold();
        let mut tracker = self.tracker.borrow_mut();
        let record = tracker.get_or_create(&self.session, document, field)?;
        match record.edit(&self.session, extension, true) {
            Ok(path) => Ok(path),
            Err(e) => {
                tracing::warn!(key = %record.key(), error = %e, "edit failed");
                Err(e)
            }
        }
    }

    fn scan_tree(&self, tracker: &mut Tracker, document: &Rc<dyn Document>, report: &mut ScanReport) {
        if !document.is_live() {
            return;
        }
        report.documents += 1;

        let position = self.session.prefs().gumdrop_position;
        for field in document.text_fields() {
            report.fields += 1;
            let existed = tracker.get_for_field(&field).is_some();

            // One field failing must not stop the rest of the scan.
            let record = match tracker.get_or_create(&self.session, document, &field) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(location = %document.location(), error = %e, "could not track field");
                    report.failed += 1;
                    continue;
                }
            };
            if !existed {
                report.created += 1;
            }

            if let Some(hook) = &self.affordance {
                if position.is_enabled() && field.is_editable() && !record.affordance_attached() {
                    let _guard = self.lock.hold();
                    hook.attach(document, record, position);
                    record.mark_affordance_attached();
                }
            }

            if record.update(&self.session) {
                report.updated += 1;
                if let Some(hook) = &self.affordance {
                    hook.refreshed(record, self.session.prefs().fade_duration());
                }
            }
        }

        for frame in document.frames() {
            self.scan_tree(tracker, &frame, report);
        }
    }

    fn release_dead_documents(&self) {
        let dead: Vec<Rc<dyn Document>> = self
            .documents
            .borrow()
            .iter()
            .filter(|d| !d.is_live())
            .cloned()
            .collect();
        for document in &dead {
            self.unload(document);
        }
    }
}

fn forget_tree(tracker: &mut Tracker, document: &Rc<dyn Document>) -> usize {
    let mut released = tracker.forget_document(document);
    for frame in document.frames() {
        released += forget_tree(tracker, &frame);
    }
    released
}
