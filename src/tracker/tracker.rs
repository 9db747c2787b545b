use std::collections::HashMap;
use std::rc::Rc;

use crate::UID_ATTRIBUTE;
use crate::dom::{Document, TextField};
use crate::identity::field_key::Uid;
use crate::record::field_record::FieldRecord;
use crate::session::Session;
use crate::store::error::StoreError;

/// Live field records keyed by uid.
///
/// Uids are never persisted; continuity across reloads comes from the
/// on-disk base names, not from this registry.
#[derive(Default)]
pub struct Tracker {
    records: HashMap<Uid, FieldRecord>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, uid: &Uid) -> Option<&FieldRecord> {
        self.records.get(uid)
    }

    pub fn get_mut(&mut self, uid: &Uid) -> Option<&mut FieldRecord> {
        self.records.get_mut(uid)
    }

    /// Record for `field` via its uid marker, if it still tracks that exact node.
    pub fn get_for_field(&mut self, field: &Rc<dyn TextField>) -> Option<&mut FieldRecord> {
        let uid = Uid::from(field.attribute(UID_ATTRIBUTE)?);
        self.records
            .get_mut(&uid)
            .filter(|record| record.is_node(field))
    }

    /// Existing record for `field`, or a new one.
    ///
    /// A node carrying a uid marker that belongs to another node (copied or
    /// forged by the page) gets its own record.
    pub fn get_or_create(
        &mut self,
        session: &Session,
        document: &Rc<dyn Document>,
        field: &Rc<dyn TextField>,
    ) -> Result<&mut FieldRecord, StoreError> {
        let reusable = field
            .attribute(UID_ATTRIBUTE)
            .map(Uid::from)
            .filter(|uid| self.records.get(uid).is_some_and(|r| r.is_node(field)));

        let record = match reusable.and_then(|uid| self.records.remove(&uid)) {
            Some(record) => record,
            None => {
                let record = FieldRecord::new(session, document, field.clone())?;
                tracing::debug!(uid = %record.uid(), key = %record.key(), "tracking field");
                record
            }
        };

        Ok(self.records.entry(record.uid().clone()).or_insert(record))
    }

    pub fn forget(&mut self, uid: &Uid) -> Option<FieldRecord> {
        self.records.remove(uid)
    }

    /// Drop every record belonging to `document`. Returns how many went.
    pub fn forget_document(&mut self, document: &Rc<dyn Document>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !record.belongs_to(document));
        before - self.records.len()
    }

    /// Evict records whose document is gone or no longer live.
    pub fn sweep(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| record.is_document_live());
        let evicted = before - self.records.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.records.len(), "swept field records");
        }
        evicted
    }

    pub fn records(&self) -> impl Iterator<Item = &FieldRecord> {
        self.records.values()
    }
}
