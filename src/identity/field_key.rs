use std::fmt;

use crate::GENERATED_ID_ATTRIBUTE;
use crate::dom::location::DocumentLocation;
use crate::dom::{Document, TextField};
use crate::identity::hasher::{UID_LEN, salted_hash};

/// Logical identity of a field within a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub location: DocumentLocation,
    pub node: String,
}

impl FieldKey {
    /// Derive the key for `field`, assigning a synthetic node id on first
    /// encounter when the element has no explicit id.
    pub fn for_field(document: &dyn Document, field: &dyn TextField) -> Self {
        FieldKey {
            location: document.location(),
            node: node_identity(document, field),
        }
    }

    pub fn document_identity(&self) -> String {
        self.location.identity()
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.location, self.node)
    }
}

/// Explicit id if present, else the field's name plus a serial, stored on
/// the node so repeated scans of the same node agree.
pub fn node_identity(document: &dyn Document, field: &dyn TextField) -> String {
    if let Some(id) = field.element_id() {
        return id;
    }
    if let Some(generated) = field.attribute(GENERATED_ID_ATTRIBUTE) {
        return generated;
    }
    let serial = document.next_serial();
    let generated = match field.name() {
        Some(name) => format!("itsalltext-{}-{}", name, serial),
        None => format!("itsalltext-{}", serial),
    };
    field.set_attribute(GENERATED_ID_ATTRIBUTE, &generated);
    generated
}

/// Opaque, process-local handle for one live field record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(String);

impl Uid {
    /// A fresh uid for `key`. Never derived deterministically from the key.
    pub fn generate(key: &FieldKey) -> Self {
        Uid(salted_hash(&[key.document_identity(), key.node.clone()], UID_LEN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Uid {
    fn from(value: String) -> Self {
        Uid(value)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
