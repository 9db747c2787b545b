use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::location::DocumentLocation;
use super::{Document, TextField};

// ============================================================================
// Page description (YAML / JSON input for the CLI and tests)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDescription {
    pub url: String,

    #[serde(default)]
    pub fields: Vec<FieldDescription>,

    #[serde(default)]
    pub frames: Vec<PageDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescription {
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub value: String,

    /// Declared default extension (`itsalltext-extension` attribute).
    pub extension: Option<String>,

    #[serde(default)]
    pub readonly: bool,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub hidden: bool,
}

// ============================================================================
// MemoryField
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryField {
    id: Option<String>,
    name: Option<String>,
    attributes: RefCell<BTreeMap<String, String>>,
    value: RefCell<String>,
    readonly: Cell<bool>,
    disabled: Cell<bool>,
    hidden: Cell<bool>,
}

impl MemoryField {
    pub fn new(id: Option<&str>, value: &str) -> Rc<Self> {
        MemoryField::named(id, None, value)
    }

    /// A field carrying a form `name` attribute.
    pub fn named(id: Option<&str>, name: Option<&str>, value: &str) -> Rc<Self> {
        Rc::new(MemoryField {
            id: id.map(str::to_string),
            name: name.map(str::to_string),
            value: RefCell::new(value.to_string()),
            ..Default::default()
        })
    }

    pub fn from_description(desc: &FieldDescription) -> Rc<Self> {
        let field = MemoryField::named(desc.id.as_deref(), desc.name.as_deref(), &desc.value);
        if let Some(ext) = &desc.extension {
            field.set_attribute(crate::EXTENSION_ATTRIBUTE, ext);
        }
        field.readonly.set(desc.readonly);
        field.disabled.set(desc.disabled);
        field.hidden.set(desc.hidden);
        field
    }

    pub fn set_readonly(&self, readonly: bool) {
        self.readonly.set(readonly);
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
    }
}

impl TextField for MemoryField {
    fn element_id(&self) -> Option<String> {
        self.id.clone().filter(|id| !id.is_empty())
    }

    fn name(&self) -> Option<String> {
        self.name.clone().filter(|name| !name.is_empty())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn set_value(&self, text: &str) {
        *self.value.borrow_mut() = text.to_string();
    }

    fn is_editable(&self) -> bool {
        !(self.readonly.get() || self.disabled.get() || self.hidden.get())
    }
}

// ============================================================================
// MemoryDocument
// ============================================================================

type Observer = Box<dyn Fn()>;

/// In-process document with structural-change observers.
///
/// Observers fire synchronously on every insertion (fields or overlays),
/// the same way a host mutation observer would.
pub struct MemoryDocument {
    location: DocumentLocation,
    live: Cell<bool>,
    serial: Cell<u64>,
    fields: RefCell<Vec<Rc<MemoryField>>>,
    frames: RefCell<Vec<Rc<MemoryDocument>>>,
    overlays: RefCell<Vec<String>>,
    observers: RefCell<Vec<Observer>>,
}

impl MemoryDocument {
    pub fn new(url: &str) -> Result<Rc<Self>, url::ParseError> {
        Ok(Rc::new(MemoryDocument {
            location: DocumentLocation::parse(url)?,
            live: Cell::new(true),
            serial: Cell::new(0),
            fields: RefCell::new(Vec::new()),
            frames: RefCell::new(Vec::new()),
            overlays: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
        }))
    }

    pub fn from_description(desc: &PageDescription) -> Result<Rc<Self>, url::ParseError> {
        let doc = MemoryDocument::new(&desc.url)?;
        for field in &desc.fields {
            doc.fields
                .borrow_mut()
                .push(MemoryField::from_description(field));
        }
        for frame in &desc.frames {
            let child = MemoryDocument::from_description(frame)?;
            doc.frames.borrow_mut().push(child);
        }
        Ok(doc)
    }

    /// Register a structural-change observer.
    pub fn observe(&self, observer: impl Fn() + 'static) {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    pub fn insert_field(&self, field: Rc<MemoryField>) {
        self.fields.borrow_mut().push(field);
        self.notify();
    }

    /// Detach a field node. Returns false if it was not part of this document.
    pub fn remove_field(&self, field: &Rc<MemoryField>) -> bool {
        let mut fields = self.fields.borrow_mut();
        let before = fields.len();
        fields.retain(|f| !Rc::ptr_eq(f, field));
        fields.len() != before
    }

    pub fn add_frame(&self, frame: Rc<MemoryDocument>) {
        self.frames.borrow_mut().push(frame);
        self.notify();
    }

    /// Insert a decoration node (e.g. an edit affordance).
    pub fn append_overlay(&self, label: &str) {
        self.overlays.borrow_mut().push(label.to_string());
        self.notify();
    }

    pub fn overlays(&self) -> Vec<String> {
        self.overlays.borrow().clone()
    }

    pub fn fields(&self) -> Vec<Rc<MemoryField>> {
        self.fields.borrow().clone()
    }

    pub fn field_by_id(&self, id: &str) -> Option<Rc<MemoryField>> {
        let found = self
            .fields
            .borrow()
            .iter()
            .find(|f| f.element_id().as_deref() == Some(id))
            .cloned();
        found.or_else(|| {
            self.frames
                .borrow()
                .iter()
                .find_map(|frame| frame.field_by_id(id))
        })
    }

    /// Mark this document and its frames as torn down.
    pub fn unload(&self) {
        self.live.set(false);
        for frame in self.frames.borrow().iter() {
            frame.unload();
        }
    }

    fn notify(&self) {
        for observer in self.observers.borrow().iter() {
            observer();
        }
    }
}

impl Document for MemoryDocument {
    fn location(&self) -> DocumentLocation {
        self.location.clone()
    }

    fn is_live(&self) -> bool {
        self.live.get()
    }

    fn text_fields(&self) -> Vec<Rc<dyn TextField>> {
        self.fields
            .borrow()
            .iter()
            .map(|f| f.clone() as Rc<dyn TextField>)
            .collect()
    }

    fn frames(&self) -> Vec<Rc<dyn Document>> {
        self.frames
            .borrow()
            .iter()
            .map(|f| f.clone() as Rc<dyn Document>)
            .collect()
    }

    fn next_serial(&self) -> u64 {
        let next = self.serial.get() + 1;
        self.serial.set(next);
        next
    }
}
