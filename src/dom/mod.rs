pub mod location;
pub mod memory;

use std::rc::Rc;

use self::location::DocumentLocation;

/// A text-entry element eligible for external editing.
///
/// Methods take `&self`: host elements are shared handles whose state the
/// host mutates behind our back.
pub trait TextField {
    /// Explicit `id` attribute, if the page set one.
    fn element_id(&self) -> Option<String>;

    /// Form `name` attribute, if any.
    fn name(&self) -> Option<String>;

    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);

    fn value(&self) -> String;
    fn set_value(&self, text: &str);

    /// False when hidden, disabled, or readonly.
    fn is_editable(&self) -> bool;
}

/// A loaded document the monitor can scan.
pub trait Document {
    fn location(&self) -> DocumentLocation;

    /// False once the document was unloaded or navigated away from.
    fn is_live(&self) -> bool;

    /// Trackable fields in encounter order.
    fn text_fields(&self) -> Vec<Rc<dyn TextField>>;

    /// Nested documents (frames), scanned recursively.
    fn frames(&self) -> Vec<Rc<dyn Document>>;

    /// Per-document monotonically increasing serial for synthetic node ids.
    fn next_serial(&self) -> u64;
}
