//! Stored-field retrieval.

/// The visitor's answer when offered a stored field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitStatus {
    /// Deliver this value.
    Yes,
    /// Skip this value and keep going.
    No,
    /// Skip this value and every value after it.
    Stop,
}

/// Receives the stored values of one document, in the order they were added.
pub trait StoredFieldVisitor {
    /// Called before each stored value.
    fn needs_field(&mut self, field: &str) -> VisitStatus;

    /// Called with the value when [`needs_field`](Self::needs_field) said yes.
    fn string_field(&mut self, field: &str, value: &str);
}

/// Collects every stored value of a document.
#[derive(Debug, Default)]
pub struct DocumentCollector {
    pub fields: Vec<(String, String)>,
}

impl StoredFieldVisitor for DocumentCollector {
    fn needs_field(&mut self, _field: &str) -> VisitStatus {
        VisitStatus::Yes
    }

    fn string_field(&mut self, field: &str, value: &str) {
        self.fields.push((field.to_string(), value.to_string()));
    }
}
