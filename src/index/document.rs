//! Documents: ordered lists of named text values.
//!
//! A field name may repeat; each occurrence is one value of a multi-valued
//! field, kept in insertion order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GlaiveError, Result};

/// A single named text value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// A document to be indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    fields: Vec<Field>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a document.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Append a text value.
    pub fn add_text<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
    }

    /// All values in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The first value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Every value of `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Distinct field names in first-appearance order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for field in &self.fields {
            if !names.contains(&field.name.as_str()) {
                names.push(&field.name);
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a document from a JSON object.
    ///
    /// String members become one value; arrays become one value per element.
    /// Numbers and booleans are indexed by their JSON text, nulls are skipped.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| GlaiveError::index("document must be a JSON object"))?;

        let mut doc = Document::new();
        for (name, member) in object {
            match member {
                Value::Array(items) => {
                    for item in items {
                        if let Some(text) = scalar_text(item)? {
                            doc.add_text(name.as_str(), text);
                        }
                    }
                }
                other => {
                    if let Some(text) = scalar_text(other)? {
                        doc.add_text(name.as_str(), text);
                    }
                }
            }
        }
        Ok(doc)
    }

    /// Parse a single JSON object.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_json(&value)
    }
}

fn scalar_text(value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => Err(GlaiveError::index(
            "nested arrays and objects are not supported as field values",
        )),
    }
}

/// Builder for [`Document`].
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    doc: Document,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_text<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.doc.add_text(name, value);
        self
    }

    pub fn build(self) -> Document {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_multi_values() {
        let doc = Document::builder()
            .add_text("title", "Highlighting")
            .add_text("body", "first value")
            .add_text("body", "second value")
            .build();

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get("title"), Some("Highlighting"));
        assert_eq!(
            doc.get_all("body").collect::<Vec<_>>(),
            vec!["first value", "second value"]
        );
        assert_eq!(doc.field_names(), vec!["title", "body"]);
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn test_get_outlives_name_argument() {
        let doc = Document::builder().add_text("body", "kept").build();
        let value = {
            let name = String::from("body");
            doc.get(&name)
        };
        assert_eq!(value, Some("kept"));
    }

    #[test]
    fn test_from_json() {
        let doc =
            Document::from_json_str(r#"{"body": ["one", "two"], "id": 7, "note": null}"#).unwrap();
        assert_eq!(doc.get_all("body").collect::<Vec<_>>(), vec!["one", "two"]);
        assert_eq!(doc.get("id"), Some("7"));
        assert_eq!(doc.get("note"), None);
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Document::from_json_str("[1, 2]").is_err());
        assert!(Document::from_json_str(r#"{"body": {"nested": true}}"#).is_err());
    }
}
