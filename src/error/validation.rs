//! # Field Validation Errors
//!
//! The error side of the changeset pipeline: one [`FieldError`] per broken
//! rule, kept in the order the rules ran. Errors are reported individually so
//! a form layer can attach each message to the field that caused it.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single `(field, message)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field path, e.g. `"from"`, `"to_csv"` or `"template.body"`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// All validation failures collected for one candidate record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("validation failed: {}", joined(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn joined(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Messages attached to `field`, in the order they were raised.
    pub fn on<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn has(&self, field: &str) -> bool {
        self.on(field).next().is_some()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_messages_per_field_in_order() {
        let mut errors = ValidationErrors::new();
        errors.push("to_csv", "x must have the @ sign and no spaces");
        errors.push("subject", "can't be blank");
        errors.push("to_csv", "y must have the @ sign and no spaces");

        assert_eq!(errors.len(), 3);
        assert!(errors.has("subject"));
        assert!(!errors.has("from"));
        assert_eq!(
            errors.on("to_csv").collect::<Vec<_>>(),
            vec![
                "x must have the @ sign and no spaces",
                "y must have the @ sign and no spaces"
            ]
        );
    }

    #[test]
    fn display_lists_every_error() {
        let mut errors = ValidationErrors::new();
        errors.push("from", "can't be blank");
        errors.push("subject", "should be at least 5 character(s)");

        assert_eq!(
            errors.to_string(),
            "validation failed: from can't be blank; subject should be at least 5 character(s)"
        );
    }

    #[test]
    fn serializes_as_a_flat_list() {
        let mut errors = ValidationErrors::new();
        errors.push("to", "must have at least one recipient or recipient key");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"field": "to", "message": "must have at least one recipient or recipient key"}
            ])
        );
    }
}
