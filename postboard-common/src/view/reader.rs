use crate::view::ViewKind;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// How strictly a write view treats absent fields.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum WriteMode {
    /// Required fields must be present, defaulted fields fall back to their default.
    Create,
    /// Required fields must be present, defaulted fields keep their stored value.
    Replace,
    /// Every field may be omitted.
    Patch,
}

/// Field-level validation messages keyed by field name.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Pulls typed fields out of a JSON object on behalf of one write view.
///
/// Only the view's writable fields are visible. Everything else in the payload,
/// read-only fields included, is dropped on construction. Problems are collected
/// so a single response can name every offending field.
#[derive(Debug)]
pub struct FieldReader {
    mode: WriteMode,
    fields: Map<String, Value>,
    errors: ValidationErrors,
}

impl FieldReader {
    #[must_use]
    pub fn new(kind: ViewKind, mode: WriteMode, mut payload: Map<String, Value>) -> Self {
        let writable = kind.writable();
        payload.retain(|name, _| writable.contains(&name.as_str()));

        Self {
            mode,
            fields: payload,
            errors: ValidationErrors::new(),
        }
    }

    /// A field without a default. Absence is an error unless patching.
    pub fn required<T: DeserializeOwned>(&mut self, name: &'static str) -> Option<T> {
        if !self.fields.contains_key(name) && self.mode != WriteMode::Patch {
            self.errors.add(name, "This field is required.");
        }
        self.decode(name)
    }

    /// A field with a default. Absence is never an error.
    pub fn defaulted<T: DeserializeOwned>(&mut self, name: &'static str) -> Option<T> {
        self.decode(name)
    }

    /// A required text field, trimmed, non-blank and optionally length-limited.
    pub fn text(&mut self, name: &'static str, max_len: Option<usize>) -> Option<String> {
        let text = self.required::<String>(name)?;
        let text = text.trim();

        if text.is_empty() {
            self.errors.add(name, "This field may not be blank.");
            return None;
        }
        if let Some(max_len) = max_len
            && text.chars().count() > max_len
        {
            self.errors.add(
                name,
                format!("Ensure this field has no more than {max_len} characters."),
            );
            return None;
        }

        Some(text.to_owned())
    }

    fn decode<T: DeserializeOwned>(&mut self, name: &'static str) -> Option<T> {
        match self.fields.remove(name)? {
            Value::Null => {
                self.errors.add(name, "This field may not be null.");
                None
            }
            value => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    self.errors.add(name, err.to_string());
                    None
                }
            },
        }
    }

    pub fn finish<T>(self, parsed: Option<T>) -> Result<T, ValidationErrors> {
        match parsed {
            Some(parsed) if self.errors.is_empty() => Ok(parsed),
            None if self.errors.is_empty() => {
                Err(ValidationErrors::single(NON_FIELD_ERRORS, "Invalid data."))
            }
            _ => Err(self.errors),
        }
    }
}
