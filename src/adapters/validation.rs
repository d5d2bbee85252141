//! Required-field validation for top-level snapshot records

use serde_json::{Map, Value};

use super::bind::{Bind, shape_of};
use crate::{Result, TelemetryError};

/// Field accessor over a decoded snapshot object.
///
/// Required fields fail the whole bind with a [`TelemetryError::Validation`]
/// naming the field; optional fields resolve to `None` on any mismatch.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    record: &'static str,
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Open `value` as the object form of `record`.
    pub fn of(record: &'static str, value: &'a Value) -> Result<Self> {
        match value.as_object() {
            Some(object) => Ok(Self { record, object }),
            None => Err(TelemetryError::validation(record, "<root>", "object", shape_of(value))),
        }
    }

    /// A field that must be present with the declared shape.
    pub fn required<T: Bind>(&self, key: &str) -> Result<T> {
        let value = self
            .object
            .get(key)
            .ok_or_else(|| TelemetryError::validation(self.record, key, T::EXPECTED, "missing"))?;

        T::bind(value).ok_or_else(|| {
            TelemetryError::validation(self.record, key, T::EXPECTED, shape_of(value))
        })
    }

    /// A field that is absent whenever it is missing or mistyped.
    pub fn optional<T: Bind>(&self, key: &str) -> Option<T> {
        self.object.get(key).and_then(T::bind)
    }
}
