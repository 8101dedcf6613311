//! Scenario context — named values shared between workflow steps
//!
//! Collections produced by one step (the registered postings, the resolved
//! target postings) are consumed by later ones. The context is an explicit
//! value passed by reference into each step; there is no process-wide
//! registry.

use std::collections::HashMap;

use thiserror::Error;

use crate::posting::Posting;

/// Key under which the last-fetched registered postings are stored.
pub const REGISTERED_POSTINGS: &str = "registered postings";

/// Key under which the resolved target postings are stored.
pub const TARGET_POSTINGS: &str = "target postings";

/// A step asked for a value the context does not hold, or holds with the
/// wrong shape. Precondition violation, fatal to the step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("no value named `{0}` in scenario context")]
    Missing(String),
    #[error("value named `{0}` is not a posting collection")]
    WrongShape(String),
}

/// String-keyed store of JSON values with typed accessors for posting
/// collections.
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    values: HashMap<String, serde_json::Value>,
}

impl ScenarioContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw JSON value under `name`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.values.insert(name.into(), value);
    }

    /// Raw JSON value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    /// Store a posting collection under `name`.
    pub fn set_postings(&mut self, name: impl Into<String>, postings: &[Posting]) {
        // Posting serialization is infallible: all fields are JSON-native.
        let value = serde_json::to_value(postings).unwrap_or(serde_json::Value::Null);
        self.set(name, value);
    }

    /// Posting collection stored under `name`.
    ///
    /// # Errors
    ///
    /// [`ContextError::Missing`] / [`ContextError::WrongShape`].
    pub fn postings(&self, name: &str) -> Result<Vec<Posting>, ContextError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| ContextError::Missing(name.to_string()))?;
        serde_json::from_value(value.clone())
            .map_err(|_| ContextError::WrongShape(name.to_string()))
    }
}
