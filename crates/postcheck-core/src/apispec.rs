//! Typed model of the published API description
//!
//! The postings endpoint answers OPTIONS with a self-description document:
//! renderable/parseable media types plus per-action field descriptors. The
//! suite pins that document and also reuses its field constraints to vet
//! fixture payloads before they are ever sent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::check::AssertionError;
use crate::posting::Posting;

/// The API description document, as returned by OPTIONS on the postings URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Media types the endpoint renders.
    pub renders: Vec<String>,
    /// Media types the endpoint parses.
    pub parses: Vec<String>,
    pub actions: Actions,
}

/// Per-action field descriptors. The postings endpoint only describes POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actions {
    #[serde(rename = "POST")]
    pub post: BTreeMap<String, FieldSpec>,
}

/// Description of one posting field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub required: bool,
    pub read_only: bool,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Opaque relational field (url, user).
    Field,
    Integer,
    String,
    Datetime,
}

impl ApiSpec {
    /// Compare a live OPTIONS body against this document, structurally.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::ApiSpecMismatch`] on any difference.
    pub fn verify_document(&self, body: &serde_json::Value) -> Result<(), AssertionError> {
        let expected = serde_json::to_value(self).map_err(|e| AssertionError::BodyNotJson {
            detail: e.to_string(),
        })?;
        if expected == *body {
            Ok(())
        } else {
            Err(AssertionError::ApiSpecMismatch)
        }
    }

    /// Enforce the mutable-field constraints on a posting payload:
    /// present `title`/`content` must stay within their `max_length`.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::FieldTooLong`] on violation.
    pub fn check_posting(&self, posting: &Posting) -> Result<(), AssertionError> {
        for (name, value) in [("title", &posting.title), ("content", &posting.content)] {
            let (Some(value), Some(spec)) = (value, self.actions.post.get(name)) else {
                continue;
            };
            if let Some(max) = spec.max_length {
                let len = value.chars().count();
                if len > max as usize {
                    return Err(AssertionError::FieldTooLong {
                        field: name.to_string(),
                        max,
                        len,
                    });
                }
            }
        }
        Ok(())
    }

    /// Names of the read-only fields, per the descriptors.
    #[must_use]
    pub fn read_only_fields(&self) -> Vec<&str> {
        self.actions
            .post
            .iter()
            .filter(|(_, spec)| spec.read_only)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl Default for ApiSpec {
    /// The Blog Post API description.
    fn default() -> Self {
        fn read_only(kind: FieldKind, label: &str) -> FieldSpec {
            FieldSpec {
                kind,
                required: false,
                read_only: true,
                label: label.to_string(),
                max_length: None,
            }
        }
        fn writable(label: &str) -> FieldSpec {
            FieldSpec {
                kind: FieldKind::String,
                required: false,
                read_only: false,
                label: label.to_string(),
                max_length: Some(120),
            }
        }

        let post = BTreeMap::from([
            ("url".to_string(), read_only(FieldKind::Field, "Url")),
            ("id".to_string(), read_only(FieldKind::Integer, "ID")),
            ("user".to_string(), read_only(FieldKind::Field, "User")),
            ("title".to_string(), writable("Title")),
            ("content".to_string(), writable("Content")),
            (
                "timestamp".to_string(),
                read_only(FieldKind::Datetime, "Timestamp"),
            ),
        ]);

        Self {
            name: "Blog Post Api".to_string(),
            description: String::new(),
            renders: vec!["application/json".to_string(), "text/html".to_string()],
            parses: vec![
                "application/json".to_string(),
                "application/x-www-form-urlencoded".to_string(),
                "multipart/form-data".to_string(),
            ],
            actions: Actions { post },
        }
    }
}
