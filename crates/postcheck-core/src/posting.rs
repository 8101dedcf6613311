//! The Posting record — one blog post as the remote API represents it
//!
//! A Posting may be *partial* (only the fields a test cares about, typically
//! `title` + `content`) or *complete* (all six fields, as returned by the
//! server). Absent fields are omitted from serialized payloads.

use serde::{Deserialize, Serialize};

use crate::check::AssertionError;

/// One blog-post record. Fields mirror the published API description:
/// `url`, `id`, `user` and `timestamp` are server-assigned and read-only,
/// `title` and `content` are the mutable identifying fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// Absolute resource URL, server-assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Numeric id, server-assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Owning user. Opaque — the suite never inspects it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Creation timestamp, server-assigned. Carried as an opaque string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Posting {
    /// Partial posting carrying only the identifying fields.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// All six fields present, i.e. the record came back from the server.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.url.is_some()
            && self.id.is_some()
            && self.user.is_some()
            && self.title.is_some()
            && self.content.is_some()
            && self.timestamp.is_some()
    }

    /// Short label for error messages: the title if present, otherwise the
    /// content, otherwise a placeholder.
    #[must_use]
    pub fn label(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.content.clone())
            .unwrap_or_else(|| "<no identifying fields>".to_string())
    }
}

/// Check that `url` is a well-formed absolute URL with non-empty scheme,
/// host, and path.
///
/// # Errors
///
/// Returns [`AssertionError::MalformedUrl`] otherwise.
pub fn validate_url(url: &str) -> Result<(), AssertionError> {
    let parsed = url::Url::parse(url).map_err(|_| AssertionError::MalformedUrl {
        url: url.to_string(),
    })?;
    let has_host = parsed.host_str().is_some_and(|h| !h.is_empty());
    if parsed.scheme().is_empty() || !has_host || parsed.path().is_empty() || parsed.path() == "/" {
        return Err(AssertionError::MalformedUrl {
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Decompose a resource URL into the relative path under `base_url`.
///
/// `"https://host/api/postings/11/"` with base `"https://host"` yields
/// `"/api/postings/11/"`.
///
/// # Errors
///
/// Returns [`AssertionError::UrlOutsideBase`] when `url` does not start with
/// `base_url` or the remainder is empty.
pub fn resource_path(url: &str, base_url: &str) -> Result<String, AssertionError> {
    match url.strip_prefix(base_url) {
        Some(path) if !path.is_empty() => Ok(path.to_string()),
        _ => Err(AssertionError::UrlOutsideBase {
            url: url.to_string(),
            base: base_url.to_string(),
        }),
    }
}
