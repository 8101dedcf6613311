//! Response verification checks
//!
//! No I/O. Each check takes a captured [`ResponseSnapshot`] plus the fixed
//! expectation and surfaces the first mismatch as an [`AssertionError`].
//! Mismatches are never downgraded: every one fails the enclosing step.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::apispec::ApiSpec;
use crate::config::ExpectedOptions;
use crate::posting::{Posting, resource_path, validate_url};

/// A test expectation that was not met. Surfaced verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertionError {
    #[error("expected status {expected}, got {actual}")]
    Status { expected: u16, actual: u16 },

    #[error("header `{name}`: expected `{expected}`, got `{actual}`")]
    Header {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("missing response header `{name}`")]
    MissingHeader { name: String },

    #[error("response body is not valid JSON: {detail}")]
    BodyNotJson { detail: String },

    #[error("response body does not match the published API description")]
    ApiSpecMismatch,

    #[error("malformed posting url `{url}`")]
    MalformedUrl { url: String },

    #[error("posting url `{url}` is not under base url `{base}`")]
    UrlOutsideBase { url: String, base: String },

    #[error("field `{field}` exceeds {max} characters ({len})")]
    FieldTooLong { field: String, max: u32, len: usize },

    #[error("missing field `{field}` in response posting")]
    MissingField { field: String },

    #[error("field `{field}`: expected `{expected}`, got `{actual}`")]
    FieldMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("expected empty body, got {len} bytes")]
    BodyNotEmpty { len: usize },

    #[error("posting `{target}` not found among registered postings")]
    NotRegistered { target: String },

    #[error("posting `{target}` still present among registered postings")]
    StillRegistered { target: String },
}

/// Captured HTTP response: status, headers, body text. The transport layer
/// produces these; checks and the scenario consume them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ResponseSnapshot {
    /// Header value, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// [`AssertionError::BodyNotJson`] when the body is absent or malformed.
    pub fn json(&self) -> Result<serde_json::Value, AssertionError> {
        let body = self.body.as_deref().unwrap_or_default();
        serde_json::from_str(body).map_err(|e| AssertionError::BodyNotJson {
            detail: e.to_string(),
        })
    }
}

/// Assert the response status code.
///
/// # Errors
///
/// [`AssertionError::Status`] on mismatch.
pub fn expect_status(response: &ResponseSnapshot, expected: u16) -> Result<(), AssertionError> {
    if response.status_code == expected {
        Ok(())
    } else {
        Err(AssertionError::Status {
            expected,
            actual: response.status_code,
        })
    }
}

/// Assert an exact header value.
///
/// # Errors
///
/// [`AssertionError::MissingHeader`] / [`AssertionError::Header`].
pub fn expect_header(
    response: &ResponseSnapshot,
    name: &str,
    expected: &str,
) -> Result<(), AssertionError> {
    let actual = response
        .header(name)
        .ok_or_else(|| AssertionError::MissingHeader {
            name: name.to_string(),
        })?;
    if actual == expected {
        Ok(())
    } else {
        Err(AssertionError::Header {
            name: name.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Verify the OPTIONS response on the postings URI: 200, pinned `Allow` /
/// `Vary` / `Content-Type` headers, and a body structurally equal to the
/// expected API description.
///
/// # Errors
///
/// The first failing assertion, verbatim.
pub fn verify_options_response(
    response: &ResponseSnapshot,
    expected: &ExpectedOptions,
    spec: &ApiSpec,
) -> Result<(), AssertionError> {
    expect_status(response, 200)?;
    expect_header(response, "Allow", &expected.allow)?;
    expect_header(response, "Vary", &expected.vary)?;
    expect_header(response, "Content-Type", &expected.content_type)?;
    spec.verify_document(&response.json()?)
}

/// Verify a GET response on the postings URI and parse the registered
/// collection: 200, a JSON array of complete postings, every posting URL
/// well-formed and decomposable against `base_url`.
///
/// # Errors
///
/// The first failing assertion, verbatim.
pub fn verify_postings_response(
    response: &ResponseSnapshot,
    base_url: &str,
) -> Result<Vec<Posting>, AssertionError> {
    expect_status(response, 200)?;
    let postings: Vec<Posting> =
        serde_json::from_value(response.json()?).map_err(|e| AssertionError::BodyNotJson {
            detail: e.to_string(),
        })?;
    for posting in &postings {
        verify_posting_url(posting, base_url)?;
    }
    Ok(postings)
}

/// Verify the URL invariant on a registered posting.
///
/// # Errors
///
/// The first failing assertion, verbatim.
pub fn verify_posting_url(posting: &Posting, base_url: &str) -> Result<(), AssertionError> {
    let url = posting.url.as_deref().ok_or_else(|| AssertionError::MissingField {
        field: "url".to_string(),
    })?;
    validate_url(url)?;
    resource_path(url, base_url)?;
    Ok(())
}

/// Verify a POST response: 201, body is the created posting echoing the
/// fixture's identifying fields within the published constraints.
///
/// # Errors
///
/// The first failing assertion, verbatim.
pub fn verify_created_posting(
    response: &ResponseSnapshot,
    fixture: &Posting,
    spec: &ApiSpec,
    base_url: &str,
) -> Result<Posting, AssertionError> {
    expect_status(response, 201)?;
    let created: Posting =
        serde_json::from_value(response.json()?).map_err(|e| AssertionError::BodyNotJson {
            detail: e.to_string(),
        })?;
    expect_identifying_fields(&created, fixture)?;
    spec.check_posting(&created)?;
    verify_posting_url(&created, base_url)?;
    Ok(created)
}

/// Verify a PUT response: 200, body echoing the mutated record's
/// identifying fields.
///
/// # Errors
///
/// The first failing assertion, verbatim.
pub fn verify_updated_posting(
    response: &ResponseSnapshot,
    expected: &Posting,
) -> Result<Posting, AssertionError> {
    expect_status(response, 200)?;
    let updated: Posting =
        serde_json::from_value(response.json()?).map_err(|e| AssertionError::BodyNotJson {
            detail: e.to_string(),
        })?;
    expect_identifying_fields(&updated, expected)?;
    Ok(updated)
}

/// Verify a DELETE response: 204 with an empty body.
///
/// # Errors
///
/// The first failing assertion, verbatim.
pub fn verify_deleted(response: &ResponseSnapshot) -> Result<(), AssertionError> {
    expect_status(response, 204)?;
    let len = response.body.as_deref().unwrap_or_default().len();
    if len > 0 {
        return Err(AssertionError::BodyNotEmpty { len });
    }
    Ok(())
}

/// Verify a negative request was rejected with 404.
///
/// # Errors
///
/// [`AssertionError::Status`] on mismatch.
pub fn verify_not_found(response: &ResponseSnapshot) -> Result<(), AssertionError> {
    expect_status(response, 404)
}

fn expect_identifying_fields(actual: &Posting, expected: &Posting) -> Result<(), AssertionError> {
    for (name, actual_value, expected_value) in [
        ("title", &actual.title, &expected.title),
        ("content", &actual.content, &expected.content),
    ] {
        let Some(expected_value) = expected_value else {
            continue;
        };
        match actual_value {
            None => {
                return Err(AssertionError::MissingField {
                    field: name.to_string(),
                });
            }
            Some(actual_value) if actual_value != expected_value => {
                return Err(AssertionError::FieldMismatch {
                    field: name.to_string(),
                    expected: expected_value.clone(),
                    actual: actual_value.clone(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExpectedOptions;

    const BASE: &str = "https://blog.example.com";

    fn response(status: u16, headers: &[(&str, &str)], body: Option<&str>) -> ResponseSnapshot {
        ResponseSnapshot {
            status_code: status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.map(str::to_string),
        }
    }

    fn options_response() -> ResponseSnapshot {
        let body = serde_json::to_string(&ApiSpec::default()).unwrap();
        response(
            200,
            &[
                ("allow", "GET, POST, HEAD, OPTIONS"),
                ("vary", "Accept, Cookie"),
                ("content-type", "application/json"),
            ],
            Some(&body),
        )
    }

    #[test]
    fn options_response_passes_with_pinned_headers_and_document() {
        verify_options_response(&options_response(), &ExpectedOptions::default(), &ApiSpec::default())
            .unwrap();
    }

    #[test]
    fn options_header_lookup_is_case_insensitive() {
        // reqwest lower-cases header names; expectations use canonical casing.
        let response = options_response();
        assert_eq!(response.header("Allow"), Some("GET, POST, HEAD, OPTIONS"));
        assert_eq!(response.header("ALLOW"), Some("GET, POST, HEAD, OPTIONS"));
    }

    #[test]
    fn options_response_fails_on_header_drift() {
        let mut resp = options_response();
        resp.headers
            .insert("allow".into(), "GET, HEAD, OPTIONS".into());
        let err =
            verify_options_response(&resp, &ExpectedOptions::default(), &ApiSpec::default())
                .unwrap_err();
        assert!(matches!(err, AssertionError::Header { .. }));
    }

    #[test]
    fn options_response_fails_on_missing_header() {
        let mut resp = options_response();
        resp.headers.retain(|k, _| k != "vary");
        let err =
            verify_options_response(&resp, &ExpectedOptions::default(), &ApiSpec::default())
                .unwrap_err();
        assert_eq!(
            err,
            AssertionError::MissingHeader {
                name: "Vary".into()
            }
        );
    }

    #[test]
    fn postings_response_parses_complete_records() {
        let body = serde_json::json!([{
            "url": format!("{BASE}/api/postings/1/"),
            "id": 1,
            "user": format!("{BASE}/api/users/1/"),
            "title": "Posting 1",
            "content": "Posting 1 content",
            "timestamp": "2026-08-01T12:00:00Z"
        }]);
        let resp = response(200, &[], Some(&body.to_string()));
        let postings = verify_postings_response(&resp, BASE).unwrap();
        assert_eq!(postings.len(), 1);
        assert!(postings[0].is_complete());
    }

    #[test]
    fn postings_response_rejects_foreign_resource_url() {
        let body = serde_json::json!([{
            "url": "https://elsewhere.example.com/api/postings/1/",
            "id": 1,
            "title": "Posting 1",
            "content": "Posting 1 content"
        }]);
        let resp = response(200, &[], Some(&body.to_string()));
        let err = verify_postings_response(&resp, BASE).unwrap_err();
        assert!(matches!(err, AssertionError::UrlOutsideBase { .. }));
    }

    #[test]
    fn postings_response_rejects_non_array_body() {
        let resp = response(200, &[], Some("{}"));
        assert!(matches!(
            verify_postings_response(&resp, BASE),
            Err(AssertionError::BodyNotJson { .. })
        ));
    }

    #[test]
    fn created_posting_must_echo_fixture_fields() {
        let fixture = Posting::new("Posting 1", "Posting 1 content");
        let body = serde_json::json!({
            "url": format!("{BASE}/api/postings/7/"),
            "id": 7,
            "user": format!("{BASE}/api/users/1/"),
            "title": "Posting 1",
            "content": "something else entirely",
            "timestamp": "2026-08-01T12:00:00Z"
        });
        let resp = response(201, &[], Some(&body.to_string()));
        let err =
            verify_created_posting(&resp, &fixture, &ApiSpec::default(), BASE).unwrap_err();
        assert!(matches!(err, AssertionError::FieldMismatch { ref field, .. } if field == "content"));
    }

    #[test]
    fn created_posting_passes_and_returns_full_record() {
        let fixture = Posting::new("Posting 1", "Posting 1 content");
        let body = serde_json::json!({
            "url": format!("{BASE}/api/postings/7/"),
            "id": 7,
            "user": format!("{BASE}/api/users/1/"),
            "title": "Posting 1",
            "content": "Posting 1 content",
            "timestamp": "2026-08-01T12:00:00Z"
        });
        let resp = response(201, &[], Some(&body.to_string()));
        let created = verify_created_posting(&resp, &fixture, &ApiSpec::default(), BASE).unwrap();
        assert_eq!(created.id, Some(7));
    }

    #[test]
    fn wrong_status_fails_before_body_checks() {
        let resp = response(400, &[], Some("not json"));
        let fixture = Posting::new("t", "c");
        let err = verify_created_posting(&resp, &fixture, &ApiSpec::default(), BASE).unwrap_err();
        assert_eq!(
            err,
            AssertionError::Status {
                expected: 201,
                actual: 400
            }
        );
    }

    #[test]
    fn deleted_requires_empty_204() {
        verify_deleted(&response(204, &[], None)).unwrap();
        verify_deleted(&response(204, &[], Some(""))).unwrap();
        assert!(verify_deleted(&response(200, &[], None)).is_err());
        assert!(matches!(
            verify_deleted(&response(204, &[], Some("{}"))),
            Err(AssertionError::BodyNotEmpty { len: 2 })
        ));
    }

    #[test]
    fn not_found_expects_404() {
        verify_not_found(&response(404, &[], None)).unwrap();
        assert!(verify_not_found(&response(200, &[], None)).is_err());
    }
}
