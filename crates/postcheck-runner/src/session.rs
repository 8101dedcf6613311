//! Per-actor HTTP sessions against the blog-post API
//!
//! One blocking reqwest client per actor, cookie store enabled. Each wrapper
//! issues exactly one request with that actor's configured header set and
//! returns the raw [`ResponseSnapshot`]; verification happens elsewhere.
//! Transport failures surface unmodified — no retry, no classification.

use std::collections::HashMap;
use std::time::Duration;

use postcheck_core::check::{AssertionError, ResponseSnapshot};
use postcheck_core::config::{Actor, ActorProfile, Config};
use postcheck_core::posting::{Posting, resource_path};

/// Transport-level failure.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// PUT/DELETE address the posting through its own `url`; a partial
    /// record cannot be written back.
    #[error("posting `{target}` has no url to address")]
    MissingUrl { target: String },

    #[error(transparent)]
    Assertion(#[from] AssertionError),
}

/// One actor's session: client, base URL, and per-verb header sets.
pub struct ApiSession {
    client: reqwest::blocking::Client,
    base_url: String,
    postings_uri: String,
    invalid_postings_uri: String,
    profile: ActorProfile,
    actor: Actor,
}

impl ApiSession {
    /// Build a session for `actor` from the suite configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn open(config: &Config, actor: Actor) -> Result<Self, SessionError> {
        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            postings_uri: config.postings_uri.clone(),
            invalid_postings_uri: config.invalid_postings_uri.clone(),
            profile: config.profile(actor).clone(),
            actor,
        })
    }

    #[must_use]
    pub fn actor(&self) -> Actor {
        self.actor
    }

    /// Session label from the actor profile, for progress output.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.profile.session
    }

    /// OPTIONS on the postings URI.
    ///
    /// # Errors
    ///
    /// Transport failure, unmodified.
    pub fn options_postings(&self) -> Result<ResponseSnapshot, SessionError> {
        self.execute(
            reqwest::Method::OPTIONS,
            &self.postings_uri,
            &self.profile.headers.options,
            None,
            None,
        )
    }

    /// GET on the postings URI.
    ///
    /// # Errors
    ///
    /// Transport failure, unmodified.
    pub fn fetch_postings(&self) -> Result<ResponseSnapshot, SessionError> {
        self.execute(
            reqwest::Method::GET,
            &self.postings_uri,
            &self.profile.headers.get,
            None,
            None,
        )
    }

    /// GET on the invalid postings URI (negative check).
    ///
    /// # Errors
    ///
    /// Transport failure, unmodified.
    pub fn fetch_postings_invalid(&self) -> Result<ResponseSnapshot, SessionError> {
        self.execute(
            reqwest::Method::GET,
            &self.invalid_postings_uri,
            &self.profile.headers.get,
            None,
            None,
        )
    }

    /// POST a new posting to the collection URI.
    ///
    /// # Errors
    ///
    /// Transport failure, unmodified.
    pub fn create_posting(&self, posting: &Posting) -> Result<ResponseSnapshot, SessionError> {
        self.execute(
            reqwest::Method::POST,
            &self.postings_uri,
            &self.profile.headers.post,
            None,
            Some(posting),
        )
    }

    /// PUT the full record to its own resource URL. The per-request
    /// `Referer` is the posting's URL, as the server expects.
    ///
    /// # Errors
    ///
    /// [`SessionError::MissingUrl`] for a partial record; otherwise
    /// transport failure, unmodified.
    pub fn update_posting(&self, posting: &Posting) -> Result<ResponseSnapshot, SessionError> {
        let (path, url) = self.resource_of(posting)?;
        self.execute(
            reqwest::Method::PUT,
            &path,
            &self.profile.headers.put,
            Some(&url),
            Some(posting),
        )
    }

    /// DELETE the posting at its own resource URL.
    ///
    /// # Errors
    ///
    /// [`SessionError::MissingUrl`] for a partial record; otherwise
    /// transport failure, unmodified.
    pub fn delete_posting(&self, posting: &Posting) -> Result<ResponseSnapshot, SessionError> {
        let (path, url) = self.resource_of(posting)?;
        self.execute(
            reqwest::Method::DELETE,
            &path,
            &self.profile.headers.delete,
            Some(&url),
            None,
        )
    }

    /// Resource path + absolute URL of a complete posting.
    fn resource_of(&self, posting: &Posting) -> Result<(String, String), SessionError> {
        let url = posting
            .url
            .clone()
            .ok_or_else(|| SessionError::MissingUrl {
                target: posting.label(),
            })?;
        let path = resource_path(&url, &self.base_url)?;
        Ok((path, url))
    }

    fn execute(
        &self,
        method: reqwest::Method,
        path: &str,
        headers: &HashMap<String, String>,
        referer: Option<&str>,
        body: Option<&Posting>,
    ) -> Result<ResponseSnapshot, SessionError> {
        let url = format!("{}{path}", self.base_url);

        let mut request = self.client.request(method, &url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }
        if let Some(posting) = body {
            request = request.json(posting);
        }

        let response = request.send()?;
        Ok(snapshot(response))
    }
}

/// Capture a reqwest response into a plain snapshot. Header values that are
/// not valid UTF-8 are dropped; the checks only pin ASCII header values.
fn snapshot(response: reqwest::blocking::Response) -> ResponseSnapshot {
    let status_code = response.status().as_u16();
    let headers: HashMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body_text = response.text().unwrap_or_default();
    let body = if body_text.is_empty() {
        None
    } else {
        Some(body_text)
    };

    ResponseSnapshot {
        status_code,
        headers,
        body,
    }
}
