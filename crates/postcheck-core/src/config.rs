//! Suite configuration — the typed fixture store
//!
//! Base URL, per-actor header sets, the fixture postings to create, and the
//! pinned OPTIONS expectations, loaded from TOML (or JSON) and validated up
//! front so a broken fixture fails the run before any request is sent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::apispec::ApiSpec;
use crate::posting::Posting;

/// Which actor a session authenticates as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Admin,
    User,
}

impl Actor {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suite configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the blog-post API, without a trailing slash.
    pub base_url: String,

    /// Postings collection URI, e.g. `/api/postings/`.
    #[serde(default = "default_postings_uri")]
    pub postings_uri: String,

    /// A URI that must NOT resolve, for the negative GET check.
    #[serde(default = "default_invalid_postings_uri")]
    pub invalid_postings_uri: String,

    /// Admin actor profile.
    #[serde(default = "ActorProfile::admin")]
    pub admin: ActorProfile,

    /// Regular-user actor profile.
    #[serde(default = "ActorProfile::user")]
    pub user: ActorProfile,

    /// Fixture postings the scenario creates and then drives updates and
    /// deletes against ("target postings").
    #[serde(default = "default_postings")]
    pub postings: Vec<Posting>,

    /// Pinned headers of the OPTIONS response.
    #[serde(default)]
    pub options_response: ExpectedOptions,

    /// Expected API description document.
    #[serde(default)]
    pub api_spec: ApiSpec,
}

/// One actor: a session label plus its per-verb request header sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorProfile {
    /// Session label used in progress output.
    pub session: String,

    #[serde(default)]
    pub headers: HeaderSets,
}

impl ActorProfile {
    fn admin() -> Self {
        Self {
            session: "admin session".to_string(),
            headers: HeaderSets::default(),
        }
    }

    fn user() -> Self {
        Self {
            session: "user session".to_string(),
            headers: HeaderSets::default(),
        }
    }
}

/// Request headers per verb. Enumerated fields, not a string-keyed lookup:
/// a typo in a verb name is a parse error, not a silent empty set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderSets {
    #[serde(default)]
    pub options: HashMap<String, String>,
    #[serde(default)]
    pub get: HashMap<String, String>,
    #[serde(default)]
    pub post: HashMap<String, String>,
    #[serde(default)]
    pub put: HashMap<String, String>,
    #[serde(default)]
    pub delete: HashMap<String, String>,
}

/// Pinned headers of the OPTIONS response on the postings URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedOptions {
    pub allow: String,
    pub vary: String,
    pub content_type: String,
}

impl Default for ExpectedOptions {
    fn default() -> Self {
        Self {
            allow: "GET, POST, HEAD, OPTIONS".to_string(),
            vary: "Accept, Cookie".to_string(),
            content_type: "application/json".to_string(),
        }
    }
}

fn default_postings_uri() -> String {
    "/api/postings/".to_string()
}

fn default_invalid_postings_uri() -> String {
    "/api/postingz/".to_string()
}

fn default_postings() -> Vec<Posting> {
    vec![
        Posting::new("Posting 1", "Posting 1 content"),
        Posting::new("Posting 2", "Posting 2 content"),
        Posting::new("Posting 3", "Posting 3 content"),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            postings_uri: default_postings_uri(),
            invalid_postings_uri: default_invalid_postings_uri(),
            admin: ActorProfile::admin(),
            user: ActorProfile::user(),
            postings: default_postings(),
            options_response: ExpectedOptions::default(),
            api_spec: ApiSpec::default(),
        }
    }
}

impl Config {
    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from the default locations, falling back to [`Config::default`].
    ///
    /// # Errors
    ///
    /// Returns error if a found file cannot be read, parsed, or validated.
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".postcheck.toml", ".postcheck.json", "postcheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// The profile for `actor`.
    #[must_use]
    pub fn profile(&self, actor: Actor) -> &ActorProfile {
        match actor {
            Actor::Admin => &self.admin,
            Actor::User => &self.user,
        }
    }

    /// Validate the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "base_url: unsupported scheme `{}`",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ConfigError::Invalid("base_url: missing host".to_string()));
        }
        if self.base_url.ends_with('/') {
            return Err(ConfigError::Invalid(
                "base_url: must not end with `/`".to_string(),
            ));
        }

        for (name, uri) in [
            ("postings_uri", &self.postings_uri),
            ("invalid_postings_uri", &self.invalid_postings_uri),
        ] {
            if !uri.starts_with('/') {
                return Err(ConfigError::Invalid(format!("{name}: must start with `/`")));
            }
        }

        if self.postings.is_empty() {
            return Err(ConfigError::Invalid(
                "postings: at least one fixture posting is required".to_string(),
            ));
        }
        for posting in &self.postings {
            if posting.title.is_none() || posting.content.is_none() {
                return Err(ConfigError::Invalid(format!(
                    "postings: fixture `{}` must carry both title and content",
                    posting.label()
                )));
            }
            if posting.url.is_some()
                || posting.id.is_some()
                || posting.user.is_some()
                || posting.timestamp.is_some()
            {
                return Err(ConfigError::Invalid(format!(
                    "postings: fixture `{}` sets a read-only field",
                    posting.label()
                )));
            }
            self.api_spec
                .check_posting(posting)
                .map_err(|e| ConfigError::Invalid(format!("postings: {e}")))?;
        }

        for profile in [&self.admin, &self.user] {
            for headers in [
                &profile.headers.options,
                &profile.headers.get,
                &profile.headers.post,
                &profile.headers.put,
                &profile.headers.delete,
            ] {
                for (name, value) in headers {
                    if name.is_empty() || name.contains(|c: char| c.is_whitespace()) {
                        return Err(ConfigError::Invalid(format!(
                            "{}: illegal header name `{name}`",
                            profile.session
                        )));
                    }
                    if value.contains(['\r', '\n']) {
                        return Err(ConfigError::Invalid(format!(
                            "{}: header `{name}` value contains line breaks",
                            profile.session
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Example config file contents.
    #[must_use]
    pub fn example() -> &'static str {
        r#"# postcheck configuration

# Blog-post API under test (no trailing slash)
base_url = "http://localhost:8000"

# Collection URI, and one that must 404 for the negative check
postings_uri = "/api/postings/"
invalid_postings_uri = "/api/postingz/"

# Fixture postings the scenario creates, updates, and deletes
[[postings]]
title = "Posting 1"
content = "Posting 1 content"

[[postings]]
title = "Posting 2"
content = "Posting 2 content"

[[postings]]
title = "Posting 3"
content = "Posting 3 content"

# Request headers per actor and verb (auth cookies, CSRF tokens, ...)
[admin]
session = "admin session"

[admin.headers.post]
# Cookie = "csrftoken=...; sessionid=..."
# X-CSRFTOKEN = "..."
Accept = "application/json"

[admin.headers.put]
Accept = "application/json"

[user]
session = "user session"

[user.headers.get]
Accept = "application/json"

# Pinned OPTIONS response headers
[options_response]
allow = "GET, POST, HEAD, OPTIONS"
vary = "Accept, Cookie"
content_type = "application/json"

# The expected API description defaults to the published Blog Post Api
# document; override [api_spec] only when the server's schema changes.
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.postings.len(), 3);
    }

    #[test]
    fn example_config_parses_and_validates() {
        let config: Config = toml::from_str(Config::example()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.postings_uri, "/api/postings/");
        assert_eq!(
            config.admin.headers.post.get("Accept"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn parse_toml_with_actor_headers() {
        let toml = r#"
base_url = "https://blog.example.com"

[[postings]]
title = "Posting 1"
content = "Posting 1 content"

[admin]
session = "Common Session For All Requests As Admin"

[admin.headers.put]
Cookie = "sessionid=abc"
X-CSRFTOKEN = "token"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.admin.session, "Common Session For All Requests As Admin");
        assert_eq!(
            config.admin.headers.put.get("Cookie"),
            Some(&"sessionid=abc".to_string())
        );
        // Unspecified actors and verbs fall back to defaults.
        assert_eq!(config.user.session, "user session");
        assert!(config.admin.headers.delete.is_empty());
    }

    #[test]
    fn rejects_trailing_slash_base_url() {
        let config = Config {
            base_url: "http://localhost:8000/".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_relative_uri() {
        let config = Config {
            postings_uri: "api/postings/".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_fixture_with_read_only_field() {
        let config = Config {
            postings: vec![Posting {
                id: Some(1),
                ..Posting::new("t", "c")
            }],
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_oversized_fixture() {
        let config = Config {
            postings: vec![Posting::new("t".repeat(121), "c")],
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_header_value_with_line_break() {
        let mut config = Config::default();
        config
            .admin
            .headers
            .put
            .insert("Referer".to_string(), "evil\r\nInjected: yes".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_validates_after_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postcheck.toml");
        std::fs::write(&path, "base_url = \"ftp://blog.example.com\"\n").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_reads_json_too() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postcheck.json");
        let json = serde_json::to_string(&Config::default()).unwrap();
        std::fs::write(&path, json).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
    }
}
