// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::{Result, SearchError};
use crate::services::logging::redact_secret;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER: &str = "elastic";
pub const DEFAULT_INDEX_NAME: &str = "index_cuentos";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// How the client authenticates against the search service
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Sent as `Authorization: ApiKey <key>`
    ApiKey(String),
    /// HTTP basic authentication
    Basic { username: String, password: String },
}

impl Credentials {
    /// Pick the credential pair. The API key wins when both are configured.
    pub fn resolve(
        api_key: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Option<Self> {
        match (api_key, password) {
            (Some(key), _) => Some(Credentials::ApiKey(key)),
            (None, Some(password)) => Some(Credentials::Basic {
                username: username.unwrap_or_else(|| DEFAULT_USER.to_string()),
                password,
            }),
            (None, None) => None,
        }
    }
}

// Secrets never reach logs through `{:?}`
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(key) => f.debug_tuple("ApiKey").field(&redact_secret(key)).finish(),
            Credentials::Basic { username, password } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &redact_secret(password))
                .finish(),
        }
    }
}

impl std::fmt::Display for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => write!(f, "api_key"),
            Credentials::Basic { username, .. } => write!(f, "basic ({})", username),
        }
    }
}

/// Connection and index settings, passed explicitly to every component that
/// needs them.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the search service
    pub endpoint: Url,
    pub credentials: Credentials,
    /// Applied to every HTTP request
    pub request_timeout: Duration,
    /// Extra attempts on timeouts, connection failures and gateway errors
    pub max_retries: u32,
    pub index_name: String,
    /// `tracing` filter directive for the binary
    pub log_level: String,
    /// Log lines are also appended to this file when set
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Every violation is collected, so a single error names all of them.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut violations = Vec::new();

        let endpoint = match get("ELASTIC_URL").or_else(|| get("ELASTIC_CLOUD_ID")) {
            Some(raw) => match parse_endpoint(&raw) {
                Ok(url) => Some(url),
                Err(reason) => {
                    violations.push(reason);
                    None
                }
            },
            None => {
                violations.push("ELASTIC_URL (or ELASTIC_CLOUD_ID) must be set".to_string());
                None
            }
        };

        let credentials = Credentials::resolve(
            get("ELASTIC_API_KEY"),
            get("ELASTIC_USER"),
            get("ELASTIC_PASSWORD"),
        );
        if credentials.is_none() {
            violations.push("ELASTIC_API_KEY or ELASTIC_PASSWORD must be set".to_string());
        }

        let request_timeout = match get("ELASTIC_REQUEST_TIMEOUT_SECS") {
            None => Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(secs),
                _ => {
                    violations.push(format!(
                        "ELASTIC_REQUEST_TIMEOUT_SECS must be a whole number of seconds > 0, got: {}",
                        raw
                    ));
                    None
                }
            },
        };

        let max_retries = match get("ELASTIC_MAX_RETRIES") {
            None => Some(DEFAULT_MAX_RETRIES),
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(retries) => Some(retries),
                Err(_) => {
                    violations.push(format!(
                        "ELASTIC_MAX_RETRIES must be a whole number >= 0, got: {}",
                        raw
                    ));
                    None
                }
            },
        };

        let index_name = get("INDEX_NAME").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());
        if let Err(reason) = check_index_name(&index_name) {
            violations.push(reason);
        }

        let log_level = get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_file = get("LOG_FILE").map(|path| PathBuf::from(path.trim()));

        match (endpoint, credentials, request_timeout, max_retries) {
            (Some(endpoint), Some(credentials), Some(timeout), Some(max_retries))
                if violations.is_empty() =>
            {
                Ok(Self {
                    endpoint,
                    credentials,
                    request_timeout: Duration::from_secs(timeout),
                    max_retries,
                    index_name,
                    log_level,
                    log_file,
                })
            }
            _ => Err(SearchError::Configuration(violations)),
        }
    }
}

/// Accept `host:port`, `https://host` and cloud endpoint hostnames.
/// A missing scheme defaults to https.
pub fn parse_endpoint(raw: &str) -> std::result::Result<Url, String> {
    let raw = raw.trim();
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| format!("ELASTIC_URL is not a valid URL ({}): {}", e, raw))?;
    if url.host_str().is_none() {
        return Err(format!("ELASTIC_URL has no host: {}", raw));
    }
    Ok(url)
}

/// Index names must be lowercase, non-empty and free of path characters
pub fn check_index_name(name: &str) -> std::result::Result<(), String> {
    let invalid_char = name
        .chars()
        .find(|c| c.is_uppercase() || c.is_whitespace() || "\\/*?\"<>|,#:".contains(*c));

    if name.is_empty() {
        Err("INDEX_NAME must not be empty".to_string())
    } else if name.starts_with(['-', '_', '+']) {
        Err(format!("INDEX_NAME cannot start with '-', '_' or '+': {}", name))
    } else if let Some(c) = invalid_char {
        Err(format!("INDEX_NAME contains invalid character {:?}: {}", c, name))
    } else {
        Ok(())
    }
}
