//! In-memory session snapshot and its on-disk storage-state shape
//!
//! A `SessionState` is a value: every update builds a new one and the
//! previous snapshot is dropped whole. Nothing mutates a state in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::constants::{AUTH_MARKER, IDX_COOKIE_DOMAIN, IDX_ORIGIN};

/// One cookie as stored in the storage-state file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    /// Unix seconds; `-1` marks a session cookie
    #[serde(default = "default_expires")]
    pub expires: f64,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_expires() -> f64 {
    -1.0
}

impl StoredCookie {
    /// Session cookie with default flags
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: path.into(),
            expires: default_expires(),
            http_only: false,
            secure: false,
            same_site: None,
        }
    }

    /// Whether this cookie applies to `url` (domain suffix and path prefix)
    #[must_use]
    pub fn applies_to(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let domain = self.domain.trim_start_matches('.');
        let domain_ok = domain.is_empty()
            || host.eq_ignore_ascii_case(domain)
            || host
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", domain.to_ascii_lowercase()));
        domain_ok && url.path().starts_with(&self.path)
    }

    fn same_slot(&self, other: &StoredCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

/// A localStorage entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub name: String,
    pub value: String,
}

/// localStorage contents of one origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginStorage {
    pub origin: String,
    #[serde(default)]
    pub local_storage: Vec<StorageEntry>,
}

/// On-disk storage state: `{ "cookies": [...], "origins": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStateFile {
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
    #[serde(default)]
    pub origins: Vec<OriginStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

/// Reduced projection for plain HTTP clients: `{ "cookies": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CookieExport {
    pub cookies: Vec<StoredCookie>,
}

/// Snapshot of cookies and auth token shared across strategy attempts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    cookies: Vec<StoredCookie>,
    local_auth_token: Option<String>,
    /// localStorage entries other than the auth marker, kept for round-trips
    origins: Vec<OriginStorage>,
    captured_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Empty session: no cookies, no token
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot captured now
    #[must_use]
    pub fn new(cookies: Vec<StoredCookie>, local_auth_token: Option<String>) -> Self {
        Self {
            cookies,
            local_auth_token: local_auth_token.filter(|t| !t.is_empty()),
            origins: Vec::new(),
            captured_at: Some(Utc::now()),
        }
    }

    /// Parse a raw `Cookie:` header (`a=1; b=2`) into a session
    ///
    /// Segments without `=` are skipped. Cookies are scoped to the site
    /// domain with path `/`.
    #[must_use]
    pub fn from_cookie_header(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|part| {
                let (name, value) = part.trim().split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(StoredCookie::new(name, value.trim(), IDX_COOKIE_DOMAIN, "/"))
            })
            .collect();
        Self::new(cookies, None)
    }

    #[must_use]
    pub fn cookies(&self) -> &[StoredCookie] {
        &self.cookies
    }

    #[must_use]
    pub fn local_auth_token(&self) -> Option<&str> {
        self.local_auth_token.as_deref()
    }

    #[must_use]
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.local_auth_token.is_none() && self.origins.is_empty()
    }

    /// Same cookies, token and storage, ignoring capture time
    #[must_use]
    pub fn same_contents(&self, other: &SessionState) -> bool {
        self.cookies == other.cookies
            && self.local_auth_token == other.local_auth_token
            && self.origins == other.origins
    }

    /// True if a cookie or token named for the site's auth marker is present
    #[must_use]
    pub fn has_auth_signal(&self) -> bool {
        self.local_auth_token.is_some()
            || self
                .cookies
                .iter()
                .any(|c| c.name == AUTH_MARKER && !c.value.is_empty())
    }

    /// Cookie header value for a request to `url`, if any cookie applies
    #[must_use]
    pub fn cookie_header_for(&self, url: &Url) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| c.applies_to(url))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    /// New snapshot with `fresh` cookies replacing same name/domain/path entries
    #[must_use]
    pub fn with_merged_cookies(&self, fresh: Vec<StoredCookie>) -> Self {
        let mut cookies: Vec<StoredCookie> = self
            .cookies
            .iter()
            .filter(|old| !fresh.iter().any(|new| new.same_slot(old)))
            .cloned()
            .collect();
        cookies.extend(fresh);
        Self {
            cookies,
            local_auth_token: self.local_auth_token.clone(),
            origins: self.origins.clone(),
            captured_at: Some(Utc::now()),
        }
    }

    /// New snapshot carrying `token` as the local auth token
    #[must_use]
    pub fn with_auth_token(&self, token: Option<String>) -> Self {
        Self {
            cookies: self.cookies.clone(),
            local_auth_token: token.filter(|t| !t.is_empty()),
            origins: self.origins.clone(),
            captured_at: Some(Utc::now()),
        }
    }

    /// Rebuild from the on-disk shape, lifting the auth marker out of localStorage
    #[must_use]
    pub fn from_storage_file(file: StorageStateFile) -> Self {
        let mut token = None;
        let origins = file
            .origins
            .into_iter()
            .map(|origin| {
                let local_storage = origin
                    .local_storage
                    .into_iter()
                    .filter(|entry| {
                        if entry.name == AUTH_MARKER {
                            if token.is_none() && !entry.value.is_empty() {
                                token = Some(entry.value.clone());
                            }
                            false
                        } else {
                            true
                        }
                    })
                    .collect();
                OriginStorage {
                    origin: origin.origin,
                    local_storage,
                }
            })
            .filter(|origin| !origin.local_storage.is_empty())
            .collect();

        Self {
            cookies: file.cookies,
            local_auth_token: token,
            origins,
            captured_at: file.captured_at,
        }
    }

    /// On-disk shape, with the auth token stored under the site origin
    #[must_use]
    pub fn to_storage_file(&self) -> StorageStateFile {
        let mut origins = self.origins.clone();
        if let Some(token) = &self.local_auth_token {
            let entry = StorageEntry {
                name: AUTH_MARKER.to_string(),
                value: token.clone(),
            };
            match origins.iter_mut().find(|o| o.origin == IDX_ORIGIN) {
                Some(origin) => origin.local_storage.push(entry),
                None => origins.push(OriginStorage {
                    origin: IDX_ORIGIN.to_string(),
                    local_storage: vec![entry],
                }),
            }
        }
        StorageStateFile {
            cookies: self.cookies.clone(),
            origins,
            captured_at: self.captured_at,
        }
    }

    /// Reduced cookie-only projection
    #[must_use]
    pub fn to_cookie_export(&self) -> CookieExport {
        CookieExport {
            cookies: self.cookies.clone(),
        }
    }
}
