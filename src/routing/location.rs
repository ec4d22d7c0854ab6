use serde::Serialize;
use url::Url;

/// Query parameter that unlocks the login screen
pub const ALLOW_LOGIN_PARAM: &str = "allowLogin";

const BASE: &str = "http://folio.local/";

/// A requested path plus its raw query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    pub query: Option<String>,
}

impl Location {
    /// Parse `/path?query#fragment`; the fragment is dropped.
    pub fn parse(input: &str) -> Self {
        let joined = Url::parse(BASE).and_then(|base| base.join(input.trim()));
        match joined {
            Ok(url) => Self {
                path: normalize_path(url.path()),
                query: url.query().map(str::to_string),
            },
            // Unparseable input routes like any unknown path
            Err(_) => Self {
                path: normalize_path(input),
                query: None,
            },
        }
    }

    pub fn href(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }
}

/// True only for `allowLogin=true`
pub fn allow_login_flag(query: Option<&str>) -> bool {
    let Some(query) = query else {
        return false;
    };
    url::form_urlencoded::parse(query.as_bytes())
        .any(|(key, value)| key == ALLOW_LOGIN_PARAM && value == "true")
}

pub(crate) fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/').to_lowercase();
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed
    } else {
        format!("/{}", trimmed)
    }
}

/// Abstract navigation request for the hosting shell to apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationIntent {
    pub path: String,
    /// Replace the current history entry instead of pushing a new one
    pub replace: bool,
}

impl NavigationIntent {
    pub fn push(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            replace: false,
        }
    }

    pub fn replace(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            replace: true,
        }
    }
}
