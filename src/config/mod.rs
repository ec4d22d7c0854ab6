use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the durable key-value file
    pub config_dir: Option<PathBuf>,
    /// Storage slot for the credential
    pub token_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub public_landing: String,
    pub admin_landing: String,
    pub max_redirects: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("FOLIO_API_BASE_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("FOLIO_HTTP_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("FOLIO_CONFIG_DIR") {
            self.session.config_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("FOLIO_TOKEN_KEY") {
            if !v.is_empty() {
                self.session.token_key = v;
            }
        }

        // Routing overrides
        if let Ok(v) = env::var("FOLIO_PUBLIC_LANDING") {
            if v.starts_with('/') {
                self.routing.public_landing = v;
            }
        }
        if let Ok(v) = env::var("FOLIO_ADMIN_LANDING") {
            if v.starts_with('/') {
                self.routing.admin_landing = v;
            }
        }
        if let Ok(v) = env::var("FOLIO_MAX_REDIRECTS") {
            self.routing.max_redirects = v.parse().unwrap_or(self.routing.max_redirects);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:5000/api".to_string(),
                timeout_secs: 30,
            },
            session: SessionConfig::default(),
            routing: RoutingConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.example.com/api".to_string(),
                timeout_secs: 15,
            },
            session: SessionConfig::default(),
            routing: RoutingConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://api.example.com/api".to_string(),
                timeout_secs: 10,
            },
            session: SessionConfig::default(),
            routing: RoutingConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            config_dir: None,
            token_key: "adminToken".to_string(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            public_landing: "/home".to_string(),
            admin_landing: "/dashboard".to_string(),
            max_redirects: 8,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
