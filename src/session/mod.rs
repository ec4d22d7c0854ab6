pub mod store;

pub use store::SessionStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::auth::{decode_credential, Role};
use crate::error::AuthError;
use crate::routing::{Authorization, Landings, NavigationIntent};

/// Credential acquisition endpoint
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange email and password for a credential string
    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SessionState {
    Anonymous,
    Authenticated {
        role: Role,
        subject_id: String,
        email: Option<String>,
        expires_at: DateTime<Utc>,
    },
}

impl SessionState {
    pub fn authorization(&self) -> Authorization {
        match self {
            SessionState::Anonymous => Authorization::Anonymous,
            SessionState::Authenticated { role: Role::Admin, .. } => Authorization::Admin,
            SessionState::Authenticated { role: Role::Client, .. } => Authorization::Client,
        }
    }
}

/// Login, logout and the derived session state
pub struct AuthSession {
    store: Arc<SessionStore>,
    api: Arc<dyn AuthApi>,
    landings: Landings,
}

impl AuthSession {
    pub fn new(store: Arc<SessionStore>, api: Arc<dyn AuthApi>, landings: Landings) -> Self {
        Self { store, api, landings }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Sign in and return where the shell should go next.
    ///
    /// On failure the stored session is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<NavigationIntent, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::AuthenticationFailed(
                "Email and password are required".to_string(),
            ));
        }

        let generation = self.store.generation();
        let credential = self.api.login(email, password).await?;

        match decode_credential(&credential) {
            Ok(claims) if claims.is_expired_at(Utc::now()) => {
                warn!("Login returned a credential that expired at {}", claims.expires_at);
                return Err(AuthError::authentication_failed(None));
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Login returned an undecodable credential: {}", e);
                return Err(AuthError::authentication_failed(None));
            }
        }

        // A logout or another login landed while the request was pending
        if !self.store.set_if_unchanged(&credential, generation)? {
            warn!("Discarding login response: session changed while it was pending");
            return Err(AuthError::AuthenticationFailed(
                "Session changed while signing in. Try again.".to_string(),
            ));
        }

        let state = self.current_state();
        info!("Logged in as {:?}", state.authorization());
        let landing = self.landings.for_authorization(state.authorization());
        Ok(NavigationIntent::push(landing))
    }

    pub fn logout(&self) -> Result<NavigationIntent, AuthError> {
        self.store.clear()?;
        info!("Logged out");
        Ok(NavigationIntent::replace(self.landings.public.clone()))
    }

    pub fn current_state(&self) -> SessionState {
        self.current_state_at(Utc::now())
    }

    /// Recompute the state from the stored credential.
    ///
    /// An undecodable or expired credential is cleared before returning `Anonymous`.
    pub fn current_state_at(&self, now: DateTime<Utc>) -> SessionState {
        let Some(claims) = self.store.claims() else {
            return SessionState::Anonymous;
        };

        match claims {
            Ok(claims) if claims.is_expired_at(now) => {
                debug!("Session expired at {}", claims.expires_at);
                self.drop_session();
                SessionState::Anonymous
            }
            Ok(claims) => SessionState::Authenticated {
                role: claims.role,
                subject_id: claims.subject_id,
                email: claims.email,
                expires_at: claims.expires_at,
            },
            Err(e) => {
                warn!("Stored credential no longer decodes: {}", e);
                self.drop_session();
                SessionState::Anonymous
            }
        }
    }

    pub fn authorization(&self) -> Authorization {
        self.current_state().authorization()
    }

    fn drop_session(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear session: {}", e);
        }
    }
}
