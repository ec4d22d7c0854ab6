//! Application root.
//!
//! Every collaborator is built here once and handed to its consumers
//! explicitly; nothing below reads global state.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use crate::analytics::VisitCounter;
use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::error::AuthError;
use crate::projects::{ProjectApi, ProjectCache, ProjectService};
use crate::routing::{Landings, RouteTable, View};
use crate::session::{AuthApi, AuthSession, SessionState, SessionStore};
use crate::shell::{NavigationShell, Resolved};
use crate::storage::{FileStore, KeyValueStore};

pub struct App {
    pub session: Arc<SessionStore>,
    pub auth: Arc<AuthSession>,
    pub shell: NavigationShell,
    pub projects: ProjectService,
    pub visits: VisitCounter,
}

impl App {
    /// Wire the HTTP client and a file-backed store under `config_dir`
    pub fn open(config: &AppConfig, config_dir: &Path) -> anyhow::Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(config_dir)?);
        let session = Arc::new(SessionStore::new(Arc::clone(&storage), config.session.token_key.clone()));

        let client = ApiClient::new(&config.api.base_url, Duration::from_secs(config.api.timeout_secs))?
            .with_session(Arc::clone(&session));
        let client = Arc::new(client);

        Ok(Self::assemble(config, storage, session, client.clone(), client))
    }

    /// Wire caller-supplied endpoints, e.g. fakes in tests
    pub fn with_parts(
        config: &AppConfig,
        storage: Arc<dyn KeyValueStore>,
        auth_api: Arc<dyn AuthApi>,
        project_api: Arc<dyn ProjectApi>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(Arc::clone(&storage), config.session.token_key.clone()));
        Self::assemble(config, storage, session, auth_api, project_api)
    }

    fn assemble(
        config: &AppConfig,
        storage: Arc<dyn KeyValueStore>,
        session: Arc<SessionStore>,
        auth_api: Arc<dyn AuthApi>,
        project_api: Arc<dyn ProjectApi>,
    ) -> Self {
        let landings = Landings::new(
            config.routing.public_landing.clone(),
            config.routing.admin_landing.clone(),
        );

        // App start: adopt whatever session survived the last run
        session.rehydrate();

        let auth = Arc::new(AuthSession::new(Arc::clone(&session), auth_api, landings.clone()));
        let shell = NavigationShell::new(
            Arc::clone(&auth),
            RouteTable::portfolio(landings),
            config.routing.max_redirects,
        );
        let cache = Arc::new(ProjectCache::new(Arc::clone(&project_api)));

        Self {
            session,
            auth,
            shell,
            projects: ProjectService::new(project_api, cache),
            visits: VisitCounter::new(storage),
        }
    }

    pub fn state(&self) -> SessionState {
        self.auth.current_state()
    }

    /// Navigate and run the per-view side effects of the rendered screen
    pub fn open_location(&self, location: &str) -> Resolved {
        let resolved = self.shell.navigate(location);
        if resolved.view == View::Analytics {
            if let Err(e) = self.visits.record(Utc::now().date_naive()) {
                warn!("Failed to record visit: {}", e);
            }
        }
        resolved
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Resolved, AuthError> {
        let intent = self.auth.login(email, password).await?;
        Ok(self.shell.apply(&intent))
    }

    pub fn logout(&self) -> Result<Resolved, AuthError> {
        let intent = self.auth.logout()?;
        Ok(self.shell.apply(&intent))
    }
}
