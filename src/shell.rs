use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::routing::{Authorization, Location, NavigationIntent, RouteDecision, RouteTable, View};
use crate::session::AuthSession;

/// Outcome of one navigation after every redirect was followed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub view: View,
    pub location: Location,
    /// Redirect targets in the order they were taken
    pub redirects: Vec<String>,
    pub authorization: Authorization,
}

impl Resolved {
    /// History replacement the host must apply when the address changed
    pub fn intent(&self) -> Option<NavigationIntent> {
        if self.redirects.is_empty() {
            None
        } else {
            Some(NavigationIntent::replace(self.location.href()))
        }
    }
}

/// Runs the route guard on every location change and tracks what is on screen.
///
/// Nothing is committed as current until the guard has produced a render
/// decision, so a protected view is never shown to the wrong session.
pub struct NavigationShell {
    auth: Arc<AuthSession>,
    routes: RouteTable,
    max_redirects: usize,
    current: Mutex<Option<Resolved>>,
}

impl NavigationShell {
    pub fn new(auth: Arc<AuthSession>, routes: RouteTable, max_redirects: usize) -> Self {
        Self {
            auth,
            routes,
            max_redirects,
            current: Mutex::new(None),
        }
    }

    /// Resolve `location` and make it current. Deep links and in-app
    /// transitions both land here; the session is rehydrated once at app start.
    pub fn navigate(&self, location: &str) -> Resolved {
        let resolved = self.resolve(Location::parse(location));
        *self.current.lock() = Some(resolved.clone());
        resolved
    }

    pub fn apply(&self, intent: &NavigationIntent) -> Resolved {
        self.navigate(&intent.path)
    }

    /// Re-run the guard for the location on screen, e.g. after logout
    pub fn refresh(&self) -> Option<Resolved> {
        let href = self.current.lock().as_ref().map(|r| r.location.href())?;
        Some(self.navigate(&href))
    }

    pub fn current(&self) -> Option<Resolved> {
        self.current.lock().clone()
    }

    fn resolve(&self, mut location: Location) -> Resolved {
        let mut redirects = Vec::new();
        loop {
            let authorization = self.auth.authorization();
            match self.routes.decide(&location, authorization) {
                RouteDecision::Render(view) => {
                    debug!("Rendering {} at {}", view.as_str(), location.href());
                    return Resolved {
                        view,
                        location,
                        redirects,
                        authorization,
                    };
                }
                RouteDecision::Redirect(target) => {
                    if redirects.len() >= self.max_redirects {
                        warn!("Redirect limit reached at {}, falling back to public landing", target);
                        let landing = self.routes.landings().public.clone();
                        redirects.push(landing.clone());
                        return Resolved {
                            view: View::Home,
                            location: Location::parse(&landing),
                            redirects,
                            authorization,
                        };
                    }
                    redirects.push(target.clone());
                    location = Location::parse(&target);
                }
            }
        }
    }
}
