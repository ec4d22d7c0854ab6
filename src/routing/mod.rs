//! Route guarding.
//!
//! [`RouteTable::decide`] maps a requested location and the current
//! [`Authorization`] to a [`RouteDecision`]. It reads nothing but its inputs,
//! so the decision is always complete before any view is committed.

mod location;

pub use location::{allow_login_flag, Location, NavigationIntent, ALLOW_LOGIN_PARAM};

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

/// Three-way authorization derived from the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Authorization {
    Anonymous,
    Client,
    Admin,
}

impl Authorization {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Authorization::Anonymous)
    }
}

/// Access policy attached to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteClass {
    Public,
    AuthenticatedAny,
    AdminOnly,
    LoginEntry,
}

/// Screens the shell knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Home,
    Login,
    Dashboard,
    Projects,
    Analytics,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Login => "login",
            View::Dashboard => "dashboard",
            View::Projects => "projects",
            View::Analytics => "analytics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "lowercase")]
pub enum RouteDecision {
    Render(View),
    Redirect(String),
}

/// Where each authorization level lands when a route turns it away
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landings {
    pub public: String,
    pub admin: String,
}

impl Landings {
    pub fn new(public: impl Into<String>, admin: impl Into<String>) -> Self {
        Self {
            public: public.into(),
            admin: admin.into(),
        }
    }

    /// Clients have no screen of their own behind the dashboard, so they land on the public home
    pub fn for_authorization(&self, authorization: Authorization) -> &str {
        match authorization {
            Authorization::Admin => &self.admin,
            Authorization::Client | Authorization::Anonymous => &self.public,
        }
    }
}

impl Default for Landings {
    fn default() -> Self {
        Self::new("/home", "/dashboard")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Page { class: RouteClass, view: View },
    /// Unconditional replace-redirect, e.g. the base path
    Alias(String),
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<String, RouteTarget>,
    landings: Landings,
}

impl RouteTable {
    pub fn new(landings: Landings) -> Self {
        Self {
            routes: HashMap::new(),
            landings,
        }
    }

    /// The site's route map: public home, hidden login, admin screens
    pub fn portfolio(landings: Landings) -> Self {
        let mut table = Self::new(landings)
            .with_route("/home", RouteClass::Public, View::Home)
            .with_route("/login", RouteClass::LoginEntry, View::Login)
            .with_route("/dashboard", RouteClass::AdminOnly, View::Dashboard)
            .with_route("/projects", RouteClass::AdminOnly, View::Projects)
            .with_route("/analytics", RouteClass::AdminOnly, View::Analytics);

        let home = table.landings.public.clone();
        if home != "/" {
            table = table.with_alias("/", home);
        }
        table
    }

    pub fn with_route(mut self, path: &str, class: RouteClass, view: View) -> Self {
        self.routes
            .insert(location::normalize_path(path), RouteTarget::Page { class, view });
        self
    }

    pub fn with_alias(mut self, path: &str, target: impl Into<String>) -> Self {
        self.routes
            .insert(location::normalize_path(path), RouteTarget::Alias(target.into()));
        self
    }

    pub fn landings(&self) -> &Landings {
        &self.landings
    }

    pub fn lookup(&self, path: &str) -> Option<&RouteTarget> {
        self.routes.get(&location::normalize_path(path))
    }

    pub fn decide(&self, location: &Location, authorization: Authorization) -> RouteDecision {
        let landing = self.landings.for_authorization(authorization);
        let redirect_landing = || RouteDecision::Redirect(landing.to_string());

        let decision = match self.lookup(&location.path) {
            None => redirect_landing(),
            Some(RouteTarget::Alias(target)) => RouteDecision::Redirect(target.clone()),
            Some(RouteTarget::Page { class, view }) => match (class, authorization) {
                (RouteClass::Public, _) => RouteDecision::Render(*view),

                (RouteClass::AuthenticatedAny, Authorization::Anonymous) => redirect_landing(),
                (RouteClass::AuthenticatedAny, _) => RouteDecision::Render(*view),

                (RouteClass::AdminOnly, Authorization::Admin) => RouteDecision::Render(*view),
                (RouteClass::AdminOnly, _) => redirect_landing(),

                (RouteClass::LoginEntry, Authorization::Client) => redirect_landing(),
                (RouteClass::LoginEntry, _) => {
                    if allow_login_flag(location.query.as_deref()) {
                        RouteDecision::Render(*view)
                    } else {
                        redirect_landing()
                    }
                }
            },
        };

        debug!(
            "Route decision for {} as {:?}: {:?}",
            location.path, authorization, decision
        );
        decision
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::portfolio(Landings::default())
    }
}
