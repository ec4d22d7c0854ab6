pub mod analytics;
pub mod auth;
pub mod nav;
pub mod projects;
