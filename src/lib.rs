pub mod analytics;
pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod projects;
pub mod routing;
pub mod session;
pub mod shell;
pub mod storage;
