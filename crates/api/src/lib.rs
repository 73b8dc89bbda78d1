//! HTTP server: HTML pages, public JSON API, admin area and affiliate redirects.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
pub mod views;
