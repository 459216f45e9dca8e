//! Property inspection and repair coordination portal.
//!
//! [`service::coordinator::PortalCoordinator`] is the in-process entry
//! point; [`routes::create_router`] exposes the same operations over HTTP.

pub mod config;
pub mod db;
pub mod dtos;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod utils;
pub mod views;

use config::Config;
use service::coordinator::PortalCoordinator;

#[derive(Debug)]
pub struct AppState {
    pub env: Config,
    pub coordinator: PortalCoordinator,
}
