pub mod auth_service;
pub mod coordinator;
pub mod error;
pub mod lifecycle_service;
