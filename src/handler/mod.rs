pub mod admin;
pub mod auth;
pub mod contractor;
pub mod pm;
pub mod users;
