pub mod contractordb;
pub mod db;
pub mod inspectiondb;
pub mod userdb;

pub use db::{Collections, DBClient, StoreError};
