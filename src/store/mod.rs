//! Persistence layer: libSQL-backed storage for sessions, plans, profiles
//! and the meal log.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{Database, PlanType, StoredProfile};
