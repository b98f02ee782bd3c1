//! Core of the umgmt account tools.
//! Owns the in-memory user database and its load/store boundary.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod store;

pub use config::{ConfigError, ConfigResult, DbConfig, IdRange};
pub use db::{DbError, DbResult, IdKind, UserDb};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::user::{is_valid_login_name, Gid, Uid, User, UserValidationError};
pub use store::{AccountStore, MemoryAccountStore, PasswdFile, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
