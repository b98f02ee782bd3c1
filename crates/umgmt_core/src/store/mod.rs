//! System store boundary.
//!
//! # Responsibility
//! - Define the contract the user database loads from and persists to.
//! - Keep the on-disk record format out of the database core.
//!
//! # Invariants
//! - `read_accounts` preserves source order.
//! - `write_accounts` replaces the whole record set or nothing, and writes
//!   nothing when any record fails `User::validate_storable`.

use crate::model::user::{User, UserValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod memory;
pub mod passwd_file;

pub use memory::MemoryAccountStore;
pub use passwd_file::PasswdFile;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reading or writing the account store.
#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Source content could not be parsed. `line` is 1-based.
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },
    /// A record cannot be written without corrupting the store.
    InvalidRecord {
        name: String,
        source: UserValidationError,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Format {
                path,
                line,
                message,
            } => write!(f, "{}:{line}: {message}", path.display()),
            Self::InvalidRecord { name, source } => {
                write!(f, "refusing to store user `{name}`: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Format { .. } => None,
            Self::InvalidRecord { source, .. } => Some(source),
        }
    }
}

/// Durable account record set.
pub trait AccountStore {
    /// Returns every persisted record in source order.
    fn read_accounts(&self) -> StoreResult<Vec<User>>;

    /// Atomically replaces the persisted record set with `users`.
    fn write_accounts(&self, users: &[User]) -> StoreResult<()>;
}

/// Rejects the record set if any record would not survive a write and read.
pub(crate) fn ensure_storable(users: &[User]) -> StoreResult<()> {
    for user in users {
        user.validate_storable()
            .map_err(|source| StoreError::InvalidRecord {
                name: user.name.clone(),
                source,
            })?;
    }
    Ok(())
}
