//! In-memory user database.
//!
//! # Responsibility
//! - Own the loaded account records and enforce key uniqueness.
//! - Allocate identifiers for new accounts.
//!
//! # Invariants
//! - Login names are unique.
//! - Uids added through `UserDb::add_user` are unique.
//! - Iteration order is load order followed by insertion order.

use crate::config::IdRange;
use crate::model::user::{Uid, UserValidationError};
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod id_alloc;
pub mod user_db;

pub use user_db::UserDb;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Store(StoreError),
    Validation(UserValidationError),
    DuplicateName(String),
    DuplicateUid(Uid),
    /// Every id in the configured range is taken.
    IdRangeExhausted {
        kind: IdKind,
        range: IdRange,
    },
}

/// Which identifier space an allocation ran in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Uid,
    Gid,
}

impl Display for IdKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uid => write!(f, "uid"),
            Self::Gid => write!(f, "gid"),
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateName(name) => write!(f, "user `{name}` already exists"),
            Self::DuplicateUid(uid) => write!(f, "uid {uid} is already in use"),
            Self::IdRangeExhausted { kind, range } => {
                write!(f, "no free {kind} left in range {range}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::DuplicateName(_) | Self::DuplicateUid(_) | Self::IdRangeExhausted { .. } => None,
        }
    }
}

impl From<StoreError> for DbError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<UserValidationError> for DbError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}
