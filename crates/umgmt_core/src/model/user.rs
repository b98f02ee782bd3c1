//! User account record.
//!
//! # Responsibility
//! - Define the canonical account record stored by `UserDb`.
//! - Validate login names and opaque fields against the passwd format.
//!
//! # Invariants
//! - `name` matches the portable login name pattern and is at most
//!   `MAX_NAME_LEN` bytes.
//! - No field contains `:` or a line break; `validate_storable` enforces
//!   this for every record written to a passwd file.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Numeric user identifier.
pub type Uid = u32;
/// Numeric group identifier.
pub type Gid = u32;

/// Longest accepted login name, in bytes.
pub const MAX_NAME_LEN: usize = 32;

const DEFAULT_PASSWORD: &str = "x";
const DEFAULT_SHELL: &str = "/bin/sh";

static LOGIN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*\$?$").expect("valid login name regex"));

/// Field-level validation failure for a [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    NameTooLong(String),
    InvalidName(String),
    /// A field holds a passwd delimiter (`:`) or a line break.
    ForbiddenCharacter { field: &'static str, value: String },
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "user name cannot be empty"),
            Self::NameTooLong(name) => write!(
                f,
                "user name `{name}` is longer than {MAX_NAME_LEN} bytes"
            ),
            Self::InvalidName(name) => write!(f, "invalid user name `{name}`"),
            Self::ForbiddenCharacter { field, value } => write!(
                f,
                "field `{field}` contains `:` or a line break: `{}`",
                value.escape_debug()
            ),
        }
    }
}

impl Error for UserValidationError {}

/// One account record.
///
/// The database indexes on `name`, `uid` and `gid` only; the remaining
/// fields are carried as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    /// Password field as stored in passwd, usually `x` when shadowed.
    pub password: String,
    pub uid: Uid,
    /// Primary group.
    pub gid: Gid,
    /// Comment / full name field.
    pub gecos: String,
    pub home: String,
    pub shell: String,
}

impl User {
    /// Creates a user with conventional defaults for the opaque fields.
    ///
    /// The record is not validated here; `UserDb::add_user` does that.
    pub fn new(name: impl Into<String>, uid: Uid, gid: Gid) -> Self {
        let name = name.into();
        let home = format!("/home/{name}");
        Self {
            name,
            password: DEFAULT_PASSWORD.to_string(),
            uid,
            gid,
            gecos: String::new(),
            home,
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_gecos(mut self, gecos: impl Into<String>) -> Self {
        self.gecos = gecos.into();
        self
    }

    pub fn with_home(mut self, home: impl Into<String>) -> Self {
        self.home = home.into();
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Checks that the record is acceptable for a new account.
    ///
    /// Applies the login name rules on top of [`User::validate_storable`].
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(UserValidationError::NameTooLong(self.name.clone()));
        }
        if !is_valid_login_name(&self.name) {
            return Err(UserValidationError::InvalidName(self.name.clone()));
        }
        self.validate_storable()
    }

    /// Checks that the record can be written as one passwd line and read
    /// back unchanged.
    ///
    /// Login name rules are not applied here, so accounts loaded from an
    /// existing system with unusual names can still be written back.
    pub fn validate_storable(&self) -> Result<(), UserValidationError> {
        if self.name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }

        for (field, value) in [
            ("name", &self.name),
            ("password", &self.password),
            ("gecos", &self.gecos),
            ("home", &self.home),
            ("shell", &self.shell),
        ] {
            if value.contains([':', '\n', '\r']) {
                return Err(UserValidationError::ForbiddenCharacter {
                    field,
                    value: value.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Returns whether `name` is an acceptable login name.
///
/// Accepts the portable set plus a trailing `$` used by machine accounts.
pub fn is_valid_login_name(name: &str) -> bool {
    name.len() <= MAX_NAME_LEN && LOGIN_NAME_RE.is_match(name)
}
