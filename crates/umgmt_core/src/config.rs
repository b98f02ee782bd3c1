//! Identifier allocation policy.
//!
//! # Responsibility
//! - Hold the uid/gid ranges new accounts are allocated from.
//! - Read those ranges from a `login.defs`-style file.
//!
//! # Invariants
//! - Every `IdRange` has `min <= max`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Path of the system login defaults file.
pub const SYSTEM_LOGIN_DEFS_PATH: &str = "/etc/login.defs";

const DEFAULT_ID_MIN: u32 = 1000;
const DEFAULT_ID_MAX: u32 = 60000;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    InvalidValue {
        key: String,
        value: String,
    },
    InvalidRange {
        min: u32,
        max: u32,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
            Self::InvalidRange { min, max } => {
                write!(f, "id range minimum {min} exceeds maximum {max}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidValue { .. } | Self::InvalidRange { .. } => None,
        }
    }
}

/// Inclusive range of ids available for new accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    min: u32,
    max: u32,
}

impl IdRange {
    pub fn new(min: u32, max: u32) -> ConfigResult<Self> {
        if min > max {
            return Err(ConfigError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn contains(&self, id: u32) -> bool {
        (self.min..=self.max).contains(&id)
    }
}

impl Default for IdRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_ID_MIN,
            max: DEFAULT_ID_MAX,
        }
    }
}

impl Display for IdRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Settings for a `UserDb`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    pub uid_range: IdRange,
    pub gid_range: IdRange,
}

impl DbConfig {
    /// Reads `UID_MIN`, `UID_MAX`, `GID_MIN` and `GID_MAX` from a
    /// `login.defs`-style file. Keys that are absent keep their defaults.
    pub fn from_login_defs(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_login_defs(&text)
    }

    /// Uses `/etc/login.defs` when it exists, defaults otherwise.
    pub fn system() -> ConfigResult<Self> {
        if Path::new(SYSTEM_LOGIN_DEFS_PATH).exists() {
            Self::from_login_defs(SYSTEM_LOGIN_DEFS_PATH)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse_login_defs(text: &str) -> ConfigResult<Self> {
        let defaults = Self::default();
        let mut uid_min = defaults.uid_range.min;
        let mut uid_max = defaults.uid_range.max;
        let mut gid_min = defaults.gid_range.min;
        let mut gid_max = defaults.gid_range.max;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            let slot = match key {
                "UID_MIN" => &mut uid_min,
                "UID_MAX" => &mut uid_max,
                "GID_MIN" => &mut gid_min,
                "GID_MAX" => &mut gid_max,
                _ => continue,
            };
            *slot = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            })?;
        }

        Ok(Self {
            uid_range: IdRange::new(uid_min, uid_max)?,
            gid_range: IdRange::new(gid_min, gid_max)?,
        })
    }
}
