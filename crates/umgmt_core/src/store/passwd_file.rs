//! passwd(5) file store.
//!
//! # Responsibility
//! - Read and write the colon-separated seven-field passwd format.
//! - Replace the destination atomically on write.
//!
//! # Invariants
//! - Writes go to a temporary file in the destination directory which is
//!   then renamed over the destination; readers never observe a partial file.
//! - Every record passes `User::validate_storable` before anything is staged.
//! - The destination's permission bits and owner survive a rewrite.
//! - The directory entry is synced after the rename.
//!
//! # See also
//! - passwd(5)

use super::{ensure_storable, AccountStore, StoreError, StoreResult};
use crate::model::user::User;
use log::{debug, info};
use std::fs::{self, File};
use std::io::{self, Write};
use std::os::unix::fs::{fchown, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

/// Path of the system account database.
pub const SYSTEM_PASSWD_PATH: &str = "/etc/passwd";

const PASSWD_FIELD_COUNT: usize = 7;
const NEW_FILE_MODE: u32 = 0o644;

/// Account store backed by a passwd-format file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdFile {
    path: PathBuf,
}

impl PasswdFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `/etc/passwd`.
    pub fn system() -> Self {
        Self::new(SYSTEM_PASSWD_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses passwd text. Blank lines are skipped.
    pub fn parse(&self, text: &str) -> StoreResult<Vec<User>> {
        let mut users = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let user = parse_line(line).map_err(|message| StoreError::Format {
                path: self.path.clone(),
                line: index + 1,
                message,
            })?;
            users.push(user);
        }
        Ok(users)
    }

    fn io_error(&self, path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn replace_contents(&self, contents: &[u8]) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let existing = match fs::metadata(&self.path) {
            Ok(meta) => Some(meta),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(self.io_error(&self.path, err)),
        };
        let permissions = existing
            .as_ref()
            .map(|meta| meta.permissions())
            .unwrap_or_else(|| fs::Permissions::from_mode(NEW_FILE_MODE));

        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| self.io_error(dir, err))?;
        debug!(
            "event=passwd_write module=store status=staged tmp={}",
            tmp.path().display()
        );
        tmp.write_all(contents)
            .and_then(|()| tmp.as_file().set_permissions(permissions))
            .and_then(|()| match &existing {
                Some(meta) => preserve_owner(tmp.as_file(), meta),
                None => Ok(()),
            })
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|err| self.io_error(tmp.path(), err))?;
        tmp.persist(&self.path)
            .map_err(|err| self.io_error(&self.path, err.error))?;

        File::open(dir)
            .and_then(|handle| handle.sync_all())
            .map_err(|err| self.io_error(dir, err))?;
        Ok(())
    }
}

impl AccountStore for PasswdFile {
    fn read_accounts(&self) -> StoreResult<Vec<User>> {
        let started_at = Instant::now();
        let text =
            fs::read_to_string(&self.path).map_err(|err| self.io_error(&self.path, err))?;
        let users = self.parse(&text)?;
        info!(
            "event=passwd_read module=store status=ok path={} records={} duration_ms={}",
            self.path.display(),
            users.len(),
            started_at.elapsed().as_millis()
        );
        Ok(users)
    }

    fn write_accounts(&self, users: &[User]) -> StoreResult<()> {
        let started_at = Instant::now();
        ensure_storable(users)?;
        self.replace_contents(format_passwd(users).as_bytes())?;
        info!(
            "event=passwd_write module=store status=ok path={} records={} duration_ms={}",
            self.path.display(),
            users.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

/// Renders users as passwd text, one line per record.
pub fn format_passwd(users: &[User]) -> String {
    let mut out = String::new();
    for user in users {
        out.push_str(&format!(
            "{}:{}:{}:{}:{}:{}:{}\n",
            user.name, user.password, user.uid, user.gid, user.gecos, user.home, user.shell
        ));
    }
    out
}

/// Gives `file` the owner of `existing` when they differ.
fn preserve_owner(file: &File, existing: &fs::Metadata) -> io::Result<()> {
    let current = file.metadata()?;
    if current.uid() == existing.uid() && current.gid() == existing.gid() {
        return Ok(());
    }
    fchown(file, Some(existing.uid()), Some(existing.gid()))
}

/// Parses a decimal id. Signs and whitespace are rejected so that a
/// rewrite reproduces the field byte for byte.
fn parse_id(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn parse_line(line: &str) -> Result<User, String> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != PASSWD_FIELD_COUNT {
        return Err(format!(
            "expected {PASSWD_FIELD_COUNT} fields, found {}",
            fields.len()
        ));
    }
    if fields[0].is_empty() {
        return Err("empty user name".to_string());
    }

    let uid = parse_id(fields[2])
        .ok_or_else(|| format!("invalid uid `{}` for `{}`", fields[2], fields[0]))?;
    let gid = parse_id(fields[3])
        .ok_or_else(|| format!("invalid gid `{}` for `{}`", fields[3], fields[0]))?;

    Ok(User {
        name: fields[0].to_string(),
        password: fields[1].to_string(),
        uid,
        gid,
        gecos: fields[4].to_string(),
        home: fields[5].to_string(),
        shell: fields[6].to_string(),
    })
}
