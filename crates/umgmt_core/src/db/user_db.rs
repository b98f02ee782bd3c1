//! User database abstract data type.
//!
//! # Responsibility
//! - Own user records in a stable order with a name index.
//! - Move whole record sets to and from an `AccountStore`.
//! - Allocate uids and gids for new accounts.
//!
//! # Invariants
//! - `by_name[user.name] == position of user in users`, for every user.
//! - A failed add or load leaves the previous contents untouched.
//! - Failures are returned to the caller, never retried or logged here.

use super::id_alloc::next_free_id;
use super::{DbError, DbResult, IdKind};
use crate::config::DbConfig;
use crate::model::user::{Gid, Uid, User};
use crate::store::{AccountStore, PasswdFile};
use log::{debug, info};
use std::collections::HashMap;
use std::slice;

/// Ordered, name-indexed collection of user records.
#[derive(Debug, Clone, Default)]
pub struct UserDb {
    users: Vec<User>,
    by_name: HashMap<String, usize>,
    config: DbConfig,
}

impl UserDb {
    /// Creates an empty database with default id ranges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty database allocating ids from `config`'s ranges.
    pub fn with_config(config: DbConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Loads `/etc/passwd`, replacing the current contents.
    pub fn load(&mut self) -> DbResult<()> {
        self.load_from(&PasswdFile::system())
    }

    /// Writes the current contents to `/etc/passwd`.
    pub fn store(&self) -> DbResult<()> {
        self.store_to(&PasswdFile::system())
    }

    /// Replaces the current contents with the records of `store`.
    ///
    /// Source order is kept. Uids are trusted as given, so aliases sharing
    /// a uid load fine; a repeated login name is rejected because lookups
    /// by name would be ambiguous.
    pub fn load_from<S: AccountStore + ?Sized>(&mut self, store: &S) -> DbResult<()> {
        let users = store.read_accounts()?;

        let mut by_name = HashMap::with_capacity(users.len());
        for (position, user) in users.iter().enumerate() {
            if by_name.insert(user.name.clone(), position).is_some() {
                return Err(DbError::DuplicateName(user.name.clone()));
            }
        }

        self.users = users;
        self.by_name = by_name;
        info!(
            "event=user_db_load module=db status=ok records={}",
            self.users.len()
        );
        Ok(())
    }

    /// Persists every record, in iteration order, to `store`.
    pub fn store_to<S: AccountStore + ?Sized>(&self, store: &S) -> DbResult<()> {
        store.write_accounts(&self.users)?;
        info!(
            "event=user_db_store module=db status=ok records={}",
            self.users.len()
        );
        Ok(())
    }

    /// Returns a uid no current record uses.
    ///
    /// Uids outside the configured range are ignored. The result is one past
    /// the highest in-range uid, or the lowest gap once the top of the range
    /// is taken. Repeated calls without an intervening add return the same
    /// value.
    pub fn new_uid(&self) -> DbResult<Uid> {
        let range = self.config.uid_range;
        next_free_id(self.users.iter().map(|user| user.uid), range).ok_or(
            DbError::IdRangeExhausted {
                kind: IdKind::Uid,
                range,
            },
        )
    }

    /// Returns a gid not used as any user's primary group.
    pub fn new_gid(&self) -> DbResult<Gid> {
        let range = self.config.gid_range;
        next_free_id(self.users.iter().map(|user| user.gid), range).ok_or(
            DbError::IdRangeExhausted {
                kind: IdKind::Gid,
                range,
            },
        )
    }

    /// Takes ownership of `user` and appends it.
    ///
    /// Rejects invalid records and duplicate names or uids; the database is
    /// unchanged on error and the rejected record is dropped.
    pub fn add_user(&mut self, user: User) -> DbResult<()> {
        user.validate()?;
        if self.by_name.contains_key(&user.name) {
            return Err(DbError::DuplicateName(user.name));
        }
        if self.get_user_by_uid(user.uid).is_some() {
            return Err(DbError::DuplicateUid(user.uid));
        }

        debug!(
            "event=user_add module=db status=ok uid={} gid={}",
            user.uid, user.gid
        );
        self.by_name.insert(user.name.clone(), self.users.len());
        self.users.push(user);
        Ok(())
    }

    /// Looks up a user by exact login name.
    pub fn get_user(&self, name: &str) -> Option<&User> {
        self.by_name.get(name).map(|&position| &self.users[position])
    }

    /// Returns the first user with `uid`, in iteration order.
    pub fn get_user_by_uid(&self, uid: Uid) -> Option<&User> {
        self.users.iter().find(|user| user.uid == uid)
    }

    pub fn contains_user(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Removes the user named `name` and hands it back.
    ///
    /// `None` when no such user exists; nothing changes in that case.
    pub fn delete_user(&mut self, name: &str) -> Option<User> {
        let position = self.by_name.remove(name)?;
        let user = self.users.remove(position);
        for later in &self.users[position..] {
            if let Some(slot) = self.by_name.get_mut(&later.name) {
                *slot -= 1;
            }
        }

        debug!(
            "event=user_delete module=db status=ok uid={} remaining={}",
            user.uid,
            self.users.len()
        );
        Some(user)
    }

    /// All records in iteration order.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn iter(&self) -> slice::Iter<'_, User> {
        self.users.iter()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl<'a> IntoIterator for &'a UserDb {
    type Item = &'a User;
    type IntoIter = slice::Iter<'a, User>;

    fn into_iter(self) -> Self::IntoIter {
        self.users.iter()
    }
}
