//! In-process account store.

use super::{ensure_storable, AccountStore, StoreResult};
use crate::model::user::User;
use std::cell::RefCell;

/// Account store backed by a vector, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    users: RefCell<Vec<User>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RefCell::new(users),
        }
    }

    /// Returns a copy of the currently persisted records.
    pub fn snapshot(&self) -> Vec<User> {
        self.users.borrow().clone()
    }
}

impl AccountStore for MemoryAccountStore {
    fn read_accounts(&self) -> StoreResult<Vec<User>> {
        Ok(self.snapshot())
    }

    fn write_accounts(&self, users: &[User]) -> StoreResult<()> {
        ensure_storable(users)?;
        *self.users.borrow_mut() = users.to_vec();
        Ok(())
    }
}
