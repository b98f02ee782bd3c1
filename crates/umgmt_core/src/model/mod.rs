//! Account domain model.
//!
//! # Responsibility
//! - Define the user record owned by the user database.
//! - Validate record fields before they reach persistence.
//!
//! # Invariants
//! - A valid `User` can always be written as one passwd line and read back.

pub mod user;
