//! Storage port: Trait for persistent storage operations.
//!
//! Users are mutable profiles; health records are an append-only log.

use crate::domain::{HealthRecord, NewHealthRecord, NewUser, User, UserUpdate};

/// Trait for the relational store.
pub trait Storage: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert a new user.
    ///
    /// # Errors
    /// Returns error if the username is taken or the write fails.
    fn create_user(&self, user: &NewUser) -> Result<User, Self::Error>;

    /// Look a user up by username.
    ///
    /// # Returns
    /// `None` if no such user exists.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn find_user(&self, username: &str) -> Result<Option<User>, Self::Error>;

    /// Apply a profile update.
    ///
    /// # Errors
    /// Returns error if the user does not exist or the write fails.
    fn update_user(&self, username: &str, update: &UserUpdate) -> Result<User, Self::Error>;

    /// Append a health record and return it with its id and timestamp.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn append_record(&self, record: &NewHealthRecord) -> Result<HealthRecord, Self::Error>;

    /// Fetch one record by id.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn get_record(&self, id: i64) -> Result<Option<HealthRecord>, Self::Error>;

    /// All records for a username, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn records_for_user(&self, username: &str) -> Result<Vec<HealthRecord>, Self::Error>;

    /// Total number of records.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn count_records(&self) -> Result<usize, Self::Error>;
}
