//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewUser, PageRequest, PhoneNumber, User, UserFilter, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column already holds the value; `field` names the column.
        Duplicate { field: String } => "user {field} already exists",
        /// The addressed user does not exist.
        NotFound { id: String } => "user {id} not found",
    }
}

/// Account flags changed by targeted updates. `None` leaves a flag alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountFlags {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

impl AccountFlags {
    /// Flags for a soft delete.
    pub fn deactivated() -> Self {
        Self {
            is_active: Some(false),
            is_staff: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.is_staff.is_none()
    }
}

/// Stored account together with its password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Uniqueness of phone number, email, and employee
    /// id is enforced by the store and reported as
    /// [`UserPersistenceError::Duplicate`].
    async fn create(&self, user: &NewUser) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account and its hash by login phone number.
    async fn find_credentials(
        &self,
        phone_number: &PhoneNumber,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Fetch the password hash of a user.
    async fn password_hash(&self, id: &UserId) -> Result<Option<String>, UserPersistenceError>;

    /// Persist the contact, profile, and employment columns of `user`.
    ///
    /// `is_active`, `is_staff`, and `last_login` are never written here, so a
    /// stale read cannot undo a concurrent deactivation or promotion.
    async fn update_details(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Set only the account flags named in `flags`.
    async fn set_flags(
        &self,
        id: &UserId,
        flags: AccountFlags,
    ) -> Result<(), UserPersistenceError>;

    /// Replace the stored password hash.
    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserPersistenceError>;

    /// Stamp the last successful login.
    async fn record_login(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError>;

    /// Return one page of users matching `filter`, ordered by join date, and
    /// the total number of matches.
    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), UserPersistenceError>;
}
