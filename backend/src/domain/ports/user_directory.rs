//! Driving port for profile and directory management.

use async_trait::async_trait;

use crate::domain::{
    Actor, AdminUserUpdate, Error, Page, PageRequest, ProfileUpdate, RegistrationRequest, User,
    UserFilter, UserId,
};

/// Staff request to create an account with organisational details.
#[derive(Debug, Clone, Default)]
pub struct NewAccountRequest {
    pub registration: RegistrationRequest,
    pub details: AdminUserUpdate,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// The caller's own account.
    async fn profile(&self, actor: &Actor) -> Result<User, Error>;

    /// Update the caller's self-service fields.
    async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> Result<User, Error>;

    /// Staff only: filtered, paginated listing.
    async fn list(
        &self,
        actor: &Actor,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, Error>;

    /// Staff only: create an account.
    async fn create(&self, actor: &Actor, request: NewAccountRequest) -> Result<User, Error>;

    /// The caller's own account, or any account for staff.
    async fn get(&self, actor: &Actor, id: UserId) -> Result<User, Error>;

    /// Update an account. Non-staff callers may only change their own
    /// self-service fields.
    async fn update(
        &self,
        actor: &Actor,
        id: UserId,
        update: AdminUserUpdate,
    ) -> Result<User, Error>;

    /// Staff only: soft-delete an account and revoke its refresh tokens.
    async fn deactivate(&self, actor: &Actor, id: UserId) -> Result<(), Error>;
}
