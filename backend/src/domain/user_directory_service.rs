//! Profile self-service and staff account management.
//!
//! Deactivation is a soft delete: the row stays, `is_active` flips, and every
//! outstanding refresh token of the account is revoked. Account flags are only
//! ever written by targeted updates; detail edits never carry them.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    AccountFlags, NewAccountRequest, PasswordHasher, RefreshTokenRepository, UserDirectory,
    UserRepository,
};
use crate::domain::service_support::{
    STAFF_ONLY, fetch_user, map_hash_error, map_refresh_token_error, map_user_error,
    require_staff,
};
use crate::domain::{
    Actor, AdminUserUpdate, Employment, Error, FieldErrors, ManagerChange, NewUser, Page,
    PageRequest, ProfileUpdate, Registration, User, UserFilter, UserId, UserProfile,
};

/// Longest manager chain walked when checking for cycles.
const MAX_MANAGER_DEPTH: usize = 64;
const MANAGER_FIELD: &str = "manager_id";

/// Directory service implementing [`UserDirectory`].
#[derive(Clone)]
pub struct UserDirectoryService<U, R> {
    users: Arc<U>,
    refresh_tokens: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl<U, R> UserDirectoryService<U, R> {
    pub fn new(
        users: Arc<U>,
        refresh_tokens: Arc<R>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            hasher,
            clock,
        }
    }
}

impl<U, R> UserDirectoryService<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    /// Check that assigning `manager` to `subject` names an existing account
    /// and keeps the hierarchy acyclic.
    async fn check_manager(
        &self,
        subject: UserId,
        manager: UserId,
        errors: &mut FieldErrors,
    ) -> Result<(), Error> {
        if manager == subject {
            errors.push(MANAGER_FIELD, "A user cannot be their own manager.");
            return Ok(());
        }
        let mut cursor = Some(manager);
        let mut depth = 0;
        while let Some(current) = cursor {
            let Some(user) = self.users.find_by_id(&current).await.map_err(map_user_error)?
            else {
                if current == manager {
                    errors.push(MANAGER_FIELD, "User not found");
                }
                return Ok(());
            };
            depth += 1;
            if depth > MAX_MANAGER_DEPTH {
                errors.push(MANAGER_FIELD, "Manager chain is too deep.");
                return Ok(());
            }
            cursor = user.employment.manager_id;
            if cursor == Some(subject) {
                errors.push(MANAGER_FIELD, "Manager assignment would create a cycle.");
                return Ok(());
            }
        }
        Ok(())
    }

    async fn persist_details(&self, user: &User) -> Result<User, Error> {
        self.users
            .update_details(user)
            .await
            .map_err(map_user_error)?;
        fetch_user(self.users.as_ref(), &user.id).await
    }

    async fn set_flags(&self, id: &UserId, flags: AccountFlags) -> Result<(), Error> {
        if flags.is_empty() {
            return Ok(());
        }
        self.users.set_flags(id, flags).await.map_err(map_user_error)
    }

    async fn revoke_sessions(&self, id: &UserId) -> Result<u64, Error> {
        self.refresh_tokens
            .revoke_all(id, self.clock.utc())
            .await
            .map_err(map_refresh_token_error)
    }
}

#[async_trait]
impl<U, R> UserDirectory for UserDirectoryService<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    async fn profile(&self, actor: &Actor) -> Result<User, Error> {
        fetch_user(self.users.as_ref(), &actor.user_id).await
    }

    async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> Result<User, Error> {
        let mut user = fetch_user(self.users.as_ref(), &actor.user_id).await?;
        let mut errors = FieldErrors::new();
        update.apply(&mut user, &mut errors);
        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }
        self.persist_details(&user).await
    }

    async fn list(
        &self,
        actor: &Actor,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, Error> {
        require_staff(actor)?;
        let (items, total) = self
            .users
            .list(&filter, page)
            .await
            .map_err(map_user_error)?;
        Ok(Page::new(items, total, page))
    }

    async fn create(&self, actor: &Actor, request: NewAccountRequest) -> Result<User, Error> {
        require_staff(actor)?;
        let registration =
            Registration::try_from_request(request.registration).map_err(Error::validation)?;
        let now = self.clock.utc();
        let mut user = User {
            id: UserId::random(),
            phone_number: registration.phone_number,
            email: registration.email,
            profile: UserProfile {
                first_name: registration.first_name,
                last_name: registration.last_name,
                ..UserProfile::default()
            },
            employment: Employment::default(),
            is_staff: false,
            is_active: true,
            date_joined: now,
            last_login: None,
        };

        let mut errors = FieldErrors::new();
        if let Some(ManagerChange::Assign(manager)) = request.details.manager {
            self.check_manager(user.id, manager, &mut errors).await?;
        }
        request.details.apply(&mut user, &mut errors);
        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }

        let password_hash = self
            .hasher
            .hash(registration.password.as_str())
            .map_err(map_hash_error)?;
        self.users
            .create(&NewUser {
                user: user.clone(),
                password_hash,
            })
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, created_by = %actor.user_id, "staff created account");
        Ok(user)
    }

    async fn get(&self, actor: &Actor, id: UserId) -> Result<User, Error> {
        if !actor.may_access(&id) {
            return Err(Error::forbidden(STAFF_ONLY));
        }
        fetch_user(self.users.as_ref(), &id).await
    }

    async fn update(
        &self,
        actor: &Actor,
        id: UserId,
        update: AdminUserUpdate,
    ) -> Result<User, Error> {
        if !actor.may_access(&id) || (!actor.is_staff && update.touches_admin_fields()) {
            return Err(Error::forbidden(STAFF_ONLY));
        }
        if update.is_active == Some(false) && id == actor.user_id {
            return Err(Error::invalid_request("You cannot deactivate your own account.")
                .with_field_error("is_active", "You cannot deactivate your own account."));
        }
        let mut user = fetch_user(self.users.as_ref(), &id).await?;
        let flags = AccountFlags {
            is_active: update.is_active,
            is_staff: update.is_staff,
        };

        let mut errors = FieldErrors::new();
        if let Some(ManagerChange::Assign(manager)) = update.manager {
            self.check_manager(id, manager, &mut errors).await?;
        }
        update.apply(&mut user, &mut errors);
        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }
        self.users
            .update_details(&user)
            .await
            .map_err(map_user_error)?;
        self.set_flags(&id, flags).await?;
        if flags.is_active == Some(false) {
            let revoked = self.revoke_sessions(&id).await?;
            info!(user_id = %id, revoked, "account deactivated by update");
        }
        fetch_user(self.users.as_ref(), &id).await
    }

    async fn deactivate(&self, actor: &Actor, id: UserId) -> Result<(), Error> {
        require_staff(actor)?;
        if id == actor.user_id {
            return Err(Error::invalid_request("You cannot delete your own account."));
        }
        self.set_flags(&id, AccountFlags::deactivated()).await?;
        let revoked = self.revoke_sessions(&id).await?;
        info!(user_id = %id, deactivated_by = %actor.user_id, revoked, "account deactivated");
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_directory_service_tests.rs"]
mod tests;
