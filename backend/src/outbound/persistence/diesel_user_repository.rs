//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Uniqueness of phone number, email, and employee id is left to the
//! `users_*_key` constraints; a violation is reported as
//! [`UserPersistenceError::Duplicate`] naming the clashing column, so two
//! concurrent registrations for one phone number cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccountFlags, StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{
    Address, EmailAddress, EmployeeId, Employment, NewUser, PageRequest, PhoneNumber, User,
    UserFilter, UserId, UserProfile,
};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, escape_like, map_basic_diesel_error,
    map_basic_pool_error,
};
use super::models::{NewUserRow, UserFlagsUpdate, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use kpa_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/kpa")).await?;
    /// let repository = DieselUserRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

/// Column guarded by a `users_*_key` constraint.
fn unique_column(constraint: &str) -> Option<&'static str> {
    match constraint {
        "users_phone_number_key" => Some("phone_number"),
        "users_email_key" => Some("email"),
        "users_employee_id_key" => Some("employee_id"),
        _ => None,
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    if let Some(ConstraintViolation::Unique(Some(constraint))) = constraint_violation(&error)
        && let Some(column) = unique_column(constraint)
    {
        return UserPersistenceError::duplicate(column);
    }
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(format!("invalid {column} in database: {err}"))
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let phone_number =
        PhoneNumber::new(&row.phone_number).map_err(|err| corrupt("phone_number", err))?;
    let email = row
        .email
        .as_deref()
        .map(EmailAddress::new)
        .transpose()
        .map_err(|err| corrupt("email", err))?;
    let employee_id = row
        .employee_id
        .as_deref()
        .map(EmployeeId::new)
        .transpose()
        .map_err(|err| corrupt("employee_id", err))?;

    Ok(User {
        id: UserId::from_uuid(row.id),
        phone_number,
        email,
        profile: UserProfile {
            first_name: row.first_name,
            last_name: row.last_name,
            bio: row.bio,
            date_of_birth: row.date_of_birth,
            address: Address {
                line_1: row.address_line_1,
                line_2: row.address_line_2,
                city: row.city,
                state: row.state,
                postal_code: row.postal_code,
                country: row.country,
            },
        },
        employment: Employment {
            employee_id,
            department: row.department,
            position: row.position,
            manager_id: row.manager_id.map(UserId::from_uuid),
        },
        is_staff: row.is_staff,
        is_active: row.is_active,
        date_joined: row.date_joined,
        last_login: row.last_login,
    })
}

fn new_user_row(new_user: &NewUser) -> NewUserRow<'_> {
    let user = &new_user.user;
    let address = &user.profile.address;
    NewUserRow {
        id: *user.id.as_uuid(),
        phone_number: user.phone_number.as_str(),
        email: user.email.as_ref().map(EmailAddress::as_str),
        password_hash: &new_user.password_hash,
        first_name: &user.profile.first_name,
        last_name: &user.profile.last_name,
        bio: &user.profile.bio,
        date_of_birth: user.profile.date_of_birth,
        address_line_1: &address.line_1,
        address_line_2: &address.line_2,
        city: &address.city,
        state: &address.state,
        postal_code: &address.postal_code,
        country: &address.country,
        employee_id: user.employment.employee_id.as_ref().map(EmployeeId::as_str),
        department: &user.employment.department,
        position: &user.employment.position,
        manager_id: user.employment.manager_id.map(|id| *id.as_uuid()),
        is_staff: user.is_staff,
        is_active: user.is_active,
        date_joined: user.date_joined,
        last_login: user.last_login,
        updated_at: user.date_joined,
    }
}

fn user_update(user: &User, now: DateTime<Utc>) -> UserUpdate<'_> {
    let address = &user.profile.address;
    UserUpdate {
        phone_number: user.phone_number.as_str(),
        email: user.email.as_ref().map(EmailAddress::as_str),
        first_name: &user.profile.first_name,
        last_name: &user.profile.last_name,
        bio: &user.profile.bio,
        date_of_birth: user.profile.date_of_birth,
        address_line_1: &address.line_1,
        address_line_2: &address.line_2,
        city: &address.city,
        state: &address.state,
        postal_code: &address.postal_code,
        country: &address.country,
        employee_id: user.employment.employee_id.as_ref().map(EmployeeId::as_str),
        department: &user.employment.department,
        position: &user.employment.position,
        manager_id: user.employment.manager_id.map(|id| *id.as_uuid()),
        updated_at: now,
    }
}

fn flags_update(flags: AccountFlags, now: DateTime<Utc>) -> UserFlagsUpdate {
    UserFlagsUpdate {
        is_active: flags.is_active,
        is_staff: flags.is_staff,
        updated_at: now,
    }
}

/// Build the filtered listing query; called once for rows and once for the
/// count so both see the same predicates.
fn filtered(filter: &UserFilter) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table.into_boxed();
    if let Some(is_active) = filter.is_active {
        query = query.filter(users::is_active.eq(is_active));
    }
    if let Some(is_staff) = filter.is_staff {
        query = query.filter(users::is_staff.eq(is_staff));
    }
    if let Some(department) = &filter.department {
        query = query.filter(users::department.ilike(escape_like(department)));
    }
    if let Some(manager_id) = filter.manager_id {
        query = query.filter(users::manager_id.eq(*manager_id.as_uuid()));
    }
    query
}

fn expect_one(id: &UserId, affected: usize) -> Result<(), UserPersistenceError> {
    if affected == 0 {
        Err(UserPersistenceError::not_found(id.to_string()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&new_user_row(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_credentials(
        &self,
        phone_number: &PhoneNumber,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(UserRow, String)> = users::table
            .filter(users::phone_number.eq(phone_number.as_str()))
            .select((UserRow::as_select(), users::password_hash))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(user, password_hash)| {
            Ok(StoredCredentials {
                user: row_to_user(user)?,
                password_hash,
            })
        })
        .transpose()
    }

    async fn password_hash(&self, id: &UserId) -> Result<Option<String>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(users::password_hash)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn update_details(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(users::table.filter(users::id.eq(user.id.as_uuid())))
            .set(&user_update(user, Utc::now()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        expect_one(&user.id, affected)
    }

    async fn set_flags(
        &self,
        id: &UserId,
        flags: AccountFlags,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(flags_update(flags, Utc::now()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        expect_one(id, affected)
    }

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::password_hash.eq(password_hash),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        expect_one(id, affected)
    }

    async fn record_login(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::last_login.eq(at))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        expect_one(id, affected)
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let offset = i64::try_from(page.offset())
            .map_err(|_| UserPersistenceError::query("page offset out of range"))?;
        let rows: Vec<UserRow> = filtered(filter)
            .order((users::date_joined.desc(), users::id))
            .limit(i64::from(page.page_size()))
            .offset(offset)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let users = rows
            .into_iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((users, u64::try_from(total).unwrap_or_default()))
    }
}
