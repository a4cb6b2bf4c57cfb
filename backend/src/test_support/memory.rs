//! In-memory driven adapters.
//!
//! Each repository keeps its rows behind a `Mutex` so uniqueness checks and
//! compare-and-set updates happen under one lock, mirroring the constraints
//! and transactions of the PostgreSQL adapters.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    AccountFlags, BogieChecksheetRepository, FormRepository, FormRepositoryError,
    MaintenanceRepositoryError, RefreshTokenRepository, RefreshTokenRepositoryError,
    StoredCredentials, SubmissionRepository, SubmissionRepositoryError, UserPersistenceError,
    UserRepository, WheelSpecificationRepository,
};
use crate::domain::{
    BogieChecksheet, BogieChecksheetFilter, Form, FormId, FormNumber, NewUser, PageRequest,
    PhoneNumber, RecordStatus, RefreshTokenRecord, Review, Submission, SubmissionFilter,
    SubmissionId, SubmissionStatus, User, UserFilter, UserId, WheelSpecification,
    WheelSpecificationFilter,
};

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{name} mutex poisoned"),
    }
}

/// Newest first; among equal timestamps the later insert wins.
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut items: Vec<T> = rows.iter().rev().cloned().collect();
    items.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    items
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<StoredCredentials>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account directly, bypassing uniqueness checks.
    pub fn seed(&self, user: User, password_hash: impl Into<String>) {
        lock(&self.rows, "user store").push(StoredCredentials {
            user,
            password_hash: password_hash.into(),
        });
    }

    pub fn get(&self, id: &UserId) -> Option<User> {
        lock(&self.rows, "user store")
            .iter()
            .find(|row| row.user.id == *id)
            .map(|row| row.user.clone())
    }

    pub fn count(&self) -> usize {
        lock(&self.rows, "user store").len()
    }
}

/// Name the first unique column `candidate` shares with another row.
fn clashing_column(rows: &[StoredCredentials], candidate: &User) -> Option<&'static str> {
    let others = || rows.iter().map(|row| &row.user).filter(|u| u.id != candidate.id);
    if others().any(|u| u.phone_number == candidate.phone_number) {
        return Some("phone_number");
    }
    if let Some(email) = &candidate.email
        && others().any(|u| u.email.as_ref() == Some(email))
    {
        return Some("email");
    }
    if let Some(employee_id) = &candidate.employment.employee_id
        && others().any(|u| u.employment.employee_id.as_ref() == Some(employee_id))
    {
        return Some("employee_id");
    }
    None
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<(), UserPersistenceError> {
        let mut rows = lock(&self.rows, "user store");
        if let Some(field) = clashing_column(&rows, &user.user) {
            return Err(UserPersistenceError::duplicate(field));
        }
        rows.push(StoredCredentials {
            user: user.user.clone(),
            password_hash: user.password_hash.clone(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.get(id))
    }

    async fn find_credentials(
        &self,
        phone_number: &PhoneNumber,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(lock(&self.rows, "user store")
            .iter()
            .find(|row| row.user.phone_number == *phone_number)
            .cloned())
    }

    async fn password_hash(&self, id: &UserId) -> Result<Option<String>, UserPersistenceError> {
        Ok(lock(&self.rows, "user store")
            .iter()
            .find(|row| row.user.id == *id)
            .map(|row| row.password_hash.clone()))
    }

    async fn update_details(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut rows = lock(&self.rows, "user store");
        if let Some(field) = clashing_column(&rows, user) {
            return Err(UserPersistenceError::duplicate(field));
        }
        let row = rows
            .iter_mut()
            .find(|row| row.user.id == user.id)
            .ok_or_else(|| UserPersistenceError::not_found(user.id.to_string()))?;
        let stored = &mut row.user;
        stored.phone_number = user.phone_number.clone();
        stored.email = user.email.clone();
        stored.profile = user.profile.clone();
        stored.employment = user.employment.clone();
        Ok(())
    }

    async fn set_flags(
        &self,
        id: &UserId,
        flags: AccountFlags,
    ) -> Result<(), UserPersistenceError> {
        let mut rows = lock(&self.rows, "user store");
        let row = rows
            .iter_mut()
            .find(|row| row.user.id == *id)
            .ok_or_else(|| UserPersistenceError::not_found(id.to_string()))?;
        if let Some(is_active) = flags.is_active {
            row.user.is_active = is_active;
        }
        if let Some(is_staff) = flags.is_staff {
            row.user.is_staff = is_staff;
        }
        Ok(())
    }

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut rows = lock(&self.rows, "user store");
        let row = rows
            .iter_mut()
            .find(|row| row.user.id == *id)
            .ok_or_else(|| UserPersistenceError::not_found(id.to_string()))?;
        password_hash.clone_into(&mut row.password_hash);
        Ok(())
    }

    async fn record_login(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError> {
        let mut rows = lock(&self.rows, "user store");
        let row = rows
            .iter_mut()
            .find(|row| row.user.id == *id)
            .ok_or_else(|| UserPersistenceError::not_found(id.to_string()))?;
        row.user.last_login = Some(at);
        Ok(())
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), UserPersistenceError> {
        let users: Vec<User> = lock(&self.rows, "user store")
            .iter()
            .map(|row| row.user.clone())
            .filter(|user| filter.matches(user))
            .collect();
        let matching = newest_first(&users, |user| user.date_joined);
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.page_size() as usize)
            .collect();
        Ok((items, total))
    }
}

#[derive(Debug, Clone)]
struct TokenRow {
    record: RefreshTokenRecord,
    revoked_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    rows: Mutex<Vec<TokenRow>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows held for `user_id`, revoked or not.
    pub fn held(&self, user_id: &UserId) -> usize {
        lock(&self.rows, "refresh token store")
            .iter()
            .filter(|row| row.record.user_id == *user_id)
            .count()
    }

    /// Number of unrevoked tokens held for `user_id`.
    pub fn outstanding(&self, user_id: &UserId) -> usize {
        lock(&self.rows, "refresh token store")
            .iter()
            .filter(|row| row.record.user_id == *user_id && row.revoked_at.is_none())
            .count()
    }

    /// Revocation stamps of the tokens held for `user_id`.
    pub fn revocations(&self, user_id: &UserId) -> Vec<Option<DateTime<Utc>>> {
        lock(&self.rows, "refresh token store")
            .iter()
            .filter(|row| row.record.user_id == *user_id)
            .map(|row| row.revoked_at)
            .collect()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn store(&self, record: &RefreshTokenRecord) -> Result<(), RefreshTokenRepositoryError> {
        lock(&self.rows, "refresh token store").push(TokenRow {
            record: record.clone(),
            revoked_at: None,
        });
        Ok(())
    }

    async fn rotate(
        &self,
        presented: Uuid,
        replacement: &RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<bool, RefreshTokenRepositoryError> {
        let owner = replacement.user_id;
        let mut rows = lock(&self.rows, "refresh token store");
        let Some(current) = rows.iter().position(|row| {
            row.record.token_id == presented
                && row.revoked_at.is_none()
                && row.record.expires_at > now
                && row.record.user_id == owner
        }) else {
            return Ok(false);
        };
        rows.remove(current);
        rows.retain(|row| {
            let live = row.revoked_at.is_none() && row.record.expires_at > now;
            row.record.user_id != owner || live
        });
        rows.push(TokenRow {
            record: replacement.clone(),
            revoked_at: None,
        });
        Ok(true)
    }

    async fn revoke_all(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, RefreshTokenRepositoryError> {
        let mut revoked = 0;
        for row in lock(&self.rows, "refresh token store")
            .iter_mut()
            .filter(|row| row.record.user_id == *user_id && row.revoked_at.is_none())
        {
            row.revoked_at = Some(at);
            revoked += 1;
        }
        Ok(revoked)
    }
}

#[derive(Default)]
pub struct InMemoryFormRepository {
    rows: Mutex<Vec<Form>>,
}

impl InMemoryFormRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, form: Form) {
        lock(&self.rows, "form store").push(form);
    }
}

#[async_trait]
impl FormRepository for InMemoryFormRepository {
    async fn create(&self, form: &Form) -> Result<(), FormRepositoryError> {
        lock(&self.rows, "form store").push(form.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &FormId) -> Result<Option<Form>, FormRepositoryError> {
        Ok(lock(&self.rows, "form store")
            .iter()
            .find(|form| form.id == *id)
            .cloned())
    }

    async fn list(&self, include_inactive: bool) -> Result<Vec<Form>, FormRepositoryError> {
        let forms: Vec<Form> = lock(&self.rows, "form store")
            .iter()
            .filter(|form| include_inactive || form.is_active)
            .cloned()
            .collect();
        Ok(newest_first(&forms, |form| form.created_at))
    }

    async fn set_active(
        &self,
        id: &FormId,
        is_active: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, FormRepositoryError> {
        let mut rows = lock(&self.rows, "form store");
        let Some(form) = rows.iter_mut().find(|form| form.id == *id) else {
            return Ok(false);
        };
        form.is_active = is_active;
        form.updated_at = at;
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemorySubmissionRepository {
    rows: Mutex<Vec<Submission>>,
}

impl InMemorySubmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        lock(&self.rows, "submission store").len()
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn create(&self, submission: &Submission) -> Result<(), SubmissionRepositoryError> {
        lock(&self.rows, "submission store").push(submission.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SubmissionId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        Ok(lock(&self.rows, "submission store")
            .iter()
            .find(|submission| submission.id == *id)
            .cloned())
    }

    async fn list(
        &self,
        filter: &SubmissionFilter,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        let matching: Vec<Submission> = lock(&self.rows, "submission store")
            .iter()
            .filter(|submission| filter.matches(submission))
            .cloned()
            .collect();
        Ok(newest_first(&matching, |submission| submission.submitted_at))
    }

    async fn transition(
        &self,
        id: &SubmissionId,
        expected: SubmissionStatus,
        next: SubmissionStatus,
        review: &Review,
    ) -> Result<bool, SubmissionRepositoryError> {
        let mut rows = lock(&self.rows, "submission store");
        let Some(submission) = rows
            .iter_mut()
            .find(|submission| submission.id == *id && submission.status == expected)
        else {
            return Ok(false);
        };
        submission.status = next;
        submission.review = Some(review.clone());
        Ok(true)
    }
}

/// Shared body of the two maintenance record stores.
macro_rules! in_memory_record_repository {
    ($name:ident, $trait_name:ident, $record:ty, $filter:ty) => {
        #[derive(Default)]
        pub struct $name {
            rows: Mutex<Vec<$record>>,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn count(&self) -> usize {
                lock(&self.rows, stringify!($name)).len()
            }
        }

        #[async_trait]
        impl $trait_name for $name {
            async fn create(&self, record: &$record) -> Result<(), MaintenanceRepositoryError> {
                let mut rows = lock(&self.rows, stringify!($name));
                if rows.iter().any(|row| row.form_number == record.form_number) {
                    return Err(MaintenanceRepositoryError::duplicate_form_number(
                        record.form_number.as_str(),
                    ));
                }
                rows.push(record.clone());
                Ok(())
            }

            async fn find_by_form_number(
                &self,
                form_number: &FormNumber,
            ) -> Result<Option<$record>, MaintenanceRepositoryError> {
                Ok(lock(&self.rows, stringify!($name))
                    .iter()
                    .find(|row| row.form_number == *form_number)
                    .cloned())
            }

            async fn list(
                &self,
                filter: &$filter,
            ) -> Result<Vec<$record>, MaintenanceRepositoryError> {
                let matching: Vec<$record> = lock(&self.rows, stringify!($name))
                    .iter()
                    .filter(|row| filter.matches(row))
                    .cloned()
                    .collect();
                Ok(newest_first(&matching, |row| row.created_at))
            }

            async fn transition(
                &self,
                form_number: &FormNumber,
                expected: RecordStatus,
                next: RecordStatus,
                at: DateTime<Utc>,
            ) -> Result<bool, MaintenanceRepositoryError> {
                let mut rows = lock(&self.rows, stringify!($name));
                let Some(row) = rows
                    .iter_mut()
                    .find(|row| row.form_number == *form_number && row.status == expected)
                else {
                    return Ok(false);
                };
                row.status = next;
                row.updated_at = at;
                Ok(true)
            }
        }
    };
}

in_memory_record_repository!(
    InMemoryWheelSpecificationRepository,
    WheelSpecificationRepository,
    WheelSpecification,
    WheelSpecificationFilter
);
in_memory_record_repository!(
    InMemoryBogieChecksheetRepository,
    BogieChecksheetRepository,
    BogieChecksheet,
    BogieChecksheetFilter
);
