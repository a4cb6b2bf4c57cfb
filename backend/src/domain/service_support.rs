//! Internal helpers shared by the account, form, and maintenance services.

use crate::domain::ports::{
    FormRepository, FormRepositoryError, PasswordHashError, RefreshTokenRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{Actor, Error, Form, FormId, User, UserId};

pub(crate) const STAFF_ONLY: &str = "You do not have permission to perform this action.";

/// Client-facing message for a unique column clash.
pub(crate) fn duplicate_user_message(field: &str) -> String {
    let label = match field {
        "phone_number" => "phone number",
        "email" => "email address",
        "employee_id" => "employee id",
        other => other,
    };
    format!("A user with that {label} already exists.")
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            let message = duplicate_user_message(&field);
            Error::conflict(message.clone()).with_field_error(field, message)
        }
        UserPersistenceError::NotFound { .. } => Error::not_found("User not found"),
    }
}

pub(crate) fn map_refresh_token_error(error: RefreshTokenRepositoryError) -> Error {
    match error {
        RefreshTokenRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("refresh token repository unavailable: {message}"))
        }
        RefreshTokenRepositoryError::Query { message } => {
            Error::internal(format!("refresh token repository error: {message}"))
        }
    }
}

pub(crate) fn map_form_error(error: FormRepositoryError) -> Error {
    match error {
        FormRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("form repository unavailable: {message}"))
        }
        FormRepositoryError::Query { message } => {
            Error::internal(format!("form repository error: {message}"))
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

/// Fail with 403 unless the caller is staff.
pub(crate) fn require_staff(actor: &Actor) -> Result<(), Error> {
    if actor.is_staff {
        Ok(())
    } else {
        Err(Error::forbidden(STAFF_ONLY))
    }
}

/// Load a user or fail with 404.
pub(crate) async fn fetch_user<U>(users: &U, id: &UserId) -> Result<User, Error>
where
    U: UserRepository + ?Sized,
{
    users
        .find_by_id(id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| Error::not_found("User not found"))
}

/// Load a form or fail with 404.
pub(crate) async fn fetch_form<F>(forms: &F, id: &FormId) -> Result<Form, Error>
where
    F: FormRepository + ?Sized,
{
    forms
        .find_by_id(id)
        .await
        .map_err(map_form_error)?
        .ok_or_else(|| Error::not_found("Form not found"))
}
