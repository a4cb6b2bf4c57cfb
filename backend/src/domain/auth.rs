//! Authentication primitives: registration, login credentials, password
//! changes, and the token pair handed back to clients.
//!
//! Constructors validate raw strings so handlers never pass unchecked input
//! to a port. Plaintext passwords live in [`Zeroizing`] buffers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::field_errors::FieldErrors;
use super::user::{EmailAddress, NAME_MAX, PhoneNumber, UserId, check_length};

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN_LENGTH: usize = 8;
/// Token type reported alongside issued tokens.
pub const TOKEN_TYPE: &str = "Bearer";
/// Message returned for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid phone number or password";
/// Message returned for every rejected refresh token.
pub const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

/// Domain error returned when login payload values are blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Phone number was missing or blank once trimmed.
    EmptyPhoneNumber,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPhoneNumber => write!(f, "phone number must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

impl LoginValidationError {
    /// Request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyPhoneNumber => "phone_number",
            Self::EmptyPassword => "password",
        }
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `phone_number` is trimmed and non-empty. Its format is not checked here
///   so a malformed number fails like any other unknown account.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use kpa_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" +1234567890 ", "secret-pass").unwrap();
/// assert_eq!(creds.phone_number(), "+1234567890");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    phone_number: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    ///
    /// # Errors
    /// Returns [`LoginValidationError`] when either value is blank.
    pub fn try_from_parts(phone_number: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = phone_number.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyPhoneNumber);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            phone_number: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised phone number.
    #[must_use]
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Password exactly as supplied.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raw registration input as received from a client.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub phone_number: String,
    pub password: Zeroizing<String>,
    pub confirm_password: Zeroizing<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

/// Validated registration ready for hashing and persistence.
#[derive(Debug, Clone)]
pub struct Registration {
    pub phone_number: PhoneNumber,
    pub password: Zeroizing<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<EmailAddress>,
}

impl Registration {
    /// Validate every registration field, collecting all violations.
    ///
    /// # Errors
    /// Returns the collected [`FieldErrors`] when any field is invalid.
    ///
    /// # Examples
    /// ```
    /// use kpa_backend::domain::{Registration, RegistrationRequest};
    ///
    /// let errors = Registration::try_from_request(RegistrationRequest::default()).unwrap_err();
    /// assert!(errors.contains("phone_number"));
    /// assert!(errors.contains("password"));
    /// assert!(errors.contains("first_name"));
    /// ```
    pub fn try_from_request(request: RegistrationRequest) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let phone_number = match PhoneNumber::new(&request.phone_number) {
            Ok(phone) => Some(phone),
            Err(err) => {
                errors.push("phone_number", err.to_string());
                None
            }
        };
        let email = match request.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match EmailAddress::new(raw) {
                Ok(email) => Some(email),
                Err(err) => {
                    errors.push("email", err.to_string());
                    None
                }
            },
        };
        check_new_password(
            &mut errors,
            ("password", request.password.as_str()),
            ("confirm_password", request.confirm_password.as_str()),
        );
        let first_name = required_name(&mut errors, "first_name", &request.first_name);
        let last_name = required_name(&mut errors, "last_name", &request.last_name);

        match phone_number {
            Some(phone_number) if errors.is_empty() => Ok(Self {
                phone_number,
                password: request.password,
                first_name,
                last_name,
                email,
            }),
            _ => Err(errors),
        }
    }
}

fn required_name(errors: &mut FieldErrors, field: &str, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(field, "This field is required.");
    } else {
        check_length(errors, field, trimmed, NAME_MAX);
    }
    trimmed.to_owned()
}

/// Check a new password and its confirmation, recording violations.
pub(crate) fn check_new_password(
    errors: &mut FieldErrors,
    (password_field, password): (&str, &str),
    (confirm_field, confirmation): (&str, &str),
) {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        errors.push(
            password_field,
            format!("Password must be at least {PASSWORD_MIN_LENGTH} characters long."),
        );
    }
    if password != confirmation {
        errors.push(confirm_field, "Passwords do not match.");
    }
}

/// Raw password change input.
#[derive(Debug, Clone, Default)]
pub struct PasswordChange {
    pub old_password: Zeroizing<String>,
    pub new_password: Zeroizing<String>,
    pub confirm_password: Zeroizing<String>,
}

impl PasswordChange {
    /// Validate the shape of the change; the old password is verified by the
    /// service against the stored hash.
    ///
    /// # Errors
    /// Returns every violation found.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.old_password.is_empty() {
            errors.push("old_password", "This field is required.");
        }
        check_new_password(
            &mut errors,
            ("new_password", self.new_password.as_str()),
            ("confirm_password", self.confirm_password.as_str()),
        );
        errors.into_result(())
    }
}

/// Caller identity resolved from a verified access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub is_staff: bool,
}

impl Actor {
    /// Return `true` when the caller may act on `target`: themself or staff.
    #[must_use]
    pub fn may_access(&self, target: &UserId) -> bool {
        self.is_staff || self.user_id == *target
    }
}

/// Claims carried by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    pub user_id: UserId,
    pub is_staff: bool,
    pub expires_at: DateTime<Utc>,
}

/// Claims carried by a verified refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshClaims {
    pub token_id: Uuid,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Server-side record of an issued refresh token.
///
/// Only the token id is stored; rotation consumes the record so a token can
/// be exchanged exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token_id: Uuid,
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Access/refresh token pair returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request() -> RegistrationRequest {
        RegistrationRequest {
            phone_number: "+1234567890".into(),
            password: Zeroizing::new("correct-horse".into()),
            confirm_password: Zeroizing::new("correct-horse".into()),
            first_name: " Ada ".into(),
            last_name: "Lovelace".into(),
            email: None,
        }
    }

    #[rstest]
    #[case("   ", "password", LoginValidationError::EmptyPhoneNumber)]
    #[case("+1234567890", "", LoginValidationError::EmptyPassword)]
    fn login_rejects_blank_parts(
        #[case] phone: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(phone, password).expect_err("blank input");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("+1234567890", " pass ").expect("valid");
        assert_eq!(creds.password(), " pass ");
    }

    #[rstest]
    fn registration_trims_names() {
        let registration = Registration::try_from_request(request()).expect("valid");
        assert_eq!(registration.first_name, "Ada");
        assert_eq!(registration.phone_number.as_str(), "+1234567890");
        assert!(registration.email.is_none());
    }

    #[rstest]
    fn registration_reports_all_violations() {
        let mut raw = request();
        raw.phone_number = "123".into();
        raw.password = Zeroizing::new("short".into());
        raw.confirm_password = Zeroizing::new("other".into());
        raw.last_name = String::new();
        raw.email = Some("nope".into());

        let errors = Registration::try_from_request(raw).expect_err("invalid");
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![
                "phone_number",
                "email",
                "password",
                "confirm_password",
                "last_name"
            ]
        );
    }

    #[rstest]
    fn registration_ignores_blank_email() {
        let mut raw = request();
        raw.email = Some("  ".into());
        assert!(Registration::try_from_request(raw).is_ok());
    }

    #[rstest]
    fn password_change_requires_matching_confirmation() {
        let change = PasswordChange {
            old_password: Zeroizing::new("old-password".into()),
            new_password: Zeroizing::new("new-password".into()),
            confirm_password: Zeroizing::new("new-passw0rd".into()),
        };
        let errors = change.validate().expect_err("mismatch");
        assert!(errors.contains("confirm_password"));
        assert!(!errors.contains("new_password"));
    }

    #[rstest]
    #[case(true, false)]
    #[case(false, true)]
    fn actor_access_rules(#[case] is_staff: bool, #[case] same_user: bool) {
        let user_id = UserId::random();
        let actor = Actor { user_id, is_staff };
        let target = if same_user { user_id } else { UserId::random() };
        assert!(actor.may_access(&target));
        let stranger = Actor {
            user_id: UserId::random(),
            is_staff: false,
        };
        assert!(!stranger.may_access(&target));
    }
}
