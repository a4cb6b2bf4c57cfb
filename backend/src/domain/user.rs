//! User directory data model.
//!
//! Users are identified by phone number. Profile and employment details are
//! free text with length limits; the manager link is an id back-reference so
//! hierarchies never own each other.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field_errors::FieldErrors;

/// Maximum length of first and last names.
pub const NAME_MAX: usize = 150;
/// Maximum length of the free-text biography.
pub const BIO_MAX: usize = 500;
/// Maximum length of an employee identifier.
pub const EMPLOYEE_ID_MAX: usize = 50;
/// Maximum length of department and position labels.
pub const ORG_LABEL_MAX: usize = 100;
/// Maximum length of an address line.
pub const ADDRESS_LINE_MAX: usize = 255;
/// Maximum length of city, state and country values.
pub const LOCALITY_MAX: usize = 100;
/// Maximum length of a postal code.
pub const POSTAL_CODE_MAX: usize = 20;

/// Validation errors raised by user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    InvalidPhoneNumber,
    InvalidEmail,
    EmptyEmployeeId,
    TooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::InvalidPhoneNumber => write!(
                f,
                "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed."
            ),
            Self::InvalidEmail => write!(f, "Enter a valid email address."),
            Self::EmptyEmployeeId => write!(f, "employee id must not be blank"),
            Self::TooLong { max } => {
                write!(f, "Ensure this field has no more than {max} characters.")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its textual form.
    ///
    /// # Errors
    /// Returns [`UserValidationError::InvalidId`] when `id` is not a UUID.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static PHONE_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+?1?\d{9,15}$")
            .unwrap_or_else(|error| panic!("phone number regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// International phone number used as the login identifier.
///
/// ## Invariants
/// - Matches `^\+?1?\d{9,15}$` after trimming surrounding whitespace.
///
/// # Examples
/// ```
/// use kpa_backend::domain::PhoneNumber;
///
/// assert!(PhoneNumber::new("+1234567890").is_ok());
/// assert!(PhoneNumber::new("12-34").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a phone number.
    ///
    /// # Errors
    /// Returns [`UserValidationError::InvalidPhoneNumber`] on format mismatch.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if phone_regex().is_match(trimmed) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(UserValidationError::InvalidPhoneNumber)
        }
    }

    /// Borrow the phone number text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

/// Email address with a lower-cased domain part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// # Errors
    /// Returns [`UserValidationError::InvalidEmail`] for malformed input.
    ///
    /// # Examples
    /// ```
    /// use kpa_backend::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("Ada@Example.COM").unwrap();
    /// assert_eq!(email.as_str(), "Ada@example.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.chars().count() > 254 || !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        match trimmed.rsplit_once('@') {
            Some((local, domain)) => Ok(Self(format!("{local}@{}", domain.to_lowercase()))),
            None => Err(UserValidationError::InvalidEmail),
        }
    }

    /// Borrow the address text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Organisation-issued employee identifier, unique when present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Validate an employee identifier.
    ///
    /// # Errors
    /// Rejects blank values and values longer than [`EMPLOYEE_ID_MAX`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmployeeId);
        }
        if trimmed.chars().count() > EMPLOYEE_ID_MAX {
            return Err(UserValidationError::TooLong {
                max: EMPLOYEE_ID_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmployeeId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmployeeId> for String {
    fn from(value: EmployeeId) -> Self {
        value.0
    }
}

/// Postal address; every part may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line_1: String,
    pub line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Join the non-blank parts with `", "`.
    ///
    /// # Examples
    /// ```
    /// use kpa_backend::domain::Address;
    ///
    /// let address = Address {
    ///     line_1: "1 Rail Road".into(),
    ///     city: "Pune".into(),
    ///     country: "India".into(),
    ///     ..Address::default()
    /// };
    /// assert_eq!(address.full(), "1 Rail Road, Pune, India");
    /// ```
    #[must_use]
    pub fn full(&self) -> String {
        [
            &self.line_1,
            &self.line_2,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Personal details editable by the account holder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Address,
}

/// Organisational placement maintained by staff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employment {
    pub employee_id: Option<EmployeeId>,
    pub department: String,
    pub position: String,
    pub manager_id: Option<UserId>,
}

/// Directory account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub phone_number: PhoneNumber,
    pub email: Option<EmailAddress>,
    pub profile: UserProfile,
    pub employment: Employment,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.profile.first_name, self.profile.last_name)
            .trim()
            .to_owned()
    }

    /// Comma-separated address.
    #[must_use]
    pub fn full_address(&self) -> String {
        self.profile.address.full()
    }
}

/// Account insert payload; the password hash is produced by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub user: User,
    pub password_hash: String,
}

pub(crate) fn check_length(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max: usize,
) -> bool {
    if value.chars().count() > max {
        errors.push(field, UserValidationError::TooLong { max }.to_string());
        false
    } else {
        true
    }
}

/// Partial update of the self-service profile fields.
///
/// `None` leaves a field untouched. An empty `email` clears the address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
}

impl ProfileUpdate {
    /// Apply the update to `user`, recording every invalid field.
    ///
    /// Fields that fail validation are left unchanged.
    pub fn apply(self, user: &mut User, errors: &mut FieldErrors) {
        if let Some(email) = &self.email {
            if email.trim().is_empty() {
                user.email = None;
            } else {
                match EmailAddress::new(email) {
                    Ok(parsed) => user.email = Some(parsed),
                    Err(err) => errors.push("email", err.to_string()),
                }
            }
        }
        let ProfileUpdate {
            first_name,
            last_name,
            bio,
            date_of_birth,
            address_line_1,
            address_line_2,
            city,
            state,
            postal_code,
            country,
            department,
            position,
            ..
        } = self;
        let profile = &mut user.profile;
        apply_required_text(errors, "first_name", first_name, NAME_MAX, &mut profile.first_name);
        apply_required_text(errors, "last_name", last_name, NAME_MAX, &mut profile.last_name);
        apply_text(errors, "bio", bio, BIO_MAX, &mut profile.bio);
        if let Some(date_of_birth) = date_of_birth {
            profile.date_of_birth = Some(date_of_birth);
        }

        let address = &mut profile.address;
        let text_fields = [
            ("address_line_1", address_line_1, ADDRESS_LINE_MAX, &mut address.line_1),
            ("address_line_2", address_line_2, ADDRESS_LINE_MAX, &mut address.line_2),
            ("city", city, LOCALITY_MAX, &mut address.city),
            ("state", state, LOCALITY_MAX, &mut address.state),
            ("postal_code", postal_code, POSTAL_CODE_MAX, &mut address.postal_code),
            ("country", country, LOCALITY_MAX, &mut address.country),
        ];
        for (field, value, max, target) in text_fields {
            apply_text(errors, field, value, max, target);
        }

        let employment = &mut user.employment;
        apply_text(errors, "department", department, ORG_LABEL_MAX, &mut employment.department);
        apply_text(errors, "position", position, ORG_LABEL_MAX, &mut employment.position);
    }
}

fn apply_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max: usize,
    target: &mut String,
) {
    if let Some(value) = value {
        let trimmed = value.trim();
        if check_length(errors, field, trimmed, max) {
            *target = trimmed.to_owned();
        }
    }
}

fn apply_required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max: usize,
    target: &mut String,
) {
    match value {
        Some(value) if value.trim().is_empty() => {
            errors.push(field, "This field may not be blank.");
        }
        other => apply_text(errors, field, other, max, target),
    }
}

/// Staff-only account changes layered on top of [`ProfileUpdate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminUserUpdate {
    pub profile: ProfileUpdate,
    pub phone_number: Option<String>,
    /// Empty string clears the identifier.
    pub employee_id: Option<String>,
    pub manager: Option<ManagerChange>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

/// Requested change to the manager back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerChange {
    Assign(UserId),
    Clear,
}

impl AdminUserUpdate {
    /// Return `true` when any staff-only column is set.
    #[must_use]
    pub fn touches_admin_fields(&self) -> bool {
        self.phone_number.is_some()
            || self.employee_id.is_some()
            || self.manager.is_some()
            || self.is_staff.is_some()
            || self.is_active.is_some()
    }

    /// Apply the update to `user`, recording every invalid field.
    ///
    /// Manager existence and acyclicity need directory lookups and are
    /// checked by the service.
    pub fn apply(self, user: &mut User, errors: &mut FieldErrors) {
        self.profile.apply(user, errors);
        if let Some(raw) = self.phone_number {
            match PhoneNumber::new(&raw) {
                Ok(phone) => user.phone_number = phone,
                Err(err) => errors.push("phone_number", err.to_string()),
            }
        }
        if let Some(raw) = self.employee_id {
            if raw.trim().is_empty() {
                user.employment.employee_id = None;
            } else {
                match EmployeeId::new(&raw) {
                    Ok(id) => user.employment.employee_id = Some(id),
                    Err(err) => errors.push("employee_id", err.to_string()),
                }
            }
        }
        match self.manager {
            Some(ManagerChange::Assign(manager)) => user.employment.manager_id = Some(manager),
            Some(ManagerChange::Clear) => user.employment.manager_id = None,
            None => {}
        }
        if let Some(is_staff) = self.is_staff {
            user.is_staff = is_staff;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}

/// Filters accepted by the staff user listing. Filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub department: Option<String>,
    pub manager_id: Option<UserId>,
}

impl UserFilter {
    /// Return `true` when `user` satisfies every populated filter.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        self.is_active.is_none_or(|flag| user.is_active == flag)
            && self.is_staff.is_none_or(|flag| user.is_staff == flag)
            && self
                .department
                .as_deref()
                .is_none_or(|dept| user.employment.department.eq_ignore_ascii_case(dept))
            && self
                .manager_id
                .is_none_or(|manager| user.employment.manager_id == Some(manager))
    }
}

#[cfg(test)]
mod tests;
