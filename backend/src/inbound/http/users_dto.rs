//! Request and response bodies for the `/api/users` endpoints.
//!
//! Request DTOs default every field so the domain validators can report all
//! missing values together instead of failing on the first absent key.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use zeroize::Zeroizing;

use crate::domain::{
    AdminUserUpdate, LoginCredentials, LoginValidationError, ManagerChange, PasswordChange,
    ProfileUpdate, RegistrationRequest, TokenPair, User, UserFilter, UserId,
};

/// Treat an explicit `null` differently from an absent key.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of `POST /api/users/register`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    #[schema(example = "+1234567890")]
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl From<RegisterRequest> for RegistrationRequest {
    fn from(value: RegisterRequest) -> Self {
        Self {
            phone_number: value.phone_number,
            password: Zeroizing::new(value.password),
            confirm_password: Zeroizing::new(value.confirm_password),
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
        }
    }
}

/// Body of `POST /api/users/login`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[schema(example = "+1234567890")]
    pub phone_number: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.phone_number, &value.password)
    }
}

/// Body of `POST /api/users/refresh`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Body of `POST /api/users/change-password`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl From<ChangePasswordRequest> for PasswordChange {
    fn from(value: ChangePasswordRequest) -> Self {
        Self {
            old_password: Zeroizing::new(value.old_password),
            new_password: Zeroizing::new(value.new_password),
            confirm_password: Zeroizing::new(value.confirm_password),
        }
    }
}

/// Self-service profile fields. Absent keys are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct ProfileUpdateRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "1990-04-01")]
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

impl From<ProfileUpdateRequest> for ProfileUpdate {
    fn from(value: ProfileUpdateRequest) -> Self {
        Self {
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            bio: value.bio,
            date_of_birth: value.date_of_birth,
            address_line_1: value.address_line_1,
            address_line_2: value.address_line_2,
            city: value.city,
            state: value.state,
            postal_code: value.postal_code,
            country: value.country,
            department: value.department,
            position: value.position,
        }
    }
}

/// Staff update of another account.
///
/// `manager_id: null` clears the manager; an absent key leaves it alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct AdminUserUpdateRequest {
    #[serde(flatten)]
    pub profile: ProfileUpdateRequest,
    pub phone_number: Option<String>,
    pub employee_id: Option<String>,
    #[serde(deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub manager_id: Option<Option<UserId>>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

impl From<AdminUserUpdateRequest> for AdminUserUpdate {
    fn from(value: AdminUserUpdateRequest) -> Self {
        Self {
            profile: value.profile.into(),
            phone_number: value.phone_number,
            employee_id: value.employee_id,
            manager: value.manager_id.map(|manager| match manager {
                Some(id) => ManagerChange::Assign(id),
                None => ManagerChange::Clear,
            }),
            is_staff: value.is_staff,
            is_active: value.is_active,
        }
    }
}

/// Staff creation of an account with optional employment details.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct CreateUserRequest {
    #[serde(flatten)]
    pub registration: RegisterRequest,
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub manager_id: Option<UserId>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

impl CreateUserRequest {
    /// Split into the raw registration and the staff-only details.
    pub fn into_parts(self) -> (RegistrationRequest, AdminUserUpdate) {
        let details = AdminUserUpdate {
            profile: ProfileUpdate {
                department: self.department,
                position: self.position,
                ..ProfileUpdate::default()
            },
            employee_id: self.employee_id,
            manager: self.manager_id.map(ManagerChange::Assign),
            is_staff: self.is_staff,
            is_active: self.is_active,
            ..AdminUserUpdate::default()
        };
        (self.registration.into(), details)
    }
}

/// Query string of `GET /api/users/users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub department: Option<String>,
    #[param(value_type = Option<String>, format = Uuid)]
    pub manager_id: Option<UserId>,
    /// One-based page number.
    pub page: Option<u32>,
    /// Items per page (1 to 100).
    pub page_size: Option<u32>,
}

impl UserListQuery {
    pub fn filter(&self) -> UserFilter {
        UserFilter {
            is_active: self.is_active,
            is_staff: self.is_staff,
            department: self
                .department
                .as_deref()
                .map(str::trim)
                .filter(|dept| !dept.is_empty())
                .map(str::to_owned),
            manager_id: self.manager_id,
        }
    }
}

/// Account as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: UserId,
    #[schema(example = "+1234567890")]
    pub phone_number: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub bio: String,
    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<NaiveDate>,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub full_address: String,
    pub employee_id: Option<String>,
    pub department: String,
    pub position: String,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub manager_id: Option<UserId>,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let full_name = user.full_name();
        let full_address = user.full_address();
        let User {
            id,
            phone_number,
            email,
            profile,
            employment,
            is_staff,
            is_active,
            date_joined,
            last_login,
        } = user;
        let address = profile.address;
        Self {
            id,
            phone_number: phone_number.as_str().to_owned(),
            email: email.map(|email| email.as_str().to_owned()),
            first_name: profile.first_name,
            last_name: profile.last_name,
            full_name,
            bio: profile.bio,
            date_of_birth: profile.date_of_birth,
            address_line_1: address.line_1,
            address_line_2: address.line_2,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            full_address,
            employee_id: employment.employee_id.map(String::from),
            department: employment.department,
            position: employment.position,
            manager_id: employment.manager_id,
            is_staff,
            is_active,
            date_joined,
            last_login,
        }
    }
}

/// Token pair as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds.
    #[schema(example = 3600)]
    pub expires_in: i64,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(value: TokenPair) -> Self {
        Self {
            access_token: value.access_token,
            refresh_token: value.refresh_token,
            token_type: value.token_type,
            expires_in: value.expires_in,
        }
    }
}

/// Body returned by registration and login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: TokenPairResponse,
}
