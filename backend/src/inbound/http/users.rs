//! Account API handlers.
//!
//! ```text
//! POST /api/users/register {"phone_number":"+1234567890","password":"…",…}
//! POST /api/users/login {"phone_number":"+1234567890","password":"…"}
//! GET /api/users/profile
//! GET /api/users/users?is_staff=false&page=2
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use uuid::Uuid;

use crate::domain::ports::NewAccountRequest;
use crate::domain::{
    Error, FieldErrors, LoginCredentials, LoginValidationError, PageRequest, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedActor;
use crate::inbound::http::envelope::{self, Envelope};
use crate::inbound::http::schemas::{ErrorSchema, PageSchema};
use crate::inbound::http::state::HttpState;

pub use super::users_dto::{
    AdminUserUpdateRequest, AuthResponse, ChangePasswordRequest, CreateUserRequest, LoginRequest,
    ProfileUpdateRequest, RefreshRequest, RegisterRequest, TokenPairResponse, UserListQuery,
    UserResponse,
};

fn map_login_validation_error(err: LoginValidationError) -> Error {
    Error::validation(FieldErrors::single(err.field(), "This field is required."))
}

/// Register a phone account and issue its first token pair.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = Envelope<AuthResponse>),
        (status = 400, description = "Invalid registration", body = ErrorSchema),
        (status = 409, description = "Phone number or email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let grant = state.auth.register(payload.into_inner().into()).await?;
    Ok(envelope::created(
        "User registered successfully",
        AuthResponse {
            user: grant.user.into(),
            tokens: grant.tokens.into(),
        },
    ))
}

/// Exchange phone number and password for a token pair.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = Envelope<AuthResponse>),
        (status = 400, description = "Blank phone number or password", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let grant = state.auth.login(credentials).await?;
    Ok(envelope::ok(
        "Login successful",
        AuthResponse {
            user: grant.user.into(),
            tokens: grant.tokens.into(),
        },
    ))
}

/// Rotate a refresh token. Each refresh token is accepted once.
#[utoipa::path(
    post,
    path = "/api/users/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = Envelope<TokenPairResponse>),
        (status = 400, description = "Missing refresh token", body = ErrorSchema),
        (status = 401, description = "Invalid, expired, or reused refresh token", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "refreshToken",
    security([])
)]
#[post("/refresh")]
pub async fn refresh(
    state: web::Data<HttpState>,
    payload: web::Json<RefreshRequest>,
) -> ApiResult<HttpResponse> {
    let RefreshRequest { refresh_token } = payload.into_inner();
    let token = refresh_token.trim();
    if token.is_empty() {
        return Err(Error::validation(FieldErrors::single(
            "refresh_token",
            "This field is required.",
        )));
    }
    let tokens = state.auth.refresh(token).await?;
    Ok(envelope::ok(
        "Token refreshed successfully",
        TokenPairResponse::from(tokens),
    ))
}

/// Change the caller's password and revoke their refresh tokens.
#[utoipa::path(
    post,
    path = "/api/users/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = Envelope<Option<String>>),
        (status = 400, description = "Invalid password change", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[post("/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    state
        .auth
        .change_password(caller.actor(), payload.into_inner().into())
        .await?;
    Ok(envelope::ok("Password changed successfully", ()))
}

/// Return the caller's profile.
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Profile", body = Envelope<UserResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
) -> ApiResult<HttpResponse> {
    let user = state.users.profile(caller.actor()).await?;
    Ok(envelope::ok(
        "Profile retrieved successfully",
        UserResponse::from(user),
    ))
}

/// Update the caller's own profile fields.
#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = Envelope<UserResponse>),
        (status = 400, description = "Invalid profile fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Email already in use", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    payload: web::Json<ProfileUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .users
        .update_profile(caller.actor(), payload.into_inner().into())
        .await?;
    Ok(envelope::ok(
        "Profile updated successfully",
        UserResponse::from(user),
    ))
}

/// List accounts, newest first. Staff only.
#[utoipa::path(
    get,
    path = "/api/users/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users", body = Envelope<PageSchema<UserResponse>>),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    query: web::Query<UserListQuery>,
) -> ApiResult<HttpResponse> {
    let page = PageRequest::new(query.page, query.page_size).map_err(Error::validation)?;
    let users = state
        .users
        .list(caller.actor(), query.filter(), page)
        .await?;
    Ok(envelope::ok(
        "Users retrieved successfully",
        users.map(UserResponse::from),
    ))
}

/// Create an account on behalf of someone else. Staff only.
#[utoipa::path(
    post,
    path = "/api/users/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = Envelope<UserResponse>),
        (status = 400, description = "Invalid account", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Phone number or email already registered", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let (registration, details) = payload.into_inner().into_parts();
    let user = state
        .users
        .create(
            caller.actor(),
            NewAccountRequest {
                registration,
                details,
            },
        )
        .await?;
    Ok(envelope::created(
        "User created successfully",
        UserResponse::from(user),
    ))
}

/// Fetch one account. Allowed for the account itself and staff.
#[utoipa::path(
    get,
    path = "/api/users/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = Envelope<UserResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user = state
        .users
        .get(caller.actor(), UserId::from_uuid(id.into_inner()))
        .await?;
    Ok(envelope::ok(
        "User retrieved successfully",
        UserResponse::from(user),
    ))
}

/// Update an account. Staff-only fields require a staff caller.
#[utoipa::path(
    put,
    path = "/api/users/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    request_body = AdminUserUpdateRequest,
    responses(
        (status = 200, description = "Updated user", body = Envelope<UserResponse>),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Phone number or email already in use", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    id: web::Path<Uuid>,
    payload: web::Json<AdminUserUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .users
        .update(
            caller.actor(),
            UserId::from_uuid(id.into_inner()),
            payload.into_inner().into(),
        )
        .await?;
    Ok(envelope::ok(
        "User updated successfully",
        UserResponse::from(user),
    ))
}

/// Soft-delete an account by marking it inactive. Staff only.
#[utoipa::path(
    delete,
    path = "/api/users/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User deactivated", body = Envelope<Option<String>>),
        (status = 400, description = "Cannot deactivate own account", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deactivateUser"
)]
#[delete("/users/{id}")]
pub async fn deactivate_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedActor,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .users
        .deactivate(caller.actor(), UserId::from_uuid(id.into_inner()))
        .await?;
    Ok(envelope::ok("User deactivated successfully", ()))
}

/// Attach the account routes to `scope`.
pub fn routes(scope: actix_web::Scope) -> actix_web::Scope {
    scope
        .service(register)
        .service(login)
        .service(refresh)
        .service(change_password)
        .service(get_profile)
        .service(update_profile)
        .service(list_users)
        .service(create_user)
        .service(get_user)
        .service(update_user)
        .service(deactivate_user)
}
