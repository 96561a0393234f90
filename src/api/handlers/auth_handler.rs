//! Authentication handlers.

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{
    expired_session_cookie, session_cookie, session_middleware, CurrentUser,
};
use crate::api::AppState;
use crate::domain::{LoginUser, RegisterUser, UserProfile};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created};

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route(
            "/user",
            get(current_user).route_layer(middleware::from_fn(session_middleware)),
        )
}

/// Register a new vendor account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Vendor registered, session cookie set", body = UserProfile),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<RegisterUser>,
) -> AppResult<(CookieJar, Created<UserProfile>)> {
    let user = state.auth_service.register(payload).await?;
    let jar = jar.add(session_cookie(user.id, state.settings.cookie_secure));

    Ok((
        jar,
        Created::new(UserProfile::from(user), "Vendor registration successful"),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginUser,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = UserProfile),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginUser>,
) -> AppResult<(CookieJar, ApiResponse<UserProfile>)> {
    let user = state.auth_service.login(payload).await?;
    let jar = jar.add(session_cookie(user.id, state.settings.cookie_secure));

    Ok((
        jar,
        ApiResponse::with_message(UserProfile::from(user), "Login successful"),
    ))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<()>) {
    (
        jar.remove(expired_session_cookie()),
        ApiResponse::message("Logged out successfully"),
    )
}

/// Get the session user's profile
#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    ),
    security(("session_cookie" = []))
)]
pub async fn current_user(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentUser>,
) -> AppResult<ApiResponse<UserProfile>> {
    let user = state.auth_service.current_user(session.id).await?;
    Ok(ApiResponse::success(UserProfile::from(user)))
}
