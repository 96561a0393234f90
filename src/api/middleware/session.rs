//! Cookie session middleware and cookie helpers.

use axum::{extract::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::config::{SESSION_COOKIE_NAME, SESSION_MAX_AGE_DAYS};
use crate::errors::AppError;

/// Session user resolved from the `userId` cookie
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
}

/// Session middleware.
///
/// Reads the session cookie and injects `CurrentUser` into the request
/// extensions. The id is not looked up in the database here.
pub async fn session_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());
    let id = jar
        .get(SESSION_COOKIE_NAME)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(CurrentUser { id });

    Ok(next.run(request).await)
}

/// Session cookie for a freshly authenticated user.
pub fn session_cookie(user_id: Uuid, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, user_id.to_string()))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(SESSION_MAX_AGE_DAYS))
        .secure(secure)
        .build()
}

/// Cookie that, passed to `CookieJar::remove`, clears the session.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let id = Uuid::new_v4();
        let cookie = session_cookie(id, true);

        assert_eq!(cookie.name(), "userId");
        assert_eq!(cookie.value(), id.to_string());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
    }
}
